//! Placeholder upstream clients. The actual ad-platform/trends network
//! clients are external collaborators out of scope for this service (spec
//! §1) — a deployment wires in a real client crate here. These stand in so
//! the service is fully constructible and exercises its own resilience
//! logic (retry, breaker, rate limiting) end-to-end even with no upstream
//! configured.

use kwmetrics_ads::{MetricSlot, RequestParams, UpstreamClient, UpstreamError as AdsUpstreamError};
use kwmetrics_core::Keyword;
use kwmetrics_trends::{TrendsUpstream, UpstreamError as TrendsUpstreamError};

pub struct UnconfiguredAdsUpstream;

impl UpstreamClient for UnconfiguredAdsUpstream {
    fn generate_historical_metrics(
        &self,
        _keywords: &[Keyword],
        _customer_id: &str,
        _request_params: &RequestParams,
    ) -> Result<Vec<MetricSlot>, AdsUpstreamError> {
        Err(AdsUpstreamError::Unexpected(
            "no ad-platform client configured".into(),
        ))
    }
}

pub struct UnconfiguredTrendsUpstream;

#[async_trait::async_trait]
impl TrendsUpstream for UnconfiguredTrendsUpstream {
    async fn fetch_score(&self, _keyword: &Keyword) -> Result<f64, TrendsUpstreamError> {
        Err(TrendsUpstreamError::Other(
            "no trends client configured".into(),
        ))
    }
}
