//! The boundary to the ad-platform historical-metrics provider. The actual
//! OAuth/gRPC plumbing is an external collaborator out of scope for this
//! component (spec §1); what matters here is the shape of the call the
//! retry/breaker logic wraps.

use kwmetrics_core::Keyword;
use thiserror::Error;

/// One position in the upstream's results sequence. Keywords are matched to
/// results by position; a keyword past the end of the sequence is `Missing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricSlot {
    Volume(i64),
    Missing,
}

#[derive(Debug, Error, Clone)]
pub enum UpstreamError {
    /// A recognized, typed upstream error (the equivalent of
    /// `GoogleAdsException`) — retryable.
    #[error("upstream error: {0}")]
    Typed(String),
    /// Anything else — not retried, the retry loop aborts immediately.
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

/// Fixed request parameters the upstream call always uses, per spec §4.2.
pub struct RequestParams {
    pub language: &'static str,
    pub geo_target: &'static str,
}

pub const REQUEST_PARAMS: RequestParams = RequestParams {
    language: "languageConstants/1000",
    geo_target: "geoTargetConstants/2840",
};

/// A client capable of issuing the single bulk historical-metrics call.
/// Blocking, matching the original synchronous Google Ads client.
pub trait UpstreamClient: Send + Sync {
    fn generate_historical_metrics(
        &self,
        keywords: &[Keyword],
        customer_id: &str,
        request_params: &RequestParams,
    ) -> Result<Vec<MetricSlot>, UpstreamError>;
}
