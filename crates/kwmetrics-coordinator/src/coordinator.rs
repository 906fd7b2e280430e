//! `BatchCoordinator`: dedup → cache lookup → chunk → fan-out → merge →
//! write-through, per spec §4.5. Grounded on `process_keywords_batch` in the
//! original implementation.

use crate::fan_out::fan_out_chunk;
use kwmetrics_ads::AdsAdapter;
use kwmetrics_cache::Cache;
use kwmetrics_core::{dedup_keywords, KeywordMetric, ServiceError};
use kwmetrics_trends::TrendsAdapter;
use std::sync::Arc;
use std::time::Duration;

pub struct BatchCoordinator {
    cache: Arc<Cache>,
    ads: Arc<AdsAdapter>,
    trends: Arc<TrendsAdapter>,
}

impl BatchCoordinator {
    pub fn new(cache: Arc<Cache>, ads: Arc<AdsAdapter>, trends: Arc<TrendsAdapter>) -> Self {
        Self { cache, ads, trends }
    }

    /// Processes a deduplicated batch under a caller-provided wall-clock
    /// timeout. On timeout, the partial state is abandoned and an error is
    /// surfaced (spec §4.5's global timeout clause).
    pub async fn process_batch(
        &self,
        keywords: Vec<String>,
        chunk_size: usize,
        timeout: Duration,
    ) -> Result<Vec<KeywordMetric>, ServiceError> {
        tokio::time::timeout(timeout, self.process_batch_inner(keywords, chunk_size))
            .await
            .unwrap_or(Err(ServiceError::Timeout))
    }

    async fn process_batch_inner(
        &self,
        keywords: Vec<String>,
        chunk_size: usize,
    ) -> Result<Vec<KeywordMetric>, ServiceError> {
        let keywords = dedup_keywords(keywords);
        let (hits, misses) = self.cache.get_batch(&keywords);

        let mut metrics: Vec<KeywordMetric> = hits
            .into_iter()
            .map(|(keyword, record)| KeywordMetric {
                keyword: keyword.into_string(),
                ads_volume: record.ads_monthly_volume,
                trends_score: record.trends_score,
            })
            .collect();

        let chunk_size = chunk_size.clamp(1, 50);
        for (chunk_index, chunk) in misses.chunks(chunk_size).enumerate() {
            if chunk_index > 0 {
                let delay = Duration::from_secs((5 + 2 * chunk_index as u64).min(15));
                tokio::time::sleep(delay).await;
            }

            let merged =
                fan_out_chunk(self.ads.clone(), self.trends.clone(), chunk.to_vec()).await;

            for (keyword, record) in merged {
                self.cache.set(&keyword, record);
                metrics.push(KeywordMetric {
                    keyword: keyword.into_string(),
                    ads_volume: record.ads_monthly_volume,
                    trends_score: record.trends_score,
                });
            }
        }

        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kwmetrics_ads::{AdsCredentials, MetricSlot, RequestParams, UpstreamClient, UpstreamError as AdsUpstreamError};
    use kwmetrics_cache::{Cache as CacheImpl, FifoBackend};
    use kwmetrics_core::Keyword;
    use kwmetrics_trends::{TrendsUpstream, UpstreamError as TrendsUpstreamError};

    struct StubAds;
    impl UpstreamClient for StubAds {
        fn generate_historical_metrics(
            &self,
            keywords: &[Keyword],
            _customer_id: &str,
            _request_params: &RequestParams,
        ) -> Result<Vec<MetricSlot>, AdsUpstreamError> {
            Ok(keywords.iter().map(|_| MetricSlot::Volume(100)).collect())
        }
    }

    struct StubTrends;
    #[async_trait::async_trait]
    impl TrendsUpstream for StubTrends {
        async fn fetch_score(&self, _keyword: &Keyword) -> Result<f64, TrendsUpstreamError> {
            Ok(42.0)
        }
    }

    fn complete_credentials() -> AdsCredentials {
        AdsCredentials {
            developer_token: Some("t".into()),
            client_id: Some("c".into()),
            client_secret: Some("s".into()),
            refresh_token: Some("r".into()),
            customer_id: Some("123".into()),
        }
    }

    fn build(dir: &std::path::Path) -> BatchCoordinator {
        let cache = Arc::new(CacheImpl::with_backend(
            Box::new(FifoBackend::open(dir.join("c.bin"), 1000)),
            86400,
        ));
        let ads = Arc::new(AdsAdapter::new(complete_credentials(), Box::new(StubAds)));
        let trends = Arc::new(TrendsAdapter::new(
            Arc::new(StubTrends),
            dir.join("snap.json"),
        ));
        BatchCoordinator::new(cache, ads, trends)
    }

    #[tokio::test(start_paused = true)]
    async fn misses_are_fetched_merged_and_cached() {
        let dir = tempfile::tempdir().unwrap();
        let coordinator = build(dir.path());

        let result = coordinator
            .process_batch(vec!["a".into(), "b".into()], 20, Duration::from_secs(90))
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
        for metric in &result {
            assert_eq!(metric.ads_volume, Some(100));
            assert_eq!(metric.trends_score, Some(42.0));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cache_hit_is_returned_without_touching_adapters() {
        let dir = tempfile::tempdir().unwrap();
        let coordinator = build(dir.path());

        coordinator
            .process_batch(vec!["a".into()], 20, Duration::from_secs(90))
            .await
            .unwrap();

        // Second call should be served entirely from cache.
        let result = coordinator
            .process_batch(vec!["a".into()], 20, Duration::from_secs(90))
            .await
            .unwrap();
        assert_eq!(result[0].ads_volume, Some(100));
    }

    #[tokio::test(start_paused = true)]
    async fn deduplicates_input_keywords() {
        let dir = tempfile::tempdir().unwrap();
        let coordinator = build(dir.path());

        let result = coordinator
            .process_batch(
                vec!["a".into(), "a".into(), "b".into()],
                20,
                Duration::from_secs(90),
            )
            .await
            .unwrap();
        assert_eq!(result.len(), 2);
    }
}
