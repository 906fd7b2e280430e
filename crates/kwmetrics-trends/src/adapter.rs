//! `TrendsAdapter`: semaphore-gated, rate-limited, per-keyword-retried
//! fetches with progress persistence across bulk runs, per spec §4.3.

use crate::error::{TrendsError, UpstreamError};
use crate::hourly_cap::HourlyCap;
use crate::rate_limiter::AdaptiveRateLimiter;
use crate::snapshot::ProgressSnapshot;
use crate::upstream::TrendsUpstream;
use kwmetrics_core::{CircuitBreaker, Keyword};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

const BREAKER_THRESHOLD: u32 = 3;
const BREAKER_COOLDOWN: Duration = Duration::from_secs(600);
const DEFAULT_HOURLY_LIMIT: u32 = 50;
const QUOTA_RETRY_DELAYS_SECS: [u64; 4] = [30, 60, 120, 300];
const BATCH_SIZE: usize = 3;
const SNAPSHOT_INTERVAL_BATCHES: usize = 5;

pub struct TrendsAdapter {
    upstream: Arc<dyn TrendsUpstream>,
    semaphore: Arc<Semaphore>,
    breaker: CircuitBreaker,
    rate_limiter: AdaptiveRateLimiter,
    hourly_cap: HourlyCap,
    snapshot_path: PathBuf,
}

impl TrendsAdapter {
    pub fn new(upstream: Arc<dyn TrendsUpstream>, snapshot_path: PathBuf) -> Self {
        Self::with_hourly_limit(upstream, snapshot_path, DEFAULT_HOURLY_LIMIT)
    }

    pub fn with_hourly_limit(
        upstream: Arc<dyn TrendsUpstream>,
        snapshot_path: PathBuf,
        hourly_limit: u32,
    ) -> Self {
        Self {
            upstream,
            semaphore: Arc::new(Semaphore::new(1)),
            breaker: CircuitBreaker::new("trends", BREAKER_THRESHOLD, BREAKER_COOLDOWN),
            rate_limiter: AdaptiveRateLimiter::new(),
            hourly_cap: HourlyCap::new(hourly_limit),
            snapshot_path,
        }
    }

    /// Fetches a 12-month average popularity score for every keyword in
    /// `keywords`. The returned map's key set equals the input key set
    /// exactly (spec §4.3's result shape invariant).
    pub async fn get_bulk_trends(&self, keywords: &[Keyword]) -> HashMap<Keyword, Option<f64>> {
        let mut results: HashMap<Keyword, Option<f64>> = HashMap::new();

        let mut work: Vec<Keyword> = keywords.to_vec();
        if let Some(snapshot) = ProgressSnapshot::load(&self.snapshot_path) {
            tracing::info!("resuming trends bulk run from persisted progress snapshot");
            for (k, v) in &snapshot.completed {
                if keywords.contains(k) {
                    results.insert(k.clone(), *v);
                }
            }
            work.retain(|k| !snapshot.completed.contains_key(k));
        }

        let batches: Vec<Vec<Keyword>> = work.chunks(BATCH_SIZE).map(|c| c.to_vec()).collect();
        let mut failed: Vec<Keyword> = Vec::new();
        let mut aborted_on_quota = false;

        'batches: for (batch_index, batch) in batches.iter().enumerate() {
            if batch_index > 0 {
                let delay = Duration::from_secs((10 + 2 * batch_index as u64).min(30));
                tokio::time::sleep(delay).await;
            }

            let mut quota_exceeded_at = None;
            for (i, keyword) in batch.iter().enumerate() {
                match self.get_single_trend_score(keyword).await {
                    Ok(score) => {
                        results.insert(keyword.clone(), Some(score));
                    }
                    Err(TrendsError::QuotaExceeded) => {
                        tracing::error!("trends quota exceeded, halting bulk run");
                        quota_exceeded_at = Some(i);
                        break;
                    }
                    Err(e) => {
                        tracing::warn!(keyword = %keyword, error = %e, "trends fetch failed");
                        results.insert(keyword.clone(), None);
                    }
                }
            }

            if let Some(cutoff) = quota_exceeded_at {
                aborted_on_quota = true;
                // The keyword that hit the quota, every keyword after it in
                // this batch, and every keyword in all later batches are
                // abandoned as failed.
                for keyword in &batch[cutoff..] {
                    failed.push(keyword.clone());
                    results.insert(keyword.clone(), None);
                }
                for later_batch in &batches[batch_index + 1..] {
                    for keyword in later_batch {
                        failed.push(keyword.clone());
                        results.insert(keyword.clone(), None);
                    }
                }
                let remaining: Vec<Keyword> = batches[batch_index..]
                    .iter()
                    .flatten()
                    .filter(|k| results.get(*k) == Some(&None))
                    .cloned()
                    .collect();
                ProgressSnapshot::new(results.clone(), remaining, failed.clone())
                    .save(&self.snapshot_path);
                break 'batches;
            }

            if (batch_index + 1) % SNAPSHOT_INTERVAL_BATCHES == 0 {
                let remaining: Vec<Keyword> = batches[batch_index + 1..]
                    .iter()
                    .flatten()
                    .cloned()
                    .collect();
                ProgressSnapshot::new(results.clone(), remaining, failed.clone())
                    .save(&self.snapshot_path);
            }
        }

        if !aborted_on_quota {
            ProgressSnapshot::delete(&self.snapshot_path);
        }

        // Result shape invariant: key set equals the input key set exactly.
        for keyword in keywords {
            results.entry(keyword.clone()).or_insert(None);
        }
        results
    }

    async fn get_single_trend_score(&self, keyword: &Keyword) -> Result<f64, TrendsError> {
        self.breaker.try_acquire().map_err(|_| TrendsError::BreakerOpen)?;

        if !self.hourly_cap.try_consume() {
            return Err(TrendsError::OverHourlyLimit);
        }

        let _permit = self.semaphore.acquire().await.expect("semaphore never closed");
        tokio::time::sleep(self.rate_limiter.next_delay()).await;

        let mut attempt = 0usize;
        loop {
            match self.upstream.fetch_score(keyword).await {
                Ok(score) => {
                    self.breaker.record_success();
                    self.rate_limiter.on_success();
                    return Ok(score);
                }
                Err(UpstreamError::Quota(msg)) => {
                    self.breaker.record_failure();
                    self.rate_limiter.on_failure(true);
                    if attempt >= QUOTA_RETRY_DELAYS_SECS.len() {
                        self.breaker.force_open();
                        return Err(TrendsError::QuotaExceeded);
                    }
                    let delay = Duration::from_secs(QUOTA_RETRY_DELAYS_SECS[attempt]);
                    tracing::warn!(
                        keyword = %keyword,
                        attempt,
                        delay_secs = delay.as_secs(),
                        error = %msg,
                        "trends quota-class error, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(UpstreamError::Other(msg)) => {
                    self.breaker.record_failure();
                    self.rate_limiter.on_failure(false);
                    tracing::warn!(keyword = %keyword, error = %msg, "trends upstream error");
                    return Err(TrendsError::Upstream(UpstreamError::Other(msg)));
                }
            }
        }
    }
}
