//! `AdsAdapter`: retry + circuit breaker around the bulk historical-metrics
//! call, grounded on `GoogleAdsManager` in the original implementation.

use crate::upstream::{MetricSlot, UpstreamClient, UpstreamError, REQUEST_PARAMS};
use kwmetrics_core::{exponential_jittered, CircuitBreaker, Keyword};
use std::collections::HashMap;
use std::time::Duration;

const MAX_RETRIES: u32 = 3;
const BACKOFF_FACTOR: f64 = 2.0;
const JITTER: f64 = 0.2;
const BREAKER_THRESHOLD: u32 = 5;
const BREAKER_COOLDOWN: Duration = Duration::from_secs(300);

/// Developer/OAuth credentials for the upstream. Any field missing means the
/// adapter can be constructed but never actually initialized, per spec
/// §4.2's init tolerance.
#[derive(Debug, Clone, Default)]
pub struct AdsCredentials {
    pub developer_token: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,
    pub customer_id: Option<String>,
}

impl AdsCredentials {
    fn is_complete(&self) -> bool {
        self.developer_token.is_some()
            && self.client_id.is_some()
            && self.client_secret.is_some()
            && self.refresh_token.is_some()
            && self.customer_id.is_some()
    }
}

pub struct AdsAdapter {
    client: Option<Box<dyn UpstreamClient>>,
    customer_id: String,
    breaker: CircuitBreaker,
}

impl AdsAdapter {
    /// Construction never fails even with missing credentials; it just
    /// produces an adapter whose `get_bulk_metrics` returns all-absent maps.
    pub fn new(credentials: AdsCredentials, client: Box<dyn UpstreamClient>) -> Self {
        let customer_id = credentials
            .customer_id
            .as_deref()
            .unwrap_or("")
            .replace('-', "");

        if !credentials.is_complete() {
            tracing::warn!(
                "google ads client initialization deferred: missing credentials; \
                 configure credentials before issuing calls"
            );
            return Self {
                client: None,
                customer_id,
                breaker: CircuitBreaker::new("ads", BREAKER_THRESHOLD, BREAKER_COOLDOWN),
            };
        }

        Self {
            client: Some(client),
            customer_id,
            breaker: CircuitBreaker::new("ads", BREAKER_THRESHOLD, BREAKER_COOLDOWN),
        }
    }

    /// Blocking bulk fetch. For every input keyword the result map contains
    /// exactly one entry (spec §4.2's contract).
    pub fn get_bulk_metrics(&self, keywords: &[Keyword]) -> HashMap<Keyword, Option<i64>> {
        let Some(client) = &self.client else {
            tracing::error!("google ads client not initialized; configure valid credentials");
            return keywords.iter().cloned().map(|k| (k, None)).collect();
        };

        match self.execute_with_retry(client.as_ref(), keywords) {
            Ok(slots) => keywords
                .iter()
                .cloned()
                .enumerate()
                .map(|(i, k)| {
                    let v = match slots.get(i) {
                        Some(MetricSlot::Volume(v)) => Some(*v),
                        // Missing trailing positions yield absent (spec §4.2).
                        Some(MetricSlot::Missing) | None => None,
                    };
                    (k, v)
                })
                .collect(),
            Err(e) => {
                tracing::error!(error = %e, "google ads bulk metrics call failed after retries");
                keywords.iter().cloned().map(|k| (k, None)).collect()
            }
        }
    }

    fn execute_with_retry(
        &self,
        client: &dyn UpstreamClient,
        keywords: &[Keyword],
    ) -> Result<Vec<MetricSlot>, UpstreamError> {
        if let Err(e) = self.breaker.try_acquire() {
            return Err(UpstreamError::Unexpected(e.to_string()));
        }

        let mut last_error = None;
        for attempt in 0..MAX_RETRIES {
            match client.generate_historical_metrics(keywords, &self.customer_id, &REQUEST_PARAMS) {
                Ok(result) => {
                    self.breaker.record_success();
                    return Ok(result);
                }
                Err(e @ UpstreamError::Typed(_)) => {
                    self.breaker.record_failure();
                    last_error = Some(e.clone());
                    if attempt < MAX_RETRIES - 1 {
                        let delay = exponential_jittered(BACKOFF_FACTOR, attempt, JITTER);
                        tracing::warn!(
                            attempt = attempt + 1,
                            max_retries = MAX_RETRIES,
                            delay_secs = delay.as_secs_f64(),
                            error = %e,
                            "retrying ads upstream call"
                        );
                        std::thread::sleep(delay);
                    } else {
                        tracing::error!(error = %e, "ads upstream retries exhausted");
                    }
                }
                Err(e) => {
                    self.breaker.record_failure();
                    tracing::error!(error = %e, "unexpected ads upstream error, aborting retries");
                    return Err(e);
                }
            }
        }

        Err(last_error.unwrap_or(UpstreamError::Unexpected("no attempts made".into())))
    }
}
