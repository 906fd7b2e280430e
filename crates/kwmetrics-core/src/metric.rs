use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current time as whole seconds since the Unix epoch.
pub fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Rounds a trends score to one decimal place, per spec: `trendsScore` is
/// rounded to one decimal when stored and returned.
pub fn round_trends_score(score: f64) -> f64 {
    (score * 10.0).round() / 10.0
}

/// The pair of metrics resolved for a single keyword. Either field may be
/// absent independently; absence means "not determined", which is distinct
/// from a reported value of zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub ads_monthly_volume: Option<i64>,
    pub trends_score: Option<f64>,
    pub cached_at: u64,
}

impl MetricRecord {
    pub fn new(ads_monthly_volume: Option<i64>, trends_score: Option<f64>) -> Self {
        Self {
            ads_monthly_volume,
            trends_score: trends_score.map(round_trends_score),
            cached_at: now_unix(),
        }
    }

    /// True if at least one field carries a determined value.
    pub fn has_any_data(&self) -> bool {
        self.ads_monthly_volume.is_some() || self.trends_score.is_some()
    }
}

/// A cached `MetricRecord` together with its absolute expiry time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CacheEntry {
    pub value: MetricRecord,
    pub expires_at: u64,
}

impl CacheEntry {
    pub fn new(value: MetricRecord, ttl_secs: u64) -> Self {
        Self {
            value,
            expires_at: now_unix().saturating_add(ttl_secs),
        }
    }

    pub fn is_expired(&self) -> bool {
        now_unix() >= self.expires_at
    }
}

/// The keyword/metrics pair returned to callers over HTTP, per §4.5/§6.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordMetric {
    pub keyword: String,
    pub ads_volume: Option<i64>,
    pub trends_score: Option<f64>,
}
