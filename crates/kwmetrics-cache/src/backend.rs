//! The capability every cache backend implements, per spec §4.1.

use kwmetrics_core::MetricRecord;

/// A single keyword-entry cache backend. Every error is swallowed at the
/// implementation boundary and surfaces to the caller as a plain miss/fail —
/// callers never see backend-specific error types.
pub trait CacheBackend: Send + Sync {
    fn get(&self, key: &str) -> Option<MetricRecord>;
    fn set(&self, key: &str, value: MetricRecord, ttl_secs: u64) -> bool;
    fn exists(&self, key: &str) -> bool;
    fn delete(&self, key: &str) -> bool;
}
