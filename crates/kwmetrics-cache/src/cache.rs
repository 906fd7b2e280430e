//! The `Cache` facade: backend selection at construction, and the
//! keyword-prefixed get/set/batch operations the rest of the service calls.

use crate::backend::CacheBackend;
use crate::fifo_backend::FifoBackend;
use crate::redis_backend::RedisBackend;
use kwmetrics_core::{Keyword, MetricRecord};
use std::path::PathBuf;

pub struct RedisConfig<'a> {
    pub host: &'a str,
    pub port: u16,
    pub db: i64,
    pub password: Option<&'a str>,
}

pub struct Cache {
    backend: Box<dyn CacheBackend>,
    ttl_secs: u64,
}

fn cache_key(keyword: &Keyword) -> String {
    format!("keyword:{}", keyword.as_str())
}

impl Cache {
    /// Attempts Redis first; falls back to the on-disk FIFO backend on any
    /// connection failure. The choice is final for the process lifetime.
    pub fn new(
        redis: RedisConfig<'_>,
        fifo_path: PathBuf,
        fifo_max_entries: usize,
        ttl_secs: u64,
    ) -> Self {
        match RedisBackend::connect(redis.host, redis.port, redis.db, redis.password) {
            Ok(backend) => {
                tracing::info!("using redis cache backend");
                Self {
                    backend: Box::new(backend),
                    ttl_secs,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "redis unavailable, falling back to on-disk fifo cache");
                Self {
                    backend: Box::new(FifoBackend::open(fifo_path, fifo_max_entries)),
                    ttl_secs,
                }
            }
        }
    }

    /// Builds a cache directly over a given backend. Used by tests that want
    /// to exercise `Cache`'s batching logic without real I/O, and available
    /// to callers who've already resolved the backend themselves.
    pub fn with_backend(backend: Box<dyn CacheBackend>, ttl_secs: u64) -> Self {
        Self { backend, ttl_secs }
    }

    pub fn get(&self, keyword: &Keyword) -> Option<MetricRecord> {
        self.backend.get(&cache_key(keyword))
    }

    pub fn set(&self, keyword: &Keyword, record: MetricRecord) -> bool {
        self.backend.set(&cache_key(keyword), record, self.ttl_secs)
    }

    pub fn exists(&self, keyword: &Keyword) -> bool {
        self.backend.exists(&cache_key(keyword))
    }

    pub fn delete(&self, keyword: &Keyword) -> bool {
        self.backend.delete(&cache_key(keyword))
    }

    /// Splits `keywords` into cache hits and misses, per spec §4.1/§4.5.
    pub fn get_batch(&self, keywords: &[Keyword]) -> (Vec<(Keyword, MetricRecord)>, Vec<Keyword>) {
        let mut hits = Vec::new();
        let mut misses = Vec::new();
        for keyword in keywords {
            match self.get(keyword) {
                Some(record) => hits.push((keyword.clone(), record)),
                None => misses.push(keyword.clone()),
            }
        }
        (hits, misses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kwmetrics_core::MetricRecord;

    #[test]
    fn batch_splits_hits_and_misses() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::with_backend(
            Box::new(FifoBackend::open(dir.path().join("c.bin"), 100)),
            86400,
        );
        let a = Keyword::new("a").unwrap();
        let b = Keyword::new("b").unwrap();
        cache.set(&a, MetricRecord::new(Some(10), Some(5.0)));

        let (hits, misses) = cache.get_batch(&[a.clone(), b.clone()]);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, a);
        assert_eq!(misses, vec![b]);
    }

    #[test]
    fn set_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::with_backend(
            Box::new(FifoBackend::open(dir.path().join("c.bin"), 100)),
            86400,
        );
        let k = Keyword::new("widgets").unwrap();
        assert!(cache.set(&k, MetricRecord::new(Some(100), None)));
        assert_eq!(cache.get(&k).unwrap().ads_monthly_volume, Some(100));
        assert!(cache.exists(&k));
        assert!(cache.delete(&k));
        assert!(!cache.exists(&k));
    }
}
