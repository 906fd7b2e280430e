//! On-disk FIFO cache, grounded on the original `PickleCache`: an ordered
//! mapping with a hard capacity, front-eviction on overflow, recency bump on
//! hit, and a binary snapshot persisted on every mutation. The original used
//! `pickle`; this uses `bincode` for the same "whole-structure snapshot"
//! idiom.

use crate::backend::CacheBackend;
use kwmetrics_core::{now_unix, MetricRecord};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;

#[derive(Serialize, Deserialize, Clone)]
struct StoredEntry {
    value: MetricRecord,
    expires_at: u64,
}

/// Order-preserving map: `order` tracks insertion/recency order front-to-back
/// (oldest first), `entries` is keyed lookup. Kept as two structures rather
/// than a single `IndexMap`-style type so "move to tail" and "pop front" are
/// both O(n) worst case but trivial to reason about, matching the teacher's
/// `FifoStore` shape in spirit.
#[derive(Serialize, Deserialize, Default, Clone)]
struct FifoMap {
    order: VecDeque<String>,
    entries: std::collections::HashMap<String, StoredEntry>,
}

impl FifoMap {
    fn move_to_tail(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            let k = self.order.remove(pos).unwrap();
            self.order.push_back(k);
        }
    }

    fn remove(&mut self, key: &str) {
        self.order.retain(|k| k != key);
        self.entries.remove(key);
    }

    fn evict_front(&mut self) {
        if let Some(oldest) = self.order.pop_front() {
            self.entries.remove(&oldest);
        }
    }
}

pub struct FifoBackend {
    path: PathBuf,
    max_entries: usize,
    map: Mutex<FifoMap>,
}

impl FifoBackend {
    /// Loads an existing snapshot from `path` if present and readable.
    /// Corruption or a missing file both yield an empty cache — loss of the
    /// file is tolerated per spec.
    pub fn open(path: PathBuf, max_entries: usize) -> Self {
        let map = std::fs::read(&path)
            .ok()
            .and_then(|bytes| bincode::deserialize::<FifoMap>(&bytes).ok())
            .unwrap_or_default();
        Self {
            path,
            max_entries: max_entries.max(1),
            map: Mutex::new(map),
        }
    }

    fn persist(&self, map: &FifoMap) {
        match bincode::serialize(map) {
            Ok(bytes) => {
                if let Err(e) = std::fs::write(&self.path, bytes) {
                    tracing::error!(error = %e, "failed to persist fifo cache");
                }
            }
            Err(e) => tracing::error!(error = %e, "failed to serialize fifo cache"),
        }
    }
}

impl CacheBackend for FifoBackend {
    fn get(&self, key: &str) -> Option<MetricRecord> {
        let mut map = self.map.lock().unwrap();
        let entry = map.entries.get(key)?.clone();
        if now_unix() >= entry.expires_at {
            map.remove(key);
            self.persist(&map);
            return None;
        }
        map.move_to_tail(key);
        self.persist(&map);
        Some(entry.value)
    }

    fn set(&self, key: &str, value: MetricRecord, ttl_secs: u64) -> bool {
        let mut map = self.map.lock().unwrap();
        if !map.entries.contains_key(key) {
            while map.entries.len() >= self.max_entries {
                map.evict_front();
            }
            map.order.push_back(key.to_string());
        } else {
            map.move_to_tail(key);
        }
        map.entries.insert(
            key.to_string(),
            StoredEntry {
                value,
                expires_at: now_unix().saturating_add(ttl_secs),
            },
        );
        self.persist(&map);
        true
    }

    fn exists(&self, key: &str) -> bool {
        let mut map = self.map.lock().unwrap();
        match map.entries.get(key) {
            Some(entry) if now_unix() < entry.expires_at => true,
            Some(_) => {
                map.remove(key);
                self.persist(&map);
                false
            }
            None => false,
        }
    }

    fn delete(&self, key: &str) -> bool {
        let mut map = self.map.lock().unwrap();
        let existed = map.entries.contains_key(key);
        if existed {
            map.remove(key);
            self.persist(&map);
        }
        existed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kwmetrics_core::MetricRecord;

    fn record(v: i64) -> MetricRecord {
        MetricRecord::new(Some(v), None)
    }

    #[test]
    fn round_trips_within_ttl() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FifoBackend::open(dir.path().join("cache.bin"), 10);
        backend.set("k", record(1), 60);
        assert_eq!(backend.get("k").unwrap().ads_monthly_volume, Some(1));
    }

    #[test]
    fn expired_entry_is_a_miss_and_is_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FifoBackend::open(dir.path().join("cache.bin"), 10);
        backend.set("k", record(1), 0);
        assert!(backend.get("k").is_none());
        assert!(!backend.exists("k"));
    }

    #[test]
    fn evicts_oldest_when_over_capacity() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FifoBackend::open(dir.path().join("cache.bin"), 2);
        backend.set("a", record(1), 60);
        backend.set("b", record(2), 60);
        backend.set("c", record(3), 60);
        assert!(backend.get("a").is_none());
        assert!(backend.get("b").is_some());
        assert!(backend.get("c").is_some());
    }

    #[test]
    fn hit_bumps_recency_so_it_survives_eviction() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FifoBackend::open(dir.path().join("cache.bin"), 2);
        backend.set("a", record(1), 60);
        backend.set("b", record(2), 60);
        backend.get("a");
        backend.set("c", record(3), 60);
        assert!(backend.get("b").is_none());
        assert!(backend.get("a").is_some());
        assert!(backend.get("c").is_some());
    }

    #[test]
    fn survives_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does-not-exist.bin");
        let backend = FifoBackend::open(path, 10);
        assert!(backend.get("k").is_none());
    }

    #[test]
    fn reloads_persisted_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.bin");
        {
            let backend = FifoBackend::open(path.clone(), 10);
            backend.set("k", record(7), 3600);
        }
        let reopened = FifoBackend::open(path, 10);
        assert_eq!(reopened.get("k").unwrap().ads_monthly_volume, Some(7));
    }
}
