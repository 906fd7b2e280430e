//! `ProgressSnapshot` persistence for crash recovery across a bulk run, per
//! spec §3/§4.3. Snapshots older than 24h are discarded on load.

use kwmetrics_core::{now_unix, Keyword};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

const MAX_AGE_SECS: u64 = 24 * 3600;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProgressSnapshot {
    pub completed: HashMap<Keyword, Option<f64>>,
    pub remaining: Vec<Keyword>,
    pub failed: Vec<Keyword>,
    pub timestamp: u64,
}

impl ProgressSnapshot {
    pub fn new(completed: HashMap<Keyword, Option<f64>>, remaining: Vec<Keyword>, failed: Vec<Keyword>) -> Self {
        Self {
            completed,
            remaining,
            failed,
            timestamp: now_unix(),
        }
    }

    /// Loads the snapshot at `path` if present, readable, and younger than
    /// 24h. Any other condition (missing file, corruption, stale) yields
    /// `None` silently — the bulk run simply starts fresh.
    pub fn load(path: &Path) -> Option<Self> {
        let raw = std::fs::read_to_string(path).ok()?;
        let snapshot: Self = serde_json::from_str(&raw).ok()?;
        if now_unix().saturating_sub(snapshot.timestamp) > MAX_AGE_SECS {
            return None;
        }
        Some(snapshot)
    }

    pub fn save(&self, path: &Path) {
        match serde_json::to_string(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(path, json) {
                    tracing::error!(error = %e, "failed to persist trends progress snapshot");
                }
            }
            Err(e) => tracing::error!(error = %e, "failed to serialize trends progress snapshot"),
        }
    }

    pub fn delete(path: &Path) {
        let _ = std::fs::remove_file(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snap.json");
        let mut completed = HashMap::new();
        completed.insert(Keyword::new("a").unwrap(), Some(50.0));
        let snapshot = ProgressSnapshot::new(completed, vec![Keyword::new("b").unwrap()], vec![]);
        snapshot.save(&path);

        let loaded = ProgressSnapshot::load(&path).unwrap();
        assert_eq!(loaded.remaining, vec![Keyword::new("b").unwrap()]);
    }

    #[test]
    fn stale_snapshot_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snap.json");
        let mut snapshot = ProgressSnapshot::new(HashMap::new(), vec![], vec![]);
        snapshot.timestamp = now_unix() - MAX_AGE_SECS - 1;
        snapshot.save(&path);

        assert!(ProgressSnapshot::load(&path).is_none());
    }

    #[test]
    fn missing_file_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        assert!(ProgressSnapshot::load(&path).is_none());
    }

    #[test]
    fn delete_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snap.json");
        ProgressSnapshot::new(HashMap::new(), vec![], vec![]).save(&path);
        ProgressSnapshot::delete(&path);
        assert!(ProgressSnapshot::load(&path).is_none());
    }
}
