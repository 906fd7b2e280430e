use kwmetrics_core::now_unix;
use serde::{Deserialize, Serialize};

/// A completed keyword's stored result, per spec §4.4.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompletedEntry {
    pub ads: Option<i64>,
    pub trends: Option<f64>,
    pub completed_at: u64,
}

impl CompletedEntry {
    pub fn new(ads: Option<i64>, trends: Option<f64>) -> Self {
        Self {
            ads,
            trends,
            completed_at: now_unix(),
        }
    }
}

/// Aggregate set sizes, per spec §4.4's `status()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStatus {
    pub pending: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
}

/// One keyword's lookup result from `results()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state")]
pub enum KeywordResult {
    Completed(CompletedEntry),
    Failed { error: &'static str },
    Pending,
    Processing,
}
