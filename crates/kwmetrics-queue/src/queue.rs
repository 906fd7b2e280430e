//! `JobQueue`: a four-set keyword partition under a single lock, grounded on
//! `QueueManager` in the original implementation, per spec §4.4.

use crate::status::{CompletedEntry, KeywordResult, QueueStatus};
use kwmetrics_core::Keyword;
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

const DEFAULT_MAX_CONCURRENT: usize = 20;
const DEFAULT_BATCH_DELAY: Duration = Duration::from_secs(5);

struct Inner {
    pending: VecDeque<Keyword>,
    processing: HashSet<Keyword>,
    completed: HashMap<Keyword, CompletedEntry>,
    failed: HashSet<Keyword>,
    last_batch_at: Option<Instant>,
}

impl Inner {
    fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            processing: HashSet::new(),
            completed: HashMap::new(),
            failed: HashSet::new(),
            last_batch_at: None,
        }
    }

    fn contains(&self, keyword: &Keyword) -> bool {
        self.pending.contains(keyword)
            || self.processing.contains(keyword)
            || self.completed.contains_key(keyword)
            || self.failed.contains(keyword)
    }

    /// Removes `keyword` from every set. A keyword may be marked
    /// completed/failed while still sitting in `pending` (never handed out
    /// via `get_next_batch`), so the four sets stay a disjoint partition
    /// only if every insertion clears the others first.
    fn remove_everywhere(&mut self, keyword: &Keyword) {
        self.pending.retain(|k| k != keyword);
        self.processing.remove(keyword);
        self.completed.remove(keyword);
        self.failed.remove(keyword);
    }
}

pub struct JobQueue {
    inner: Mutex<Inner>,
    max_concurrent: usize,
    batch_delay: Duration,
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONCURRENT, DEFAULT_BATCH_DELAY)
    }
}

impl JobQueue {
    pub fn new(max_concurrent: usize, batch_delay: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner::new()),
            max_concurrent,
            batch_delay,
        }
    }

    /// Filters out any keyword already present in any of the four sets —
    /// the queue is add-once per keyword until `reset`.
    pub async fn add_keywords(&self, keywords: impl IntoIterator<Item = Keyword>) {
        let mut inner = self.inner.lock().await;
        let mut added = 0;
        for keyword in keywords {
            if !inner.contains(&keyword) {
                inner.pending.push_back(keyword);
                added += 1;
            }
        }
        tracing::info!(
            added,
            pending = inner.pending.len(),
            processing = inner.processing.len(),
            completed = inner.completed.len(),
            "added keywords to queue"
        );
    }

    /// Pops up to `max_concurrent` keywords off the pending FIFO into
    /// `processing`, enforcing a minimum gap of `batch_delay` between
    /// successive batches by sleeping while holding the lock.
    pub async fn get_next_batch(&self) -> Vec<Keyword> {
        let mut inner = self.inner.lock().await;

        if let Some(last) = inner.last_batch_at {
            let elapsed = last.elapsed();
            if elapsed < self.batch_delay {
                tokio::time::sleep(self.batch_delay - elapsed).await;
            }
        }

        let mut batch = Vec::new();
        while batch.len() < self.max_concurrent {
            let Some(keyword) = inner.pending.pop_front() else {
                break;
            };
            inner.processing.insert(keyword.clone());
            batch.push(keyword);
        }

        if !batch.is_empty() {
            inner.last_batch_at = Some(Instant::now());
            tracing::info!(batch_size = batch.len(), "fetched next queue batch");
        }

        batch
    }

    pub async fn mark_completed(&self, keyword: Keyword, ads: Option<i64>, trends: Option<f64>) {
        let mut inner = self.inner.lock().await;
        inner.remove_everywhere(&keyword);
        inner.completed.insert(keyword, CompletedEntry::new(ads, trends));
    }

    pub async fn mark_failed(&self, keyword: Keyword) {
        let mut inner = self.inner.lock().await;
        inner.remove_everywhere(&keyword);
        inner.failed.insert(keyword);
    }

    pub async fn status(&self) -> QueueStatus {
        let inner = self.inner.lock().await;
        QueueStatus {
            pending: inner.pending.len(),
            processing: inner.processing.len(),
            completed: inner.completed.len(),
            failed: inner.failed.len(),
        }
    }

    pub async fn results(&self, keywords: &[Keyword]) -> HashMap<Keyword, KeywordResult> {
        let inner = self.inner.lock().await;
        let mut results = HashMap::new();
        for keyword in keywords {
            let result = if let Some(entry) = inner.completed.get(keyword) {
                KeywordResult::Completed(*entry)
            } else if inner.failed.contains(keyword) {
                KeywordResult::Failed {
                    error: "Processing failed",
                }
            } else if inner.pending.contains(keyword) {
                KeywordResult::Pending
            } else {
                KeywordResult::Processing
            };
            results.insert(keyword.clone(), result);
        }
        results
    }

    pub async fn reset(&self) {
        let mut inner = self.inner.lock().await;
        *inner = Inner::new();
        tracing::info!("job queue reset");
    }
}
