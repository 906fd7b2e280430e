//! In-process work queue of keywords partitioned into pending/processing/
//! completed/failed sets, per spec §4.4.

mod queue;
mod status;

pub use queue::JobQueue;
pub use status::{CompletedEntry, KeywordResult, QueueStatus};
