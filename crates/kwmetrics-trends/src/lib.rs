//! Web-trends adapter: single-flight concurrency, adaptive rate limiting,
//! an hourly request cap, per-keyword quota retries, and progress snapshots
//! that survive a crash mid-run, per spec §4.3.

mod adapter;
mod error;
mod hourly_cap;
mod rate_limiter;
mod snapshot;
mod upstream;

pub use adapter::TrendsAdapter;
pub use error::{TrendsError, UpstreamError};
pub use snapshot::ProgressSnapshot;
pub use upstream::TrendsUpstream;
