//! The boundary to the web-trends provider (the `pytrends`-equivalent
//! collaborator). Real HTTP/scraping plumbing is out of scope (spec §1);
//! this crate owns everything around the call — concurrency cap, rate
//! limiting, retries, circuit breaking, progress persistence.

use crate::error::UpstreamError;
use kwmetrics_core::Keyword;

/// Fetches a single keyword's 12-month average popularity score in `[0, 100]`.
/// An empty upstream series is reported by the implementation as `Ok(0.0)`,
/// matching spec §4.3's contract.
#[async_trait::async_trait]
pub trait TrendsUpstream: Send + Sync {
    async fn fetch_score(&self, keyword: &Keyword) -> Result<f64, UpstreamError>;
}
