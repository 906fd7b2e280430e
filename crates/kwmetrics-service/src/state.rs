use kwmetrics_ads::AdsAdapter;
use kwmetrics_cache::Cache;
use kwmetrics_coordinator::BatchCoordinator;
use kwmetrics_queue::JobQueue;
use kwmetrics_trends::TrendsAdapter;
use std::sync::Arc;

/// Long-lived collaborators, constructed once at startup and shared by
/// every request handler — no hidden ambient singletons (spec §9's
/// "global mutable state" redesign flag).
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<Cache>,
    pub ads: Arc<AdsAdapter>,
    pub trends: Arc<TrendsAdapter>,
    pub queue: Arc<JobQueue>,
    pub coordinator: Arc<BatchCoordinator>,
}
