//! Ad-platform historical-metrics adapter: retry with jittered backoff and a
//! consecutive-failure circuit breaker, per spec §4.2.

mod adapter;
mod upstream;

pub use adapter::{AdsAdapter, AdsCredentials};
pub use upstream::{MetricSlot, UpstreamClient, UpstreamError, RequestParams, REQUEST_PARAMS};
