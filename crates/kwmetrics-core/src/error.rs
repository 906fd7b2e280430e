use std::time::Duration;
use thiserror::Error;

/// The outward-facing error taxonomy described in spec §7. Every adapter
/// boundary produces one of these instead of an ad-hoc string; the HTTP
/// layer maps each variant to a status code.
#[derive(Debug, Error, Clone)]
pub enum ServiceError {
    /// Bad request shape or size bounds.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Network/5xx/typed upstream errors; retried locally, then downgraded.
    #[error("upstream transient error: {0}")]
    UpstreamTransient(String),

    /// CAPTCHA/429/quota-class upstream errors.
    #[error("upstream quota exceeded: {0}")]
    UpstreamQuota(String),

    /// The circuit is open; calls are rejected without reaching the upstream.
    #[error("circuit breaker open, retry after {retry_after:?}")]
    BreakerOpen { retry_after: Duration },

    /// A caller-provided wall-clock timeout elapsed.
    #[error("operation timed out")]
    Timeout,

    /// Any other unexpected failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn is_breaker_open(&self) -> bool {
        matches!(self, ServiceError::BreakerOpen { .. })
    }

    pub fn is_quota(&self) -> bool {
        matches!(self, ServiceError::UpstreamQuota(_))
    }
}
