use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum UpstreamError {
    /// CAPTCHA / HTTP 429 / "too many requests" / "quota" — recognized
    /// quota-class failures that trigger the per-keyword retry ladder.
    #[error("trends quota exceeded: {0}")]
    Quota(String),
    /// Any other failure — not retried.
    #[error("trends upstream error: {0}")]
    Other(String),
}

#[derive(Debug, Error, Clone)]
pub enum TrendsError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    /// All per-keyword quota retries exhausted; the breaker has been forced
    /// open.
    #[error("trends quota exceeded for keyword after retries")]
    QuotaExceeded,
    /// The rolling one-hour request budget is exhausted.
    #[error("trends hourly request limit reached")]
    OverHourlyLimit,
    #[error("trends circuit breaker open")]
    BreakerOpen,
}
