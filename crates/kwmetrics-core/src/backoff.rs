//! Jittered backoff helpers shared by the adapters.

use rand::Rng;
use std::time::Duration;

/// `backoff_factor^attempt + uniform(-jitter, +jitter)` seconds, floored at
/// zero. `attempt` is zero-indexed (the delay before the *first* retry uses
/// `attempt = 0`).
pub fn exponential_jittered(backoff_factor: f64, attempt: u32, jitter: f64) -> Duration {
    let base = backoff_factor.powi(attempt as i32);
    let noise = rand::rng().random_range(-jitter..=jitter);
    Duration::from_secs_f64((base + noise).max(0.0))
}

/// `delay * uniform(low, high)`, used by the Trends adapter's adaptive rate
/// limiter (spec §4.3: `rateLimitDelay × uniform(0.5, 1.5)`).
pub fn scaled_jitter(delay: Duration, low: f64, high: f64) -> Duration {
    let factor = rand::rng().random_range(low..=high);
    Duration::from_secs_f64(delay.as_secs_f64() * factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exponential_jittered_stays_non_negative() {
        for attempt in 0..5 {
            let d = exponential_jittered(2.0, attempt, 0.2);
            assert!(d.as_secs_f64() >= 0.0);
        }
    }

    #[test]
    fn scaled_jitter_is_within_bounds() {
        let base = Duration::from_secs(10);
        for _ in 0..50 {
            let d = scaled_jitter(base, 0.5, 1.5);
            assert!(d.as_secs_f64() >= 4.9 && d.as_secs_f64() <= 15.1);
        }
    }
}
