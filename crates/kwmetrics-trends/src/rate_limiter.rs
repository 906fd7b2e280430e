//! Adaptive rate limiter, per spec §4.3: the delay between calls shrinks on
//! sustained success and grows on failure, with a sharper jump on
//! quota-class failures.

use kwmetrics_core::scaled_jitter;
use std::sync::Mutex;
use std::time::Duration;

const INITIAL_DELAY_SECS: f64 = 5.0;
const FLOOR_SECS: f64 = 3.0;
const CEILING_SECS: f64 = 20.0;
const QUOTA_CEILING_SECS: f64 = 30.0;
const SUCCESS_DECAY: f64 = 0.95;
const FAILURE_GROWTH: f64 = 1.2;
const QUOTA_GROWTH: f64 = 2.0;
const SUCCESS_STREAK_THRESHOLD: u32 = 5;

struct State {
    delay_secs: f64,
    success_streak: u32,
}

pub struct AdaptiveRateLimiter {
    state: Mutex<State>,
}

impl Default for AdaptiveRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl AdaptiveRateLimiter {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                delay_secs: INITIAL_DELAY_SECS,
                success_streak: 0,
            }),
        }
    }

    /// The jittered delay to sleep before the next call.
    pub fn next_delay(&self) -> Duration {
        let delay_secs = self.state.lock().unwrap().delay_secs;
        scaled_jitter(Duration::from_secs_f64(delay_secs), 0.5, 1.5)
    }

    pub fn on_success(&self) {
        let mut state = self.state.lock().unwrap();
        state.success_streak += 1;
        if state.success_streak > SUCCESS_STREAK_THRESHOLD {
            state.delay_secs = (state.delay_secs * SUCCESS_DECAY).max(FLOOR_SECS);
        }
    }

    pub fn on_failure(&self, is_quota: bool) {
        let mut state = self.state.lock().unwrap();
        state.success_streak = 0;
        if is_quota {
            state.delay_secs = (state.delay_secs * QUOTA_GROWTH).min(QUOTA_CEILING_SECS);
        } else {
            state.delay_secs = (state.delay_secs * FAILURE_GROWTH).min(CEILING_SECS);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_increases_delay_and_resets_streak() {
        let limiter = AdaptiveRateLimiter::new();
        for _ in 0..6 {
            limiter.on_success();
        }
        let before = limiter.state.lock().unwrap().delay_secs;
        limiter.on_failure(false);
        let after = limiter.state.lock().unwrap().delay_secs;
        assert!(after > before);
        assert_eq!(limiter.state.lock().unwrap().success_streak, 0);
    }

    #[test]
    fn quota_failure_grows_faster_and_caps_at_30() {
        let limiter = AdaptiveRateLimiter::new();
        for _ in 0..10 {
            limiter.on_failure(true);
        }
        assert!(limiter.state.lock().unwrap().delay_secs <= QUOTA_CEILING_SECS);
    }

    #[test]
    fn sustained_success_decays_delay_to_floor() {
        let limiter = AdaptiveRateLimiter::new();
        for _ in 0..200 {
            limiter.on_success();
        }
        assert!((limiter.state.lock().unwrap().delay_secs - FLOOR_SECS).abs() < 1e-9);
    }

    #[test]
    fn success_streak_below_threshold_does_not_decay() {
        let limiter = AdaptiveRateLimiter::new();
        limiter.on_success();
        assert_eq!(limiter.state.lock().unwrap().delay_secs, INITIAL_DELAY_SECS);
    }
}
