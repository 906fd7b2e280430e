//! A consecutive-failure circuit breaker.
//!
//! Unlike the sliding-window breaker this is adapted from
//! (`tower-resilience-circuitbreaker`), this variant has exactly the two
//! states spec §3 calls for — CLOSED and OPEN, no HALF-OPEN — and opens on a
//! raw consecutive-failure count rather than a failure rate over a window.
//! After the cooldown elapses the counter resets and the very next call is
//! admitted directly, without a half-open trial period.

use crate::error::ServiceError;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct State {
    consecutive_failures: u32,
    opened_at: Option<Instant>,
}

/// Thread-safe circuit breaker guarding a single upstream adapter.
pub struct CircuitBreaker {
    name: &'static str,
    threshold: u32,
    cooldown: Duration,
    state: Mutex<State>,
}

impl CircuitBreaker {
    pub fn new(name: &'static str, threshold: u32, cooldown: Duration) -> Self {
        Self {
            name,
            threshold,
            cooldown,
            state: Mutex::new(State {
                consecutive_failures: 0,
                opened_at: None,
            }),
        }
    }

    /// Returns `Ok(())` if a call may proceed, or `Err(BreakerOpen)` if the
    /// breaker is open and still within its cooldown window. Calling this
    /// after the cooldown elapses resets the breaker and admits the call —
    /// there is no half-open trial state.
    pub fn try_acquire(&self) -> Result<(), ServiceError> {
        let mut state = self.state.lock().unwrap();
        if state.consecutive_failures < self.threshold {
            return Ok(());
        }

        let opened_at = *state.opened_at.get_or_insert_with(|| {
            tracing::warn!(breaker = self.name, "circuit breaker opened");
            Instant::now()
        });

        let elapsed = opened_at.elapsed();
        if elapsed < self.cooldown {
            return Err(ServiceError::BreakerOpen {
                retry_after: self.cooldown - elapsed,
            });
        }

        tracing::info!(breaker = self.name, "circuit breaker cooldown elapsed, resetting");
        state.consecutive_failures = 0;
        state.opened_at = None;
        Ok(())
    }

    pub fn record_success(&self) {
        let mut state = self.state.lock().unwrap();
        state.consecutive_failures = 0;
        state.opened_at = None;
    }

    pub fn record_failure(&self) {
        let mut state = self.state.lock().unwrap();
        state.consecutive_failures = state.consecutive_failures.saturating_add(1);
        if state.consecutive_failures >= self.threshold {
            tracing::warn!(
                breaker = self.name,
                failures = state.consecutive_failures,
                "consecutive failure threshold reached"
            );
        }
    }

    /// Forces the breaker into the open state, as if `threshold` consecutive
    /// failures had just been observed. Used by the Trends adapter when
    /// quota retries are exhausted (spec §4.3).
    pub fn force_open(&self) {
        let mut state = self.state.lock().unwrap();
        state.consecutive_failures = self.threshold;
        state.opened_at = Some(Instant::now());
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.state.lock().unwrap().consecutive_failures
    }
}
