//! Rolling one-hour request budget, per spec §4.3.

use kwmetrics_core::now_unix;
use std::sync::Mutex;

const WINDOW_SECS: u64 = 3600;

struct State {
    count: u32,
    window_start: u64,
}

pub struct HourlyCap {
    limit: u32,
    state: Mutex<State>,
}

impl HourlyCap {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            state: Mutex::new(State {
                count: 0,
                window_start: now_unix(),
            }),
        }
    }

    /// Returns `true` (and records the call) if under the limit; `false` if
    /// the caller must fail fast without reaching the upstream.
    pub fn try_consume(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        let now = now_unix();
        if now.saturating_sub(state.window_start) >= WINDOW_SECS {
            state.count = 0;
            state.window_start = now;
        }
        if state.count >= self.limit {
            return false;
        }
        state.count += 1;
        true
    }
}
