// Sliding-window rate limiter - at most N requests per rolling window
// Refuses with a retry-after hint instead of sleeping; callers decide

use std::collections::VecDeque;
use std::sync::Arc;

use super::cache::Clock;

/// Sliding-window request limiter.
///
/// Each admitted request is timestamped and counts against the window for
/// `window_secs` seconds. Once `max_requests` timestamps sit inside the
/// window, further requests are refused until the oldest one slides out.
pub struct SlidingWindowLimiter {
    window_secs: u64,
    max_requests: usize,
    clock: Arc<dyn Clock>,
    admitted: VecDeque<u64>,
}

impl SlidingWindowLimiter {
    /// Create a limiter admitting `max_requests` per `window_secs` window
    pub fn new(window_secs: u64, max_requests: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            window_secs,
            max_requests,
            clock,
            admitted: VecDeque::new(),
        }
    }

    /// Get the window length in seconds
    pub fn window_secs(&self) -> u64 {
        self.window_secs
    }

    /// Get the per-window request budget
    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    /// Try to admit one request at the current instant.
    ///
    /// On success the request is recorded immediately. On refusal the error
    /// carries the number of seconds until the oldest in-window request
    /// expires and a retry could succeed.
    pub fn try_acquire(&mut self) -> Result<(), u64> {
        let now = self.clock.now_unix();
        self.prune(now);

        if self.max_requests == 0 {
            return Err(self.window_secs);
        }

        if self.admitted.len() < self.max_requests {
            self.admitted.push_back(now);
            return Ok(());
        }

        // Queue is pruned and non-empty here, so front() exists
        let oldest = self.admitted.front().copied().unwrap_or(now);
        Err((oldest + self.window_secs).saturating_sub(now))
    }

    /// Number of requests still counted against the window
    pub fn in_window(&mut self) -> usize {
        let now = self.clock.now_unix();
        self.prune(now);
        self.admitted.len()
    }

    /// Drop a timestamp once it has been inside the window for a full
    /// `window_secs`
    fn prune(&mut self, now: u64) {
        while let Some(&front) = self.admitted.front() {
            if now.saturating_sub(front) >= self.window_secs {
                self.admitted.pop_front();
            } else {
                break;
            }
        }
    }
}
