//! Rate Limit Window Module
//!
//! Counter state for one client+route pair and the decision derived from it.

// == Decision ==
/// Outcome of recording one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// The request may proceed.
    Allowed {
        /// Requests left in the current window
        remaining: u32,
        /// Seconds until the window resets
        reset_seconds: u64,
    },
    /// The request must be refused with 429.
    Rejected {
        /// Seconds the client should wait, always at least 1
        retry_after_seconds: u64,
    },
}

impl RateLimitDecision {
    /// Returns true for `Allowed`.
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed { .. })
    }
}

// == Window ==
/// Fixed counting window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitWindow {
    /// Requests observed in the current window
    pub count: u32,
    /// Unix milliseconds at which the window ends
    pub reset_time: u64,
}

impl RateLimitWindow {
    // == Constructor ==
    /// Opens an empty window ending `interval_ms` after `now_ms`.
    pub fn open(now_ms: u64, interval_ms: u64) -> Self {
        Self {
            count: 0,
            reset_time: now_ms.saturating_add(interval_ms),
        }
    }

    // == Is Elapsed ==
    /// True once `reset_time` has been reached.
    pub fn is_elapsed(&self, now_ms: u64) -> bool {
        now_ms >= self.reset_time
    }

    // == Record ==
    /// Counts one request and decides whether it is within `max_requests`.
    pub fn record(&mut self, now_ms: u64, max_requests: u32) -> RateLimitDecision {
        self.count = self.count.saturating_add(1);
        let seconds_left = self.seconds_until_reset(now_ms);

        if self.count > max_requests {
            RateLimitDecision::Rejected {
                retry_after_seconds: seconds_left.max(1),
            }
        } else {
            RateLimitDecision::Allowed {
                remaining: max_requests - self.count,
                reset_seconds: seconds_left,
            }
        }
    }

    /// Seconds until the window resets, rounded up.
    pub fn seconds_until_reset(&self, now_ms: u64) -> u64 {
        self.reset_time.saturating_sub(now_ms).div_ceil(1000)
    }
}
