// Client side pacing for bursts of API calls.
//
// The limiter keeps the timestamps of the most recent `max_requests` calls.
// A new call is allowed once the oldest of those is at least one window
// old, so no window of that length ever contains more than `max_requests`
// calls, regardless of how long individual calls take.

use crate::config::{RateLimitConfig, MAX_BACKOFF_SECS, MAX_WINDOW_SECS};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Source of time for the limiter. Production code uses `SystemClock`;
/// tests substitute a clock that advances instantly on `sleep`.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

pub struct RateLimiter<'a> {
    clock: &'a dyn Clock,
    max_requests: usize,
    window: Duration,
    backoff: Duration,
    recent: VecDeque<Instant>,
    not_before: Option<Instant>,
}

impl<'a> RateLimiter<'a> {
    pub fn new(config: &RateLimitConfig, clock: &'a dyn Clock) -> Self {
        let max_requests = config.max_requests.max(1) as usize;
        Self {
            clock,
            max_requests,
            window: config.window().min(Duration::from_secs(MAX_WINDOW_SECS)),
            backoff: clamp_pause(config.backoff()),
            recent: VecDeque::with_capacity(max_requests),
            not_before: None,
        }
    }

    /// Block until one more call fits in the budget, then record it.
    /// Returns how long the caller was made to wait.
    pub fn acquire(&mut self) -> Duration {
        let start = self.clock.now();
        let mut ready_at = start;

        if let Some(not_before) = self.not_before.take() {
            ready_at = ready_at.max(not_before);
        }
        if self.recent.len() >= self.max_requests {
            if let Some(&oldest) = self.recent.front() {
                if let Some(window_end) = oldest.checked_add(self.window) {
                    ready_at = ready_at.max(window_end);
                }
            }
        }

        let waited = ready_at.saturating_duration_since(start);
        if !waited.is_zero() {
            tracing::info!(
                "rate limit reached, waiting {:.1}s before the next request",
                waited.as_secs_f64()
            );
            self.clock.sleep(waited);
        }

        let now = self.clock.now();
        while self.recent.len() >= self.max_requests {
            self.recent.pop_front();
        }
        self.recent.push_back(now);
        waited
    }

    /// Pause used after a 429 that carries no `Retry-After`.
    pub fn default_backoff(&self) -> Duration {
        self.backoff
    }

    /// Push the next `acquire` out by at least `duration` from now, capped at
    /// `MAX_BACKOFF_SECS`. Used when the server rejects a call for exceeding
    /// its limit despite local pacing.
    pub fn back_off(&mut self, duration: Duration) {
        let now = self.clock.now();
        let until = now
            .checked_add(clamp_pause(duration))
            .or_else(|| now.checked_add(self.backoff))
            .unwrap_or(now);
        self.not_before = Some(match self.not_before {
            Some(existing) => existing.max(until),
            None => until,
        });
    }

    #[cfg(test)]
    fn calls_in_window(&self) -> usize {
        let now = self.clock.now();
        self.recent
            .iter()
            .filter(|&&t| now.saturating_duration_since(t) < self.window)
            .count()
    }
}

fn clamp_pause(duration: Duration) -> Duration {
    duration.min(Duration::from_secs(MAX_BACKOFF_SECS))
}
