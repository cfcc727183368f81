//! Rate limiting for source adapters.
//!
//! Each adapter owns its own [`RateLimiter`]: a sliding window of recent
//! calls plus a minimum spacing between consecutive calls. There is no
//! process-wide limiter; two adapters never share budget.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;

/// Rate limiting error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateLimitError {
    /// Rate limit exceeded; must wait before calling again.
    #[error("rate limit exceeded; retry after {retry_after_ms}ms")]
    Exceeded {
        /// Milliseconds to wait before retry.
        retry_after_ms: u64,
    },
}

#[derive(Debug)]
struct WindowState {
    calls: VecDeque<Instant>,
    last_call: Option<Instant>,
}

/// Sliding-window rate limiter with a minimum interval between calls.
#[derive(Debug)]
pub struct RateLimiter {
    max_calls: u32,
    window: Duration,
    min_interval: Duration,
    state: Mutex<WindowState>,
}

impl RateLimiter {
    /// Allow at most `max_calls` per `window`.
    #[must_use]
    pub fn new(max_calls: u32, window: Duration) -> Self {
        Self {
            max_calls,
            window,
            min_interval: Duration::ZERO,
            state: Mutex::new(WindowState {
                calls: VecDeque::new(),
                last_call: None,
            }),
        }
    }

    /// Require at least `interval` between consecutive calls.
    #[must_use]
    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }

    /// Try to take a slot now.
    ///
    /// On success, records the call and returns `Ok(())`. On failure,
    /// returns [`RateLimitError::Exceeded`] with the wait until a slot frees.
    pub fn try_acquire(&self) -> Result<(), RateLimitError> {
        let now = Instant::now();
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        // Drop calls that have aged out of the window.
        while let Some(&first) = state.calls.front() {
            if now.duration_since(first) >= self.window {
                state.calls.pop_front();
            } else {
                break;
            }
        }

        let mut wait = Duration::ZERO;
        if let Some(last) = state.last_call {
            wait = wait.max(self.min_interval.saturating_sub(now.duration_since(last)));
        }
        if state.calls.len() >= self.max_calls as usize {
            if let Some(&oldest) = state.calls.front() {
                wait = wait.max(self.window.saturating_sub(now.duration_since(oldest)));
            }
        }

        if !wait.is_zero() {
            let retry_after_ms = u64::try_from(wait.as_millis())
                .unwrap_or(u64::MAX)
                .max(1);
            return Err(RateLimitError::Exceeded { retry_after_ms });
        }

        state.calls.push_back(now);
        state.last_call = Some(now);
        Ok(())
    }

    /// Wait until a slot is free, then take it.
    pub async fn acquire(&self) {
        loop {
            match self.try_acquire() {
                Ok(()) => return,
                Err(RateLimitError::Exceeded { retry_after_ms }) => {
                    tracing::trace!(retry_after_ms, "rate limited, waiting");
                    tokio::time::sleep(Duration::from_millis(retry_after_ms)).await;
                }
            }
        }
    }

    /// Number of calls still allowed in the current window.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        let now = Instant::now();
        let state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let live = state
            .calls
            .iter()
            .filter(|t| now.duration_since(**t) < self.window)
            .count() as u32;
        self.max_calls.saturating_sub(live)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn allows_within_limit() {
        let limiter = RateLimiter::new(5, Duration::from_secs(60));
        for _ in 0..5 {
            assert!(limiter.try_acquire().is_ok());
        }
    }

    #[test]
    fn blocks_exceeding_limit() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        for _ in 0..3 {
            assert!(limiter.try_acquire().is_ok());
        }

        match limiter.try_acquire() {
            Err(RateLimitError::Exceeded { retry_after_ms }) => {
                assert!(retry_after_ms > 0);
                assert!(retry_after_ms <= 60_000);
            }
            other => unreachable!("expected rate limit exceeded, got {other:?}"),
        }
    }

    #[test]
    fn remaining_count() {
        let limiter = RateLimiter::new(5, Duration::from_secs(60));
        assert_eq!(limiter.remaining(), 5);
        limiter.try_acquire().unwrap();
        assert_eq!(limiter.remaining(), 4);
        limiter.try_acquire().unwrap();
        assert_eq!(limiter.remaining(), 3);
    }

    #[test]
    fn min_interval_spaces_calls() {
        let limiter =
            RateLimiter::new(100, Duration::from_secs(60)).with_min_interval(Duration::from_secs(2));
        assert!(limiter.try_acquire().is_ok());
        match limiter.try_acquire() {
            Err(RateLimitError::Exceeded { retry_after_ms }) => {
                assert!(retry_after_ms <= 2_000);
            }
            other => unreachable!("expected rate limit exceeded, got {other:?}"),
        }
    }

    #[test]
    fn error_display() {
        let err = RateLimitError::Exceeded { retry_after_ms: 1500 };
        assert_eq!(err.to_string(), "rate limit exceeded; retry after 1500ms");
    }

    #[tokio::test(start_paused = true)]
    async fn window_slides_after_expiry() {
        let limiter = RateLimiter::new(2, Duration::from_secs(10));
        limiter.try_acquire().unwrap();
        limiter.try_acquire().unwrap();
        assert!(limiter.try_acquire().is_err());

        tokio::time::advance(Duration::from_secs(11)).await;
        assert!(limiter.try_acquire().is_ok());
        assert_eq!(limiter.remaining(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn acquire_waits_for_slot() {
        let limiter = RateLimiter::new(1, Duration::from_secs(5));
        let start = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_secs(5));
    }

    #[test]
    fn limiters_are_independent() {
        let a = RateLimiter::new(1, Duration::from_secs(60));
        let b = RateLimiter::new(1, Duration::from_secs(60));
        assert!(a.try_acquire().is_ok());
        assert!(a.try_acquire().is_err());
        assert!(b.try_acquire().is_ok());
    }
}
