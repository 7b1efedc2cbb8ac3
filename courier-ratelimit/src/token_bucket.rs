//! Token Bucket
//!
//! A single bucket tracks the admission budget of one rate limit token.
//!
//! ## How It Works
//!
//! 1. A bucket starts full with `burst` tokens
//! 2. Each admission reserves one token, even when none is available
//! 3. Tokens are added at `rate` per second, up to `burst`
//! 4. A reservation made on an empty bucket drives the balance negative;
//!    the caller waits until the refill covers the deficit
//!
//! Reserving instead of polling keeps concurrent waiters on the same token
//! ordered: every reservation pushes the next caller's wait further out.
//!
//! ## Example
//!
//! ```rust
//! use courier_ratelimit::TokenBucket;
//! use std::time::Duration;
//!
//! let bucket = TokenBucket::new(1.0, 1);
//!
//! // The initial burst is admitted immediately
//! assert_eq!(bucket.reserve(1.0, 1), Duration::ZERO);
//!
//! // The next unit needs a full second of refill
//! assert!(bucket.reserve(1.0, 1) > Duration::from_millis(900));
//! ```

use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Token bucket state
#[derive(Debug, Clone)]
struct BucketState {
    /// Current balance, negative while reservations are outstanding
    tokens: f64,
    /// Last time tokens were added
    last_refill: Instant,
    /// Tokens added per second
    rate: f64,
    /// Maximum tokens (burst capacity)
    burst: u32,
}

/// Token bucket for a single rate limit token
#[derive(Debug)]
pub struct TokenBucket {
    state: Mutex<BucketState>,
}

impl TokenBucket {
    /// Create a full bucket
    ///
    /// # Arguments
    ///
    /// * `rate` - Tokens added per second
    /// * `burst` - Maximum tokens, clamped to at least 1
    pub fn new(rate: f64, burst: u32) -> Self {
        let burst = burst.max(1);
        Self {
            state: Mutex::new(BucketState {
                tokens: f64::from(burst),
                last_refill: Instant::now(),
                rate,
                burst,
            }),
        }
    }

    /// Refill tokens based on elapsed time
    fn refill(state: &mut BucketState, now: Instant) {
        let elapsed = now.saturating_duration_since(state.last_refill).as_secs_f64();
        let new_tokens = elapsed * state.rate;

        state.tokens = (state.tokens + new_tokens).min(f64::from(state.burst));
        state.last_refill = now;
    }

    /// Reserve one token and return how long the caller must wait before
    /// the reservation is honored.
    ///
    /// `rate` and `burst` replace the bucket's current settings. Tokens that
    /// accrued before the call are credited at the previous rate.
    pub fn reserve(&self, rate: f64, burst: u32) -> Duration {
        let mut state = self.state.lock();
        Self::refill(&mut state, Instant::now());

        state.rate = rate;
        state.burst = burst.max(1);
        state.tokens = state.tokens.min(f64::from(state.burst));

        state.tokens -= 1.0;
        if state.tokens >= 0.0 {
            return Duration::ZERO;
        }

        Duration::try_from_secs_f64(-state.tokens / state.rate).unwrap_or(Duration::MAX)
    }

    /// Give back a reservation whose caller stopped waiting
    pub fn cancel_reservation(&self) {
        let mut state = self.state.lock();
        state.tokens = (state.tokens + 1.0).min(f64::from(state.burst));
    }

    /// Current balance after refill; negative while callers are queued
    pub fn available(&self) -> f64 {
        let mut state = self.state.lock();
        Self::refill(&mut state, Instant::now());
        state.tokens
    }

    /// Get the refill rate
    pub fn rate(&self) -> f64 {
        self.state.lock().rate
    }

    /// Get the burst capacity
    pub fn burst(&self) -> u32 {
        self.state.lock().burst
    }
}
