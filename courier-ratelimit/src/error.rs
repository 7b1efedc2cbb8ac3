//! Error types for rate limiting

use thiserror::Error;

/// Result type for rate limiting operations
pub type RateLimitResult<T> = Result<T, RateLimitError>;

/// Rate limiting errors
#[derive(Debug, Error)]
pub enum RateLimitError {
    /// The caller's cancellation token fired while waiting for admission
    #[error("Rate limit wait for token '{token}' was cancelled")]
    Cancelled {
        /// Bucket the caller was waiting on
        token: String,
    },

    /// Rate must be a positive number of units per second
    #[error("Invalid rate limit: {0} units/sec")]
    InvalidRate(f64),
}

impl RateLimitError {
    /// Create a cancellation error for the given bucket token
    pub fn cancelled<S: Into<String>>(token: S) -> Self {
        Self::Cancelled {
            token: token.into(),
        }
    }

    /// Check if this error was caused by cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}
