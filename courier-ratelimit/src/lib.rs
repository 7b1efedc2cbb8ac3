//! # Courier Rate Limiting
//!
//! Outbound TPS limiting keyed by caller-chosen tokens.
//!
//! A token names a logical destination or quota ("payments-api",
//! "tenant-42-uploads"). Every token gets its own token bucket, created
//! lazily the first time it is seen and shared by every caller in the
//! process that names the same token.
//!
//! ## Features
//!
//! - **Token bucket**: Smooth throttling with a configurable burst
//! - **Lock per bucket**: Distinct tokens never wait on each other
//! - **Cancellation**: Waits end early when the caller's `CancellationToken` fires
//! - **Process-wide registry**: [`global_limiter`] is shared by all clients
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use courier_ratelimit::{global_limiter, TpsLimiter};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let cancel = CancellationToken::new();
//!
//! // One request per second to the payments API, no burst beyond one
//! global_limiter().limit(&cancel, "payments-api", 1.0, 1).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrent settings
//!
//! Each call passes its own `rate` and `burst`, and those values replace the
//! bucket's settings. Concurrent callers that disagree on the settings for
//! one token race: whichever call reaches the bucket last wins.

pub mod error;
pub mod limiter;
pub mod token_bucket;

pub use error::{RateLimitError, RateLimitResult};
pub use limiter::{TokenBucketLimiter, TpsLimiter};
pub use token_bucket::TokenBucket;

use once_cell::sync::Lazy;
use std::sync::Arc;

static GLOBAL_LIMITER: Lazy<Arc<TokenBucketLimiter>> =
    Lazy::new(|| Arc::new(TokenBucketLimiter::new()));

/// The process-wide limiter shared by every client that does not inject its own
pub fn global_limiter() -> Arc<TokenBucketLimiter> {
    Arc::clone(&GLOBAL_LIMITER)
}
