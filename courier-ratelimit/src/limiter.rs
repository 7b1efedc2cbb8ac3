//! Token-keyed TPS limiter
//!
//! Buckets live in a `DashMap` keyed by the caller-chosen token and are
//! created lazily on first use. Each bucket carries its own lock, so callers
//! on different tokens never contend beyond the map's shard lookup.

use crate::error::{RateLimitError, RateLimitResult};
use crate::token_bucket::TokenBucket;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Admission control consumed by the HTTP client
#[async_trait]
pub trait TpsLimiter: Send + Sync {
    /// Admit exactly one unit of work against the bucket named `token`,
    /// waiting until the bucket can afford it.
    ///
    /// The bucket is created with `rate`/`burst` if it does not exist yet;
    /// otherwise the supplied values replace the bucket's settings.
    async fn limit(
        &self,
        cancel: &CancellationToken,
        token: &str,
        rate: f64,
        burst: u32,
    ) -> RateLimitResult<()>;
}

/// In-memory limiter holding one token bucket per rate limit token
#[derive(Debug, Default)]
pub struct TokenBucketLimiter {
    buckets: DashMap<String, Arc<TokenBucket>>,
}

impl TokenBucketLimiter {
    /// Create an empty limiter
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the bucket for a token, creating it on first use
    fn bucket(&self, token: &str, rate: f64, burst: u32) -> Arc<TokenBucket> {
        if let Some(bucket) = self.buckets.get(token) {
            return Arc::clone(&bucket);
        }

        let bucket = self.buckets.entry(token.to_string()).or_insert_with(|| {
            debug!(token = %token, rate, burst, "Creating token bucket");
            Arc::new(TokenBucket::new(rate, burst))
        });
        Arc::clone(&bucket)
    }

    /// Number of tokens that currently have a bucket
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Current balance for a token, if it has a bucket
    pub fn available(&self, token: &str) -> Option<f64> {
        self.buckets.get(token).map(|bucket| bucket.available())
    }

    /// Drop the bucket for a token; the next caller starts with a full burst
    pub fn remove(&self, token: &str) -> bool {
        debug!(token = %token, "Removing token bucket");
        self.buckets.remove(token).is_some()
    }
}

#[async_trait]
impl TpsLimiter for TokenBucketLimiter {
    async fn limit(
        &self,
        cancel: &CancellationToken,
        token: &str,
        rate: f64,
        burst: u32,
    ) -> RateLimitResult<()> {
        if rate.is_nan() || rate <= 0.0 {
            return Err(RateLimitError::InvalidRate(rate));
        }
        if cancel.is_cancelled() {
            return Err(RateLimitError::cancelled(token));
        }

        let bucket = self.bucket(token, rate, burst);
        let wait = bucket.reserve(rate, burst);
        if wait.is_zero() {
            trace!(token = %token, "TPS limit: admitted from burst");
            return Ok(());
        }

        debug!(token = %token, wait = ?wait, "TPS limit: waiting for token");
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                bucket.cancel_reservation();
                debug!(token = %token, "TPS limit: wait cancelled");
                Err(RateLimitError::cancelled(token))
            }
            () = tokio::time::sleep(wait) => Ok(()),
        }
    }
}
