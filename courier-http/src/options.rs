//! Per-request configuration and the options that mutate it.
//!
//! A client owns one base [`RequestConfig`]. Every request clones it, applies
//! the call's [`RequestOption`]s left to right and throws the clone away
//! afterwards, so overrides never leak between calls.

use crate::{RequestError, Result};
use std::collections::HashMap;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Header name to ordered values. Keys are kept exactly as supplied.
pub type HeaderSet = HashMap<String, Vec<String>>;

/// Default timeout for a single exchange.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// TPS limit settings attached to a request.
#[derive(Debug, Clone, PartialEq)]
pub struct TpsLimit {
    /// Bucket shared by every request naming the same token.
    pub token: String,
    /// Requests per second; zero or less disables limiting.
    pub rate: f64,
    /// Burst capacity, at least 1.
    pub burst: u32,
}

/// Settings for one request.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub(crate) timeout: Duration,
    pub(crate) headers: HeaderSet,
    pub(crate) cancellation: Option<CancellationToken>,
    pub(crate) content_length: Option<u64>,
    pub(crate) endpoint: Option<Url>,
    pub(crate) tps_limit: Option<TpsLimit>,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            headers: HeaderSet::new(),
            cancellation: None,
            content_length: None,
            endpoint: None,
            tps_limit: None,
        }
    }
}

impl RequestConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply options in order; later options win on scalar settings.
    pub fn apply_all<I>(&mut self, options: I)
    where
        I: IntoIterator<Item = RequestOption>,
    {
        for option in options {
            option.apply(self);
        }
    }

    /// Timeout for the whole exchange.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Headers sent with the request.
    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    /// Token that cancels the rate limit wait and the exchange; `None`
    /// means the request can only end by completing or timing out.
    pub fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancellation.as_ref()
    }

    /// Explicit content length, `None` when the transport should infer it.
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    /// Base URL relative targets are resolved against.
    pub fn endpoint(&self) -> Option<&Url> {
        self.endpoint.as_ref()
    }

    /// TPS limit settings.
    pub fn tps_limit(&self) -> Option<&TpsLimit> {
        self.tps_limit.as_ref()
    }

    /// Resolve a request target into the final URL.
    ///
    /// With an endpoint set the target is treated as a reference relative to
    /// it; otherwise the target must be an absolute URL.
    pub fn resolve(&self, target: &str) -> Result<Url> {
        let resolved = match &self.endpoint {
            Some(endpoint) => endpoint.join(target),
            None => Url::parse(target),
        };

        resolved.map_err(|source| RequestError::InvalidTarget {
            target: target.to_string(),
            source,
        })
    }
}

/// A named change to a [`RequestConfig`].
#[derive(Debug, Clone)]
pub enum RequestOption {
    /// Replace the exchange timeout.
    Timeout(Duration),
    /// Replace the cancellation token.
    Cancellation(CancellationToken),
    /// Merge headers, replacing entries with the same name.
    Headers(HeaderSet),
    /// Remove headers by name.
    WithoutHeaders(Vec<String>),
    /// Force the request's content length.
    ContentLength(u64),
    /// Resolve targets against this base URL.
    Endpoint(Url),
    /// Throttle through the shared limiter.
    TpsLimit(TpsLimit),
}

impl RequestOption {
    /// Set the request timeout.
    pub fn timeout(timeout: Duration) -> Self {
        Self::Timeout(timeout)
    }

    /// Bind the request to a cancellation token.
    pub fn cancellation(token: CancellationToken) -> Self {
        Self::Cancellation(token)
    }

    /// Set a single header.
    pub fn header<I, V>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let mut headers = HeaderSet::new();
        headers.insert(name.into(), values.into_iter().map(Into::into).collect());
        Self::Headers(headers)
    }

    /// Merge a set of headers.
    pub fn headers(headers: HeaderSet) -> Self {
        Self::Headers(headers)
    }

    /// Remove headers; repeated names are harmless.
    pub fn without_headers<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::WithoutHeaders(names.into_iter().map(Into::into).collect())
    }

    /// Force the content length. Zero also drops any body passed to the request.
    pub fn content_length(length: u64) -> Self {
        Self::ContentLength(length)
    }

    /// Parse a base URL for relative targets.
    ///
    /// A trailing `/` is appended when missing so the last path segment is
    /// kept during resolution.
    pub fn endpoint(endpoint: &str) -> Result<Self> {
        let mut base = endpoint.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }

        let url = Url::parse(&base).map_err(|source| RequestError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            source,
        })?;
        Ok(Self::Endpoint(url))
    }

    /// Throttle requests through the bucket named `token`.
    pub fn tps_limit(token: impl Into<String>, rate: f64, burst: u32) -> Self {
        Self::TpsLimit(TpsLimit {
            token: token.into(),
            rate,
            burst: burst.max(1),
        })
    }

    /// Apply this option to a configuration.
    pub fn apply(self, config: &mut RequestConfig) {
        match self {
            Self::Timeout(timeout) => config.timeout = timeout,
            Self::Cancellation(token) => config.cancellation = Some(token),
            Self::Headers(headers) => config.headers.extend(headers),
            Self::WithoutHeaders(names) => {
                for name in &names {
                    config.headers.remove(name);
                }
            }
            Self::ContentLength(length) => config.content_length = Some(length),
            Self::Endpoint(url) => config.endpoint = Some(with_trailing_slash(url)),
            Self::TpsLimit(mut limit) => {
                limit.burst = limit.burst.max(1);
                config.tps_limit = Some(limit);
            }
        }
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
