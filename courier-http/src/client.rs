//! HTTP client implementation.

use async_trait::async_trait;
use courier_ratelimit::{TpsLimiter, global_limiter};
use http::Method;
use http::header::CONTENT_LENGTH;
use parking_lot::Mutex;
use reqwest::Body;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::{HttpClientConfig, RequestConfig, RequestError, RequestOption, Response, Result};

/// Anything that can execute a request described by a method, a target and
/// per-call options.
#[async_trait]
pub trait Client: Send + Sync {
    /// Send a request; failures are reported inside the [`Response`].
    async fn request(
        &self,
        method: &str,
        target: &str,
        body: Option<Body>,
        options: Vec<RequestOption>,
    ) -> Response;
}

/// HTTP client with a shared base configuration and per-call overrides.
///
/// Clones share the transport, the base configuration and the limiter.
#[derive(Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    base: Arc<Mutex<RequestConfig>>,
    limiter: Arc<dyn TpsLimiter>,
}

impl HttpClient {
    /// Create a client with the default transport and the given base options.
    pub fn new<I>(options: I) -> Result<Self>
    where
        I: IntoIterator<Item = RequestOption>,
    {
        Self::with_config(HttpClientConfig::default(), options)
    }

    /// Create a client with a custom transport configuration.
    pub fn with_config<I>(config: HttpClientConfig, options: I) -> Result<Self>
    where
        I: IntoIterator<Item = RequestOption>,
    {
        let inner = config
            .build_transport()
            .map_err(RequestError::ClientBuild)?;

        let mut base = RequestConfig::default();
        base.apply_all(options);

        Ok(Self {
            inner,
            base: Arc::new(Mutex::new(base)),
            limiter: global_limiter(),
        })
    }

    /// Use a different limiter instead of the process-wide one.
    pub fn with_limiter(mut self, limiter: Arc<dyn TpsLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    /// Get the underlying reqwest client.
    pub fn inner(&self) -> &reqwest::Client {
        &self.inner
    }

    /// Apply options to the base configuration used by later requests.
    pub fn configure<I>(&self, options: I)
    where
        I: IntoIterator<Item = RequestOption>,
    {
        self.base.lock().apply_all(options);
    }

    /// Snapshot of the base configuration.
    pub fn base_config(&self) -> RequestConfig {
        self.base.lock().clone()
    }

    /// Send a request.
    ///
    /// The base configuration is cloned, `options` are applied to the clone,
    /// and the clone drives this call only. A content length of zero drops
    /// `body`. Every failure is returned inside the [`Response`].
    pub async fn request<I>(
        &self,
        method: &str,
        target: &str,
        body: Option<Body>,
        options: I,
    ) -> Response
    where
        I: IntoIterator<Item = RequestOption>,
    {
        let mut config = self.base_config();
        config.apply_all(options);

        match self.execute(method, target, body, config).await {
            Ok(response) => Response::from_result(response),
            Err(error) => {
                debug!(method = %method, target = %target, error = %error, "Request failed");
                Response::from_error(error)
            }
        }
    }

    async fn execute(
        &self,
        method: &str,
        target: &str,
        body: Option<Body>,
        config: RequestConfig,
    ) -> Result<reqwest::Response> {
        let body = if config.content_length == Some(0) {
            None
        } else {
            body
        };

        let url = config.resolve(target)?;
        let method = Method::from_bytes(method.as_bytes())
            .map_err(|_| RequestError::InvalidMethod(method.to_string()))?;

        let mut builder = self
            .inner
            .request(method.clone(), url.clone())
            .timeout(config.timeout);

        // Multiple values of one header are flattened into a single line
        for (name, values) in &config.headers {
            builder = builder.header(name.as_str(), values.join(" "));
        }
        if let Some(length) = config.content_length {
            builder = builder.header(CONTENT_LENGTH, length);
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }
        let request = builder.build().map_err(RequestError::Build)?;

        // Without a caller token nothing outside this call can cancel it
        let cancel = config.cancellation.unwrap_or_default();

        if let Some(limit) = config.tps_limit.as_ref().filter(|limit| limit.rate > 0.0) {
            trace!(token = %limit.token, rate = limit.rate, burst = limit.burst, "Acquiring TPS permit");
            self.limiter
                .limit(&cancel, &limit.token, limit.rate, limit.burst)
                .await?;
        }

        debug!(method = %method, url = %url, "Sending request");
        let response = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(RequestError::Cancelled),
            response = self.inner.execute(request) => response?,
        };
        debug!(method = %method, url = %url, status = %response.status(), "Received response");

        Ok(response)
    }
}

#[async_trait]
impl Client for HttpClient {
    async fn request(
        &self,
        method: &str,
        target: &str,
        body: Option<Body>,
        options: Vec<RequestOption>,
    ) -> Response {
        HttpClient::request(self, method, target, body, options).await
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base", &*self.base.lock())
            .finish_non_exhaustive()
    }
}
