//! HTTP Client error types.

use courier_ratelimit::RateLimitError;
use http::StatusCode;
use thiserror::Error;

/// Result type for HTTP client operations.
pub type Result<T> = std::result::Result<T, RequestError>;

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Endpoint base could not be parsed as an absolute URL.
    #[error("Invalid endpoint '{endpoint}': {source}")]
    InvalidEndpoint {
        /// Endpoint as supplied by the caller.
        endpoint: String,
        /// Parse failure.
        #[source]
        source: url::ParseError,
    },

    /// Request target could not be parsed or resolved against the endpoint.
    #[error("Invalid request target '{target}': {source}")]
    InvalidTarget {
        /// Target as supplied by the caller.
        target: String,
        /// Parse failure.
        #[source]
        source: url::ParseError,
    },

    /// HTTP method is not a valid token.
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// Request building error (bad header name or value, etc.).
    #[error("Failed to build request: {0}")]
    Build(#[source] reqwest::Error),

    /// The underlying transport client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// Connection failure, timeout or other transport error.
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The caller's cancellation token fired during the exchange.
    #[error("Request cancelled")]
    Cancelled,

    /// Waiting for TPS admission failed.
    #[error("Rate limit error: {0}")]
    RateLimit(#[from] RateLimitError),

    /// Exchange succeeded but returned a status other than the expected one.
    #[error("Server returned unexpected HTTP status {status} (expected {expected})")]
    UnexpectedStatus {
        /// Status the server returned.
        status: StatusCode,
        /// Status the caller asked for.
        expected: StatusCode,
    },

    /// Draining the response body failed.
    #[error("Failed to read response body: {0}")]
    BodyRead(#[source] reqwest::Error),

    /// The response body is not valid UTF-8.
    #[error("Response body is not valid UTF-8: {0}")]
    BodyDecode(#[from] std::string::FromUtf8Error),
}

impl RequestError {
    /// Check if this is a timeout error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) | Self::BodyRead(e) if e.is_timeout())
    }

    /// Check if the caller cancelled the request, during the exchange or
    /// while waiting for TPS admission.
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Cancelled => true,
            Self::RateLimit(e) => e.is_cancelled(),
            _ => false,
        }
    }

    /// Check if this is a connection error.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_connect())
    }

    /// Get the HTTP status code if this is a status mismatch.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            Self::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
