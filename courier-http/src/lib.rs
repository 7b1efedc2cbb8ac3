//! # Courier HTTP Client
//!
//! A thin configurable transport over `reqwest` built for long-lived,
//! shared clients.
//!
//! ## Features
//!
//! - **Per-call overrides**: Each request clones the client's base
//!   configuration and applies its own [`RequestOption`]s to the clone
//! - **Endpoint resolution**: Relative targets resolve against a base URL
//! - **TPS limiting**: Requests naming the same token share one token bucket
//!   process-wide
//! - **Errors as values**: Every failure is carried inside the [`Response`],
//!   and later steps short-circuit on it
//! - **Seekable bodies**: [`SeekableBody`] fakes start/end seeks over a
//!   streamed body for range-serving consumers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use courier_http::{HttpClient, RequestOption, StatusCode};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HttpClient::new([
//!         RequestOption::endpoint("https://api.example.com/v1")?,
//!         RequestOption::timeout(Duration::from_secs(10)),
//!     ])?;
//!
//!     let body = client
//!         .request("GET", "orders/42", None, [RequestOption::tps_limit("orders", 5.0, 10)])
//!         .await
//!         .check_status(StatusCode::OK)
//!         .text()
//!         .await?;
//!
//!     println!("{body}");
//!     Ok(())
//! }
//! ```
//!
//! ## Serving a Response Body
//!
//! ```rust,no_run
//! use courier_http::{HttpClient, StatusCode};
//! use std::io::SeekFrom;
//! use tokio::io::{AsyncReadExt, AsyncSeekExt};
//!
//! # async fn example(client: HttpClient) -> Result<(), Box<dyn std::error::Error>> {
//! let mut body = client
//!     .request("GET", "https://cdn.example.com/video.mp4", None, [])
//!     .await
//!     .check_status(StatusCode::OK)
//!     .into_seekable()?;
//!
//! let size = body.seek(SeekFrom::End(0)).await?;
//! body.seek(SeekFrom::Start(0)).await?;
//!
//! let mut content = Vec::with_capacity(size as usize);
//! body.read_to_end(&mut content).await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod options;
mod response;
mod seekable;

pub use client::{Client, HttpClient};
pub use config::{HttpClientConfig, HttpClientConfigBuilder};
pub use error::{RequestError, Result};
pub use options::{DEFAULT_TIMEOUT, HeaderSet, RequestConfig, RequestOption, TpsLimit};
pub use response::Response;
pub use seekable::{SNIFF_LEN, SeekableBody};

// Re-export common types
pub use courier_ratelimit::{TokenBucketLimiter, TpsLimiter, global_limiter};
pub use http::{Method, StatusCode};
pub use reqwest::Body;
pub use tokio_util::sync::CancellationToken;
pub use url::Url;

/// Prelude for common imports.
///
/// ```
/// use courier_http::prelude::*;
/// ```
pub mod prelude {
    pub use crate::client::{Client, HttpClient};
    pub use crate::error::{RequestError, Result};
    pub use crate::options::{RequestConfig, RequestOption};
    pub use crate::response::Response;
    pub use crate::seekable::SeekableBody;
    pub use http::StatusCode;
    pub use tokio_util::sync::CancellationToken;
}
