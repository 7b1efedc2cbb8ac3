//! Outcome of a request.

use crate::{RequestError, Result, SeekableBody};
use http::StatusCode;
use tracing::debug;

/// Either the error that ended a request or the transport response.
///
/// [`check_status`](Self::check_status) is the one operation that records an
/// error while keeping the response attached. Consumers always look at the
/// error first, so once a request has failed every later step hands back
/// that same error untouched.
#[derive(Debug)]
pub struct Response {
    outcome: std::result::Result<reqwest::Response, RequestError>,
    // Kept next to a status mismatch so callers can inspect what was sent
    attached: Option<reqwest::Response>,
}

impl Response {
    /// Wrap a completed exchange.
    pub fn from_result(response: reqwest::Response) -> Self {
        Self {
            outcome: Ok(response),
            attached: None,
        }
    }

    /// Wrap a failure.
    pub fn from_error(error: RequestError) -> Self {
        Self {
            outcome: Err(error),
            attached: None,
        }
    }

    /// The error, if the request or a later check failed.
    pub fn error(&self) -> Option<&RequestError> {
        self.outcome.as_ref().err()
    }

    /// The transport response, if the exchange completed.
    pub fn result(&self) -> Option<&reqwest::Response> {
        self.outcome.as_ref().ok().or(self.attached.as_ref())
    }

    /// Status of the transport response.
    pub fn status(&self) -> Option<StatusCode> {
        self.result().map(reqwest::Response::status)
    }

    /// Whether no error has been recorded.
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Split into the error and the transport response.
    pub fn into_parts(self) -> (Option<RequestError>, Option<reqwest::Response>) {
        match self.outcome {
            Ok(response) => (None, Some(response)),
            Err(error) => (Some(error), self.attached),
        }
    }

    /// The transport response, or the recorded error.
    pub fn into_result(self) -> Result<reqwest::Response> {
        self.outcome
    }

    /// Read the whole body as UTF-8 text.
    ///
    /// A recorded error is returned as-is without touching the body. The
    /// body is consumed, and so released, whatever the outcome of the read.
    /// Bytes that are not valid UTF-8 fail with [`RequestError::BodyDecode`].
    pub async fn text(self) -> Result<String> {
        let response = self.into_result()?;
        let bytes = response.bytes().await.map_err(RequestError::BodyRead)?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    /// Record an error unless the status equals `expected`.
    ///
    /// The response stays attached either way so callers can still inspect
    /// what the server sent.
    pub fn check_status(self, expected: StatusCode) -> Self {
        match self.outcome {
            Ok(response) if response.status() != expected => {
                let status = response.status();
                debug!(status = %status, expected = %expected, "Unexpected HTTP status");
                Self {
                    outcome: Err(RequestError::UnexpectedStatus { status, expected }),
                    attached: Some(response),
                }
            }
            outcome => Self {
                outcome,
                attached: self.attached,
            },
        }
    }

    /// Wrap the body in a [`SeekableBody`] sized by the reported content length.
    pub fn into_seekable(self) -> Result<SeekableBody> {
        let response = self.into_result()?;
        Ok(SeekableBody::from_response(response))
    }
}

impl From<reqwest::Response> for Response {
    fn from(response: reqwest::Response) -> Self {
        Self::from_result(response)
    }
}

impl From<RequestError> for Response {
    fn from(error: RequestError) -> Self {
        Self::from_error(error)
    }
}
