//! Error types for the Asana client.
//!
//! # Design
//! Every failure surfaces as one `Error`: an `Api` error (the server answered
//! with a non-2xx status), a `Transport` error (no usable response came back),
//! or `InvalidInput` (the call was refused before sending). Callers
//! pattern-match instead of probing.
//!
//! Classification of `ApiError` reads only the numeric status code, never the
//! message text. Nothing here retries; the predicates and `retry_after` are
//! inputs for whatever retry policy the caller runs.

use std::time::Duration;

use serde::Deserialize;

use crate::http::HttpResponse;

/// Wait suggested by `retry_after` for anything that is not a rate limit.
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Message used when the response carries no structured error entry.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

/// Top-level error returned by every client operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The API received the request and rejected it.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The request never produced a usable response.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Rejected before anything was sent.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Failures below the API: nothing to classify because there is no status.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("failed to encode request body")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode response body")]
    Decode(#[source] serde_json::Error),

    #[error("invalid URL")]
    InvalidUrl(#[from] url::ParseError),

    /// Raised by scripted transports to simulate a dropped connection.
    #[error("{0}")]
    Scripted(String),
}

/// How the `Retry-After` header is turned into a duration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RetryAfterPolicy {
    /// Parse the header as base-10 whole seconds.
    #[default]
    Seconds,
    /// Never populate `retry_after`; rate-limited errors report zero.
    Ignore,
}

/// A failed remote call as described by the API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{request_id} {status_code}: {message}")]
pub struct ApiError {
    pub status_code: u16,
    /// Status line, e.g. `"429 Too Many Requests"`.
    pub kind: String,
    pub message: String,
    pub phrase: String,
    pub help: String,
    pub request_id: String,
    pub retry_after: Option<Duration>,
}

/// Error body shape: `{"errors": [{"message", "phrase", "help"}]}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorPayload {
    #[serde(default)]
    pub errors: Vec<ErrorEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorEntry {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub phrase: String,
    #[serde(default)]
    pub help: String,
}

impl ErrorPayload {
    /// Decode an error body, treating anything unreadable as "no payload".
    pub fn parse(body: &[u8]) -> Option<Self> {
        serde_json::from_slice(body).ok()
    }
}

impl ApiError {
    /// Classify a non-2xx response.
    ///
    /// The first payload entry supplies the message; without one the message
    /// is `"Unknown error"`. A missing or malformed `Retry-After` header
    /// leaves `retry_after` unset and never fails classification.
    pub fn from_response(
        response: &HttpResponse,
        payload: Option<&ErrorPayload>,
        request_id: impl Into<String>,
        policy: RetryAfterPolicy,
    ) -> Self {
        let entry = payload.and_then(|p| p.errors.first());
        let (message, phrase, help) = match entry {
            Some(entry) => (
                entry.message.clone(),
                entry.phrase.clone(),
                entry.help.clone(),
            ),
            None => (UNKNOWN_ERROR_MESSAGE.to_string(), String::new(), String::new()),
        };

        Self {
            status_code: response.status,
            kind: response.status_line(),
            message,
            phrase,
            help,
            request_id: request_id.into(),
            retry_after: parse_retry_after(response, policy),
        }
    }

    /// Server-side fault; the same request may succeed later.
    pub fn is_recoverable(&self) -> bool {
        self.status_code / 100 == 5
    }

    /// Client-side fault; retrying the same request will not help.
    pub fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code == 404
    }

    pub fn is_auth_error(&self) -> bool {
        self.status_code == 401
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status_code == 429
    }

    pub fn is_payload_too_large(&self) -> bool {
        self.status_code == 413
    }

    /// How long to wait before retrying.
    ///
    /// Rate-limited errors report the server's `Retry-After` (zero if it was
    /// absent); everything else gets `DEFAULT_RETRY_AFTER`.
    pub fn retry_after(&self) -> Duration {
        if self.is_rate_limited() {
            self.retry_after.unwrap_or_default()
        } else {
            DEFAULT_RETRY_AFTER
        }
    }
}

impl Error {
    /// The typed API error, if the remote API produced one.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) => Some(err),
            Error::Transport(_) | Error::InvalidInput(_) => None,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        self.api_error().is_some_and(ApiError::is_recoverable)
    }

    pub fn is_fatal(&self) -> bool {
        self.api_error().is_some_and(ApiError::is_fatal)
    }

    pub fn is_not_found(&self) -> bool {
        self.api_error().is_some_and(ApiError::is_not_found)
    }

    pub fn is_auth_error(&self) -> bool {
        self.api_error().is_some_and(ApiError::is_auth_error)
    }

    pub fn is_rate_limited(&self) -> bool {
        self.api_error().is_some_and(ApiError::is_rate_limited)
    }

    pub fn is_payload_too_large(&self) -> bool {
        self.api_error().is_some_and(ApiError::is_payload_too_large)
    }

    pub fn retry_after(&self) -> Duration {
        self.api_error()
            .map_or(DEFAULT_RETRY_AFTER, ApiError::retry_after)
    }
}

fn parse_retry_after(response: &HttpResponse, policy: RetryAfterPolicy) -> Option<Duration> {
    match policy {
        RetryAfterPolicy::Ignore => None,
        RetryAfterPolicy::Seconds => response
            .header("retry-after")
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map(Duration::from_secs),
    }
}

/// A specialized Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;
