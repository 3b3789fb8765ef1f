//! Error taxonomy for the portal client.
//!
//! Every backend failure is classified into exactly one user-facing
//! category by status code. Only an authorization-denied status is ever
//! retried (once, via refresh); everything else surfaces to the caller
//! unchanged so the view layer can present it.

use reqwest::StatusCode;

use crate::store::StoreError;

/// Errors surfaced by [`PortalClient`](crate::http::PortalClient) calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 400 -- the request was malformed.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 401 -- authentication required or rejected, and refresh was not
    /// applicable (anonymous call, or the retried request failed again).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 403 on a call not eligible for refresh. Not recoverable.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// 404.
    #[error("Not found: {0}")]
    NotFound(String),

    /// 409.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 422 -- the backend rejected field values.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// 429.
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Any 5xx.
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// A status code outside the known taxonomy.
    #[error("Unexpected response ({status}): {body}")]
    Unexpected { status: u16, body: String },

    /// The request exceeded the fixed per-request timeout.
    #[error("Request timed out")]
    Timeout,

    /// Transport-level failure (DNS, connection refused, offline).
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The response body did not match the expected shape.
    #[error("Malformed response: {0}")]
    Decode(String),

    /// The session is terminally expired: the refresh token was rejected.
    /// Stored credentials have already been cleared and the session-expired
    /// hook fired by the time this is returned.
    #[error("Session expired: {0}")]
    SessionExpired(String),

    /// Durable client-side storage failed.
    #[error("Session store error: {0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    /// Classify a non-2xx response status into its taxonomy variant.
    ///
    /// `message` is the best-effort human-readable message extracted from
    /// the response body.
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::BAD_REQUEST => ApiError::BadRequest(message),
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized(message),
            StatusCode::FORBIDDEN => ApiError::Forbidden(message),
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            StatusCode::CONFLICT => ApiError::Conflict(message),
            StatusCode::UNPROCESSABLE_ENTITY => ApiError::Validation(message),
            StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited(message),
            s if s.is_server_error() => ApiError::Server {
                status: s.as_u16(),
                message,
            },
            s => ApiError::Unexpected {
                status: s.as_u16(),
                body: message,
            },
        }
    }

    /// Extract a human-readable message from an error response body.
    ///
    /// The backend wraps errors as `{"error": {"code", "message"}}`; older
    /// versions send a bare `{"message"}`. Anything else is passed through
    /// as raw text.
    pub fn message_from_body(body: &str) -> String {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
            if let Some(message) = value
                .pointer("/error/message")
                .or_else(|| value.pointer("/message"))
                .and_then(|m| m.as_str())
            {
                return message.to_string();
            }
        }
        body.to_string()
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err)
        }
    }
}
