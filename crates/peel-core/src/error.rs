//! Error types for the peel client.
//!
//! This module provides a unified error type with explicit variants for
//! transport, authentication, API and input validation errors.

use std::fmt;
use thiserror::Error;

use crate::payload::ErrorPayload;

/// The unified error type for peel operations.
///
/// Every variant renders a human-readable message through `Display`. For
/// backend rejections ([`Error::Api`]) that message is the normalized
/// error text, ready to be shown next to a form.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (connection, timeout, malformed HTTP).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication errors that could not be recovered by a refresh.
    #[error("{0}")]
    Auth(#[from] AuthError),

    /// The backend answered with a non-success status.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// Input validation errors (bad base URL, bad header value).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// A JSON body could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading or writing persisted credentials failed.
    #[error("credential storage error: {message}")]
    Storage { message: String },
}

impl Error {
    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Returns true if the session is gone and the user must log in again.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Error::Auth(err) if err.is_terminal())
    }

    /// Returns the HTTP status of a backend rejection, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api(err) => Some(err.status),
            _ => None,
        }
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Authentication failures that survive the refresh-and-retry cycle.
///
/// Cloneable so a single refresh outcome can be fanned out to every
/// request waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The refresh token was rejected; credentials have been cleared.
    #[error("Session expired. Please login again.")]
    SessionExpired,

    /// A refresh was needed but the store holds no refresh token.
    #[error("no refresh token available")]
    MissingRefreshToken,

    /// The refresh call did not settle in time.
    #[error("token refresh timed out after {duration_ms}ms")]
    RefreshTimedOut { duration_ms: u64 },

    /// The refresh call could not be completed (network failure, malformed
    /// response). Credentials are kept.
    #[error("token refresh failed: {message}")]
    RefreshFailed { message: String },

    /// The task performing the refresh went away before settling it.
    #[error("token refresh was abandoned before completing")]
    RefreshAborted,
}

impl AuthError {
    /// Returns true if the stored credentials can no longer be used.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AuthError::SessionExpired | AuthError::MissingRefreshToken)
    }
}

/// A non-success response from the backend.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,
    /// The decoded error payload.
    pub payload: ErrorPayload,
    message: String,
}

impl ApiError {
    /// Create an API error, normalizing the payload into a message.
    pub fn new(status: u16, payload: ErrorPayload) -> Self {
        let message = payload.message();
        Self {
            status,
            payload,
            message,
        }
    }

    /// The normalized, human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Check if this is a 4xx validation-style rejection.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// Check if this is a 5xx server failure.
    pub fn is_server_error(&self) -> bool {
        self.status >= 500
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        self.status == 401
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ApiError {}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API base URL '{value}': {reason}")]
    BaseUrl { value: String, reason: String },

    /// A token contains characters that cannot be sent in a header.
    #[error("token is not a valid header value")]
    Token,

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn api_error_displays_normalized_message() {
        let payload = ErrorPayload::from_value(&json!({"detail": "Not found."}));
        let err = Error::from(ApiError::new(404, payload));
        assert_eq!(err.to_string(), "Not found.");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn session_expired_message() {
        let err = Error::from(AuthError::SessionExpired);
        assert!(err.is_session_expired());
        assert_eq!(err.to_string(), "Session expired. Please login again.");
    }

    #[test]
    fn status_classification() {
        let err = ApiError::new(400, ErrorPayload::Empty);
        assert!(err.is_client_error());
        assert!(!err.is_server_error());

        let err = ApiError::new(502, ErrorPayload::Empty);
        assert!(err.is_server_error());
        assert_eq!(err.message(), "An error occurred. Please try again.");
    }
}
