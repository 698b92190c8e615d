//! Error types for examprep-client
//!
//! This module provides the error taxonomy for the client:
//! - Transport failures (the request never reached the server)
//! - HTTP failures (the server answered with a non-success status)
//! - Local failures (malformed stored session, I/O, invalid input)
//!
//! It also maps errors to the human-readable text shown to users.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for examprep-client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Message shown for a 401 response without a server-provided message
pub const MSG_UNAUTHORIZED: &str = "Please log in again";

/// Message shown for a 413 response without a server-provided message
pub const MSG_TOO_LARGE: &str = "File too large (max 10MB)";

/// Main error type for examprep-client
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "api.base_url")
        key: Option<String>,
    },

    /// The request never reached the server (DNS, connect, TLS, timeout)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server responded with a failure status
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code returned by the server
        status: u16,
        /// Server-provided message, or the canonical reason phrase
        message: String,
        /// Whether `message` came from the response body
        from_server: bool,
    },

    /// Stored session data could not be parsed
    #[error("parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A path could not be joined onto the base URL
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// File type not accepted for upload
    #[error("unsupported file type: {0}")]
    UnsupportedFile(String),

    /// Caller supplied input that fails local validation
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Article (or other resource) not present in the local collection
    #[error("not found: {0}")]
    NotFound(String),

    /// The same logical action is already in flight
    #[error("busy: {0}")]
    Busy(String),
}

/// Error body returned by the remote service
///
/// The service is not consistent about the field name; both `message` and
/// `error` are seen in practice.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Primary message field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Alternate message field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorBody {
    /// The first non-blank message, preferring `message` over `error`
    pub fn best_message(&self) -> Option<&str> {
        [self.message.as_deref(), self.error.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|m| !m.is_empty())
    }
}

impl Error {
    /// Build an HTTP error from a status and the raw response body
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let server_message = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.best_message().map(str::to_string));

        match server_message {
            Some(message) => Error::Http {
                status,
                message,
                from_server: true,
            },
            None => Error::Http {
                status,
                message: reqwest::StatusCode::from_u16(status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("request failed")
                    .to_string(),
                from_server: false,
            },
        }
    }

    /// HTTP status code for errors the server answered
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } => Some(*status),
            Error::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Network(_) => "network_error",
            Error::Http { status: 401, .. } => "unauthorized",
            Error::Http { status: 413, .. } => "payload_too_large",
            Error::Http { .. } => "http_error",
            Error::Parse(_) => "parse_error",
            Error::Serialization(_) => "serialization_error",
            Error::Io(_) => "io_error",
            Error::InvalidUrl(_) => "invalid_url",
            Error::UnsupportedFile(_) => "unsupported_file",
            Error::InvalidInput(_) => "invalid_input",
            Error::NotFound(_) => "not_found",
            Error::Busy(_) => "busy",
        }
    }

    /// Text suitable for showing to the user
    ///
    /// Preference order: server-provided message, status hint for 401/413,
    /// then `fallback` (e.g. "Upload failed").
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Error::Http {
                message,
                from_server: true,
                ..
            } => message.clone(),
            Error::Http { status: 401, .. } => MSG_UNAUTHORIZED.to_string(),
            Error::Http { status: 413, .. } => MSG_TOO_LARGE.to_string(),
            Error::UnsupportedFile(_) | Error::InvalidInput(_) | Error::Busy(_) => self.to_string(),
            _ => fallback.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_response_prefers_message_field() {
        let err = Error::from_response(400, br#"{"message":"Title required","error":"x"}"#);
        assert_eq!(err.status_code(), Some(400));
        assert_eq!(err.user_message("Save failed"), "Title required");
    }

    #[test]
    fn from_response_falls_back_to_error_field() {
        let err = Error::from_response(500, br#"{"error":"boom"}"#);
        assert_eq!(err.user_message("Save failed"), "boom");
    }

    #[test]
    fn blank_message_is_ignored() {
        let err = Error::from_response(500, br#"{"message":"  ","error":"disk full"}"#);
        assert_eq!(err.user_message("Save failed"), "disk full");
    }

    #[test]
    fn non_json_body_uses_reason_phrase() {
        let err = Error::from_response(404, b"<html>nope</html>");
        match &err {
            Error::Http {
                message,
                from_server,
                ..
            } => {
                assert_eq!(message, "Not Found");
                assert!(!from_server);
            }
            other => panic!("expected Http error, got {other:?}"),
        }
        assert_eq!(err.user_message("Failed to load uploads"), "Failed to load uploads");
    }

    #[test]
    fn unauthorized_without_body_hints_relogin() {
        let err = Error::from_response(401, b"");
        assert_eq!(err.error_code(), "unauthorized");
        assert_eq!(err.user_message("Upload failed"), MSG_UNAUTHORIZED);
    }

    #[test]
    fn payload_too_large_hint() {
        let err = Error::from_response(413, b"");
        assert_eq!(err.error_code(), "payload_too_large");
        assert_eq!(err.user_message("Upload failed"), MSG_TOO_LARGE);
    }

    #[test]
    fn server_message_beats_status_hint() {
        let err = Error::from_response(401, br#"{"message":"Invalid credentials"}"#);
        assert_eq!(err.user_message("Login failed"), "Invalid credentials");
    }

    #[test]
    fn local_errors_use_fallback() {
        let err = Error::Parse("bad json".into());
        assert_eq!(err.status_code(), None);
        assert_eq!(err.user_message("Login failed"), "Login failed");
    }

    #[test]
    fn validation_errors_show_their_own_text() {
        let err = Error::UnsupportedFile("notes.exe".into());
        assert_eq!(
            err.user_message("Upload failed"),
            "unsupported file type: notes.exe"
        );
    }
}
