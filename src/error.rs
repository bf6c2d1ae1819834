//! Error types for malsaem-mcp.
//!
//! # Security Note
//!
//! Error messages NEVER include the dictionary API key. The key only ever
//! travels in the outbound query string, and no variant carries the URL.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed.
    #[error("failed to parse configuration file: {path}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    NotFound {
        /// Path where the configuration file was expected.
        path: PathBuf,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation failure.
        message: String,
    },

    /// No dictionary API key was supplied.
    #[error("MALSAEM_API_KEY environment variable is not set")]
    MissingApiKey,
}

/// Closed set of failure categories for a dictionary search.
///
/// Transports pick JSON-RPC codes and HTTP statuses from this tag alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input, rejected before any network I/O.
    Validation,
    /// The API key is invalid or has not been approved.
    Auth,
    /// The daily upstream quota is exhausted.
    RateLimit,
    /// The upstream answered 2xx with something that is not a JSON object.
    Format,
    /// The upstream reported an application-level error.
    Api,
    /// The upstream answered with a non-2xx status.
    Request,
    /// The upstream could not be reached at all.
    Network,
}

impl ErrorKind {
    /// JSON-RPC error code for this failure when it escapes a handler as a
    /// protocol error. `search_word` reports its own failures as tool results.
    #[must_use]
    pub const fn rpc_code(self) -> i32 {
        match self {
            Self::RateLimit => -32001,
            Self::Auth => -32002,
            _ => -32000,
        }
    }

    /// HTTP status used by edge `/search`.
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::RateLimit => 429,
            Self::Auth => 401,
            Self::Validation => 400,
            _ => 500,
        }
    }
}

/// Errors returned by a dictionary search.
#[derive(Error, Debug)]
pub enum SearchError {
    /// A query parameter is out of range or missing.
    #[error("invalid search parameters: {message}")]
    Validation {
        /// Which parameter failed and why.
        message: String,
    },

    /// The upstream rejected the API key.
    #[error("dictionary API authentication failed: {message}. Check the API key")]
    Auth {
        /// Upstream message, or a description of the HTML error page.
        message: String,
    },

    /// HTTP 429 from the upstream.
    #[error(
        "dictionary API rate limit exceeded: the daily quota of 50,000 requests has been reached, try again tomorrow"
    )]
    RateLimit,

    /// The upstream returned a 2xx body that is not a JSON object.
    #[error("unexpected response format from dictionary API (content-type: {content_type})")]
    Format {
        /// `Content-Type` header of the response, empty if absent.
        content_type: String,
    },

    /// The upstream returned an `error` object.
    #[error("dictionary API error ({code}): {message}")]
    Api {
        /// Upstream error code.
        code: String,
        /// Upstream error message.
        message: String,
    },

    /// Any other non-2xx response.
    #[error("dictionary API request failed: {status} {reason}\n{body}")]
    Request {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase for the status.
        reason: String,
        /// First 200 characters of the response body.
        body: String,
    },

    /// The request could not be sent or the body could not be read.
    #[error("failed to reach dictionary API: {0}")]
    Network(#[source] reqwest::Error),
}

impl SearchError {
    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Returns the category tag for this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Auth { .. } => ErrorKind::Auth,
            Self::RateLimit => ErrorKind::RateLimit,
            Self::Format { .. } => ErrorKind::Format,
            Self::Api { .. } => ErrorKind::Api,
            Self::Request { .. } => ErrorKind::Request,
            Self::Network(_) => ErrorKind::Network,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let error = ConfigError::NotFound {
            path: PathBuf::from("/path/to/config.json"),
        };
        let msg = error.to_string();
        assert!(msg.contains("not found"));
        assert!(msg.contains("config.json"));
    }

    #[test]
    fn validation_error_display() {
        let error = ConfigError::ValidationError {
            message: "invalid setting".to_string(),
        };
        let msg = error.to_string();
        assert!(msg.contains("invalid setting"));
    }

    #[test]
    fn kind_maps_to_rpc_codes() {
        assert_eq!(SearchError::RateLimit.kind().rpc_code(), -32001);
        let auth = SearchError::Auth {
            message: "unregistered key".to_string(),
        };
        assert_eq!(auth.kind().rpc_code(), -32002);
        let api = SearchError::Api {
            code: "100".to_string(),
            message: "bad".to_string(),
        };
        assert_eq!(api.kind().rpc_code(), -32000);
    }

    #[test]
    fn kind_maps_to_http_status() {
        assert_eq!(ErrorKind::RateLimit.http_status(), 429);
        assert_eq!(ErrorKind::Auth.http_status(), 401);
        assert_eq!(ErrorKind::Validation.http_status(), 400);
        assert_eq!(ErrorKind::Format.http_status(), 500);
        assert_eq!(ErrorKind::Request.http_status(), 500);
    }

    #[test]
    fn request_error_carries_status_and_body() {
        let error = SearchError::Request {
            status: 503,
            reason: "Service Unavailable".to_string(),
            body: "maintenance".to_string(),
        };
        let msg = error.to_string();
        assert!(msg.contains("503 Service Unavailable"));
        assert!(msg.ends_with("maintenance"));
    }
}
