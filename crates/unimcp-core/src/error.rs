// ── Core error types ──
//
// `CoreError` is what the controller seam reports. Tool handlers never
// surface it raw: they wrap it into a `ToolError` envelope with an
// operation-specific message. The `From<unimcp_api::Error>` impl
// translates transport-layer errors into domain variants.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to controller at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Controller request timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("no sites available")]
    NoSitesAvailable,

    #[error("{entity_type} '{identifier}' not found")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    /// An argument the controller client cannot send as given.
    #[error("{message}")]
    InvalidArgument { message: String },

    // ── Dispatch errors ──────────────────────────────────────────────
    #[error("tool '{name}' not found")]
    ToolNotFound { name: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// The API-specific error code (e.g., "api.authentication.missing-credentials").
        code: Option<String>,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<unimcp_api::Error> for CoreError {
    fn from(err: unimcp_api::Error) -> Self {
        match err {
            unimcp_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            unimcp_api::Error::InvalidApiKey => CoreError::AuthenticationFailed {
                message: "Invalid API key".into(),
            },
            unimcp_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        code: None,
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            unimcp_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            unimcp_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            unimcp_api::Error::Integration {
                message,
                code,
                status,
            } => CoreError::Api {
                message,
                code,
                status: Some(status),
            },
            unimcp_api::Error::NotFound {
                resource,
                identifier,
            } => CoreError::NotFound {
                entity_type: resource.to_owned(),
                identifier,
            },
            err @ unimcp_api::Error::InvalidIdentifier { .. } => CoreError::InvalidArgument {
                message: err.to_string(),
            },
            unimcp_api::Error::LegacyApi { message } => CoreError::Api {
                message,
                code: None,
                status: None,
            },
            unimcp_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

// ── Tool error envelope ──────────────────────────────────────────────

/// Error envelope returned to the caller of a tool.
///
/// `message` says which step failed ("Failed to get devices"), `cause`
/// carries the underlying error text when there is one. Validation
/// failures have no cause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

impl ToolError {
    /// A local input error with no underlying cause.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    /// `"<arg> is required"`
    pub fn required(arg: &str) -> Self {
        Self::invalid_argument(format!("{arg} is required"))
    }

    /// `"<arg> must be an object"`
    pub fn not_object(arg: &str) -> Self {
        Self::invalid_argument(format!("{arg} must be an object"))
    }

    /// Adapter for `map_err`: attach `message` to a collaborator failure.
    pub fn wrap(message: &'static str) -> impl FnOnce(CoreError) -> Self {
        move |err| Self {
            message: message.to_owned(),
            cause: Some(err.to_string()),
        }
    }
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}: {cause}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ToolError {}
