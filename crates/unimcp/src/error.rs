//! Startup error types with miette diagnostics.
//!
//! Protocol-level failures never reach here; they become JSON-RPC errors or
//! tool error envelopes. These cover what stops the process from serving.

use miette::Diagnostic;
use thiserror::Error;

use unimcp_config::ConfigError;
use unimcp_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum McpError {
    #[error("Could not connect to controller at {url}: {reason}")]
    #[diagnostic(
        code(unimcp::connection_failed),
        help(
            "Check that the controller is running and accessible.\n\
             Self-signed certificate? Try --insecure (-k)."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(unimcp::auth_failed),
        help("Create an API key under Settings > Integrations on your controller.")
    )]
    AuthFailed { message: String },

    #[error("No API key configured for profile '{profile}'")]
    #[diagnostic(
        code(unimcp::no_credentials),
        help(
            "Pass --api-key, set UNIFI_API_KEY, or add api_key / api_key_env\n\
             to the profile in {path}."
        )
    )]
    NoCredentials { profile: String, path: String },

    #[error("No controller configured")]
    #[diagnostic(
        code(unimcp::no_controller),
        help("Pass --controller and --api-key, or create a profile in {path}.")
    )]
    NoController { path: String },

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(code(unimcp::profile_not_found), help("Profiles are read from {path}."))]
    ProfileNotFound { name: String, path: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(unimcp::validation))]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(code(unimcp::config))]
    Config(Box<ConfigError>),

    #[error(transparent)]
    #[diagnostic(code(unimcp::controller))]
    Controller(CoreError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl McpError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NoController { .. } | Self::ProfileNotFound { .. } | Self::Validation { .. } => {
                exit_code::USAGE
            }
            Self::Config(_) | Self::Controller(_) | Self::Io(_) | Self::Json(_) => {
                exit_code::GENERAL
            }
        }
    }

    /// Attach the config file path to errors whose help text points at it.
    pub fn from_config(err: ConfigError, path: &std::path::Path) -> Self {
        let path = path.display().to_string();
        match err {
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile, path },
            ConfigError::NoController => Self::NoController { path },
            ConfigError::UnknownProfile { name } => Self::ProfileNotFound { name, path },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other @ ConfigError::Figment(_) => Self::Config(Box::new(other)),
        }
    }
}

impl From<CoreError> for McpError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::AuthenticationFailed { message } => Self::AuthFailed { message },
            other => Self::Controller(other),
        }
    }
}
