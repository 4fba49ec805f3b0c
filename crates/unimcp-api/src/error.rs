use thiserror::Error;

/// Top-level error type for the `unimcp-api` crate.
///
/// Covers every failure mode of the controller client: authentication,
/// transport, Integration API, and the legacy envelope.
/// `unimcp-core` maps these into `CoreError`.
#[derive(Debug, Error)]
pub enum Error {
    /// Authentication rejected for a reason other than a bad key.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The controller answered 401 to the `X-API-KEY` header.
    #[error("Invalid API key")]
    InvalidApiKey,

    /// Anything reqwest reports: connect, DNS, timeout, body read.
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Client construction failed, usually a bad CA file.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Non-2xx from a `v1` endpoint. `code` comes from the `{code, message}` body.
    #[error("controller returned HTTP {status}: {message}")]
    Integration {
        message: String,
        code: Option<String>,
        status: u16,
    },

    /// A lookup that the API answers with an empty result rather than a 404.
    #[error("{resource} '{identifier}' not found")]
    NotFound {
        resource: &'static str,
        identifier: String,
    },

    /// An id or MAC that cannot be placed into a request as given.
    #[error("invalid {field}: {value:?}")]
    InvalidIdentifier { field: &'static str, value: String },

    /// `meta.rc` was not `ok` in a legacy reply.
    #[error("legacy endpoint error: {message}")]
    LegacyApi { message: String },

    /// A reply did not match the expected shape. `body` keeps the raw text.
    #[error("unexpected response body: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the controller rejected our credentials.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::InvalidApiKey)
    }

    /// HTTP 404, or an empty filtered lookup.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Integration { status, .. } => *status == 404,
            Self::NotFound { .. } => true,
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            _ => false,
        }
    }

    pub fn api_error_code(&self) -> Option<&str> {
        match self {
            Self::Integration { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_not_found() {
        let err = Error::Integration {
            message: "missing".into(),
            code: Some("api.not-found".into()),
            status: 404,
        };
        assert!(err.is_not_found());
        assert_eq!(err.api_error_code(), Some("api.not-found"));

        let err = Error::NotFound {
            resource: "client",
            identifier: "aa:bb".into(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "client 'aa:bb' not found");
    }

    #[test]
    fn classifies_auth_errors() {
        assert!(Error::InvalidApiKey.is_auth_error());
        assert!(!Error::LegacyApi {
            message: "rc=error".into()
        }
        .is_auth_error());
    }
}
