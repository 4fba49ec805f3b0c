// HTTP client construction.
//
// Platform probing and the Integration client both build their
// `reqwest::Client` here so they agree on TLS, timeout and user agent.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::HeaderMap;

use crate::error::Error;

const USER_AGENT: &str = concat!("unimcp/", env!("CARGO_PKG_VERSION"));

/// How server certificates are checked.
#[derive(Debug, Clone)]
pub enum TlsMode {
    /// Platform trust roots.
    System,
    /// Add this PEM file as an extra trust root.
    CustomCa(PathBuf),
    /// No verification. Consoles ship self-signed certificates.
    DangerAcceptInvalid,
}

/// TLS mode and per-request timeout for every controller request.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::DangerAcceptInvalid,
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        self.build_client_with_headers(HeaderMap::new())
    }

    /// Like [`build_client`](Self::build_client), with headers sent on
    /// every request (the Integration client's `X-API-KEY`).
    pub fn build_client_with_headers(&self, headers: HeaderMap) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers);

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let pem = std::fs::read(path).map_err(|e| {
                    Error::Tls(format!("failed to read CA cert {}: {e}", path.display()))
                })?;
                let root = reqwest::Certificate::from_pem(&pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(root);
            }
            TlsMode::DangerAcceptInvalid => builder = builder.danger_accept_invalid_certs(true),
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_ca_file_is_a_tls_error() {
        let config = TransportConfig {
            tls: TlsMode::CustomCa(PathBuf::from("/nonexistent/unimcp-ca.pem")),
            timeout: Duration::from_secs(5),
        };
        match config.build_client() {
            Err(Error::Tls(msg)) => assert!(msg.contains("failed to read CA cert"), "{msg}"),
            other => panic!("expected Tls error, got: {other:?}"),
        }
    }

    #[test]
    fn default_accepts_self_signed() {
        let config = TransportConfig::default();
        assert!(matches!(config.tls, TlsMode::DangerAcceptInvalid));
        assert!(config.build_client().is_ok());
    }
}
