// ── Connection settings ──
//
// Everything `connect()` needs to reach one controller. Loading and
// merging profiles is the config crate's job; this is the finished result.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// Certificate checking for controller requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// Platform trust roots only.
    SystemDefaults,
    /// Trust this PEM file in addition to the platform roots.
    CustomCa(PathBuf),
    /// Accept anything. Consoles ship self-signed certificates.
    #[default]
    DangerAcceptInvalid,
}

/// Which URL layout the controller uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlatformHint {
    /// Probe the controller at connect time.
    #[default]
    Auto,
    /// UniFi OS console (`/proxy/network/` prefix).
    UnifiOs,
    /// Standalone Network Application.
    Classic,
}

/// One controller, fully resolved.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Console or controller root, e.g. `https://192.168.1.1`.
    pub url: Url,
    /// Integration API key.
    pub api_key: SecretString,
    /// Site token used when a tool call omits `site_id`.
    pub site: Option<String>,
    pub platform: PlatformHint,
    pub tls: TlsVerification,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
}
