//! Async HTTP client for the UniFi Network controller.
//!
//! Thin transport layer used by `unimcp-core`. It knows URL layout,
//! API-key authentication, pagination, and error envelopes, but not the
//! controller's resource schema: payloads travel as `serde_json::Value`.
//!
//! - **[`IntegrationClient`]**: Integration API (`/integration/v1/`),
//!   plus the handful of legacy endpoints that have no Integration
//!   equivalent (site health).
//! - **[`ControllerPlatform`]**: UniFi OS vs. classic controller URL layout,
//!   with [`ControllerPlatform::detect`] to probe it.
//! - **[`TransportConfig`]**: shared TLS / timeout settings.

pub mod error;
pub mod integration;
pub mod legacy;
pub mod platform;
pub mod transport;

pub use error::Error;
pub use integration::client::IntegrationClient;
pub use integration::types::{Page, SiteResource, SiteResponse};
pub use platform::ControllerPlatform;
pub use transport::{TlsMode, TransportConfig};
