use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// The platform type of the UniFi controller.
///
/// Determines the URL prefixes of both API surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerPlatform {
    /// UniFi OS device (UDM, UCG, etc.) -- port 443, `/proxy/network/` prefix.
    UnifiOs,
    /// Standalone Network Application (Java) -- port 8443, no prefix.
    ClassicController,
}

impl ControllerPlatform {
    /// The path prefix for legacy API endpoints.
    pub fn legacy_prefix(self) -> &'static str {
        match self {
            Self::UnifiOs => "/proxy/network",
            Self::ClassicController => "",
        }
    }

    /// The path prefix for the Integration API.
    ///
    /// On UniFi OS devices: `/proxy/network/integration`
    /// On standalone controllers: `/integration`
    pub fn integration_prefix(self) -> &'static str {
        match self {
            Self::UnifiOs => "/proxy/network/integration",
            Self::ClassicController => "/integration",
        }
    }

    /// Auto-detect the controller platform by probing login endpoints.
    ///
    /// Tries the UniFi OS endpoint first (`/api/auth/login`). If it
    /// responds with anything but 404, we're on UniFi OS. Otherwise falls
    /// back to the standalone login path, which must at least answer.
    pub async fn detect(base_url: &Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;

        let unifi_os_url = base_url.join("/api/auth/login")?;
        debug!("probing UniFi OS at {unifi_os_url}");

        if let Ok(resp) = http.get(unifi_os_url).send().await {
            // UniFi OS answers this path (even 401/405); classic controllers don't.
            if resp.status() != reqwest::StatusCode::NOT_FOUND {
                debug!("detected UniFi OS platform");
                return Ok(Self::UnifiOs);
            }
        }

        let standalone_url = base_url.join("/api/login")?;
        debug!("probing standalone at {standalone_url}");

        http.get(standalone_url).send().await?;
        debug!("detected standalone (classic) controller");
        Ok(Self::ClassicController)
    }
}
