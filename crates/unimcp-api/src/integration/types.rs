//! Integration API wire types.
//!
//! Only the shapes this crate has to look inside are typed. Everything
//! else is passed through as opaque JSON.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Pagination ───────────────────────────────────────────────────────

/// Generic pagination wrapper returned by all list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default)]
    pub offset: i64,
    #[serde(default)]
    pub limit: i32,
    #[serde(default)]
    pub count: i32,
    /// Zero when the controller omits it; pagination then ignores it.
    #[serde(default)]
    pub total_count: i64,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

// ── Sites ────────────────────────────────────────────────────────────

/// Site overview, from `GET /v1/sites`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteResponse {
    pub id: Uuid,
    pub name: String,
    /// Used as the Legacy API site name (`/api/s/{internalReference}/`).
    pub internal_reference: String,
}

// ── Site-scoped resources ────────────────────────────────────────────

/// Every site-scoped collection the tool server reads or writes.
///
/// Each maps to `v1/sites/{siteId}/{path}`; single items live at
/// `{path}/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteResource {
    Devices,
    DeviceTags,
    Clients,
    Networks,
    WifiBroadcasts,
    FirewallZones,
    AclRules,
    HotspotVouchers,
    TrafficMatchingLists,
    VpnServers,
    VpnTunnels,
    Wans,
    RadiusProfiles,
}

impl SiteResource {
    pub fn path(self) -> &'static str {
        match self {
            Self::Devices => "devices",
            Self::DeviceTags => "devices/tags",
            Self::Clients => "clients",
            Self::Networks => "networks",
            Self::WifiBroadcasts => "wifi/broadcasts",
            Self::FirewallZones => "firewall/zones",
            Self::AclRules => "acl-rules",
            Self::HotspotVouchers => "hotspot/vouchers",
            Self::TrafficMatchingLists => "traffic-matching-lists",
            Self::VpnServers => "vpn/servers",
            Self::VpnTunnels => "vpn/tunnels",
            Self::Wans => "wans",
            Self::RadiusProfiles => "radius/profiles",
        }
    }
}
