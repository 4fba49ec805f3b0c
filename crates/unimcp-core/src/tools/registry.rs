// ── Tool catalogue ──
//
// One `ToolName` variant per exposed tool. Names, descriptions, and
// argument schemas live here; behavior lives in `handlers`. The registry is
// built once on first use and never mutated.

use std::sync::LazyLock;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value, json};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Every tool the server exposes, in catalogue order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum ToolName {
    // Network management
    GetNetworkSites,
    GetNetworkDevices,
    GetDeviceDetailed,
    GetDeviceStats,
    GetNetworkInfo,
    GetPendingDevices,
    // WiFi
    GetWifiNetworks,
    GetWifiNetworkDetailed,
    GetWifiBroadcasts,
    // Clients
    GetNetworkClients,
    GetClientDetailed,
    GetClientStats,
    // Health
    GetSiteHealth,
    CheckNetworkEndpointHealth,
    CheckProtectEndpointHealth,
    // Firewall & security
    GetFirewallZones,
    GetFirewallZoneDetailed,
    GetAclRules,
    GetAclRuleDetailed,
    GetHotspotVouchers,
    GetHotspotVoucherDetailed,
    GetTrafficRules,
    GetTrafficRuleDetailed,
    // VPN
    GetVpnServers,
    // Network configuration
    GetDeviceTags,
    GetWanConfig,
    GetRadiusProfiles,
    // DPI
    GetDpiCategories,
    GetDpiApps,
    GetDpiApplications,
    // Updates
    PatchWifiNetwork,
    PatchFirewallZone,
    PatchAclRule,
    PatchHotspotVoucher,
    PatchTrafficRule,
    // Creations
    CreateWifiNetwork,
    CreateFirewallZone,
    CreateAclRule,
    CreateHotspotVoucher,
    CreateTrafficRule,
    CreateVpnTunnel,
}

// ── Argument metadata ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum ParamKind {
    String,
    Integer,
    Object,
}

/// One declared argument. Purely descriptive: handlers do their own checks.
#[derive(Debug, Clone, Copy)]
pub struct Param {
    pub name: &'static str,
    pub kind: ParamKind,
    pub description: &'static str,
}

const fn string(name: &'static str, description: &'static str) -> Param {
    Param {
        name,
        kind: ParamKind::String,
        description,
    }
}

const fn object(name: &'static str, description: &'static str) -> Param {
    Param {
        name,
        kind: ParamKind::Object,
        description,
    }
}

const SITE: Param = string("site_id", "Site ID (optional, defaults to first site)");
const SETTINGS: Param = object("settings", "Settings to update (required)");

const SITE_ONLY: &[Param] = &[SITE];
const NONE: &[Param] = &[];

const DEVICE: &[Param] = &[SITE, string("device_id", "Device ID (required)")];
const CLIENT: &[Param] = &[SITE, string("mac", "Client MAC address (required)")];
const WIFI_NETWORK: &[Param] = &[SITE, string("network_id", "Network ID (required)")];
const FIREWALL_ZONE: &[Param] = &[
    SITE,
    string("firewall_zone_id", "Firewall zone ID (required)"),
];
const ACL_RULE: &[Param] = &[SITE, string("acl_rule_id", "ACL rule ID (required)")];
const VOUCHER: &[Param] = &[SITE, string("voucher_id", "Voucher ID (required)")];
const TRAFFIC_LIST: &[Param] = &[
    SITE,
    string(
        "traffic_matching_list_id",
        "Traffic matching list ID (required)",
    ),
];

const CLIENTS: &[Param] = &[
    SITE,
    Param {
        name: "limit",
        kind: ParamKind::Integer,
        description: "Limit (optional, default 25)",
    },
    Param {
        name: "offset",
        kind: ParamKind::Integer,
        description: "Offset (optional, default 0)",
    },
];

const PATCH_WIFI_NETWORK: &[Param] = &[
    SITE,
    string("network_id", "Network ID (required)"),
    SETTINGS,
];
const PATCH_ZONE: &[Param] = &[SITE, string("zone_id", "Zone ID (required)"), SETTINGS];
const PATCH_RULE: &[Param] = &[SITE, string("rule_id", "Rule ID (required)"), SETTINGS];
const PATCH_VOUCHER: &[Param] = &[
    SITE,
    string("voucher_id", "Voucher ID (required)"),
    SETTINGS,
];

const CREATE_WIFI_NETWORK: &[Param] = &[
    SITE,
    object("config", "WiFi network configuration (required)"),
];
const CREATE_ZONE: &[Param] = &[
    SITE,
    object("config", "Firewall zone configuration (required)"),
];
const CREATE_ACL_RULE: &[Param] = &[SITE, object("config", "ACL rule configuration (required)")];
const CREATE_VOUCHER: &[Param] = &[SITE, object("config", "Voucher configuration (required)")];
const CREATE_TRAFFIC_RULE: &[Param] = &[
    SITE,
    object("config", "Traffic rule configuration (required)"),
];
const CREATE_VPN_TUNNEL: &[Param] = &[
    SITE,
    object("config", "VPN tunnel configuration (required)"),
];

impl ToolName {
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::GetNetworkSites => "Get all sites from Unifi Network",
            Self::GetNetworkDevices => "Get all devices from Unifi Network",
            Self::GetDeviceDetailed => "Get detailed information about a specific device",
            Self::GetDeviceStats => "Get statistics for a specific device",
            Self::GetNetworkInfo => "Get UniFi Network application version and info",
            Self::GetPendingDevices => "Get devices pending adoption",
            Self::GetWifiNetworks => "Get WiFi networks from a site",
            Self::GetWifiNetworkDetailed => {
                "Get detailed information about a specific WiFi network"
            }
            Self::GetWifiBroadcasts => "Get WiFi broadcast SSIDs from a site",
            Self::GetNetworkClients => "Get network clients from a site",
            Self::GetClientDetailed => "Get detailed information about a specific client",
            Self::GetClientStats => "Get client statistics from a site",
            Self::GetSiteHealth => "Get health status of a site",
            Self::CheckNetworkEndpointHealth => "Check health status of the Unifi Network endpoint",
            Self::CheckProtectEndpointHealth => "Check health status of the Unifi Protect endpoint",
            Self::GetFirewallZones => "Get firewall zones from a site",
            Self::GetFirewallZoneDetailed => {
                "Get detailed information about a specific firewall zone"
            }
            Self::GetAclRules => "Get ACL rules from a site",
            Self::GetAclRuleDetailed => "Get detailed information about a specific ACL rule",
            Self::GetHotspotVouchers => "Get hotspot vouchers from a site",
            Self::GetHotspotVoucherDetailed => {
                "Get detailed information about a specific hotspot voucher"
            }
            Self::GetTrafficRules => "Get traffic rules from a site",
            Self::GetTrafficRuleDetailed => {
                "Get detailed information about a specific traffic matching rule"
            }
            Self::GetVpnServers => "Get VPN server configurations from a site",
            Self::GetDeviceTags => "Get device tags from a site",
            Self::GetWanConfig => "Get WAN configuration from a site",
            Self::GetRadiusProfiles => "Get RADIUS server profiles from a site",
            Self::GetDpiCategories => "Get DPI traffic categories",
            Self::GetDpiApps => "Get DPI applications",
            Self::GetDpiApplications => "Get DPI applications list",
            Self::PatchWifiNetwork => "Update WiFi network settings",
            Self::PatchFirewallZone => "Update firewall zone",
            Self::PatchAclRule => "Update ACL rule",
            Self::PatchHotspotVoucher => "Update hotspot voucher",
            Self::PatchTrafficRule => "Update traffic rule",
            Self::CreateWifiNetwork => "Create a new WiFi network",
            Self::CreateFirewallZone => "Create a new firewall zone",
            Self::CreateAclRule => "Create a new ACL rule",
            Self::CreateHotspotVoucher => "Create a new hotspot voucher",
            Self::CreateTrafficRule => "Create a new traffic rule",
            Self::CreateVpnTunnel => "Create a new VPN tunnel",
        }
    }

    pub fn params(self) -> &'static [Param] {
        match self {
            Self::GetNetworkSites
            | Self::GetNetworkInfo
            | Self::GetPendingDevices
            | Self::CheckNetworkEndpointHealth
            | Self::CheckProtectEndpointHealth
            | Self::GetDpiCategories
            | Self::GetDpiApps
            | Self::GetDpiApplications => NONE,

            Self::GetNetworkDevices
            | Self::GetWifiNetworks
            | Self::GetWifiBroadcasts
            | Self::GetClientStats
            | Self::GetSiteHealth
            | Self::GetFirewallZones
            | Self::GetAclRules
            | Self::GetHotspotVouchers
            | Self::GetTrafficRules
            | Self::GetVpnServers
            | Self::GetDeviceTags
            | Self::GetWanConfig
            | Self::GetRadiusProfiles => SITE_ONLY,

            Self::GetDeviceDetailed | Self::GetDeviceStats => DEVICE,
            Self::GetNetworkClients => CLIENTS,
            Self::GetClientDetailed => CLIENT,
            Self::GetWifiNetworkDetailed => WIFI_NETWORK,
            Self::GetFirewallZoneDetailed => FIREWALL_ZONE,
            Self::GetAclRuleDetailed => ACL_RULE,
            Self::GetHotspotVoucherDetailed => VOUCHER,
            Self::GetTrafficRuleDetailed => TRAFFIC_LIST,

            Self::PatchWifiNetwork => PATCH_WIFI_NETWORK,
            Self::PatchFirewallZone => PATCH_ZONE,
            Self::PatchAclRule | Self::PatchTrafficRule => PATCH_RULE,
            Self::PatchHotspotVoucher => PATCH_VOUCHER,

            Self::CreateWifiNetwork => CREATE_WIFI_NETWORK,
            Self::CreateFirewallZone => CREATE_ZONE,
            Self::CreateAclRule => CREATE_ACL_RULE,
            Self::CreateHotspotVoucher => CREATE_VOUCHER,
            Self::CreateTrafficRule => CREATE_TRAFFIC_RULE,
            Self::CreateVpnTunnel => CREATE_VPN_TUNNEL,
        }
    }

    /// JSON Schema for the tool's arguments: `{"type":"object","properties":{..}}`.
    pub fn input_schema(self) -> Value {
        let properties: Map<String, Value> = self
            .params()
            .iter()
            .map(|p| {
                let kind: &'static str = p.kind.into();
                (
                    p.name.to_owned(),
                    json!({ "type": kind, "description": p.description }),
                )
            })
            .collect();

        json!({ "type": "object", "properties": properties })
    }
}

// ── Registry ─────────────────────────────────────────────────────────

/// What `tools/list` reports for one tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

/// Immutable name → tool table, in catalogue order.
#[derive(Debug)]
pub struct ToolRegistry {
    tools: IndexMap<&'static str, (ToolName, ToolDefinition)>,
}

static REGISTRY: LazyLock<ToolRegistry> = LazyLock::new(ToolRegistry::build);

impl ToolRegistry {
    /// The process-wide catalogue.
    pub fn global() -> &'static Self {
        &REGISTRY
    }

    fn build() -> Self {
        let tools = ToolName::iter()
            .map(|tool| {
                let definition = ToolDefinition {
                    name: tool.as_str(),
                    description: tool.description(),
                    input_schema: tool.input_schema(),
                };
                (tool.as_str(), (tool, definition))
            })
            .collect();
        Self { tools }
    }

    /// Exact-name lookup.
    pub fn lookup(&self, name: &str) -> Option<ToolName> {
        self.tools.get(name).map(|(tool, _)| *tool)
    }

    pub fn definitions(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.values().map(|(_, def)| def)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::str::FromStr;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn catalogue_has_every_tool() {
        let registry = ToolRegistry::global();
        assert_eq!(registry.len(), 41);
        assert_eq!(
            registry.definitions().next().map(|d| d.name),
            Some("get_network_sites")
        );
        assert_eq!(
            registry.definitions().last().map(|d| d.name),
            Some("create_vpn_tunnel")
        );
    }

    #[test]
    fn names_are_snake_case_and_round_trip() {
        assert_eq!(ToolName::GetWifiNetworkDetailed.as_str(), "get_wifi_network_detailed");
        assert_eq!(ToolName::GetDpiApps.to_string(), "get_dpi_apps");
        assert_eq!(
            ToolName::from_str("check_protect_endpoint_health").unwrap(),
            ToolName::CheckProtectEndpointHealth
        );
        assert_eq!(
            ToolRegistry::global().lookup("get_acl_rule_detailed"),
            Some(ToolName::GetAclRuleDetailed)
        );
    }

    #[test]
    fn lookup_is_exact() {
        let registry = ToolRegistry::global();
        assert_eq!(registry.lookup("GET_NETWORK_SITES"), None);
        assert_eq!(registry.lookup("get_network_sites "), None);
        assert_eq!(registry.lookup("nope"), None);
    }

    #[test]
    fn client_list_schema() {
        assert_eq!(
            ToolName::GetNetworkClients.input_schema(),
            json!({
                "type": "object",
                "properties": {
                    "site_id": { "type": "string", "description": "Site ID (optional, defaults to first site)" },
                    "limit": { "type": "integer", "description": "Limit (optional, default 25)" },
                    "offset": { "type": "integer", "description": "Offset (optional, default 0)" },
                }
            })
        );
    }

    #[test]
    fn argumentless_tools_have_empty_properties() {
        assert_eq!(
            ToolName::GetNetworkSites.input_schema(),
            json!({ "type": "object", "properties": {} })
        );
    }

    #[test]
    fn mutations_declare_object_payloads() {
        for tool in ToolName::iter() {
            let name = tool.as_str();
            let payload = if name.starts_with("patch_") {
                Some("settings")
            } else if name.starts_with("create_") {
                Some("config")
            } else {
                None
            };
            if let Some(key) = payload {
                let schema = tool.input_schema();
                assert_eq!(schema["properties"][key]["type"], "object", "{name}");
            }
        }
    }

    #[test]
    fn definitions_serialize_with_input_schema_key() {
        let def = ToolRegistry::global().definitions().next().unwrap();
        let value = serde_json::to_value(def).unwrap();
        assert!(value.get("inputSchema").is_some());
        assert_eq!(value["name"], "get_network_sites");
    }
}
