// ── Tool handlers ──
//
// Each arm: validate local input, authenticate, resolve the site when the
// tool is site-scoped, make one controller call, shape the envelope.
// Local validation always comes first so bad input never hits the network.

use serde_json::{Map, Value, json};

use super::{Arguments, Dispatcher, ToolName, ToolResult};
use crate::controller::Settings;
use crate::error::ToolError;

const DEFAULT_LIMIT: i64 = 25;
const DEFAULT_OFFSET: i64 = 0;

const PROTECT_SKIPPED: &str = "Protect endpoint health check is not available in network-mcp. Use unifi-mcp for combined access.";

impl Dispatcher {
    #[allow(clippy::too_many_lines)]
    pub(super) async fn run(&self, tool: ToolName, args: &Arguments) -> ToolResult {
        let ctl = self.controller.as_ref();

        match tool {
            // ── Network management ───────────────────────────────────
            ToolName::GetNetworkSites => {
                self.authenticate().await?;
                let sites = ctl
                    .get_sites()
                    .await
                    .map_err(ToolError::wrap("Failed to get sites"))?;
                let count = sites.len();
                Ok(json!({ "sites": sites, "count": count }))
            }
            ToolName::GetNetworkDevices => {
                let site = self.enter_site(args).await?;
                let devices = ctl
                    .get_devices(&site)
                    .await
                    .map_err(ToolError::wrap("Failed to get devices"))?;
                Ok(listing("devices", devices, Some(&site)))
            }
            ToolName::GetDeviceDetailed => {
                let device_id = args.required_string("device_id")?;
                let site = self.enter_site(args).await?;
                let device = ctl
                    .get_device_detailed(&site, &device_id)
                    .await
                    .map_err(ToolError::wrap("Failed to get device details"))?;
                Ok(json!({ "device": device, "site_id": site, "device_id": device_id }))
            }
            ToolName::GetDeviceStats => {
                let device_id = args.required_string("device_id")?;
                let site = self.enter_site(args).await?;
                let stats = ctl
                    .get_device_stats(&site, &device_id)
                    .await
                    .map_err(ToolError::wrap("Failed to get device stats"))?;
                Ok(json!({ "stats": stats, "site_id": site, "device_id": device_id }))
            }
            ToolName::GetNetworkInfo => {
                self.authenticate().await?;
                ctl.get_info()
                    .await
                    .map_err(ToolError::wrap("Failed to get network info"))
            }
            ToolName::GetPendingDevices => {
                self.authenticate().await?;
                let devices = ctl
                    .get_pending_devices()
                    .await
                    .map_err(ToolError::wrap("Failed to get pending devices"))?;
                Ok(listing("devices", devices, None))
            }

            // ── WiFi ─────────────────────────────────────────────────
            ToolName::GetWifiNetworks => {
                let site = self.enter_site(args).await?;
                let networks = ctl
                    .get_wifi_networks(&site)
                    .await
                    .map_err(ToolError::wrap("Failed to get wifi networks"))?;
                Ok(listing("networks", networks, Some(&site)))
            }
            ToolName::GetWifiNetworkDetailed => {
                let network_id = args.required_string("network_id")?;
                let site = self.enter_site(args).await?;
                ctl.get_wifi_network_detailed(&site, &network_id)
                    .await
                    .map_err(ToolError::wrap("Failed to get network details"))
            }
            ToolName::GetWifiBroadcasts => {
                let site = self.enter_site(args).await?;
                let broadcasts = ctl
                    .get_wifi_broadcasts(&site)
                    .await
                    .map_err(ToolError::wrap("Failed to get wifi broadcasts"))?;
                Ok(listing("broadcasts", broadcasts, Some(&site)))
            }

            // ── Clients ──────────────────────────────────────────────
            ToolName::GetNetworkClients => {
                let limit = args.integer("limit", DEFAULT_LIMIT);
                let offset = args.integer("offset", DEFAULT_OFFSET);
                let site = self.enter_site(args).await?;
                let clients = ctl
                    .get_clients(&site, limit, offset)
                    .await
                    .map_err(ToolError::wrap("Failed to get network clients"))?;
                let mut out = listing("clients", clients, Some(&site));
                out["limit"] = json!(limit);
                out["offset"] = json!(offset);
                Ok(out)
            }
            ToolName::GetClientDetailed => {
                let mac = args.required_string("mac")?;
                let site = self.enter_site(args).await?;
                let client = ctl
                    .get_client_detailed(&site, &mac)
                    .await
                    .map_err(ToolError::wrap("Failed to get client details"))?;
                Ok(json!({ "client": client, "site_id": site, "mac": mac }))
            }
            ToolName::GetClientStats => {
                let site = self.enter_site(args).await?;
                let stats = ctl
                    .get_client_stats(&site)
                    .await
                    .map_err(ToolError::wrap("Failed to get client stats"))?;
                Ok(json!({ "stats": stats, "site_id": site }))
            }

            // ── Health ───────────────────────────────────────────────
            ToolName::GetSiteHealth => {
                let site = self.enter_site(args).await?;
                let health = ctl
                    .get_health(&site)
                    .await
                    .map_err(ToolError::wrap("Failed to get health"))?;
                Ok(json!({ "health": health, "site_id": site }))
            }
            ToolName::CheckNetworkEndpointHealth => {
                self.authenticate().await?;
                let health = ctl
                    .check_endpoint_health()
                    .await
                    .map_err(ToolError::wrap("Failed to check endpoint health"))?;
                Ok(json!({ "endpoint": "Unifi Network", "health": health }))
            }
            ToolName::CheckProtectEndpointHealth => {
                self.authenticate().await?;
                Ok(json!({
                    "endpoint": "Unifi Protect",
                    "status": "skipped",
                    "message": PROTECT_SKIPPED,
                }))
            }

            // ── Firewall & security ──────────────────────────────────
            ToolName::GetFirewallZones => {
                let site = self.enter_site(args).await?;
                let zones = ctl
                    .get_firewall_zones(&site)
                    .await
                    .map_err(ToolError::wrap("Failed to get firewall zones"))?;
                Ok(listing("zones", zones, Some(&site)))
            }
            ToolName::GetFirewallZoneDetailed => {
                let zone_id = args.required_string("firewall_zone_id")?;
                let site = self.enter_site(args).await?;
                ctl.get_firewall_zone_detailed(&site, &zone_id)
                    .await
                    .map_err(ToolError::wrap("Failed to get firewall zone details"))
            }
            ToolName::GetAclRules => {
                let site = self.enter_site(args).await?;
                let rules = ctl
                    .get_acl_rules(&site)
                    .await
                    .map_err(ToolError::wrap("Failed to get acl rules"))?;
                Ok(listing("rules", rules, Some(&site)))
            }
            ToolName::GetAclRuleDetailed => {
                let rule_id = args.required_string("acl_rule_id")?;
                let site = self.enter_site(args).await?;
                ctl.get_acl_rule_detailed(&site, &rule_id)
                    .await
                    .map_err(ToolError::wrap("Failed to get ACL rule details"))
            }
            ToolName::GetHotspotVouchers => {
                let site = self.enter_site(args).await?;
                let vouchers = ctl
                    .get_hotspot_vouchers(&site)
                    .await
                    .map_err(ToolError::wrap("Failed to get hotspot vouchers"))?;
                Ok(listing("vouchers", vouchers, Some(&site)))
            }
            ToolName::GetHotspotVoucherDetailed => {
                let voucher_id = args.required_string("voucher_id")?;
                let site = self.enter_site(args).await?;
                ctl.get_hotspot_voucher_detailed(&site, &voucher_id)
                    .await
                    .map_err(ToolError::wrap("Failed to get voucher details"))
            }
            ToolName::GetTrafficRules => {
                let site = self.enter_site(args).await?;
                let rules = ctl
                    .get_traffic_rules(&site)
                    .await
                    .map_err(ToolError::wrap("Failed to get traffic rules"))?;
                Ok(listing("rules", rules, Some(&site)))
            }
            ToolName::GetTrafficRuleDetailed => {
                let list_id = args.required_string("traffic_matching_list_id")?;
                let site = self.enter_site(args).await?;
                ctl.get_traffic_rule_detailed(&site, &list_id)
                    .await
                    .map_err(ToolError::wrap("Failed to get traffic rule details"))
            }

            // ── VPN & network configuration ──────────────────────────
            ToolName::GetVpnServers => {
                let site = self.enter_site(args).await?;
                let servers = ctl
                    .get_vpn_servers(&site)
                    .await
                    .map_err(ToolError::wrap("Failed to get vpn servers"))?;
                Ok(listing("servers", servers, Some(&site)))
            }
            ToolName::GetDeviceTags => {
                let site = self.enter_site(args).await?;
                let tags = ctl
                    .get_device_tags(&site)
                    .await
                    .map_err(ToolError::wrap("Failed to get device tags"))?;
                Ok(listing("tags", tags, Some(&site)))
            }
            ToolName::GetWanConfig => {
                let site = self.enter_site(args).await?;
                let wans = ctl
                    .get_wan_config(&site)
                    .await
                    .map_err(ToolError::wrap("Failed to get WAN config"))?;
                Ok(listing("wans", wans, Some(&site)))
            }
            ToolName::GetRadiusProfiles => {
                let site = self.enter_site(args).await?;
                let profiles = ctl
                    .get_radius_profiles(&site)
                    .await
                    .map_err(ToolError::wrap("Failed to get RADIUS profiles"))?;
                Ok(listing("profiles", profiles, Some(&site)))
            }

            // ── DPI ──────────────────────────────────────────────────
            ToolName::GetDpiCategories => {
                self.authenticate().await?;
                let categories = ctl
                    .get_dpi_categories()
                    .await
                    .map_err(ToolError::wrap("Failed to get dpi categories"))?;
                Ok(listing("categories", categories, None))
            }
            ToolName::GetDpiApps => {
                self.authenticate().await?;
                let apps = ctl
                    .get_dpi_applications()
                    .await
                    .map_err(ToolError::wrap("Failed to get dpi apps"))?;
                Ok(listing("apps", apps, None))
            }
            ToolName::GetDpiApplications => {
                self.authenticate().await?;
                let applications = ctl
                    .get_dpi_applications()
                    .await
                    .map_err(ToolError::wrap("Failed to get DPI applications"))?;
                Ok(listing("applications", applications, None))
            }

            // ── Updates ──────────────────────────────────────────────
            ToolName::PatchWifiNetwork => {
                let (network_id, settings) = patch_input(args, "network_id")?;
                let site = self.enter_site(args).await?;
                let updated = ctl
                    .patch_wifi_network(&site, &network_id, &settings)
                    .await
                    .map_err(ToolError::wrap("Failed to update wifi network"))?;
                Ok(patched(updated, "network_id", network_id, site))
            }
            ToolName::PatchFirewallZone => {
                let (zone_id, settings) = patch_input(args, "zone_id")?;
                let site = self.enter_site(args).await?;
                let updated = ctl
                    .patch_firewall_zone(&site, &zone_id, &settings)
                    .await
                    .map_err(ToolError::wrap("Failed to update firewall zone"))?;
                Ok(patched(updated, "zone_id", zone_id, site))
            }
            ToolName::PatchAclRule => {
                let (rule_id, settings) = patch_input(args, "rule_id")?;
                let site = self.enter_site(args).await?;
                let updated = ctl
                    .patch_acl_rule(&site, &rule_id, &settings)
                    .await
                    .map_err(ToolError::wrap("Failed to update acl rule"))?;
                Ok(patched(updated, "rule_id", rule_id, site))
            }
            ToolName::PatchHotspotVoucher => {
                let (voucher_id, settings) = patch_input(args, "voucher_id")?;
                let site = self.enter_site(args).await?;
                let updated = ctl
                    .patch_hotspot_voucher(&site, &voucher_id, &settings)
                    .await
                    .map_err(ToolError::wrap("Failed to update hotspot voucher"))?;
                Ok(patched(updated, "voucher_id", voucher_id, site))
            }
            ToolName::PatchTrafficRule => {
                let (rule_id, settings) = patch_input(args, "rule_id")?;
                let site = self.enter_site(args).await?;
                let updated = ctl
                    .patch_traffic_rule(&site, &rule_id, &settings)
                    .await
                    .map_err(ToolError::wrap("Failed to update traffic rule"))?;
                Ok(patched(updated, "rule_id", rule_id, site))
            }

            // ── Creations ────────────────────────────────────────────
            ToolName::CreateWifiNetwork => {
                let config = args.object("config")?;
                let site = self.enter_site(args).await?;
                let network = ctl
                    .create_wifi_network(&site, &config)
                    .await
                    .map_err(ToolError::wrap("Failed to create wifi network"))?;
                Ok(created("network", network, site))
            }
            ToolName::CreateFirewallZone => {
                let config = args.object("config")?;
                let site = self.enter_site(args).await?;
                let zone = ctl
                    .create_firewall_zone(&site, &config)
                    .await
                    .map_err(ToolError::wrap("Failed to create firewall zone"))?;
                Ok(created("zone", zone, site))
            }
            ToolName::CreateAclRule => {
                let config = args.object("config")?;
                let site = self.enter_site(args).await?;
                let rule = ctl
                    .create_acl_rule(&site, &config)
                    .await
                    .map_err(ToolError::wrap("Failed to create acl rule"))?;
                Ok(created("rule", rule, site))
            }
            ToolName::CreateHotspotVoucher => {
                let config = args.object("config")?;
                let site = self.enter_site(args).await?;
                let voucher = ctl
                    .create_hotspot_voucher(&site, &config)
                    .await
                    .map_err(ToolError::wrap("Failed to create hotspot voucher"))?;
                Ok(created("voucher", voucher, site))
            }
            ToolName::CreateTrafficRule => {
                let config = args.object("config")?;
                let site = self.enter_site(args).await?;
                let rule = ctl
                    .create_traffic_rule(&site, &config)
                    .await
                    .map_err(ToolError::wrap("Failed to create traffic rule"))?;
                Ok(created("rule", rule, site))
            }
            ToolName::CreateVpnTunnel => {
                let config = args.object("config")?;
                let site = self.enter_site(args).await?;
                let tunnel = ctl
                    .create_vpn_tunnel(&site, &config)
                    .await
                    .map_err(ToolError::wrap("Failed to create vpn tunnel"))?;
                Ok(created("tunnel", tunnel, site))
            }
        }
    }
}

// ── Input & envelope helpers ─────────────────────────────────────────

/// `settings` is checked before the target id.
fn patch_input(args: &Arguments, id_key: &str) -> Result<(String, Settings), ToolError> {
    let settings = args.object("settings")?;
    let id = args.required_string(id_key)?;
    Ok((id, settings))
}

/// `{<key>: [...], count, site_id?}`
fn listing(key: &str, items: Vec<Value>, site_id: Option<&str>) -> Value {
    let mut out = Map::new();
    out.insert("count".into(), json!(items.len()));
    out.insert(key.into(), Value::Array(items));
    if let Some(site_id) = site_id {
        out.insert("site_id".into(), json!(site_id));
    }
    Value::Object(out)
}

/// The controller's reply with `success`, the target id, and `site_id` merged in.
fn patched(mut updated: Settings, id_key: &str, id: String, site_id: String) -> Value {
    updated.insert("success".into(), Value::Bool(true));
    updated.insert(id_key.into(), Value::String(id));
    updated.insert("site_id".into(), Value::String(site_id));
    Value::Object(updated)
}

fn created(key: &str, payload: Value, site_id: String) -> Value {
    let mut out = Map::new();
    out.insert("success".into(), Value::Bool(true));
    out.insert(key.into(), payload);
    out.insert("site_id".into(), Value::String(site_id));
    Value::Object(out)
}
