// ── Controller seam ──
//
// Tool handlers talk to the controller only through `NetworkController`.
// Payloads stay opaque JSON; the trait fixes which calls exist and which
// of them are site-scoped. `IntegrationClient` is the production
// implementation, tests swap in an in-memory fake.

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;
use unimcp_api::{ControllerPlatform, IntegrationClient, SiteResource, TlsMode, TransportConfig};

use crate::config::{ControllerConfig, PlatformHint, TlsVerification};
use crate::error::CoreError;
use crate::model::Site;

pub type Payload = Value;
pub type Settings = Map<String, Value>;

/// Operations the tool layer needs from a network controller.
///
/// Every `site_id` argument is an already resolved canonical identifier.
#[async_trait]
pub trait NetworkController: Send + Sync {
    // ── Session ──────────────────────────────────────────────────────
    async fn authenticate(&self) -> Result<(), CoreError>;

    // ── Controller-wide reads ────────────────────────────────────────
    async fn get_sites(&self) -> Result<Vec<Site>, CoreError>;
    async fn get_info(&self) -> Result<Payload, CoreError>;
    async fn get_pending_devices(&self) -> Result<Vec<Payload>, CoreError>;
    async fn check_endpoint_health(&self) -> Result<Payload, CoreError>;
    async fn get_dpi_categories(&self) -> Result<Vec<Payload>, CoreError>;
    async fn get_dpi_applications(&self) -> Result<Vec<Payload>, CoreError>;

    // ── Devices ──────────────────────────────────────────────────────
    async fn get_devices(&self, site_id: &str) -> Result<Vec<Payload>, CoreError>;
    async fn get_device_detailed(&self, site_id: &str, device_id: &str)
    -> Result<Payload, CoreError>;
    async fn get_device_stats(&self, site_id: &str, device_id: &str) -> Result<Payload, CoreError>;
    async fn get_device_tags(&self, site_id: &str) -> Result<Vec<Payload>, CoreError>;

    // ── WiFi ─────────────────────────────────────────────────────────
    async fn get_wifi_networks(&self, site_id: &str) -> Result<Vec<Payload>, CoreError>;
    async fn get_wifi_network_detailed(
        &self,
        site_id: &str,
        network_id: &str,
    ) -> Result<Payload, CoreError>;
    async fn get_wifi_broadcasts(&self, site_id: &str) -> Result<Vec<Payload>, CoreError>;

    // ── Clients ──────────────────────────────────────────────────────
    async fn get_clients(
        &self,
        site_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Payload>, CoreError>;
    async fn get_client_detailed(&self, site_id: &str, mac: &str) -> Result<Payload, CoreError>;
    async fn get_client_stats(&self, site_id: &str) -> Result<Payload, CoreError>;

    // ── Health ───────────────────────────────────────────────────────
    async fn get_health(&self, site_id: &str) -> Result<Vec<Payload>, CoreError>;

    // ── Firewall & security ──────────────────────────────────────────
    async fn get_firewall_zones(&self, site_id: &str) -> Result<Vec<Payload>, CoreError>;
    async fn get_firewall_zone_detailed(
        &self,
        site_id: &str,
        zone_id: &str,
    ) -> Result<Payload, CoreError>;
    async fn get_acl_rules(&self, site_id: &str) -> Result<Vec<Payload>, CoreError>;
    async fn get_acl_rule_detailed(&self, site_id: &str, rule_id: &str)
    -> Result<Payload, CoreError>;
    async fn get_hotspot_vouchers(&self, site_id: &str) -> Result<Vec<Payload>, CoreError>;
    async fn get_hotspot_voucher_detailed(
        &self,
        site_id: &str,
        voucher_id: &str,
    ) -> Result<Payload, CoreError>;
    async fn get_traffic_rules(&self, site_id: &str) -> Result<Vec<Payload>, CoreError>;
    async fn get_traffic_rule_detailed(
        &self,
        site_id: &str,
        list_id: &str,
    ) -> Result<Payload, CoreError>;

    // ── Network configuration ────────────────────────────────────────
    async fn get_vpn_servers(&self, site_id: &str) -> Result<Vec<Payload>, CoreError>;
    async fn get_wan_config(&self, site_id: &str) -> Result<Vec<Payload>, CoreError>;
    async fn get_radius_profiles(&self, site_id: &str) -> Result<Vec<Payload>, CoreError>;

    // ── Mutations ────────────────────────────────────────────────────
    async fn patch_wifi_network(
        &self,
        site_id: &str,
        network_id: &str,
        settings: &Settings,
    ) -> Result<Settings, CoreError>;
    async fn patch_firewall_zone(
        &self,
        site_id: &str,
        zone_id: &str,
        settings: &Settings,
    ) -> Result<Settings, CoreError>;
    async fn patch_acl_rule(
        &self,
        site_id: &str,
        rule_id: &str,
        settings: &Settings,
    ) -> Result<Settings, CoreError>;
    async fn patch_hotspot_voucher(
        &self,
        site_id: &str,
        voucher_id: &str,
        settings: &Settings,
    ) -> Result<Settings, CoreError>;
    async fn patch_traffic_rule(
        &self,
        site_id: &str,
        rule_id: &str,
        settings: &Settings,
    ) -> Result<Settings, CoreError>;

    // ── Creations ────────────────────────────────────────────────────
    async fn create_wifi_network(&self, site_id: &str, config: &Settings)
    -> Result<Payload, CoreError>;
    async fn create_firewall_zone(
        &self,
        site_id: &str,
        config: &Settings,
    ) -> Result<Payload, CoreError>;
    async fn create_acl_rule(&self, site_id: &str, config: &Settings) -> Result<Payload, CoreError>;
    async fn create_hotspot_voucher(
        &self,
        site_id: &str,
        config: &Settings,
    ) -> Result<Payload, CoreError>;
    async fn create_traffic_rule(&self, site_id: &str, config: &Settings)
    -> Result<Payload, CoreError>;
    async fn create_vpn_tunnel(&self, site_id: &str, config: &Settings)
    -> Result<Payload, CoreError>;
}

// ── Construction ─────────────────────────────────────────────────────

/// Build an Integration API client for `config`, probing the platform
/// unless the config pins it.
pub async fn connect(config: &ControllerConfig) -> Result<IntegrationClient, CoreError> {
    let transport = build_transport(config);

    let platform = match config.platform {
        PlatformHint::Auto => ControllerPlatform::detect(&config.url, &transport).await?,
        PlatformHint::UnifiOs => ControllerPlatform::UnifiOs,
        PlatformHint::Classic => ControllerPlatform::ClassicController,
    };
    debug!(?platform, "controller platform");

    Ok(IntegrationClient::from_api_key(
        config.url.as_str(),
        &config.api_key,
        &transport,
        platform,
    )?)
}

/// Build a [`TransportConfig`] from the controller configuration.
fn build_transport(config: &ControllerConfig) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}

// ── Integration API implementation ───────────────────────────────────

#[async_trait]
impl NetworkController for IntegrationClient {
    async fn authenticate(&self) -> Result<(), CoreError> {
        Ok(IntegrationClient::authenticate(self).await?)
    }

    async fn get_sites(&self) -> Result<Vec<Site>, CoreError> {
        let sites = self.all_sites().await?;
        Ok(sites.into_iter().map(Site::from).collect())
    }

    async fn get_info(&self) -> Result<Payload, CoreError> {
        Ok(IntegrationClient::get_info(self).await?)
    }

    async fn get_pending_devices(&self) -> Result<Vec<Payload>, CoreError> {
        Ok(self.list_pending_devices().await?)
    }

    async fn check_endpoint_health(&self) -> Result<Payload, CoreError> {
        Ok(self.check_health().await?)
    }

    async fn get_dpi_categories(&self) -> Result<Vec<Payload>, CoreError> {
        Ok(self.list_dpi_categories().await?)
    }

    async fn get_dpi_applications(&self) -> Result<Vec<Payload>, CoreError> {
        Ok(self.list_dpi_applications().await?)
    }

    async fn get_devices(&self, site_id: &str) -> Result<Vec<Payload>, CoreError> {
        Ok(self.list_all(site_id, SiteResource::Devices).await?)
    }

    async fn get_device_detailed(
        &self,
        site_id: &str,
        device_id: &str,
    ) -> Result<Payload, CoreError> {
        Ok(self
            .get_item(site_id, SiteResource::Devices, device_id)
            .await?)
    }

    async fn get_device_stats(&self, site_id: &str, device_id: &str) -> Result<Payload, CoreError> {
        Ok(self.get_device_statistics(site_id, device_id).await?)
    }

    async fn get_device_tags(&self, site_id: &str) -> Result<Vec<Payload>, CoreError> {
        Ok(self.list_all(site_id, SiteResource::DeviceTags).await?)
    }

    async fn get_wifi_networks(&self, site_id: &str) -> Result<Vec<Payload>, CoreError> {
        Ok(self.list_all(site_id, SiteResource::Networks).await?)
    }

    async fn get_wifi_network_detailed(
        &self,
        site_id: &str,
        network_id: &str,
    ) -> Result<Payload, CoreError> {
        Ok(self
            .get_item(site_id, SiteResource::Networks, network_id)
            .await?)
    }

    async fn get_wifi_broadcasts(&self, site_id: &str) -> Result<Vec<Payload>, CoreError> {
        Ok(self.list_all(site_id, SiteResource::WifiBroadcasts).await?)
    }

    async fn get_clients(
        &self,
        site_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Payload>, CoreError> {
        let limit = i32::try_from(limit).map_err(|_| CoreError::InvalidArgument {
            message: format!("limit {limit} is out of range"),
        })?;
        let page = self
            .list_page(site_id, SiteResource::Clients, offset, limit)
            .await?;
        Ok(page.data)
    }

    async fn get_client_detailed(&self, site_id: &str, mac: &str) -> Result<Payload, CoreError> {
        Ok(self.find_client_by_mac(site_id, mac).await?)
    }

    async fn get_client_stats(&self, site_id: &str) -> Result<Payload, CoreError> {
        Ok(self.client_statistics(site_id).await?)
    }

    async fn get_health(&self, site_id: &str) -> Result<Vec<Payload>, CoreError> {
        Ok(self.site_health(site_id).await?)
    }

    async fn get_firewall_zones(&self, site_id: &str) -> Result<Vec<Payload>, CoreError> {
        Ok(self.list_all(site_id, SiteResource::FirewallZones).await?)
    }

    async fn get_firewall_zone_detailed(
        &self,
        site_id: &str,
        zone_id: &str,
    ) -> Result<Payload, CoreError> {
        Ok(self
            .get_item(site_id, SiteResource::FirewallZones, zone_id)
            .await?)
    }

    async fn get_acl_rules(&self, site_id: &str) -> Result<Vec<Payload>, CoreError> {
        Ok(self.list_all(site_id, SiteResource::AclRules).await?)
    }

    async fn get_acl_rule_detailed(
        &self,
        site_id: &str,
        rule_id: &str,
    ) -> Result<Payload, CoreError> {
        Ok(self.get_item(site_id, SiteResource::AclRules, rule_id).await?)
    }

    async fn get_hotspot_vouchers(&self, site_id: &str) -> Result<Vec<Payload>, CoreError> {
        Ok(self.list_all(site_id, SiteResource::HotspotVouchers).await?)
    }

    async fn get_hotspot_voucher_detailed(
        &self,
        site_id: &str,
        voucher_id: &str,
    ) -> Result<Payload, CoreError> {
        Ok(self
            .get_item(site_id, SiteResource::HotspotVouchers, voucher_id)
            .await?)
    }

    async fn get_traffic_rules(&self, site_id: &str) -> Result<Vec<Payload>, CoreError> {
        Ok(self
            .list_all(site_id, SiteResource::TrafficMatchingLists)
            .await?)
    }

    async fn get_traffic_rule_detailed(
        &self,
        site_id: &str,
        list_id: &str,
    ) -> Result<Payload, CoreError> {
        Ok(self
            .get_item(site_id, SiteResource::TrafficMatchingLists, list_id)
            .await?)
    }

    async fn get_vpn_servers(&self, site_id: &str) -> Result<Vec<Payload>, CoreError> {
        Ok(self.list_all(site_id, SiteResource::VpnServers).await?)
    }

    async fn get_wan_config(&self, site_id: &str) -> Result<Vec<Payload>, CoreError> {
        Ok(self.list_all(site_id, SiteResource::Wans).await?)
    }

    async fn get_radius_profiles(&self, site_id: &str) -> Result<Vec<Payload>, CoreError> {
        Ok(self.list_all(site_id, SiteResource::RadiusProfiles).await?)
    }

    async fn patch_wifi_network(
        &self,
        site_id: &str,
        network_id: &str,
        settings: &Settings,
    ) -> Result<Settings, CoreError> {
        Ok(self
            .patch_item(site_id, SiteResource::Networks, network_id, settings)
            .await?)
    }

    async fn patch_firewall_zone(
        &self,
        site_id: &str,
        zone_id: &str,
        settings: &Settings,
    ) -> Result<Settings, CoreError> {
        Ok(self
            .patch_item(site_id, SiteResource::FirewallZones, zone_id, settings)
            .await?)
    }

    async fn patch_acl_rule(
        &self,
        site_id: &str,
        rule_id: &str,
        settings: &Settings,
    ) -> Result<Settings, CoreError> {
        Ok(self
            .patch_item(site_id, SiteResource::AclRules, rule_id, settings)
            .await?)
    }

    async fn patch_hotspot_voucher(
        &self,
        site_id: &str,
        voucher_id: &str,
        settings: &Settings,
    ) -> Result<Settings, CoreError> {
        Ok(self
            .patch_item(site_id, SiteResource::HotspotVouchers, voucher_id, settings)
            .await?)
    }

    async fn patch_traffic_rule(
        &self,
        site_id: &str,
        rule_id: &str,
        settings: &Settings,
    ) -> Result<Settings, CoreError> {
        Ok(self
            .patch_item(
                site_id,
                SiteResource::TrafficMatchingLists,
                rule_id,
                settings,
            )
            .await?)
    }

    async fn create_wifi_network(
        &self,
        site_id: &str,
        config: &Settings,
    ) -> Result<Payload, CoreError> {
        Ok(self
            .create_item(site_id, SiteResource::Networks, config)
            .await?)
    }

    async fn create_firewall_zone(
        &self,
        site_id: &str,
        config: &Settings,
    ) -> Result<Payload, CoreError> {
        Ok(self
            .create_item(site_id, SiteResource::FirewallZones, config)
            .await?)
    }

    async fn create_acl_rule(
        &self,
        site_id: &str,
        config: &Settings,
    ) -> Result<Payload, CoreError> {
        Ok(self
            .create_item(site_id, SiteResource::AclRules, config)
            .await?)
    }

    async fn create_hotspot_voucher(
        &self,
        site_id: &str,
        config: &Settings,
    ) -> Result<Payload, CoreError> {
        Ok(self
            .create_item(site_id, SiteResource::HotspotVouchers, config)
            .await?)
    }

    async fn create_traffic_rule(
        &self,
        site_id: &str,
        config: &Settings,
    ) -> Result<Payload, CoreError> {
        Ok(self
            .create_item(site_id, SiteResource::TrafficMatchingLists, config)
            .await?)
    }

    async fn create_vpn_tunnel(
        &self,
        site_id: &str,
        config: &Settings,
    ) -> Result<Payload, CoreError> {
        Ok(self
            .create_item(site_id, SiteResource::VpnTunnels, config)
            .await?)
    }
}
