// In-memory controller for handler tests. Records every call it receives.

#![allow(clippy::unwrap_used)]

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::controller::{NetworkController, Payload, Settings};
use crate::error::CoreError;
use crate::model::Site;

#[derive(Default)]
pub(crate) struct FakeController {
    pub sites: Vec<Site>,
    pub fail_auth: bool,
    pub fail_sites: bool,
    pub fail_ops: bool,
    /// Returned by every `patch_*` call.
    pub patch_reply: Settings,
    pub calls: Mutex<Vec<String>>,
}

impl FakeController {
    pub fn with_home_site() -> Self {
        Self {
            sites: vec![Site {
                id: "s1".into(),
                external_id: "ext-1".into(),
                name: "Home".into(),
            }],
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn hit(&self, call: String) -> Result<(), CoreError> {
        self.calls.lock().unwrap().push(call);
        if self.fail_ops {
            return Err(CoreError::Api {
                message: "boom".into(),
                code: None,
                status: Some(500),
            });
        }
        Ok(())
    }

    fn list(&self, op: &str, site_id: &str) -> Result<Vec<Payload>, CoreError> {
        self.hit(format!("{op} {site_id}"))?;
        Ok(vec![json!({ "id": "a" }), json!({ "id": "b" })])
    }

    fn item(&self, op: &str, site_id: &str, id: &str) -> Result<Payload, CoreError> {
        self.hit(format!("{op} {site_id} {id}"))?;
        Ok(json!({ "id": id }))
    }

    fn patch(
        &self,
        op: &str,
        site_id: &str,
        id: &str,
        settings: &Settings,
    ) -> Result<Settings, CoreError> {
        self.hit(format!("{op} {site_id} {id} {}", Value::Object(settings.clone())))?;
        Ok(self.patch_reply.clone())
    }

    fn create(&self, op: &str, site_id: &str, config: &Settings) -> Result<Payload, CoreError> {
        self.hit(format!("{op} {site_id}"))?;
        let mut created = config.clone();
        created.insert("id".into(), json!("new-1"));
        Ok(Value::Object(created))
    }
}

#[async_trait]
impl NetworkController for FakeController {
    async fn authenticate(&self) -> Result<(), CoreError> {
        self.calls.lock().unwrap().push("authenticate".into());
        if self.fail_auth {
            return Err(CoreError::AuthenticationFailed {
                message: "Invalid API key".into(),
            });
        }
        Ok(())
    }

    async fn get_sites(&self) -> Result<Vec<Site>, CoreError> {
        self.calls.lock().unwrap().push("get_sites".into());
        if self.fail_sites {
            return Err(CoreError::Timeout);
        }
        Ok(self.sites.clone())
    }

    async fn get_info(&self) -> Result<Payload, CoreError> {
        self.hit("get_info".into())?;
        Ok(json!({ "applicationVersion": "9.0.114" }))
    }

    async fn get_pending_devices(&self) -> Result<Vec<Payload>, CoreError> {
        self.list("get_pending_devices", "-")
    }

    async fn check_endpoint_health(&self) -> Result<Payload, CoreError> {
        self.hit("check_endpoint_health".into())?;
        Ok(json!({ "status": "healthy" }))
    }

    async fn get_dpi_categories(&self) -> Result<Vec<Payload>, CoreError> {
        self.list("get_dpi_categories", "-")
    }

    async fn get_dpi_applications(&self) -> Result<Vec<Payload>, CoreError> {
        self.list("get_dpi_applications", "-")
    }

    async fn get_devices(&self, site_id: &str) -> Result<Vec<Payload>, CoreError> {
        self.list("get_devices", site_id)
    }

    async fn get_device_detailed(
        &self,
        site_id: &str,
        device_id: &str,
    ) -> Result<Payload, CoreError> {
        self.item("get_device_detailed", site_id, device_id)
    }

    async fn get_device_stats(&self, site_id: &str, device_id: &str) -> Result<Payload, CoreError> {
        self.item("get_device_stats", site_id, device_id)
    }

    async fn get_device_tags(&self, site_id: &str) -> Result<Vec<Payload>, CoreError> {
        self.list("get_device_tags", site_id)
    }

    async fn get_wifi_networks(&self, site_id: &str) -> Result<Vec<Payload>, CoreError> {
        self.list("get_wifi_networks", site_id)
    }

    async fn get_wifi_network_detailed(
        &self,
        site_id: &str,
        network_id: &str,
    ) -> Result<Payload, CoreError> {
        self.item("get_wifi_network_detailed", site_id, network_id)
    }

    async fn get_wifi_broadcasts(&self, site_id: &str) -> Result<Vec<Payload>, CoreError> {
        self.list("get_wifi_broadcasts", site_id)
    }

    async fn get_clients(
        &self,
        site_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Payload>, CoreError> {
        self.list(&format!("get_clients {limit} {offset}"), site_id)
    }

    async fn get_client_detailed(&self, site_id: &str, mac: &str) -> Result<Payload, CoreError> {
        self.item("get_client_detailed", site_id, mac)
    }

    async fn get_client_stats(&self, site_id: &str) -> Result<Payload, CoreError> {
        self.hit(format!("get_client_stats {site_id}"))?;
        Ok(json!({ "total": 2 }))
    }

    async fn get_health(&self, site_id: &str) -> Result<Vec<Payload>, CoreError> {
        self.list("get_health", site_id)
    }

    async fn get_firewall_zones(&self, site_id: &str) -> Result<Vec<Payload>, CoreError> {
        self.list("get_firewall_zones", site_id)
    }

    async fn get_firewall_zone_detailed(
        &self,
        site_id: &str,
        zone_id: &str,
    ) -> Result<Payload, CoreError> {
        self.item("get_firewall_zone_detailed", site_id, zone_id)
    }

    async fn get_acl_rules(&self, site_id: &str) -> Result<Vec<Payload>, CoreError> {
        self.list("get_acl_rules", site_id)
    }

    async fn get_acl_rule_detailed(
        &self,
        site_id: &str,
        rule_id: &str,
    ) -> Result<Payload, CoreError> {
        self.item("get_acl_rule_detailed", site_id, rule_id)
    }

    async fn get_hotspot_vouchers(&self, site_id: &str) -> Result<Vec<Payload>, CoreError> {
        self.list("get_hotspot_vouchers", site_id)
    }

    async fn get_hotspot_voucher_detailed(
        &self,
        site_id: &str,
        voucher_id: &str,
    ) -> Result<Payload, CoreError> {
        self.item("get_hotspot_voucher_detailed", site_id, voucher_id)
    }

    async fn get_traffic_rules(&self, site_id: &str) -> Result<Vec<Payload>, CoreError> {
        self.list("get_traffic_rules", site_id)
    }

    async fn get_traffic_rule_detailed(
        &self,
        site_id: &str,
        list_id: &str,
    ) -> Result<Payload, CoreError> {
        self.item("get_traffic_rule_detailed", site_id, list_id)
    }

    async fn get_vpn_servers(&self, site_id: &str) -> Result<Vec<Payload>, CoreError> {
        self.list("get_vpn_servers", site_id)
    }

    async fn get_wan_config(&self, site_id: &str) -> Result<Vec<Payload>, CoreError> {
        self.list("get_wan_config", site_id)
    }

    async fn get_radius_profiles(&self, site_id: &str) -> Result<Vec<Payload>, CoreError> {
        self.list("get_radius_profiles", site_id)
    }

    async fn patch_wifi_network(
        &self,
        site_id: &str,
        network_id: &str,
        settings: &Settings,
    ) -> Result<Settings, CoreError> {
        self.patch("patch_wifi_network", site_id, network_id, settings)
    }

    async fn patch_firewall_zone(
        &self,
        site_id: &str,
        zone_id: &str,
        settings: &Settings,
    ) -> Result<Settings, CoreError> {
        self.patch("patch_firewall_zone", site_id, zone_id, settings)
    }

    async fn patch_acl_rule(
        &self,
        site_id: &str,
        rule_id: &str,
        settings: &Settings,
    ) -> Result<Settings, CoreError> {
        self.patch("patch_acl_rule", site_id, rule_id, settings)
    }

    async fn patch_hotspot_voucher(
        &self,
        site_id: &str,
        voucher_id: &str,
        settings: &Settings,
    ) -> Result<Settings, CoreError> {
        self.patch("patch_hotspot_voucher", site_id, voucher_id, settings)
    }

    async fn patch_traffic_rule(
        &self,
        site_id: &str,
        rule_id: &str,
        settings: &Settings,
    ) -> Result<Settings, CoreError> {
        self.patch("patch_traffic_rule", site_id, rule_id, settings)
    }

    async fn create_wifi_network(
        &self,
        site_id: &str,
        config: &Settings,
    ) -> Result<Payload, CoreError> {
        self.create("create_wifi_network", site_id, config)
    }

    async fn create_firewall_zone(
        &self,
        site_id: &str,
        config: &Settings,
    ) -> Result<Payload, CoreError> {
        self.create("create_firewall_zone", site_id, config)
    }

    async fn create_acl_rule(
        &self,
        site_id: &str,
        config: &Settings,
    ) -> Result<Payload, CoreError> {
        self.create("create_acl_rule", site_id, config)
    }

    async fn create_hotspot_voucher(
        &self,
        site_id: &str,
        config: &Settings,
    ) -> Result<Payload, CoreError> {
        self.create("create_hotspot_voucher", site_id, config)
    }

    async fn create_traffic_rule(
        &self,
        site_id: &str,
        config: &Settings,
    ) -> Result<Payload, CoreError> {
        self.create("create_traffic_rule", site_id, config)
    }

    async fn create_vpn_tunnel(
        &self,
        site_id: &str,
        config: &Settings,
    ) -> Result<Payload, CoreError> {
        self.create("create_vpn_tunnel", site_id, config)
    }
}
