//! Tool dispatch: name lookup, argument handling, and the per-tool handlers.

pub mod arguments;
#[cfg(test)]
mod fake;
mod handlers;
pub mod registry;

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::controller::NetworkController;
use crate::error::{CoreError, ToolError};
use crate::resolver;

pub use arguments::Arguments;
pub use registry::{Param, ParamKind, ToolDefinition, ToolName, ToolRegistry};

/// Outcome of a tool that was found and ran.
pub type ToolResult = Result<Value, ToolError>;

/// Routes tool calls to handlers against one controller.
///
/// Cheap to clone; holds no per-call state.
#[derive(Clone)]
pub struct Dispatcher {
    controller: Arc<dyn NetworkController>,
    /// Substitutes for an omitted `site_id`.
    default_site: Option<String>,
}

impl Dispatcher {
    pub fn new(controller: Arc<dyn NetworkController>) -> Self {
        Self {
            controller,
            default_site: None,
        }
    }

    /// Use `site` whenever a call leaves `site_id` blank. Blank `site` is ignored.
    pub fn with_default_site(mut self, site: Option<String>) -> Self {
        self.default_site = site.filter(|s| !s.is_empty());
        self
    }

    pub fn registry(&self) -> &'static ToolRegistry {
        ToolRegistry::global()
    }

    /// Run the tool called `name`.
    ///
    /// The outer error only signals an unknown tool; everything a handler
    /// can hit comes back as the inner `ToolError`.
    pub async fn call(
        &self,
        name: &str,
        arguments: Option<Value>,
    ) -> Result<ToolResult, CoreError> {
        let tool = self
            .registry()
            .lookup(name)
            .ok_or_else(|| CoreError::ToolNotFound {
                name: name.to_owned(),
            })?;

        debug!(tool = name, "tool called");
        let args = Arguments::from_value(arguments);
        let result = self.run(tool, &args).await;

        if let Err(ref err) = result {
            warn!(tool = name, error = %err, "tool failed");
        }
        Ok(result)
    }

    // ── Shared handler steps ─────────────────────────────────────────

    async fn authenticate(&self) -> Result<(), ToolError> {
        self.controller
            .authenticate()
            .await
            .map_err(ToolError::wrap("Authentication failed"))
    }

    /// Authenticate, then resolve the call's `site_id` to a canonical id.
    async fn enter_site(&self, args: &Arguments) -> Result<String, ToolError> {
        self.authenticate().await?;

        let mut token = args.string("site_id");
        if token.is_empty() {
            if let Some(site) = &self.default_site {
                token.clone_from(site);
            }
        }

        resolver::resolve_site_id(self.controller.as_ref(), &token)
            .await
            .map_err(ToolError::wrap("Failed to resolve site ID"))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use serde_json::json;

    use super::fake::FakeController;
    use super::*;

    fn dispatcher(fake: FakeController) -> (Dispatcher, Arc<FakeController>) {
        let fake = Arc::new(fake);
        (Dispatcher::new(fake.clone()), fake)
    }

    #[tokio::test]
    async fn unknown_tool_is_not_found() {
        let (d, fake) = dispatcher(FakeController::with_home_site());
        let err = d.call("reboot_everything", None).await.unwrap_err();
        assert_eq!(err.to_string(), "tool 'reboot_everything' not found");
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn missing_arguments_use_defaults() {
        let (d, fake) = dispatcher(FakeController::with_home_site());
        let out = d.call("get_network_devices", None).await.unwrap().unwrap();
        assert_eq!(out["site_id"], "ext-1");
        assert_eq!(fake.calls(), ["authenticate", "get_sites", "get_devices ext-1"]);
    }

    #[tokio::test]
    async fn configured_site_fills_blank_site_id() {
        let mut fake = FakeController::with_home_site();
        fake.sites.push(crate::model::Site {
            id: "lab".into(),
            external_id: "ext-lab".into(),
            name: "Lab".into(),
        });
        let fake = Arc::new(fake);
        let d = Dispatcher::new(fake.clone()).with_default_site(Some("Lab".into()));

        let out = d
            .call("get_wifi_networks", Some(json!({ "site_id": "" })))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(out["site_id"], "ext-lab");

        let out = d
            .call("get_wifi_networks", Some(json!({ "site_id": "Home" })))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(out["site_id"], "ext-1");
    }

    #[tokio::test]
    async fn site_list_is_fetched_on_every_call() {
        let (d, fake) = dispatcher(FakeController::with_home_site());

        d.call("get_network_devices", Some(json!({ "site_id": "Home" })))
            .await
            .unwrap()
            .unwrap();
        d.call("get_acl_rules", Some(json!({ "site_id": "Home" })))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            fake.calls(),
            [
                "authenticate",
                "get_sites",
                "get_devices ext-1",
                "authenticate",
                "get_sites",
                "get_acl_rules ext-1",
            ]
        );
    }

    #[tokio::test]
    async fn blank_configured_site_is_ignored() {
        let fake = Arc::new(FakeController::with_home_site());
        let d = Dispatcher::new(fake).with_default_site(Some(String::new()));
        let out = d.call("get_vpn_servers", None).await.unwrap().unwrap();
        assert_eq!(out["site_id"], "ext-1");
    }
}
