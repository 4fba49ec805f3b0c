// ── Site resolution ──
//
// Callers name sites loosely: blank, "default", a display name, the legacy
// short name, or the UUID itself. Site-scoped controller calls need the
// canonical id. The site list is fetched on every resolution.

use tracing::debug;

use crate::controller::NetworkController;
use crate::error::CoreError;
use crate::model::Site;

/// Token meaning "whichever site the controller lists first".
pub const DEFAULT_SITE: &str = "default";

/// Resolve `token` to a canonical site id using a fresh site list.
pub async fn resolve_site_id(
    controller: &dyn NetworkController,
    token: &str,
) -> Result<String, CoreError> {
    let sites = controller.get_sites().await?;
    let resolved = pick_site(&sites, token)?;
    debug!(token, site_id = %resolved, "resolved site");
    Ok(resolved)
}

/// First match wins:
///
/// 1. blank or [`DEFAULT_SITE`] → first site
/// 2. exact display-name match
/// 3. exact internal or external id match
/// 4. the token itself, unvalidated
pub fn pick_site(sites: &[Site], token: &str) -> Result<String, CoreError> {
    let Some(first) = sites.first() else {
        return Err(CoreError::NoSitesAvailable);
    };

    if token.is_empty() || token == DEFAULT_SITE {
        return Ok(first.external_id.clone());
    }

    if let Some(site) = sites.iter().find(|s| s.name == token) {
        return Ok(site.external_id.clone());
    }

    if let Some(site) = sites
        .iter()
        .find(|s| s.id == token || s.external_id == token)
    {
        return Ok(site.external_id.clone());
    }

    Ok(token.to_owned())
}
