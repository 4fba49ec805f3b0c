// ── Site domain type ──

use serde::{Deserialize, Serialize};
use unimcp_api::SiteResponse;

/// A site as reported to tool callers.
///
/// Integration API sites carry two identifiers: the UUID every `v1` call
/// wants (`external_id`) and the legacy short name (`id`, e.g. `default`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    /// Internal reference name, used in legacy `/api/s/{name}/` paths.
    pub id: String,
    /// Canonical identifier for site-scoped API calls.
    pub external_id: String,
    /// Human-friendly display name.
    pub name: String,
}

impl From<SiteResponse> for Site {
    fn from(site: SiteResponse) -> Self {
        Self {
            id: site.internal_reference,
            external_id: site.id.to_string(),
            name: site.name,
        }
    }
}
