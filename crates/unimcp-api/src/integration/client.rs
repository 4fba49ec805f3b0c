// Async HTTP client for the UniFi Network Integration API.
//
// Base path: /integration/v1/ (UniFi OS: /proxy/network/integration/v1/)
// Auth: X-API-KEY header

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Instant;

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tokio::sync::OnceCell;
use tracing::debug;
use url::Url;

use super::types::{Page, SiteResource, SiteResponse};
use crate::error::Error;
use crate::legacy;
use crate::platform::ControllerPlatform;
use crate::transport::TransportConfig;

/// Page size used when a caller wants every element of a collection.
const FULL_PAGE: i32 = 200;

// ── Error response shape from the Integration API ────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

// ── Identifier checks ────────────────────────────────────────────────

/// Caller-supplied ids become exactly one path segment. `.` and `..` would
/// be dropped by the URL builder and are refused.
fn path_segment<'a>(field: &'static str, value: &'a str) -> Result<&'a str, Error> {
    if matches!(value, "" | "." | "..") {
        return Err(Error::InvalidIdentifier {
            field,
            value: value.to_owned(),
        });
    }
    Ok(value)
}

/// MAC addresses go into a quoted filter expression: hex digits with `:` or
/// `-` separators only.
fn mac_address(value: &str) -> Result<&str, Error> {
    let octets: Vec<&str> = value.split([':', '-']).collect();
    let well_formed = octets.len() == 6
        && octets
            .iter()
            .all(|octet| octet.len() == 2 && octet.chars().all(|c| c.is_ascii_hexdigit()));
    if well_formed {
        Ok(value)
    } else {
        Err(Error::InvalidIdentifier {
            field: "mac",
            value: value.to_owned(),
        })
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the UniFi Integration API.
///
/// Uses API-key authentication and communicates via JSON REST endpoints
/// under `/integration/v1/`. Resource payloads are returned as raw JSON.
pub struct IntegrationClient {
    http: reqwest::Client,
    /// Always ends with `/integration/`.
    base_url: Url,
    /// Controller root, for the legacy surface.
    root_url: Url,
    platform: ControllerPlatform,
    /// Set once the API key has been accepted by `GET v1/info`.
    verified: OnceCell<()>,
}

impl IntegrationClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from an API key, transport config, and detected platform.
    ///
    /// Injects `X-API-KEY` as a sensitive default header on every request.
    pub fn from_api_key(
        base_url: &str,
        api_key: &SecretString,
        transport: &TransportConfig,
        platform: ControllerPlatform,
    ) -> Result<Self, Error> {
        if api_key.expose_secret().is_empty() {
            return Err(Error::Authentication {
                message: "API key is empty".into(),
            });
        }

        let mut headers = HeaderMap::new();
        let mut key_value =
            HeaderValue::from_str(api_key.expose_secret()).map_err(|e| Error::Authentication {
                message: format!("invalid API key header value: {e}"),
            })?;
        key_value.set_sensitive(true);
        headers.insert("X-API-KEY", key_value);

        let http = transport.build_client_with_headers(headers)?;
        Self::from_reqwest(base_url, http, platform)
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(
        base_url: &str,
        http: reqwest::Client,
        platform: ControllerPlatform,
    ) -> Result<Self, Error> {
        let root_url = Url::parse(base_url)?;
        let base_url = Self::normalize_base_url(&root_url, platform);
        Ok(Self {
            http,
            base_url,
            root_url,
            platform,
            verified: OnceCell::new(),
        })
    }

    /// Build the base URL with correct platform prefix + `/integration/`.
    ///
    /// UniFi OS: `https://host/proxy/network/integration/`
    /// Standalone: `https://host/integration/`
    fn normalize_base_url(root: &Url, platform: ControllerPlatform) -> Url {
        let mut url = root.clone();
        let path = url.path().trim_end_matches('/').to_owned();

        if path.ends_with("/integration") {
            url.set_path(&format!("{path}/"));
        } else {
            let prefix = platform.integration_prefix();
            url.set_path(&format!("{path}{prefix}/"));
        }

        url
    }

    /// The controller platform this client was built for.
    pub fn platform(&self) -> ControllerPlatform {
        self.platform
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Append `segments` to the base URL, percent-encoding each one.
    ///
    /// A segment never spans more than one path component: `/`, `?` and `#`
    /// inside it are escaped rather than interpreted.
    fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn site_path(site_id: &str, resource: SiteResource) -> Result<Vec<&str>, Error> {
        let mut segments = vec!["v1", "sites", path_segment("site_id", site_id)?];
        segments.extend(resource.path().split('/'));
        Ok(segments)
    }

    fn item_path<'a>(
        site_id: &'a str,
        resource: SiteResource,
        id: &'a str,
    ) -> Result<Vec<&'a str>, Error> {
        let mut segments = Self::site_path(site_id, resource)?;
        segments.push(path_segment("id", id)?);
        Ok(segments)
    }

    /// Legacy site-scoped URL: `{root}{prefix}/api/s/{site}/{path}`
    fn legacy_site_url(&self, site: &str, path: &str) -> Result<Url, Error> {
        let site = path_segment("site_id", site)?;
        let prefix = self.platform.legacy_prefix().split('/').filter(|s| !s.is_empty());

        let mut url = self.root_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(prefix)
            .extend(["api", "s", site])
            .extend(path.split('/'));
        Ok(url)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, path: &[&str]) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        self.handle_response(resp).await
    }

    async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &[&str],
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url} params={params:?}");

        let resp = self.http.get(url).query(params).send().await?;
        self.handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &[&str],
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    async fn patch<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &[&str],
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("PATCH {url}");

        let resp = self.http.patch(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            // Empty success bodies (204, some PATCH handlers) decode as `null`.
            let text = if body.trim().is_empty() { "null" } else { &body };
            serde_json::from_str(text).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::InvalidApiKey;
        }

        let raw = resp.text().await.unwrap_or_default();

        if let Ok(err) = serde_json::from_str::<ErrorResponse>(&raw) {
            Error::Integration {
                status: status.as_u16(),
                message: err.message.unwrap_or_else(|| status.to_string()),
                code: err.code,
            }
        } else {
            Error::Integration {
                status: status.as_u16(),
                message: if raw.is_empty() {
                    status.to_string()
                } else {
                    raw
                },
                code: None,
            }
        }
    }

    // ── Pagination helper ────────────────────────────────────────────

    /// Collect all pages into a single `Vec<T>`.
    pub async fn paginate_all<T, F, Fut>(&self, limit: i32, fetch: F) -> Result<Vec<T>, Error>
    where
        F: Fn(i64, i32) -> Fut,
        Fut: Future<Output = Result<Page<T>, Error>>,
    {
        let mut all = Vec::new();
        let mut offset: i64 = 0;

        loop {
            let page = fetch(offset, limit).await?;
            let received = page.data.len();
            all.extend(page.data);

            let limit_usize = usize::try_from(limit).unwrap_or(0);
            let reached_total = page.total_count > 0
                && i64::try_from(all.len()).unwrap_or(i64::MAX) >= page.total_count;
            if received == 0 || received < limit_usize || reached_total {
                break;
            }

            offset += i64::try_from(received).unwrap_or(i64::MAX);
        }

        Ok(all)
    }

    async fn page_at(&self, path: &[&str], offset: i64, limit: i32) -> Result<Page<Value>, Error> {
        self.get_with_params(
            path,
            &[("offset", offset.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    async fn all_at(&self, path: &[&str]) -> Result<Vec<Value>, Error> {
        self.paginate_all(FULL_PAGE, |off, lim| self.page_at(path, off, lim))
            .await
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── Session ──────────────────────────────────────────────────────

    /// Confirm the API key is accepted.
    ///
    /// The first successful probe is remembered for the lifetime of the
    /// client; failures are not, so the next call probes again.
    pub async fn authenticate(&self) -> Result<(), Error> {
        self.verified
            .get_or_try_init(|| async {
                debug!("verifying API key");
                self.get_info().await.map(drop)
            })
            .await?;
        Ok(())
    }

    // ── System Info ──────────────────────────────────────────────────

    pub async fn get_info(&self) -> Result<Value, Error> {
        self.get(&["v1", "info"]).await
    }

    /// Probe `v1/info` and report reachability plus round-trip latency.
    pub async fn check_health(&self) -> Result<Value, Error> {
        let started = Instant::now();
        let info = self.get_info().await?;
        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        Ok(json!({
            "status": "healthy",
            "latency_ms": latency_ms,
            "version": info.get("applicationVersion").cloned().unwrap_or(Value::Null),
            "checked_at": chrono::Utc::now().to_rfc3339(),
        }))
    }

    // ── Sites ────────────────────────────────────────────────────────

    pub async fn list_sites(&self, offset: i64, limit: i32) -> Result<Page<SiteResponse>, Error> {
        self.get_with_params(
            &["v1", "sites"],
            &[("offset", offset.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    pub async fn all_sites(&self) -> Result<Vec<SiteResponse>, Error> {
        self.paginate_all(FULL_PAGE, |off, lim| self.list_sites(off, lim))
            .await
    }

    // ── Controller-scoped collections ────────────────────────────────

    pub async fn list_pending_devices(&self) -> Result<Vec<Value>, Error> {
        self.all_at(&["v1", "pending-devices"]).await
    }

    pub async fn list_dpi_categories(&self) -> Result<Vec<Value>, Error> {
        self.all_at(&["v1", "dpi", "categories"]).await
    }

    pub async fn list_dpi_applications(&self) -> Result<Vec<Value>, Error> {
        self.all_at(&["v1", "dpi", "applications"]).await
    }

    // ── Site-scoped collections ──────────────────────────────────────

    /// Every element of a site collection, across all pages.
    pub async fn list_all(
        &self,
        site_id: &str,
        resource: SiteResource,
    ) -> Result<Vec<Value>, Error> {
        self.all_at(&Self::site_path(site_id, resource)?).await
    }

    /// A single page of a site collection.
    pub async fn list_page(
        &self,
        site_id: &str,
        resource: SiteResource,
        offset: i64,
        limit: i32,
    ) -> Result<Page<Value>, Error> {
        self.page_at(&Self::site_path(site_id, resource)?, offset, limit)
            .await
    }

    pub async fn get_item(
        &self,
        site_id: &str,
        resource: SiteResource,
        id: &str,
    ) -> Result<Value, Error> {
        self.get(&Self::item_path(site_id, resource, id)?).await
    }

    /// Partially update an item. Non-object responses are kept under `data`.
    pub async fn patch_item(
        &self,
        site_id: &str,
        resource: SiteResource,
        id: &str,
        settings: &Map<String, Value>,
    ) -> Result<Map<String, Value>, Error> {
        let value: Value = self
            .patch(&Self::item_path(site_id, resource, id)?, settings)
            .await?;
        Ok(match value {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => Map::from_iter([("data".to_owned(), other)]),
        })
    }

    pub async fn create_item(
        &self,
        site_id: &str,
        resource: SiteResource,
        config: &Map<String, Value>,
    ) -> Result<Value, Error> {
        self.post(&Self::site_path(site_id, resource)?, config).await
    }

    // ── Devices ──────────────────────────────────────────────────────

    pub async fn get_device_statistics(
        &self,
        site_id: &str,
        device_id: &str,
    ) -> Result<Value, Error> {
        let mut path = Self::item_path(site_id, SiteResource::Devices, device_id)?;
        path.extend(["statistics", "latest"]);
        self.get(&path).await
    }

    // ── Clients ──────────────────────────────────────────────────────

    /// Look a client up by MAC address via the list endpoint's filter syntax.
    pub async fn find_client_by_mac(&self, site_id: &str, mac: &str) -> Result<Value, Error> {
        let mac = mac_address(mac)?;
        let page: Page<Value> = self
            .get_with_params(
                &Self::site_path(site_id, SiteResource::Clients)?,
                &[
                    ("filter", format!("macAddress.eq('{mac}')")),
                    ("limit", "1".to_owned()),
                ],
            )
            .await?;

        page.data.into_iter().next().ok_or_else(|| Error::NotFound {
            resource: "client",
            identifier: mac.to_owned(),
        })
    }

    /// Connected-client counts, total and per connection type.
    pub async fn client_statistics(&self, site_id: &str) -> Result<Value, Error> {
        let clients = self.list_all(site_id, SiteResource::Clients).await?;

        let mut by_type: BTreeMap<String, u64> = BTreeMap::new();
        for client in &clients {
            let kind = client
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("UNKNOWN");
            *by_type.entry(kind.to_owned()).or_default() += 1;
        }

        Ok(json!({
            "total": clients.len(),
            "by_type": by_type,
        }))
    }

    // ── Health (legacy surface) ──────────────────────────────────────

    /// Subsystem health entries (wan, lan, wlan, vpn, ...) for a site.
    ///
    /// `GET {prefix}/api/s/{internalReference}/stat/health`. The site UUID
    /// is mapped to its legacy name first; an unknown id is used verbatim.
    pub async fn site_health(&self, site_id: &str) -> Result<Vec<Value>, Error> {
        let sites = self.all_sites().await?;
        let legacy_name = sites
            .iter()
            .find(|s| s.id.to_string() == site_id)
            .map_or(site_id, |s| s.internal_reference.as_str());

        let url = self.legacy_site_url(legacy_name, "stat/health")?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        legacy::parse_envelope(resp).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn client(base: &str, platform: ControllerPlatform) -> IntegrationClient {
        IntegrationClient::from_reqwest(base, reqwest::Client::new(), platform).unwrap()
    }

    #[test]
    fn base_url_gets_platform_prefix() {
        let c = client("https://192.168.1.1", ControllerPlatform::UnifiOs);
        assert_eq!(
            c.base_url.as_str(),
            "https://192.168.1.1/proxy/network/integration/"
        );

        let c = client("https://ctrl:8443/", ControllerPlatform::ClassicController);
        assert_eq!(c.base_url.as_str(), "https://ctrl:8443/integration/");
    }

    #[test]
    fn explicit_integration_path_is_kept() {
        let c = client(
            "https://ctrl:8443/integration",
            ControllerPlatform::UnifiOs,
        );
        assert_eq!(c.base_url.as_str(), "https://ctrl:8443/integration/");
    }

    #[test]
    fn legacy_urls_use_root_and_prefix() {
        let c = client("https://192.168.1.1", ControllerPlatform::UnifiOs);
        assert_eq!(
            c.legacy_site_url("default", "stat/health").unwrap().as_str(),
            "https://192.168.1.1/proxy/network/api/s/default/stat/health"
        );
    }

    fn unnumbered_page(data: &[u32]) -> Page<u32> {
        Page {
            offset: 0,
            limit: 2,
            count: 0,
            total_count: 0,
            data: data.to_vec(),
        }
    }

    #[tokio::test]
    async fn pagination_without_total_count_reads_to_short_page() {
        let c = client("https://192.168.1.1", ControllerPlatform::UnifiOs);
        let all = c
            .paginate_all(2, |offset, _| async move {
                Ok(match offset {
                    0 => unnumbered_page(&[1, 2]),
                    2 => unnumbered_page(&[3, 4]),
                    _ => unnumbered_page(&[5]),
                })
            })
            .await
            .unwrap();
        assert_eq!(all, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn ids_stay_inside_one_path_segment() {
        let c = client("https://192.168.1.1", ControllerPlatform::UnifiOs);
        let path =
            IntegrationClient::item_path("ext-1", SiteResource::Devices, "../../../pending-devices")
                .unwrap();
        assert_eq!(
            c.url(&path).unwrap().as_str(),
            "https://192.168.1.1/proxy/network/integration/v1/sites/ext-1/devices/..%2F..%2F..%2Fpending-devices"
        );

        let path = IntegrationClient::item_path("ext-1", SiteResource::AclRules, "r1?x=1#frag")
            .unwrap();
        let url = c.url(&path).unwrap();
        assert_eq!(
            url.path(),
            "/proxy/network/integration/v1/sites/ext-1/acl-rules/r1%3Fx=1%23frag"
        );
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);

        let path = IntegrationClient::site_path("../../v1/info#", SiteResource::Devices).unwrap();
        assert_eq!(
            c.url(&path).unwrap().path(),
            "/proxy/network/integration/v1/sites/..%2F..%2Fv1%2Finfo%23/devices"
        );
    }

    #[test]
    fn dot_segments_and_bad_macs_are_refused() {
        for id in ["", ".", ".."] {
            assert!(matches!(
                IntegrationClient::item_path("default", SiteResource::Devices, id),
                Err(Error::InvalidIdentifier { field: "id", .. })
            ));
        }
        assert!(mac_address("aa:bb:cc:dd:ee:ff").is_ok());
        assert!(mac_address("AA-BB-CC-DD-EE-FF").is_ok());
        assert!(matches!(
            mac_address("aa:bb:cc:dd:ee:ff') or true or ('"),
            Err(Error::InvalidIdentifier { field: "mac", .. })
        ));
    }

    #[test]
    fn empty_api_key_is_rejected() {
        let result = IntegrationClient::from_api_key(
            "https://192.168.1.1",
            &SecretString::from(String::new()),
            &TransportConfig::default(),
            ControllerPlatform::UnifiOs,
        );
        assert!(matches!(result, Err(Error::Authentication { .. })));
    }
}
