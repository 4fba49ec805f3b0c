// Legacy API envelope handling
//
// The legacy surface (`/api/s/{site}/...`) wraps every payload as
// `{ data: [], meta: { rc, msg } }`. Only the site health dashboard is
// read from it; the Integration API has no equivalent.

use serde::Deserialize;
use serde_json::Value;

use crate::error::Error;

#[derive(Debug, Deserialize)]
struct LegacyResponse {
    meta: LegacyMeta,
    #[serde(default)]
    data: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct LegacyMeta {
    rc: String,
    #[serde(default)]
    msg: Option<String>,
}

/// UniFi OS wraps some errors as `{"error":{"code":N,"message":"..."}}` with HTTP 200.
#[derive(Deserialize)]
struct UnifiOsError {
    error: Option<UnifiOsErrorInner>,
}

#[derive(Deserialize)]
struct UnifiOsErrorInner {
    code: u16,
    message: Option<String>,
}

/// Parse the `{ meta, data }` envelope, returning `data` on success
/// or an `Error::LegacyApi` if `meta.rc != "ok"`.
pub(crate) async fn parse_envelope(resp: reqwest::Response) -> Result<Vec<Value>, Error> {
    let status = resp.status();

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(Error::InvalidApiKey);
    }

    if status == reqwest::StatusCode::FORBIDDEN {
        return Err(Error::LegacyApi {
            message: "insufficient permissions (HTTP 403)".into(),
        });
    }

    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::LegacyApi {
            message: format!("HTTP {status}: {}", preview(&body)),
        });
    }

    let body = resp.text().await?;
    decode_envelope(&body)
}

fn decode_envelope(body: &str) -> Result<Vec<Value>, Error> {
    if let Ok(UnifiOsError { error: Some(err) }) = serde_json::from_str::<UnifiOsError>(body) {
        let msg = err.message.unwrap_or_default();
        return Err(if err.code == 401 {
            Error::Authentication { message: msg }
        } else {
            Error::LegacyApi {
                message: format!("UniFi OS error {}: {msg}", err.code),
            }
        });
    }

    let envelope: LegacyResponse =
        serde_json::from_str(body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(body)),
            body: body.to_owned(),
        })?;

    match envelope.meta.rc.as_str() {
        "ok" => Ok(envelope.data),
        _ => Err(Error::LegacyApi {
            message: envelope
                .meta
                .msg
                .unwrap_or_else(|| format!("rc={}", envelope.meta.rc)),
        }),
    }
}

fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
