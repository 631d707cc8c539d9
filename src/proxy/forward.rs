//! Request forwarding to the backend
//!
//! Only whitelisted headers cross the proxy in either direction. The
//! upstream client speaks `http` 0.2 types (reqwest) while the server side
//! speaks `http` 1.x (axum), so methods, statuses and headers are carried
//! across as strings and bytes.

use axum::{
    body::{Body, Bytes},
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::Response,
};

use super::error::ProxyError;
use super::ProxyState;

/// Request headers passed to the backend.
pub const FORWARDED_REQUEST_HEADERS: [&str; 4] = ["content-type", "authorization", "cookie", "accept"];

/// Response headers relayed to the client. `set-cookie` keeps every value.
pub const RELAYED_RESPONSE_HEADERS: [&str; 3] = ["content-type", "set-cookie", "cache-control"];

/// Handler for `/api/proxy/*path`.
pub async fn forward(
    State(state): State<ProxyState>,
    Path(path): Path<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ProxyError> {
    let target = target_url(&state.api_base, &path, uri.query());
    tracing::debug!(%method, %target, "Forwarding request");

    let upstream_method = reqwest::Method::from_bytes(method.as_str().as_bytes())
        .map_err(|e| ProxyError::Internal(e.to_string()))?;

    let mut request = state.client.request(upstream_method, &target);
    for name in FORWARDED_REQUEST_HEADERS {
        for value in headers.get_all(name) {
            request = request.header(name, value.as_bytes());
        }
    }

    if let Some(payload) = request_body(&method, &headers, &body)? {
        request = request.body(payload);
    }

    let upstream = request
        .send()
        .await
        .map_err(|e| ProxyError::from_upstream(&e))?;

    let status = StatusCode::from_u16(upstream.status().as_u16())
        .map_err(|e| ProxyError::Internal(e.to_string()))?;

    let mut builder = Response::builder().status(status);
    for name in RELAYED_RESPONSE_HEADERS {
        for value in upstream.headers().get_all(name) {
            let value = HeaderValue::from_bytes(value.as_bytes())
                .map_err(|e| ProxyError::Internal(e.to_string()))?;
            builder = builder.header(name, value);
        }
    }

    let bytes = upstream
        .bytes()
        .await
        .map_err(|e| ProxyError::from_upstream(&e))?;

    tracing::debug!(status = status.as_u16(), bytes = bytes.len(), "Upstream responded");

    builder
        .body(Body::from(bytes))
        .map_err(|e| ProxyError::Internal(e.to_string()))
}

/// `<api_base>/<path>[?<query>]`
pub fn target_url(api_base: &str, path: &str, query: Option<&str>) -> String {
    let mut url = format!(
        "{}/{}",
        api_base.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        url.push('?');
        url.push_str(query);
    }
    url
}

/// Body to send upstream.
///
/// `GET`/`HEAD` and empty bodies send nothing. JSON bodies are parsed and
/// re-serialized; anything else is forwarded byte for byte.
fn request_body(
    method: &Method,
    headers: &HeaderMap,
    body: &Bytes,
) -> Result<Option<Vec<u8>>, ProxyError> {
    if *method == Method::GET || *method == Method::HEAD || body.is_empty() {
        return Ok(None);
    }

    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
        .unwrap_or(false);

    if is_json {
        let value: serde_json::Value = serde_json::from_slice(body)
            .map_err(|e| ProxyError::Internal(format!("Invalid JSON body: {}", e)))?;
        let encoded =
            serde_json::to_vec(&value).map_err(|e| ProxyError::Internal(e.to_string()))?;
        Ok(Some(encoded))
    } else {
        Ok(Some(body.to_vec()))
    }
}
