//! Top-level request dispatch: the single entry point that segments a
//! RESTCONF URL, resolves a device, and hands off to the browser handler
//! or one of the static endpoints (version, discovery, schema, UI).

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use restconf_browser::Device;
use restconf_core::compliance::ComplianceOptions;
use restconf_core::error::RestconfError;
use restconf_core::mime::MimeType;
use tokio_util::sync::CancellationToken;

use crate::browser_handler::{self, BrowserRequest, Endpoint};
use crate::sse::SubscribeCounter;

/// Shared daemon state: the device map (empty key is the main device) and
/// server-wide knobs.
pub struct AppState {
    pub devices: HashMap<String, Arc<dyn Device>>,
    pub strict_only: bool,
    pub version: String,
    pub subscribe_counter: Arc<SubscribeCounter>,
}

impl AppState {
    pub fn with_main_device(device: Arc<dyn Device>) -> Self {
        let mut devices: HashMap<String, Arc<dyn Device>> = HashMap::new();
        devices.insert(String::new(), device);
        Self {
            devices,
            strict_only: false,
            version: env!("CARGO_PKG_VERSION").to_string(),
            subscribe_counter: Arc::new(SubscribeCounter::default()),
        }
    }
}

pub async fn dispatch(State(state): State<Arc<AppState>>, req: Request<Body>) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().unwrap_or("").to_string();
    let headers = req.headers().clone();

    if path == "/" {
        return if method == Method::OPTIONS {
            StatusCode::OK.into_response()
        } else {
            StatusCode::NOT_FOUND.into_response()
        };
    }
    if path == "/.ver" {
        return (StatusCode::OK, state.version.clone()).into_response();
    }
    if path == "/.well-known/host-meta" {
        let host = headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("localhost");
        return host_meta_response(host);
    }

    let (op1, device_id, rest) = restconf_core::url::shift_optional_param(&path, '=', '/');
    if op1 != "restconf" {
        return StatusCode::NOT_FOUND.into_response();
    }

    let device_key = device_id.unwrap_or_default();
    let Some(device) = state.devices.get(&device_key).cloned() else {
        let err = RestconfError::not_found(format!("device {device_key}"));
        return browser_handler::render_error(&err, ComplianceOptions::strict(), "restconf", "");
    };

    let (endpoint_str, rest2) = restconf_core::url::shift(&rest, '/');
    let endpoint = match endpoint_str.as_str() {
        "data" => Endpoint::Data,
        "operations" => Endpoint::Operations,
        "streams" => Endpoint::Streams,
        "schema" => return serve_schema(device.as_ref(), &rest2, &headers).await,
        "ui" => return serve_ui(device.as_ref(), &rest2),
        _ => return StatusCode::NOT_FOUND.into_response(),
    };

    let content_type = mime_header(&headers, header::CONTENT_TYPE);
    let accept = mime_header(&headers, header::ACCEPT);
    let simplified_requested = query
        .split('&')
        .any(|pair| pair == "simplified" || pair.starts_with("simplified="));
    let compliance = ComplianceOptions::negotiate(
        state.strict_only,
        simplified_requested,
        Some(&content_type),
        Some(&accept),
    );

    let (module, data_path) = restconf_core::url::shift(&rest2, ':');
    let browser = match device.browser(&module).await {
        Ok(b) => b,
        Err(err) => return browser_handler::render_error(&err, compliance, &module, &data_path),
    };

    let body: Bytes = match axum::body::to_bytes(req.into_body(), 16 * 1024 * 1024).await {
        Ok(b) => b,
        Err(_) => {
            let err = RestconfError::invalid_value("could not read request body");
            return browser_handler::render_error(&err, compliance, &module, &data_path);
        }
    };

    let ctx = CancellationToken::new();
    browser_handler::handle(BrowserRequest {
        browser: &browser,
        module: &module,
        data_path: &data_path,
        method,
        body,
        endpoint,
        compliance,
        accept,
        subscribe_counter: state.subscribe_counter.clone(),
        ctx,
    })
    .await
}

fn mime_header(headers: &axum::http::HeaderMap, name: header::HeaderName) -> MimeType {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(MimeType::from)
        .unwrap_or_else(|| MimeType::from("application/json"))
}

async fn serve_schema(device: &dyn Device, rest: &str, headers: &axum::http::HeaderMap) -> Response {
    let (segment, _) = restconf_core::url::shift(rest, '/');
    let accept = mime_header(headers, header::ACCEPT);
    let (module, ext) = match segment.rsplit_once('.') {
        Some((name, ext)) => (name.to_string(), format!(".{ext}")),
        None if accept.is_json() => (segment, ".json".to_string()),
        None => (segment, ".yang".to_string()),
    };
    match device.schema_source(&module, &ext).await {
        Ok(bytes) => {
            let content_type = if ext == ".json" { "application/json" } else { "application/yang" };
            ([(header::CONTENT_TYPE, content_type)], bytes).into_response()
        }
        Err(err) => browser_handler::render_error(&err, ComplianceOptions::strict(), &module, ""),
    }
}

fn serve_ui(device: &dyn Device, rest: &str) -> Response {
    let Some(ui) = device.ui_source() else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match ui.open(rest) {
        Some(bytes) => {
            let content_type = guess_content_type(rest);
            ([(header::CONTENT_TYPE, content_type)], bytes).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

fn guess_content_type(path: &str) -> &'static str {
    match path.rsplit('.').next().unwrap_or("") {
        "html" => "text/html",
        "js" => "text/javascript",
        "css" => "text/css",
        "json" => "application/json",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        _ => "application/octet-stream",
    }
}

fn host_meta_response(host: &str) -> Response {
    let body = serde_json::json!({
        "subject": format!("http://{host}/"),
        "links": [ { "rel": "restconf", "href": "/restconf" } ],
    });
    ([(header::CONTENT_TYPE, "application/json")], body.to_string()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guesses_common_extensions() {
        assert_eq!(guess_content_type("index.html"), "text/html");
        assert_eq!(guess_content_type("app.js"), "text/javascript");
        assert_eq!(guess_content_type("unknown.bin"), "application/octet-stream");
    }
}
