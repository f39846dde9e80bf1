//! Binds one HTTP method + path to a [`Selection`] and performs the
//! corresponding walker operation.

use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use restconf_browser::{parse_path, Browser};
use restconf_core::compliance::ComplianceOptions;
use restconf_core::encode;
use restconf_core::error::RestconfError;
use restconf_core::mime::MimeType;
use restconf_core::wire::wire_format_for;
use tokio_util::sync::CancellationToken;

use crate::sse::SubscribeCounter;
use crate::validation::RequestValidator;

/// The `/restconf` endpoint a request came in under. `Data` and
/// `Operations` enforce different rules about which meta kinds they
/// accept; `Streams` always expects a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Data,
    Operations,
    Streams,
}

pub struct BrowserRequest<'a> {
    pub browser: &'a Browser,
    pub module: &'a str,
    pub data_path: &'a str,
    pub method: Method,
    pub body: Bytes,
    pub endpoint: Endpoint,
    pub compliance: ComplianceOptions,
    pub accept: MimeType,
    pub subscribe_counter: Arc<SubscribeCounter>,
    pub ctx: CancellationToken,
}

pub async fn handle(req: BrowserRequest<'_>) -> Response {
    let root = req.browser.root_with_context(req.ctx.clone());
    let segments = parse_path(req.data_path);

    let target = match root.find(&segments).await {
        Ok(Some(sel)) => sel,
        Ok(None) => return render_error(&RestconfError::not_found(req.data_path), req.compliance, req.module, req.data_path),
        Err(err) => return render_error(&err, req.compliance, req.module, req.data_path),
    };

    if req.endpoint == Endpoint::Operations && !target.meta.is_action() {
        let err = RestconfError::invalid_value("operations endpoint requires an action");
        return render_error(&err, req.compliance, req.module, req.data_path);
    }
    if req.endpoint == Endpoint::Data
        && target.meta.is_action()
        && segments.len() <= 1
        && !req.compliance.allow_rpc_under_data
    {
        let err = RestconfError::invalid_value("RPC under /data requires the relaxed compliance profile");
        return render_error(&err, req.compliance, req.module, req.data_path);
    }

    if req.method == Method::GET && target.meta.is_notification() {
        if req.endpoint != Endpoint::Streams && req.endpoint != Endpoint::Data {
            let err = RestconfError::invalid_value("notifications are only available under streams or data");
            return render_error(&err, req.compliance, req.module, req.data_path);
        }
        let wire = wire_format_for(&req.accept);
        return crate::sse::serve(
            target,
            wire,
            req.module.to_string(),
            req.compliance.disable_notification_wrapper,
            req.subscribe_counter,
        )
        .await;
    }

    match req.method {
        Method::GET => match target.read().await {
            Ok(value) => render_payload(&value, &target.meta.ident, &target.meta.namespace, &req.accept),
            Err(err) => render_error(&err, req.compliance, req.module, req.data_path),
        },
        Method::PATCH => {
            let value = match RequestValidator::validate_body(&req.body) {
                Ok(v) => v,
                Err(err) => return render_error(&err, req.compliance, req.module, req.data_path),
            };
            match target.upsert_from(value).await {
                Ok(()) => StatusCode::NO_CONTENT.into_response(),
                Err(err) => render_error(&err, req.compliance, req.module, req.data_path),
            }
        }
        Method::PUT => {
            let value = match RequestValidator::validate_body(&req.body) {
                Ok(v) => v,
                Err(err) => return render_error(&err, req.compliance, req.module, req.data_path),
            };
            match target.replace_from(value).await {
                Ok(()) => StatusCode::NO_CONTENT.into_response(),
                Err(err) => render_error(&err, req.compliance, req.module, req.data_path),
            }
        }
        Method::POST if target.meta.is_action() => {
            let body = match RequestValidator::validate_body(&req.body) {
                Ok(v) => v,
                Err(err) => return render_error(&err, req.compliance, req.module, req.data_path),
            };
            let wrapped = !req.compliance.disable_action_wrapper;
            let input = match RequestValidator::unwrap_input(body, req.module, wrapped) {
                Ok(v) => v,
                Err(err) => return render_error(&err, req.compliance, req.module, req.data_path),
            };
            match target.action(input).await {
                Ok(Some(output)) => {
                    let wrapped_output = RequestValidator::wrap_output(output, req.module, wrapped);
                    render_payload(&wrapped_output, &target.meta.ident, &target.meta.namespace, &req.accept)
                }
                Ok(None) => StatusCode::NO_CONTENT.into_response(),
                Err(err) => render_error(&err, req.compliance, req.module, req.data_path),
            }
        }
        Method::POST => {
            let value = match RequestValidator::validate_body(&req.body) {
                Ok(v) => v,
                Err(err) => return render_error(&err, req.compliance, req.module, req.data_path),
            };
            match target.insert_from(value).await {
                Ok(()) => StatusCode::CREATED.into_response(),
                Err(err) => render_error(&err, req.compliance, req.module, req.data_path),
            }
        }
        Method::DELETE => match target.delete().await {
            Ok(()) => StatusCode::NO_CONTENT.into_response(),
            Err(err) => render_error(&err, req.compliance, req.module, req.data_path),
        },
        Method::OPTIONS => StatusCode::OK.into_response(),
        _ => {
            let err = RestconfError::method_not_allowed(req.method.as_str());
            render_error(&err, req.compliance, req.module, req.data_path)
        }
    }
}

fn render_payload(value: &serde_json::Value, root_ident: &str, namespace: &str, accept: &MimeType) -> Response {
    if accept.is_xml() {
        match encode::to_xml_string(value, root_ident, namespace) {
            Ok(xml) => ([("content-type", "application/yang-data+xml")], xml).into_response(),
            Err(err) => render_error(&err, ComplianceOptions::strict(), root_ident, ""),
        }
    } else {
        let json = encode::to_json_string(value);
        ([("content-type", "application/yang-data+json")], json).into_response()
    }
}

pub(crate) fn render_error(err: &RestconfError, compliance: ComplianceOptions, module: &str, data_path: &str) -> Response {
    let path = if data_path.is_empty() {
        module.to_string()
    } else {
        format!("{module}:{data_path}")
    };
    let (status, body) = err.render(compliance, &path);
    (StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR), body).into_response()
}
