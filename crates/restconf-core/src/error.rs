//! Error taxonomy shared by the dispatcher and the proxy client.
//!
//! Mirrors the shape of `abp_core::ContractError` / `abp-daemon::ApiError`:
//! one variant per protocol-level error kind, a numeric status code, and a
//! compliance-aware rendering to a response body.

use serde::Serialize;
use thiserror::Error;

use crate::compliance::ComplianceOptions;

/// Protocol-level errors. Each variant carries a human-readable message;
/// callers add the affected module/path when rendering (the node layer
/// that raises the error rarely knows the full URL path itself).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RestconfError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("access denied: {0}")]
    AccessDenied(String),

    #[error("in use: {0}")]
    InUse(String),

    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("operation failed: {0}")]
    OperationFailed(String),
}

impl RestconfError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn invalid_value(msg: impl Into<String>) -> Self {
        Self::InvalidValue(msg.into())
    }

    pub fn access_denied(msg: impl Into<String>) -> Self {
        Self::AccessDenied(msg.into())
    }

    pub fn in_use(msg: impl Into<String>) -> Self {
        Self::InUse(msg.into())
    }

    pub fn method_not_allowed(msg: impl Into<String>) -> Self {
        Self::MethodNotAllowed(msg.into())
    }

    pub fn operation_failed(msg: impl Into<String>) -> Self {
        Self::OperationFailed(msg.into())
    }

    /// HTTP status code for this error kind.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::InvalidValue(_) => 400,
            Self::AccessDenied(_) => 401,
            Self::InUse(_) => 409,
            Self::MethodNotAllowed(_) => 405,
            Self::OperationFailed(_) => 500,
        }
    }

    /// The `error-tag` value used in the structured error document.
    fn error_tag(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not-found",
            Self::InvalidValue(_) => "invalid-value",
            Self::AccessDenied(_) => "access-denied",
            Self::InUse(_) => "in-use",
            Self::MethodNotAllowed(_) => "operation-not-supported",
            Self::OperationFailed(_) => "operation-failed",
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::NotFound(m)
            | Self::InvalidValue(m)
            | Self::AccessDenied(m)
            | Self::InUse(m)
            | Self::MethodNotAllowed(m)
            | Self::OperationFailed(m) => m,
        }
    }

    /// Renders this error to a `(status, body)` pair under the given
    /// compliance profile. `error_path` is `{module}:{path}`, or empty if
    /// the error occurred before a path was resolved.
    pub fn render(&self, compliance: ComplianceOptions, error_path: &str) -> (u16, String) {
        let status = self.status_code();
        if compliance.simple_error_response {
            (status, self.message().to_string())
        } else {
            let doc = ErrorsDocument {
                ietf_restconf_errors: ErrorsBody {
                    error: vec![ErrorEntry {
                        error_type: "protocol",
                        error_tag: self.error_tag(),
                        error_path: error_path.to_string(),
                        error_message: self.message().to_string(),
                    }],
                },
            };
            let body = serde_json::to_string(&doc).unwrap_or_else(|_| self.message().to_string());
            (status, body)
        }
    }
}

#[derive(Serialize)]
struct ErrorsDocument {
    #[serde(rename = "ietf-restconf:errors")]
    ietf_restconf_errors: ErrorsBody,
}

#[derive(Serialize)]
struct ErrorsBody {
    error: Vec<ErrorEntry>,
}

#[derive(Serialize)]
struct ErrorEntry {
    #[serde(rename = "error-type")]
    error_type: &'static str,
    #[serde(rename = "error-tag")]
    error_tag: &'static str,
    #[serde(rename = "error-path")]
    error_path: String,
    #[serde(rename = "error-message")]
    error_message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_taxonomy() {
        assert_eq!(RestconfError::not_found("x").status_code(), 404);
        assert_eq!(RestconfError::invalid_value("x").status_code(), 400);
        assert_eq!(RestconfError::access_denied("x").status_code(), 401);
        assert_eq!(RestconfError::in_use("x").status_code(), 409);
        assert_eq!(RestconfError::method_not_allowed("x").status_code(), 405);
        assert_eq!(RestconfError::operation_failed("x").status_code(), 500);
    }

    #[test]
    fn simple_render_is_plain_message() {
        let err = RestconfError::in_use("lock held");
        let (status, body) = err.render(ComplianceOptions::simplified(), "car:tires");
        assert_eq!(status, 409);
        assert_eq!(body, "in use: lock held");
    }

    #[test]
    fn strict_render_is_structured_document() {
        let err = RestconfError::not_found("no such leaf");
        let (status, body) = err.render(ComplianceOptions::strict(), "car:tires/front");
        assert_eq!(status, 404);
        assert!(body.contains("\"ietf-restconf:errors\""));
        assert!(body.contains("\"error-tag\":\"not-found\""));
        assert!(body.contains("\"error-path\":\"car:tires/front\""));
    }
}
