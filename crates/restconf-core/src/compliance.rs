//! Compliance profiles: the set of deviations from strict RFC behavior a
//! server may opt into.

use std::fmt;

use crate::mime::MimeType;

/// Deviations from strict specification behavior. `Strict` (the
/// [`Default`]) has every flag off; [`ComplianceOptions::simplified`] turns
/// all of them on. Individual flags may also be mixed by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ComplianceOptions {
    /// Permit RPC/action requests to be issued under `/data` instead of
    /// requiring `/operations`.
    pub allow_rpc_under_data: bool,
    /// Omit the `ietf-restconf:notification` / NETCONF notification
    /// envelope around streamed events.
    pub disable_notification_wrapper: bool,
    /// Omit the `{module}:input` / `{module}:output` wrapper around
    /// action payloads.
    pub disable_action_wrapper: bool,
    /// Render errors as a plain text message instead of the structured
    /// `ietf-restconf:errors` document.
    pub simple_error_response: bool,
}

impl ComplianceOptions {
    /// All deviations off: the RFC-literal behavior.
    pub const fn strict() -> Self {
        Self {
            allow_rpc_under_data: false,
            disable_notification_wrapper: false,
            disable_action_wrapper: false,
            simple_error_response: false,
        }
    }

    /// All deviations on: the ergonomic, wrapper-free behavior most
    /// interactive clients expect.
    pub const fn simplified() -> Self {
        Self {
            allow_rpc_under_data: true,
            disable_notification_wrapper: true,
            disable_action_wrapper: true,
            simple_error_response: true,
        }
    }

    fn is_strict(&self) -> bool {
        *self == Self::strict()
    }

    fn is_simplified(&self) -> bool {
        *self == Self::simplified()
    }

    /// Chooses between [`Self::strict`] and [`Self::simplified`] for one
    /// request, given whether the server is pinned to strict-only, whether
    /// the request asked for the `simplified` query flag, and the
    /// negotiated content/accept types.
    pub fn negotiate(
        strict_only: bool,
        simplified_requested: bool,
        content_type: Option<&MimeType>,
        accept: Option<&MimeType>,
    ) -> Self {
        if strict_only {
            return Self::strict();
        }
        if simplified_requested {
            return Self::simplified();
        }
        let rfc_requested = content_type.is_some_and(MimeType::is_rfc) || accept.is_some_and(MimeType::is_rfc);
        if rfc_requested {
            return Self::strict();
        }
        if accept.is_some_and(MimeType::is_event_stream) {
            return Self::strict();
        }
        Self::simplified()
    }
}

impl fmt::Display for ComplianceOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_simplified() {
            f.write_str("simplified")
        } else if self.is_strict() {
            f.write_str("strict")
        } else {
            write!(f, "mixed {self:?}")
        }
    }
}
