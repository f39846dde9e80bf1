//! Shared primitives for the RESTCONF surface: URL segmentation, MIME
//! classification, compliance negotiation, wire-format envelopes, and the
//! error taxonomy shared by the dispatcher and the proxy client.

pub mod compliance;
pub mod encode;
pub mod error;
pub mod mime;
pub mod url;
pub mod wire;

pub use compliance::ComplianceOptions;
pub use error::RestconfError;
pub use mime::MimeType;
