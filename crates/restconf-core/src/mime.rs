//! MIME type classification for content negotiation.

use std::fmt;

/// A MIME type string classified into the buckets the dispatcher cares
/// about: plain JSON, plain XML, the RFC yang-data variants of each, and
/// server-sent events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimeType(String);

const YANG_DATA_JSON: &[&str] = &["application/yang-data+json", "application/yang.data+json"];
const YANG_DATA_XML: &[&str] = &["application/yang-data+xml", "application/yang.data+xml"];
const SSE: &str = "text/event-stream";

impl MimeType {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for plain `application/json` and both RFC yang-data+json spellings.
    pub fn is_json(&self) -> bool {
        self.0.contains("json")
    }

    /// True for plain `application/xml`, `text/xml`, and both RFC
    /// yang-data+xml spellings.
    pub fn is_xml(&self) -> bool {
        self.0.contains("xml")
    }

    /// True for the two RFC-specified yang-data media types, in either
    /// encoding. Presence of one of these triggers strict compliance.
    pub fn is_rfc(&self) -> bool {
        YANG_DATA_JSON.contains(&self.0.as_str()) || YANG_DATA_XML.contains(&self.0.as_str())
    }

    pub fn is_event_stream(&self) -> bool {
        self.0 == SSE
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MimeType {
    fn from(s: &str) -> Self {
        // Accept headers may carry a quality list; only the first entry
        // is taken and any `;q=...` suffix is stripped.
        let first = s.split(',').next().unwrap_or(s);
        let bare = first.split(';').next().unwrap_or(first).trim();
        Self(bare.to_string())
    }
}
