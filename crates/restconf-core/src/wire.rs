//! Wire-format envelopes: the notification and RPC-output wrappers placed
//! around a node's serialized payload.
//!
//! The payload itself (the serialized subtree) is produced separately by
//! [`crate::encode`]; these four operations only open and close the
//! surrounding document, matching the shape the dispatcher and the
//! notification stream need to bracket around it.

use crate::mime::MimeType;

/// A wire format's envelope operations. Implementations only ever append
/// to `out`; they never need to read back what they wrote.
pub trait WireFormat: Send + Sync {
    fn write_notification_start(&self, out: &mut String, namespace: &str, event_time: &str);
    fn write_notification_end(&self, out: &mut String);
    fn write_rpc_output_start(&self, out: &mut String, module: &str);
    fn write_rpc_output_end(&self, out: &mut String);
}

/// `{"ietf-restconf:notification":{"eventTime":"...","event": ...}}` /
/// `{"{module}:output": ...}`.
pub struct JsonWireFormat;

impl WireFormat for JsonWireFormat {
    fn write_notification_start(&self, out: &mut String, _namespace: &str, event_time: &str) {
        out.push_str("{\"ietf-restconf:notification\":{\"eventTime\":\"");
        out.push_str(event_time);
        out.push_str("\",\"event\":");
    }

    fn write_notification_end(&self, out: &mut String) {
        out.push_str("}}");
    }

    fn write_rpc_output_start(&self, out: &mut String, module: &str) {
        out.push('{');
        out.push('"');
        out.push_str(module);
        out.push_str(":output\":");
    }

    fn write_rpc_output_end(&self, out: &mut String) {
        out.push('}');
    }
}

/// `<notification xmlns="urn:ietf:params:xml:ns:netconf:notification:1.0">
/// <eventTime>...</eventTime><event xmlns="...">...</event></notification>`.
///
/// RPC output has no XML envelope of its own: the payload encoder already
/// emits a single root element, so start/end are no-ops.
pub struct XmlWireFormat;

impl WireFormat for XmlWireFormat {
    fn write_notification_start(&self, out: &mut String, namespace: &str, event_time: &str) {
        out.push_str(
            "<notification xmlns=\"urn:ietf:params:xml:ns:netconf:notification:1.0\"><eventTime>",
        );
        out.push_str(event_time);
        out.push_str("</eventTime><event xmlns=\"");
        out.push_str(namespace);
        out.push_str("\">");
    }

    fn write_notification_end(&self, out: &mut String) {
        out.push_str("</event></notification>");
    }

    fn write_rpc_output_start(&self, _out: &mut String, _module: &str) {}

    fn write_rpc_output_end(&self, _out: &mut String) {}
}

/// Selects the envelope implementation for a negotiated MIME type. XML
/// wins only when explicitly requested; everything else gets JSON.
pub fn wire_format_for(mime: &MimeType) -> Box<dyn WireFormat> {
    if mime.is_xml() {
        Box::new(XmlWireFormat)
    } else {
        Box::new(JsonWireFormat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_notification_round_trips_as_valid_json() {
        let fmt = JsonWireFormat;
        let mut out = String::new();
        fmt.write_notification_start(&mut out, "urn:example:car", "2026-07-31T00:00:00Z");
        out.push_str("{\"speed\":10}");
        fmt.write_notification_end(&mut out);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(
            value["ietf-restconf:notification"]["eventTime"],
            "2026-07-31T00:00:00Z"
        );
        assert_eq!(value["ietf-restconf:notification"]["event"]["speed"], 10);
    }

    #[test]
    fn json_rpc_output_wrapper() {
        let fmt = JsonWireFormat;
        let mut out = String::new();
        fmt.write_rpc_output_start(&mut out, "car");
        out.push_str("{\"miles\":12}");
        fmt.write_rpc_output_end(&mut out);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["car:output"]["miles"], 12);
    }

    #[test]
    fn xml_notification_envelope_contains_event_time() {
        let fmt = XmlWireFormat;
        let mut out = String::new();
        fmt.write_notification_start(&mut out, "urn:example:car", "2026-07-31T00:00:00Z");
        out.push_str("<speed>10</speed>");
        fmt.write_notification_end(&mut out);
        assert!(out.starts_with("<notification"));
        assert!(out.contains("<eventTime>2026-07-31T00:00:00Z</eventTime>"));
        assert!(out.ends_with("</event></notification>"));
    }

    #[test]
    fn xml_rpc_output_has_no_envelope() {
        let fmt = XmlWireFormat;
        let mut out = String::new();
        fmt.write_rpc_output_start(&mut out, "car");
        out.push_str("<miles>12</miles>");
        fmt.write_rpc_output_end(&mut out);
        assert_eq!(out, "<miles>12</miles>");
    }

    #[test]
    fn selects_xml_only_on_explicit_request() {
        let mut out = String::new();
        wire_format_for(&MimeType::from("application/yang-data+xml"))
            .write_notification_start(&mut out, "ns", "t");
        assert!(out.starts_with("<notification"));

        let mut out = String::new();
        wire_format_for(&MimeType::from("application/json")).write_notification_start(&mut out, "ns", "t");
        assert!(out.starts_with('{'));
    }
}
