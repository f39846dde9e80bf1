//! Payload encoders: serializing a node subtree (represented in memory as
//! a [`serde_json::Value`], the universal tree shape the browser walks)
//! into either JSON or XML text.
//!
//! JSON is the tree's native shape, so that encoder is a thin pass-
//! through. XML has no natural `serde_json::Value` projection, so it is
//! built by hand with `xml-rs`'s streaming [`EventWriter`], one element
//! per object key and one repeated element per array entry.

use xml::writer::{EmitterConfig, Error as XmlWriteError, EventWriter, XmlEvent};

use crate::error::RestconfError;

/// Serializes `value` as compact JSON text.
pub fn to_json_string(value: &serde_json::Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

/// Serializes `value` as an XML fragment rooted at an element named
/// `root`, carrying `namespace` as its default `xmlns`.
pub fn to_xml_string(
    value: &serde_json::Value,
    root: &str,
    namespace: &str,
) -> Result<String, RestconfError> {
    let mut buffer = Vec::new();
    {
        let mut writer: EventWriter<&mut Vec<u8>> = EmitterConfig::new()
            .write_document_declaration(false)
            .perform_indent(false)
            .create_writer(&mut buffer);
        write_element(&mut writer, root, Some(namespace), value).map_err(xml_err)?;
    }
    String::from_utf8(buffer).map_err(|e| RestconfError::operation_failed(e.to_string()))
}

fn write_element<W: std::io::Write>(
    writer: &mut EventWriter<W>,
    name: &str,
    namespace: Option<&str>,
    value: &serde_json::Value,
) -> Result<(), XmlWriteError> {
    match value {
        serde_json::Value::Array(items) => {
            for item in items {
                write_element(writer, name, namespace, item)?;
            }
            Ok(())
        }
        serde_json::Value::Object(map) => {
            let start = match namespace {
                Some(ns) => XmlEvent::start_element(name).attr("xmlns", ns),
                None => XmlEvent::start_element(name),
            };
            writer.write(start)?;
            for (key, child) in map {
                write_element(writer, key, None, child)?;
            }
            writer.write(XmlEvent::end_element())?;
            Ok(())
        }
        serde_json::Value::Null => {
            writer.write(XmlEvent::start_element(name))?;
            writer.write(XmlEvent::end_element())?;
            Ok(())
        }
        scalar => {
            writer.write(XmlEvent::start_element(name))?;
            writer.write(XmlEvent::characters(&scalar_text(scalar)))?;
            writer.write(XmlEvent::end_element())?;
            Ok(())
        }
    }
}

fn scalar_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn xml_err(e: XmlWriteError) -> RestconfError {
    RestconfError::operation_failed(format!("xml encode: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_encoder_is_pass_through() {
        let value = json!({"odometer": 1001});
        assert_eq!(to_json_string(&value), "{\"odometer\":1001}");
    }

    #[test]
    fn xml_encoder_wraps_object_fields_as_elements() {
        let value = json!({"odometer": 1001, "unit": "mi"});
        let xml = to_xml_string(&value, "mileage", "urn:example:car").unwrap();
        assert!(xml.starts_with("<mileage xmlns=\"urn:example:car\">"));
        assert!(xml.contains("<odometer>1001</odometer>"));
        assert!(xml.contains("<unit>mi</unit>"));
        assert!(xml.ends_with("</mileage>"));
    }

    #[test]
    fn xml_encoder_repeats_element_per_array_entry() {
        let value = json!({"tire": ["front-left", "front-right"]});
        let xml = to_xml_string(&value, "tires", "urn:example:car").unwrap();
        assert_eq!(xml.matches("<tire>").count(), 2);
    }

    #[test]
    fn xml_encoder_escapes_reserved_characters() {
        let value = json!({"note": "a & b < c"});
        let xml = to_xml_string(&value, "car", "urn:example:car").unwrap();
        assert!(xml.contains("a &amp; b &lt; c"));
    }
}
