//! Parses a RESTCONF base URL and derives the sub-paths the proxy client
//! needs: `data/`, `operations/`, `streams/`, `schema/`, `ui/`, each scoped
//! under the (optional) `restconf=deviceId` segment.

use restconf_core::error::RestconfError;
use restconf_core::url::{append_segment, find_device_id_in_url};

/// An immutable, parsed RESTCONF base URL.
#[derive(Debug, Clone)]
pub struct Address {
    origin: String,
    device_segment: String,
    device_id: String,
}

impl Address {
    /// Parses `full_url` (e.g. `http://host:8080/restconf` or
    /// `http://host:8080/restconf=dev1`) into origin + device segment.
    pub fn parse(full_url: &str) -> Result<Self, RestconfError> {
        let double_slash = full_url
            .find("//")
            .ok_or_else(|| RestconfError::invalid_value("address missing scheme separator"))?;
        let after_scheme = double_slash + 2;
        let origin_end = full_url[after_scheme..]
            .find('/')
            .map(|idx| after_scheme + idx)
            .unwrap_or(full_url.len());
        let origin = full_url[..origin_end].to_string();
        let device_id = find_device_id_in_url(full_url);
        let device_segment = if device_id.is_empty() {
            "restconf".to_string()
        } else {
            format!("restconf={device_id}")
        };
        Ok(Self { origin, device_segment, device_id })
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    fn prefixed(&self, endpoint: &str) -> String {
        format!("{}/{}/{}", self.origin, self.device_segment, endpoint)
    }

    /// Base resource URL for `module`'s data tree, ending in `module:` with
    /// no trailing path segment yet.
    pub fn data_root(&self, module: &str) -> String {
        format!("{}{module}:", self.prefixed("data/"))
    }

    pub fn operations_root(&self, module: &str) -> String {
        format!("{}{module}:", self.prefixed("operations/"))
    }

    pub fn streams_root(&self, module: &str) -> String {
        format!("{}{module}:", self.prefixed("streams/"))
    }

    pub fn schema_url(&self, module: &str, ext: &str) -> String {
        append_segment(&self.prefixed("schema"), &format!("{module}{ext}"))
    }

    pub fn ui_url(&self, rest: &str) -> String {
        append_segment(&self.prefixed("ui"), rest)
    }
}
