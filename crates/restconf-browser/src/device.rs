//! The device abstraction: the thing a URL's (optional) device id selects
//! between. A device exposes a schema source, an optional UI source, and
//! a browser per module it serves.

use async_trait::async_trait;
use restconf_core::error::RestconfError;

use crate::browser::Browser;

/// Static-asset lookup for the `ui` endpoint. Left unimplemented for
/// devices with no bundled web console.
pub trait UiSource: Send + Sync {
    fn open(&self, path: &str) -> Option<Vec<u8>>;
}

#[async_trait]
pub trait Device: Send + Sync {
    /// Returns the raw schema text for `module` with the requested
    /// extension (`.yang` or `.json`/description).
    async fn schema_source(&self, module: &str, ext: &str) -> Result<Vec<u8>, RestconfError>;

    fn ui_source(&self) -> Option<&dyn UiSource> {
        None
    }

    /// Returns a browser rooted at `module`, or a not-found error if the
    /// device does not serve that module.
    async fn browser(&self, module: &str) -> Result<Browser, RestconfError>;

    /// The modules currently loaded by this device.
    fn modules(&self) -> Vec<String>;

    async fn close(&self) -> Result<(), RestconfError> {
        Ok(())
    }
}
