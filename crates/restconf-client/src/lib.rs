//! The RESTCONF proxy client: a [`restconf_browser::Device`] backed by
//! HTTP calls against a remote RESTCONF server, used to browse, edit, and
//! subscribe to a device's data tree as if it were local.

pub mod address;
pub mod client_node;
pub mod device;

pub use address::Address;
pub use client_node::ClientNode;
pub use device::RemoteDevice;
