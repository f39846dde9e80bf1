//! The browser: a schema-driven tree walker that binds HTTP-shaped
//! operations (read, upsert, replace, delete, action, notify) to an
//! abstract [`Node`] tree supplied by application code.
//!
//! Nothing here knows about HTTP. The daemon crate drives a [`Selection`]
//! from a parsed URL; the client crate implements [`Node`] against an
//! outbound HTTP connection instead of in-process state. Both sides share
//! this module so a remote tree is, to calling code, indistinguishable
//! from a local one.

pub mod browser;
pub mod device;
pub mod meta;
pub mod node;
pub mod notify;
pub mod path;
pub mod selection;

pub use browser::Browser;
pub use device::{Device, UiSource};
pub use meta::{Kind, Meta};
pub use node::{Node, NodeRequest};
pub use notify::{Closer, Notification, NotifySink};
pub use path::{parse_path, PathSegment};
pub use selection::Selection;
