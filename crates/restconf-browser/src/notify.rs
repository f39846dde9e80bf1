//! Notification plumbing: the event shape delivered to a subscriber and
//! the callback/closer pair a [`crate::Node::notify`] implementation is
//! handed.

use std::sync::Arc;

use restconf_core::error::RestconfError;

/// One delivered event: its timestamp (already formatted per
/// `YYYY-MM-DDTHH:MM:SS±HH:MM`) and its serialized body.
#[derive(Debug, Clone)]
pub struct Notification {
    pub event_time: String,
    pub event: serde_json::Value,
}

/// The callback a notification producer invokes per event. Implementations
/// (the SSE handler, the proxy client's forwarding task) must not panic;
/// `notify.rs` callers are expected to catch panics at the call site since
/// this sink often runs inside a spawned task.
pub type NotifySink = Arc<dyn Fn(Notification) -> Result<(), RestconfError> + Send + Sync>;

/// Returned by a successful subscribe; calling it (or dropping a caller's
/// only reference and letting the request context cancel) ends the
/// subscription.
pub struct Closer(Box<dyn FnOnce() + Send>);

impl Closer {
    pub fn new(f: impl FnOnce() + Send + 'static) -> Self {
        Self(Box::new(f))
    }

    pub fn noop() -> Self {
        Self::new(|| {})
    }

    pub fn close(self) {
        (self.0)();
    }
}

impl std::fmt::Debug for Closer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Closer(..)")
    }
}
