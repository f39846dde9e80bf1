//! The polymorphic node interface application code implements.
//!
//! A node is asked for a narrow capability at a time — never "serialize
//! yourself" — so the same trait covers containers, lists, leaves,
//! actions, and notification sources. Every method has a default that
//! rejects the capability as unsupported, so a leaf node only needs to
//! implement [`Node::field`], a list only [`Node::next`], and so on.

use std::sync::Arc;

use async_trait::async_trait;
use restconf_core::error::RestconfError;
use serde_json::Value;

use crate::meta::Meta;
use crate::notify::{Closer, NotifySink};

/// Flags attached to a request that affect how a node should behave:
/// whether the target does not exist yet (`new`), and whether the walker
/// is inside a write transaction (`write`).
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeRequest {
    pub new: bool,
    pub write: bool,
}

fn unsupported(capability: &str) -> RestconfError {
    RestconfError::operation_failed(format!("{capability} not supported by this node"))
}

#[async_trait]
pub trait Node: Send + Sync {
    /// Descend into a container-shaped child named by `meta`. Returns
    /// `Ok(None)` when the container exists in the schema but has no
    /// instance at this point in the tree (e.g. an optional container
    /// that hasn't been configured).
    async fn child(&self, _req: &NodeRequest, meta: &Meta) -> Result<Option<Arc<dyn Node>>, RestconfError> {
        Err(unsupported(&format!("child({})", meta.ident)))
    }

    /// Advances a list cursor: returns the key value and node for the
    /// entry at `index`, or `Ok(None)` once the list is exhausted. Called
    /// repeatedly with `index = 0, 1, 2, ...` by the walker.
    async fn next(&self, meta: &Meta, _index: usize) -> Result<Option<(Value, Arc<dyn Node>)>, RestconfError> {
        Err(unsupported(&format!("next({})", meta.ident)))
    }

    /// Reads (`write: None`) or writes (`write: Some(value)`) a leaf.
    /// Returns the current value after the operation; for a pure write
    /// with no meaningful read-back, echoing the written value is fine.
    async fn field(&self, meta: &Meta, _write: Option<&Value>) -> Result<Option<Value>, RestconfError> {
        Err(unsupported(&format!("field({})", meta.ident)))
    }

    /// Invokes an RPC/action. `input` is `None` when the action takes no
    /// input; the returned value is `None` when the action has no output.
    async fn action(&self, meta: &Meta, _input: Option<Value>) -> Result<Option<Value>, RestconfError> {
        Err(unsupported(&format!("action({})", meta.ident)))
    }

    /// Subscribes to a notification stream, delivering events to `sink`
    /// until the returned [`Closer`] is invoked or the caller's context is
    /// cancelled.
    async fn notify(&self, meta: &Meta, _sink: NotifySink) -> Result<Closer, RestconfError> {
        Err(unsupported(&format!("notify({})", meta.ident)))
    }

    /// Brackets an edit transaction at the edit root. Default is a no-op,
    /// which is correct for nodes with no transactional state.
    async fn begin_edit(&self, _req: &NodeRequest) -> Result<(), RestconfError> {
        Ok(())
    }

    /// Closes the edit transaction opened by [`Node::begin_edit`].
    async fn end_edit(&self, _req: &NodeRequest) -> Result<(), RestconfError> {
        Ok(())
    }

    /// Deletes this node's instance.
    async fn delete(&self, meta: &Meta) -> Result<(), RestconfError> {
        Err(unsupported(&format!("delete({})", meta.ident)))
    }
}
