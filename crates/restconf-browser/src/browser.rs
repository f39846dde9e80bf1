//! A browser pairs a module's schema root with its root node and mints
//! selections bound to a request's cancellation scope.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::meta::Meta;
use crate::node::Node;
use crate::selection::Selection;

#[derive(Clone)]
pub struct Browser {
    pub module: Arc<Meta>,
    root: Arc<dyn Node>,
}

impl Browser {
    pub fn new(module: Arc<Meta>, root: Arc<dyn Node>) -> Self {
        Self { module, root }
    }

    /// A root selection with a fresh, never-cancelled context. Convenient
    /// for tests and for callers that manage cancellation themselves.
    pub fn root(&self) -> Selection {
        self.root_with_context(CancellationToken::new())
    }

    /// A root selection bound to the given cancellation scope, as the
    /// dispatcher derives one per incoming request.
    pub fn root_with_context(&self, ctx: CancellationToken) -> Selection {
        Selection::new(self.module.clone(), self.root.clone(), ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeRequest;
    use async_trait::async_trait;
    use restconf_core::error::RestconfError;

    struct EmptyRoot;

    #[async_trait]
    impl Node for EmptyRoot {
        async fn field(&self, meta: &Meta, _write: Option<&serde_json::Value>) -> Result<Option<serde_json::Value>, RestconfError> {
            let _ = meta;
            Ok(None)
        }
    }

    #[tokio::test]
    async fn root_selection_shares_cancellation_token() {
        let module = Arc::new(Meta::container("car", "car", "urn:example:car"));
        let browser = Browser::new(module, Arc::new(EmptyRoot));
        let token = CancellationToken::new();
        let sel = browser.root_with_context(token.clone());
        assert!(!sel.ctx.is_cancelled());
        token.cancel();
        assert!(sel.ctx.is_cancelled());
    }

    #[tokio::test]
    async fn unimplemented_child_reports_unsupported() {
        let module = Arc::new(Meta::container("car", "car", "urn:example:car"));
        let browser = Browser::new(module.clone(), Arc::new(EmptyRoot));
        let sel = browser.root();
        let err = sel.node.child(&NodeRequest::default(), &module).await.unwrap_err();
        assert!(matches!(err, RestconfError::OperationFailed(_)));
    }
}
