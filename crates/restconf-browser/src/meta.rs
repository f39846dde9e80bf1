//! Minimal schema description.
//!
//! The real module loader (YANG parsing, `ietf-yang-library` enumeration,
//! deviation handling) is an external collaborator. What the walker needs
//! from a schema is much smaller: for each node, its kind, its identifier,
//! and — for containers, lists, and the module root — the metas of its
//! children. Application code builds this tree once, by hand or from a
//! loader plugged in separately, and hands it to a [`crate::Browser`].

use std::sync::Arc;

/// The schema-node kinds the walker distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Container,
    List,
    Leaf,
    LeafList,
    Action,
    Notification,
}

/// A schema node: its identity, its module, and (for container-shaped
/// kinds) its children.
#[derive(Debug, Clone)]
pub struct Meta {
    pub ident: String,
    pub module: String,
    pub namespace: String,
    pub kind: Kind,
    pub children: Vec<Arc<Meta>>,
}

impl Meta {
    pub fn container(ident: impl Into<String>, module: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            ident: ident.into(),
            module: module.into(),
            namespace: namespace.into(),
            kind: Kind::Container,
            children: Vec::new(),
        }
    }

    pub fn leaf(ident: impl Into<String>, module: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            ident: ident.into(),
            module: module.into(),
            namespace: namespace.into(),
            kind: Kind::Leaf,
            children: Vec::new(),
        }
    }

    pub fn list(ident: impl Into<String>, module: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            ident: ident.into(),
            module: module.into(),
            namespace: namespace.into(),
            kind: Kind::List,
            children: Vec::new(),
        }
    }

    pub fn action(ident: impl Into<String>, module: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            ident: ident.into(),
            module: module.into(),
            namespace: namespace.into(),
            kind: Kind::Action,
            children: Vec::new(),
        }
    }

    pub fn notification(ident: impl Into<String>, module: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            ident: ident.into(),
            module: module.into(),
            namespace: namespace.into(),
            kind: Kind::Notification,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<Meta>) -> Self {
        self.children = children.into_iter().map(Arc::new).collect();
        self
    }

    pub fn child(&self, ident: &str) -> Option<Arc<Meta>> {
        self.children.iter().find(|c| c.ident == ident).cloned()
    }

    pub fn is_notification(&self) -> bool {
        matches!(self.kind, Kind::Notification)
    }

    pub fn is_action(&self) -> bool {
        matches!(self.kind, Kind::Action)
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, Kind::Leaf | Kind::LeafList)
    }

    pub fn is_list(&self) -> bool {
        matches!(self.kind, Kind::List | Kind::LeafList)
    }

    pub fn is_container(&self) -> bool {
        matches!(self.kind, Kind::Container)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_nested_schema_by_hand() {
        let module = Meta::container("car", "car", "urn:example:car").with_children(vec![
            Meta::leaf("speed", "car", "urn:example:car"),
            Meta::list("tire", "car", "urn:example:car"),
            Meta::action("rotateTires", "car", "urn:example:car"),
        ]);
        assert!(module.child("speed").unwrap().is_leaf());
        assert!(module.child("tire").unwrap().is_list());
        assert!(module.child("rotateTires").unwrap().is_action());
        assert!(module.child("missing").is_none());
    }
}
