//! The selection cursor and the walker algorithms (find, read, upsert,
//! replace, insert, delete, action, notify) that drive a [`Node`] tree.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use restconf_core::error::RestconfError;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::meta::{Kind, Meta};
use crate::node::{Node, NodeRequest};
use crate::notify::{Closer, NotifySink};
use crate::path::PathSegment;

/// A cursor into the data tree: the schema position, the node backing it,
/// and the cancellation scope it is bound to. Selections are cheap to
/// clone (an `Arc` bump) and are meant to be short-lived — created,
/// walked, and dropped within one request.
#[derive(Clone)]
pub struct Selection {
    pub meta: Arc<Meta>,
    pub node: Arc<dyn Node>,
    pub ctx: CancellationToken,
}

impl Selection {
    pub fn new(meta: Arc<Meta>, node: Arc<dyn Node>, ctx: CancellationToken) -> Self {
        Self { meta, node, ctx }
    }

    /// Walks `path` one segment at a time, returning `Ok(None)` as soon as
    /// a segment fails to resolve (unknown child, or a list key with no
    /// matching entry).
    pub async fn find(&self, path: &[PathSegment]) -> Result<Option<Selection>, RestconfError> {
        let mut current = self.clone();
        for segment in path {
            match current.step(segment).await? {
                Some(next) => current = next,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    async fn step(&self, segment: &PathSegment) -> Result<Option<Selection>, RestconfError> {
        let child_meta = match self.meta.child(&segment.ident) {
            Some(m) => m,
            None => return Ok(None),
        };

        if child_meta.is_list() {
            if segment.keys.is_empty() {
                // Selecting the list itself (no entry key) is used by GET
                // of the whole list and by insert-from on POST.
                return Ok(Some(Selection::new(child_meta, self.node.clone(), self.ctx.clone())));
            }
            let mut index = 0usize;
            loop {
                match self.node.next(&child_meta, index).await? {
                    Some((key, entry_node)) => {
                        if keys_match(&key, &segment.keys) {
                            return Ok(Some(Selection::new(child_meta, entry_node, self.ctx.clone())));
                        }
                        index += 1;
                    }
                    None => return Ok(None),
                }
            }
        }

        let req = NodeRequest::default();
        match self.node.child(&req, &child_meta).await? {
            Some(child_node) => Ok(Some(Selection::new(child_meta, child_node, self.ctx.clone()))),
            None => Ok(None),
        }
    }

    /// Serializes this selection's subtree.
    pub async fn read(&self) -> Result<Value, RestconfError> {
        read_subtree(self.node.as_ref(), &self.meta).await
    }

    /// Creates-or-merges `input` into this selection (`PATCH`).
    pub async fn upsert_from(&self, input: Value) -> Result<(), RestconfError> {
        self.edit(input, false, false).await
    }

    /// Fully replaces this selection's subtree with `input` (`PUT`).
    pub async fn replace_from(&self, input: Value) -> Result<(), RestconfError> {
        self.edit(input, true, false).await
    }

    /// Creates a new child entry under this selection (`POST` on a list
    /// or container, not an action).
    pub async fn insert_from(&self, input: Value) -> Result<(), RestconfError> {
        self.edit(input, false, true).await
    }

    async fn edit(&self, input: Value, replace: bool, new: bool) -> Result<(), RestconfError> {
        let req = NodeRequest { new, write: true };
        self.node.begin_edit(&req).await?;
        let result = write_subtree(self.node.as_ref(), &self.meta, &input, replace).await;
        // Always attempt to close the transaction, but surface the write
        // error first if there was one.
        let end_result = self.node.end_edit(&req).await;
        result.and(end_result)
    }

    pub async fn delete(&self) -> Result<(), RestconfError> {
        self.node.delete(&self.meta).await
    }

    pub async fn action(&self, input: Option<Value>) -> Result<Option<Value>, RestconfError> {
        if !self.meta.is_action() {
            return Err(RestconfError::invalid_value(format!("{} is not an action", self.meta.ident)));
        }
        self.node.action(&self.meta, input).await
    }

    pub async fn notify(&self, sink: NotifySink) -> Result<Closer, RestconfError> {
        if !self.meta.is_notification() {
            return Err(RestconfError::invalid_value(format!("{} is not a notification", self.meta.ident)));
        }
        self.node.notify(&self.meta, sink).await
    }
}

fn keys_match(actual: &Value, expected: &[String]) -> bool {
    match actual {
        Value::Array(items) => {
            items.len() == expected.len()
                && items.iter().zip(expected).all(|(item, want)| scalar_eq(item, want))
        }
        single => expected.len() == 1 && scalar_eq(single, &expected[0]),
    }
}

fn scalar_eq(value: &Value, expected: &str) -> bool {
    match value {
        Value::String(s) => s == expected,
        Value::Number(n) => n.to_string() == expected,
        Value::Bool(b) => b.to_string() == expected,
        _ => false,
    }
}

fn read_subtree<'a>(node: &'a dyn Node, meta: &'a Meta) -> BoxFuture<'a, Result<Value, RestconfError>> {
    async move {
        match meta.kind {
            Kind::Leaf | Kind::LeafList => Ok(node.field(meta, None).await?.unwrap_or(Value::Null)),
            Kind::Action | Kind::Notification => Ok(Value::Null),
            Kind::List => {
                let mut items = Vec::new();
                let mut index = 0usize;
                while let Some((_, entry_node)) = node.next(meta, index).await? {
                    items.push(read_subtree(entry_node.as_ref(), meta).await?);
                    index += 1;
                }
                Ok(Value::Array(items))
            }
            Kind::Container => {
                let mut object = serde_json::Map::new();
                for child_meta in &meta.children {
                    match child_meta.kind {
                        Kind::Container => {
                            let req = NodeRequest::default();
                            if let Some(child_node) = node.child(&req, child_meta).await? {
                                object.insert(child_meta.ident.clone(), read_subtree(child_node.as_ref(), child_meta).await?);
                            }
                        }
                        Kind::Leaf | Kind::LeafList => {
                            if let Some(value) = node.field(child_meta, None).await? {
                                object.insert(child_meta.ident.clone(), value);
                            }
                        }
                        Kind::List => {
                            let mut items = Vec::new();
                            let mut index = 0usize;
                            while let Some((_, entry_node)) = node.next(child_meta, index).await? {
                                items.push(read_subtree(entry_node.as_ref(), child_meta).await?);
                                index += 1;
                            }
                            object.insert(child_meta.ident.clone(), Value::Array(items));
                        }
                        Kind::Action | Kind::Notification => {}
                    }
                }
                Ok(Value::Object(object))
            }
        }
    }
    .boxed()
}

/// Writes `input` into `node`'s subtree described by `meta`. Fields absent
/// from `input` are left untouched on upsert; full schema-level clearing
/// of absent fields on replace is out of scope (no schema validator is
/// available to know which fields are clearable vs. mandatory), so
/// `replace` currently behaves as a merge that additionally clears any
/// leaf explicitly set to `null` in `input`. See DESIGN.md.
fn write_subtree<'a>(
    node: &'a dyn Node,
    meta: &'a Meta,
    input: &'a Value,
    replace: bool,
) -> BoxFuture<'a, Result<(), RestconfError>> {
    async move {
        let object = match input.as_object() {
            Some(o) => o,
            None if meta.is_leaf() => {
                node.field(meta, Some(input)).await?;
                return Ok(());
            }
            None => return Err(RestconfError::invalid_value(format!("{} expects an object body", meta.ident))),
        };

        for (key, value) in object {
            let Some(child_meta) = meta.child(key) else {
                return Err(RestconfError::invalid_value(format!("unknown member {key} under {}", meta.ident)));
            };
            match child_meta.kind {
                Kind::Leaf | Kind::LeafList => {
                    node.field(&child_meta, Some(value)).await?;
                }
                Kind::Container => {
                    let req = NodeRequest { new: !replace, write: true };
                    let existing = node.child(&NodeRequest::default(), &child_meta).await?;
                    let child_node = match existing {
                        Some(n) => n,
                        None => node
                            .child(&req, &child_meta)
                            .await?
                            .ok_or_else(|| RestconfError::operation_failed(format!("could not create {key}")))?,
                    };
                    write_subtree(child_node.as_ref(), &child_meta, value, replace).await?;
                }
                Kind::List => {
                    let entries = value.as_array().ok_or_else(|| {
                        RestconfError::invalid_value(format!("{key} expects an array body"))
                    })?;
                    for entry in entries {
                        let req = NodeRequest { new: true, write: true };
                        let entry_node = node
                            .child(&req, &child_meta)
                            .await?
                            .ok_or_else(|| RestconfError::operation_failed(format!("could not create entry in {key}")))?;
                        write_subtree(entry_node.as_ref(), &child_meta, entry, replace).await?;
                    }
                }
                Kind::Action | Kind::Notification => {
                    return Err(RestconfError::invalid_value(format!("{key} cannot be written")));
                }
            }
        }
        Ok(())
    }
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use async_trait::async_trait;
    use std::sync::{Mutex, Weak};

    struct CarNode {
        speed: Mutex<i64>,
        tires: Mutex<Vec<(String, i64)>>,
        self_ref: Weak<CarNode>,
    }

    impl CarNode {
        fn new() -> Arc<Self> {
            Arc::new_cyclic(|weak| Self {
                speed: Mutex::new(0),
                tires: Mutex::new(Vec::new()),
                self_ref: weak.clone(),
            })
        }
    }

    #[async_trait]
    impl Node for CarNode {
        async fn field(&self, meta: &Meta, write: Option<&Value>) -> Result<Option<Value>, RestconfError> {
            match meta.ident.as_str() {
                "speed" => {
                    if let Some(v) = write {
                        *self.speed.lock().unwrap() = v.as_i64().unwrap_or(0);
                    }
                    Ok(Some(Value::from(*self.speed.lock().unwrap())))
                }
                other => Err(RestconfError::not_found(other)),
            }
        }

        async fn next(&self, meta: &Meta, index: usize) -> Result<Option<(Value, Arc<dyn Node>)>, RestconfError> {
            if meta.ident != "tire" {
                return Err(RestconfError::not_found(&meta.ident));
            }
            let tires = self.tires.lock().unwrap();
            match tires.get(index) {
                Some((name, pressure)) => Ok(Some((
                    Value::String(name.clone()),
                    Arc::new(TireNode { pressure: *pressure }) as Arc<dyn Node>,
                ))),
                None => Ok(None),
            }
        }

        async fn child(&self, req: &NodeRequest, meta: &Meta) -> Result<Option<Arc<dyn Node>>, RestconfError> {
            if meta.ident == "tire" && req.new {
                self.tires.lock().unwrap().push(("new".to_string(), 32));
                let idx = self.tires.lock().unwrap().len() - 1;
                let pressure = self.tires.lock().unwrap()[idx].1;
                return Ok(Some(Arc::new(TireNode { pressure })));
            }
            match meta.ident.as_str() {
                "speed" => Ok(self.self_ref.upgrade().map(|arc| arc as Arc<dyn Node>)),
                _ => Ok(None),
            }
        }
    }

    struct TireNode {
        pressure: i64,
    }

    #[async_trait]
    impl Node for TireNode {
        async fn field(&self, meta: &Meta, _write: Option<&Value>) -> Result<Option<Value>, RestconfError> {
            match meta.ident.as_str() {
                "pressure" => Ok(Some(Value::from(self.pressure))),
                other => Err(RestconfError::not_found(other)),
            }
        }

        async fn child(&self, _req: &NodeRequest, meta: &Meta) -> Result<Option<Arc<dyn Node>>, RestconfError> {
            match meta.ident.as_str() {
                "pressure" => Ok(Some(Arc::new(TireNode { pressure: self.pressure }))),
                _ => Ok(None),
            }
        }
    }

    fn car_meta() -> Arc<Meta> {
        Arc::new(
            Meta::container("car", "car", "urn:example:car").with_children(vec![
                Meta::leaf("speed", "car", "urn:example:car"),
                Meta::list("tire", "car", "urn:example:car")
                    .with_children(vec![Meta::leaf("pressure", "car", "urn:example:car")]),
            ]),
        )
    }

    fn root_selection() -> Selection {
        let node: Arc<dyn Node> = CarNode::new();
        Selection::new(car_meta(), node, CancellationToken::new())
    }

    #[tokio::test]
    async fn read_assembles_leaves_and_lists() {
        let sel = root_selection();
        sel.node.field(&sel.meta.child("speed").unwrap(), Some(&Value::from(42))).await.unwrap();
        let value = sel.read().await.unwrap();
        assert_eq!(value["speed"], 42);
        assert_eq!(value["tire"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn find_resolves_leaf_path() {
        let sel = root_selection();
        let path = crate::path::parse_path("speed");
        let found = sel.find(&path).await.unwrap();
        assert!(found.is_some());
        assert_eq!(found.unwrap().meta.ident, "speed");
    }

    #[tokio::test]
    async fn find_returns_none_for_unknown_segment() {
        let sel = root_selection();
        let path = crate::path::parse_path("bogus");
        assert!(sel.find(&path).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_writes_leaf_through_edit_bracket() {
        let sel = root_selection();
        sel.upsert_from(serde_json::json!({"speed": 88})).await.unwrap();
        let value = sel.read().await.unwrap();
        assert_eq!(value["speed"], 88);
    }

    #[tokio::test]
    async fn action_rejected_on_non_action_meta() {
        let sel = root_selection();
        let err = sel.action(None).await.unwrap_err();
        assert!(matches!(err, RestconfError::InvalidValue(_)));
    }
}
