//! A [`Node`] backed by HTTP calls against a remote RESTCONF server. Each
//! `ClientNode` is bound to one resource URL; the walker's child/next/field
//! calls translate into the HTTP actions described for the proxy client.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, StatusCode};
use restconf_browser::{Closer, Meta, Node, NodeRequest, Notification, NotifySink};
use restconf_core::compliance::ComplianceOptions;
use restconf_core::error::RestconfError;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EditMethod {
    Post,
    Patch,
}

/// The in-memory body being assembled for the edit in progress, shared by
/// every node visited while the edit transaction is open. `path` locates
/// this particular node's own object within that shared buffer.
struct EditHandle {
    method: EditMethod,
    buffer: Arc<Mutex<Value>>,
    path: Vec<String>,
}

impl Clone for EditHandle {
    fn clone(&self) -> Self {
        Self { method: self.method, buffer: self.buffer.clone(), path: self.path.clone() }
    }
}

pub struct ClientNode {
    http: Client,
    url: String,
    compliance: ComplianceOptions,
    snapshot: Mutex<Option<Value>>,
    edit: Mutex<Option<EditHandle>>,
}

impl ClientNode {
    pub fn new(http: Client, url: String, compliance: ComplianceOptions) -> Self {
        Self { http, url, compliance, snapshot: Mutex::new(None), edit: Mutex::new(None) }
    }

    fn with_snapshot(http: Client, url: String, compliance: ComplianceOptions, snapshot: Value) -> Self {
        Self { http, url, compliance, snapshot: Mutex::new(Some(snapshot)), edit: Mutex::new(None) }
    }

    /// The immediate child resource join: the first segment after a bare
    /// `module:` root is unseparated, every subsequent one is `/`-joined.
    fn join(&self, segment: &str) -> String {
        if self.url.ends_with(':') {
            format!("{}{segment}", self.url)
        } else {
            restconf_core::url::append_segment(&self.url, segment)
        }
    }

    async fn fetch_snapshot(&self) -> Result<Value, RestconfError> {
        if let Some(cached) = self.snapshot.lock().unwrap().clone() {
            return Ok(cached);
        }
        let value = self.get_json(&self.url).await?;
        *self.snapshot.lock().unwrap() = Some(value.clone());
        Ok(value)
    }

    async fn get_json(&self, url: &str) -> Result<Value, RestconfError> {
        let resp = self
            .http
            .get(url)
            .query(&[("depth", "1"), ("content", "config"), ("with-defaults", "trim")])
            .header(reqwest::header::ACCEPT, "application/yang-data+json")
            .send()
            .await
            .map_err(transport_err)?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(RestconfError::not_found(url));
        }
        if !resp.status().is_success() {
            return Err(status_err(resp.status()));
        }
        resp.json().await.map_err(transport_err)
    }

    /// `OPTIONS` probe used to find out whether a non-leaf child resource
    /// exists before committing to a navigation step.
    async fn probe(&self, url: &str) -> Result<bool, RestconfError> {
        let resp = self.http.request(reqwest::Method::OPTIONS, url).send().await.map_err(transport_err)?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !resp.status().is_success() {
            return Err(status_err(resp.status()));
        }
        Ok(true)
    }
}

fn transport_err(e: reqwest::Error) -> RestconfError {
    RestconfError::operation_failed(format!("proxy request failed: {e}"))
}

fn status_err(status: StatusCode) -> RestconfError {
    match status {
        StatusCode::NOT_FOUND => RestconfError::not_found("remote resource"),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RestconfError::access_denied("remote request denied"),
        StatusCode::CONFLICT => RestconfError::in_use("remote resource busy"),
        StatusCode::METHOD_NOT_ALLOWED => RestconfError::method_not_allowed("remote method not allowed"),
        other => RestconfError::operation_failed(format!("remote server returned {other}")),
    }
}

/// Descends `root` to `path` (creating intermediate objects as needed) and
/// returns a mutable reference to the object living there.
fn object_at<'a>(root: &'a mut Value, path: &[String]) -> &'a mut serde_json::Map<String, Value> {
    let mut current = root;
    for segment in path {
        if !current.is_object() {
            *current = Value::Object(serde_json::Map::new());
        }
        let map = current.as_object_mut().unwrap();
        current = map.entry(segment.clone()).or_insert_with(|| Value::Object(serde_json::Map::new()));
    }
    if !current.is_object() {
        *current = Value::Object(serde_json::Map::new());
    }
    current.as_object_mut().unwrap()
}

#[async_trait]
impl Node for ClientNode {
    async fn field(&self, meta: &Meta, write: Option<&Value>) -> Result<Option<Value>, RestconfError> {
        if let Some(value) = write {
            let guard = self.edit.lock().unwrap();
            let Some(edit) = guard.as_ref() else {
                return Err(RestconfError::operation_failed("field write outside an edit transaction"));
            };
            let mut buffer = edit.buffer.lock().unwrap();
            let object = object_at(&mut buffer, &edit.path);
            object.insert(meta.ident.clone(), value.clone());
            return Ok(Some(value.clone()));
        }
        let snapshot = self.fetch_snapshot().await?;
        Ok(snapshot.get(&meta.ident).cloned())
    }

    async fn next(&self, meta: &Meta, index: usize) -> Result<Option<(Value, Arc<dyn Node>)>, RestconfError> {
        let snapshot = self.fetch_snapshot().await?;
        let Some(entry) = snapshot.get(&meta.ident).and_then(|v| v.as_array()).and_then(|a| a.get(index)) else {
            return Ok(None);
        };
        let entry_url = self.join(&format!("{}={index}", meta.ident));
        let entry_node = Arc::new(ClientNode::with_snapshot(self.http.clone(), entry_url, self.compliance, entry.clone()));
        Ok(Some((Value::from(index as i64), entry_node as Arc<dyn Node>)))
    }

    async fn child(&self, req: &NodeRequest, meta: &Meta) -> Result<Option<Arc<dyn Node>>, RestconfError> {
        if meta.is_leaf() {
            // Leaves are not separate resources: field() on this same node
            // already resolves them against the cached snapshot.
            return Ok(Some(Arc::new(ClientNode {
                http: self.http.clone(),
                url: self.url.clone(),
                compliance: self.compliance,
                snapshot: Mutex::new(self.snapshot.lock().unwrap().clone()),
                edit: Mutex::new(self.edit.lock().unwrap().clone()),
            })));
        }

        let in_edit = self.edit.lock().unwrap().clone();
        if let Some(edit) = in_edit {
            let child_url = self.join(&meta.ident);
            let mut child_path = edit.path.clone();
            child_path.push(meta.ident.clone());
            if req.new {
                let mut buffer = edit.buffer.lock().unwrap();
                object_at(&mut buffer, &child_path);
            }
            let child_edit = EditHandle { method: edit.method, buffer: edit.buffer.clone(), path: child_path };
            return Ok(Some(Arc::new(ClientNode {
                http: self.http.clone(),
                url: child_url,
                compliance: self.compliance,
                snapshot: Mutex::new(None),
                edit: Mutex::new(Some(child_edit)),
            })));
        }

        let child_url = self.join(&meta.ident);
        if !self.probe(&child_url).await? {
            return Ok(None);
        }
        Ok(Some(Arc::new(ClientNode::new(self.http.clone(), child_url, self.compliance))))
    }

    async fn begin_edit(&self, req: &NodeRequest) -> Result<(), RestconfError> {
        let method = if req.new { EditMethod::Post } else { EditMethod::Patch };
        if !req.new {
            // Probe the existing resource so a missing target surfaces as
            // NotFound up front; its contents are discarded, not merged
            // into the edit buffer, since the PATCH/POST body must carry
            // only the fields this edit actually writes.
            match self.get_json(&self.url).await {
                Ok(_) => {}
                Err(RestconfError::NotFound(_)) => {}
                Err(err) => return Err(err),
            }
        }
        let buffer = Arc::new(Mutex::new(Value::Object(serde_json::Map::new())));
        *self.edit.lock().unwrap() = Some(EditHandle { method, buffer, path: Vec::new() });
        Ok(())
    }

    async fn end_edit(&self, _req: &NodeRequest) -> Result<(), RestconfError> {
        let Some(edit) = self.edit.lock().unwrap().take() else {
            return Ok(());
        };
        let body = edit.buffer.lock().unwrap().clone();
        let request = match edit.method {
            EditMethod::Post => self.http.post(&self.url),
            EditMethod::Patch => self.http.patch(&self.url),
        };
        let resp = request
            .header(reqwest::header::CONTENT_TYPE, "application/yang-data+json")
            .json(&body)
            .send()
            .await
            .map_err(transport_err)?;
        *self.snapshot.lock().unwrap() = None;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(status_err(resp.status()))
        }
    }

    async fn delete(&self, _meta: &Meta) -> Result<(), RestconfError> {
        let resp = self.http.delete(&self.url).send().await.map_err(transport_err)?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(status_err(resp.status()))
        }
    }

    async fn action(&self, meta: &Meta, input: Option<Value>) -> Result<Option<Value>, RestconfError> {
        let wrapped = !self.compliance.disable_action_wrapper;
        let body = match (input, wrapped) {
            (Some(v), true) => {
                let mut map = serde_json::Map::new();
                map.insert(format!("{}:input", meta.module), v);
                Value::Object(map)
            }
            (Some(v), false) => v,
            (None, _) => Value::Null,
        };
        let resp = self
            .http
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "application/yang-data+json")
            .json(&body)
            .send()
            .await
            .map_err(transport_err)?;
        if resp.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(status_err(resp.status()));
        }
        let value: Value = resp.json().await.map_err(transport_err)?;
        let output = if wrapped {
            value.get(format!("{}:output", meta.module)).cloned().unwrap_or(Value::Null)
        } else {
            value
        };
        Ok(Some(output))
    }

    async fn notify(&self, _meta: &Meta, sink: NotifySink) -> Result<Closer, RestconfError> {
        let resp = self
            .http
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(transport_err)?;
        if !resp.status().is_success() {
            return Err(status_err(resp.status()));
        }

        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            let mut stream = resp.bytes_stream();
            let mut buf = String::new();
            let mut data = String::new();
            loop {
                tokio::select! {
                    _ = task_cancel.cancelled() => break,
                    chunk = stream.next() => {
                        let Some(Ok(bytes)) = chunk else {
                            tracing::debug!("proxy notification stream ended");
                            break;
                        };
                        buf.push_str(&String::from_utf8_lossy(&bytes));
                        while let Some(pos) = buf.find('\n') {
                            let line = buf[..pos].trim_end_matches('\r').to_string();
                            buf.drain(..=pos);
                            if line.is_empty() {
                                if !data.is_empty() {
                                    if let Ok(event) = serde_json::from_str::<Value>(&data) {
                                        let event_time = event.get("eventTime").and_then(|v| v.as_str()).unwrap_or("").to_string();
                                        let _ = sink(Notification { event_time, event });
                                    }
                                    data.clear();
                                }
                            } else if let Some(rest) = line.strip_prefix("data:") {
                                data.push_str(rest.trim_start());
                            }
                        }
                    }
                }
            }
        });

        Ok(Closer::new(move || cancel.cancel()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use restconf_browser::Browser;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn car_meta() -> Arc<Meta> {
        Arc::new(
            Meta::container("car", "car", "urn:example:car")
                .with_children(vec![Meta::leaf("speed", "car", "urn:example:car")]),
        )
    }

    #[tokio::test]
    async fn read_leaf_performs_lazy_get() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/restconf/data/car:"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"speed": 55})))
            .mount(&server)
            .await;

        let url = format!("{}/restconf/data/car:", server.uri());
        let node: Arc<dyn Node> = Arc::new(ClientNode::new(Client::new(), url, ComplianceOptions::strict()));
        let browser = Browser::new(car_meta(), node);
        let value = browser.root().read().await.unwrap();
        assert_eq!(value["speed"], 55);
    }

    #[tokio::test]
    async fn upsert_sends_patch_with_diff_only_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/restconf/data/car:"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"speed": 10, "trim": {"level": 1}})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/restconf/data/car:"))
            .and(body_json(serde_json::json!({"speed": 99})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/restconf/data/car:", server.uri());
        let node: Arc<dyn Node> = Arc::new(ClientNode::new(Client::new(), url, ComplianceOptions::strict()));
        let browser = Browser::new(car_meta(), node);
        browser.root().upsert_from(serde_json::json!({"speed": 99})).await.unwrap();
        server.verify().await;
    }

    #[tokio::test]
    async fn action_wraps_input_and_unwraps_output_in_strict_mode() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/restconf/operations/car:getMiles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"car:output": {"miles": 7}})))
            .mount(&server)
            .await;

        let url = format!("{}/restconf/operations/car:getMiles", server.uri());
        let node = ClientNode::new(Client::new(), url, ComplianceOptions::strict());
        let meta = Meta::action("getMiles", "car", "urn:example:car");
        let output = node.action(&meta, Some(serde_json::json!({"source": "trip"}))).await.unwrap().unwrap();
        assert_eq!(output["miles"], 7);
    }

    #[tokio::test]
    async fn delete_maps_remote_not_found_to_restconf_error() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/restconf/data/car:tire=0"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = format!("{}/restconf/data/car:tire=0", server.uri());
        let node = ClientNode::new(Client::new(), url, ComplianceOptions::strict());
        let meta = Meta::container("tire", "car", "urn:example:car");
        let err = node.delete(&meta).await.unwrap_err();
        assert!(matches!(err, RestconfError::NotFound(_)));
    }
}
