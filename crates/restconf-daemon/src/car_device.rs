//! A small in-memory device used by the CLI binary's demo mode and by the
//! integration tests: a `car` module with a `speed` leaf, a `tire` list,
//! a no-input/no-output `rotateTires` action, a `getMiles` action that
//! takes a `source` leaf and returns a `miles` leaf, and a `drove`
//! notification stream.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use async_trait::async_trait;
use restconf_browser::{Browser, Closer, Device, Meta, Node, NodeRequest, Notification, NotifySink, UiSource};
use restconf_core::error::RestconfError;
use serde_json::Value;

const NAMESPACE: &str = "urn:example:car";

pub fn car_meta() -> Arc<Meta> {
    Arc::new(
        Meta::container("car", "car", NAMESPACE).with_children(vec![
            Meta::leaf("speed", "car", NAMESPACE),
            Meta::list("tire", "car", NAMESPACE)
                .with_children(vec![Meta::leaf("pressure", "car", NAMESPACE)]),
            Meta::action("rotateTires", "car", NAMESPACE),
            Meta::action("getMiles", "car", NAMESPACE)
                .with_children(vec![Meta::leaf("source", "car", NAMESPACE), Meta::leaf("miles", "car", NAMESPACE)]),
            Meta::notification("drove", "car", NAMESPACE),
        ]),
    )
}

#[derive(Default)]
struct Tire {
    pressure: i64,
}

pub struct CarRoot {
    speed: Mutex<i64>,
    tires: Mutex<Vec<Tire>>,
    miles: AtomicI64,
    rotate_count: AtomicI64,
    self_ref: Weak<CarRoot>,
}

impl CarRoot {
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            speed: Mutex::new(0),
            tires: Mutex::new(vec![Tire { pressure: 32 }, Tire { pressure: 32 }]),
            miles: AtomicI64::new(0),
            rotate_count: AtomicI64::new(0),
            self_ref: weak.clone(),
        })
    }
}

#[async_trait]
impl Node for CarRoot {
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
            Some(tire) => Ok(Some((Value::from(index as i64), Arc::new(TireNode { pressure: tire.pressure }) as Arc<dyn Node>))),
            None => Ok(None),
        }
    }

    async fn child(&self, req: &NodeRequest, meta: &Meta) -> Result<Option<Arc<dyn Node>>, RestconfError> {
        if meta.ident == "tire" && req.new {
            let mut tires = self.tires.lock().unwrap();
            tires.push(Tire { pressure: 32 });
            return Ok(Some(Arc::new(TireNode { pressure: 32 })));
        }
        match meta.ident.as_str() {
            // Every other child the car module exposes (the speed leaf, both
            // actions, the notification) lives directly on this node, so
            // navigating into one just hands back the same root.
            "speed" | "rotateTires" | "getMiles" | "drove" => Ok(self.self_ref.upgrade().map(|arc| arc as Arc<dyn Node>)),
            _ => Ok(None),
        }
    }

    async fn action(&self, meta: &Meta, input: Option<Value>) -> Result<Option<Value>, RestconfError> {
        match meta.ident.as_str() {
            "rotateTires" => {
                self.rotate_count.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
            "getMiles" => {
                let _source = input.and_then(|v| v.get("source").and_then(|s| s.as_str().map(str::to_string)));
                Ok(Some(serde_json::json!({ "miles": self.miles.load(Ordering::Relaxed) })))
            }
            other => Err(RestconfError::not_found(other)),
        }
    }

    async fn notify(&self, meta: &Meta, sink: NotifySink) -> Result<Closer, RestconfError> {
        if meta.ident != "drove" {
            return Err(RestconfError::not_found(&meta.ident));
        }
        // Demo source: no real producer thread, just confirms subscription.
        let _ = sink(Notification {
            event_time: chrono::Utc::now().to_rfc3339(),
            event: serde_json::json!({ "miles": self.miles.load(Ordering::Relaxed) }),
        });
        Ok(Closer::noop())
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

pub struct CarDevice {
    root: Arc<CarRoot>,
}

impl CarDevice {
    pub fn new() -> Self {
        Self { root: CarRoot::new() }
    }
}

impl Default for CarDevice {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Device for CarDevice {
    async fn schema_source(&self, module: &str, _ext: &str) -> Result<Vec<u8>, RestconfError> {
        if module != "car" {
            return Err(RestconfError::not_found(module));
        }
        Ok(br#"{"module":"car","namespace":"urn:example:car"}"#.to_vec())
    }

    fn ui_source(&self) -> Option<&dyn UiSource> {
        None
    }

    async fn browser(&self, module: &str) -> Result<Browser, RestconfError> {
        if module != "car" {
            return Err(RestconfError::not_found(format!("module {module}")));
        }
        Ok(Browser::new(car_meta(), self.root.clone()))
    }

    fn modules(&self) -> Vec<String> {
        vec!["car".to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn read_reports_initial_speed_and_tires() {
        let device = CarDevice::new();
        let browser = device.browser("car").await.unwrap();
        let value = browser.root().read().await.unwrap();
        assert_eq!(value["speed"], 0);
        assert_eq!(value["tire"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn rotate_tires_action_has_no_output() {
        let device = CarDevice::new();
        let browser = device.browser("car").await.unwrap();
        let sel = browser.root().find(&restconf_browser::parse_path("rotateTires")).await.unwrap().unwrap();
        assert_eq!(sel.action(None).await.unwrap(), None);
    }

    #[tokio::test]
    async fn get_miles_action_returns_output() {
        let device = CarDevice::new();
        let browser = device.browser("car").await.unwrap();
        let sel = browser.root().find(&restconf_browser::parse_path("getMiles")).await.unwrap().unwrap();
        let output = sel.action(Some(serde_json::json!({"source": "tripa"}))).await.unwrap().unwrap();
        assert_eq!(output["miles"], 0);
    }
}
