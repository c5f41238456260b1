// Shared fixtures for session tests: a recording host and bridge mocks.

#![allow(clippy::unwrap_used, dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use huelink_core::{Delta, Host, HostResult, PutHandler, SessionConfig};

pub const USER: &str = "user123";

/// Host double that records everything a session hands it.
#[derive(Default)]
pub struct RecordingHost {
    pub deltas: Mutex<Vec<Delta>>,
    pub credentials: Mutex<Vec<String>>,
    pub registered: Mutex<Vec<String>>,
    pub statuses: Mutex<Vec<String>>,
    pub errors: Mutex<Vec<String>>,
    pub no_meta: bool,
}

impl RecordingHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn without_meta() -> Arc<Self> {
        Arc::new(Self {
            no_meta: true,
            ..Self::default()
        })
    }

    pub fn deltas(&self) -> Vec<Delta> {
        self.deltas.lock().unwrap().clone()
    }

    pub fn delta_count(&self) -> usize {
        self.deltas.lock().unwrap().len()
    }

    /// Latest value published for `path`, across all deltas.
    pub fn last_value(&self, path: &str) -> Option<Value> {
        self.deltas
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find_map(|d| d.value(path).cloned())
    }

    pub fn meta_count(&self, path: &str) -> usize {
        self.deltas
            .lock()
            .unwrap()
            .iter()
            .flat_map(|d| d.meta().map(|m| m.path.clone()).collect::<Vec<_>>())
            .filter(|p| p == path)
            .count()
    }

    pub fn last_error(&self) -> Option<String> {
        self.errors.lock().unwrap().last().cloned()
    }

    pub fn last_status(&self) -> Option<String> {
        self.statuses.lock().unwrap().last().cloned()
    }
}

impl Host for RecordingHost {
    fn publish(&self, delta: Delta) {
        self.deltas.lock().unwrap().push(delta);
    }

    fn supports_meta_deltas(&self) -> bool {
        !self.no_meta
    }

    fn save_credential(&self, credential: &SecretString) -> HostResult {
        self.credentials
            .lock()
            .unwrap()
            .push(credential.expose_secret().to_owned());
        Ok(())
    }

    fn register_put_handler(&self, _context: &str, path: &str, _handler: PutHandler) -> bool {
        self.registered.lock().unwrap().push(path.to_owned());
        true
    }

    fn set_status(&self, message: &str) {
        self.statuses.lock().unwrap().push(message.to_owned());
    }

    fn set_error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_owned());
    }
}

/// Config pointing at `server` with a credential and an interval long
/// enough that only the initial poll fires during a test.
pub fn config_for(server: &MockServer) -> SessionConfig {
    SessionConfig {
        address: Some(server.uri()),
        credential: Some(SecretString::from(USER.to_owned())),
        poll_interval: Duration::from_secs(3600),
        request_timeout: Duration::from_secs(5),
        ..SessionConfig::default()
    }
}

pub fn desk_lamp() -> Value {
    json!({
        "1": {
            "name": "Desk lamp",
            "modelid": "LCT015",
            "type": "Extended color light",
            "state": { "on": true, "bri": 128, "reachable": true }
        }
    })
}

pub async fn mount_collection(server: &MockServer, category: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/api/{USER}/{category}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Bridge with one dimmable light and no groups.
pub async fn bridge_with_desk_lamp() -> MockServer {
    let server = MockServer::start().await;
    mount_collection(&server, "lights", desk_lamp()).await;
    mount_collection(&server, "groups", json!({})).await;
    server
}

/// Wait up to five seconds for `cond` to hold.
pub async fn wait_until(cond: impl Fn() -> bool) {
    for _ in 0..500 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met within 5s");
}

pub async fn get_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.method.as_str() == "GET")
        .count()
}
