// ── Command relay ──
//
// Normalized writes flow host -> PutHandler -> bridge PUT -> echoed value
// -> host. Each handler answers `Pending` at once and completes through a
// oneshot channel when the bridge round trip ends. Identical concurrent
// writes are not coalesced; each performs its own round trip.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use huelink_api::{BridgeClient, Category, PutReply};
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::attribute::Attribute;
use crate::host::{Delta, Host, PathValue, SELF_CONTEXT};
use crate::status::StatusReporter;

/// Which bridge resource a normalized path writes to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WriteTarget {
    pub category: Category,
    pub id: String,
    pub attribute: Attribute,
    /// Normalized path the handler is published under.
    pub path: String,
}

impl WriteTarget {
    /// Key the bridge echoes on success: `/{category}/{id}/{resource}/{attr}`.
    pub fn echo_key(&self) -> String {
        format!(
            "/{}/{}/{}/{}",
            self.category,
            self.id,
            self.category.state_resource(),
            self.attribute.device_key()
        )
    }
}

/// Immediate answer to a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutState {
    /// The round trip has started; the outcome arrives on the channel.
    Pending,
    /// Nothing was sent; the outcome is already on the channel.
    Completed,
}

/// Final answer to a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutOutcome {
    Success,
    Failure { message: String },
}

impl PutOutcome {
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Shared machinery every handler dispatches through.
pub(crate) struct Relay {
    client: Arc<BridgeClient>,
    host: Arc<dyn Host>,
    status: Arc<StatusReporter>,
    cancel: CancellationToken,
    /// Runtime the session was started on; writes run there whatever
    /// thread the host calls from.
    runtime: Handle,
}

impl Relay {
    /// Must be called within a tokio runtime.
    pub(crate) fn new(
        client: Arc<BridgeClient>,
        host: Arc<dyn Host>,
        status: Arc<StatusReporter>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            client,
            host,
            status,
            cancel,
            runtime: Handle::current(),
        }
    }

    /// One full round trip for `target`.
    async fn send(&self, target: &WriteTarget, value: &Value) -> PutOutcome {
        let converted = match target.attribute.to_device(value) {
            Ok(v) => v,
            Err(message) => {
                let message = format!("Rejected write to {}: {message}", target.path);
                self.status.error(message.as_str());
                return PutOutcome::failure(message);
            }
        };
        let mut body = serde_json::Map::new();
        body.insert(target.attribute.device_key().to_owned(), converted);
        let body = Value::Object(body);
        debug!(path = %target.path, %body, "relaying write");

        match self
            .client
            .put_attribute(target.category, &target.id, &body)
            .await
        {
            Ok(PutReply::Success(echoed)) => {
                let echo_key = target.echo_key();
                let Some(raw) = echoed.get(&echo_key) else {
                    let message = format!("Unexpected response to {}: no {echo_key}", target.path);
                    self.status.error(message.as_str());
                    return PutOutcome::failure(message);
                };
                let value = target.attribute.from_echo(raw);
                self.host.publish(Delta::new(
                    vec![PathValue::new(target.path.as_str(), value)],
                    Vec::new(),
                ));
                PutOutcome::Success
            }
            Ok(PutReply::DeviceError(err)) => {
                warn!(path = %target.path, description = %err.description, "bridge rejected write");
                self.status
                    .error(format!("Bridge rejected write to {}: {}", target.path, err.description));
                PutOutcome::failure(err.description)
            }
            Err(e) => {
                let message = format!("Write to {} failed: {e}", target.path);
                self.status.error(message.as_str());
                PutOutcome::failure(message)
            }
        }
    }
}

/// A registered write handler for one normalized path.
///
/// Cheap to clone; all clones dispatch through the same session.
#[derive(Clone)]
pub struct PutHandler {
    target: Arc<WriteTarget>,
    relay: Arc<Relay>,
}

impl std::fmt::Debug for PutHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PutHandler")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl PutHandler {
    pub fn path(&self) -> &str {
        &self.target.path
    }

    pub fn target(&self) -> &WriteTarget {
        &self.target
    }

    /// Start a write. Callable from any thread; the round trip runs on the
    /// session's runtime.
    ///
    /// Returns [`PutState::Pending`] once the round trip is spawned. After
    /// the session stops, answers [`PutState::Completed`] with a failure.
    pub fn put(&self, value: Value, done: oneshot::Sender<PutOutcome>) -> PutState {
        if self.relay.cancel.is_cancelled() {
            let _ = done.send(PutOutcome::failure("session stopped"));
            return PutState::Completed;
        }

        let relay = Arc::clone(&self.relay);
        let target = Arc::clone(&self.target);
        self.relay.runtime.spawn(async move {
            let outcome = relay.send(&target, &value).await;
            // Receiver may be gone; the outcome is simply dropped then.
            let _ = done.send(outcome);
        });
        PutState::Pending
    }

    /// Start a write and await its outcome.
    pub async fn put_and_wait(&self, value: Value) -> PutOutcome {
        let (tx, rx) = oneshot::channel();
        self.put(value, tx);
        rx.await
            .unwrap_or_else(|_| PutOutcome::failure("write task ended without an outcome"))
    }
}

/// Session-owned handler registry keyed by `(category, id, attribute)`.
pub(crate) struct HandlerRegistry {
    registered: DashMap<(Category, String, Attribute), ()>,
    by_path: DashMap<String, PutHandler>,
}

impl HandlerRegistry {
    pub(crate) fn new() -> Self {
        Self {
            registered: DashMap::new(),
            by_path: DashMap::new(),
        }
    }

    /// Register a handler for `target` unless one already exists for its
    /// device and attribute. Returns `true` on first registration.
    pub(crate) fn register(&self, target: WriteTarget, relay: &Arc<Relay>, host: &dyn Host) -> bool {
        let key = (target.category, target.id.clone(), target.attribute);
        match self.registered.entry(key) {
            Entry::Occupied(_) => return false,
            Entry::Vacant(slot) => {
                slot.insert(());
            }
        }

        let handler = PutHandler {
            target: Arc::new(target),
            relay: Arc::clone(relay),
        };
        let path = handler.path().to_owned();
        debug!(%path, "registering write handler");
        self.by_path.insert(path.clone(), handler.clone());
        host.register_put_handler(SELF_CONTEXT, &path, handler);
        true
    }

    pub(crate) fn get(&self, path: &str) -> Option<PutHandler> {
        self.by_path.get(path).map(|h| h.value().clone())
    }

    pub(crate) fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.by_path.iter().map(|e| e.key().clone()).collect();
        paths.sort();
        paths
    }

    pub(crate) fn len(&self) -> usize {
        self.registered.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_key_for_light() {
        let target = WriteTarget {
            category: Category::Lights,
            id: "7".into(),
            attribute: Attribute::DimmingLevel,
            path: "electrical.switches.lights.desk.dimmingLevel".into(),
        };
        assert_eq!(target.echo_key(), "/lights/7/state/bri");
    }

    #[test]
    fn echo_key_for_group() {
        let target = WriteTarget {
            category: Category::Groups,
            id: "1".into(),
            attribute: Attribute::State,
            path: "electrical.switches.groups.livingRoom.state".into(),
        };
        assert_eq!(target.echo_key(), "/groups/1/action/on");
    }
}
