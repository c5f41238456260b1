// ── Host seam ──
//
// The embedding application owns message routing, persistence and log
// output. A session talks to it only through the `Host` trait, and
// publishes `Delta` batches shaped like the host's update messages.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::Serialize;
use serde_json::Value;

use crate::relay::PutHandler;

/// Context every published path belongs to.
pub const SELF_CONTEXT: &str = "vessels.self";

/// Result type for host callbacks.
pub type HostResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// A normalized value under a dot-separated path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathValue {
    pub path: String,
    pub value: Value,
}

impl PathValue {
    pub fn new(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
        }
    }
}

/// Descriptive metadata for a path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathMeta {
    pub path: String,
    pub value: Value,
}

/// One timestamped group of values and metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Update {
    pub timestamp: DateTime<Utc>,
    pub values: Vec<PathValue>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub meta: Vec<PathMeta>,
}

/// A batch published to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Delta {
    pub context: String,
    pub updates: Vec<Update>,
}

impl Delta {
    /// Single-update delta stamped now.
    pub fn new(values: Vec<PathValue>, meta: Vec<PathMeta>) -> Self {
        Self {
            context: SELF_CONTEXT.into(),
            updates: vec![Update {
                timestamp: Utc::now(),
                values,
                meta,
            }],
        }
    }

    /// All values across updates, in order.
    pub fn values(&self) -> impl Iterator<Item = &PathValue> {
        self.updates.iter().flat_map(|u| u.values.iter())
    }

    /// All metadata entries across updates, in order.
    pub fn meta(&self) -> impl Iterator<Item = &PathMeta> {
        self.updates.iter().flat_map(|u| u.meta.iter())
    }

    /// Last value published for `path` in this delta.
    pub fn value(&self, path: &str) -> Option<&Value> {
        self.values()
            .filter(|pv| pv.path == path)
            .last()
            .map(|pv| &pv.value)
    }
}

/// Callbacks a session needs from its embedding application.
///
/// Every method is invoked from the session's tasks and must not block.
pub trait Host: Send + Sync + 'static {
    /// Deliver a batch of normalized values to the host's message bus.
    fn publish(&self, delta: Delta);

    /// Whether the host accepts metadata alongside values. When `false`,
    /// metadata is folded into every batch as a `{path}.meta` value.
    fn supports_meta_deltas(&self) -> bool {
        true
    }

    /// Persist a credential obtained by pairing.
    fn save_credential(&self, credential: &SecretString) -> HostResult;

    /// Offer a write handler for `path`. Returns `false` if the host has no
    /// write routing; the session keeps the handler either way.
    fn register_put_handler(&self, _context: &str, _path: &str, _handler: PutHandler) -> bool {
        false
    }

    /// Informational status hook.
    fn set_status(&self, _message: &str) {}

    /// Error status hook.
    fn set_error(&self, _message: &str) {}
}
