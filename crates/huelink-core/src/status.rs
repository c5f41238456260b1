// ── Status reporting ──
//
// Latest human-readable status, last write wins. Held in a `watch` channel
// so the host can either poll it or await changes, and mirrored to the
// host's optional status hooks.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info};

use crate::host::Host;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Error,
}

/// A status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub level: StatusLevel,
    pub message: String,
}

impl Status {
    pub fn is_error(&self) -> bool {
        self.level == StatusLevel::Error
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Status bookkeeping for one session. Never fails.
pub struct StatusReporter {
    tx: watch::Sender<Status>,
    host: Arc<dyn Host>,
}

impl StatusReporter {
    pub fn new(host: Arc<dyn Host>) -> Self {
        let (tx, _) = watch::channel(Status {
            level: StatusLevel::Info,
            message: "Starting".into(),
        });
        Self { tx, host }
    }

    pub fn info(&self, message: impl Into<String>) {
        let message = message.into();
        info!(status = %message);
        self.host.set_status(&message);
        self.tx.send_replace(Status {
            level: StatusLevel::Info,
            message,
        });
    }

    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        error!(status = %message);
        self.host.set_error(&message);
        self.tx.send_replace(Status {
            level: StatusLevel::Error,
            message,
        });
    }

    /// Snapshot of the latest status.
    pub fn current(&self) -> Status {
        self.tx.borrow().clone()
    }

    /// Receiver that observes every subsequent change.
    pub fn subscribe(&self) -> watch::Receiver<Status> {
        self.tx.subscribe()
    }
}
