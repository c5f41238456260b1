//! Terminal host: deltas as JSON lines on stdout, credentials to the
//! config file, status to the log.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use huelink_config::ConfigError;
use huelink_core::{Delta, Host, HostResult, PutHandler};

pub struct CliHost {
    config_path: PathBuf,
    inline_meta: bool,
    /// Stored next to the credential when set.
    address: Option<String>,
    save_error: Mutex<Option<ConfigError>>,
}

impl CliHost {
    pub fn new(config_path: PathBuf, inline_meta: bool) -> Self {
        Self {
            config_path,
            inline_meta,
            address: None,
            save_error: Mutex::new(None),
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// The last failed credential save, if any.
    pub fn take_save_error(&self) -> Option<ConfigError> {
        self.save_error.lock().ok().and_then(|mut slot| slot.take())
    }
}

impl Host for CliHost {
    fn publish(&self, delta: Delta) {
        let line = match serde_json::to_string(&delta) {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "failed to encode delta");
                return;
            }
        };
        let mut out = std::io::stdout().lock();
        if let Err(e) = writeln!(out, "{line}").and_then(|()| out.flush()) {
            warn!(error = %e, "failed to write delta");
        }
    }

    fn supports_meta_deltas(&self) -> bool {
        !self.inline_meta
    }

    fn save_credential(&self, credential: &SecretString) -> HostResult {
        let saved = huelink_config::save_credential(
            &self.config_path,
            self.address.as_deref(),
            credential.expose_secret(),
        );
        match saved {
            Ok(_) => {
                debug!(path = %self.config_path.display(), "saved bridge credential");
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                if let Ok(mut slot) = self.save_error.lock() {
                    *slot = Some(e);
                }
                Err(message.into())
            }
        }
    }

    fn register_put_handler(&self, _context: &str, path: &str, _handler: PutHandler) -> bool {
        debug!(%path, "writable");
        true
    }
}
