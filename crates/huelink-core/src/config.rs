// ── Runtime session configuration ──
//
// These types describe *how* to reach a bridge. They carry the credential
// and tuning knobs but never touch disk; the host builds a `SessionConfig`
// and hands it in.

use std::time::Duration;

use secrecy::SecretString;

pub use huelink_api::DEFAULT_DISCOVERY_URL;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_DEVICE_TYPE: &str = "huelink#host";

/// Configuration for one bridge session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Bridge address. `None` means discover it.
    pub address: Option<String>,
    /// Whitelisted bridge username. `None` means pair on start.
    pub credential: Option<SecretString>,
    /// Delay between poll cycles.
    pub poll_interval: Duration,
    /// Discovery service URL, used only when `address` is unset.
    pub discovery_url: String,
    /// Application identifier sent when pairing.
    pub device_type: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            address: None,
            credential: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            discovery_url: DEFAULT_DISCOVERY_URL.into(),
            device_type: DEFAULT_DEVICE_TYPE.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl SessionConfig {
    /// Poll interval with a zero value replaced by the default.
    pub fn effective_poll_interval(&self) -> Duration {
        if self.poll_interval.is_zero() {
            DEFAULT_POLL_INTERVAL
        } else {
            self.poll_interval
        }
    }
}
