// ── Core error types ──
//
// Session-level failures, grouped the way the session reacts to them:
// discovery and pairing end a start attempt, everything else degrades
// to a status message. The `From<huelink_api::Error>` impl translates
// transport-layer errors into this taxonomy.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Start-up errors (terminal for the current start) ─────────────
    #[error("Bridge discovery failed: {reason}")]
    DiscoveryFailed { reason: String },

    #[error("Pairing failed: {message}")]
    PairingFailed { message: String },

    // ── Bridge round-trip errors ─────────────────────────────────────
    #[error("Unexpected response from bridge: {message}")]
    Protocol { message: String },

    #[error("Cannot reach bridge: {reason}")]
    Transport { reason: String },

    #[error("Bridge rejected request: {description}")]
    DeviceLogical { description: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<huelink_api::Error> for CoreError {
    fn from(err: huelink_api::Error) -> Self {
        match err {
            huelink_api::Error::Transport(e) => CoreError::Transport {
                reason: e.to_string(),
            },
            huelink_api::Error::Tls(msg) => CoreError::Transport {
                reason: format!("TLS error: {msg}"),
            },
            huelink_api::Error::Http { status, body } => CoreError::Protocol {
                message: format!("HTTP {status}: {body}"),
            },
            huelink_api::Error::Device { description, .. } => {
                CoreError::DeviceLogical { description }
            }
            huelink_api::Error::Protocol { message, body: _ } => CoreError::Protocol { message },
            huelink_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid bridge address: {e}"),
            },
            huelink_api::Error::MissingCredential => CoreError::Config {
                message: "no bridge credential configured".into(),
            },
        }
    }
}
