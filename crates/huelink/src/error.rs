//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use huelink_config::ConfigError;
use huelink_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Bridge ───────────────────────────────────────────────────────
    #[error("No bridge found: {reason}")]
    #[diagnostic(
        code(huelink::discovery_failed),
        help(
            "Make sure the bridge is powered and on this network, or pass\n\
             its address directly: huelink --address 192.168.1.20 run"
        )
    )]
    DiscoveryFailed { reason: String },

    #[error("Pairing failed: {message}")]
    #[diagnostic(
        code(huelink::pairing_failed),
        help("Press the link button on the bridge, then run: huelink pair")
    )]
    PairingFailed { message: String },

    #[error("Could not reach bridge: {reason}")]
    #[diagnostic(
        code(huelink::connection_failed),
        help("Check the bridge address and that the bridge is reachable.")
    )]
    ConnectionFailed { reason: String },

    #[error("Bridge error: {message}")]
    #[diagnostic(code(huelink::bridge_error))]
    Bridge { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(huelink::config),
        help("Check the config file, or HUELINK_* environment variables.")
    )]
    Config(#[from] ConfigError),

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(huelink::validation))]
    Validation { field: String, reason: String },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(huelink::io))]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::DiscoveryFailed { .. } => exit_code::NOT_FOUND,
            Self::PairingFailed { .. } => exit_code::AUTH,
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Validation { .. } => exit_code::USAGE,
            Self::Bridge { .. } | Self::Config(_) | Self::Io(_) => exit_code::GENERAL,
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::DiscoveryFailed { reason } => Self::DiscoveryFailed { reason },
            CoreError::PairingFailed { message } => Self::PairingFailed { message },
            CoreError::Transport { reason } => Self::ConnectionFailed { reason },
            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Protocol { message } => Self::Bridge { message },
            CoreError::DeviceLogical { description } => Self::Bridge {
                message: description,
            },
        }
    }
}
