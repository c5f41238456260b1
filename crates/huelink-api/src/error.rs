use thiserror::Error;

/// Top-level error type for the `huelink-api` crate.
///
/// Covers every failure mode of a bridge round trip: transport,
/// HTTP status, bridge-reported errors, and unexpected response shapes.
/// `huelink-core` maps these into its session-level taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Non-2xx HTTP status from the bridge or discovery service.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    // ── Bridge ──────────────────────────────────────────────────────
    /// The bridge answered with its `[{"error": {...}}]` envelope.
    #[error("Bridge error (type {kind}): {description}")]
    Device {
        kind: u32,
        address: Option<String>,
        description: String,
    },

    /// Response body was not the documented shape, with the raw body for debugging.
    #[error("Unexpected response: {message}")]
    Protocol { message: String, body: String },

    // ── Session ─────────────────────────────────────────────────────
    /// An authenticated endpoint was called before a credential was set.
    #[error("No credential configured for this bridge")]
    MissingCredential,
}

/// Bridge error type for requests made with an unknown or revoked username.
pub const UNAUTHORIZED_USER: u32 = 1;

impl Error {
    /// Returns `true` if the bridge rejected the credential.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::Device {
                kind: UNAUTHORIZED_USER,
                ..
            }
        )
    }

    /// Returns `true` if this is a transient error worth retrying on the next cycle.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
