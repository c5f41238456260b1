//! Bridge session and state-translation engine for huelink.
//!
//! This crate owns everything between the raw bridge client and a host
//! application's message bus:
//!
//! - **[`Session`]** — Lifecycle facade: [`start()`](Session::start) locates
//!   the bridge, pairs if no credential is stored, then spawns the poll task.
//!   [`stop()`](Session::stop) cancels the timer and lets in-flight work finish.
//!
//! - **Translation** ([`translate`]) — Maps each light or group into
//!   normalized [`PathValue`]s under `electrical.switches.*`, plus metadata.
//!
//! - **Command relay** ([`relay`]) — [`PutHandler`]s registered once per
//!   `(device, attribute)` convert normalized writes into bridge commands and
//!   publish the bridge's echoed value as a confirmation.
//!
//! - **[`Host`]** — The seam to the embedding application: delta sink,
//!   credential persistence, optional handler registration and status hooks.

pub mod attribute;
pub mod config;
pub mod error;
pub mod host;
pub mod locator;
pub mod pairing;
pub mod poll;
pub mod relay;
pub mod session;
pub mod status;
pub mod translate;

// ── Primary re-exports ──────────────────────────────────────────────
pub use attribute::Attribute;
pub use config::SessionConfig;
pub use error::CoreError;
pub use host::{Delta, Host, HostResult, PathMeta, PathValue, SELF_CONTEXT, Update};
pub use locator::{discover_all, discover_bridges, locate_bridge, resolve_address};
pub use pairing::PairingState;
pub use poll::PollSummary;
pub use relay::{PutHandler, PutOutcome, PutState, WriteTarget};
pub use session::{Session, pair_bridge};
pub use status::{Status, StatusLevel, StatusReporter};

pub use huelink_api::{Category, DiscoveredBridge};
