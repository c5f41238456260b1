// huelink-api: Async Rust client for the Philips Hue bridge REST API

pub mod client;
pub mod discovery;
pub mod error;
pub mod models;
pub mod pairing;
pub mod transport;

pub use client::BridgeClient;
pub use discovery::{DEFAULT_DISCOVERY_URL, DiscoveredBridge, discover};
pub use error::Error;
pub use models::{
    BridgeError, Category, DeviceCollection, DeviceRecord, LightState, PutReply, RecordEntry,
};
pub use pairing::PairingOutcome;
pub use transport::{TlsMode, TransportConfig};
