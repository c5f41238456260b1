// Link-button pairing
//
// `POST /api` with a device type registers a new whitelisted username,
// but only within ~30 seconds of the bridge's link button being pressed.
// Any other time the bridge answers with error type 101.

use serde_json::json;
use tracing::debug;

use crate::client::{BridgeClient, protocol};
use crate::error::Error;

/// What the bridge said to a pairing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairingOutcome {
    /// A new username was issued.
    Credential(String),
    /// The bridge refused, typically `link button not pressed`.
    Rejected { kind: u32, description: String },
}

impl BridgeClient {
    /// Ask the bridge for a new username.
    ///
    /// `device_type` identifies this application in the bridge whitelist
    /// (`<application>#<device>`, max 40 characters).
    pub async fn pair(&self, device_type: &str) -> Result<PairingOutcome, Error> {
        let url = self.api_url()?;
        let (messages, raw) = self
            .post_messages(url, &json!({ "devicetype": device_type }))
            .await?;

        let Some(first) = messages.into_iter().next() else {
            return Err(protocol("empty pairing response", &raw));
        };

        if let Some(err) = first.error {
            debug!(kind = err.kind, description = %err.description, "pairing rejected");
            return Ok(PairingOutcome::Rejected {
                kind: err.kind,
                description: err.description,
            });
        }

        first
            .success
            .as_ref()
            .and_then(|s| s.get("username"))
            .and_then(|u| u.as_str())
            .map(|username| {
                debug!("pairing accepted");
                PairingOutcome::Credential(username.to_owned())
            })
            .ok_or_else(|| protocol("pairing success without username", &raw))
    }
}
