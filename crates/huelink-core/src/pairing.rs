// ── Pairing negotiator ──
//
// AwaitingLinkPress -> CredentialObtained | PairingFailed. One attempt per
// start; the operator presses the link button and restarts to retry.

use huelink_api::{BridgeClient, PairingOutcome};
use secrecy::SecretString;
use tracing::{info, warn};

use crate::error::CoreError;
use crate::host::Host;
use crate::status::StatusReporter;

/// Pairing progress for one start attempt.
#[derive(Debug)]
pub enum PairingState {
    AwaitingLinkPress,
    CredentialObtained(SecretString),
    PairingFailed(String),
}

/// Run one pairing attempt against `client`.
///
/// On success the credential is handed to the host for persistence; a
/// failed save is logged and the session continues with the in-memory
/// credential.
pub async fn negotiate(
    client: &BridgeClient,
    device_type: &str,
    host: &dyn Host,
    status: &StatusReporter,
) -> Result<SecretString, CoreError> {
    let mut state = PairingState::AwaitingLinkPress;
    status.info("Pairing with bridge, press the link button");

    loop {
        state = match state {
            PairingState::AwaitingLinkPress => match client.pair(device_type).await {
                Ok(PairingOutcome::Credential(username)) => {
                    PairingState::CredentialObtained(SecretString::from(username))
                }
                Ok(PairingOutcome::Rejected { description, .. }) => {
                    PairingState::PairingFailed(description)
                }
                Err(e) => {
                    let err = CoreError::from(e);
                    status.error(err.to_string());
                    return Err(err);
                }
            },
            PairingState::CredentialObtained(credential) => {
                info!("paired with bridge");
                if let Err(e) = host.save_credential(&credential) {
                    warn!(error = %e, "failed to persist bridge credential");
                }
                return Ok(credential);
            }
            PairingState::PairingFailed(description) => {
                status.error(description.as_str());
                return Err(CoreError::PairingFailed {
                    message: description,
                });
            }
        };
    }
}
