// ── Session lifecycle ──
//
// `start` walks Locating -> Pairing (only without a credential) -> Polling.
// Discovery and pairing failures end the attempt with a status message;
// the host restarts to retry. `stop` cancels the poll timer and waits for
// the poll task to return. Writes already in flight finish on their own.

use std::sync::Arc;
use std::time::Duration;

use huelink_api::{BridgeClient, TransportConfig};
use secrecy::SecretString;
use serde_json::Value;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::error::CoreError;
use crate::host::Host;
use crate::locator;
use crate::pairing;
use crate::poll::{PollSummary, Poller, poll_task};
use crate::relay::{HandlerRegistry, PutHandler, PutOutcome, Relay};
use crate::status::{Status, StatusReporter};

/// A running bridge session.
///
/// Cheaply cloneable; all clones share the same poll task and registry.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    address: String,
    status: Arc<StatusReporter>,
    registry: Arc<HandlerRegistry>,
    poller: Arc<Poller>,
    cancel: CancellationToken,
    poll_handle: Mutex<Option<JoinHandle<()>>>,
}

impl Session {
    /// Locate the bridge, pair if needed, and start polling.
    ///
    /// Polling never starts without a credential. Any error returned here
    /// has already been reported through the host's status hooks.
    pub async fn start(config: SessionConfig, host: Arc<dyn Host>) -> Result<Self, CoreError> {
        let status = Arc::new(StatusReporter::new(Arc::clone(&host)));
        status.info("Connecting to bridge");

        let address = locator::locate_bridge(&config)
            .await
            .map_err(|e| report(&status, e))?;
        let client = bridge_client(&address, &config).map_err(|e| report(&status, e))?;

        let period = config.effective_poll_interval();
        let credential = match config.credential {
            Some(credential) => credential,
            None => {
                pairing::negotiate(&client, &config.device_type, host.as_ref(), &status).await?
            }
        };
        Ok(Self::spawn(client.with_credential(credential), address, period, host, status))
    }

    fn spawn(
        client: BridgeClient,
        address: String,
        period: Duration,
        host: Arc<dyn Host>,
        status: Arc<StatusReporter>,
    ) -> Self {
        let client = Arc::new(client);
        let cancel = CancellationToken::new();
        let registry = Arc::new(HandlerRegistry::new());
        let relay = Arc::new(Relay::new(
            Arc::clone(&client),
            Arc::clone(&host),
            Arc::clone(&status),
            cancel.clone(),
        ));
        let poller = Arc::new(Poller::new(
            client,
            host,
            Arc::clone(&status),
            Arc::clone(&registry),
            relay,
            address.clone(),
        ));

        info!(%address, ?period, "starting bridge polling");
        let handle = tokio::spawn(poll_task(Arc::clone(&poller), period, cancel.clone()));

        Self {
            inner: Arc::new(SessionInner {
                address,
                status,
                registry,
                poller,
                cancel,
                poll_handle: Mutex::new(Some(handle)),
            }),
        }
    }

    /// Bridge address in use.
    pub fn address(&self) -> &str {
        &self.inner.address
    }

    /// Latest status.
    pub fn status(&self) -> Status {
        self.inner.status.current()
    }

    /// Observe status changes.
    pub fn subscribe_status(&self) -> watch::Receiver<Status> {
        self.inner.status.subscribe()
    }

    /// Handler registered for a normalized path, if any.
    pub fn handler(&self, path: &str) -> Option<PutHandler> {
        self.inner.registry.get(path)
    }

    /// Every path that currently accepts writes, sorted.
    pub fn registered_paths(&self) -> Vec<String> {
        self.inner.registry.paths()
    }

    /// Number of `(device, attribute)` pairs with a handler.
    pub fn handler_count(&self) -> usize {
        self.inner.registry.len()
    }

    /// Write `value` to `path` and wait for the bridge round trip.
    pub async fn put(&self, path: &str, value: Value) -> PutOutcome {
        match self.handler(path) {
            Some(handler) => handler.put_and_wait(value).await,
            None => PutOutcome::failure(format!("No write handler for {path}")),
        }
    }

    /// Run one poll cycle outside the schedule.
    pub async fn poll_now(&self) -> PollSummary {
        self.inner.poller.poll_once().await
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    /// Stop polling. A cycle already in progress completes first.
    ///
    /// Idempotent; later calls return immediately.
    pub async fn stop(&self) {
        self.inner.cancel.cancel();
        let handle = self.inner.poll_handle.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "poll task ended abnormally");
            }
            self.inner.status.info("Stopped");
            debug!(address = %self.inner.address, "session stopped");
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("address", &self.inner.address)
            .field("stopped", &self.is_stopped())
            .finish_non_exhaustive()
    }
}

/// LAN client for the bridge; only this client accepts self-signed certificates.
fn bridge_client(address: &str, config: &SessionConfig) -> Result<BridgeClient, CoreError> {
    Ok(BridgeClient::new(
        address,
        &TransportConfig::bridge(config.request_timeout),
    )?)
}

fn report(status: &StatusReporter, err: CoreError) -> CoreError {
    status.error(err.to_string());
    err
}

/// Pair with the bridge at `config.address` (or the discovered one) without
/// starting a session. Returns the address used and the new credential.
pub async fn pair_bridge(
    config: &SessionConfig,
    host: Arc<dyn Host>,
) -> Result<(String, SecretString), CoreError> {
    let status = StatusReporter::new(Arc::clone(&host));
    let address = locator::locate_bridge(config)
        .await
        .map_err(|e| report(&status, e))?;
    let client = bridge_client(&address, config).map_err(|e| report(&status, e))?;
    let credential =
        pairing::negotiate(&client, &config.device_type, host.as_ref(), &status).await?;
    Ok((address, credential))
}
