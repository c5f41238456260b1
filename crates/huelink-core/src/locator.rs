// ── Bridge locator ──
//
// A configured address wins outright. Otherwise the discovery service is
// asked once; its first candidate is used. No retry: a failed discovery
// ends the start attempt.

use huelink_api::{DiscoveredBridge, TransportConfig, discover};
use tracing::{debug, info};
use url::Url;

use crate::config::SessionConfig;
use crate::error::CoreError;

/// Resolve the bridge address for `config`.
pub async fn resolve_address(
    config: &SessionConfig,
    http: &reqwest::Client,
) -> Result<String, CoreError> {
    if let Some(address) = config.address.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
        debug!(address, "using configured bridge address");
        return Ok(address.to_owned());
    }

    let bridge = discover_all(config, http)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| CoreError::DiscoveryFailed {
            reason: "no bridges found on this network".into(),
        })?;

    let address = bridge.address();
    info!(%address, id = ?bridge.id, "discovered bridge");
    Ok(address)
}

/// Every bridge the discovery service reports, in service order.
pub async fn discover_all(
    config: &SessionConfig,
    http: &reqwest::Client,
) -> Result<Vec<DiscoveredBridge>, CoreError> {
    let url = Url::parse(&config.discovery_url).map_err(|e| CoreError::DiscoveryFailed {
        reason: format!("invalid discovery URL {:?}: {e}", config.discovery_url),
    })?;
    discover(http, &url)
        .await
        .map_err(|e| CoreError::DiscoveryFailed {
            reason: e.to_string(),
        })
}

/// Query discovery over a certificate-verifying client.
pub async fn discover_bridges(config: &SessionConfig) -> Result<Vec<DiscoveredBridge>, CoreError> {
    discover_all(config, &discovery_client(config)?).await
}

/// [`resolve_address`] over a certificate-verifying client.
pub async fn locate_bridge(config: &SessionConfig) -> Result<String, CoreError> {
    resolve_address(config, &discovery_client(config)?).await
}

fn discovery_client(config: &SessionConfig) -> Result<reqwest::Client, CoreError> {
    Ok(TransportConfig::discovery(config.request_timeout).build_client()?)
}
