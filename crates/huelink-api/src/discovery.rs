// Bridge discovery via the vendor's N-UPnP endpoint
//
// The discovery service returns every bridge that recently phoned home
// from the caller's public IP: `[{"id": "...", "internalipaddress": "..."}]`.

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::client::{parse_json, read_body};
use crate::error::Error;

/// Public discovery endpoint.
pub const DEFAULT_DISCOVERY_URL: &str = "https://discovery.meethue.com";

/// One candidate bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredBridge {
    #[serde(default)]
    pub id: Option<String>,
    pub internalipaddress: String,
    #[serde(default)]
    pub port: Option<u16>,
}

impl DiscoveredBridge {
    /// Address suitable for [`BridgeClient::new`](crate::BridgeClient::new).
    pub fn address(&self) -> String {
        match self.port {
            Some(port) if port != 80 && port != 443 => {
                format!("{}:{port}", self.internalipaddress)
            }
            _ => self.internalipaddress.clone(),
        }
    }
}

/// Query the discovery service, returning candidates in service order.
///
/// An empty list is returned as-is; deciding whether that is fatal is
/// the caller's business.
pub async fn discover(http: &reqwest::Client, url: &Url) -> Result<Vec<DiscoveredBridge>, Error> {
    debug!("GET {url}");
    let resp = http.get(url.clone()).send().await?;
    let body = read_body(resp).await?;
    let bridges: Vec<DiscoveredBridge> = parse_json(&body)?;
    debug!(count = bridges.len(), "discovery complete");
    Ok(bridges)
}
