// Bridge HTTP client
//
// Wraps `reqwest::Client` with bridge-specific URL construction and
// envelope unwrapping. Pairing lives in `pairing.rs` as inherent methods
// to keep this module focused on transport mechanics.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::{ApiMessage, Category, CollectionBody, DeviceCollection, PutReply, RecordEntry};
use crate::transport::TransportConfig;

const BODY_PREVIEW_LEN: usize = 200;

/// Raw HTTP client for one bridge's v1 REST API.
///
/// Holds the bridge base URL and, once paired, the whitelisted username
/// used as the path credential (`/api/{username}/...`).
pub struct BridgeClient {
    http: reqwest::Client,
    base_url: Url,
    credential: Option<SecretString>,
}

impl BridgeClient {
    /// Create a client for the bridge at `address`.
    ///
    /// `address` may be a bare host (`192.168.1.20`), a `host:port`, or a
    /// full URL. Bare addresses are reached over plain HTTP.
    pub fn new(address: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, Self::base_url_for(address)?))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            credential: None,
        }
    }

    /// Attach the paired username.
    #[must_use]
    pub fn with_credential(mut self, credential: SecretString) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Normalize a configured address into the bridge root URL.
    pub fn base_url_for(address: &str) -> Result<Url, Error> {
        let trimmed = address.trim().trim_end_matches('/');
        if trimmed.contains("://") {
            Ok(Url::parse(trimmed)?)
        } else {
            Ok(Url::parse(&format!("http://{trimmed}"))?)
        }
    }

    /// The bridge base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Unauthenticated endpoint: `{base}/api`.
    pub(crate) fn api_url(&self) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/api"))?)
    }

    /// Authenticated endpoint: `{base}/api/{credential}/{path}`.
    fn resource_url(&self, path: &str) -> Result<Url, Error> {
        let credential = self.credential.as_ref().ok_or(Error::MissingCredential)?;
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!(
            "{base}/api/{}/{path}",
            credential.expose_secret()
        ))?)
    }

    // ── Resource operations ──────────────────────────────────────────

    /// Fetch every light or group, in bridge order.
    ///
    /// Items the bridge flags individually come back as
    /// [`RecordEntry::Failed`]; a refusal of the whole request (such as an
    /// unknown username) is an [`Error::Device`].
    pub async fn fetch(&self, category: Category) -> Result<DeviceCollection, Error> {
        let url = self.resource_url(category.as_str())?;
        debug!(%category, "GET /api/<credential>/{category}");

        let resp = self.http.get(url).send().await?;
        let body = read_body(resp).await?;

        match parse_json::<CollectionBody>(&body)? {
            CollectionBody::Records(records) => Ok(records
                .into_iter()
                .map(|(id, value)| (id, RecordEntry::from_value(value)))
                .collect()),
            CollectionBody::Messages(messages) => Err(first_error(messages, &body)),
        }
    }

    /// Send a single-attribute command to a light's `state` or a group's `action`.
    pub async fn put_attribute(
        &self,
        category: Category,
        id: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<PutReply, Error> {
        let path = format!("{category}/{id}/{}", category.state_resource());
        let url = self.resource_url(&path)?;
        debug!(%category, id, "PUT /api/<credential>/{path}");

        let resp = self.http.put(url).json(body).send().await?;
        let raw = read_body(resp).await?;
        let messages: Vec<ApiMessage> = parse_json(&raw)?;

        let mut echoed = serde_json::Map::new();
        for message in messages {
            if let Some(err) = message.error {
                return Ok(PutReply::DeviceError(err));
            }
            match message.success {
                Some(serde_json::Value::Object(map)) => echoed.extend(map),
                _ => return Err(protocol("expected success or error entry", &raw)),
            }
        }
        if echoed.is_empty() {
            return Err(protocol("empty command response", &raw));
        }
        trace!(?echoed, "command acknowledged");
        Ok(PutReply::Success(echoed))
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a POST to an unauthenticated endpoint and decode the message list.
    pub(crate) async fn post_messages(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<(Vec<ApiMessage>, String), Error> {
        debug!("POST {url}");
        let resp = self.http.post(url).json(body).send().await?;
        let raw = read_body(resp).await?;
        let messages = parse_json(&raw)?;
        Ok((messages, raw))
    }
}

/// Reject non-2xx statuses and return the body text.
pub(crate) async fn read_body(resp: reqwest::Response) -> Result<String, Error> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::Http {
            status: status.as_u16(),
            body: preview(&body).to_owned(),
        });
    }
    Ok(resp.text().await?)
}

/// Decode a JSON body, keeping a preview of the raw text on failure.
pub(crate) fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| Error::Protocol {
        message: format!("{e} (body preview: {:?})", preview(body)),
        body: body.to_owned(),
    })
}

pub(crate) fn protocol(message: &str, body: &str) -> Error {
    Error::Protocol {
        message: format!("{message} (body preview: {:?})", preview(body)),
        body: body.to_owned(),
    }
}

fn first_error(messages: Vec<ApiMessage>, body: &str) -> Error {
    messages
        .into_iter()
        .find_map(|m| m.error)
        .map_or_else(
            || protocol("expected an object of records", body),
            |err| Error::Device {
                kind: err.kind,
                address: err.address,
                description: err.description,
            },
        )
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(BODY_PREVIEW_LEN) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn bare_address_uses_http() {
        let url = BridgeClient::base_url_for("192.168.1.20").unwrap();
        assert_eq!(url.as_str(), "http://192.168.1.20/");
    }

    #[test]
    fn full_url_is_kept() {
        let url = BridgeClient::base_url_for("https://bridge.local:8443/").unwrap();
        assert_eq!(url.as_str(), "https://bridge.local:8443/");
    }

    #[test]
    fn new_builds_bridge_client_for_address() {
        let transport = TransportConfig::bridge(std::time::Duration::from_secs(2));
        let client = BridgeClient::new("10.0.0.2:8080", &transport).unwrap();
        assert_eq!(client.base_url().as_str(), "http://10.0.0.2:8080/");
    }

    #[test]
    fn resource_url_requires_credential() {
        let client = BridgeClient::with_client(
            reqwest::Client::new(),
            BridgeClient::base_url_for("10.0.0.2").unwrap(),
        );
        assert!(matches!(
            client.resource_url("lights"),
            Err(Error::MissingCredential)
        ));

        let client = client.with_credential(SecretString::from("abc".to_owned()));
        assert_eq!(
            client.resource_url("lights").unwrap().as_str(),
            "http://10.0.0.2/api/abc/lights"
        );
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        let long = "é".repeat(BODY_PREVIEW_LEN + 10);
        assert_eq!(preview(&long).chars().count(), BODY_PREVIEW_LEN);
        assert_eq!(preview("short"), "short");
    }
}
