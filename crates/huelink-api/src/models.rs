// Bridge API wire types
//
// Serde models for the bridge's v1 REST surface. Every field the bridge
// may omit is optional; the bridge varies the payload by light type
// (a dimmable-only bulb has no `hue`, `sat`, `ct` or `xy`).

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The two resource families polled from the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Individually addressable lights: `/lights/{id}/state`.
    Lights,
    /// Rooms and zones: `/groups/{id}/action`.
    Groups,
}

impl Category {
    /// Collection path segment.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lights => "lights",
            Self::Groups => "groups",
        }
    }

    /// Writable sub-resource for this category.
    pub fn state_resource(self) -> &'static str {
        match self {
            Self::Lights => "state",
            Self::Groups => "action",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `{"type", "address", "description"}` error object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeError {
    #[serde(rename = "type", default)]
    pub kind: u32,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub description: String,
}

/// Light `state`, group `action`, or group aggregate `state`.
///
/// Groups report `any_on` / `all_on` under `state` and the last
/// applied action (`on`, `bri`, ...) under `action`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LightState {
    #[serde(default)]
    pub on: Option<bool>,
    #[serde(default)]
    pub any_on: Option<bool>,
    #[serde(default)]
    pub all_on: Option<bool>,
    /// Brightness, 0-254 (some firmware reports 255).
    #[serde(default)]
    pub bri: Option<u8>,
    /// Hue, 0-65535 wrapping around the color wheel.
    #[serde(default)]
    pub hue: Option<u16>,
    /// Saturation, 0-254.
    #[serde(default)]
    pub sat: Option<u8>,
    /// Color temperature in mireds (153-500 on most bulbs).
    #[serde(default)]
    pub ct: Option<u16>,
    /// CIE 1931 chromaticity.
    #[serde(default)]
    pub xy: Option<[f64; 2]>,
    /// `"hs"`, `"ct"` or `"xy"`.
    #[serde(default)]
    pub colormode: Option<String>,
    #[serde(default)]
    pub reachable: Option<bool>,
}

/// One light or group as returned by `GET /api/{user}/{lights|groups}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub modelid: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub state: Option<LightState>,
    #[serde(default)]
    pub action: Option<LightState>,
    /// Member light ids (groups only).
    #[serde(default)]
    pub lights: Vec<String>,
}

/// A single entry of a fetched collection.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordEntry {
    Device(DeviceRecord),
    /// The bridge flagged this item, or it could not be decoded.
    Failed { description: String },
}

impl RecordEntry {
    /// Decode one raw collection value, isolating failures to this item.
    pub fn from_value(value: Value) -> Self {
        if let Some(err) = value.get("error") {
            let description = serde_json::from_value::<BridgeError>(err.clone())
                .map(|e| e.description)
                .unwrap_or_else(|_| err.to_string());
            return Self::Failed { description };
        }
        match serde_json::from_value::<DeviceRecord>(value) {
            Ok(record) => Self::Device(record),
            Err(e) => Self::Failed {
                description: format!("malformed record: {e}"),
            },
        }
    }
}

/// Ordered id -> entry mapping, preserving the bridge's iteration order.
pub type DeviceCollection = IndexMap<String, RecordEntry>;

/// Result of a single-attribute `PUT`.
#[derive(Debug, Clone, PartialEq)]
pub enum PutReply {
    /// Echoed `"/{category}/{id}/{resource}/{attr}" -> value` pairs.
    Success(Map<String, Value>),
    /// The bridge accepted the request shape but rejected the command.
    DeviceError(BridgeError),
}

/// Element of the `[{"success": ...} | {"error": ...}]` list the bridge
/// returns for POST and PUT.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiMessage {
    #[serde(default)]
    pub success: Option<Value>,
    #[serde(default)]
    pub error: Option<BridgeError>,
}

/// Top-level body of a collection GET: either the records, or an error
/// list when the whole request was refused (e.g. unauthorized user).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum CollectionBody {
    Records(IndexMap<String, Value>),
    Messages(Vec<ApiMessage>),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn category_paths() {
        assert_eq!(Category::Lights.as_str(), "lights");
        assert_eq!(Category::Lights.state_resource(), "state");
        assert_eq!(Category::Groups.as_str(), "groups");
        assert_eq!(Category::Groups.state_resource(), "action");
        assert_eq!(Category::Groups.to_string(), "groups");
    }

    #[test]
    fn record_entry_detects_error_marker() {
        let entry = RecordEntry::from_value(json!({
            "error": { "type": 3, "address": "/lights/7", "description": "resource not available" }
        }));
        assert_eq!(
            entry,
            RecordEntry::Failed {
                description: "resource not available".into()
            }
        );
    }

    #[test]
    fn record_entry_decodes_light() {
        let entry = RecordEntry::from_value(json!({
            "name": "Hall",
            "modelid": "LCT015",
            "type": "Extended color light",
            "state": { "on": true, "bri": 200, "hue": 8000, "sat": 120, "xy": [0.4, 0.4], "ct": 366, "colormode": "xy" }
        }));
        let RecordEntry::Device(record) = entry else {
            panic!("expected a device");
        };
        let state = record.state.unwrap();
        assert_eq!(record.name, "Hall");
        assert_eq!(state.bri, Some(200));
        assert_eq!(state.xy, Some([0.4, 0.4]));
        assert_eq!(state.colormode.as_deref(), Some("xy"));
    }

    #[test]
    fn record_entry_isolates_malformed_item() {
        let entry = RecordEntry::from_value(json!({ "name": "Bad", "state": { "bri": "bright" } }));
        assert!(matches!(entry, RecordEntry::Failed { .. }));
    }

    #[test]
    fn collection_body_keeps_bridge_order() {
        let body: CollectionBody =
            serde_json::from_str(r#"{"9": {"name": "z"}, "2": {"name": "a"}, "5": {"name": "m"}}"#)
                .unwrap();
        let CollectionBody::Records(map) = body else {
            panic!("expected records");
        };
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, ["9", "2", "5"]);
    }

    #[test]
    fn collection_body_error_list() {
        let body: CollectionBody = serde_json::from_str(
            r#"[{"error": {"type": 1, "address": "/", "description": "unauthorized user"}}]"#,
        )
        .unwrap();
        assert!(matches!(body, CollectionBody::Messages(_)));
    }
}
