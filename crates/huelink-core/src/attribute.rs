// ── Writable attributes ──
//
// Each normalized leaf that accepts writes, with its bridge key and the
// converters between normalized values and bridge units.

use serde_json::{Value, json};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Bridge hue units per degree of the color wheel, as sent on writes.
pub const HUE_UNITS_PER_DEGREE_WRITE: f64 = 182.0;

/// Brightness ceiling the bridge accepts on writes.
pub const BRIGHTNESS_WRITE_MAX: f64 = 254.0;

/// Saturation scale applied on writes.
pub const SATURATION_WRITE_MAX: f64 = 255.0;

/// Normalized leaf names under a device path.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumString, EnumIter,
)]
#[strum(serialize_all = "camelCase")]
pub enum Attribute {
    /// `on`, boolean.
    State,
    /// `bri`, fraction 0.0-1.0.
    DimmingLevel,
    /// `hue`, fraction of the color wheel.
    Hue,
    /// `sat`, fraction 0.0-1.0.
    Saturation,
    /// `ct`, raw mireds.
    ColorTemperature,
    /// `xy`, `{x, y}`.
    Cie,
}

impl Attribute {
    /// Key used in the bridge's `state` / `action` body.
    pub fn device_key(self) -> &'static str {
        match self {
            Self::State => "on",
            Self::DimmingLevel => "bri",
            Self::Hue => "hue",
            Self::Saturation => "sat",
            Self::ColorTemperature => "ct",
            Self::Cie => "xy",
        }
    }

    /// Convert a normalized write value into the bridge's units.
    #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
    pub fn to_device(self, value: &Value) -> Result<Value, String> {
        match self {
            Self::State => coerce_bool(value).map(Value::Bool),
            Self::DimmingLevel => {
                number(self, value).map(|v| json!((v * BRIGHTNESS_WRITE_MAX).round() as i64))
            }
            Self::Hue => number(self, value)
                .map(|v| json!((v * HUE_UNITS_PER_DEGREE_WRITE * 360.0).round() as i64)),
            Self::Saturation => {
                number(self, value).map(|v| json!((v * SATURATION_WRITE_MAX).round() as i64))
            }
            Self::ColorTemperature => number(self, value).map(|_| value.clone()),
            Self::Cie => cie_pair(value),
        }
    }

    /// Convert the bridge's echoed value back for publication.
    ///
    /// Only brightness is rescaled; other echoes are published as the
    /// bridge reports them.
    pub fn from_echo(self, echoed: &Value) -> Value {
        match (self, echoed.as_f64()) {
            (Self::DimmingLevel, Some(bri)) => json!(bri / BRIGHTNESS_WRITE_MAX),
            _ => echoed.clone(),
        }
    }
}

fn number(attribute: Attribute, value: &Value) -> Result<f64, String> {
    value
        .as_f64()
        .ok_or_else(|| format!("{attribute} expects a number, got {value}"))
}

fn coerce_bool(value: &Value) -> Result<bool, String> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Null => Ok(false),
        Value::Number(n) => Ok(n.as_f64().is_some_and(|v| v != 0.0)),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "on" | "1" => Ok(true),
            "false" | "off" | "0" | "" => Ok(false),
            other => Err(format!("state expects a boolean, got {other:?}")),
        },
        other => Err(format!("state expects a boolean, got {other}")),
    }
}

fn cie_pair(value: &Value) -> Result<Value, String> {
    let pair = match value {
        Value::Object(map) => map
            .get("x")
            .and_then(Value::as_f64)
            .zip(map.get("y").and_then(Value::as_f64)),
        Value::Array(items) if items.len() == 2 => {
            items[0].as_f64().zip(items[1].as_f64())
        }
        _ => None,
    };
    pair.map(|(x, y)| json!([x, y]))
        .ok_or_else(|| format!("cie expects {{\"x\": n, \"y\": n}}, got {value}"))
}
