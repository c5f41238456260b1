// ── Device-to-path translation ──
//
// Pure mapping from one bridge record to normalized values. No I/O and no
// session state: the poll loop decides what to publish and what to register.

use huelink_api::{Category, DeviceRecord, LightState};
use serde_json::{Value, json};

use crate::attribute::Attribute;
use crate::host::PathValue;

/// Root of every published path.
pub const SWITCH_ROOT: &str = "electrical.switches";

/// Bridge hue units per degree on reads (65535 / 360).
pub const HUE_UNITS_PER_DEGREE: f64 = 182.04;

/// Brightness and saturation read scale.
pub const BYTE_SCALE: f64 = 255.0;

/// Normalized color model tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Hsb,
    Temperature,
    Cie,
}

impl ColorMode {
    /// Map the bridge's `colormode` string.
    pub fn from_device(mode: &str) -> Option<Self> {
        match mode {
            "hs" => Some(Self::Hsb),
            "ct" => Some(Self::Temperature),
            "xy" => Some(Self::Cie),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hsb => "hsb",
            Self::Temperature => "temperature",
            Self::Cie => "cie",
        }
    }
}

/// Everything derived from one record.
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    /// Device path, e.g. `electrical.switches.lights.livingRoom`.
    pub path: String,
    pub values: Vec<PathValue>,
    /// Descriptive metadata for `path`.
    pub meta: Value,
    /// Attributes observed on this record that accept writes.
    pub writable: Vec<Attribute>,
}

/// camelCase a display name: `"Living room 2"` -> `"livingRoom2"`.
///
/// Words split on any non-alphanumeric character and on lower-to-upper case
/// transitions. Distinct names can normalize identically; the later device
/// in a batch then overwrites the earlier one's values.
pub fn normalize_name(name: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in name.chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_numeric();
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    let mut out = String::with_capacity(name.len());
    for (i, word) in words.iter().enumerate() {
        let lower = word.to_lowercase();
        if i == 0 {
            out.push_str(&lower);
        } else {
            let mut chars = lower.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
        }
    }
    out
}

/// Device path for a category and display name.
pub fn device_path(category: Category, name: &str) -> String {
    format!("{SWITCH_ROOT}.{category}.{}", normalize_name(name))
}

pub fn brightness_fraction(bri: u8) -> f64 {
    f64::from(bri) / BYTE_SCALE
}

pub fn saturation_fraction(sat: u8) -> f64 {
    f64::from(sat) / BYTE_SCALE
}

/// Hue as a fraction of the color wheel, clamped to 1.0 at the top of the range.
pub fn hue_fraction(hue: u16) -> f64 {
    (f64::from(hue) / HUE_UNITS_PER_DEGREE / 360.0).clamp(0.0, 1.0)
}

/// Translate one record.
///
/// Lights report power as `state.on`; groups as the `state.any_on`
/// aggregate, with levels and color taken from the group `action`.
pub fn translate(category: Category, record: &DeviceRecord) -> Translation {
    let path = device_path(category, &record.name);
    let empty = LightState::default();

    let (power, effective) = match category {
        Category::Lights => {
            let state = record.state.as_ref().unwrap_or(&empty);
            (state.on, state)
        }
        Category::Groups => (
            record.state.as_ref().and_then(|s| s.any_on),
            record.action.as_ref().unwrap_or(&empty),
        ),
    };

    let mut values = Vec::new();
    let mut writable = Vec::new();
    let mut emit = |attribute: Attribute, value: Value, values: &mut Vec<PathValue>| {
        values.push(PathValue::new(format!("{path}.{attribute}"), value));
        writable.push(attribute);
    };

    if let Some(on) = power {
        emit(Attribute::State, json!(on), &mut values);
    }
    if let Some(bri) = effective.bri {
        emit(Attribute::DimmingLevel, json!(brightness_fraction(bri)), &mut values);
    }

    if let Some(mode) = effective.colormode.as_deref().and_then(ColorMode::from_device) {
        values.push(PathValue::new(format!("{path}.colorMode"), mode.as_str()));

        if let (Some(hue), Some(sat)) = (effective.hue, effective.sat) {
            emit(Attribute::Hue, json!(hue_fraction(hue)), &mut values);
            emit(Attribute::Saturation, json!(saturation_fraction(sat)), &mut values);
        }
        if let Some(ct) = effective.ct {
            emit(Attribute::ColorTemperature, json!(ct), &mut values);
        }
        if let Some([x, y]) = effective.xy {
            emit(Attribute::Cie, json!({ "x": x, "y": y }), &mut values);
        }
    }

    let meta = json!({
        "type": "dimmer",
        "category": category.as_str(),
        "displayName": record.name,
        "model": record.modelid,
    });

    Translation {
        path,
        values,
        meta,
        writable,
    }
}
