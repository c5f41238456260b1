//! Persisted configuration for huelink hosts.
//!
//! A flat TOML file, overridable from `HUELINK_*` environment variables,
//! translated into a [`huelink_core::SessionConfig`]. Also carries the
//! declarative schema a host renders for its settings screen.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

use huelink_core::SessionConfig;
use huelink_core::config::{DEFAULT_DEVICE_TYPE, DEFAULT_POLL_INTERVAL, DEFAULT_REQUEST_TIMEOUT};

/// Environment prefix for overrides, e.g. `HUELINK_ADDRESS`.
pub const ENV_PREFIX: &str = "HUELINK_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config ─────────────────────────────────────────────────────

/// Everything a host persists between runs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PluginConfig {
    /// Bridge address. Unset means discover on start.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Bridge username obtained by pairing (plaintext).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,

    pub poll_interval_secs: u64,

    pub discovery_url: String,

    /// Application id sent when pairing.
    pub device_type: String,

    pub request_timeout_secs: u64,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            address: None,
            credential: None,
            poll_interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
            discovery_url: huelink_core::config::DEFAULT_DISCOVERY_URL.into(),
            device_type: DEFAULT_DEVICE_TYPE.into(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT.as_secs(),
        }
    }
}

impl PluginConfig {
    /// Reject values no session could run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Validation {
                field: "request_timeout_secs".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.device_type.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "device_type".into(),
                reason: "must not be empty".into(),
            });
        }
        if !self.discovery_url.starts_with("http://") && !self.discovery_url.starts_with("https://")
        {
            return Err(ConfigError::Validation {
                field: "discovery_url".into(),
                reason: format!("expected an http(s) URL, got '{}'", self.discovery_url),
            });
        }
        Ok(())
    }

    /// Build the runtime session config. Blank strings count as unset.
    pub fn to_session_config(&self) -> SessionConfig {
        SessionConfig {
            address: non_blank(self.address.as_deref()),
            credential: non_blank(self.credential.as_deref()).map(SecretString::from),
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            discovery_url: self.discovery_url.clone(),
            device_type: self.device_type.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "huelink", "huelink").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("huelink");
    p
}

// ── Loading and saving ──────────────────────────────────────────────

/// Load config from defaults, then `path` (if present), then environment.
pub fn load_config(path: &Path) -> Result<PluginConfig, ConfigError> {
    let config: PluginConfig = Figment::new()
        .merge(Serialized::defaults(PluginConfig::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]))
        .extract()?;
    config.validate()?;
    Ok(config)
}

/// Serialize config to TOML and write it to `path`.
pub fn save_config(path: &Path, cfg: &PluginConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

/// Store a freshly paired credential (and the address it belongs to)
/// without disturbing other settings in the file.
pub fn save_credential(
    path: &Path,
    address: Option<&str>,
    credential: &str,
) -> Result<PluginConfig, ConfigError> {
    let mut cfg = if path.exists() {
        read_file(path)?
    } else {
        PluginConfig::default()
    };
    if let Some(address) = address {
        cfg.address = Some(address.to_owned());
    }
    cfg.credential = Some(credential.to_owned());
    save_config(path, &cfg)?;
    Ok(cfg)
}

/// File contents only, without environment overrides, so a save never
/// writes env-provided values back to disk.
fn read_file(path: &Path) -> Result<PluginConfig, ConfigError> {
    Ok(Figment::new()
        .merge(Serialized::defaults(PluginConfig::default()))
        .merge(Toml::file(path))
        .extract()?)
}

// ── Schema ──────────────────────────────────────────────────────────

/// JSON schema of the user-facing settings.
pub fn config_schema() -> Value {
    json!({
        "type": "object",
        "title": "Philips Hue bridge",
        "properties": {
            "address": {
                "type": "string",
                "title": "Bridge address",
                "description": "IP address or host name of the bridge. Leave empty to discover it."
            },
            "poll_interval_secs": {
                "type": "integer",
                "title": "Poll interval (seconds)",
                "minimum": 1,
                "default": DEFAULT_POLL_INTERVAL.as_secs()
            }
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    #[test]
    fn defaults_without_file() {
        Jail::expect_with(|jail| {
            let cfg = load_config(&jail.directory().join("missing.toml")).unwrap();
            assert_eq!(cfg, PluginConfig::default());
            assert_eq!(cfg.poll_interval_secs, 5);
            assert_eq!(cfg.discovery_url, "https://discovery.meethue.com");
            Ok(())
        });
    }

    #[test]
    fn file_then_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                    address = "192.168.1.20"
                    poll_interval_secs = 10
                "#,
            )?;
            jail.set_env("HUELINK_POLL_INTERVAL_SECS", "2");
            jail.set_env("HUELINK_CREDENTIAL", "from-env");

            let cfg = load_config(&jail.directory().join("config.toml")).unwrap();
            assert_eq!(cfg.address.as_deref(), Some("192.168.1.20"));
            assert_eq!(cfg.poll_interval_secs, 2);
            assert_eq!(cfg.credential.as_deref(), Some("from-env"));
            Ok(())
        });
    }

    #[test]
    fn config_path_env_var_is_not_a_field() {
        Jail::expect_with(|jail| {
            jail.set_env("HUELINK_CONFIG", "/elsewhere.toml");
            let cfg = load_config(&jail.directory().join("none.toml")).unwrap();
            assert_eq!(cfg, PluginConfig::default());
            Ok(())
        });
    }

    #[test]
    fn rejects_zero_timeout() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "request_timeout_secs = 0")?;
            let err = load_config(&jail.directory().join("config.toml")).unwrap_err();
            assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "request_timeout_secs"));
            Ok(())
        });
    }

    #[test]
    fn session_config_treats_blank_as_unset() {
        let cfg = PluginConfig {
            address: Some("  ".into()),
            credential: Some("abc".into()),
            poll_interval_secs: 0,
            ..PluginConfig::default()
        };
        let session = cfg.to_session_config();
        assert!(session.address.is_none());
        assert_eq!(session.credential.as_ref().unwrap().expose_secret(), "abc");
        assert_eq!(session.effective_poll_interval(), DEFAULT_POLL_INTERVAL);
    }

    #[test]
    fn save_credential_keeps_other_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let original = PluginConfig {
            poll_interval_secs: 30,
            ..PluginConfig::default()
        };
        save_config(&path, &original).unwrap();

        let saved = save_credential(&path, Some("10.0.0.2"), "user123").unwrap();
        assert_eq!(saved.poll_interval_secs, 30);

        let text = std::fs::read_to_string(&path).unwrap();
        let reloaded: PluginConfig = toml::from_str(&text).unwrap();
        assert_eq!(reloaded.address.as_deref(), Some("10.0.0.2"));
        assert_eq!(reloaded.credential.as_deref(), Some("user123"));
        assert_eq!(reloaded.poll_interval_secs, 30);
    }

    #[test]
    fn unset_fields_are_omitted_from_file() {
        let text = toml::to_string_pretty(&PluginConfig::default()).unwrap();
        assert!(!text.contains("address"));
        assert!(!text.contains("credential"));
        assert!(text.contains("poll_interval_secs = 5"));
    }

    #[test]
    fn schema_names_match_file_keys() {
        let schema = config_schema();
        let defaults = serde_json::to_value(PluginConfig::default()).unwrap();
        for key in schema["properties"].as_object().unwrap().keys() {
            assert!(
                key == "address" || defaults.get(key).is_some(),
                "schema key {key} is not a config field"
            );
        }
        assert_eq!(schema["properties"]["poll_interval_secs"]["default"], 5);
    }
}
