//! Configuration loading from files and the environment.
//!
//! The loader produces a raw JSON document first so the same input can be
//! fed to strict validation and to normalization.

use crate::error::{ConfigError, ConfigResult};
use crate::model::TransportConfig;
use crate::normalize::normalize_open_responses_transport_config;
use crate::validate::validate_open_responses_transport_config;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "OPENRESPONSES_";

/// Supported file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON (default)
    Json,
    /// YAML (`.yaml`, `.yml`)
    Yaml,
    /// TOML (`.toml`)
    Toml,
}

impl ConfigFormat {
    /// Pick a format from the file extension, defaulting to JSON
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml" | "yml") => Self::Yaml,
            Some("toml") => Self::Toml,
            _ => Self::Json,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Toml => "toml",
        }
    }

    fn parse(self, path: &Path, contents: &str) -> ConfigResult<Value> {
        let parsed = match self {
            Self::Json => serde_json::from_str::<Value>(contents).map_err(|e| e.to_string()),
            Self::Yaml => serde_yaml::from_str::<Value>(contents).map_err(|e| e.to_string()),
            Self::Toml => toml::from_str::<Value>(contents).map_err(|e| e.to_string()),
        };

        parsed.map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            format: self.name(),
            message,
        })
    }
}

/// Transport configuration loader
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    env_overrides: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a loader with no file and environment overrides enabled
    #[must_use]
    pub fn new() -> Self {
        Self {
            file: None,
            env_overrides: true,
        }
    }

    /// Read the document from `path`
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Enable or disable `OPENRESPONSES_*` overrides
    #[must_use]
    pub fn with_env_overrides(mut self, enabled: bool) -> Self {
        self.env_overrides = enabled;
        self
    }

    /// Configured file, if any
    #[must_use]
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Load the raw document with overrides applied, before normalization.
    ///
    /// Returns `None` when there is neither a file nor any override.
    pub async fn load_raw(&self) -> ConfigResult<Option<Value>> {
        let mut raw = match &self.file {
            Some(path) => Some(read_document(path).await?),
            None => None,
        };

        if self.env_overrides {
            apply_env_overrides(&mut raw, |key| std::env::var(key).ok());
        }

        Ok(raw)
    }

    /// Load and normalize. Malformed fields fall back to defaults.
    pub async fn load(&self) -> ConfigResult<TransportConfig> {
        let raw = self.load_raw().await?;
        let config = normalize_open_responses_transport_config(raw.as_ref());

        info!(
            enabled = config.enabled,
            mode = %config.policy.mode,
            canary_percent = config.policy.canary_percent,
            max_ws_retries = config.policy.max_ws_retries,
            matrix_entries = config.matrix.len(),
            "Transport configuration loaded"
        );

        Ok(config)
    }

    /// Load, reject on any validation error, then normalize.
    pub async fn load_validated(&self) -> ConfigResult<TransportConfig> {
        let raw = self.load_raw().await?;
        let report = validate_open_responses_transport_config(raw.as_ref());
        if !report.ok {
            warn!(errors = report.errors.len(), "Transport configuration rejected");
            return Err(ConfigError::Invalid(report.errors));
        }
        Ok(normalize_open_responses_transport_config(raw.as_ref()))
    }
}

async fn read_document(path: &Path) -> ConfigResult<Value> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let format = ConfigFormat::from_path(path);
    debug!(path = %path.display(), format = format.name(), "Reading transport config");
    format.parse(path, &contents)
}

/// Write `OPENRESPONSES_*` overrides into the raw document.
///
/// Values land in the document unchanged apart from type sniffing, so they
/// go through normalization and validation like file input.
pub fn apply_env_overrides(raw: &mut Option<Value>, lookup: impl Fn(&str) -> Option<String>) {
    let overrides = [
        ("TRANSPORT_ENABLED", None, "enabled"),
        ("TRANSPORT_MODE", Some("transportPolicy"), "mode"),
        ("CANARY_PERCENT", Some("transportPolicy"), "canaryPercent"),
        ("MAX_WS_RETRIES", Some("transportPolicy"), "maxWsRetries"),
    ];

    for (suffix, section, key) in overrides {
        let var = format!("{ENV_PREFIX}{suffix}");
        let Some(value) = lookup(&var) else {
            continue;
        };

        debug!(var = %var, "Applying environment override");

        if !matches!(raw, Some(Value::Object(_))) {
            *raw = Some(Value::Object(Map::new()));
        }
        let Some(Value::Object(doc)) = raw.as_mut() else {
            continue;
        };

        let target = match section {
            Some(section) => {
                let entry = doc
                    .entry(section)
                    .or_insert_with(|| Value::Object(Map::new()));
                if !entry.is_object() {
                    *entry = Value::Object(Map::new());
                }
                match entry.as_object_mut() {
                    Some(map) => map,
                    None => continue,
                }
            }
            None => doc,
        };

        target.insert(key.to_string(), sniff_value(&value));
    }
}

fn sniff_value(value: &str) -> Value {
    let trimmed = value.trim();
    match trimmed {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => trimmed
            .parse::<i64>()
            .map_or_else(|_| Value::String(trimmed.to_string()), Value::from),
    }
}
