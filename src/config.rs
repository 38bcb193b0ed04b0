use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::ingest::sources::DEFAULT_MAX_DEPTH;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct MmiConfig {
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
    pub ingestion: IngestionConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub manifest_path: String,
    pub event_log_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct IngestionConfig {
    pub max_depth: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            manifest_path: "memory-bundles/mmi-manifest.json".into(),
            event_log_path: "memory-bundles/mmi-ingestion-log.md".into(),
        }
    }
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Returns `~/.mmi/`, or `./.mmi/` when no home directory is known.
pub fn default_mmi_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".mmi")
}

/// Returns the default config file path: `~/.mmi/config.toml`
pub fn default_config_path() -> PathBuf {
    default_mmi_dir().join("config.toml")
}

impl MmiConfig {
    /// Load config from the default TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            MmiConfig::default()
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment variable overrides (MMI_MANIFEST, MMI_EVENT_LOG,
    /// MMI_LOG_LEVEL, MMI_MAX_DEPTH).
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("MMI_MANIFEST") {
            self.storage.manifest_path = val;
        }
        if let Ok(val) = std::env::var("MMI_EVENT_LOG") {
            self.storage.event_log_path = val;
        }
        if let Ok(val) = std::env::var("MMI_LOG_LEVEL") {
            self.logging.log_level = val;
        }
        if let Ok(val) = std::env::var("MMI_MAX_DEPTH") {
            self.ingestion.max_depth = val
                .parse()
                .with_context(|| format!("MMI_MAX_DEPTH must be a non-negative integer, got {val:?}"))?;
        }
        Ok(())
    }

    pub fn resolved_manifest_path(&self) -> PathBuf {
        expand_tilde(&self.storage.manifest_path)
    }

    pub fn resolved_event_log_path(&self) -> PathBuf {
        expand_tilde(&self.storage.event_log_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
