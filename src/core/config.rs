//! Tunables for the three components, persisted as `config.json`.
//!
//! Every field has a default, so a missing file or a partial file is valid.

use crate::core::dirs::{get_config_directory, get_stats_cache_directory};
use crate::core::error::HudError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE: &str = "config.json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct ResilienceConfig {
    pub cache: CacheConfig,
    pub classifier: ClassifierConfig,
    pub restart: RestartConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    /// Snapshots older than this are stale. Zero expires everything.
    pub ttl_secs: u64,
    /// Overrides the platform cache directory.
    pub directory: Option<PathBuf>,
    pub delete_retry: DeleteRetryConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 30 * 60,
            directory: None,
            delete_retry: DeleteRetryConfig::default(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn resolve_directory(&self) -> Result<PathBuf, HudError> {
        match &self.directory {
            Some(dir) => Ok(dir.clone()),
            None => get_stats_cache_directory(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DeleteRetryConfig {
    pub attempts: u32,
    pub backoff_ms: u64,
}

impl Default for DeleteRetryConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff_ms: 10,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ClassifierConfig {
    pub max_retries: u32,
    /// Only errors younger than this count toward escalation.
    pub escalation_window_secs: u64,
    /// Recent recoverable errors needed before a reset is forced.
    pub escalation_threshold: usize,
    /// Errors older than this are pruned on every write.
    pub history_retention_secs: u64,
    /// Characters of source text kept per recorded error.
    pub source_text_limit: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            escalation_window_secs: 5 * 60,
            escalation_threshold: 5,
            history_retention_secs: 60 * 60,
            source_text_limit: 200,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RestartConfig {
    pub cooldown_secs: u64,
    pub max_consecutive_errors: u32,
    /// Seat-count deltas strictly above this force a restart.
    pub seat_change_threshold: u32,
}

impl Default for RestartConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: 30,
            max_consecutive_errors: 5,
            seat_change_threshold: 2,
        }
    }
}

impl ResilienceConfig {
    /// Load `config.json` from the platform config directory, writing defaults on first use.
    pub fn load_or_create() -> Result<Self, HudError> {
        let config_file = get_config_directory()?.join(CONFIG_FILE);

        if config_file.exists() {
            Self::load_from(&config_file)
        } else {
            let config = Self::default();
            config.save_to(&config_file)?;
            log::info!("Wrote default configuration to {}", config_file.display());
            Ok(config)
        }
    }

    /// Load an explicit config file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, HudError> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| HudError::config_parse_failed(path, e))
    }

    pub fn save_to(&self, path: &Path) -> Result<(), HudError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }
}
