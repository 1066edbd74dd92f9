//! Durable, TTL-bounded storage of overlay statistics.
//!
//! When an overlay has to be torn down, its accumulated statistics are written
//! here so the recreated overlay can pick them back up instead of starting from
//! nothing. Each table gets one JSON file under the cache directory.
//!
//! # Public API
//! - [`StatsCache`]: save / load / load_entry / remove / sweep / merge
//! - [`DeleteRetryPolicy`]: bounded retry for file removal
//! - [`CacheEntrySummary`]: listing row used by the CLI
//!
//! # Failure Model
//! `save`, `load`, `remove` and `sweep` never return errors. Every failure is
//! logged and turned into `false`, `None` or a skipped entry, so a broken cache
//! can only cost history and never takes the overlay down with it.
//!
//! # Expiry
//! An entry is stale once `now - timestamp >= ttl`. A TTL of zero makes every
//! entry stale, including one saved a moment ago.

use crate::core::clock::{epoch_secs, Clock, SystemClock};
use crate::core::config::{CacheConfig, DeleteRetryConfig};
use crate::core::error::{HudError, Result};
use crate::core::snapshot::{is_zero_value, CacheEntry, StatsSnapshot};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

const CACHE_EXTENSION: &str = "json";

/// Retry policy for deleting cache files.
///
/// Some filesystems report a just-closed file as present for a short while
/// after it was unlinked, so the file being gone is the success condition
/// rather than `remove_file` returning `Ok`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteRetryPolicy {
    pub attempts: u32,
    /// Sleep before retry `n` is `backoff * n`.
    pub backoff: Duration,
}

impl Default for DeleteRetryPolicy {
    fn default() -> Self {
        Self::from(&DeleteRetryConfig::default())
    }
}

impl From<&DeleteRetryConfig> for DeleteRetryPolicy {
    fn from(config: &DeleteRetryConfig) -> Self {
        Self {
            attempts: config.attempts.max(1),
            backoff: Duration::from_millis(config.backoff_ms),
        }
    }
}

impl DeleteRetryPolicy {
    pub fn remove_with_retry(&self, path: &Path) -> Result<()> {
        for attempt in 1..=self.attempts {
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    log::warn!(
                        "Removal attempt {attempt} failed for '{}': {e}",
                        path.display()
                    );
                }
            }

            if !path.exists() {
                return Ok(());
            }

            if attempt < self.attempts {
                log::debug!(
                    "'{}' still present after attempt {attempt}, backing off",
                    path.display()
                );
                std::thread::sleep(self.backoff * attempt);
            }
        }

        Err(HudError::cache_remove_failed(path, self.attempts))
    }
}

/// One row of [`StatsCache::entries`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheEntrySummary {
    pub table_key: String,
    pub path: PathBuf,
    pub timestamp: f64,
    pub age_secs: f64,
    pub expired: bool,
    pub player_count: usize,
}

pub struct StatsCache {
    directory: PathBuf,
    ttl: Duration,
    retry: DeleteRetryPolicy,
    clock: Arc<dyn Clock>,
    last_capture: HashMap<String, f64>,
}

impl StatsCache {
    pub fn new(config: &CacheConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create the cache directory if needed and bind the cache to `clock`.
    pub fn with_clock(config: &CacheConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let directory = config.resolve_directory()?;
        fs::create_dir_all(&directory)
            .map_err(|e| HudError::cache_directory_creation_failed(&directory, e))?;

        log::info!(
            "HUD stats cache initialized at {} (ttl {}s)",
            directory.display(),
            config.ttl_secs
        );

        Ok(Self {
            directory,
            ttl: config.ttl(),
            retry: DeleteRetryPolicy::from(&config.delete_retry),
            clock,
            last_capture: HashMap::new(),
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Path of the cache file for `table_key`.
    ///
    /// Only alphanumerics, `.`, `_` and `-` survive, so the key can never
    /// escape the cache directory. A key with nothing left after that is named
    /// by the hex of its bytes.
    pub fn cache_file_path(&self, table_key: &str) -> PathBuf {
        let safe_key: String = table_key
            .chars()
            .filter(|c| c.is_alphanumeric() || matches!(c, '.' | '_' | '-'))
            .collect();
        let file_stem = if safe_key.is_empty() {
            let hex: String = table_key.bytes().map(|b| format!("{b:02x}")).collect();
            format!("table-{hex}")
        } else {
            safe_key
        };
        self.directory
            .join(format!("{file_stem}.{CACHE_EXTENSION}"))
    }

    /// Persist `snapshot` for `table_key`, replacing any previous entry.
    pub fn save(&mut self, table_key: &str, snapshot: &StatsSnapshot) -> bool {
        match self.try_save(table_key, snapshot) {
            Ok(timestamp) => {
                self.last_capture.insert(table_key.to_string(), timestamp);
                log::debug!("HUD stats saved for table {table_key}");
                true
            }
            Err(e) => {
                log::error!("Failed to save HUD stats for table {table_key}: {e}");
                false
            }
        }
    }

    fn try_save(&self, table_key: &str, snapshot: &StatsSnapshot) -> Result<f64> {
        let cache_file = self.cache_file_path(table_key);

        // Capture times never go backwards for a table, even if the clock does.
        let now = epoch_secs(self.clock.now());
        let timestamp = match self.last_capture.get(table_key) {
            Some(&previous) if previous > now => previous,
            _ => now,
        };

        let entry = CacheEntry {
            timestamp,
            snapshot: StatsSnapshot {
                table_key: table_key.to_string(),
                ..snapshot.clone()
            },
        };

        let json = serde_json::to_string_pretty(&entry)
            .map_err(|e| HudError::cache_serialization_failed(table_key, e))?;
        fs::write(&cache_file, json).map_err(|e| HudError::cache_write_failed(&cache_file, e))?;

        Ok(timestamp)
    }

    /// Load the snapshot for `table_key` if one exists and is still fresh.
    ///
    /// A stale entry is deleted on the way out.
    pub fn load(&self, table_key: &str) -> Option<StatsSnapshot> {
        self.load_entry(table_key).map(|entry| entry.snapshot)
    }

    /// Like [`StatsCache::load`], but keeps the capture time of the entry.
    ///
    /// An entry written for a different table that sanitizes to the same file
    /// name is reported as absent and left in place.
    pub fn load_entry(&self, table_key: &str) -> Option<CacheEntry> {
        let cache_file = self.cache_file_path(table_key);

        if !cache_file.exists() {
            log::debug!("No cached stats found for table {table_key}");
            return None;
        }

        let mut entry = match read_entry(&cache_file) {
            Ok(entry) => entry,
            Err(e) => {
                log::error!("Failed to load HUD stats for table {table_key}: {e}");
                return None;
            }
        };

        if !entry.snapshot.table_key.is_empty() && entry.snapshot.table_key != table_key {
            log::warn!(
                "Cache file {} belongs to table {}, not {table_key}",
                cache_file.display(),
                entry.snapshot.table_key
            );
            return None;
        }

        let age = self.age_secs(entry.timestamp);
        if self.is_expired(entry.timestamp) {
            log::debug!(
                "Cached stats expired for table {table_key} (age={age:.3}s >= ttl={}s)",
                self.ttl.as_secs_f64()
            );
            if let Err(e) = self.retry.remove_with_retry(&cache_file) {
                log::warn!("Expired stats for table {table_key} not removed: {e}");
            }
            return None;
        }

        log::debug!("HUD stats loaded for table {table_key} (age={age:.3}s)");

        if entry.snapshot.table_key.is_empty() {
            entry.snapshot.table_key = table_key.to_string();
        }
        Some(entry)
    }

    /// Delete the entry for `table_key`. Removing a missing entry succeeds.
    pub fn remove(&self, table_key: &str) -> bool {
        let cache_file = self.cache_file_path(table_key);

        match self.retry.remove_with_retry(&cache_file) {
            Ok(()) => {
                log::debug!("Cached stats removed for table {table_key}");
                true
            }
            Err(e) => {
                log::error!("Failed to remove HUD stats for table {table_key}: {e}");
                false
            }
        }
    }

    /// Delete every stale or unreadable entry. Returns how many files went away.
    pub fn sweep(&self) -> usize {
        let files = match self.cache_files() {
            Ok(files) => files,
            Err(e) => {
                log::error!("Failed to cleanup expired stats: {e}");
                return 0;
            }
        };

        let mut removed_count = 0;
        for cache_file in files {
            let stale = match read_entry(&cache_file) {
                Ok(entry) => {
                    log::debug!(
                        "Cleanup check for {}: age={:.3}s, ttl={}s",
                        cache_file.display(),
                        self.age_secs(entry.timestamp),
                        self.ttl.as_secs_f64()
                    );
                    self.is_expired(entry.timestamp)
                }
                Err(e) => {
                    log::warn!("Removing unreadable cache file: {e}");
                    true
                }
            };

            if !stale {
                continue;
            }

            match self.retry.remove_with_retry(&cache_file) {
                Ok(()) => removed_count += 1,
                Err(e) => log::warn!("Failed to remove stale cache file: {e}"),
            }
        }

        if removed_count > 0 {
            log::info!("Cleaned up {removed_count} expired HUD stats cache files");
        }
        removed_count
    }

    /// List readable entries, oldest first. Unreadable files are skipped.
    pub fn entries(&self) -> Vec<CacheEntrySummary> {
        let files = match self.cache_files() {
            Ok(files) => files,
            Err(e) => {
                log::error!("Failed to list cache entries: {e}");
                return Vec::new();
            }
        };

        let mut summaries: Vec<CacheEntrySummary> = files
            .into_iter()
            .filter_map(|path| match read_entry(&path) {
                Ok(entry) => Some(CacheEntrySummary {
                    table_key: entry.snapshot.table_key.clone(),
                    age_secs: self.age_secs(entry.timestamp),
                    expired: self.is_expired(entry.timestamp),
                    player_count: entry.snapshot.player_count(),
                    timestamp: entry.timestamp,
                    path,
                }),
                Err(e) => {
                    log::debug!("Skipping cache file: {e}");
                    None
                }
            })
            .collect();

        summaries.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        summaries
    }

    /// Combine a cached snapshot with freshly computed stats.
    ///
    /// The result starts from `fresh`. Players only in `cached` are carried over
    /// whole. For players in both, a cached stat wins only where the fresh stat
    /// is missing or still zero.
    pub fn merge(cached: &StatsSnapshot, fresh: &StatsSnapshot) -> StatsSnapshot {
        let mut merged = fresh.clone();

        for (player_id, cached_stats) in &cached.player_stats {
            match merged.player_stats.get_mut(player_id) {
                Some(merged_stats) => {
                    for (stat, cached_value) in cached_stats {
                        let keep_cached = merged_stats.get(stat).map_or(true, is_zero_value);
                        if keep_cached {
                            merged_stats.insert(stat.clone(), cached_value.clone());
                        }
                    }
                }
                None => {
                    merged
                        .player_stats
                        .insert(player_id.clone(), cached_stats.clone());
                }
            }
        }

        log::debug!(
            "Merged cached stats for {} into {} fresh players",
            cached.player_count(),
            fresh.player_count()
        );
        merged
    }

    fn is_expired(&self, timestamp: f64) -> bool {
        self.ttl.is_zero() || self.age_secs(timestamp) >= self.ttl.as_secs_f64()
    }

    fn age_secs(&self, timestamp: f64) -> f64 {
        epoch_secs(self.clock.now()) - timestamp
    }

    fn cache_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.directory)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == CACHE_EXTENSION) {
                files.push(path);
            }
        }
        Ok(files)
    }
}

fn read_entry(path: &Path) -> Result<CacheEntry> {
    let content = fs::read_to_string(path).map_err(|e| HudError::cache_read_failed(path, e))?;
    serde_json::from_str(&content).map_err(|e| HudError::cache_parse_failed(path, e))
}
