//! Domain-specific error types and error handling utilities.
//!
//! This module defines [`HudError`], the error type used by the persistence and
//! configuration layers. Component boundaries never return it to the host
//! application: [`crate::core::stats_cache::StatsCache`] converts every failure
//! into a boolean or an absent value plus a log entry. Inside the crate it keeps
//! failure context (which file, which operation) so those log entries are useful.
//!
//! # Public API
//! - [`HudError`]: Main error enum covering all failure modes
//! - [`Result<T>`]: Type alias for `std::result::Result<T, HudError>`
//!
//! # Error Categories
//! - **File operations**: Generic I/O and JSON errors
//! - **Cache operations**: Directory creation, write, read, parse and removal
//! - **Configuration**: Missing config directory, unreadable config file

use std::path::PathBuf;
use thiserror::Error;

/// Domain-specific error types for hud-resilience
#[derive(Error, Debug)]
pub enum HudError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Cache errors
    #[error("Failed to create cache directory '{path}': {source}")]
    CacheDirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize stats snapshot for table '{table_key}': {source}")]
    CacheSerializationFailed {
        table_key: String,
        source: serde_json::Error,
    },

    #[error("Failed to write cache file '{path}': {source}")]
    CacheWriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read cache file '{path}': {source}")]
    CacheReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse cache file '{path}': {source}")]
    CacheParseFailed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Cache file '{path}' still exists after {attempts} removal attempts")]
    CacheRemoveFailed { path: PathBuf, attempts: u32 },

    // Configuration errors
    #[error("Could not determine configuration directory")]
    ConfigDirectoryNotFound,

    #[error("Failed to parse configuration file '{path}': {source}")]
    ConfigParseFailed {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results using HudError
pub type Result<T> = std::result::Result<T, HudError>;

impl HudError {
    /// Create a cache directory creation failed error
    pub fn cache_directory_creation_failed(
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::CacheDirectoryCreationFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a cache serialization failed error
    pub fn cache_serialization_failed(
        table_key: impl Into<String>,
        source: serde_json::Error,
    ) -> Self {
        Self::CacheSerializationFailed {
            table_key: table_key.into(),
            source,
        }
    }

    /// Create a cache write failed error
    pub fn cache_write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CacheWriteFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a cache read failed error
    pub fn cache_read_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CacheReadFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a cache parse failed error
    pub fn cache_parse_failed(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::CacheParseFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a cache remove failed error
    pub fn cache_remove_failed(path: impl Into<PathBuf>, attempts: u32) -> Self {
        Self::CacheRemoveFailed {
            path: path.into(),
            attempts,
        }
    }

    /// Create a config parse failed error
    pub fn config_parse_failed(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::ConfigParseFailed {
            path: path.into(),
            source,
        }
    }
}
