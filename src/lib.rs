//! HUD Resilience - restart policy, parse-error classification and statistics
//! persistence for live poker table overlays.
//!
//! A host application builds one [`OverlaySupervisor`] (or the individual
//! components) and consults it on every overlay event:
//! - [`ErrorClassifier`] decides whether a parse failure is worth a retry or a
//!   read-position reset
//! - [`RestartEngine`] decides whether an overlay must be recreated or can be
//!   updated in place
//! - [`StatsCache`] keeps accumulated statistics across forced recreations
//!
//! # Public API
//! The main public interface is re-exported from the [`core`] module.

pub mod commands;
pub mod core;

// Re-export the core public API for external users
pub use crate::core::{
    CacheConfig,
    CacheEntry,
    CacheEntrySummary,
    ClassifierConfig,
    // Time
    Clock,
    // Restart policy
    DeclaredTableState,
    DeleteRetryConfig,
    DeleteRetryPolicy,
    // Error classification
    ErrorClassifier,
    ErrorSeverity,
    ErrorStatistics,
    FailureOutcome,
    // Error handling
    HudError,
    ManualClock,
    // Orchestration
    OverlaySupervisor,
    ParseError,
    PlayerStats,
    // Configuration
    ResilienceConfig,
    RestartConfig,
    RestartDecision,
    RestartEngine,
    RestartReason,
    RestartStatistics,
    Result,
    StatMap,
    // Stats persistence
    StatsCache,
    StatsSnapshot,
    SystemClock,
    TableState,
};
