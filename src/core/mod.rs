//! Core functionality for hud-resilience.
//!
//! This module provides the three resilience components (stats cache, error
//! classifier, restart engine), the supervisor that owns them, and the
//! configuration, error and output plumbing they share.

pub mod clock;
pub mod config;
pub mod dirs;
pub mod error;
pub mod error_classifier;
pub mod output;
pub mod restart_engine;
pub mod snapshot;
pub mod stats_cache;
pub mod supervisor;
pub mod title;

// === Error handling ===
pub use error::{HudError, Result};

// === Time ===
// Injectable time source so TTL and cooldown rules can be tested
pub use clock::{Clock, ManualClock, SystemClock};

// === Configuration ===
pub use config::{CacheConfig, ClassifierConfig, DeleteRetryConfig, ResilienceConfig, RestartConfig};

// === Stats persistence ===
pub use snapshot::{CacheEntry, PlayerStats, StatMap, StatsSnapshot};
pub use stats_cache::{CacheEntrySummary, DeleteRetryPolicy, StatsCache};

// === Parse error classification ===
pub use error_classifier::{ErrorClassifier, ErrorSeverity, ErrorStatistics, ParseError};

// === Restart policy ===
pub use restart_engine::{
    DeclaredTableState, RestartDecision, RestartEngine, RestartReason, RestartStatistics,
    TableState,
};
pub use title::normalize_title;

// === Orchestration ===
pub use supervisor::{FailureOutcome, OverlaySupervisor};

// === Output formatting ===
pub use output::{
    format_age, format_entry_line, print_error, print_info, print_section_header, print_success,
    severity_label,
};
