//! Classification of hand-history parse failures.
//!
//! The importer feeding the overlay does not need a stack trace when parsing
//! fails. It needs a policy: retry, roll the read position back, or give up.
//! [`ErrorClassifier`] answers that from the error message, the text that failed
//! to parse and the recent error history of the same source file.
//!
//! # Public API
//! - [`ErrorSeverity`]: Temporary, Recoverable or Permanent
//! - [`ParseError`]: One recorded failure
//! - [`ErrorClassifier`]: classify / record / reset-or-retry decisions
//! - [`ErrorStatistics`]: Per-severity counts for one source
//!
//! # Escalation
//! A single Recoverable error never resets the read position, but enough of
//! them inside the escalation window are treated as if the source were
//! permanently broken.

use crate::core::clock::{Clock, SystemClock};
use crate::core::config::ClassifierConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

const PERMANENT_PATTERNS: &[&str] = &[
    "invalid format",
    "corrupted",
    "malformed",
    "syntax error",
    "unexpected end",
];

const TEMPORARY_PATTERNS: &[&str] = &[
    "connection",
    "timeout",
    "network",
    "temporary",
    "lock",
    "busy",
];

/// Markers every complete hand history carries somewhere.
const HAND_MARKERS: &[&str] = &["hand #", "seat ", "dealt to"];

/// Shorter source text is taken to be a partially written hand.
const MIN_HAND_LENGTH: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Retry possible, keep the read position.
    Temporary,
    /// Probably an incomplete hand; keep the position unless it keeps happening.
    Recoverable,
    /// The input is broken; the read position must be reset.
    Permanent,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Temporary => write!(f, "temporary"),
            ErrorSeverity::Recoverable => write!(f, "recoverable"),
            ErrorSeverity::Permanent => write!(f, "permanent"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseError {
    pub kind: String,
    pub message: String,
    pub severity: ErrorSeverity,
    /// Truncated copy of the text that failed to parse.
    pub source_text: String,
    pub timestamp: DateTime<Utc>,
    pub retry_count: u32,
}

impl ParseError {
    /// Note another attempt at the same input. Returns the new count.
    pub fn register_retry(&mut self) -> u32 {
        self.retry_count += 1;
        self.retry_count
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ErrorStatistics {
    pub temporary: usize,
    pub recoverable: usize,
    pub permanent: usize,
}

impl ErrorStatistics {
    pub fn total(&self) -> usize {
        self.temporary + self.recoverable + self.permanent
    }
}

pub struct ErrorClassifier {
    config: ClassifierConfig,
    clock: Arc<dyn Clock>,
    history: HashMap<String, Vec<ParseError>>,
}

impl ErrorClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: ClassifierConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            history: HashMap::new(),
        }
    }

    /// Classify a failure from its message and the text that failed.
    ///
    /// Message keywords are checked first, permanent before temporary. Anything
    /// else is Recoverable.
    pub fn classify(message: &str, source_text: &str) -> ErrorSeverity {
        let message = message.to_lowercase();

        if PERMANENT_PATTERNS.iter().any(|p| message.contains(p)) {
            return ErrorSeverity::Permanent;
        }

        if TEMPORARY_PATTERNS.iter().any(|p| message.contains(p)) {
            return ErrorSeverity::Temporary;
        }

        if looks_like_partial_hand(source_text) {
            return ErrorSeverity::Recoverable;
        }

        // Unrecognised failure on a complete-looking hand.
        ErrorSeverity::Recoverable
    }

    /// Classify and remember a failure for `source_id`.
    ///
    /// Entries older than the retention period are dropped on every call.
    pub fn record_error(
        &mut self,
        source_id: &str,
        kind: &str,
        message: &str,
        source_text: &str,
    ) -> ParseError {
        let severity = Self::classify(message, source_text);
        let now = self.clock.now();

        let error = ParseError {
            kind: kind.to_string(),
            message: message.to_string(),
            severity,
            source_text: source_text
                .chars()
                .take(self.config.source_text_limit)
                .collect(),
            timestamp: now,
            retry_count: 0,
        };

        let retention = seconds(self.config.history_retention_secs);
        let errors = self.history.entry(source_id.to_string()).or_default();
        errors.push(error.clone());
        errors.retain(|e| now - e.timestamp < retention);

        log::debug!("Recorded {severity} error for {source_id}: {message}");
        error
    }

    /// Whether the importer should rewind `source_id` after `error`.
    pub fn should_reset_position(&self, source_id: &str, error: &ParseError) -> bool {
        match error.severity {
            ErrorSeverity::Permanent => {
                log::info!("Permanent error detected for {source_id}, resetting read position");
                true
            }
            ErrorSeverity::Temporary => {
                log::debug!("Temporary error for {source_id}, keeping read position");
                false
            }
            ErrorSeverity::Recoverable => {
                let recent = self.recent_error_count(source_id);
                if recent >= self.config.escalation_threshold {
                    log::warn!(
                        "Too many recent errors for {source_id} ({recent}), treating as permanent"
                    );
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn should_retry(&self, source_id: &str, error: &ParseError) -> bool {
        if error.severity == ErrorSeverity::Permanent {
            return false;
        }

        if error.retry_count >= self.config.max_retries {
            log::warn!("Max retries reached for {source_id}");
            return false;
        }

        true
    }

    pub fn statistics(&self, source_id: &str) -> ErrorStatistics {
        let mut stats = ErrorStatistics::default();
        for error in self.history.get(source_id).into_iter().flatten() {
            match error.severity {
                ErrorSeverity::Temporary => stats.temporary += 1,
                ErrorSeverity::Recoverable => stats.recoverable += 1,
                ErrorSeverity::Permanent => stats.permanent += 1,
            }
        }
        stats
    }

    /// Drop the history of a source that finished processing cleanly.
    pub fn forget(&mut self, source_id: &str) {
        if self.history.remove(source_id).is_some() {
            log::debug!("Cleaned up error history for {source_id}");
        }
    }

    /// Errors of any severity recorded for `source_id` inside the escalation window.
    pub fn recent_error_count(&self, source_id: &str) -> usize {
        let now = self.clock.now();
        let window = seconds(self.config.escalation_window_secs);
        self.history
            .get(source_id)
            .map_or(0, |errors| {
                errors.iter().filter(|e| now - e.timestamp < window).count()
            })
    }
}

/// Too short, or missing every marker a complete hand carries.
fn looks_like_partial_hand(source_text: &str) -> bool {
    if source_text.trim().chars().count() < MIN_HAND_LENGTH {
        return true;
    }

    let text = source_text.to_lowercase();
    !HAND_MARKERS.iter().any(|marker| text.contains(marker))
}

fn seconds(secs: u64) -> chrono::Duration {
    chrono::Duration::seconds(secs.min(u64::from(u32::MAX)) as i64)
}
