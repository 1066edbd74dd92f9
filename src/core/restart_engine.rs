//! Overlay restart policy.
//!
//! Tearing an overlay down is expensive: window tracking has to start over and
//! the in-memory aggregates are lost. [`RestartEngine`] decides, per table and
//! per change event, whether the overlay really has to be recreated or whether
//! it can be updated in place.
//!
//! # Public API
//! - [`RestartEngine`]: should_restart / update_table_state / record_restart /
//!   has_title_changed / get_restart_statistics
//! - [`RestartReason`]: Why a restart is being considered
//! - [`DeclaredTableState`]: What the window tracker reports about a table
//! - [`TableState`]: What the engine remembers about a table
//! - [`RestartDecision`]: Verdict plus a human-readable justification
//!
//! # Table Lifecycle
//! A table is tracked from its first state update until a `TableClosed`
//! decision. There is no implicit expiry.
//!
//! # Decision Order
//! 1. `TableClosed` always restarts and forgets the table.
//! 2. A table updated or restarted less than the cooldown ago is never
//!    restarted.
//! 3. The remaining reasons are judged on their own terms.

use crate::core::clock::{secs_between, Clock, SystemClock};
use crate::core::config::RestartConfig;
use crate::core::title::normalize_title;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestartReason {
    TableClosed,
    GameTypeChange,
    MaxSeatsChange,
    SiteChange,
    /// Applied to a live overlay without a restart.
    ConfigurationChange,
    ErrorRecovery,
}

impl fmt::Display for RestartReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RestartReason::TableClosed => "table_closed",
            RestartReason::GameTypeChange => "game_type_change",
            RestartReason::MaxSeatsChange => "max_seats_change",
            RestartReason::SiteChange => "site_change",
            RestartReason::ConfigurationChange => "configuration_change",
            RestartReason::ErrorRecovery => "error_recovery",
        };
        write!(f, "{name}")
    }
}

/// Table properties as declared by the window tracker.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeclaredTableState {
    pub variant: String,
    pub category: String,
    pub max_seats: u32,
    pub site_name: String,
    pub window_title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableState {
    pub table_key: String,
    pub declared: DeclaredTableState,
    /// Last successful state update or recorded restart; drives the cooldown.
    pub last_update: Option<DateTime<Utc>>,
    /// Last recorded restart.
    pub last_restart: Option<DateTime<Utc>>,
    pub consecutive_errors: u32,
    pub restart_count: u32,
}

impl TableState {
    fn new(table_key: &str, declared: DeclaredTableState) -> Self {
        Self {
            table_key: table_key.to_string(),
            declared,
            last_update: None,
            last_restart: None,
            consecutive_errors: 0,
            restart_count: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestartDecision {
    pub restart: bool,
    pub justification: String,
}

impl RestartDecision {
    fn restart(justification: impl Into<String>) -> Self {
        Self {
            restart: true,
            justification: justification.into(),
        }
    }

    fn keep(justification: impl Into<String>) -> Self {
        Self {
            restart: false,
            justification: justification.into(),
        }
    }
}

impl fmt::Display for RestartDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.restart { "restart" } else { "keep" };
        write!(f, "{verdict}: {}", self.justification)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestartStatistics {
    pub restart_count: u32,
    pub error_count: u32,
    pub last_update: Option<DateTime<Utc>>,
    pub last_restart: Option<DateTime<Utc>>,
    /// Seconds since the last successful update.
    pub uptime_secs: Option<f64>,
}

pub struct RestartEngine {
    config: RestartConfig,
    clock: Arc<dyn Clock>,
    tables: HashMap<String, TableState>,
    titles: HashMap<String, String>,
}

impl RestartEngine {
    pub fn new(config: RestartConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: RestartConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            tables: HashMap::new(),
            titles: HashMap::new(),
        }
    }

    pub fn table_state(&self, table_key: &str) -> Option<&TableState> {
        self.tables.get(table_key)
    }

    pub fn is_tracked(&self, table_key: &str) -> bool {
        self.tables.contains_key(table_key)
    }

    pub fn should_restart(
        &mut self,
        table_key: &str,
        reason: RestartReason,
        current: Option<&DeclaredTableState>,
        next: Option<&DeclaredTableState>,
    ) -> RestartDecision {
        if reason == RestartReason::TableClosed {
            self.forget_table(table_key);
            return RestartDecision::restart("Table closed");
        }

        if self.in_cooldown(table_key) {
            log::debug!("Restart for {table_key} ({reason}) suppressed by cooldown");
            return RestartDecision::keep(format!(
                "Restart cooldown active ({}s)",
                self.config.cooldown_secs
            ));
        }

        match reason {
            RestartReason::ErrorRecovery => self.restart_for_error(table_key),
            RestartReason::GameTypeChange => {
                let Some((current, next)) = current.zip(next) else {
                    return RestartDecision::restart("Missing state information");
                };
                if current.variant != next.variant {
                    log::info!(
                        "Game type change detected for {table_key}: {} -> {}",
                        current.variant,
                        next.variant
                    );
                    RestartDecision::restart(format!(
                        "Game changed from {} to {}",
                        current.variant, next.variant
                    ))
                } else {
                    RestartDecision::keep("No game type change")
                }
            }
            RestartReason::MaxSeatsChange => {
                let Some((current, next)) = current.zip(next) else {
                    return RestartDecision::restart("Missing state information");
                };
                self.restart_for_seats_change(table_key, current.max_seats, next.max_seats)
            }
            RestartReason::SiteChange => {
                let Some((current, next)) = current.zip(next) else {
                    return RestartDecision::restart("Missing state information");
                };
                if current.site_name != next.site_name {
                    log::info!(
                        "Site change detected for {table_key}: {} -> {}",
                        current.site_name,
                        next.site_name
                    );
                    RestartDecision::restart(format!(
                        "Site changed from {} to {}",
                        current.site_name, next.site_name
                    ))
                } else {
                    RestartDecision::keep("No site change")
                }
            }
            RestartReason::ConfigurationChange => {
                RestartDecision::keep("Configuration changes handled dynamically")
            }
            RestartReason::TableClosed => RestartDecision::restart("Table closed"),
        }
    }

    fn in_cooldown(&self, table_key: &str) -> bool {
        let Some(last_update) = self.tables.get(table_key).and_then(|s| s.last_update) else {
            return false;
        };
        secs_between(last_update, self.clock.now()) < self.config.cooldown_secs as f64
    }

    fn restart_for_error(&mut self, table_key: &str) -> RestartDecision {
        let max_errors = self.config.max_consecutive_errors;
        let Some(state) = self.tables.get_mut(table_key) else {
            return RestartDecision::restart("No table state found, restart needed");
        };

        state.consecutive_errors += 1;

        if state.consecutive_errors >= max_errors {
            log::warn!(
                "Too many errors ({}) for table {table_key}, forcing restart",
                state.consecutive_errors
            );
            return RestartDecision::restart(format!(
                "Error count exceeded threshold ({max_errors})"
            ));
        }

        RestartDecision::keep(format!(
            "Error recorded ({}/{max_errors}), no restart yet",
            state.consecutive_errors
        ))
    }

    fn restart_for_seats_change(
        &self,
        table_key: &str,
        current_seats: u32,
        next_seats: u32,
    ) -> RestartDecision {
        if current_seats == next_seats {
            return RestartDecision::keep("No seats change");
        }

        if current_seats.abs_diff(next_seats) > self.config.seat_change_threshold {
            log::info!("Significant seat change for {table_key}: {current_seats} -> {next_seats}");
            RestartDecision::restart(format!(
                "Seats changed significantly: {current_seats} -> {next_seats}"
            ))
        } else {
            log::debug!(
                "Minor seat change for {table_key}: {current_seats} -> {next_seats}, no restart"
            );
            RestartDecision::keep(format!(
                "Minor seat change ({current_seats} -> {next_seats})"
            ))
        }
    }

    /// Record a successful observation of `table_key`.
    ///
    /// Starts tracking an unknown table, restarts the cooldown and clears the
    /// consecutive error count.
    pub fn update_table_state(&mut self, table_key: &str, declared: &DeclaredTableState) {
        let now = self.clock.now();
        let state = self
            .tables
            .entry(table_key.to_string())
            .or_insert_with(|| TableState::new(table_key, declared.clone()));

        state.declared = declared.clone();
        state.last_update = Some(now);
        state.consecutive_errors = 0;
    }

    /// Count a restart and start a new cooldown for the table.
    pub fn record_restart(&mut self, table_key: &str, reason: RestartReason) {
        let now = self.clock.now();
        match self.tables.get_mut(table_key) {
            Some(state) => {
                state.restart_count += 1;
                state.last_update = Some(now);
                state.last_restart = Some(now);
                log::info!(
                    "HUD restart recorded for {table_key}: {reason} (restart #{})",
                    state.restart_count
                );
            }
            None => log::debug!("Ignoring restart for untracked table {table_key}"),
        }
    }

    /// Whether the window title changed beyond blinds and player counts.
    ///
    /// The first title seen for a table is remembered and reported as unchanged.
    /// A changed title becomes the new reference.
    pub fn has_title_changed(&mut self, table_key: &str, new_title: &str) -> bool {
        let Some(old_title) = self.titles.get(table_key) else {
            self.titles
                .insert(table_key.to_string(), new_title.to_string());
            return false;
        };

        if normalize_title(old_title) == normalize_title(new_title) {
            return false;
        }

        log::info!("Significant title change for {table_key}: '{old_title}' -> '{new_title}'");
        self.titles
            .insert(table_key.to_string(), new_title.to_string());
        true
    }

    pub fn get_restart_statistics(&self) -> BTreeMap<String, RestartStatistics> {
        let now = self.clock.now();
        self.tables
            .iter()
            .map(|(table_key, state)| {
                let stats = RestartStatistics {
                    restart_count: state.restart_count,
                    error_count: state.consecutive_errors,
                    last_update: state.last_update,
                    last_restart: state.last_restart,
                    uptime_secs: state.last_update.map(|at| secs_between(at, now)),
                };
                (table_key.clone(), stats)
            })
            .collect()
    }

    fn forget_table(&mut self, table_key: &str) {
        let had_state = self.tables.remove(table_key).is_some();
        self.titles.remove(table_key);
        if had_state {
            log::debug!("Cleaned up state for table {table_key}");
        }
    }
}
