//! Single owner of the three resilience components.
//!
//! The host application builds one [`OverlaySupervisor`] and routes every
//! overlay event through it: parsed hands, parse failures, table changes,
//! teardowns and recreations. Nothing here is global, so tests simply build a
//! fresh supervisor.
//!
//! All methods take `&mut self`. A multi-threaded host must wrap the
//! supervisor in a lock or give it to a single owning task.

use crate::core::clock::{Clock, SystemClock};
use crate::core::config::ResilienceConfig;
use crate::core::error::Result;
use crate::core::error_classifier::{ErrorClassifier, ErrorSeverity, ParseError};
use crate::core::restart_engine::{
    DeclaredTableState, RestartDecision, RestartEngine, RestartReason,
};
use crate::core::snapshot::StatsSnapshot;
use crate::core::stats_cache::StatsCache;
use std::sync::Arc;

/// What the importer and the overlay should do after a parse failure.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureOutcome {
    pub error: ParseError,
    pub reset_position: bool,
    pub retry: bool,
    /// Present when the failure was counted against the table.
    pub restart: Option<RestartDecision>,
}

pub struct OverlaySupervisor {
    cache: StatsCache,
    classifier: ErrorClassifier,
    engine: RestartEngine,
}

impl OverlaySupervisor {
    pub fn new(config: &ResilienceConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &ResilienceConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        Ok(Self {
            cache: StatsCache::with_clock(&config.cache, Arc::clone(&clock))?,
            classifier: ErrorClassifier::with_clock(config.classifier.clone(), Arc::clone(&clock)),
            engine: RestartEngine::with_clock(config.restart.clone(), clock),
        })
    }

    pub fn cache(&self) -> &StatsCache {
        &self.cache
    }

    pub fn classifier(&self) -> &ErrorClassifier {
        &self.classifier
    }

    pub fn engine(&self) -> &RestartEngine {
        &self.engine
    }

    /// A hand for `table_key` was parsed and the tracker reported `declared`.
    pub fn observe(&mut self, table_key: &str, declared: &DeclaredTableState) {
        if self.engine.has_title_changed(table_key, &declared.window_title) {
            log::info!("Window title for {table_key} suggests a new session");
        }
        self.engine.update_table_state(table_key, declared);
    }

    /// Parsing `source_text` from `source_id` failed while feeding `table_key`.
    ///
    /// Temporary failures are not held against the table. Other failures on a
    /// table that was never observed call for a restart straight away.
    pub fn parse_failed(
        &mut self,
        table_key: &str,
        source_id: &str,
        kind: &str,
        message: &str,
        source_text: &str,
    ) -> FailureOutcome {
        let error = self
            .classifier
            .record_error(source_id, kind, message, source_text);
        let reset_position = self.classifier.should_reset_position(source_id, &error);
        let retry = self.classifier.should_retry(source_id, &error);

        let restart = (error.severity != ErrorSeverity::Temporary).then(|| {
            self.engine
                .should_restart(table_key, RestartReason::ErrorRecovery, None, None)
        });

        FailureOutcome {
            error,
            reset_position,
            retry,
            restart,
        }
    }

    /// The tracker reported a change for `table_key`.
    pub fn table_changed(
        &mut self,
        table_key: &str,
        reason: RestartReason,
        current: Option<&DeclaredTableState>,
        next: Option<&DeclaredTableState>,
    ) -> RestartDecision {
        if let Some(next) = next {
            if self.engine.has_title_changed(table_key, &next.window_title) {
                log::info!("Window title for {table_key} changed alongside {reason}");
            }
        }

        let decision = self.engine.should_restart(table_key, reason, current, next);
        log::debug!("Decision for {table_key} ({reason}): {decision}");
        decision
    }

    /// The overlay for `table_key` is about to be destroyed; keep its stats.
    pub fn teardown(
        &mut self,
        table_key: &str,
        snapshot: &StatsSnapshot,
        reason: RestartReason,
    ) -> bool {
        let saved = self.cache.save(table_key, snapshot);
        self.engine.record_restart(table_key, reason);
        saved
    }

    /// The overlay for `table_key` was recreated with `fresh` stats.
    ///
    /// Any cached snapshot is merged in and then dropped from the cache.
    pub fn recreate(&mut self, table_key: &str, fresh: StatsSnapshot) -> StatsSnapshot {
        match self.cache.load(table_key) {
            Some(cached) => {
                let merged = StatsCache::merge(&cached, &fresh);
                self.cache.remove(table_key);
                log::info!(
                    "Restored cached stats for {table_key} ({} players)",
                    merged.player_count()
                );
                merged
            }
            None => fresh,
        }
    }

    /// The table window is gone for good.
    pub fn close(&mut self, table_key: &str) -> RestartDecision {
        let decision = self
            .engine
            .should_restart(table_key, RestartReason::TableClosed, None, None);
        self.cache.remove(table_key);
        decision
    }

    /// `source_id` was processed to the end without further errors.
    pub fn source_finished(&mut self, source_id: &str) {
        self.classifier.forget(source_id);
    }

    /// Periodic maintenance hook for the host's scheduler.
    pub fn sweep(&self) -> usize {
        self.cache.sweep()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use serde_json::json;
    use std::time::Duration;
    use tempfile::TempDir;

    fn setup_supervisor() -> anyhow::Result<(TempDir, OverlaySupervisor, ManualClock)> {
        let temp_dir = TempDir::new()?;
        let clock = ManualClock::at_epoch_secs(1_700_000_000);
        let mut config = ResilienceConfig::default();
        config.cache.directory = Some(temp_dir.path().to_path_buf());
        let supervisor = OverlaySupervisor::with_clock(&config, Arc::new(clock.clone()))?;
        Ok((temp_dir, supervisor, clock))
    }

    fn declared(max_seats: u32) -> DeclaredTableState {
        DeclaredTableState {
            variant: "holdem".to_string(),
            category: "ring".to_string(),
            max_seats,
            site_name: "PokerStars".to_string(),
            window_title: "Altair - 1/2".to_string(),
        }
    }

    #[test]
    fn test_teardown_and_recreate_restores_history() -> anyhow::Result<()> {
        let (_temp_dir, mut supervisor, clock) = setup_supervisor()?;
        supervisor.observe("T1", &declared(6));

        let live = StatsSnapshot::new("T1")
            .with_player_stat("p1", "vpip", 22)
            .with_player_stat("p2", "vpip", 40);
        clock.advance(Duration::from_secs(60));
        assert!(supervisor.teardown("T1", &live, RestartReason::MaxSeatsChange));
        assert_eq!(supervisor.engine().table_state("T1").unwrap().restart_count, 1);

        let fresh = StatsSnapshot::new("T1").with_player_stat("p1", "vpip", 0);
        let restored = supervisor.recreate("T1", fresh);
        assert_eq!(restored.player_stats["p1"]["vpip"], json!(22));
        assert_eq!(restored.player_stats["p2"]["vpip"], json!(40));

        // The snapshot is consumed by the first recreation.
        let again = supervisor.recreate("T1", StatsSnapshot::new("T1"));
        assert!(again.player_stats.is_empty());
        Ok(())
    }

    #[test]
    fn test_recreate_without_cache_returns_fresh() -> anyhow::Result<()> {
        let (_temp_dir, mut supervisor, _clock) = setup_supervisor()?;
        let fresh = StatsSnapshot::new("T1").with_player_stat("p1", "vpip", 5);
        assert_eq!(supervisor.recreate("T1", fresh.clone()), fresh);
        Ok(())
    }

    #[test]
    fn test_temporary_failures_do_not_count_against_table() -> anyhow::Result<()> {
        let (_temp_dir, mut supervisor, _clock) = setup_supervisor()?;

        let outcome = supervisor.parse_failed("T1", "a.txt", "error", "database busy", "Hand #1");
        assert_eq!(outcome.error.severity, ErrorSeverity::Temporary);
        assert!(!outcome.reset_position);
        assert!(outcome.retry);
        assert_eq!(outcome.restart, None);
        assert!(!supervisor.engine().is_tracked("T1"));
        Ok(())
    }

    #[test]
    fn test_repeated_failures_escalate_to_restart() -> anyhow::Result<()> {
        let (_temp_dir, mut supervisor, clock) = setup_supervisor()?;
        supervisor.observe("T1", &declared(6));
        clock.advance(Duration::from_secs(31));

        for _ in 0..4 {
            let outcome = supervisor.parse_failed("T1", "a.txt", "partial", "bad hand", "Seat 1");
            assert!(!outcome.reset_position);
            assert!(!outcome.restart.unwrap().restart);
        }

        let outcome = supervisor.parse_failed("T1", "a.txt", "partial", "bad hand", "Seat 1");
        assert!(outcome.reset_position);
        assert!(outcome.restart.unwrap().restart);
        assert_eq!(supervisor.classifier().statistics("a.txt").recoverable, 5);

        supervisor.source_finished("a.txt");
        assert_eq!(supervisor.classifier().statistics("a.txt").total(), 0);
        Ok(())
    }

    #[test]
    fn test_failure_on_unobserved_table_restarts() -> anyhow::Result<()> {
        let (_temp_dir, mut supervisor, _clock) = setup_supervisor()?;
        let outcome = supervisor.parse_failed("T9", "b.txt", "partial", "bad hand", "Seat 1");
        let decision = outcome.restart.unwrap();
        assert!(decision.restart);
        assert_eq!(decision.justification, "No table state found, restart needed");
        Ok(())
    }

    #[test]
    fn test_permanent_failure_resets_position() -> anyhow::Result<()> {
        let (_temp_dir, mut supervisor, _clock) = setup_supervisor()?;
        let outcome =
            supervisor.parse_failed("T1", "a.txt", "error", "Invalid format detected", "garbage");
        assert!(outcome.reset_position);
        assert!(!outcome.retry);
        Ok(())
    }

    #[test]
    fn test_table_changed_respects_cooldown() -> anyhow::Result<()> {
        let (_temp_dir, mut supervisor, clock) = setup_supervisor()?;
        supervisor.observe("T1", &declared(6));

        let decision = supervisor.table_changed(
            "T1",
            RestartReason::MaxSeatsChange,
            Some(&declared(6)),
            Some(&declared(10)),
        );
        assert!(!decision.restart);

        clock.advance(Duration::from_secs(31));
        let decision = supervisor.table_changed(
            "T1",
            RestartReason::MaxSeatsChange,
            Some(&declared(6)),
            Some(&declared(10)),
        );
        assert!(decision.restart);
        Ok(())
    }

    #[test]
    fn test_close_forgets_table_and_cache() -> anyhow::Result<()> {
        let (_temp_dir, mut supervisor, _clock) = setup_supervisor()?;
        supervisor.observe("T1", &declared(6));
        let live = StatsSnapshot::new("T1").with_player_stat("p1", "vpip", 22);
        assert!(supervisor.teardown("T1", &live, RestartReason::ErrorRecovery));

        let decision = supervisor.close("T1");
        assert!(decision.restart);
        assert!(!supervisor.engine().is_tracked("T1"));
        assert!(!supervisor.cache().cache_file_path("T1").exists());
        Ok(())
    }

    #[test]
    fn test_sweep_delegates_to_cache() -> anyhow::Result<()> {
        let (_temp_dir, mut supervisor, clock) = setup_supervisor()?;
        let live = StatsSnapshot::new("T1").with_player_stat("p1", "vpip", 22);
        assert!(supervisor.teardown("T1", &live, RestartReason::ErrorRecovery));

        assert_eq!(supervisor.sweep(), 0);
        clock.advance(Duration::from_secs(1800));
        assert_eq!(supervisor.sweep(), 1);
        Ok(())
    }
}
