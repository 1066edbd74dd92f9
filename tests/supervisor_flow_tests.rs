use hud_resilience::{OverlaySupervisor, RestartReason, StatsSnapshot};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

mod common;
use common::fixtures::*;

#[cfg(test)]
mod supervisor_flow_tests {
    use super::*;

    #[test]
    fn test_forced_restart_keeps_accumulated_stats() -> anyhow::Result<()> {
        let env = TestEnv::new()?;
        let mut supervisor = OverlaySupervisor::with_clock(&env.config(), Arc::new(env.clock.clone()))?;
        let table = "PokerStars-Altair-254";
        supervisor.observe(table, &declared("holdem", 6));

        // Hands keep arriving; the overlay lives on.
        env.clock.advance(Duration::from_secs(120));
        supervisor.observe(table, &declared("holdem", 6));

        // The tracker now reports a nine-max table.
        env.clock.advance(Duration::from_secs(45));
        let decision = supervisor.table_changed(
            table,
            RestartReason::MaxSeatsChange,
            Some(&declared("holdem", 6)),
            Some(&declared("holdem", 9)),
        );
        assert!(decision.restart, "{decision}");

        assert!(supervisor.teardown(table, &six_max_snapshot(table), RestartReason::MaxSeatsChange));

        let fresh = StatsSnapshot {
            max_seats: 9,
            ..StatsSnapshot::new(table)
        }
        .with_player_stat("alice", "vpip", 0)
        .with_player_stat("alice", "n", 1)
        .with_player_stat("frank", "vpip", 100);
        let restored = supervisor.recreate(table, fresh);

        assert_eq!(restored.max_seats, 9);
        assert_eq!(restored.player_stats["alice"]["vpip"], json!(24));
        assert_eq!(restored.player_stats["alice"]["n"], json!(1));
        assert_eq!(restored.player_stats["bob"]["n"], json!(96));
        assert_eq!(restored.player_stats["frank"]["vpip"], json!(100));

        let stats = supervisor.engine().get_restart_statistics();
        assert_eq!(stats[table].restart_count, 1);
        Ok(())
    }

    #[test]
    fn test_failing_table_does_not_restart_again_during_cooldown() -> anyhow::Result<()> {
        let env = TestEnv::new()?;
        let mut supervisor = OverlaySupervisor::with_clock(&env.config(), Arc::new(env.clock.clone()))?;
        supervisor.observe("T1", &declared("holdem", 6));
        env.clock.advance(Duration::from_secs(40));

        let mut restarts = Vec::new();
        for _ in 0..5 {
            let outcome = supervisor.parse_failed("T1", "t1.txt", "partial", "bad hand", "Seat 1");
            restarts.push(outcome.restart.map(|d| d.restart));
        }
        assert_eq!(restarts.last(), Some(&Some(true)));
        assert!(supervisor.teardown("T1", &six_max_snapshot("T1"), RestartReason::ErrorRecovery));

        let outcome = supervisor.parse_failed("T1", "t1.txt", "partial", "bad hand", "Seat 1");
        let decision = outcome.restart.expect("recoverable errors are counted");
        assert!(!decision.restart);
        assert!(decision.justification.contains("cooldown"));
        Ok(())
    }

    #[test]
    fn test_stale_snapshot_is_not_restored() -> anyhow::Result<()> {
        let env = TestEnv::new()?;
        let mut supervisor = OverlaySupervisor::with_clock(&env.config(), Arc::new(env.clock.clone()))?;
        assert!(supervisor.teardown("T1", &six_max_snapshot("T1"), RestartReason::ErrorRecovery));

        env.clock.advance(Duration::from_secs(1800));
        let fresh = StatsSnapshot::new("T1");
        assert_eq!(supervisor.recreate("T1", fresh.clone()), fresh);
        assert!(!env.cache_dir().join("T1.json").exists());
        Ok(())
    }
}
