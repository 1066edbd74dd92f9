//! Test environment setup and sample data

#![allow(dead_code)]

use hud_resilience::{
    CacheConfig, DeclaredTableState, ManualClock, ResilienceConfig, StatsCache, StatsSnapshot,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Whole-second start time so float timestamps compare exactly.
pub const START_SECS: i64 = 1_700_000_000;

/// Temporary cache directory plus a clock shared with everything built from it.
/// The TempDir must be kept alive for the duration of the test.
pub struct TestEnv {
    pub temp_dir: TempDir,
    pub cache_dir: PathBuf,
    pub clock: ManualClock,
}

impl TestEnv {
    pub fn new() -> anyhow::Result<Self> {
        let temp_dir = TempDir::new()?;
        let cache_dir = temp_dir.path().join("hud_stats_cache");
        Ok(Self {
            temp_dir,
            cache_dir,
            clock: ManualClock::at_epoch_secs(START_SECS),
        })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn config(&self) -> ResilienceConfig {
        let mut config = ResilienceConfig::default();
        config.cache.directory = Some(self.cache_dir.clone());
        config
    }

    pub fn cache_with_ttl(&self, ttl_secs: u64) -> anyhow::Result<StatsCache> {
        let config = CacheConfig {
            ttl_secs,
            directory: Some(self.cache_dir.clone()),
            ..Default::default()
        };
        Ok(StatsCache::with_clock(&config, Arc::new(self.clock.clone()))?)
    }
}

pub fn declared(variant: &str, max_seats: u32) -> DeclaredTableState {
    DeclaredTableState {
        variant: variant.to_string(),
        category: "ring".to_string(),
        max_seats,
        site_name: "PokerStars".to_string(),
        window_title: "Altair - $1/$2 (6 players)".to_string(),
    }
}

/// Snapshot of a six-max table three players into a session.
pub fn six_max_snapshot(table_key: &str) -> StatsSnapshot {
    StatsSnapshot {
        variant: "holdem".to_string(),
        category: "ring".to_string(),
        max_seats: 6,
        last_hand: "254001".to_string(),
        ..StatsSnapshot::new(table_key)
    }
    .with_player_stat("alice", "vpip", 24)
    .with_player_stat("alice", "pfr", 18)
    .with_player_stat("alice", "n", 140)
    .with_player_stat("bob", "vpip", 41)
    .with_player_stat("bob", "n", 96)
    .with_player_stat("carol", "vpip", 0)
}
