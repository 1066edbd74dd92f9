//! Statistics snapshot data structures.
//!
//! This module defines what an overlay hands to the cache when it is torn down
//! and what the cache hands back when the overlay is recreated.
//!
//! # Public API
//! - [`StatsSnapshot`]: Point-in-time capture of one table's overlay statistics
//! - [`CacheEntry`]: A snapshot plus the time it was captured, as stored on disk
//! - [`PlayerStats`], [`StatMap`]: Per-player stat values
//!
//! # Persisted Format
//! One JSON document per table with the fields `table_key`, `timestamp`
//! (seconds since the epoch, floating point), `stat_dict`, `cards`,
//! `poker_game`, `game_type`, `max_seats`, `hud_params` and `last_hand_id`.
//! Missing fields read back as their empty value.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Stat name to value for one player.
pub type PlayerStats = BTreeMap<String, Value>;

/// Player id to that player's stats.
pub type StatMap = BTreeMap<String, PlayerStats>;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsSnapshot {
    pub table_key: String,
    #[serde(rename = "stat_dict")]
    pub player_stats: StatMap,
    pub cards: BTreeMap<String, Value>,
    #[serde(rename = "poker_game")]
    pub variant: String,
    #[serde(rename = "game_type")]
    pub category: String,
    pub max_seats: u32,
    pub hud_params: BTreeMap<String, Value>,
    #[serde(rename = "last_hand_id")]
    pub last_hand: String,
}

impl StatsSnapshot {
    pub fn new(table_key: impl Into<String>) -> Self {
        Self {
            table_key: table_key.into(),
            ..Default::default()
        }
    }

    pub fn with_player_stat(
        mut self,
        player_id: impl Into<String>,
        stat: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.player_stats
            .entry(player_id.into())
            .or_default()
            .insert(stat.into(), value.into());
        self
    }

    pub fn player_count(&self) -> usize {
        self.player_stats.len()
    }
}

/// On-disk representation: the snapshot fields plus `timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    #[serde(default)]
    pub timestamp: f64,
    #[serde(flatten)]
    pub snapshot: StatsSnapshot,
}

/// Whether a stat value looks like it has not been accumulated yet.
///
/// Null, numeric zero, `false`, and empty strings, arrays and objects count as zero.
pub fn is_zero_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}
