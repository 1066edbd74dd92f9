//! Table window title normalization.
//!
//! Poker clients rewrite the window title as the game moves on: blind levels
//! go up, player counts change. Those edits do not mean the window now shows a
//! different table, so they are stripped before titles are compared.

use regex::Regex;
use std::sync::OnceLock;

struct TitlePatterns {
    blinds: Regex,
    player_count: Regex,
    bare_count: Regex,
}

fn patterns() -> &'static TitlePatterns {
    static PATTERNS: OnceLock<TitlePatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| TitlePatterns {
        blinds: Regex::new(r"\d+/\d+").expect("blinds pattern is valid"),
        player_count: Regex::new(r"\(\d+\s+players?\)").expect("player count pattern is valid"),
        bare_count: Regex::new(r"\(\d+\)").expect("bare count pattern is valid"),
    })
}

/// Strip blind levels and player counts, then trim and lowercase.
pub fn normalize_title(title: &str) -> String {
    let patterns = patterns();
    let without_blinds = patterns.blinds.replace_all(title, "");
    let without_players = patterns.player_count.replace_all(&without_blinds, "");
    let without_counts = patterns.bare_count.replace_all(&without_players, "");
    without_counts.trim().to_lowercase()
}
