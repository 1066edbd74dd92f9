//! Output formatting for the maintenance CLI.
//!
//! # Design Principles
//! - **Consistent color scheme**: Red for errors and permanent failures, yellow
//!   for stale or transient, green for fresh
//! - **Standardized spacing**: Newline before and after every message block

use crate::core::error_classifier::ErrorSeverity;
use crate::core::stats_cache::CacheEntrySummary;
use colored::*;

/// Formats and prints an error message with consistent styling
///
/// # Format
/// ```text
///
/// ✕ Error: <message>
///
/// ```
pub fn print_error(message: &str) {
    println!("\n{} {}\n", "✕ Error:".red(), message.white());
}

/// Formats and prints a success message with consistent styling
pub fn print_success(message: &str) {
    println!("\n{} {}\n", "✓".green(), message.white());
}

/// Formats and prints an informational message with consistent styling
pub fn print_info(message: &str) {
    println!("\n{}\n", message.white());
}

/// Formats and prints a section header with consistent styling
pub fn print_section_header(header: &str) {
    println!("\n{}:\n", header.white());
}

pub fn severity_label(severity: ErrorSeverity) -> ColoredString {
    let label = severity.to_string();
    match severity {
        ErrorSeverity::Temporary => label.yellow(),
        ErrorSeverity::Recoverable => label.blue(),
        ErrorSeverity::Permanent => label.red(),
    }
}

/// One line of `list` output: `<table> <players> players, <age> [fresh|expired]`.
pub fn format_entry_line(entry: &CacheEntrySummary) -> String {
    let state = if entry.expired {
        "expired".yellow()
    } else {
        "fresh".green()
    };
    format!(
        "  {}  {} players, {}  [{}]",
        entry.table_key.white(),
        entry.player_count,
        format_age(entry.age_secs).bright_black(),
        state
    )
}

/// Human readable age, e.g. `42s`, `3m 05s`, `1h 02m`.
pub fn format_age(age_secs: f64) -> String {
    let secs = age_secs.max(0.0).floor() as u64;
    match secs {
        0..=59 => format!("{secs}s"),
        60..=3599 => format!("{}m {:02}s", secs / 60, secs % 60),
        _ => format!("{}h {:02}m", secs / 3600, (secs % 3600) / 60),
    }
}
