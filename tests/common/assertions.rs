//! Common assertion helpers for CLI output validation

#![allow(dead_code)]

use predicates::prelude::*;

/// Creates a predicate that checks for the shared error prefix
pub fn is_error() -> impl Predicate<str> {
    predicates::str::contains("Error:")
}

/// Creates a predicate that checks for a classified severity
pub fn has_severity(severity: &str) -> impl Predicate<str> {
    predicates::str::contains(format!("Severity: {severity}"))
}

/// Creates a predicate that checks for the missing-snapshot notice
pub fn no_cached_stats(table_key: &str) -> impl Predicate<str> {
    predicates::str::contains(format!("No cached stats for table {table_key}"))
}
