//! Consolidated test utilities for hud-resilience
//!
//! Integration tests run against real cache directories inside temporary
//! folders and a manual clock, so TTL and cooldown behavior is deterministic.

pub mod assertions;
pub mod fixtures;
