use crate::core::error::HudError;
use std::path::PathBuf;

const APP_DIR: &str = "hud-resilience";
const STATS_CACHE_DIR: &str = "hud_stats_cache";

pub fn get_config_directory() -> Result<PathBuf, HudError> {
    let base = match std::env::consts::OS {
        "linux" | "freebsd" | "netbsd" | "openbsd" => std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .ok()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config"))),
        "macos" => dirs::home_dir().map(|home| home.join("Library/Application Support")),
        _ => dirs::config_dir(),
    };

    base.map(|dir| dir.join(APP_DIR))
        .ok_or(HudError::ConfigDirectoryNotFound)
}

pub fn get_cache_directory() -> Result<PathBuf, HudError> {
    let base = match std::env::consts::OS {
        "linux" | "freebsd" | "netbsd" | "openbsd" => std::env::var("XDG_CACHE_HOME")
            .map(PathBuf::from)
            .ok()
            .or_else(|| dirs::home_dir().map(|home| home.join(".cache"))),
        "macos" => dirs::home_dir().map(|home| home.join("Library/Caches")),
        _ => dirs::cache_dir(),
    };

    // No home directory: keep the cache in the temp dir.
    let base = base.unwrap_or_else(std::env::temp_dir);
    Ok(base.join(APP_DIR))
}

/// Default location of the per-table stats snapshots.
pub fn get_stats_cache_directory() -> Result<PathBuf, HudError> {
    Ok(get_cache_directory()?.join(STATS_CACHE_DIR))
}
