use crate::core::{
    config::ResilienceConfig,
    error::{HudError, Result},
    print_success, StatsCache,
};

pub fn execute_remove(config: &ResilienceConfig, table_key: &str) -> Result<()> {
    let cache = StatsCache::new(&config.cache)?;

    if !cache.remove(table_key) {
        return Err(HudError::cache_remove_failed(
            cache.cache_file_path(table_key),
            config.cache.delete_retry.attempts,
        ));
    }

    print_success(&format!("Removed cached stats for table {table_key}"));
    Ok(())
}
