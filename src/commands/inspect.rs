use crate::core::{config::ResilienceConfig, error::Result, print_info, StatsCache};

/// Print the cached snapshot for `table_key` as JSON.
///
/// Goes through [`StatsCache::load`], so an expired entry is reported as
/// missing and removed.
pub fn execute_inspect(config: &ResilienceConfig, table_key: &str) -> Result<()> {
    let cache = StatsCache::new(&config.cache)?;

    match cache.load(table_key) {
        Some(snapshot) => {
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        None => print_info(&format!("No cached stats for table {table_key}")),
    }

    Ok(())
}
