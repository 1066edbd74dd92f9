use crate::core::{config::ResilienceConfig, error::Result, print_info, print_success, StatsCache};

pub fn execute_sweep(config: &ResilienceConfig) -> Result<()> {
    let cache = StatsCache::new(&config.cache)?;
    let removed = cache.sweep();

    if removed == 0 {
        print_info("No expired HUD stats to remove");
    } else {
        print_success(&format!("Removed {removed} expired HUD stats cache file(s)"));
    }
    Ok(())
}
