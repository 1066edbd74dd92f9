use crate::core::{
    config::ResilienceConfig, error::Result, format_entry_line, print_info, print_section_header,
    StatsCache,
};

pub fn execute_list(config: &ResilienceConfig) -> Result<()> {
    let cache = StatsCache::new(&config.cache)?;
    let entries = cache.entries();

    if entries.is_empty() {
        print_info(&format!(
            "No cached HUD stats in {}",
            cache.directory().display()
        ));
        return Ok(());
    }

    print_section_header(&format!("Cached tables (ttl {}s)", cache.ttl().as_secs()));
    for entry in &entries {
        println!("{}", format_entry_line(entry));
    }
    println!();

    Ok(())
}
