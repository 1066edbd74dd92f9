use clap::{Parser, Subcommand};
use hud_resilience::commands::*;
use hud_resilience::core::{error::Result, print_error, ResilienceConfig};
use std::env;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hud-resilience")]
#[command(about = "Maintain the HUD statistics cache and inspect restart policy decisions")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Stats cache directory (overrides the configuration file)
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Configuration file (defaults to config.json in the config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Remove expired and unreadable cache entries
    Sweep,
    /// List cached tables with their age
    List,
    /// Print the cached snapshot of a table
    Inspect {
        /// Table identity
        table: String,
    },
    /// Remove the cached snapshot of a table
    Remove {
        /// Table identity
        table: String,
    },
    /// Show how a parse error message would be classified
    Classify {
        /// Parser error message
        message: String,
        /// Hand text that failed to parse
        #[arg(long, default_value = "")]
        text: String,
    },
}

fn load_config(cli: &Cli) -> ResilienceConfig {
    let loaded = match &cli.config {
        Some(path) => ResilienceConfig::load_from(path),
        None => ResilienceConfig::load_or_create(),
    };

    let mut config = loaded.unwrap_or_else(|e| {
        log::warn!("Using default configuration: {e}");
        ResilienceConfig::default()
    });

    if let Some(dir) = &cli.cache_dir {
        config.cache.directory = Some(dir.clone());
    }
    config
}

fn run(cli: &Cli, config: &ResilienceConfig) -> Result<()> {
    match &cli.command {
        Commands::Sweep => execute_sweep(config),
        Commands::List => execute_list(config),
        Commands::Inspect { table } => execute_inspect(config, table),
        Commands::Remove { table } => execute_remove(config, table),
        Commands::Classify { message, text } => execute_classify(config, message, text),
    }
}

fn main() {
    let cli = Cli::parse();

    // Configure logging based on --debug flag
    if cli.debug {
        env::set_var("RUST_LOG", "debug");
    } else if env::var_os("RUST_LOG").is_none() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let config = load_config(&cli);

    if let Err(e) = run(&cli, &config) {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}
