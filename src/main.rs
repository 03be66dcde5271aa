//! Geodata Catalog CLI application
//!
//! Command-line interface for cataloguing geodata extracts and selecting the
//! dataset covering a route.

use std::process;

use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use geodata_catalog::cli::{
    handle_bbox, handle_config, handle_ensure, handle_scan, handle_select, Cli, Commands,
};
use geodata_catalog::config::AppConfig;
use geodata_catalog::errors::Result;

#[tokio::main]
async fn main() {
    let result = run().await;

    if let Err(e) = result {
        error!(category = e.category(), recoverable = e.is_recoverable(), "{}", e);
        eprintln!("Error: {}", e);
        if e.is_recoverable() {
            eprintln!("This looks transient; retrying may succeed.");
        }
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    let cli = Cli::parse_args();

    // the configured level applies only when no verbosity flag is given
    let configured_level = AppConfig::load(cli.global.config.clone())
        .await
        .ok()
        .and_then(|config| config.logging.level.parse::<tracing::Level>().ok());
    init_logging(&cli, configured_level);

    info!("Geodata Catalog v{} starting", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Scan => handle_scan(&cli.global).await,
        Commands::Bbox(args) => handle_bbox(args).await,
        Commands::Select(args) => handle_select(&cli.global, args).await,
        Commands::Ensure(args) => handle_ensure(&cli.global, args).await,
        Commands::Config => handle_config(&cli.global).await,
    }
}

/// Initialize logging based on CLI verbosity settings
fn init_logging(cli: &Cli, configured_level: Option<tracing::Level>) {
    let flags_given = cli.global.quiet || cli.global.verbose || cli.global.very_verbose;
    let log_level = match configured_level {
        Some(level) if !flags_given => level,
        _ => cli.log_level(),
    };

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("geodata_catalog={}", log_level).parse() {
        filter = filter.add_directive(directive);
    }

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(cli.global.very_verbose)
        .init();

    if cli.global.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.global.verbose {
        info!("Verbose logging enabled");
    }
}
