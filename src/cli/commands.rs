//! Command handlers for the geodata catalog CLI
//!
//! This module implements the command handlers that coordinate between CLI
//! arguments, the loaded configuration and the core catalog functionality.

use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::app::{
    ensure_available, extract_bounding_box_from_file, BoundingBox, Catalog, CatalogConfig,
    CoverageSelector, DatasetDescriptor, FetchConfig, HttpOrchestrator,
};
use crate::cli::{BboxArgs, GlobalArgs, RouteArgs};
use crate::config::AppConfig;
use crate::errors::{AppError, Result};

/// Load the configuration and apply command-line overrides
pub async fn load_runtime_config(global: &GlobalArgs) -> Result<(AppConfig, CatalogConfig, FetchConfig)> {
    let mut config = AppConfig::load(global.config.clone()).await?;
    if let Some(data_root) = &global.data_root {
        config.catalog.data_root = Some(data_root.clone());
    }

    let (catalog_config, fetch_config) = config.to_runtime_config();
    debug!("Using data root {}", catalog_config.data_root.display());
    Ok((config, catalog_config, fetch_config))
}

/// Spinner on stderr, hidden in quiet mode
fn spinner(global: &GlobalArgs, message: String) -> ProgressBar {
    if global.quiet {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style.tick_strings(&["◐", "◓", "◑", "◒"]));
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

/// Build the catalog off the async runtime
async fn build_catalog(global: &GlobalArgs, config: CatalogConfig) -> Result<Catalog> {
    let spinner = spinner(
        global,
        format!("Scanning {}...", config.data_root.display()),
    );
    let result = tokio::task::spawn_blocking(move || Catalog::build(config)).await;
    spinner.finish_and_clear();

    let catalog =
        result.map_err(|e| AppError::generic(format!("Catalog scan task failed: {}", e)))??;
    Ok(catalog)
}

fn describe(descriptor: &DatasetDescriptor) -> String {
    let bbox = descriptor
        .bounding_box()
        .map(|bbox| {
            if bbox.is_valid() {
                bbox.to_string()
            } else {
                format!("{} (invalid)", bbox)
            }
        })
        .unwrap_or_else(|| "no bounding box".to_string());
    let presence = if descriptor.exists_locally() {
        "present"
    } else {
        "remote"
    };
    format!("{:<40} {:<16} {:<8} {}", descriptor.name(), format!("{:?}", descriptor.kind()), presence, bbox)
}

/// Handle the scan command
pub async fn handle_scan(global: &GlobalArgs) -> Result<()> {
    let start = Instant::now();
    let (_, catalog_config, _) = load_runtime_config(global).await?;
    let catalog = build_catalog(global, catalog_config).await?;

    println!("📂 Local datasets ({})", catalog.local().len());
    println!("====================");
    for descriptor in catalog.local() {
        println!("  {}", describe(descriptor));
    }

    println!();
    println!("🌐 Remote datasets ({})", catalog.remote().len());
    println!("=====================");
    for descriptor in catalog.remote() {
        println!("  {}", describe(descriptor));
    }

    info!("Scan completed in {:?}", start.elapsed());
    Ok(())
}

/// Handle the bbox command
///
/// Files are processed independently; the command fails if any could not be read.
pub async fn handle_bbox(args: BboxArgs) -> Result<()> {
    let mut failures = 0;

    for file in &args.files {
        let path = file.clone();
        let result = tokio::task::spawn_blocking(move || extract_bounding_box_from_file(&path))
            .await
            .map_err(|e| AppError::generic(format!("Extraction task failed: {}", e)))?;

        match result {
            Ok(Some(bbox)) => {
                let validity = if bbox.is_valid() { "" } else { " (invalid)" };
                println!("{}: {}{}", file.display(), bbox, validity);
            }
            Ok(None) => println!("{}: no bounding box", file.display()),
            Err(e) => {
                warn!("Failed to read {}: {}", file.display(), e);
                println!("{}: error: {}", file.display(), e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        return Err(AppError::generic(format!(
            "{} of {} files could not be read",
            failures,
            args.files.len()
        )));
    }
    Ok(())
}

fn route_target(args: &RouteArgs) -> Result<BoundingBox> {
    args.target()
        .ok_or_else(|| AppError::generic("At least one --point is required"))
}

/// Handle the select command
pub async fn handle_select(global: &GlobalArgs, args: RouteArgs) -> Result<()> {
    let target = route_target(&args)?;
    let (_, catalog_config, _) = load_runtime_config(global).await?;
    let catalog = build_catalog(global, catalog_config).await?;
    let selector = CoverageSelector::new(&catalog);

    if args.all {
        let candidates = selector.candidates_for(args.identifier.as_deref(), &target);
        println!("🗺️  Candidates for {} ({})", target, candidates.len());
        for (i, descriptor) in candidates.iter().enumerate() {
            println!("  {}. {}", i + 1, describe(descriptor));
        }
        return Ok(());
    }

    let selection = match &args.identifier {
        Some(identifier) => selector.select_matching(identifier, &target)?,
        None => selector.select(&target)?,
    };

    println!("🗺️  Selected {}", describe(selection.descriptor));
    if let Some(remote) = selection.descriptor.remote() {
        println!("   Source: {}", remote.url());
    }
    println!("   Requires fetch: {}", selection.requires_fetch);
    Ok(())
}

/// Handle the ensure command
pub async fn handle_ensure(global: &GlobalArgs, args: RouteArgs) -> Result<()> {
    let start = Instant::now();
    let target = route_target(&args)?;
    let (_, catalog_config, fetch_config) = load_runtime_config(global).await?;
    let catalog = build_catalog(global, catalog_config).await?;
    let selector = CoverageSelector::new(&catalog);

    let selection = match &args.identifier {
        Some(identifier) => selector.select_matching(identifier, &target)?,
        None => selector.select(&target)?,
    };

    let orchestrator = HttpOrchestrator::new(fetch_config)?;
    let spinner = if selection.requires_fetch {
        spinner(global, format!("Fetching {}...", selection.descriptor.name()))
    } else {
        ProgressBar::hidden()
    };
    let result = ensure_available(&selection, &orchestrator).await;
    spinner.finish_and_clear();
    let path = result?;

    println!("✅ {} available at {}", selection.descriptor.name(), path.display());
    info!("Ensure completed in {:?}", start.elapsed());
    Ok(())
}

/// Handle the config command
pub async fn handle_config(global: &GlobalArgs) -> Result<()> {
    let (mut config, catalog_config, _) = load_runtime_config(global).await?;
    config.catalog.data_root = Some(catalog_config.data_root);

    print!("{}", config.to_toml_string()?);
    Ok(())
}
