//! Command-line argument parsing for the geodata catalog
//!
//! This module defines the CLI structure using clap derive macros: catalog
//! inspection, bounding box extraction, coverage selection and fetching.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::app::bounding_box::{BoundingBox, Position};

/// Geodata Catalog - find the dataset covering a route
#[derive(Parser, Debug)]
#[command(
    name = "geodata-catalog",
    version,
    about = "Catalog local and remote geodata extracts and select the one covering a route",
    long_about = "Scans a data directory for raw extracts and extracted datasets, ingests remote manifests,
and selects the dataset best covering a route, preferring data already on disk."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Data directory overriding the configured one
    #[arg(long, global = true, value_name = "DIR")]
    pub data_root: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List local and remote datasets in catalog order
    Scan,

    /// Print the bounding box of raw extracts
    Bbox(BboxArgs),

    /// Select the dataset covering a route
    Select(RouteArgs),

    /// Select the dataset covering a route and download it if needed
    Ensure(RouteArgs),

    /// Print the effective configuration
    Config,
}

/// Arguments for the bbox command
#[derive(Args, Debug, Clone)]
pub struct BboxArgs {
    /// Raw extract files
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,
}

/// Arguments describing a route
#[derive(Args, Debug, Clone)]
pub struct RouteArgs {
    /// Route waypoint as LON,LAT (repeatable)
    #[arg(
        short,
        long = "point",
        value_name = "LON,LAT",
        value_parser = parse_position,
        allow_hyphen_values = true,
        required = true
    )]
    pub points: Vec<Position>,

    /// Map identifier to match by name as well as by coverage
    #[arg(short, long)]
    pub identifier: Option<String>,

    /// List every matching candidate instead of the single choice
    #[arg(long)]
    pub all: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the logging level based on global arguments
    pub fn log_level(&self) -> tracing::Level {
        if self.global.quiet {
            tracing::Level::ERROR
        } else if self.global.very_verbose {
            tracing::Level::DEBUG
        } else if self.global.verbose {
            tracing::Level::INFO
        } else {
            tracing::Level::WARN
        }
    }
}

impl RouteArgs {
    /// Bounding box of all waypoints
    pub fn target(&self) -> Option<BoundingBox> {
        BoundingBox::from_positions(&self.points)
    }
}

/// Parse `LON,LAT`
pub fn parse_position(value: &str) -> Result<Position, String> {
    let (longitude, latitude) = value
        .split_once(',')
        .ok_or_else(|| format!("expected LON,LAT, got '{}'", value))?;

    let longitude: f64 = longitude
        .trim()
        .parse()
        .map_err(|_| format!("invalid longitude '{}'", longitude))?;
    let latitude: f64 = latitude
        .trim()
        .parse()
        .map_err(|_| format!("invalid latitude '{}'", latitude))?;

    if !(-180.0..=180.0).contains(&longitude) {
        return Err(format!("longitude {} out of range", longitude));
    }
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(format!("latitude {} out of range", latitude));
    }

    Ok(Position::new(longitude, latitude))
}
