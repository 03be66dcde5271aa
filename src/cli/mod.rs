//! Command-line interface components
//!
//! This module contains CLI-specific code for the geodata catalog
//! application: argument parsing and command handlers.

pub mod args;
pub mod commands;

pub use args::{BboxArgs, Cli, Commands, GlobalArgs, RouteArgs};
pub use commands::{
    handle_bbox, handle_config, handle_ensure, handle_scan, handle_select, load_runtime_config,
};
