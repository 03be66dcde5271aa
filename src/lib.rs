//! Geodata Catalog Library
//!
//! Catalogs routing and map datasets found on disk and published in remote
//! manifests, and selects the dataset that best covers a route's bounding
//! box, preferring data that is already available locally.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};
