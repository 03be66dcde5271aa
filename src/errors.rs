//! Error types for the geodata catalog
//!
//! This module defines the error types for all components of the application.
//! Errors are designed to be actionable and let callers decide per kind whether
//! to log, degrade, or propagate.

use std::path::PathBuf;
use thiserror::Error;

/// Binary block container errors
///
/// A successful scan that finds no bounding box is `Ok(None)`, not an error.
/// `Truncated` and `Malformed` describe content problems, `Io` a failing stream.
#[derive(Error, Debug)]
pub enum PbfError {
    /// The underlying stream failed
    #[error("I/O error reading block container")]
    Io(#[from] std::io::Error),

    /// Fewer bytes were available than a length prefix declared
    #[error("Truncated block container: wanted {wanted} bytes, got {got}")]
    Truncated { wanted: usize, got: usize },

    /// A record could not be decoded
    #[error("Malformed block container: {reason}")]
    Malformed { reason: String },
}

impl PbfError {
    /// Create a malformed-content error
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }

    /// Whether the error describes bad content rather than a failing stream
    pub fn is_content_error(&self) -> bool {
        matches!(self, PbfError::Truncated { .. } | PbfError::Malformed { .. })
    }
}

/// Manifest parsing and loading errors
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Manifest file not found
    #[error("Manifest file not found: {path}")]
    NotFound { path: PathBuf },

    /// JSON parsing error
    #[error("JSON parsing error in manifest")]
    JsonParse(#[from] serde_json::Error),

    /// I/O error reading manifest
    #[error("I/O error reading manifest")]
    Io(#[from] std::io::Error),

    /// Invalid hash format
    #[error("Invalid hash format: {hash}. Expected MD5 hex string")]
    InvalidHash { hash: String },

    /// Invalid file path in manifest
    #[error("Invalid file path in manifest: {path}")]
    InvalidPath { path: String },

    /// Entry rejected for another reason
    #[error("Invalid manifest entry {uri}: {reason}")]
    InvalidEntry { uri: String, reason: String },
}

/// Local catalog scan errors
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Data root missing or not a directory
    #[error("Data directory not accessible: {path}")]
    DirectoryNotAccessible { path: PathBuf },

    /// I/O error while walking the data root
    #[error("I/O error scanning catalog")]
    Io(#[from] std::io::Error),
}

/// Coverage selection errors
#[derive(Error, Debug)]
pub enum SelectionError {
    /// No descriptor with a valid bounding box was offered
    #[error("No dataset with a valid bounding box is available for selection")]
    NoCandidate,
}

/// Fetch delegation and download errors
#[derive(Error, Debug)]
pub enum FetchError {
    /// The orchestrator reported a failure
    #[error("Download orchestrator failed for {uri}: {reason}")]
    Orchestrator { uri: String, reason: String },

    /// The orchestrator completed but the target file does not exist
    #[error("Fetch completed but target is missing: {path}")]
    TargetMissing { path: PathBuf },

    /// The descriptor has no remote reference to fetch from
    #[error("Dataset {name} has no remote source to fetch from")]
    NotRemote { name: String },

    /// Invalid URL provided
    #[error("Invalid URL: {url} - {error}")]
    InvalidUrl { url: String, error: String },

    /// HTTP request error
    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    /// Server returned error status
    #[error("Server error: HTTP {status}")]
    ServerError { status: u16 },

    /// All download attempts failed
    #[error("Download failed after {max_retries} retries: {last_error}")]
    MaxRetriesExceeded { max_retries: u32, last_error: String },

    /// File size mismatch
    #[error("File size mismatch. Expected: {expected} bytes, got: {actual} bytes")]
    SizeMismatch { expected: u64, actual: u64 },

    /// Invalid file hash - download corrupted
    #[error("File hash mismatch. Expected: {expected}, got: {actual}")]
    HashMismatch { expected: String, actual: String },

    /// Atomic file operation failed
    #[error("Atomic file operation failed: could not rename {temp_path} to {final_path}")]
    AtomicOperationFailed {
        temp_path: PathBuf,
        final_path: PathBuf,
    },

    /// I/O error during file operations
    #[error("File I/O error")]
    Io(#[from] std::io::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid configuration format
    #[error("Invalid configuration format")]
    InvalidFormat(#[from] toml::de::Error),

    /// Configuration could not be rendered
    #[error("Failed to serialize configuration")]
    Serialize(#[from] toml::ser::Error),

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    /// I/O error reading configuration
    #[error("I/O error reading configuration")]
    Io(#[from] std::io::Error),
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Block container error
    #[error(transparent)]
    Pbf(#[from] PbfError),

    /// Manifest error
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Catalog error
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Selection error
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// Fetch error
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("Application error: {message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Check if the error is recoverable (transient)
    pub fn is_recoverable(&self) -> bool {
        match self {
            AppError::Fetch(FetchError::Http(_))
            | AppError::Fetch(FetchError::ServerError { .. })
            | AppError::Fetch(FetchError::Orchestrator { .. })
            | AppError::Fetch(FetchError::MaxRetriesExceeded { .. })
            | AppError::Manifest(ManifestError::Io(_)) => true,
            _ => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Pbf(_) => "container",
            AppError::Manifest(_) => "manifest",
            AppError::Catalog(_) => "catalog",
            AppError::Selection(_) => "selection",
            AppError::Fetch(_) => "fetch",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
            AppError::Generic { .. } => "generic",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Block container result type alias
pub type PbfResult<T> = std::result::Result<T, PbfError>;

/// Manifest result type alias
pub type ManifestResult<T> = std::result::Result<T, ManifestError>;

/// Catalog result type alias
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// Selection result type alias
pub type SelectionResult<T> = std::result::Result<T, SelectionError>;

/// Fetch result type alias
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
