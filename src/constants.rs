//! Application constants for the geodata catalog
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain for maintainability and clarity.

use std::time::Duration;

/// File naming and layout constants
pub mod files {
    /// Extension of raw OSM extracts
    pub const DOT_PBF: &str = ".pbf";

    /// Inner extension of raw OSM extracts (`germany.osm.pbf`)
    pub const DOT_OSM: &str = ".osm";

    /// Extension of remotely published, pre-extracted archives
    pub const DOT_ZIP: &str = ".zip";

    /// Extension used by map identifiers coming from map views
    pub const DOT_MAP: &str = ".map";

    /// All extensions stripped when deriving a dataset name
    pub const KNOWN_EXTENSIONS: &[&str] = &[DOT_PBF, DOT_OSM, DOT_ZIP, DOT_MAP];

    /// Suffix commonly appended to rolling extracts (`germany-latest.osm.pbf`)
    pub const LATEST_SUFFIX: &str = "-latest";

    /// Marker file whose presence signals an extracted dataset directory
    pub const EXTRACTED_MARKER: &str = "properties";

    /// Temporary file suffix for atomic operations
    pub const TEMP_FILE_SUFFIX: &str = ".tmp";

    /// Application directory name below the platform data/config directories
    pub const APP_DIR_NAME: &str = "geodata-catalog";

    /// Default configuration file name
    pub const CONFIG_FILE_NAME: &str = "config.toml";
}

/// Binary block container constants
pub mod pbf {
    /// Block type tag of the leading metadata block
    pub const OSM_HEADER: &str = "OSMHeader";

    /// Fixed-point resolution of header bounding box coordinates (nanodegrees)
    pub const COORDINATE_RESOLUTION: f64 = 1_000_000_000.0;

    /// Largest header record the container format allows (64 KiB)
    pub const MAX_HEADER_SIZE: usize = 64 * 1024;

    /// Largest payload block the container format allows (32 MiB)
    pub const MAX_BLOCK_SIZE: usize = 32 * 1024 * 1024;
}

/// Bounding box constants
pub mod geo {
    /// Longitude at or beyond which a corner is considered to sit on the antimeridian
    ///
    /// Extracts such as Alaska or Russia claim boxes spanning the whole globe,
    /// which would make them contain every route.
    pub const ANTIMERIDIAN_LONGITUDE: f64 = 179.9999;
}

/// Coverage selection constants
pub mod selection {
    /// Center distance (metres) within which a smaller, contained candidate replaces the closest one
    pub const DISTANCE_TIE_BREAK: f64 = 5.0;
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = concat!("geodata-catalog/", env!("CARGO_PKG_VERSION"));

    /// Default HTTP request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Maximum number of retry attempts for failed downloads
    pub const MAX_RETRIES: u32 = 3;

    /// Base delay for exponential backoff (milliseconds)
    pub const RETRY_BASE_DELAY_MS: u64 = 250;

    /// Read buffer size when hashing downloaded files
    pub const HASH_BUFFER_SIZE: usize = 64 * 1024;
}

/// Logging constants
pub mod logging {
    /// Default log level
    pub const DEFAULT_LOG_LEVEL: &str = "warn";
}

// Re-export commonly used constants for convenience
pub use files::{DOT_PBF, DOT_ZIP, EXTRACTED_MARKER, TEMP_FILE_SUFFIX};
pub use http::USER_AGENT;
pub use selection::DISTANCE_TIE_BREAK;
