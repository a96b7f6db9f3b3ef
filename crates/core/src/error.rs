//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid tape state '{0}': expected one of ACTIVE, DISABLED, BROKEN, EXPORTED, REPACKING")]
    InvalidTapeState(String),

    #[error("invalid archive route type '{0}': expected DEFAULT or REPACK")]
    InvalidRouteType(String),

    #[error("invalid mount type: {0}")]
    InvalidMountType(String),

    #[error("invalid drive status: {0}")]
    InvalidDriveStatus(String),

    #[error("invalid schema version '{0}': expected <major>.<minor>")]
    InvalidSchemaVersion(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
