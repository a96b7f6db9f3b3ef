//! Catalogue error types.

use tapecat_core::SchemaVersion;
use thiserror::Error;

/// Broad classification of catalogue failures.
///
/// Only [`ErrorKind::ConnectionLost`] is retried automatically.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    ConnectionLost,
    SchemaMismatch,
    Database,
    Internal,
}

/// Catalogue operation errors.
#[derive(Debug, Error)]
pub enum CatalogueError {
    #[error("{field} is an empty string")]
    EmptyField { field: &'static str },

    #[error("{field} is zero")]
    ZeroValue { field: &'static str },

    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("{kind} '{name}' does not exist")]
    NotFound { kind: &'static str, name: String },

    #[error("{kind} '{name}' already exists")]
    AlreadyExists { kind: &'static str, name: String },

    #[error("cannot delete {kind} '{name}': it is used by {used_by}")]
    InUse {
        kind: &'static str,
        name: String,
        used_by: &'static str,
    },

    #[error("{kind} '{name}' is not empty: {detail}")]
    NotEmpty {
        kind: &'static str,
        name: String,
        detail: String,
    },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("lost connection to the catalogue database: {0}")]
    ConnectionLost(String),

    #[error("catalogue schema version mismatch: expected {expected}, found {found}")]
    SchemaMismatch {
        expected: SchemaVersion,
        found: SchemaVersion,
    },

    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl CatalogueError {
    pub fn empty(field: &'static str) -> Self {
        Self::EmptyField { field }
    }

    pub fn zero(field: &'static str) -> Self {
        Self::ZeroValue { field }
    }

    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub fn already_exists(kind: &'static str, name: impl Into<String>) -> Self {
        Self::AlreadyExists {
            kind,
            name: name.into(),
        }
    }

    pub fn in_use(kind: &'static str, name: impl Into<String>, used_by: &'static str) -> Self {
        Self::InUse {
            kind,
            name: name.into(),
            used_by,
        }
    }

    pub fn not_empty(kind: &'static str, name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::NotEmpty {
            kind,
            name: name.into(),
            detail: detail.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyField { .. } | Self::ZeroValue { .. } | Self::InvalidField { .. } => {
                ErrorKind::Validation
            }
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::AlreadyExists { .. }
            | Self::InUse { .. }
            | Self::NotEmpty { .. }
            | Self::Conflict(_) => ErrorKind::Conflict,
            Self::ConnectionLost(_) => ErrorKind::ConnectionLost,
            Self::SchemaMismatch { .. } => ErrorKind::SchemaMismatch,
            Self::Database(_) => ErrorKind::Database,
            Self::Config(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn is_connection_lost(&self) -> bool {
        self.kind() == ErrorKind::ConnectionLost
    }
}

// SQLite primary result codes for a busy or locked database.
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

impl From<sqlx::Error> for CatalogueError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => Self::ConnectionLost(err.to_string()),
            sqlx::Error::Database(ref db) => {
                let primary_code = db
                    .code()
                    .and_then(|code| code.parse::<i32>().ok())
                    .map(|code| code & 0xff);
                if matches!(primary_code, Some(SQLITE_BUSY | SQLITE_LOCKED)) {
                    Self::ConnectionLost(db.message().to_string())
                } else if db.is_unique_violation() || db.is_foreign_key_violation() {
                    Self::Conflict(db.message().to_string())
                } else {
                    Self::Database(err)
                }
            }
            other => Self::Database(other),
        }
    }
}

/// Result type for catalogue operations.
pub type CatalogueResult<T> = std::result::Result<T, CatalogueError>;
