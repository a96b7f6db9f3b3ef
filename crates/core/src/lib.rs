//! Core domain types and shared configuration for the tape archive catalogue.
//!
//! This crate defines the vocabulary used by every other crate:
//! - Acting identities and entry logs
//! - Tape states and archive route types
//! - Drive mount types and statuses
//! - Catalogue schema versions
//! - Configuration for the catalogue and free-space probing

pub mod config;
pub mod drive;
pub mod error;
pub mod identity;
pub mod schema;
pub mod tape_state;

pub use drive::{DriveStatus, MountType};
pub use error::{Error, Result};
pub use identity::{EntryLog, SecurityIdentity};
pub use schema::{SCHEMA_VERSION, SchemaVersion};
pub use tape_state::{ArchiveRouteType, TapeState};

/// Longest comment or reason stored; longer values are truncated.
pub const MAX_COMMENT_LENGTH: usize = 1000;
