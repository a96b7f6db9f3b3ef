//! Disk-system free-space backpressure for the tape archive catalogue.
//!
//! Before a batch of retrieves is sent to disk, the scheduler fetches the
//! free space of every destination disk system with
//! [`DiskSystemFreeSpaceList::fetch_disk_system_free_space`] and checks each
//! one with [`DiskSystemFreeSpaceList::has_enough_space`].

pub mod error;
pub mod free_space;
pub mod metrics;
pub mod probe;
pub mod query;

pub use error::{DiskError, DiskResult, FreeSpaceFetchError, ProbeError};
pub use free_space::{DiskSystemFreeSpace, DiskSystemFreeSpaceList};
pub use probe::{DefaultProber, FreeSpaceProber, ProbeRequest};
pub use query::FreeSpaceQuery;
