//! Error types for free-space probing.

use std::collections::BTreeMap;
use std::time::Duration;
use tapecat_catalogue::CatalogueError;
use thiserror::Error;

/// Why the free space of one disk system could not be determined.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("disk system is not defined in the catalogue")]
    UnknownDiskSystem,

    #[error("invalid free space query URL '{url}': {reason}")]
    InvalidQueryUrl { url: String, reason: String },

    #[error("no external free disk space script is configured")]
    NoScript,

    #[error("failed to run {path}: {source}")]
    Spawn {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("free space script exited with {status}: {stderr}")]
    ScriptFailed { status: String, stderr: String },

    #[error("free space endpoint answered HTTP {status}")]
    HttpStatus { status: u16 },

    #[error("free space request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed free space reply: {0}")]
    MalformedReply(String),

    #[error("free space source reported an error: {0}")]
    Reported(String),

    #[error("probe timed out after {0:?}")]
    Timeout(Duration),
}

/// Every disk system of a batch whose free space could not be fetched.
///
/// Disk systems absent from `failures` were fetched successfully.
#[derive(Debug, Error)]
#[error("failed to fetch the free space of {}", describe(.failures))]
pub struct FreeSpaceFetchError {
    pub failures: BTreeMap<String, ProbeError>,
}

fn describe(failures: &BTreeMap<String, ProbeError>) -> String {
    failures
        .iter()
        .map(|(name, err)| format!("{name} ({err})"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl FreeSpaceFetchError {
    pub fn failed(&self, disk_system: &str) -> bool {
        self.failures.contains_key(disk_system)
    }
}

#[derive(Debug, Error)]
pub enum DiskError {
    #[error(transparent)]
    Catalogue(#[from] CatalogueError),

    #[error(transparent)]
    FreeSpaceFetch(#[from] FreeSpaceFetchError),

    #[error("no free space known for disk system '{0}'")]
    NoFreeSpace(String),

    #[error("invalid disk space configuration: {0}")]
    Config(String),

    #[error("failed to build the HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

pub type DiskResult<T> = std::result::Result<T, DiskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_names_every_failure() {
        let mut failures = BTreeMap::new();
        failures.insert("ds2".to_string(), ProbeError::NoScript);
        failures.insert(
            "ds1".to_string(),
            ProbeError::MalformedReply("expected value".to_string()),
        );
        let err = FreeSpaceFetchError { failures };
        let message = err.to_string();
        assert!(message.starts_with("failed to fetch the free space of ds1 (malformed"));
        assert!(message.contains("ds2 (no external free disk space script is configured)"));
        assert!(err.failed("ds1"));
        assert!(!err.failed("ds3"));
    }
}
