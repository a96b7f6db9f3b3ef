//! Configuration types shared across crates.

use crate::schema::{SCHEMA_VERSION, SchemaVersion};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Catalogue database configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CatalogueConfig {
    /// Path to the SQLite catalogue file.
    #[serde(default = "default_catalogue_path")]
    pub path: PathBuf,
    /// Connections in the pool used for short metadata operations.
    #[serde(default = "default_max_metadata_connections")]
    pub max_metadata_connections: u32,
    /// Connections in the pool reserved for listing cursors.
    #[serde(default = "default_max_listing_connections")]
    pub max_listing_connections: u32,
    /// How long a connection waits on a locked database before failing.
    #[serde(default = "default_busy_timeout_secs")]
    pub busy_timeout_secs: u64,
    /// Total attempts for a call that keeps losing its connection.
    #[serde(default = "default_max_tries_to_connect")]
    pub max_tries_to_connect: u32,
    /// Base delay between attempts; attempt N waits N times this value.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    /// Rows fetched per page by listing cursors.
    #[serde(default = "default_listing_page_size")]
    pub listing_page_size: u32,
    /// Create missing tables when opening the catalogue.
    #[serde(default = "default_create_schema")]
    pub create_schema: bool,
    /// Schema version to expect instead of the compiled-in one.
    #[serde(default)]
    pub expected_schema_version: Option<SchemaVersion>,
}

fn default_catalogue_path() -> PathBuf {
    PathBuf::from("./data/catalogue.db")
}

fn default_max_metadata_connections() -> u32 {
    1
}

fn default_max_listing_connections() -> u32 {
    2
}

fn default_busy_timeout_secs() -> u64 {
    5
}

fn default_max_tries_to_connect() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    100
}

fn default_listing_page_size() -> u32 {
    1000
}

fn default_create_schema() -> bool {
    true
}

impl Default for CatalogueConfig {
    fn default() -> Self {
        Self {
            path: default_catalogue_path(),
            max_metadata_connections: default_max_metadata_connections(),
            max_listing_connections: default_max_listing_connections(),
            busy_timeout_secs: default_busy_timeout_secs(),
            max_tries_to_connect: default_max_tries_to_connect(),
            retry_backoff_ms: default_retry_backoff_ms(),
            listing_page_size: default_listing_page_size(),
            create_schema: default_create_schema(),
            expected_schema_version: None,
        }
    }
}

impl CatalogueConfig {
    /// Create a configuration for a catalogue file, with short retry delays.
    ///
    /// **For testing only.**
    pub fn for_testing(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            retry_backoff_ms: 1,
            listing_page_size: 2,
            ..Self::default()
        }
    }

    /// The schema version the opened catalogue must carry.
    pub fn expected_schema_version(&self) -> SchemaVersion {
        self.expected_schema_version.unwrap_or(SCHEMA_VERSION)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_secs(self.busy_timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.path.as_os_str().is_empty() {
            return Err("catalogue.path must not be empty".to_string());
        }
        if self.max_metadata_connections == 0 {
            return Err("catalogue.max_metadata_connections must be at least 1".to_string());
        }
        if self.max_listing_connections == 0 {
            return Err("catalogue.max_listing_connections must be at least 1".to_string());
        }
        if self.max_tries_to_connect == 0 {
            return Err("catalogue.max_tries_to_connect must be at least 1".to_string());
        }
        if self.listing_page_size == 0 {
            return Err("catalogue.listing_page_size must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Disk-system free-space probing configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DiskSpaceConfig {
    /// Script invoked for `eosSpace:` query URLs.
    #[serde(default)]
    pub external_free_disk_space_script: Option<PathBuf>,
    /// Upper bound on a single probe (script run or HTTP call).
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
    /// Probes allowed in flight at once within a batch.
    #[serde(default = "default_max_concurrent_probes")]
    pub max_concurrent_probes: usize,
}

fn default_probe_timeout_secs() -> u64 {
    30
}

fn default_max_concurrent_probes() -> usize {
    8
}

impl Default for DiskSpaceConfig {
    fn default() -> Self {
        Self {
            external_free_disk_space_script: None,
            probe_timeout_secs: default_probe_timeout_secs(),
            max_concurrent_probes: default_max_concurrent_probes(),
        }
    }
}

impl DiskSpaceConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.probe_timeout_secs == 0 {
            return Err("disk_space.probe_timeout_secs must be at least 1".to_string());
        }
        if self.max_concurrent_probes == 0 {
            return Err("disk_space.max_concurrent_probes must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Complete application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Catalogue database configuration.
    #[serde(default)]
    pub catalogue: CatalogueConfig,
    /// Free-space probing configuration.
    #[serde(default)]
    pub disk_space: DiskSpaceConfig,
}

impl AppConfig {
    /// Create a test configuration pointing at the given catalogue file.
    ///
    /// **For testing only.**
    pub fn for_testing(path: impl Into<PathBuf>) -> Self {
        Self {
            catalogue: CatalogueConfig::for_testing(path),
            disk_space: DiskSpaceConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        self.catalogue.validate()?;
        self.disk_space.validate()
    }
}
