//! Free space of the disk systems a batch of retrieves would write to.

use crate::error::{DiskError, DiskResult, FreeSpaceFetchError, ProbeError};
use crate::metrics;
use crate::probe::{DefaultProber, FreeSpaceProber, ProbeRequest};
use crate::query::FreeSpaceQuery;
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;
use tapecat_catalogue::RetryingCatalogue;
use tapecat_catalogue::models::DiskSystemList;
use tapecat_core::config::DiskSpaceConfig;
use time::OffsetDateTime;
use tokio::sync::Semaphore;

/// Latest known free space of one disk system.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiskSystemFreeSpace {
    pub free_space: u64,
    /// Space the disk system must keep free, copied from its definition.
    pub targeted_free_space: u64,
    /// When `free_space` was measured.
    pub fetch_time: OffsetDateTime,
}

/// Free space per disk system, refreshed batch by batch.
///
/// Every catalogue call goes through the retry policy of `catalogue`.
pub struct DiskSystemFreeSpaceList {
    catalogue: RetryingCatalogue,
    prober: Arc<dyn FreeSpaceProber>,
    max_concurrent_probes: usize,
    systems: DiskSystemList,
    free_space: BTreeMap<String, DiskSystemFreeSpace>,
}

impl DiskSystemFreeSpaceList {
    pub fn new(
        catalogue: RetryingCatalogue,
        prober: Arc<dyn FreeSpaceProber>,
        config: &DiskSpaceConfig,
    ) -> Self {
        Self {
            catalogue,
            prober,
            max_concurrent_probes: config.max_concurrent_probes.max(1),
            systems: DiskSystemList::default(),
            free_space: BTreeMap::new(),
        }
    }

    /// Build a list that probes with [`DefaultProber`].
    pub fn with_default_prober(
        catalogue: RetryingCatalogue,
        config: &DiskSpaceConfig,
    ) -> DiskResult<Self> {
        let prober = DefaultProber::new(config)?;
        Ok(Self::new(catalogue, Arc::new(prober), config))
    }

    /// Refresh the free space of the named disk systems.
    ///
    /// A value measured within its space's refresh interval is reused as is.
    /// Every other disk system is probed, at most once per call, and each
    /// result is written back to the catalogue. Probe failures do not stop
    /// the batch: they are returned together once every probe has finished,
    /// and the successful results stay available through [`Self::get`].
    pub async fn fetch_disk_system_free_space(
        &mut self,
        disk_system_names: &BTreeSet<String>,
    ) -> DiskResult<()> {
        self.systems = self
            .catalogue
            .run(|c| async move { c.disk_systems().get_all_disk_systems().await })
            .await?;
        let now = OffsetDateTime::now_utc();
        let mut failures = BTreeMap::new();
        let mut to_probe = Vec::new();

        for name in disk_system_names {
            let Some(system) = self.systems.get(name) else {
                self.free_space.remove(name);
                failures.insert(name.clone(), ProbeError::UnknownDiskSystem);
                continue;
            };
            if system.free_space_is_fresh(now) {
                metrics::CACHE_HITS.inc();
                tracing::debug!(
                    disk_system = %name,
                    free_space = system.free_space,
                    "Reusing cached free space"
                );
                self.free_space.insert(
                    name.clone(),
                    DiskSystemFreeSpace {
                        free_space: system.free_space,
                        targeted_free_space: system.targeted_free_space,
                        fetch_time: system.last_refresh_time.unwrap_or(now),
                    },
                );
                continue;
            }
            match FreeSpaceQuery::parse(&system.free_space_query_url) {
                Ok(query) => to_probe.push(ProbeRequest {
                    disk_system_name: name.clone(),
                    disk_instance_name: system.disk_instance_name.clone(),
                    disk_instance_space_name: system.disk_instance_space_name.clone(),
                    query,
                }),
                Err(err) => {
                    self.free_space.remove(name);
                    failures.insert(name.clone(), err);
                }
            }
        }

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_probes));
        let mut in_flight = FuturesUnordered::new();
        for request in to_probe {
            let prober = Arc::clone(&self.prober);
            let semaphore = Arc::clone(&semaphore);
            in_flight.push(async move {
                let _permit = semaphore.acquire().await;
                let result = prober.probe(&request).await;
                (request, result)
            });
        }

        while let Some((request, result)) = in_flight.next().await {
            let name = request.disk_system_name;
            let method = request.query.method();
            let free_space = match result {
                Ok(free_space) => free_space,
                Err(err) => {
                    metrics::PROBES.with_label_values(&[method, "failure"]).inc();
                    tracing::warn!(
                        disk_system = %name,
                        method,
                        error = %err,
                        "Free space probe failed"
                    );
                    self.free_space.remove(&name);
                    failures.insert(name, err);
                    continue;
                }
            };
            metrics::PROBES.with_label_values(&[method, "success"]).inc();
            tracing::debug!(disk_system = %name, method, free_space, "Free space probed");

            let disk_instance = &request.disk_instance_name;
            let space = &request.disk_instance_space_name;
            let recorded = self
                .catalogue
                .run(|c| async move {
                    c.disk_instance_spaces()
                        .update_disk_instance_space_free_space(disk_instance, space, free_space)
                        .await
                })
                .await;
            if let Err(err) = recorded {
                // The measurement is still good for this batch.
                tracing::warn!(
                    disk_system = %name,
                    disk_instance = %request.disk_instance_name,
                    space = %request.disk_instance_space_name,
                    error = %err,
                    "Failed to record free space in the catalogue"
                );
            }

            let targeted_free_space = self
                .systems
                .get(&name)
                .map_or(0, |system| system.targeted_free_space);
            self.free_space.insert(
                name,
                DiskSystemFreeSpace {
                    free_space,
                    targeted_free_space,
                    fetch_time: OffsetDateTime::now_utc(),
                },
            );
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(FreeSpaceFetchError { failures }.into())
        }
    }

    /// Latest known free space of a disk system.
    pub fn get(&self, disk_system: &str) -> Option<&DiskSystemFreeSpace> {
        self.free_space.get(disk_system)
    }

    /// Disk systems as loaded by the last fetch.
    pub fn disk_systems(&self) -> &DiskSystemList {
        &self.systems
    }

    /// Whether `bytes_to_reserve` fits on a disk system on top of its targeted
    /// free space and the space other drives have already reserved.
    pub fn has_enough_space(
        &self,
        disk_system: &str,
        bytes_to_reserve: u64,
        existing_reservations: u64,
    ) -> DiskResult<bool> {
        let known = self
            .get(disk_system)
            .ok_or_else(|| DiskError::NoFreeSpace(disk_system.to_string()))?;
        let needed = bytes_to_reserve
            .saturating_add(known.targeted_free_space)
            .saturating_add(existing_reservations);
        let enough = known.free_space >= needed;
        if !enough {
            tracing::warn!(
                disk_system,
                free_space = known.free_space,
                space_to_reserve = bytes_to_reserve,
                targeted_free_space = known.targeted_free_space,
                existing_reservations,
                "Not enough free space on disk system"
            );
        }
        Ok(enough)
    }

    /// How long to leave a full disk system alone before trying it again.
    pub fn sleep_time(&self, disk_system: &str) -> Option<Duration> {
        self.systems
            .get(disk_system)
            .map(|system| Duration::from_secs(system.sleep_time))
    }

    /// Bytes reserved by all drives across all disk systems.
    pub async fn existing_reservations(&self) -> DiskResult<u64> {
        let reservations = self
            .catalogue
            .run(|c| async move { c.drive_state().get_disk_space_reservations().await })
            .await?;
        Ok(reservations
            .values()
            .fold(0u64, |total, bytes| total.saturating_add(*bytes)))
    }
}
