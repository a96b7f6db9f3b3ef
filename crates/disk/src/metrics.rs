//! Prometheus metrics for free-space probing.

use prometheus::{IntCounter, IntCounterVec, Opts, Registry};
use std::sync::{LazyLock, Once};

/// Registry holding every free-space metric.
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Probes run, by method (`constant`, `script`, `http`) and outcome (`success`, `failure`).
pub static PROBES: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "tapecat_free_space_probes_total",
            "Total number of disk system free space probes",
        ),
        &["method", "outcome"],
    )
    .expect("metric creation failed")
});

pub static CACHE_HITS: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "tapecat_free_space_cache_hits_total",
        "Total number of free space checks answered from the catalogue without probing",
    )
    .expect("metric creation failed")
});

static REGISTER: Once = Once::new();

/// Register all free-space metrics with [`REGISTRY`].
pub fn register_metrics() {
    REGISTER.call_once(|| {
        REGISTRY
            .register(Box::new(PROBES.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(CACHE_HITS.clone()))
            .expect("metric registration failed");
    });
}
