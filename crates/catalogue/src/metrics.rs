//! Prometheus metrics for the catalogue.
//!
//! Counters cover connection losses seen by the retry combinator. Callers
//! register them once with [`register_metrics`] and gather [`REGISTRY`].

use prometheus::{IntCounter, Registry};
use std::sync::{LazyLock, Once};

/// Registry holding every catalogue metric.
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

pub static CONNECTION_LOST: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "tapecat_catalogue_connection_lost_total",
        "Total number of catalogue calls that failed with a lost connection",
    )
    .expect("metric creation failed")
});

pub static RETRIES: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "tapecat_catalogue_retries_total",
        "Total number of catalogue calls retried after a lost connection",
    )
    .expect("metric creation failed")
});

pub static RETRIES_EXHAUSTED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "tapecat_catalogue_retries_exhausted_total",
        "Total number of catalogue calls that lost their connection on every attempt",
    )
    .expect("metric creation failed")
});

static REGISTER: Once = Once::new();

/// Register all catalogue metrics with [`REGISTRY`].
pub fn register_metrics() {
    REGISTER.call_once(|| {
        REGISTRY
            .register(Box::new(CONNECTION_LOST.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(RETRIES.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(RETRIES_EXHAUSTED.clone()))
            .expect("metric registration failed");
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::TextEncoder;

    #[test]
    fn test_register_metrics_is_idempotent() {
        register_metrics();
        register_metrics();
        RETRIES.inc();
        let text = TextEncoder::new()
            .encode_to_string(&REGISTRY.gather())
            .expect("encode metrics");
        assert!(text.contains("tapecat_catalogue_retries_total"));
    }
}
