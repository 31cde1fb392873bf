//! # Prometheus Metrics
//!
//! Counters for what a run did to the store: transactions committed and
//! rolled back, and how many puts and deletes they staged.
//!
//! All metrics are registered in a dedicated [`prometheus::Registry`] so
//! they do not collide with any default global registry consumers.

use prometheus::{Encoder, IntCounter, Registry, TextEncoder};

/// Holds all Prometheus metric handles for a run.
#[derive(Clone)]
pub struct StoreMetrics {
    /// Prometheus registry that owns all metrics below.
    registry: Registry,
    /// Transactions flushed to the store.
    pub commits_total: IntCounter,
    /// Transactions discarded.
    pub rollbacks_total: IntCounter,
    /// Puts staged inside transactions.
    pub staged_puts_total: IntCounter,
    /// Deletes staged inside transactions.
    pub staged_deletes_total: IntCounter,
}

impl StoreMetrics {
    /// Creates and registers all metrics.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("trie_store".into()), None)?;

        let commits_total = counter(
            &registry,
            "commits_total",
            "Total number of transactions committed",
        )?;
        let rollbacks_total = counter(
            &registry,
            "rollbacks_total",
            "Total number of transactions rolled back",
        )?;
        let staged_puts_total = counter(
            &registry,
            "staged_puts_total",
            "Total number of puts staged in transactions",
        )?;
        let staged_deletes_total = counter(
            &registry,
            "staged_deletes_total",
            "Total number of deletes staged in transactions",
        )?;

        Ok(Self {
            registry,
            commits_total,
            rollbacks_total,
            staged_puts_total,
            staged_deletes_total,
        })
    }

    /// Encodes all registered metrics into the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

fn counter(registry: &Registry, name: &str, help: &str) -> Result<IntCounter, prometheus::Error> {
    let counter = IntCounter::new(name, help)?;
    registry.register(Box::new(counter.clone()))?;
    Ok(counter)
}
