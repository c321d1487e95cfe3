//! Prometheus metrics for lookups
//!
//! Each [`LookupMetrics`] owns its own registry so tests and multiple
//! resolvers never collide on metric registration.

use std::time::Duration;

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder,
};

use crate::error::{Error, Result};

/// Content type for the text exposition format
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

const PREFIX: &str = "payment_status";

/// Lookup counters and latency histogram
pub struct LookupMetrics {
    registry: Registry,
    lookups: IntCounterVec,
    store_reads: IntCounterVec,
    lookup_duration: Histogram,
}

impl LookupMetrics {
    /// Create and register all metrics
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let lookups = IntCounterVec::new(
            Opts::new(
                format!("{PREFIX}_lookups_total"),
                "Transaction lookups by outcome",
            ),
            &["outcome"],
        )
        .map_err(metric_error)?;

        let store_reads = IntCounterVec::new(
            Opts::new(
                format!("{PREFIX}_store_reads_total"),
                "Store reads by key pattern and result",
            ),
            &["pattern", "result"],
        )
        .map_err(metric_error)?;

        let lookup_duration = Histogram::with_opts(
            HistogramOpts::new(
                format!("{PREFIX}_lookup_duration_seconds"),
                "Time spent resolving one lookup",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
        )
        .map_err(metric_error)?;

        registry
            .register(Box::new(lookups.clone()))
            .map_err(metric_error)?;
        registry
            .register(Box::new(store_reads.clone()))
            .map_err(metric_error)?;
        registry
            .register(Box::new(lookup_duration.clone()))
            .map_err(metric_error)?;

        Ok(Self {
            registry,
            lookups,
            store_reads,
            lookup_duration,
        })
    }

    /// Record a finished lookup
    pub fn record_lookup(&self, outcome: &str, elapsed: Duration) {
        self.lookups.with_label_values(&[outcome]).inc();
        self.lookup_duration.observe(elapsed.as_secs_f64());
    }

    /// Record a single store read. `result` is one of `hit`, `miss`,
    /// `malformed` or `error`.
    pub fn record_read(&self, pattern: &str, result: &str) {
        self.store_reads.with_label_values(&[pattern, result]).inc();
    }

    /// Lookups recorded for `outcome`
    pub fn lookup_count(&self, outcome: &str) -> u64 {
        self.lookups.with_label_values(&[outcome]).get()
    }

    /// Reads recorded for `(pattern, result)`
    pub fn read_count(&self, pattern: &str, result: &str) -> u64 {
        self.store_reads.with_label_values(&[pattern, result]).get()
    }

    /// Export in Prometheus text format
    pub fn export(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = vec![];
        encoder
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(metric_error)?;
        String::from_utf8(buffer)
            .map_err(|e| Error::Serialization(format!("Metrics contain invalid UTF-8: {e}")))
    }
}

fn metric_error(err: prometheus::Error) -> Error {
    Error::General(format!("Metrics error: {err}"))
}
