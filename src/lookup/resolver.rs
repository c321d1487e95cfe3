//! Transaction lookup across key patterns

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use super::keys::KeyPattern;
use crate::metrics::LookupMetrics;
use crate::store::TransactionStore;
use crate::types::{LookupOutcome, TransactionRecord};

/// Resolves `(site, id)` to a stored transaction record
///
/// Patterns are probed one at a time in order; the first parseable record
/// wins. A malformed value or a failed read only skips that key.
pub struct LookupResolver {
    pub(super) store: Arc<dyn TransactionStore>,
    pub(super) patterns: Vec<KeyPattern>,
    pub(super) metrics: Option<Arc<LookupMetrics>>,
}

impl LookupResolver {
    /// Key patterns in probe order
    pub fn patterns(&self) -> &[KeyPattern] {
        &self.patterns
    }

    /// Store the resolver reads from
    pub fn store(&self) -> &Arc<dyn TransactionStore> {
        &self.store
    }

    /// Resolve a lookup. Never fails: store errors become
    /// [`LookupOutcome::Failed`] when nothing was found.
    pub async fn resolve(&self, site: &str, id: &str) -> LookupOutcome {
        let start = Instant::now();
        let mut last_error = None;

        for pattern in &self.patterns {
            let key = pattern.build(site, id);
            let label = pattern.label();

            let raw = match self.store.get(&key).await {
                Ok(Some(raw)) => raw,
                Ok(None) => {
                    debug!(key = %key, "Lookup miss");
                    self.record_read(&label, "miss");
                    continue;
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "Store read failed, trying next key");
                    self.record_read(&label, "error");
                    last_error = Some(e);
                    continue;
                }
            };

            match TransactionRecord::parse(&raw) {
                Ok(record) => {
                    info!(
                        site = %site,
                        id = %id,
                        key = %key,
                        status = record.status.as_deref().unwrap_or(""),
                        "Transaction found"
                    );
                    self.record_read(&label, "hit");
                    return self.finish(LookupOutcome::Found { key, record }, start);
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "Malformed transaction record, treating as miss");
                    self.record_read(&label, "malformed");
                }
            }
        }

        let outcome = match last_error {
            Some(reason) => LookupOutcome::Failed { reason },
            None => LookupOutcome::Absent,
        };
        info!(site = %site, id = %id, outcome = outcome.label(), "Transaction not found");
        self.finish(outcome, start)
    }

    fn record_read(&self, pattern: &str, result: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.record_read(pattern, result);
        }
    }

    fn finish(&self, outcome: LookupOutcome, start: Instant) -> LookupOutcome {
        if let Some(metrics) = &self.metrics {
            metrics.record_lookup(outcome.label(), start.elapsed());
        }
        outcome
    }
}
