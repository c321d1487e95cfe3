//! Resolver builder

use std::sync::Arc;

use super::keys::{KeyPattern, DEFAULT_KEY_PATTERNS};
use super::resolver::LookupResolver;
use crate::error::{Error, Result};
use crate::metrics::LookupMetrics;
use crate::store::TransactionStore;

/// Builder for configuring a [`LookupResolver`]
pub struct ResolverBuilder {
    store: Option<Arc<dyn TransactionStore>>,
    patterns: Vec<KeyPattern>,
    metrics: Option<Arc<LookupMetrics>>,
}

impl ResolverBuilder {
    /// Create a builder with the default probe order
    pub fn new() -> Self {
        Self {
            store: None,
            patterns: DEFAULT_KEY_PATTERNS.to_vec(),
            metrics: None,
        }
    }

    /// Set the store to read from
    pub fn with_store<S>(mut self, store: Arc<S>) -> Self
    where
        S: TransactionStore + 'static,
    {
        self.store = Some(store);
        self
    }

    /// Set an already type-erased store
    pub fn with_shared_store(mut self, store: Arc<dyn TransactionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Replace the probe order
    pub fn with_patterns(mut self, patterns: impl IntoIterator<Item = KeyPattern>) -> Self {
        self.patterns = patterns.into_iter().collect();
        self
    }

    /// Record lookups into `metrics`
    pub fn with_metrics(mut self, metrics: Arc<LookupMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Build the resolver
    pub fn build(self) -> Result<LookupResolver> {
        let store = self
            .store
            .ok_or_else(|| Error::Configuration("No store configured".to_string()))?;

        if self.patterns.is_empty() {
            return Err(Error::Configuration("No key patterns configured".to_string()));
        }

        Ok(LookupResolver {
            store,
            patterns: self.patterns,
            metrics: self.metrics,
        })
    }
}

impl Default for ResolverBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::{TransactionType, COMPAY};
    use crate::store::MemoryStore;

    #[test]
    fn test_builder_defaults() {
        let builder = ResolverBuilder::new();
        assert!(builder.store.is_none());
        assert!(builder.metrics.is_none());
        assert_eq!(builder.patterns, DEFAULT_KEY_PATTERNS.to_vec());
    }

    #[test]
    fn test_build_requires_store() {
        let result = ResolverBuilder::new().build();
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_build_rejects_empty_patterns() {
        let result = ResolverBuilder::new()
            .with_store(Arc::new(MemoryStore::new()))
            .with_patterns(Vec::<KeyPattern>::new())
            .build();
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[tokio::test]
    async fn test_custom_patterns() {
        let store = Arc::new(MemoryStore::new());
        let resolver = ResolverBuilder::new()
            .with_store(store.clone())
            .with_patterns([KeyPattern::Legacy(TransactionType::Withdraw), COMPAY])
            .build()
            .unwrap();

        assert_eq!(resolver.patterns().len(), 2);
        resolver.resolve("s", "1").await;
        assert_eq!(
            store.reads(),
            vec!["kob:transaction:withdraw:s:1", "kob:ttf:compay:1"]
        );
    }
}
