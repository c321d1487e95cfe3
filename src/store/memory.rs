//! In-memory transaction store

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::TransactionStore;
use crate::error::{StoreError, StoreResult};

/// Map-backed store with failure injection
///
/// Keeps a log of every key passed to [`get`](TransactionStore::get) so
/// callers can check probe order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    reads: RwLock<Vec<String>>,
    unavailable: AtomicBool,
    unavailable_keys: RwLock<Vec<String>>,
    latency: RwLock<HashMap<String, Duration>>,
    timeout: Option<Duration>,
    closed: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound every read by `timeout`, failing with [`StoreError::Timeout`]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Delay reads of a single key by `latency`
    pub fn delay_key(&self, key: impl Into<String>, latency: Duration) {
        self.latency.write().insert(key.into(), latency);
    }

    /// Store a raw value
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.write().insert(key.into(), value.into());
    }

    /// Remove a value
    pub fn remove(&self, key: &str) -> Option<String> {
        self.entries.write().remove(key)
    }

    /// Make every call fail with [`StoreError::Unavailable`]
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make reads of a single key fail with [`StoreError::Unavailable`]
    pub fn fail_key(&self, key: impl Into<String>) {
        self.unavailable_keys.write().push(key.into());
    }

    /// Keys read so far, in order
    pub fn reads(&self) -> Vec<String> {
        self.reads.read().clone()
    }

    /// Forget recorded reads
    pub fn clear_reads(&self) {
        self.reads.write().clear();
    }

    /// Whether [`close`](TransactionStore::close) has been called
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(StoreError::Closed);
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        Ok(())
    }
}

#[async_trait]
impl TransactionStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.reads.write().push(key.to_string());
        self.check_available()?;
        if self.unavailable_keys.read().iter().any(|k| k == key) {
            return Err(StoreError::Unavailable);
        }

        let latency = self.latency.read().get(key).copied();
        if let Some(latency) = latency {
            let delay = tokio::time::sleep(latency);
            match self.timeout {
                Some(limit) => tokio::time::timeout(limit, delay)
                    .await
                    .map_err(|_| StoreError::Timeout(limit.as_millis() as u64))?,
                None => delay.await,
            }
        }
        Ok(self.entries.read().get(key).cloned())
    }

    async fn ping(&self) -> StoreResult<()> {
        self.check_available()
    }

    async fn close(&self) -> StoreResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_and_read_log() {
        let store = MemoryStore::new();
        store.insert("a", "1");

        assert_eq!(store.get("a").await.unwrap(), Some("1".to_string()));
        assert_eq!(store.get("b").await.unwrap(), None);
        assert_eq!(store.reads(), vec!["a".to_string(), "b".to_string()]);

        store.clear_reads();
        assert!(store.reads().is_empty());
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let store = MemoryStore::new();
        store.insert("a", "1");
        store.fail_key("a");
        assert_eq!(store.get("a").await, Err(StoreError::Unavailable));
        assert!(store.ping().await.is_ok());

        store.set_unavailable(true);
        assert_eq!(store.ping().await, Err(StoreError::Unavailable));

        store.set_unavailable(false);
        store.close().await.unwrap();
        assert!(store.is_closed());
        assert_eq!(store.get("b").await, Err(StoreError::Closed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_key_times_out() {
        let store = MemoryStore::new().with_timeout(Duration::from_millis(100));
        store.insert("slow", "1");
        store.insert("quick", "2");
        store.delay_key("slow", Duration::from_secs(1));
        store.delay_key("quick", Duration::from_millis(10));

        assert_eq!(store.get("slow").await, Err(StoreError::Timeout(100)));
        assert_eq!(store.get("quick").await.unwrap(), Some("2".to_string()));
    }
}
