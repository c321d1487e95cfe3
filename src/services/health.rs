//! Store Health Checks
//!
//! Two consumers share the same probe:
//! - the `/health` endpoint, which reports a single ping round-trip
//! - startup, which retries the probe until the store answers or the
//!   attempt budget runs out

use std::time::Duration;

use tokio::time::Instant;

use crate::error::{Error, Result};
use crate::store::TransactionStore;

// ============================================================================
// Configuration
// ============================================================================

/// Startup readiness retry policy
#[derive(Debug, Clone)]
pub struct ReadinessConfig {
    /// Maximum number of probes before giving up
    pub max_attempts: u32,

    /// Fixed delay between probes
    pub backoff: Duration,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            backoff: Duration::from_secs(1),
        }
    }
}

// ============================================================================
// Check Result
// ============================================================================

/// Result of a single store probe
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Name of the checked backend
    pub name: String,

    /// Whether the probe succeeded
    pub passed: bool,

    /// Failure detail
    pub message: Option<String>,

    /// Round-trip duration
    pub duration: Duration,
}

impl CheckResult {
    /// Create a passing check result
    pub fn pass(name: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            passed: true,
            message: None,
            duration,
        }
    }

    /// Create a failing check result
    pub fn fail(name: impl Into<String>, message: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            passed: false,
            message: Some(message.into()),
            duration,
        }
    }

    /// Round-trip latency in whole milliseconds
    pub fn latency_ms(&self) -> u64 {
        self.duration.as_millis() as u64
    }
}

// ============================================================================
// Probes
// ============================================================================

/// Ping the store once and time the round-trip
pub async fn check_store(store: &dyn TransactionStore) -> CheckResult {
    let start = Instant::now();
    match store.ping().await {
        Ok(()) => CheckResult::pass(store.name(), start.elapsed()),
        Err(e) => CheckResult::fail(store.name(), e.to_string(), start.elapsed()),
    }
}

/// Probe the store until it answers.
///
/// Returns the successful check, or an error once `max_attempts` probes
/// have failed.
pub async fn wait_until_ready(
    store: &dyn TransactionStore,
    config: &ReadinessConfig,
) -> Result<CheckResult> {
    let attempts = config.max_attempts.max(1);

    for attempt in 1..=attempts {
        let check = check_store(store).await;
        if check.passed {
            tracing::info!(
                store = store.name(),
                attempt,
                latency_ms = check.latency_ms(),
                "Store is ready"
            );
            return Ok(check);
        }

        tracing::warn!(
            store = store.name(),
            attempt,
            max_attempts = attempts,
            error = check.message.as_deref().unwrap_or("unknown"),
            "Store not ready"
        );

        if attempt < attempts {
            tokio::time::sleep(config.backoff).await;
        }
    }

    Err(Error::General(format!(
        "{} unreachable after {} attempts",
        store.name(),
        attempts
    )))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    #[test]
    fn test_config_default() {
        let config = ReadinessConfig::default();
        assert_eq!(config.max_attempts, 10);
        assert_eq!(config.backoff, Duration::from_secs(1));
    }

    #[test]
    fn test_check_result() {
        let pass = CheckResult::pass("redis", Duration::from_millis(12));
        assert!(pass.passed);
        assert!(pass.message.is_none());
        assert_eq!(pass.latency_ms(), 12);

        let fail = CheckResult::fail("redis", "connection refused", Duration::from_millis(5));
        assert!(!fail.passed);
        assert_eq!(fail.message, Some("connection refused".to_string()));
    }

    #[tokio::test]
    async fn test_check_store() {
        let store = MemoryStore::new();
        let check = check_store(&store).await;
        assert!(check.passed);
        assert_eq!(check.name, "memory");

        store.set_unavailable(true);
        let check = check_store(&store).await;
        assert!(!check.passed);
        assert_eq!(check.message.as_deref(), Some("Store unavailable"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_readiness_gives_up() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        let config = ReadinessConfig {
            max_attempts: 3,
            backoff: Duration::from_millis(100),
        };

        let start = Instant::now();
        let result = wait_until_ready(&store, &config).await;
        assert!(result.is_err());
        // two sleeps between three attempts
        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_readiness_recovers() {
        let store = Arc::new(MemoryStore::new());
        store.set_unavailable(true);
        let config = ReadinessConfig {
            max_attempts: 5,
            backoff: Duration::from_millis(100),
        };

        let s = store.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            s.set_unavailable(false);
        });

        let check = wait_until_ready(store.as_ref(), &config).await.unwrap();
        assert!(check.passed);
    }
}
