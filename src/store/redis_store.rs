//! Redis-backed transaction store

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::{debug, info};

use super::TransactionStore;
use crate::error::{StoreError, StoreResult};

/// Redis store over a multiplexed [`ConnectionManager`]
///
/// The connection is opened on first use, so a store can be constructed
/// before Redis is reachable. Each command, including the initial connect,
/// is bounded by `timeout`.
pub struct RedisStore {
    client: redis::Client,
    connection: RwLock<Option<ConnectionManager>>,
    timeout: Duration,
    closed: AtomicBool,
}

impl RedisStore {
    /// Create a store for `url` without connecting
    pub fn open(url: &str, timeout: Duration) -> StoreResult<Self> {
        let client =
            redis::Client::open(url).map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(Self {
            client,
            connection: RwLock::new(None),
            timeout,
            closed: AtomicBool::new(false),
        })
    }

    /// Configured per-command timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn bounded<T, F>(&self, fut: F) -> StoreResult<T>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Err(e)) if e.is_timeout() => Err(self.timed_out()),
            Ok(result) => result.map_err(StoreError::from),
            Err(_) => Err(self.timed_out()),
        }
    }

    fn timed_out(&self) -> StoreError {
        StoreError::Timeout(self.timeout.as_millis() as u64)
    }

    /// Get a handle to the shared connection, connecting if needed
    async fn connection(&self) -> StoreResult<ConnectionManager> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(StoreError::Closed);
        }
        if let Some(conn) = self.connection.read().clone() {
            return Ok(conn);
        }

        debug!("Opening Redis connection");
        let conn = self
            .bounded(ConnectionManager::new(self.client.clone()))
            .await
            .map_err(|e| match e {
                StoreError::Command(msg) => StoreError::Connection(msg),
                other => other,
            })?;

        // Concurrent first callers may both connect; the last one is kept.
        *self.connection.write() = Some(conn.clone());
        info!("Redis connection established");
        Ok(conn)
    }
}

#[async_trait]
impl TransactionStore for RedisStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.connection().await?;
        let value: Option<String> = self.bounded(conn.get(key)).await?;
        Ok(value)
    }

    async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.connection().await?;
        let pong: String = self
            .bounded(redis::cmd("PING").query_async(&mut conn))
            .await?;
        if pong.eq_ignore_ascii_case("PONG") {
            Ok(())
        } else {
            Err(StoreError::Command(format!("unexpected PING reply: {pong}")))
        }
    }

    async fn close(&self) -> StoreResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        if self.connection.write().take().is_some() {
            info!("Redis connection closed");
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
