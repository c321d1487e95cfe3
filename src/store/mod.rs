//! Key-value store abstraction
//!
//! The service only ever reads from the store. Records are owned by the
//! payment processor that writes them.
//!
//! # Implementations
//!
//! - [`RedisStore`]: multiplexed Redis connection with a per-command timeout
//! - [`MemoryStore`]: in-process map used by tests and local runs

mod memory;
mod redis_store;

pub use self::memory::MemoryStore;
pub use self::redis_store::RedisStore;

use async_trait::async_trait;

use crate::error::StoreResult;

/// Read-only access to the transaction store
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Read the raw value stored at `key`
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Round-trip health probe
    async fn ping(&self) -> StoreResult<()>;

    /// Release the underlying connection
    async fn close(&self) -> StoreResult<()> {
        Ok(())
    }

    /// Backend name for logs
    fn name(&self) -> &'static str;
}
