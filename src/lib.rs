//! Payment status lookup service
//!
//! Resolves a `(site, id)` pair to a transaction record previously written
//! to Redis by the payment processor and answers with a normalized
//! status/amount envelope. Misses and store failures answer `pending` so
//! polling clients never see a transient backend error.

pub mod error;
pub mod lookup;
pub mod metrics;
pub mod services;
pub mod store;
pub mod types;

pub use error::{Error, Result, StoreError};
pub use lookup::{LookupResolver, ResolverBuilder};
pub use types::{LookupOutcome, StatusData, StatusEnvelope, TransactionRecord};
