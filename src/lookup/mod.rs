//! Transaction lookup
//!
//! ```text
//! (site, id) ──▶ LookupResolver ──▶ LookupOutcome ──▶ StatusEnvelope
//!                     │                                   ▲
//!                     ▼                                   │
//!              KeyPattern order                  normalize_status
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use payment_status::lookup::ResolverBuilder;
//! use payment_status::store::MemoryStore;
//!
//! let resolver = ResolverBuilder::new()
//!     .with_store(Arc::new(MemoryStore::new()))
//!     .build()?;
//!
//! let envelope = resolver.resolve("site-a", "tx1").await.into_envelope();
//! ```

mod builder;
mod keys;
mod resolver;
mod status;

pub use builder::ResolverBuilder;
pub use keys::{KeyPattern, TransactionType, COMPAY, DEFAULT_KEY_PATTERNS, NAMESPACE};
pub use resolver::LookupResolver;
pub use status::{normalize_status, PENDING};
