//! Process Lifecycle Services
//!
//! ```text
//! startup ──▶ wait_until_ready ──▶ serve ──▶ ShutdownController ──▶ drain ──▶ close store
//!                  │                 │              ▲
//!                  ▼                 ▼              │
//!             check_store ◀──── GET /health    signals / panic hook
//! ```
//!
//! # Services
//!
//! - **Health**: single store ping with latency, plus the startup readiness
//!   retry loop built on it
//! - **Shutdown**: idempotent trigger shared by the HTTP layer, the signal
//!   listener and the panic hook

pub mod health;
pub mod shutdown;

pub use health::{check_store, wait_until_ready, CheckResult, ReadinessConfig};
pub use shutdown::{ShutdownController, ShutdownReason};
