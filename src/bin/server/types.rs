//! HTTP response types that are not part of the library envelope

use serde::Serialize;

/// `GET /health` body
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum HealthResponse {
    /// Store answered the ping
    Healthy {
        status: &'static str,
        redis: &'static str,
        latency_ms: u64,
        timestamp: String,
    },
    /// Store ping failed
    Unhealthy {
        status: &'static str,
        redis: &'static str,
        error: String,
        timestamp: String,
    },
}

impl HealthResponse {
    pub fn healthy(latency_ms: u64) -> Self {
        HealthResponse::Healthy {
            status: "healthy",
            redis: "connected",
            latency_ms,
            timestamp: now_iso8601(),
        }
    }

    pub fn unhealthy(error: impl Into<String>) -> Self {
        HealthResponse::Unhealthy {
            status: "unhealthy",
            redis: "disconnected",
            error: error.into(),
            timestamp: now_iso8601(),
        }
    }
}

/// Body returned while the server drains
#[derive(Debug, Serialize)]
pub struct ShuttingDownResponse {
    pub status: bool,
    pub message: &'static str,
}

impl Default for ShuttingDownResponse {
    fn default() -> Self {
        Self {
            status: false,
            message: "Server is shutting down",
        }
    }
}

fn now_iso8601() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
