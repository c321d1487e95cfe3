//! Server Configuration
//!
//! Sources, later ones overriding earlier ones:
//! 1. Built-in defaults
//! 2. TOML file at `PAYMENT_STATUS_CONFIG`, else `./payment-status.toml`
//! 3. `REDIS_URL`, `PORT` and `APP_ENV` environment variables

use payment_status::services::ReadinessConfig;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming the configuration file
pub const CONFIG_PATH_ENV: &str = "PAYMENT_STATUS_CONFIG";

/// Configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "payment-status.toml";

/// Server configuration loaded from TOML or environment
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Store connection URI
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Bind host
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Runtime environment label
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Per-command store timeout in milliseconds
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,

    /// Startup readiness probes before giving up
    #[serde(default = "default_readiness_attempts")]
    pub readiness_attempts: u32,

    /// Delay between readiness probes in milliseconds
    #[serde(default = "default_readiness_backoff_ms")]
    pub readiness_backoff_ms: u64,

    /// Time allowed for in-flight requests after a shutdown signal
    #[serde(default = "default_shutdown_grace_secs")]
    pub shutdown_grace_secs: u64,

    /// Allowed CORS origins; empty allows any origin
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_environment() -> String {
    "production".to_string()
}

fn default_store_timeout_ms() -> u64 {
    5_000
}

fn default_readiness_attempts() -> u32 {
    10
}

fn default_readiness_backoff_ms() -> u64 {
    1_000
}

fn default_shutdown_grace_secs() -> u64 {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            redis_url: default_redis_url(),
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            store_timeout_ms: default_store_timeout_ms(),
            readiness_attempts: default_readiness_attempts(),
            readiness_backoff_ms: default_readiness_backoff_ms(),
            shutdown_grace_secs: default_shutdown_grace_secs(),
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// `host:port` to bind
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Whether human-readable development logging is wanted
    pub fn is_development(&self) -> bool {
        is_development(&self.environment)
    }

    /// Per-command store timeout
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    /// Shutdown grace period
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }

    /// Startup readiness policy
    pub fn readiness(&self) -> ReadinessConfig {
        ReadinessConfig {
            max_attempts: self.readiness_attempts,
            backoff: Duration::from_millis(self.readiness_backoff_ms),
        }
    }

    /// Apply environment overrides. Values that do not parse are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("REDIS_URL").filter(|v| !v.is_empty()) {
            self.redis_url = url;
        }

        if let Some(port) = lookup("PORT").filter(|v| !v.is_empty()) {
            match port.parse() {
                Ok(port) => self.port = port,
                Err(e) => warn!(value = %port, error = %e, "Invalid PORT, keeping {}", self.port),
            }
        }

        if let Some(env) = lookup("APP_ENV").filter(|v| !v.is_empty()) {
            self.environment = env;
        }
    }
}

/// Whether an environment label names a development setup
pub fn is_development(label: &str) -> bool {
    label.eq_ignore_ascii_case("development")
}

/// Parse a configuration file
fn read_config_file(path: &Path) -> Result<ServerConfig, String> {
    let content = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    toml::from_str(&content).map_err(|e| e.to_string())
}

/// Load configuration from file and environment
pub fn load_config() -> ServerConfig {
    let mut config = match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) => match read_config_file(Path::new(&path)) {
            Ok(config) => {
                info!(path = %path, "Loaded configuration from file");
                config
            }
            Err(e) => {
                warn!(path = %path, error = %e, "Failed to load config file, using defaults");
                ServerConfig::default()
            }
        },
        Err(_) => match read_config_file(Path::new(DEFAULT_CONFIG_FILE)) {
            Ok(config) => {
                info!("Loaded configuration from {}", DEFAULT_CONFIG_FILE);
                config
            }
            Err(_) => {
                info!("Using default configuration");
                ServerConfig::default()
            }
        },
    };

    config.apply_env(|key| std::env::var(key).ok());
    config
}
