//! Payment Status HTTP Server
//!
//! Answers payment UI polling with the status of a transaction previously
//! written to Redis by the payment processor.
//!
//! # Endpoints
//!
//! - `POST /api/payment/v2/{site}/{id}` - Transaction status envelope
//! - `GET /health` - Redis ping with latency
//! - `GET /metrics` - Prometheus metrics
//!
//! # Configuration
//!
//! See [`config`]. The usual knobs are `REDIS_URL`, `PORT` and `APP_ENV`.
//!
//! # Example
//!
//! ```bash
//! REDIS_URL=redis://localhost:6379 PORT=3000 ./server
//!
//! curl -X POST http://localhost:3000/api/payment/v2/site-a/tx1
//! # {"status":true,"message":"","data":{"status":"pending","amount":0}}
//! ```

mod config;
mod handlers;
mod routes;
mod types;

use config::{load_config, ServerConfig};
use handlers::AppState;
use payment_status::metrics::LookupMetrics;
use payment_status::services::{wait_until_ready, ShutdownController, ShutdownReason};
use payment_status::store::{RedisStore, TransactionStore};
use payment_status::ResolverBuilder;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

// =============================================================================
// Logging
// =============================================================================

/// Human-readable output in development, JSON lines elsewhere
fn init_tracing(development: bool) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new("payment_status=info,server=info,tower_http=info")
    })?;

    if development {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt()
            .json()
            .with_current_span(true)
            .with_env_filter(filter)
            .init();
    }
    Ok(())
}

// =============================================================================
// Shutdown
// =============================================================================

fn on_signal(shutdown: &ShutdownController, reason: ShutdownReason) {
    if !shutdown.trigger(reason) {
        warn!(%reason, "Shutdown already in progress, ignoring signal");
    }
}

/// Forward SIGINT/SIGTERM to the controller for the life of the process
#[cfg(unix)]
async fn listen_for_signals(shutdown: ShutdownController) {
    use signal::unix::{signal as unix_signal, SignalKind};

    let mut terminate = match unix_signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(e) => {
            error!(error = %e, "Failed to install SIGTERM handler");
            return;
        }
    };

    loop {
        let reason = tokio::select! {
            result = signal::ctrl_c() => match result {
                Ok(()) => ShutdownReason::Interrupt,
                Err(e) => {
                    error!(error = %e, "Failed to listen for Ctrl+C");
                    return;
                }
            },
            received = terminate.recv() => match received {
                Some(()) => ShutdownReason::Terminate,
                None => return,
            },
        };
        on_signal(&shutdown, reason);
    }
}

#[cfg(not(unix))]
async fn listen_for_signals(shutdown: ShutdownController) {
    loop {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            return;
        }
        on_signal(&shutdown, ShutdownReason::Interrupt);
    }
}

/// A panic anywhere starts the same drain as a termination signal
fn install_panic_hook(shutdown: ShutdownController) {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        error!(panic = %info, "Unhandled panic");
        shutdown.trigger(ShutdownReason::Panic);
        default_hook(info);
    }));
}

/// How the HTTP server stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stopped {
    /// Every in-flight request finished
    Drained,
    /// The server or its task failed
    Failed,
    /// The grace period ran out and the server was aborted
    Aborted,
}

impl Stopped {
    fn exit_code(self) -> ExitCode {
        match self {
            Stopped::Drained => ExitCode::SUCCESS,
            Stopped::Failed | Stopped::Aborted => ExitCode::FAILURE,
        }
    }
}

type ServerTask = JoinHandle<std::io::Result<()>>;

fn server_result(result: Result<std::io::Result<()>, JoinError>) -> Stopped {
    match result {
        Ok(Ok(())) => Stopped::Drained,
        Ok(Err(e)) => {
            error!(error = %e, "HTTP server failed");
            Stopped::Failed
        }
        Err(e) => {
            error!(error = %e, "HTTP server task failed");
            Stopped::Failed
        }
    }
}

/// Wait for the server to stop, bounding the drain by `grace` once shutdown
/// starts, then close the store.
///
/// A panic drains like a termination signal and exits 0 when the drain
/// completes.
async fn supervise(
    mut server: ServerTask,
    shutdown: &ShutdownController,
    grace: Duration,
    store: &dyn TransactionStore,
) -> Stopped {
    let stopped = tokio::select! {
        biased;

        reason = shutdown.triggered() => {
            info!(%reason, grace_secs = grace.as_secs(), "Draining in-flight requests");
            match tokio::time::timeout(grace, &mut server).await {
                Ok(result) => server_result(result),
                Err(_) => {
                    error!("Grace period elapsed, forcing shutdown");
                    server.abort();
                    Stopped::Aborted
                }
            }
        }
        // only reachable if the server stops on its own
        result = &mut server => server_result(result),
    };

    if stopped == Stopped::Drained {
        info!("All requests drained");
    }
    if let Err(e) = store.close().await {
        warn!(error = %e, "Failed to close store connection");
    }
    stopped
}

// =============================================================================
// Main Entry Point
// =============================================================================

async fn build_state(
    config: &ServerConfig,
    shutdown: ShutdownController,
) -> Result<(Arc<AppState>, Arc<dyn TransactionStore>), Box<dyn std::error::Error>> {
    let store: Arc<dyn TransactionStore> =
        Arc::new(RedisStore::open(&config.redis_url, config.store_timeout())?);
    let metrics = Arc::new(LookupMetrics::new()?);

    let resolver = ResolverBuilder::new()
        .with_shared_store(store.clone())
        .with_metrics(metrics.clone())
        .build()?;

    let state = Arc::new(AppState {
        resolver,
        store: store.clone(),
        metrics,
        shutdown,
    });
    Ok((state, store))
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    // the log format is fixed before the config file is read
    let development = std::env::var("APP_ENV")
        .map(|label| config::is_development(&label))
        .unwrap_or(false);
    init_tracing(development)?;

    info!("Payment status server starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = load_config();
    info!(
        environment = %config.environment,
        development = config.is_development(),
        "Listen address: {}",
        config.listen_addr()
    );

    let shutdown = ShutdownController::new();
    let (state, store) = build_state(&config, shutdown.clone()).await?;

    // Do not accept traffic until the store answers
    if let Err(e) = wait_until_ready(store.as_ref(), &config.readiness()).await {
        error!(error = %e, "Store unreachable, aborting startup");
        return Ok(ExitCode::FAILURE);
    }

    install_panic_hook(shutdown.clone());
    tokio::spawn(listen_for_signals(shutdown.clone()));

    let app = routes::build_router(state, routes::cors_layer(&config.cors_allowed_origins));
    let listener = tokio::net::TcpListener::bind(config.listen_addr()).await?;
    info!("Starting HTTP server on {}", config.listen_addr());

    let drain = {
        let shutdown = shutdown.clone();
        async move {
            shutdown.triggered().await;
        }
    };
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(drain)
            .await
    });

    let stopped = supervise(server, &shutdown, config.shutdown_grace(), store.as_ref()).await;
    info!(?stopped, "Server shutdown complete");
    Ok(stopped.exit_code())
}
