//! Axum server setup, shared application state, and graceful shutdown.
//!
//! Contains [`AppState`] (the `Arc`-shared state holding the immutable
//! channel config, the delivery sender, stats, and uptime),
//! [`build_router`] for constructing the Axum router with middleware
//! layers, and [`shutdown_signal`] for SIGTERM / Ctrl+C handling.
//!
//! Config is loaded once at startup and never reloaded, so it is shared
//! without locking across concurrent request tasks.

use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Instant;

use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::config::model::Config;
use crate::config::ConfigVersion;
use crate::dispatch;
use crate::health::health_handler;
use crate::middleware::require_api_key;
use crate::sender::DeliverySender;

#[derive(Debug)]
pub struct LoadedConfig {
    pub config: Arc<Config>,
    pub version: ConfigVersion,
    pub source_path: String,
    pub loaded_at: Instant,
}

#[derive(Debug)]
pub struct Stats {
    /// Requests where at least one channel succeeded.
    pub dispatched: AtomicU64,
    /// Requests where nothing was delivered.
    pub failed: AtomicU64,
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

impl Stats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            dispatched: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }
}

pub struct AppState {
    pub config: LoadedConfig,
    pub sender: Arc<dyn DeliverySender>,
    pub api_key: Option<String>,
    pub start_time: Instant,
    pub stats: Stats,
}

pub fn build_router(state: Arc<AppState>, max_body: usize) -> Router {
    // /health stays open; only the dispatch endpoint sits behind the key.
    let protected = Router::new()
        .route("/send", post(dispatch::send_handler))
        .route_layer(axum::middleware::from_fn_with_state(
            Arc::clone(&state),
            require_api_key,
        ));

    Router::new()
        .route("/health", get(health_handler))
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(max_body)),
        )
        .with_state(state)
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C"),
        () = terminate => tracing::info!("received SIGTERM"),
    }
}
