//! `GET /health` endpoint handler.
//!
//! Returns a [`HealthResponse`] JSON payload containing the server
//! version, uptime, config source metadata, channel counts, and
//! cumulative dispatch statistics.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::server::AppState;

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub config: ConfigHealth,
    pub stats: StatsResponse,
}

#[derive(Serialize, Deserialize)]
pub struct ConfigHealth {
    pub source: String,
    pub version: String,
    pub loaded_ago_seconds: u64,
    pub channels: usize,
    pub default_channels: usize,
}

#[derive(Serialize, Deserialize)]
pub struct StatsResponse {
    pub notifications_dispatched: u64,
    pub notifications_failed: u64,
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let loaded = &state.config;
    let version_str = match &loaded.version {
        crate::config::ConfigVersion::Hash(h) => h.get(..8).unwrap_or(h).to_string(),
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        config: ConfigHealth {
            source: loaded.source_path.clone(),
            version: version_str,
            loaded_ago_seconds: loaded.loaded_at.elapsed().as_secs(),
            channels: loaded.config.channel_count(),
            default_channels: loaded.config.default_channel_count(),
        },
        stats: StatsResponse {
            notifications_dispatched: state.stats.dispatched.load(Ordering::Relaxed),
            notifications_failed: state.stats.failed.load(Ordering::Relaxed),
        },
    })
}
