//! API-key authentication for the dispatch endpoint.
//!
//! When a key is configured (`--api-key` / `API_KEY`), requests must
//! carry it in `X-API-Key` or as `Authorization: Bearer <key>`. With no
//! key configured, all requests pass through.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::server::AppState;

pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(ref expected) = state.api_key else {
        return next.run(request).await;
    };

    let provided = request
        .headers()
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .or_else(|| {
            request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
        });

    match provided {
        Some(key) if key == expected => next.run(request).await,
        _ => {
            tracing::warn!(path = %request.uri().path(), "rejected request with missing or invalid API key");
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({"status": "error", "message": "Unauthorized"})),
            )
                .into_response()
        }
    }
}
