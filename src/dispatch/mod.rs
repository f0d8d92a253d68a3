//! Core notification dispatch handler.
//!
//! The [`send_handler`] function serves `POST /send`: it parses the
//! inbound payload, selects the target channels
//! ([`selector`]), fans the message out to each of them concurrently
//! ([`fanout`]), and reduces the per-channel outcomes into one of the
//! three response shapes ([`aggregate`]). Per-channel text transforms
//! live in [`formatter`].

pub mod aggregate;
pub mod fanout;
pub mod formatter;
pub mod selector;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use crate::server::AppState;

use aggregate::DispatchStatus;

/// Extract the text to deliver from the inbound payload.
///
/// A `message` string field is used verbatim. Anything else falls back
/// to a textual dump of the whole body behind an "Unknown message"
/// marker, so malformed senders still produce a visible notification.
#[must_use]
pub fn build_message(data: &Value) -> String {
    match data.get("message").and_then(Value::as_str) {
        Some(message) => message.to_string(),
        None => format!("Unknown message:\n{data}"),
    }
}

/// Extract the requested routing tags, ignoring non-string entries.
#[must_use]
pub fn extract_tags(data: &Value) -> Vec<String> {
    data.get("tags")
        .and_then(Value::as_array)
        .map(|tags| {
            tags.iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

pub async fn send_handler(
    State(state): State<Arc<AppState>>,
    req_headers: HeaderMap,
    body: Bytes,
) -> Response {
    let dispatch_id = req_headers
        .get("x-correlation-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| uuid::Uuid::new_v4().to_string(), String::from);

    // Lenient body handling: a missing or unparseable body still produces
    // an "Unknown message" dispatch rather than a 4xx.
    let data: Value =
        serde_json::from_slice(&body).unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

    let message = build_message(&data);
    let tags = extract_tags(&data);

    let targets = selector::select(&state.config.config, &tags);

    if targets.is_empty() {
        if tags.is_empty() {
            tracing::error!(
                dispatch_id = %dispatch_id,
                "no default channels configured, nothing to dispatch"
            );
        } else {
            tracing::error!(
                dispatch_id = %dispatch_id,
                tags = ?tags,
                "no channel matches the requested tags"
            );
        }
    } else {
        tracing::info!(
            dispatch_id = %dispatch_id,
            channels = targets.len(),
            tagged = !tags.is_empty(),
            "dispatching notification"
        );
    }

    let outcomes = fanout::fan_out(
        Arc::clone(&state.sender),
        &targets,
        &message,
        &dispatch_id,
    )
    .await;
    let summary = aggregate::aggregate(&outcomes);

    match summary.status {
        DispatchStatus::Success => {
            state.stats.dispatched.fetch_add(1, Ordering::Relaxed);
            (
                StatusCode::OK,
                Json(json!({"status": "success", "message": "Notification sent"})),
            )
                .into_response()
        }
        DispatchStatus::PartialSuccess => {
            state.stats.dispatched.fetch_add(1, Ordering::Relaxed);
            (
                StatusCode::OK,
                Json(json!({
                    "status": "partial_success",
                    "message": "Notification sent",
                    "success": summary.success,
                    "failed": summary.failed,
                })),
            )
                .into_response()
        }
        DispatchStatus::Error => {
            state.stats.failed.fetch_add(1, Ordering::Relaxed);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"status": "error", "message": "Notification failed"})),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_field_is_used_verbatim() {
        let data = json!({"message": "deploy done", "tags": ["infra"]});
        assert_eq!(build_message(&data), "deploy done");
    }

    #[test]
    fn missing_message_falls_back_to_body_dump() {
        let data = json!({"event": "push"});
        let message = build_message(&data);
        assert!(message.starts_with("Unknown message:\n"));
        assert!(message.contains("push"));
    }

    #[test]
    fn non_string_message_falls_back_to_body_dump() {
        let data = json!({"message": 42});
        assert!(build_message(&data).starts_with("Unknown message:\n"));
    }

    #[test]
    fn tags_are_extracted_as_strings() {
        let data = json!({"tags": ["Infra", "security"]});
        assert_eq!(extract_tags(&data), vec!["Infra", "security"]);
    }

    #[test]
    fn absent_or_bad_tags_yield_empty() {
        assert!(extract_tags(&json!({})).is_empty());
        assert!(extract_tags(&json!({"tags": "infra"})).is_empty());
        assert_eq!(extract_tags(&json!({"tags": ["ok", 1, null]})), vec!["ok"]);
    }
}
