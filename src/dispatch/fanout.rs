//! Concurrent fan-out of one message to all selected channels.
//!
//! Spawns one delivery task per channel and joins them in selection
//! order, so the outcome list always has exactly one entry per selected
//! channel. A failed, timed-out, or panicked delivery is captured into
//! that channel's outcome and never aborts the siblings.

use std::sync::Arc;
use std::time::Instant;

use crate::config::model::Channel;
use crate::config::validation::redact_url;
use crate::sender::DeliverySender;

use super::formatter;

/// Result of attempting delivery to one channel.
#[derive(Debug, Clone)]
pub struct DeliveryOutcome {
    pub channel: String,
    pub url: String,
    pub success: bool,
}

#[allow(clippy::cast_possible_truncation)]
pub async fn fan_out(
    sender: Arc<dyn DeliverySender>,
    targets: &[(&str, &Channel)],
    message: &str,
    dispatch_id: &str,
) -> Vec<DeliveryOutcome> {
    let mut handles = Vec::with_capacity(targets.len());

    for (name, channel) in targets {
        let text = formatter::format_message(message, channel).into_owned();
        let name = (*name).to_string();
        let url = channel.url.clone();
        let sender = Arc::clone(&sender);
        let dispatch_id = dispatch_id.to_string();

        handles.push(tokio::spawn(async move {
            let start = Instant::now();
            let result = sender.send(&url, &text).await;
            let latency_ms = start.elapsed().as_millis() as u64;

            match result {
                Ok(()) => {
                    tracing::info!(
                        dispatch_id = %dispatch_id,
                        channel = %name,
                        target = %redact_url(&url),
                        latency_ms,
                        "notification delivered"
                    );
                    DeliveryOutcome {
                        channel: name,
                        url,
                        success: true,
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        dispatch_id = %dispatch_id,
                        channel = %name,
                        target = %redact_url(&url),
                        latency_ms,
                        error = %e,
                        "notification delivery failed"
                    );
                    DeliveryOutcome {
                        channel: name,
                        url,
                        success: false,
                    }
                }
            }
        }));
    }

    let mut outcomes = Vec::with_capacity(handles.len());
    for ((name, channel), handle) in targets.iter().zip(handles) {
        match handle.await {
            Ok(outcome) => outcomes.push(outcome),
            Err(join_err) => {
                tracing::error!(
                    dispatch_id = %dispatch_id,
                    channel = %name,
                    error = %join_err,
                    "delivery task panicked"
                );
                outcomes.push(DeliveryOutcome {
                    channel: (*name).to_string(),
                    url: channel.url.clone(),
                    success: false,
                });
            }
        }
    }

    outcomes
}
