//! Startup verification of the delivery mechanism.
//!
//! Runs once at process start, before the HTTP listener binds: first a
//! capability probe of the sender binary, then a dry-run validation of
//! every configured channel URL, fail-fast on the first invalid one.
//! Any failure here is fatal; there is no degraded mode.

use crate::config::model::Config;
use crate::config::validation::redact_url;
use crate::error::HeraldError;
use crate::sender::DeliverySender;

pub async fn verify_startup(
    sender: &dyn DeliverySender,
    binary: &str,
    config: &Config,
) -> Result<(), HeraldError> {
    sender
        .probe()
        .await
        .map_err(|e| HeraldError::SenderUnavailable {
            binary: binary.to_string(),
            detail: e.to_string(),
        })?;
    tracing::debug!(binary = %binary, "sender binary probe succeeded");

    for (name, channel) in &config.channels {
        tracing::debug!(
            channel = %name,
            target = %redact_url(&channel.url),
            "verifying delivery URL"
        );
        sender
            .verify(&channel.url)
            .await
            .map_err(|e| HeraldError::ChannelVerification {
                channel: name.clone(),
                detail: e.to_string(),
            })?;
        tracing::info!(channel = %name, "delivery URL verified");
    }

    Ok(())
}
