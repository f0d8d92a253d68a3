//! The delivery port: how Herald talks to the external sender binary.
//!
//! [`DeliverySender`] is the narrow interface the dispatcher and the
//! startup verifier depend on, so routing logic stays unit-testable with
//! a scripted fake. [`ShoutrrrSender`] is the production implementation:
//! it shells out to a shoutrrr-compatible binary with a fixed CLI
//! contract (`send --url <url> --message <text>`, `verify --url <url>`)
//! and a bounded per-invocation timeout.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SendError {
    #[error("failed to run '{binary}': {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("exited with code {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Abstraction over the external delivery mechanism.
///
/// `async_trait` is required because the sender is held as
/// `Arc<dyn DeliverySender>` and native async fn in traits does not
/// support dyn dispatch.
#[async_trait]
pub trait DeliverySender: Send + Sync {
    /// Capability probe: is the delivery mechanism usable at all?
    async fn probe(&self) -> Result<(), SendError>;

    /// Dry-run validation of one delivery URL.
    async fn verify(&self, url: &str) -> Result<(), SendError>;

    /// Deliver one message to one URL.
    async fn send(&self, url: &str, message: &str) -> Result<(), SendError>;
}

/// Subprocess-backed sender invoking a shoutrrr-compatible binary.
pub struct ShoutrrrSender {
    binary: String,
    timeout: Duration,
}

impl ShoutrrrSender {
    #[must_use]
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    #[must_use]
    pub fn binary(&self) -> &str {
        &self.binary
    }

    async fn run(&self, args: &[&str]) -> Result<(), SendError> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // The child is killed when the timeout drops the output future.
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| SendError::Timeout(self.timeout))?
            .map_err(|e| SendError::Spawn {
                binary: self.binary.clone(),
                source: e,
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(SendError::NonZeroExit {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

#[async_trait]
impl DeliverySender for ShoutrrrSender {
    async fn probe(&self) -> Result<(), SendError> {
        self.run(&["--help"]).await
    }

    async fn verify(&self, url: &str) -> Result<(), SendError> {
        self.run(&["verify", "--url", url]).await
    }

    async fn send(&self, url: &str, message: &str) -> Result<(), SendError> {
        self.run(&["send", "--url", url, "--message", message]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_binary_reports_spawn_error() {
        let sender = ShoutrrrSender::new(
            "/nonexistent/herald-test-binary",
            Duration::from_secs(1),
        );
        let err = sender.probe().await.unwrap_err();
        assert!(matches!(err, SendError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_reported_with_code() {
        let sender = ShoutrrrSender::new("false", Duration::from_secs(5));
        let err = sender.probe().await.unwrap_err();
        match err {
            SendError::NonZeroExit { code, .. } => assert_eq!(code, 1),
            other => panic!("expected NonZeroExit, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_invocation_times_out() {
        let sender = ShoutrrrSender::new("sleep", Duration::from_millis(50));
        let err = sender.run(&["5"]).await.unwrap_err();
        assert!(matches!(err, SendError::Timeout(_)));
    }
}
