//! Integration tests for the HTTP server: the dispatch endpoint response
//! shapes, API-key middleware, the health endpoint, and graceful shutdown.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Instant;

use async_trait::async_trait;

use herald::config::model::{Channel, Config};
use herald::config::ConfigVersion;
use herald::health::HealthResponse;
use herald::sender::{DeliverySender, SendError};
use herald::server::{self, AppState, LoadedConfig, Stats};

struct FakeSender {
    failing_urls: HashSet<String>,
    messages: Mutex<Vec<String>>,
}

#[async_trait]
impl DeliverySender for FakeSender {
    async fn probe(&self) -> Result<(), SendError> {
        Ok(())
    }

    async fn verify(&self, _url: &str) -> Result<(), SendError> {
        Ok(())
    }

    async fn send(&self, url: &str, message: &str) -> Result<(), SendError> {
        self.messages.lock().unwrap().push(message.to_string());
        if self.failing_urls.contains(url) {
            Err(SendError::NonZeroExit {
                code: 1,
                stderr: "delivery refused".into(),
            })
        } else {
            Ok(())
        }
    }
}

fn test_config() -> Config {
    let mut config = Config::default();
    config.channels.insert(
        "ops".into(),
        Channel {
            url: "x://ops".into(),
            is_default: true,
            tags: vec![],
        },
    );
    config.channels.insert(
        "sec".into(),
        Channel {
            url: "x://sec".into(),
            is_default: false,
            tags: vec!["security".into()],
        },
    );
    config.channels.insert(
        "flaky".into(),
        Channel {
            url: "x://flaky".into(),
            is_default: false,
            tags: vec!["flaky".into()],
        },
    );
    config
}

async fn start_test_server(
    failing_urls: &[&str],
    api_key: Option<&str>,
) -> (
    SocketAddr,
    Arc<FakeSender>,
    tokio::sync::oneshot::Sender<()>,
) {
    let sender = Arc::new(FakeSender {
        failing_urls: failing_urls.iter().map(|s| (*s).to_string()).collect(),
        messages: Mutex::new(Vec::new()),
    });

    let state = Arc::new(AppState {
        config: LoadedConfig {
            config: Arc::new(test_config()),
            version: ConfigVersion::Hash("test-hash".into()),
            source_path: "test".into(),
            loaded_at: Instant::now(),
        },
        sender: sender.clone() as Arc<dyn DeliverySender>,
        api_key: api_key.map(String::from),
        start_time: Instant::now(),
        stats: Stats::new(),
    });

    let router = server::build_router(state, 1_048_576);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    (addr, sender, shutdown_tx)
}

#[tokio::test]
async fn untagged_send_succeeds_with_success_status() {
    let (addr, _, shutdown) = start_test_server(&[], None).await;

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/send"))
        .json(&serde_json::json!({"message": "deploy done"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Notification sent");

    let _ = shutdown.send(());
}

#[tokio::test]
async fn partial_failure_returns_counts() {
    let (addr, _, shutdown) = start_test_server(&["x://flaky"], None).await;

    // "security" and "flaky" tags select both tagged channels.
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/send"))
        .json(&serde_json::json!({"message": "breach", "tags": ["security", "flaky"]}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "partial_success");
    assert_eq!(body["success"], 1);
    assert_eq!(body["failed"], 1);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn unmatched_tags_return_500_error() {
    let (addr, sender, shutdown) = start_test_server(&[], None).await;

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/send"))
        .json(&serde_json::json!({"message": "hello", "tags": ["nosuch"]}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Notification failed");
    assert!(sender.messages.lock().unwrap().is_empty());

    let _ = shutdown.send(());
}

#[tokio::test]
async fn all_failed_deliveries_return_500_error() {
    let (addr, _, shutdown) = start_test_server(&["x://ops"], None).await;

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/send"))
        .json(&serde_json::json!({"message": "hello"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn body_without_message_field_is_dumped_with_marker() {
    let (addr, sender, shutdown) = start_test_server(&[], None).await;

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/send"))
        .json(&serde_json::json!({"event": "push", "repo": "herald"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let messages = sender.messages.lock().unwrap().clone();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("Unknown message:\n"));
    assert!(messages[0].contains("push"));

    let _ = shutdown.send(());
}

#[tokio::test]
async fn send_requires_api_key_when_configured() {
    let (addr, sender, shutdown) = start_test_server(&[], Some("s3cret")).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{addr}/send"))
        .json(&serde_json::json!({"message": "hello"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    assert!(sender.messages.lock().unwrap().is_empty());

    let resp = client
        .post(format!("http://{addr}/send"))
        .header("x-api-key", "s3cret")
        .json(&serde_json::json!({"message": "hello"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = client
        .post(format!("http://{addr}/send"))
        .header("authorization", "Bearer s3cret")
        .json(&serde_json::json!({"message": "hello"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn health_stays_open_with_api_key_configured() {
    let (addr, _, shutdown) = start_test_server(&[], Some("s3cret")).await;

    let resp = reqwest::get(format!("http://{addr}/health")).await.unwrap();
    assert_eq!(resp.status(), 200);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn health_endpoint_reports_channels_and_stats() {
    let (addr, _, shutdown) = start_test_server(&[], None).await;
    let client = reqwest::Client::new();

    let health: HealthResponse = reqwest::get(format!("http://{addr}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
    assert_eq!(health.config.source, "test");
    assert_eq!(health.config.channels, 3);
    assert_eq!(health.config.default_channels, 1);
    assert_eq!(health.stats.notifications_dispatched, 0);
    assert_eq!(health.stats.notifications_failed, 0);

    client
        .post(format!("http://{addr}/send"))
        .json(&serde_json::json!({"message": "hello"}))
        .send()
        .await
        .unwrap();

    let health: HealthResponse = reqwest::get(format!("http://{addr}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health.stats.notifications_dispatched, 1);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn graceful_shutdown_works() {
    let (addr, _, shutdown) = start_test_server(&[], None).await;

    let url = format!("http://{addr}/health");
    assert!(reqwest::get(&url).await.is_ok());

    let _ = shutdown.send(());

    // Give it a moment to shut down
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    let result = reqwest::get(&url).await;
    assert!(result.is_err());
}
