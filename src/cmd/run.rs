//! `herald run` — start the dispatch gateway.
//!
//! Loads the channel configuration, verifies the sender binary and
//! every channel URL, then starts the Axum HTTP server with graceful
//! shutdown. Any startup failure is fatal before the listener binds;
//! there is no degraded mode.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::cli::RunArgs;
use crate::config;
use crate::error::HeraldError;
use crate::logging;
use crate::sender::{DeliverySender, ShoutrrrSender};
use crate::server::{self, AppState, LoadedConfig, Stats};
use crate::verify::verify_startup;

pub async fn execute(args: RunArgs) -> Result<(), HeraldError> {
    let log_format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.log_level, log_format);

    #[cfg(feature = "sentry-integration")]
    let _sentry_guard = args
        .sentry_dsn
        .as_ref()
        .map(|dsn| crate::sentry_integration::init(dsn, args.sentry_environment.as_deref()));

    let config_path = resolve_config_path(args.config.clone()).await?;
    let (channel_config, version) = config::load_file(&config_path).await?;

    let channel_count = channel_config.channel_count();
    let default_count = channel_config.default_channel_count();

    let sender: Arc<dyn DeliverySender> = Arc::new(ShoutrrrSender::new(
        args.sender_binary.clone(),
        Duration::from_millis(args.send_timeout),
    ));

    verify_startup(&*sender, &args.sender_binary, &channel_config).await?;

    let state = Arc::new(AppState {
        config: LoadedConfig {
            config: Arc::new(channel_config),
            version,
            source_path: config_path.display().to_string(),
            loaded_at: Instant::now(),
        },
        sender,
        api_key: args.api_key.clone(),
        start_time: Instant::now(),
        stats: Stats::new(),
    });

    let router = server::build_router(state, args.max_body);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;

    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        addr = %addr,
        channels = channel_count,
        default_channels = default_count,
        auth = args.api_key.is_some(),
        "herald started"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(server::shutdown_signal())
        .await?;

    tracing::info!("herald stopped");
    Ok(())
}

async fn resolve_config_path(explicit: Option<PathBuf>) -> Result<PathBuf, HeraldError> {
    if let Some(path) = explicit {
        return Ok(path);
    }

    // Auto-detect in current directory
    let candidates = ["herald.yaml", "herald.yml", "herald.json", "herald.toml"];

    for name in &candidates {
        let path = PathBuf::from(name);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::info!(path = %path.display(), "auto-detected config file");
            return Ok(path);
        }
    }

    Err(HeraldError::NoConfigSource {
        hint: "Provide --config <file> or set CONFIG_PATH.\n  \
               Run 'herald init' to create a config file."
            .into(),
    })
}
