//! tick-server - live timestamp streaming endpoint
//!
//! Serves `GET /test`: a streamed body of local timestamp lines, one every
//! interval, until the client disconnects or the server shuts down.

use std::net::IpAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tick_server::{AppState, ServerConfig};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for tick-server
#[derive(Parser, Debug)]
#[command(name = "tick-server")]
#[command(about = "Streams a local timestamp line every interval over HTTP")]
#[command(version)]
struct Args {
    /// Bootstrap TOML configuration file
    #[arg(short, long, env = "TICK_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind to
    #[arg(short, long, env = "TICK_BIND")]
    bind: Option<IpAddr>,

    /// Port to listen on
    #[arg(short, long, env = "TICK_PORT")]
    port: Option<u16>,

    /// Milliseconds between emitted lines
    #[arg(long, env = "TICK_INTERVAL_MS")]
    interval_ms: Option<u64>,

    /// Maximum concurrently live streams
    #[arg(long, env = "TICK_MAX_STREAMS")]
    max_streams: Option<usize>,

    /// Maximum lifetime of one stream in milliseconds
    #[arg(long, env = "TICK_STREAM_TIMEOUT_MS")]
    stream_timeout_ms: Option<u64>,
}

impl Args {
    /// Command-line values override the configuration file
    fn apply(&self, config: &mut ServerConfig) {
        if let Some(bind) = self.bind {
            config.bind_addr = bind;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(interval_ms) = self.interval_ms {
            config.interval_ms = interval_ms;
        }
        if self.max_streams.is_some() {
            config.max_streams = self.max_streams;
        }
        if self.stream_timeout_ms.is_some() {
            config.stream_timeout_ms = self.stream_timeout_ms;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let source = ServerConfig::resolve_source(args.config.as_deref())
        .context("Failed to locate configuration")?;
    let mut config =
        ServerConfig::from_source(source.as_deref()).context("Failed to load configuration")?;
    args.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("tick_server={0},tower_http={0}", config.logging.level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting tick-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &source {
        Some(path) => info!("Configuration loaded from {}", path.display()),
        None => info!("No configuration file found, using built-in defaults"),
    }
    info!(
        "Emitting every {}ms, max streams: {}, stream timeout: {}",
        config.interval_ms,
        config
            .max_streams
            .map_or_else(|| "unlimited".to_string(), |n| n.to_string()),
        config
            .stream_timeout_ms
            .map_or_else(|| "none".to_string(), |ms| format!("{}ms", ms)),
    );

    let state = AppState::new(config.emitter_settings());

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("tick-server listening on http://{}", addr);
    info!("Stream: http://{}/test", addr);

    tick_server::serve(listener, state, shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
