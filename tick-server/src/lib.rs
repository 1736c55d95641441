//! # tick-server library
//!
//! Live timestamp streaming over HTTP. Each `GET /test` request gets its own
//! emission task that writes one local timestamp line every interval until
//! the client goes away or the server stops.

use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod api;
pub mod config;
pub mod emitter;
pub mod error;

pub use config::{EmitterSettings, ServerConfig};
pub use emitter::TaskSpawner;
pub use error::{Error, Result};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Spawner owning every live emission task
    pub spawner: Arc<TaskSpawner>,
}

impl AppState {
    /// Create new application state
    pub fn new(settings: EmitterSettings) -> Self {
        Self {
            spawner: Arc::new(TaskSpawner::new(settings)),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/test", get(api::stream_timestamps))
        .route("/build_info", get(api::get_build_info))
        .merge(api::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Serve until `shutdown` resolves, then cancel live streams and wait for
/// every emission task to complete its sink.
///
/// Streams never end on their own, so they are cancelled as soon as the
/// signal arrives; otherwise graceful shutdown would wait on them forever.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let spawner = Arc::clone(&state.spawner);
    let app = build_router(state);

    let signal_spawner = Arc::clone(&spawner);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            signal_spawner.cancel_all();
        })
        .await
        .map_err(|e| Error::Http(e.to_string()))?;

    spawner.shutdown().await;
    info!("All streams closed");
    Ok(())
}
