//! Timestamp stream endpoint
//!
//! `GET /test` answers immediately with a streamed `text/plain` body. The
//! lines are produced by an emission task spawned for this request only.

use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::emitter::sink::{self, DEFAULT_SINK_CAPACITY};
use crate::error::Result;
use crate::AppState;

/// GET /test
///
/// Never waits for the emission task. A scheduling failure is returned
/// before any response is started.
pub async fn stream_timestamps(State(state): State<AppState>) -> Result<Response> {
    let (sink, body) = sink::channel(DEFAULT_SINK_CAPACITY);
    let handle = state.spawner.spawn(sink)?;
    debug!(stream = %handle.id(), "timestamp stream accepted");

    Ok((
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            ),
            (header::CACHE_CONTROL, HeaderValue::from_static("no-cache")),
            (
                HeaderName::from_static("x-accel-buffering"),
                HeaderValue::from_static("no"),
            ),
        ],
        body,
    )
        .into_response())
}
