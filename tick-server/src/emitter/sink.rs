//! Output sinks for emission tasks
//!
//! An [`OutputSink`] is the write side of one client's response body. It is
//! owned by exactly one emission task and completed exactly once.

use axum::body::{Body, Bytes};
use futures::StreamExt;
use std::convert::Infallible;
use std::future::Future;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::trace;

/// Chunks buffered between the emission task and the HTTP body
pub const DEFAULT_SINK_CAPACITY: usize = 16;

/// Write failures reported by a sink
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkError {
    /// The consuming side (HTTP body, network peer) is gone
    #[error("sink consumer disconnected")]
    Disconnected,

    /// The sink was already completed by its owner
    #[error("sink already completed")]
    Completed,
}

/// Write handle for one client's streaming response
pub trait OutputSink: Send + Sync + 'static {
    /// Append one chunk, in order, after every previously written chunk.
    fn write(&mut self, chunk: Bytes) -> impl Future<Output = Result<(), SinkError>> + Send;

    /// Resolves once the consuming side has gone away (or the sink is completed).
    fn closed(&self) -> impl Future<Output = ()> + Send;

    /// Terminal action. Idempotent: only the first call has an effect.
    fn complete(&mut self);

    /// Whether `complete` has not yet been called
    fn is_open(&self) -> bool;
}

/// Sink backed by a bounded channel whose receiving half is an HTTP body
#[derive(Debug)]
pub struct ChannelSink {
    tx: Option<mpsc::Sender<Bytes>>,
}

/// Create a sink and the streaming body it feeds
pub fn channel(capacity: usize) -> (ChannelSink, Body) {
    let (tx, rx) = mpsc::channel::<Bytes>(capacity);
    let stream = ReceiverStream::new(rx).map(Ok::<_, Infallible>);
    (ChannelSink { tx: Some(tx) }, Body::from_stream(stream))
}

impl OutputSink for ChannelSink {
    async fn write(&mut self, chunk: Bytes) -> Result<(), SinkError> {
        let tx = self.tx.as_ref().ok_or(SinkError::Completed)?;
        tx.send(chunk).await.map_err(|_| SinkError::Disconnected)
    }

    async fn closed(&self) {
        if let Some(tx) = &self.tx {
            tx.closed().await;
        }
    }

    fn complete(&mut self) {
        // Dropping the sender ends the body stream; hyper then writes the
        // terminating chunk if the connection is still up.
        if self.tx.take().is_some() {
            trace!("sink completed");
        }
    }

    fn is_open(&self) -> bool {
        self.tx.is_some()
    }
}

impl Drop for ChannelSink {
    fn drop(&mut self) {
        self.complete();
    }
}
