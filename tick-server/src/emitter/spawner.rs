//! Task spawner: the execution substrate for emission tasks
//!
//! Every accepted stream becomes one tokio task tracked by a [`TaskTracker`].
//! Callers only get a [`StreamHandle`] back, which can cancel the task but
//! never yields its result.

use super::sink::OutputSink;
use super::task::EmissionTask;
use crate::config::EmitterSettings;
use crate::error::{Error, Result};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

/// Cancellation handle for one running stream
#[derive(Debug, Clone)]
pub struct StreamHandle {
    id: Uuid,
    cancel: CancellationToken,
}

impl StreamHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Interrupt the stream; it completes its sink and exits
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

/// Spawns and tracks emission tasks
#[derive(Debug)]
pub struct TaskSpawner {
    settings: EmitterSettings,
    tracker: TaskTracker,
    shutdown: CancellationToken,
    permits: Option<Arc<Semaphore>>,
}

impl TaskSpawner {
    pub fn new(settings: EmitterSettings) -> Self {
        Self {
            settings,
            tracker: TaskTracker::new(),
            shutdown: CancellationToken::new(),
            permits: settings.max_streams.map(|n| Arc::new(Semaphore::new(n))),
        }
    }

    /// Submit a new emission task bound to `sink`.
    ///
    /// Returns as soon as the task is scheduled; the task performs its first
    /// write later, on its own. Fails with [`Error::Scheduling`] when the
    /// spawner is shut down or the stream limit is reached.
    pub fn spawn<S: OutputSink>(&self, sink: S) -> Result<StreamHandle> {
        if self.tracker.is_closed() {
            return Err(Error::Scheduling("server is shutting down".to_string()));
        }

        let permit = match &self.permits {
            Some(permits) => Some(Arc::clone(permits).try_acquire_owned().map_err(|_| {
                Error::Scheduling(format!(
                    "stream limit of {} reached",
                    self.settings.max_streams.unwrap_or_default()
                ))
            })?),
            None => None,
        };

        let id = Uuid::new_v4();
        let cancel = self.shutdown.child_token();
        let deadline = self
            .settings
            .stream_timeout
            .map(|timeout| tokio::time::Instant::now() + timeout);
        let task = EmissionTask::new(sink, self.settings.interval, cancel.clone())
            .with_deadline(deadline);

        self.tracker.spawn(
            async move {
                let _permit = permit;
                let summary = task.run().await;
                debug!(reason = %summary.reason, lines = summary.lines, "stream closed");
            }
            .instrument(info_span!("stream", %id)),
        );
        debug!(stream = %id, active = self.tracker.len(), "stream scheduled");

        Ok(StreamHandle { id, cancel })
    }

    /// Number of emission tasks that have not yet exited
    pub fn active_streams(&self) -> usize {
        self.tracker.len()
    }

    pub fn is_shut_down(&self) -> bool {
        self.tracker.is_closed()
    }

    /// Refuse new streams and cancel the live ones without waiting
    pub fn cancel_all(&self) {
        if !self.tracker.close() {
            return;
        }
        info!("Cancelling {} live stream(s)", self.tracker.len());
        self.shutdown.cancel();
    }

    /// Refuse new streams, cancel the live ones and wait for them to exit
    pub async fn shutdown(&self) {
        self.cancel_all();
        self.tracker.wait().await;
    }
}

impl Default for TaskSpawner {
    fn default() -> Self {
        Self::new(EmitterSettings::default())
    }
}
