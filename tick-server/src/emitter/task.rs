//! Emission task: the per-connection timestamp loop
//!
//! Each task owns one [`OutputSink`]. While running it writes the current
//! local timestamp, then a line terminator as a separate write, then pauses
//! for the fixed interval. A write failure, consumer disconnect, cancellation
//! or deadline ends the loop; the sink is then completed exactly once.

use super::sink::{OutputSink, SinkError};
use axum::body::Bytes;
use std::fmt;
use std::time::Duration;
use tick_common::time::local_timestamp;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Written after every timestamp, as its own chunk
pub const LINE_TERMINATOR: &[u8] = b"\n";

/// Why an emission task left its running state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A write to the sink failed
    WriteFailed,
    /// The consumer went away while the task was paused
    Disconnected,
    /// The task or the whole server was cancelled
    Cancelled,
    /// The configured stream lifetime elapsed
    TimedOut,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StopReason::WriteFailed => "write_failed",
            StopReason::Disconnected => "disconnected",
            StopReason::Cancelled => "cancelled",
            StopReason::TimedOut => "timed_out",
        };
        f.write_str(s)
    }
}

impl From<SinkError> for StopReason {
    fn from(_: SinkError) -> Self {
        StopReason::WriteFailed
    }
}

/// Outcome of one finished task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmissionSummary {
    pub reason: StopReason,
    /// Complete lines (timestamp + terminator) written
    pub lines: u64,
}

/// Periodic timestamp writer bound to one sink
pub struct EmissionTask<S: OutputSink> {
    sink: S,
    interval: Duration,
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl<S: OutputSink> EmissionTask<S> {
    pub fn new(sink: S, interval: Duration, cancel: CancellationToken) -> Self {
        Self {
            sink,
            interval,
            cancel,
            deadline: None,
        }
    }

    /// Stop the task once `deadline` has passed
    pub fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Run until a termination condition, then complete the sink
    pub async fn run(mut self) -> EmissionSummary {
        let mut stop: Option<StopReason> = None;
        let mut lines = 0u64;

        while stop.is_none() {
            if let Err(reason) = self.emit_line().await {
                stop = Some(reason);
                continue;
            }
            lines += 1;
            stop = self.pause().await;
        }

        self.sink.complete();

        let reason = stop.unwrap_or(StopReason::Cancelled);
        debug!(%reason, lines, "emission stopped");
        EmissionSummary { reason, lines }
    }

    async fn emit_line(&mut self) -> Result<(), StopReason> {
        let stamp = local_timestamp();
        self.write(Bytes::from(stamp)).await?;
        self.write(Bytes::from_static(LINE_TERMINATOR)).await
    }

    async fn write(&mut self, chunk: Bytes) -> Result<(), StopReason> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(StopReason::Cancelled),
            result = self.sink.write(chunk) => result.map_err(StopReason::from),
        }
    }

    /// Interruptible pause. `None` means keep running.
    async fn pause(&self) -> Option<StopReason> {
        let deadline = async {
            match self.deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Some(StopReason::Cancelled),
            _ = self.sink.closed() => Some(StopReason::Disconnected),
            _ = deadline => Some(StopReason::TimedOut),
            _ = tokio::time::sleep(self.interval) => None,
        }
    }
}
