//! Per-connection timestamp emission
//!
//! - [`sink`]: the output sink a task writes to
//! - [`task`]: the emission loop and its termination rules
//! - [`spawner`]: scheduling, tracking and cancelling tasks

pub mod sink;
pub mod spawner;
pub mod task;

pub use sink::{ChannelSink, OutputSink, SinkError};
pub use spawner::{StreamHandle, TaskSpawner};
pub use task::{EmissionSummary, EmissionTask, StopReason};
