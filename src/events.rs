//! Observability hooks for run execution.
//!
//! The runner notifies an [`EventBus`] at the interesting points of a run:
//! run start, immediately before each brick executes, on brick failure, and
//! at the terminal outcome. Emission is fire-and-forget — sinks observe, they
//! never influence control flow, and a misbehaving sink cannot fail a run.
//!
//! Two sinks ship with the crate: [`TracingSink`] (the default) forwards
//! events to the `tracing` subscriber; [`ChannelSink`] pushes them onto a
//! [`flume`] channel for tests, dashboards, or streaming consumers.
//!
//! # Examples
//!
//! ```rust
//! use brickflow::events::{ChannelSink, EventBus};
//!
//! let (tx, rx) = flume::unbounded();
//! let bus = EventBus::with_sinks(vec![Box::new(ChannelSink::new(tx))]);
//! # let _ = (bus, rx);
//! ```

use serde::{Deserialize, Serialize};

/// Notification emitted by the runner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FlowEvent {
    /// A run entered the `Running` state.
    FlowStarted { flow_id: String, run_id: String },
    /// A brick is about to execute (pre-execution hook).
    BrickExecuting {
        run_id: String,
        node_id: String,
        brick: String,
    },
    /// A brick call raised an error; the run will abort as failed.
    BrickFailed {
        run_id: String,
        node_id: String,
        brick: String,
        error: String,
    },
    /// The run finished with no pending pause and no failure.
    FlowCompleted { flow_id: String, run_id: String },
    /// The run suspended awaiting external continuation.
    FlowPaused {
        flow_id: String,
        run_id: String,
        cursor: String,
    },
    /// The run aborted with the attached error.
    FlowFailed {
        flow_id: String,
        run_id: String,
        error: String,
    },
}

impl FlowEvent {
    /// The run this event belongs to.
    #[must_use]
    pub fn run_id(&self) -> &str {
        match self {
            Self::FlowStarted { run_id, .. }
            | Self::BrickExecuting { run_id, .. }
            | Self::BrickFailed { run_id, .. }
            | Self::FlowCompleted { run_id, .. }
            | Self::FlowPaused { run_id, .. }
            | Self::FlowFailed { run_id, .. } => run_id,
        }
    }

    /// Short label for the event variant.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::FlowStarted { .. } => "flow_started",
            Self::BrickExecuting { .. } => "brick_executing",
            Self::BrickFailed { .. } => "brick_failed",
            Self::FlowCompleted { .. } => "flow_completed",
            Self::FlowPaused { .. } => "flow_paused",
            Self::FlowFailed { .. } => "flow_failed",
        }
    }
}

/// Destination for flow events. Implementations must not block.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &FlowEvent);
}

/// Sink forwarding events to the active `tracing` subscriber.
#[derive(Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &FlowEvent) {
        match event {
            FlowEvent::BrickFailed {
                run_id,
                node_id,
                brick,
                error,
            } => {
                tracing::error!(run_id = %run_id, node_id = %node_id, brick = %brick, error = %error, "brick failed");
            }
            FlowEvent::FlowFailed {
                flow_id,
                run_id,
                error,
            } => {
                tracing::error!(flow_id = %flow_id, run_id = %run_id, error = %error, "flow failed");
            }
            other => {
                tracing::info!(run_id = other.run_id(), event = other.label(), "flow event");
            }
        }
    }
}

/// Sink pushing events onto a flume channel.
///
/// A closed receiver silently drops events; observers disconnecting must not
/// affect a running flow.
#[derive(Clone, Debug)]
pub struct ChannelSink {
    sender: flume::Sender<FlowEvent>,
}

impl ChannelSink {
    #[must_use]
    pub fn new(sender: flume::Sender<FlowEvent>) -> Self {
        Self { sender }
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: &FlowEvent) {
        let _ = self.sender.send(event.clone());
    }
}

/// Fan-out of events to the configured sinks.
pub struct EventBus {
    sinks: Vec<Box<dyn EventSink>>,
}

impl EventBus {
    /// A bus with the default tracing sink.
    #[must_use]
    pub fn new() -> Self {
        Self::with_sinks(vec![Box::new(TracingSink)])
    }

    /// A bus with custom sinks (an empty vector silences events entirely).
    #[must_use]
    pub fn with_sinks(sinks: Vec<Box<dyn EventSink>>) -> Self {
        Self { sinks }
    }

    /// Emit an event to every sink, fire-and-forget.
    pub fn emit(&self, event: FlowEvent) {
        for sink in &self.sinks {
            sink.emit(&event);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
