//! Terminal run outcomes and their persistable form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::error::FlowError;
use crate::context::{FlowContext, LogEntry};

/// The three terminal outcomes of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Completed,
    Failed,
    Paused,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => f.write_str("completed"),
            Self::Failed => f.write_str("failed"),
            Self::Paused => f.write_str("paused"),
        }
    }
}

/// What a run ended with: status, final context, the causing error for
/// failures, and the node ids executed in order (the input an external
/// caller needs to unwind compensations).
#[derive(Debug)]
pub struct RunResult {
    pub status: RunStatus,
    pub context: FlowContext,
    pub error: Option<FlowError>,
    pub executed_nodes: Vec<String>,
}

impl RunResult {
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == RunStatus::Completed
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.status == RunStatus::Failed
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.status == RunStatus::Paused
    }

    /// Build the persistable record of this outcome.
    #[must_use]
    pub fn record(&self) -> RunRecord {
        RunRecord::from(self)
    }
}

/// Serializable record of a finished (or suspended) run, handed to whatever
/// persists run history. The engine never stores these itself.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: String,
    pub flow_id: String,
    pub status: RunStatus,
    pub payload: Map<String, Value>,
    pub variables: Map<String, Value>,
    pub logs: Vec<LogEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl RunRecord {
    /// Wall-clock duration of the run in seconds.
    #[must_use]
    pub fn duration_secs(&self) -> i64 {
        (self.completed_at - self.started_at).num_seconds()
    }
}

impl From<&RunResult> for RunRecord {
    fn from(result: &RunResult) -> Self {
        Self {
            run_id: result.context.run_id().to_string(),
            flow_id: result.context.flow_id().to_string(),
            status: result.status,
            payload: result.context.payload().clone(),
            variables: result.context.variables().clone(),
            logs: result.context.logs().to_vec(),
            error: result.error.as_ref().map(ToString::to_string),
            started_at: result.context.started_at(),
            completed_at: Utc::now(),
        }
    }
}
