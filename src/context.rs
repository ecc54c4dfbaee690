//! Run-scoped execution state.
//!
//! A [`FlowContext`] is created once per run and mutated throughout the
//! traversal: bricks read the merged variable namespace, write variables,
//! append logs, and may request a pause or a stop. When a run suspends, the
//! context serializes to a [`ContextSnapshot`] handed to a pause store; on
//! resume the context is reconstructed from that snapshot.
//!
//! # Variable namespace
//!
//! [`FlowContext::get`] resolves a dotted path against runtime variables
//! first and falls back to the initial payload, so variables set during the
//! run shadow payload keys of the same root name. Lookups never fail: a
//! missing or non-container intermediate simply yields `None`.
//!
//! # Examples
//!
//! ```rust
//! use brickflow::context::FlowContext;
//! use serde_json::json;
//!
//! let mut ctx = FlowContext::new("flow-1", json!({"user": {"name": "Ada"}}));
//! assert_eq!(ctx.get("user.name"), Some(&json!("Ada")));
//!
//! ctx.set("user", json!("overridden"));
//! assert_eq!(ctx.get("user"), Some(&json!("overridden")));
//! assert_eq!(ctx.get("user.name"), None); // variables shadow the payload root
//! ```

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::types::LogLevel;
use crate::utils::json::{get_path, set_path};

/// One entry in the run's append-only log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Mutable state owned by a single run.
#[derive(Clone, Debug)]
pub struct FlowContext {
    run_id: String,
    flow_id: String,
    payload: Map<String, Value>,
    variables: Map<String, Value>,
    logs: Vec<LogEntry>,
    pause_cursor: Option<String>,
    gate_inputs: FxHashMap<String, FxHashMap<String, bool>>,
    stop_requested: bool,
    errors: Vec<String>,
    started_at: DateTime<Utc>,
    current_node: Option<String>,
}

impl FlowContext {
    /// Create a fresh context for a run of `flow_id` with the given initial
    /// payload. Non-object payloads are treated as empty.
    ///
    /// A v4 UUID run id is generated; use [`run_id`](Self::run_id) to key
    /// external stores with it.
    #[must_use]
    pub fn new(flow_id: impl Into<String>, payload: Value) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            flow_id: flow_id.into(),
            payload: payload.as_object().cloned().unwrap_or_default(),
            variables: Map::new(),
            logs: Vec::new(),
            pause_cursor: None,
            gate_inputs: FxHashMap::default(),
            stop_requested: false,
            errors: Vec::new(),
            started_at: Utc::now(),
            current_node: None,
        }
    }

    /// Unique id of this run.
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Id of the flow this run interprets.
    #[must_use]
    pub fn flow_id(&self) -> &str {
        &self.flow_id
    }

    /// The initial input payload (read-mostly).
    #[must_use]
    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    /// Variables written during this run.
    #[must_use]
    pub fn variables(&self) -> &Map<String, Value> {
        &self.variables
    }

    /// When this run started.
    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Look up a dotted path, checking variables before the payload.
    ///
    /// Shadowing is per root segment: once a variable named `user` exists,
    /// every `user.*` lookup resolves inside it, never the payload.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        let head = path.split('.').next().unwrap_or(path);
        if self.variables.contains_key(head) {
            get_path(&self.variables, path)
        } else {
            get_path(&self.payload, path)
        }
    }

    /// Set a variable at a dotted path, creating intermediate objects.
    pub fn set(&mut self, path: &str, value: Value) {
        set_path(&mut self.variables, path, value);
    }

    /// Append a log entry at the given level.
    pub fn append_log(&mut self, level: LogLevel, message: impl Into<String>) {
        self.logs.push(LogEntry {
            level,
            message: message.into(),
            timestamp: Utc::now(),
        });
    }

    /// Append an info-level log entry.
    pub fn info(&mut self, message: impl Into<String>) {
        self.append_log(LogLevel::Info, message);
    }

    /// Append a warning-level log entry.
    pub fn warning(&mut self, message: impl Into<String>) {
        self.append_log(LogLevel::Warning, message);
    }

    /// Record a run-level error: logged at error level and retained in the
    /// auxiliary error list surfaced with the terminal result.
    pub fn record_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.append_log(LogLevel::Error, message.clone());
        self.errors.push(message);
    }

    /// The ordered run log.
    #[must_use]
    pub fn logs(&self) -> &[LogEntry] {
        &self.logs
    }

    /// Errors recorded via [`record_error`](Self::record_error).
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Suspend the run, remembering the node id it suspended at.
    pub fn mark_paused(&mut self, resume_node_id: impl Into<String>) {
        self.pause_cursor = Some(resume_node_id.into());
    }

    /// Suspend the run at the node currently being executed.
    ///
    /// Falls back to a no-op when called outside node execution; a pause
    /// without a cursor would be unresumable.
    pub fn mark_paused_here(&mut self) {
        if let Some(node) = self.current_node.clone() {
            self.pause_cursor = Some(node);
        }
    }

    /// Whether a pause has been requested.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.pause_cursor.is_some()
    }

    /// The node id the run suspended at, if paused.
    #[must_use]
    pub fn pause_cursor(&self) -> Option<&str> {
        self.pause_cursor.as_deref()
    }

    /// Clear the pause state, returning the cursor that was set.
    pub fn clear_pause(&mut self) -> Option<String> {
        self.pause_cursor.take()
    }

    /// Ask the runner to stop traversal after the current node.
    pub fn request_stop(&mut self) {
        self.stop_requested = true;
    }

    /// Whether an action requested the run to stop.
    #[must_use]
    pub fn stop_requested(&self) -> bool {
        self.stop_requested
    }

    /// Record a condition's boolean result as input to a gate.
    pub fn record_gate_input(
        &mut self,
        gate_id: impl Into<String>,
        source_id: impl Into<String>,
        result: bool,
    ) {
        self.gate_inputs
            .entry(gate_id.into())
            .or_default()
            .insert(source_id.into(), result);
    }

    /// Accumulated inputs for a gate, keyed by contributing source node id.
    #[must_use]
    pub fn gate_inputs_for(&self, gate_id: &str) -> FxHashMap<String, bool> {
        self.gate_inputs.get(gate_id).cloned().unwrap_or_default()
    }

    /// Whether a gate has received inputs from `expected` distinct sources.
    #[must_use]
    pub fn has_all_inputs(&self, gate_id: &str, expected: usize) -> bool {
        expected > 0
            && self
                .gate_inputs
                .get(gate_id)
                .is_some_and(|inputs| inputs.len() >= expected)
    }

    /// Drop a gate's accumulated inputs after it consumed them.
    pub fn clear_gate_inputs(&mut self, gate_id: &str) {
        self.gate_inputs.remove(gate_id);
    }

    /// The node currently being executed, when inside the runner.
    #[must_use]
    pub fn current_node(&self) -> Option<&str> {
        self.current_node.as_deref()
    }

    pub(crate) fn set_current_node(&mut self, node_id: Option<String>) {
        self.current_node = node_id;
    }

    /// Serialize the full run state for out-of-band persistence.
    #[must_use]
    pub fn snapshot(&self) -> ContextSnapshot {
        ContextSnapshot::from(self)
    }

    /// Reconstruct a context from a stored snapshot.
    #[must_use]
    pub fn restore(snapshot: ContextSnapshot) -> Self {
        Self {
            run_id: snapshot.run_id,
            flow_id: snapshot.flow_id,
            payload: snapshot.payload,
            variables: snapshot.variables,
            logs: snapshot.logs,
            pause_cursor: snapshot.pause_cursor,
            gate_inputs: snapshot.gate_inputs,
            stop_requested: snapshot.stop_requested,
            errors: snapshot.errors,
            started_at: snapshot.started_at,
            current_node: None,
        }
    }
}

/// Serde-friendly persisted shape of a [`FlowContext`].
///
/// Kept decoupled from the in-memory type so the stored format stays stable
/// while the context grows fields; conversion logic lives here, store
/// backends stay declarative.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ContextSnapshot {
    pub run_id: String,
    pub flow_id: String,
    #[serde(default)]
    pub payload: Map<String, Value>,
    #[serde(default)]
    pub variables: Map<String, Value>,
    #[serde(default)]
    pub logs: Vec<LogEntry>,
    #[serde(default)]
    pub pause_cursor: Option<String>,
    #[serde(default)]
    pub gate_inputs: FxHashMap<String, FxHashMap<String, bool>>,
    #[serde(default)]
    pub stop_requested: bool,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default = "Utc::now")]
    pub started_at: DateTime<Utc>,
}

impl From<&FlowContext> for ContextSnapshot {
    fn from(ctx: &FlowContext) -> Self {
        Self {
            run_id: ctx.run_id.clone(),
            flow_id: ctx.flow_id.clone(),
            payload: ctx.payload.clone(),
            variables: ctx.variables.clone(),
            logs: ctx.logs.clone(),
            pause_cursor: ctx.pause_cursor.clone(),
            gate_inputs: ctx.gate_inputs.clone(),
            stop_requested: ctx.stop_requested,
            errors: ctx.errors.clone(),
            started_at: ctx.started_at,
        }
    }
}
