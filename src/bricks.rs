//! The brick contract: pluggable units of behavior bound to flow nodes.
//!
//! Bricks come in four capabilities, one per [`NodeKind`]:
//!
//! - [`TriggerBrick`]: registers/unregisters a live listener for a flow
//! - [`ConditionBrick`]: evaluates the run context to a boolean
//! - [`GateBrick`]: folds accumulated boolean inputs into one pass/fail
//! - [`ActionBrick`]: mutates the run context, optionally compensable
//!
//! The engine stays decoupled from any concrete catalog: nodes carry an
//! opaque brick reference that a [`BrickRegistry`](crate::registry::BrickRegistry)
//! resolves to one of these trait objects, wrapped in a [`BrickInstance`].
//!
//! # Error Handling
//!
//! A brick that returns an error aborts the *entire run* — there is no
//! partial-success state. Recoverable situations should instead be written
//! into the context (variables, logs) and routed with conditions.

use async_trait::async_trait;
use miette::Diagnostic;
use rustc_hash::FxHashMap;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::context::FlowContext;
use crate::types::NodeKind;

/// Metadata every brick exposes, used for logging and registry listings.
pub trait BrickMeta {
    /// Display name of the brick.
    fn name(&self) -> &str;

    /// One-line description of what the brick does.
    fn description(&self) -> &str {
        ""
    }

    /// Grouping category for catalog listings.
    fn category(&self) -> &str {
        "General"
    }
}

/// A trigger firing, dispatched to whoever consumes the trigger channel.
#[derive(Clone, Debug)]
pub struct TriggerFired {
    /// Flow the trigger is bound to.
    pub flow_id: String,
    /// Name of the trigger brick that fired.
    pub trigger: String,
    /// Payload the new run should start with.
    pub payload: Value,
}

/// Binding handed to a trigger brick at registration time.
///
/// Carries the owning flow id and the channel on which the trigger reports
/// firings. Sending is fire-and-forget; a dropped receiver never surfaces as
/// a trigger error.
#[derive(Clone, Debug)]
pub struct TriggerBinding {
    flow_id: String,
    sender: flume::Sender<TriggerFired>,
}

impl TriggerBinding {
    #[must_use]
    pub fn new(flow_id: impl Into<String>, sender: flume::Sender<TriggerFired>) -> Self {
        Self {
            flow_id: flow_id.into(),
            sender,
        }
    }

    #[must_use]
    pub fn flow_id(&self) -> &str {
        &self.flow_id
    }

    /// Report a firing with the given payload.
    pub fn dispatch(&self, trigger: impl Into<String>, payload: Value) {
        let fired = TriggerFired {
            flow_id: self.flow_id.clone(),
            trigger: trigger.into(),
            payload,
        };
        if self.sender.send(fired).is_err() {
            tracing::debug!(flow_id = %self.flow_id, "trigger channel closed; firing dropped");
        }
    }
}

/// Entry-point brick: owns a live listener outside any single run.
pub trait TriggerBrick: BrickMeta + Send + Sync {
    /// Install the listener for the bound flow.
    fn register(&mut self, binding: TriggerBinding) -> Result<(), BrickError>;

    /// Tear the listener down. Default is a no-op.
    fn unregister(&mut self) {}
}

/// Boolean-valued brick evaluated against the run context.
#[async_trait]
pub trait ConditionBrick: BrickMeta + Send + Sync {
    async fn evaluate(&self, ctx: &FlowContext) -> Result<bool, BrickError>;
}

/// Join brick folding per-source boolean inputs into one result.
#[async_trait]
pub trait GateBrick: BrickMeta + Send + Sync {
    async fn evaluate(
        &self,
        inputs: &FxHashMap<String, bool>,
        ctx: &FlowContext,
    ) -> Result<bool, BrickError>;
}

/// Side-effecting brick. May pause the run via the context; may expose a
/// compensation that an external caller can invoke to unwind the effect.
#[async_trait]
pub trait ActionBrick: BrickMeta + Send + Sync {
    async fn handle(&self, ctx: &mut FlowContext) -> Result<(), BrickError>;

    /// Undo this action's effect. The engine never calls this on its own;
    /// see [`FlowRunner::compensate`](crate::runner::FlowRunner::compensate).
    async fn compensate(&self, _ctx: &mut FlowContext) -> Result<(), BrickError> {
        Ok(())
    }
}

/// A resolved brick, dispatched by node kind.
pub enum BrickInstance {
    Trigger(Box<dyn TriggerBrick>),
    Condition(Box<dyn ConditionBrick>),
    Action(Box<dyn ActionBrick>),
    Gate(Box<dyn GateBrick>),
}

impl BrickInstance {
    /// The node kind this instance serves.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Trigger(_) => NodeKind::Trigger,
            Self::Condition(_) => NodeKind::Condition,
            Self::Action(_) => NodeKind::Action,
            Self::Gate(_) => NodeKind::Gate,
        }
    }

    /// Display name of the wrapped brick.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Trigger(b) => b.name(),
            Self::Condition(b) => b.name(),
            Self::Action(b) => b.name(),
            Self::Gate(b) => b.name(),
        }
    }
}

/// Errors surfaced by brick implementations.
#[derive(Debug, Error, Diagnostic)]
pub enum BrickError {
    /// The brick's configuration is unusable.
    #[error("invalid brick configuration: {what}")]
    #[diagnostic(
        code(brickflow::brick::invalid_config),
        help("Check the node's config block against the brick's documented fields.")
    )]
    InvalidConfig { what: String },

    /// The brick attempted its work and failed.
    #[error("brick execution failed: {0}")]
    #[diagnostic(code(brickflow::brick::failed))]
    Failed(String),

    /// JSON (de)serialization error inside a brick.
    #[error(transparent)]
    #[diagnostic(code(brickflow::brick::serde_json))]
    Serde(#[from] serde_json::Error),
}

impl BrickError {
    pub fn invalid_config(what: impl Into<String>) -> Self {
        Self::InvalidConfig { what: what.into() }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Typed accessor over a brick's (already template-resolved) configuration.
///
/// Lookups use dotted paths like the context's variable access and never
/// fail; the `_or` variants supply defaults for optional fields.
#[derive(Clone, Debug, Default)]
pub struct BrickConfig(Map<String, Value>);

impl BrickConfig {
    /// Wrap a configuration value; anything but an object behaves as empty.
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self(value.as_object().cloned().unwrap_or_default())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        crate::utils::json::get_path(&self.0, key)
    }

    #[must_use]
    pub fn str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    #[must_use]
    pub fn str_or(&self, key: &str, default: &str) -> String {
        self.str(key).unwrap_or(default).to_string()
    }

    /// Required string field; missing or non-string is an
    /// [`InvalidConfig`](BrickError::InvalidConfig) error.
    pub fn require_str(&self, key: &str) -> Result<String, BrickError> {
        self.str(key)
            .map(str::to_string)
            .ok_or_else(|| BrickError::invalid_config(format!("missing field '{key}'")))
    }

    #[must_use]
    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(default)
    }

    #[must_use]
    pub fn u64_or(&self, key: &str, default: u64) -> u64 {
        match self.get(key) {
            Some(Value::Number(n)) => n.as_u64().unwrap_or(default),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    /// The underlying configuration map.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}
