//! Built-in gates.
//!
//! Gates fold the boolean results accumulated from their incoming condition
//! edges into one pass/fail outcome. A gate evaluated with no inputs fails:
//! a join that observed nothing has nothing to pass.

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::bricks::{BrickError, BrickMeta, GateBrick};
use crate::context::FlowContext;
use crate::registry::BrickRegistry;

pub(super) fn register(registry: &mut BrickRegistry) {
    registry.register_gate("and", |c| Box::new(AndGate::new(c)));
    registry.register_gate("or", |c| Box::new(OrGate::new(c)));
}

/// Passes when every contributing condition reported `true`.
pub struct AndGate;

impl AndGate {
    #[must_use]
    pub fn new(_config: Value) -> Self {
        Self
    }
}

impl BrickMeta for AndGate {
    fn name(&self) -> &str {
        "AND Gate"
    }

    fn description(&self) -> &str {
        "Passes when all incoming conditions are true"
    }

    fn category(&self) -> &str {
        "Logic"
    }
}

#[async_trait]
impl GateBrick for AndGate {
    async fn evaluate(
        &self,
        inputs: &FxHashMap<String, bool>,
        _ctx: &FlowContext,
    ) -> Result<bool, BrickError> {
        Ok(!inputs.is_empty() && inputs.values().all(|&v| v))
    }
}

/// Passes when at least one contributing condition reported `true`.
pub struct OrGate;

impl OrGate {
    #[must_use]
    pub fn new(_config: Value) -> Self {
        Self
    }
}

impl BrickMeta for OrGate {
    fn name(&self) -> &str {
        "OR Gate"
    }

    fn description(&self) -> &str {
        "Passes when any incoming condition is true"
    }

    fn category(&self) -> &str {
        "Logic"
    }
}

#[async_trait]
impl GateBrick for OrGate {
    async fn evaluate(
        &self,
        inputs: &FxHashMap<String, bool>,
        _ctx: &FlowContext,
    ) -> Result<bool, BrickError> {
        Ok(inputs.values().any(|&v| v))
    }
}
