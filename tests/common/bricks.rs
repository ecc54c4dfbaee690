//! Scripted bricks used across the integration tests.

use async_trait::async_trait;
use brickflow::bricks::{ActionBrick, BrickConfig, BrickError, BrickMeta, ConditionBrick};
use brickflow::context::FlowContext;
use brickflow::registry::BrickRegistry;
use serde_json::{Value, json};

/// Action appending its configured marker to the `trail` variable, so tests
/// can assert execution order.
pub struct ProbeAction {
    marker: String,
}

impl ProbeAction {
    pub fn new(config: Value) -> Self {
        let config = BrickConfig::new(config);
        Self {
            marker: config.str_or("marker", "?"),
        }
    }
}

impl BrickMeta for ProbeAction {
    fn name(&self) -> &str {
        "Probe"
    }
}

#[async_trait]
impl ActionBrick for ProbeAction {
    async fn handle(&self, ctx: &mut FlowContext) -> Result<(), BrickError> {
        push_trail(ctx, &self.marker);
        Ok(())
    }
}

/// Action that always fails.
pub struct FailingAction;

impl BrickMeta for FailingAction {
    fn name(&self) -> &str {
        "Failing Action"
    }
}

#[async_trait]
impl ActionBrick for FailingAction {
    async fn handle(&self, _ctx: &mut FlowContext) -> Result<(), BrickError> {
        Err(BrickError::failed("boom"))
    }
}

/// Condition that always fails to evaluate.
pub struct FailingCondition;

impl BrickMeta for FailingCondition {
    fn name(&self) -> &str {
        "Failing Condition"
    }
}

#[async_trait]
impl ConditionBrick for FailingCondition {
    async fn evaluate(&self, _ctx: &FlowContext) -> Result<bool, BrickError> {
        Err(BrickError::failed("cannot decide"))
    }
}

/// Action recording both its execution and its compensation on the trail.
pub struct CompensableAction {
    marker: String,
}

impl CompensableAction {
    pub fn new(config: Value) -> Self {
        let config = BrickConfig::new(config);
        Self {
            marker: config.str_or("marker", "?"),
        }
    }
}

impl BrickMeta for CompensableAction {
    fn name(&self) -> &str {
        "Compensable"
    }
}

#[async_trait]
impl ActionBrick for CompensableAction {
    async fn handle(&self, ctx: &mut FlowContext) -> Result<(), BrickError> {
        push_trail(ctx, &format!("do:{}", self.marker));
        Ok(())
    }

    async fn compensate(&self, ctx: &mut FlowContext) -> Result<(), BrickError> {
        push_trail(ctx, &format!("undo:{}", self.marker));
        Ok(())
    }
}

/// Compensation that fails, for the failures-are-logged-not-rethrown path.
pub struct BrokenCompensation;

impl BrickMeta for BrokenCompensation {
    fn name(&self) -> &str {
        "Broken Compensation"
    }
}

#[async_trait]
impl ActionBrick for BrokenCompensation {
    async fn handle(&self, ctx: &mut FlowContext) -> Result<(), BrickError> {
        push_trail(ctx, "do:broken");
        Ok(())
    }

    async fn compensate(&self, _ctx: &mut FlowContext) -> Result<(), BrickError> {
        Err(BrickError::failed("cannot undo"))
    }
}

fn push_trail(ctx: &mut FlowContext, marker: &str) {
    let mut trail = ctx
        .get("trail")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    trail.push(json!(marker));
    ctx.set("trail", Value::Array(trail));
}

/// The execution trail left by [`ProbeAction`]s and friends.
pub fn trail(ctx: &FlowContext) -> Vec<String> {
    ctx.get("trail")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Built-in catalog plus the scripted test bricks.
pub fn test_registry() -> BrickRegistry {
    let mut registry = BrickRegistry::with_builtins();
    registry
        .register_action("probe", |c| Box::new(ProbeAction::new(c)))
        .register_action("failing", |_| Box::new(FailingAction))
        .register_action("compensable", |c| Box::new(CompensableAction::new(c)))
        .register_action("broken_compensation", |_| Box::new(BrokenCompensation))
        .register_condition("failing_condition", |_| Box::new(FailingCondition));
    registry
}
