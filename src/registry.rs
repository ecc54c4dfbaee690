//! Dynamic-by-name brick resolution.
//!
//! A [`BrickRegistry`] maps opaque brick references to per-kind factories,
//! keeping the engine decoupled from any concrete catalog of behaviors. The
//! runner resolves `(kind, reference, config)` to a fresh
//! [`BrickInstance`] for every node execution; an unresolvable reference is
//! a definition error that aborts the run before any side effect.
//!
//! # Examples
//!
//! ```rust
//! use brickflow::registry::BrickRegistry;
//! use brickflow::types::NodeKind;
//! use serde_json::json;
//!
//! let registry = BrickRegistry::with_builtins();
//! assert!(registry.has("set_variable"));
//!
//! let brick = registry
//!     .resolve(NodeKind::Action, "log_message", json!({"message": "hi"}))
//!     .unwrap();
//! assert_eq!(brick.name(), "Log Message");
//! ```

use miette::Diagnostic;
use rustc_hash::FxHashMap;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::bricks::{
    ActionBrick, BrickInstance, ConditionBrick, GateBrick, TriggerBrick,
};
use crate::types::NodeKind;

type TriggerFactory = Arc<dyn Fn(Value) -> Box<dyn TriggerBrick> + Send + Sync>;
type ConditionFactory = Arc<dyn Fn(Value) -> Box<dyn ConditionBrick> + Send + Sync>;
type ActionFactory = Arc<dyn Fn(Value) -> Box<dyn ActionBrick> + Send + Sync>;
type GateFactory = Arc<dyn Fn(Value) -> Box<dyn GateBrick> + Send + Sync>;

/// Registry of brick factories, keyed by opaque reference per kind.
#[derive(Default)]
pub struct BrickRegistry {
    triggers: FxHashMap<String, TriggerFactory>,
    conditions: FxHashMap<String, ConditionFactory>,
    actions: FxHashMap<String, ActionFactory>,
    gates: FxHashMap<String, GateFactory>,
}

/// Errors raised while resolving a brick reference.
#[derive(Debug, Error, Diagnostic)]
pub enum RegistryError {
    /// No factory registered under the reference for the requested kind.
    #[error("unknown {kind} brick: {reference}")]
    #[diagnostic(
        code(brickflow::registry::unknown_brick),
        help("Register the brick before running flows that reference it.")
    )]
    UnknownBrick {
        kind: NodeKind,
        reference: String,
    },
}

impl BrickRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with the built-in brick catalog.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::builtin::register_all(&mut registry);
        registry
    }

    /// Register a trigger factory under `reference`.
    pub fn register_trigger(
        &mut self,
        reference: impl Into<String>,
        factory: impl Fn(Value) -> Box<dyn TriggerBrick> + Send + Sync + 'static,
    ) -> &mut Self {
        self.triggers.insert(reference.into(), Arc::new(factory));
        self
    }

    /// Register a condition factory under `reference`.
    pub fn register_condition(
        &mut self,
        reference: impl Into<String>,
        factory: impl Fn(Value) -> Box<dyn ConditionBrick> + Send + Sync + 'static,
    ) -> &mut Self {
        self.conditions.insert(reference.into(), Arc::new(factory));
        self
    }

    /// Register an action factory under `reference`.
    pub fn register_action(
        &mut self,
        reference: impl Into<String>,
        factory: impl Fn(Value) -> Box<dyn ActionBrick> + Send + Sync + 'static,
    ) -> &mut Self {
        self.actions.insert(reference.into(), Arc::new(factory));
        self
    }

    /// Register a gate factory under `reference`.
    pub fn register_gate(
        &mut self,
        reference: impl Into<String>,
        factory: impl Fn(Value) -> Box<dyn GateBrick> + Send + Sync + 'static,
    ) -> &mut Self {
        self.gates.insert(reference.into(), Arc::new(factory));
        self
    }

    /// Resolve a brick instance for a node.
    ///
    /// The factory receives the node's (template-materialized) configuration
    /// and produces a fresh instance; bricks hold no cross-run state.
    pub fn resolve(
        &self,
        kind: NodeKind,
        reference: &str,
        config: Value,
    ) -> Result<BrickInstance, RegistryError> {
        let unknown = || RegistryError::UnknownBrick {
            kind,
            reference: reference.to_string(),
        };
        match kind {
            NodeKind::Trigger => self
                .triggers
                .get(reference)
                .map(|f| BrickInstance::Trigger(f(config)))
                .ok_or_else(unknown),
            NodeKind::Condition => self
                .conditions
                .get(reference)
                .map(|f| BrickInstance::Condition(f(config)))
                .ok_or_else(unknown),
            NodeKind::Action => self
                .actions
                .get(reference)
                .map(|f| BrickInstance::Action(f(config)))
                .ok_or_else(unknown),
            NodeKind::Gate => self
                .gates
                .get(reference)
                .map(|f| BrickInstance::Gate(f(config)))
                .ok_or_else(unknown),
        }
    }

    /// Whether `reference` is registered under any kind.
    #[must_use]
    pub fn has(&self, reference: &str) -> bool {
        self.triggers.contains_key(reference)
            || self.conditions.contains_key(reference)
            || self.actions.contains_key(reference)
            || self.gates.contains_key(reference)
    }

    /// Whether `reference` is registered for the given kind.
    #[must_use]
    pub fn has_kind(&self, kind: NodeKind, reference: &str) -> bool {
        match kind {
            NodeKind::Trigger => self.triggers.contains_key(reference),
            NodeKind::Condition => self.conditions.contains_key(reference),
            NodeKind::Action => self.actions.contains_key(reference),
            NodeKind::Gate => self.gates.contains_key(reference),
        }
    }

    /// Registered references for a kind, sorted for stable listings.
    #[must_use]
    pub fn names(&self, kind: NodeKind) -> Vec<&str> {
        let mut names: Vec<&str> = match kind {
            NodeKind::Trigger => self.triggers.keys().map(String::as_str).collect(),
            NodeKind::Condition => self.conditions.keys().map(String::as_str).collect(),
            NodeKind::Action => self.actions.keys().map(String::as_str).collect(),
            NodeKind::Gate => self.gates.keys().map(String::as_str).collect(),
        };
        names.sort_unstable();
        names
    }
}
