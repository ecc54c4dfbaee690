//! Structural flow validation.
//!
//! The engine itself assumes structurally sound graphs and fails fast at
//! runtime when they are not; this validator is the component callers run at
//! save/import time to catch those problems early. It is never invoked by
//! the runner.
//!
//! # Examples
//!
//! ```rust
//! use brickflow::graph::FlowGraph;
//! use brickflow::registry::BrickRegistry;
//! use brickflow::validator::FlowValidator;
//! use std::sync::Arc;
//!
//! let validator = FlowValidator::new(Arc::new(BrickRegistry::with_builtins()));
//! let empty = FlowGraph::builder("empty").build();
//! let result = validator.validate(&empty);
//! assert!(!result.is_valid());
//! ```

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::graph::FlowGraph;
use crate::registry::BrickRegistry;
use crate::types::NodeKind;

/// Classification of a structural problem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// The flow has no nodes at all.
    EmptyFlow,
    /// The flow has no trigger node to start from.
    MissingTrigger,
    /// Two nodes share an id.
    DuplicateNodeId,
    /// An edge endpoint references a non-existent node.
    DanglingEdge,
    /// A node references a brick the registry does not know.
    UnknownBrick,
    /// A node carries no brick reference.
    MissingBrickRef,
    /// A gate with fewer than two incoming edges joins nothing.
    GateArity,
    /// A non-trigger node no edge points at can never execute.
    UnreachableNode,
}

/// One structural finding.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub kind: IssueKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_id: Option<String>,
    pub message: String,
}

impl ValidationIssue {
    fn new(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            node_id: None,
            edge_id: None,
            message: message.into(),
        }
    }

    fn with_node(mut self, node_id: impl Into<String>) -> Self {
        self.node_id = Some(node_id.into());
        self
    }

    fn with_edge(mut self, edge_id: impl Into<String>) -> Self {
        self.edge_id = Some(edge_id.into());
        self
    }
}

/// Outcome of validating one flow.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Valid means no errors; warnings alone do not block a flow.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}

/// Registry-aware structural validator.
pub struct FlowValidator {
    registry: Arc<BrickRegistry>,
}

impl FlowValidator {
    #[must_use]
    pub fn new(registry: Arc<BrickRegistry>) -> Self {
        Self { registry }
    }

    /// Validate a flow's structure and brick references.
    #[must_use]
    pub fn validate(&self, flow: &FlowGraph) -> ValidationResult {
        let mut result = ValidationResult::default();

        if flow.nodes().is_empty() {
            result.errors.push(ValidationIssue::new(
                IssueKind::EmptyFlow,
                "flow has no nodes",
            ));
            return result;
        }

        if flow.trigger_nodes().is_empty() {
            result.errors.push(ValidationIssue::new(
                IssueKind::MissingTrigger,
                "flow has no trigger node",
            ));
        }

        let mut seen_ids: FxHashSet<&str> = FxHashSet::default();
        for node in flow.nodes() {
            if !seen_ids.insert(&node.id) {
                result.errors.push(
                    ValidationIssue::new(
                        IssueKind::DuplicateNodeId,
                        format!("duplicate node id '{}'", node.id),
                    )
                    .with_node(&*node.id),
                );
            }

            if node.brick.is_empty() {
                result.errors.push(
                    ValidationIssue::new(
                        IssueKind::MissingBrickRef,
                        format!("node '{}' has no brick reference", node.id),
                    )
                    .with_node(&*node.id),
                );
            } else if !self.registry.has_kind(node.kind, &node.brick) {
                result.errors.push(
                    ValidationIssue::new(
                        IssueKind::UnknownBrick,
                        format!(
                            "node '{}' references unknown {} brick '{}'",
                            node.id, node.kind, node.brick
                        ),
                    )
                    .with_node(&*node.id),
                );
            }
        }

        let mut incoming: FxHashMap<&str, usize> = FxHashMap::default();
        for edge in flow.edges() {
            for endpoint in [&edge.source, &edge.target] {
                if flow.node(endpoint).is_none() {
                    result.errors.push(
                        ValidationIssue::new(
                            IssueKind::DanglingEdge,
                            format!("edge '{}' references missing node '{endpoint}'", edge.id),
                        )
                        .with_edge(&*edge.id),
                    );
                }
            }
            *incoming.entry(edge.target.as_str()).or_default() += 1;
        }

        for node in flow.nodes() {
            let inbound = incoming.get(node.id.as_str()).copied().unwrap_or(0);
            match node.kind {
                NodeKind::Gate if inbound < 2 => {
                    result.warnings.push(
                        ValidationIssue::new(
                            IssueKind::GateArity,
                            format!("gate '{}' has {inbound} incoming edge(s); joins need at least two", node.id),
                        )
                        .with_node(&*node.id),
                    );
                }
                NodeKind::Trigger => {}
                _ if inbound == 0 => {
                    result.warnings.push(
                        ValidationIssue::new(
                            IssueKind::UnreachableNode,
                            format!("node '{}' has no incoming edges and can never execute", node.id),
                        )
                        .with_node(&*node.id),
                    );
                }
                _ => {}
            }
        }

        result
    }
}
