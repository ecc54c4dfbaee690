//! Flow fixtures shared across the integration tests.

use brickflow::graph::FlowGraph;
use brickflow::types::{BranchLabel, NodeKind};
use serde_json::json;

/// `trigger -> probe a -> probe b`
pub fn linear_flow() -> FlowGraph {
    FlowGraph::builder("linear")
        .add_node("t", NodeKind::Trigger, "manual", json!({}))
        .add_node("a", NodeKind::Action, "probe", json!({"marker": "a"}))
        .add_node("b", NodeKind::Action, "probe", json!({"marker": "b"}))
        .add_edge("t", "a")
        .add_edge("a", "b")
        .build()
}

/// The end-to-end branching shape: `T -> C(status == "active")`, probe `a`
/// on the true branch, probe `b` on the false branch.
pub fn condition_flow() -> FlowGraph {
    FlowGraph::builder("branching")
        .add_node("t", NodeKind::Trigger, "manual", json!({}))
        .add_node(
            "c",
            NodeKind::Condition,
            "field_equals",
            json!({"field": "status", "value": "active", "operator": "=="}),
        )
        .add_node("a", NodeKind::Action, "probe", json!({"marker": "a"}))
        .add_node("b", NodeKind::Action, "probe", json!({"marker": "b"}))
        .add_edge("t", "c")
        .add_labeled_edge("c", "a", BranchLabel::True)
        .add_labeled_edge("c", "b", BranchLabel::False)
        .build()
}

/// Two conditions feeding one gate, with a probe behind the gate.
///
/// `c1` checks `x == 1`, `c2` checks `y == 1`; the gate brick is
/// configurable so tests can exercise `and` vs `or`.
pub fn gate_flow(gate_brick: &str) -> FlowGraph {
    FlowGraph::builder("joined")
        .add_node("t", NodeKind::Trigger, "manual", json!({}))
        .add_node(
            "c1",
            NodeKind::Condition,
            "field_equals",
            json!({"field": "x", "value": 1}),
        )
        .add_node(
            "c2",
            NodeKind::Condition,
            "field_equals",
            json!({"field": "y", "value": 1}),
        )
        .add_node("g", NodeKind::Gate, gate_brick, json!({}))
        .add_node("after", NodeKind::Action, "probe", json!({"marker": "after"}))
        .add_edge("t", "c1")
        .add_edge("t", "c2")
        .add_edge("c1", "g")
        .add_edge("c2", "g")
        .add_edge("g", "after")
        .build()
}

/// `trigger -> a -> b -> a` cycle for the loop guard.
pub fn cyclic_flow() -> FlowGraph {
    FlowGraph::builder("cyclic")
        .add_node("t", NodeKind::Trigger, "manual", json!({}))
        .add_node("a", NodeKind::Action, "probe", json!({"marker": "a"}))
        .add_node("b", NodeKind::Action, "probe", json!({"marker": "b"}))
        .add_edge("t", "a")
        .add_edge("a", "b")
        .add_edge("b", "a")
        .build()
}

/// `trigger -> probe before -> await_approval -> probe after`
pub fn approval_flow() -> FlowGraph {
    FlowGraph::builder("approval")
        .add_node("t", NodeKind::Trigger, "manual", json!({}))
        .add_node("before", NodeKind::Action, "probe", json!({"marker": "before"}))
        .add_node(
            "wait",
            NodeKind::Action,
            "await_approval",
            json!({"message": "Needs sign-off"}),
        )
        .add_node("after", NodeKind::Action, "probe", json!({"marker": "after"}))
        .add_edge("t", "before")
        .add_edge("before", "wait")
        .add_edge("wait", "after")
        .build()
}
