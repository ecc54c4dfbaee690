//! Flow graph construction, indexing, and JSON loading.

use brickflow::graph::FlowGraph;
use brickflow::types::{BranchLabel, NodeKind};
use serde_json::json;

#[test]
fn builder_indexes_nodes_and_edges() {
    let flow = FlowGraph::builder("g")
        .name("Gatekeeper")
        .add_node("t", NodeKind::Trigger, "manual", json!({}))
        .add_node("c", NodeKind::Condition, "field_equals", json!({"field": "x", "value": 1}))
        .add_node("g1", NodeKind::Gate, "and", json!({}))
        .add_edge("t", "c")
        .add_edge("c", "g1")
        .add_labeled_edge("g1", "c", BranchLabel::True)
        .build();

    assert_eq!(flow.id(), "g");
    assert_eq!(flow.name(), "Gatekeeper");
    assert!(flow.active());
    assert_eq!(flow.node("c").map(|n| n.kind), Some(NodeKind::Condition));
    assert!(flow.node("zzz").is_none());

    let out: Vec<&str> = flow.outgoing("c").iter().map(|e| e.target.as_str()).collect();
    assert_eq!(out, vec!["g1"]);
    assert_eq!(flow.incoming_count("g1"), 1);
    assert_eq!(flow.incoming_count("t"), 0);
    assert_eq!(flow.incoming_count("c"), 2);
    assert_eq!(flow.trigger_nodes().len(), 1);
}

#[test]
fn outgoing_edges_preserve_definition_order() {
    let flow = FlowGraph::builder("fanout")
        .add_node("t", NodeKind::Trigger, "manual", json!({}))
        .add_node("a", NodeKind::Action, "probe", json!({}))
        .add_node("b", NodeKind::Action, "probe", json!({}))
        .add_node("c", NodeKind::Action, "probe", json!({}))
        .add_edge("t", "b")
        .add_edge("t", "a")
        .add_edge("t", "c")
        .build();

    let targets: Vec<&str> = flow.outgoing("t").iter().map(|e| e.target.as_str()).collect();
    assert_eq!(targets, vec!["b", "a", "c"]);
}

#[test]
fn loads_a_flow_from_json() {
    let flow = FlowGraph::from_value(json!({
        "id": "imported",
        "name": "Imported Flow",
        "nodes": [
            {"id": "t", "kind": "trigger", "brick": "manual"},
            {"id": "c", "kind": "condition", "brick": "field_equals",
             "config": {"field": "status", "value": "active"}},
            {"id": "a", "kind": "action", "brick": "log_message",
             "config": {"message": "hello"}},
        ],
        "edges": [
            {"id": "e1", "source": "t", "target": "c"},
            {"id": "e2", "source": "c", "target": "a", "label": "true"},
        ],
    }))
    .unwrap();

    assert_eq!(flow.nodes().len(), 3);
    assert_eq!(flow.edges().len(), 2);
    assert_eq!(flow.edges()[1].label, Some(BranchLabel::True));
    // Nodes without a config block default to an empty object.
    assert!(flow.node("t").unwrap().config.as_object().unwrap().is_empty());
}

#[test]
fn rejects_malformed_definitions() {
    assert!(FlowGraph::from_value(json!({"nodes": []})).is_err()); // missing id
    assert!(
        FlowGraph::from_value(json!({
            "id": "bad-kind",
            "nodes": [{"id": "n", "kind": "sparkle", "brick": "x"}],
            "edges": [],
        }))
        .is_err()
    );
}

#[test]
fn duplicate_node_ids_resolve_to_the_first_definition() {
    let flow = FlowGraph::builder("dupes")
        .add_node("x", NodeKind::Action, "first", json!({}))
        .add_node("x", NodeKind::Action, "second", json!({}))
        .build();
    assert_eq!(flow.node("x").map(|n| n.brick.as_str()), Some("first"));
}
