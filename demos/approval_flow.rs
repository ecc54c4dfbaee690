//! End-to-end demo: a purchase approval flow that pauses for sign-off.
//!
//! Run with: `cargo run --example approval_flow`

use brickflow::graph::FlowGraph;
use brickflow::registry::BrickRegistry;
use brickflow::runner::FlowRunner;
use brickflow::store::InMemoryPauseStore;
use brickflow::types::{BranchLabel, NodeKind};
use serde_json::json;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    brickflow::telemetry::init();

    let flow = FlowGraph::builder("purchase-approval")
        .name("Purchase approval")
        .add_node("start", NodeKind::Trigger, "manual", json!({}))
        .add_node(
            "needs_review",
            NodeKind::Condition,
            "field_greater_than",
            json!({"field": "amount", "value": 500, "operator": ">"}),
        )
        .add_node(
            "wait",
            NodeKind::Action,
            "await_approval",
            json!({"message": "Purchase of {{ amount }} by {{ requester }} needs sign-off"}),
        )
        .add_node(
            "approve",
            NodeKind::Action,
            "set_variable",
            json!({
                "mode": "single",
                "variable_name": "outcome",
                "variable_value": "approved for {{ requester | ucwords }}",
                "value_type": "string",
            }),
        )
        .add_edge("start", "needs_review")
        .add_labeled_edge("needs_review", "wait", BranchLabel::True)
        .add_labeled_edge("needs_review", "approve", BranchLabel::False)
        .add_edge("wait", "approve")
        .build();

    let store = Arc::new(InMemoryPauseStore::new());
    let runner = FlowRunner::new(Arc::new(BrickRegistry::with_builtins()))
        .with_pause_store(store.clone());

    let payload = json!({"amount": 1200, "requester": "ada lovelace"});
    let paused = runner.run(&flow, payload).await;
    println!(
        "first pass: {} (cursor = {:?})",
        paused.status,
        paused.context.pause_cursor()
    );

    // Somebody clicked "approve" — continue the run.
    let resumed = runner
        .resume(&flow, paused.context.run_id())
        .await
        .expect("stored run resumes");
    println!(
        "second pass: {} (outcome = {:?})",
        resumed.status,
        resumed.context.get("outcome")
    );

    for entry in resumed.context.logs() {
        println!("  [{}] {}", entry.level, entry.message);
    }
}
