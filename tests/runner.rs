//! Traversal engine behavior: start set, branching, failure propagation,
//! loop guard, stop signal, and compensation.

mod common;

use brickflow::events::{ChannelSink, EventBus, FlowEvent};
use brickflow::graph::FlowGraph;
use brickflow::runner::{FlowRunner, RunnerConfig, RunStatus};
use brickflow::types::{BranchLabel, LogLevel, NodeKind};
use common::{test_registry, trail};
use serde_json::json;
use std::sync::Arc;

fn runner() -> FlowRunner {
    FlowRunner::new(Arc::new(test_registry()))
}

#[tokio::test]
async fn linear_flow_completes_and_visits_each_node_once() {
    let result = runner().run(&common::linear_flow(), json!({})).await;

    assert!(result.is_completed());
    assert_eq!(trail(&result.context), vec!["a", "b"]);
    assert_eq!(result.executed_nodes, vec!["t", "a", "b"]);
}

#[tokio::test]
async fn true_branch_runs_and_false_branch_never_executes() {
    let result = runner()
        .run(&common::condition_flow(), json!({"field": "x", "status": "active"}))
        .await;

    assert!(result.is_completed());
    assert_eq!(trail(&result.context), vec!["a"]);

    let messages: Vec<&str> = result
        .context
        .logs()
        .iter()
        .map(|l| l.message.as_str())
        .collect();
    assert!(messages.iter().any(|m| m.contains("Condition 'Field Equals' = true")));
    // The log shows T, C, A only; B never appears.
    assert!(messages.iter().any(|m| m.contains("Executing: Manual")));
    assert_eq!(
        messages.iter().filter(|m| m.contains("Executing: Probe")).count(),
        1
    );
}

#[tokio::test]
async fn false_result_takes_the_false_labeled_branch() {
    let result = runner()
        .run(&common::condition_flow(), json!({"status": "archived"}))
        .await;

    assert!(result.is_completed());
    assert_eq!(trail(&result.context), vec!["b"]);
}

#[tokio::test]
async fn unlabeled_condition_edge_follows_only_on_true() {
    let flow = FlowGraph::builder("unlabeled")
        .add_node("t", NodeKind::Trigger, "manual", json!({}))
        .add_node(
            "c",
            NodeKind::Condition,
            "field_equals",
            json!({"field": "go", "value": true}),
        )
        .add_node("a", NodeKind::Action, "probe", json!({"marker": "a"}))
        .add_edge("t", "c")
        .add_edge("c", "a")
        .build();

    let hit = runner().run(&flow, json!({"go": true})).await;
    assert_eq!(trail(&hit.context), vec!["a"]);

    let miss = runner().run(&flow, json!({"go": false})).await;
    assert!(miss.is_completed());
    assert!(trail(&miss.context).is_empty());
}

#[tokio::test]
async fn always_labeled_edge_runs_regardless_of_result() {
    let flow = FlowGraph::builder("always")
        .add_node("t", NodeKind::Trigger, "manual", json!({}))
        .add_node(
            "c",
            NodeKind::Condition,
            "field_equals",
            json!({"field": "go", "value": true}),
        )
        .add_node("audit", NodeKind::Action, "probe", json!({"marker": "audit"}))
        .add_edge("t", "c")
        .add_labeled_edge("c", "audit", BranchLabel::Always)
        .build();

    let result = runner().run(&flow, json!({"go": false})).await;
    assert_eq!(trail(&result.context), vec!["audit"]);
}

#[tokio::test]
async fn brick_failure_aborts_the_entire_run() {
    let flow = FlowGraph::builder("failing")
        .add_node("t", NodeKind::Trigger, "manual", json!({}))
        .add_node("ok", NodeKind::Action, "probe", json!({"marker": "ok"}))
        .add_node("bad", NodeKind::Action, "failing", json!({}))
        .add_node("never", NodeKind::Action, "probe", json!({"marker": "never"}))
        .add_edge("t", "ok")
        .add_edge("ok", "bad")
        .add_edge("bad", "never")
        .build();

    let (tx, rx) = flume::unbounded();
    let runner = FlowRunner::new(Arc::new(test_registry()))
        .with_event_bus(EventBus::with_sinks(vec![Box::new(ChannelSink::new(tx))]));
    let result = runner.run(&flow, json!({})).await;

    assert!(result.is_failed());
    assert_eq!(trail(&result.context), vec!["ok"]);
    let error = result.error.expect("failure carries the causing error");
    assert!(!error.is_definition());
    assert!(error.to_string().contains("boom"));

    let events: Vec<FlowEvent> = rx.drain().collect();
    assert!(events.iter().any(|e| matches!(e, FlowEvent::BrickFailed { .. })));
    assert!(events.iter().any(|e| matches!(e, FlowEvent::FlowFailed { .. })));
}

#[tokio::test]
async fn condition_failure_also_fails_the_run() {
    let flow = FlowGraph::builder("cond-fail")
        .add_node("t", NodeKind::Trigger, "manual", json!({}))
        .add_node("c", NodeKind::Condition, "failing_condition", json!({}))
        .add_node("a", NodeKind::Action, "probe", json!({"marker": "a"}))
        .add_edge("t", "c")
        .add_labeled_edge("c", "a", BranchLabel::True)
        .build();

    let result = runner().run(&flow, json!({})).await;
    assert!(result.is_failed());
    assert!(trail(&result.context).is_empty());
}

#[tokio::test]
async fn unknown_brick_is_a_definition_error_with_no_side_effects() {
    let flow = FlowGraph::builder("unknown")
        .add_node("t", NodeKind::Trigger, "manual", json!({}))
        .add_node("ghost", NodeKind::Action, "no_such_brick", json!({}))
        .add_edge("t", "ghost")
        .build();

    let result = runner().run(&flow, json!({})).await;
    assert!(result.is_failed());
    let error = result.error.expect("definition error attached");
    assert!(error.is_definition());
    assert!(trail(&result.context).is_empty());
}

#[tokio::test]
async fn dangling_edge_target_fails_the_run() {
    let flow = FlowGraph::builder("dangling")
        .add_node("t", NodeKind::Trigger, "manual", json!({}))
        .add_edge("t", "missing")
        .build();

    let result = runner().run(&flow, json!({})).await;
    assert!(result.is_failed());
    assert!(result.error.expect("error").is_definition());
}

#[tokio::test]
async fn loop_guard_abandons_branch_with_warning_not_error() {
    let ceiling = 10;
    let runner = FlowRunner::new(Arc::new(test_registry()))
        .with_config(RunnerConfig::default().with_max_visits(ceiling));
    let result = runner.run(&common::cyclic_flow(), json!({})).await;

    assert!(result.is_completed());
    assert!(result.error.is_none());
    // Ceiling + the repeat detection bound the total visit count.
    assert!(result.executed_nodes.len() <= ceiling + 2);
    assert!(
        result
            .context
            .logs()
            .iter()
            .any(|l| l.level == LogLevel::Warning && l.message.contains("visit ceiling"))
    );
}

#[tokio::test]
async fn stop_flow_prevents_successors_but_completes() {
    let flow = FlowGraph::builder("stopping")
        .add_node("t", NodeKind::Trigger, "manual", json!({}))
        .add_node(
            "stop",
            NodeKind::Action,
            "stop_flow",
            json!({"stop_type": "complete", "reason": "done early"}),
        )
        .add_node("never", NodeKind::Action, "probe", json!({"marker": "never"}))
        .add_edge("t", "stop")
        .add_edge("stop", "never")
        .build();

    let result = runner().run(&flow, json!({})).await;
    assert!(result.is_completed());
    assert!(trail(&result.context).is_empty());
    assert!(result.context.stop_requested());
    assert_eq!(result.context.get("_stop_type"), Some(&json!("complete")));
}

#[tokio::test]
async fn multiple_triggers_walk_in_sequence() {
    let flow = FlowGraph::builder("two-triggers")
        .add_node("t1", NodeKind::Trigger, "manual", json!({}))
        .add_node("t2", NodeKind::Trigger, "manual", json!({}))
        .add_node("a", NodeKind::Action, "probe", json!({"marker": "a"}))
        .add_node("b", NodeKind::Action, "probe", json!({"marker": "b"}))
        .add_edge("t1", "a")
        .add_edge("t2", "b")
        .build();

    let result = runner().run(&flow, json!({})).await;
    assert_eq!(trail(&result.context), vec!["a", "b"]);
}

#[tokio::test]
async fn config_templates_materialize_before_invocation() {
    let flow = FlowGraph::builder("templated")
        .add_node("t", NodeKind::Trigger, "manual", json!({}))
        .add_node(
            "set",
            NodeKind::Action,
            "set_variable",
            json!({
                "mode": "single",
                "variable_name": "greeting",
                "variable_value": "Hello {{ user.name | ucwords }}",
                "value_type": "string",
            }),
        )
        .add_edge("t", "set")
        .build();

    let result = runner()
        .run(&flow, json!({"user": {"name": "ada lovelace"}}))
        .await;
    assert_eq!(
        result.context.get("greeting"),
        Some(&json!("Hello Ada Lovelace"))
    );
}

#[tokio::test]
async fn compensation_unwinds_reverse_chronologically() {
    let flow = FlowGraph::builder("compensated")
        .add_node("t", NodeKind::Trigger, "manual", json!({}))
        .add_node("one", NodeKind::Action, "compensable", json!({"marker": "one"}))
        .add_node("two", NodeKind::Action, "compensable", json!({"marker": "two"}))
        .add_edge("t", "one")
        .add_edge("one", "two")
        .build();

    let runner = runner();
    let result = runner.run(&flow, json!({})).await;
    assert_eq!(trail(&result.context), vec!["do:one", "do:two"]);

    let mut ctx = result.context;
    runner.compensate(&flow, &mut ctx, &result.executed_nodes).await;
    assert_eq!(trail(&ctx), vec!["do:one", "do:two", "undo:two", "undo:one"]);
}

#[tokio::test]
async fn compensation_failures_are_logged_not_rethrown() {
    let flow = FlowGraph::builder("broken-comp")
        .add_node("t", NodeKind::Trigger, "manual", json!({}))
        .add_node("x", NodeKind::Action, "broken_compensation", json!({}))
        .add_node("y", NodeKind::Action, "compensable", json!({"marker": "y"}))
        .add_edge("t", "x")
        .add_edge("x", "y")
        .build();

    let runner = runner();
    let result = runner.run(&flow, json!({})).await;
    let mut ctx = result.context;
    runner.compensate(&flow, &mut ctx, &result.executed_nodes).await;

    // The failing compensation is recorded and the unwind continues.
    assert!(ctx.errors().iter().any(|e| e.contains("compensation failed")));
    assert_eq!(trail(&ctx), vec!["do:broken", "do:y", "undo:y"]);
}

#[tokio::test]
async fn run_record_captures_the_outcome() {
    let result = runner()
        .run(&common::linear_flow(), json!({"seed": 7}))
        .await;
    let record = result.record();

    assert_eq!(record.status, RunStatus::Completed);
    assert_eq!(record.flow_id, "linear");
    assert_eq!(record.payload.get("seed"), Some(&json!(7)));
    assert!(record.error.is_none());
    assert!(record.duration_secs() >= 0);
    assert!(!record.logs.is_empty());
}
