//! # Brickflow: Graph-based Workflow Automation Engine
//!
//! Brickflow interprets directed graphs of typed nodes — triggers,
//! conditions, actions, and gates — connected by labeled edges. Each
//! invocation is a *run*: the engine walks the graph from its trigger nodes,
//! dispatches into pluggable behavior units ("bricks"), and produces a
//! terminal result carrying the complete run state and ordered log.
//!
//! ## Core Concepts
//!
//! - **Flow graph**: immutable nodes/edges consumed per run
//! - **Bricks**: per-capability trait objects resolved by opaque reference
//! - **Context**: run-scoped variables, logs, pause cursor, gate bookkeeping
//! - **Templates**: `{{ path | filters }}` references materialized into
//!   brick configuration before every invocation
//! - **Runner**: sequential traversal with branch fan-out, multi-input gate
//!   joins, mid-graph pause/resume, and deterministic failure propagation
//!
//! ## Quick Start
//!
//! ```rust
//! use brickflow::graph::FlowGraph;
//! use brickflow::registry::BrickRegistry;
//! use brickflow::runner::FlowRunner;
//! use brickflow::types::{BranchLabel, NodeKind};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let flow = FlowGraph::builder("orders")
//!     .add_node("start", NodeKind::Trigger, "manual", json!({}))
//!     .add_node("check", NodeKind::Condition, "field_equals",
//!         json!({"field": "status", "value": "active", "operator": "=="}))
//!     .add_node("notify", NodeKind::Action, "log_message",
//!         json!({"message": "Order {{ order_id }} is active"}))
//!     .add_edge("start", "check")
//!     .add_labeled_edge("check", "notify", BranchLabel::True)
//!     .build();
//!
//! let runner = FlowRunner::new(Arc::new(BrickRegistry::with_builtins()));
//! let result = runner
//!     .run(&flow, json!({"status": "active", "order_id": "ORD-1"}))
//!     .await;
//! assert!(result.is_completed());
//! # }
//! ```
//!
//! ## Pause and Resume
//!
//! An action may suspend a run (for example, the built-in `await_approval`
//! brick) — the runner snapshots the context into the configured
//! [`PauseStore`](store::PauseStore) and reports a paused result. Resuming
//! by run id continues at the suspension point's successors:
//!
//! ```rust,no_run
//! # use brickflow::{graph::FlowGraph, registry::BrickRegistry, runner::FlowRunner};
//! # use brickflow::store::InMemoryPauseStore;
//! # use std::sync::Arc;
//! # async fn example(flow: FlowGraph) {
//! let store = Arc::new(InMemoryPauseStore::new());
//! let runner = FlowRunner::new(Arc::new(BrickRegistry::with_builtins()))
//!     .with_pause_store(store);
//!
//! let paused = runner.run(&flow, serde_json::json!({})).await;
//! assert!(paused.is_paused());
//!
//! // ... later, after the human said yes:
//! let done = runner.resume(&flow, paused.context.run_id()).await.unwrap();
//! # }
//! ```
//!
//! ## Module Guide
//!
//! - [`graph`] - Flow definition: nodes, edges, builder, adjacency index
//! - [`context`] - Run-scoped state and its persisted snapshot form
//! - [`template`] - Variable reference resolution and the filter pipeline
//! - [`bricks`] - The brick capability traits and configuration access
//! - [`registry`] - Dynamic-by-name brick resolution
//! - [`runner`] - The traversal engine, results, errors, configuration
//! - [`store`] - Pause-snapshot persistence backends
//! - [`events`] - Observability hooks (sinks must not alter control flow)
//! - [`builtin`] - The built-in brick catalog
//! - [`validator`] - Structural validation, separate from the engine
//! - [`trigger_manager`] - Live trigger listener lifecycle

pub mod bricks;
pub mod builtin;
pub mod context;
pub mod events;
pub mod graph;
pub mod registry;
pub mod runner;
pub mod store;
pub mod telemetry;
pub mod template;
pub mod trigger_manager;
pub mod types;
pub mod utils;
pub mod validator;
