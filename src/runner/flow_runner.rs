//! The flow traversal engine.
//!
//! One [`FlowRunner`] serves any number of flows and runs; all run-scoped
//! state lives in the [`FlowContext`]. Within a run, traversal is strictly
//! sequential — fan-out walks successors one after another in edge order —
//! while distinct runs may execute concurrently against the same shared,
//! read-only graph.
//!
//! # Traversal
//!
//! The start set is every trigger node (in definition order), or the stored
//! cursor's successors when resuming. Per node:
//!
//! 1. loop guard — beyond the configured visit ceiling, a repeating node id
//!    abandons its branch with a warning, never an error
//! 2. the node's config is materialized through the template resolver, then
//!    the brick is resolved through the registry (unresolvable → the whole
//!    run aborts before any side effect)
//! 3. an info log entry names the brick and the pre-execution hook fires
//! 4. dispatch by kind: triggers fan out unconditionally; actions may pause
//!    or stop the branch; conditions route in two passes (gates first,
//!    labeled branches second); gates consume their accumulated inputs
//! 5. any brick error fires the failure hook and aborts the *entire run*
//!
//! # Pause/resume
//!
//! An action may suspend the run via the context. The paused branch behaves
//! exactly like a leaf; once the walk returns, the runner snapshots the
//! context (persisting it through the configured pause store, keyed by run
//! id with the configured TTL) and reports [`RunStatus::Paused`]. Resuming
//! reconstructs the context and continues with the unvisited successors of
//! the stored cursor — the pausing node is never re-executed.

use futures_util::future::BoxFuture;
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

use super::config::RunnerConfig;
use super::error::FlowError;
use super::result::{RunResult, RunStatus};
use crate::bricks::BrickError;
use crate::bricks::BrickInstance;
use crate::context::FlowContext;
use crate::events::{EventBus, FlowEvent};
use crate::graph::{EdgeDef, FlowGraph};
use crate::registry::BrickRegistry;
use crate::store::PauseStore;
use crate::template;
use crate::types::{BranchLabel, NodeKind};

enum StartSet {
    Triggers,
    ResumeFrom(String),
}

/// The workflow traversal engine.
///
/// # Examples
///
/// ```rust,no_run
/// use brickflow::graph::FlowGraph;
/// use brickflow::registry::BrickRegistry;
/// use brickflow::runner::FlowRunner;
/// use brickflow::types::NodeKind;
/// use serde_json::json;
/// use std::sync::Arc;
///
/// # async fn example() {
/// let flow = FlowGraph::builder("hello")
///     .add_node("t", NodeKind::Trigger, "manual", json!({}))
///     .add_node("a", NodeKind::Action, "log_message",
///         json!({"message": "Hello {{ name }}!"}))
///     .add_edge("t", "a")
///     .build();
///
/// let runner = FlowRunner::new(Arc::new(BrickRegistry::with_builtins()));
/// let result = runner.run(&flow, json!({"name": "world"})).await;
/// assert!(result.is_completed());
/// # }
/// ```
pub struct FlowRunner {
    registry: Arc<BrickRegistry>,
    pause_store: Option<Arc<dyn PauseStore>>,
    events: EventBus,
    config: RunnerConfig,
}

impl FlowRunner {
    /// A runner over the given brick registry, with the default event bus
    /// (tracing sink), no pause store, and default configuration.
    #[must_use]
    pub fn new(registry: Arc<BrickRegistry>) -> Self {
        Self {
            registry,
            pause_store: None,
            events: EventBus::default(),
            config: RunnerConfig::default(),
        }
    }

    /// Attach a pause store; required for [`resume`](Self::resume) and used
    /// to persist snapshots whenever a run suspends.
    #[must_use]
    pub fn with_pause_store(mut self, store: Arc<dyn PauseStore>) -> Self {
        self.pause_store = Some(store);
        self
    }

    /// Replace the observability event bus.
    #[must_use]
    pub fn with_event_bus(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    /// Override the runner configuration.
    #[must_use]
    pub fn with_config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    /// The registry this runner resolves bricks through.
    #[must_use]
    pub fn registry(&self) -> &Arc<BrickRegistry> {
        &self.registry
    }

    /// Interpret `flow` once with the given initial payload.
    ///
    /// Always yields a terminal [`RunResult`]; failures are reported in the
    /// result rather than as an `Err`, so the complete ordered log and
    /// partial state stay available to the caller.
    #[instrument(skip(self, flow, payload), fields(flow_id = %flow.id()))]
    pub async fn run(&self, flow: &FlowGraph, payload: Value) -> RunResult {
        let ctx = FlowContext::new(flow.id(), payload);
        self.run_with_context(flow, ctx, StartSet::Triggers).await
    }

    /// Resume a previously paused run from its stored snapshot.
    ///
    /// The snapshot is fetched and deleted from the pause store, the context
    /// reconstructed, and traversal re-entered at the cursor's successors.
    /// The same three terminal outcomes apply; a further pause stores a new
    /// snapshot under the same run id.
    #[instrument(skip(self, flow), fields(flow_id = %flow.id()))]
    pub async fn resume(&self, flow: &FlowGraph, run_id: &str) -> Result<RunResult, FlowError> {
        let store = self.pause_store.as_ref().ok_or(FlowError::StoreUnavailable)?;
        let snapshot = store
            .get(run_id)
            .await?
            .ok_or_else(|| FlowError::PausedRunNotFound {
                run_id: run_id.to_string(),
            })?;
        store.delete(run_id).await?;

        let mut ctx = FlowContext::restore(snapshot);
        let cursor = ctx.clear_pause().ok_or_else(|| FlowError::MissingCursor {
            run_id: run_id.to_string(),
        })?;
        tracing::info!(run_id, cursor = %cursor, "resuming paused run");
        Ok(self
            .run_with_context(flow, ctx, StartSet::ResumeFrom(cursor))
            .await)
    }

    /// Invoke compensation on previously executed action nodes, most recent
    /// first.
    ///
    /// The engine never calls this on its own; an external caller decides
    /// when and whether to unwind. Nodes without a compensation are no-ops;
    /// a failing compensation is recorded in the context and the unwind
    /// continues.
    #[instrument(skip(self, flow, ctx, executed_nodes), fields(flow_id = %flow.id()))]
    pub async fn compensate(
        &self,
        flow: &FlowGraph,
        ctx: &mut FlowContext,
        executed_nodes: &[String],
    ) {
        for node_id in executed_nodes.iter().rev() {
            let Some(node) = flow.node(node_id) else {
                continue;
            };
            if node.kind != NodeKind::Action {
                continue;
            }
            let config = template::resolve(&node.config, ctx);
            let Ok(BrickInstance::Action(action)) =
                self.registry.resolve(node.kind, &node.brick, config)
            else {
                continue;
            };
            if let Err(err) = action.compensate(ctx).await {
                ctx.record_error(format!("compensation failed at '{node_id}': {err}"));
                tracing::warn!(node_id = %node_id, error = %err, "compensation failed");
            }
        }
    }

    async fn run_with_context(
        &self,
        flow: &FlowGraph,
        ctx: FlowContext,
        start: StartSet,
    ) -> RunResult {
        self.events.emit(FlowEvent::FlowStarted {
            flow_id: flow.id().to_string(),
            run_id: ctx.run_id().to_string(),
        });

        let mut walk = Walk {
            runner: self,
            flow,
            ctx,
            visited: Vec::new(),
        };

        let outcome = match start {
            StartSet::Triggers => walk.walk_triggers().await,
            StartSet::ResumeFrom(cursor) => walk.walk_resumed(&cursor).await,
        };

        let Walk {
            mut ctx, visited, ..
        } = walk;

        match outcome {
            Err(err) => {
                ctx.record_error(err.to_string());
                self.events.emit(FlowEvent::FlowFailed {
                    flow_id: flow.id().to_string(),
                    run_id: ctx.run_id().to_string(),
                    error: err.to_string(),
                });
                RunResult {
                    status: RunStatus::Failed,
                    context: ctx,
                    error: Some(err),
                    executed_nodes: visited,
                }
            }
            Ok(()) if ctx.is_paused() => {
                let cursor = ctx.pause_cursor().unwrap_or_default().to_string();
                if let Some(store) = &self.pause_store {
                    if let Err(err) = store
                        .put(ctx.run_id(), ctx.snapshot(), self.config.pause_ttl)
                        .await
                    {
                        // The snapshot still travels in the result; the
                        // caller can persist it out-of-band.
                        tracing::warn!(run_id = ctx.run_id(), error = %err, "failed to persist pause snapshot");
                    }
                }
                self.events.emit(FlowEvent::FlowPaused {
                    flow_id: flow.id().to_string(),
                    run_id: ctx.run_id().to_string(),
                    cursor,
                });
                RunResult {
                    status: RunStatus::Paused,
                    context: ctx,
                    error: None,
                    executed_nodes: visited,
                }
            }
            Ok(()) => {
                self.events.emit(FlowEvent::FlowCompleted {
                    flow_id: flow.id().to_string(),
                    run_id: ctx.run_id().to_string(),
                });
                RunResult {
                    status: RunStatus::Completed,
                    context: ctx,
                    error: None,
                    executed_nodes: visited,
                }
            }
        }
    }
}

/// One run's walk over the graph. Owns the context and the visit list the
/// loop guard checks against.
struct Walk<'a> {
    runner: &'a FlowRunner,
    flow: &'a FlowGraph,
    ctx: FlowContext,
    visited: Vec<String>,
}

impl Walk<'_> {
    async fn walk_triggers(&mut self) -> Result<(), FlowError> {
        let trigger_ids: Vec<String> = self
            .flow
            .trigger_nodes()
            .iter()
            .map(|n| n.id.clone())
            .collect();
        for id in trigger_ids {
            self.execute(id).await?;
            if self.ctx.is_paused() || self.ctx.stop_requested() {
                break;
            }
        }
        Ok(())
    }

    async fn walk_resumed(&mut self, cursor: &str) -> Result<(), FlowError> {
        if self.flow.node(cursor).is_none() {
            return Err(FlowError::NodeNotFound {
                id: cursor.to_string(),
            });
        }
        // The cursor node already ran before the pause; continue with its
        // successors only.
        self.execute_successors(cursor).await
    }

    fn execute(&mut self, node_id: String) -> BoxFuture<'_, Result<(), FlowError>> {
        Box::pin(async move {
            if self.visited.len() > self.runner.config.max_visits
                && self.visited.iter().any(|v| *v == node_id)
            {
                tracing::warn!(node_id = %node_id, visits = self.visited.len(), "node visit ceiling reached; abandoning branch");
                self.ctx
                    .warning(format!("node visit ceiling reached at '{node_id}'"));
                return Ok(());
            }

            let node = self
                .flow
                .node(&node_id)
                .ok_or_else(|| FlowError::NodeNotFound {
                    id: node_id.clone(),
                })?
                .clone();
            self.visited.push(node_id.clone());

            if node.brick.is_empty() {
                return Err(FlowError::MissingBrickRef { id: node_id });
            }

            let config = template::resolve(&node.config, &self.ctx);
            let brick = self.runner.registry.resolve(node.kind, &node.brick, config)?;

            self.ctx.info(format!("Executing: {}", brick.name()));
            self.runner.events.emit(FlowEvent::BrickExecuting {
                run_id: self.ctx.run_id().to_string(),
                node_id: node_id.clone(),
                brick: brick.name().to_string(),
            });

            match &brick {
                BrickInstance::Trigger(_) => {
                    self.execute_successors(&node_id).await?;
                }
                BrickInstance::Action(action) => {
                    self.ctx.set_current_node(Some(node_id.clone()));
                    let handled = action.handle(&mut self.ctx).await;
                    self.ctx.set_current_node(None);
                    if let Err(err) = handled {
                        return Err(self.brick_failure(&node_id, brick.name(), err));
                    }
                    if self.ctx.is_paused() || self.ctx.stop_requested() {
                        // Pause propagates upward exactly like reaching a
                        // leaf; no successors execute on this branch.
                        return Ok(());
                    }
                    self.execute_successors(&node_id).await?;
                }
                BrickInstance::Condition(condition) => {
                    let result = match condition.evaluate(&self.ctx).await {
                        Ok(result) => result,
                        Err(err) => return Err(self.brick_failure(&node_id, brick.name(), err)),
                    };
                    self.ctx
                        .info(format!("Condition '{}' = {}", brick.name(), result));
                    self.route_condition(&node_id, result).await?;
                }
                BrickInstance::Gate(gate) => {
                    let inputs = self.ctx.gate_inputs_for(&node_id);
                    let result = match gate.evaluate(&inputs, &self.ctx).await {
                        Ok(result) => result,
                        Err(err) => return Err(self.brick_failure(&node_id, brick.name(), err)),
                    };
                    self.ctx.info(format!(
                        "Gate '{}' = {}",
                        brick.name(),
                        if result { "PASS" } else { "FAIL" }
                    ));
                    self.ctx.clear_gate_inputs(&node_id);
                    self.route_gate(&node_id, result).await?;
                }
            }

            Ok(())
        })
    }

    /// Fan out to every successor, one after another in edge order.
    fn execute_successors<'s>(&'s mut self, node_id: &str) -> BoxFuture<'s, Result<(), FlowError>> {
        let targets: Vec<String> = self
            .flow
            .outgoing(node_id)
            .iter()
            .map(|e| e.target.clone())
            .collect();
        Box::pin(async move {
            for target in targets {
                self.execute(target).await?;
            }
            Ok(())
        })
    }

    /// Two-pass condition routing.
    ///
    /// Pass 1 records the result against every gate target — regardless of
    /// the edge's own label — and executes a gate the moment it has inputs
    /// from all of its incoming edges. Pass 2 follows non-gate edges per
    /// the label matrix. Gates must observe every contributing condition
    /// exactly once, independent of how the downstream branches are labeled.
    async fn route_condition(&mut self, node_id: &str, result: bool) -> Result<(), FlowError> {
        let edges: Vec<EdgeDef> = self.flow.outgoing(node_id).into_iter().cloned().collect();

        for edge in &edges {
            if self.target_is_gate(edge)? {
                self.ctx
                    .record_gate_input(edge.target.as_str(), node_id, result);
                let expected = self.flow.incoming_count(&edge.target);
                if self.ctx.has_all_inputs(&edge.target, expected) {
                    self.execute(edge.target.clone()).await?;
                }
            }
        }

        for edge in &edges {
            if self.target_is_gate(edge)? {
                continue;
            }
            let follow = match edge.label {
                None => result,
                Some(BranchLabel::True) => result,
                Some(BranchLabel::False) => !result,
                Some(BranchLabel::Always) => true,
            };
            if follow {
                self.execute(edge.target.clone()).await?;
            }
        }

        Ok(())
    }

    /// Gate routing: an unlabeled edge is followed only on a passing result
    /// — a failing one makes it a dead end, with no fallback route.
    async fn route_gate(&mut self, node_id: &str, result: bool) -> Result<(), FlowError> {
        let edges: Vec<EdgeDef> = self.flow.outgoing(node_id).into_iter().cloned().collect();
        for edge in &edges {
            let follow = match edge.label {
                Some(BranchLabel::True) => result,
                Some(BranchLabel::False) => !result,
                None => result,
                Some(BranchLabel::Always) => false,
            };
            if follow {
                self.execute(edge.target.clone()).await?;
            }
        }
        Ok(())
    }

    fn target_is_gate(&self, edge: &EdgeDef) -> Result<bool, FlowError> {
        self.flow
            .node(&edge.target)
            .map(|n| n.kind.is_gate())
            .ok_or_else(|| FlowError::NodeNotFound {
                id: edge.target.clone(),
            })
    }

    fn brick_failure(&self, node_id: &str, brick: &str, source: BrickError) -> FlowError {
        self.runner.events.emit(FlowEvent::BrickFailed {
            run_id: self.ctx.run_id().to_string(),
            node_id: node_id.to_string(),
            brick: brick.to_string(),
            error: source.to_string(),
        });
        FlowError::Brick {
            node: node_id.to_string(),
            brick: brick.to_string(),
            source,
        }
    }
}
