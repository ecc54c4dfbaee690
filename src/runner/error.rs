//! The run-level error taxonomy.

use miette::Diagnostic;
use thiserror::Error;

use crate::bricks::BrickError;
use crate::registry::RegistryError;
use crate::store::StoreError;

/// Errors that abort a run (or prevent one from resuming).
///
/// Two families matter to callers:
///
/// - **definition errors** — the flow references something that does not
///   exist (a node, a brick). These abort before the offending node has any
///   side effect; [`is_definition`](Self::is_definition) returns `true`.
/// - **execution errors** — a brick call failed mid-run. Partial state is
///   retained in the returned context.
///
/// Loop-guard hits are deliberately *not* errors: a runaway branch is
/// abandoned with a warning log entry and the run continues.
#[derive(Debug, Error, Diagnostic)]
pub enum FlowError {
    /// An edge or cursor referenced a node id absent from the graph.
    #[error("node not found: {id}")]
    #[diagnostic(
        code(brickflow::runner::node_not_found),
        help("The flow definition references a node id that does not exist.")
    )]
    NodeNotFound { id: String },

    /// A node carries no brick reference.
    #[error("node {id} has no brick reference")]
    #[diagnostic(code(brickflow::runner::missing_brick_ref))]
    MissingBrickRef { id: String },

    /// The registry has no brick under the referenced name.
    #[error(transparent)]
    #[diagnostic(transparent)]
    UnknownBrick(#[from] RegistryError),

    /// A brick call raised during `handle`/`evaluate`.
    #[error("brick '{brick}' failed at node {node}: {source}")]
    #[diagnostic(code(brickflow::runner::brick_failed))]
    Brick {
        node: String,
        brick: String,
        #[source]
        source: BrickError,
    },

    /// `resume` was called on a runner with no pause store configured.
    #[error("no pause store configured; cannot resume runs")]
    #[diagnostic(
        code(brickflow::runner::store_unavailable),
        help("Attach a store with FlowRunner::with_pause_store before resuming.")
    )]
    StoreUnavailable,

    /// No stored snapshot exists for the run id (never paused, expired, or
    /// already resumed).
    #[error("paused run not found: {run_id}")]
    #[diagnostic(code(brickflow::runner::paused_run_not_found))]
    PausedRunNotFound { run_id: String },

    /// A stored snapshot carries no resume cursor.
    #[error("stored snapshot for run {run_id} has no resume cursor")]
    #[diagnostic(code(brickflow::runner::missing_cursor))]
    MissingCursor { run_id: String },

    /// The pause store failed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),
}

impl FlowError {
    /// Whether this is a definition error (aborts before any side effect).
    #[must_use]
    pub fn is_definition(&self) -> bool {
        matches!(
            self,
            Self::NodeNotFound { .. } | Self::MissingBrickRef { .. } | Self::UnknownBrick(_)
        )
    }
}
