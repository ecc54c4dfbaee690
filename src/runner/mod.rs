//! Run execution: the traversal engine and its supporting types.
//!
//! The runner interprets a [`FlowGraph`](crate::graph::FlowGraph) once per
//! invocation: it builds (or restores) a [`FlowContext`], walks nodes
//! starting from the trigger set or a resume cursor, dispatches into bricks
//! resolved through the registry, and hands back a terminal [`RunResult`].
//!
//! # Architecture
//!
//! - [`FlowRunner`] — the engine: start set, per-node dispatch, two-pass
//!   condition routing, gate joins, pause/resume, failure propagation
//! - [`RunnerConfig`] — loop-guard ceiling and pause retention window
//! - [`RunResult`] / [`RunRecord`] — terminal outcome and its persistable form
//! - [`FlowError`] — the definition/execution error taxonomy
//!
//! [`FlowContext`]: crate::context::FlowContext

pub mod config;
pub mod error;
pub mod flow_runner;
pub mod result;

pub use config::RunnerConfig;
pub use error::FlowError;
pub use flow_runner::FlowRunner;
pub use result::{RunRecord, RunResult, RunStatus};
