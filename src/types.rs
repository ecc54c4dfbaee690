//! Core vocabulary for the brickflow workflow engine.
//!
//! This module defines the fundamental types used throughout the system for
//! classifying nodes, labeling branches, and leveling run logs. These are the
//! core domain concepts that define what a flow *is*.
//!
//! # Key Types
//!
//! - [`NodeKind`]: The four node categories a flow graph is built from
//! - [`BranchLabel`]: Optional edge annotation steering conditional routing
//! - [`LogLevel`]: Severity levels for run-scoped log entries
//!
//! # Examples
//!
//! ```rust
//! use brickflow::types::{NodeKind, BranchLabel};
//!
//! let kind = NodeKind::Condition;
//! assert_eq!(kind.encode(), "condition");
//! assert_eq!(NodeKind::decode("condition"), Some(NodeKind::Condition));
//!
//! let label = BranchLabel::False;
//! assert_eq!(label.to_string(), "false");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies the category of a node within a flow graph.
///
/// Every node is one of four kinds, and the kind decides which brick
/// capability the runner dispatches to:
///
/// - [`Trigger`](Self::Trigger): entry point; fans out unconditionally
/// - [`Condition`](Self::Condition): evaluates to a boolean steering routing
/// - [`Action`](Self::Action): performs side effects; may pause the run
/// - [`Gate`](Self::Gate): joins boolean results from multiple conditions
///
/// # Persistence
///
/// `NodeKind` serializes to its lowercase name both through serde and the
/// [`encode`](Self::encode)/[`decode`](Self::decode) pair used in flow
/// definitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Entry-point node that begins traversal when a run starts.
    Trigger,
    /// Boolean-valued node whose result selects outgoing branches.
    Condition,
    /// Side-effecting node; the only kind allowed to pause a run.
    Action,
    /// Join node aggregating boolean inputs from incoming condition edges.
    Gate,
}

impl NodeKind {
    /// Encode a `NodeKind` into its persisted string form.
    ///
    /// ```rust
    /// # use brickflow::types::NodeKind;
    /// assert_eq!(NodeKind::Gate.encode(), "gate");
    /// ```
    #[must_use]
    pub fn encode(&self) -> &'static str {
        match self {
            NodeKind::Trigger => "trigger",
            NodeKind::Condition => "condition",
            NodeKind::Action => "action",
            NodeKind::Gate => "gate",
        }
    }

    /// Decode a persisted string form back into a `NodeKind`.
    ///
    /// Unknown strings yield `None`; flow definitions with made-up kinds are
    /// a structural problem for the validator, not something to coerce.
    pub fn decode(s: &str) -> Option<Self> {
        match s {
            "trigger" => Some(NodeKind::Trigger),
            "condition" => Some(NodeKind::Condition),
            "action" => Some(NodeKind::Action),
            "gate" => Some(NodeKind::Gate),
            _ => None,
        }
    }

    /// Returns `true` if this is a [`Trigger`](Self::Trigger) node.
    #[must_use]
    pub fn is_trigger(&self) -> bool {
        matches!(self, Self::Trigger)
    }

    /// Returns `true` if this is a [`Gate`](Self::Gate) node.
    #[must_use]
    pub fn is_gate(&self) -> bool {
        matches!(self, Self::Gate)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.encode())
    }
}

/// Optional annotation on an edge controlling when it is followed.
///
/// An unlabeled edge (label `None` on [`EdgeDef`]) out of a condition is
/// followed iff the condition evaluated `true`; out of a gate it is likewise
/// followed only on a passing result, with no fallback route for a failing
/// one.
///
/// [`EdgeDef`]: crate::graph::EdgeDef
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchLabel {
    /// Follow when the source node's result is `true`.
    True,
    /// Follow when the source node's result is `false`.
    False,
    /// Follow regardless of the source node's result (conditions only).
    Always,
}

impl fmt::Display for BranchLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::True => f.write_str("true"),
            Self::False => f.write_str("false"),
            Self::Always => f.write_str("always"),
        }
    }
}

/// Severity of a run-scoped log entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Notice,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// Parse a level name, defaulting to [`Info`](Self::Info) for unknown
    /// input so brick configuration can never break logging.
    #[must_use]
    pub fn parse_or_info(s: &str) -> Self {
        match s {
            "debug" => Self::Debug,
            "notice" => Self::Notice,
            "warning" => Self::Warning,
            "error" => Self::Error,
            "critical" => Self::Critical,
            _ => Self::Info,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Notice => "notice",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        };
        f.write_str(s)
    }
}
