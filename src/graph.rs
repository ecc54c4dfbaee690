//! Flow graph model: immutable node/edge structure consumed per run.
//!
//! A [`FlowGraph`] is an ordered collection of [`NodeDef`]s and [`EdgeDef`]s
//! plus string-keyed lookup tables (node index, outgoing adjacency, incoming
//! counts) built once at construction. The runner only reads it; several
//! concurrent runs may share one graph.
//!
//! Graphs are built either fluently through [`FlowGraphBuilder`] or from a
//! JSON definition via [`FlowGraph::from_value`]. Structural problems
//! (dangling edges, duplicate ids, missing triggers) are the
//! [`validator`](crate::validator)'s concern, not enforced here.
//!
//! # Examples
//!
//! ```rust
//! use brickflow::graph::FlowGraph;
//! use brickflow::types::{BranchLabel, NodeKind};
//! use serde_json::json;
//!
//! let flow = FlowGraph::builder("order-flow")
//!     .add_node("t1", NodeKind::Trigger, "manual", json!({}))
//!     .add_node("c1", NodeKind::Condition, "field_equals",
//!         json!({"field": "status", "value": "active", "operator": "=="}))
//!     .add_node("a1", NodeKind::Action, "log_message", json!({"message": "ok"}))
//!     .add_edge("t1", "c1")
//!     .add_labeled_edge("c1", "a1", BranchLabel::True)
//!     .build();
//!
//! assert_eq!(flow.trigger_nodes().len(), 1);
//! assert_eq!(flow.incoming_count("c1"), 1);
//! ```

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{BranchLabel, NodeKind};

/// A graph vertex referencing a brick and its configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeDef {
    /// Unique id within the graph.
    pub id: String,
    /// Node category deciding brick dispatch.
    pub kind: NodeKind,
    /// Opaque brick reference resolved through the registry.
    pub brick: String,
    /// Brick configuration; values may embed template references.
    #[serde(default = "default_config")]
    pub config: Value,
}

fn default_config() -> Value {
    Value::Object(serde_json::Map::new())
}

/// A directed connection between two nodes, optionally branch-labeled.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EdgeDef {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<BranchLabel>,
}

#[derive(Debug, Serialize, Deserialize)]
struct FlowGraphDef {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default = "default_active")]
    active: bool,
    #[serde(default)]
    nodes: Vec<NodeDef>,
    #[serde(default)]
    edges: Vec<EdgeDef>,
}

fn default_active() -> bool {
    true
}

/// Immutable flow definition with arena/index lookups.
#[derive(Clone, Debug)]
pub struct FlowGraph {
    id: String,
    name: String,
    active: bool,
    nodes: Vec<NodeDef>,
    edges: Vec<EdgeDef>,
    node_index: FxHashMap<String, usize>,
    outgoing: FxHashMap<String, Vec<usize>>,
    incoming_counts: FxHashMap<String, usize>,
}

impl FlowGraph {
    /// Start building a graph fluently.
    #[must_use]
    pub fn builder(id: impl Into<String>) -> FlowGraphBuilder {
        FlowGraphBuilder::new(id)
    }

    /// Deserialize a graph from a JSON definition
    /// (`{id, name?, active?, nodes, edges}`).
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let def: FlowGraphDef = serde_json::from_value(value)?;
        Ok(Self::assemble(def.id, def.name, def.active, def.nodes, def.edges))
    }

    fn assemble(
        id: String,
        name: String,
        active: bool,
        nodes: Vec<NodeDef>,
        edges: Vec<EdgeDef>,
    ) -> Self {
        let mut node_index = FxHashMap::default();
        for (i, node) in nodes.iter().enumerate() {
            // First definition wins; duplicates are the validator's problem.
            node_index.entry(node.id.clone()).or_insert(i);
        }
        let mut outgoing: FxHashMap<String, Vec<usize>> = FxHashMap::default();
        let mut incoming_counts: FxHashMap<String, usize> = FxHashMap::default();
        for (i, edge) in edges.iter().enumerate() {
            outgoing.entry(edge.source.clone()).or_default().push(i);
            *incoming_counts.entry(edge.target.clone()).or_default() += 1;
        }
        Self {
            id,
            name,
            active,
            nodes,
            edges,
            node_index,
            outgoing,
            incoming_counts,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether live trigger listeners should be registered for this flow.
    #[must_use]
    pub fn active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn nodes(&self) -> &[NodeDef] {
        &self.nodes
    }

    #[must_use]
    pub fn edges(&self) -> &[EdgeDef] {
        &self.edges
    }

    /// Look a node up by id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&NodeDef> {
        self.node_index.get(id).map(|&i| &self.nodes[i])
    }

    /// Outgoing edges of a node, in definition order.
    #[must_use]
    pub fn outgoing(&self, id: &str) -> Vec<&EdgeDef> {
        self.outgoing
            .get(id)
            .map(|indexes| indexes.iter().map(|&i| &self.edges[i]).collect())
            .unwrap_or_default()
    }

    /// Number of edges pointing at a node (a gate's expected input count).
    #[must_use]
    pub fn incoming_count(&self, id: &str) -> usize {
        self.incoming_counts.get(id).copied().unwrap_or(0)
    }

    /// All trigger nodes, in definition order.
    #[must_use]
    pub fn trigger_nodes(&self) -> Vec<&NodeDef> {
        self.nodes.iter().filter(|n| n.kind.is_trigger()).collect()
    }
}

/// Fluent constructor for [`FlowGraph`].
///
/// Edge ids are generated (`e1`, `e2`, ...) unless supplied through
/// [`add_edge_def`](Self::add_edge_def).
#[must_use]
pub struct FlowGraphBuilder {
    id: String,
    name: String,
    active: bool,
    nodes: Vec<NodeDef>,
    edges: Vec<EdgeDef>,
}

impl FlowGraphBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            active: true,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Add a node with the given kind, brick reference, and configuration.
    pub fn add_node(
        mut self,
        id: impl Into<String>,
        kind: NodeKind,
        brick: impl Into<String>,
        config: Value,
    ) -> Self {
        self.nodes.push(NodeDef {
            id: id.into(),
            kind,
            brick: brick.into(),
            config,
        });
        self
    }

    /// Add an unlabeled edge.
    pub fn add_edge(self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.push_edge(source.into(), target.into(), None)
    }

    /// Add a branch-labeled edge.
    pub fn add_labeled_edge(
        self,
        source: impl Into<String>,
        target: impl Into<String>,
        label: BranchLabel,
    ) -> Self {
        self.push_edge(source.into(), target.into(), Some(label))
    }

    /// Add a fully specified edge record.
    pub fn add_edge_def(mut self, edge: EdgeDef) -> Self {
        self.edges.push(edge);
        self
    }

    fn push_edge(mut self, source: String, target: String, label: Option<BranchLabel>) -> Self {
        let id = format!("e{}", self.edges.len() + 1);
        self.edges.push(EdgeDef {
            id,
            source,
            target,
            label,
        });
        self
    }

    /// Finish building the graph and construct its lookup tables.
    pub fn build(self) -> FlowGraph {
        FlowGraph::assemble(self.id, self.name, self.active, self.nodes, self.edges)
    }
}
