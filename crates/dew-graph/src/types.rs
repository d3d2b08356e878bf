//! Core graph types.
//!
//! Nodes are keyed by a kind-prefixed id (`equation:eq_x`, `variable:TIA`,
//! `unit:acres`, `term:total_irrigated_area`) so the four kinds share one
//! id space without collisions.

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// ============================================================================
// NodeKind enum
// ============================================================================

/// Kind of a graph node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Equation,
    Variable,
    Unit,
    Term,
}

impl NodeKind {
    /// Prefix used in node ids.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Equation => "equation",
            Self::Variable => "variable",
            Self::Unit => "unit",
            Self::Term => "term",
        }
    }

    /// Graph-database label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Equation => "Equation",
            Self::Variable => "Variable",
            Self::Unit => "Unit",
            Self::Term => "Term",
        }
    }

    /// Property that uniquely identifies a node of this kind.
    pub fn key_property(&self) -> &'static str {
        match self {
            Self::Equation | Self::Unit => "id",
            Self::Variable | Self::Term => "name",
        }
    }

    /// Build the node id for a natural key.
    ///
    /// ```rust
    /// use dew_graph::NodeKind;
    ///
    /// assert_eq!(NodeKind::Variable.node_id("TIA"), "variable:TIA");
    /// ```
    pub fn node_id(&self, key: &str) -> String {
        format!("{}:{key}", self.prefix())
    }
}

// ============================================================================
// Relationship enum
// ============================================================================

/// Relationship types for graph edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Relationship {
    /// Equation uses a variable.
    Uses,
    /// Variable is measured in a unit.
    HasUnit,
    /// Equation consumes the result of another equation.
    DependsOn,
    /// Term is related to another term.
    RelatedTo,
    /// Variable is the symbol of a term.
    Represents,
}

impl Relationship {
    /// Relationship type name as used in Cypher.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Uses => "USES",
            Self::HasUnit => "HAS_UNIT",
            Self::DependsOn => "DEPENDS_ON",
            Self::RelatedTo => "RELATED_TO",
            Self::Represents => "REPRESENTS",
        }
    }
}

// ============================================================================
// Node struct
// ============================================================================

/// A node in the knowledge graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Kind-prefixed id.
    pub id: String,
    pub kind: NodeKind,
    /// Natural key (equation id, variable name, unit id, term name).
    pub key: String,
    pub properties: BTreeMap<String, serde_json::Value>,
}

impl Node {
    pub fn new(kind: NodeKind, key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            id: kind.node_id(&key),
            kind,
            key,
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// A string property, if present.
    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(|v| v.as_str())
    }
}

// ============================================================================
// Edge struct
// ============================================================================

/// An edge connecting two nodes in the graph.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// Source node id.
    pub from: String,
    /// Target node id.
    pub to: String,
    pub relationship: Relationship,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>, relationship: Relationship) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            relationship,
        }
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -[{}]-> {}", self.from, self.relationship.name(), self.to)
    }
}

// ============================================================================
// KnowledgeGraph struct
// ============================================================================

/// Equation knowledge graph.
///
/// Wraps a petgraph `DiGraph` with an id lookup table.
#[derive(Clone, Debug, Default)]
pub struct KnowledgeGraph {
    pub(crate) graph: DiGraph<Node, Edge>,
    pub(crate) node_indices: HashMap<String, NodeIndex>,
}

impl KnowledgeGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.get_index(id).map(|idx| &self.graph[idx])
    }

    pub fn get_index(&self, id: &str) -> Option<NodeIndex> {
        self.node_indices.get(id).copied()
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node_indices.contains_key(id)
    }

    /// Nodes in insertion order.
    pub fn iter_nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_indices().map(|idx| &self.graph[idx])
    }

    /// Edges in insertion order.
    pub fn iter_edges(&self) -> impl Iterator<Item = &Edge> {
        self.graph.edge_indices().map(|idx| &self.graph[idx])
    }

    /// Nodes of one kind in insertion order.
    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &Node> {
        self.iter_nodes().filter(move |n| n.kind == kind)
    }

    /// Add a node, merging into an existing node with the same id.
    ///
    /// Properties of the new node overwrite existing ones.
    pub fn merge_node(&mut self, node: Node) -> NodeIndex {
        if let Some(&idx) = self.node_indices.get(&node.id) {
            self.graph[idx].properties.extend(node.properties);
            return idx;
        }
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.node_indices.insert(id, idx);
        idx
    }

    /// Add an edge between two existing nodes.
    ///
    /// Returns `false` when either endpoint is missing.
    pub fn add_edge(&mut self, edge: Edge) -> bool {
        match (self.get_index(&edge.from), self.get_index(&edge.to)) {
            (Some(from), Some(to)) => {
                self.graph.add_edge(from, to, edge);
                true
            }
            _ => false,
        }
    }

    /// Nodes reached from `id` over `relationship` edges, in edge
    /// insertion order.
    pub fn neighbors(&self, id: &str, relationship: Relationship, direction: Direction) -> Vec<&Node> {
        let Some(idx) = self.get_index(id) else {
            return Vec::new();
        };
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(idx, direction)
            .filter(|e| e.weight().relationship == relationship)
            .collect();
        edges.sort_by_key(|e| e.id());
        edges
            .into_iter()
            .map(|e| match direction {
                Direction::Outgoing => &self.graph[e.target()],
                Direction::Incoming => &self.graph[e.source()],
            })
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_node_ids_are_prefixed() {
        assert_eq!(NodeKind::Equation.node_id("eq_a"), "equation:eq_a");
        let node = Node::new(NodeKind::Term, "total_irrigated_area");
        assert_eq!(node.id, "term:total_irrigated_area");
        assert_eq!(node.key, "total_irrigated_area");
    }

    #[test]
    fn test_relationship_names() {
        assert_eq!(Relationship::HasUnit.name(), "HAS_UNIT");
        assert_eq!(
            serde_json::to_string(&Relationship::DependsOn).unwrap(),
            "\"DEPENDS_ON\""
        );
    }

    #[test]
    fn test_merge_node_overwrites_properties() {
        let mut g = KnowledgeGraph::new();
        let first = g.merge_node(
            Node::new(NodeKind::Variable, "TIA").with_property("description", "old"),
        );
        let second = g.merge_node(
            Node::new(NodeKind::Variable, "TIA").with_property("description", "new"),
        );
        assert_eq!(first, second);
        assert_eq!(g.node_count(), 1);
        assert_eq!(
            g.get_node("variable:TIA").unwrap().property_str("description"),
            Some("new")
        );
    }

    #[test]
    fn test_add_edge_requires_endpoints() {
        let mut g = KnowledgeGraph::new();
        g.merge_node(Node::new(NodeKind::Equation, "eq_a"));
        g.merge_node(Node::new(NodeKind::Variable, "x"));
        assert!(g.add_edge(Edge::new("equation:eq_a", "variable:x", Relationship::Uses)));
        assert!(!g.add_edge(Edge::new("equation:eq_a", "variable:y", Relationship::Uses)));
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn test_neighbors_in_insertion_order() {
        let mut g = KnowledgeGraph::new();
        g.merge_node(Node::new(NodeKind::Equation, "eq_a"));
        for name in ["c", "a", "b"] {
            g.merge_node(Node::new(NodeKind::Variable, name));
            g.add_edge(Edge::new(
                "equation:eq_a",
                format!("variable:{name}"),
                Relationship::Uses,
            ));
        }
        let keys: Vec<_> = g
            .neighbors("equation:eq_a", Relationship::Uses, Direction::Outgoing)
            .into_iter()
            .map(|n| n.key.as_str())
            .collect();
        assert_eq!(keys, vec!["c", "a", "b"]);
        assert!(
            g.neighbors("variable:a", Relationship::Uses, Direction::Outgoing)
                .is_empty()
        );
        assert_eq!(
            g.neighbors("variable:a", Relationship::Uses, Direction::Incoming).len(),
            1
        );
    }

    #[test]
    fn test_edge_display() {
        let edge = Edge::new("term:a", "term:b", Relationship::RelatedTo);
        assert_eq!(edge.to_string(), "term:a -[RELATED_TO]-> term:b");
    }
}
