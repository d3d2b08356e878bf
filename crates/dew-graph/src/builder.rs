//! Builds the knowledge graph from an equation library.
//!
//! The build runs in two phases: phase 1 creates every node, phase 2
//! creates every edge. Edges to missing nodes are recorded in
//! `BuildStats::dangling_refs` rather than failing the build, and a
//! repeated edge is kept once.

use crate::types::{Edge, KnowledgeGraph, Node, NodeKind, Relationship};
use dew_core::normalize_id;
use dew_model::{EquationLibrary, UnitRegistry, VariableDef};
use serde::Serialize;
use std::collections::HashSet;

/// Statistics from a graph build.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BuildStats {
    pub nodes_created: usize,
    pub edges_created: usize,
    /// Edges skipped because an endpoint does not exist.
    pub dangling_refs: Vec<String>,
    /// Repeated edges that were kept once.
    pub deduped_edges: usize,
}

/// Builder for the knowledge graph.
pub struct GraphBuilder<'a> {
    library: &'a EquationLibrary,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(library: &'a EquationLibrary) -> Self {
        Self { library }
    }

    /// Builds the graph.
    pub fn build(self) -> (KnowledgeGraph, BuildStats) {
        let units = self.library.units();
        let mut graph = KnowledgeGraph::new();
        let mut stats = BuildStats::default();
        let mut pending: Vec<Edge> = Vec::new();

        // ================================================================
        // Phase 1: nodes
        // ================================================================
        for eq in self.library.all_equations() {
            let eq_node = Node::new(NodeKind::Equation, &eq.id)
                .with_property("id", eq.id.as_str())
                .with_property("name", eq.name.as_str())
                .with_property("latex", eq.latex.as_str())
                .with_property("expression", eq.expression.as_str())
                .with_property("domain", eq.domain.as_str());
            let eq_id = eq_node.id.clone();
            graph.merge_node(eq_node);

            for var in &eq.variables {
                let var_node = Node::new(NodeKind::Variable, &var.name)
                    .with_property("name", var.name.as_str())
                    .with_property("description", var.description.as_str());
                let var_id = var_node.id.clone();
                graph.merge_node(var_node);

                let unit_node = unit_node(var, units);
                pending.push(Edge::new(&eq_id, &var_id, Relationship::Uses));
                pending.push(Edge::new(&var_id, &unit_node.id, Relationship::HasUnit));
                graph.merge_node(unit_node);
            }

            for dep in &eq.dependencies {
                pending.push(Edge::new(
                    &eq_id,
                    NodeKind::Equation.node_id(dep),
                    Relationship::DependsOn,
                ));
            }
        }

        let mut represents = Vec::new();
        for term in self.library.all_terms() {
            let mut node = Node::new(NodeKind::Term, &term.name)
                .with_property("name", term.name.as_str())
                .with_property("display_name", term.display_name.as_str())
                .with_property("symbol", term.symbol.as_str())
                .with_property("definition", term.definition.as_str());
            if let Some(unit) = &term.common_unit {
                node = node.with_property("common_unit", unit.as_str());
            }
            let term_id = node.id.clone();
            graph.merge_node(node);

            for related in &term.related_terms {
                pending.push(Edge::new(
                    &term_id,
                    NodeKind::Term.node_id(related),
                    Relationship::RelatedTo,
                ));
            }
            if !term.symbol.is_empty() {
                represents.push(Edge::new(
                    NodeKind::Variable.node_id(&term.symbol),
                    &term_id,
                    Relationship::Represents,
                ));
            }
        }
        stats.nodes_created = graph.node_count();

        // ================================================================
        // Phase 2: edges
        // ================================================================
        let mut seen: HashSet<Edge> = HashSet::new();
        for edge in pending {
            if !graph.contains_node(&edge.from) || !graph.contains_node(&edge.to) {
                log::warn!("Dangling reference: {edge}");
                stats.dangling_refs.push(edge.to_string());
                continue;
            }
            if !seen.insert(edge.clone()) {
                stats.deduped_edges += 1;
                continue;
            }
            if graph.add_edge(edge) {
                stats.edges_created += 1;
            }
        }

        // A term whose symbol no equation uses simply has no variable.
        for edge in represents {
            if graph.contains_node(&edge.from) && seen.insert(edge.clone()) && graph.add_edge(edge)
            {
                stats.edges_created += 1;
            }
        }

        log::info!(
            "Knowledge graph built: {} nodes, {} edges ({} dangling, {} deduplicated)",
            stats.nodes_created,
            stats.edges_created,
            stats.dangling_refs.len(),
            stats.deduped_edges
        );

        (graph, stats)
    }
}

impl KnowledgeGraph {
    /// Build the graph for `library`.
    pub fn build(library: &EquationLibrary) -> (Self, BuildStats) {
        GraphBuilder::new(library).build()
    }
}

/// Unit node for a variable, keyed by the canonical unit id so aliases
/// share one node.
fn unit_node(var: &VariableDef, units: &UnitRegistry) -> Node {
    let node = |key: String| Node::new(NodeKind::Unit, &key).with_property("id", key);
    match units.get(&var.unit) {
        Some(unit) => node(normalize_id(&unit.id))
            .with_property("name", unit.name.as_str())
            .with_property("symbol", unit.display())
            .with_property("latex", unit.latex()),
        None => node(normalize_id(&var.unit))
            .with_property("name", var.unit.as_str())
            .with_property("symbol", var.unit.as_str())
            .with_property("latex", ""),
    }
}
