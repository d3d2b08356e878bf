//! Graph queries used by problem generation.
//!
//! - [`KnowledgeGraph::equation_info`]: equation name, LaTeX, and variables with units
//! - [`KnowledgeGraph::variables_with_units`]: variable name to unit name
//! - [`KnowledgeGraph::hints`]: equations, glossary terms, and a solution path for a problem
//! - [`KnowledgeGraph::dependency_order`]: topological order over `DEPENDS_ON`

use crate::types::{KnowledgeGraph, Node, NodeKind, Relationship};
use dew_core::{Error, Result};
use dew_model::ProblemInstance;
use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::visit::{EdgeFiltered, EdgeRef};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

// ============================================================================
// Result types
// ============================================================================

/// A variable as used by an equation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariableInfo {
    pub name: String,
    pub description: String,
    pub unit: Option<String>,
    pub unit_latex: Option<String>,
}

/// Details of one equation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EquationInfo {
    pub name: String,
    pub latex: String,
    pub variables: Vec<VariableInfo>,
}

impl EquationInfo {
    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|v| v.name.as_str())
    }
}

/// A term related to a hinted term.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RelatedTermInfo {
    pub name: String,
    pub display_name: String,
    pub definition: String,
}

/// Glossary entry included in hints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TermInfo {
    pub display_name: String,
    pub definition: String,
    pub related_terms: Vec<RelatedTermInfo>,
}

/// One step of a solution path: a target and the equations that can
/// produce it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolutionStep {
    pub target: String,
    pub equations: Vec<String>,
}

/// Reasoning hints for a problem.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Hints {
    #[serde(default)]
    pub equations: BTreeMap<String, EquationInfo>,
    #[serde(default)]
    pub terms: BTreeMap<String, TermInfo>,
    #[serde(default)]
    pub solution_path: Vec<SolutionStep>,
}

// ============================================================================
// Queries
// ============================================================================

impl KnowledgeGraph {
    /// Name, LaTeX, and variables of an equation.
    pub fn equation_info(&self, eq_id: &str) -> Option<EquationInfo> {
        let id = NodeKind::Equation.node_id(eq_id);
        let node = self.get_node(&id)?;
        let variables = self
            .neighbors(&id, Relationship::Uses, Direction::Outgoing)
            .into_iter()
            .map(|var| {
                let unit = self
                    .neighbors(&var.id, Relationship::HasUnit, Direction::Outgoing)
                    .into_iter()
                    .next();
                VariableInfo {
                    name: var.key.clone(),
                    description: prop(var, "description"),
                    unit: unit.map(|u| prop(u, "name")),
                    unit_latex: unit.map(|u| prop(u, "latex")),
                }
            })
            .collect();
        Some(EquationInfo {
            name: prop(node, "name"),
            latex: prop(node, "latex"),
            variables,
        })
    }

    /// Unit name of every variable, optionally restricted to `filter`.
    ///
    /// A variable declared with several units maps to the last one.
    pub fn variables_with_units(&self, filter: Option<&[String]>) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        for var in self.nodes_of_kind(NodeKind::Variable) {
            if filter.is_some_and(|names| !names.contains(&var.key)) {
                continue;
            }
            if let Some(unit) = self
                .neighbors(&var.id, Relationship::HasUnit, Direction::Outgoing)
                .last()
            {
                out.insert(var.key.clone(), prop(unit, "name"));
            }
        }
        out
    }

    /// Hints for a problem.
    ///
    /// Targets are ordered so that each step's equation has every other
    /// variable known, either given or solved by an earlier step; each
    /// step keeps only the equations usable at that point. Targets that
    /// cannot be reached this way follow in declaration order with every
    /// equation that mentions them.
    pub fn hints(&self, problem: &ProblemInstance, include_terms: bool) -> Hints {
        let mut hints = Hints::default();

        let mut used: Vec<(&str, EquationInfo)> = Vec::new();
        for eq_id in &problem.equations_used {
            match self.equation_info(eq_id) {
                Some(info) => {
                    hints.equations.insert(eq_id.clone(), info.clone());
                    used.push((eq_id.as_str(), info));
                }
                None => log::warn!("Equation {eq_id} not found in the knowledge graph"),
            }
        }

        if include_terms {
            hints.terms = self.term_hints(&problem.target_variables);
        }

        let mut known: BTreeSet<&str> = problem.given_values.keys().map(String::as_str).collect();
        let mut remaining: Vec<&str> = problem.target_variables.iter().map(String::as_str).collect();

        while !remaining.is_empty() {
            let next = remaining.iter().enumerate().find_map(|(pos, target)| {
                let usable: Vec<String> = used
                    .iter()
                    .filter(|(_, info)| {
                        info.variable_names().any(|v| v == *target)
                            && info
                                .variable_names()
                                .all(|v| v == *target || known.contains(v))
                    })
                    .map(|(id, _)| id.to_string())
                    .collect();
                (!usable.is_empty()).then_some((pos, usable))
            });
            let Some((pos, equations)) = next else {
                break;
            };
            let target = remaining.remove(pos);
            known.insert(target);
            hints.solution_path.push(SolutionStep {
                target: target.to_string(),
                equations,
            });
        }

        for target in remaining {
            let equations: Vec<String> = used
                .iter()
                .filter(|(_, info)| info.variable_names().any(|v| v == target))
                .map(|(id, _)| id.to_string())
                .collect();
            if equations.is_empty() {
                log::warn!("No equation in {} mentions target {target}", problem.id);
                continue;
            }
            hints.solution_path.push(SolutionStep {
                target: target.to_string(),
                equations,
            });
        }

        hints
    }

    /// Glossary entries for targets, matched by term name or symbol.
    fn term_hints(&self, targets: &[String]) -> BTreeMap<String, TermInfo> {
        let mut out = BTreeMap::new();
        for term in self.nodes_of_kind(NodeKind::Term) {
            let symbol = term.property_str("symbol").unwrap_or_default();
            if !targets.iter().any(|t| *t == term.key || t == symbol) {
                continue;
            }
            let related_terms = self
                .neighbors(&term.id, Relationship::RelatedTo, Direction::Outgoing)
                .into_iter()
                .map(|rt| RelatedTermInfo {
                    name: rt.key.clone(),
                    display_name: prop(rt, "display_name"),
                    definition: prop(rt, "definition"),
                })
                .collect();
            out.insert(
                term.key.clone(),
                TermInfo {
                    display_name: prop(term, "display_name"),
                    definition: prop(term, "definition"),
                    related_terms,
                },
            );
        }
        out
    }

    /// Order equations so that every equation comes after the equations it
    /// depends on. Only the given ids are returned.
    pub fn dependency_order(&self, eq_ids: &[String]) -> Result<Vec<String>> {
        let wanted: HashSet<String> = eq_ids
            .iter()
            .map(|id| {
                let node_id = NodeKind::Equation.node_id(id);
                if self.contains_node(&node_id) {
                    Ok(node_id)
                } else {
                    Err(Error::not_found("equation", id))
                }
            })
            .collect::<Result<_>>()?;

        let deps_only = EdgeFiltered::from_fn(&self.graph, |e| {
            e.weight().relationship == Relationship::DependsOn
        });
        let sorted = toposort(&deps_only, None).map_err(|cycle| {
            Error::validation(format!(
                "dependency cycle through {}",
                self.graph[cycle.node_id()].key
            ))
        })?;

        // DEPENDS_ON points from dependent to dependency, so reverse.
        Ok(sorted
            .into_iter()
            .rev()
            .map(|idx| &self.graph[idx])
            .filter(|n| wanted.contains(&n.id))
            .map(|n| n.key.clone())
            .collect())
    }
}

fn prop(node: &Node, key: &str) -> String {
    node.property_str(key).unwrap_or_default().to_string()
}
