//! DEW Graph: the equation knowledge graph.
//!
//! Built in-process from an [`dew_model::EquationLibrary`] with petgraph.
//! Problem generation queries it for hints; the Cypher export loads the
//! same graph into an external graph database.
//!
//! # Modules
//!
//! - [`types`]: Nodes, edges, relationships, and the graph itself
//! - [`builder`]: Two-phase construction with build statistics
//! - [`query`]: Equation details, variable units, hints, dependency order
//! - [`export`]: JSON and Cypher export

#![doc = include_str!("../README.md")]

pub mod builder;
pub mod export;
pub mod query;
pub mod types;

pub use builder::{BuildStats, GraphBuilder};
pub use export::GraphExport;
pub use query::{EquationInfo, Hints, RelatedTermInfo, SolutionStep, TermInfo, VariableInfo};
pub use types::{Edge, KnowledgeGraph, Node, NodeKind, Relationship};
