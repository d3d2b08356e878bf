//! Graph export.
//!
//! `to_json` writes nodes and edges for inspection. `to_cypher` writes a
//! script that recreates the graph in a Cypher-speaking graph database;
//! every statement is a `MERGE` (or `IF NOT EXISTS` constraint) so the
//! script can be re-run against a populated database.

use crate::types::{Edge, KnowledgeGraph, Node, NodeKind};
use dew_core::{Error, Result};
use serde::Serialize;
use std::fmt::Write as _;

/// Serializable snapshot of the graph.
#[derive(Debug, Serialize)]
pub struct GraphExport<'a> {
    pub nodes: Vec<&'a Node>,
    pub edges: Vec<&'a Edge>,
}

const KINDS: [NodeKind; 4] = [
    NodeKind::Equation,
    NodeKind::Variable,
    NodeKind::Unit,
    NodeKind::Term,
];

impl KnowledgeGraph {
    pub fn export(&self) -> GraphExport<'_> {
        GraphExport {
            nodes: self.iter_nodes().collect(),
            edges: self.iter_edges().collect(),
        }
    }

    /// Pretty-printed JSON with `nodes` and `edges`.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.export())?)
    }

    /// Idempotent Cypher script: constraints, then nodes, then edges.
    pub fn to_cypher(&self) -> Result<String> {
        let mut out = String::new();

        for kind in KINDS {
            writeln!(
                out,
                "CREATE CONSTRAINT IF NOT EXISTS FOR (n:{}) REQUIRE n.{} IS UNIQUE;",
                kind.label(),
                kind.key_property()
            )
            .map_err(fmt_error)?;
        }
        out.push('\n');

        for node in self.iter_nodes() {
            write!(
                out,
                "MERGE (n:{} {{{}: {}}})",
                node.kind.label(),
                node.kind.key_property(),
                quote(&node.key)
            )
            .map_err(fmt_error)?;
            let sets: Vec<String> = node
                .properties
                .iter()
                .filter(|(k, _)| k.as_str() != node.kind.key_property())
                .map(|(k, v)| format!("n.{k} = {}", literal(v)))
                .collect();
            if !sets.is_empty() {
                write!(out, " SET {}", sets.join(", ")).map_err(fmt_error)?;
            }
            out.push_str(";\n");
        }
        out.push('\n');

        for edge in self.iter_edges() {
            let (Some(from), Some(to)) = (self.get_node(&edge.from), self.get_node(&edge.to))
            else {
                continue;
            };
            writeln!(
                out,
                "MATCH (a:{} {{{}: {}}}), (b:{} {{{}: {}}}) MERGE (a)-[:{}]->(b);",
                from.kind.label(),
                from.kind.key_property(),
                quote(&from.key),
                to.kind.label(),
                to.kind.key_property(),
                quote(&to.key),
                edge.relationship.name()
            )
            .map_err(fmt_error)?;
        }

        Ok(out)
    }
}

fn fmt_error(e: std::fmt::Error) -> Error {
    Error::parse(format!("failed to render Cypher: {e}"))
}

/// Single-quoted Cypher string literal.
fn quote(s: &str) -> String {
    let escaped = s
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n");
    format!("'{escaped}'")
}

fn literal(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "null".to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => quote(s),
        serde_json::Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(literal).collect();
            format!("[{}]", inner.join(", "))
        }
        // Cypher properties cannot hold maps; store them as JSON text.
        serde_json::Value::Object(_) => quote(&value.to_string()),
    }
}
