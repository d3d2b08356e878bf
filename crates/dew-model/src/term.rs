//! Glossary terms.

use serde::{Deserialize, Serialize};

/// A domain concept with its symbol and usual unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Term {
    /// Unique snake_case name (e.g., `seasonal_energy_savings`).
    pub name: String,
    pub display_name: String,
    /// Symbol used in equations (e.g., `SES`).
    pub symbol: String,
    pub definition: String,
    /// Unit id from the registry, when the term has a usual unit.
    #[serde(default)]
    pub common_unit_id: Option<String>,
    /// Display label of the usual unit, resolved at load time.
    #[serde(default)]
    pub common_unit: Option<String>,
    /// Names of related terms.
    #[serde(default)]
    pub related_terms: Vec<String>,
}

impl Term {
    /// Returns `true` if `key` is this term's name or symbol.
    pub fn matches(&self, key: &str) -> bool {
        self.name == key || self.symbol == key
    }
}
