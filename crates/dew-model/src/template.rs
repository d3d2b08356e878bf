//! Problem templates.
//!
//! A template is one annotated textbook problem: text with `{VAR}` and
//! `{VAR_unit}` placeholders, value ranges for its given variables, the
//! equations that solve it, and the variables to solve for. Templates are
//! read from JSON (`{"problems": [...]}`) or combined from YAML annotations.

use dew_core::{Error, Result};
use dew_expr::Bindings;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Difficulty assumed when a template does not state one.
pub const DEFAULT_DIFFICULTY: &str = "intermediate";

/// Default number of multiple-choice options.
pub const DEFAULT_NUM_OPTIONS: usize = 3;

/// Placeholder annotators leave in `alternative_phrasings` before writing them.
pub const PHRASING_PLACEHOLDER: &str = "TO_DO";

/// Range and unit for a given variable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariableSpec {
    pub min: f64,
    pub max: f64,
    /// Unit label substituted for `{VAR_unit}`.
    #[serde(default)]
    pub default_unit: String,
    /// Constants take the midpoint of their range instead of a random draw.
    #[serde(default)]
    pub is_constant: bool,
}

impl VariableSpec {
    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

/// Hints written by the annotator.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ManualHints {
    /// Use `content` instead of graph-generated hints.
    #[serde(default)]
    pub override_auto_hints: bool,
    #[serde(default)]
    pub content: serde_json::Value,
}

/// Multiple-choice settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MultipleChoiceSpec {
    #[serde(default = "default_num_options")]
    pub num_options: usize,
}

impl Default for MultipleChoiceSpec {
    fn default() -> Self {
        Self {
            num_options: DEFAULT_NUM_OPTIONS,
        }
    }
}

fn default_num_options() -> usize {
    DEFAULT_NUM_OPTIONS
}

fn default_difficulty() -> String {
    DEFAULT_DIFFICULTY.to_string()
}

/// Where a problem comes from.
///
/// `book` is a reference-book id from the catalog; any other keys
/// (chapter, page, ...) are kept as written.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// An annotated problem from which variations are generated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProblemTemplate {
    pub id: String,
    pub problem_text: String,
    pub variables: BTreeMap<String, VariableSpec>,
    pub equations_used: Vec<String>,
    #[serde(default)]
    pub alternative_phrasings: Vec<String>,
    /// Domain first, then topics.
    #[serde(default)]
    pub problem_category: Vec<String>,
    #[serde(default = "default_difficulty")]
    pub difficulty_level: String,
    #[serde(default)]
    pub citation: Citation,
    #[serde(default)]
    pub target_variables: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub final_target_variable: Vec<String>,
    #[serde(default)]
    pub additional_references: Vec<serde_json::Value>,
    #[serde(default)]
    pub manual_hints: ManualHints,
    #[serde(default)]
    pub multiple_choice: MultipleChoiceSpec,
}

/// Accept `final_target_variable: X` as well as `[X]`.
fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) if s.is_empty() => Vec::new(),
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
    })
}

impl ProblemTemplate {
    /// Add an alternative wording.
    pub fn add_phrasing(&mut self, phrasing: impl Into<String>) -> &mut Self {
        self.alternative_phrasings.push(phrasing.into());
        self
    }

    /// The variable whose value is the problem's answer.
    pub fn final_target(&self) -> Option<&str> {
        self.final_target_variable.first().map(String::as_str)
    }

    /// Phrasings to draw from; empty when the template only has its base
    /// text or the phrasings are still placeholders.
    pub fn usable_phrasings(&self) -> &[String] {
        if self
            .alternative_phrasings
            .iter()
            .any(|p| p == PHRASING_PLACEHOLDER)
        {
            &[]
        } else {
            &self.alternative_phrasings
        }
    }

    /// Domain name: the first category with underscores as spaces.
    pub fn domain(&self) -> String {
        self.problem_category
            .first()
            .map(|c| c.replace('_', " "))
            .unwrap_or_default()
    }

    /// Topics: every category after the first.
    pub fn topics(&self) -> &[String] {
        self.problem_category.get(1..).unwrap_or(&[])
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<()> {
        let field = |suffix: &str| format!("{}.{suffix}", self.id);

        if self.id.trim().is_empty() {
            return Err(Error::validation_field("id", "template id must not be empty"));
        }
        if self.equations_used.is_empty() {
            return Err(Error::validation_field(
                field("equations_used"),
                "at least one equation is required",
            ));
        }
        for (name, spec) in &self.variables {
            if !spec.min.is_finite() || !spec.max.is_finite() {
                return Err(Error::validation_field(
                    field(&format!("variables.{name}")),
                    "range bounds must be finite",
                ));
            }
            if spec.min > spec.max {
                return Err(Error::validation_field(
                    field(&format!("variables.{name}")),
                    format!("min {} exceeds max {}", spec.min, spec.max),
                ));
            }
        }
        let Some(final_target) = self.final_target() else {
            return Err(Error::validation_field(
                field("final_target_variable"),
                "a final target variable is required",
            ));
        };
        if !self.target_variables.iter().any(|t| t == final_target) {
            return Err(Error::validation_field(
                field("final_target_variable"),
                format!("{final_target} is not listed in target_variables"),
            ));
        }
        if self.multiple_choice.num_options == 0 {
            return Err(Error::validation_field(
                field("multiple_choice.num_options"),
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// A concrete problem drawn from a template.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProblemInstance {
    /// `<template id>_<variation id>`.
    pub id: String,
    pub template_id: String,
    /// Problem text with every placeholder filled in.
    pub text: String,
    pub given_values: Bindings,
    pub target_variables: Vec<String>,
    pub equations_used: Vec<String>,
    pub is_original_version: bool,
}

impl ProblemInstance {
    pub fn is_given(&self, name: &str) -> bool {
        self.given_values.contains_key(name)
    }
}

/// The combined problems document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProblemsFile {
    #[serde(default)]
    pub problems: Vec<serde_json::Value>,
}

impl ProblemsFile {
    /// Deserialize and validate every problem.
    pub fn templates(&self) -> Result<Vec<ProblemTemplate>> {
        self.problems
            .iter()
            .enumerate()
            .map(|(i, value)| {
                let template: ProblemTemplate =
                    serde_json::from_value(value.clone()).map_err(|e| {
                        let id = value.get("id").and_then(|v| v.as_str()).unwrap_or("?");
                        Error::validation_field(format!("problems[{i}]"), format!("{id}: {e}"))
                    })?;
                template.validate()?;
                Ok(template)
            })
            .collect()
    }
}
