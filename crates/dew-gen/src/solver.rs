//! Step-by-step problem solver.
//!
//! Walks a solution path (from hints, or derived from the template's
//! equation list), solving one target per step and recording the
//! reasoning text that ends up in `gold_solution_reasoning_steps`.

use dew_core::Result;
use dew_expr::Bindings;
use dew_graph::{Hints, SolutionStep};
use dew_model::{EquationDef, EquationLibrary, ProblemInstance};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Default number of decimals kept in answers.
pub const DEFAULT_PRECISION: u32 = 2;

const INTEGER_TOLERANCE: f64 = 1e-10;

/// Largest magnitude rendered as an integer.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

// ============================================================================
// Values
// ============================================================================

/// A numeric answer: integral results are kept as integers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Int(i64),
    Float(f64),
}

impl AnswerValue {
    /// Integer when `value` is within 1e-10 of one, else rounded to
    /// `precision` decimals.
    pub fn from_f64(value: f64, precision: u32) -> Self {
        if is_near_integer(value) {
            Self::Int(value.round() as i64)
        } else {
            Self::Float(round_to(value, precision))
        }
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Int(i) => i as f64,
            Self::Float(f) => f,
        }
    }

    pub fn is_int(&self) -> bool {
        matches!(self, Self::Int(_))
    }
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v:?}"),
        }
    }
}

/// A solved target with its unit name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinalValue {
    pub value: AnswerValue,
    pub unit: String,
}

/// Result of solving one problem.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Solution {
    pub steps: Vec<String>,
    /// Every target that was solved, keyed by variable name.
    pub final_values: BTreeMap<String, FinalValue>,
}

/// Round half away from zero to `precision` decimals.
pub fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    let rounded = (value * factor).round() / factor;
    if rounded.is_finite() { rounded } else { value }
}

fn is_near_integer(value: f64) -> bool {
    value.is_finite()
        && value.abs() < MAX_EXACT_INTEGER
        && (value - value.round()).abs() < INTEGER_TOLERANCE
}

/// Format a value for step text.
///
/// ```rust
/// use dew_gen::solver::format_value;
///
/// assert_eq!(format_value(60.000000000001, 2), "60");
/// assert_eq!(format_value(2.3456, 2), "2.35");
/// assert_eq!(format_value(0.5, 2), "0.5");
/// ```
pub fn format_value(value: f64, precision: u32) -> String {
    if is_near_integer(value) {
        format!("{}", value.round() as i64)
    } else {
        format!("{}", round_to(value, precision))
    }
}

// ============================================================================
// Solver
// ============================================================================

/// Solves problem instances with equations from the library.
#[derive(Clone, Debug)]
pub struct Solver<'a> {
    library: &'a EquationLibrary,
    precision: u32,
}

impl<'a> Solver<'a> {
    pub fn new(library: &'a EquationLibrary) -> Self {
        Self {
            library,
            precision: DEFAULT_PRECISION,
        }
    }

    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    /// Solve `problem` step by step.
    ///
    /// Uses the hints' solution path when it has one. `units` maps
    /// variable names to the unit names shown in results. An equation id
    /// listed by the problem but missing from the library is an error; a
    /// target no equation can produce is simply left out of
    /// `final_values`.
    pub fn solve(
        &self,
        problem: &ProblemInstance,
        hints: Option<&Hints>,
        units: &BTreeMap<String, String>,
    ) -> Result<Solution> {
        let equations: Vec<&EquationDef> = problem
            .equations_used
            .iter()
            .map(|id| self.library.require_equation(id))
            .collect::<Result<_>>()?;

        let path = match hints {
            Some(h) if !h.solution_path.is_empty() => h.solution_path.clone(),
            _ => default_path(problem, &equations),
        };

        let mut known: Bindings = problem.given_values.clone();
        let mut solution = Solution::default();

        for (n, step) in path.iter().enumerate() {
            let step_number = n + 1;
            if known.contains_key(&step.target) {
                continue;
            }
            for eq_id in &step.equations {
                let Some(eq) = equations.iter().find(|e| &e.id == eq_id) else {
                    log::warn!(
                        "Equation {eq_id} is not used by problem {}; skipping",
                        problem.id
                    );
                    continue;
                };
                match eq.solve_for(&step.target, &known) {
                    Ok(value) => {
                        let unit = units.get(&step.target).map(String::as_str).unwrap_or("");
                        solution
                            .steps
                            .push(self.step_text(step_number, eq, &step.target, value, unit, &known));
                        known.insert(step.target.clone(), value);
                        break;
                    }
                    Err(e) => {
                        log::warn!(
                            "Could not solve {} with {} for problem {}: {e}",
                            step.target,
                            eq.id,
                            problem.id
                        );
                    }
                }
            }
        }

        for target in &problem.target_variables {
            if let Some(&value) = known.get(target) {
                if problem.is_given(target) {
                    continue;
                }
                solution.final_values.insert(
                    target.clone(),
                    FinalValue {
                        value: AnswerValue::from_f64(value, self.precision),
                        unit: units.get(target).cloned().unwrap_or_default(),
                    },
                );
            }
        }

        Ok(solution)
    }

    fn step_text(
        &self,
        number: usize,
        eq: &EquationDef,
        target: &str,
        value: f64,
        unit: &str,
        known: &Bindings,
    ) -> String {
        let mut text = format!("Step #{number}: Using equation {}\n", eq.name);
        if !eq.latex.is_empty() {
            text.push_str(&format!("Equation: {}\n", eq.latex));
        }
        let substitutions: Vec<String> = eq
            .variables
            .iter()
            .filter_map(|v| {
                known
                    .get(&v.name)
                    .map(|x| format!("{} = {}", v.name, format_value(*x, self.precision)))
            })
            .collect();
        text.push_str(&format!("Substituting: {}\n", substitutions.join(", ")));
        text.push_str(&format!(
            "Result: {target} = {} {unit}\n",
            format_value(value, self.precision)
        ));
        text
    }
}

/// One step per target using the first listed equation that mentions it.
fn default_path(problem: &ProblemInstance, equations: &[&EquationDef]) -> Vec<SolutionStep> {
    problem
        .target_variables
        .iter()
        .filter_map(|target| {
            equations
                .iter()
                .find(|eq| eq.has_variable(target))
                .map(|eq| SolutionStep {
                    target: target.clone(),
                    equations: vec![eq.id.clone()],
                })
        })
        .collect()
}
