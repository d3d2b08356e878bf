//! DEW Model: units, terms, equations, and problem templates.
//!
//! Depends on `dew-core` for errors and `dew-expr` for parsing and
//! solving equation expressions.
//!
//! # Modules
//!
//! - [`units`]: Unit registry, dimensions, and conversion
//! - [`term`]: Glossary terms
//! - [`equation`]: Equation definitions and their variables
//! - [`template`]: Problem templates and the combined problems file
//! - [`definitions`]: Domain definition documents
//! - [`library`]: The equation library over all loaded domains

#![doc = include_str!("../README.md")]

pub mod definitions;
pub mod equation;
pub mod library;
pub mod template;
pub mod term;
pub mod units;

pub use definitions::DomainDefinition;
pub use equation::{EquationDef, VariableDef};
pub use library::EquationLibrary;
pub use template::{
    Citation, ManualHints, MultipleChoiceSpec, ProblemInstance, ProblemTemplate, ProblemsFile,
    VariableSpec,
};
pub use term::Term;
pub use units::{DIMENSIONLESS, Dimension, Unit, UnitRegistry};
