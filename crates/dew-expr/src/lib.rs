//! Symbolic expressions for DEW equations.
//!
//! Equations in the domain definitions are written as plain text
//! (`SES = (TIA * SGIA * (PRASC - PRASA) * 0.2) / (OPPE / 100)`). This crate
//! parses them, evaluates them against known values, isolates a target
//! variable symbolically where possible (falling back to numeric root
//! finding), and renders LaTeX for hints and reasoning steps.
//!
//! # Example
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use dew_expr::parse_equation;
//!
//! let eq = parse_equation("IOFCPA = OCPY / TIA").unwrap();
//! let known = BTreeMap::from([
//!     ("IOFCPA".to_string(), 50.0),
//!     ("OCPY".to_string(), 6500.0),
//! ]);
//! assert_eq!(eq.solve_for("TIA", &known).unwrap(), 130.0);
//! assert_eq!(eq.to_latex(), r"IOFCPA = \frac{OCPY}{TIA}");
//! ```

pub mod ast;
pub mod eval;
pub mod latex;
pub mod parser;
pub mod solve;

#[cfg(test)]
mod proptests;

pub use ast::{BinOp, Equation, Expr, Func};
pub use eval::Bindings;
pub use latex::to_latex;
pub use parser::{parse_equation, parse_expr};
