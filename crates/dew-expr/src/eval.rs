//! Numeric evaluation.

use crate::ast::{BinOp, Expr};
use dew_core::{Error, Result};
use std::collections::BTreeMap;

/// Variable name to value bindings.
pub type Bindings = BTreeMap<String, f64>;

impl Expr {
    /// Evaluate the expression with the given variable values.
    ///
    /// Fails on an unbound variable, on division by zero, and whenever an
    /// intermediate result is not finite (e.g. `sqrt(-1)`, `ln(0)`).
    pub fn eval(&self, bindings: &Bindings) -> Result<f64> {
        let value = match self {
            Expr::Num(n) => *n,
            Expr::Var(name) => *bindings
                .get(name)
                .ok_or_else(|| Error::not_found("variable", name.as_str()))?,
            Expr::Neg(inner) => -inner.eval(bindings)?,
            Expr::Call { func, arg } => {
                let x = arg.eval(bindings)?;
                let y = func.apply(x);
                if !y.is_finite() {
                    return Err(Error::math(format!("{}({x}) is undefined", func.name())));
                }
                y
            }
            Expr::Binary { op, lhs, rhs } => {
                let a = lhs.eval(bindings)?;
                let b = rhs.eval(bindings)?;
                apply_binary(*op, a, b)?
            }
        };
        finite(value)
    }
}

fn apply_binary(op: BinOp, a: f64, b: f64) -> Result<f64> {
    match op {
        BinOp::Add => Ok(a + b),
        BinOp::Sub => Ok(a - b),
        BinOp::Mul => Ok(a * b),
        BinOp::Div if b == 0.0 => Err(Error::math("division by zero")),
        BinOp::Div => Ok(a / b),
        BinOp::Pow => finite(a.powf(b)),
    }
}

fn finite(value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::math(format!("non-finite result ({value})")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::parse_expr;

    fn bindings(pairs: &[(&str, f64)]) -> Bindings {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_eval_seasonal_energy_savings() {
        let expr = parse_expr("(TIA*SGIA*(PRASC-PRASA)*0.2)/(OPPE/100)").unwrap();
        let b = bindings(&[
            ("TIA", 130.0),
            ("SGIA", 12.0),
            ("PRASC", 45.0),
            ("PRASA", 30.0),
            ("OPPE", 60.0),
        ]);
        let value = expr.eval(&b).unwrap();
        assert!((value - 7800.0).abs() < 1e-9);
    }

    #[test]
    fn test_eval_functions() {
        let b = Bindings::new();
        assert_eq!(parse_expr("sqrt(16)").unwrap().eval(&b).unwrap(), 4.0);
        assert_eq!(parse_expr("abs(-3)").unwrap().eval(&b).unwrap(), 3.0);
        let log = parse_expr("log10(1000)").unwrap().eval(&b).unwrap();
        assert!((log - 3.0).abs() < 1e-12);
        let ln = parse_expr("ln(exp(2))").unwrap().eval(&b).unwrap();
        assert!((ln - 2.0).abs() < 1e-12);
        assert_eq!(parse_expr("2^3^2").unwrap().eval(&b).unwrap(), 512.0);
    }

    #[test]
    fn test_eval_unknown_variable() {
        let err = parse_expr("a + b").unwrap().eval(&bindings(&[("a", 1.0)])).unwrap_err();
        assert_eq!(err.to_string(), "variable not found: b");
    }

    #[test]
    fn test_eval_division_by_zero() {
        let err = parse_expr("1 / (a - a)")
            .unwrap()
            .eval(&bindings(&[("a", 2.0)]))
            .unwrap_err();
        assert_eq!(err.to_string(), "Math error: division by zero");
    }

    #[test]
    fn test_eval_domain_errors() {
        let b = Bindings::new();
        assert!(matches!(
            parse_expr("sqrt(-1)").unwrap().eval(&b),
            Err(Error::Math { .. })
        ));
        assert!(matches!(
            parse_expr("ln(0)").unwrap().eval(&b),
            Err(Error::Math { .. })
        ));
        assert!(matches!(
            parse_expr("10^400").unwrap().eval(&b),
            Err(Error::Math { .. })
        ));
    }
}
