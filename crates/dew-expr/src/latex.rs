//! LaTeX rendering.

use crate::ast::{BinOp, Equation, Expr, Func};

const GREEK: &[&str] = &[
    "alpha", "beta", "gamma", "delta", "epsilon", "zeta", "eta", "theta", "iota", "kappa",
    "lambda", "mu", "nu", "xi", "pi", "rho", "sigma", "tau", "upsilon", "phi", "chi", "psi",
    "omega", "Gamma", "Delta", "Theta", "Lambda", "Xi", "Pi", "Sigma", "Phi", "Psi", "Omega",
];

/// Render an expression as LaTeX.
///
/// ```
/// use dew_expr::{parse_expr, to_latex};
///
/// let expr = parse_expr("(PEGIAPY - POGIAPY) * TIA / 12").unwrap();
/// assert_eq!(to_latex(&expr), r"\frac{\left(PEGIAPY - POGIAPY\right) \cdot TIA}{12}");
/// ```
pub fn to_latex(expr: &Expr) -> String {
    match expr {
        Expr::Num(n) => format!("{n}"),
        Expr::Var(name) => latex_var(name),
        Expr::Neg(inner) => {
            if inner.precedence() < 3 {
                format!(r"-\left({}\right)", to_latex(inner))
            } else {
                format!("-{}", to_latex(inner))
            }
        }
        Expr::Call { func, arg } => {
            let inner = to_latex(arg);
            match func {
                Func::Sqrt => format!(r"\sqrt{{{inner}}}"),
                Func::Exp => format!("e^{{{inner}}}"),
                Func::Ln => format!(r"\ln\left({inner}\right)"),
                Func::Log10 => format!(r"\log_{{10}}\left({inner}\right)"),
                Func::Abs => format!(r"\left|{inner}\right|"),
            }
        }
        Expr::Binary { op, lhs, rhs } => match op {
            BinOp::Div => format!(r"\frac{{{}}}{{{}}}", to_latex(lhs), to_latex(rhs)),
            BinOp::Pow => format!(
                "{}^{{{}}}",
                operand(lhs, Expr::needs_parens(*op, lhs, false)),
                to_latex(rhs)
            ),
            BinOp::Mul => format!(
                r"{} \cdot {}",
                operand(lhs, Expr::needs_parens(*op, lhs, false)),
                operand(rhs, mul_rhs_needs_parens(rhs))
            ),
            BinOp::Add | BinOp::Sub => format!(
                "{} {} {}",
                operand(lhs, Expr::needs_parens(*op, lhs, false)),
                op.symbol(),
                operand(rhs, Expr::needs_parens(*op, rhs, true))
            ),
        },
    }
}

// `\frac` already groups, so `a \cdot \frac{b}{c}` needs no parentheses.
fn mul_rhs_needs_parens(rhs: &Expr) -> bool {
    match rhs {
        Expr::Binary { op: BinOp::Div, .. } => false,
        _ => Expr::needs_parens(BinOp::Mul, rhs, true),
    }
}

fn operand(expr: &Expr, parens: bool) -> String {
    if parens {
        format!(r"\left({}\right)", to_latex(expr))
    } else {
        to_latex(expr)
    }
}

/// `theta_fc` → `\theta_{fc}`; `SES` → `SES`.
fn latex_var(name: &str) -> String {
    let (base, sub) = match name.split_once('_') {
        Some((base, sub)) if !base.is_empty() && !sub.is_empty() => (base, Some(sub)),
        _ => (name, None),
    };
    let base = if GREEK.contains(&base) {
        format!(r"\{base}")
    } else {
        base.to_string()
    };
    match sub {
        Some(sub) => format!(r"{base}_{{{}}}", sub.replace('_', r"\_")),
        None => base,
    }
}

impl Equation {
    /// Render as `lhs = rhs` in LaTeX.
    pub fn to_latex(&self) -> String {
        format!("{} = {}", to_latex(&self.lhs), to_latex(&self.rhs))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{parse_equation, parse_expr};

    fn latex(input: &str) -> String {
        to_latex(&parse_expr(input).unwrap())
    }

    #[test]
    fn test_latex_fraction() {
        assert_eq!(
            latex("(TIA*SGIA*(PRASC-PRASA)*0.2)/(OPPE/100)"),
            r"\frac{TIA \cdot SGIA \cdot \left(PRASC - PRASA\right) \cdot 0.2}{\frac{OPPE}{100}}"
        );
    }

    #[test]
    fn test_latex_powers_and_roots() {
        assert_eq!(latex("x^2"), "x^{2}");
        assert_eq!(latex("(a + b)^2"), r"\left(a + b\right)^{2}");
        assert_eq!(latex("sqrt(x)"), r"\sqrt{x}");
        assert_eq!(latex("exp(k * t)"), r"e^{k \cdot t}");
    }

    #[test]
    fn test_latex_functions() {
        assert_eq!(latex("ln(x)"), r"\ln\left(x\right)");
        assert_eq!(latex("log10(x)"), r"\log_{10}\left(x\right)");
        assert_eq!(latex("abs(x)"), r"\left|x\right|");
    }

    #[test]
    fn test_latex_greek_and_subscripts() {
        assert_eq!(latex("theta_fc"), r"\theta_{fc}");
        assert_eq!(latex("ET_c"), "ET_{c}");
        assert_eq!(latex("Delta"), r"\Delta");
        assert_eq!(latex("a_b_c"), r"a_{b\_c}");
        assert_eq!(latex("SES"), "SES");
    }

    #[test]
    fn test_latex_negation_and_subtraction() {
        assert_eq!(latex("-(a + b)"), r"-\left(a + b\right)");
        assert_eq!(latex("a - (b - c)"), r"a - \left(b - c\right)");
        assert_eq!(latex("a * b / c"), r"\frac{a \cdot b}{c}");
        assert_eq!(latex("a * (b / c)"), r"a \cdot \frac{b}{c}");
    }

    #[test]
    fn test_equation_latex() {
        let eq = parse_equation("PEGIAPY = PGDA * NIRF").unwrap();
        assert_eq!(eq.to_latex(), r"PEGIAPY = PGDA \cdot NIRF");
    }
}
