//! Solving an equation for one of its variables.
//!
//! When the target occurs exactly once it is isolated symbolically by
//! peeling inverse operations off the side that contains it. Otherwise
//! `lhs - rhs = 0` is solved numerically: a secant iteration first, then a
//! bisection over the first sign change found on an expanding grid.

use crate::ast::{BinOp, Equation, Expr, Func};
use crate::eval::Bindings;
use dew_core::{Error, Result};

const SECANT_MAX_ITER: usize = 100;
const BISECT_MAX_ITER: usize = 200;
const RELATIVE_TOLERANCE: f64 = 1e-9;

impl Equation {
    /// Isolate `target` symbolically.
    ///
    /// Returns `None` unless `target` occurs exactly once and every operation
    /// on its path is invertible (`abs` is not).
    pub fn rearranged(&self, target: &str) -> Option<Expr> {
        let in_lhs = self.lhs.occurrences(target);
        let in_rhs = self.rhs.occurrences(target);
        match (in_lhs, in_rhs) {
            (1, 0) => isolate(&self.lhs, target, self.rhs.clone()),
            (0, 1) => isolate(&self.rhs, target, self.lhs.clone()),
            _ => None,
        }
    }

    /// Solve for `target` given values for every other variable.
    ///
    /// A binding for `target` itself is ignored. Errors when the target does
    /// not appear, when another variable is unbound, or when no finite root
    /// exists.
    pub fn solve_for(&self, target: &str, bindings: &Bindings) -> Result<f64> {
        if !self.contains_var(target) {
            return Err(Error::unsolvable(
                target,
                "variable does not appear in the equation",
            ));
        }

        let mut known = Bindings::new();
        for var in self.variables() {
            if var == target {
                continue;
            }
            let value = bindings
                .get(&var)
                .ok_or_else(|| Error::unsolvable(target, format!("missing value for {var}")))?;
            known.insert(var, *value);
        }

        if let Some(isolated) = self.rearranged(target) {
            log::trace!("Isolated {target} = {isolated}");
            return isolated
                .eval(&known)
                .map_err(|e| Error::unsolvable(target, e.to_string()));
        }

        log::debug!("Solving {self} for {target} numerically");
        NumericSolver::new(self, target, known).solve()
    }
}

// ============================================================================
// Symbolic isolation
// ============================================================================

/// Given `expr == acc` where `expr` contains `target` once, return the
/// expression `target` equals.
fn isolate(expr: &Expr, target: &str, acc: Expr) -> Option<Expr> {
    match expr {
        Expr::Var(name) if name == target => Some(acc),
        Expr::Var(_) | Expr::Num(_) => None,
        Expr::Neg(inner) => isolate(inner, target, Expr::neg(acc)),
        Expr::Call { func, arg } => {
            let inverse = match func {
                Func::Sqrt => Expr::binary(BinOp::Pow, acc, Expr::Num(2.0)),
                Func::Exp => Expr::call(Func::Ln, acc),
                Func::Ln => Expr::call(Func::Exp, acc),
                Func::Log10 => Expr::binary(BinOp::Pow, Expr::Num(10.0), acc),
                Func::Abs => return None,
            };
            isolate(arg, target, inverse)
        }
        Expr::Binary { op, lhs, rhs } => {
            let left = lhs.contains_var(target);
            let (l, r) = (lhs.as_ref().clone(), rhs.as_ref().clone());
            match (op, left) {
                (BinOp::Add, true) => isolate(lhs, target, Expr::binary(BinOp::Sub, acc, r)),
                (BinOp::Add, false) => isolate(rhs, target, Expr::binary(BinOp::Sub, acc, l)),
                (BinOp::Sub, true) => isolate(lhs, target, Expr::binary(BinOp::Add, acc, r)),
                (BinOp::Sub, false) => isolate(rhs, target, Expr::binary(BinOp::Sub, l, acc)),
                (BinOp::Mul, true) => isolate(lhs, target, Expr::binary(BinOp::Div, acc, r)),
                (BinOp::Mul, false) => isolate(rhs, target, Expr::binary(BinOp::Div, acc, l)),
                (BinOp::Div, true) => isolate(lhs, target, Expr::binary(BinOp::Mul, acc, r)),
                (BinOp::Div, false) => isolate(rhs, target, Expr::binary(BinOp::Div, l, acc)),
                (BinOp::Pow, true) => {
                    let root = Expr::binary(BinOp::Div, Expr::Num(1.0), r);
                    isolate(lhs, target, Expr::binary(BinOp::Pow, acc, root))
                }
                (BinOp::Pow, false) => {
                    let log = Expr::binary(
                        BinOp::Div,
                        Expr::call(Func::Ln, acc),
                        Expr::call(Func::Ln, l),
                    );
                    isolate(rhs, target, log)
                }
            }
        }
    }
}

// ============================================================================
// Numeric root finding
// ============================================================================

struct NumericSolver<'a> {
    equation: &'a Equation,
    target: &'a str,
    bindings: Bindings,
}

impl<'a> NumericSolver<'a> {
    fn new(equation: &'a Equation, target: &'a str, bindings: Bindings) -> Self {
        Self {
            equation,
            target,
            bindings,
        }
    }

    /// Residual `lhs - rhs` at `x`, with the scale used for convergence.
    fn residual(&mut self, x: f64) -> Option<(f64, f64)> {
        self.bindings.insert(self.target.to_string(), x);
        let l = self.equation.lhs.eval(&self.bindings).ok()?;
        let r = self.equation.rhs.eval(&self.bindings).ok()?;
        Some((l - r, l.abs().max(r.abs()).max(1.0)))
    }

    fn converged(&mut self, x: f64) -> bool {
        self.residual(x)
            .is_some_and(|(f, scale)| f.abs() <= RELATIVE_TOLERANCE * scale)
    }

    fn solve(mut self) -> Result<f64> {
        if let Some(x) = self.secant(1.0, 2.0) {
            return Ok(x);
        }
        if let Some(x) = self.bracketed_bisection() {
            return Ok(x);
        }
        Err(Error::unsolvable(self.target, "no finite root found"))
    }

    fn secant(&mut self, mut x0: f64, mut x1: f64) -> Option<f64> {
        let (mut f0, _) = self.residual(x0)?;
        let (mut f1, _) = self.residual(x1)?;
        for _ in 0..SECANT_MAX_ITER {
            if f1 == f0 {
                break;
            }
            let x2 = x1 - f1 * (x1 - x0) / (f1 - f0);
            if !x2.is_finite() {
                return None;
            }
            let (f2, _) = self.residual(x2)?;
            if (x2 - x1).abs() <= RELATIVE_TOLERANCE * x2.abs().max(1.0) {
                return self.converged(x2).then_some(x2);
            }
            (x0, f0, x1, f1) = (x1, f1, x2, f2);
        }
        self.converged(x1).then_some(x1)
    }

    /// Candidate points `0, ±10^(k/4)` for k in -24..=40, positives first.
    fn grid() -> Vec<f64> {
        let positives: Vec<f64> = (-24..=40).map(|k| 10f64.powf(f64::from(k) / 4.0)).collect();
        let mut points = vec![0.0];
        points.extend(positives.iter().copied());
        let mut negatives = vec![0.0];
        negatives.extend(positives.iter().map(|x| -x));
        points.extend(negatives);
        points
    }

    fn bracketed_bisection(&mut self) -> Option<f64> {
        let grid = Self::grid();
        for pair in grid.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let (Some((fa, _)), Some((fb, _))) = (self.residual(a), self.residual(b)) else {
                continue;
            };
            if fa == 0.0 {
                return Some(a);
            }
            if fa.signum() != fb.signum() {
                if let Some(root) = self.bisect(a, b, fa) {
                    return Some(root);
                }
            }
        }
        None
    }

    fn bisect(&mut self, mut a: f64, mut b: f64, mut fa: f64) -> Option<f64> {
        for _ in 0..BISECT_MAX_ITER {
            let mid = 0.5 * (a + b);
            let (fm, _) = self.residual(mid)?;
            if fm == 0.0 || (b - a).abs() <= f64::EPSILON * mid.abs().max(1.0) {
                return Some(mid);
            }
            if fa.signum() == fm.signum() {
                (a, fa) = (mid, fm);
            } else {
                b = mid;
            }
        }
        let mid = 0.5 * (a + b);
        self.converged(mid).then_some(mid)
    }
}
