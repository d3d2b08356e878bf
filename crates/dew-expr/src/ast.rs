//! Expression tree and plain-text rendering.

use std::fmt;

// ============================================================================
// Operators and functions
// ============================================================================

/// Binary operators, in increasing binding strength.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinOp {
    /// Plain-text operator symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Pow => "^",
        }
    }

    pub(crate) fn precedence(self) -> u8 {
        match self {
            Self::Add | Self::Sub => 1,
            Self::Mul | Self::Div => 2,
            Self::Pow => 4,
        }
    }
}

/// Single-argument functions recognised by the parser.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Func {
    Sqrt,
    Exp,
    Ln,
    Log10,
    Abs,
}

impl Func {
    /// Every supported function.
    pub const ALL: [Func; 5] = [Func::Sqrt, Func::Exp, Func::Ln, Func::Log10, Func::Abs];

    /// Name as written in expressions.
    pub fn name(self) -> &'static str {
        match self {
            Self::Sqrt => "sqrt",
            Self::Exp => "exp",
            Self::Ln => "ln",
            Self::Log10 => "log10",
            Self::Abs => "abs",
        }
    }

    /// Look up a function by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    pub(crate) fn apply(self, x: f64) -> f64 {
        match self {
            Self::Sqrt => x.sqrt(),
            Self::Exp => x.exp(),
            Self::Ln => x.ln(),
            Self::Log10 => x.log10(),
            Self::Abs => x.abs(),
        }
    }
}

// ============================================================================
// Expr
// ============================================================================

/// An arithmetic expression over named variables.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Numeric literal.
    Num(f64),
    /// Variable reference.
    Var(String),
    /// Unary negation.
    Neg(Box<Expr>),
    /// Binary operation.
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// Function call.
    Call { func: Func, arg: Box<Expr> },
}

const NEG_PRECEDENCE: u8 = 3;
const ATOM_PRECEDENCE: u8 = 5;

impl Expr {
    /// Variable reference.
    pub fn var(name: impl Into<String>) -> Self {
        Expr::Var(name.into())
    }

    /// Build a binary node.
    pub fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Build a function call node.
    pub fn call(func: Func, arg: Expr) -> Self {
        Expr::Call {
            func,
            arg: Box::new(arg),
        }
    }

    /// Build a negation node.
    pub fn neg(inner: Expr) -> Self {
        Expr::Neg(Box::new(inner))
    }

    /// Variable names in order of first appearance, without duplicates.
    pub fn variables(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables(&self, out: &mut Vec<String>) {
        match self {
            Expr::Num(_) => {}
            Expr::Var(name) => {
                if !out.iter().any(|v| v == name) {
                    out.push(name.clone());
                }
            }
            Expr::Neg(inner) | Expr::Call { arg: inner, .. } => inner.collect_variables(out),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_variables(out);
                rhs.collect_variables(out);
            }
        }
    }

    /// Returns `true` if `name` appears anywhere in the expression.
    pub fn contains_var(&self, name: &str) -> bool {
        self.occurrences(name) > 0
    }

    /// Number of times `name` appears in the expression.
    pub fn occurrences(&self, name: &str) -> usize {
        match self {
            Expr::Num(_) => 0,
            Expr::Var(v) => usize::from(v == name),
            Expr::Neg(inner) | Expr::Call { arg: inner, .. } => inner.occurrences(name),
            Expr::Binary { lhs, rhs, .. } => lhs.occurrences(name) + rhs.occurrences(name),
        }
    }

    pub(crate) fn precedence(&self) -> u8 {
        match self {
            Expr::Num(n) if *n < 0.0 => NEG_PRECEDENCE,
            Expr::Num(_) | Expr::Var(_) | Expr::Call { .. } => ATOM_PRECEDENCE,
            Expr::Neg(_) => NEG_PRECEDENCE,
            Expr::Binary { op, .. } => op.precedence(),
        }
    }

    /// Whether `child` needs parentheses as an operand of `op`.
    pub(crate) fn needs_parens(op: BinOp, child: &Expr, is_rhs: bool) -> bool {
        let prec = child.precedence();
        let op_prec = op.precedence();
        match (op, is_rhs) {
            // `^` is right-associative
            (BinOp::Pow, false) => prec <= op_prec,
            (BinOp::Pow, true) => prec < NEG_PRECEDENCE,
            (_, false) => prec < op_prec,
            (_, true) => prec <= op_prec,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Num(n) => write!(f, "{n}"),
            Expr::Var(name) => write!(f, "{name}"),
            Expr::Neg(inner) => {
                if inner.precedence() < NEG_PRECEDENCE {
                    write!(f, "-({inner})")
                } else {
                    write!(f, "-{inner}")
                }
            }
            Expr::Call { func, arg } => write!(f, "{}({arg})", func.name()),
            Expr::Binary { op, lhs, rhs } => {
                write_operand(f, lhs, Expr::needs_parens(*op, lhs, false))?;
                match op {
                    BinOp::Pow => write!(f, "^")?,
                    _ => write!(f, " {} ", op.symbol())?,
                }
                write_operand(f, rhs, Expr::needs_parens(*op, rhs, true))
            }
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr, parens: bool) -> fmt::Result {
    if parens {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}

// ============================================================================
// Equation
// ============================================================================

/// An equality between two expressions.
#[derive(Clone, Debug, PartialEq)]
pub struct Equation {
    pub lhs: Expr,
    pub rhs: Expr,
}

impl Equation {
    pub fn new(lhs: Expr, rhs: Expr) -> Self {
        Self { lhs, rhs }
    }

    /// Variables of both sides, left side first, without duplicates.
    pub fn variables(&self) -> Vec<String> {
        let mut vars = self.lhs.variables();
        for v in self.rhs.variables() {
            if !vars.contains(&v) {
                vars.push(v);
            }
        }
        vars
    }

    /// Returns `true` if `name` appears on either side.
    pub fn contains_var(&self, name: &str) -> bool {
        self.occurrences(name) > 0
    }

    /// Number of times `name` appears across both sides.
    pub fn occurrences(&self, name: &str) -> usize {
        self.lhs.occurrences(name) + self.rhs.occurrences(name)
    }
}

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.lhs, self.rhs)
    }
}
