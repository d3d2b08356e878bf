//! Recursive-descent parser for expressions and equations.
//!
//! Grammar:
//!
//! ```text
//! equation := expr '=' expr
//! expr     := term (('+' | '-') term)*
//! term     := unary (('*' | '/') unary)*
//! unary    := '-' unary | power
//! power    := primary (('^' | '**') unary)?
//! primary  := number | ident | ident '(' expr ')' | '(' expr ')'
//! ```

use crate::ast::{BinOp, Equation, Expr, Func};
use dew_core::{Error, Result};

/// Parse a single expression.
pub fn parse_expr(input: &str) -> Result<Expr> {
    let mut parser = Parser::new(input)?;
    let expr = parser.expr()?;
    parser.expect_end()?;
    Ok(expr)
}

/// Parse an equation of the form `lhs = rhs`.
pub fn parse_equation(input: &str) -> Result<Equation> {
    let mut parser = Parser::new(input)?;
    let lhs = parser.expr()?;
    parser.expect(&Token::Eq, "'='")?;
    let rhs = parser.expr()?;
    parser.expect_end()?;
    Ok(Equation::new(lhs, rhs))
}

// ============================================================================
// Lexer
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Num(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    Eq,
    End,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Num(n) => format!("number {n}"),
            Token::Ident(name) => format!("identifier '{name}'"),
            Token::Plus => "'+'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Slash => "'/'".to_string(),
            Token::Caret => "'^'".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Eq => "'='".to_string(),
            Token::End => "end of input".to_string(),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<(Token, usize)>> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        let start = i;
        match c {
            b' ' | b'\t' | b'\n' | b'\r' => {
                i += 1;
                continue;
            }
            b'+' => tokens.push((Token::Plus, start)),
            b'-' => tokens.push((Token::Minus, start)),
            b'*' if bytes.get(i + 1) == Some(&b'*') => {
                tokens.push((Token::Caret, start));
                i += 1;
            }
            b'*' => tokens.push((Token::Star, start)),
            b'/' => tokens.push((Token::Slash, start)),
            b'^' => tokens.push((Token::Caret, start)),
            b'(' => tokens.push((Token::LParen, start)),
            b')' => tokens.push((Token::RParen, start)),
            b'=' => tokens.push((Token::Eq, start)),
            b'0'..=b'9' | b'.' => {
                i = scan_number(bytes, i);
                let text = &input[start..i];
                let value = text.parse::<f64>().map_err(|_| {
                    Error::parse(format!("invalid number '{text}' at position {start}"))
                })?;
                tokens.push((Token::Num(value), start));
                continue;
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                tokens.push((Token::Ident(input[start..i].to_string()), start));
                continue;
            }
            _ => {
                let ch = input[start..].chars().next().unwrap_or('?');
                return Err(Error::parse(format!(
                    "unexpected character '{ch}' at position {start}"
                )));
            }
        }
        i += 1;
    }

    tokens.push((Token::End, input.len()));
    Ok(tokens)
}

/// Returns the index one past the end of the number starting at `i`.
fn scan_number(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
        i += 1;
    }
    // Exponent only if digits follow, so `2e` stays a number then an identifier.
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        if j < bytes.len() && bytes[j].is_ascii_digit() {
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            return j;
        }
    }
    i
}

// ============================================================================
// Parser
// ============================================================================

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Result<Self> {
        Ok(Self {
            tokens: tokenize(input)?,
            pos: 0,
        })
    }

    fn peek(&self) -> &Token {
        self.tokens
            .get(self.pos)
            .map(|(t, _)| t)
            .unwrap_or(&Token::End)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map(|(_, p)| *p).unwrap_or(0)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn unexpected(&self, expected: &str) -> Error {
        Error::parse(format!(
            "expected {expected}, found {} at position {}",
            self.peek().describe(),
            self.offset()
        ))
    }

    fn expect(&mut self, token: &Token, label: &str) -> Result<()> {
        if self.peek() == token {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(label))
        }
    }

    fn expect_end(&self) -> Result<()> {
        if *self.peek() == Token::End {
            Ok(())
        } else {
            Err(self.unexpected("end of input"))
        }
    }

    fn expr(&mut self) -> Result<Expr> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.term()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
    }

    fn term(&mut self) -> Result<Expr> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.unary()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
    }

    fn unary(&mut self) -> Result<Expr> {
        if *self.peek() == Token::Minus {
            self.advance();
            return Ok(Expr::neg(self.unary()?));
        }
        self.power()
    }

    fn power(&mut self) -> Result<Expr> {
        let base = self.primary()?;
        if *self.peek() == Token::Caret {
            self.advance();
            let exponent = self.unary()?;
            return Ok(Expr::binary(BinOp::Pow, base, exponent));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr> {
        let at = self.offset();
        let save = self.pos;
        match self.advance() {
            Token::Num(n) => Ok(Expr::Num(n)),
            Token::Ident(name) => {
                if *self.peek() != Token::LParen {
                    return Ok(Expr::Var(name));
                }
                let func = Func::from_name(&name).ok_or_else(|| {
                    Error::parse(format!("unknown function '{name}' at position {at}"))
                })?;
                self.advance();
                let arg = self.expr()?;
                self.expect(&Token::RParen, "')'")?;
                Ok(Expr::call(func, arg))
            }
            Token::LParen => {
                let inner = self.expr()?;
                self.expect(&Token::RParen, "')'")?;
                Ok(inner)
            }
            _ => {
                self.pos = save;
                Err(self.unexpected("a number, variable, or '('"))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Expressions
    // -------------------------------------------------------------------------

    #[test]
    fn test_parse_precedence() {
        let expr = parse_expr("a + b * c").unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinOp::Add,
                Expr::var("a"),
                Expr::binary(BinOp::Mul, Expr::var("b"), Expr::var("c"))
            )
        );
    }

    #[test]
    fn test_parse_power_right_associative() {
        let expr = parse_expr("2 ** 3 ^ 2").unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinOp::Pow,
                Expr::Num(2.0),
                Expr::binary(BinOp::Pow, Expr::Num(3.0), Expr::Num(2.0))
            )
        );
    }

    #[test]
    fn test_parse_unary_minus_binds_looser_than_power() {
        let expr = parse_expr("-x^2").unwrap();
        assert_eq!(
            expr,
            Expr::neg(Expr::binary(BinOp::Pow, Expr::var("x"), Expr::Num(2.0)))
        );
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(parse_expr("0.2").unwrap(), Expr::Num(0.2));
        assert_eq!(parse_expr(".5").unwrap(), Expr::Num(0.5));
        assert_eq!(parse_expr("1.5e3").unwrap(), Expr::Num(1500.0));
        assert_eq!(parse_expr("2E-2").unwrap(), Expr::Num(0.02));
    }

    #[test]
    fn test_parse_function_call() {
        let expr = parse_expr("sqrt(x + 1)").unwrap();
        assert_eq!(
            expr,
            Expr::call(
                Func::Sqrt,
                Expr::binary(BinOp::Add, Expr::var("x"), Expr::Num(1.0))
            )
        );
    }

    #[test]
    fn test_parse_identifier_with_underscore() {
        assert_eq!(parse_expr("theta_fc").unwrap(), Expr::var("theta_fc"));
    }

    // -------------------------------------------------------------------------
    // Equations
    // -------------------------------------------------------------------------

    #[test]
    fn test_parse_equation() {
        let eq = parse_equation("SES = (TIA*SGIA*(PRASC-PRASA)*0.2)/(OPPE/100)").unwrap();
        assert_eq!(eq.lhs, Expr::var("SES"));
        assert_eq!(
            eq.variables(),
            vec!["SES", "TIA", "SGIA", "PRASC", "PRASA", "OPPE"]
        );
    }

    #[test]
    fn test_parse_equation_requires_equals() {
        let err = parse_equation("a + b").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Parse error: expected '=', found end of input at position 5"
        );
    }

    // -------------------------------------------------------------------------
    // Errors
    // -------------------------------------------------------------------------

    #[test]
    fn test_parse_error_positions() {
        let err = parse_expr("a + * b").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Parse error: expected a number, variable, or '(', found '*' at position 4"
        );

        let err = parse_expr("(a + b").unwrap_err();
        assert!(err.to_string().contains("expected ')'"));

        let err = parse_expr("a $ b").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Parse error: unexpected character '$' at position 2"
        );
    }

    #[test]
    fn test_parse_unknown_function() {
        let err = parse_expr("sin(x)").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Parse error: unknown function 'sin' at position 0"
        );
    }

    #[test]
    fn test_parse_trailing_tokens() {
        assert!(parse_expr("a b").is_err());
        assert!(parse_equation("a = b = c").is_err());
    }
}
