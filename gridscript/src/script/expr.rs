//! Expression parser and evaluator.
//!
//! Expressions arrive as the flat token texts produced by the line
//! tokenizer.  Known variables are substituted by their integer values, the
//! result is parsed into a small AST and evaluated.
//!
//! Operator precedence (lowest → highest):
//!   or  →  and  →  equality  →  relational  →  additive  →
//!   multiplicative  →  unary  →  primary
//!
//! Integers are `i64`.  Division that is not exact, and arithmetic that
//! overflows, continue in `f64`; only the final result has to be an
//! integer.  Booleans coerce to `0`/`1` wherever a number is needed.

use std::cmp::Ordering;

use super::error::ScriptError;
use super::token::is_identifier;
use super::value::Value;
use crate::var::Variables;

// ── Token ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Int(i64),
    Bool(bool),

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,

    Eq, // ==
    Ne, // !=
    Lt,
    Le,
    Gt,
    Ge,

    And, // &&
    Or,  // ||

    LParen,
    RParen,
    /// A token that has no place in an expression (`=`, `{`, `,` …).
    Unknown(String),
    Eof,
}

// ── Substitution ──────────────────────────────────────────────────────────────

/// Replace variables by their values and classify every token.
///
/// Returns the expression tokens together with the reconstructed expression
/// text used in diagnostics.
fn substitute<S: AsRef<str>>(
    tokens: &[S],
    variables: &Variables,
) -> Result<(Vec<Token>, String), ScriptError> {
    let mut out = Vec::with_capacity(tokens.len() + 1);
    let mut text = Vec::with_capacity(tokens.len());

    for raw in tokens {
        let raw = raw.as_ref();
        if let Some(n) = variables.get(raw) {
            out.push(Token::Int(n));
            text.push(n.to_string());
            continue;
        }
        let tok = match raw {
            "true" => Token::Bool(true),
            "false" => Token::Bool(false),
            "+" => Token::Plus,
            "-" => Token::Minus,
            "*" => Token::Star,
            "/" => Token::Slash,
            "%" => Token::Percent,
            "!" => Token::Bang,
            "==" => Token::Eq,
            "!=" => Token::Ne,
            "<" => Token::Lt,
            "<=" => Token::Le,
            ">" => Token::Gt,
            ">=" => Token::Ge,
            "&&" => Token::And,
            "||" => Token::Or,
            "(" => Token::LParen,
            ")" => Token::RParen,
            s if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => match s.parse() {
                Ok(n) => Token::Int(n),
                Err(_) => Token::Unknown(s.to_owned()),
            },
            s if is_identifier(s) => {
                return Err(ScriptError::UndefinedVariable { name: s.to_owned() })
            }
            s => Token::Unknown(s.to_owned()),
        };
        out.push(tok);
        text.push(raw.to_owned());
    }

    out.push(Token::Eof);
    Ok((out, text.join(" ")))
}

// ── AST ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

#[derive(Debug, Clone, Copy)]
enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone)]
enum Expr {
    Literal(Scalar),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
}

// ── Parser ────────────────────────────────────────────────────────────────────

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let t = self.tokens.get(self.pos).cloned().unwrap_or(Token::Eof);
        self.pos += 1;
        t
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == expected {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Parse a whole expression; trailing tokens are an error.
    fn parse_complete(&mut self) -> Result<Expr, String> {
        if self.peek() == &Token::Eof {
            return Err("empty expression".into());
        }
        let expr = self.parse_or()?;
        match self.peek() {
            Token::Eof => Ok(expr),
            Token::RParen => Err("unbalanced ')'".into()),
            other => Err(format!("unexpected {}", describe(other))),
        }
    }

    // ── Grammar ───────────────────────────────────────────────────────────────

    fn parse_or(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_and()?;
        while self.eat(&Token::Or) {
            let rhs = self.parse_and()?;
            lhs = Expr::Binary(BinOp::Or, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_equality()?;
        while self.eat(&Token::And) {
            let rhs = self.parse_equality()?;
            lhs = Expr::Binary(BinOp::And, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_equality(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_relational()?;
        loop {
            let op = match self.peek() {
                Token::Eq => BinOp::Eq,
                Token::Ne => BinOp::Ne,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_relational()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_relational(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                Token::Lt => BinOp::Lt,
                Token::Le => BinOp::Le,
                Token::Gt => BinOp::Gt,
                Token::Ge => BinOp::Ge,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_additive()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_multiplicative()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                Token::Percent => BinOp::Rem,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, String> {
        match self.peek() {
            Token::Minus => {
                self.pos += 1;
                Ok(Expr::Unary(UnaryOp::Neg, Box::new(self.parse_unary()?)))
            }
            Token::Bang => {
                self.pos += 1;
                Ok(Expr::Unary(UnaryOp::Not, Box::new(self.parse_unary()?)))
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, String> {
        match self.advance() {
            Token::Int(n) => Ok(Expr::Literal(Scalar::Int(n))),
            Token::Bool(b) => Ok(Expr::Literal(Scalar::Bool(b))),
            Token::LParen => {
                let inner = self.parse_or()?;
                if !self.eat(&Token::RParen) {
                    return Err("expected ')'".into());
                }
                Ok(inner)
            }
            Token::Eof => Err("unexpected end of expression".into()),
            other => Err(format!("unexpected {}", describe(&other))),
        }
    }
}

fn describe(tok: &Token) -> String {
    match tok {
        Token::Int(n) => format!("number {n}"),
        Token::Bool(b) => format!("'{b}'"),
        Token::Unknown(s) => format!("'{s}'"),
        Token::Eof => "end of expression".into(),
        sym => format!("'{}'", symbol_text(sym)),
    }
}

fn symbol_text(tok: &Token) -> &'static str {
    match tok {
        Token::Plus => "+",
        Token::Minus => "-",
        Token::Star => "*",
        Token::Slash => "/",
        Token::Percent => "%",
        Token::Bang => "!",
        Token::Eq => "==",
        Token::Ne => "!=",
        Token::Lt => "<",
        Token::Le => "<=",
        Token::Gt => ">",
        Token::Ge => ">=",
        Token::And => "&&",
        Token::Or => "||",
        Token::LParen => "(",
        Token::RParen => ")",
        _ => "?",
    }
}

// ── Scalar ────────────────────────────────────────────────────────────────────

/// Intermediate value during evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Scalar {
    Int(i64),
    Real(f64),
    Bool(bool),
}

impl Scalar {
    fn truthy(self) -> bool {
        match self {
            Scalar::Int(n) => n != 0,
            Scalar::Real(x) => x != 0.0 && !x.is_nan(),
            Scalar::Bool(b) => b,
        }
    }

    /// Integer view, when no precision is lost.
    fn as_i64(self) -> Option<i64> {
        match self {
            Scalar::Int(n) => Some(n),
            Scalar::Bool(b) => Some(i64::from(b)),
            Scalar::Real(_) => None,
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Scalar::Int(n) => n as f64,
            Scalar::Real(x) => x,
            Scalar::Bool(b) => f64::from(u8::from(b)),
        }
    }
}

// ── Evaluator ─────────────────────────────────────────────────────────────────

fn eval(expr: &Expr) -> Result<Scalar, String> {
    match expr {
        Expr::Literal(v) => Ok(*v),

        Expr::Unary(UnaryOp::Neg, inner) => {
            let v = eval(inner)?;
            Ok(match v.as_i64() {
                Some(n) => n.checked_neg().map_or(Scalar::Real(-(n as f64)), Scalar::Int),
                None => Scalar::Real(-v.as_f64()),
            })
        }
        Expr::Unary(UnaryOp::Not, inner) => Ok(Scalar::Bool(!eval(inner)?.truthy())),

        // && and || short-circuit and yield the deciding operand.
        Expr::Binary(BinOp::And, lhs, rhs) => {
            let l = eval(lhs)?;
            if !l.truthy() {
                return Ok(l);
            }
            eval(rhs)
        }
        Expr::Binary(BinOp::Or, lhs, rhs) => {
            let l = eval(lhs)?;
            if l.truthy() {
                return Ok(l);
            }
            eval(rhs)
        }

        Expr::Binary(op, lhs, rhs) => {
            let l = eval(lhs)?;
            let r = eval(rhs)?;
            eval_binop(*op, l, r)
        }
    }
}

fn eval_binop(op: BinOp, l: Scalar, r: Scalar) -> Result<Scalar, String> {
    match op {
        BinOp::Add => Ok(arith(l, r, i64::checked_add, |a, b| a + b)),
        BinOp::Sub => Ok(arith(l, r, i64::checked_sub, |a, b| a - b)),
        BinOp::Mul => Ok(arith(l, r, i64::checked_mul, |a, b| a * b)),
        BinOp::Div => {
            if r.as_f64() == 0.0 {
                return Err("division by zero".into());
            }
            Ok(match (l.as_i64(), r.as_i64()) {
                (Some(a), Some(b)) if a.checked_rem(b) == Some(0) => {
                    a.checked_div(b).map_or(Scalar::Real(a as f64 / b as f64), Scalar::Int)
                }
                _ => Scalar::Real(l.as_f64() / r.as_f64()),
            })
        }
        BinOp::Rem => {
            if r.as_f64() == 0.0 {
                return Err("modulo by zero".into());
            }
            Ok(arith(l, r, i64::checked_rem, |a, b| a % b))
        }

        BinOp::Eq => Ok(Scalar::Bool(compare(l, r) == Some(Ordering::Equal))),
        BinOp::Ne => Ok(Scalar::Bool(compare(l, r) != Some(Ordering::Equal))),
        BinOp::Lt => Ok(Scalar::Bool(compare(l, r) == Some(Ordering::Less))),
        BinOp::Le => Ok(Scalar::Bool(matches!(
            compare(l, r),
            Some(Ordering::Less | Ordering::Equal)
        ))),
        BinOp::Gt => Ok(Scalar::Bool(compare(l, r) == Some(Ordering::Greater))),
        BinOp::Ge => Ok(Scalar::Bool(matches!(
            compare(l, r),
            Some(Ordering::Greater | Ordering::Equal)
        ))),

        BinOp::And | BinOp::Or => unreachable!("short-circuit operators handled in eval"),
    }
}

/// Integer arithmetic with an `f64` fallback on overflow or real operands.
fn arith(
    l: Scalar,
    r: Scalar,
    int_op: fn(i64, i64) -> Option<i64>,
    real_op: fn(f64, f64) -> f64,
) -> Scalar {
    if let (Some(a), Some(b)) = (l.as_i64(), r.as_i64()) {
        if let Some(n) = int_op(a, b) {
            return Scalar::Int(n);
        }
    }
    Scalar::Real(real_op(l.as_f64(), r.as_f64()))
}

/// `None` when either side is NaN.
fn compare(l: Scalar, r: Scalar) -> Option<Ordering> {
    match (l.as_i64(), r.as_i64()) {
        (Some(a), Some(b)) => Some(a.cmp(&b)),
        _ => l.as_f64().partial_cmp(&r.as_f64()),
    }
}

/// Apply the numeric policy to the final result.
fn finish(v: Scalar, text: &str) -> Result<Value, ScriptError> {
    match v {
        Scalar::Int(n) => Ok(Value::Int(n)),
        Scalar::Bool(b) => Ok(Value::Bool(b)),
        Scalar::Real(x) if !x.is_finite() => {
            Err(ScriptError::invalid(text, "result is not a finite number"))
        }
        Scalar::Real(x) if x.fract() != 0.0 => Err(ScriptError::NonIntegerResult {
            expr: text.to_owned(),
        }),
        // 2^63 is exactly representable; anything at or beyond it is not an i64.
        Scalar::Real(x) if x < -9_223_372_036_854_775_808.0 || x >= 9_223_372_036_854_775_808.0 => {
            Err(ScriptError::invalid(text, "result does not fit in an integer"))
        }
        Scalar::Real(x) => Ok(Value::Int(x as i64)),
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Evaluate a token sequence against the variables in scope.
pub fn evaluate<S: AsRef<str>>(tokens: &[S], variables: &Variables) -> Result<Value, ScriptError> {
    let (toks, text) = substitute(tokens, variables)?;
    let expr = Parser::new(toks)
        .parse_complete()
        .map_err(|reason| ScriptError::invalid(&text, reason))?;
    let v = eval(&expr).map_err(|reason| ScriptError::invalid(&text, reason))?;
    finish(v, &text)
}

/// Convenience: tokenize and evaluate an expression string.
pub fn eval_str(src: &str, variables: &Variables) -> Result<Value, ScriptError> {
    let tokens: Vec<String> = super::token::tokenize(src).into_iter().map(|t| t.text).collect();
    evaluate(&tokens, variables)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
