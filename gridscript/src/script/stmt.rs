//! Statement recognition and block scanning.
//!
//! A script is a sequence of lines.  Blank lines and lines starting with
//! `//` are ignored.  Every other line is tokenized and matched against the
//! statement forms below, in this order:
//!
//! 1. `function name(a, b) { … }`
//! 2. `if (expr) { … }` and `repeat (expr) { … }`
//! 3. `name = expr`
//! 4. `name(arg, arg, …)`
//!
//! Lines matching none of them are [`Stmt::Unrecognized`] and get skipped
//! by the interpreter.
//!
//! # Block boundaries
//!
//! Blocks are found by counting `{` and `}` characters in the raw text,
//! starting at the header's opening brace.  The scan knows nothing about
//! tokens.  That is sound only because the language has no string or
//! character literals that could hold a stray brace; any future literal
//! syntax has to teach [`collect_block`] to skip it.

use super::error::ScriptError;
use super::token::{is_identifier, Token, TokenKind};

/// Line comment marker.
pub const COMMENT: &str = "//";

/// `true` for lines the interpreter skips without tokenizing.
pub fn is_blank_or_comment(line: &str) -> bool {
    let t = line.trim();
    t.is_empty() || t.starts_with(COMMENT)
}

// ── Statement forms ───────────────────────────────────────────────────────────

/// A recognized statement header.
///
/// Expression operands are kept as token texts; they are evaluated against
/// the scope at the time the statement runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// `function name(params) {`; the body follows via [`collect_block`].
    Function { name: String, params: Vec<String> },
    /// `if (cond) {`
    If { cond: Vec<String> },
    /// `repeat (count) {`
    Repeat { count: Vec<String> },
    /// `target = value`
    Assign { target: String, value: Vec<String> },
    /// `name(args…)`, one token group per argument.
    Call { name: String, args: Vec<Vec<String>> },
    /// Anything else.
    Unrecognized,
}

/// Match a tokenized line against the statement forms.
pub fn parse_stmt(tokens: &[Token]) -> Result<Stmt, ScriptError> {
    let Some(first) = tokens.first() else {
        return Ok(Stmt::Unrecognized);
    };

    if first.is_word("function") {
        return parse_function_header(tokens);
    }

    if first.is_word("if") || first.is_word("repeat") {
        let open = tokens
            .iter()
            .position(|t| t.is_symbol("{"))
            .ok_or_else(|| ScriptError::MissingBlockOpen {
                keyword: first.text.clone(),
            })?;
        let expr = texts(&tokens[1..open]);
        return Ok(if first.text == "if" {
            Stmt::If { cond: expr }
        } else {
            Stmt::Repeat { count: expr }
        });
    }

    if tokens.get(1).is_some_and(|t| t.is_symbol("=")) {
        if first.kind != TokenKind::Word
            || !is_identifier(&first.text)
            || matches!(first.text.as_str(), "true" | "false")
        {
            return Err(ScriptError::InvalidAssignmentTarget {
                target: first.text.clone(),
            });
        }
        return Ok(Stmt::Assign {
            target: first.text.clone(),
            value: texts(&tokens[2..]),
        });
    }

    if let Some(open) = tokens.iter().position(|t| t.is_symbol("(")) {
        let close = tokens
            .iter()
            .rposition(|t| t.is_symbol(")"))
            .filter(|&c| c > open)
            .ok_or_else(|| ScriptError::invalid(texts(tokens).join(" "), "missing ')'"))?;
        return Ok(Stmt::Call {
            name: first.text.clone(),
            args: split_args(&tokens[open + 1..close]),
        });
    }

    Ok(Stmt::Unrecognized)
}

fn parse_function_header(tokens: &[Token]) -> Result<Stmt, ScriptError> {
    let name = match tokens.get(1) {
        Some(t) if t.kind == TokenKind::Word && is_identifier(&t.text) => t.text.clone(),
        _ => return Err(ScriptError::MissingFunctionName),
    };
    let missing = || ScriptError::MissingParameterList { name: name.clone() };

    if !tokens.get(2).is_some_and(|t| t.is_symbol("(")) {
        return Err(missing());
    }
    let close = tokens
        .iter()
        .skip(3)
        .position(|t| t.is_symbol(")"))
        .map(|p| p + 3)
        .ok_or_else(missing)?;

    // Parameters and commas must alternate; one trailing comma is allowed.
    let mut params = Vec::new();
    let mut want_param = true;
    for t in &tokens[3..close] {
        if t.is_symbol(",") && !want_param {
            want_param = true;
            continue;
        }
        if !want_param || t.kind != TokenKind::Word || !is_identifier(&t.text) {
            return Err(missing());
        }
        params.push(t.text.clone());
        want_param = false;
    }
    Ok(Stmt::Function { name, params })
}

fn texts(tokens: &[Token]) -> Vec<String> {
    tokens.iter().map(|t| t.text.clone()).collect()
}

/// Split call arguments on top-level commas.
///
/// `f()` has no arguments; a single trailing comma is tolerated.
fn split_args(tokens: &[Token]) -> Vec<Vec<String>> {
    if tokens.is_empty() {
        return Vec::new();
    }
    let mut args = Vec::new();
    let mut current = Vec::new();
    let mut depth = 0usize;
    for t in tokens {
        if t.kind == TokenKind::Symbol {
            match t.text.as_str() {
                "(" => depth += 1,
                ")" => depth = depth.saturating_sub(1),
                "," if depth == 0 => {
                    args.push(std::mem::take(&mut current));
                    continue;
                }
                _ => {}
            }
        }
        current.push(t.text.clone());
    }
    if !current.is_empty() {
        args.push(current);
    }
    args
}

// ── Block scanner ─────────────────────────────────────────────────────────────

/// The body of a brace-delimited block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Body lines, numbered from 1 when executed.
    pub body: Vec<String>,
    /// Index of the line holding the closing brace.
    pub last_line: usize,
    /// Text after the closing brace on that line (ignored).
    pub trailing: String,
}

/// Collect the block opened by the statement at `lines[header]`.
///
/// The opening brace is normally on the header line.  A function header
/// may instead put it at the start of the next non-blank line.  Text after
/// the opening brace on the same line becomes the first body line, so a
/// block can open and close on a single line.
pub fn collect_block<S: AsRef<str>>(
    lines: &[S],
    header: usize,
    keyword: &str,
) -> Result<Block, ScriptError> {
    let (open_line, open_col) = find_open(lines, header).ok_or_else(|| {
        ScriptError::MissingBlockOpen {
            keyword: keyword.to_owned(),
        }
    })?;

    let mut body = Vec::new();
    let mut depth = 1usize;
    let mut idx = open_line;
    let mut rest = &lines[open_line].as_ref()[open_col + 1..];

    loop {
        let mut close_at = None;
        for (i, c) in rest.char_indices() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        close_at = Some(i);
                        break;
                    }
                }
                _ => {}
            }
        }

        match close_at {
            Some(i) => {
                let segment = &rest[..i];
                if !segment.trim().is_empty() {
                    body.push(segment.to_owned());
                }
                return Ok(Block {
                    body,
                    last_line: idx,
                    trailing: rest[i + 1..].trim().to_owned(),
                });
            }
            // Interior lines are kept even when blank so body line numbers
            // stay in step with the source.
            None if idx != open_line || !rest.trim().is_empty() => body.push(rest.to_owned()),
            None => {}
        }

        idx += 1;
        if idx >= lines.len() {
            return Err(ScriptError::UnterminatedBlock {
                keyword: keyword.to_owned(),
            });
        }
        rest = lines[idx].as_ref();
    }
}

fn find_open<S: AsRef<str>>(lines: &[S], header: usize) -> Option<(usize, usize)> {
    let first = lines.get(header)?.as_ref();
    if let Some(col) = first.find('{') {
        return Some((header, col));
    }
    let (idx, line) = lines
        .iter()
        .enumerate()
        .skip(header + 1)
        .find(|(_, l)| !l.as_ref().trim().is_empty())?;
    let line = line.as_ref();
    let col = line.find('{')?;
    line[..col].trim().is_empty().then_some((idx, col))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
