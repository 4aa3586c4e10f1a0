//! Line tokenizer.
//!
//! A script line is split into words, integers and operator symbols.  The
//! two-character operators `==`, `!=`, `>=`, `<=`, `&&` and `||` are glued
//! into a single symbol; every other symbol character stands alone.  A lone
//! `&` or `|` also splits a line, but is not an operator.
//!
//! There are no string literals and no in-line comments, so the tokenizer
//! never has to track quoting state.

use std::sync::OnceLock;

use regex::Regex;

/// Characters that split a line into fragments.
pub const SYMBOL_CHARS: &str = "(),={}[]+-*/!><%";

static TOKEN_RE: OnceLock<Regex> = OnceLock::new();

/// Alternation order matters: glued operators come first so the regex
/// engine's leftmost-first semantics prefers `>=` over `>`.
fn token_re() -> &'static Regex {
    TOKEN_RE.get_or_init(|| {
        Regex::new(r"==|!=|>=|<=|&&|\|\||[(),={}\[\]+\-*/!><%&|]|[^\s(),={}\[\]+\-*/!><%&|]+")
            .unwrap_or_else(|e| panic!("token regex is invalid: {e}"))
    })
}

// ── Token ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifiers, keywords, `true`/`false`, and anything unclassifiable.
    Word,
    /// A base-10 integer literal.
    Number,
    /// An operator or punctuation symbol.
    Symbol,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn is_symbol(&self, s: &str) -> bool {
        self.kind == TokenKind::Symbol && self.text == s
    }

    pub fn is_word(&self, s: &str) -> bool {
        self.kind == TokenKind::Word && self.text == s
    }
}

// ── Tokenizer ─────────────────────────────────────────────────────────────────

/// Split one line of script text into classified tokens.
pub fn tokenize(line: &str) -> Vec<Token> {
    token_re()
        .find_iter(line)
        .map(|m| m.as_str().trim())
        .filter(|frag| !frag.is_empty())
        .map(|frag| Token {
            kind: classify(frag),
            text: frag.to_owned(),
        })
        .collect()
}

fn classify(frag: &str) -> TokenKind {
    if frag.chars().all(is_symbol_char) || matches!(frag, "&&" | "||") {
        TokenKind::Symbol
    } else if frag.parse::<i64>().is_ok() && frag.bytes().all(|b| b.is_ascii_digit()) {
        TokenKind::Number
    } else {
        TokenKind::Word
    }
}

fn is_symbol_char(c: char) -> bool {
    SYMBOL_CHARS.contains(c)
}

/// `true` if `s` can name a variable, function or parameter.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ── Tests ─────────────────────────────────────────────────────────────────────
