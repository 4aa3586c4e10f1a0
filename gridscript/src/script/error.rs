//! Script failure taxonomy.

use thiserror::Error;

/// Everything that can stop a script.
///
/// The `Display` text is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    // === Expressions ===
    #[error("variable '{name}' is not defined")]
    UndefinedVariable { name: String },

    #[error("invalid expression '{expr}': {reason}")]
    InvalidExpression { expr: String, reason: String },

    #[error("expression '{expr}' does not produce an integer")]
    NonIntegerResult { expr: String },

    // === Statements ===
    #[error("cannot assign a boolean to '{name}'")]
    NonIntegerAssignment { name: String },

    #[error("'{target}' cannot be assigned to")]
    InvalidAssignmentTarget { target: String },

    #[error("argument {position} of '{name}' is a boolean, expected an integer")]
    NonIntegerArgument { name: String, position: usize },

    #[error("repeat count must be an integer")]
    NonIntegerRepeatCount,

    // === Blocks and definitions ===
    #[error("missing function name")]
    MissingFunctionName,

    #[error("function '{name}': missing parameter list")]
    MissingParameterList { name: String },

    #[error("'{keyword}' block: missing '{{'")]
    MissingBlockOpen { keyword: String },

    #[error("'{keyword}' block is never closed")]
    UnterminatedBlock { keyword: String },

    // === Calls ===
    #[error("unknown command '{name}'")]
    UnknownCommand { name: String },

    #[error("function '{name}' expects {expected} argument(s), got {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("command '{name}' failed: {message}")]
    CommandFailed { name: String, message: String },

    #[error("nesting deeper than {limit} blocks or calls")]
    RecursionLimit { limit: usize },
}

impl ScriptError {
    pub(crate) fn invalid(expr: impl Into<String>, reason: impl Into<String>) -> Self {
        ScriptError::InvalidExpression {
            expr: expr.into(),
            reason: reason.into(),
        }
    }

    /// Attach the 1-based line number of the scope that raised it.
    pub fn at(self, line: usize) -> Failure {
        Failure { error: self, line }
    }
}

/// A [`ScriptError`] pinned to the line where it happened.
///
/// `line` is local to the block or function body that was executing, not
/// to the top-level script.  Enclosing scopes pass it through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub error: ScriptError,
    pub line: usize,
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.error)
    }
}

impl std::error::Error for Failure {}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        let e = ScriptError::UndefinedVariable { name: "speed".into() };
        assert_eq!(e.to_string(), "variable 'speed' is not defined");

        let e = ScriptError::MissingBlockOpen { keyword: "repeat".into() };
        assert_eq!(e.to_string(), "'repeat' block: missing '{'");

        let e = ScriptError::ArityMismatch { name: "f".into(), expected: 2, found: 1 };
        assert_eq!(e.to_string(), "function 'f' expects 2 argument(s), got 1");
    }

    #[test]
    fn failure_display_includes_line() {
        let f = ScriptError::UnknownCommand { name: "jump".into() }.at(4);
        assert_eq!(f.line, 4);
        assert_eq!(f.to_string(), "line 4: unknown command 'jump'");
    }
}
