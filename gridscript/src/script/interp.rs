//! Statement interpreter.
//!
//! The [`Interpreter`] is one scripting session: it owns the host's
//! [`CommandTable`] and the [`FunctionRegistry`] filled by `function`
//! statements.  It walks a script line by line, evaluates expressions,
//! recurses into blocks and function bodies, and awaits every host command
//! before moving to the next statement.
//!
//! # Scopes
//!
//! There are two ways into a body, and they treat variables differently:
//!
//! - `if` / `repeat` bodies run with the caller's own [`Variables`];
//!   assignments inside stay visible afterwards.
//! - Function bodies run with a fresh map: a copy of the caller's variables
//!   with the parameters laid over it.  Nothing written inside flows back.

use std::future::Future;
use std::pin::Pin;

use tracing::{debug, trace, Instrument};

use super::{
    error::{Failure, ScriptError},
    expr::evaluate,
    registry::{FunctionDef, FunctionRegistry},
    stmt::{collect_block, is_blank_or_comment, parse_stmt, Block, Stmt},
    token::tokenize,
    value::Value,
};
use crate::command::CommandTable;
use crate::var::Variables;

/// Default bound on nested blocks and function calls.
pub const DEFAULT_MAX_DEPTH: usize = 256;

type ExecFuture<'a> = Pin<Box<dyn Future<Output = Result<(), Failure>> + Send + 'a>>;

// ── ExecutionResult ───────────────────────────────────────────────────────────

/// Outcome of a top-level run, handed back to the host.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    pub success: bool,
    /// The first error raised anywhere in the run.
    pub error: Option<ScriptError>,
    /// 1-based line of the error, local to the innermost block or function
    /// body that was executing.
    pub line: Option<usize>,
    /// Top-level variables as they stood when the run ended.
    pub variables: Variables,
}

impl ExecutionResult {
    fn completed(variables: Variables) -> Self {
        Self {
            success: true,
            error: None,
            line: None,
            variables,
        }
    }

    fn failed(failure: Failure, variables: Variables) -> Self {
        Self {
            success: false,
            error: Some(failure.error),
            line: Some(failure.line),
            variables,
        }
    }

    /// Human-readable error message, if the run failed.
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    /// Convert into a `Result`, dropping the variables on failure.
    pub fn into_result(self) -> Result<Variables, Failure> {
        match (self.error, self.line) {
            (Some(error), Some(line)) => Err(Failure { error, line }),
            _ => Ok(self.variables),
        }
    }
}

// ── Interpreter ───────────────────────────────────────────────────────────────

/// A scripting session.
#[derive(Debug)]
pub struct Interpreter {
    commands: CommandTable,
    functions: FunctionRegistry,
    max_depth: usize,
}

impl Interpreter {
    pub fn new(commands: CommandTable) -> Self {
        Interpreter {
            commands,
            functions: FunctionRegistry::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the nesting bound for blocks and calls.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn commands(&self) -> &CommandTable {
        &self.commands
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    /// Forget every user-defined function.
    ///
    /// Definitions otherwise carry over from one [`run`](Self::run) to the
    /// next on the same session.
    pub fn reset(&mut self) {
        self.functions.clear();
    }

    // ── Execution ─────────────────────────────────────────────────────────────

    /// Run a script with an empty top-level scope.
    pub async fn run(&mut self, script: &str) -> ExecutionResult {
        self.run_with(script, Variables::new()).await
    }

    /// Run a script with preset top-level variables.
    pub async fn run_with(&mut self, script: &str, initial: Variables) -> ExecutionResult {
        let lines: Vec<String> = script.lines().map(str::to_owned).collect();
        let mut vars = initial;
        match self.exec_block(&lines, &mut vars, 0).await {
            Ok(()) => ExecutionResult::completed(vars),
            Err(failure) => {
                debug!(line = failure.line, error = %failure.error, "script failed");
                ExecutionResult::failed(failure, vars)
            }
        }
    }

    /// Execute `lines` in the caller's scope.
    ///
    /// `depth` is the number of blocks and calls already entered.
    fn exec_block<'a>(
        &'a mut self,
        lines: &'a [String],
        vars: &'a mut Variables,
        depth: usize,
    ) -> ExecFuture<'a> {
        Box::pin(async move {
            let mut i = 0;
            while i < lines.len() {
                let line = lines[i].as_str();
                if is_blank_or_comment(line) {
                    i += 1;
                    continue;
                }
                let lineno = i + 1;
                let at = move |e: ScriptError| e.at(lineno);
                trace!(line = lineno, text = line.trim(), "exec");

                let tokens = tokenize(line);
                match parse_stmt(&tokens).map_err(at)? {
                    Stmt::Function { name, params } => {
                        let block = collect_block(lines, i, "function").map_err(at)?;
                        i = self.next_line(&block);
                        debug!(function = %name, ?params, "define");
                        if self
                            .functions
                            .define(FunctionDef::new(name.as_str(), params, block.body))
                            .is_some()
                        {
                            debug!(function = %name, "replaced earlier definition");
                        }
                    }

                    Stmt::If { cond } => {
                        let value = evaluate(&cond, vars).map_err(at)?;
                        let block = collect_block(lines, i, "if").map_err(at)?;
                        i = self.next_line(&block);
                        if value.is_truthy() {
                            self.enter(depth, lineno)?;
                            debug!(line = lineno, depth = depth + 1, "enter if block");
                            self.exec_block(&block.body, vars, depth + 1).await?;
                        }
                    }

                    Stmt::Repeat { count } => {
                        let n = evaluate(&count, vars)
                            .map_err(at)?
                            .as_int()
                            .ok_or_else(|| at(ScriptError::NonIntegerRepeatCount))?;
                        let block = collect_block(lines, i, "repeat").map_err(at)?;
                        i = self.next_line(&block);
                        debug!(line = lineno, times = n.max(0), "enter repeat block");
                        for _ in 0..n.max(0) {
                            self.enter(depth, lineno)?;
                            self.exec_block(&block.body, vars, depth + 1).await?;
                        }
                    }

                    Stmt::Assign { target, value } => {
                        match evaluate(&value, vars).map_err(at)? {
                            Value::Int(n) => vars.set(target, n),
                            Value::Bool(_) => {
                                return Err(at(ScriptError::NonIntegerAssignment { name: target }))
                            }
                        }
                        i += 1;
                    }

                    Stmt::Call { name, args } => {
                        let mut values = Vec::with_capacity(args.len());
                        for (pos, group) in args.iter().enumerate() {
                            match evaluate(group, vars).map_err(at)? {
                                Value::Int(n) => values.push(n),
                                Value::Bool(_) => {
                                    return Err(at(ScriptError::NonIntegerArgument {
                                        name,
                                        position: pos + 1,
                                    }))
                                }
                            }
                        }
                        self.call(&name, values, vars, lineno, depth).await?;
                        i += 1;
                    }

                    Stmt::Unrecognized => {
                        debug!(line = lineno, text = line.trim(), "skipping unrecognized statement");
                        i += 1;
                    }
                }
            }
            Ok(())
        })
    }

    /// Invoke a host command or user-defined function.
    ///
    /// Host commands win over functions of the same name.  A function body
    /// runs in a snapshot of `caller` overlaid with its parameters.
    async fn call(
        &mut self,
        name: &str,
        args: Vec<i64>,
        caller: &Variables,
        lineno: usize,
        depth: usize,
    ) -> Result<(), Failure> {
        if let Some(command) = self.commands.get(name).cloned() {
            trace!(command = name, ?args, "dispatch");
            return command(args).await.map_err(|message| {
                ScriptError::CommandFailed {
                    name: name.to_owned(),
                    message,
                }
                .at(lineno)
            });
        }

        let Some(def) = self.functions.resolve(name) else {
            return Err(ScriptError::UnknownCommand { name: name.to_owned() }.at(lineno));
        };
        if def.arity() != args.len() {
            return Err(ScriptError::ArityMismatch {
                name: name.to_owned(),
                expected: def.arity(),
                found: args.len(),
            }
            .at(lineno));
        }
        self.enter(depth, lineno)?;

        let mut scope = caller.overlay(def.params.iter().map(String::as_str).zip(args));
        self.exec_block(&def.body, &mut scope, depth + 1)
            .instrument(tracing::debug_span!("function", name = %name, depth = depth + 1))
            .await
    }

    fn enter(&self, depth: usize, lineno: usize) -> Result<(), Failure> {
        if depth >= self.max_depth {
            return Err(ScriptError::RecursionLimit { limit: self.max_depth }.at(lineno));
        }
        Ok(())
    }

    fn next_line(&self, block: &Block) -> usize {
        if !block.trailing.is_empty() {
            debug!(text = %block.trailing, "ignoring text after closing brace");
        }
        block.last_line + 1
    }
}

/// Run `script` in a fresh session.
///
/// Functions defined by the script are dropped when it returns.
pub async fn run(script: &str, commands: &CommandTable, initial: Variables) -> ExecutionResult {
    Interpreter::new(commands.clone()).run_with(script, initial).await
}

// ── Tests ─────────────────────────────────────────────────────────────────────
