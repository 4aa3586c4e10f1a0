//! The grid scripting language.
//!
//! A script is a plain sequence of lines.  Each line is one of:
//!
//! - a host command call: `moveX(3)`
//! - an assignment: `speed = speed * 2`
//! - `if (cond) { … }` / `repeat (count) { … }`
//! - a function definition `function name(a, b) { … }` or a call `name(1, 2)`
//! - a `//` comment or blank line
//!
//! Expressions are integer arithmetic with comparisons and `&&` / `||`;
//! every value that lands in a variable or reaches a command must be an
//! integer.  Host commands are asynchronous and run strictly one after
//! another in program order.
//!
//! # Quick start
//!
//! ```rust
//! use gridscript::command::CommandTable;
//! use gridscript::script::Interpreter;
//!
//! let mut table = CommandTable::new();
//! table.register("moveX", |_args| async { Ok(()) });
//!
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! let result = rt.block_on(async {
//!     let mut interp = Interpreter::new(table);
//!     interp.run("x = 6 * 7\nrepeat(2) { moveX(x) }").await
//! });
//! assert!(result.success);
//! assert_eq!(result.variables.get("x"), Some(42));
//! ```

pub mod error;
pub mod expr;
pub mod interp;
pub mod registry;
pub mod stmt;
pub mod token;
pub mod value;

// Re-exports for convenience.
pub use error::{Failure, ScriptError};
pub use interp::{run, ExecutionResult, Interpreter, DEFAULT_MAX_DEPTH};
pub use registry::{FunctionDef, FunctionRegistry};
pub use value::Value;
