//! Host command table.
//!
//! The host hands the interpreter a [`CommandTable`] of named asynchronous
//! commands.  Scripts call them like functions with integer arguments; the
//! interpreter awaits each call to completion before moving on, so commands
//! reach the host strictly in program order.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Future returned by a host command.
pub type CommandFuture = Pin<Box<dyn Future<Output = Result<(), String>> + Send>>;

/// A host command: takes the evaluated arguments, performs its side effect.
///
/// Arity is not checked by the interpreter; a command receives whatever the
/// script passed and may reject it by returning `Err`.
pub type Command = Arc<dyn Fn(Vec<i64>) -> CommandFuture + Send + Sync>;

/// Name → command mapping supplied by the host.
#[derive(Clone, Default)]
pub struct CommandTable {
    commands: HashMap<String, Command>,
}

impl std::fmt::Debug for CommandTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.commands.keys().collect();
        names.sort();
        f.debug_struct("CommandTable").field("commands", &names).finish()
    }
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a command.
    pub fn insert(&mut self, name: impl Into<String>, command: Command) {
        self.commands.insert(name.into(), command);
    }

    /// Register an `async` closure as a command.
    ///
    /// ```rust
    /// use gridscript::command::CommandTable;
    ///
    /// let mut table = CommandTable::new();
    /// table.register("beep", |_args| async { Ok(()) });
    /// assert!(table.contains("beep"));
    /// ```
    pub fn register<F, Fut>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(Vec<i64>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), String>> + Send + 'static,
    {
        let command: Command = Arc::new(move |args| Box::pin(f(args)) as CommandFuture);
        self.insert(name, command);
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[tokio::test]
    async fn registered_command_receives_arguments() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut table = CommandTable::new();
        table.register("record", move |args| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().unwrap().push(args);
                Ok(())
            }
        });

        let cmd = table.get("record").unwrap();
        cmd(vec![1, 2]).await.unwrap();
        cmd(vec![]).await.unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![vec![1, 2], vec![]]);
    }

    #[tokio::test]
    async fn command_can_fail() {
        let mut table = CommandTable::new();
        table.register("explode", |_| async { Err("boom".to_owned()) });
        let result = table.get("explode").unwrap()(vec![]).await;
        assert_eq!(result, Err("boom".to_owned()));
    }

    #[test]
    fn names_sorted() {
        let mut table = CommandTable::new();
        table.register("moveY", |_| async { Ok(()) });
        table.register("moveX", |_| async { Ok(()) });
        assert_eq!(table.names(), vec!["moveX", "moveY"]);
        assert_eq!(table.len(), 2);
        assert!(!table.contains("jump"));
    }
}
