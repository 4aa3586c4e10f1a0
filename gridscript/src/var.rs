//! Variable scope.
//!
//! A [`Variables`] map holds the integer bindings visible to one interpreter
//! invocation.  Blocks borrow their parent's map; function calls get an owned
//! snapshot with the parameters laid over it (see [`Variables::overlay`]).

use std::collections::HashMap;

/// Identifier → integer bindings for one scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables {
    vars: HashMap<String, i64>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or overwrite) a variable.
    pub fn set(&mut self, name: impl Into<String>, value: i64) {
        self.vars.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.vars.get(name).copied()
    }

    /// Returns `true` if the variable is set.
    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Copy of this scope with `bindings` written on top.
    ///
    /// Used to build a function's scope: the caller's map is left alone.
    pub fn overlay<'a, I>(&self, bindings: I) -> Variables
    where
        I: IntoIterator<Item = (&'a str, i64)>,
    {
        let mut scope = self.clone();
        for (name, value) in bindings {
            scope.set(name, value);
        }
        scope
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, i64)> for Variables {
    fn from_iter<T: IntoIterator<Item = (S, i64)>>(iter: T) -> Self {
        let mut vars = Variables::new();
        for (name, value) in iter {
            vars.set(name, value);
        }
        vars
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get() {
        let mut vars = Variables::new();
        vars.set("x", 5);
        assert_eq!(vars.get("x"), Some(5));
        assert!(vars.contains("x"));
    }

    #[test]
    fn overwrite() {
        let mut vars = Variables::new();
        vars.set("x", 1);
        vars.set("x", 2);
        assert_eq!(vars.get("x"), Some(2));
        assert_eq!(vars.len(), 1);
    }

    #[test]
    fn missing_returns_none() {
        let vars = Variables::new();
        assert_eq!(vars.get("nope"), None);
        assert!(vars.is_empty());
    }

    #[test]
    fn overlay_leaves_original_untouched() {
        let caller: Variables = [("x", 1), ("y", 2)].into_iter().collect();
        let mut callee = caller.overlay([("x", 10), ("a", 3)]);
        callee.set("y", 99);

        assert_eq!(callee.get("x"), Some(10));
        assert_eq!(callee.get("a"), Some(3));
        assert_eq!(caller.get("x"), Some(1));
        assert_eq!(caller.get("y"), Some(2));
        assert!(!caller.contains("a"));
    }
}
