//! User-defined functions.
//!
//! A [`FunctionRegistry`] maps a function name to its parameter list and
//! raw body lines.  Bodies are stored untokenized and re-interpreted on
//! every call.
//!
//! The registry belongs to an [`Interpreter`](super::interp::Interpreter)
//! session: definitions made by one `run` stay visible to later runs on the
//! same session until [`FunctionRegistry::clear`] is called.

use std::collections::HashMap;
use std::sync::Arc;

/// A `function name(params) { body }` definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<String>,
}

impl FunctionDef {
    pub fn new(name: impl Into<String>, params: Vec<String>, body: Vec<String>) -> Self {
        Self {
            name: name.into(),
            params,
            body,
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// Name → definition table.
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Arc<FunctionDef>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a definition.  Returns the one it replaced.
    pub fn define(&mut self, def: FunctionDef) -> Option<Arc<FunctionDef>> {
        self.functions.insert(def.name.clone(), Arc::new(def))
    }

    /// Look a function up by name.
    ///
    /// The definition is shared, so a caller can keep executing it even if
    /// the body redefines the function while it runs.
    pub fn resolve(&self, name: &str) -> Option<Arc<FunctionDef>> {
        self.functions.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Drop every definition.
    pub fn clear(&mut self) {
        self.functions.clear();
    }

    /// Defined names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn def(name: &str, params: &[&str], body: &[&str]) -> FunctionDef {
        FunctionDef::new(
            name,
            params.iter().map(|s| s.to_string()).collect(),
            body.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn define_and_resolve() {
        let mut reg = FunctionRegistry::new();
        assert!(reg.define(def("square", &["n"], &["moveX(n)", "moveY(n)"])).is_none());
        let f = reg.resolve("square").unwrap();
        assert_eq!(f.params, vec!["n"]);
        assert_eq!(f.body.len(), 2);
        assert_eq!(f.arity(), 1);
        assert!(reg.resolve("circle").is_none());
    }

    #[test]
    fn redefinition_replaces() {
        let mut reg = FunctionRegistry::new();
        reg.define(def("f", &[], &["moveX(1)"]));
        let old = reg.define(def("f", &["a", "b"], &["moveY(a)"]));
        assert_eq!(old.unwrap().body, vec!["moveX(1)"]);
        assert_eq!(reg.resolve("f").unwrap().arity(), 2);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn resolved_definition_outlives_replacement() {
        let mut reg = FunctionRegistry::new();
        reg.define(def("f", &[], &["moveX(1)"]));
        let running = reg.resolve("f").unwrap();
        reg.define(def("f", &[], &["moveX(2)"]));
        assert_eq!(running.body, vec!["moveX(1)"]);
    }

    #[test]
    fn clear_and_names() {
        let mut reg = FunctionRegistry::new();
        reg.define(def("zig", &[], &[]));
        reg.define(def("zag", &[], &[]));
        assert_eq!(reg.names(), vec!["zag", "zig"]);
        assert!(reg.contains("zig"));
        reg.clear();
        assert!(reg.is_empty());
    }
}
