//! Session environment
//!
//! The accumulated evaluation state threaded across submissions: variable
//! bindings in declaration order, the set of imported namespaces, and the
//! last produced value. `Clone` yields a fully isolated continuation thanks
//! to the deep-copy semantics of [`Value`].

use indexmap::{IndexMap, IndexSet};

use super::value::Value;

/// Namespaces every session starts with
pub const DEFAULT_IMPORTS: &[&str] = &["std.core"];

/// Accumulated, mutable evaluation state
#[derive(Debug, Clone)]
pub struct Environment {
    /// Current value per name
    vars: IndexMap<String, Value>,
    /// Names in the order they were (re)declared; re-declaration appends a
    /// new entry, which is how "last write wins" is resolved for display
    declarations: Vec<String>,
    /// Imported namespaces; grows monotonically over a session's lifetime
    imports: IndexSet<String>,
    /// Value produced by the most recent successful submission
    last_value: Option<Value>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// Create a fresh environment with the default imports
    pub fn new() -> Self {
        Self {
            vars: IndexMap::new(),
            declarations: Vec::new(),
            imports: DEFAULT_IMPORTS.iter().map(|s| s.to_string()).collect(),
            last_value: None,
        }
    }

    /// Look up a variable
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    /// Bind a variable, recording the declaration
    pub fn assign(&mut self, name: &str, value: Value) {
        self.vars.insert(name.to_string(), value);
        self.declarations.push(name.to_string());
    }

    /// Declaration history, oldest first
    pub fn declarations(&self) -> &[String] {
        &self.declarations
    }

    /// Imported namespaces
    pub fn imports(&self) -> &IndexSet<String> {
        &self.imports
    }

    /// Add an imported namespace
    pub fn add_import(&mut self, path: &str) {
        self.imports.insert(path.to_string());
    }

    /// Value produced by the most recent successful submission
    pub fn last_value(&self) -> Option<&Value> {
        self.last_value.as_ref()
    }

    /// Record the last produced value
    pub fn set_last_value(&mut self, value: Option<Value>) {
        self.last_value = value;
    }
}
