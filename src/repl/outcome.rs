//! Execution result model and binding inspector

use std::collections::BTreeSet;

use crate::interp::env::Environment;
use crate::interp::value::Value;

/// Submission status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    Ok,
    Error,
}

/// Result of one submission
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    pub status: ExecutionStatus,
    /// Rendered result value, or the error message; absent when the
    /// submission produced no value
    pub result: Option<String>,
    /// Rendered type of the result value
    pub result_type: Option<String>,
    /// Snapshot of the current bindings
    pub bindings: Vec<Binding>,
}

/// Display-ready view of one variable binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    pub ty: String,
    /// 1 for scalars, element count for containers
    pub size: usize,
    pub value: String,
}

impl Binding {
    /// Containers render as a count so REPL output stays bounded no matter
    /// how much data a binding holds; everything else renders its textual
    /// form.
    pub fn describe(name: &str, value: &Value) -> Binding {
        let (size, rendered) = match value {
            Value::List(items) => (items.len(), format!("{} objects", items.len())),
            Value::Map(entries) => (entries.len(), format!("{} objects", entries.len())),
            other => (1, other.to_string()),
        };
        Binding {
            name: name.to_string(),
            ty: value.type_name(),
            size,
            value: rendered,
        }
    }
}

/// Rendered value and type of a submission result (same projection as
/// bindings, so container results display as a count too)
pub(crate) fn render_result(value: &Value) -> (String, String) {
    let binding = Binding::describe("", value);
    (binding.value, binding.ty)
}

/// Project the environment's declaration history into a de-duplicated,
/// name-sorted snapshot. The most recent declaration wins per name;
/// declaration order is only used to resolve which entry that is.
pub fn snapshot(env: &Environment) -> Vec<Binding> {
    let names: BTreeSet<&str> = env.declarations().iter().map(|n| n.as_str()).collect();
    names
        .into_iter()
        .filter_map(|name| env.lookup(name).map(|value| Binding::describe(name, value)))
        .collect()
}
