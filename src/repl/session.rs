//! Evaluation session
//!
//! Owns the sequential REPL state and exposes the four operations the
//! shell needs: submit, reset, bindings, complete. A submission is
//! all-or-nothing: it executes against a clone of the environment and the
//! clone is committed only on success, so failed submissions leave the
//! session exactly as it was.

use tracing::debug;

use super::completion::{self, CompletionResult};
use super::outcome::{render_result, snapshot, Binding, ExecutionOutcome, ExecutionStatus};
use crate::frontend::lexer::tokenize;
use crate::frontend::parser::ast::{Module, StmtKind};
use crate::frontend::parser::parse;
use crate::interp::catalog::CATALOG;
use crate::interp::env::Environment;
use crate::interp::eval::Interpreter;
use crate::interp::value::Value;

/// Interactive evaluation session
#[derive(Debug, Default)]
pub struct ReplSession {
    env: Environment,
}

impl ReplSession {
    /// Create a fresh session
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute one submission against the accumulated state.
    ///
    /// Lex/parse diagnostics and unknown modules in top-level `use`
    /// statements are compile errors; anything that fails during execution
    /// is a runtime error. Either way the session state is untouched. On
    /// success, bindings, imports, and the last value advance together.
    pub fn submit(&mut self, code: &str) -> ExecutionOutcome {
        debug!(code = %code.trim(), "submission received");

        let tokens = match tokenize(code) {
            Ok(tokens) => tokens,
            Err(e) => return self.error_outcome(format!("Compile error:\n{}", e)),
        };

        let (module, errors) = parse(&tokens);
        if !errors.is_empty() {
            let rendered = errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("\n");
            return self.error_outcome(format!("Compile error:\n{}", rendered));
        }

        // Imports are parsed out ahead of execution, but committed only on
        // success together with the rest of the state.
        let imports = collect_imports(&module);
        if let Some(unknown) = imports.iter().find(|p| !CATALOG.has_module(p)) {
            return self.error_outcome(format!("Compile error:\nunknown module: {}", unknown));
        }

        let mut scratch = self.env.clone();
        match Interpreter::new(&mut scratch).run_module(&module) {
            Ok(last) => {
                for path in &imports {
                    scratch.add_import(path);
                }
                self.env = scratch;
                self.ok_outcome(last)
            }
            Err(failure) => {
                debug!(error = %failure.error, "submission failed");
                self.error_outcome(format!(
                    "Runtime error: [{}] [{}]",
                    failure.error,
                    failure.trace_display()
                ))
            }
        }
    }

    /// Discard all accumulated state, as if no code had ever run
    pub fn reset(&mut self) -> ExecutionOutcome {
        debug!("session reset");
        self.env = Environment::new();
        self.ok_outcome(None)
    }

    /// Current bindings, de-duplicated and sorted by name
    pub fn bindings(&self) -> Vec<Binding> {
        snapshot(&self.env)
    }

    /// Context-sensitive member completion for a partially typed line
    pub fn complete(&self, text: &str, cursor: usize) -> CompletionResult {
        completion::complete(&self.env, text, cursor)
    }

    /// Active imported namespaces, in insertion order
    pub fn imports(&self) -> Vec<String> {
        self.env.imports().iter().cloned().collect()
    }

    fn ok_outcome(&self, last: Option<Value>) -> ExecutionOutcome {
        let (result, result_type) = match last {
            Some(value) => {
                let (result, ty) = render_result(&value);
                (Some(result), Some(ty))
            }
            None => (None, None),
        };
        ExecutionOutcome {
            status: ExecutionStatus::Ok,
            result,
            result_type,
            bindings: self.bindings(),
        }
    }

    fn error_outcome(&self, message: String) -> ExecutionOutcome {
        ExecutionOutcome {
            status: ExecutionStatus::Error,
            result: Some(message),
            result_type: None,
            bindings: self.bindings(),
        }
    }
}

fn collect_imports(module: &Module) -> Vec<String> {
    module
        .items
        .iter()
        .filter_map(|stmt| match &stmt.kind {
            StmtKind::Use { path } => Some(path.clone()),
            _ => None,
        })
        .collect()
}
