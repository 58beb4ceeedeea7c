//! Kestrel scripting language
//!
//! A small dynamic scripting language built around an interactive
//! evaluator: an incremental session threads bindings, imports, and the
//! last result across submissions, and a completion engine recovers the
//! receiver expression under the cursor, evaluates it against an isolated
//! continuation of the session, and enumerates its members — including
//! extension functions matched through generic-constraint checking.
//!
//! # Example
//!
//! ```
//! use kestrel::repl::ReplSession;
//!
//! let mut session = ReplSession::new();
//! session.submit("nums = [3, 1, 2]");
//!
//! let outcome = session.submit("nums.length");
//! assert_eq!(outcome.result.as_deref(), Some("3"));
//!
//! let completion = session.complete("nums.le", 7);
//! assert_eq!(completion.insertion_suffix, "n");
//! ```

#![warn(rust_2018_idioms)]

pub mod frontend;
pub mod interp;
pub mod repl;
pub mod util;

// Re-exports
pub use anyhow::{Context, Result};

use tracing::debug;

/// Language version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Language name
pub const NAME: &str = "Kestrel";

use std::fs;
use std::path::Path;

/// Evaluate a source text in a throwaway session and return the rendered
/// result value, if the final statement produced one.
pub fn run(source: &str) -> Result<Option<String>> {
    debug!(bytes = source.len(), "evaluating source");
    let mut session = repl::ReplSession::new();
    let outcome = session.submit(source);
    match outcome.status {
        repl::ExecutionStatus::Ok => Ok(outcome.result),
        repl::ExecutionStatus::Error => Err(anyhow::anyhow!(outcome
            .result
            .unwrap_or_else(|| "unknown error".to_string()))),
    }
}

/// Run a Kestrel source file
pub fn run_file(path: &Path) -> Result<()> {
    debug!(path = %path.display(), "running file");
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    run(&source)?;
    Ok(())
}
