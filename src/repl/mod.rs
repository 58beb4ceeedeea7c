//! REPL Module
//!
//! Interactive evaluation for Kestrel.
//!
//! This module contains:
//! - [`session::ReplSession`] - The incremental evaluation session
//! - [`completion`] - Receiver extraction and member candidate resolution
//! - [`outcome`] - Execution result model and binding inspector
//! - [`line::LineRepl`] - Line-based shell with rustyline
//! - [`commands::CommandHandler`] - ':' command processor

pub mod commands;
pub mod completion;
pub mod line;
pub mod outcome;
pub mod session;

pub use commands::{CommandHandler, CommandResult};
pub use completion::{CompletionExpression, CompletionResult};
pub use line::{LineRepl, LineReplConfig};
pub use outcome::{Binding, ExecutionOutcome, ExecutionStatus};
pub use session::ReplSession;

#[cfg(test)]
mod tests;
