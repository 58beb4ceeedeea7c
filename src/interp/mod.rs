//! The host evaluation engine
//!
//! A small tree-walking interpreter with an incremental, cloneable
//! [`Environment`], plus the metadata [`catalog`] describing every builtin
//! type's members and the extension-capable free functions of the builtin
//! modules. The REPL session and the completion resolver are built on top
//! of these pieces.

pub mod catalog;
pub mod env;
pub mod eval;
pub mod types;
pub mod value;

pub use catalog::{Catalog, CATALOG};
pub use env::{Environment, DEFAULT_IMPORTS};
pub use eval::{EvalError, Interpreter, RuntimeFailure};
pub use types::Ty;
pub use value::Value;

#[cfg(test)]
mod tests;
