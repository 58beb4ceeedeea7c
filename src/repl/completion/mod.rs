//! Context-sensitive member completion

pub mod extract;
pub mod resolve;

pub use extract::{extract, CompletionExpression};
pub use resolve::{resolve, CompletionResult};

use crate::interp::env::Environment;

/// Full completion pipeline: extract the receiver at the cursor, then
/// resolve member candidates against the session state.
pub fn complete(env: &Environment, text: &str, cursor: usize) -> CompletionResult {
    let request = extract(text, cursor);
    resolve(env, &request)
}
