//! Member candidate resolution
//!
//! Evaluates the extracted receiver against a disposable continuation of
//! the session, then enumerates applicable extensions, instance methods,
//! and properties of the receiver's runtime type.

use std::collections::BTreeMap;

use tracing::trace;

use super::extract::CompletionExpression;
use crate::frontend::lexer::tokenize;
use crate::frontend::parser::parse_expression;
use crate::interp::catalog::CATALOG;
use crate::interp::env::Environment;
use crate::interp::eval::Interpreter;
use crate::interp::value::Value;
use crate::util::strings::longest_common_prefix;

/// Completion candidates ready for display
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionResult {
    /// One display line per matched member name — or the full overload
    /// signature list when exactly one name matched
    pub lines: Vec<String>,
    /// Text to insert at the cursor: the common prefix of all matched
    /// member names, minus what the user already typed
    pub insertion_suffix: String,
}

impl CompletionResult {
    /// The empty result: nothing to display, nothing to insert
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.insertion_suffix.is_empty()
    }
}

/// Resolve completion candidates for an extracted receiver and prefix.
///
/// Failures of any kind — unparseable receiver, evaluation error, absent
/// value — collapse silently to the empty result: mid-keystroke input is
/// invalid more often than not, and completion must never surface that.
pub fn resolve(env: &Environment, request: &CompletionExpression) -> CompletionResult {
    if request.expression.is_empty() {
        return CompletionResult::empty();
    }

    let Ok(tokens) = tokenize(&request.expression) else {
        return CompletionResult::empty();
    };
    let Ok(expr) = parse_expression(&tokens) else {
        return CompletionResult::empty();
    };

    // Disposable continuation: the receiver runs against a clone of the
    // session state, which is discarded once the value is inspected.
    let mut scratch = env.clone();
    let value = match Interpreter::new(&mut scratch).eval_expression(&expr) {
        Ok(value) => value,
        Err(failure) => {
            trace!(error = %failure.error, "receiver evaluation failed");
            return CompletionResult::empty();
        }
    };
    if value == Value::Nil {
        return CompletionResult::empty();
    }

    let ty = value.ty();
    let prefix = request.prefix.as_str();

    let mut options: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for (def, subst) in CATALOG.extensions_for(env.imports(), &ty) {
        add_option(&mut options, prefix, def.name, def.extension_signature(&subst));
    }
    for method in CATALOG.methods_of(&ty) {
        add_option(&mut options, prefix, method.name, method.signature());
    }
    for property in CATALOG.properties_of(&ty) {
        add_option(&mut options, prefix, property.name, property.signature());
    }

    let mut lines = Vec::new();
    if options.len() == 1 {
        if let Some(signatures) = options.values().next() {
            lines = signatures.clone();
            lines.sort();
        }
    } else {
        for (name, signatures) in &options {
            let mut signatures = signatures.clone();
            signatures.sort();
            lines.push(format_group(name, &signatures));
        }
    }

    let names: Vec<&String> = options.keys().collect();
    let lcp = longest_common_prefix(&names);
    let insertion_suffix = lcp.strip_prefix(prefix).unwrap_or("").to_string();

    trace!(
        candidates = options.len(),
        suffix = %insertion_suffix,
        "completion resolved"
    );

    CompletionResult {
        lines,
        insertion_suffix,
    }
}

fn add_option(
    options: &mut BTreeMap<String, Vec<String>>,
    prefix: &str,
    name: &str,
    signature: String,
) {
    if name.starts_with(prefix) {
        options.entry(name.to_string()).or_default().push(signature);
    }
}

fn format_group(name: &str, signatures: &[String]) -> String {
    let first = signatures.first().map(String::as_str).unwrap_or("");
    match signatures.len() {
        0 | 1 => format!("{} -- {}", name, first),
        2 => format!("{} -- {} (+1 overload)", name, first),
        n => format!("{} -- {} (+{} overloads)", name, first, n - 1),
    }
}
