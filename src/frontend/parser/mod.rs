//! Parser module
//!
//! A Pratt parser with error recovery. Parsing always produces a tree:
//! diagnostics are collected on the side instead of aborting, so callers
//! that work with incomplete input (the completion extractor) can inspect
//! whatever structure was recovered, while strict callers treat a non-empty
//! diagnostic list as failure.

pub mod ast;
mod expr;
mod led;
mod nud;
mod state;
mod stmt;

pub use state::{ParserState, BP_LOWEST};

use crate::frontend::lexer::tokens::*;
use crate::util::span::Span;
use ast::*;

/// Parse tokens into a module plus any diagnostics encountered.
///
/// The returned tree is always as complete as recovery allowed; an empty
/// diagnostic list means the input parsed cleanly.
pub fn parse(tokens: &[Token]) -> (Module, Vec<ParseError>) {
    let mut state = ParserState::new(tokens);
    let mut items = Vec::new();

    while !state.at_end() {
        if state.at(&TokenKind::Semicolon) {
            state.bump();
            continue;
        }
        if !state.can_start_stmt() {
            let found = state
                .current()
                .map(|t| t.kind.clone())
                .unwrap_or(TokenKind::Eof);
            state.error(ParseError::UnexpectedToken(found));
            state.bump();
            state.synchronize();
            continue;
        }

        let before = state.pos();
        match state.parse_stmt() {
            Some(stmt) => items.push(stmt),
            None => {
                if state.pos() == before {
                    state.bump();
                }
                state.synchronize();
            }
        }
    }

    let span = match (items.first(), items.last()) {
        (Some(first), Some(last)) => Span::new(first.span.start, last.span.end),
        _ => Span::dummy(),
    };

    (Module { items, span }, state.into_errors())
}

/// Parse a single complete expression.
///
/// Strict: any diagnostic or trailing input is an error. Used to evaluate
/// completion receivers, which must be well-formed on their own.
pub fn parse_expression(tokens: &[Token]) -> Result<Expr, ParseError> {
    let mut state = ParserState::new(tokens);
    let expr = state.parse_expression(BP_LOWEST);

    match expr {
        Some(e) if !state.has_errors() && state.at_end() => Ok(e),
        _ => Err(state
            .first_error()
            .cloned()
            .unwrap_or(ParseError::InvalidExpression)),
    }
}

/// Parse error types
#[derive(Debug, thiserror::Error, Clone)]
pub enum ParseError {
    #[error("unexpected {0}")]
    UnexpectedToken(TokenKind),

    #[error("expected {expected}, found {found}")]
    Expected { expected: String, found: TokenKind },

    #[error("expected a member name after `.`")]
    ExpectedMemberName,

    #[error("invalid assignment target")]
    InvalidAssignTarget,

    #[error("`use` is only allowed at the top level")]
    UseNotTopLevel,

    #[error("invalid expression")]
    InvalidExpression,
}

#[cfg(test)]
mod tests;
