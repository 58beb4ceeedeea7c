//! Parser state and token stream management

use super::super::lexer::tokens::*;
use crate::util::span::Span;

/// Synchronization points for error recovery
const SYNC_POINTS: &[TokenKind] = &[
    TokenKind::Semicolon,
    TokenKind::KwUse,
    TokenKind::KwFn,
    TokenKind::KwIf,
    TokenKind::KwWhile,
    TokenKind::KwFor,
    TokenKind::KwReturn,
    TokenKind::KwBreak,
    TokenKind::KwContinue,
    TokenKind::RBrace,
    TokenKind::Eof,
];

/// Binding power levels for Pratt parser
pub const BP_LOWEST: u8 = 0;
pub const BP_RANGE: u8 = 15;
pub const BP_OR: u8 = 20;
pub const BP_AND: u8 = 30;
pub const BP_EQ: u8 = 40;
pub const BP_CMP: u8 = 50;
pub const BP_ADD: u8 = 60;
pub const BP_MUL: u8 = 70;
pub const BP_UNARY: u8 = 80;
pub const BP_CALL: u8 = 90;

/// Parser state for tracking position and errors
#[derive(Debug)]
pub struct ParserState<'a> {
    /// Token stream
    tokens: &'a [Token],
    /// Current position in token stream
    pos: usize,
    /// Parsing errors
    errors: Vec<super::ParseError>,
    /// Span of the last consumed token
    prev_span: Span,
}

impl<'a> ParserState<'a> {
    /// Create a new parser state
    #[inline]
    pub fn new(tokens: &'a [Token]) -> Self {
        let span = tokens.first().map(|t| t.span).unwrap_or_else(Span::dummy);

        Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
            prev_span: span,
        }
    }

    /// Check if at end of token stream
    #[inline]
    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len() || matches!(self.tokens[self.pos].kind, TokenKind::Eof)
    }

    /// Get current token
    #[inline]
    pub fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    /// Check the current token kind
    #[inline]
    pub fn at(&self, kind: &TokenKind) -> bool {
        matches!(self.current(), Some(t) if &t.kind == kind)
    }

    /// Span of the current token
    #[inline]
    pub fn span(&self) -> Span {
        self.current().map(|t| t.span).unwrap_or(self.prev_span)
    }

    /// Span of the last consumed token
    #[inline]
    pub fn prev_span(&self) -> Span {
        self.prev_span
    }

    /// Current stream position (used by callers to guarantee progress)
    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Advance to next token
    #[inline]
    pub fn bump(&mut self) {
        if let Some(token) = self.current() {
            self.prev_span = token.span;
        }
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    /// Skip a specific token if present
    #[inline]
    pub fn skip(&mut self, kind: &TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Expect a specific token; records an error and leaves the stream in
    /// place when it is missing.
    #[inline]
    pub fn expect(&mut self, kind: &TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            return true;
        }
        let found = self
            .current()
            .map(|t| t.kind.clone())
            .unwrap_or(TokenKind::Eof);
        self.error(super::ParseError::Expected {
            expected: kind.to_string(),
            found,
        });
        false
    }

    /// Span from `start` to the last consumed token
    #[inline]
    pub fn span_from(&self, start: Span) -> Span {
        Span::new(start.start, self.prev_span.end)
    }

    /// Record a parse error
    #[inline]
    pub fn error(&mut self, error: super::ParseError) {
        self.errors.push(error);
    }

    /// Check if there are errors
    #[inline]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Get all errors
    #[inline]
    pub fn into_errors(self) -> Vec<super::ParseError> {
        self.errors
    }

    /// Get first error
    #[inline]
    pub fn first_error(&self) -> Option<&super::ParseError> {
        self.errors.first()
    }

    /// Skip forward to the next point where a statement could resume
    pub fn synchronize(&mut self) {
        while !self.at_end() {
            if let Some(token) = self.current() {
                if SYNC_POINTS.iter().any(|sp| sp == &token.kind) {
                    break;
                }
            }
            if self.can_start_stmt() {
                return;
            }
            self.bump();
        }
        // A separator is consumed so parsing resumes on the next statement
        self.skip(&TokenKind::Semicolon);
    }

    /// Check if current token can start a statement
    #[inline]
    pub fn can_start_stmt(&self) -> bool {
        self.can_start_expr()
            || matches!(
                self.current().map(|t| &t.kind),
                Some(
                    TokenKind::KwUse
                        | TokenKind::KwFn
                        | TokenKind::KwIf
                        | TokenKind::KwWhile
                        | TokenKind::KwFor
                        | TokenKind::KwReturn
                        | TokenKind::KwBreak
                        | TokenKind::KwContinue
                )
            )
    }

    /// Check if current token can start an expression
    #[inline]
    pub fn can_start_expr(&self) -> bool {
        matches!(
            self.current().map(|t| &t.kind),
            Some(
                TokenKind::Int(_)
                    | TokenKind::Float(_)
                    | TokenKind::Str(_)
                    | TokenKind::Ident(_)
                    | TokenKind::KwTrue
                    | TokenKind::KwFalse
                    | TokenKind::KwNil
                    | TokenKind::Minus
                    | TokenKind::Not
                    | TokenKind::LParen
                    | TokenKind::LBracket
                    | TokenKind::LBrace
            )
        )
    }
}
