//! Prefix expression parsing (nud - null denotation)

use super::super::lexer::tokens::*;
use super::ast::*;
use super::state::*;
use crate::util::span::Span;

impl ParserState<'_> {
    /// Parse a prefix expression
    pub(crate) fn parse_prefix(&mut self) -> Option<Expr> {
        let token = self.current()?.clone();

        match token.kind {
            TokenKind::Int(v) => {
                self.bump();
                Some(Expr::Lit(Literal::Int(v), token.span))
            }
            TokenKind::Float(v) => {
                self.bump();
                Some(Expr::Lit(Literal::Float(v), token.span))
            }
            TokenKind::Str(s) => {
                self.bump();
                Some(Expr::Lit(Literal::Str(s), token.span))
            }
            TokenKind::KwTrue => {
                self.bump();
                Some(Expr::Lit(Literal::Bool(true), token.span))
            }
            TokenKind::KwFalse => {
                self.bump();
                Some(Expr::Lit(Literal::Bool(false), token.span))
            }
            TokenKind::KwNil => {
                self.bump();
                Some(Expr::Lit(Literal::Nil, token.span))
            }
            TokenKind::Ident(name) => {
                self.bump();
                Some(Expr::Var(name, token.span))
            }
            TokenKind::Minus => self.parse_unary(UnOp::Neg, token.span),
            TokenKind::Not => self.parse_unary(UnOp::Not, token.span),
            TokenKind::LParen => self.parse_paren(token.span),
            TokenKind::LBracket => self.parse_list(token.span),
            TokenKind::LBrace => self.parse_map(token.span),
            other => {
                self.error(super::ParseError::UnexpectedToken(other));
                None
            }
        }
    }

    fn parse_unary(&mut self, op: UnOp, start: Span) -> Option<Expr> {
        self.bump();
        let expr = self
            .parse_expression(BP_UNARY)
            .unwrap_or_else(|| Expr::Lit(Literal::Nil, self.prev_span()));
        let span = self.span_from(start);
        Some(Expr::Unary {
            op,
            expr: Box::new(expr),
            span,
        })
    }

    fn parse_paren(&mut self, start: Span) -> Option<Expr> {
        self.bump(); // consume '('

        let inner = self.parse_expression(BP_LOWEST)?;
        // Tolerated when missing, so a half-typed `(expr` keeps its shape
        self.expect(&TokenKind::RParen);

        let span = self.span_from(start);
        Some(Expr::Paren(Box::new(inner), span))
    }

    fn parse_list(&mut self, start: Span) -> Option<Expr> {
        self.bump(); // consume '['

        let mut elements = Vec::new();
        while !self.at(&TokenKind::RBracket) && !self.at_end() {
            match self.parse_expression(BP_LOWEST) {
                Some(e) => elements.push(e),
                None => break,
            }
            if !self.skip(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBracket);

        let span = self.span_from(start);
        Some(Expr::List(elements, span))
    }

    fn parse_map(&mut self, start: Span) -> Option<Expr> {
        self.bump(); // consume '{'

        let mut entries = Vec::new();
        while !self.at(&TokenKind::RBrace) && !self.at_end() {
            let key = match self.parse_expression(BP_LOWEST) {
                Some(e) => e,
                None => break,
            };
            self.expect(&TokenKind::Colon);
            let value = self
                .parse_expression(BP_LOWEST)
                .unwrap_or_else(|| Expr::Lit(Literal::Nil, self.prev_span()));
            entries.push((key, value));
            if !self.skip(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBrace);

        let span = self.span_from(start);
        Some(Expr::MapLit(entries, span))
    }
}
