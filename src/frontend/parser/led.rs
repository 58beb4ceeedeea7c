//! Infix and postfix expression parsing (led - left denotation)

use super::super::lexer::tokens::*;
use super::ast::*;
use super::state::*;
use crate::util::span::Span;

impl ParserState<'_> {
    /// Get infix binding powers and parser for the current token
    #[inline]
    pub(crate) fn infix_info(&self) -> Option<(u8, u8, fn(&mut Self, Expr, u8) -> Option<Expr>)> {
        match self.current().map(|t| &t.kind) {
            // Range
            Some(TokenKind::DotDot) => Some((BP_RANGE, BP_RANGE + 1, Self::parse_binary)),
            // Logical OR
            Some(TokenKind::OrOr) => Some((BP_OR, BP_OR + 1, Self::parse_binary)),
            // Logical AND
            Some(TokenKind::AndAnd) => Some((BP_AND, BP_AND + 1, Self::parse_binary)),
            // Equality
            Some(TokenKind::EqEq | TokenKind::Neq) => Some((BP_EQ, BP_EQ + 1, Self::parse_binary)),
            // Comparison
            Some(TokenKind::Lt | TokenKind::Le | TokenKind::Gt | TokenKind::Ge) => {
                Some((BP_CMP, BP_CMP + 1, Self::parse_binary))
            }
            // Addition/Subtraction
            Some(TokenKind::Plus | TokenKind::Minus) => {
                Some((BP_ADD, BP_ADD + 1, Self::parse_binary))
            }
            // Multiplication/Division/Modulo
            Some(TokenKind::Star | TokenKind::Slash | TokenKind::Percent) => {
                Some((BP_MUL, BP_MUL + 1, Self::parse_binary))
            }
            // Function call
            Some(TokenKind::LParen) => Some((BP_CALL, BP_CALL + 1, Self::parse_call)),
            // Member access
            Some(TokenKind::Dot) => Some((BP_CALL, BP_CALL + 1, Self::parse_member)),
            // Indexing
            Some(TokenKind::LBracket) => Some((BP_CALL, BP_CALL + 1, Self::parse_index)),
            _ => None,
        }
    }

    /// Parse a binary operator expression
    fn parse_binary(&mut self, lhs: Expr, rbp: u8) -> Option<Expr> {
        let op = match self.current().map(|t| &t.kind) {
            Some(TokenKind::Plus) => BinOp::Add,
            Some(TokenKind::Minus) => BinOp::Sub,
            Some(TokenKind::Star) => BinOp::Mul,
            Some(TokenKind::Slash) => BinOp::Div,
            Some(TokenKind::Percent) => BinOp::Mod,
            Some(TokenKind::EqEq) => BinOp::Eq,
            Some(TokenKind::Neq) => BinOp::Neq,
            Some(TokenKind::Lt) => BinOp::Lt,
            Some(TokenKind::Le) => BinOp::Le,
            Some(TokenKind::Gt) => BinOp::Gt,
            Some(TokenKind::Ge) => BinOp::Ge,
            Some(TokenKind::AndAnd) => BinOp::And,
            Some(TokenKind::OrOr) => BinOp::Or,
            Some(TokenKind::DotDot) => BinOp::Range,
            _ => {
                self.error(super::ParseError::InvalidExpression);
                return None;
            }
        };
        self.bump();

        // A missing right operand is synthesized so the partial tree survives
        let rhs = self
            .parse_expression(rbp)
            .unwrap_or_else(|| Expr::Lit(Literal::Nil, self.prev_span()));

        let span = lhs.span().to(rhs.span());
        Some(Expr::Binary {
            op,
            left: Box::new(lhs),
            right: Box::new(rhs),
            span,
        })
    }

    /// Parse a function call
    fn parse_call(&mut self, lhs: Expr, _rbp: u8) -> Option<Expr> {
        self.bump(); // consume '('

        let mut args = Vec::new();
        while !self.at(&TokenKind::RParen) && !self.at_end() {
            match self.parse_expression(BP_LOWEST) {
                Some(e) => args.push(e),
                None => break,
            }
            if !self.skip(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen);

        let span = self.span_from(lhs.span());
        Some(Expr::Call {
            callee: Box::new(lhs),
            args,
            span,
        })
    }

    /// Parse a member access.
    ///
    /// When the member name is missing (the user stopped right after the
    /// dot), the node is produced with an empty name and its span ends at
    /// the dot, which is exactly what completion extraction matches on.
    fn parse_member(&mut self, lhs: Expr, _rbp: u8) -> Option<Expr> {
        let dot_span = self.span();
        self.bump(); // consume '.'

        let (name, end_span) = match self.current() {
            Some(Token {
                kind: TokenKind::Ident(n),
                span,
            }) => {
                let name = n.clone();
                let span = *span;
                self.bump();
                (name, span)
            }
            _ => {
                self.error(super::ParseError::ExpectedMemberName);
                (String::new(), dot_span)
            }
        };

        let span = Span::new(lhs.span().start, end_span.end);
        Some(Expr::Member {
            recv: Box::new(lhs),
            name,
            span,
        })
    }

    /// Parse an index expression
    fn parse_index(&mut self, lhs: Expr, _rbp: u8) -> Option<Expr> {
        self.bump(); // consume '['

        let index = self
            .parse_expression(BP_LOWEST)
            .unwrap_or_else(|| Expr::Lit(Literal::Nil, self.prev_span()));
        self.expect(&TokenKind::RBracket);

        let span = self.span_from(lhs.span());
        Some(Expr::Index {
            recv: Box::new(lhs),
            index: Box::new(index),
            span,
        })
    }
}
