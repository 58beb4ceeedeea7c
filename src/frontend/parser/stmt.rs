//! Statement parsing

use super::super::lexer::tokens::*;
use super::ast::*;
use super::state::*;
use crate::util::span::Span;

impl ParserState<'_> {
    /// Parse a single statement
    pub(crate) fn parse_stmt(&mut self) -> Option<Stmt> {
        match self.current().map(|t| &t.kind) {
            Some(TokenKind::KwUse) => self.parse_use(),
            Some(TokenKind::KwFn) => self.parse_fn(),
            Some(TokenKind::KwIf) => self.parse_if(),
            Some(TokenKind::KwWhile) => self.parse_while(),
            Some(TokenKind::KwFor) => self.parse_for(),
            Some(TokenKind::KwReturn) => self.parse_return(),
            Some(TokenKind::KwBreak) => {
                let span = self.span();
                self.bump();
                Some(Stmt {
                    kind: StmtKind::Break,
                    span,
                })
            }
            Some(TokenKind::KwContinue) => {
                let span = self.span();
                self.bump();
                Some(Stmt {
                    kind: StmtKind::Continue,
                    span,
                })
            }
            _ => self.parse_expr_or_assign(),
        }
    }

    /// Parse `use path.to.module`
    fn parse_use(&mut self) -> Option<Stmt> {
        let start = self.span();
        self.bump(); // consume 'use'

        let mut segments = Vec::new();
        match self.current().map(|t| t.kind.clone()) {
            Some(TokenKind::Ident(name)) => {
                segments.push(name);
                self.bump();
            }
            other => {
                self.error(super::ParseError::Expected {
                    expected: "a module path".into(),
                    found: other.unwrap_or(TokenKind::Eof),
                });
                return None;
            }
        }
        while self.skip(&TokenKind::Dot) {
            match self.current().map(|t| t.kind.clone()) {
                Some(TokenKind::Ident(name)) => {
                    segments.push(name);
                    self.bump();
                }
                other => {
                    self.error(super::ParseError::Expected {
                        expected: "a module path segment".into(),
                        found: other.unwrap_or(TokenKind::Eof),
                    });
                    break;
                }
            }
        }

        Some(Stmt {
            kind: StmtKind::Use {
                path: segments.join("."),
            },
            span: self.span_from(start),
        })
    }

    /// Parse `fn name(params) { body }`
    fn parse_fn(&mut self) -> Option<Stmt> {
        let start = self.span();
        self.bump(); // consume 'fn'

        let name = match self.current().map(|t| t.kind.clone()) {
            Some(TokenKind::Ident(name)) => {
                self.bump();
                name
            }
            other => {
                self.error(super::ParseError::Expected {
                    expected: "a function name".into(),
                    found: other.unwrap_or(TokenKind::Eof),
                });
                return None;
            }
        };

        self.expect(&TokenKind::LParen);
        let mut params = Vec::new();
        while let Some(TokenKind::Ident(p)) = self.current().map(|t| t.kind.clone()) {
            params.push(p);
            self.bump();
            if !self.skip(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen);

        let body = self.parse_block();

        Some(Stmt {
            kind: StmtKind::FnDef { name, params, body },
            span: self.span_from(start),
        })
    }

    /// Parse `if cond { } else if ... { } else { }`
    fn parse_if(&mut self) -> Option<Stmt> {
        let start = self.span();
        self.bump(); // consume 'if'

        let cond = self
            .parse_expression(BP_LOWEST)
            .unwrap_or_else(|| Expr::Lit(Literal::Nil, self.prev_span()));
        let then_branch = self.parse_block();

        let else_branch = if self.skip(&TokenKind::KwElse) {
            if self.at(&TokenKind::KwIf) {
                // `else if` desugars to an else block holding one if statement
                let nested = self.parse_if()?;
                let span = nested.span;
                Some(Block {
                    stmts: vec![nested],
                    span,
                })
            } else {
                Some(self.parse_block())
            }
        } else {
            None
        };

        Some(Stmt {
            kind: StmtKind::If {
                cond: Box::new(cond),
                then_branch,
                else_branch,
            },
            span: self.span_from(start),
        })
    }

    /// Parse `while cond { body }`
    fn parse_while(&mut self) -> Option<Stmt> {
        let start = self.span();
        self.bump(); // consume 'while'

        let cond = self
            .parse_expression(BP_LOWEST)
            .unwrap_or_else(|| Expr::Lit(Literal::Nil, self.prev_span()));
        let body = self.parse_block();

        Some(Stmt {
            kind: StmtKind::While {
                cond: Box::new(cond),
                body,
            },
            span: self.span_from(start),
        })
    }

    /// Parse `for var in iterable { body }`
    fn parse_for(&mut self) -> Option<Stmt> {
        let start = self.span();
        self.bump(); // consume 'for'

        let var = match self.current().map(|t| t.kind.clone()) {
            Some(TokenKind::Ident(name)) => {
                self.bump();
                name
            }
            other => {
                self.error(super::ParseError::Expected {
                    expected: "a loop variable".into(),
                    found: other.unwrap_or(TokenKind::Eof),
                });
                return None;
            }
        };

        self.expect(&TokenKind::KwIn);
        let iterable = self
            .parse_expression(BP_LOWEST)
            .unwrap_or_else(|| Expr::Lit(Literal::Nil, self.prev_span()));
        let body = self.parse_block();

        Some(Stmt {
            kind: StmtKind::For {
                var,
                iterable: Box::new(iterable),
                body,
            },
            span: self.span_from(start),
        })
    }

    /// Parse `return [expr]`
    fn parse_return(&mut self) -> Option<Stmt> {
        let start = self.span();
        self.bump(); // consume 'return'

        let value = if self.can_start_expr() {
            self.parse_expression(BP_LOWEST).map(Box::new)
        } else {
            None
        };

        Some(Stmt {
            kind: StmtKind::Return(value),
            span: self.span_from(start),
        })
    }

    /// Parse an expression statement or an assignment
    fn parse_expr_or_assign(&mut self) -> Option<Stmt> {
        let start = self.span();
        let expr = self.parse_expression(BP_LOWEST)?;

        let op = match self.current().map(|t| &t.kind) {
            Some(TokenKind::Eq) => Some(AssignOp::Set),
            Some(TokenKind::PlusEq) => Some(AssignOp::Add),
            Some(TokenKind::MinusEq) => Some(AssignOp::Sub),
            Some(TokenKind::StarEq) => Some(AssignOp::Mul),
            Some(TokenKind::SlashEq) => Some(AssignOp::Div),
            _ => None,
        };

        let kind = match op {
            Some(op) => {
                self.bump();
                let value = self
                    .parse_expression(BP_LOWEST)
                    .unwrap_or_else(|| Expr::Lit(Literal::Nil, self.prev_span()));
                match Self::assign_target(expr) {
                    Ok(target) => StmtKind::Assign {
                        target,
                        op,
                        value: Box::new(value),
                    },
                    Err(()) => {
                        self.error(super::ParseError::InvalidAssignTarget);
                        // Keep the right-hand side so partial input stays inspectable
                        StmtKind::Expr(Box::new(value))
                    }
                }
            }
            None => StmtKind::Expr(Box::new(expr)),
        };

        Some(Stmt {
            kind,
            span: self.span_from(start),
        })
    }

    fn assign_target(expr: Expr) -> Result<AssignTarget, ()> {
        match expr {
            Expr::Var(name, span) => Ok(AssignTarget::Name(name, span)),
            Expr::Index { recv, index, span } => Ok(AssignTarget::Index { recv, index, span }),
            _ => Err(()),
        }
    }

    /// Parse a braced block, tolerating a missing opening brace
    pub(crate) fn parse_block(&mut self) -> Block {
        let start = self.span();
        if !self.expect(&TokenKind::LBrace) {
            return Block {
                stmts: Vec::new(),
                span: Span::new(start.start, start.start),
            };
        }

        let mut stmts = Vec::new();
        while !self.at(&TokenKind::RBrace) && !self.at_end() {
            if self.at(&TokenKind::Semicolon) {
                self.bump();
                continue;
            }
            if self.at(&TokenKind::KwUse) {
                self.error(super::ParseError::UseNotTopLevel);
            }
            if !self.can_start_stmt() {
                let found = self
                    .current()
                    .map(|t| t.kind.clone())
                    .unwrap_or(TokenKind::Eof);
                self.error(super::ParseError::UnexpectedToken(found));
                self.bump();
                continue;
            }
            let before = self.pos();
            match self.parse_stmt() {
                Some(stmt) => stmts.push(stmt),
                None => {
                    if self.pos() == before {
                        self.bump();
                    }
                    self.synchronize();
                }
            }
        }
        self.expect(&TokenKind::RBrace);

        Block {
            stmts,
            span: self.span_from(start),
        }
    }
}
