//! Expression extraction from partial input
//!
//! Recovers the receiver expression and the partially typed member name
//! from raw, usually invalid input: the text is wrapped in a synthetic
//! function body so it parses in a statement context, parsed tolerantly,
//! and the tree is searched for a member-access node ending exactly at the
//! cursor.

use crate::frontend::lexer::tokenize;
use crate::frontend::parser::ast::*;
use crate::frontend::parser::parse;
use crate::util::span::Span;

/// Scaffold wrapped around the raw input. Offsets of the original text all
/// shift by the prefix length and nothing else.
const SCAFFOLD_PREFIX: &str = "fn __complete__() { ";
const SCAFFOLD_SUFFIX: &str = " }";

/// Receiver expression and member prefix recovered from partial input.
/// Both are empty when nothing was recovered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionExpression {
    pub expression: String,
    pub prefix: String,
}

/// Extract the receiver expression immediately preceding a cursor-adjacent
/// member access, plus whatever part of the member name is already typed.
///
/// No member access ending exactly at the cursor means no completion: a
/// bare literal, a cursor in the middle of other text, or input too
/// malformed to recover all yield the empty result.
pub fn extract(text: &str, cursor: usize) -> CompletionExpression {
    let cursor = cursor.min(text.len());
    if !text.is_char_boundary(cursor) {
        return CompletionExpression::default();
    }
    let typed = &text[..cursor];

    let scaffolded = format!("{}{}{}", SCAFFOLD_PREFIX, typed, SCAFFOLD_SUFFIX);
    let end_idx = SCAFFOLD_PREFIX.len() + typed.len();

    let Ok(tokens) = tokenize(&scaffolded) else {
        return CompletionExpression::default();
    };
    let (module, _) = parse(&tokens);

    let mut found: Option<(Span, String)> = None;
    for stmt in &module.items {
        find_in_stmt(stmt, end_idx, &mut found);
    }

    match found {
        Some((recv_span, prefix)) => CompletionExpression {
            expression: recv_span.text(&scaffolded).to_string(),
            prefix,
        },
        None => CompletionExpression::default(),
    }
}

fn find_in_stmt(stmt: &Stmt, end: usize, found: &mut Option<(Span, String)>) {
    if found.is_some() {
        return;
    }
    match &stmt.kind {
        StmtKind::Expr(e) => find_in_expr(e, end, found),
        StmtKind::Assign { target, value, .. } => {
            if let AssignTarget::Index { recv, index, .. } = target {
                find_in_expr(recv, end, found);
                find_in_expr(index, end, found);
            }
            find_in_expr(value, end, found);
        }
        StmtKind::Use { .. } | StmtKind::Break | StmtKind::Continue => {}
        StmtKind::FnDef { body, .. } => find_in_block(body, end, found),
        StmtKind::If {
            cond,
            then_branch,
            else_branch,
        } => {
            find_in_expr(cond, end, found);
            find_in_block(then_branch, end, found);
            if let Some(else_branch) = else_branch {
                find_in_block(else_branch, end, found);
            }
        }
        StmtKind::While { cond, body } => {
            find_in_expr(cond, end, found);
            find_in_block(body, end, found);
        }
        StmtKind::For {
            iterable, body, ..
        } => {
            find_in_expr(iterable, end, found);
            find_in_block(body, end, found);
        }
        StmtKind::Return(value) => {
            if let Some(value) = value {
                find_in_expr(value, end, found);
            }
        }
    }
}

fn find_in_block(block: &Block, end: usize, found: &mut Option<(Span, String)>) {
    for stmt in &block.stmts {
        find_in_stmt(stmt, end, found);
    }
}

fn find_in_expr(expr: &Expr, end: usize, found: &mut Option<(Span, String)>) {
    if found.is_some() {
        return;
    }

    // The node itself is checked before its children, so the outermost
    // member access ending at the cursor wins (`a.b.c` completes on `a.b`).
    if let Expr::Member { recv, name, span } = expr {
        if span.end.offset == end {
            *found = Some((recv.span(), name.clone()));
            return;
        }
    }

    match expr {
        Expr::Lit(..) | Expr::Var(..) => {}
        Expr::Paren(inner, _) => find_in_expr(inner, end, found),
        Expr::Binary { left, right, .. } => {
            find_in_expr(left, end, found);
            find_in_expr(right, end, found);
        }
        Expr::Unary { expr, .. } => find_in_expr(expr, end, found),
        Expr::Call { callee, args, .. } => {
            find_in_expr(callee, end, found);
            for arg in args {
                find_in_expr(arg, end, found);
            }
        }
        Expr::Member { recv, .. } => find_in_expr(recv, end, found),
        Expr::Index { recv, index, .. } => {
            find_in_expr(recv, end, found);
            find_in_expr(index, end, found);
        }
        Expr::List(items, _) => {
            for item in items {
                find_in_expr(item, end, found);
            }
        }
        Expr::MapLit(entries, _) => {
            for (key, value) in entries {
                find_in_expr(key, end, found);
                find_in_expr(value, end, found);
            }
        }
    }
}
