//! Pratt expression parsing loop

use super::ast::Expr;
use super::state::ParserState;

impl ParserState<'_> {
    /// Parse an expression with the given minimum binding power
    pub(crate) fn parse_expression(&mut self, min_bp: u8) -> Option<Expr> {
        let mut lhs = self.parse_prefix()?;

        while let Some((lbp, rbp, infix)) = self.infix_info() {
            if lbp < min_bp {
                break;
            }
            lhs = infix(self, lhs, rbp)?;
        }

        Some(lhs)
    }
}
