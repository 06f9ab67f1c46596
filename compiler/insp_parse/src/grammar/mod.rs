//! Grammar productions, split by syntactic category.
//!
//! - `item`: module and `fn` items
//! - `stmt`: statements and local declarations
//! - `ty`: type expressions (with a speculative variant for lookahead)
//! - `expr`: precedence chain, postfix, primary, and the match constructs
//! - `pattern`: the pattern grammar, guards and arms

mod expr;
mod item;
mod pattern;
mod stmt;
mod ty;

use insp_ir::{ExprId, ExprKind, Name, Span};

use crate::lexer::TokenKind;
use crate::{ParseError, Parser};

impl Parser<'_> {
    #[inline]
    pub(crate) fn alloc_expr(&mut self, kind: ExprKind, span: Span) -> ExprId {
        self.module.exprs.alloc(kind, span)
    }

    #[inline]
    pub(crate) fn expr_span(&self, id: ExprId) -> Span {
        self.module.exprs.span(id)
    }

    pub(crate) fn expect_ident(&mut self) -> Result<(Name, Span), ParseError> {
        let token = *self.cursor.current();
        match token.kind {
            TokenKind::Ident(name) => {
                self.cursor.advance();
                Ok((name, token.span))
            }
            other => Err(ParseError::expected_identifier(&other, token.span)),
        }
    }

    pub(crate) fn expect_eof(&mut self) -> Result<(), ParseError> {
        if self.cursor.at_eof() {
            Ok(())
        } else {
            Err(ParseError::unexpected(
                &self.cursor.current_kind(),
                "end of input",
                self.cursor.current_span(),
            ))
        }
    }
}
