//! Module and function items.
//!
//! ```text
//! module   ::= function*
//! function ::= 'fn' ident '(' (type ident (',' type ident)*)? ')' ('->' type)? block
//! ```

use insp_ir::{Function, Param, ParsedType};

use crate::lexer::TokenKind;
use crate::{ParseError, Parser};

impl Parser<'_> {
    pub(crate) fn parse_module(&mut self) -> Result<(), ParseError> {
        while !self.cursor.at_eof() {
            let function = self.parse_function()?;
            self.module.functions.push(function);
        }
        Ok(())
    }

    fn parse_function(&mut self) -> Result<Function, ParseError> {
        let start = self.cursor.expect(&TokenKind::Fn)?.span;
        let (name, _) = self
            .expect_ident()
            .map_err(|e| e.in_context("a function definition"))?;

        let open = self.cursor.expect(&TokenKind::LParen)?.span;
        let mut params = Vec::new();
        if !self.cursor.check(&TokenKind::RParen) {
            loop {
                let param_start = self.cursor.current_span();
                let ty = self
                    .parse_type()
                    .map_err(|e| e.in_context("function parameters"))?;
                let (param_name, name_span) = self.expect_ident()?;
                params.push(Param {
                    ty,
                    name: param_name,
                    span: param_start.merge(name_span),
                });
                if !self.cursor.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.cursor.expect_closing(&TokenKind::RParen, "(", open)?;

        let ret = if self.cursor.eat(&TokenKind::Arrow) {
            self.parse_type()?
        } else {
            ParsedType::Named(self.interner.intern("void"))
        };

        if !self.cursor.check(&TokenKind::LBrace) {
            return Err(ParseError::new(
                insp_diagnostic::ErrorCode::E1006,
                "function body must be a block",
                self.cursor.current_span(),
            ));
        }
        let body = self.parse_stmt()?;
        let span = start.merge(self.cursor.previous_span());
        tracing::trace!(?name, params = params.len(), "parsed function");
        Ok(Function {
            name,
            params,
            ret,
            body,
            span,
        })
    }
}
