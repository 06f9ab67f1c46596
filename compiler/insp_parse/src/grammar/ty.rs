//! Type expressions.
//!
//! ```text
//! type ::= 'const'? (ident | 'auto') ('*' | 'const' | '[' int ']')*
//! ```

use insp_ir::ParsedType;

use crate::lexer::TokenKind;
use crate::{ParseError, Parser};

impl Parser<'_> {
    pub(crate) fn parse_type(&mut self) -> Result<ParsedType, ParseError> {
        let leading_const = self.cursor.eat(&TokenKind::Const);
        let token = *self.cursor.current();
        let mut ty = match token.kind {
            TokenKind::Ident(name) => ParsedType::Named(name),
            TokenKind::Auto => ParsedType::Auto,
            other => return Err(ParseError::expected_type(&other, token.span)),
        };
        self.cursor.advance();
        if leading_const {
            ty = ParsedType::Const(Box::new(ty));
        }

        loop {
            match self.cursor.current_kind() {
                TokenKind::Star => {
                    self.cursor.advance();
                    ty = ParsedType::Pointer(Box::new(ty));
                }
                TokenKind::Const => {
                    self.cursor.advance();
                    ty = ParsedType::Const(Box::new(ty));
                }
                TokenKind::LBracket => {
                    let open = self.cursor.advance().span;
                    let extent = match self.cursor.current_kind() {
                        TokenKind::Int(n) => u64::try_from(n).map_err(|_| {
                            ParseError::expected_type(&TokenKind::Int(n), self.cursor.current_span())
                        })?,
                        other => {
                            return Err(ParseError::unexpected(
                                &other,
                                "array extent",
                                self.cursor.current_span(),
                            ))
                        }
                    };
                    self.cursor.advance();
                    self.cursor
                        .expect_closing(&TokenKind::RBracket, "[", open)?;
                    ty = ParsedType::Array(Box::new(ty), extent);
                }
                _ => return Ok(ty),
            }
        }
    }

    /// Parse a type without committing: on failure the cursor is restored and
    /// `None` is returned.
    pub(crate) fn try_parse_type(&mut self) -> Option<ParsedType> {
        let checkpoint = self.cursor.position();
        match self.parse_type() {
            Ok(ty) => Some(ty),
            Err(_) => {
                self.cursor.reset(checkpoint);
                None
            }
        }
    }

    /// Is the cursor at `type ident` followed by `=` or `;`?
    ///
    /// Used to tell local declarations (`int x = 1;`, `bool ok = ...`) from
    /// expression statements. The cursor is left where it was.
    pub(crate) fn at_declaration(&mut self) -> bool {
        if matches!(
            self.cursor.current_kind(),
            TokenKind::Const | TokenKind::Auto
        ) {
            return true;
        }
        let checkpoint = self.cursor.position();
        let is_decl = self.try_parse_type().is_some()
            && matches!(self.cursor.current_kind(), TokenKind::Ident(_))
            && matches!(
                self.cursor.peek_kind(1),
                TokenKind::Eq | TokenKind::Semicolon
            );
        self.cursor.reset(checkpoint);
        is_decl
    }
}
