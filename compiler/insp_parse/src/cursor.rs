//! Token cursor with lookahead and checkpoints.

use insp_ir::Span;

use crate::lexer::{Token, TokenKind};
use crate::ParseError;

/// Cursor over a token list that always ends in `Eof`.
pub(crate) struct Cursor {
    tokens: Vec<Token>,
    pos: usize,
}

impl Cursor {
    pub(crate) fn new(tokens: Vec<Token>) -> Self {
        debug_assert!(
            matches!(tokens.last(), Some(t) if t.kind == TokenKind::Eof),
            "token list must end with Eof"
        );
        Cursor { tokens, pos: 0 }
    }

    /// Current position, for speculative parsing.
    #[inline]
    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    /// Roll back to a position returned by [`position`](Self::position).
    #[inline]
    pub(crate) fn reset(&mut self, pos: usize) {
        debug_assert!(pos < self.tokens.len(), "cursor position {pos} out of bounds");
        self.pos = pos;
    }

    #[inline]
    pub(crate) fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    #[inline]
    pub(crate) fn current_kind(&self) -> TokenKind {
        self.tokens[self.pos].kind
    }

    #[inline]
    pub(crate) fn current_span(&self) -> Span {
        self.tokens[self.pos].span
    }

    /// Kind of the token `n` positions ahead (clamped to `Eof`).
    pub(crate) fn peek_kind(&self, n: usize) -> TokenKind {
        let idx = (self.pos + n).min(self.tokens.len() - 1);
        self.tokens[idx].kind
    }

    #[inline]
    pub(crate) fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            Span::DUMMY
        }
    }

    #[inline]
    pub(crate) fn at_eof(&self) -> bool {
        self.current_kind() == TokenKind::Eof
    }

    /// Check the current token kind, ignoring payloads.
    #[inline]
    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current_kind()) == std::mem::discriminant(kind)
    }

    /// Advance past the current token, returning it. Never moves past `Eof`.
    pub(crate) fn advance(&mut self) -> Token {
        let token = *self.current();
        if !self.at_eof() {
            self.pos += 1;
        }
        token
    }

    /// Consume the current token if it matches.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume a token of the given kind or fail.
    pub(crate) fn expect(&mut self, kind: &TokenKind) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(ParseError::unexpected(
                &self.current_kind(),
                kind.display_name(),
                self.current_span(),
            ))
        }
    }

    /// Consume a closing delimiter, reporting the opener when missing.
    pub(crate) fn expect_closing(
        &mut self,
        kind: &TokenKind,
        open: &'static str,
        open_span: Span,
    ) -> Result<Span, ParseError> {
        if self.check(kind) {
            Ok(self.advance().span)
        } else if self.at_eof() {
            Err(ParseError::unclosed(open, open_span))
        } else {
            Err(ParseError::unexpected(
                &self.current_kind(),
                kind.display_name(),
                self.current_span(),
            ))
        }
    }
}
