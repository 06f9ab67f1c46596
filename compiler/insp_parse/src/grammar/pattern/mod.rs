//! Patterns, guards and arms.
//!
//! ```text
//! pattern ::= '_'
//!           | 'let' ident
//!           | 'let' '[' binding (',' binding)* ']'
//!           | '(' pattern ')'
//!           | '?'+ pattern
//!           | type ':' pattern
//!           | '[' pattern (',' pattern)* ']'
//!           | member_ptr_expr
//! binding ::= ident | '[' binding (',' binding)* ']'
//! guard   ::= '(' type ident '=' expr ')' | member_ptr_expr
//! arm     ::= pattern ('if' guard)? '=>' action ';'
//! action  ::= 'return' expr? | 'break' | 'continue' | expr
//! ```
//!
//! `(` opens a grouping pattern only when what follows is itself a
//! non-expression pattern. Otherwise the parenthesized text is an ordinary
//! expression, so `x match (1 + 2)` compares against `3` and a `Paren` node
//! never wraps an expression pattern.

use insp_ir::{Action, Guard, JumpKind, MatchArm, PatternId, PatternKind, Span};
use insp_stack::ensure_sufficient_stack;

use crate::lexer::TokenKind;
use crate::{ParseError, Parser};

/// Where a pattern appears, which decides how a bare `let name` is recorded.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Position {
    Standalone,
    /// Direct element of a decomposition.
    Element,
}

impl Parser<'_> {
    pub(crate) fn parse_pattern(&mut self) -> Result<PatternId, ParseError> {
        self.parse_pattern_at(Position::Standalone)
            .map_err(|e| e.in_context("a pattern"))
    }

    fn parse_pattern_at(&mut self, position: Position) -> Result<PatternId, ParseError> {
        ensure_sufficient_stack(|| self.parse_pattern_inner(position))
    }

    fn parse_pattern_inner(&mut self, position: Position) -> Result<PatternId, ParseError> {
        let start = self.cursor.current_span();
        match self.cursor.current_kind() {
            TokenKind::Underscore => {
                self.cursor.advance();
                Ok(self.module.patterns.alloc(PatternKind::Wildcard, start))
            }
            TokenKind::Let => {
                self.cursor.advance();
                if self.cursor.check(&TokenKind::LBracket) {
                    self.parse_binding_decomposition(start)
                } else {
                    let (name, name_span) = self.expect_ident()?;
                    Ok(self.module.patterns.alloc(
                        PatternKind::Binding {
                            name,
                            decomposed: position == Position::Element,
                        },
                        start.merge(name_span),
                    ))
                }
            }
            TokenKind::Question => {
                let mut depth = 0u32;
                while self.cursor.eat(&TokenKind::Question) {
                    depth += 1;
                }
                let sub = self.parse_pattern_at(Position::Standalone)?;
                let span = start.merge(self.module.patterns.get(sub).span);
                Ok(self
                    .module
                    .patterns
                    .alloc(PatternKind::Optional { sub, depth }, span))
            }
            TokenKind::LBracket => {
                self.cursor.advance();
                let mut elements = Vec::new();
                loop {
                    elements.push(self.parse_pattern_at(Position::Element)?);
                    if !self.cursor.eat(&TokenKind::Comma) {
                        break;
                    }
                }
                let close = self
                    .cursor
                    .expect_closing(&TokenKind::RBracket, "[", start)?;
                let binding_only = elements
                    .iter()
                    .all(|&e| self.is_binding_only(e));
                let elements = self.module.patterns.alloc_list(elements);
                Ok(self.module.patterns.alloc(
                    PatternKind::Decomposition {
                        elements,
                        binding_only,
                    },
                    start.merge(close),
                ))
            }
            TokenKind::LParen if self.at_grouping_paren() => {
                self.cursor.advance();
                let inner = self.parse_pattern_at(Position::Standalone)?;
                let close = self.cursor.expect_closing(&TokenKind::RParen, "(", start)?;
                debug_assert!(!matches!(
                    self.module.patterns.kind(inner),
                    PatternKind::Expression(_)
                ));
                Ok(self
                    .module
                    .patterns
                    .alloc(PatternKind::Paren(inner), start.merge(close)))
            }
            _ => {
                if let Some(discriminant) = self.try_parse_discriminant() {
                    let sub = self.parse_pattern_at(Position::Standalone)?;
                    let span = start.merge(self.module.patterns.get(sub).span);
                    return Ok(self
                        .module
                        .patterns
                        .alloc(PatternKind::Alternative { discriminant, sub }, span));
                }
                let expr = self.parse_member_ptr()?;
                let span = self.expr_span(expr);
                Ok(self
                    .module
                    .patterns
                    .alloc(PatternKind::Expression(expr), span))
            }
        }
    }

    /// `let [a, [b, c]]`: every leaf is a decomposed-element binding.
    fn parse_binding_decomposition(&mut self, start: Span) -> Result<PatternId, ParseError> {
        let open = self.cursor.expect(&TokenKind::LBracket)?.span;
        let mut elements = Vec::new();
        loop {
            let element = if self.cursor.check(&TokenKind::LBracket) {
                let nested_start = self.cursor.current_span();
                self.parse_binding_decomposition(nested_start)?
            } else {
                let (name, span) = self.expect_ident().map_err(|_| {
                    ParseError::invalid_pattern(
                        "`let [...]` may only contain names and nested `[...]`",
                        self.cursor.current_span(),
                    )
                })?;
                self.module.patterns.alloc(
                    PatternKind::Binding {
                        name,
                        decomposed: true,
                    },
                    span,
                )
            };
            elements.push(element);
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        let close = self
            .cursor
            .expect_closing(&TokenKind::RBracket, "[", open)?;
        let elements = self.module.patterns.alloc_list(elements);
        Ok(self.module.patterns.alloc(
            PatternKind::Decomposition {
                elements,
                binding_only: true,
            },
            start.merge(close),
        ))
    }

    fn is_binding_only(&self, pattern: PatternId) -> bool {
        match self.module.patterns.kind(pattern) {
            PatternKind::Binding { .. } => true,
            PatternKind::Decomposition { binding_only, .. } => *binding_only,
            _ => false,
        }
    }

    /// `type ':'` lookahead. Consumes both on success, nothing otherwise.
    fn try_parse_discriminant(&mut self) -> Option<insp_ir::ParsedType> {
        if !matches!(
            self.cursor.current_kind(),
            TokenKind::Ident(_) | TokenKind::Const
        ) {
            return None;
        }
        let checkpoint = self.cursor.position();
        if let Some(ty) = self.try_parse_type() {
            if self.cursor.eat(&TokenKind::Colon) {
                return Some(ty);
            }
        }
        self.cursor.reset(checkpoint);
        None
    }

    /// At `(`: does a non-expression pattern follow?
    fn at_grouping_paren(&mut self) -> bool {
        let checkpoint = self.cursor.position();
        self.cursor.advance();
        let grouping = match self.cursor.current_kind() {
            TokenKind::Underscore | TokenKind::Let | TokenKind::Question | TokenKind::LBracket => {
                true
            }
            TokenKind::LParen => self.at_grouping_paren(),
            _ => self.try_parse_discriminant().is_some(),
        };
        self.cursor.reset(checkpoint);
        grouping
    }

    /// `'(' type ident '=' expr ')'` or a member-pointer level expression.
    pub(crate) fn parse_guard(&mut self) -> Result<Guard, ParseError> {
        if self.cursor.check(&TokenKind::LParen) {
            let checkpoint = self.cursor.position();
            let open = self.cursor.advance().span;
            if self.at_guard_declaration() {
                let ty = self.parse_type()?;
                let (name, _) = self.expect_ident()?;
                self.cursor.expect(&TokenKind::Eq).map_err(|e| {
                    ParseError::invalid_guard(
                        format!("guard declaration needs an initializer: {}", e.message),
                        e.span,
                    )
                })?;
                let init = self.parse_expr()?;
                let close = self.cursor.expect_closing(&TokenKind::RParen, "(", open)?;
                return Ok(Guard::Decl {
                    ty,
                    name,
                    init,
                    span: open.merge(close),
                });
            }
            self.cursor.reset(checkpoint);
        }
        Ok(Guard::Expr(self.parse_member_ptr()?))
    }

    fn at_guard_declaration(&mut self) -> bool {
        let checkpoint = self.cursor.position();
        let is_decl = self.try_parse_type().is_some()
            && matches!(self.cursor.current_kind(), TokenKind::Ident(_))
            && self.cursor.peek_kind(1) == TokenKind::Eq;
        self.cursor.reset(checkpoint);
        is_decl
    }

    /// `'{' arm+ '}'`
    pub(crate) fn parse_arms(&mut self) -> Result<Vec<MatchArm>, ParseError> {
        let open = self.cursor.expect(&TokenKind::LBrace)?.span;
        let mut arms = Vec::new();
        while !self.cursor.check(&TokenKind::RBrace) {
            if self.cursor.at_eof() {
                return Err(ParseError::unclosed("{", open));
            }
            arms.push(self.parse_arm()?);
        }
        self.cursor.advance();
        if arms.is_empty() {
            return Err(ParseError::invalid_pattern(
                "a match with arms needs at least one arm",
                open,
            ));
        }
        Ok(arms)
    }

    fn parse_arm(&mut self) -> Result<MatchArm, ParseError> {
        let start = self.cursor.current_span();
        let pattern = self.parse_pattern()?;
        let guard = if self.cursor.eat(&TokenKind::If) {
            Some(self.parse_guard()?)
        } else {
            None
        };
        self.cursor
            .expect(&TokenKind::FatArrow)
            .map_err(|e| e.in_context("a match arm"))?;

        let action_start = self.cursor.current_span();
        let jump = match self.cursor.current_kind() {
            TokenKind::Return => Some(JumpKind::Return),
            TokenKind::Break => Some(JumpKind::Break),
            TokenKind::Continue => Some(JumpKind::Continue),
            _ => None,
        };
        let action = if let Some(kind) = jump {
            self.cursor.advance();
            let value = if kind == JumpKind::Return && !self.cursor.check(&TokenKind::Semicolon) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            Action::Jump {
                kind,
                value,
                span: action_start.merge(self.cursor.previous_span()),
            }
        } else {
            Action::Value(self.parse_expr()?)
        };
        self.cursor.expect(&TokenKind::Semicolon)?;
        Ok(MatchArm {
            pattern,
            guard,
            action,
            span: start.merge(self.cursor.previous_span()),
        })
    }
}
