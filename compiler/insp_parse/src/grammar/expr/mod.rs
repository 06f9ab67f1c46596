//! Expression parsing.
//!
//! Precedence, loosest first:
//!
//! ```text
//! assign      ::= or ('=' assign)?
//! or          ::= and ('||' and)*
//! and         ::= equality ('&&' equality)*
//! equality    ::= comparison (('==' | '!=') comparison)*
//! comparison  ::= additive (('<' | '<=' | '>' | '>=') additive)*
//! additive    ::= multiplicative (('+' | '-') multiplicative)*
//! multiplicative ::= match_expr (('*' | '/' | '%') match_expr)*
//! match_expr  ::= member_ptr ('match' match_tail)*
//! member_ptr  ::= unary (('.*' | '->*') unary)*
//! unary       ::= ('-' | '!' | '*' | '&') unary | postfix
//! postfix     ::= primary ('(' args ')' | '[' expr ']' | '.' ident | '->' ident)*
//! ```

use insp_ir::{BinaryOp, ExprId, ExprKind, MatchExpr, MatchForm, MatchSelect, UnaryOp};
use insp_stack::ensure_sufficient_stack;

use crate::lexer::TokenKind;
use crate::{ParseError, Parser};

impl Parser<'_> {
    /// Parse a full expression.
    pub(crate) fn parse_expr(&mut self) -> Result<ExprId, ParseError> {
        ensure_sufficient_stack(|| self.parse_assign())
    }

    fn parse_assign(&mut self) -> Result<ExprId, ParseError> {
        let target = self.parse_binary_or()?;
        if self.cursor.eat(&TokenKind::Eq) {
            let value = self.parse_expr()?;
            let span = self.expr_span(target).merge(self.expr_span(value));
            return Ok(self.alloc_expr(ExprKind::Assign { target, value }, span));
        }
        Ok(target)
    }

    fn binary(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> ExprId {
        let span = self.expr_span(left).merge(self.expr_span(right));
        self.alloc_expr(ExprKind::Binary { op, left, right }, span)
    }

    fn parse_binary_or(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_binary_and()?;
        while self.cursor.eat(&TokenKind::PipePipe) {
            let right = self.parse_binary_and()?;
            left = self.binary(BinaryOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_binary_and(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_equality()?;
        while self.cursor.eat(&TokenKind::AmpAmp) {
            let right = self.parse_equality()?;
            left = self.binary(BinaryOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = match self.cursor.current_kind() {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::NotEq => BinaryOp::NotEq,
                _ => return Ok(left),
            };
            self.cursor.advance();
            let right = self.parse_comparison()?;
            left = self.binary(op, left, right);
        }
    }

    fn parse_comparison(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.cursor.current_kind() {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::LtEq => BinaryOp::LtEq,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::GtEq => BinaryOp::GtEq,
                _ => return Ok(left),
            };
            self.cursor.advance();
            let right = self.parse_additive()?;
            left = self.binary(op, left, right);
        }
    }

    fn parse_additive(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.cursor.current_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => return Ok(left),
            };
            self.cursor.advance();
            let right = self.parse_multiplicative()?;
            left = self.binary(op, left, right);
        }
    }

    fn parse_multiplicative(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_match_expr()?;
        loop {
            let op = match self.cursor.current_kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => return Ok(left),
            };
            self.cursor.advance();
            let right = self.parse_match_expr()?;
            left = self.binary(op, left, right);
        }
    }

    /// `subject match ...`. The subject is a member-pointer level expression,
    /// so `a.*pm match p` matches on `a.*pm` and `-x match p` on `-x`.
    fn parse_match_expr(&mut self) -> Result<ExprId, ParseError> {
        let mut subject = self.parse_member_ptr()?;
        while self.cursor.check(&TokenKind::Match) {
            self.cursor.advance();
            let form = self
                .parse_match_tail()
                .map_err(|e| e.in_context("a match expression"))?;
            let span = self.expr_span(subject).merge(self.cursor.previous_span());
            let id = self.module.patterns.alloc_match(MatchExpr {
                subject,
                form,
                span,
            });
            subject = self.alloc_expr(ExprKind::Match(id), span);
        }
        Ok(subject)
    }

    fn parse_match_tail(&mut self) -> Result<MatchForm, ParseError> {
        let is_constexpr = self.cursor.eat(&TokenKind::Constexpr);
        let result = if self.cursor.eat(&TokenKind::Arrow) {
            Some(self.parse_type()?)
        } else {
            None
        };

        if self.cursor.check(&TokenKind::LBrace) {
            let arms = self.parse_arms()?;
            return Ok(MatchForm::Select(MatchSelect {
                is_constexpr,
                result,
                arms,
            }));
        }
        if is_constexpr || result.is_some() {
            return Err(ParseError::unexpected(
                &self.cursor.current_kind(),
                "`{` to open the match arms",
                self.cursor.current_span(),
            ));
        }

        let pattern = self.parse_pattern()?;
        let guard = if self.cursor.eat(&TokenKind::If) {
            Some(self.parse_guard()?)
        } else {
            None
        };
        Ok(MatchForm::Test { pattern, guard })
    }

    /// Operand level of a pattern's expression and of a guard: no binary
    /// operators, so `x match 1 + 2` is `(x match 1) + 2`.
    pub(crate) fn parse_member_ptr(&mut self) -> Result<ExprId, ParseError> {
        let mut base = self.parse_unary()?;
        loop {
            let arrow = match self.cursor.current_kind() {
                TokenKind::DotStar => false,
                TokenKind::ArrowStar => true,
                _ => return Ok(base),
            };
            self.cursor.advance();
            let member = self.parse_unary()?;
            let span = self.expr_span(base).merge(self.expr_span(member));
            base = self.alloc_expr(
                ExprKind::MemberPtr {
                    base,
                    member,
                    arrow,
                },
                span,
            );
        }
    }

    fn parse_unary(&mut self) -> Result<ExprId, ParseError> {
        ensure_sufficient_stack(|| {
            let op = match self.cursor.current_kind() {
                TokenKind::Minus => UnaryOp::Neg,
                TokenKind::Bang => UnaryOp::Not,
                TokenKind::Star => UnaryOp::Deref,
                TokenKind::Amp => UnaryOp::AddrOf,
                _ => return self.parse_postfix(),
            };
            let start = self.cursor.advance().span;
            let operand = self.parse_unary()?;
            let span = start.merge(self.expr_span(operand));
            Ok(self.alloc_expr(ExprKind::Unary { op, operand }, span))
        })
    }

    fn parse_postfix(&mut self) -> Result<ExprId, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.cursor.current_kind() {
                TokenKind::LParen => {
                    let open = self.cursor.advance().span;
                    let args = self.parse_expr_list(&TokenKind::RParen, "(", open)?;
                    let span = self.expr_span(expr).merge(self.cursor.previous_span());
                    expr = self.alloc_expr(ExprKind::Call { callee: expr, args }, span);
                }
                TokenKind::LBracket => {
                    let open = self.cursor.advance().span;
                    let index = self.parse_expr()?;
                    let close = self
                        .cursor
                        .expect_closing(&TokenKind::RBracket, "[", open)?;
                    let span = self.expr_span(expr).merge(close);
                    expr = self.alloc_expr(ExprKind::Index { base: expr, index }, span);
                }
                TokenKind::Dot | TokenKind::Arrow => {
                    let arrow = self.cursor.advance().kind == TokenKind::Arrow;
                    let (field, field_span) = self.expect_ident()?;
                    let span = self.expr_span(expr).merge(field_span);
                    expr = self.alloc_expr(
                        ExprKind::Field {
                            base: expr,
                            field,
                            arrow,
                        },
                        span,
                    );
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_primary(&mut self) -> Result<ExprId, ParseError> {
        let token = *self.cursor.current();
        let kind = match token.kind {
            TokenKind::Int(value) => ExprKind::Int(value),
            TokenKind::Float(bits) => ExprKind::Float(bits),
            TokenKind::Char(c) => ExprKind::Char(c),
            TokenKind::True => ExprKind::Bool(true),
            TokenKind::False => ExprKind::Bool(false),
            TokenKind::NullPtr => ExprKind::NullPtr,
            TokenKind::Ident(name) => ExprKind::Ident(name),
            TokenKind::LParen => {
                self.cursor.advance();
                let inner = self.parse_expr()?;
                let close = self
                    .cursor
                    .expect_closing(&TokenKind::RParen, "(", token.span)?;
                return Ok(self.alloc_expr(ExprKind::Paren(inner), token.span.merge(close)));
            }
            TokenKind::LBracket => {
                self.cursor.advance();
                let elements = self.parse_expr_list(&TokenKind::RBracket, "[", token.span)?;
                let span = token.span.merge(self.cursor.previous_span());
                return Ok(self.alloc_expr(ExprKind::ArrayLit(elements), span));
            }
            other => return Err(ParseError::expected_expression(&other, token.span)),
        };
        self.cursor.advance();
        Ok(self.alloc_expr(kind, token.span))
    }

    /// Comma-separated expressions up to and including `close`.
    fn parse_expr_list(
        &mut self,
        close: &TokenKind,
        open: &'static str,
        open_span: insp_ir::Span,
    ) -> Result<insp_ir::ExprRange, ParseError> {
        let mut items = Vec::new();
        if !self.cursor.check(close) {
            loop {
                items.push(self.parse_expr()?);
                if !self.cursor.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.cursor.expect_closing(close, open, open_span)?;
        Ok(self.module.exprs.alloc_list(items))
    }
}
