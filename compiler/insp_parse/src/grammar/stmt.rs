//! Statements.
//!
//! ```text
//! stmt ::= '{' stmt* '}'
//!        | 'if' '(' expr ')' stmt ('else' stmt)?
//!        | 'while' '(' expr ')' stmt
//!        | 'return' expr? ';' | 'break' ';' | 'continue' ';'
//!        | type ident ('=' expr)? ';'
//!        | expr ';'
//! ```

use insp_ir::{Stmt, StmtId, StmtKind};
use insp_stack::ensure_sufficient_stack;

use crate::lexer::TokenKind;
use crate::{ParseError, Parser};

impl Parser<'_> {
    pub(crate) fn parse_stmt(&mut self) -> Result<StmtId, ParseError> {
        ensure_sufficient_stack(|| self.parse_stmt_inner())
    }

    fn parse_stmt_inner(&mut self) -> Result<StmtId, ParseError> {
        let start = self.cursor.current_span();
        let kind = match self.cursor.current_kind() {
            TokenKind::LBrace => {
                self.cursor.advance();
                let mut stmts = Vec::new();
                while !self.cursor.check(&TokenKind::RBrace) {
                    if self.cursor.at_eof() {
                        return Err(ParseError::unclosed("{", start));
                    }
                    stmts.push(self.parse_stmt()?);
                }
                self.cursor.advance();
                StmtKind::Block(self.module.stmts.alloc_list(stmts))
            }
            TokenKind::If => {
                self.cursor.advance();
                let cond = self.parse_condition()?;
                let then_branch = self.parse_stmt()?;
                let else_branch = if self.cursor.eat(&TokenKind::Else) {
                    Some(self.parse_stmt()?)
                } else {
                    None
                };
                StmtKind::If {
                    cond,
                    then_branch,
                    else_branch,
                }
            }
            TokenKind::While => {
                self.cursor.advance();
                let cond = self.parse_condition()?;
                let body = self.parse_stmt()?;
                StmtKind::While { cond, body }
            }
            TokenKind::Return => {
                self.cursor.advance();
                let value = if self.cursor.check(&TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                self.cursor.expect(&TokenKind::Semicolon)?;
                StmtKind::Return(value)
            }
            TokenKind::Break => {
                self.cursor.advance();
                self.cursor.expect(&TokenKind::Semicolon)?;
                StmtKind::Break
            }
            TokenKind::Continue => {
                self.cursor.advance();
                self.cursor.expect(&TokenKind::Semicolon)?;
                StmtKind::Continue
            }
            _ if self.at_declaration() => {
                let ty = self.parse_type()?;
                let (name, _) = self.expect_ident()?;
                let init = if self.cursor.eat(&TokenKind::Eq) {
                    Some(self.parse_expr()?)
                } else {
                    None
                };
                self.cursor.expect(&TokenKind::Semicolon)?;
                StmtKind::Local { ty, name, init }
            }
            _ => {
                let expr = self.parse_expr()?;
                self.cursor.expect(&TokenKind::Semicolon)?;
                StmtKind::Expr(expr)
            }
        };
        let span = start.merge(self.cursor.previous_span());
        Ok(self.module.stmts.alloc(Stmt { kind, span }))
    }

    /// `'(' expr ')'` of an `if` or `while`.
    ///
    /// The parenthesis belong to the statement, so the condition expression
    /// itself is not wrapped in `Paren`: `if (x match p)` has a bare match as
    /// its condition, `if ((x match p))` does not.
    fn parse_condition(&mut self) -> Result<insp_ir::ExprId, ParseError> {
        let open = self.cursor.expect(&TokenKind::LParen)?.span;
        let cond = self.parse_expr()?;
        self.cursor.expect_closing(&TokenKind::RParen, "(", open)?;
        Ok(cond)
    }
}
