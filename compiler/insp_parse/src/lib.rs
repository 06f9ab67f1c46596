//! Parser for the Inspect surface language.
//!
//! A small C-like host language (functions, locals, `if`/`while`, pointers,
//! arrays, calls) carrying the two pattern-matching constructs:
//!
//! ```text
//! subject match pattern (if guard)?
//! subject match constexpr? (-> T)? { pattern (if guard)? => action; ... }
//! ```
//!
//! `match` binds tighter than every binary operator and looser than unary and
//! postfix operators; the member-pointer operators `.*` and `->*` bind tighter
//! still, so they stay part of the subject.
//!
//! The parser produces a [`ParsedModule`] of flat arenas. Names are interned
//! but never resolved.

mod cursor;
mod error;
mod grammar;
pub mod lexer;

#[cfg(test)]
mod test_helpers;

use insp_ir::{ExprId, ParsedModule, StringInterner};

use crate::cursor::Cursor;
pub use crate::error::ParseError;

/// Recursive-descent parser over a token list.
pub struct Parser<'a> {
    cursor: Cursor,
    interner: &'a StringInterner,
    module: ParsedModule,
}

impl<'a> Parser<'a> {
    /// Tokenize `source` and position at the first token.
    pub fn new(source: &str, interner: &'a StringInterner) -> Result<Self, ParseError> {
        let tokens = lexer::lex(source, interner)?;
        Ok(Parser {
            cursor: Cursor::new(tokens),
            interner,
            module: ParsedModule::default(),
        })
    }

    /// Consume the parser, returning the arenas built so far.
    pub fn into_module(self) -> ParsedModule {
        self.module
    }
}

/// Parse a whole source file of `fn` items.
pub fn parse(source: &str, interner: &StringInterner) -> Result<ParsedModule, ParseError> {
    let mut parser = Parser::new(source, interner)?;
    parser.parse_module()?;
    tracing::debug!(
        functions = parser.module.functions.len(),
        matches = parser.module.patterns.match_count(),
        "parsed module"
    );
    Ok(parser.into_module())
}

/// Parse a single expression (must consume all input).
pub fn parse_expression(
    source: &str,
    interner: &StringInterner,
) -> Result<(ParsedModule, ExprId), ParseError> {
    let mut parser = Parser::new(source, interner)?;
    let expr = parser.parse_expr()?;
    parser.expect_eof()?;
    Ok((parser.into_module(), expr))
}
