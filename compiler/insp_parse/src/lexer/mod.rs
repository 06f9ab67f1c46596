//! Tokenizer.
//!
//! `RawToken` is the logos-derived scanner output. [`lex`] converts it into
//! [`Token`]s, interning identifiers and decoding literals.

use insp_ir::{Name, Span, StringInterner};
use logos::Logos;

use crate::ParseError;

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"([ \t\r\n]+|//[^\n]*)")]
enum RawToken {
    #[token("fn")]
    Fn,
    #[token("let")]
    Let,
    #[token("match")]
    Match,
    #[token("constexpr")]
    Constexpr,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("return")]
    Return,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("nullptr")]
    NullPtr,
    #[token("const")]
    Const,
    #[token("auto")]
    Auto,
    #[token("_", priority = 3)]
    Underscore,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,
    #[regex(r"[0-9]+")]
    Int,
    #[regex(r"[0-9]+\.[0-9]+")]
    Float,
    #[regex(r"'([^'\\\n]|\\.)'")]
    Char,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token("?")]
    Question,
    #[token("=>")]
    FatArrow,
    #[token("->")]
    Arrow,
    #[token("->*")]
    ArrowStar,
    #[token(".")]
    Dot,
    #[token(".*")]
    DotStar,
    #[token("=")]
    Eq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("!")]
    Bang,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("&")]
    Amp,
}

/// Token kinds after interning and literal decoding.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TokenKind {
    Fn,
    Let,
    Match,
    Constexpr,
    If,
    Else,
    While,
    Return,
    Break,
    Continue,
    True,
    False,
    NullPtr,
    Const,
    Auto,
    Underscore,

    Ident(Name),
    Int(i64),
    /// Float literal, stored as bits.
    Float(u64),
    Char(char),

    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Semicolon,
    Colon,
    Question,
    FatArrow,
    Arrow,
    ArrowStar,
    Dot,
    DotStar,
    Eq,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    AmpAmp,
    PipePipe,
    Amp,

    Eof,
}

impl TokenKind {
    /// Human-readable name for error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            TokenKind::Fn => "`fn`",
            TokenKind::Let => "`let`",
            TokenKind::Match => "`match`",
            TokenKind::Constexpr => "`constexpr`",
            TokenKind::If => "`if`",
            TokenKind::Else => "`else`",
            TokenKind::While => "`while`",
            TokenKind::Return => "`return`",
            TokenKind::Break => "`break`",
            TokenKind::Continue => "`continue`",
            TokenKind::True => "`true`",
            TokenKind::False => "`false`",
            TokenKind::NullPtr => "`nullptr`",
            TokenKind::Const => "`const`",
            TokenKind::Auto => "`auto`",
            TokenKind::Underscore => "`_`",
            TokenKind::Ident(_) => "identifier",
            TokenKind::Int(_) => "integer literal",
            TokenKind::Float(_) => "float literal",
            TokenKind::Char(_) => "character literal",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::Comma => "`,`",
            TokenKind::Semicolon => "`;`",
            TokenKind::Colon => "`:`",
            TokenKind::Question => "`?`",
            TokenKind::FatArrow => "`=>`",
            TokenKind::Arrow => "`->`",
            TokenKind::ArrowStar => "`->*`",
            TokenKind::Dot => "`.`",
            TokenKind::DotStar => "`.*`",
            TokenKind::Eq => "`=`",
            TokenKind::EqEq => "`==`",
            TokenKind::NotEq => "`!=`",
            TokenKind::Lt => "`<`",
            TokenKind::LtEq => "`<=`",
            TokenKind::Gt => "`>`",
            TokenKind::GtEq => "`>=`",
            TokenKind::Plus => "`+`",
            TokenKind::Minus => "`-`",
            TokenKind::Star => "`*`",
            TokenKind::Slash => "`/`",
            TokenKind::Percent => "`%`",
            TokenKind::Bang => "`!`",
            TokenKind::AmpAmp => "`&&`",
            TokenKind::PipePipe => "`||`",
            TokenKind::Amp => "`&`",
            TokenKind::Eof => "end of file",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Tokenize `source`. The returned list always ends with an `Eof` token.
pub fn lex(source: &str, interner: &StringInterner) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut lexer = RawToken::lexer(source);

    while let Some(raw) = lexer.next() {
        let span = to_span(lexer.span())?;
        let slice = lexer.slice();
        let Ok(raw) = raw else {
            return Err(if slice.starts_with('\'') {
                ParseError::unterminated_char(span)
            } else {
                ParseError::invalid_character(slice, span)
            });
        };
        let kind = convert(raw, slice, span, interner)?;
        tokens.push(Token { kind, span });
    }

    let end = to_span(source.len()..source.len())?;
    tokens.push(Token {
        kind: TokenKind::Eof,
        span: end,
    });
    Ok(tokens)
}

fn to_span(range: std::ops::Range<usize>) -> Result<Span, ParseError> {
    Span::try_from_range(range).map_err(|e| ParseError::source_too_large(&e))
}

fn convert(
    raw: RawToken,
    slice: &str,
    span: Span,
    interner: &StringInterner,
) -> Result<TokenKind, ParseError> {
    Ok(match raw {
        RawToken::Fn => TokenKind::Fn,
        RawToken::Let => TokenKind::Let,
        RawToken::Match => TokenKind::Match,
        RawToken::Constexpr => TokenKind::Constexpr,
        RawToken::If => TokenKind::If,
        RawToken::Else => TokenKind::Else,
        RawToken::While => TokenKind::While,
        RawToken::Return => TokenKind::Return,
        RawToken::Break => TokenKind::Break,
        RawToken::Continue => TokenKind::Continue,
        RawToken::True => TokenKind::True,
        RawToken::False => TokenKind::False,
        RawToken::NullPtr => TokenKind::NullPtr,
        RawToken::Const => TokenKind::Const,
        RawToken::Auto => TokenKind::Auto,
        RawToken::Underscore => TokenKind::Underscore,
        RawToken::Ident => TokenKind::Ident(interner.intern(slice)),
        RawToken::Int => TokenKind::Int(
            slice
                .parse::<i64>()
                .map_err(|_| ParseError::invalid_number(slice, span))?,
        ),
        RawToken::Float => TokenKind::Float(
            slice
                .parse::<f64>()
                .map_err(|_| ParseError::invalid_number(slice, span))?
                .to_bits(),
        ),
        RawToken::Char => TokenKind::Char(decode_char(slice).ok_or_else(|| {
            ParseError::unterminated_char(span)
        })?),
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Semicolon => TokenKind::Semicolon,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Question => TokenKind::Question,
        RawToken::FatArrow => TokenKind::FatArrow,
        RawToken::Arrow => TokenKind::Arrow,
        RawToken::ArrowStar => TokenKind::ArrowStar,
        RawToken::Dot => TokenKind::Dot,
        RawToken::DotStar => TokenKind::DotStar,
        RawToken::Eq => TokenKind::Eq,
        RawToken::EqEq => TokenKind::EqEq,
        RawToken::NotEq => TokenKind::NotEq,
        RawToken::Lt => TokenKind::Lt,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::Gt => TokenKind::Gt,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::Slash => TokenKind::Slash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::Bang => TokenKind::Bang,
        RawToken::AmpAmp => TokenKind::AmpAmp,
        RawToken::PipePipe => TokenKind::PipePipe,
        RawToken::Amp => TokenKind::Amp,
    })
}

/// Decode a quoted character literal like `'a'` or `'\n'`.
fn decode_char(slice: &str) -> Option<char> {
    let inner = slice.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut chars = inner.chars();
    let first = chars.next()?;
    let decoded = if first == '\\' {
        match chars.next()? {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            '\\' => '\\',
            '\'' => '\'',
            _ => return None,
        }
    } else {
        first
    };
    chars.next().is_none().then_some(decoded)
}
