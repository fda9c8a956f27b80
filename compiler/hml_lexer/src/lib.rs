//! Lexer for Hemlock using logos.
//!
//! Produces a flat `Vec<Token>` terminated by `TokenKind::Eof`. Malformed
//! input becomes `TokenKind::Error` tokens so the parser can report every
//! problem with a span instead of stopping at the first one.

use std::fmt;

use hml_ir::{Name, Span};
use logos::Logos;

/// Raw token from logos (before conversion).
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum RawToken {
    #[regex(r"//[^\n]*")]
    LineComment,

    // === Keywords ===
    #[token("let")]
    Let,
    #[token("const")]
    Const,
    #[token("fn")]
    Fn,
    #[token("async")]
    Async,
    #[token("await")]
    Await,
    #[token("return")]
    Return,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("for")]
    For,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,
    #[token("import")]
    Import,
    #[token("export")]
    Export,
    #[token("from")]
    From,
    #[token("as")]
    As,

    // === Symbols ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,

    // === Operators ===
    #[token("==")]
    EqEq,
    #[token("=")]
    Eq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    LtEq,
    #[token("<")]
    Lt,
    #[token(">=")]
    GtEq,
    #[token(">")]
    Gt,
    #[token("+=")]
    PlusEq,
    #[token("+")]
    Plus,
    #[token("-=")]
    MinusEq,
    #[token("-")]
    Minus,
    #[token("*=")]
    StarEq,
    #[token("*")]
    Star,
    #[token("/=")]
    SlashEq,
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

    // === Literals ===

    // Hex integer
    #[regex(r"0x[0-9a-fA-F][0-9a-fA-F_]*", |lex| {
        let s = lex.slice();
        i64::from_str_radix(&s[2..].replace('_', ""), 16).ok()
    })]
    HexInt(i64),

    // Integer
    #[regex(r"[0-9][0-9_]*", |lex| {
        lex.slice().replace('_', "").parse::<i64>().ok()
    })]
    Int(i64),

    // Float
    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*([eE][+-]?[0-9]+)?", |lex| {
        lex.slice().replace('_', "").parse::<f64>().ok()
    })]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9]+", |lex| {
        lex.slice().replace('_', "").parse::<f64>().ok()
    })]
    Float(f64),

    // String literal
    #[regex(r#""([^"\\]|\\.)*""#)]
    String,

    // Identifier
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
}

/// Token kinds seen by the parser.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    // Literals
    Int(i64),
    Float(f64),
    Str(String),
    Ident(Name),

    // Keywords
    Let,
    Const,
    Fn,
    Async,
    Await,
    Return,
    If,
    Else,
    While,
    For,
    Break,
    Continue,
    True,
    False,
    Null,
    Import,
    Export,
    From,
    As,

    // Symbols
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Colon,
    Dot,

    // Operators
    EqEq,
    Eq,
    NotEq,
    LtEq,
    Lt,
    GtEq,
    Gt,
    PlusEq,
    Plus,
    MinusEq,
    Minus,
    StarEq,
    Star,
    SlashEq,
    Slash,
    Percent,
    Bang,
    AmpAmp,
    PipePipe,

    /// Unrecognised or malformed input.
    Error,
    Eof,
}

impl TokenKind {
    /// Human-readable description for "expected X, found Y" messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Int(_) | Self::Float(_) => "number",
            Self::Str(_) => "string",
            Self::Ident(_) => "identifier",
            Self::Let => "`let`",
            Self::Const => "`const`",
            Self::Fn => "`fn`",
            Self::Async => "`async`",
            Self::Await => "`await`",
            Self::Return => "`return`",
            Self::If => "`if`",
            Self::Else => "`else`",
            Self::While => "`while`",
            Self::For => "`for`",
            Self::Break => "`break`",
            Self::Continue => "`continue`",
            Self::True => "`true`",
            Self::False => "`false`",
            Self::Null => "`null`",
            Self::Import => "`import`",
            Self::Export => "`export`",
            Self::From => "`from`",
            Self::As => "`as`",
            Self::LParen => "`(`",
            Self::RParen => "`)`",
            Self::LBrace => "`{`",
            Self::RBrace => "`}`",
            Self::LBracket => "`[`",
            Self::RBracket => "`]`",
            Self::Comma => "`,`",
            Self::Semicolon => "`;`",
            Self::Colon => "`:`",
            Self::Dot => "`.`",
            Self::EqEq => "`==`",
            Self::Eq => "`=`",
            Self::NotEq => "`!=`",
            Self::LtEq => "`<=`",
            Self::Lt => "`<`",
            Self::GtEq => "`>=`",
            Self::Gt => "`>`",
            Self::PlusEq => "`+=`",
            Self::Plus => "`+`",
            Self::MinusEq => "`-=`",
            Self::Minus => "`-`",
            Self::StarEq => "`*=`",
            Self::Star => "`*`",
            Self::SlashEq => "`/=`",
            Self::Slash => "`/`",
            Self::Percent => "`%`",
            Self::Bang => "`!`",
            Self::AmpAmp => "`&&`",
            Self::PipePipe => "`||`",
            Self::Error => "invalid token",
            Self::Eof => "end of file",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "Int({n})"),
            Self::Float(v) => write!(f, "Float({v})"),
            Self::Str(s) => write!(f, "Str({s:?})"),
            Self::Ident(name) => write!(f, "Ident({name})"),
            other => f.write_str(other.display_name()),
        }
    }
}

/// A token with its source span.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }
}

/// Lex source code into tokens, ending with `Eof`.
pub fn lex(source: &str) -> Vec<Token> {
    let mut result = Vec::new();
    let mut logos = RawToken::lexer(source);

    while let Some(token_result) = logos.next() {
        let span = Span::from_range(logos.span());
        let slice = logos.slice();

        match token_result {
            Ok(RawToken::LineComment) => {}
            Ok(raw) => result.push(Token::new(convert_token(raw, slice), span)),
            Err(()) => result.push(Token::new(TokenKind::Error, span)),
        }
    }

    let eof = Span::from_range(source.len()..source.len());
    result.push(Token::new(TokenKind::Eof, eof));
    result
}

/// Convert a raw token to a `TokenKind`.
fn convert_token(raw: RawToken, slice: &str) -> TokenKind {
    match raw {
        RawToken::Int(n) | RawToken::HexInt(n) => TokenKind::Int(n),
        RawToken::Float(v) => TokenKind::Float(v),
        RawToken::String => {
            let content = &slice[1..slice.len() - 1];
            TokenKind::Str(unescape_string(content))
        }
        RawToken::Ident => TokenKind::Ident(Name::from(slice)),

        RawToken::Let => TokenKind::Let,
        RawToken::Const => TokenKind::Const,
        RawToken::Fn => TokenKind::Fn,
        RawToken::Async => TokenKind::Async,
        RawToken::Await => TokenKind::Await,
        RawToken::Return => TokenKind::Return,
        RawToken::If => TokenKind::If,
        RawToken::Else => TokenKind::Else,
        RawToken::While => TokenKind::While,
        RawToken::For => TokenKind::For,
        RawToken::Break => TokenKind::Break,
        RawToken::Continue => TokenKind::Continue,
        RawToken::True => TokenKind::True,
        RawToken::False => TokenKind::False,
        RawToken::Null => TokenKind::Null,
        RawToken::Import => TokenKind::Import,
        RawToken::Export => TokenKind::Export,
        RawToken::From => TokenKind::From,
        RawToken::As => TokenKind::As,

        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Semicolon => TokenKind::Semicolon,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Dot => TokenKind::Dot,

        RawToken::EqEq => TokenKind::EqEq,
        RawToken::Eq => TokenKind::Eq,
        RawToken::NotEq => TokenKind::NotEq,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::Lt => TokenKind::Lt,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::Gt => TokenKind::Gt,
        RawToken::PlusEq => TokenKind::PlusEq,
        RawToken::Plus => TokenKind::Plus,
        RawToken::MinusEq => TokenKind::MinusEq,
        RawToken::Minus => TokenKind::Minus,
        RawToken::StarEq => TokenKind::StarEq,
        RawToken::Star => TokenKind::Star,
        RawToken::SlashEq => TokenKind::SlashEq,
        RawToken::Slash => TokenKind::Slash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::Bang => TokenKind::Bang,
        RawToken::AmpAmp => TokenKind::AmpAmp,
        RawToken::PipePipe => TokenKind::PipePipe,

        // Filtered out by `lex` before conversion.
        RawToken::LineComment => TokenKind::Error,
    }
}

/// Process string escape sequences.
///
/// Unknown escapes are kept verbatim (backslash included).
fn unescape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('r') => result.push('\r'),
                Some('t') => result.push('\t'),
                Some('\\') => result.push('\\'),
                Some('"') => result.push('"'),
                Some('0') => result.push('\0'),
                Some(c) => {
                    result.push('\\');
                    result.push(c);
                }
                None => result.push('\\'),
            }
        } else {
            result.push(c);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_lex_basic() {
        assert_eq!(
            kinds("let x = 42;"),
            vec![
                TokenKind::Let,
                TokenKind::Ident(Name::from("x")),
                TokenKind::Eq,
                TokenKind::Int(42),
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lex_string() {
        assert_eq!(
            kinds(r#""hello\nworld""#),
            vec![TokenKind::Str("hello\nworld".to_string()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_lex_numbers() {
        assert_eq!(
            kinds("1_000 0xff 3.25 1e3"),
            vec![
                TokenKind::Int(1000),
                TokenKind::Int(255),
                TokenKind::Float(3.25),
                TokenKind::Float(1000.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lex_compound_operators() {
        assert_eq!(
            kinds("a += 1; b -= 2; c *= 3; d /= 4;")
                .into_iter()
                .filter(|k| matches!(
                    k,
                    TokenKind::PlusEq | TokenKind::MinusEq | TokenKind::StarEq | TokenKind::SlashEq
                ))
                .count(),
            4
        );
    }

    #[test]
    fn test_lex_comments_skipped() {
        assert_eq!(
            kinds("// comment\nnull // trailing"),
            vec![TokenKind::Null, TokenKind::Eof]
        );
    }

    #[test]
    fn test_lex_module_keywords() {
        assert_eq!(
            kinds(r#"import * as m from "./m";"#),
            vec![
                TokenKind::Import,
                TokenKind::Star,
                TokenKind::As,
                TokenKind::Ident(Name::from("m")),
                TokenKind::From,
                TokenKind::Str("./m".to_string()),
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lex_error_token() {
        let tokens = lex("let # = 1;");
        assert_eq!(tokens[1].kind, TokenKind::Error);
        assert_eq!(tokens[1].span, Span::new(4, 5));
    }

    #[test]
    fn test_lex_spans() {
        let tokens = lex("fn  add");
        assert_eq!(tokens[0].span, Span::new(0, 2));
        assert_eq!(tokens[1].span, Span::new(4, 7));
        assert_eq!(tokens[2].span, Span::point(7));
    }

    #[test]
    fn test_unescape_unknown_escape_kept() {
        assert_eq!(unescape_string(r"a\qb"), "a\\qb");
        assert_eq!(unescape_string(r#"\"x\""#), "\"x\"");
    }
}
