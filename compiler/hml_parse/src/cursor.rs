//! Token cursor for navigating the token stream.
//!
//! Provides low-level token access, lookahead, and consumption methods.

use hml_ir::{Name, Span};
use hml_lexer::{Token, TokenKind};

use crate::ParseError;

/// Cursor for navigating tokens.
///
/// The token list always ends with `Eof`; the cursor never moves past it.
pub struct Cursor {
    tokens: Vec<Token>,
    pos: usize,
}

impl Cursor {
    /// Create a new cursor at the start of the token stream.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !matches!(tokens.last(), Some(t) if t.kind == TokenKind::Eof) {
            let end = tokens.last().map_or(0, |t| t.span.end);
            tokens.push(Token::new(TokenKind::Eof, Span::point(end)));
        }
        Cursor { tokens, pos: 0 }
    }

    // Token Access

    /// Get the current token.
    pub fn current(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    /// Get the current token's kind.
    pub fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    /// Get the current token's span.
    pub fn current_span(&self) -> Span {
        self.current().span
    }

    /// Get the previous token's span.
    pub fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            Span::DUMMY
        }
    }

    /// Kind of the token `n` positions ahead of the current one.
    pub fn peek_kind(&self, n: usize) -> &TokenKind {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + n).min(last)].kind
    }

    // Lookahead

    /// Check if at end of token stream.
    pub fn is_at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    /// Check if the current token matches the given kind.
    ///
    /// Payload-carrying kinds compare by variant only.
    pub fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    /// Check if the current token is an identifier.
    pub fn check_ident(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Ident(_))
    }

    // Consumption

    /// Advance to the next token, returning the one just consumed.
    pub fn advance(&mut self) -> &Token {
        let idx = self.pos.min(self.tokens.len() - 1);
        if !self.is_at_end() {
            self.pos += 1;
        }
        &self.tokens[idx]
    }

    /// Consume the current token if it matches `kind`.
    pub fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expect and consume a specific token kind.
    pub fn expect(&mut self, kind: &TokenKind, context: &str) -> Result<Span, ParseError> {
        if self.check(kind) {
            Ok(self.advance().span)
        } else {
            Err(self.unexpected(kind.display_name(), context))
        }
    }

    /// Expect and consume an identifier.
    pub fn expect_ident(&mut self, context: &str) -> Result<Name, ParseError> {
        if let TokenKind::Ident(name) = self.current_kind() {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            Err(self.unexpected("identifier", context))
        }
    }

    /// Expect and consume a string literal.
    pub fn expect_string(&mut self, context: &str) -> Result<String, ParseError> {
        if let TokenKind::Str(s) = self.current_kind() {
            let s = s.clone();
            self.advance();
            Ok(s)
        } else {
            Err(self.unexpected("string", context))
        }
    }

    /// Build an "expected X, found Y" error at the current token.
    #[cold]
    pub fn unexpected(&self, expected: &str, context: &str) -> ParseError {
        ParseError::new(
            format!(
                "expected {expected} {context}, found {}",
                self.current_kind().display_name()
            ),
            self.current_span(),
        )
    }
}
