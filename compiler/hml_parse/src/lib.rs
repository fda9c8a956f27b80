//! Recursive descent parser for Hemlock.
//!
//! Produces a `Vec<Stmt>` per source file. Errors are collected rather
//! than aborting: after a failed statement the parser resynchronises at
//! the next statement boundary and keeps going.

mod cursor;
mod expr;
mod stmt;

#[cfg(test)]
mod tests;

use std::fmt;

use hml_ir::{Span, Stmt};
use hml_lexer::{lex, Token, TokenKind};

pub use cursor::Cursor;

/// A syntax error with its location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        ParseError {
            message: message.into(),
            span,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.span)
    }
}

impl std::error::Error for ParseError {}

/// Result of parsing a source file: the statements that parsed cleanly
/// plus every error encountered.
#[derive(Debug, Default)]
pub struct ParseResult {
    pub statements: Vec<Stmt>,
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Convert into a `Result`, failing if any error was recorded.
    pub fn into_result(self) -> Result<Vec<Stmt>, Vec<ParseError>> {
        if self.errors.is_empty() {
            Ok(self.statements)
        } else {
            Err(self.errors)
        }
    }
}

/// Lex and parse a complete source file.
pub fn parse(source: &str) -> ParseResult {
    Parser::new(lex(source)).parse_program()
}

/// Parser state.
pub struct Parser {
    cursor: Cursor,
}

impl Parser {
    /// Create a new parser over a token list.
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
        }
    }

    /// Parse statements until end of input.
    pub fn parse_program(mut self) -> ParseResult {
        let mut result = ParseResult::default();
        while !self.cursor.is_at_end() {
            match self.parse_stmt() {
                Ok(stmt) => result.statements.push(stmt),
                Err(error) => {
                    result.errors.push(error);
                    self.synchronize();
                }
            }
        }
        result
    }

    /// Skip tokens until a plausible statement boundary.
    ///
    /// Always consumes at least one token so a bad token can't stall the loop.
    fn synchronize(&mut self) {
        loop {
            let token = self.cursor.advance();
            if matches!(token.kind, TokenKind::Semicolon | TokenKind::RBrace) {
                return;
            }
            if self.cursor.is_at_end() || self.at_statement_start() {
                return;
            }
        }
    }

    fn at_statement_start(&self) -> bool {
        matches!(
            self.cursor.current_kind(),
            TokenKind::Let
                | TokenKind::Const
                | TokenKind::Fn
                | TokenKind::If
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Return
                | TokenKind::Import
                | TokenKind::Export
        )
    }
}
