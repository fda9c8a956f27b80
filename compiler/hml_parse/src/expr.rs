//! Expression grammar, lowest to highest precedence.

use hml_ir::{BinaryOp, Expr, ExprKind, UnaryOp};
use hml_lexer::TokenKind;
use hml_stack::ensure_sufficient_stack;

use crate::{ParseError, Parser};

type LevelFn = fn(&mut Parser) -> Result<Expr, ParseError>;

impl Parser {
    /// Parse an expression.
    pub(crate) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        ensure_sufficient_stack(|| self.parse_assignment())
    }

    /// `target = value` and the compound forms `+= -= *= /=`.
    ///
    /// On a plain identifier a compound form desugars to `name = name op
    /// value`. Property and index targets keep the operator so their
    /// object and index expressions run once.
    fn parse_assignment(&mut self) -> Result<Expr, ParseError> {
        let target = self.parse_or()?;

        let op = match self.cursor.current_kind() {
            TokenKind::Eq => None,
            TokenKind::PlusEq => Some(BinaryOp::Add),
            TokenKind::MinusEq => Some(BinaryOp::Sub),
            TokenKind::StarEq => Some(BinaryOp::Mul),
            TokenKind::SlashEq => Some(BinaryOp::Div),
            _ => return Ok(target),
        };
        let op_span = self.cursor.advance().span;
        let rhs = self.parse_assignment()?;
        let span = target.span.merge(rhs.span);

        let kind = match target.kind {
            ExprKind::Ident(name) => {
                let value = match op {
                    Some(op) => Expr::new(
                        ExprKind::Binary {
                            op,
                            left: Box::new(Expr::new(ExprKind::Ident(name.clone()), target.span)),
                            right: Box::new(rhs),
                        },
                        span,
                    ),
                    None => rhs,
                };
                ExprKind::Assign {
                    name,
                    value: Box::new(value),
                }
            }
            ExprKind::GetProperty { object, property } => ExprKind::SetProperty {
                object,
                property,
                op,
                value: Box::new(rhs),
            },
            ExprKind::Index { object, index } => ExprKind::IndexAssign {
                object,
                index,
                op,
                value: Box::new(rhs),
            },
            _ => return Err(ParseError::new("invalid assignment target", op_span)),
        };
        Ok(Expr::new(kind, span))
    }

    /// Left-associative binary level: `next (op next)*`.
    fn parse_binary_level(
        &mut self,
        next: LevelFn,
        ops: &[(TokenKind, BinaryOp)],
    ) -> Result<Expr, ParseError> {
        let mut left = next(self)?;
        loop {
            let Some(op) = ops
                .iter()
                .find(|(kind, _)| self.cursor.check(kind))
                .map(|(_, op)| *op)
            else {
                return Ok(left);
            };
            self.cursor.advance();
            let right = next(self)?;
            let span = left.span.merge(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(Self::parse_and, &[(TokenKind::PipePipe, BinaryOp::Or)])
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(
            Self::parse_equality,
            &[(TokenKind::AmpAmp, BinaryOp::And)],
        )
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(
            Self::parse_comparison,
            &[
                (TokenKind::EqEq, BinaryOp::Eq),
                (TokenKind::NotEq, BinaryOp::NotEq),
            ],
        )
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(
            Self::parse_term,
            &[
                (TokenKind::Lt, BinaryOp::Lt),
                (TokenKind::LtEq, BinaryOp::LtEq),
                (TokenKind::Gt, BinaryOp::Gt),
                (TokenKind::GtEq, BinaryOp::GtEq),
            ],
        )
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(
            Self::parse_factor,
            &[
                (TokenKind::Plus, BinaryOp::Add),
                (TokenKind::Minus, BinaryOp::Sub),
            ],
        )
    }

    fn parse_factor(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(
            Self::parse_unary,
            &[
                (TokenKind::Star, BinaryOp::Mul),
                (TokenKind::Slash, BinaryOp::Div),
                (TokenKind::Percent, BinaryOp::Mod),
            ],
        )
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.cursor.current_kind() {
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Await => None,
            _ => return self.parse_postfix(),
        };
        let start = self.cursor.advance().span;
        let operand = ensure_sufficient_stack(|| self.parse_unary())?;
        let span = start.merge(operand.span);
        let kind = match op {
            Some(op) => ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            None => ExprKind::Await(Box::new(operand)),
        };
        Ok(Expr::new(kind, span))
    }

    /// Calls, property access and indexing chained onto a primary.
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.cursor.current_kind() {
                TokenKind::LParen => {
                    self.cursor.advance();
                    let mut args = Vec::new();
                    while !self.cursor.check(&TokenKind::RParen) {
                        args.push(self.parse_expr()?);
                        if !self.cursor.eat(&TokenKind::Comma) {
                            break;
                        }
                    }
                    self.cursor.expect(&TokenKind::RParen, "after arguments")?;
                    let span = expr.span.merge(self.cursor.previous_span());
                    expr = Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        span,
                    );
                }
                TokenKind::Dot => {
                    self.cursor.advance();
                    let property = self.cursor.expect_ident("after `.`")?;
                    let span = expr.span.merge(self.cursor.previous_span());
                    expr = Expr::new(
                        ExprKind::GetProperty {
                            object: Box::new(expr),
                            property,
                        },
                        span,
                    );
                }
                TokenKind::LBracket => {
                    self.cursor.advance();
                    let index = self.parse_expr()?;
                    self.cursor.expect(&TokenKind::RBracket, "after index")?;
                    let span = expr.span.merge(self.cursor.previous_span());
                    expr = Expr::new(
                        ExprKind::Index {
                            object: Box::new(expr),
                            index: Box::new(index),
                        },
                        span,
                    );
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let span = self.cursor.current_span();
        let kind = match self.cursor.current_kind() {
            TokenKind::Int(n) => int_literal(*n),
            TokenKind::Float(v) => ExprKind::Float(*v),
            TokenKind::Str(s) => ExprKind::Str(s.clone()),
            TokenKind::True => ExprKind::Bool(true),
            TokenKind::False => ExprKind::Bool(false),
            TokenKind::Null => ExprKind::Null,
            TokenKind::Ident(name) => ExprKind::Ident(name.clone()),
            TokenKind::LParen => {
                self.cursor.advance();
                let inner = self.parse_expr()?;
                self.cursor
                    .expect(&TokenKind::RParen, "after parenthesized expression")?;
                return Ok(Expr::new(
                    inner.kind,
                    span.merge(self.cursor.previous_span()),
                ));
            }
            TokenKind::LBrace => return self.parse_object_literal(),
            TokenKind::Fn | TokenKind::Async => {
                let is_async = self.cursor.eat(&TokenKind::Async);
                self.cursor.expect(&TokenKind::Fn, "after `async`")?;
                let def = self.parse_fn_rest(is_async, span)?;
                let fn_span = def.span;
                return Ok(Expr::new(ExprKind::Function(def), fn_span));
            }
            _ => return Err(self.cursor.unexpected("expression", "here")),
        };
        self.cursor.advance();
        Ok(Expr::new(kind, span))
    }

    /// `{ key: value, ... }`; keys are identifiers or string literals.
    fn parse_object_literal(&mut self) -> Result<Expr, ParseError> {
        let start = self.cursor.advance().span;
        let mut fields = Vec::new();
        while !self.cursor.check(&TokenKind::RBrace) {
            let key = match self.cursor.current_kind() {
                TokenKind::Str(s) => {
                    let key = hml_ir::Name::from(s.as_str());
                    self.cursor.advance();
                    key
                }
                _ => self.cursor.expect_ident("as object field name")?,
            };
            self.cursor.expect(&TokenKind::Colon, "after field name")?;
            let value = self.parse_expr()?;
            fields.push((key, value));
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.cursor
            .expect(&TokenKind::RBrace, "after object fields")?;
        Ok(Expr::new(
            ExprKind::Object(fields),
            start.merge(self.cursor.previous_span()),
        ))
    }
}

/// Integer literals are 32-bit signed; wider literals fall back to f64.
#[allow(
    clippy::cast_precision_loss,
    reason = "literals beyond i32 are deliberately widened to f64"
)]
fn int_literal(n: i64) -> ExprKind {
    match i32::try_from(n) {
        Ok(v) => ExprKind::Int(v),
        Err(_) => ExprKind::Float(n as f64),
    }
}
