//! Statement grammar.

use std::rc::Rc;

use hml_ir::{
    BindingSpec, ExportKind, Expr, ExprKind, FunctionDef, ImportKind, Param, Span, Stmt, StmtKind,
    TypeKind,
};
use hml_lexer::TokenKind;
use hml_stack::ensure_sufficient_stack;

use crate::{ParseError, Parser};

impl Parser {
    /// Parse a single statement.
    pub(crate) fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        ensure_sufficient_stack(|| self.parse_stmt_inner())
    }

    fn parse_stmt_inner(&mut self) -> Result<Stmt, ParseError> {
        match self.cursor.current_kind() {
            TokenKind::Let => self.parse_binding(false),
            TokenKind::Const => self.parse_binding(true),
            TokenKind::Fn if matches!(self.cursor.peek_kind(1), TokenKind::Ident(_)) => {
                self.parse_fn_decl()
            }
            TokenKind::Async
                if self.cursor.peek_kind(1) == &TokenKind::Fn
                    && matches!(self.cursor.peek_kind(2), TokenKind::Ident(_)) =>
            {
                self.parse_fn_decl()
            }
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Break => self.parse_jump(StmtKind::Break),
            TokenKind::Continue => self.parse_jump(StmtKind::Continue),
            TokenKind::Return => self.parse_return(),
            TokenKind::LBrace => self.parse_block_stmt(),
            TokenKind::Import => self.parse_import(),
            TokenKind::Export => self.parse_export(),
            _ => {
                let expr = self.parse_expr()?;
                self.cursor.expect(&TokenKind::Semicolon, "after expression")?;
                let span = expr.span.merge(self.cursor.previous_span());
                Ok(Stmt::new(StmtKind::Expr(expr), span))
            }
        }
    }

    /// `let name[: type] = value;` or `const ...`
    fn parse_binding(&mut self, is_const: bool) -> Result<Stmt, ParseError> {
        let start = self.cursor.advance().span;
        let keyword = if is_const { "`const`" } else { "`let`" };
        let name = self.cursor.expect_ident(&format!("after {keyword}"))?;
        let ty = if self.cursor.eat(&TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        self.cursor.expect(&TokenKind::Eq, "after variable name")?;
        let value = self.parse_expr()?;
        self.cursor
            .expect(&TokenKind::Semicolon, "after variable declaration")?;
        let span = start.merge(self.cursor.previous_span());
        let kind = if is_const {
            StmtKind::Const { name, ty, value }
        } else {
            StmtKind::Let { name, ty, value }
        };
        Ok(Stmt::new(kind, span))
    }

    /// A type annotation: one of the scalar type names or an alias.
    pub(crate) fn parse_type(&mut self) -> Result<TypeKind, ParseError> {
        let name = self.cursor.expect_ident("in type annotation")?;
        TypeKind::from_name(&name).ok_or_else(|| {
            ParseError::new(format!("unknown type `{name}`"), self.cursor.previous_span())
        })
    }

    /// `[async] fn name(params)[: type] { body }`, desugared to a `let`.
    fn parse_fn_decl(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.current_span();
        let is_async = self.cursor.eat(&TokenKind::Async);
        self.cursor.expect(&TokenKind::Fn, "to start function")?;
        let name = self.cursor.expect_ident("after `fn`")?;
        let def = self.parse_fn_rest(is_async, start)?;
        let span = def.span;
        let value = Expr::new(ExprKind::Function(def), span);
        Ok(Stmt::new(
            StmtKind::Let {
                name,
                ty: None,
                value,
            },
            span,
        ))
    }

    /// Parameters, optional return type and body of a function.
    pub(crate) fn parse_fn_rest(
        &mut self,
        is_async: bool,
        start: Span,
    ) -> Result<Rc<FunctionDef>, ParseError> {
        self.cursor
            .expect(&TokenKind::LParen, "to open parameter list")?;
        let mut params = Vec::new();
        while !self.cursor.check(&TokenKind::RParen) {
            let name = self.cursor.expect_ident("as parameter name")?;
            let ty = if self.cursor.eat(&TokenKind::Colon) {
                Some(self.parse_type()?)
            } else {
                None
            };
            params.push(Param { name, ty });
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect(&TokenKind::RParen, "after parameters")?;
        let return_type = if self.cursor.eat(&TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let body = self.parse_block_body("before function body")?;
        Ok(Rc::new(FunctionDef {
            params,
            return_type,
            body,
            is_async,
            span: start.merge(self.cursor.previous_span()),
        }))
    }

    /// `{ stmt* }`, returning the inner statements.
    fn parse_block_body(&mut self, context: &str) -> Result<Vec<Stmt>, ParseError> {
        self.cursor.expect(&TokenKind::LBrace, context)?;
        let mut stmts = Vec::new();
        while !self.cursor.check(&TokenKind::RBrace) && !self.cursor.is_at_end() {
            stmts.push(self.parse_stmt()?);
        }
        self.cursor.expect(&TokenKind::RBrace, "to close block")?;
        Ok(stmts)
    }

    fn parse_block_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.current_span();
        let body = self.parse_block_body("to open block")?;
        Ok(Stmt::new(
            StmtKind::Block(body),
            start.merge(self.cursor.previous_span()),
        ))
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.advance().span;
        self.cursor.expect(&TokenKind::LParen, "after `if`")?;
        let cond = self.parse_expr()?;
        self.cursor.expect(&TokenKind::RParen, "after condition")?;
        let then_branch = Box::new(self.parse_block_stmt()?);
        let else_branch = if self.cursor.eat(&TokenKind::Else) {
            if self.cursor.check(&TokenKind::If) {
                Some(Box::new(self.parse_if()?))
            } else {
                Some(Box::new(self.parse_block_stmt()?))
            }
        } else {
            None
        };
        Ok(Stmt::new(
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            },
            start.merge(self.cursor.previous_span()),
        ))
    }

    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.advance().span;
        self.cursor.expect(&TokenKind::LParen, "after `while`")?;
        let cond = self.parse_expr()?;
        self.cursor.expect(&TokenKind::RParen, "after condition")?;
        let body = Box::new(self.parse_block_stmt()?);
        Ok(Stmt::new(
            StmtKind::While { cond, body },
            start.merge(self.cursor.previous_span()),
        ))
    }

    /// `for (init; cond; step) { body }` with every clause optional.
    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.advance().span;
        self.cursor.expect(&TokenKind::LParen, "after `for`")?;

        let init = match self.cursor.current_kind() {
            TokenKind::Semicolon => {
                self.cursor.advance();
                None
            }
            TokenKind::Let => Some(Box::new(self.parse_binding(false)?)),
            TokenKind::Const => Some(Box::new(self.parse_binding(true)?)),
            _ => {
                let expr = self.parse_expr()?;
                self.cursor
                    .expect(&TokenKind::Semicolon, "after loop initializer")?;
                let span = expr.span;
                Some(Box::new(Stmt::new(StmtKind::Expr(expr), span)))
            }
        };

        let cond = if self.cursor.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.cursor
            .expect(&TokenKind::Semicolon, "after loop condition")?;

        let step = if self.cursor.check(&TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.cursor.expect(&TokenKind::RParen, "after for clauses")?;

        let body = Box::new(self.parse_block_stmt()?);
        Ok(Stmt::new(
            StmtKind::For {
                init,
                cond,
                step,
                body,
            },
            start.merge(self.cursor.previous_span()),
        ))
    }

    /// `break;` / `continue;`
    fn parse_jump(&mut self, kind: StmtKind) -> Result<Stmt, ParseError> {
        let start = self.cursor.advance().span;
        self.cursor.expect(&TokenKind::Semicolon, "after jump")?;
        Ok(Stmt::new(kind, start.merge(self.cursor.previous_span())))
    }

    fn parse_return(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.advance().span;
        let value = if self.cursor.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.cursor
            .expect(&TokenKind::Semicolon, "after return value")?;
        Ok(Stmt::new(
            StmtKind::Return(value),
            start.merge(self.cursor.previous_span()),
        ))
    }

    /// `import { a, b as c } from "path";` or `import * as ns from "path";`
    fn parse_import(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.advance().span;
        let kind = if self.cursor.eat(&TokenKind::Star) {
            self.cursor.expect(&TokenKind::As, "after `*`")?;
            ImportKind::Namespace(self.cursor.expect_ident("as namespace name")?)
        } else {
            self.cursor
                .expect(&TokenKind::LBrace, "or `*` after `import`")?;
            ImportKind::Named(self.parse_spec_list()?)
        };
        self.cursor.expect(&TokenKind::From, "after import list")?;
        let path = self.cursor.expect_string("as module path")?;
        self.cursor
            .expect(&TokenKind::Semicolon, "after import statement")?;
        Ok(Stmt::new(
            StmtKind::Import { kind, path },
            start.merge(self.cursor.previous_span()),
        ))
    }

    fn parse_export(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.advance().span;
        let kind = match self.cursor.current_kind() {
            TokenKind::Let => ExportKind::Declaration(Box::new(self.parse_binding(false)?)),
            TokenKind::Const => ExportKind::Declaration(Box::new(self.parse_binding(true)?)),
            TokenKind::Fn | TokenKind::Async => {
                ExportKind::Declaration(Box::new(self.parse_fn_decl()?))
            }
            TokenKind::LBrace => {
                self.cursor.advance();
                let specs = self.parse_spec_list()?;
                if self.cursor.eat(&TokenKind::From) {
                    let path = self.cursor.expect_string("as module path")?;
                    self.cursor
                        .expect(&TokenKind::Semicolon, "after export statement")?;
                    ExportKind::Reexport { specs, path }
                } else {
                    self.cursor
                        .expect(&TokenKind::Semicolon, "after export list")?;
                    ExportKind::List(specs)
                }
            }
            _ => {
                return Err(self
                    .cursor
                    .unexpected("declaration or export list", "after `export`"))
            }
        };
        Ok(Stmt::new(
            StmtKind::Export(kind),
            start.merge(self.cursor.previous_span()),
        ))
    }

    /// `name [as alias], ... }` (opening brace already consumed).
    fn parse_spec_list(&mut self) -> Result<Vec<BindingSpec>, ParseError> {
        let mut specs = Vec::new();
        while !self.cursor.check(&TokenKind::RBrace) {
            let name = self.cursor.expect_ident("in binding list")?;
            let alias = if self.cursor.eat(&TokenKind::As) {
                Some(self.cursor.expect_ident("after `as`")?)
            } else {
                None
            };
            specs.push(BindingSpec { name, alias });
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.cursor
            .expect(&TokenKind::RBrace, "after binding list")?;
        Ok(specs)
    }
}
