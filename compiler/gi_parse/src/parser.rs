//! Parser state and the compilation-unit entry point.

use crate::cursor::Cursor;
use crate::ParseFailure;
use gi_ir::ast::{ExprKind, ImportSpec, Item, Unit};
use gi_ir::{ExprArena, ExprId, Span, StringInterner, TokenKind, TokenList};

/// Recursive-descent parser over one buffer.
///
/// Parsing stops at the first error: every production returns
/// `Result<_, ParseFailure>` and propagates with `?`.
pub struct Parser<'a> {
    pub(crate) cursor: Cursor<'a>,
    pub(crate) arena: ExprArena,
    /// Negative while parsing a control clause header, where `T {` opens the
    /// body rather than a composite literal.
    pub(crate) expr_lev: i32,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a TokenList, interner: &'a StringInterner) -> Self {
        Parser {
            cursor: Cursor::new(tokens, interner),
            arena: ExprArena::new(),
            expr_lev: 0,
        }
    }

    /// Parse a whole buffer: optional `package` clause, imports, then any
    /// sequence of declarations and statements.
    pub fn parse_unit(mut self) -> Result<Unit, ParseFailure> {
        let start = self.cursor.span().start;
        self.skip_semicolons();

        let package = if self.cursor.eat(TokenKind::Package) {
            let name = self.cursor.expect_ident()?;
            self.expect_terminator()?;
            Some(name)
        } else {
            None
        };

        let mut imports = Vec::new();
        while self.cursor.check(TokenKind::Import) {
            self.parse_import_decl(&mut imports)?;
            self.expect_terminator()?;
        }

        let mut items = Vec::new();
        while !self.cursor.is_at_end() {
            items.push(self.parse_item()?);
            self.expect_terminator()?;
        }

        if self.cursor.is_incomplete() {
            return Err(self.cursor.incomplete_failure());
        }

        let end = self.cursor.span().end;
        Ok(Unit {
            package,
            imports,
            items,
            arena: self.arena,
            span: Span::new(start, end),
        })
    }

    fn parse_item(&mut self) -> Result<Item, ParseFailure> {
        match self.cursor.kind() {
            TokenKind::Const | TokenKind::Var | TokenKind::Type => {
                Ok(Item::Decl(self.parse_decl()?))
            }
            TokenKind::Func if matches!(self.cursor.peek(1), TokenKind::Ident(_)) => {
                Ok(Item::Decl(self.parse_func_decl()?))
            }
            TokenKind::Func if self.cursor.peek(1) == TokenKind::LParen => self.parse_func_item(),
            TokenKind::Import => Err(self.cursor.unexpected("declaration or statement")),
            _ => Ok(Item::Stmt(self.parse_stmt()?)),
        }
    }

    fn parse_import_decl(&mut self, imports: &mut Vec<ImportSpec>) -> Result<(), ParseFailure> {
        self.cursor.expect(TokenKind::Import)?;
        if self.cursor.eat(TokenKind::LParen) {
            loop {
                self.skip_semicolons();
                if self.cursor.check(TokenKind::RParen) {
                    break;
                }
                imports.push(self.parse_import_spec()?);
                if !self.cursor.check(TokenKind::RParen) {
                    self.cursor.expect(TokenKind::Semicolon)?;
                }
            }
            self.cursor.expect(TokenKind::RParen)?;
        } else {
            imports.push(self.parse_import_spec()?);
        }
        Ok(())
    }

    fn parse_import_spec(&mut self) -> Result<ImportSpec, ParseFailure> {
        let start = self.cursor.span();
        let alias = if self.cursor.check_ident() {
            Some(self.cursor.expect_ident()?)
        } else {
            None
        };
        match self.cursor.kind() {
            TokenKind::Str(path) => {
                let end = self.cursor.advance().span;
                Ok(ImportSpec {
                    alias,
                    path,
                    span: start.merge(end),
                })
            }
            _ => Err(self.cursor.unexpected("import path")),
        }
    }

    /// Consume the `;` ending an item, or accept end of input.
    pub(crate) fn expect_terminator(&mut self) -> Result<(), ParseFailure> {
        if self.cursor.eat(TokenKind::Semicolon) {
            self.skip_semicolons();
            Ok(())
        } else if self.cursor.is_at_end() {
            Ok(())
        } else {
            Err(self.cursor.unexpected("end of statement"))
        }
    }

    pub(crate) fn skip_semicolons(&mut self) {
        while self.cursor.eat(TokenKind::Semicolon) {}
    }

    pub(crate) fn alloc(&mut self, kind: ExprKind, span: Span) -> ExprId {
        self.arena.alloc(kind, span)
    }

    pub(crate) fn span_of(&self, id: ExprId) -> Span {
        self.arena.span(id)
    }

    /// Run `f` with composite literals re-enabled, as inside brackets.
    pub(crate) fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseFailure>,
    ) -> Result<T, ParseFailure> {
        let saved = self.expr_lev;
        self.expr_lev = saved.max(0) + 1;
        let result = f(self);
        self.expr_lev = saved;
        result
    }

    /// Run `f` as a control clause header.
    pub(crate) fn control_header<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseFailure>,
    ) -> Result<T, ParseFailure> {
        let saved = self.expr_lev;
        self.expr_lev = -1;
        let result = f(self);
        self.expr_lev = saved;
        result
    }
}
