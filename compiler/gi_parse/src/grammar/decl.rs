//! Declarations: `const`, `var`, `type`, `func`.

use crate::{ParseFailure, Parser};
use gi_ir::ast::{
    ConstSpec, Decl, ExprKind, FuncDecl, FuncSig, Ident, Item, Param, Stmt, StmtKind,
    TypeExprKind, TypeSpec, VarSpec,
};
use gi_ir::{ErrorCode, Span, TokenKind};

impl Parser<'_> {
    pub(crate) fn parse_decl(&mut self) -> Result<Decl, ParseFailure> {
        match self.cursor.kind() {
            TokenKind::Const => {
                self.cursor.advance();
                let mut iota = 0;
                let specs = self.parse_group(|p| {
                    let spec = p.parse_const_spec(iota);
                    iota += 1;
                    spec
                })?;
                Ok(Decl::Const(specs))
            }
            TokenKind::Var => {
                self.cursor.advance();
                Ok(Decl::Var(self.parse_group(Self::parse_var_spec)?))
            }
            TokenKind::Type => {
                self.cursor.advance();
                Ok(Decl::Type(self.parse_group(Self::parse_type_spec)?))
            }
            _ => Err(self.cursor.unexpected("declaration")),
        }
    }

    /// A single spec, or a parenthesized `;`-separated group of them.
    fn parse_group<T>(
        &mut self,
        mut spec: impl FnMut(&mut Self) -> Result<T, ParseFailure>,
    ) -> Result<Vec<T>, ParseFailure> {
        if !self.cursor.eat(TokenKind::LParen) {
            return Ok(vec![spec(self)?]);
        }
        let mut specs = Vec::new();
        loop {
            self.skip_semicolons();
            if self.cursor.check(TokenKind::RParen) {
                break;
            }
            specs.push(spec(self)?);
            if !self.cursor.check(TokenKind::RParen) {
                self.cursor.expect(TokenKind::Semicolon)?;
            }
        }
        self.cursor.expect(TokenKind::RParen)?;
        Ok(specs)
    }

    fn parse_ident_list(&mut self) -> Result<Vec<Ident>, ParseFailure> {
        let mut names = vec![self.cursor.expect_ident()?];
        while self.cursor.eat(TokenKind::Comma) {
            names.push(self.cursor.expect_ident()?);
        }
        Ok(names)
    }

    fn parse_const_spec(&mut self, iota: u32) -> Result<ConstSpec, ParseFailure> {
        let start = self.cursor.span();
        let names = self.parse_ident_list()?;
        let ty = if self.cursor.check(TokenKind::Eq) || self.at_spec_end() {
            None
        } else {
            Some(self.parse_type()?)
        };
        let values = if self.cursor.eat(TokenKind::Eq) {
            self.parse_expr_list()?
        } else {
            if ty.is_some() {
                return Err(self.cursor.unexpected("="));
            }
            Vec::new()
        };
        Ok(ConstSpec {
            names,
            ty,
            values,
            iota,
            span: start.merge(self.cursor.previous_span()),
        })
    }

    fn parse_var_spec(&mut self) -> Result<VarSpec, ParseFailure> {
        let start = self.cursor.span();
        let names = self.parse_ident_list()?;
        let ty = if self.cursor.check(TokenKind::Eq) {
            None
        } else {
            Some(self.parse_type()?)
        };
        let values = if self.cursor.eat(TokenKind::Eq) {
            self.parse_expr_list()?
        } else {
            Vec::new()
        };
        Ok(VarSpec {
            names,
            ty,
            values,
            span: start.merge(self.cursor.previous_span()),
        })
    }

    fn parse_type_spec(&mut self) -> Result<TypeSpec, ParseFailure> {
        let start = self.cursor.span();
        let name = self.cursor.expect_ident()?;
        let alias = self.cursor.eat(TokenKind::Eq);
        let ty = self.parse_type()?;
        Ok(TypeSpec {
            name,
            alias,
            ty,
            span: start.merge(self.cursor.previous_span()),
        })
    }

    fn at_spec_end(&self) -> bool {
        matches!(
            self.cursor.kind(),
            TokenKind::Semicolon | TokenKind::RParen | TokenKind::Eof
        )
    }

    /// `func name(...) ...`
    pub(crate) fn parse_func_decl(&mut self) -> Result<Decl, ParseFailure> {
        let func_span = self.cursor.expect(TokenKind::Func)?;
        self.finish_func_decl(func_span, None)
    }

    /// `func (` at item start: a method declaration when the parameter list
    /// is followed by `Name(`, otherwise a function literal used as a
    /// statement, such as `func() { ... }()`.
    pub(crate) fn parse_func_item(&mut self) -> Result<Item, ParseFailure> {
        let func_span = self.cursor.expect(TokenKind::Func)?;
        let list_span = self.cursor.span();
        let (params, variadic) = self.parse_params()?;

        if self.cursor.check_ident() && self.cursor.peek(1) == TokenKind::LParen {
            let list_span = list_span.merge(self.cursor.previous_span());
            let receiver = single_receiver(params, variadic, list_span)?;
            return Ok(Item::Decl(self.finish_func_decl(func_span, Some(receiver))?));
        }

        let results = self.parse_results()?;
        let sig = FuncSig {
            params,
            results,
            variadic,
            span: list_span.merge(self.cursor.previous_span()),
        };
        if !self.cursor.check(TokenKind::LBrace) {
            return Err(self.cursor.unexpected("function body"));
        }
        let body = self.parse_block()?;
        let lit = self.alloc(
            ExprKind::FuncLit { sig, body },
            func_span.merge(self.cursor.previous_span()),
        );
        let expr = self.parse_postfix(lit)?;
        let expr = self.parse_binary_rest(expr, 1)?;
        let stmt = self.parse_simple_stmt_from(expr)?;
        Ok(Item::Stmt(stmt))
    }

    fn finish_func_decl(
        &mut self,
        func_span: Span,
        receiver: Option<Param>,
    ) -> Result<Decl, ParseFailure> {
        let name = self.cursor.expect_ident()?;
        let sig = self.parse_signature()?;
        let body = if self.cursor.check(TokenKind::LBrace) {
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(Decl::Func(FuncDecl {
            name,
            receiver,
            sig,
            body,
            span: func_span.merge(self.cursor.previous_span()),
        }))
    }

    /// Declarations inside function bodies.
    pub(crate) fn parse_decl_stmt(&mut self) -> Result<Stmt, ParseFailure> {
        let start = self.cursor.span();
        let decl = self.parse_decl()?;
        Ok(Stmt {
            kind: StmtKind::Decl(decl),
            span: start.merge(self.cursor.previous_span()),
        })
    }
}

fn single_receiver(
    mut params: Vec<Param>,
    variadic: bool,
    span: Span,
) -> Result<Param, ParseFailure> {
    if params.len() != 1 || variadic {
        let message = if params.is_empty() {
            "method has no receiver"
        } else {
            "method has multiple receivers"
        };
        return Err(ParseFailure::at(span, ErrorCode::E1005, message));
    }
    let receiver = params.remove(0);
    let base = match &receiver.ty.kind {
        TypeExprKind::Pointer(inner) => &inner.kind,
        other => other,
    };
    if !matches!(base, TypeExprKind::Named(_)) {
        return Err(ParseFailure::at(
            receiver.ty.span,
            ErrorCode::E1005,
            "receiver must be a type name or a pointer to one",
        ));
    }
    Ok(receiver)
}
