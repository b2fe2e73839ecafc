//! Statements and blocks.

use crate::{ParseFailure, Parser};
use gi_ir::ast::{
    AssignOp, Block, BranchKind, CaseClause, CommClause, ExprKind, Ident, Stmt, StmtKind,
    TypeCaseClause, TypeExprKind,
};
use gi_ir::{ErrorCode, ExprId, Span, TokenKind};

/// Result of parsing a simple statement in a `for` header, where
/// `k, v := range x` is also allowed.
enum Header {
    Simple(Stmt),
    Range {
        key: Option<ExprId>,
        value: Option<ExprId>,
        define: bool,
        expr: ExprId,
    },
}

enum ForHeader {
    Clauses {
        init: Option<Box<Stmt>>,
        cond: Option<ExprId>,
        post: Option<Box<Stmt>>,
    },
    Range {
        key: Option<ExprId>,
        value: Option<ExprId>,
        define: bool,
        expr: ExprId,
    },
}

impl Parser<'_> {
    pub(crate) fn parse_stmt(&mut self) -> Result<Stmt, ParseFailure> {
        gi_stack::with_stack(|| {
            let start = self.cursor.span();
            let kind = match self.cursor.kind() {
                TokenKind::Const | TokenKind::Var | TokenKind::Type => {
                    return self.parse_decl_stmt();
                }
                TokenKind::LBrace => StmtKind::Block(self.parse_block()?),
                TokenKind::If => return self.parse_if(),
                TokenKind::For => return self.parse_for(),
                TokenKind::Switch => return self.parse_switch(),
                TokenKind::Select => return self.parse_select(),
                TokenKind::Go => {
                    self.cursor.advance();
                    StmtKind::Go(self.parse_expr()?)
                }
                TokenKind::Defer => {
                    self.cursor.advance();
                    StmtKind::Defer(self.parse_expr()?)
                }
                TokenKind::Return => {
                    self.cursor.advance();
                    let values = if matches!(
                        self.cursor.kind(),
                        TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof
                    ) {
                        Vec::new()
                    } else {
                        self.parse_expr_list()?
                    };
                    StmtKind::Return(values)
                }
                TokenKind::Break => self.parse_branch(BranchKind::Break)?,
                TokenKind::Continue => self.parse_branch(BranchKind::Continue)?,
                TokenKind::Goto => self.parse_branch(BranchKind::Goto)?,
                TokenKind::Fallthrough => {
                    self.cursor.advance();
                    StmtKind::Branch {
                        kind: BranchKind::Fallthrough,
                        label: None,
                    }
                }
                TokenKind::Semicolon => StmtKind::Empty,
                TokenKind::Ident(name) if self.cursor.peek(1) == TokenKind::Colon => {
                    let label_span = self.cursor.advance().span;
                    self.cursor.advance();
                    let stmt = if matches!(
                        self.cursor.kind(),
                        TokenKind::RBrace | TokenKind::Eof
                    ) {
                        Stmt {
                            kind: StmtKind::Empty,
                            span: Span::point(self.cursor.span().start),
                        }
                    } else {
                        self.parse_stmt()?
                    };
                    StmtKind::Labeled {
                        label: Ident::new(name, label_span),
                        stmt: Box::new(stmt),
                    }
                }
                _ => return self.parse_simple_stmt(),
            };
            Ok(Stmt {
                kind,
                span: start.merge(self.cursor.previous_span()),
            })
        })
    }

    fn parse_branch(&mut self, kind: BranchKind) -> Result<StmtKind, ParseFailure> {
        self.cursor.advance();
        let label = if self.cursor.check_ident() {
            Some(self.cursor.expect_ident()?)
        } else if kind == BranchKind::Goto {
            return Err(self.cursor.unexpected("label"));
        } else {
            None
        };
        Ok(StmtKind::Branch { kind, label })
    }

    /// `{ stmt; stmt; ... }`. Composite literals are re-enabled inside.
    pub(crate) fn parse_block(&mut self) -> Result<Block, ParseFailure> {
        let open = self.cursor.expect(TokenKind::LBrace)?;
        let saved = self.expr_lev;
        self.expr_lev = 0;
        let stmts = self.parse_stmt_list();
        self.expr_lev = saved;
        let stmts = stmts?;
        let close = self.cursor.expect(TokenKind::RBrace)?;
        Ok(Block {
            stmts,
            span: open.merge(close),
        })
    }

    /// Statements up to a closing `}` or the next `case`/`default`.
    fn parse_stmt_list(&mut self) -> Result<Vec<Stmt>, ParseFailure> {
        let mut stmts = Vec::new();
        loop {
            self.skip_semicolons();
            if matches!(
                self.cursor.kind(),
                TokenKind::RBrace | TokenKind::Case | TokenKind::Default | TokenKind::Eof
            ) {
                return Ok(stmts);
            }
            stmts.push(self.parse_stmt()?);
            if !matches!(
                self.cursor.kind(),
                TokenKind::RBrace | TokenKind::Case | TokenKind::Default
            ) {
                if !self.cursor.check(TokenKind::Semicolon) {
                    return Err(self.cursor.unexpected("; or }"));
                }
                self.cursor.advance();
            }
        }
    }

    pub(crate) fn parse_simple_stmt(&mut self) -> Result<Stmt, ParseFailure> {
        match self.parse_header(false)? {
            Header::Simple(stmt) => Ok(stmt),
            Header::Range { expr, .. } => Err(ParseFailure::at(
                self.span_of(expr),
                ErrorCode::E1006,
                "range clause outside for statement",
            )),
        }
    }

    /// Finish a simple statement whose first expression is already parsed.
    pub(crate) fn parse_simple_stmt_from(&mut self, first: ExprId) -> Result<Stmt, ParseFailure> {
        let mut lhs = vec![first];
        while self.cursor.eat(TokenKind::Comma) {
            lhs.push(self.parse_expr()?);
        }
        match self.finish_simple(lhs, false)? {
            Header::Simple(stmt) => Ok(stmt),
            Header::Range { expr, .. } => Err(ParseFailure::at(
                self.span_of(expr),
                ErrorCode::E1006,
                "range clause outside for statement",
            )),
        }
    }

    fn parse_header(&mut self, range_ok: bool) -> Result<Header, ParseFailure> {
        let lhs = self.parse_expr_list()?;
        self.finish_simple(lhs, range_ok)
    }

    fn finish_simple(&mut self, lhs: Vec<ExprId>, range_ok: bool) -> Result<Header, ParseFailure> {
        let start = self.span_of(lhs[0]);
        let kind = self.cursor.kind();
        let kind = match kind {
            TokenKind::ColonEq => {
                self.cursor.advance();
                if range_ok && self.cursor.check(TokenKind::Range) {
                    return self.finish_range(lhs, true);
                }
                let names = lhs
                    .iter()
                    .map(|&id| match self.arena.kind(id) {
                        ExprKind::Ident(name) => Ok(Ident::new(*name, self.span_of(id))),
                        _ => Err(ParseFailure::at(
                            self.span_of(id),
                            ErrorCode::E1006,
                            "non-name on left side of :=",
                        )),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                let values = self.parse_expr_list()?;
                StmtKind::ShortVarDecl { names, values }
            }
            TokenKind::Inc | TokenKind::Dec => {
                self.single_operand(&lhs, kind)?;
                self.cursor.advance();
                StmtKind::IncDec {
                    target: lhs[0],
                    inc: kind == TokenKind::Inc,
                }
            }
            TokenKind::Arrow => {
                self.single_operand(&lhs, kind)?;
                self.cursor.advance();
                let value = self.parse_expr()?;
                StmtKind::Send {
                    chan: lhs[0],
                    value,
                }
            }
            other => {
                if let Some(op) = AssignOp::from_token(&other) {
                    self.cursor.advance();
                    if op == AssignOp::Assign && range_ok && self.cursor.check(TokenKind::Range) {
                        return self.finish_range(lhs, false);
                    }
                    if op != AssignOp::Assign {
                        self.single_operand(&lhs, other)?;
                    }
                    let rhs = self.parse_expr_list()?;
                    StmtKind::Assign { lhs, op, rhs }
                } else {
                    if lhs.len() > 1 {
                        return Err(self.cursor.unexpected(":= or = or comma"));
                    }
                    StmtKind::Expr(lhs[0])
                }
            }
        };
        Ok(Header::Simple(Stmt {
            kind,
            span: start.merge(self.cursor.previous_span()),
        }))
    }

    fn single_operand(&self, lhs: &[ExprId], op: TokenKind) -> Result<(), ParseFailure> {
        if lhs.len() == 1 {
            return Ok(());
        }
        Err(ParseFailure::at(
            self.cursor.span(),
            ErrorCode::E1006,
            format!("unexpected {}, expected := or = or comma", op.symbol()),
        ))
    }

    fn finish_range(&mut self, lhs: Vec<ExprId>, define: bool) -> Result<Header, ParseFailure> {
        if lhs.len() > 2 {
            return Err(ParseFailure::at(
                self.span_of(lhs[2]),
                ErrorCode::E1006,
                "range clause permits at most two iteration variables",
            ));
        }
        self.cursor.expect(TokenKind::Range)?;
        let expr = self.parse_expr()?;
        Ok(Header::Range {
            key: lhs.first().copied(),
            value: lhs.get(1).copied(),
            define,
            expr,
        })
    }

    /// The statement in a header must be an expression to serve as a condition.
    fn header_condition(&self, stmt: Stmt, what: &str) -> Result<ExprId, ParseFailure> {
        match stmt.kind {
            StmtKind::Expr(cond) => Ok(cond),
            _ => Err(ParseFailure::at(
                stmt.span,
                ErrorCode::E1006,
                format!("cannot use statement as value in {what}"),
            )),
        }
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseFailure> {
        let start = self.cursor.expect(TokenKind::If)?;
        let (init, cond) = self.control_header(|p| {
            if p.cursor.check(TokenKind::LBrace) {
                return Err(ParseFailure::at(
                    p.cursor.span(),
                    ErrorCode::E1006,
                    "missing condition in if statement",
                ));
            }
            let first = if p.cursor.check(TokenKind::Semicolon) {
                None
            } else {
                Some(p.parse_simple_stmt()?)
            };
            if p.cursor.eat(TokenKind::Semicolon) {
                if p.cursor.check(TokenKind::LBrace) {
                    return Err(ParseFailure::at(
                        p.cursor.span(),
                        ErrorCode::E1006,
                        "missing condition in if statement",
                    ));
                }
                let cond = p.parse_simple_stmt()?;
                let cond = p.header_condition(cond, "if statement")?;
                Ok((first.map(Box::new), cond))
            } else {
                match first {
                    Some(stmt) => Ok((None, p.header_condition(stmt, "if statement")?)),
                    None => Err(p.cursor.unexpected("condition")),
                }
            }
        })?;
        let then = self.parse_block()?;
        let els = if self.cursor.eat(TokenKind::Else) {
            match self.cursor.kind() {
                TokenKind::If => Some(Box::new(self.parse_if()?)),
                TokenKind::LBrace => {
                    let block = self.parse_block()?;
                    let span = block.span;
                    Some(Box::new(Stmt {
                        kind: StmtKind::Block(block),
                        span,
                    }))
                }
                _ => return Err(self.cursor.unexpected("if statement or block")),
            }
        } else {
            None
        };
        Ok(Stmt {
            kind: StmtKind::If {
                init,
                cond,
                then,
                els,
            },
            span: start.merge(self.cursor.previous_span()),
        })
    }

    fn parse_for(&mut self) -> Result<Stmt, ParseFailure> {
        let start = self.cursor.expect(TokenKind::For)?;
        let header = self.control_header(Self::parse_for_header)?;
        let body = self.parse_block()?;
        let kind = match header {
            ForHeader::Clauses { init, cond, post } => StmtKind::For {
                init,
                cond,
                post,
                body,
            },
            ForHeader::Range {
                key,
                value,
                define,
                expr,
            } => StmtKind::ForRange {
                key,
                value,
                define,
                expr,
                body,
            },
        };
        Ok(Stmt {
            kind,
            span: start.merge(self.cursor.previous_span()),
        })
    }

    fn parse_for_header(&mut self) -> Result<ForHeader, ParseFailure> {
        if self.cursor.check(TokenKind::LBrace) {
            return Ok(ForHeader::Clauses {
                init: None,
                cond: None,
                post: None,
            });
        }
        if self.cursor.eat(TokenKind::Range) {
            let expr = self.parse_expr()?;
            return Ok(ForHeader::Range {
                key: None,
                value: None,
                define: false,
                expr,
            });
        }
        let first = if self.cursor.check(TokenKind::Semicolon) {
            None
        } else {
            match self.parse_header(true)? {
                Header::Simple(stmt) => Some(stmt),
                Header::Range {
                    key,
                    value,
                    define,
                    expr,
                } => {
                    return Ok(ForHeader::Range {
                        key,
                        value,
                        define,
                        expr,
                    })
                }
            }
        };
        if !self.cursor.eat(TokenKind::Semicolon) {
            return match first {
                Some(stmt) => Ok(ForHeader::Clauses {
                    init: None,
                    cond: Some(self.header_condition(stmt, "for statement")?),
                    post: None,
                }),
                None => Err(self.cursor.unexpected("for loop condition")),
            };
        }
        let cond = if self.cursor.check(TokenKind::Semicolon) {
            None
        } else {
            let stmt = self.parse_simple_stmt()?;
            Some(self.header_condition(stmt, "for statement")?)
        };
        self.cursor.expect(TokenKind::Semicolon)?;
        let post = if self.cursor.check(TokenKind::LBrace) {
            None
        } else {
            Some(Box::new(self.parse_simple_stmt()?))
        };
        Ok(ForHeader::Clauses {
            init: first.map(Box::new),
            cond,
            post,
        })
    }

    fn parse_switch(&mut self) -> Result<Stmt, ParseFailure> {
        let start = self.cursor.expect(TokenKind::Switch)?;
        let (init, tag) = self.control_header(|p| {
            let mut init = None;
            let mut tag = None;
            if !p.cursor.check(TokenKind::LBrace) {
                if !p.cursor.check(TokenKind::Semicolon) {
                    tag = Some(p.parse_simple_stmt()?);
                }
                if p.cursor.eat(TokenKind::Semicolon) {
                    init = tag.take();
                    if !p.cursor.check(TokenKind::LBrace) {
                        tag = Some(p.parse_simple_stmt()?);
                    }
                }
            }
            Ok((init.map(Box::new), tag))
        })?;

        if let Some((binding, subject)) = tag.as_ref().and_then(|t| self.type_switch_guard(t)) {
            let clauses = self.parse_clauses(Self::parse_type_case_clause)?;
            return Ok(Stmt {
                kind: StmtKind::TypeSwitch {
                    init,
                    binding,
                    subject,
                    clauses,
                },
                span: start.merge(self.cursor.previous_span()),
            });
        }

        let tag = match tag {
            Some(stmt) => Some(self.header_condition(stmt, "switch statement")?),
            None => None,
        };
        let clauses = self.parse_clauses(Self::parse_case_clause)?;
        Ok(Stmt {
            kind: StmtKind::Switch { init, tag, clauses },
            span: start.merge(self.cursor.previous_span()),
        })
    }

    /// `x.(type)` or `v := x.(type)` as a switch guard.
    fn type_switch_guard(&self, stmt: &Stmt) -> Option<(Option<Ident>, ExprId)> {
        let (binding, guard) = match &stmt.kind {
            StmtKind::Expr(e) => (None, *e),
            StmtKind::ShortVarDecl { names, values } if names.len() == 1 && values.len() == 1 => {
                (Some(names[0]), values[0])
            }
            _ => return None,
        };
        match self.arena.kind(self.arena.unparen(guard)) {
            ExprKind::TypeAssert { base, ty: None } => Some((binding, *base)),
            _ => None,
        }
    }

    fn parse_clauses<C>(
        &mut self,
        mut clause: impl FnMut(&mut Self) -> Result<C, ParseFailure>,
    ) -> Result<Vec<C>, ParseFailure> {
        self.cursor.expect(TokenKind::LBrace)?;
        let mut clauses = Vec::new();
        loop {
            self.skip_semicolons();
            if matches!(self.cursor.kind(), TokenKind::RBrace | TokenKind::Eof) {
                break;
            }
            clauses.push(clause(self)?);
        }
        self.cursor.expect(TokenKind::RBrace)?;
        Ok(clauses)
    }

    fn parse_case_clause(&mut self) -> Result<CaseClause, ParseFailure> {
        let start = self.cursor.span();
        let (exprs, is_default) = if self.cursor.eat(TokenKind::Case) {
            (self.parse_expr_list()?, false)
        } else if self.cursor.eat(TokenKind::Default) {
            (Vec::new(), true)
        } else {
            return Err(self.cursor.unexpected("case or default or }"));
        };
        self.cursor.expect(TokenKind::Colon)?;
        let body = self.parse_stmt_list()?;
        Ok(CaseClause {
            exprs,
            is_default,
            body,
            span: start.merge(self.cursor.previous_span()),
        })
    }

    fn parse_type_case_clause(&mut self) -> Result<TypeCaseClause, ParseFailure> {
        let start = self.cursor.span();
        let (types, is_default) = if self.cursor.eat(TokenKind::Case) {
            let mut types = Vec::new();
            loop {
                let ty = self.parse_type()?;
                let is_nil = matches!(
                    ty.kind,
                    TypeExprKind::Named(name) if self.cursor.interner().lookup(name) == "nil"
                );
                types.push(if is_nil { None } else { Some(ty) });
                if !self.cursor.eat(TokenKind::Comma) {
                    break;
                }
            }
            (types, false)
        } else if self.cursor.eat(TokenKind::Default) {
            (Vec::new(), true)
        } else {
            return Err(self.cursor.unexpected("case or default or }"));
        };
        self.cursor.expect(TokenKind::Colon)?;
        let body = self.parse_stmt_list()?;
        Ok(TypeCaseClause {
            types,
            is_default,
            body,
            span: start.merge(self.cursor.previous_span()),
        })
    }

    fn parse_select(&mut self) -> Result<Stmt, ParseFailure> {
        let start = self.cursor.expect(TokenKind::Select)?;
        let clauses = self.parse_clauses(|p| {
            let clause_start = p.cursor.span();
            let comm = if p.cursor.eat(TokenKind::Case) {
                Some(Box::new(p.parse_simple_stmt()?))
            } else if p.cursor.eat(TokenKind::Default) {
                None
            } else {
                return Err(p.cursor.unexpected("case or default or }"));
            };
            p.cursor.expect(TokenKind::Colon)?;
            let body = p.parse_stmt_list()?;
            Ok(CommClause {
                comm,
                body,
                span: clause_start.merge(p.cursor.previous_span()),
            })
        })?;
        Ok(Stmt {
            kind: StmtKind::Select { clauses },
            span: start.merge(self.cursor.previous_span()),
        })
    }
}
