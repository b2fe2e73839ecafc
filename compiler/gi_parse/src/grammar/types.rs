//! Type expressions, signatures and parameter lists.

use crate::{ParseFailure, Parser};
use gi_ir::ast::{
    ChanDir, FieldDecl, FuncSig, Ident, InterfaceElem, Param, TypeExpr, TypeExprKind,
};
use gi_ir::{ErrorCode, Span, TokenKind};

/// One comma-separated entry of a parameter list before grouping.
struct ParamEntry {
    name: Option<Ident>,
    ty: Option<TypeExpr>,
    variadic: bool,
    span: Span,
}

impl Parser<'_> {
    pub(crate) fn parse_type(&mut self) -> Result<TypeExpr, ParseFailure> {
        match self.try_parse_type()? {
            Some(ty) => Ok(ty),
            None => Err(self.cursor.unexpected_code("type", ErrorCode::E1003)),
        }
    }

    /// Parse a type if the current token can start one.
    pub(crate) fn try_parse_type(&mut self) -> Result<Option<TypeExpr>, ParseFailure> {
        gi_stack::with_stack(|| {
            let start = self.cursor.span();
            let kind = match self.cursor.kind() {
                TokenKind::Ident(name) => {
                    self.cursor.advance();
                    if self.cursor.eat(TokenKind::Dot) {
                        let member = self.cursor.expect_ident()?;
                        TypeExprKind::Qualified {
                            package: name,
                            name: member.name,
                        }
                    } else {
                        TypeExprKind::Named(name)
                    }
                }
                TokenKind::Star => {
                    self.cursor.advance();
                    TypeExprKind::Pointer(Box::new(self.parse_type()?))
                }
                TokenKind::LBracket => {
                    self.cursor.advance();
                    if self.cursor.eat(TokenKind::RBracket) {
                        TypeExprKind::Slice(Box::new(self.parse_type()?))
                    } else {
                        let len = if self.cursor.eat(TokenKind::Ellipsis) {
                            None
                        } else {
                            Some(self.nested(Self::parse_expr)?)
                        };
                        self.cursor.expect(TokenKind::RBracket)?;
                        TypeExprKind::Array {
                            len,
                            elem: Box::new(self.parse_type()?),
                        }
                    }
                }
                TokenKind::Map => {
                    self.cursor.advance();
                    self.cursor.expect(TokenKind::LBracket)?;
                    let key = self.parse_type()?;
                    self.cursor.expect(TokenKind::RBracket)?;
                    TypeExprKind::Map {
                        key: Box::new(key),
                        value: Box::new(self.parse_type()?),
                    }
                }
                TokenKind::Chan => {
                    self.cursor.advance();
                    let dir = if self.cursor.eat(TokenKind::Arrow) {
                        ChanDir::Send
                    } else {
                        ChanDir::Both
                    };
                    TypeExprKind::Chan {
                        dir,
                        elem: Box::new(self.parse_type()?),
                    }
                }
                TokenKind::Arrow if self.cursor.peek(1) == TokenKind::Chan => {
                    self.cursor.advance();
                    self.cursor.advance();
                    TypeExprKind::Chan {
                        dir: ChanDir::Recv,
                        elem: Box::new(self.parse_type()?),
                    }
                }
                TokenKind::Func => {
                    self.cursor.advance();
                    TypeExprKind::Func(self.parse_signature()?)
                }
                TokenKind::Struct => {
                    self.cursor.advance();
                    TypeExprKind::Struct(self.parse_struct_fields()?)
                }
                TokenKind::Interface => {
                    self.cursor.advance();
                    TypeExprKind::Interface(self.parse_interface_elems()?)
                }
                TokenKind::LParen => {
                    self.cursor.advance();
                    let inner = self.parse_type()?;
                    self.cursor.expect(TokenKind::RParen)?;
                    return Ok(Some(inner));
                }
                _ => return Ok(None),
            };
            Ok(Some(TypeExpr {
                kind,
                span: start.merge(self.cursor.previous_span()),
            }))
        })
    }

    /// Whether the current token can begin a type.
    pub(crate) fn at_type_start(&self) -> bool {
        match self.cursor.kind() {
            TokenKind::Ident(_)
            | TokenKind::Star
            | TokenKind::LBracket
            | TokenKind::Map
            | TokenKind::Chan
            | TokenKind::Func
            | TokenKind::Struct
            | TokenKind::Interface
            | TokenKind::LParen => true,
            TokenKind::Arrow => self.cursor.peek(1) == TokenKind::Chan,
            _ => false,
        }
    }

    fn parse_struct_fields(&mut self) -> Result<Vec<FieldDecl>, ParseFailure> {
        self.cursor.expect(TokenKind::LBrace)?;
        let mut fields = Vec::new();
        loop {
            self.skip_semicolons();
            if self.cursor.check(TokenKind::RBrace) {
                break;
            }
            fields.push(self.parse_field_decl()?);
            if !self.cursor.check(TokenKind::RBrace) {
                self.cursor.expect(TokenKind::Semicolon)?;
            }
        }
        self.cursor.expect(TokenKind::RBrace)?;
        Ok(fields)
    }

    fn parse_field_decl(&mut self) -> Result<FieldDecl, ParseFailure> {
        let start = self.cursor.span();
        let embedded = match self.cursor.kind() {
            TokenKind::Star => true,
            TokenKind::Ident(_) => matches!(
                self.cursor.peek(1),
                TokenKind::Dot | TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Str(_)
            ),
            _ => return Err(self.cursor.unexpected("field name or embedded type")),
        };
        let (names, ty) = if embedded {
            (Vec::new(), self.parse_type()?)
        } else {
            let mut names = vec![self.cursor.expect_ident()?];
            while self.cursor.eat(TokenKind::Comma) {
                names.push(self.cursor.expect_ident()?);
            }
            (names, self.parse_type()?)
        };
        let tag = match self.cursor.kind() {
            TokenKind::Str(tag) => {
                self.cursor.advance();
                Some(tag)
            }
            _ => None,
        };
        Ok(FieldDecl {
            names,
            ty,
            tag,
            span: start.merge(self.cursor.previous_span()),
        })
    }

    fn parse_interface_elems(&mut self) -> Result<Vec<InterfaceElem>, ParseFailure> {
        self.cursor.expect(TokenKind::LBrace)?;
        let mut elems = Vec::new();
        loop {
            self.skip_semicolons();
            if self.cursor.check(TokenKind::RBrace) {
                break;
            }
            if self.cursor.check_ident() && self.cursor.peek(1) == TokenKind::LParen {
                let name = self.cursor.expect_ident()?;
                let sig = self.parse_signature()?;
                elems.push(InterfaceElem::Method { name, sig });
            } else {
                elems.push(InterfaceElem::Embed(self.parse_type()?));
            }
            if !self.cursor.check(TokenKind::RBrace) {
                self.cursor.expect(TokenKind::Semicolon)?;
            }
        }
        self.cursor.expect(TokenKind::RBrace)?;
        Ok(elems)
    }

    /// Parameters and results, starting at `(`.
    pub(crate) fn parse_signature(&mut self) -> Result<FuncSig, ParseFailure> {
        let start = self.cursor.span();
        let (params, variadic) = self.parse_params()?;
        let results = self.parse_results()?;
        Ok(FuncSig {
            params,
            results,
            variadic,
            span: start.merge(self.cursor.previous_span()),
        })
    }

    pub(crate) fn parse_results(&mut self) -> Result<Vec<Param>, ParseFailure> {
        if self.cursor.check(TokenKind::LParen) {
            let (results, _) = self.parse_params()?;
            return Ok(results);
        }
        if self.at_type_start() {
            let ty = self.parse_type()?;
            return Ok(vec![Param { name: None, ty }]);
        }
        Ok(Vec::new())
    }

    /// `( ... )` parameter list. Returns the grouped parameters and whether
    /// the last one was variadic.
    ///
    /// Entries are collected first and grouped afterwards: `(a, b int)` names
    /// two `int` parameters while `(a, b)` lists two unnamed types.
    pub(crate) fn parse_params(&mut self) -> Result<(Vec<Param>, bool), ParseFailure> {
        self.cursor.expect(TokenKind::LParen)?;
        let mut entries = Vec::new();
        while !self.cursor.check(TokenKind::RParen) {
            entries.push(self.parse_param_entry()?);
            if !self.cursor.check(TokenKind::RParen) {
                self.cursor.expect(TokenKind::Comma)?;
            }
        }
        self.cursor.expect(TokenKind::RParen)?;

        let variadic = entries.last().is_some_and(|e| e.variadic);
        if let Some(e) = entries.iter().rev().skip(1).find(|e| e.variadic) {
            return Err(ParseFailure::at(
                e.span,
                ErrorCode::E1006,
                "can only use ... with final parameter in list",
            ));
        }

        let named = entries.iter().any(|e| e.name.is_some() && e.ty.is_some());
        if !named {
            let params = entries
                .into_iter()
                .map(|e| {
                    let ty = match (e.ty, e.name) {
                        (Some(ty), _) => ty,
                        (None, Some(name)) => TypeExpr {
                            kind: TypeExprKind::Named(name.name),
                            span: name.span,
                        },
                        (None, None) => TypeExpr {
                            kind: TypeExprKind::Named(gi_ir::Name::BLANK),
                            span: e.span,
                        },
                    };
                    Param { name: None, ty }
                })
                .collect();
            return Ok((params, variadic));
        }

        // Named form: a bare name borrows the type of the next typed entry.
        let mut params = Vec::with_capacity(entries.len());
        let mut group_ty: Option<TypeExpr> = None;
        for entry in entries.into_iter().rev() {
            let Some(name) = entry.name else {
                return Err(ParseFailure::at(
                    entry.span,
                    ErrorCode::E1006,
                    "mixed named and unnamed parameters",
                ));
            };
            if let Some(ty) = entry.ty {
                group_ty = Some(ty);
            }
            let Some(ty) = group_ty.clone() else {
                return Err(ParseFailure::at(
                    entry.span,
                    ErrorCode::E1006,
                    "mixed named and unnamed parameters",
                ));
            };
            params.push(Param {
                name: Some(name),
                ty,
            });
        }
        params.reverse();
        Ok((params, variadic))
    }

    fn parse_param_entry(&mut self) -> Result<ParamEntry, ParseFailure> {
        let start = self.cursor.span();
        if self.cursor.eat(TokenKind::Ellipsis) {
            let ty = self.parse_type()?;
            return Ok(ParamEntry {
                name: None,
                ty: Some(ty),
                variadic: true,
                span: start.merge(self.cursor.previous_span()),
            });
        }
        if let TokenKind::Ident(_) = self.cursor.kind() {
            if self.cursor.peek(1) == TokenKind::Dot {
                let ty = self.parse_type()?;
                return Ok(ParamEntry {
                    name: None,
                    ty: Some(ty),
                    variadic: false,
                    span: start.merge(self.cursor.previous_span()),
                });
            }
            let name = self.cursor.expect_ident()?;
            let (ty, variadic) = match self.cursor.kind() {
                TokenKind::Comma | TokenKind::RParen => (None, false),
                TokenKind::Ellipsis => {
                    self.cursor.advance();
                    (Some(self.parse_type()?), true)
                }
                _ => (Some(self.parse_type()?), false),
            };
            return Ok(ParamEntry {
                name: Some(name),
                ty,
                variadic,
                span: start.merge(self.cursor.previous_span()),
            });
        }
        let ty = self.parse_type()?;
        Ok(ParamEntry {
            name: None,
            ty: Some(ty),
            variadic: false,
            span: start.merge(self.cursor.previous_span()),
        })
    }
}
