//! Expressions: precedence climbing over unary and postfix forms.

use crate::{ParseFailure, Parser};
use gi_ir::ast::{BinaryOp, Element, ExprKind, TypeExpr, TypeExprKind, UnaryOp};
use gi_ir::{ErrorCode, ExprId, Name, Span, TokenKind};

impl Parser<'_> {
    pub(crate) fn parse_expr(&mut self) -> Result<ExprId, ParseFailure> {
        gi_stack::with_stack(|| {
            let lhs = self.parse_unary()?;
            self.parse_binary_rest(lhs, 1)
        })
    }

    pub(crate) fn parse_expr_list(&mut self) -> Result<Vec<ExprId>, ParseFailure> {
        let mut exprs = vec![self.parse_expr()?];
        while self.cursor.eat(TokenKind::Comma) {
            exprs.push(self.parse_expr()?);
        }
        Ok(exprs)
    }

    /// Fold binary operators of precedence `min_prec` or higher onto `lhs`.
    pub(crate) fn parse_binary_rest(
        &mut self,
        mut lhs: ExprId,
        min_prec: u8,
    ) -> Result<ExprId, ParseFailure> {
        while let Some(op) = BinaryOp::from_token(&self.cursor.kind()) {
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            self.cursor.advance();
            let first = self.parse_unary()?;
            let rhs = self.parse_binary_rest(first, prec + 1)?;
            let span = self.span_of(lhs).merge(self.span_of(rhs));
            lhs = self.alloc(ExprKind::Binary { op, left: lhs, right: rhs }, span);
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<ExprId, ParseFailure> {
        gi_stack::with_stack(|| {
            let start = self.cursor.span();
            let Some(op) = UnaryOp::from_token(&self.cursor.kind()) else {
                let operand = self.parse_operand()?;
                return self.parse_postfix(operand);
            };
            // `<-chan T` is a type, not a receive.
            if op == UnaryOp::Recv && self.cursor.peek(1) == TokenKind::Chan {
                let ty = self.parse_type()?;
                let span = ty.span;
                let operand = self.alloc(ExprKind::Type(ty), span);
                return self.parse_postfix(operand);
            }
            self.cursor.advance();
            let operand = self.parse_unary()?;
            let span = start.merge(self.span_of(operand));
            Ok(self.alloc(ExprKind::Unary { op, operand }, span))
        })
    }

    fn parse_operand(&mut self) -> Result<ExprId, ParseFailure> {
        let token = self.cursor.current();
        let span = token.span;
        let kind = match token.kind {
            TokenKind::Int(v) => ExprKind::Int(v),
            TokenKind::Float(bits) => ExprKind::Float(bits),
            TokenKind::Str(s) => ExprKind::Str(s),
            TokenKind::Char(c) => ExprKind::Char(c),
            TokenKind::Ident(name) => ExprKind::Ident(name),
            TokenKind::LParen => {
                self.cursor.advance();
                // Also covers parenthesized types such as `(*T)(x)`.
                let inner = self.nested(Self::parse_expr)?;
                let close = self.cursor.expect(TokenKind::RParen)?;
                return Ok(self.alloc(ExprKind::Paren(inner), span.merge(close)));
            }
            TokenKind::Func => {
                self.cursor.advance();
                let sig = self.parse_signature()?;
                if self.cursor.check(TokenKind::LBrace) {
                    let body = self.parse_block()?;
                    let span = span.merge(self.cursor.previous_span());
                    return Ok(self.alloc(ExprKind::FuncLit { sig, body }, span));
                }
                let ty = TypeExpr {
                    span: span.merge(sig.span),
                    kind: TypeExprKind::Func(sig),
                };
                let span = ty.span;
                return Ok(self.alloc(ExprKind::Type(ty), span));
            }
            TokenKind::LBracket
            | TokenKind::Map
            | TokenKind::Chan
            | TokenKind::Struct
            | TokenKind::Interface => {
                let ty = self.parse_type()?;
                let span = ty.span;
                return Ok(self.alloc(ExprKind::Type(ty), span));
            }
            _ => return Err(self.cursor.unexpected_code("expression", ErrorCode::E1002)),
        };
        self.cursor.advance();
        Ok(self.alloc(kind, span))
    }

    /// Selectors, index and slice expressions, calls, type assertions and
    /// composite literals following an operand.
    pub(crate) fn parse_postfix(&mut self, mut expr: ExprId) -> Result<ExprId, ParseFailure> {
        loop {
            match self.cursor.kind() {
                TokenKind::Dot => {
                    self.cursor.advance();
                    expr = match self.cursor.kind() {
                        TokenKind::Ident(field) => {
                            let field_span = self.cursor.advance().span;
                            let span = self.span_of(expr).merge(field_span);
                            self.alloc(
                                ExprKind::Selector {
                                    base: expr,
                                    field,
                                    field_span,
                                },
                                span,
                            )
                        }
                        TokenKind::LParen => {
                            self.cursor.advance();
                            let ty = if self.cursor.eat(TokenKind::Type) {
                                None
                            } else {
                                Some(self.parse_type()?)
                            };
                            let close = self.cursor.expect(TokenKind::RParen)?;
                            let span = self.span_of(expr).merge(close);
                            self.alloc(ExprKind::TypeAssert { base: expr, ty }, span)
                        }
                        _ => return Err(self.cursor.unexpected("name or (")),
                    };
                }
                TokenKind::LBracket => {
                    self.cursor.advance();
                    expr = self.nested(|p| p.parse_index_or_slice(expr))?;
                }
                TokenKind::LParen => {
                    self.cursor.advance();
                    expr = self.nested(|p| p.parse_call_args(expr))?;
                }
                TokenKind::LBrace if self.starts_composite(expr) => {
                    let ty = self.literal_type(expr);
                    let start = self.span_of(expr);
                    expr = self.parse_composite_body(Some(ty), start)?;
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_index_or_slice(&mut self, base: ExprId) -> Result<ExprId, ParseFailure> {
        let low = if self.cursor.check(TokenKind::Colon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        let kind = if self.cursor.eat(TokenKind::Colon) {
            let high = if matches!(self.cursor.kind(), TokenKind::Colon | TokenKind::RBracket) {
                None
            } else {
                Some(self.parse_expr()?)
            };
            let max = if self.cursor.eat(TokenKind::Colon) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            ExprKind::Slice {
                base,
                low,
                high,
                max,
            }
        } else {
            match low {
                Some(index) => ExprKind::Index { base, index },
                None => return Err(self.cursor.unexpected_code("operand", ErrorCode::E1002)),
            }
        };
        let close = self.cursor.expect(TokenKind::RBracket)?;
        let span = self.span_of(base).merge(close);
        Ok(self.alloc(kind, span))
    }

    fn parse_call_args(&mut self, func: ExprId) -> Result<ExprId, ParseFailure> {
        let mut args = Vec::new();
        let mut spread = false;
        while !self.cursor.check(TokenKind::RParen) {
            args.push(self.parse_expr()?);
            if self.cursor.eat(TokenKind::Ellipsis) {
                spread = true;
            }
            if !self.cursor.check(TokenKind::RParen) {
                self.cursor.expect(TokenKind::Comma)?;
            }
        }
        let close = self.cursor.expect(TokenKind::RParen)?;
        let span = self.span_of(func).merge(close);
        Ok(self.alloc(ExprKind::Call { func, args, spread }, span))
    }

    /// `T{` opens a composite literal when `T` looks like a type. A bare type
    /// name does not inside a control clause header, where `{` opens the body.
    fn starts_composite(&self, expr: ExprId) -> bool {
        match self.arena.kind(expr) {
            ExprKind::Type(ty) => matches!(
                ty.kind,
                TypeExprKind::Slice(_)
                    | TypeExprKind::Array { .. }
                    | TypeExprKind::Map { .. }
                    | TypeExprKind::Struct(_)
            ),
            ExprKind::Ident(_) => self.expr_lev >= 0,
            ExprKind::Selector { base, .. } => {
                self.expr_lev >= 0 && matches!(self.arena.kind(*base), ExprKind::Ident(_))
            }
            _ => false,
        }
    }

    fn literal_type(&self, expr: ExprId) -> TypeExpr {
        let span = self.span_of(expr);
        let kind = match self.arena.kind(expr) {
            ExprKind::Type(ty) => return ty.clone(),
            ExprKind::Ident(name) => TypeExprKind::Named(*name),
            ExprKind::Selector { base, field, .. } => match self.arena.kind(*base) {
                ExprKind::Ident(package) => TypeExprKind::Qualified {
                    package: *package,
                    name: *field,
                },
                _ => TypeExprKind::Named(*field),
            },
            _ => TypeExprKind::Named(Name::BLANK),
        };
        TypeExpr { kind, span }
    }

    fn parse_composite_body(
        &mut self,
        ty: Option<TypeExpr>,
        start: Span,
    ) -> Result<ExprId, ParseFailure> {
        self.cursor.expect(TokenKind::LBrace)?;
        let elements = self.nested(|p| {
            let mut elements = Vec::new();
            while !p.cursor.check(TokenKind::RBrace) {
                let first = p.parse_element_value()?;
                let element = if p.cursor.eat(TokenKind::Colon) {
                    Element {
                        key: Some(first),
                        value: p.parse_element_value()?,
                    }
                } else {
                    Element {
                        key: None,
                        value: first,
                    }
                };
                elements.push(element);
                if !p.cursor.check(TokenKind::RBrace) {
                    p.cursor.expect(TokenKind::Comma)?;
                }
            }
            Ok(elements)
        })?;
        let close = self.cursor.expect(TokenKind::RBrace)?;
        Ok(self.alloc(ExprKind::CompositeLit { ty, elements }, start.merge(close)))
    }

    /// An element value or key; a bare `{` is a literal with elided type.
    fn parse_element_value(&mut self) -> Result<ExprId, ParseFailure> {
        if self.cursor.check(TokenKind::LBrace) {
            let start = self.cursor.span();
            return self.parse_composite_body(None, start);
        }
        self.parse_expr()
    }
}
