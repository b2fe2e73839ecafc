//! Type expressions to pool types.

use super::{Checker, LocalKind, Mode};
use crate::error::CheckResult;
use crate::universe::UniverseEntry;
use crate::{DeclKind, Field, InterfaceMethod, Signature, TypeId};
use gi_ir::ast::{FuncSig, InterfaceElem, TypeExpr, TypeExprKind};
use gi_ir::{ErrorCode, Name, Span};
use rustc_hash::FxHashSet;

impl Checker<'_> {
    pub(super) fn resolve_type(&mut self, texpr: &TypeExpr) -> CheckResult<TypeId> {
        gi_stack::with_stack(|| {
            let ty = self.resolve_type_inner(texpr)?;
            self.info.type_exprs.insert(texpr.span, ty);
            Ok(ty)
        })
    }

    fn resolve_type_inner(&mut self, texpr: &TypeExpr) -> CheckResult<TypeId> {
        match &texpr.kind {
            TypeExprKind::Named(name) => self.resolve_type_name(*name, texpr.span),
            TypeExprKind::Qualified { package, name } => {
                match self.table.lookup(*package) {
                    Some((id, decl)) if matches!(decl.kind, DeclKind::Package { .. }) => {
                        self.deps.insert(id);
                        Ok(TypeId::INVALID)
                    }
                    _ => Err(self.error(
                        ErrorCode::E2001,
                        texpr.span,
                        format!(
                            "undefined: {}.{}",
                            self.name_str(*package),
                            self.name_str(*name)
                        ),
                    )),
                }
            }
            TypeExprKind::Pointer(elem) => {
                let elem = self.resolve_type(elem)?;
                Ok(self.pool.pointer(elem))
            }
            TypeExprKind::Slice(elem) => {
                let elem = self.resolve_type(elem)?;
                Ok(self.pool.slice(elem))
            }
            TypeExprKind::Array { len: None, .. } => Err(self.error(
                ErrorCode::E2015,
                texpr.span,
                "invalid use of [...] array (outside a composite literal)",
            )),
            TypeExprKind::Array { len: Some(len), elem } => {
                let n = self.array_length(*len)?;
                let elem = self.resolve_type(elem)?;
                Ok(self.pool.array(n, elem))
            }
            TypeExprKind::Map { key, value } => {
                let key_ty = self.resolve_type(key)?;
                let value = self.resolve_type(value)?;
                if !key_ty.is_invalid() && !self.pool.is_comparable(key_ty) {
                    return Err(self.error(
                        ErrorCode::E2010,
                        key.span,
                        format!("invalid map key type {}", self.type_str(key_ty)),
                    ));
                }
                Ok(self.pool.map(key_ty, value))
            }
            TypeExprKind::Chan { dir, elem } => {
                let elem = self.resolve_type(elem)?;
                Ok(self.pool.chan(*dir, elem))
            }
            TypeExprKind::Func(sig) => self.resolve_signature(sig),
            TypeExprKind::Struct(decls) => {
                let mut fields = Vec::new();
                let mut seen = FxHashSet::default();
                for decl in decls {
                    let ty = self.resolve_type(&decl.ty)?;
                    if decl.is_embedded() {
                        let name = embedded_name(&decl.ty).unwrap_or(Name::EMPTY);
                        fields.push(self.field(&mut seen, name, ty, true, decl.tag, decl.span)?);
                    }
                    for ident in &decl.names {
                        fields.push(self.field(&mut seen, ident.name, ty, false, decl.tag, ident.span)?);
                    }
                }
                Ok(self.pool.structure(fields))
            }
            TypeExprKind::Interface(elems) => {
                let mut methods = Vec::new();
                for elem in elems {
                    match elem {
                        InterfaceElem::Method { name, sig } => {
                            let sig = self.resolve_signature(sig)?;
                            if methods.iter().any(|m: &InterfaceMethod| m.name == name.name) {
                                return Err(self.error(
                                    ErrorCode::E2015,
                                    name.span,
                                    format!("duplicate method {}", self.name_str(name.name)),
                                ));
                            }
                            methods.push(InterfaceMethod {
                                name: name.name,
                                sig,
                            });
                        }
                        InterfaceElem::Embed(embedded) => {
                            let ty = self.resolve_type(embedded)?;
                            match self.pool.interface_methods(ty) {
                                Some(inherited) => methods.extend(inherited.iter().cloned()),
                                None if ty.is_invalid() => {}
                                None => {
                                    return Err(self.error(
                                        ErrorCode::E2016,
                                        embedded.span,
                                        format!("{} is not an interface", self.type_str(ty)),
                                    ))
                                }
                            }
                        }
                    }
                }
                Ok(self.pool.interface(methods))
            }
        }
    }

    fn field(
        &self,
        seen: &mut FxHashSet<Name>,
        name: Name,
        ty: TypeId,
        embedded: bool,
        tag: Option<Name>,
        span: Span,
    ) -> CheckResult<Field> {
        if !name.is_blank() && !seen.insert(name) {
            return Err(self.error(
                ErrorCode::E2015,
                span,
                format!("duplicate field {}", self.name_str(name)),
            ));
        }
        Ok(Field {
            name,
            ty,
            embedded,
            tag,
        })
    }

    fn resolve_type_name(&mut self, name: Name, span: Span) -> CheckResult<TypeId> {
        if let Some((_, local)) = self.lookup_local(name) {
            return match local.kind {
                LocalKind::Type(ty) => Ok(ty),
                _ => Err(self.not_a_type(name, span)),
            };
        }
        if let Some((id, decl)) = self.table.lookup(name) {
            let ty = decl.ty;
            let is_type = decl.is_type_name();
            self.deps.insert(id);
            return if is_type {
                Ok(ty)
            } else {
                Err(self.not_a_type(name, span))
            };
        }
        match self.universe.lookup(name) {
            Some(UniverseEntry::Type(ty)) => Ok(*ty),
            Some(_) => Err(self.not_a_type(name, span)),
            None => Err(self.error(
                ErrorCode::E2001,
                span,
                format!("undefined: {}", self.name_str(name)),
            )),
        }
    }

    fn not_a_type(&self, name: Name, span: Span) -> crate::TypeCheckError {
        self.error(
            ErrorCode::E2016,
            span,
            format!("{} is not a type", self.name_str(name)),
        )
    }

    pub(super) fn resolve_signature(&mut self, sig: &FuncSig) -> CheckResult<TypeId> {
        let signature = self.signature(sig)?;
        Ok(self.pool.func(signature))
    }

    pub(super) fn signature(&mut self, sig: &FuncSig) -> CheckResult<Signature> {
        let mut params = Vec::with_capacity(sig.params.len());
        for (i, param) in sig.params.iter().enumerate() {
            let ty = self.resolve_type(&param.ty)?;
            if sig.variadic && i + 1 == sig.params.len() {
                params.push(self.pool.slice(ty));
            } else {
                params.push(ty);
            }
        }
        let mut results = Vec::with_capacity(sig.results.len());
        for result in &sig.results {
            results.push(self.resolve_type(&result.ty)?);
        }
        Ok(Signature {
            params,
            results,
            variadic: sig.variadic,
        })
    }

    fn array_length(&mut self, len: gi_ir::ExprId) -> CheckResult<u64> {
        let op = self.expr(len, None)?;
        let span = self.span(len);
        let value = match (&op.mode, &op.value) {
            (Mode::Constant, Some(value)) => value.as_int(),
            _ => {
                return Err(self.error(
                    ErrorCode::E2012,
                    span,
                    format!("array length {} must be constant", self.expr_str(len)),
                ))
            }
        };
        value
            .and_then(|v| u64::try_from(v).ok())
            .ok_or_else(|| {
                self.error(
                    ErrorCode::E2012,
                    span,
                    format!("invalid array length {}", self.expr_str(len)),
                )
            })
    }
}

/// The implicit field name of an embedded field: the type's name.
fn embedded_name(texpr: &TypeExpr) -> Option<Name> {
    match &texpr.kind {
        TypeExprKind::Named(name) | TypeExprKind::Qualified { name, .. } => Some(*name),
        TypeExprKind::Pointer(inner) => embedded_name(inner),
        _ => None,
    }
}
