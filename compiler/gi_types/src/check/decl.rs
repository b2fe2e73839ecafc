//! `const`, `var`, `type` and `func` declarations.

use super::{Checker, Frame, LocalKind, Mode};
use crate::error::CheckResult;
use crate::{ConstValue, DeclId, DeclKind, Declaration, Receiver, Signature, TypeId};
use gi_ir::ast::{ConstSpec, Decl, ExprId, FuncDecl, FuncSig, Ident, TypeExpr, TypeExprKind, TypeSpec, VarSpec};
use gi_ir::{ErrorCode, Name};
use rustc_hash::FxHashSet;
use tracing::trace;

impl Checker<'_> {
    // === Types ===

    /// First pass: enter the name with a placeholder so later specs and
    /// function signatures can refer to it.
    pub(super) fn declare_type_name(&mut self, spec: &TypeSpec) -> (DeclId, TypeId) {
        if spec.alias {
            let kind = DeclKind::TypeName {
                alias: true,
                methods: rustc_hash::FxHashMap::default(),
            };
            let id = self.declare_global(&spec.name, TypeId::INVALID, kind);
            return (id, TypeId::INVALID);
        }
        let named = self.pool.new_named(spec.name.name, None);
        let id = self.declare_global(&spec.name, named, DeclKind::type_name());
        self.pool.set_decl(named, id);
        (id, named)
    }

    pub(super) fn define_global_type(
        &mut self,
        spec: &TypeSpec,
        id: DeclId,
        named: TypeId,
    ) -> CheckResult<()> {
        let (target, deps) = self.with_deps(|c| c.resolve_type(&spec.ty))?;
        if spec.alias {
            self.table.set_type(id, target);
            self.info.defs.insert(spec.name.span, target);
        } else {
            self.pool.set_underlying(named, target);
            if !target.is_invalid() && self.pool.underlying(named).is_invalid() {
                return Err(self.error(
                    ErrorCode::E2016,
                    spec.name.span,
                    format!("invalid recursive type {}", self.name_str(spec.name.name)),
                ));
            }
        }
        self.table.set_deps(id, deps);
        trace!(name = self.name_str(spec.name.name), ty = ?target, "defined type");
        Ok(())
    }

    /// A type declared inside a function body or block.
    fn local_types(&mut self, specs: &[TypeSpec]) -> CheckResult<()> {
        for spec in specs {
            if spec.alias {
                let target = self.resolve_type(&spec.ty)?;
                self.declare_local(&spec.name, LocalKind::Type(target));
                continue;
            }
            let named = self.pool.new_named(spec.name.name, None);
            self.declare_local(&spec.name, LocalKind::Type(named));
            let target = self.resolve_type(&spec.ty)?;
            self.pool.set_underlying(named, target);
            self.info.defs.insert(spec.name.span, named);
        }
        Ok(())
    }

    // === Functions and methods ===

    pub(super) fn declare_func(&mut self, func: &FuncDecl) -> CheckResult<(DeclId, TypeId)> {
        let (sig, mut deps) = self.with_deps(|c| c.resolve_signature(&func.sig))?;
        if func.body.is_none() {
            return Err(self.error(
                ErrorCode::E2014,
                func.name.span,
                format!("missing function body for {}", self.name_str(func.name.name)),
            ));
        }

        let Some(recv) = &func.receiver else {
            let id = self.declare_global(&func.name, sig, DeclKind::Func { receiver: None });
            self.table.set_deps(id, deps);
            return Ok((id, sig));
        };

        let (base, pointer) = self.receiver_base(&recv.ty)?;
        let recv_ty = if pointer {
            self.pool.pointer(base.1)
        } else {
            base.1
        };
        self.info.type_exprs.insert(recv.ty.span, recv_ty);
        if let TypeExprKind::Pointer(inner) = &recv.ty.kind {
            self.info.type_exprs.insert(inner.span, base.1);
        }

        let decl = Declaration::new(
            func.name.name,
            func.name.span,
            sig,
            DeclKind::Func {
                receiver: Some(Receiver {
                    base: base.0,
                    pointer,
                }),
            },
        );
        let (id, _) = self
            .table
            .declare_method(self.pool, base.0, decl)
            .map_err(|conflict| conflict.into_error(self.interner))?;
        self.info.defs.insert(func.name.span, sig);
        deps.insert(base.0);
        self.table.set_deps(id, deps);
        Ok((id, sig))
    }

    /// The `TypeName` a receiver refers to, with its named type, and whether
    /// the receiver is a pointer.
    fn receiver_base(&mut self, texpr: &TypeExpr) -> CheckResult<((DeclId, TypeId), bool)> {
        let (name, span, pointer) = match &texpr.kind {
            TypeExprKind::Named(name) => (*name, texpr.span, false),
            TypeExprKind::Pointer(inner) => match &inner.kind {
                TypeExprKind::Named(name) => (*name, inner.span, true),
                _ => return Err(self.invalid_receiver(texpr)),
            },
            _ => return Err(self.invalid_receiver(texpr)),
        };
        let Some((_, decl)) = self.table.lookup(name) else {
            if self.universe.lookup(name).is_some() {
                return Err(self.error(
                    ErrorCode::E2007,
                    span,
                    format!(
                        "cannot define new methods on non-local type {}",
                        self.name_str(name)
                    ),
                ));
            }
            return Err(self.error(
                ErrorCode::E2001,
                span,
                format!("undefined: {}", self.name_str(name)),
            ));
        };
        if !decl.is_type_name() {
            return Err(self.error(
                ErrorCode::E2007,
                span,
                format!("{} is not a type", self.name_str(name)),
            ));
        }
        let ty = decl.ty;
        let Some(owner) = self.pool.named(ty).and_then(|n| n.decl) else {
            return Err(self.error(
                ErrorCode::E2007,
                span,
                format!(
                    "cannot define new methods on non-local type {}",
                    self.type_str(ty)
                ),
            ));
        };
        if self.pool.pointer_elem(ty).is_some() || self.pool.is_interface(ty) {
            return Err(self.error(
                ErrorCode::E2007,
                span,
                format!(
                    "invalid receiver type {} (pointer or interface type)",
                    self.name_str(name)
                ),
            ));
        }
        Ok(((owner, ty), pointer))
    }

    fn invalid_receiver(&self, texpr: &TypeExpr) -> crate::TypeCheckError {
        self.error(ErrorCode::E2007, texpr.span, "invalid receiver type")
    }

    pub(super) fn func_body(&mut self, func: &FuncDecl, id: DeclId, sig: TypeId) -> CheckResult<()> {
        let Some(body) = &func.body else {
            return Ok(());
        };
        let Some(signature) = self.pool.signature(sig).cloned() else {
            return Ok(());
        };
        let receiver = func.receiver.as_ref().and_then(|recv| {
            let ty = self.info.type_exprs.get(&recv.ty.span).copied()?;
            recv.name.map(|name| (name, ty))
        });

        self.enter_function(&func.sig, &signature);
        let ((), deps) = self.with_deps(|c| {
            if let Some((name, ty)) = receiver {
                c.declare_local(&name, LocalKind::Var(ty));
            }
            c.declare_params(&func.sig, &signature);
            c.stmts(&body.stmts)?;
            c.check_missing_return(&signature, body)
        })?;
        self.leave_function();

        let mut all = self
            .table
            .object(id)
            .map(|o| o.deps.clone())
            .unwrap_or_default();
        all.extend(deps);
        self.table.set_deps(id, all);
        Ok(())
    }

    pub(super) fn enter_function(&mut self, sig: &FuncSig, signature: &Signature) {
        self.frames.push(Frame {
            results: Some(signature.results.clone()),
            named_results: sig.results.iter().any(|r| r.name.is_some()),
            ..Frame::default()
        });
        self.push_scope();
    }

    pub(super) fn leave_function(&mut self) {
        self.pop_scope();
        self.frames.pop();
    }

    /// Parameters and named results share the function's outermost scope.
    pub(super) fn declare_params(&mut self, sig: &FuncSig, signature: &Signature) {
        for (param, ty) in sig.params.iter().zip(&signature.params) {
            if let Some(name) = &param.name {
                self.declare_local(name, LocalKind::Var(*ty));
            }
        }
        for (result, ty) in sig.results.iter().zip(&signature.results) {
            if let Some(name) = &result.name {
                self.declare_local(name, LocalKind::Var(*ty));
            }
        }
    }

    // === Constants ===

    pub(super) fn global_consts(&mut self, specs: &[ConstSpec]) -> CheckResult<()> {
        self.const_specs(specs, true)
    }

    fn const_specs(&mut self, specs: &[ConstSpec], global: bool) -> CheckResult<()> {
        let mut previous: Option<&ConstSpec> = None;
        for spec in specs {
            let source = if spec.values.is_empty() {
                if spec.ty.is_some() {
                    return Err(self.error(
                        ErrorCode::E2004,
                        spec.span,
                        "missing init expr for const declaration",
                    ));
                }
                match previous {
                    Some(prev) => prev,
                    None => {
                        return Err(self.error(
                            ErrorCode::E2004,
                            spec.span,
                            "missing init expr for const declaration",
                        ))
                    }
                }
            } else {
                previous = Some(spec);
                spec
            };

            if source.values.len() < spec.names.len() {
                return Err(self.error(
                    ErrorCode::E2004,
                    spec.span,
                    "missing init expr for const declaration",
                ));
            }
            if source.values.len() > spec.names.len() {
                return Err(self.error(
                    ErrorCode::E2004,
                    spec.span,
                    "extra init expr",
                ));
            }

            for (name, value) in spec.names.iter().zip(&source.values) {
                self.iota = Some(spec.iota);
                let result = self.with_deps(|c| c.const_value_of(source.ty.as_ref(), *value));
                self.iota = None;
                let ((ty, value), deps) = result?;
                if global {
                    let id = self.declare_global(name, ty, DeclKind::Const(value));
                    self.table.set_deps(id, deps);
                } else {
                    self.declare_local(name, LocalKind::Const(ty, value));
                }
            }
        }
        Ok(())
    }

    fn const_value_of(
        &mut self,
        ty: Option<&TypeExpr>,
        value: ExprId,
    ) -> CheckResult<(TypeId, ConstValue)> {
        let target = ty.map(|t| self.resolve_type(t)).transpose()?;
        if let Some(target) = target {
            if !target.is_invalid() && self.pool.basic(target).is_none() {
                return Err(self.error(
                    ErrorCode::E2012,
                    ty.map_or_else(|| self.span(value), |t| t.span),
                    format!("invalid constant type {}", self.type_str(target)),
                ));
            }
        }
        let mut op = self.expr(value, None)?;
        self.require_value(value, &op)?;
        let constant = match (&op.mode, &op.value) {
            (Mode::Constant, Some(_)) => true,
            _ => op.ty.is_invalid(),
        };
        if !constant {
            return Err(self.error(
                ErrorCode::E2012,
                self.span(value),
                format!(
                    "{} (value of type {}) is not constant",
                    self.expr_str(value),
                    self.type_str(op.ty)
                ),
            ));
        }
        if let Some(target) = target {
            self.assign_to(value, &mut op, target, "constant declaration")?;
        }
        Ok((op.ty, op.value.unwrap_or(ConstValue::Int(0))))
    }

    // === Variables ===

    pub(super) fn global_vars(&mut self, specs: &[VarSpec]) -> CheckResult<()> {
        self.var_specs(specs, true)
    }

    fn var_specs(&mut self, specs: &[VarSpec], global: bool) -> CheckResult<()> {
        for spec in specs {
            let declared = spec.ty.as_ref().map(|t| self.resolve_type(t)).transpose()?;
            let (names, values) = (&spec.names, &spec.values);

            if values.is_empty() {
                let ty = declared.unwrap_or(TypeId::INVALID);
                for name in names {
                    self.define_var(name, ty, global, FxHashSet::default());
                }
            } else if values.len() == names.len() {
                // Values are checked against the scope before any name is bound.
                let mut checked = Vec::with_capacity(values.len());
                for value in values {
                    let (op, deps) = self.with_deps(|c| {
                        let mut op = c.expr(*value, declared)?;
                        c.single_value(*value, &op)?;
                        match declared {
                            Some(ty) => c.assign_to(*value, &mut op, ty, "variable declaration")?,
                            None => c.default_operand(*value, &mut op, "variable declaration")?,
                        }
                        Ok(op)
                    })?;
                    checked.push((declared.unwrap_or(op.ty), deps));
                }
                for (name, (ty, deps)) in names.iter().zip(checked) {
                    self.define_var(name, ty, global, deps);
                }
            } else if values.len() == 1 {
                let (types, deps) = self.with_deps(|c| c.multi_value(values[0], names.len()))?;
                for (name, ty) in names.iter().zip(types) {
                    if let Some(target) = declared {
                        if !self.assignable(ty, target) {
                            return Err(self.error(
                                ErrorCode::E2002,
                                self.span(values[0]),
                                format!(
                                    "cannot use {} value as {} value in variable declaration",
                                    self.type_str(ty),
                                    self.type_str(target)
                                ),
                            ));
                        }
                    }
                    self.define_var(name, declared.unwrap_or(ty), global, deps.clone());
                }
            } else {
                return Err(self.assignment_mismatch(spec.span, names.len(), values.len()));
            }
        }
        Ok(())
    }

    fn define_var(&mut self, name: &Ident, ty: TypeId, global: bool, deps: FxHashSet<DeclId>) {
        if global {
            let id = self.declare_global(name, ty, DeclKind::Var);
            self.table.set_deps(id, deps);
        } else {
            self.declare_local(name, LocalKind::Var(ty));
        }
    }

    pub(super) fn assignment_mismatch(
        &self,
        span: gi_ir::Span,
        vars: usize,
        values: usize,
    ) -> crate::TypeCheckError {
        let plural = |n: usize, word: &str| {
            if n == 1 {
                format!("{n} {word}")
            } else {
                format!("{n} {word}s")
            }
        };
        self.error(
            ErrorCode::E2004,
            span,
            format!(
                "assignment mismatch: {} but {}",
                plural(vars, "variable"),
                plural(values, "value")
            ),
        )
    }

    /// A declaration statement inside a block.
    pub(super) fn local_decl(&mut self, decl: &Decl, span: gi_ir::Span) -> CheckResult<()> {
        match decl {
            Decl::Const(specs) => self.const_specs(specs, false),
            Decl::Var(specs) => self.var_specs(specs, false),
            Decl::Type(specs) => self.local_types(specs),
            Decl::Func(_) => Err(self.error(
                ErrorCode::E9001,
                span,
                "function declaration inside a block",
            )),
        }
    }

    /// Names bound by a `:=` at the prompt. Each one is entered as a
    /// top-level variable, replacing any earlier declaration of the name.
    pub(super) fn global_short_var_decl(
        &mut self,
        names: &[Ident],
        values: &[ExprId],
        span: gi_ir::Span,
    ) -> CheckResult<()> {
        if let Some(dup) = repeated(names) {
            return Err(self.error(
                ErrorCode::E2009,
                dup.span,
                format!("{} repeated on left side of :=", self.name_str(dup.name)),
            ));
        }
        if names.len() == values.len() {
            let mut checked = Vec::with_capacity(values.len());
            for value in values {
                let (op, deps) = self.with_deps(|c| {
                    let mut op = c.expr(*value, None)?;
                    c.single_value(*value, &op)?;
                    c.default_operand(*value, &mut op, "assignment")?;
                    Ok(op)
                })?;
                checked.push((op.ty, deps));
            }
            for (name, (ty, deps)) in names.iter().zip(checked) {
                self.define_var(name, ty, true, deps);
            }
            return Ok(());
        }
        if values.len() == 1 {
            let (types, deps) = self.with_deps(|c| c.multi_value(values[0], names.len()))?;
            for (name, ty) in names.iter().zip(types) {
                self.define_var(name, ty, true, deps.clone());
            }
            return Ok(());
        }
        Err(self.assignment_mismatch(span, names.len(), values.len()))
    }
}

/// The first name written twice, `_` excepted.
pub(super) fn repeated(names: &[Ident]) -> Option<Ident> {
    let mut seen: FxHashSet<Name> = FxHashSet::default();
    names
        .iter()
        .find(|ident| !ident.name.is_blank() && !seen.insert(ident.name))
        .copied()
}
