//! Expressions.

use super::{Checker, LocalKind, Mode, Operand};
use crate::error::CheckResult;
use crate::info::{Resolution, Selection};
use crate::universe::UniverseEntry;
use crate::{fold_binary, fold_unary, ConstError, ConstValue, DeclKind, Lookup, Type, TypeId};
use gi_ir::ast::{BinaryOp, Block, ChanDir, Element, ExprId, ExprKind, FuncSig, TypeExpr, TypeExprKind, UnaryOp};
use gi_ir::{ErrorCode, Name, Span};
use rustc_hash::FxHashSet;

impl Checker<'_> {
    /// Check an expression and record its type. `hint` is the type the
    /// context expects; only elided composite literals depend on it.
    pub(super) fn expr(&mut self, id: ExprId, hint: Option<TypeId>) -> CheckResult<Operand> {
        gi_stack::with_stack(|| {
            let op = self.expr_inner(id, hint)?;
            self.record(id, &op);
            Ok(op)
        })
    }

    /// Check an expression that must produce exactly one value.
    pub(super) fn value_expr(&mut self, id: ExprId, hint: Option<TypeId>) -> CheckResult<Operand> {
        let op = self.expr(id, hint)?;
        self.single_value(id, &op)?;
        Ok(op)
    }

    pub(super) fn single_value(&self, id: ExprId, op: &Operand) -> CheckResult<()> {
        self.require_value(id, op)?;
        if matches!(self.pool.get(op.ty), Type::Tuple(_)) {
            return Err(self.error(
                ErrorCode::E2013,
                self.span(id),
                format!(
                    "multiple-value {} (value of type {}) in single-value context",
                    self.expr_str(id),
                    self.type_str(op.ty)
                ),
            ));
        }
        Ok(())
    }

    fn expr_inner(&mut self, id: ExprId, hint: Option<TypeId>) -> CheckResult<Operand> {
        let arena = self.arena;
        match arena.kind(id) {
            ExprKind::Ident(name) => self.ident(id, *name),
            ExprKind::Int(v) => match i128::try_from(*v) {
                Ok(v) => Ok(Operand::constant(TypeId::UNTYPED_INT, ConstValue::Int(v))),
                Err(_) => Err(self.error(
                    ErrorCode::E2012,
                    self.span(id),
                    "integer constant overflow",
                )),
            },
            ExprKind::Float(bits) => Ok(Operand::constant(
                TypeId::UNTYPED_FLOAT,
                ConstValue::Float(f64::from_bits(*bits)),
            )),
            ExprKind::Str(s) => Ok(Operand::constant(
                TypeId::UNTYPED_STRING,
                ConstValue::String(self.name_str(*s).to_string()),
            )),
            ExprKind::Char(c) => Ok(Operand::constant(
                TypeId::UNTYPED_RUNE,
                ConstValue::Int(i128::from(u32::from(*c))),
            )),
            ExprKind::CompositeLit { ty, elements } => {
                self.composite(id, ty.as_ref(), elements, hint)
            }
            ExprKind::FuncLit { sig, body } => self.func_lit(sig, body),
            ExprKind::Paren(inner) => self.expr(*inner, hint),
            ExprKind::Selector { base, field, field_span } => {
                self.selector(id, *base, *field, *field_span)
            }
            ExprKind::Index { base, index } => self.index(id, *base, *index),
            ExprKind::Slice {
                base,
                low,
                high,
                max,
            } => self.slice_expr(id, *base, [*low, *high, *max]),
            ExprKind::TypeAssert { base, ty } => self.type_assert(id, *base, ty.as_ref()),
            ExprKind::Call { func, args, spread } => self.call(id, *func, args, *spread),
            ExprKind::Unary { op, operand } => self.unary(id, *op, *operand, hint),
            ExprKind::Binary { op, left, right } => self.binary(id, *op, *left, *right),
            ExprKind::Type(texpr) => {
                let ty = self.resolve_type(texpr)?;
                Ok(Operand::new(Mode::TypeExpr, ty))
            }
        }
    }

    // === Names ===

    fn ident(&mut self, id: ExprId, name: Name) -> CheckResult<Operand> {
        if name.is_blank() {
            return Err(self.error(
                ErrorCode::E2001,
                self.span(id),
                "cannot use _ as value",
            ));
        }
        if let Some((local_id, local)) = self.lookup_local(name) {
            let op = match &local.kind {
                LocalKind::Var(ty) => Operand::new(Mode::Variable, *ty),
                LocalKind::Const(ty, value) => Operand::constant(*ty, value.clone()),
                LocalKind::Type(ty) => Operand::new(Mode::TypeExpr, *ty),
            };
            self.resolution(id, Resolution::Local(local_id));
            return Ok(op);
        }
        if let Some((decl_id, decl)) = self.table.lookup(name) {
            let op = match &decl.kind {
                DeclKind::Const(value) => Operand::constant(decl.ty, value.clone()),
                DeclKind::Var => Operand::new(Mode::Variable, decl.ty),
                DeclKind::TypeName { .. } => Operand::new(Mode::TypeExpr, decl.ty),
                DeclKind::Func { .. } => Operand::new(Mode::Value, decl.ty),
                DeclKind::Package { .. } => Operand::new(Mode::Package, TypeId::INVALID),
            };
            self.deps.insert(decl_id);
            self.resolution(id, Resolution::Global(decl_id));
            return Ok(op);
        }
        let (op, res) = match self.universe.lookup(name).cloned() {
            Some(UniverseEntry::Type(ty)) => (Operand::new(Mode::TypeExpr, ty), Resolution::Type(ty)),
            Some(UniverseEntry::Const(value)) => (
                Operand::constant(TypeId::UNTYPED_BOOL, value),
                Resolution::Constant,
            ),
            Some(UniverseEntry::Nil) => (
                Operand::new(Mode::Value, TypeId::UNTYPED_NIL),
                Resolution::Nil,
            ),
            Some(UniverseEntry::Iota) if self.iota.is_some() => (
                Operand::constant(
                    TypeId::UNTYPED_INT,
                    ConstValue::Int(i128::from(self.iota.unwrap_or(0))),
                ),
                Resolution::Constant,
            ),
            Some(UniverseEntry::Builtin(builtin)) => (
                Operand::new(Mode::Builtin(builtin), TypeId::INVALID),
                Resolution::Builtin(builtin),
            ),
            Some(UniverseEntry::Iota) | None => {
                return Err(self.error(
                    ErrorCode::E2001,
                    self.span(id),
                    format!("undefined: {}", self.name_str(name)),
                ))
            }
        };
        self.resolution(id, res);
        Ok(op)
    }

    // === Literals ===

    fn func_lit(&mut self, sig: &FuncSig, body: &Block) -> CheckResult<Operand> {
        let ty = self.resolve_signature(sig)?;
        let Some(signature) = self.pool.signature(ty).cloned() else {
            return Ok(Operand::invalid());
        };
        self.enter_function(sig, &signature);
        self.declare_params(sig, &signature);
        self.stmts(&body.stmts)?;
        self.check_missing_return(&signature, body)?;
        self.leave_function();
        Ok(Operand::new(Mode::Value, ty))
    }

    fn composite(
        &mut self,
        id: ExprId,
        ty: Option<&TypeExpr>,
        elements: &[Element],
        hint: Option<TypeId>,
    ) -> CheckResult<Operand> {
        let (lit_ty, through_pointer) = match ty {
            Some(TypeExpr {
                kind: TypeExprKind::Array { len: None, elem },
                span,
            }) => {
                let elem = self.resolve_type(elem)?;
                let len = self.array_elements(elements, elem, None)?;
                let ty = self.pool.array(len, elem);
                self.info.type_exprs.insert(*span, ty);
                return Ok(Operand::new(Mode::Value, ty));
            }
            Some(texpr) => (self.resolve_type(texpr)?, false),
            None => match hint {
                Some(hint) => match self.pool.get(hint) {
                    Type::Pointer(elem) => (*elem, true),
                    _ => (hint, false),
                },
                None => {
                    return Err(self.error(
                        ErrorCode::E2015,
                        self.span(id),
                        "invalid composite literal type: missing type",
                    ))
                }
            },
        };

        match self.pool.underlying_type(lit_ty).clone() {
            Type::Struct(fields) => self.struct_elements(id, lit_ty, &fields, elements)?,
            Type::Array { len, elem } => {
                self.array_elements(elements, elem, Some(len))?;
            }
            Type::Slice(elem) => {
                self.array_elements(elements, elem, None)?;
            }
            Type::Map { key, value } => {
                for element in elements {
                    let Some(k) = element.key else {
                        return Err(self.error(
                            ErrorCode::E2015,
                            self.span(element.value),
                            "missing key in map literal",
                        ));
                    };
                    let mut key_op = self.value_expr(k, Some(key))?;
                    self.assign_to(k, &mut key_op, key, "map literal")?;
                    let mut value_op = self.value_expr(element.value, Some(value))?;
                    self.assign_to(element.value, &mut value_op, value, "map literal")?;
                }
            }
            Type::Invalid => {
                for element in elements {
                    self.value_expr(element.value, None)?;
                }
            }
            _ => {
                return Err(self.error(
                    ErrorCode::E2015,
                    self.span(id),
                    format!("invalid composite literal type {}", self.type_str(lit_ty)),
                ))
            }
        }

        let ty = if through_pointer {
            self.pool.pointer(lit_ty)
        } else {
            lit_ty
        };
        Ok(Operand::new(Mode::Value, ty))
    }

    fn struct_elements(
        &mut self,
        id: ExprId,
        lit_ty: TypeId,
        fields: &[crate::Field],
        elements: &[Element],
    ) -> CheckResult<()> {
        let Some(first) = elements.first() else {
            return Ok(());
        };
        let keyed = first.key.is_some();
        if elements.iter().any(|e| e.key.is_some() != keyed) {
            return Err(self.error(
                ErrorCode::E2015,
                self.span(id),
                "mixture of field:value and value elements in struct literal",
            ));
        }

        if !keyed {
            if elements.len() != fields.len() {
                let which = if elements.len() < fields.len() {
                    "few"
                } else {
                    "many"
                };
                return Err(self.error(
                    ErrorCode::E2015,
                    self.span(id),
                    format!(
                        "too {which} values in struct literal of type {}",
                        self.type_str(lit_ty)
                    ),
                ));
            }
            for (element, field) in elements.iter().zip(fields) {
                let mut op = self.value_expr(element.value, Some(field.ty))?;
                self.assign_to(element.value, &mut op, field.ty, "struct literal")?;
            }
            return Ok(());
        }

        let mut seen = FxHashSet::default();
        for element in elements {
            let Some(key) = element.key else { continue };
            let ExprKind::Ident(name) = self.arena.kind(key) else {
                return Err(self.error(
                    ErrorCode::E2015,
                    self.span(key),
                    format!("invalid field name {} in struct literal", self.expr_str(key)),
                ));
            };
            let name = *name;
            let Some(field) = fields.iter().find(|f| f.name == name) else {
                return Err(self.error(
                    ErrorCode::E2005,
                    self.span(key),
                    format!(
                        "unknown field {} in struct literal of type {}",
                        self.name_str(name),
                        self.type_str(lit_ty)
                    ),
                ));
            };
            if !seen.insert(name) {
                return Err(self.error(
                    ErrorCode::E2015,
                    self.span(key),
                    format!("duplicate field name {} in struct literal", self.name_str(name)),
                ));
            }
            let ty = field.ty;
            let mut op = self.value_expr(element.value, Some(ty))?;
            self.assign_to(element.value, &mut op, ty, "struct literal")?;
        }
        Ok(())
    }

    /// Check array or slice elements and return the literal's length.
    fn array_elements(
        &mut self,
        elements: &[Element],
        elem: TypeId,
        len: Option<u64>,
    ) -> CheckResult<u64> {
        let mut index: u64 = 0;
        let mut max: u64 = 0;
        let mut seen = FxHashSet::default();
        for element in elements {
            if let Some(key) = element.key {
                let op = self.value_expr(key, None)?;
                index = match (&op.mode, op.value.as_ref().and_then(ConstValue::as_int)) {
                    (Mode::Constant, Some(v)) => u64::try_from(v).map_err(|_| {
                        self.error(
                            ErrorCode::E2010,
                            self.span(key),
                            format!("index {} must be non-negative integer constant", self.expr_str(key)),
                        )
                    })?,
                    _ => {
                        return Err(self.error(
                            ErrorCode::E2012,
                            self.span(key),
                            format!("index {} must be integer constant", self.expr_str(key)),
                        ))
                    }
                };
            }
            if let Some(n) = len {
                if index >= n {
                    return Err(self.error(
                        ErrorCode::E2010,
                        self.span(element.value),
                        format!("index {index} out of bounds [0:{n}]"),
                    ));
                }
            }
            if !seen.insert(index) {
                return Err(self.error(
                    ErrorCode::E2015,
                    self.span(element.value),
                    format!("duplicate index {index} in array or slice literal"),
                ));
            }
            let mut op = self.value_expr(element.value, Some(elem))?;
            self.assign_to(element.value, &mut op, elem, "array or slice literal")?;
            index += 1;
            max = max.max(index);
        }
        Ok(max)
    }

    // === Selectors ===

    fn selector(
        &mut self,
        id: ExprId,
        base: ExprId,
        field: Name,
        field_span: Span,
    ) -> CheckResult<Operand> {
        let x = self.expr(base, None)?;
        match x.mode {
            Mode::Package => {
                self.info.selections.insert(id, Selection::Qualified);
                return Ok(Operand::invalid());
            }
            Mode::TypeExpr => return self.method_expr(id, x.ty, field, field_span),
            _ => {}
        }
        self.single_value(base, &x)?;
        if x.ty.is_invalid() {
            return Ok(Operand::invalid());
        }

        match self.table.lookup_field_or_method(self.pool, x.ty, field) {
            Lookup::Field(selection) => {
                let mode = if selection.indirect || x.mode == Mode::Variable {
                    Mode::Variable
                } else {
                    Mode::Value
                };
                let ty = selection.ty;
                self.info.selections.insert(id, Selection::Field(selection));
                Ok(Operand::new(mode, ty))
            }
            Lookup::Method(entry) => {
                let addressable = x.mode == Mode::Variable || entry.indirect;
                if entry.pointer_recv && !addressable {
                    return Err(self.error(
                        ErrorCode::E2005,
                        field_span,
                        format!(
                            "cannot call pointer method {} on {}",
                            self.name_str(field),
                            self.type_str(x.ty)
                        ),
                    ));
                }
                let sig = entry.sig;
                self.info.selections.insert(id, Selection::Method(entry));
                Ok(Operand::new(Mode::Value, sig))
            }
            Lookup::Ambiguous => Err(self.error(
                ErrorCode::E2005,
                field_span,
                format!(
                    "ambiguous selector {}.{}",
                    self.expr_str(base),
                    self.name_str(field)
                ),
            )),
            Lookup::NotFound => Err(self.error(
                ErrorCode::E2005,
                field_span,
                format!(
                    "{}.{} undefined (type {} has no field or method {})",
                    self.expr_str(base),
                    self.name_str(field),
                    self.type_str(x.ty),
                    self.name_str(field)
                ),
            )),
        }
    }

    /// `T.Method`: a function taking the receiver as its first parameter.
    fn method_expr(
        &mut self,
        id: ExprId,
        recv: TypeId,
        name: Name,
        span: Span,
    ) -> CheckResult<Operand> {
        let entry = self.table.lookup_method(self.pool, recv, name);
        let is_pointer = self.pool.pointer_elem(recv).is_some();
        let Some(entry) = entry.filter(|e| !e.pointer_recv || e.indirect || is_pointer) else {
            return Err(self.error(
                ErrorCode::E2005,
                span,
                format!(
                    "{}.{} undefined (type {} has no method {})",
                    self.type_str(recv),
                    self.name_str(name),
                    self.type_str(recv),
                    self.name_str(name)
                ),
            ));
        };
        let Some(mut sig) = self.pool.signature(entry.sig).cloned() else {
            return Ok(Operand::invalid());
        };
        sig.params.insert(0, recv);
        let ty = self.pool.func(sig);
        self.info.selections.insert(id, Selection::MethodExpr(entry));
        Ok(Operand::new(Mode::Value, ty))
    }

    // === Index, slice, assertion ===

    fn index(&mut self, id: ExprId, base: ExprId, index: ExprId) -> CheckResult<Operand> {
        let mut x = self.value_expr(base, None)?;
        if x.ty == TypeId::UNTYPED_STRING {
            self.convert_untyped(base, &mut x, TypeId::STRING, "index expression")?;
        }
        match self.pool.underlying_type(x.ty).clone() {
            Type::Invalid => {
                self.value_expr(index, None)?;
                Ok(Operand::invalid())
            }
            Type::Basic(kind) if kind.is_string() => {
                self.index_value(index, None)?;
                Ok(Operand::new(Mode::Value, TypeId::BYTE))
            }
            Type::Slice(elem) => {
                self.index_value(index, None)?;
                Ok(Operand::new(Mode::Variable, elem))
            }
            Type::Array { len, elem } => {
                self.index_value(index, Some(len))?;
                let mode = if x.mode == Mode::Variable {
                    Mode::Variable
                } else {
                    Mode::Value
                };
                Ok(Operand::new(mode, elem))
            }
            Type::Pointer(inner) => match self.pool.underlying_type(inner).clone() {
                Type::Array { len, elem } => {
                    self.index_value(index, Some(len))?;
                    Ok(Operand::new(Mode::Variable, elem))
                }
                _ => Err(self.cannot_index(id, base, &x)),
            },
            Type::Map { key, value } => {
                let mut k = self.value_expr(index, Some(key))?;
                self.assign_to(index, &mut k, key, "map index")?;
                Ok(Operand::new(Mode::MapIndex, value))
            }
            _ => Err(self.cannot_index(id, base, &x)),
        }
    }

    fn cannot_index(&self, id: ExprId, base: ExprId, x: &Operand) -> crate::TypeCheckError {
        self.error(
            ErrorCode::E2010,
            self.span(id),
            format!(
                "invalid operation: cannot index {} ({})",
                self.expr_str(base),
                self.describe(x)
            ),
        )
    }

    /// An index or size operand: an integer, non-negative if constant and
    /// inside `0..len` when the length is known.
    pub(super) fn index_value(&mut self, index: ExprId, len: Option<u64>) -> CheckResult<()> {
        let mut op = self.value_expr(index, None)?;
        if self.pool.is_untyped(op.ty) {
            self.convert_untyped(index, &mut op, TypeId::INT, "index")?;
        }
        if !op.ty.is_invalid() && !self.pool.is_integer(op.ty) {
            return Err(self.error(
                ErrorCode::E2010,
                self.span(index),
                format!(
                    "invalid argument: index {} ({}) must be integer",
                    self.expr_str(index),
                    self.describe(&op)
                ),
            ));
        }
        if let Some(v) = op.value.as_ref().and_then(ConstValue::as_int) {
            if v < 0 {
                return Err(self.error(
                    ErrorCode::E2010,
                    self.span(index),
                    format!(
                        "invalid argument: index {} (constant of type int) must not be negative",
                        self.expr_str(index)
                    ),
                ));
            }
            if let Some(n) = len {
                if u64::try_from(v).map_or(true, |v| v >= n) {
                    return Err(self.error(
                        ErrorCode::E2010,
                        self.span(index),
                        format!("invalid argument: index {v} out of bounds [0:{n}]"),
                    ));
                }
            }
        }
        Ok(())
    }

    fn slice_expr(
        &mut self,
        id: ExprId,
        base: ExprId,
        indices: [Option<ExprId>; 3],
    ) -> CheckResult<Operand> {
        let mut x = self.value_expr(base, None)?;
        if x.ty == TypeId::UNTYPED_STRING {
            self.convert_untyped(base, &mut x, TypeId::STRING, "slice expression")?;
        }
        let result = match self.pool.underlying_type(x.ty).clone() {
            Type::Invalid => TypeId::INVALID,
            Type::Basic(kind) if kind.is_string() => {
                if indices[2].is_some() {
                    return Err(self.error(
                        ErrorCode::E2010,
                        self.span(id),
                        "invalid operation: 3-index slice of string",
                    ));
                }
                x.ty
            }
            Type::Slice(_) => x.ty,
            Type::Array { elem, .. } => {
                if x.mode != Mode::Variable {
                    return Err(self.error(
                        ErrorCode::E2010,
                        self.span(id),
                        format!(
                            "invalid operation: {} (slice of unaddressable value)",
                            self.expr_str(base)
                        ),
                    ));
                }
                self.pool.slice(elem)
            }
            Type::Pointer(inner) => match self.pool.underlying_type(inner).clone() {
                Type::Array { elem, .. } => self.pool.slice(elem),
                _ => return Err(self.cannot_slice(id, base, &x)),
            },
            _ => return Err(self.cannot_slice(id, base, &x)),
        };
        for index in indices.into_iter().flatten() {
            self.index_value(index, None)?;
        }
        Ok(Operand::new(Mode::Value, result))
    }

    fn cannot_slice(&self, id: ExprId, base: ExprId, x: &Operand) -> crate::TypeCheckError {
        self.error(
            ErrorCode::E2010,
            self.span(id),
            format!(
                "cannot slice {} ({})",
                self.expr_str(base),
                self.describe(x)
            ),
        )
    }

    fn type_assert(
        &mut self,
        id: ExprId,
        base: ExprId,
        ty: Option<&TypeExpr>,
    ) -> CheckResult<Operand> {
        let Some(texpr) = ty else {
            return Err(self.error(
                ErrorCode::E2010,
                self.span(id),
                "use of .(type) outside type switch",
            ));
        };
        let x = self.value_expr(base, None)?;
        if !x.ty.is_invalid() && !self.pool.is_interface(x.ty) {
            return Err(self.error(
                ErrorCode::E2010,
                self.span(base),
                format!(
                    "invalid operation: {} ({}) is not an interface",
                    self.expr_str(base),
                    self.describe(&x)
                ),
            ));
        }
        let target = self.resolve_type(texpr)?;
        self.check_dynamic_type(base, x.ty, target, texpr.span, "type assertion")?;
        Ok(Operand::new(Mode::CommaOk, target))
    }

    /// A concrete type asserted from an interface must implement it.
    pub(super) fn check_dynamic_type(
        &mut self,
        subject: ExprId,
        iface: TypeId,
        target: TypeId,
        span: Span,
        what: &str,
    ) -> CheckResult<()> {
        if iface.is_invalid() || target.is_invalid() || self.pool.is_interface(target) {
            return Ok(());
        }
        if let Err(missing) = self.table.implements(self.pool, target, iface) {
            return Err(self.error(
                ErrorCode::E2010,
                span,
                format!(
                    "impossible {what}: {} (variable of type {}) cannot have dynamic type {} (missing method {})",
                    self.expr_str(subject),
                    self.type_str(iface),
                    self.type_str(target),
                    self.name_str(missing.name)
                ),
            ));
        }
        Ok(())
    }

    // === Operators ===

    fn unary(
        &mut self,
        id: ExprId,
        op: UnaryOp,
        operand: ExprId,
        hint: Option<TypeId>,
    ) -> CheckResult<Operand> {
        match op {
            UnaryOp::Deref => {
                let x = self.expr(operand, None)?;
                if x.mode == Mode::TypeExpr {
                    let ty = self.pool.pointer(x.ty);
                    return Ok(Operand::new(Mode::TypeExpr, ty));
                }
                self.single_value(operand, &x)?;
                if x.ty.is_invalid() {
                    return Ok(Operand::invalid());
                }
                match self.pool.pointer_elem(x.ty) {
                    Some(elem) if x.ty != TypeId::UNTYPED_NIL => Ok(Operand::new(Mode::Variable, elem)),
                    _ => Err(self.error(
                        ErrorCode::E2010,
                        self.span(id),
                        format!(
                            "invalid operation: cannot indirect {} ({})",
                            self.expr_str(operand),
                            self.describe(&x)
                        ),
                    )),
                }
            }
            UnaryOp::AddrOf => {
                let inner_hint = hint.and_then(|h| self.pool.pointer_elem(h));
                let x = self.value_expr(operand, inner_hint)?;
                let literal = matches!(
                    self.arena.kind(self.arena.unparen(operand)),
                    ExprKind::CompositeLit { .. }
                );
                if x.mode != Mode::Variable && !literal {
                    return Err(self.error(
                        ErrorCode::E2010,
                        self.span(id),
                        format!(
                            "invalid operation: cannot take address of {} ({})",
                            self.expr_str(operand),
                            self.describe(&x)
                        ),
                    ));
                }
                let ty = self.pool.pointer(x.ty);
                Ok(Operand::new(Mode::Value, ty))
            }
            UnaryOp::Recv => {
                let x = self.value_expr(operand, None)?;
                match self.pool.underlying_type(x.ty).clone() {
                    Type::Invalid => Ok(Operand::new(Mode::CommaOk, TypeId::INVALID)),
                    Type::Chan { dir: ChanDir::Send, .. } => Err(self.error(
                        ErrorCode::E2010,
                        self.span(id),
                        format!(
                            "invalid operation: cannot receive from send-only channel {} ({})",
                            self.expr_str(operand),
                            self.describe(&x)
                        ),
                    )),
                    Type::Chan { elem, .. } => Ok(Operand::new(Mode::CommaOk, elem)),
                    _ => Err(self.error(
                        ErrorCode::E2010,
                        self.span(id),
                        format!(
                            "invalid operation: cannot receive from non-channel {} ({})",
                            self.expr_str(operand),
                            self.describe(&x)
                        ),
                    )),
                }
            }
            UnaryOp::Pos | UnaryOp::Neg | UnaryOp::Not | UnaryOp::Complement => {
                let x = self.value_expr(operand, None)?;
                if x.ty.is_invalid() {
                    return Ok(Operand::invalid());
                }
                let applies = match op {
                    UnaryOp::Not => self.pool.is_boolean(x.ty),
                    UnaryOp::Complement => {
                        self.pool.is_integer(x.ty) || x.ty == TypeId::UNTYPED_RUNE
                    }
                    _ => self.pool.is_numeric(x.ty),
                };
                if !applies {
                    return Err(self.error(
                        ErrorCode::E2010,
                        self.span(id),
                        format!(
                            "invalid operation: operator {} not defined on {} ({})",
                            op.symbol(),
                            self.expr_str(operand),
                            self.describe(&x)
                        ),
                    ));
                }
                match (&x.mode, &x.value) {
                    (Mode::Constant, Some(value)) => {
                        let bits = self.pool.unsigned_bits(x.ty);
                        let folded = fold_unary(op, value, bits)
                            .map_err(|err| self.const_error(id, err))?;
                        let folded = self.represent_typed(id, x.ty, folded)?;
                        Ok(Operand::constant(x.ty, folded))
                    }
                    _ => Ok(Operand::new(Mode::Value, x.ty)),
                }
            }
        }
    }

    fn binary(
        &mut self,
        id: ExprId,
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    ) -> CheckResult<Operand> {
        let l = self.value_expr(left, None)?;
        let r = self.value_expr(right, None)?;
        self.binary_operands(id, op, (left, l), (right, r))
    }

    /// The operator applied to two checked operands. Compound assignment
    /// shares this with binary expressions.
    pub(super) fn binary_operands(
        &mut self,
        id: ExprId,
        op: BinaryOp,
        (left, mut l): (ExprId, Operand),
        (right, mut r): (ExprId, Operand),
    ) -> CheckResult<Operand> {
        if op.is_shift() {
            return self.shift(id, op, (left, l), (right, r));
        }
        self.match_operands(left, &mut l, right, &mut r, "operation")?;
        if l.ty.is_invalid() || r.ty.is_invalid() {
            return Ok(Operand::invalid());
        }

        if op.is_comparison() {
            return self.comparison(id, op, (left, &l), (right, &r));
        }

        if l.ty != r.ty {
            return Err(self.error(
                ErrorCode::E2002,
                self.span(id),
                format!(
                    "invalid operation: {} {} {} (mismatched types {} and {})",
                    self.expr_str(left),
                    op.symbol(),
                    self.expr_str(right),
                    self.type_str(l.ty),
                    self.type_str(r.ty)
                ),
            ));
        }
        let ty = l.ty;
        let applies = match op {
            BinaryOp::LogAnd | BinaryOp::LogOr => self.pool.is_boolean(ty),
            BinaryOp::Add => self.pool.is_numeric(ty) || self.pool.is_string(ty),
            BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => self.pool.is_numeric(ty),
            _ => self.pool.is_integer(ty) || ty == TypeId::UNTYPED_RUNE,
        };
        if !applies {
            return Err(self.error(
                ErrorCode::E2010,
                self.span(id),
                format!(
                    "invalid operation: operator {} not defined on {} ({})",
                    op.symbol(),
                    self.expr_str(left),
                    self.describe(&l)
                ),
            ));
        }

        let zero_divisor = matches!(op, BinaryOp::Div | BinaryOp::Rem)
            && r.value.as_ref().and_then(ConstValue::as_float) == Some(0.0);
        if zero_divisor {
            return Err(self.error(
                ErrorCode::E2010,
                self.span(right),
                "invalid operation: division by zero",
            ));
        }

        match (&l.value, &r.value) {
            (Some(a), Some(b)) if l.mode == Mode::Constant && r.mode == Mode::Constant => {
                let (a, b) = if self.pool.is_integer(ty) || ty == TypeId::UNTYPED_RUNE {
                    (integral(a), integral(b))
                } else {
                    (a.clone(), b.clone())
                };
                let folded = fold_binary(op, &a, &b).map_err(|err| self.const_error(id, err))?;
                let folded = self.represent_typed(id, ty, folded)?;
                Ok(Operand::constant(ty, folded))
            }
            _ => Ok(Operand::new(Mode::Value, ty)),
        }
    }

    fn comparison(
        &mut self,
        id: ExprId,
        op: BinaryOp,
        (left, l): (ExprId, &Operand),
        (right, r): (ExprId, &Operand),
    ) -> CheckResult<Operand> {
        let mismatch = |c: &Self| {
            c.error(
                ErrorCode::E2002,
                c.span(id),
                format!(
                    "invalid operation: {} {} {} (mismatched types {} and {})",
                    c.expr_str(left),
                    op.symbol(),
                    c.expr_str(right),
                    c.type_str(l.ty),
                    c.type_str(r.ty)
                ),
            )
        };
        if !self.assignable(l.ty, r.ty) && !self.assignable(r.ty, l.ty) {
            return Err(mismatch(self));
        }
        let with_nil = l.ty == TypeId::UNTYPED_NIL || r.ty == TypeId::UNTYPED_NIL;
        let ordered = matches!(
            op,
            BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq
        );
        let (operand, x) = if l.ty == TypeId::UNTYPED_NIL {
            (right, r)
        } else {
            (left, l)
        };
        let defined = if ordered {
            self.pool.is_integer(x.ty)
                || self.pool.is_float(x.ty)
                || self.pool.is_string(x.ty)
                || x.ty == TypeId::UNTYPED_RUNE
                || x.ty == TypeId::UNTYPED_FLOAT
        } else {
            with_nil || self.pool.is_comparable(x.ty)
        };
        if !defined {
            let what = match self.pool.underlying_type(x.ty) {
                Type::Slice(_) => "slice can only be compared to nil".to_string(),
                Type::Map { .. } => "map can only be compared to nil".to_string(),
                Type::Func(_) => "func can only be compared to nil".to_string(),
                _ => format!("operator {} not defined on {}", op.symbol(), self.expr_str(operand)),
            };
            return Err(self.error(
                ErrorCode::E2010,
                self.span(id),
                format!(
                    "invalid operation: {} {} {} ({what})",
                    self.expr_str(left),
                    op.symbol(),
                    self.expr_str(right)
                ),
            ));
        }
        match (&l.value, &r.value) {
            (Some(a), Some(b)) if l.mode == Mode::Constant && r.mode == Mode::Constant => {
                let folded = fold_binary(op, a, b).map_err(|err| self.const_error(id, err))?;
                Ok(Operand::constant(TypeId::UNTYPED_BOOL, folded))
            }
            _ => Ok(Operand::new(Mode::Value, TypeId::UNTYPED_BOOL)),
        }
    }

    fn shift(
        &mut self,
        id: ExprId,
        op: BinaryOp,
        (left, mut l): (ExprId, Operand),
        (right, mut r): (ExprId, Operand),
    ) -> CheckResult<Operand> {
        if l.ty.is_invalid() || r.ty.is_invalid() {
            return Ok(Operand::invalid());
        }
        if self.pool.is_untyped(r.ty) {
            let count = r.value.as_ref().and_then(ConstValue::as_int);
            if r.value.is_some() && !count.is_some_and(|c| c >= 0) {
                return Err(self.error(
                    ErrorCode::E2010,
                    self.span(right),
                    format!("invalid shift count {}", self.expr_str(right)),
                ));
            }
            self.convert_untyped(right, &mut r, TypeId::UINT, "shift count")?;
        } else if !self.pool.is_integer(r.ty) {
            return Err(self.error(
                ErrorCode::E2010,
                self.span(right),
                format!(
                    "invalid operation: shift count {} ({}) must be integer",
                    self.expr_str(right),
                    self.describe(&r)
                ),
            ));
        }

        if let (Mode::Constant, Some(a), Mode::Constant, Some(b)) = (&l.mode, &l.value, &r.mode, &r.value) {
            let Some(a_int) = a.as_int() else {
                return Err(self.shifted_non_integer(id, left, &l));
            };
            if !self.pool.is_untyped(l.ty) && !self.pool.is_integer(l.ty) {
                return Err(self.shifted_non_integer(id, left, &l));
            }
            let folded = fold_binary(op, &ConstValue::Int(a_int), b)
                .map_err(|err| self.const_error(id, err))?;
            let ty = if l.ty == TypeId::UNTYPED_FLOAT {
                TypeId::UNTYPED_INT
            } else {
                l.ty
            };
            let folded = self.represent_typed(id, ty, folded)?;
            return Ok(Operand::constant(ty, folded));
        }

        if self.pool.is_untyped(l.ty) {
            self.convert_untyped(left, &mut l, TypeId::INT, "shift")?;
        }
        if !self.pool.is_integer(l.ty) {
            return Err(self.shifted_non_integer(id, left, &l));
        }
        Ok(Operand::new(Mode::Value, l.ty))
    }

    fn shifted_non_integer(&self, id: ExprId, left: ExprId, l: &Operand) -> crate::TypeCheckError {
        self.error(
            ErrorCode::E2010,
            self.span(id),
            format!(
                "invalid operation: shifted operand {} ({}) must be integer",
                self.expr_str(left),
                self.describe(l)
            ),
        )
    }

    /// A typed constant result must fit its type.
    fn represent_typed(&self, id: ExprId, ty: TypeId, value: ConstValue) -> CheckResult<ConstValue> {
        if self.pool.is_untyped(ty) {
            return Ok(value);
        }
        let Some(kind) = self.pool.basic(ty) else {
            return Ok(value);
        };
        value.represent(kind).map_err(|err| match err {
            ConstError::Overflow => self.error(
                ErrorCode::E2010,
                self.span(id),
                format!("constant {value} overflows {}", self.type_str(ty)),
            ),
            _ => self.const_error(id, err),
        })
    }

    fn const_error(&self, id: ExprId, err: ConstError) -> crate::TypeCheckError {
        let message = match err {
            ConstError::DivisionByZero => "invalid operation: division by zero".to_string(),
            ConstError::Overflow => "constant overflow".to_string(),
            ConstError::Truncated => format!("{} truncated to integer", self.expr_str(id)),
            ConstError::Mismatch => format!("invalid constant operation {}", self.expr_str(id)),
        };
        self.error(ErrorCode::E2010, self.span(id), message)
    }

    /// `variable of type T`, `untyped int constant` and so on.
    pub(super) fn describe(&self, op: &Operand) -> String {
        match op.mode {
            Mode::Constant if self.pool.is_untyped(op.ty) => {
                format!("{} constant", self.type_str(op.ty))
            }
            Mode::Constant => format!("constant of type {}", self.type_str(op.ty)),
            Mode::Variable => format!("variable of type {}", self.type_str(op.ty)),
            _ if op.ty == TypeId::UNTYPED_NIL => "untyped nil".to_string(),
            _ => format!("value of type {}", self.type_str(op.ty)),
        }
    }
}

/// Integer operands fold as integers even when written as `2.0`.
fn integral(value: &ConstValue) -> ConstValue {
    value.as_int().map_or_else(|| value.clone(), ConstValue::Int)
}
