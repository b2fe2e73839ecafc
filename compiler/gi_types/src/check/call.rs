//! Calls, conversions and builtins.

use super::{Checker, Mode, Operand};
use crate::error::CheckResult;
use crate::info::{CallKind, Selection};
use crate::{BasicKind, Builtin, ConstValue, Signature, Type, TypeCheckError, TypeId};
use gi_ir::ast::{ChanDir, ExprId};
use gi_ir::ErrorCode;

impl Checker<'_> {
    pub(super) fn call(
        &mut self,
        id: ExprId,
        func: ExprId,
        args: &[ExprId],
        spread: bool,
    ) -> CheckResult<Operand> {
        let f = self.expr(func, None)?;
        match f.mode {
            Mode::TypeExpr => {
                self.info.calls.insert(id, CallKind::Conversion(f.ty));
                return self.conversion(id, f.ty, args, spread);
            }
            Mode::Builtin(builtin) => {
                self.info.calls.insert(id, CallKind::Builtin(builtin));
                return self.builtin(id, builtin, args, spread);
            }
            _ => {}
        }
        self.single_value(func, &f)?;
        if f.ty.is_invalid() {
            for arg in args {
                self.expr(*arg, None)?;
            }
            return Ok(Operand::invalid());
        }

        let Some(sig) = self.pool.signature(f.ty).cloned() else {
            return Err(self.error(
                ErrorCode::E2006,
                self.span(id),
                format!(
                    "invalid operation: cannot call non-function {} ({})",
                    self.expr_str(func),
                    self.describe(&f)
                ),
            ));
        };
        let is_method = matches!(
            self.info.selections.get(&self.arena.unparen(func)),
            Some(Selection::Method(_))
        );
        self.info.calls.insert(id, if is_method { CallKind::Method } else { CallKind::Func });
        self.arguments(id, func, &sig, args, spread)?;

        Ok(match sig.results.as_slice() {
            [] => Operand::new(Mode::NoValue, TypeId::VOID),
            [single] => Operand::new(Mode::Value, *single),
            results => {
                let tuple = self.pool.tuple(results.to_vec());
                Operand::new(Mode::Value, tuple)
            }
        })
    }

    fn arguments(
        &mut self,
        call: ExprId,
        func: ExprId,
        sig: &Signature,
        args: &[ExprId],
        spread: bool,
    ) -> CheckResult<()> {
        if spread && !sig.variadic {
            return Err(self.error(
                ErrorCode::E2003,
                self.span(call),
                format!(
                    "have (...) but function is not variadic: {}",
                    self.expr_str(func)
                ),
            ));
        }

        // f(g()) where g returns several values.
        if let [single] = args {
            let op = self.expr(*single, None)?;
            if let Type::Tuple(values) = self.pool.get(op.ty).clone() {
                if values.len() > 1 {
                    return self.tuple_arguments(call, func, sig, *single, &values);
                }
            }
            return self.check_arguments(call, func, sig, vec![(*single, op)], spread);
        }

        let mut ops = Vec::with_capacity(args.len());
        for (i, arg) in args.iter().enumerate() {
            let hint = self.param_type(sig, i, spread);
            ops.push((*arg, self.expr(*arg, hint)?));
        }
        self.check_arguments(call, func, sig, ops, spread)
    }

    /// Type of the parameter receiving argument `i`.
    fn param_type(&self, sig: &Signature, i: usize, spread: bool) -> Option<TypeId> {
        let n = sig.params.len();
        if sig.variadic && !spread && i + 1 >= n {
            let last = *sig.params.last()?;
            return match self.pool.get(last) {
                Type::Slice(elem) => Some(*elem),
                _ => None,
            };
        }
        sig.params.get(i).copied()
    }

    fn check_arguments(
        &mut self,
        call: ExprId,
        func: ExprId,
        sig: &Signature,
        ops: Vec<(ExprId, Operand)>,
        spread: bool,
    ) -> CheckResult<()> {
        let n = sig.params.len();
        let count_ok = if sig.variadic && !spread {
            ops.len() + 1 >= n
        } else {
            ops.len() == n
        };
        if !count_ok {
            return Err(self.argument_count(call, func, ops.len() < n));
        }
        for (i, (arg, mut op)) in ops.into_iter().enumerate() {
            self.single_value(arg, &op)?;
            let target = self.param_type(sig, i, spread).unwrap_or(TypeId::INVALID);
            self.assign_to(arg, &mut op, target, "argument")?;
        }
        Ok(())
    }

    fn tuple_arguments(
        &mut self,
        call: ExprId,
        func: ExprId,
        sig: &Signature,
        arg: ExprId,
        values: &[TypeId],
    ) -> CheckResult<()> {
        let n = sig.params.len();
        let count_ok = if sig.variadic {
            values.len() + 1 >= n
        } else {
            values.len() == n
        };
        if !count_ok {
            return Err(self.argument_count(call, func, values.len() < n));
        }
        for (i, value) in values.iter().enumerate() {
            let target = self.param_type(sig, i, false).unwrap_or(TypeId::INVALID);
            if !self.assignable(*value, target) {
                return Err(self.error(
                    ErrorCode::E2002,
                    self.span(arg),
                    format!(
                        "cannot use {} value as {} value in argument to {}",
                        self.type_str(*value),
                        self.type_str(target),
                        self.expr_str(func)
                    ),
                ));
            }
        }
        Ok(())
    }

    fn argument_count(&self, call: ExprId, func: ExprId, too_few: bool) -> TypeCheckError {
        let which = if too_few { "not enough" } else { "too many" };
        self.error(
            ErrorCode::E2003,
            self.span(call),
            format!("{which} arguments in call to {}", self.expr_str(func)),
        )
    }

    // === Conversions ===

    fn conversion(
        &mut self,
        id: ExprId,
        target: TypeId,
        args: &[ExprId],
        spread: bool,
    ) -> CheckResult<Operand> {
        let [arg] = args else {
            let which = if args.is_empty() { "missing" } else { "too many" };
            return Err(self.error(
                ErrorCode::E2003,
                self.span(id),
                format!("{which} argument in conversion to {}", self.type_str(target)),
            ));
        };
        if spread {
            return Err(self.error(
                ErrorCode::E2003,
                self.span(id),
                format!("invalid use of ... in conversion to {}", self.type_str(target)),
            ));
        }
        let mut x = self.value_expr(*arg, Some(target))?;
        if x.ty.is_invalid() || target.is_invalid() {
            return Ok(Operand::new(Mode::Value, target));
        }

        if let (Mode::Constant, Some(value), Some(kind)) =
            (&x.mode, x.value.clone(), self.pool.basic(target))
        {
            if let Some(converted) = self.convert_constant(&value, x.ty, kind) {
                return Ok(Operand::constant(target, converted));
            }
            if kind.is_numeric() && value.as_float().is_some() {
                let mut err = self.cannot_convert(*arg, &x, target);
                err.message.push_str(" (truncated)");
                return Err(err);
            }
        }

        if self.pool.is_untyped(x.ty) {
            if x.ty == TypeId::UNTYPED_NIL {
                if self.pool.is_nillable(target) {
                    return Ok(Operand::new(Mode::Value, target));
                }
                return Err(self.cannot_convert(*arg, &x, target));
            }
            let default = self.pool.default_type(x.ty);
            self.convert_untyped(*arg, &mut x, default, "conversion")?;
        }
        if self.convertible(x.ty, target) {
            Ok(Operand::new(Mode::Value, target))
        } else {
            Err(self.cannot_convert(*arg, &x, target))
        }
    }

    /// Constant conversions keep the result constant. `None` means the
    /// conversion is not a constant one, or the value does not fit and the
    /// general rules report it.
    fn convert_constant(
        &self,
        value: &ConstValue,
        from: TypeId,
        kind: BasicKind,
    ) -> Option<ConstValue> {
        if kind.is_string() {
            return match value {
                ConstValue::String(_) => Some(value.clone()),
                ConstValue::Int(v) if self.pool.is_integer(from) || self.pool.is_untyped(from) => {
                    let c = u32::try_from(*v)
                        .ok()
                        .and_then(char::from_u32)
                        .unwrap_or(char::REPLACEMENT_CHARACTER);
                    Some(ConstValue::String(c.to_string()))
                }
                _ => None,
            };
        }
        if kind.is_numeric() && matches!(value, ConstValue::Int(_) | ConstValue::Float(_)) {
            if kind.is_integer() && matches!(value, ConstValue::Float(f) if f.fract() != 0.0) {
                return None;
            }
            return value.represent(kind).ok();
        }
        if kind.is_boolean() {
            return value.as_bool().map(ConstValue::Bool);
        }
        None
    }

    fn convertible(&mut self, from: TypeId, to: TypeId) -> bool {
        if self.assignable(from, to) {
            return true;
        }
        let fu = self.pool.underlying(from);
        let tu = self.pool.underlying(to);
        if fu == tu {
            return true;
        }
        if let (Some(a), Some(b)) = (self.pool.pointer_elem(from), self.pool.pointer_elem(to)) {
            if !self.pool.is_named(from) && !self.pool.is_named(to) {
                return self.pool.underlying(a) == self.pool.underlying(b);
            }
        }
        let numeric = |c: &Self, ty| c.pool.is_numeric(ty);
        if numeric(self, from) && numeric(self, to) {
            return true;
        }
        let bytes_or_runes = |c: &Self, ty| match c.pool.underlying_type(ty) {
            Type::Slice(elem) => matches!(c.pool.basic(*elem), Some(BasicKind::Uint8 | BasicKind::Int32)),
            _ => false,
        };
        if self.pool.is_string(to) && (self.pool.is_integer(from) || bytes_or_runes(self, from)) {
            return true;
        }
        self.pool.is_string(from) && bytes_or_runes(self, to)
    }

    fn cannot_convert(&self, arg: ExprId, x: &Operand, target: TypeId) -> TypeCheckError {
        self.error(
            ErrorCode::E2002,
            self.span(arg),
            format!(
                "cannot convert {} ({}) to type {}",
                self.expr_str(arg),
                self.describe(x),
                self.type_str(target)
            ),
        )
    }

    // === Builtins ===

    fn builtin(
        &mut self,
        id: ExprId,
        builtin: Builtin,
        args: &[ExprId],
        spread: bool,
    ) -> CheckResult<Operand> {
        let (min, max) = match builtin {
            Builtin::Append | Builtin::Print | Builtin::Println => (usize::from(builtin == Builtin::Append), usize::MAX),
            Builtin::Make => (1, 3),
            Builtin::Recover => (0, 0),
            Builtin::Complex | Builtin::Copy | Builtin::Delete => (2, 2),
            Builtin::Cap
            | Builtin::Close
            | Builtin::Imag
            | Builtin::Len
            | Builtin::New
            | Builtin::Panic
            | Builtin::Real => (1, 1),
        };
        if args.len() < min || args.len() > max {
            let which = if args.len() < min { "not enough" } else { "too many" };
            return Err(self.error(
                ErrorCode::E2003,
                self.span(id),
                format!("{which} arguments for {}", builtin.name()),
            ));
        }
        if spread && builtin != Builtin::Append {
            return Err(self.error(
                ErrorCode::E2003,
                self.span(id),
                format!("invalid operation: invalid use of ... with built-in {}", builtin.name()),
            ));
        }

        match builtin {
            Builtin::Len | Builtin::Cap => self.len_cap(id, builtin, args[0]),
            Builtin::Append => self.append(id, args, spread),
            Builtin::Make => self.make(id, args),
            Builtin::New => {
                let t = self.type_argument(args[0])?;
                Ok(Operand::new(Mode::Value, self.pool.pointer(t)))
            }
            Builtin::Delete => {
                let m = self.value_expr(args[0], None)?;
                let Type::Map { key, .. } = self.pool.underlying_type(m.ty).clone() else {
                    return Err(self.bad_builtin_arg(args[0], &m, "is not a map"));
                };
                let mut k = self.value_expr(args[1], Some(key))?;
                self.assign_to(args[1], &mut k, key, "argument to delete")?;
                Ok(Operand::new(Mode::NoValue, TypeId::VOID))
            }
            Builtin::Copy => {
                let dst = self.value_expr(args[0], None)?;
                let mut src = self.value_expr(args[1], None)?;
                if src.ty == TypeId::UNTYPED_STRING {
                    self.convert_untyped(args[1], &mut src, TypeId::STRING, "argument to copy")?;
                }
                let Type::Slice(elem) = self.pool.underlying_type(dst.ty).clone() else {
                    return Err(self.bad_builtin_arg(args[0], &dst, "is not a slice"));
                };
                let ok = match self.pool.underlying_type(src.ty).clone() {
                    Type::Slice(src_elem) => src_elem == elem,
                    Type::Basic(kind) if kind.is_string() => elem == TypeId::BYTE,
                    _ => false,
                };
                if !ok {
                    return Err(self.error(
                        ErrorCode::E2002,
                        self.span(id),
                        format!(
                            "invalid argument: copy expects slice arguments with identical element types; found {} and {}",
                            self.type_str(dst.ty),
                            self.type_str(src.ty)
                        ),
                    ));
                }
                Ok(Operand::new(Mode::Value, TypeId::INT))
            }
            Builtin::Close => {
                let c = self.value_expr(args[0], None)?;
                match self.pool.underlying_type(c.ty) {
                    Type::Chan { dir: ChanDir::Recv, .. } => {
                        Err(self.bad_builtin_arg(args[0], &c, "must not be a receive-only channel"))
                    }
                    Type::Chan { .. } | Type::Invalid => Ok(Operand::new(Mode::NoValue, TypeId::VOID)),
                    _ => Err(self.bad_builtin_arg(args[0], &c, "is not a channel")),
                }
            }
            Builtin::Panic => {
                let mut x = self.value_expr(args[0], None)?;
                self.assign_to(args[0], &mut x, TypeId::EMPTY_INTERFACE, "argument to panic")?;
                Ok(Operand::new(Mode::NoValue, TypeId::VOID))
            }
            Builtin::Print | Builtin::Println => {
                for arg in args {
                    let mut x = self.value_expr(*arg, None)?;
                    if x.ty != TypeId::UNTYPED_NIL {
                        self.default_operand(*arg, &mut x, "argument to print")?;
                    }
                }
                Ok(Operand::new(Mode::NoValue, TypeId::VOID))
            }
            Builtin::Recover => Ok(Operand::new(Mode::Value, TypeId::EMPTY_INTERFACE)),
            Builtin::Complex => {
                for arg in args {
                    let mut x = self.value_expr(*arg, None)?;
                    self.convert_untyped(*arg, &mut x, TypeId::FLOAT64, "argument to complex")?;
                    if !self.pool.is_float(x.ty) && !x.ty.is_invalid() {
                        return Err(self.bad_builtin_arg(*arg, &x, "must be a float"));
                    }
                }
                Ok(Operand::new(Mode::Value, TypeId::COMPLEX128))
            }
            Builtin::Real | Builtin::Imag => {
                let mut x = self.value_expr(args[0], None)?;
                self.convert_untyped(args[0], &mut x, TypeId::COMPLEX128, "argument")?;
                let result = match self.pool.basic(x.ty) {
                    Some(BasicKind::Complex64) => TypeId::FLOAT32,
                    Some(BasicKind::Complex128) => TypeId::FLOAT64,
                    _ if x.ty.is_invalid() => TypeId::INVALID,
                    _ => return Err(self.bad_builtin_arg(args[0], &x, "must be of complex type")),
                };
                Ok(Operand::new(Mode::Value, result))
            }
        }
    }

    fn len_cap(&mut self, id: ExprId, builtin: Builtin, arg: ExprId) -> CheckResult<Operand> {
        let mut x = self.value_expr(arg, None)?;
        if x.ty == TypeId::UNTYPED_STRING {
            self.convert_untyped(arg, &mut x, TypeId::STRING, "argument to len")?;
        }
        let ok = match self.pool.underlying_type(x.ty).clone() {
            Type::Invalid | Type::Slice(_) | Type::Array { .. } | Type::Chan { .. } => true,
            Type::Basic(kind) => kind.is_string() && builtin == Builtin::Len,
            Type::Map { .. } => builtin == Builtin::Len,
            Type::Pointer(inner) => matches!(self.pool.underlying_type(inner), Type::Array { .. }),
            _ => false,
        };
        if !ok {
            return Err(self.error(
                ErrorCode::E2010,
                self.span(id),
                format!(
                    "invalid argument: {} ({}) for built-in {}",
                    self.expr_str(arg),
                    self.describe(&x),
                    builtin.name()
                ),
            ));
        }
        if let (Mode::Constant, Some(ConstValue::String(s))) = (&x.mode, &x.value) {
            let len = i128::try_from(s.len()).unwrap_or(i128::MAX);
            return Ok(Operand::constant(TypeId::INT, ConstValue::Int(len)));
        }
        Ok(Operand::new(Mode::Value, TypeId::INT))
    }

    fn append(&mut self, id: ExprId, args: &[ExprId], spread: bool) -> CheckResult<Operand> {
        let s = self.value_expr(args[0], None)?;
        if s.ty == TypeId::UNTYPED_NIL {
            return Err(self.error(
                ErrorCode::E2010,
                self.span(args[0]),
                "first argument to append must be a typed slice; have untyped nil",
            ));
        }
        if s.ty.is_invalid() {
            return Ok(Operand::invalid());
        }
        let Type::Slice(elem) = self.pool.underlying_type(s.ty).clone() else {
            return Err(self.bad_builtin_arg(args[0], &s, "is not a slice"));
        };
        let rest = &args[1..];
        if spread {
            let [tail] = rest else {
                return Err(self.error(
                    ErrorCode::E2003,
                    self.span(id),
                    "can only use ... with final argument in list",
                ));
            };
            let mut t = self.value_expr(*tail, None)?;
            if t.ty == TypeId::UNTYPED_STRING {
                self.convert_untyped(*tail, &mut t, TypeId::STRING, "argument to append")?;
            }
            if elem == TypeId::BYTE && self.pool.is_string(t.ty) {
                return Ok(Operand::new(Mode::Value, s.ty));
            }
            self.assign_to(*tail, &mut t, s.ty, "argument to append")?;
            return Ok(Operand::new(Mode::Value, s.ty));
        }
        for arg in rest {
            let mut x = self.value_expr(*arg, Some(elem))?;
            self.assign_to(*arg, &mut x, elem, "argument to append")?;
        }
        Ok(Operand::new(Mode::Value, s.ty))
    }

    fn make(&mut self, id: ExprId, args: &[ExprId]) -> CheckResult<Operand> {
        let t = self.type_argument(args[0])?;
        let (min, max) = match self.pool.underlying_type(t) {
            Type::Slice(_) => (2, 3),
            Type::Map { .. } | Type::Chan { .. } => (1, 2),
            Type::Invalid => (1, 3),
            _ => {
                return Err(self.error(
                    ErrorCode::E2010,
                    self.span(args[0]),
                    format!(
                        "invalid argument: cannot make {}; type must be slice, map, or channel",
                        self.type_str(t)
                    ),
                ))
            }
        };
        if args.len() < min || args.len() > max {
            return Err(self.error(
                ErrorCode::E2003,
                self.span(id),
                format!(
                    "invalid operation: {} expects {min} or {max} arguments; found {}",
                    self.expr_str(id),
                    args.len()
                ),
            ));
        }
        for size in &args[1..] {
            self.index_value(*size, None)?;
        }
        Ok(Operand::new(Mode::Value, t))
    }

    fn type_argument(&mut self, arg: ExprId) -> CheckResult<TypeId> {
        let op = self.expr(arg, None)?;
        if op.mode == Mode::TypeExpr {
            return Ok(op.ty);
        }
        Err(self.error(
            ErrorCode::E2016,
            self.span(arg),
            format!("{} is not a type", self.expr_str(arg)),
        ))
    }

    fn bad_builtin_arg(&self, arg: ExprId, x: &Operand, what: &str) -> TypeCheckError {
        self.error(
            ErrorCode::E2010,
            self.span(arg),
            format!(
                "invalid argument: {} ({}) {what}",
                self.expr_str(arg),
                self.describe(x)
            ),
        )
    }
}
