//! Assignability and untyped constant conversion.

use super::{Checker, Mode, Operand};
use crate::error::CheckResult;
use crate::{BasicKind, ConstError, Type, TypeCheckError, TypeId};
use gi_ir::{ErrorCode, ExprId};

impl Checker<'_> {
    /// Fail unless `op` denotes a value.
    pub(super) fn require_value(&self, id: ExprId, op: &Operand) -> CheckResult<()> {
        let what = match op.mode {
            Mode::NoValue => "(no value) used as value",
            Mode::TypeExpr => "(type) is not an expression",
            Mode::Builtin(_) => "(built-in function) must be called",
            Mode::Package => "(package) is not an expression",
            _ => return Ok(()),
        };
        Err(self.error(
            ErrorCode::E2013,
            self.span(id),
            format!("{} {what}", self.expr_str(id)),
        ))
    }

    /// Give an untyped operand its default type. Untyped `nil` has none.
    pub(super) fn default_operand(
        &mut self,
        id: ExprId,
        op: &mut Operand,
        context: &str,
    ) -> CheckResult<()> {
        if op.ty == TypeId::UNTYPED_NIL {
            return Err(self.error(
                ErrorCode::E2002,
                self.span(id),
                format!("use of untyped nil in {context}"),
            ));
        }
        let target = self.pool.default_type(op.ty);
        self.convert_untyped(id, op, target, context)
    }

    /// Convert an untyped operand to `target`, checking that a constant
    /// value is representable. Typed operands are left alone.
    pub(super) fn convert_untyped(
        &mut self,
        id: ExprId,
        op: &mut Operand,
        target: TypeId,
        context: &str,
    ) -> CheckResult<()> {
        if !self.pool.is_untyped(op.ty) || target.is_invalid() || op.ty == target {
            return Ok(());
        }
        if op.ty == TypeId::UNTYPED_NIL {
            if !self.pool.is_nillable(target) {
                return Err(self.cannot_use(id, op, target, context));
            }
            op.ty = target;
            self.record(id, op);
            return Ok(());
        }
        if self.pool.is_interface(target) {
            // Untyped values stored in an interface take their default type.
            let default = self.pool.default_type(op.ty);
            return self.convert_untyped(id, op, default, context);
        }
        let (Some(target_kind), Type::Basic(from)) = (self.pool.basic(target), self.pool.get(op.ty))
        else {
            return Err(self.cannot_use(id, op, target, context));
        };
        let from = *from;
        let compatible = match from {
            BasicKind::UntypedBool => target_kind.is_boolean(),
            BasicKind::UntypedInt | BasicKind::UntypedRune | BasicKind::UntypedFloat => {
                target_kind.is_numeric()
            }
            BasicKind::UntypedString => target_kind.is_string(),
            _ => false,
        };
        if !compatible {
            return Err(self.cannot_use(id, op, target, context));
        }
        if let Some(value) = &op.value {
            let converted = value
                .represent(target_kind)
                .map_err(|err| self.representation_error(id, op, target, context, err))?;
            op.value = Some(converted);
        }
        op.ty = target;
        self.record(id, op);
        Ok(())
    }

    fn representation_error(
        &self,
        id: ExprId,
        op: &Operand,
        target: TypeId,
        context: &str,
        err: ConstError,
    ) -> TypeCheckError {
        let value = op
            .value
            .as_ref()
            .map_or_else(String::new, ToString::to_string);
        let message = match err {
            ConstError::Overflow => {
                format!("constant {value} overflows {}", self.type_str(target))
            }
            ConstError::Truncated => format!(
                "cannot use {} (untyped float constant {value}) as {} value in {context} (truncated)",
                self.expr_str(id),
                self.type_str(target)
            ),
            _ => return self.cannot_use(id, op, target, context),
        };
        self.error(ErrorCode::E2002, self.span(id), message)
    }

    pub(super) fn cannot_use(
        &self,
        id: ExprId,
        op: &Operand,
        target: TypeId,
        context: &str,
    ) -> TypeCheckError {
        let what = if op.mode == Mode::Constant && self.pool.is_untyped(op.ty) {
            format!("{} constant", self.type_str(op.ty))
        } else if op.mode == Mode::Variable {
            format!("variable of type {}", self.type_str(op.ty))
        } else {
            format!("value of type {}", self.type_str(op.ty))
        };
        self.error(
            ErrorCode::E2002,
            self.span(id),
            format!(
                "cannot use {} ({what}) as {} value in {context}",
                self.expr_str(id),
                self.type_str(target)
            ),
        )
    }

    /// Check that `op` may be assigned to a location of type `target`,
    /// converting untyped constants on the way.
    pub(super) fn assign_to(
        &mut self,
        id: ExprId,
        op: &mut Operand,
        target: TypeId,
        context: &str,
    ) -> CheckResult<()> {
        self.require_value(id, op)?;
        self.convert_untyped(id, op, target, context)?;
        if self.assignable(op.ty, target) {
            return Ok(());
        }
        let mut err = self.cannot_use(id, op, target, context);
        if self.pool.is_interface(target) {
            if let Err(missing) = self.table.implements(self.pool, op.ty, target) {
                let reason = if missing.pointer_receiver {
                    format!("method {} has pointer receiver", self.name_str(missing.name))
                } else if missing.wrong_type {
                    format!("wrong type for method {}", self.name_str(missing.name))
                } else {
                    format!("missing method {}", self.name_str(missing.name))
                };
                err.message = format!(
                    "{}: {} does not implement {} ({reason})",
                    err.message,
                    self.type_str(op.ty),
                    self.type_str(target)
                );
            }
        }
        Err(err)
    }

    pub(super) fn assignable(&mut self, value: TypeId, target: TypeId) -> bool {
        if value == target || value.is_invalid() || target.is_invalid() {
            return true;
        }
        if value == TypeId::UNTYPED_NIL {
            return self.pool.is_nillable(target);
        }
        let vu = self.pool.underlying(value);
        let tu = self.pool.underlying(target);
        let one_unnamed = !self.pool.is_named(value) || !self.pool.is_named(target);
        if vu == tu && one_unnamed {
            return true;
        }
        if self.pool.is_interface(target) {
            return self.table.implements(self.pool, value, target).is_ok();
        }
        if let (
            Type::Chan {
                dir: gi_ir::ast::ChanDir::Both,
                elem: ve,
            },
            Type::Chan { elem: te, .. },
        ) = (self.pool.get(vu), self.pool.get(tu))
        {
            return ve == te && one_unnamed;
        }
        false
    }

    /// Types of two operands compared or combined by a binary operator,
    /// after each untyped side takes the other's type.
    pub(super) fn match_operands(
        &mut self,
        left_id: ExprId,
        left: &mut Operand,
        right_id: ExprId,
        right: &mut Operand,
        context: &str,
    ) -> CheckResult<()> {
        let lu = self.pool.is_untyped(left.ty);
        let ru = self.pool.is_untyped(right.ty);
        match (lu, ru) {
            (true, false) => self.convert_untyped(left_id, left, right.ty, context),
            (false, true) => self.convert_untyped(right_id, right, left.ty, context),
            (true, true) => {
                // Both untyped: the "larger" numeric kind wins.
                if left.ty == TypeId::UNTYPED_NIL || right.ty == TypeId::UNTYPED_NIL {
                    return Ok(());
                }
                let rank = |ty: TypeId| match ty {
                    TypeId::UNTYPED_INT => 1,
                    TypeId::UNTYPED_RUNE => 2,
                    TypeId::UNTYPED_FLOAT => 3,
                    _ => 0,
                };
                let (l, r) = (rank(left.ty), rank(right.ty));
                if l > 0 && r > 0 {
                    let wider = if l >= r { left.ty } else { right.ty };
                    left.ty = wider;
                    right.ty = wider;
                }
                Ok(())
            }
            (false, false) => Ok(()),
        }
    }
}
