//! What the checker learned about a unit, for the emitter.

use crate::{Builtin, ConstValue, DeclId, FieldSelection, MethodEntry, TypeId};
use gi_ir::ast::Unit;
use gi_ir::{ExprId, Name, Span};
use rustc_hash::{FxHashMap, FxHashSet};

/// A function-local variable, constant or type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct LocalId(pub(crate) u32);

/// What an identifier expression refers to.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolution {
    Global(DeclId),
    Local(LocalId),
    Builtin(Builtin),
    /// A predeclared type, or a type that only lives in a function body.
    Type(TypeId),
    /// `true`, `false` or `iota`.
    Constant,
    Nil,
    /// An imported package, by import path.
    Package(Name),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Selection {
    Field(FieldSelection),
    Method(MethodEntry),
    /// `T.Method`, a function whose first parameter is the receiver.
    MethodExpr(MethodEntry),
    /// `pkg.Member` on an imported package; left unresolved.
    Qualified,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CallKind {
    Conversion(TypeId),
    Builtin(Builtin),
    Func,
    Method,
}

#[derive(Clone, Debug, Default)]
pub struct TypeInfo {
    /// Type of every checked expression, after untyped constants took their
    /// final type.
    pub types: FxHashMap<ExprId, TypeId>,
    /// Folded value of every constant expression.
    pub consts: FxHashMap<ExprId, ConstValue>,
    pub uses: FxHashMap<ExprId, Resolution>,
    /// Keyed by the selector expression.
    pub selections: FxHashMap<ExprId, Selection>,
    pub calls: FxHashMap<ExprId, CallKind>,
    /// Every resolved type expression, keyed by its span.
    pub type_exprs: FxHashMap<Span, TypeId>,
    /// Type of every variable, constant and function name at its defining
    /// identifier.
    pub defs: FxHashMap<Span, TypeId>,
    /// Value of every constant at its defining identifier.
    pub const_defs: FxHashMap<Span, ConstValue>,
    /// Names on the left of a function-level `:=` that assign rather than
    /// declare.
    pub reassigned: FxHashSet<Span>,
    /// Index, assertion and receive expressions used in `v, ok` form.
    pub comma_ok: FxHashSet<ExprId>,
}

impl TypeInfo {
    pub fn type_of(&self, id: ExprId) -> TypeId {
        self.types.get(&id).copied().unwrap_or(TypeId::INVALID)
    }

    pub fn const_value(&self, id: ExprId) -> Option<&ConstValue> {
        self.consts.get(&id)
    }
}

/// A unit that passed the checker, with everything the emitter needs.
#[derive(Clone, Debug)]
pub struct CheckedUnit {
    pub unit: Unit,
    pub info: TypeInfo,
}
