//! Top-level declarations.

use crate::{ConstValue, TypeId};
use gi_ir::{Name, Span};
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;

/// Identity of one declaration. Never reused within a table, so a stale id
/// simply fails to resolve after its declaration was replaced.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct DeclId(u32);

impl DeclId {
    #[inline]
    pub(crate) const fn new(raw: u32) -> Self {
        DeclId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeclId({})", self.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Declaration {
    pub name: Name,
    pub span: Span,
    /// For a `TypeName`, the named (or aliased) type itself.
    pub ty: TypeId,
    pub kind: DeclKind,
}

impl Declaration {
    pub fn new(name: Name, span: Span, ty: TypeId, kind: DeclKind) -> Self {
        Declaration {
            name,
            span,
            ty,
            kind,
        }
    }

    pub fn is_type_name(&self) -> bool {
        matches!(self.kind, DeclKind::TypeName { .. })
    }

    /// Methods declared on this type name, if it is one.
    pub fn methods(&self) -> Option<&FxHashMap<Name, DeclId>> {
        match &self.kind {
            DeclKind::TypeName { methods, .. } => Some(methods),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DeclKind {
    Const(ConstValue),
    Var,
    TypeName {
        alias: bool,
        methods: FxHashMap<Name, DeclId>,
    },
    Func {
        receiver: Option<Receiver>,
    },
    /// An imported package. Members are not resolved.
    Package { path: Name },
}

impl DeclKind {
    pub fn type_name() -> Self {
        DeclKind::TypeName {
            alias: false,
            methods: FxHashMap::default(),
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            DeclKind::Const(_) => "constant",
            DeclKind::Var => "variable",
            DeclKind::TypeName { .. } => "type",
            DeclKind::Func { receiver: None } => "function",
            DeclKind::Func { receiver: Some(_) } => "method",
            DeclKind::Package { .. } => "package",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Receiver {
    /// The receiver's `TypeName` declaration.
    pub base: DeclId,
    pub pointer: bool,
}

/// Bookkeeping kept for every live declaration, methods included.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectInfo {
    /// Position in declaration order across the whole session.
    pub order: u32,
    pub span: Span,
    /// Declarations this one referred to when it was checked.
    pub deps: FxHashSet<DeclId>,
}
