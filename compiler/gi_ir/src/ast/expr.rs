use super::{BinaryOp, Block, FuncSig, TypeExpr, UnaryOp};
use crate::{Name, Span};
use std::fmt;

/// Index into an [`ExprArena`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct ExprId(u32);

impl ExprId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        ExprId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExprId({})", self.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Ident(Name),
    Int(u128),
    /// `f64` bits.
    Float(u64),
    Str(Name),
    Char(char),
    /// `T{...}`; `ty` is `None` for elided element literals like the inner
    /// braces of `[][]int{{1}, {2}}`.
    CompositeLit {
        ty: Option<TypeExpr>,
        elements: Vec<Element>,
    },
    FuncLit {
        sig: FuncSig,
        body: Block,
    },
    Paren(ExprId),
    Selector {
        base: ExprId,
        field: Name,
        field_span: Span,
    },
    Index {
        base: ExprId,
        index: ExprId,
    },
    Slice {
        base: ExprId,
        low: Option<ExprId>,
        high: Option<ExprId>,
        max: Option<ExprId>,
    },
    /// `x.(T)`, or `x.(type)` when `ty` is `None`.
    TypeAssert {
        base: ExprId,
        ty: Option<TypeExpr>,
    },
    Call {
        func: ExprId,
        args: Vec<ExprId>,
        /// Final argument written as `xs...`.
        spread: bool,
    },
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    Binary {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },
    /// A type literal in expression position, e.g. the `[]int` in `make([]int, 3)`.
    Type(TypeExpr),
}

/// Composite literal element, optionally keyed.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub key: Option<ExprId>,
    pub value: ExprId,
}

/// Flat storage for every expression of a unit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExprArena {
    exprs: Vec<Expr>,
}

impl ExprArena {
    pub fn new() -> Self {
        ExprArena { exprs: Vec::new() }
    }

    pub fn alloc(&mut self, kind: ExprKind, span: Span) -> ExprId {
        let id = ExprId::new(u32::try_from(self.exprs.len()).unwrap_or(u32::MAX));
        self.exprs.push(Expr { kind, span });
        id
    }

    /// # Panics
    /// Panics if `id` came from a different arena.
    #[inline]
    pub fn get(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    #[inline]
    pub fn kind(&self, id: ExprId) -> &ExprKind {
        &self.get(id).kind
    }

    #[inline]
    pub fn span(&self, id: ExprId) -> Span {
        self.get(id).span
    }

    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }

    /// Strip any number of enclosing parentheses.
    pub fn unparen(&self, mut id: ExprId) -> ExprId {
        while let ExprKind::Paren(inner) = self.kind(id) {
            id = *inner;
        }
        id
    }
}
