use super::{AssignOp, Decl, ExprId, Ident, TypeExpr};
use crate::Span;

#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    Empty,
    Expr(ExprId),
    Send {
        chan: ExprId,
        value: ExprId,
    },
    IncDec {
        target: ExprId,
        inc: bool,
    },
    Assign {
        lhs: Vec<ExprId>,
        op: AssignOp,
        rhs: Vec<ExprId>,
    },
    /// `a, b := x, y`
    ShortVarDecl {
        names: Vec<Ident>,
        values: Vec<ExprId>,
    },
    Decl(Decl),
    Block(Block),
    If {
        init: Option<Box<Stmt>>,
        cond: ExprId,
        then: Block,
        /// Either another `If` or a `Block`.
        els: Option<Box<Stmt>>,
    },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<ExprId>,
        post: Option<Box<Stmt>>,
        body: Block,
    },
    ForRange {
        key: Option<ExprId>,
        value: Option<ExprId>,
        /// Written with `:=` rather than `=`.
        define: bool,
        expr: ExprId,
        body: Block,
    },
    Switch {
        init: Option<Box<Stmt>>,
        tag: Option<ExprId>,
        clauses: Vec<CaseClause>,
    },
    TypeSwitch {
        init: Option<Box<Stmt>>,
        binding: Option<Ident>,
        subject: ExprId,
        clauses: Vec<TypeCaseClause>,
    },
    Select {
        clauses: Vec<CommClause>,
    },
    Go(ExprId),
    Defer(ExprId),
    Return(Vec<ExprId>),
    Branch {
        kind: BranchKind,
        label: Option<Ident>,
    },
    Labeled {
        label: Ident,
        stmt: Box<Stmt>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BranchKind {
    Break,
    Continue,
    Goto,
    Fallthrough,
}

/// `case a, b:` clause; `exprs` is empty for `default`.
#[derive(Clone, Debug, PartialEq)]
pub struct CaseClause {
    pub exprs: Vec<ExprId>,
    pub is_default: bool,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// Type switch clause; a `None` entry stands for `nil`.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeCaseClause {
    pub types: Vec<Option<TypeExpr>>,
    pub is_default: bool,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// Select clause; `comm` is `None` for `default`.
#[derive(Clone, Debug, PartialEq)]
pub struct CommClause {
    pub comm: Option<Box<Stmt>>,
    pub body: Vec<Stmt>,
    pub span: Span,
}
