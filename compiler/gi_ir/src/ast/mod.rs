//! Syntax tree for one top-level construct.
//!
//! Expressions live in an [`ExprArena`] and are referenced by [`ExprId`];
//! statements, declarations and type expressions are ordinary owned trees
//! that hold `ExprId`s at their leaves.

mod decl;
mod expr;
mod ops;
mod stmt;
mod types;

pub use decl::{ConstSpec, Decl, FuncDecl, ImportSpec, Item, TypeSpec, Unit, VarSpec};
pub use expr::{Element, Expr, ExprArena, ExprId, ExprKind};
pub use ops::{AssignOp, BinaryOp, UnaryOp};
pub use stmt::{Block, BranchKind, CaseClause, CommClause, Stmt, StmtKind, TypeCaseClause};
pub use types::{ChanDir, FieldDecl, FuncSig, InterfaceElem, Param, TypeExpr, TypeExprKind};

use crate::{Name, Span};

/// A name together with the span where it was written.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Ident {
    pub name: Name,
    pub span: Span,
}

impl Ident {
    pub fn new(name: Name, span: Span) -> Self {
        Ident { name, span }
    }
}
