use super::{Block, ExprArena, ExprId, FuncSig, Ident, Param, Stmt, TypeExpr};
use crate::{Name, Span};

#[derive(Clone, Debug, PartialEq)]
pub enum Decl {
    Const(Vec<ConstSpec>),
    Var(Vec<VarSpec>),
    Type(Vec<TypeSpec>),
    Func(FuncDecl),
}

/// One line of a `const` declaration.
///
/// A spec with no values repeats the type and values of the closest
/// preceding spec in the same group, evaluated with its own `iota`.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstSpec {
    pub names: Vec<Ident>,
    pub ty: Option<TypeExpr>,
    pub values: Vec<ExprId>,
    pub iota: u32,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VarSpec {
    pub names: Vec<Ident>,
    pub ty: Option<TypeExpr>,
    pub values: Vec<ExprId>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeSpec {
    pub name: Ident,
    /// `type A = B`
    pub alias: bool,
    pub ty: TypeExpr,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FuncDecl {
    pub name: Ident,
    pub receiver: Option<Param>,
    pub sig: FuncSig,
    /// `None` for a declaration without body, which the checker rejects.
    pub body: Option<Block>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImportSpec {
    pub alias: Option<Ident>,
    pub path: Name,
    pub span: Span,
}

/// A top-level item: a declaration or a statement typed at the prompt.
#[derive(Clone, Debug, PartialEq)]
pub enum Item {
    Decl(Decl),
    Stmt(Stmt),
}

/// Everything parsed from one complete buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct Unit {
    pub package: Option<Ident>,
    pub imports: Vec<ImportSpec>,
    pub items: Vec<Item>,
    pub arena: ExprArena,
    pub span: Span,
}
