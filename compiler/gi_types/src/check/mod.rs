//! The checker.
//!
//! A unit is checked in three passes so that declarations inside one
//! submission may refer to each other in any order:
//!
//! 1. every type name is declared with a placeholder named type;
//! 2. type definitions are resolved, then function and method signatures
//!    are declared;
//! 3. constants, variables and statements are checked in source order,
//!    followed by function bodies.
//!
//! Every top-level name goes through [`DeclarationTable::declare`] or
//! [`DeclarationTable::declare_method`], so a name entered twice replaces
//! its earlier declaration. Checking stops at the first error; whatever was
//! declared before it stays declared.

mod assign;
mod call;
mod decl;
mod expr;
mod resolve;
mod stmt;

use crate::info::{CheckedUnit, LocalId, Resolution, TypeInfo};
use crate::{
    Builtin, ConstValue, DeclId, DeclKind, Declaration, DeclarationTable, TypeCheckError, TypeId,
    TypePool, Universe,
};
use gi_ir::ast::{Decl, Ident, Item, Unit};
use gi_ir::{ErrorCode, ExprArena, ExprId, Name, Span, StringInterner};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use crate::error::CheckResult;

/// Check `unit` against the session's table, declaring everything it
/// introduces.
pub fn check_unit(
    unit: Unit,
    interner: &StringInterner,
    pool: &mut TypePool,
    table: &mut DeclarationTable,
) -> Result<CheckedUnit, TypeCheckError> {
    let info = {
        let mut checker = Checker::new(interner, pool, table, &unit.arena);
        checker.check_items(&unit)?;
        checker.info
    };
    debug!(
        exprs = info.types.len(),
        consts = info.consts.len(),
        "checked unit"
    );
    Ok(CheckedUnit { unit, info })
}

/// How an operand may be used.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Mode {
    /// A call with no results.
    NoValue,
    Value,
    /// Addressable.
    Variable,
    /// `m[k]`: assignable, not addressable, allows `v, ok`.
    MapIndex,
    /// Type assertion or receive: allows `v, ok`.
    CommaOk,
    Constant,
    TypeExpr,
    Builtin(Builtin),
    Package,
}

#[derive(Clone, Debug)]
pub(crate) struct Operand {
    pub mode: Mode,
    pub ty: TypeId,
    pub value: Option<ConstValue>,
}

impl Operand {
    pub fn new(mode: Mode, ty: TypeId) -> Self {
        Operand {
            mode,
            ty,
            value: None,
        }
    }

    pub fn constant(ty: TypeId, value: ConstValue) -> Self {
        Operand {
            mode: Mode::Constant,
            ty,
            value: Some(value),
        }
    }

    pub fn invalid() -> Self {
        Operand::new(Mode::Value, TypeId::INVALID)
    }

    pub fn is_value(&self) -> bool {
        matches!(
            self.mode,
            Mode::Value | Mode::Variable | Mode::MapIndex | Mode::CommaOk | Mode::Constant
        )
    }
}

#[derive(Clone, Debug)]
enum LocalKind {
    Var(TypeId),
    Const(TypeId, ConstValue),
    Type(TypeId),
}

#[derive(Clone, Debug)]
struct Local {
    kind: LocalKind,
}

/// Per-function state; the bottom frame stands for top-level statements.
#[derive(Clone, Debug, Default)]
struct Frame {
    /// `None` at top level, where `return` is not allowed.
    results: Option<Vec<TypeId>>,
    named_results: bool,
    loops: u32,
    breakable: u32,
    labels: Vec<Name>,
}

pub(crate) struct Checker<'a> {
    interner: &'a StringInterner,
    pool: &'a mut TypePool,
    table: &'a mut DeclarationTable,
    arena: &'a ExprArena,
    universe: Universe,
    info: TypeInfo,
    scopes: Vec<FxHashMap<Name, LocalId>>,
    locals: Vec<Local>,
    frames: Vec<Frame>,
    /// Top-level declarations referenced by the declaration being checked.
    deps: FxHashSet<DeclId>,
    iota: Option<u32>,
}

impl<'a> Checker<'a> {
    fn new(
        interner: &'a StringInterner,
        pool: &'a mut TypePool,
        table: &'a mut DeclarationTable,
        arena: &'a ExprArena,
    ) -> Self {
        let universe = Universe::new(interner, pool);
        Checker {
            interner,
            pool,
            table,
            arena,
            universe,
            info: TypeInfo::default(),
            scopes: Vec::new(),
            locals: Vec::new(),
            frames: vec![Frame::default()],
            deps: FxHashSet::default(),
            iota: None,
        }
    }

    fn check_items(&mut self, unit: &Unit) -> CheckResult<()> {
        for import in &unit.imports {
            self.declare_import(import);
        }

        let mut types = Vec::new();
        for item in &unit.items {
            if let Item::Decl(Decl::Type(specs)) = item {
                for spec in specs {
                    types.push((spec, self.declare_type_name(spec)));
                }
            }
        }
        for (spec, (id, ty)) in types {
            self.define_global_type(spec, id, ty)?;
        }

        let mut funcs = Vec::new();
        for item in &unit.items {
            if let Item::Decl(Decl::Func(func)) = item {
                funcs.push((func, self.declare_func(func)?));
            }
        }

        for item in &unit.items {
            match item {
                Item::Decl(Decl::Const(specs)) => self.global_consts(specs)?,
                Item::Decl(Decl::Var(specs)) => self.global_vars(specs)?,
                Item::Decl(Decl::Type(_) | Decl::Func(_)) => {}
                Item::Stmt(stmt) => self.top_level_stmt(stmt)?,
            }
        }

        for (func, (id, sig)) in funcs {
            self.func_body(func, id, sig)?;
        }
        Ok(())
    }

    // === Errors ===

    fn error(&self, code: ErrorCode, span: Span, message: impl Into<String>) -> TypeCheckError {
        TypeCheckError::new(code, span, message)
    }

    fn name_str(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    fn type_str(&self, ty: TypeId) -> String {
        self.pool.display(ty, self.interner)
    }

    fn span(&self, id: ExprId) -> Span {
        self.arena.span(id)
    }

    /// Source-like rendering of a short expression for messages.
    fn expr_str(&self, id: ExprId) -> String {
        use gi_ir::ast::ExprKind;
        match self.arena.kind(id) {
            ExprKind::Ident(name) => self.name_str(*name).to_string(),
            ExprKind::Selector { base, field, .. } => {
                format!("{}.{}", self.expr_str(*base), self.name_str(*field))
            }
            ExprKind::Int(v) => v.to_string(),
            ExprKind::Call { func, .. } => format!("{}()", self.expr_str(*func)),
            ExprKind::Paren(inner) => format!("({})", self.expr_str(*inner)),
            ExprKind::Str(s) => format!("{:?}", self.name_str(*s)),
            _ => "expression".to_string(),
        }
    }

    // === Scopes ===

    fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    fn frame(&mut self) -> &mut Frame {
        if self.frames.is_empty() {
            self.frames.push(Frame::default());
        }
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    /// Declare a local in the innermost scope. `_` is recorded but never
    /// bound.
    fn declare_local(&mut self, ident: &Ident, kind: LocalKind) -> LocalId {
        let id = LocalId(u32::try_from(self.locals.len()).unwrap_or(u32::MAX));
        match &kind {
            LocalKind::Var(ty) | LocalKind::Const(ty, _) => {
                self.info.defs.insert(ident.span, *ty);
            }
            LocalKind::Type(_) => {}
        }
        if let LocalKind::Const(_, value) = &kind {
            self.info.const_defs.insert(ident.span, value.clone());
        }
        self.locals.push(Local { kind });
        if !ident.name.is_blank() {
            if self.scopes.is_empty() {
                self.push_scope();
            }
            if let Some(scope) = self.scopes.last_mut() {
                scope.insert(ident.name, id);
            }
        }
        trace!(name = self.name_str(ident.name), ?id, "declared local");
        id
    }

    fn lookup_local(&self, name: Name) -> Option<(LocalId, &Local)> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(&name))
            .and_then(|id| self.locals.get(id.0 as usize).map(|local| (*id, local)))
    }

    /// Whether `name` is bound in the innermost scope.
    fn in_current_scope(&self, name: Name) -> Option<LocalId> {
        self.scopes.last().and_then(|scope| scope.get(&name).copied())
    }

    fn local_var_type(&self, id: LocalId) -> TypeId {
        match self.locals.get(id.0 as usize).map(|l| &l.kind) {
            Some(LocalKind::Var(ty)) => *ty,
            _ => TypeId::INVALID,
        }
    }

    // === Global declarations ===

    /// Declare a top-level name, recording its type at the defining ident.
    fn declare_global(&mut self, ident: &Ident, ty: TypeId, kind: DeclKind) -> DeclId {
        self.info.defs.insert(ident.span, ty);
        if let DeclKind::Const(value) = &kind {
            self.info.const_defs.insert(ident.span, value.clone());
        }
        let (id, replaced) = self
            .table
            .declare(Declaration::new(ident.name, ident.span, ty, kind));
        if let Some(old) = replaced {
            debug!(
                name = self.name_str(ident.name),
                old = old.kind.describe(),
                "redeclared"
            );
        }
        id
    }

    fn declare_import(&mut self, import: &gi_ir::ast::ImportSpec) {
        let path = self.name_str(import.path);
        let local = match &import.alias {
            Some(alias) => *alias,
            None => {
                let last = path.rsplit('/').next().unwrap_or(path);
                Ident::new(self.interner.intern(last), import.span)
            }
        };
        if local.name.is_blank() || self.name_str(local.name) == "." {
            return;
        }
        self.declare_global(
            &local,
            TypeId::INVALID,
            DeclKind::Package { path: import.path },
        );
    }

    /// Run `f` collecting the top-level declarations it references, then
    /// store them as dependencies of `id`.
    fn with_deps<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> CheckResult<T>,
    ) -> CheckResult<(T, FxHashSet<DeclId>)> {
        let saved = std::mem::take(&mut self.deps);
        let result = f(self);
        let deps = std::mem::replace(&mut self.deps, saved);
        self.deps.extend(deps.iter().copied());
        result.map(|value| (value, deps))
    }

    fn record(&mut self, id: ExprId, op: &Operand) {
        self.info.types.insert(id, op.ty);
        match &op.value {
            Some(value) if op.mode == Mode::Constant => {
                self.info.consts.insert(id, value.clone());
            }
            _ => {
                self.info.consts.remove(&id);
            }
        }
    }

    fn resolution(&mut self, id: ExprId, res: Resolution) {
        self.info.uses.insert(id, res);
    }
}

#[cfg(test)]
mod tests;
