//! Statements and function bodies.
//!
//! Go control flow maps onto Lua as follows:
//!
//! - `for` becomes `while`; a body that `continue`s is wrapped in
//!   `do ... end` followed by a `::__continue_N::` label.
//! - `switch`, type switches and `select` sit inside `repeat ... until true`
//!   so a plain `break` leaves them.
//! - Labeled `break` jumps to a `::__break_N::` label placed after the
//!   statement.
//! - `return` and `break` that are not the last statement of a block are
//!   wrapped in `do ... end`, since Lua only accepts them last.

use gi_ir::ast::{
    AssignOp, BinaryOp, Block, BranchKind, CaseClause, CommClause, ExprId, ExprKind, FuncSig,
    Ident, Param, Stmt, StmtKind, TypeCaseClause, UnaryOp,
};
use gi_ir::{Name, Span};
use gi_types::{CallKind, TypeId};

use super::decl;
use super::expr::{binary_op, emit_expr, emit_value, is_aggregate, store};
use super::literal;
use super::types::{type_desc, zero_value};
use crate::context::{BranchTarget, FuncFrame};
use crate::{EmitContext, EmitError, EmitResult};

/// Emit a statement list at the current indentation.
pub fn emit_stmts(ctx: &mut EmitContext<'_>, stmts: &[Stmt]) -> EmitResult<()> {
    for (i, stmt) in stmts.iter().enumerate() {
        emit_stmt(ctx, stmt, i + 1 == stmts.len())?;
    }
    Ok(())
}

/// Emit `stmts` one level deeper, as the body of an enclosing construct.
fn nested(ctx: &mut EmitContext<'_>, stmts: &[Stmt]) -> EmitResult<()> {
    ctx.indent();
    ctx.depth += 1;
    let result = emit_stmts(ctx, stmts);
    ctx.depth -= 1;
    ctx.dedent();
    result
}

pub fn emit_stmt(ctx: &mut EmitContext<'_>, stmt: &Stmt, last: bool) -> EmitResult<()> {
    gi_stack::with_stack(|| emit_stmt_inner(ctx, stmt, last))
}

fn emit_stmt_inner(ctx: &mut EmitContext<'_>, stmt: &Stmt, last: bool) -> EmitResult<()> {
    match &stmt.kind {
        StmtKind::Empty => Ok(()),
        StmtKind::Expr(id) => {
            let inner = ctx.arena.unparen(*id);
            let call = emit_expr(ctx, inner)?;
            ctx.writeln(&format!("{call};"));
            Ok(())
        }
        StmtKind::Send { chan, value } => {
            let ch = emit_expr(ctx, *chan)?;
            let v = emit_value(ctx, *value)?;
            ctx.writeln(&format!("__send({ch}, {v});"));
            Ok(())
        }
        StmtKind::IncDec { target, inc } => {
            let ty = ctx.info.type_of(*target);
            let op = if *inc { BinaryOp::Add } else { BinaryOp::Sub };
            let current = emit_expr(ctx, *target)?;
            let value = binary_op(ctx.pool, op, ty, &current, literal::one(ctx.pool, ty));
            let line = store(ctx, *target, &value)?;
            ctx.writeln(&line);
            Ok(())
        }
        StmtKind::Assign { lhs, op, rhs } => assign(ctx, lhs, *op, rhs),
        StmtKind::ShortVarDecl { names, values } => short_var_decl(ctx, names, values),
        StmtKind::Decl(decl) => decl::emit_decl(ctx, decl),
        StmtKind::Block(block) => {
            ctx.writeln("do");
            nested(ctx, &block.stmts)?;
            ctx.writeln("end");
            Ok(())
        }
        StmtKind::If { .. } => emit_if(ctx, stmt),
        StmtKind::For {
            init,
            cond,
            post,
            body,
        } => emit_for(ctx, None, init.as_deref(), *cond, post.as_deref(), body),
        StmtKind::ForRange {
            key,
            value,
            define,
            expr,
            body,
        } => emit_range(ctx, None, *key, *value, *define, *expr, body),
        StmtKind::Switch { init, tag, clauses } => {
            emit_switch(ctx, None, init.as_deref(), *tag, clauses)
        }
        StmtKind::TypeSwitch {
            init,
            binding,
            subject,
            clauses,
        } => emit_type_switch(ctx, None, init.as_deref(), binding.as_ref(), *subject, clauses),
        StmtKind::Select { clauses } => emit_select(ctx, None, clauses),
        StmtKind::Go(call) => spawn(ctx, "__go", *call),
        StmtKind::Defer(call) => spawn(ctx, "__defer", *call),
        StmtKind::Return(values) => {
            let values = if values.is_empty() {
                ctx.funcs
                    .last()
                    .map(|frame| frame.named_results.clone())
                    .unwrap_or_default()
            } else {
                values
                    .iter()
                    .map(|&v| emit_value(ctx, v))
                    .collect::<EmitResult<Vec<_>>>()?
            };
            let ret = if values.is_empty() {
                "return;".to_string()
            } else {
                format!("return {};", values.join(", "))
            };
            write_terminal(ctx, &ret, last);
            Ok(())
        }
        StmtKind::Branch { kind, label } => branch(ctx, *kind, label.as_ref(), stmt.span, last),
        StmtKind::Labeled { label, stmt: inner } => {
            ctx.writeln(&format!("::{}::", ctx.name(label.name)));
            let name = Some(label.name);
            match &inner.kind {
                StmtKind::For {
                    init,
                    cond,
                    post,
                    body,
                } => emit_for(ctx, name, init.as_deref(), *cond, post.as_deref(), body),
                StmtKind::ForRange {
                    key,
                    value,
                    define,
                    expr,
                    body,
                } => emit_range(ctx, name, *key, *value, *define, *expr, body),
                StmtKind::Switch { init, tag, clauses } => {
                    emit_switch(ctx, name, init.as_deref(), *tag, clauses)
                }
                StmtKind::TypeSwitch {
                    init,
                    binding,
                    subject,
                    clauses,
                } => emit_type_switch(
                    ctx,
                    name,
                    init.as_deref(),
                    binding.as_ref(),
                    *subject,
                    clauses,
                ),
                StmtKind::Select { clauses } => emit_select(ctx, name, clauses),
                _ => emit_stmt(ctx, inner, last),
            }
        }
    }
}

/// `return` and `break` must end a Lua block.
fn write_terminal(ctx: &mut EmitContext<'_>, line: &str, last: bool) {
    if last {
        ctx.writeln(line);
    } else {
        ctx.writeln(&format!("do {line} end"));
    }
}

// === Assignment ===

fn assign(ctx: &mut EmitContext<'_>, lhs: &[ExprId], op: AssignOp, rhs: &[ExprId]) -> EmitResult<()> {
    if let AssignOp::Compound(op) = op {
        let (Some(&target), Some(&value)) = (lhs.first(), rhs.first()) else {
            return Ok(());
        };
        let ty = ctx.info.type_of(target);
        let current = emit_expr(ctx, target)?;
        let value = emit_expr(ctx, value)?;
        let value = if matches!(ctx.arena.kind(rhs[0]), ExprKind::Binary { .. }) {
            format!("({value})")
        } else {
            value
        };
        let updated = binary_op(ctx.pool, op, ty, &current, &value);
        let line = store(ctx, target, &updated)?;
        ctx.writeln(&line);
        return Ok(());
    }

    let values = rhs
        .iter()
        .map(|&v| emit_value(ctx, v))
        .collect::<EmitResult<Vec<_>>>()?
        .join(", ");
    if let [target] = lhs {
        let line = store(ctx, *target, &values)?;
        ctx.writeln(&line);
        return Ok(());
    }

    let arena = ctx.arena;
    let plain = lhs
        .iter()
        .all(|&t| matches!(arena.kind(arena.unparen(t)), ExprKind::Ident(_)));
    if plain {
        let names = lhs
            .iter()
            .map(|&t| emit_expr(ctx, arena.unparen(t)))
            .collect::<EmitResult<Vec<_>>>()?;
        ctx.writeln(&format!("{} = {values};", names.join(", ")));
        return Ok(());
    }

    // Evaluate every right-hand side before the first store.
    let temps: Vec<String> = lhs.iter().map(|_| ctx.fresh_temp()).collect();
    ctx.writeln("do");
    ctx.indent();
    ctx.writeln(&format!("local {} = {values};", temps.join(", ")));
    for (target, temp) in lhs.iter().zip(&temps) {
        let line = store(ctx, *target, temp)?;
        ctx.writeln(&line);
    }
    ctx.dedent();
    ctx.writeln("end");
    Ok(())
}

fn short_var_decl(ctx: &mut EmitContext<'_>, names: &[Ident], values: &[ExprId]) -> EmitResult<()> {
    let rhs = values
        .iter()
        .map(|&v| emit_value(ctx, v))
        .collect::<EmitResult<Vec<_>>>()?
        .join(", ");
    let lhs: Vec<String> = names.iter().map(|n| ctx.name(n.name)).collect();

    if ctx.depth == 0 {
        ctx.writeln(&format!("{} = {rhs};", lhs.join(", ")));
        return Ok(());
    }

    let fresh: Vec<&String> = names
        .iter()
        .zip(&lhs)
        .filter(|(n, _)| !ctx.info.reassigned.contains(&n.span))
        .map(|(_, name)| name)
        .collect();
    if fresh.len() == names.len() {
        ctx.writeln(&format!("local {} = {rhs};", lhs.join(", ")));
    } else {
        if !fresh.is_empty() {
            let fresh: Vec<&str> = fresh.iter().map(|s| s.as_str()).collect();
            ctx.writeln(&format!("local {};", fresh.join(", ")));
        }
        ctx.writeln(&format!("{} = {rhs};", lhs.join(", ")));
    }
    Ok(())
}

// === Branches ===

fn branch(
    ctx: &mut EmitContext<'_>,
    kind: BranchKind,
    label: Option<&Ident>,
    span: Span,
    last: bool,
) -> EmitResult<()> {
    match kind {
        BranchKind::Break => {
            let Some(label) = label else {
                write_terminal(ctx, "break;", last);
                return Ok(());
            };
            let innermost = ctx.targets.len().checked_sub(1);
            let Some(index) = ctx.targets.iter().rposition(|t| t.label == Some(label.name)) else {
                return Err(unknown_label(ctx, label, span));
            };
            if Some(index) == innermost {
                write_terminal(ctx, "break;", last);
            } else {
                let target = &mut ctx.targets[index];
                target.break_used = true;
                let line = format!("goto {};", target.break_label);
                ctx.writeln(&line);
            }
            Ok(())
        }
        BranchKind::Continue => {
            let target = match label {
                Some(label) => ctx.targets.iter().rev().find(|t| t.label == Some(label.name)),
                None => ctx.targets.iter().rev().find(|t| t.continue_label.is_some()),
            };
            let Some(continue_label) = target.and_then(|t| t.continue_label.clone()) else {
                return Err(EmitError::Internal {
                    message: "continue without an enclosing loop".to_string(),
                    span,
                });
            };
            ctx.writeln(&format!("goto {continue_label};"));
            Ok(())
        }
        BranchKind::Goto => {
            let Some(label) = label else {
                return Err(EmitError::Internal {
                    message: "goto without a label".to_string(),
                    span,
                });
            };
            ctx.writeln(&format!("goto {};", ctx.name(label.name)));
            Ok(())
        }
        // Clause bodies ending in `fallthrough` are handled by the switch.
        BranchKind::Fallthrough => Err(EmitError::Unsupported {
            what: "fallthrough outside the end of a switch case".to_string(),
            span,
        }),
    }
}

fn unknown_label(ctx: &EmitContext<'_>, label: &Ident, span: Span) -> EmitError {
    EmitError::Internal {
        message: format!("break label {} not found", ctx.resolve(label.name)),
        span,
    }
}

/// Push a break target for a statement, emit it with `f`, then place the
/// break label if a labeled `break` used it.
fn with_target(
    ctx: &mut EmitContext<'_>,
    label: Option<Name>,
    continue_label: Option<String>,
    n: u32,
    f: impl FnOnce(&mut EmitContext<'_>) -> EmitResult<()>,
) -> EmitResult<()> {
    ctx.targets.push(BranchTarget {
        label,
        continue_label,
        break_label: format!("__break_{n}"),
        break_used: false,
    });
    let result = f(ctx);
    let target = ctx.targets.pop();
    result?;
    if let Some(target) = target.filter(|t| t.break_used) {
        ctx.writeln(&format!("::{}::", target.break_label));
    }
    Ok(())
}

/// Whether any statement in `stmts` is a `continue`, at any depth.
fn has_continue(stmts: &[Stmt]) -> bool {
    stmts.iter().any(|s| {
        any_nested(s, &|s| {
            matches!(
                s.kind,
                StmtKind::Branch {
                    kind: BranchKind::Continue,
                    ..
                }
            )
        })
    })
}

/// Whether a function body defers anything. Function literals are separate
/// bodies and are not searched.
fn has_defer(stmts: &[Stmt]) -> bool {
    stmts
        .iter()
        .any(|s| any_nested(s, &|s| matches!(s.kind, StmtKind::Defer(_))))
}

fn any_nested(stmt: &Stmt, pred: &dyn Fn(&Stmt) -> bool) -> bool {
    if pred(stmt) {
        return true;
    }
    let any = |stmts: &[Stmt]| stmts.iter().any(|s| any_nested(s, pred));
    let boxed = |s: &Option<Box<Stmt>>| s.as_deref().is_some_and(|s| any_nested(s, pred));
    match &stmt.kind {
        StmtKind::Block(block) => any(&block.stmts),
        StmtKind::If {
            init, then, els, ..
        } => boxed(init) || any(&then.stmts) || boxed(els),
        StmtKind::For {
            init, post, body, ..
        } => boxed(init) || boxed(post) || any(&body.stmts),
        StmtKind::ForRange { body, .. } => any(&body.stmts),
        StmtKind::Switch { init, clauses, .. } => {
            boxed(init) || clauses.iter().any(|c| any(&c.body))
        }
        StmtKind::TypeSwitch { init, clauses, .. } => {
            boxed(init) || clauses.iter().any(|c| any(&c.body))
        }
        StmtKind::Select { clauses } => clauses.iter().any(|c| any(&c.body)),
        StmtKind::Labeled { stmt, .. } => any_nested(stmt, pred),
        _ => false,
    }
}

// === Control flow ===

/// Open a `do` scope for an init statement.
fn open_init(ctx: &mut EmitContext<'_>, init: Option<&Stmt>) -> EmitResult<bool> {
    let Some(init) = init else {
        return Ok(false);
    };
    ctx.writeln("do");
    ctx.indent();
    ctx.depth += 1;
    emit_stmt(ctx, init, false)?;
    Ok(true)
}

fn close_init(ctx: &mut EmitContext<'_>, opened: bool) {
    if opened {
        ctx.depth -= 1;
        ctx.dedent();
        ctx.writeln("end");
    }
}

fn emit_if(ctx: &mut EmitContext<'_>, stmt: &Stmt) -> EmitResult<()> {
    let StmtKind::If {
        init,
        cond,
        then,
        els,
    } = &stmt.kind
    else {
        return Ok(());
    };
    let opened = open_init(ctx, init.as_deref())?;
    let cond = emit_expr(ctx, *cond)?;
    ctx.writeln(&format!("if {cond} then"));
    nested(ctx, &then.stmts)?;

    let mut els = els.as_deref();
    while let Some(next) = els {
        match &next.kind {
            StmtKind::If {
                init: None,
                cond,
                then,
                els: rest,
            } => {
                let cond = emit_expr(ctx, *cond)?;
                ctx.writeln(&format!("elseif {cond} then"));
                nested(ctx, &then.stmts)?;
                els = rest.as_deref();
            }
            StmtKind::Block(block) => {
                ctx.writeln("else");
                nested(ctx, &block.stmts)?;
                els = None;
            }
            _ => {
                ctx.writeln("else");
                nested(ctx, std::slice::from_ref(next))?;
                els = None;
            }
        }
    }
    ctx.writeln("end");
    close_init(ctx, opened);
    Ok(())
}

fn emit_for(
    ctx: &mut EmitContext<'_>,
    label: Option<Name>,
    init: Option<&Stmt>,
    cond: Option<ExprId>,
    post: Option<&Stmt>,
    body: &Block,
) -> EmitResult<()> {
    let n = ctx.fresh_label();
    let continues = has_continue(&body.stmts);
    let continue_label = continues.then(|| format!("__continue_{n}"));
    let opened = open_init(ctx, init)?;
    let cond = match cond {
        Some(cond) => emit_expr(ctx, cond)?,
        None => "true".to_string(),
    };
    with_target(ctx, label, continue_label.clone(), n, |ctx| {
        ctx.writeln(&format!("while {cond} do"));
        ctx.indent();
        ctx.depth += 1;
        let result = loop_body(ctx, &body.stmts, continue_label.as_deref()).and_then(|()| {
            match post {
                Some(post) => emit_stmt(ctx, post, false),
                None => Ok(()),
            }
        });
        ctx.depth -= 1;
        ctx.dedent();
        ctx.writeln("end");
        result
    })?;
    close_init(ctx, opened);
    Ok(())
}

/// A loop body, wrapped so that `goto __continue_N` can jump past the
/// body's locals to the label.
fn loop_body(ctx: &mut EmitContext<'_>, stmts: &[Stmt], continue_label: Option<&str>) -> EmitResult<()> {
    let Some(label) = continue_label else {
        return emit_stmts(ctx, stmts);
    };
    ctx.writeln("do");
    nested(ctx, stmts)?;
    ctx.writeln("end");
    ctx.writeln(&format!("::{label}::"));
    Ok(())
}

fn emit_range(
    ctx: &mut EmitContext<'_>,
    label: Option<Name>,
    key: Option<ExprId>,
    value: Option<ExprId>,
    define: bool,
    expr: ExprId,
    body: &Block,
) -> EmitResult<()> {
    let n = ctx.fresh_label();
    let continue_label = has_continue(&body.stmts).then(|| format!("__continue_{n}"));
    let subject = emit_expr(ctx, expr)?;
    let (vars, stores) = if define {
        let mut vars = Vec::new();
        for part in [key, value] {
            if let Some(id) = part {
                vars.push(emit_expr(ctx, id)?);
            } else if value.is_some() {
                vars.push("_".to_string());
            }
        }
        (vars, Vec::new())
    } else {
        let mut stores = Vec::new();
        if let Some(key) = key {
            if !is_blank(ctx, key) {
                stores.push(store(ctx, key, "__k")?);
            }
        }
        if let Some(value) = value {
            if !is_blank(ctx, value) {
                stores.push(store(ctx, value, "__v")?);
            }
        }
        (vec!["__k".to_string(), "__v".to_string()], stores)
    };
    let vars = if vars.is_empty() {
        "_".to_string()
    } else {
        vars.join(", ")
    };

    with_target(ctx, label, continue_label.clone(), n, |ctx| {
        ctx.writeln(&format!("for {vars} in __gi_range({subject}) do"));
        ctx.indent();
        ctx.depth += 1;
        for line in &stores {
            ctx.writeln(line);
        }
        let result = loop_body(ctx, &body.stmts, continue_label.as_deref());
        ctx.depth -= 1;
        ctx.dedent();
        ctx.writeln("end");
        result
    })
}

fn is_blank(ctx: &EmitContext<'_>, id: ExprId) -> bool {
    matches!(ctx.arena.kind(id), ExprKind::Ident(name) if name.is_blank())
}

/// Open `repeat` around a switch-like statement.
fn open_repeat(ctx: &mut EmitContext<'_>, init: Option<&Stmt>) -> EmitResult<()> {
    ctx.writeln("repeat");
    ctx.indent();
    ctx.depth += 1;
    if let Some(init) = init {
        emit_stmt(ctx, init, false)?;
    }
    Ok(())
}

fn close_repeat(ctx: &mut EmitContext<'_>) {
    ctx.depth -= 1;
    ctx.dedent();
    ctx.writeln("until true");
}

/// Write an `if`/`elseif` chain. `default` runs when no condition holds.
fn condition_chain(
    ctx: &mut EmitContext<'_>,
    arms: Vec<(String, &[Stmt])>,
    default: Option<&[Stmt]>,
    prelude: impl Fn(&mut EmitContext<'_>),
) -> EmitResult<()> {
    if arms.is_empty() {
        if let Some(body) = default {
            ctx.writeln("do");
            ctx.indent();
            prelude(ctx);
            ctx.dedent();
            nested(ctx, body)?;
            ctx.writeln("end");
        }
        return Ok(());
    }
    for (i, (cond, body)) in arms.into_iter().enumerate() {
        let keyword = if i == 0 { "if" } else { "elseif" };
        ctx.writeln(&format!("{keyword} {cond} then"));
        ctx.indent();
        prelude(ctx);
        ctx.dedent();
        nested(ctx, body)?;
    }
    if let Some(body) = default {
        ctx.writeln("else");
        ctx.indent();
        prelude(ctx);
        ctx.dedent();
        nested(ctx, body)?;
    }
    ctx.writeln("end");
    Ok(())
}

fn ends_in_fallthrough(body: &[Stmt]) -> bool {
    matches!(
        body.last().map(|s| &s.kind),
        Some(StmtKind::Branch {
            kind: BranchKind::Fallthrough,
            ..
        })
    )
}

fn emit_switch(
    ctx: &mut EmitContext<'_>,
    label: Option<Name>,
    init: Option<&Stmt>,
    tag: Option<ExprId>,
    clauses: &[CaseClause],
) -> EmitResult<()> {
    let n = ctx.fresh_label();
    with_target(ctx, label, None, n, |ctx| {
        open_repeat(ctx, init)?;
        let subject = format!("__sw{n}");
        let tag_ty = match tag {
            Some(tag) => {
                let value = emit_expr(ctx, tag)?;
                ctx.writeln(&format!("local {subject} = {value};"));
                Some(ctx.info.type_of(tag))
            }
            None => None,
        };

        let mut conds = Vec::with_capacity(clauses.len());
        for clause in clauses {
            let mut parts = Vec::with_capacity(clause.exprs.len());
            for &e in &clause.exprs {
                let value = emit_expr(ctx, e)?;
                parts.push(match tag_ty {
                    Some(ty) if is_aggregate(ctx.pool, ty) => {
                        format!("__gi_equal({subject}, {value})")
                    }
                    Some(_) => format!("{subject} == {value}"),
                    None if clauses.len() > 1 || clause.exprs.len() > 1 => format!("({value})"),
                    None => value,
                });
            }
            conds.push(parts.join(" or "));
        }

        if clauses.iter().any(|c| ends_in_fallthrough(&c.body)) {
            switch_with_fallthrough(ctx, n, clauses, &conds)?;
        } else {
            let arms = clauses
                .iter()
                .zip(conds)
                .filter(|(c, _)| !c.is_default)
                .map(|(c, cond)| (cond, c.body.as_slice()))
                .collect();
            let default = clauses.iter().find(|c| c.is_default).map(|c| c.body.as_slice());
            condition_chain(ctx, arms, default, |_| {})?;
        }
        close_repeat(ctx);
        Ok(())
    })
}

/// Pick the matching case first, then run cases in order from it while
/// each one falls through to the next.
fn switch_with_fallthrough(
    ctx: &mut EmitContext<'_>,
    n: u32,
    clauses: &[CaseClause],
    conds: &[String],
) -> EmitResult<()> {
    let case = format!("__case{n}");
    ctx.writeln(&format!("local {case} = 0;"));
    for (i, (clause, cond)) in clauses.iter().zip(conds).enumerate() {
        if !clause.is_default {
            ctx.writeln(&format!("if {case} == 0 and ({cond}) then {case} = {}; end", i + 1));
        }
    }
    if let Some(i) = clauses.iter().position(|c| c.is_default) {
        ctx.writeln(&format!("if {case} == 0 then {case} = {}; end", i + 1));
    }
    for (i, clause) in clauses.iter().enumerate() {
        ctx.writeln(&format!("if {case} == {} then", i + 1));
        let falls = ends_in_fallthrough(&clause.body);
        let body = if falls {
            &clause.body[..clause.body.len() - 1]
        } else {
            clause.body.as_slice()
        };
        nested(ctx, body)?;
        if falls {
            ctx.indent();
            ctx.writeln(&format!("{case} = {};", i + 2));
            ctx.dedent();
        }
        ctx.writeln("end");
    }
    Ok(())
}

fn emit_type_switch(
    ctx: &mut EmitContext<'_>,
    label: Option<Name>,
    init: Option<&Stmt>,
    binding: Option<&Ident>,
    subject: ExprId,
    clauses: &[TypeCaseClause],
) -> EmitResult<()> {
    let n = ctx.fresh_label();
    with_target(ctx, label, None, n, |ctx| {
        open_repeat(ctx, init)?;
        let var = format!("__ts{n}");
        let value = emit_expr(ctx, subject)?;
        ctx.writeln(&format!("local {var} = {value};"));

        let mut arms = Vec::with_capacity(clauses.len());
        for clause in clauses.iter().filter(|c| !c.is_default) {
            let mut parts = Vec::with_capacity(clause.types.len());
            for ty in &clause.types {
                parts.push(match ty {
                    None => format!("{var} == nil"),
                    Some(texpr) => {
                        let Some(&resolved) = ctx.info.type_exprs.get(&texpr.span) else {
                            return Err(EmitError::Internal {
                                message: "unresolved type in type switch".to_string(),
                                span: texpr.span,
                            });
                        };
                        format!("__gi_isType({var}, {})", type_desc(ctx, resolved, texpr.span)?)
                    }
                });
            }
            arms.push((parts.join(" or "), clause.body.as_slice()));
        }
        let default = clauses.iter().find(|c| c.is_default).map(|c| c.body.as_slice());

        let bind = binding
            .filter(|b| !b.name.is_blank())
            .map(|b| format!("local {} = {var};", ctx.name(b.name)));
        condition_chain(ctx, arms, default, |ctx| {
            if let Some(line) = &bind {
                ctx.indent();
                ctx.writeln(line);
                ctx.dedent();
            }
        })?;
        close_repeat(ctx);
        Ok(())
    })
}

/// The channel operand of a receive expression.
fn received_channel(ctx: &EmitContext<'_>, id: ExprId) -> Option<ExprId> {
    match ctx.arena.kind(ctx.arena.unparen(id)) {
        ExprKind::Unary {
            op: UnaryOp::Recv,
            operand,
        } => Some(*operand),
        _ => None,
    }
}

fn emit_select(ctx: &mut EmitContext<'_>, label: Option<Name>, clauses: &[CommClause]) -> EmitResult<()> {
    let n = ctx.fresh_label();
    with_target(ctx, label, None, n, |ctx| {
        open_repeat(ctx, None)?;
        let var = format!("__sel{n}");
        let mut cases = Vec::new();
        let mut arms: Vec<(String, Vec<String>, &[Stmt])> = Vec::new();
        let mut default = None;

        for clause in clauses {
            let Some(comm) = clause.comm.as_deref() else {
                default = Some(clause.body.as_slice());
                continue;
            };
            let index = cases.len() + 1;
            let mut bindings = Vec::new();
            let bad = || EmitError::Internal {
                message: "select case is not a send or receive".to_string(),
                span: comm.span,
            };
            match &comm.kind {
                StmtKind::Send { chan, value } => {
                    let ch = emit_expr(ctx, *chan)?;
                    let v = emit_value(ctx, *value)?;
                    cases.push(format!("{{\"send\", {ch}, {v}}}"));
                }
                StmtKind::Expr(e) => {
                    let ch = received_channel(ctx, *e).ok_or_else(bad)?;
                    cases.push(format!("{{\"recv\", {}}}", emit_expr(ctx, ch)?));
                }
                StmtKind::ShortVarDecl { names, values } => {
                    let ch = values
                        .first()
                        .and_then(|&v| received_channel(ctx, v))
                        .ok_or_else(bad)?;
                    cases.push(format!("{{\"recv\", {}}}", emit_expr(ctx, ch)?));
                    for (name, slot) in names.iter().zip(2..) {
                        if !name.name.is_blank() {
                            bindings.push(format!("local {} = {var}[{slot}];", ctx.name(name.name)));
                        }
                    }
                }
                StmtKind::Assign { lhs, rhs, .. } => {
                    let ch = rhs
                        .first()
                        .and_then(|&v| received_channel(ctx, v))
                        .ok_or_else(bad)?;
                    cases.push(format!("{{\"recv\", {}}}", emit_expr(ctx, ch)?));
                    for (&target, slot) in lhs.iter().zip(2..) {
                        if !is_blank(ctx, target) {
                            bindings.push(store(ctx, target, &format!("{var}[{slot}]"))?);
                        }
                    }
                }
                _ => return Err(bad()),
            }
            arms.push((format!("{var}[1] == {index}"), bindings, clause.body.as_slice()));
        }

        ctx.writeln(&format!(
            "local {var} = __select({{{}}}, {});",
            cases.join(", "),
            default.is_some()
        ));
        for (i, (cond, bindings, body)) in arms.into_iter().enumerate() {
            let keyword = if i == 0 { "if" } else { "elseif" };
            ctx.writeln(&format!("{keyword} {cond} then"));
            ctx.indent();
            for line in &bindings {
                ctx.writeln(line);
            }
            ctx.dedent();
            nested(ctx, body)?;
        }
        match (default, clauses.len() > 1) {
            (Some(body), true) => {
                ctx.writeln("else");
                nested(ctx, body)?;
                ctx.writeln("end");
            }
            (Some(body), false) => {
                ctx.writeln("do");
                nested(ctx, body)?;
                ctx.writeln("end");
            }
            (None, _) if !clauses.is_empty() => ctx.writeln("end"),
            (None, _) => {}
        }
        close_repeat(ctx);
        Ok(())
    })
}

/// `go` and `defer`: a plain function call passes the function and its
/// already evaluated arguments; anything else is wrapped in a closure.
fn spawn(ctx: &mut EmitContext<'_>, runtime: &str, call: ExprId) -> EmitResult<()> {
    let arena = ctx.arena;
    let call = arena.unparen(call);
    if let (ExprKind::Call { func, args, spread: false }, Some(CallKind::Func)) =
        (arena.kind(call), ctx.info.calls.get(&call))
    {
        let variadic = ctx
            .pool
            .signature(ctx.info.type_of(*func))
            .is_some_and(|sig| sig.variadic);
        if !variadic {
            let mut parts = vec![emit_expr(ctx, *func)?];
            for &arg in args {
                parts.push(emit_value(ctx, arg)?);
            }
            ctx.writeln(&format!("{runtime}({});", parts.join(", ")));
            return Ok(());
        }
    }
    let text = emit_expr(ctx, call)?;
    ctx.writeln(&format!("{runtime}(function() {text}; end);"));
    Ok(())
}

// === Functions ===

/// Lua parameter list: the receiver first, then the parameters. Unnamed
/// ones become `_`.
pub fn param_list(ctx: &EmitContext<'_>, receiver: Option<&Param>, sig: &FuncSig) -> String {
    receiver
        .into_iter()
        .chain(&sig.params)
        .map(|p| p.name.map_or_else(|| "_".to_string(), |n| ctx.name(n.name)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Emit a function body at the current indentation. Named results are
/// declared up front; a body that defers runs inside
/// `__gi_runDeferred`.
pub fn function_body(ctx: &mut EmitContext<'_>, sig: &FuncSig, body: &Block) -> EmitResult<()> {
    let saved_targets = std::mem::take(&mut ctx.targets);
    let saved_depth = ctx.depth;
    let frames = ctx.funcs.len();
    ctx.depth += 1;
    let result = function_body_inner(ctx, sig, body);
    ctx.funcs.truncate(frames);
    ctx.depth = saved_depth;
    ctx.targets = saved_targets;
    result
}

fn function_body_inner(ctx: &mut EmitContext<'_>, sig: &FuncSig, body: &Block) -> EmitResult<()> {
    let mut frame = FuncFrame::default();
    for result in &sig.results {
        let Some(name) = result.name else { continue };
        let ty = result_type(ctx, name.span, result.ty.span);
        let zero = zero_value(ctx, ty, name.span)?;
        let local = ctx.name(name.name);
        ctx.writeln(&format!("local {local} = {zero};"));
        frame.named_results.push(local);
    }
    ctx.funcs.push(frame);

    if has_defer(&body.stmts) {
        ctx.writeln("return __gi_runDeferred(function()");
        ctx.indent();
        let result = emit_stmts(ctx, &body.stmts);
        ctx.dedent();
        ctx.writeln("end);");
        result
    } else {
        emit_stmts(ctx, &body.stmts)
    }
}

fn result_type(ctx: &EmitContext<'_>, name: Span, ty: Span) -> TypeId {
    ctx.info
        .defs
        .get(&name)
        .or_else(|| ctx.info.type_exprs.get(&ty))
        .copied()
        .unwrap_or(TypeId::INVALID)
}
