//! Declarations and top-level statements.

use gi_ir::ast::{ConstSpec, Decl, ExprId, ExprKind, FuncDecl, ImportSpec, Stmt, StmtKind, TypeSpec, UnaryOp, VarSpec};
use gi_types::{Builtin, CallKind, Type, TypeId};

use super::expr::{emit_expr, emit_value};
use super::literal::{self, quote};
use super::stmt;
use super::types::{named_type, type_desc, zero_value};
use crate::{EmitContext, EmitError, EmitResult};

pub fn emit_decl(ctx: &mut EmitContext<'_>, decl: &Decl) -> EmitResult<()> {
    match decl {
        Decl::Const(specs) => specs.iter().try_for_each(|spec| const_spec(ctx, spec)),
        Decl::Var(specs) => specs.iter().try_for_each(|spec| var_spec(ctx, spec)),
        Decl::Type(specs) => specs.iter().try_for_each(|spec| type_spec(ctx, spec)),
        Decl::Func(func) => func_decl(ctx, func),
    }
}

/// Declarations inside a function body are Lua locals.
fn prefix(ctx: &EmitContext<'_>) -> &'static str {
    if ctx.depth > 0 {
        "local "
    } else {
        ""
    }
}

fn const_spec(ctx: &mut EmitContext<'_>, spec: &ConstSpec) -> EmitResult<()> {
    let info = ctx.info;
    for name in spec.names.iter().filter(|n| !n.name.is_blank()) {
        let Some(value) = info.const_defs.get(&name.span) else {
            return Err(EmitError::Internal {
                message: format!("constant {} has no value", ctx.resolve(name.name)),
                span: name.span,
            });
        };
        let ty = info.defs.get(&name.span).copied().unwrap_or(TypeId::INVALID);
        let value = literal::constant(ctx.pool, ty, value);
        ctx.writeln(&format!("{}{} = {value};", prefix(ctx), ctx.name(name.name)));
    }
    Ok(())
}

fn var_spec(ctx: &mut EmitContext<'_>, spec: &VarSpec) -> EmitResult<()> {
    let names: Vec<String> = spec.names.iter().map(|n| ctx.name(n.name)).collect();
    let values = if spec.values.is_empty() {
        let mut zeros = Vec::with_capacity(spec.names.len());
        for name in &spec.names {
            let ty = ctx.info.defs.get(&name.span).copied().unwrap_or(TypeId::INVALID);
            zeros.push(zero_value(ctx, ty, name.span)?);
        }
        zeros
    } else {
        spec.values
            .iter()
            .map(|&v| emit_value(ctx, v))
            .collect::<EmitResult<Vec<_>>>()?
    };
    ctx.writeln(&format!(
        "{}{} = {};",
        prefix(ctx),
        names.join(", "),
        values.join(", ")
    ));
    Ok(())
}

fn type_spec(ctx: &mut EmitContext<'_>, spec: &TypeSpec) -> EmitResult<()> {
    let Some(&ty) = ctx.info.defs.get(&spec.name.span) else {
        return Err(EmitError::Internal {
            message: format!("type {} was not resolved", ctx.resolve(spec.name.name)),
            span: spec.name.span,
        });
    };
    let local = ctx.depth > 0;
    if spec.alias {
        let desc = type_desc(ctx, ty, spec.span)?;
        let name = ctx.name(spec.name.name);
        let target = if local {
            format!("local {name}")
        } else {
            format!("__type__.{name}")
        };
        ctx.writeln(&format!("{target} = {desc};"));
        return Ok(());
    }
    named_type(ctx, spec.name.name, ty, spec.span, local)
}

fn func_decl(ctx: &mut EmitContext<'_>, func: &FuncDecl) -> EmitResult<()> {
    let Some(body) = &func.body else {
        return Err(EmitError::Unsupported {
            what: "function declaration without a body".to_string(),
            span: func.span,
        });
    };
    let params = stmt::param_list(ctx, func.receiver.as_ref(), &func.sig);
    let name = ctx.name(func.name.name);

    let close = match &func.receiver {
        None => {
            ctx.writeln(&format!("{name} = function({params})"));
            "end;"
        }
        Some(recv) => {
            let Some(&recv_ty) = ctx.info.type_exprs.get(&recv.ty.span) else {
                return Err(EmitError::Internal {
                    message: "receiver type was not resolved".to_string(),
                    span: recv.ty.span,
                });
            };
            let pool = ctx.pool;
            let (base, pointer) = match pool.get(recv_ty) {
                Type::Pointer(elem) => (*elem, true),
                _ => (recv_ty, false),
            };
            let desc = type_desc(ctx, base, recv.ty.span)?;
            ctx.writeln(&format!(
                "__addMethod({desc}, {}, {pointer}, function({params})",
                quote(&name)
            ));
            "end);"
        }
    };
    ctx.indent();
    let result = stmt::function_body(ctx, &func.sig, body);
    ctx.dedent();
    result?;
    ctx.writeln(close);
    Ok(())
}

pub fn import(ctx: &mut EmitContext<'_>, spec: &ImportSpec) {
    let path = ctx.resolve(spec.path);
    let name = match &spec.alias {
        Some(alias) if alias.name.is_blank() || ctx.resolve(alias.name) == "." => return,
        Some(alias) => ctx.name(alias.name),
        None => path.rsplit('/').next().unwrap_or(path).to_string(),
    };
    ctx.writeln(&format!("{name} = __gi_import({});", quote(path)));
}

/// A statement typed at the prompt. Expression statements print their
/// value unless they are calls run for their effect.
pub fn top_level_stmt(ctx: &mut EmitContext<'_>, stmt: &Stmt) -> EmitResult<()> {
    let StmtKind::Expr(id) = &stmt.kind else {
        return stmt::emit_stmt(ctx, stmt, true);
    };
    if !ctx.options.print_calls && runs_for_effect(ctx, *id) {
        return stmt::emit_stmt(ctx, stmt, true);
    }
    let value = emit_expr(ctx, *id)?;
    let ty = ctx.info.type_of(*id);
    if ty == TypeId::VOID {
        ctx.writeln(&format!("{value};"));
    } else if matches!(ctx.pool.get(ty), Type::Tuple(_)) {
        ctx.writeln(&format!("__gi_printQuoted({value});"));
    } else {
        ctx.writeln(&format!("__gi_ans = {value}; __gi_printQuoted(__gi_ans);"));
    }
    Ok(())
}

fn runs_for_effect(ctx: &EmitContext<'_>, id: ExprId) -> bool {
    let id = ctx.arena.unparen(id);
    match ctx.arena.kind(id) {
        ExprKind::Call { .. } => match ctx.info.calls.get(&id) {
            Some(CallKind::Func | CallKind::Method) | None => true,
            Some(CallKind::Builtin(builtin)) => matches!(
                builtin,
                Builtin::Close
                    | Builtin::Copy
                    | Builtin::Delete
                    | Builtin::Panic
                    | Builtin::Print
                    | Builtin::Println
                    | Builtin::Recover
            ),
            Some(CallKind::Conversion(_)) => false,
        },
        ExprKind::Unary {
            op: UnaryOp::Recv,
            ..
        } => true,
        _ => false,
    }
}
