//! Expressions.
//!
//! Every function here returns the Lua text of one expression. Statements
//! that an expression needs (function literal bodies) are produced through
//! [`EmitContext::capture`] so the result is still a single string.

use gi_ir::ast::{BinaryOp, Block, Element, ExprId, ExprKind, FuncSig, UnaryOp};
use gi_ir::{Name, Span};
use gi_types::{BasicKind, Builtin, CallKind, MethodEntry, Resolution, Selection, Type, TypeId, TypePool};

use super::literal;
use super::stmt;
use super::types::{struct_zero_fields, type_desc, zero_value};
use crate::{EmitContext, EmitError, EmitResult};

pub fn emit_expr(ctx: &mut EmitContext<'_>, id: ExprId) -> EmitResult<String> {
    gi_stack::with_stack(|| emit_expr_inner(ctx, id))
}

fn emit_expr_inner(ctx: &mut EmitContext<'_>, id: ExprId) -> EmitResult<String> {
    let info = ctx.info;
    let arena = ctx.arena;
    if let Some(value) = info.const_value(id) {
        return Ok(literal::constant(ctx.pool, info.type_of(id), value));
    }
    let span = arena.span(id);
    match arena.kind(id) {
        ExprKind::Ident(name) => ident(ctx, id, *name, span),
        ExprKind::Int(_) | ExprKind::Float(_) | ExprKind::Str(_) | ExprKind::Char(_) => {
            Err(internal("literal was not folded", span))
        }
        ExprKind::Paren(inner) => Ok(format!("({})", emit_expr(ctx, *inner)?)),
        ExprKind::CompositeLit { elements, .. } => composite(ctx, id, elements, span),
        ExprKind::FuncLit { sig, body } => func_literal(ctx, sig, body),
        ExprKind::Selector { base, field, .. } => selector(ctx, id, *base, *field, span),
        ExprKind::Index { base, index: key } => index(ctx, id, *base, *key),
        ExprKind::Slice {
            base,
            low,
            high,
            max,
        } => {
            let mut parts = vec![emit_expr(ctx, *base)?];
            for bound in [low, high] {
                parts.push(match bound {
                    Some(e) => emit_expr(ctx, *e)?,
                    None => "nil".to_string(),
                });
            }
            if let Some(max) = max {
                parts.push(emit_expr(ctx, *max)?);
            }
            Ok(format!("__gi_subslice({})", parts.join(", ")))
        }
        ExprKind::TypeAssert { base, ty } => {
            let Some(ty) = ty else {
                return Err(internal("type switch guard outside a switch", span));
            };
            let Some(&target) = info.type_exprs.get(&ty.span) else {
                return Err(internal("unresolved asserted type", ty.span));
            };
            let x = emit_expr(ctx, *base)?;
            let desc = type_desc(ctx, target, ty.span)?;
            let func = if info.comma_ok.contains(&id) {
                "__gi_assertTypeOk"
            } else {
                "__gi_assertType"
            };
            Ok(format!("{func}({x}, {desc})"))
        }
        ExprKind::Call { func, args, spread } => call(ctx, id, *func, args, *spread),
        ExprKind::Unary { op, operand } => unary(ctx, id, *op, *operand),
        ExprKind::Binary { op, left, right } => binary(ctx, id, *op, *left, *right),
        ExprKind::Type(_) => type_desc(ctx, info.type_of(id), span),
    }
}

/// An expression used as a value that is stored somewhere. Structs and
/// arrays have value semantics in Go, so reading one out of a variable,
/// field or element copies it.
pub fn emit_value(ctx: &mut EmitContext<'_>, id: ExprId) -> EmitResult<String> {
    let text = emit_expr(ctx, id)?;
    let arena = ctx.arena;
    let copies = matches!(
        arena.kind(arena.unparen(id)),
        ExprKind::Ident(_)
            | ExprKind::Selector { .. }
            | ExprKind::Index { .. }
            | ExprKind::Unary {
                op: UnaryOp::Deref,
                ..
            }
    ) && is_aggregate(ctx.pool, ctx.info.type_of(id));
    Ok(if copies { format!("__gi_clone({text})") } else { text })
}

/// Structs and arrays are Lua tables that a pointer shares directly.
pub(super) fn is_aggregate(pool: &TypePool, ty: TypeId) -> bool {
    matches!(pool.underlying_type(ty), Type::Struct(_) | Type::Array { .. })
}

fn internal(message: &str, span: Span) -> EmitError {
    EmitError::Internal {
        message: message.to_string(),
        span,
    }
}

fn ident(ctx: &mut EmitContext<'_>, id: ExprId, name: Name, span: Span) -> EmitResult<String> {
    let info = ctx.info;
    match info.uses.get(&id) {
        Some(Resolution::Nil) => Ok("nil".to_string()),
        Some(Resolution::Type(ty)) => type_desc(ctx, *ty, span),
        _ => Ok(ctx.name(name)),
    }
}

// === Operators ===

/// Operand of a binary or unary operator, parenthesized when it is itself
/// an operation.
fn operand(ctx: &mut EmitContext<'_>, id: ExprId) -> EmitResult<String> {
    let text = emit_expr(ctx, id)?;
    let nested = matches!(ctx.arena.kind(id), ExprKind::Binary { .. })
        && ctx.info.const_value(id).is_none();
    Ok(if nested || text.starts_with('-') {
        format!("({text})")
    } else {
        text
    })
}

fn binary(
    ctx: &mut EmitContext<'_>,
    id: ExprId,
    op: BinaryOp,
    left: ExprId,
    right: ExprId,
) -> EmitResult<String> {
    let l = operand(ctx, left)?;
    let r = operand(ctx, right)?;
    let operand_ty = ctx.info.type_of(left);
    if matches!(op, BinaryOp::Eq | BinaryOp::NotEq) && is_aggregate(ctx.pool, operand_ty) {
        let not = if op == BinaryOp::NotEq { "not " } else { "" };
        return Ok(format!("{not}__gi_equal({l}, {r})"));
    }
    let ty = if op.is_comparison() {
        operand_ty
    } else {
        ctx.info.type_of(id)
    };
    Ok(binary_op(ctx.pool, op, ty, &l, &r))
}

/// `l op r` for operands of type `ty`. Shared with compound assignment.
pub fn binary_op(pool: &TypePool, op: BinaryOp, ty: TypeId, l: &str, r: &str) -> String {
    match op {
        BinaryOp::LogAnd => format!("{l} and {r}"),
        BinaryOp::LogOr => format!("{l} or {r}"),
        BinaryOp::NotEq => format!("{l} ~= {r}"),
        BinaryOp::Add if pool.is_string(ty) => format!("{l} .. {r}"),
        BinaryOp::Div | BinaryOp::Rem if pool.is_integer(ty) => {
            format!("__integerByZeroCheck({l} {} {r})", op.symbol())
        }
        BinaryOp::Or => format!("bit.bor({l}, {r})"),
        BinaryOp::Xor => format!("bit.bxor({l}, {r})"),
        BinaryOp::And => format!("bit.band({l}, {r})"),
        BinaryOp::AndNot => format!("bit.band({l}, bit.bnot({r}))"),
        BinaryOp::Shl => format!("bit.lshift({l}, {r})"),
        BinaryOp::Shr if pool.is_unsigned(ty) => format!("bit.rshift({l}, {r})"),
        BinaryOp::Shr => format!("bit.arshift({l}, {r})"),
        _ => format!("{l} {} {r}", op.symbol()),
    }
}

fn unary(ctx: &mut EmitContext<'_>, id: ExprId, op: UnaryOp, target: ExprId) -> EmitResult<String> {
    let pool = ctx.pool;
    match op {
        UnaryOp::Pos => emit_expr(ctx, target),
        UnaryOp::Neg => Ok(format!("-{}", operand(ctx, target)?)),
        UnaryOp::Not => Ok(format!("not {}", operand(ctx, target)?)),
        UnaryOp::Complement => Ok(format!("bit.bnot({})", emit_expr(ctx, target)?)),
        UnaryOp::Deref => {
            let p = emit_expr(ctx, target)?;
            if is_aggregate(pool, ctx.info.type_of(id)) {
                Ok(p)
            } else {
                Ok(format!("__gi_deref({p})"))
            }
        }
        UnaryOp::AddrOf => {
            let inner = ctx.arena.unparen(target);
            if matches!(ctx.arena.kind(inner), ExprKind::CompositeLit { .. })
                || is_aggregate(pool, ctx.info.type_of(target))
            {
                return emit_expr(ctx, target);
            }
            let read = emit_expr(ctx, target)?;
            let write = store(ctx, target, "__v")?;
            Ok(format!(
                "__gi_ptrTo(function() return {read}; end, function(__v) {write} end)"
            ))
        }
        UnaryOp::Recv => {
            let ch = emit_expr(ctx, target)?;
            if ctx.info.comma_ok.contains(&id) {
                Ok(format!("__recvOk({ch})"))
            } else {
                Ok(format!("__recv({ch})"))
            }
        }
    }
}

// === Places ===

/// The statement that stores `value` into the assignable expression
/// `target`.
pub fn store(ctx: &mut EmitContext<'_>, target: ExprId, value: &str) -> EmitResult<String> {
    let arena = ctx.arena;
    let target = arena.unparen(target);
    match arena.kind(target) {
        ExprKind::Ident(name) if name.is_blank() => Ok(format!("local _ = {value};")),
        ExprKind::Ident(_) | ExprKind::Selector { .. } => {
            Ok(format!("{} = {value};", emit_expr(ctx, target)?))
        }
        ExprKind::Index { base, index: key } => {
            let is_map = matches!(
                ctx.pool.underlying_type(ctx.info.type_of(*base)),
                Type::Map { .. }
            );
            let b = emit_expr(ctx, *base)?;
            let i = emit_expr(ctx, *key)?;
            if is_map {
                Ok(format!("__gi_SetMap({b}, {i}, {value});"))
            } else {
                Ok(format!("__gi_SetRangeCheck({b}, {i}, {value});"))
            }
        }
        ExprKind::Unary {
            op: UnaryOp::Deref,
            operand,
        } => Ok(format!("__gi_store({}, {value});", emit_expr(ctx, *operand)?)),
        _ => Err(internal("expression is not assignable", arena.span(target))),
    }
}

fn index(ctx: &mut EmitContext<'_>, id: ExprId, base: ExprId, key: ExprId) -> EmitResult<String> {
    let pool = ctx.pool;
    let b = emit_expr(ctx, base)?;
    let k = emit_expr(ctx, key)?;
    if let Type::Map { value, .. } = pool.underlying_type(ctx.info.type_of(base)) {
        let span = ctx.arena.span(id);
        let zero = zero_value(ctx, *value, span)?;
        let func = if ctx.info.comma_ok.contains(&id) {
            "__gi_GetMapOk"
        } else {
            "__gi_GetMap"
        };
        return Ok(format!("{func}({b}, {k}, {zero})"));
    }
    Ok(format!("__gi_GetRangeCheck({b}, {k})"))
}

/// `.a.b` for a walk through embedded fields, pointers included.
fn field_path(ctx: &EmitContext<'_>, mut ty: TypeId, path: &[usize]) -> String {
    let pool = ctx.pool;
    let mut out = String::new();
    for &i in path {
        if let Some(elem) = pool.pointer_elem(ty) {
            ty = elem;
        }
        let Some(field) = pool.struct_fields(ty).and_then(|fields| fields.get(i)) else {
            break;
        };
        out.push('.');
        out.push_str(&ctx.name(field.name));
        ty = field.ty;
    }
    out
}

/// The receiver a method is called on: the operand followed by the
/// embedded fields leading to the method's own type.
fn receiver(ctx: &mut EmitContext<'_>, base: ExprId, method: &MethodEntry) -> EmitResult<String> {
    let text = emit_expr(ctx, base)?;
    let arena = ctx.arena;
    let simple = matches!(
        arena.kind(base),
        ExprKind::Ident(_)
            | ExprKind::Selector { .. }
            | ExprKind::Call { .. }
            | ExprKind::Index { .. }
            | ExprKind::Paren(_)
    ) && ctx.info.const_value(base).is_none();
    let text = if simple { text } else { format!("({text})") };
    Ok(format!(
        "{text}{}",
        field_path(ctx, ctx.info.type_of(base), &method.path)
    ))
}

fn selector(
    ctx: &mut EmitContext<'_>,
    id: ExprId,
    base: ExprId,
    field: Name,
    span: Span,
) -> EmitResult<String> {
    let info = ctx.info;
    match info.selections.get(&id) {
        Some(Selection::Field(sel)) => {
            let b = emit_expr(ctx, base)?;
            Ok(format!("{b}{}", field_path(ctx, info.type_of(base), &sel.path)))
        }
        Some(Selection::Method(method)) => {
            let recv = receiver(ctx, base, method)?;
            let name = ctx.name(method.name);
            Ok(format!(
                "(function(__r) return function(...) return __r:{name}(...); end; end)({recv})"
            ))
        }
        Some(Selection::MethodExpr(method)) => {
            let path = field_path(ctx, info.type_of(base), &method.path);
            let name = ctx.name(method.name);
            Ok(format!(
                "function(__recv, ...) return __recv{path}:{name}(...); end"
            ))
        }
        Some(Selection::Qualified) => Ok(format!("{}.{}", emit_expr(ctx, base)?, ctx.name(field))),
        None => Err(internal("unresolved selector", span)),
    }
}

// === Calls ===

fn call(
    ctx: &mut EmitContext<'_>,
    id: ExprId,
    func: ExprId,
    args: &[ExprId],
    spread: bool,
) -> EmitResult<String> {
    let info = ctx.info;
    let arena = ctx.arena;
    let span = arena.span(id);
    match info.calls.get(&id).copied() {
        Some(CallKind::Conversion(target)) => match args {
            [arg] => conversion(ctx, target, *arg),
            _ => Err(internal("conversion takes one argument", span)),
        },
        Some(CallKind::Builtin(builtin)) => self::builtin(ctx, id, builtin, args, spread),
        Some(CallKind::Method) => {
            let callee = arena.unparen(func);
            let (ExprKind::Selector { base, .. }, Some(Selection::Method(method))) =
                (arena.kind(callee), info.selections.get(&callee))
            else {
                return Err(internal("method call without a method selector", span));
            };
            let recv = receiver(ctx, *base, method)?;
            let args = call_args(ctx, method.sig, args, spread)?;
            Ok(format!("{recv}:{}({args})", ctx.name(method.name)))
        }
        // Calls into imported packages are left unresolved.
        Some(CallKind::Func) | None => {
            let mut callee = emit_expr(ctx, func)?;
            if matches!(arena.kind(func), ExprKind::FuncLit { .. }) {
                callee = format!("({callee})");
            }
            let args = call_args(ctx, info.type_of(func), args, spread)?;
            Ok(format!("{callee}({args})"))
        }
    }
}

/// Arguments of a call to a function of type `func_ty`. Trailing arguments
/// of a variadic function are packed into a slice unless spread with
/// `...`.
fn call_args(
    ctx: &mut EmitContext<'_>,
    func_ty: TypeId,
    args: &[ExprId],
    spread: bool,
) -> EmitResult<String> {
    let pool = ctx.pool;
    let sig = pool.signature(func_ty);
    let single_tuple = matches!(args, [arg] if matches!(pool.get(ctx.info.type_of(*arg)), Type::Tuple(_)));
    let variadic = match sig {
        Some(sig) if sig.variadic && !spread && !single_tuple => sig.params.last().copied(),
        _ => None,
    };
    let Some(slice_ty) = variadic else {
        return Ok(values(ctx, args)?.join(", "));
    };

    let fixed = sig.map_or(0, |sig| sig.params.len() - 1);
    let mut out = values(ctx, &args[..fixed.min(args.len())])?;
    let rest = &args[fixed.min(args.len())..];
    if rest.is_empty() {
        out.push("nil".to_string());
    } else {
        let span = ctx.arena.span(rest[0]);
        let desc = type_desc(ctx, slice_ty, span)?;
        out.push(format!("{desc}({})", sequence(&values(ctx, rest)?)));
    }
    Ok(out.join(", "))
}

fn values(ctx: &mut EmitContext<'_>, ids: &[ExprId]) -> EmitResult<Vec<String>> {
    ids.iter().map(|&id| emit_value(ctx, id)).collect()
}

/// Table constructor for 0-based positional elements.
fn sequence(items: &[String]) -> String {
    match items.split_first() {
        None => "{}".to_string(),
        Some((first, rest)) => {
            let mut out = format!("{{[0]={first}");
            for item in rest {
                out.push_str(", ");
                out.push_str(item);
            }
            out.push('}');
            out
        }
    }
}

fn conversion(ctx: &mut EmitContext<'_>, target: TypeId, arg: ExprId) -> EmitResult<String> {
    let pool = ctx.pool;
    let from = ctx.info.type_of(arg);
    let x = emit_expr(ctx, arg)?;
    let slice_elem = |ty: TypeId| match pool.underlying_type(ty) {
        Type::Slice(elem) => pool.basic(*elem),
        _ => None,
    };

    if pool.is_string(target) {
        if pool.is_integer(from) {
            return Ok(format!("__gi_runeToString({x})"));
        }
        match slice_elem(from) {
            Some(BasicKind::Uint8) => return Ok(format!("__gi_bytesToString({x})")),
            Some(BasicKind::Int32) => return Ok(format!("__gi_runesToString({x})")),
            _ => {}
        }
    }
    if pool.is_string(from) {
        match slice_elem(target) {
            Some(BasicKind::Uint8) => return Ok(format!("__gi_stringToBytes({x})")),
            Some(BasicKind::Int32) => return Ok(format!("__gi_stringToRunes({x})")),
            _ => {}
        }
    }
    let from_kind = pool.basic(pool.default_type(from));
    let to_kind = pool.basic(target);
    match (from_kind, to_kind) {
        (Some(a), Some(b)) if a != b && a.is_numeric() && b.is_numeric() => {
            let span = ctx.arena.span(arg);
            let desc = type_desc(ctx, target, span)?;
            Ok(format!("__gi_convert({x}, {desc})"))
        }
        _ => Ok(x),
    }
}

fn builtin(
    ctx: &mut EmitContext<'_>,
    id: ExprId,
    builtin: Builtin,
    args: &[ExprId],
    spread: bool,
) -> EmitResult<String> {
    let pool = ctx.pool;
    let span = ctx.arena.span(id);
    let first_ty = args.first().map_or(TypeId::INVALID, |&a| ctx.info.type_of(a));
    Ok(match builtin {
        Builtin::Len => {
            let x = emit_expr(ctx, args[0])?;
            match pool.underlying_type(first_ty) {
                Type::Map { .. } | Type::Chan { .. } => format!("__gi_len({x})"),
                _ => format!("#{x}"),
            }
        }
        Builtin::Cap => format!("__gi_cap({})", emit_expr(ctx, args[0])?),
        Builtin::Append => {
            let func = if spread { "__gi_appendSlice" } else { "__gi_append" };
            format!("{func}({})", values(ctx, args)?.join(", "))
        }
        Builtin::Make => {
            let ty = ctx.info.type_of(id);
            let desc = type_desc(ctx, ty, span)?;
            let sizes = values(ctx, &args[1..])?;
            match pool.underlying_type(ty) {
                Type::Slice(_) => {
                    format!("__gi_makeSlice({desc}, {})", sizes.join(", "))
                }
                Type::Map { key, value } => {
                    let k = type_desc(ctx, *key, span)?;
                    let v = type_desc(ctx, *value, span)?;
                    format!("__makeMap({{}}, {k}, {v}, {desc})")
                }
                Type::Chan { .. } => {
                    let size = sizes.first().map_or("0LL", String::as_str);
                    format!("__gi_makeChan({desc}, {size})")
                }
                _ => return Err(internal("make of a type that cannot be made", span)),
            }
        }
        Builtin::New => {
            let Some(elem) = pool.pointer_elem(ctx.info.type_of(id)) else {
                return Err(internal("new without a pointer result", span));
            };
            let zero = zero_value(ctx, elem, span)?;
            if is_aggregate(pool, elem) {
                zero
            } else {
                format!("__gi_new({zero})")
            }
        }
        Builtin::Print => format!("__gi_print({})", values(ctx, args)?.join(", ")),
        Builtin::Println => format!("print({})", values(ctx, args)?.join(", ")),
        other => {
            let func = match other {
                Builtin::Close => "__gi_close",
                Builtin::Complex => "__gi_complex",
                Builtin::Copy => "__gi_copy",
                Builtin::Delete => "__gi_delete",
                Builtin::Imag => "__gi_imag",
                Builtin::Panic => "__gi_panic",
                Builtin::Real => "__gi_real",
                _ => "__gi_recover",
            };
            format!("{func}({})", values(ctx, args)?.join(", "))
        }
    })
}

// === Literals ===

fn composite(
    ctx: &mut EmitContext<'_>,
    id: ExprId,
    elements: &[Element],
    span: Span,
) -> EmitResult<String> {
    let pool = ctx.pool;
    let ty = ctx.info.type_of(id);
    let (lit_ty, boxed) = match pool.get(ty) {
        Type::Pointer(elem) => (*elem, !is_aggregate(pool, *elem)),
        _ => (ty, false),
    };

    let literal = match pool.underlying_type(lit_ty) {
        Type::Struct(fields) => {
            let desc = type_desc(ctx, lit_ty, span)?;
            let mut entries = struct_zero_fields(ctx, lit_ty, span)?;
            for (i, element) in elements.iter().enumerate() {
                let position = match element.key {
                    Some(key) => match ctx.arena.kind(key) {
                        ExprKind::Ident(name) => fields.iter().position(|f| f.name == *name),
                        _ => None,
                    },
                    None => Some(i),
                };
                let Some(position) = position else {
                    return Err(internal("unknown field in struct literal", span));
                };
                let value = emit_value(ctx, element.value)?;
                if let Some(entry) = entries.get_mut(position) {
                    entry.1 = value;
                }
            }
            let fields: Vec<String> = entries
                .into_iter()
                .map(|(name, value)| format!("{name} = {value}"))
                .collect();
            format!("{desc}({{{}}})", fields.join(", "))
        }
        Type::Slice(_) | Type::Array { .. } => {
            let desc = type_desc(ctx, lit_ty, span)?;
            format!("{desc}({})", indexed_elements(ctx, elements)?)
        }
        Type::Map { key, value } => {
            let mut entries = Vec::with_capacity(elements.len());
            for element in elements {
                let Some(k) = element.key else {
                    return Err(internal("map literal element without a key", span));
                };
                let k = emit_expr(ctx, k)?;
                let v = emit_value(ctx, element.value)?;
                entries.push(format!("[{k}]={v}"));
            }
            let k = type_desc(ctx, *key, span)?;
            let v = type_desc(ctx, *value, span)?;
            let desc = type_desc(ctx, lit_ty, span)?;
            format!("__makeMap({{{}}}, {k}, {v}, {desc})", entries.join(", "))
        }
        _ => return Err(internal("composite literal of a non-composite type", span)),
    };
    Ok(if boxed {
        format!("__gi_new({literal})")
    } else {
        literal
    })
}

/// Elements of a slice or array literal. Positional entries follow `[0]=`
/// until an explicit index appears; after that every entry names its
/// index, since Lua would otherwise number them from 1 again.
fn indexed_elements(ctx: &mut EmitContext<'_>, elements: &[Element]) -> EmitResult<String> {
    let mut entries = Vec::with_capacity(elements.len());
    let mut next: i128 = 0;
    let mut explicit = false;
    for element in elements {
        if let Some(key) = element.key {
            let Some(index) = ctx.info.const_value(key).and_then(|v| v.as_int()) else {
                return Err(internal("non-constant index in literal", ctx.arena.span(key)));
            };
            next = index;
            explicit = true;
        }
        let value = emit_value(ctx, element.value)?;
        if explicit || next == 0 {
            entries.push(format!("[{next}]={value}"));
        } else {
            entries.push(value);
        }
        next += 1;
    }
    Ok(format!("{{{}}}", entries.join(", ")))
}

fn func_literal(ctx: &mut EmitContext<'_>, sig: &FuncSig, body: &Block) -> EmitResult<String> {
    let params = stmt::param_list(ctx, None, sig);
    let body = ctx.capture(|ctx| stmt::function_body(ctx, sig, body))?;
    Ok(format!("function({params})\n{body}{}end", ctx.indentation()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sequence_is_zero_based() {
        assert_eq!(sequence(&[]), "{}");
        assert_eq!(
            sequence(&["1LL".to_string(), "2LL".to_string()]),
            "{[0]=1LL, 2LL}"
        );
    }

    #[test]
    fn test_binary_op_lowering() {
        let pool = TypePool::new();
        assert_eq!(binary_op(&pool, BinaryOp::Add, TypeId::STRING, "a", "b"), "a .. b");
        assert_eq!(
            binary_op(&pool, BinaryOp::Div, TypeId::INT, "a", "b"),
            "__integerByZeroCheck(a / b)"
        );
        assert_eq!(binary_op(&pool, BinaryOp::Div, TypeId::FLOAT64, "a", "b"), "a / b");
        assert_eq!(binary_op(&pool, BinaryOp::NotEq, TypeId::INT, "a", "b"), "a ~= b");
        assert_eq!(
            binary_op(&pool, BinaryOp::Shr, TypeId::UINT32, "a", "b"),
            "bit.rshift(a, b)"
        );
        assert_eq!(
            binary_op(&pool, BinaryOp::AndNot, TypeId::INT, "a", "b"),
            "bit.band(a, bit.bnot(b))"
        );
    }
}
