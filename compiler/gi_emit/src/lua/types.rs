//! Runtime type descriptors and zero values.
//!
//! Named package-level types live in the `__type__` table under their own
//! name. Anonymous composite types get a shared `__type__.anon_<kind>Type`
//! descriptor per unit, except when they mention a type declared inside a
//! function, in which case the descriptor is built inline where it is used.

use gi_ir::ast::ChanDir;
use gi_ir::{Name, Span};
use gi_types::{BasicKind, Field, Type, TypeId};

use super::literal::quote;
use crate::{EmitContext, EmitError, EmitResult};

/// Descriptor expression for `ty`.
pub fn type_desc(ctx: &mut EmitContext<'_>, ty: TypeId, span: Span) -> EmitResult<String> {
    let pool = ctx.pool;
    match pool.get(ty) {
        Type::Invalid | Type::Tuple(_) => Err(EmitError::Internal {
            message: "expression has no runtime type".to_string(),
            span,
        }),
        Type::Basic(BasicKind::UntypedNil) => Ok("nil".to_string()),
        Type::Basic(kind) => {
            let kind = pool.basic(pool.default_type(ty)).unwrap_or(*kind);
            Ok(format!("__type__.{}", kind.name()))
        }
        Type::Named(named) => {
            if ty.is_predeclared() || named.decl.is_some() {
                Ok(format!("__type__.{}", ctx.name(named.name)))
            } else {
                Ok(ctx.name(named.name))
            }
        }
        _ => {
            if let Some(name) = ctx.anon_name(ty) {
                return Ok(name);
            }
            let (kind, definition) = anon_definition(ctx, ty, span)?;
            if mentions_local(ctx, ty) {
                Ok(definition)
            } else {
                Ok(ctx.anon_type(ty, kind, definition))
            }
        }
    }
}

/// Constructor call for a structural type, and the kind used to name its
/// shared descriptor.
fn anon_definition(
    ctx: &mut EmitContext<'_>,
    ty: TypeId,
    span: Span,
) -> EmitResult<(&'static str, String)> {
    let pool = ctx.pool;
    Ok(match pool.get(ty) {
        Type::Pointer(elem) => ("ptr", format!("__ptrType({})", type_desc(ctx, *elem, span)?)),
        Type::Slice(elem) => ("slice", format!("__sliceType({})", type_desc(ctx, *elem, span)?)),
        Type::Array { len, elem } => (
            "array",
            format!("__arrayType({}, {len})", type_desc(ctx, *elem, span)?),
        ),
        Type::Map { key, value } => (
            "map",
            format!(
                "__mapType({}, {})",
                type_desc(ctx, *key, span)?,
                type_desc(ctx, *value, span)?
            ),
        ),
        Type::Chan { dir, elem } => (
            "chan",
            format!("__chanType({})", chan_args(ctx, *dir, *elem, span)?),
        ),
        Type::Func(_) => ("func", format!("__funcType({})", func_args(ctx, ty, span)?)),
        Type::Struct(fields) => (
            "struct",
            format!("__structType({})", struct_args(ctx, fields, span)?),
        ),
        Type::Interface(_) => (
            "interface",
            format!("__interfaceType({})", interface_args(ctx, ty)),
        ),
        _ => {
            return Err(EmitError::Internal {
                message: "not a composite type".to_string(),
                span,
            })
        }
    })
}

fn chan_args(
    ctx: &mut EmitContext<'_>,
    dir: ChanDir,
    elem: TypeId,
    span: Span,
) -> EmitResult<String> {
    Ok(format!(
        "{}, {}, {}",
        type_desc(ctx, elem, span)?,
        dir == ChanDir::Send,
        dir == ChanDir::Recv
    ))
}

fn func_args(ctx: &mut EmitContext<'_>, ty: TypeId, span: Span) -> EmitResult<String> {
    let pool = ctx.pool;
    let Some(sig) = pool.signature(ty) else {
        return Ok("{}, {}, false".to_string());
    };
    let params = sig
        .params
        .iter()
        .map(|&p| type_desc(ctx, p, span))
        .collect::<EmitResult<Vec<_>>>()?;
    let results = sig
        .results
        .iter()
        .map(|&r| type_desc(ctx, r, span))
        .collect::<EmitResult<Vec<_>>>()?;
    Ok(format!(
        "{{{}}}, {{{}}}, {}",
        params.join(", "),
        results.join(", "),
        sig.variadic
    ))
}

fn struct_args(ctx: &mut EmitContext<'_>, fields: &[Field], span: Span) -> EmitResult<String> {
    let mut entries = Vec::with_capacity(fields.len());
    for field in fields {
        let tag = field.tag.map_or_else(String::new, |t| ctx.resolve(t).to_string());
        entries.push(format!(
            "__structField({}, {}, {}, {})",
            quote(&ctx.name(field.name)),
            type_desc(ctx, field.ty, span)?,
            field.embedded,
            quote(&tag)
        ));
    }
    let exported = fields.iter().all(|f| is_exported(ctx.resolve(f.name)));
    let pkg = if exported { "" } else { "main" };
    Ok(format!("\"{pkg}\", {{{}}}", entries.join(", ")))
}

fn interface_args(ctx: &EmitContext<'_>, ty: TypeId) -> String {
    let names: Vec<String> = ctx
        .pool
        .interface_methods(ty)
        .unwrap_or(&[])
        .iter()
        .map(|m| quote(ctx.resolve(m.name)))
        .collect();
    format!("{{{}}}", names.join(", "))
}

fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// Whether the descriptor of `ty` refers to a function-local named type.
fn mentions_local(ctx: &EmitContext<'_>, ty: TypeId) -> bool {
    let pool = ctx.pool;
    match pool.get(ty) {
        Type::Named(named) => !ty.is_predeclared() && named.decl.is_none(),
        Type::Pointer(elem) | Type::Slice(elem) => mentions_local(ctx, *elem),
        Type::Array { elem, .. } | Type::Chan { elem, .. } => mentions_local(ctx, *elem),
        Type::Map { key, value } => mentions_local(ctx, *key) || mentions_local(ctx, *value),
        Type::Func(sig) => sig
            .params
            .iter()
            .chain(&sig.results)
            .any(|&t| mentions_local(ctx, t)),
        Type::Struct(fields) => fields.iter().any(|f| mentions_local(ctx, f.ty)),
        Type::Tuple(elems) => elems.iter().any(|&t| mentions_local(ctx, t)),
        Type::Invalid | Type::Basic(_) | Type::Interface(_) => false,
    }
}

/// The zero value of `ty`.
pub fn zero_value(ctx: &mut EmitContext<'_>, ty: TypeId, span: Span) -> EmitResult<String> {
    let pool = ctx.pool;
    Ok(match pool.underlying_type(ty) {
        Type::Basic(kind) => match kind {
            BasicKind::Bool | BasicKind::UntypedBool => "false".to_string(),
            BasicKind::String | BasicKind::UntypedString => "\"\"".to_string(),
            BasicKind::UntypedNil => "nil".to_string(),
            k if k.is_unsigned() => "0ULL".to_string(),
            k if k.is_integer() => "0LL".to_string(),
            _ => "0".to_string(),
        },
        Type::Struct(_) | Type::Array { .. } => format!("{}()", type_desc(ctx, ty, span)?),
        _ => "nil".to_string(),
    })
}

/// Zero-filled field table for a struct type, `{a = 0LL, b = ""}`.
pub fn struct_zero_fields(
    ctx: &mut EmitContext<'_>,
    ty: TypeId,
    span: Span,
) -> EmitResult<Vec<(String, String)>> {
    let pool = ctx.pool;
    pool.struct_fields(ty)
        .unwrap_or(&[])
        .iter()
        .map(|f| Ok((ctx.name(f.name), zero_value(ctx, f.ty, span)?)))
        .collect()
}

fn kind_name(kind: BasicKind) -> &'static str {
    match kind {
        BasicKind::Bool | BasicKind::UntypedBool => "Bool",
        BasicKind::Int | BasicKind::UntypedInt => "Int",
        BasicKind::Int8 => "Int8",
        BasicKind::Int16 => "Int16",
        BasicKind::Int32 | BasicKind::UntypedRune => "Int32",
        BasicKind::Int64 => "Int64",
        BasicKind::Uint => "Uint",
        BasicKind::Uint8 => "Uint8",
        BasicKind::Uint16 => "Uint16",
        BasicKind::Uint32 => "Uint32",
        BasicKind::Uint64 => "Uint64",
        BasicKind::Uintptr => "Uintptr",
        BasicKind::Float32 => "Float32",
        BasicKind::Float64 | BasicKind::UntypedFloat => "Float64",
        BasicKind::Complex64 => "Complex64",
        BasicKind::Complex128 => "Complex128",
        BasicKind::String | BasicKind::UntypedString => "String",
        BasicKind::UntypedNil => "UnsafePointer",
    }
}

/// Runtime kind constant and value size of an underlying type.
fn kind_and_size(ty: &Type) -> (String, u32) {
    match ty {
        Type::Basic(kind) => {
            let size = match kind {
                BasicKind::Bool | BasicKind::Int8 | BasicKind::Uint8 => 1,
                BasicKind::Int16 | BasicKind::Uint16 => 2,
                BasicKind::Int32 | BasicKind::Uint32 | BasicKind::Float32 => 4,
                BasicKind::String | BasicKind::Complex128 => 16,
                _ => 8,
            };
            (format!("__kind{}", kind_name(*kind)), size)
        }
        Type::Pointer(_) => ("__kindPtr".to_string(), 8),
        Type::Slice(_) => ("__kindSlice".to_string(), 24),
        Type::Array { .. } => ("__kindArray".to_string(), 0),
        Type::Map { .. } => ("__kindMap".to_string(), 8),
        Type::Chan { .. } => ("__kindChan".to_string(), 8),
        Type::Func(_) => ("__kindFunc".to_string(), 8),
        Type::Interface(_) => ("__kindInterface".to_string(), 16),
        Type::Struct(_) | Type::Named(_) | Type::Tuple(_) | Type::Invalid => {
            ("__kindStruct".to_string(), 0)
        }
    }
}

/// Emit the declaration of a named type: the descriptor, its `init` call
/// and, for structs, the constructor that fills in zero values.
pub fn named_type(
    ctx: &mut EmitContext<'_>,
    name: Name,
    ty: TypeId,
    span: Span,
    local: bool,
) -> EmitResult<()> {
    let desc = type_desc(ctx, ty, span)?;
    let target = if local { format!("local {desc}") } else { desc.clone() };
    let pool = ctx.pool;
    let underlying = pool.underlying(ty);
    let (kind, size) = kind_and_size(pool.get(underlying));
    let go_name = ctx.resolve(name);
    ctx.writeln(&format!(
        "{target} = __newType({size}, {kind}, \"main.{go_name}\", true, \"main\", {}, nil);",
        is_exported(go_name)
    ));

    let init = match pool.get(underlying) {
        Type::Pointer(elem) | Type::Slice(elem) => Some(type_desc(ctx, *elem, span)?),
        Type::Array { len, elem } => Some(format!("{}, {len}", type_desc(ctx, *elem, span)?)),
        Type::Map { key, value } => Some(format!(
            "{}, {}",
            type_desc(ctx, *key, span)?,
            type_desc(ctx, *value, span)?
        )),
        Type::Chan { dir, elem } => Some(chan_args(ctx, *dir, *elem, span)?),
        Type::Func(_) => Some(func_args(ctx, underlying, span)?),
        Type::Struct(fields) => Some(struct_args(ctx, fields, span)?),
        Type::Interface(_) => Some(interface_args(ctx, underlying)),
        _ => None,
    };
    // Anonymous descriptors of a local type stay with the enclosing
    // top-level item so they precede every use in it.
    if !local {
        ctx.flush_types();
    }
    if let Some(args) = init {
        ctx.writeln(&format!("{desc}.init({args});"));
    }

    if matches!(pool.get(underlying), Type::Struct(_)) {
        let zeros = struct_zero_fields(ctx, ty, span)?;
        if !local {
            ctx.flush_types();
        }
        let fields: Vec<String> = zeros
            .into_iter()
            .map(|(field, zero)| format!("{field} = {zero}"))
            .collect();
        ctx.writeln(&format!(
            "{desc}.__constructor = function(fields) return fields or {{{}}}; end;",
            fields.join(", ")
        ));
    }
    Ok(())
}
