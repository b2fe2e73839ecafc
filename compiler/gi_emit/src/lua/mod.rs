//! Lua backend.
//!
//! Each top-level item becomes one chunk of Lua. Anonymous type
//! descriptors an item needs are written just before its chunk, so a
//! descriptor never precedes the named types it refers to.

mod decl;
mod expr;
mod literal;
mod stmt;
mod types;

use gi_ir::ast::{Item, Unit};
use tracing::{debug, trace};

use crate::{EmitContext, EmitResult};

pub(crate) fn emit_unit(ctx: &mut EmitContext<'_>, unit: &Unit) -> EmitResult<String> {
    let mut out = String::new();
    for import in &unit.imports {
        decl::import(ctx, import);
    }
    out.push_str(&ctx.take_output());

    for item in &unit.items {
        match item {
            Item::Decl(d) => decl::emit_decl(ctx, d)?,
            Item::Stmt(s) => decl::top_level_stmt(ctx, s)?,
        }
        let chunk = ctx.take_output();
        let types = ctx.take_pending_types();
        trace!(descriptors = types.len(), bytes = chunk.len(), "emitted item");
        for line in types {
            out.push_str(&line);
            out.push('\n');
        }
        out.push_str(&chunk);
    }
    debug!(items = unit.items.len(), bytes = out.len(), "emitted unit");
    Ok(out)
}
