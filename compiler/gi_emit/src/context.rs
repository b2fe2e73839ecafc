//! Emission state.
//!
//! The `EmitContext` holds everything the `lua` modules share while
//! translating one unit: the checker's side tables, the output buffer and
//! the bookkeeping for labels and anonymous type descriptors.

use gi_ir::ast::ExprArena;
use gi_ir::{Name, StringInterner};
use gi_types::{TypeId, TypeInfo, TypePool};
use rustc_hash::FxHashMap;

use crate::{EmitOptions, EmitResult};

const LUA_KEYWORDS: &[&str] = &[
    "and", "break", "do", "else", "elseif", "end", "false", "for", "function", "goto", "if", "in",
    "local", "nil", "not", "or", "repeat", "return", "then", "true", "until", "while",
];

/// Where a `break` or `continue` inside a loop, switch or select jumps.
#[derive(Clone, Debug)]
pub(crate) struct BranchTarget {
    pub label: Option<Name>,
    /// `None` for `switch` and `select`, which cannot be continued.
    pub continue_label: Option<String>,
    pub break_label: String,
    /// A labeled `break` jumped here, so the label must be placed.
    pub break_used: bool,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct FuncFrame {
    /// Lua names of the named results, returned by a bare `return`.
    pub named_results: Vec<String>,
}

pub struct EmitContext<'a> {
    pub interner: &'a StringInterner,
    pub pool: &'a TypePool,
    pub info: &'a TypeInfo,
    pub arena: &'a ExprArena,
    pub options: EmitOptions,
    indent: usize,
    output: String,
    /// Descriptor definitions for anonymous types, written out before the
    /// top-level item that first needed them.
    pending_types: Vec<String>,
    anon_types: FxHashMap<TypeId, String>,
    anon_counts: FxHashMap<&'static str, u32>,
    temp_counter: u32,
    label_counter: u32,
    pub(crate) targets: Vec<BranchTarget>,
    pub(crate) funcs: Vec<FuncFrame>,
    /// Blocks entered below the top level. `:=` declares globals only at
    /// depth zero.
    pub(crate) depth: usize,
}

impl<'a> EmitContext<'a> {
    pub fn new(
        interner: &'a StringInterner,
        pool: &'a TypePool,
        info: &'a TypeInfo,
        arena: &'a ExprArena,
        options: EmitOptions,
    ) -> Self {
        EmitContext {
            interner,
            pool,
            info,
            arena,
            options,
            indent: 0,
            output: String::with_capacity(1024),
            pending_types: Vec::new(),
            anon_types: FxHashMap::default(),
            anon_counts: FxHashMap::default(),
            temp_counter: 0,
            label_counter: 0,
            targets: Vec::new(),
            funcs: Vec::new(),
            depth: 0,
        }
    }

    /// A Go identifier as a Lua name. Lua keywords get a trailing `_`.
    pub fn name(&self, name: Name) -> String {
        let s = self.interner.lookup(name);
        if LUA_KEYWORDS.contains(&s) {
            format!("{s}_")
        } else {
            s.to_string()
        }
    }

    #[inline]
    pub fn resolve(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    pub fn fresh_temp(&mut self) -> String {
        let n = self.temp_counter;
        self.temp_counter += 1;
        format!("__t{n}")
    }

    pub fn fresh_label(&mut self) -> u32 {
        self.label_counter += 1;
        self.label_counter
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn dedent(&mut self) {
        debug_assert!(self.indent > 0, "dedent called with zero indent");
        self.indent = self.indent.saturating_sub(1);
    }

    pub fn indentation(&self) -> String {
        "    ".repeat(self.indent)
    }

    /// Write a line at the current indentation.
    pub fn writeln(&mut self, line: &str) {
        for _ in 0..self.indent {
            self.output.push_str("    ");
        }
        self.output.push_str(line);
        self.output.push('\n');
    }

    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }

    /// Run `f` against an empty buffer one level deeper and return what it
    /// wrote. Used for function literals, whose bodies sit inside an
    /// expression.
    pub fn capture(
        &mut self,
        f: impl FnOnce(&mut Self) -> EmitResult<()>,
    ) -> EmitResult<String> {
        let saved = std::mem::take(&mut self.output);
        self.indent();
        let result = f(self);
        self.dedent();
        let captured = std::mem::replace(&mut self.output, saved);
        result.map(|()| captured)
    }

    pub(crate) fn anon_name(&self, ty: TypeId) -> Option<String> {
        self.anon_types.get(&ty).cloned()
    }

    /// Name of the descriptor for an anonymous type, registering its
    /// definition on first use.
    pub(crate) fn anon_type(&mut self, ty: TypeId, kind: &'static str, definition: String) -> String {
        if let Some(name) = self.anon_types.get(&ty) {
            return name.clone();
        }
        let count = self.anon_counts.entry(kind).or_insert(0);
        let name = if *count == 0 {
            format!("__type__.anon_{kind}Type")
        } else {
            format!("__type__.anon_{kind}Type{count}")
        };
        *count += 1;
        self.pending_types.push(format!("{name} = {definition};"));
        self.anon_types.insert(ty, name.clone());
        name
    }

    /// Write out descriptor definitions registered since the last flush.
    pub fn flush_types(&mut self) {
        for line in std::mem::take(&mut self.pending_types) {
            self.writeln(&line);
        }
    }

    pub(crate) fn take_pending_types(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending_types)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn with_ctx(f: impl FnOnce(&mut EmitContext<'_>)) {
        let interner = StringInterner::new();
        let pool = TypePool::new();
        let info = TypeInfo::default();
        let arena = ExprArena::new();
        let mut ctx = EmitContext::new(&interner, &pool, &info, &arena, EmitOptions::default());
        f(&mut ctx);
    }

    #[test]
    fn test_keywords_are_escaped() {
        with_ctx(|ctx| {
            let end = ctx.interner.intern("end");
            let x = ctx.interner.intern("x");
            assert_eq!(ctx.name(end), "end_");
            assert_eq!(ctx.name(x), "x");
        });
    }

    #[test]
    fn test_capture_indents_and_restores() {
        with_ctx(|ctx| {
            ctx.writeln("a");
            let inner = ctx
                .capture(|ctx| {
                    ctx.writeln("b");
                    Ok(())
                })
                .unwrap();
            ctx.writeln("c");
            assert_eq!(inner, "    b\n");
            assert_eq!(ctx.take_output(), "a\nc\n");
        });
    }

    #[test]
    fn test_anon_types_are_numbered_per_kind() {
        with_ctx(|ctx| {
            let a = ctx.anon_type(TypeId::INT, "slice", "__sliceType(__type__.int)".into());
            let again = ctx.anon_type(TypeId::INT, "slice", String::new());
            let b = ctx.anon_type(TypeId::STRING, "slice", "__sliceType(__type__.string)".into());
            assert_eq!(a, "__type__.anon_sliceType");
            assert_eq!(again, a);
            assert_eq!(b, "__type__.anon_sliceType1");
            assert_eq!(ctx.take_pending_types().len(), 2);
        });
    }
}
