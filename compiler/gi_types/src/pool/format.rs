//! Go-syntax rendering of types for diagnostics.

use super::TypePool;
use crate::{Type, TypeId};
use gi_ir::ast::ChanDir;
use gi_ir::StringInterner;
use std::fmt::Write;

impl TypePool {
    pub fn display(&self, id: TypeId, interner: &StringInterner) -> String {
        let mut out = String::new();
        self.write_type(&mut out, id, interner, 0);
        out
    }

    fn write_list(&self, out: &mut String, ids: &[TypeId], interner: &StringInterner, depth: u32) {
        for (i, &id) in ids.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.write_type(out, id, interner, depth);
        }
    }

    fn write_type(&self, out: &mut String, id: TypeId, interner: &StringInterner, depth: u32) {
        if depth > 32 {
            out.push_str("...");
            return;
        }
        let depth = depth + 1;
        match self.get(id) {
            Type::Invalid => out.push_str("invalid type"),
            Type::Basic(kind) => out.push_str(kind.name()),
            Type::Named(named) => out.push_str(interner.lookup(named.name)),
            Type::Pointer(elem) => {
                out.push('*');
                self.write_type(out, *elem, interner, depth);
            }
            Type::Slice(elem) => {
                out.push_str("[]");
                self.write_type(out, *elem, interner, depth);
            }
            Type::Array { len, elem } => {
                let _ = write!(out, "[{len}]");
                self.write_type(out, *elem, interner, depth);
            }
            Type::Map { key, value } => {
                out.push_str("map[");
                self.write_type(out, *key, interner, depth);
                out.push(']');
                self.write_type(out, *value, interner, depth);
            }
            Type::Chan { dir, elem } => {
                out.push_str(match dir {
                    ChanDir::Both => "chan ",
                    ChanDir::Send => "chan<- ",
                    ChanDir::Recv => "<-chan ",
                });
                self.write_type(out, *elem, interner, depth);
            }
            Type::Func(sig) => {
                out.push_str("func(");
                for (i, &param) in sig.params.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    match self.get(param) {
                        Type::Slice(elem) if sig.variadic && i + 1 == sig.params.len() => {
                            out.push_str("...");
                            self.write_type(out, *elem, interner, depth);
                        }
                        _ => self.write_type(out, param, interner, depth),
                    }
                }
                out.push(')');
                match sig.results.as_slice() {
                    [] => {}
                    [single] => {
                        out.push(' ');
                        self.write_type(out, *single, interner, depth);
                    }
                    many => {
                        out.push_str(" (");
                        self.write_list(out, many, interner, depth);
                        out.push(')');
                    }
                }
            }
            Type::Struct(fields) => {
                out.push_str("struct{");
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        out.push_str("; ");
                    }
                    if !field.embedded {
                        out.push_str(interner.lookup(field.name));
                        out.push(' ');
                    }
                    self.write_type(out, field.ty, interner, depth);
                }
                out.push('}');
            }
            Type::Interface(methods) => {
                if id == TypeId::EMPTY_INTERFACE {
                    out.push_str("interface {}");
                    return;
                }
                out.push_str("interface {");
                for (i, method) in methods.iter().enumerate() {
                    out.push_str(if i > 0 { "; " } else { " " });
                    out.push_str(interner.lookup(method.name));
                    let mut sig = String::new();
                    self.write_type(&mut sig, method.sig, interner, depth);
                    out.push_str(sig.strip_prefix("func").unwrap_or(&sig));
                }
                out.push_str(" }");
            }
            Type::Tuple(elems) => {
                out.push('(');
                self.write_list(out, elems, interner, depth);
                out.push(')');
            }
        }
    }
}
