#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::{ConstValue, Field, InterfaceMethod, Receiver, Signature};
use gi_ir::{Span, StringInterner};
use pretty_assertions::assert_eq;

struct Fixture {
    interner: StringInterner,
    pool: TypePool,
    table: DeclarationTable,
}

impl Fixture {
    fn new() -> Self {
        Fixture {
            interner: StringInterner::new(),
            pool: TypePool::new(),
            table: DeclarationTable::new(),
        }
    }

    fn name(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    fn var(&mut self, name: &str, ty: TypeId) -> (DeclId, Option<Declaration>) {
        let decl = Declaration::new(self.name(name), Span::DUMMY, ty, DeclKind::Var);
        self.table.declare(decl)
    }

    /// Declare `type name struct { fields }`.
    fn struct_type(&mut self, name: &str, fields: &[(&str, TypeId, bool)]) -> (DeclId, TypeId) {
        let n = self.name(name);
        let named = self.pool.new_named(n, None);
        let (id, _) = self
            .table
            .declare(Declaration::new(n, Span::DUMMY, named, DeclKind::type_name()));
        let fields = fields
            .iter()
            .map(|(f, ty, embedded)| Field {
                name: self.name(f),
                ty: *ty,
                embedded: *embedded,
                tag: None,
            })
            .collect();
        let strukt = self.pool.structure(fields);
        // Re-point the named type at its declaration.
        let named = self.relink(named, id, strukt);
        (id, named)
    }

    fn relink(&mut self, _old: TypeId, decl: DeclId, underlying: TypeId) -> TypeId {
        let name = self.table.get(decl).unwrap().name;
        let named = self.pool.new_named(name, Some(decl));
        self.pool.set_underlying(named, underlying);
        if let Some(d) = self.table.decls.get_mut(&decl) {
            d.ty = named;
        }
        named
    }

    fn method(
        &mut self,
        receiver: DeclId,
        name: &str,
        pointer: bool,
        results: Vec<TypeId>,
    ) -> Result<(DeclId, Option<Declaration>), RedeclarationConflict> {
        let sig = self.pool.func(Signature {
            params: Vec::new(),
            results,
            variadic: false,
        });
        let decl = Declaration::new(
            self.name(name),
            Span::new(1, 2),
            sig,
            DeclKind::Func {
                receiver: Some(Receiver {
                    base: receiver,
                    pointer,
                }),
            },
        );
        self.table.declare_method(&self.pool, receiver, decl)
    }
}

#[test]
fn test_declare_replaces() {
    let mut fx = Fixture::new();
    let (first, replaced) = fx.var("a", TypeId::INT);
    assert!(replaced.is_none());
    let (second, replaced) = fx.var("a", TypeId::STRING);
    assert_eq!(replaced.unwrap().ty, TypeId::INT);
    let (id, decl) = fx.table.lookup(fx.interner.intern("a")).unwrap();
    assert_eq!(id, second);
    assert_eq!(decl.ty, TypeId::STRING);
    assert!(fx.table.object(first).is_none());
    assert!(fx.table.get(first).is_none());
    assert_eq!(fx.table.len(), 1);
}

#[test]
fn test_replacement_drops_dependency_edges() {
    let mut fx = Fixture::new();
    let (f, _) = fx.var("f", TypeId::INT);
    let (g, _) = fx.var("g", TypeId::INT);
    fx.table.set_deps(g, [f].into_iter().collect());
    assert_eq!(fx.table.dependents(f), vec![g]);

    fx.var("f", TypeId::INT);
    assert!(fx.table.object(g).unwrap().deps.is_empty());
    assert!(fx.table.dependents(f).is_empty());
}

#[test]
fn test_blank_is_never_inserted() {
    let mut fx = Fixture::new();
    let (id, replaced) = fx.var("_", TypeId::INT);
    assert!(replaced.is_none());
    assert!(fx.table.get(id).is_none());
    assert!(fx.table.lookup(Name::BLANK).is_none());
    assert!(fx.table.is_empty());
}

#[test]
fn test_constants_keep_their_value() {
    let mut fx = Fixture::new();
    let decl = Declaration::new(
        fx.interner.intern("K"),
        Span::DUMMY,
        TypeId::UNTYPED_INT,
        DeclKind::Const(ConstValue::Int(7)),
    );
    fx.table.declare(decl);
    let (_, decl) = fx.table.lookup(fx.interner.intern("K")).unwrap();
    assert_eq!(decl.kind, DeclKind::Const(ConstValue::Int(7)));
}

#[test]
fn test_method_redefinition_replaces() {
    let mut fx = Fixture::new();
    let (s, named) = fx.struct_type("S", &[]);
    let (first, replaced) = fx.method(s, "Hi", true, vec![]).unwrap();
    assert!(replaced.is_none());
    let (second, replaced) = fx.method(s, "Hi", true, vec![TypeId::INT]).unwrap();
    assert!(replaced.is_some());

    assert!(fx.table.object(first).is_none());
    let methods = fx.table.get(s).unwrap().methods().unwrap();
    assert_eq!(methods.len(), 1);
    assert_eq!(methods[&fx.interner.intern("Hi")], second);

    let ptr = fx.pool.pointer(named);
    let entry = fx.table.lookup_method(&fx.pool, ptr, fx.interner.intern("Hi")).unwrap();
    assert_eq!(entry.decl, Some(second));
}

#[test]
fn test_field_method_collision() {
    let mut fx = Fixture::new();
    let (s, _) = fx.struct_type("S", &[("Hi", TypeId::INT, false)]);
    let before = fx.table.len();
    let err = fx.method(s, "Hi", false, vec![]).unwrap_err();
    assert_eq!(err.member, fx.interner.intern("Hi"));
    assert_eq!(err.type_name, fx.interner.intern("S"));
    assert_eq!(fx.table.len(), before);
    assert!(fx.table.get(s).unwrap().methods().unwrap().is_empty());
}

#[test]
fn test_type_redefinition_drops_methods() {
    let mut fx = Fixture::new();
    let (old, _) = fx.struct_type("S", &[]);
    let (method, _) = fx.method(old, "Hi", false, vec![]).unwrap();
    let (new, named) = fx.struct_type("S", &[]);
    assert_ne!(old, new);
    assert!(fx.table.object(old).is_none());
    assert!(fx.table.object(method).is_none());
    assert!(fx.table.method_set(&fx.pool, named).is_empty());
}

#[test]
fn test_promoted_methods() {
    let mut fx = Fixture::new();
    let (base, base_ty) = fx.struct_type("Base", &[]);
    fx.method(base, "Name", false, vec![TypeId::STRING]).unwrap();
    fx.method(base, "Touch", true, vec![]).unwrap();
    let base_ptr = fx.pool.pointer(base_ty);
    let (_, outer) = fx.struct_type("Outer", &[("Base", base_ty, true)]);
    let (_, via_ptr) = fx.struct_type("ViaPtr", &[("Base", base_ptr, true)]);

    let name = fx.table.lookup_method(&fx.pool, outer, fx.interner.intern("Name")).unwrap();
    assert_eq!(name.path, vec![0]);
    assert!(!name.indirect);

    let touch = fx.table.lookup_method(&fx.pool, via_ptr, fx.interner.intern("Touch")).unwrap();
    assert!(touch.pointer_recv);
    assert!(touch.indirect);
}

#[test]
fn test_shallower_method_wins() {
    let mut fx = Fixture::new();
    let (inner, inner_ty) = fx.struct_type("Inner", &[]);
    fx.method(inner, "M", false, vec![TypeId::INT]).unwrap();
    let (outer, outer_ty) = fx.struct_type("Outer", &[("Inner", inner_ty, true)]);
    fx.method(outer, "M", false, vec![TypeId::STRING]).unwrap();
    let entry = fx.table.lookup_method(&fx.pool, outer_ty, fx.interner.intern("M")).unwrap();
    assert!(entry.path.is_empty());
    assert_eq!(fx.pool.signature(entry.sig).unwrap().results, vec![TypeId::STRING]);
}

#[test]
fn test_same_depth_methods_are_ambiguous() {
    let mut fx = Fixture::new();
    let (a, a_ty) = fx.struct_type("A", &[]);
    let (b, b_ty) = fx.struct_type("B", &[]);
    fx.method(a, "M", false, vec![]).unwrap();
    fx.method(b, "M", false, vec![]).unwrap();
    let (_, both) = fx.struct_type("Both", &[("A", a_ty, true), ("B", b_ty, true)]);
    assert!(fx.table.lookup_method(&fx.pool, both, fx.interner.intern("M")).is_none());
    assert_eq!(
        fx.table.lookup_field_or_method(&fx.pool, both, fx.interner.intern("M")),
        Lookup::NotFound
    );
}

#[test]
fn test_embedding_cycle_terminates() {
    let mut fx = Fixture::new();
    let n = fx.interner.intern("Node");
    let named = fx.pool.new_named(n, None);
    let (id, _) = fx
        .table
        .declare(Declaration::new(n, Span::DUMMY, named, DeclKind::type_name()));
    let ptr = fx.pool.pointer(named);
    let strukt = fx.pool.structure(vec![Field {
        name: n,
        ty: ptr,
        embedded: true,
        tag: None,
    }]);
    let node = fx.relink(named, id, strukt);
    // *Node embeds *Node embeds ...; the visited set stops the walk.
    let node_ptr = fx.pool.pointer(node);
    let strukt = fx.pool.structure(vec![Field {
        name: n,
        ty: node_ptr,
        embedded: true,
        tag: None,
    }]);
    fx.pool.set_underlying(node, strukt);
    assert!(fx.table.method_set(&fx.pool, node).is_empty());
    assert_eq!(
        fx.table.lookup_field_or_method(&fx.pool, node, fx.interner.intern("missing")),
        Lookup::NotFound
    );
}

#[test]
fn test_promoted_fields() {
    let mut fx = Fixture::new();
    let (_, inner) = fx.struct_type("Inner", &[("x", TypeId::INT, false)]);
    let (_, outer) = fx.struct_type("Outer", &[("y", TypeId::STRING, false), ("Inner", inner, true)]);
    let Lookup::Field(sel) = fx.table.lookup_field_or_method(&fx.pool, outer, fx.interner.intern("x")) else {
        panic!("expected a field");
    };
    assert_eq!(sel.path, vec![1, 0]);
    assert_eq!(sel.ty, TypeId::INT);
}

#[test]
fn test_method_set_memo_is_invalidated() {
    let mut fx = Fixture::new();
    let (s, named) = fx.struct_type("S", &[]);
    assert!(fx.table.method_set(&fx.pool, named).is_empty());
    fx.method(s, "Hi", false, vec![]).unwrap();
    assert_eq!(fx.table.method_set(&fx.pool, named).names(), vec![fx.interner.intern("Hi")]);
}

#[test]
fn test_implements_respects_pointer_receivers() {
    let mut fx = Fixture::new();
    let (s, named) = fx.struct_type("S", &[]);
    fx.method(s, "Close", true, vec![]).unwrap();
    let sig = fx.pool.func(Signature {
        params: Vec::new(),
        results: Vec::new(),
        variadic: false,
    });
    let closer = fx.pool.interface(vec![InterfaceMethod {
        name: fx.interner.intern("Close"),
        sig,
    }]);
    let err = fx.table.implements(&fx.pool, named, closer).unwrap_err();
    assert!(err.pointer_receiver);
    let ptr = fx.pool.pointer(named);
    assert_eq!(fx.table.implements(&fx.pool, ptr, closer), Ok(()));
}

#[test]
fn test_blank_methods_are_dropped() {
    let mut fx = Fixture::new();
    let (s, named) = fx.struct_type("S", &[]);
    let before = fx.table.len();
    for _ in 0..3 {
        let (id, replaced) = fx.method(s, "_", false, vec![]).unwrap();
        assert!(replaced.is_none());
        assert!(fx.table.get(id).is_none());
    }
    assert_eq!(fx.table.len(), before);
    assert!(fx.table.method_set(&fx.pool, named).is_empty());
}

#[test]
fn test_names_in_declaration_order() {
    let mut fx = Fixture::new();
    fx.var("b", TypeId::INT);
    fx.var("a", TypeId::INT);
    fx.var("b", TypeId::INT);
    assert_eq!(fx.table.names(), vec![fx.interner.intern("a"), fx.interner.intern("b")]);
}

mod properties {
    use super::Fixture;
    use crate::TypeId;
    use proptest::prelude::*;

    const TYPES: [TypeId; 3] = [TypeId::INT, TypeId::STRING, TypeId::FLOAT64];

    proptest! {
        #[test]
        fn prop_latest_declaration_wins(
            decls in prop::collection::vec((0..4usize, 0..3usize), 1..24)
        ) {
            let names = ["a", "b", "c", "d"];
            let mut fx = Fixture::new();
            let mut expected = [None; 4];
            for &(n, t) in &decls {
                fx.var(names[n], TYPES[t]);
                expected[n] = Some(TYPES[t]);
            }
            for (n, ty) in expected.iter().enumerate() {
                let found = fx.table.lookup(fx.name(names[n])).map(|(_, d)| d.ty);
                prop_assert_eq!(found, *ty);
            }
            let live = expected.iter().filter(|t| t.is_some()).count();
            prop_assert_eq!(fx.table.len(), live);
            prop_assert_eq!(fx.table.names().len(), live);
        }
    }
}
