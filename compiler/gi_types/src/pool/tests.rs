use super::*;
use crate::Field;
use gi_ir::StringInterner;
use pretty_assertions::assert_eq;

#[test]
fn test_predeclared_ids_are_fixed() {
    let pool = TypePool::new();
    assert_eq!(pool.get(TypeId::INT), &Type::Basic(BasicKind::Int));
    assert_eq!(pool.get(TypeId::STRING), &Type::Basic(BasicKind::String));
    assert_eq!(pool.get(TypeId::UNTYPED_NIL), &Type::Basic(BasicKind::UntypedNil));
    assert_eq!(pool.get(TypeId::VOID), &Type::Tuple(Vec::new()));
    assert_eq!(pool.get(TypeId::EMPTY_INTERFACE), &Type::Interface(Vec::new()));
    assert!(pool.is_named(TypeId::ERROR));
}

#[test]
fn test_structural_types_are_interned() {
    let mut pool = TypePool::new();
    let a = pool.slice(TypeId::INT);
    let b = pool.slice(TypeId::INT);
    assert_eq!(a, b);
    let m1 = pool.map(TypeId::STRING, a);
    let m2 = pool.map(TypeId::STRING, b);
    assert_eq!(m1, m2);
    assert_ne!(pool.slice(TypeId::STRING), a);
}

#[test]
fn test_named_types_are_distinct() {
    let interner = StringInterner::new();
    let mut pool = TypePool::new();
    let name = interner.intern("A");
    let first = pool.new_named(name, None);
    let second = pool.new_named(name, None);
    assert_ne!(first, second);
    pool.set_underlying(first, TypeId::INT);
    assert_eq!(pool.underlying(first), TypeId::INT);
    assert_eq!(pool.underlying(second), TypeId::INVALID);
}

#[test]
fn test_underlying_follows_named_chains() {
    let interner = StringInterner::new();
    let mut pool = TypePool::new();
    let a = pool.new_named(interner.intern("A"), None);
    let b = pool.new_named(interner.intern("B"), None);
    pool.set_underlying(a, b);
    pool.set_underlying(b, TypeId::STRING);
    assert_eq!(pool.underlying(a), TypeId::STRING);
    assert!(pool.is_string(a));
}

#[test]
fn test_cyclic_named_types_are_invalid() {
    let interner = StringInterner::new();
    let mut pool = TypePool::new();
    let a = pool.new_named(interner.intern("A"), None);
    let b = pool.new_named(interner.intern("B"), None);
    pool.set_underlying(a, b);
    pool.set_underlying(b, a);
    assert_eq!(pool.underlying(a), TypeId::INVALID);
}

#[test]
fn test_display() {
    let interner = StringInterner::new();
    let mut pool = TypePool::new();
    pool.set_error_name(interner.intern("error"), interner.intern("Error"));
    let ints = pool.slice(TypeId::INT);
    let sig = pool.func(Signature {
        params: vec![TypeId::STRING, ints],
        results: vec![TypeId::BOOL, TypeId::ERROR],
        variadic: true,
    });
    assert_eq!(pool.display(sig, &interner), "func(string, ...int) (bool, error)");
    let chan = pool.chan(ChanDir::Recv, TypeId::INT);
    assert_eq!(pool.display(chan, &interner), "<-chan int");
    let strukt = pool.structure(vec![Field {
        name: interner.intern("x"),
        ty: TypeId::FLOAT64,
        embedded: false,
        tag: None,
    }]);
    assert_eq!(pool.display(strukt, &interner), "struct{x float64}");
    let error_underlying = pool.underlying(TypeId::ERROR);
    assert_eq!(
        pool.display(error_underlying, &interner),
        "interface { Error() string }"
    );
}

#[test]
fn test_default_types() {
    let pool = TypePool::new();
    assert_eq!(pool.default_type(TypeId::UNTYPED_INT), TypeId::INT);
    assert_eq!(pool.default_type(TypeId::UNTYPED_RUNE), TypeId::INT32);
    assert_eq!(pool.default_type(TypeId::UNTYPED_FLOAT), TypeId::FLOAT64);
    assert_eq!(pool.default_type(TypeId::UNTYPED_NIL), TypeId::UNTYPED_NIL);
}
