use super::*;

#[test]
fn test_intern_is_idempotent() {
    let interner = StringInterner::new();
    let a = interner.intern("adder");
    let b = interner.intern("adder");
    assert_eq!(a, b);
    assert_eq!(interner.lookup(a), "adder");
}

#[test]
fn test_distinct_strings_get_distinct_names() {
    let interner = StringInterner::new();
    assert_ne!(interner.intern("a"), interner.intern("b"));
}

#[test]
fn test_preinterned_names() {
    let interner = StringInterner::new();
    assert_eq!(interner.intern(""), Name::EMPTY);
    assert_eq!(interner.intern("_"), Name::BLANK);
    assert!(Name::BLANK.is_blank());
}

#[test]
fn test_foreign_name_looks_up_empty() {
    let small = StringInterner::new();
    let big = StringInterner::new();
    for i in 0..10 {
        big.intern(&format!("n{i}"));
    }
    let foreign = big.intern("zz");
    assert_eq!(small.lookup(foreign), "");
}
