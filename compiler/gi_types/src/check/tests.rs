#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::info::{CallKind, Selection};
use crate::Type;
use gi_ir::ast::StmtKind;
use pretty_assertions::assert_eq;

struct Session {
    interner: StringInterner,
    pool: TypePool,
    table: DeclarationTable,
}

impl Session {
    fn new() -> Self {
        Session {
            interner: StringInterner::new(),
            pool: TypePool::new(),
            table: DeclarationTable::new(),
        }
    }

    fn submit(&mut self, src: &str) -> Result<CheckedUnit, TypeCheckError> {
        let unit = gi_parse::parse_unit(src, &self.interner)
            .unwrap_or_else(|e| panic!("{src:?} does not parse: {e}"));
        check_unit(unit, &self.interner, &mut self.pool, &mut self.table)
    }

    fn ok(&mut self, src: &str) -> CheckedUnit {
        self.submit(src)
            .unwrap_or_else(|e| panic!("{src:?}: {} {}", e.code, e.message))
    }

    fn err(&mut self, src: &str) -> TypeCheckError {
        match self.submit(src) {
            Ok(_) => panic!("{src:?} should not check"),
            Err(e) => e,
        }
    }

    fn decl(&self, name: &str) -> Option<&Declaration> {
        self.table
            .lookup(self.interner.intern(name))
            .map(|(_, decl)| decl)
    }

    fn type_of(&self, name: &str) -> String {
        let decl = self.decl(name).unwrap_or_else(|| panic!("{name} is not declared"));
        self.pool.display(decl.ty, &self.interner)
    }
}

fn first_expr(checked: &CheckedUnit) -> ExprId {
    match &checked.unit.items[0] {
        Item::Stmt(stmt) => match &stmt.kind {
            StmtKind::Expr(id) => *id,
            other => panic!("expected expression statement, got {other:?}"),
        },
        Item::Decl(decl) => panic!("expected statement, got {decl:?}"),
    }
}

#[test]
fn test_function_sees_later_globals() {
    let mut s = Session::new();
    s.ok("a := 10");
    s.ok("func adder(a, b int) int { return a + b }");
    s.ok("sum := adder(5, 5)");
    s.ok("sum2 := adder(a, a)");
    assert_eq!(s.type_of("sum"), "int");
    assert_eq!(s.type_of("sum2"), "int");
    assert_eq!(s.type_of("adder"), "func(int, int) int");
}

#[test]
fn test_method_redefinition_replays() {
    let mut s = Session::new();
    s.ok("type S struct{}");
    s.ok("var s S");
    s.ok(r#"func (s *S) Hi() { println("hi") }"#);
    let first = s.ok("s.Hi()");
    assert_eq!(
        first.info.calls.get(&first_expr(&first)),
        Some(&CallKind::Method)
    );
    s.ok(r#"func (s *S) Hi() { println("hello") }"#);
    s.ok("s.Hi()");

    let ty = s.decl("S").unwrap().ty;
    assert_eq!(s.decl("S").unwrap().methods().unwrap().len(), 1);
    assert_eq!(s.table.method_set(&s.pool, ty).len(), 1);
}

#[test]
fn test_field_and_method_collide() {
    let mut s = Session::new();
    s.ok("type T struct { Hi int }");
    let err = s.err("func (t T) Hi() {}");
    assert_eq!(err.code, ErrorCode::E2008);
    assert_eq!(err.message, "field and method with the same name Hi");
}

#[test]
fn test_type_redefinition_drops_methods() {
    let mut s = Session::new();
    s.ok("type S struct{}\nfunc (S) M() {}");
    s.ok("var v S\nv.M()");
    s.ok("type S struct{}");
    let err = s.err("var w S\nw.M()");
    assert_eq!(err.code, ErrorCode::E2005);
    assert_eq!(err.message, "w.M undefined (type S has no field or method M)");
}

#[test]
fn test_undefined_name() {
    let mut s = Session::new();
    let err = s.err("x + 1");
    assert_eq!(err.code, ErrorCode::E2001);
    assert_eq!(err.message, "undefined: x");
}

#[test]
fn test_mismatched_types() {
    let mut s = Session::new();
    s.ok("var a int = 1\nvar b float64 = 2");
    let err = s.err("a + b");
    assert_eq!(err.code, ErrorCode::E2002);
    assert_eq!(
        err.message,
        "invalid operation: a + b (mismatched types int and float64)"
    );
}

#[test]
fn test_argument_count() {
    let mut s = Session::new();
    s.ok("func f(a int) {}");
    let err = s.err("f()");
    assert_eq!(err.code, ErrorCode::E2003);
    assert_eq!(err.message, "not enough arguments in call to f");
    let err = s.err("f(1, 2)");
    assert_eq!(err.message, "too many arguments in call to f");
}

#[test]
fn test_typed_constants() {
    let mut s = Session::new();
    s.ok("const c float64 = 1");
    assert_eq!(s.decl("c").unwrap().kind, DeclKind::Const(ConstValue::Float(1.0)));
    assert_eq!(s.type_of("c"), "float64");

    let err = s.err("var u uint8 = 256");
    assert_eq!(err.code, ErrorCode::E2002);
    assert_eq!(err.message, "constant 256 overflows uint8");
}

#[test]
fn test_iota() {
    let mut s = Session::new();
    s.ok("const (\n\tA = iota\n\tB\n\tC\n)");
    assert_eq!(s.decl("C").unwrap().kind, DeclKind::Const(ConstValue::Int(2)));
    assert_eq!(s.type_of("C"), "untyped int");
}

#[test]
fn test_short_var_decl_scoping() {
    let mut s = Session::new();
    // At the prompt `:=` always (re)declares.
    s.ok("x := 1");
    s.ok(r#"x := "s""#);
    assert_eq!(s.type_of("x"), "string");

    let err = s.err("func f() { y := 1; y := 2 }");
    assert_eq!(err.code, ErrorCode::E2009);
    assert_eq!(err.message, "no new variables on left side of :=");

    s.ok("func g() { y := 1; y, z := 2, 3; _ = z; _ = y }");
}

#[test]
fn test_missing_return() {
    let mut s = Session::new();
    let err = s.err("func f() int { }");
    assert_eq!(err.code, ErrorCode::E2017);
    assert_eq!(err.message, "missing return");

    s.ok("func g() int { for {} }");
    s.ok(r#"func h(x int) int { if x > 0 { return 1 } else { panic("no") } }"#);
    let err = s.err("func k() int { for { break } }");
    assert_eq!(err.message, "missing return");
}

#[test]
fn test_branch_outside_loop() {
    let mut s = Session::new();
    let err = s.err("func f() { break }");
    assert_eq!(err.code, ErrorCode::E2011);
    assert_eq!(err.message, "break is not in a loop, switch, or select");

    let err = s.err("func f() { switch { case true: continue } }");
    assert_eq!(err.message, "continue is not in a loop");
}

#[test]
fn test_interface_satisfaction() {
    let mut s = Session::new();
    s.ok("type Stringer interface { String() string }");
    s.ok(r#"type T struct{}; func (t *T) String() string { return "t" }"#);
    s.ok("var p Stringer = &T{}");
    let err = s.err("var v Stringer = T{}");
    assert_eq!(err.code, ErrorCode::E2002);
    assert!(
        err.message
            .ends_with("T does not implement Stringer (method String has pointer receiver)"),
        "{}",
        err.message
    );
}

#[test]
fn test_promoted_method_call() {
    let mut s = Session::new();
    s.ok("type In struct{}\nfunc (In) M() int { return 1 }\ntype Out struct { In }");
    let checked = s.ok("var o Out\nn := o.M()");
    assert_eq!(s.type_of("n"), "int");
    assert!(checked
        .info
        .selections
        .values()
        .any(|sel| matches!(sel, Selection::Method(m) if m.path == vec![0])));
}

#[test]
fn test_failed_unit_keeps_earlier_declarations() {
    let mut s = Session::new();
    let err = s.err("a := 1\nb := missing");
    assert_eq!(err.code, ErrorCode::E2001);
    assert!(s.decl("a").is_some());
    assert!(s.decl("b").is_none());
}

#[test]
fn test_prompt_expression_takes_default_type() {
    let mut s = Session::new();
    let checked = s.ok("1 + 2");
    let id = first_expr(&checked);
    assert_eq!(checked.info.type_of(id), TypeId::INT);
    assert_eq!(checked.info.const_value(id), Some(&ConstValue::Int(3)));

    let checked = s.ok("2.5 * 2");
    let id = first_expr(&checked);
    assert_eq!(checked.info.type_of(id), TypeId::FLOAT64);
}

#[test]
fn test_unused_value_in_function() {
    let mut s = Session::new();
    let err = s.err("func f(a int) { a + 1 }");
    assert_eq!(err.code, ErrorCode::E2013);
    assert_eq!(err.message, "expression (value of type int) is not used");
}

#[test]
fn test_comma_ok_forms() {
    let mut s = Session::new();
    s.ok("m := map[string]int{\"a\": 1}");
    let checked = s.ok(r#"v, ok := m["a"]"#);
    assert_eq!(checked.info.comma_ok.len(), 1);
    assert_eq!(s.type_of("v"), "int");
    assert_eq!(s.type_of("ok"), "bool");

    let err = s.err(r#"a, b, c := m["a"]"#);
    assert_eq!(err.code, ErrorCode::E2004);
}

#[test]
fn test_constant_division_by_zero() {
    let mut s = Session::new();
    let err = s.err("1 / 0");
    assert_eq!(err.code, ErrorCode::E2010);
    assert_eq!(err.message, "invalid operation: division by zero");
}

#[test]
fn test_composite_literals() {
    let mut s = Session::new();
    s.ok("type P struct { X, Y int }");
    s.ok("ps := []P{{1, 2}, {X: 3}}");
    assert_eq!(s.type_of("ps"), "[]P");
    s.ok("arr := [...]string{2: \"c\"}");
    assert_eq!(s.type_of("arr"), "[3]string");
    s.ok("pp := []*P{{1, 2}}");
    assert_eq!(s.type_of("pp"), "[]*P");

    let err = s.err("q := P{Z: 1}");
    assert_eq!(err.code, ErrorCode::E2005);
    let err = s.err("q := P{1}");
    assert_eq!(err.message, "too few values in struct literal of type P");
}

#[test]
fn test_recursive_types_and_receivers() {
    let mut s = Session::new();
    s.ok("type Node struct { next *Node; v int }");
    s.ok("func (n *Node) Len() int { if n == nil { return 0 }; return 1 + n.next.Len() }");
    let err = s.err("func (i int) M() {}");
    assert_eq!(err.code, ErrorCode::E2007);

    let node = s.decl("Node").unwrap().ty;
    let Type::Struct(fields) = s.pool.underlying_type(node) else {
        panic!("Node is not a struct");
    };
    assert_eq!(fields.len(), 2);
}

#[test]
fn test_switch_and_range() {
    let mut s = Session::new();
    s.ok(
        "func classify(xs []int) (n int) {
            for i, x := range xs {
                switch {
                case x > 0:
                    n += i
                case x < 0:
                    fallthrough
                default:
                    continue
                }
            }
            return
        }",
    );
    let err = s.err("func f(x int) { switch x { case \"a\": } }");
    assert_eq!(err.code, ErrorCode::E2002);
}

#[test]
fn test_type_switch_binding() {
    let mut s = Session::new();
    s.ok(
        "func describe(v any) string {
            switch x := v.(type) {
            case int:
                return string(rune(x))
            case string:
                return x
            }
            return \"\"
        }",
    );
}
