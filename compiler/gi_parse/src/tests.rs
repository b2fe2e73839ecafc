#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use gi_ir::ast::{
    AssignOp, BinaryOp, ChanDir, Decl, ExprKind, Item, StmtKind, TypeExprKind, UnaryOp,
};
use gi_ir::ErrorCode;
use pretty_assertions::assert_eq;

fn parse(src: &str) -> (Unit, StringInterner) {
    let interner = StringInterner::new();
    let unit = parse_unit(src, &interner).unwrap_or_else(|e| panic!("{src:?}: {e}"));
    (unit, interner)
}

fn parse_err(src: &str) -> ParseFailure {
    let interner = StringInterner::new();
    parse_unit(src, &interner).expect_err("expected parse failure")
}

fn only_stmt(unit: &Unit) -> &StmtKind {
    assert_eq!(unit.items.len(), 1);
    match &unit.items[0] {
        Item::Stmt(stmt) => &stmt.kind,
        Item::Decl(decl) => panic!("expected statement, got {decl:?}"),
    }
}

fn only_decl(unit: &Unit) -> &Decl {
    assert_eq!(unit.items.len(), 1);
    match &unit.items[0] {
        Item::Decl(decl) => decl,
        Item::Stmt(stmt) => panic!("expected declaration, got {stmt:?}"),
    }
}

#[test]
fn test_precedence() {
    let (unit, _) = parse("1 + 2 * 3");
    let StmtKind::Expr(root) = only_stmt(&unit) else {
        panic!()
    };
    let ExprKind::Binary { op, right, .. } = unit.arena.kind(*root) else {
        panic!()
    };
    assert_eq!(*op, BinaryOp::Add);
    assert!(matches!(
        unit.arena.kind(*right),
        ExprKind::Binary {
            op: BinaryOp::Mul,
            ..
        }
    ));
}

#[test]
fn test_left_associativity() {
    let (unit, _) = parse("8 - 4 - 2");
    let StmtKind::Expr(root) = only_stmt(&unit) else {
        panic!()
    };
    let ExprKind::Binary { left, right, .. } = unit.arena.kind(*root) else {
        panic!()
    };
    assert!(matches!(unit.arena.kind(*left), ExprKind::Binary { .. }));
    assert_eq!(unit.arena.kind(*right), &ExprKind::Int(2));
}

#[test]
fn test_short_var_decl() {
    let (unit, interner) = parse("a, b := 3, 4");
    let StmtKind::ShortVarDecl { names, values } = only_stmt(&unit) else {
        panic!()
    };
    let names: Vec<_> = names.iter().map(|n| interner.lookup(n.name)).collect();
    assert_eq!(names, vec!["a", "b"]);
    assert_eq!(values.len(), 2);
}

#[test]
fn test_short_var_decl_requires_names() {
    let failure = parse_err("a.b := 1");
    assert_eq!(failure.code, ErrorCode::E1006);
    assert!(!failure.is_end_of_input());
}

#[test]
fn test_pointer_store() {
    let (unit, _) = parse("*b = 33");
    let StmtKind::Assign { lhs, op, .. } = only_stmt(&unit) else {
        panic!()
    };
    assert_eq!(*op, AssignOp::Assign);
    assert!(matches!(
        unit.arena.kind(lhs[0]),
        ExprKind::Unary {
            op: UnaryOp::Deref,
            ..
        }
    ));
}

#[test]
fn test_compound_assignment_and_incdec() {
    let (unit, _) = parse("x += 2; y++");
    assert_eq!(unit.items.len(), 2);
    let Item::Stmt(first) = &unit.items[0] else {
        panic!()
    };
    assert!(matches!(
        first.kind,
        StmtKind::Assign {
            op: AssignOp::Compound(BinaryOp::Add),
            ..
        }
    ));
    let Item::Stmt(second) = &unit.items[1] else {
        panic!()
    };
    assert!(matches!(second.kind, StmtKind::IncDec { inc: true, .. }));
}

#[test]
fn test_method_declaration() {
    let (unit, interner) = parse("func (s *S) Hi(n int) string { return \"hi\" }");
    let Decl::Func(func) = only_decl(&unit) else {
        panic!()
    };
    assert_eq!(interner.lookup(func.name.name), "Hi");
    let receiver = func.receiver.as_ref().unwrap();
    assert!(matches!(receiver.ty.kind, TypeExprKind::Pointer(_)));
    assert_eq!(func.sig.params.len(), 1);
    assert_eq!(func.sig.results.len(), 1);
}

#[test]
fn test_grouped_parameters() {
    let (unit, interner) = parse("func adder(a, b int, c ...string) int { return a }");
    let Decl::Func(func) = only_decl(&unit) else {
        panic!()
    };
    let names: Vec<_> = func
        .sig
        .params
        .iter()
        .map(|p| interner.lookup(p.name.unwrap().name))
        .collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    assert!(func.sig.variadic);
    assert_eq!(func.sig.params[0].ty, func.sig.params[1].ty);
}

#[test]
fn test_unnamed_parameters() {
    let (unit, _) = parse("var f func(int, string) (bool, error)");
    let Decl::Var(specs) = only_decl(&unit) else {
        panic!()
    };
    let TypeExprKind::Func(sig) = &specs[0].ty.as_ref().unwrap().kind else {
        panic!()
    };
    assert_eq!(sig.params.len(), 2);
    assert!(sig.params.iter().all(|p| p.name.is_none()));
    assert_eq!(sig.results.len(), 2);
}

#[test]
fn test_mixed_parameters_rejected() {
    let failure = parse_err("func f(a int, string) {}");
    assert_eq!(failure.message, "mixed named and unnamed parameters");
}

#[test]
fn test_const_group_records_iota() {
    let (unit, _) = parse("const (\n A = iota\n B\n C\n)");
    let Decl::Const(specs) = only_decl(&unit) else {
        panic!()
    };
    let iotas: Vec<_> = specs.iter().map(|s| s.iota).collect();
    assert_eq!(iotas, vec![0, 1, 2]);
    assert!(specs[1].values.is_empty());
}

#[test]
fn test_struct_type_with_embedding() {
    let (unit, _) = parse("type T struct {\n Base\n *Other\n x, y int `json:\"x\"`\n}");
    let Decl::Type(specs) = only_decl(&unit) else {
        panic!()
    };
    let TypeExprKind::Struct(fields) = &specs[0].ty.kind else {
        panic!()
    };
    assert_eq!(fields.len(), 3);
    assert!(fields[0].is_embedded());
    assert!(fields[1].is_embedded());
    assert_eq!(fields[2].names.len(), 2);
    assert!(fields[2].tag.is_some());
}

#[test]
fn test_channel_types() {
    let (unit, _) = parse("var c <-chan int");
    let Decl::Var(specs) = only_decl(&unit) else {
        panic!()
    };
    assert!(matches!(
        specs[0].ty.as_ref().unwrap().kind,
        TypeExprKind::Chan {
            dir: ChanDir::Recv,
            ..
        }
    ));
}

#[test]
fn test_composite_literals() {
    let (unit, _) = parse("a := []int{1, 2, 3}");
    let StmtKind::ShortVarDecl { values, .. } = only_stmt(&unit) else {
        panic!()
    };
    let ExprKind::CompositeLit { ty, elements } = unit.arena.kind(values[0]) else {
        panic!()
    };
    assert!(matches!(ty.as_ref().unwrap().kind, TypeExprKind::Slice(_)));
    assert_eq!(elements.len(), 3);
}

#[test]
fn test_elided_nested_literals() {
    let (unit, _) = parse("m := map[string][]int{\"a\": {1}, \"b\": {2, 3}}");
    let StmtKind::ShortVarDecl { values, .. } = only_stmt(&unit) else {
        panic!()
    };
    let ExprKind::CompositeLit { elements, .. } = unit.arena.kind(values[0]) else {
        panic!()
    };
    assert!(elements.iter().all(|e| e.key.is_some()));
    assert!(matches!(
        unit.arena.kind(elements[1].value),
        ExprKind::CompositeLit { ty: None, .. }
    ));
}

#[test]
fn test_composite_literal_disabled_in_if_header() {
    let (unit, _) = parse("if x == y {\n}");
    assert!(matches!(only_stmt(&unit), StmtKind::If { .. }));
}

#[test]
fn test_composite_literal_allowed_in_parenthesized_header() {
    let (unit, _) = parse("if x == (T{}) {\n}");
    assert!(matches!(only_stmt(&unit), StmtKind::If { .. }));
}

#[test]
fn test_for_forms() {
    let (unit, _) = parse("for i := 0; i < 3; i++ {\n}");
    assert!(matches!(
        only_stmt(&unit),
        StmtKind::For {
            init: Some(_),
            cond: Some(_),
            post: Some(_),
            ..
        }
    ));
    let (unit, _) = parse("for k, v := range m {\n}");
    assert!(matches!(
        only_stmt(&unit),
        StmtKind::ForRange {
            key: Some(_),
            value: Some(_),
            define: true,
            ..
        }
    ));
    let (unit, _) = parse("for x < 3 {\n}");
    assert!(matches!(
        only_stmt(&unit),
        StmtKind::For {
            init: None,
            cond: Some(_),
            ..
        }
    ));
}

#[test]
fn test_type_switch() {
    let (unit, _) = parse("switch v := x.(type) {\ncase int, nil:\ndefault:\n}");
    let StmtKind::TypeSwitch {
        binding, clauses, ..
    } = only_stmt(&unit)
    else {
        panic!()
    };
    assert!(binding.is_some());
    assert_eq!(clauses.len(), 2);
    assert!(clauses[0].types[1].is_none());
    assert!(clauses[1].is_default);
}

#[test]
fn test_select_clauses() {
    let (unit, _) = parse("select {\ncase v := <-ch:\ncase out <- 1:\ndefault:\n}");
    let StmtKind::Select { clauses } = only_stmt(&unit) else {
        panic!()
    };
    assert_eq!(clauses.len(), 3);
    assert!(clauses[2].comm.is_none());
}

#[test]
fn test_package_and_imports() {
    let (unit, interner) = parse("package main\nimport (\n \"fmt\"\n m \"math\"\n)\nx := 1");
    assert_eq!(interner.lookup(unit.package.unwrap().name), "main");
    assert_eq!(unit.imports.len(), 2);
    assert_eq!(interner.lookup(unit.imports[0].path), "fmt");
    assert_eq!(unit.items.len(), 1);
}

#[test]
fn test_labeled_loop() {
    let (unit, _) = parse("outer:\nfor {\n break outer\n}");
    assert!(matches!(only_stmt(&unit), StmtKind::Labeled { .. }));
}

#[test]
fn test_slice_expression() {
    let (unit, _) = parse("s[1:3:4]");
    let StmtKind::Expr(e) = only_stmt(&unit) else {
        panic!()
    };
    assert!(matches!(
        unit.arena.kind(*e),
        ExprKind::Slice {
            low: Some(_),
            high: Some(_),
            max: Some(_),
            ..
        }
    ));
}

#[test]
fn test_missing_if_condition() {
    let failure = parse_err("if {\n}");
    assert_eq!(failure.message, "missing condition in if statement");
}

#[test]
fn test_first_error_only() {
    let failure = parse_err("3 4; 5 6");
    assert_eq!(failure.span, gi_ir::Span::new(2, 3));
}

#[test]
fn test_deeply_nested_parens() {
    let depth = 5_000;
    let src = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
    let (unit, _) = parse(&src);
    assert_eq!(unit.items.len(), 1);
}
