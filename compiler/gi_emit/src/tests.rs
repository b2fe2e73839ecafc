#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use gi_types::DeclarationTable;
use pretty_assertions::assert_eq;

/// Parser, checker and emitter over one shared declaration state.
struct Repl {
    interner: StringInterner,
    pool: TypePool,
    table: DeclarationTable,
    options: EmitOptions,
}

impl Repl {
    fn new() -> Self {
        Repl {
            interner: StringInterner::new(),
            pool: TypePool::new(),
            table: DeclarationTable::new(),
            options: EmitOptions::default(),
        }
    }

    fn lua(&mut self, src: &str) -> String {
        let unit = gi_parse::parse_unit(src, &self.interner)
            .unwrap_or_else(|e| panic!("{src:?} does not parse: {e}"));
        let checked = gi_types::check_unit(unit, &self.interner, &mut self.pool, &mut self.table)
            .unwrap_or_else(|e| panic!("{src:?}: {} {}", e.code, e.message));
        LuaEmitter::new(&self.interner, &self.pool, self.options)
            .emit(&checked)
            .unwrap_or_else(|e| panic!("{src:?}: {e}"))
    }
}

#[test]
fn test_short_var_decl_at_prompt() {
    let mut r = Repl::new();
    assert_eq!(r.lua("a := 10"), "a = 10LL;\n");
    assert_eq!(r.lua("a := 1; a := 2"), "a = 1LL;\na = 2LL;\n");
    assert_eq!(r.lua("a = 3"), "a = 3LL;\n");
}

#[test]
fn test_slice_literal_declares_descriptor_first() {
    let mut r = Repl::new();
    assert_eq!(
        r.lua("a := []int{1, 2, 3}"),
        "__type__.anon_sliceType = __sliceType(__type__.int);\n\
         a = __type__.anon_sliceType({[0]=1LL, 2LL, 3LL});\n"
    );
    assert_eq!(r.lua("x := a[0]"), "x = __gi_GetRangeCheck(a, 0LL);\n");
    assert_eq!(r.lua("a[1] = 5"), "__gi_SetRangeCheck(a, 1LL, 5LL);\n");
}

#[test]
fn test_map_literal_and_access() {
    let mut r = Repl::new();
    assert_eq!(
        r.lua(r#"x := map[int]string{3: "hello", 4: "gophers"}"#),
        "__type__.anon_mapType = __mapType(__type__.int, __type__.string);\n\
         x = __makeMap({[3LL]=\"hello\", [4LL]=\"gophers\"}, __type__.int, __type__.string, __type__.anon_mapType);\n"
    );
    assert_eq!(r.lua("s := x[3]"), "s = __gi_GetMap(x, 3LL, \"\");\n");
    assert_eq!(r.lua("s, ok := x[3]"), "s, ok = __gi_GetMapOk(x, 3LL, \"\");\n");
    assert_eq!(r.lua(r#"x[5] = "five""#), "__gi_SetMap(x, 5LL, \"five\");\n");
    assert_eq!(r.lua("delete(x, 3)"), "__gi_delete(x, 3LL);\n");
}

#[test]
fn test_function_declaration() {
    let mut r = Repl::new();
    assert_eq!(
        r.lua("func adder(a, b int) int { return a + b }"),
        "adder = function(a, b)\n    return a + b;\nend;\n"
    );
    assert_eq!(r.lua("sum := adder(5, 5)"), "sum = adder(5LL, 5LL);\n");
}

#[test]
fn test_expressions_at_prompt_print() {
    let mut r = Repl::new();
    assert_eq!(
        r.lua("1 + 2"),
        "__gi_ans = 3LL; __gi_printQuoted(__gi_ans);\n"
    );
    r.lua(r#"s := "go""#);
    assert_eq!(
        r.lua(r#"s + "pher""#),
        "__gi_ans = s .. \"pher\"; __gi_printQuoted(__gi_ans);\n"
    );
    assert_eq!(r.lua(r#"println("hi")"#), "print(\"hi\");\n");
}

#[test]
fn test_calculator_mode_prints_calls() {
    let mut r = Repl::new();
    r.lua("func two() int { return 2 }");
    assert_eq!(r.lua("two()"), "two();\n");
    r.options.print_calls = true;
    assert_eq!(
        r.lua("two()"),
        "__gi_ans = two(); __gi_printQuoted(__gi_ans);\n"
    );
}

#[test]
fn test_integer_division_checks_zero() {
    let mut r = Repl::new();
    r.lua("a := 0");
    assert_eq!(r.lua("b := 1 / a"), "b = __integerByZeroCheck(1LL / a);\n");
    assert_eq!(r.lua("m := 1 % a"), "m = __integerByZeroCheck(1LL % a);\n");
    assert_eq!(r.lua("f := 1.5 / 2"), "f = 0.75;\n");
}

#[test]
fn test_struct_type_and_literal() {
    let mut r = Repl::new();
    assert_eq!(
        r.lua("type P struct { X, Y int }"),
        "__type__.P = __newType(0, __kindStruct, \"main.P\", true, \"main\", true, nil);\n\
         __type__.P.init(\"\", {__structField(\"X\", __type__.int, false, \"\"), __structField(\"Y\", __type__.int, false, \"\")});\n\
         __type__.P.__constructor = function(fields) return fields or {X = 0LL, Y = 0LL}; end;\n"
    );
    assert_eq!(r.lua("p := P{X: 1}"), "p = __type__.P({X = 1LL, Y = 0LL});\n");
    assert_eq!(r.lua("q := p"), "q = __gi_clone(p);\n");
    assert_eq!(r.lua("p.Y = 4"), "p.Y = 4LL;\n");
}

#[test]
fn test_recursive_type_descriptor_follows_named_type() {
    let mut r = Repl::new();
    assert_eq!(
        r.lua("type Node struct { next *Node; v int }"),
        "__type__.Node = __newType(0, __kindStruct, \"main.Node\", true, \"main\", true, nil);\n\
         __type__.anon_ptrType = __ptrType(__type__.Node);\n\
         __type__.Node.init(\"main\", {__structField(\"next\", __type__.anon_ptrType, false, \"\"), __structField(\"v\", __type__.int, false, \"\")});\n\
         __type__.Node.__constructor = function(fields) return fields or {next = nil, v = 0LL}; end;\n"
    );
}

#[test]
fn test_method_declaration_and_call() {
    let mut r = Repl::new();
    r.lua("type S struct{}");
    assert_eq!(
        r.lua(r#"func (s *S) Hi() { println("hi") }"#),
        "__addMethod(__type__.S, \"Hi\", true, function(s)\n    print(\"hi\");\nend);\n"
    );
    r.lua("var v S");
    assert_eq!(r.lua("v.Hi()"), "v:Hi();\n");
}

#[test]
fn test_for_loop_with_continue() {
    let mut r = Repl::new();
    let src = "func f(n int) int {
        s := 0
        for i := 0; i < n; i++ {
            if i == 2 {
                continue
            }
            s += i
        }
        return s
    }";
    assert_eq!(
        r.lua(src),
        "f = function(n)
    local s = 0LL;
    do
        local i = 0LL;
        while i < n do
            do
                if i == 2LL then
                    goto __continue_1;
                end
                s = s + i;
            end
            ::__continue_1::
            i = i + 1LL;
        end
    end
    return s;
end;
"
    );
}

#[test]
fn test_labeled_break() {
    let mut r = Repl::new();
    let src = "func f() {
    outer:
        for {
            for {
                break outer
            }
        }
    }";
    assert_eq!(
        r.lua(src),
        "f = function()
    ::outer::
    while true do
        while true do
            goto __break_1;
        end
    end
    ::__break_1::
end;
"
    );
}

#[test]
fn test_expression_switch() {
    let mut r = Repl::new();
    let src = "func sign(x int) int {
        switch {
        case x > 0:
            return 1
        case x < 0:
            return -1
        }
        return 0
    }";
    assert_eq!(
        r.lua(src),
        "sign = function(x)
    repeat
        if (x > 0LL) then
            return 1LL;
        elseif (x < 0LL) then
            return -1LL;
        end
    until true
    return 0LL;
end;
"
    );
}

#[test]
fn test_early_return_is_wrapped() {
    let mut r = Repl::new();
    let out = r.lua("func f(x int) int { if x > 0 { return x; x++ }; return 0 }");
    assert!(out.contains("        do return x; end\n"), "{out}");
    assert!(out.ends_with("    return 0LL;\nend;\n"), "{out}");
}

#[test]
fn test_local_declarations_in_function() {
    let mut r = Repl::new();
    let out = r.lua("func f() int { var a, b int; const c = 2; a = c; return a + b }");
    assert_eq!(
        out,
        "f = function()
    local a, b = 0LL, 0LL;
    local c = 2LL;
    a = 2LL;
    return a + b;
end;
"
    );
}

#[test]
fn test_global_declarations() {
    let mut r = Repl::new();
    assert_eq!(r.lua("const LX = 3"), "LX = 3LL;\n");
    assert_eq!(r.lua("var f float64"), "f = 0;\n");
    assert_eq!(r.lua("var u uint8 = 7"), "u = 7ULL;\n");
    assert_eq!(r.lua(r#"var s, t = "a", "b""#), "s, t = \"a\", \"b\";\n");
}

#[test]
fn test_defer_wraps_body() {
    let mut r = Repl::new();
    let out = r.lua(r#"func f() { defer println("done"); println("work") }"#);
    assert_eq!(
        out,
        "f = function()
    return __gi_runDeferred(function()
        __defer(function() print(\"done\"); end);
        print(\"work\");
    end);
end;
"
    );
}

#[test]
fn test_imports() {
    let mut r = Repl::new();
    assert_eq!(r.lua(r#"import "fmt""#), "fmt = __gi_import(\"fmt\");\n");
    assert_eq!(r.lua(r#"fmt.Println("hi")"#), "fmt.Println(\"hi\");\n");
}

#[test]
fn test_lua_keywords_are_renamed() {
    let mut r = Repl::new();
    assert_eq!(r.lua("end := 1"), "end_ = 1LL;\n");
}

#[test]
fn test_unsupported_error_code() {
    let err = EmitError::Unsupported {
        what: "fallthrough".to_string(),
        span: Span::new(0, 1),
    };
    assert_eq!(err.code(), ErrorCode::E9002);
    assert_eq!(err.to_string(), "cannot translate fallthrough to Lua");
}
