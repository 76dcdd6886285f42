//! End-to-end evaluator tests: parse source text, run it against an
//! in-memory host, inspect the result value and captured output.

use ryc_eval::{BufferHost, EvalConfig, Evaluator, NativeRegistry, Value};
use ryc_parser::parse;
use ryc_types::{ErrorCode, RycError, SourceFile};

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

fn program(source: &str) -> ryc_types::ast::Program {
    let sf = SourceFile::new("test.ryc", source);
    parse(&sf).unwrap_or_else(|e| panic!("unexpected parse error: {e}"))
}

fn run_with(source: &str, host: &mut BufferHost, config: EvalConfig) -> Result<Value, RycError> {
    let program = program(source);
    let mut evaluator = Evaluator::with_config(host, config, NativeRegistry::with_defaults());
    evaluator.run(&program)
}

/// Run a program that must succeed; returns its value and its output.
fn run(source: &str) -> (Value, String) {
    let mut host = BufferHost::new();
    let value = run_with(source, &mut host, EvalConfig::default())
        .unwrap_or_else(|e| panic!("unexpected runtime error: {e}"));
    (value, host.into_output())
}

fn value_of(source: &str) -> Value {
    run(source).0
}

fn output_of(source: &str) -> String {
    run(source).1
}

/// Run a program that must fail; returns the error and any output
/// produced before it.
fn run_err(source: &str) -> (RycError, String) {
    let mut host = BufferHost::new();
    match run_with(source, &mut host, EvalConfig::default()) {
        Ok(value) => panic!("expected a runtime error, got {value:?}"),
        Err(err) => (err, host.into_output()),
    }
}

fn err_code(source: &str) -> ErrorCode {
    run_err(source).0.code
}

fn ints(values: &[i32]) -> Value {
    Value::array(values.iter().copied().map(Value::Int).collect())
}

// ══════════════════════════════════════════════════════════════════════════════
// Arithmetic & operators
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_folded_and_runtime_arithmetic_agree() {
    // (expression over literals, same expression over variables)
    let cases = [
        ("1 + 2 * 3", "one + two * three"),
        ("10 % 4 - 1", "ten % four - one"),
        ("7 / 2", "seven / two"),
        ("2 * -3", "two * -three"),
        ("1 + 0.5", "one + half"),
        ("\"foo\" + \"bar\"", "foo + bar"),
        ("1 < 2 == true", "one < two == yes"),
        ("3 >= 3.5", "three >= three + half"),
    ];
    let vars = r#"
        var one: int = 1; var two: int = 2; var three: int = 3; var four: int = 4;
        var seven: int = 7; var ten: int = 10; var half: float = 0.5;
        var foo: string = "foo"; var bar: string = "bar"; var yes: bool = true;
    "#;
    for (literal, dynamic) in cases {
        let folded = value_of(&format!("{literal};"));
        let runtime = value_of(&format!("{vars} {dynamic};"));
        assert_eq!(folded, runtime, "{literal}");
    }
}

#[test]
fn test_division_always_yields_float() {
    assert_eq!(value_of("var a: int = 7; a / 2;"), Value::Float(3.5));
    assert_eq!(value_of("var a: int = 4; a / 2;"), Value::Float(2.0));
    assert_eq!(value_of("var a: int = 7; a % 4;"), Value::Int(3));
}

#[test]
fn test_division_by_zero_is_an_error() {
    assert_eq!(err_code("var z: int = 0; 1 / z;"), ErrorCode::DIVISION_BY_ZERO);
    assert_eq!(err_code("var z: int = 0; 5 % z;"), ErrorCode::DIVISION_BY_ZERO);
    assert_eq!(err_code("1 / 0;"), ErrorCode::DIVISION_BY_ZERO);
}

#[test]
fn test_output_before_error_is_kept() {
    let (err, output) = run_err("puts(\"before\");\n1 / 0;\nputs(\"after\");");
    assert_eq!(err.code, ErrorCode::DIVISION_BY_ZERO);
    assert_eq!(err.line(), 2);
    assert_eq!(output, "before\n");
}

#[test]
fn test_integer_overflow_is_an_error() {
    assert_eq!(
        err_code("var m: int = 2147483647; m + 1;"),
        ErrorCode::ARITHMETIC_OVERFLOW
    );
    assert_eq!(
        err_code("var m: int = 2147483647; m++;"),
        ErrorCode::ARITHMETIC_OVERFLOW
    );
}

#[test]
fn test_mixed_kinds() {
    assert_eq!(value_of("var c: char = 'a'; c + 1;"), Value::Int(98));
    assert_eq!(value_of("var b: bool = true; b == 1;"), Value::Bool(true));
    assert_eq!(value_of("var s: string = \"b\"; s > \"a\";"), Value::Bool(true));
    let (err, _) = run_err("var s: string = \"abc\"; s + 1;");
    assert_eq!(err.code, ErrorCode::TYPE_MISMATCH);
    assert_eq!(err.message, "cannot apply '+' to string and int");
}

#[test]
fn test_null_operands() {
    assert_eq!(value_of("var n: auto = null; n + 1;"), Value::Null);
    assert_eq!(value_of("var n: auto = null; n == null;"), Value::Bool(true));
    assert_eq!(value_of("var n: auto = null; n != 0;"), Value::Bool(true));
}

#[test]
fn test_logical_operators_short_circuit() {
    let source = r#"
        var calls: int = 0;
        func touch() -> bool { calls++; return true; }
        var a: bool = false && touch();
        var b: bool = true || touch();
        var c: bool = true && touch();
        calls;
    "#;
    assert_eq!(value_of(source), Value::Int(1));
}

#[test]
fn test_pointer_operators_are_unsupported() {
    assert_eq!(err_code("var x: int = 1; *x;"), ErrorCode::UNSUPPORTED_OPERATOR);
    assert_eq!(err_code("var x: int = 1; &x;"), ErrorCode::UNSUPPORTED_OPERATOR);
}

#[test]
fn test_update_operators() {
    assert_eq!(value_of("var i: int = 5; i++;"), Value::Int(5));
    assert_eq!(value_of("var i: int = 5; ++i;"), Value::Int(6));
    assert_eq!(value_of("var i: int = 5; i--; i;"), Value::Int(4));
    assert_eq!(value_of("var c: char = 'a'; ++c;"), Value::Char(b'b'));
    assert_eq!(value_of("var a: int[] = {1, 2}; a[1]++; a;"), ints(&[1, 3]));
    assert_eq!(err_code("5++;"), ErrorCode::INVALID_ASSIGNMENT_TARGET);
}

// ══════════════════════════════════════════════════════════════════════════════
// Declarations & scopes
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_declaration_defaults() {
    assert_eq!(value_of("var x: int; x;"), Value::Int(0));
    assert_eq!(value_of("var x: float; x;"), Value::Float(0.0));
    assert_eq!(value_of("var x: bool; x;"), Value::Bool(false));
    assert_eq!(value_of("var x: string; x;"), Value::String(String::new()));
}

#[test]
fn test_declaration_coerces_initializer() {
    assert_eq!(value_of("var x: int = 3.9; x;"), Value::Int(3));
    assert_eq!(value_of("var x: float = 2; x;"), Value::Float(2.0));
    assert_eq!(value_of("var x: string = 3.0; x;"), Value::String("3".into()));
    assert_eq!(value_of("var x: int = \"42\"; x;"), Value::Int(42));
    assert_eq!(value_of("var x: int = \"abc\"; x;"), Value::Null);
    assert_eq!(value_of("var x: int = 1; x = 2.7; x;"), Value::Int(2));
}

#[test]
fn test_auto_infers_from_initializer() {
    assert_eq!(value_of("var x: auto = 1; x = 2.5; x;"), Value::Int(2));
    assert_eq!(value_of("var x: auto = 1.5; x = 2; x;"), Value::Float(2.0));
    assert_eq!(
        value_of("var a: auto = {1, 2.5}; a;"),
        Value::array(vec![Value::Float(1.0), Value::Float(2.5)])
    );
}

#[test]
fn test_const_cannot_be_reassigned() {
    let (err, _) = run_err("const k: int = 1;\nk = 2;");
    assert_eq!(err.code, ErrorCode::CONST_ASSIGNMENT);
    assert_eq!(err.message, "cannot assign to const 'k'");
    assert_eq!(err.line(), 2);
    assert_eq!(err_code("const k: int = 1; k++;"), ErrorCode::CONST_ASSIGNMENT);
    assert_eq!(value_of("var x: int = 5; x = 6; x;"), Value::Int(6));
}

#[test]
fn test_redeclaration_in_same_scope_fails() {
    let (err, _) = run_err("var x: int = 1; var x: int = 2;");
    assert_eq!(err.code, ErrorCode::REDECLARATION);
    assert_eq!(err.message, "'x' is already declared in this scope");
}

#[test]
fn test_shadowing_restores_outer_binding() {
    let source = r#"
        var x: int = 1;
        var seen: int = 0;
        { var x: string = "inner"; seen = 2; }
        x;
    "#;
    assert_eq!(value_of(source), Value::Int(1));
    assert_eq!(
        value_of("var x: int = 1; { x = 5; } x;"),
        Value::Int(5)
    );
}

#[test]
fn test_undefined_symbol() {
    let (err, _) = run_err("{ var inner: int = 1; } inner;");
    assert_eq!(err.code, ErrorCode::UNDEFINED_SYMBOL);
    assert_eq!(err.message, "cannot resolve symbol 'inner'");
}

// ══════════════════════════════════════════════════════════════════════════════
// Arrays
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_sized_array_is_padded() {
    assert_eq!(value_of("var a: int[3] = {1}; a;"), ints(&[1, 0, 0]));
    assert_eq!(value_of("var a: int[2]; a;"), ints(&[0, 0]));
}

#[test]
fn test_too_many_initializers() {
    assert_eq!(
        err_code("var a: int[2] = {1, 2, 3};"),
        ErrorCode::TOO_MANY_INITIALIZERS
    );
    assert_eq!(
        err_code("var a: int[1] = {1, 2};"),
        ErrorCode::TOO_MANY_INITIALIZERS
    );
}

#[test]
fn test_array_elements_are_coerced() {
    assert_eq!(value_of("var a: int[] = {1.5, 2.5}; a;"), ints(&[1, 2]));
    assert_eq!(value_of("var a: int[] = {1, 2}; a[0] = 9.9; a[0];"), Value::Int(9));
    assert_eq!(
        value_of("var m: int[] = {{1}, {2.5}}; m[1][0];"),
        Value::Int(2)
    );
}

#[test]
fn test_indexing_errors() {
    assert_eq!(err_code("var a: int[] = {1}; a[1];"), ErrorCode::INDEX_OUT_OF_BOUNDS);
    assert_eq!(err_code("var a: int[] = {1}; a[-1];"), ErrorCode::INDEX_OUT_OF_BOUNDS);
    assert_eq!(err_code("var a: int[] = {1}; a[0.5];"), ErrorCode::TYPE_MISMATCH);
    assert_eq!(err_code("var x: int = 1; x[0];"), ErrorCode::NOT_AN_ARRAY);
}

#[test]
fn test_arrays_alias_scalars_copy() {
    let source = r#"
        var a: int[] = {1, 2, 3};
        var b: int[] = a;
        b[0] = 10;
        a[0];
    "#;
    assert_eq!(value_of(source), Value::Int(10));
    assert_eq!(value_of("var x: int = 1; var y: int = x; y = 5; x;"), Value::Int(1));

    let scalar_param = r#"
        var n: int = 1;
        func bump(var k: int) { k = k + 10; }
        bump(n);
        n;
    "#;
    assert_eq!(value_of(scalar_param), Value::Int(1));

    let through_call = r#"
        var a: int[] = {1, 2};
        func poke(var xs: int[]) { xs[1] = 7; }
        poke(a);
        a[1];
    "#;
    assert_eq!(value_of(through_call), Value::Int(7));
}

#[test]
fn test_mismatched_array_argument_is_copied() {
    let source = r#"
        var f: float[] = {1.5, 2.5};
        func g(var a: int[]) -> int { a[0] = 9; return a[1]; }
        var seen: int = g(f);
        f[1] = 2.7;
        puts("%s %d", f, seen);
        f;
    "#;
    let (value, output) = run(source);
    assert_eq!(output, "{1.5, 2.7} 2\n");
    assert_eq!(value, Value::array(vec![Value::Float(1.5), Value::Float(2.7)]));
}

#[test]
fn test_padding_does_not_resize_the_source() {
    let source = r#"
        var a: int[3] = {1};
        var b: int[5] = a;
        b[4] = 7;
        puts("%s %s", a, b);
    "#;
    assert_eq!(output_of(source), "{1, 0, 0} {1, 0, 0, 0, 7}\n");
}

#[test]
fn test_array_cannot_contain_itself() {
    let (err, _) = run_err("var a: int[] = {1};\na[0] = a;");
    assert_eq!(err.code, ErrorCode::CYCLIC_ARRAY);
    assert_eq!(err.line(), 2);

    let nested = r#"
        var a: auto = {1, 2};
        var b: auto = {0};
        var holder: auto = {b};
        b[0] = 5;
        holder[0] = a;
        a[0] = holder;
    "#;
    assert_eq!(err_code(nested), ErrorCode::CYCLIC_ARRAY);
}

#[test]
fn test_static_cast_copies_arrays() {
    let source = r#"
        var a: int[] = {1, 2};
        var b: float[] = static_cast<float[]>(a);
        b[0] = 9.5;
        a[0];
    "#;
    assert_eq!(value_of(source), Value::Int(1));
}

// ══════════════════════════════════════════════════════════════════════════════
// Casts
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_static_cast_scalars() {
    assert_eq!(value_of("static_cast<int>(3.99);"), Value::Int(3));
    assert_eq!(value_of("static_cast<int>(\"12\");"), Value::Int(12));
    assert_eq!(value_of("static_cast<float>(\"2.5\");"), Value::Float(2.5));
    assert_eq!(value_of("static_cast<bool>(0);"), Value::Bool(false));
    assert_eq!(value_of("static_cast<bool>(\"x\");"), Value::Bool(true));
    assert_eq!(value_of("static_cast<char>(65);"), Value::Char(b'A'));
    assert_eq!(value_of("static_cast<int>('A');"), Value::Int(65));
    assert_eq!(value_of("static_cast<string>(true);"), Value::String("true".into()));
    assert_eq!(value_of("static_cast<string>(null);"), Value::String("null".into()));
    assert_eq!(
        value_of("static_cast<string>({1, 2});"),
        Value::String("{1, 2}".into())
    );
}

#[test]
fn test_string_parse_failure_is_null_but_operator_mismatch_fails() {
    assert_eq!(value_of("static_cast<int>(\"abc\");"), Value::Null);
    assert_eq!(value_of("static_cast<float>(\"1.5x\");"), Value::Null);
    assert_eq!(err_code("var s: string = \"abc\"; s + 1;"), ErrorCode::TYPE_MISMATCH);
}

#[test]
fn test_invalid_casts() {
    assert_eq!(err_code("static_cast<char>(\"ab\");"), ErrorCode::INVALID_CAST);
    let (err, _) = run_err("var a: int[] = {1}; static_cast<int>(a);");
    assert_eq!(err.code, ErrorCode::INVALID_CAST);
    assert_eq!(err.message, "cannot cast array to int");
}

// ══════════════════════════════════════════════════════════════════════════════
// Control flow
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_if_else_chain() {
    let source = |x: i32| {
        format!(
            "var x: int = {x}; var r: int = 0;
             if (x < 1) {{ r = 1; }} else if (x < 2) {{ r = 2; }} else {{ r = 3; }}
             r;"
        )
    };
    assert_eq!(value_of(&source(0)), Value::Int(1));
    assert_eq!(value_of(&source(1)), Value::Int(2));
    assert_eq!(value_of(&source(5)), Value::Int(3));
}

#[test]
fn test_while_loop_with_break() {
    let source = r#"
        var i: int = 0;
        while (true) {
            if (i == 4) { break; }
            i++;
        }
        i;
    "#;
    assert_eq!(value_of(source), Value::Int(4));
}

#[test]
fn test_continue_still_runs_for_update() {
    let source = r#"
        var sum: int = 0;
        for (var i: int = 0; i < 6; i++) {
            if (i % 2 == 0) { continue; }
            sum = sum + i;
        }
        sum;
    "#;
    assert_eq!(value_of(source), Value::Int(9));
}

#[test]
fn test_for_variable_is_scoped_to_loop() {
    assert_eq!(
        err_code("for (var i: int = 0; i < 2; i++) { } i;"),
        ErrorCode::UNDEFINED_SYMBOL
    );
    assert_eq!(
        value_of("var n: int = 0; for (;;) { n++; if (n > 2) { break; } } n;"),
        Value::Int(3)
    );
}

#[test]
fn test_control_outside_loop() {
    assert_eq!(err_code("break;"), ErrorCode::CONTROL_OUTSIDE_LOOP);
    assert_eq!(err_code("if (true) { continue; }"), ErrorCode::CONTROL_OUTSIDE_LOOP);
    assert_eq!(
        err_code("func f() { break; } while (true) { f(); }"),
        ErrorCode::CONTROL_OUTSIDE_LOOP
    );
    assert_eq!(err_code("return 1;"), ErrorCode::RETURN_OUTSIDE_FUNCTION);
}

// ══════════════════════════════════════════════════════════════════════════════
// Functions
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_recursive_fibonacci() {
    let source = r#"
        func fib(var n: int) -> int {
            if (n < 2) { return n; }
            return fib(n - 1) + fib(n - 2);
        }
        fib(10);
    "#;
    assert_eq!(value_of(source), Value::Int(55));
}

#[test]
fn test_return_value_is_coerced() {
    assert_eq!(value_of("func f() -> int { return 2.9; } f();"), Value::Int(2));
    assert_eq!(value_of("func f() -> string { return 1; } f();"), Value::String("1".into()));
    assert_eq!(
        err_code("func f() -> void { return 1; } f();"),
        ErrorCode::VOID_RETURN_VALUE
    );
    assert_eq!(value_of("func f() { return; } f();"), Value::Null);
}

#[test]
fn test_implicit_return_is_coerced() {
    assert_eq!(value_of("func f() -> int { 2.5; } f();"), Value::Int(2));
    assert_eq!(value_of("func f() -> string { 7; } f();"), Value::String("7".into()));
    assert_eq!(value_of("func f() { 5; } f();"), Value::Null);
}

#[test]
fn test_return_from_inside_loop() {
    let source = r#"
        func find(var xs: int[], var want: int) -> int {
            for (var i: int = 0; i < 3; i++) {
                while (true) {
                    if (xs[i] == want) { return i; }
                    break;
                }
            }
            return -1;
        }
        find({4, 5, 6}, 6);
    "#;
    assert_eq!(value_of(source), Value::Int(2));
}

#[test]
fn test_arguments_are_coerced_and_counted() {
    assert_eq!(value_of("func f(var x: int) -> int { return x; } f(4.7);"), Value::Int(4));
    let (err, _) = run_err("func f(var x: int) -> int { return x; } f(1, 2);");
    assert_eq!(err.code, ErrorCode::ARGUMENT_COUNT);
    assert_eq!(err.message, "function 'f' expects 1 argument(s), got 2");
}

#[test]
fn test_functions_see_their_declaring_scope() {
    let source = r#"
        var base: int = 10;
        func add(var x: int) -> int { return base + x; }
        func shadow() -> int { var base: int = 0; return add(1); }
        shadow();
    "#;
    assert_eq!(value_of(source), Value::Int(11));
}

#[test]
fn test_functions_are_values() {
    let source = r#"
        func twice(var x: int) -> int { return x * 2; }
        var g: auto = twice;
        g(21);
    "#;
    assert_eq!(value_of(source), Value::Int(42));
    assert_eq!(err_code("var x: int = 1; x();"), ErrorCode::NOT_CALLABLE);
}

#[test]
fn test_dangling_closure_is_detected() {
    let source = r#"
        var h: auto = null;
        { func inner() -> int { return 1; } h = inner; }
        { var filler: int = 0; }
        h();
    "#;
    assert_eq!(err_code(source), ErrorCode::DANGLING_SCOPE);
}

#[test]
fn test_call_depth_limit() {
    let source = "func down(var n: int) -> int { return down(n + 1); } down(0);";
    let mut host = BufferHost::new();
    let err = run_with(source, &mut host, EvalConfig { max_call_depth: 64 }).unwrap_err();
    assert_eq!(err.code, ErrorCode::CALL_DEPTH_EXCEEDED);
    assert!(err.message.contains("maximum call depth of 64"), "{}", err.message);
}

#[test]
fn test_deep_recursion_within_limit() {
    let source = r#"
        func count(var n: int) -> int {
            if (n == 0) { return 0; }
            return 1 + count(n - 1);
        }
        count(1500);
    "#;
    assert_eq!(value_of(source), Value::Int(1500));
}

// ══════════════════════════════════════════════════════════════════════════════
// Natives
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_puts_formats_output() {
    let output = output_of(r#"puts("%d + %d = %d", 1, 2, 1 + 2); puts("%s!", "hi");"#);
    assert_eq!(output, "1 + 2 = 3\nhi!\n");
    assert_eq!(output_of(r#"puts("%f", 1);"#), "1.000000\n");
}

#[test]
fn test_puts_with_missing_argument_prints_nothing() {
    let (err, output) = run_err(r#"puts("%d %s", 1);"#);
    assert_eq!(err.code, ErrorCode::FORMAT_ERROR);
    assert_eq!(output, "");
}

#[test]
fn test_gets_reads_host_input() {
    let source = r#"
        var name: string = gets("name? ");
        puts("hello %s", name);
    "#;
    let mut host = BufferHost::with_input(["ada\n"]);
    run_with(source, &mut host, EvalConfig::default()).unwrap();
    assert_eq!(host.output(), "name? hello ada\n");
}

#[test]
fn test_user_code_can_shadow_natives() {
    let source = r#"
        func puts(var s: string) -> string { return s + "?"; }
        puts("x");
    "#;
    let (value, output) = run(source);
    assert_eq!(value, Value::String("x?".into()));
    assert_eq!(output, "");
}

#[test]
fn test_custom_native() {
    let mut natives = NativeRegistry::with_defaults();
    natives.register("len", |args, _| match args {
        [Value::Array(a)] => Ok(Value::Int(a.len() as i32)),
        _ => Ok(Value::Null),
    });
    let program = program("var a: int[4]; len(a);");
    let mut host = BufferHost::new();
    let mut evaluator = Evaluator::with_config(&mut host, EvalConfig::default(), natives);
    assert_eq!(evaluator.run(&program).unwrap(), Value::Int(4));
}

#[test]
fn test_globals_survive_the_run() {
    let program = program("var total: int = 0; for (var i: int = 1; i <= 4; i++) { total = total + i; }");
    let mut host = BufferHost::new();
    let mut evaluator = Evaluator::new(&mut host);
    evaluator.run(&program).unwrap();
    assert_eq!(evaluator.global("total").unwrap(), Value::Int(10));
    assert_eq!(
        evaluator.global("i").unwrap_err().code,
        ErrorCode::UNDEFINED_SYMBOL
    );
}
