use pretty_assertions::assert_eq;
use prose_ir::{Position, Program};
use prose_types::SymbolTable;

use crate::{
    buffer_handler, scripted_handler, EvalError, EvalErrorKind, InterpreterBuilder, MemoryLoader,
    Value,
};

fn parse(source: &str) -> Program {
    let tokens = match prose_lexer::lex(source) {
        Ok(tokens) => tokens,
        Err(err) => panic!("lexing failed: {err}"),
    };
    match prose_parse::parse(&tokens, &mut SymbolTable::new()) {
        Ok(program) => program,
        Err(err) => panic!("parsing failed: {err} at {}", err.pos),
    }
}

fn execute(builder: InterpreterBuilder, source: &str) -> (String, Result<(), EvalError>) {
    let print = buffer_handler();
    let mut interpreter = builder.print_handler(print.clone()).build();
    let result = interpreter.run(&parse(source));
    (print.output(), result)
}

fn no_input() -> InterpreterBuilder {
    InterpreterBuilder::new().input_handler(scripted_handler(Vec::<String>::new()))
}

fn run(source: &str) -> String {
    match execute(no_input(), source) {
        (output, Ok(())) => output,
        (_, Err(err)) => panic!("run failed: {err} at {}", err.pos),
    }
}

fn run_err(source: &str) -> EvalError {
    match execute(no_input(), source) {
        (_, Err(err)) => err,
        (output, Ok(())) => panic!("expected a runtime error, got output {output:?}"),
    }
}

fn run_with_input(source: &str, lines: &[&str]) -> Result<String, EvalError> {
    let builder = InterpreterBuilder::new().input_handler(scripted_handler(lines.to_vec()));
    let (output, result) = execute(builder, source);
    result.map(|()| output)
}

// Values and operators

#[test]
fn writes_literals() {
    assert_eq!(
        run(r#"writeln 1; writeln 2.5; writeln "hi"; writeln true; writeln [1, 2];"#),
        "1\n2.5\nhi\ntrue\n[1, 2]\n"
    );
}

#[test]
fn rational_without_integer_part() {
    assert_eq!(run("writeln .5; writeln 1 + .25;"), "0.5\n1.25\n");
}

#[test]
fn write_without_newline() {
    assert_eq!(run(r#"write "a"; write "b"; writeln "";"#), "ab\n");
}

#[test]
fn division_always_produces_a_rational() {
    assert_eq!(run("writeln 4 / 2; writeln 7 / 2;"), "2.0\n3.5\n");
}

#[test]
fn precedence_follows_the_operator_table() {
    assert_eq!(run("writeln 1 + 2 * 3; writeln (1 + 2) * 3; writeln 10 - 4 - 3;"), "7\n9\n3\n");
}

#[test]
fn string_concatenation() {
    assert_eq!(run(r#"writeln "n = " + 3; writeln 1.0 + "!";"#), "n = 3\n1.0!\n");
}

#[test]
fn division_by_zero_reports_operator_position() {
    let err = run_err("writeln 1 / 0;");
    assert_eq!(err.kind, EvalErrorKind::DivisionByZero);
    assert_eq!(err.pos, Position::new(1, 11));
}

#[test]
fn logical_operators_short_circuit() {
    let output = run(
        "function boom() -> boolean
             writeln \"evaluated\";
             return true;
         end
         writeln false && boom();
         writeln true || boom();
         writeln true && boom();",
    );
    assert_eq!(output, "false\ntrue\nevaluated\ntrue\n");
}

#[test]
fn non_boolean_condition_is_rejected() {
    let err = run_err("if 1 then writeln 1; end");
    assert!(matches!(err.kind, EvalErrorKind::TypeMismatch { .. }));
}

// Variables

#[test]
fn declared_variables_start_at_zero_values() {
    assert_eq!(
        run(
            "create integer variable i; create rational variable r; create boolean variable b;
             create list<integer> variable xs;
             writeln i; writeln r; writeln b; writeln xs;"
        ),
        "0\n0.0\nfalse\n[]\n"
    );
}

#[test]
fn integer_widens_into_rational_variables() {
    assert_eq!(
        run("create rational variable r to 2; writeln r; set r to 3; writeln r;"),
        "2.0\n3.0\n"
    );
}

#[test]
fn incompatible_initializer_is_a_type_mismatch() {
    let err = run_err(r#"create integer variable x to "five";"#);
    assert_eq!(
        err.kind,
        EvalErrorKind::TypeMismatch {
            expected: "integer".into(),
            found: "string".into(),
        }
    );
}

#[test]
fn constants_cannot_be_reassigned() {
    let err = run_err("create integer constant x to 1;\nset x to 2;");
    assert_eq!(err.kind, EvalErrorKind::AssignToConstant { name: "x".into() });
    assert_eq!(err.pos, Position::new(2, 5));
}

#[test]
fn undefined_names_are_runtime_errors() {
    let err = run_err("writeln y;");
    assert_eq!(err.kind, EvalErrorKind::Undefined { name: "y".into() });
}

#[test]
fn assignment_updates_the_owning_scope() {
    let output = run(
        "create integer variable total to 0;
         create integer variable i to 0;
         while i < 3 do
             set total to total + i;
             set i to i + 1;
         end
         writeln total;",
    );
    assert_eq!(output, "3\n");
}

#[test]
fn block_scopes_shadow_and_expire() {
    let output = run(
        "create integer variable x to 1;
         if true then
             create string variable x to \"inner\";
             writeln x;
         end
         writeln x;",
    );
    assert_eq!(output, "inner\n1\n");
}

// Control flow

#[test]
fn if_elif_else_picks_first_true_branch() {
    let source = |n: i64| {
        format!(
            "create integer variable n to {n};
             if n < 0 then writeln \"negative\";
             elif n == 0 then writeln \"zero\";
             else writeln \"positive\";
             end"
        )
    };
    assert_eq!(run(&source(-2)), "negative\n");
    assert_eq!(run(&source(0)), "zero\n");
    assert_eq!(run(&source(5)), "positive\n");
}

#[test]
fn do_while_runs_body_at_least_once() {
    assert_eq!(
        run("create integer variable i to 10; do writeln i; set i to i + 1; while i < 3 end"),
        "10\n"
    );
}

#[test]
fn for_iterates_lists_and_strings() {
    assert_eq!(
        run(r#"for x in [1, 2, 3] do write x; end for c in "ab" do write c; end writeln "";"#),
        "123ab\n"
    );
}

#[test]
fn loop_variable_scopes_are_released() {
    let print = buffer_handler();
    let mut interpreter = no_input().print_handler(print.clone()).build();
    let before = interpreter.live_scopes();
    let program = parse("for x in [1, 2, 3] do create integer variable y to x; end");
    if let Err(err) = interpreter.run(&program) {
        panic!("run failed: {err}");
    }
    assert_eq!(interpreter.live_scopes(), before);
}

// Functions

#[test]
fn top_level_functions_may_be_used_before_declaration() {
    assert_eq!(
        run("writeln double(21);
             function double(integer n) -> integer return n * 2; end"),
        "42\n"
    );
}

#[test]
fn recursion() {
    assert_eq!(
        run("function fact(integer n) -> integer
                 if n <= 1 then return 1; end
                 return n * fact(n - 1);
             end
             writeln fact(10);"),
        "3628800\n"
    );
}

#[test]
fn return_value_widens_to_declared_type() {
    assert_eq!(
        run("function half() -> rational return 1; end writeln half();"),
        "1.0\n"
    );
}

#[test]
fn falling_off_the_end_returns_void() {
    assert_eq!(run("function f() end writeln f();"), "void\n");
}

#[test]
fn closures_see_their_declaring_scope() {
    let output = run(
        "function counter() -> function() -> integer
             create integer variable count to 0;
             function next() -> integer
                 set count to count + 1;
                 return count;
             end
             return next;
         end
         create function() -> integer constant tick to counter();
         writeln tick();
         writeln tick();",
    );
    assert_eq!(output, "1\n2\n");
}

#[test]
fn discarded_closures_free_their_scopes() {
    let print = buffer_handler();
    let mut interpreter = no_input().print_handler(print.clone()).build();
    let program = parse(
        "function counter() -> function() -> integer
             create integer variable count to 0;
             function next() -> integer
                 set count to count + 1;
                 return count;
             end
             return next;
         end
         function helper() -> integer
             function inner() -> integer return 1; end
             return inner();
         end
         create function() -> integer constant kept to counter();
         create integer variable i to 0;
         while i < 5000 do
             counter();
             helper();
             set i to i + 1;
         end
         writeln kept();
         writeln kept();",
    );
    if let Err(err) = interpreter.run(&program) {
        panic!("run failed: {err}");
    }
    assert_eq!(print.output(), "1\n2\n");
    let live = interpreter.live_scopes();
    assert!(live < 200, "{live} scopes still allocated");
}

#[test]
fn functions_are_first_class() {
    assert_eq!(
        run("function apply(function(integer) -> integer f, integer x) -> integer
                 return f(x);
             end
             function inc(integer n) -> integer return n + 1; end
             writeln apply(inc, 4);
             writeln inc;"),
        "5\n<function inc>\n"
    );
}

#[test]
fn wrong_argument_count() {
    let err = run_err("function f(integer a) end f(1, 2);");
    assert_eq!(
        err.kind,
        EvalErrorKind::WrongArgCount {
            name: "f".into(),
            expected: 1,
            found: 2,
        }
    );
}

#[test]
fn argument_types_are_checked() {
    let err = run_err(r#"function f(integer a) end f("x");"#);
    assert!(matches!(err.kind, EvalErrorKind::TypeMismatch { .. }));
}

#[test]
fn calling_a_non_function() {
    let err = run_err("create integer variable x to 1; x();");
    assert_eq!(err.kind, EvalErrorKind::NotCallable { found: "integer".into() });
}

#[test]
fn call_depth_is_limited() {
    let source = "function down(integer n) -> integer return down(n + 1); end down(0);";
    let (_, result) = execute(no_input().max_call_depth(50), source);
    let Err(err) = result else {
        panic!("expected call depth error");
    };
    assert_eq!(err.kind, EvalErrorKind::CallDepthExceeded { limit: 50 });
}

// Structs and lists

#[test]
fn structs_construct_read_and_write_fields() {
    let output = run(
        "create type Point(integer x, rational y);
         create Point variable p to Point(1, 2);
         writeln p.x;
         writeln p.y;
         set p.x to 10;
         writeln p.x;
         writeln p;",
    );
    assert_eq!(output, "1\n2.0\n10\n<object Point>\n");
}

#[test]
fn structs_have_reference_semantics() {
    let output = run(
        "create type Box(integer v);
         create Box variable a to Box(1);
         create Box variable b to a;
         set b.v to 2;
         writeln a.v;",
    );
    assert_eq!(output, "2\n");
}

#[test]
fn unknown_field() {
    let err = run_err("create type P(integer x); create P variable p; writeln p.y;");
    assert_eq!(
        err.kind,
        EvalErrorKind::UnknownMember {
            member: "y".into(),
            on: "struct P".into(),
        }
    );
}

#[test]
fn list_natives() {
    let output = run(
        "create list<integer> variable xs to [];
         add(xs, 1); add(xs, 2); add(xs, 3);
         writeln length(xs);
         writeln get(xs, 1);
         remove(xs, 0);
         writeln xs;
         writeln xs.length;
         set xs[0] to 9;
         writeln xs[0];",
    );
    assert_eq!(output, "3\n2\n[2, 3]\n2\n9\n");
}

#[test]
fn list_elements_widen_to_rational() {
    assert_eq!(
        run("create list<rational> variable xs to [1.5]; add(xs, 2); writeln xs;"),
        "[1.5, 2.0]\n"
    );
}

#[test]
fn mixed_numeric_literals_widen_to_rational() {
    assert_eq!(
        run("writeln [1, 2.5]; writeln [[1], [2.5]];"),
        "[1.0, 2.5]\n[[1.0], [2.5]]\n"
    );
}

#[test]
fn integer_lists_are_accepted_as_rational_lists() {
    let output = run(
        "create list<rational> variable zs to [1, 2];
         writeln zs;
         create list<integer> variable ys to [1, 2];
         create list<rational> variable xs to ys;
         add(xs, 0.5);
         writeln xs;
         writeln ys;",
    );
    assert_eq!(output, "[1.0, 2.0]\n[1.0, 2.0, 0.5]\n[1, 2]\n");
}

#[test]
fn mixed_list_literal_needs_a_common_type() {
    let err = run_err(r#"writeln [1, "a"];"#);
    assert_eq!(
        err.kind,
        EvalErrorKind::TypeMismatch {
            expected: "integer".into(),
            found: "string".into(),
        }
    );
}

#[test]
fn index_out_of_range_reports_index_position() {
    let err = run_err("create list<integer> variable xs to [1];\nwriteln xs[5];");
    assert_eq!(err.kind, EvalErrorKind::IndexOutOfRange { index: 5, len: 1 });
    assert_eq!(err.pos, Position::new(2, 12));
}

#[test]
fn string_natives() {
    let output = run(
        r#"create string variable s to "Hello";
           writeln uppercase(s);
           writeln lowercase(s);
           writeln substring(s, 1, 4);
           writeln length(s);
           writeln s[0];"#,
    );
    assert_eq!(output, "HELLO\nhello\nell\n5\nH\n");
}

#[test]
fn substring_range_is_checked() {
    let err = run_err(r#"writeln substring("abc", 2, 9);"#);
    assert_eq!(err.kind, EvalErrorKind::IndexOutOfRange { index: 9, len: 3 });
}

#[test]
fn natives_dispatch_on_receiver_kind() {
    let err = run_err(r#"add("text", 1);"#);
    assert_eq!(
        err.kind,
        EvalErrorKind::TypeMismatch {
            expected: "list".into(),
            found: "string".into(),
        }
    );
}

// Input

#[test]
fn read_parses_by_declared_type() {
    let output = run_with_input(
        "create integer variable n; create rational variable r;
         create boolean variable b; create string variable s;
         read n; read r; read b; read s;
         writeln n + 1; writeln r; writeln b; writeln s;",
        &["41", "0.5", "TRUE", "  spaced  "],
    );
    assert_eq!(output, Ok("42\n0.5\ntrue\n  spaced  \n".to_string()));
}

#[test]
fn read_writes_the_prompt() {
    let output = run_with_input(
        r#"create string variable name; read name "name? "; writeln "hi " + name;"#,
        &["Ada"],
    );
    assert_eq!(output, Ok("name? hi Ada\n".to_string()));
}

#[test]
fn invalid_input_is_an_error() {
    let Err(err) = run_with_input("create integer variable n; read n;", &["ten"]) else {
        panic!("expected invalid input");
    };
    assert_eq!(
        err.kind,
        EvalErrorKind::InvalidInput {
            input: "ten".into(),
            expected: "integer".into(),
        }
    );
}

#[test]
fn reading_into_a_constant_is_rejected() {
    let Err(err) = run_with_input("create integer constant n to 1; read n;", &["2"]) else {
        panic!("expected constant error");
    };
    assert_eq!(err.kind, EvalErrorKind::AssignToConstant { name: "n".into() });
}

#[test]
fn readme_returns_the_line() {
    let output = run_with_input(r#"writeln readme("> ");"#, &["typed"]);
    assert_eq!(output, Ok("> typed\n".to_string()));
}

#[test]
fn exhausted_input_is_an_io_error() {
    let Err(err) = run_with_input("create string variable s; read s;", &[]) else {
        panic!("expected an input error");
    };
    assert!(matches!(err.kind, EvalErrorKind::Io { .. }));
}

// Modules

fn with_modules(modules: &[(&str, &str)]) -> InterpreterBuilder {
    let loader = modules
        .iter()
        .fold(MemoryLoader::new(), |loader, (name, source)| {
            loader.with_module(".", name, *source)
        });
    no_input().module_loader(loader)
}

#[test]
fn whole_module_import() {
    let builder = with_modules(&[(
        "math",
        "create integer constant answer to 42;
         function square(integer n) -> integer return n * n; end",
    )]);
    let (output, result) = execute(
        builder,
        "import math; writeln math.answer; writeln math.square(5); writeln math;",
    );
    assert_eq!(result, Ok(()));
    assert_eq!(output, "42\n25\n<module math>\n");
}

#[test]
fn selective_import_copies_bindings_and_structs() {
    let builder = with_modules(&[(
        "shapes",
        "create type Square(integer side);
         function area(Square s) -> integer return s.side * s.side; end",
    )]);
    let (output, result) = execute(
        builder,
        "from shapes import Square, area; writeln area(Square(3));",
    );
    assert_eq!(result, Ok(()));
    assert_eq!(output, "9\n");
}

#[test]
fn module_functions_use_module_globals() {
    let builder = with_modules(&[(
        "counter",
        "create integer variable hits to 0;
         function hit() -> integer set hits to hits + 1; return hits; end",
    )]);
    let (output, result) = execute(
        builder,
        "import counter; from counter import hit; hit(); writeln counter.hit(); writeln counter.hits;",
    );
    assert_eq!(result, Ok(()));
    assert_eq!(output, "2\n2\n");
}

#[test]
fn module_members_are_read_only() {
    let builder = with_modules(&[("counter", "create integer variable hits to 0;")]);
    let (output, result) = execute(
        builder,
        "import counter;\nset counter.hits to 3;\nwriteln counter.hits;",
    );
    assert_eq!(output, "");
    let Err(err) = result else {
        panic!("assignment to a module member succeeded");
    };
    assert_eq!(
        err.kind,
        EvalErrorKind::ReadOnlyMember {
            member: "hits".into(),
            module: "counter".into(),
        }
    );
    assert_eq!(err.pos, Position::new(2, 13));
    assert_eq!(err.kind.code().as_str(), "E3010");
}

#[test]
fn module_top_level_runs_once() {
    let builder = with_modules(&[(
        "noisy",
        "create integer constant v to 1; writeln \"loaded\";",
    )]);
    let (output, result) = execute(builder, "import noisy; from noisy import v; writeln v;");
    assert_eq!(result, Ok(()));
    assert_eq!(output, "loaded\n1\n");
}

#[test]
fn missing_module() {
    let err = run_err("import nowhere;");
    assert!(matches!(err.kind, EvalErrorKind::ModuleNotFound { .. }));
    assert_eq!(err.pos, Position::new(1, 8));
}

#[test]
fn missing_import_name() {
    let builder = with_modules(&[("m", "create integer variable a;")]);
    let (_, result) = execute(builder, "from m import b;");
    let Err(err) = result else {
        panic!("expected missing import");
    };
    assert_eq!(
        err.kind,
        EvalErrorKind::MissingImport {
            name: "b".into(),
            module: "m".into(),
        }
    );
}

#[test]
fn circular_imports_are_detected() {
    let builder = with_modules(&[("a", "import b;"), ("b", "import a;")]);
    let (_, result) = execute(builder, "import a;");
    let Err(err) = result else {
        panic!("expected circular import");
    };
    assert_eq!(err.kind, EvalErrorKind::CircularImport { module: "a".into() });
    assert!(!err.notes.is_empty());
}

#[test]
fn errors_inside_modules_are_noted() {
    let builder = with_modules(&[("bad", "writeln 1 / 0;")]);
    let (_, result) = execute(builder, "import bad;");
    let Err(err) = result else {
        panic!("expected division by zero");
    };
    assert_eq!(err.kind, EvalErrorKind::DivisionByZero);
    assert!(err.notes[0].starts_with("raised in module `bad`"));
}

#[test]
fn module_syntax_errors() {
    let builder = with_modules(&[("broken", "create integer;")]);
    let (_, result) = execute(builder, "import broken;");
    let Err(err) = result else {
        panic!("expected module syntax error");
    };
    assert!(matches!(err.kind, EvalErrorKind::ModuleSyntax { .. }));
}

#[test]
fn modules_resolve_imports_from_their_own_directory() {
    let loader = MemoryLoader::new()
        .with_module("./pkg", "outer", "import helper; writeln helper.value;")
        .with_module("./pkg", "helper", "create integer constant value to 7;");
    let (output, result) = execute(
        no_input().module_loader(loader).base_dir("./pkg"),
        "import outer;",
    );
    assert_eq!(result, Ok(()));
    assert_eq!(output, "7\n");
}

// Interpreter state

#[test]
fn globals_persist_between_runs() {
    let print = buffer_handler();
    let mut interpreter = no_input().print_handler(print.clone()).build();
    for line in [
        "create integer variable x to 1;",
        "set x to x + 1;",
        "writeln x;",
    ] {
        if let Err(err) = interpreter.run(&parse(line)) {
            panic!("run failed: {err}");
        }
    }
    assert_eq!(print.output(), "2\n");
    assert!(matches!(
        interpreter.global("x").map(|v| v.value),
        Some(Value::Integer(2))
    ));
}

// Reference programs

#[test]
fn constant_written_to_output() {
    assert_eq!(run("create integer constant x to 5; write x;"), "5");
}

#[test]
fn else_branch_runs_when_condition_is_false() {
    assert_eq!(
        run(r#"if false then write "A"; else write "B"; end"#),
        "B"
    );
}

#[test]
fn uninitialized_struct_fields_are_zeroed_in_any_order() {
    let output = run(
        r#"create type Record(boolean flag, string name, integer count);
           create Record variable r;
           writeln r.count; writeln "[" + r.name + "]"; writeln r.flag;"#,
    );
    assert_eq!(output, "0\n[]\nfalse\n");
}

#[test]
fn variables_from_a_block_are_gone_after_it() {
    let err = run_err("if true then create integer variable inner to 1; end writeln inner;");
    assert_eq!(err.kind, EvalErrorKind::Undefined { name: "inner".into() });
}
