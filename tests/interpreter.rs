use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use pretty_assertions::assert_eq;
use treelox as lox;

use lox::error::{Diagnostics, Reporter};
use lox::interpreter::Interpreter;
use lox::value::{NativeFunction, Value};

/// `Write` sink whose bytes stay readable after the interpreter owns it.
#[derive(Clone, Default)]
struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuf {
    fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }
}

struct Outcome {
    output: String,
    diagnostics: Diagnostics,
}

fn run(source: &str) -> Outcome {
    let buf = SharedBuf::default();
    let mut interpreter = Interpreter::with_output(buf.clone());
    let mut diagnostics = Diagnostics::new();

    lox::run(source, &mut interpreter, &mut diagnostics);

    Outcome {
        output: buf.contents(),
        diagnostics,
    }
}

fn output_of(source: &str) -> String {
    let outcome = run(source);
    assert!(
        outcome.diagnostics.errors().is_empty(),
        "unexpected errors: {:?}",
        outcome.diagnostics.messages()
    );
    outcome.output
}

fn runtime_error_of(source: &str) -> String {
    let outcome = run(source);
    assert!(outcome.diagnostics.had_runtime_error(), "expected a runtime error");
    assert!(!outcome.diagnostics.had_error());
    outcome.diagnostics.errors()[0].message()
}

#[test]
fn arithmetic_precedence_and_grouping() {
    assert_eq!(output_of("print 1 + 2 * 3;\nprint (1 + 2) * 3;"), "7\n9\n");
    assert_eq!(output_of("print -4 / 8;\nprint 10 - 2 - 3;"), "-0.5\n5\n");
}

#[test]
fn string_concatenation_coerces_the_other_side() {
    assert_eq!(
        output_of("print \"a\" + 1;\nprint 2.5 + \"b\";\nprint \"x\" + true;"),
        "a1\n2.5b\nxtrue\n"
    );
}

#[test]
fn nil_in_sum_is_its_own_error() {
    assert_eq!(runtime_error_of("print 1 + nil;"), "Can't sum nil values.");
    assert_eq!(runtime_error_of("print nil + \"a\";"), "Can't sum nil values.");
}

#[test]
fn division_by_zero_differs_from_type_error() {
    assert_eq!(runtime_error_of("print 1 / 0;"), "Division by zero.");
    assert_eq!(runtime_error_of("print 1 / \"a\";"), "Operands must be numbers.");
    assert_eq!(
        runtime_error_of("print true + false;"),
        "Operands must be two numbers or at least one string."
    );
}

#[test]
fn comparison_requires_numbers() {
    assert_eq!(output_of("print 1 < 2; print 2 <= 1; print 3 >= 3;"), "true\nfalse\ntrue\n");
    assert_eq!(runtime_error_of("print \"a\" < \"b\";"), "Operands must be numbers.");
    assert_eq!(runtime_error_of("print -\"a\";"), "Operand must be a number.");
}

#[test]
fn truthiness_and_equality() {
    let source = r#"
        print !nil;
        print !0;
        print !"";
        print 1 == "1";
        print nil == nil;
        print "ab" == "a" + "b";
        print 1 != 2;
    "#;
    assert_eq!(output_of(source), "true\nfalse\nfalse\nfalse\ntrue\ntrue\ntrue\n");
}

#[test]
fn logical_operators_short_circuit_and_return_operands() {
    let source = r#"
        print nil or "fallback";
        print "first" or undefined_name;
        print false and undefined_name;
        print 1 and 2;
    "#;
    assert_eq!(output_of(source), "fallback\nfirst\nfalse\n2\n");
}

#[test]
fn runtime_error_stops_remaining_statements() {
    let outcome = run("print 1;\nprint missing;\nprint 3;");

    assert_eq!(outcome.output, "1\n");
    assert_eq!(
        outcome.diagnostics.messages(),
        vec!["Undefined variable 'missing'.\n[line 2]".to_string()]
    );
}

#[test]
fn static_errors_block_execution() {
    let outcome = run("print 1;\nprint (;");

    assert_eq!(outcome.output, "");
    assert!(outcome.diagnostics.had_error());
    assert!(!outcome.diagnostics.had_runtime_error());
}

#[test]
fn inner_initializer_reads_outer_variable() {
    assert_eq!(output_of("var a = 1; { var a = a + 1; print a; } print a;"), "2\n1\n");
}

#[test]
fn assignment_requires_existing_binding() {
    assert_eq!(runtime_error_of("undeclared = 1;"), "Undefined variable 'undeclared'.");
    assert_eq!(output_of("var a; print a; a = \"set\"; print a;"), "nil\nset\n");
}

#[test]
fn while_and_for_loops() {
    let source = r#"
        var i = 0;
        while (i < 3) { print i; i = i + 1; }
        for (var j = 0; j < 2; j = j + 1) print j * 10;
    "#;
    assert_eq!(output_of(source), "0\n1\n2\n0\n10\n");
}

#[test]
fn counter_closures_capture_by_reference() {
    let source = r#"
        fun makeCounter() {
            var count = 0;
            fun increment() {
                count = count + 1;
                return count;
            }
            return increment;
        }

        var a = makeCounter();
        var b = makeCounter();
        print a();
        print a();
        print b();
        print a();
    "#;
    assert_eq!(output_of(source), "1\n2\n1\n3\n");
}

#[test]
fn closures_over_the_same_frame_share_state() {
    let source = r#"
        var get;
        var set;
        fun pair() {
            var shared = "start";
            fun g() { return shared; }
            fun s(v) { shared = v; }
            get = g;
            set = s;
        }
        pair();
        set("changed");
        print get();
    "#;
    assert_eq!(output_of(source), "changed\n");
}

#[test]
fn resolution_pins_closure_to_lexical_binding() {
    let source = r#"
        var a = "global";
        {
            fun showA() { print a; }
            showA();
            var a = "block";
            showA();
        }
    "#;
    assert_eq!(output_of(source), "global\nglobal\n");
}

#[test]
fn recursive_functions() {
    let source = r#"
        fun fib(n) {
            if (n < 2) return n;
            return fib(n - 1) + fib(n - 2);
        }
        print fib(15);
    "#;
    assert_eq!(output_of(source), "610\n");
}

#[test]
fn return_inside_nested_loops_reaches_the_call() {
    let source = r#"
        fun find(limit) {
            for (var i = 0; ; i = i + 1) {
                {
                    if (i * i > limit) return i;
                }
            }
        }
        print find(50);
        fun noValue() { return; }
        print noValue();
        fun fallOff() {}
        print fallOff();
    "#;
    assert_eq!(output_of(source), "8\nnil\nnil\n");
}

#[test]
fn call_errors_name_the_problem() {
    assert_eq!(
        runtime_error_of("fun f(a, b) {} f(1);"),
        "Expected 2 arguments but got 1."
    );
    assert_eq!(
        runtime_error_of("\"not a function\"();"),
        "Can only call functions and classes."
    );
    assert_eq!(runtime_error_of("clock(1);"), "Expected 0 arguments but got 1.");
}

#[test]
fn stringification_of_callables_and_objects() {
    let source = r#"
        fun hello() {}
        class Greeter { greet() {} }
        print hello;
        print clock;
        print Greeter;
        print Greeter();
        print Greeter().greet;
        print 42.0;
    "#;
    assert_eq!(
        output_of(source),
        "<fn hello>\n<native fn>\nGreeter\nGreeter instance\n<fn greet>\n42\n"
    );
}

#[test]
fn clock_returns_seconds() {
    assert_eq!(output_of("print clock() > 1000000000;"), "true\n");
}

#[test]
fn extra_natives_plug_in_like_clock() {
    let buf = SharedBuf::default();
    let mut interpreter = Interpreter::with_output(buf.clone());
    interpreter.define_native(NativeFunction {
        name: "double",
        arity: 1,
        func: |args: &[Value]| match args {
            [Value::Number(n)] => Ok(Value::Number(n * 2.0)),
            _ => Err("double expects a number.".to_string()),
        },
    });

    let mut diagnostics = Diagnostics::new();
    lox::run("print double(21);\ndouble(\"x\");", &mut interpreter, &mut diagnostics);

    assert_eq!(buf.contents(), "42\n");
    assert_eq!(
        diagnostics.messages(),
        vec!["double expects a number.\n[line 2]".to_string()]
    );
}

#[test]
fn classes_fields_and_methods() {
    let source = r#"
        class Counter {
            init(start) { this.count = start; }
            bump() { this.count = this.count + 1; return this; }
        }
        var c = Counter(5);
        print c.bump().bump().count;
        var m = c.bump;
        m();
        print c.count;
    "#;
    assert_eq!(output_of(source), "7\n8\n");
}

#[test]
fn fields_shadow_methods_and_set_never_touches_methods() {
    let source = r#"
        class Box { value() { return "method"; } }
        var a = Box();
        var b = Box();
        a.value = "field";
        print a.value;
        print b.value();
    "#;
    assert_eq!(output_of(source), "field\nmethod\n");
}

#[test]
fn property_errors() {
    assert_eq!(
        runtime_error_of("class A {} print A().missing;"),
        "Undefined property 'missing'."
    );
    assert_eq!(runtime_error_of("var x = 1; print x.y;"), "Only instances have properties.");
    assert_eq!(runtime_error_of("var x = 1; x.y = 2;"), "Only instances have fields.");
}

#[test]
fn initializer_always_yields_the_instance() {
    let source = r#"
        class Thing {
            init(n) {
                this.n = n;
                if (n > 1) return;
                this.small = true;
            }
        }
        var t = Thing(2);
        print t.n;
        print t.init(1) == t;
        print t.small;
    "#;
    assert_eq!(output_of(source), "2\ntrue\ntrue\n");
}

#[test]
fn class_arity_follows_init() {
    assert_eq!(
        runtime_error_of("class P { init(x, y) {} } P(1);"),
        "Expected 2 arguments but got 1."
    );
    assert_eq!(
        runtime_error_of("class Q {} Q(1);"),
        "Expected 0 arguments but got 1."
    );
}

#[test]
fn inherited_methods_and_super_dispatch() {
    let source = r#"
        class A {
            method() { return "A.method"; }
            describe() { return "A sees " + this.method(); }
        }
        class B < A {
            method() { return "B.method"; }
            test() { return super.method(); }
        }
        class C < B {}

        print C().test();
        print C().describe();
        print B().method();
    "#;
    assert_eq!(output_of(source), "A.method\nA sees B.method\nB.method\n");
}

#[test]
fn super_init_chains_constructors() {
    let source = r#"
        class Base { init(x) { this.x = x; } }
        class Derived < Base {
            init(x, y) { super.init(x); this.y = y; }
        }
        var d = Derived(1, 2);
        print d.x + d.y;
    "#;
    assert_eq!(output_of(source), "3\n");
}

#[test]
fn superclass_must_be_a_class() {
    assert_eq!(
        runtime_error_of("var NotClass = 1; class Sub < NotClass {}"),
        "Superclass must be a class."
    );
}

#[test]
fn undefined_super_method() {
    assert_eq!(
        runtime_error_of("class A {} class B < A { m() { return super.nope(); } } B().m();"),
        "Undefined property 'nope'."
    );
}

#[test]
fn repl_state_persists_across_lines() {
    let buf = SharedBuf::default();
    let mut interpreter = Interpreter::with_output(buf.clone());
    let mut diagnostics = Diagnostics::new();

    lox::run_line("var counter = 0;", &mut interpreter, &mut diagnostics);
    lox::run_line("fun bump() { counter = counter + 1; return counter; }", &mut interpreter, &mut diagnostics);
    lox::run_line("bump();", &mut interpreter, &mut diagnostics);
    lox::run_line("bump()", &mut interpreter, &mut diagnostics);
    assert_eq!(
        diagnostics.messages(),
        vec!["[line 1] Error at end: Expect ';' after expression.".to_string()]
    );

    diagnostics.reset();
    assert!(diagnostics.errors().is_empty());
    assert!(!diagnostics.had_error());

    lox::run_line("counter * 10;", &mut interpreter, &mut diagnostics);

    assert_eq!(buf.contents(), "1\n10\n");
    assert!(diagnostics.errors().is_empty());
}

#[test]
fn runtime_error_inside_block_leaves_globals_current() {
    let buf = SharedBuf::default();
    let mut interpreter = Interpreter::with_output(buf.clone());
    let mut diagnostics = Diagnostics::new();

    lox::run_line("{ var inner = 1; print missing; }", &mut interpreter, &mut diagnostics);
    assert!(diagnostics.had_runtime_error());
    diagnostics.reset();

    // A top-level `var` must land in the global frame, not the aborted block.
    lox::run_line("var after = 2;", &mut interpreter, &mut diagnostics);
    lox::run_line("fun show() { print after; }", &mut interpreter, &mut diagnostics);
    lox::run_line("show();", &mut interpreter, &mut diagnostics);
    assert!(diagnostics.errors().is_empty(), "{:?}", diagnostics.messages());

    lox::run_line("print inner;", &mut interpreter, &mut diagnostics);

    assert_eq!(buf.contents(), "2\n");
    assert_eq!(
        diagnostics.messages(),
        vec!["Undefined variable 'inner'.\n[line 1]".to_string()]
    );
}

/// Output sink that refuses every write.
struct ClosedPipe;

impl Write for ClosedPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn failed_print_counts_as_runtime_error() {
    let mut interpreter = Interpreter::with_output(ClosedPipe);
    let mut diagnostics = Diagnostics::new();

    lox::run("print 1;\nprint 2;", &mut interpreter, &mut diagnostics);

    assert!(diagnostics.had_runtime_error());
    assert!(!diagnostics.had_error());
    assert_eq!(diagnostics.messages(), vec!["closed".to_string()]);
}

#[test]
fn negative_zero_prints_as_zero() {
    assert_eq!(output_of("print -0;\nprint 0 * -1;\nprint -0.5;"), "0\n0\n-0.5\n");
}
