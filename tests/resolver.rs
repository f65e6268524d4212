use pretty_assertions::assert_eq;
use treelox as lox;

use lox::error::{Diagnostics, Reporter};
use lox::interpreter::Interpreter;

fn static_errors(source: &str) -> Vec<String> {
    let mut interpreter = Interpreter::with_output(std::io::sink());
    let mut diagnostics = Diagnostics::new();

    lox::run(source, &mut interpreter, &mut diagnostics);

    assert!(!diagnostics.had_runtime_error());
    diagnostics.messages()
}

#[test]
fn reading_local_in_its_own_initializer() {
    assert_eq!(
        static_errors("{ var a = 1; { var a = a; } }"),
        vec!["[line 1] Error at 'a': Can't read local variable in its own initializer.".to_string()]
    );
}

#[test]
fn globals_may_reference_themselves() {
    assert!(static_errors("var a = 1; var a = a;").is_empty());
}

#[test]
fn redeclaring_a_local() {
    assert_eq!(
        static_errors("{\n  var a = 1;\n  var a = 2;\n}"),
        vec!["[line 3] Error at 'a': Already a variable with this name in this scope.".to_string()]
    );
    assert_eq!(
        static_errors("fun f(x, x) {}"),
        vec!["[line 1] Error at 'x': Already a variable with this name in this scope.".to_string()]
    );
}

#[test]
fn top_level_return() {
    assert_eq!(
        static_errors("return 1;"),
        vec!["[line 1] Error at 'return': Can't return from top-level code.".to_string()]
    );
}

#[test]
fn returning_a_value_from_an_initializer() {
    assert_eq!(
        static_errors("class A { init() { return 1; } }"),
        vec!["[line 1] Error at 'return': Can't return a value from an initializer.".to_string()]
    );
    assert!(static_errors("class A { init() { return; } }").is_empty());
}

#[test]
fn this_outside_of_a_class() {
    assert_eq!(
        static_errors("print this;"),
        vec!["[line 1] Error at 'this': Can't use 'this' outside of a class.".to_string()]
    );
    assert_eq!(
        static_errors("fun f() { return this; }"),
        vec!["[line 1] Error at 'this': Can't use 'this' outside of a class.".to_string()]
    );
}

#[test]
fn misplaced_super() {
    assert_eq!(
        static_errors("super.method();"),
        vec!["[line 1] Error at 'super': Can't use 'super' outside of a class.".to_string()]
    );
    assert_eq!(
        static_errors("class A { m() { super.m(); } }"),
        vec![
            "[line 1] Error at 'super': Can't use 'super' in a class with no superclass."
                .to_string()
        ]
    );
}

#[test]
fn class_inheriting_from_itself() {
    assert_eq!(
        static_errors("class Oops < Oops {}"),
        vec!["[line 1] Error at 'Oops': A class can't inherit from itself.".to_string()]
    );
}

#[test]
fn every_static_error_is_reported() {
    let errors = static_errors("return 1;\nprint this;\n{ var b = 1; var b = 2; }");

    assert_eq!(errors.len(), 3);
    assert!(errors[0].starts_with("[line 1]"));
    assert!(errors[1].starts_with("[line 2]"));
    assert!(errors[2].starts_with("[line 3]"));
}

#[test]
fn static_errors_prevent_execution() {
    let mut interpreter = Interpreter::with_output(std::io::sink());
    let mut diagnostics = Diagnostics::new();

    // The runtime would fail on `missing` if execution started.
    lox::run("print missing;\nreturn;", &mut interpreter, &mut diagnostics);

    assert!(diagnostics.had_error());
    assert!(!diagnostics.had_runtime_error());
    assert_eq!(diagnostics.errors().len(), 1);
}
