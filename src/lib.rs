pub mod ast;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod token;
pub mod value;

use log::info;

use crate::ast::Stmt;
use crate::error::Reporter;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::Scanner;

/// Scans, parses, resolves and runs `source` against `interpreter`.
///
/// Each stage only runs if no lexical, syntax or static error has been
/// reported so far; inspect `reporter` afterwards for the outcome.
pub fn run(source: &str, interpreter: &mut Interpreter, reporter: &mut dyn Reporter) {
    let statements: Vec<Stmt> = parse_source(source, reporter);
    execute(statements, interpreter, reporter);
}

/// Like [`run`], but a line consisting of a single expression statement
/// prints its value, as a REPL user expects.
pub fn run_line(source: &str, interpreter: &mut Interpreter, reporter: &mut dyn Reporter) {
    let mut statements: Vec<Stmt> = parse_source(source, reporter);

    if let [Stmt::Expression(expr)] = statements.as_mut_slice() {
        let expr = std::mem::replace(expr, ast::Expr::Literal(ast::LiteralValue::Nil));
        statements = vec![Stmt::Print(expr)];
    }

    execute(statements, interpreter, reporter);
}

fn parse_source(source: &str, reporter: &mut dyn Reporter) -> Vec<Stmt> {
    let tokens = Scanner::new(source).scan_tokens(reporter);
    Parser::new(tokens).parse(reporter)
}

fn execute(statements: Vec<Stmt>, interpreter: &mut Interpreter, reporter: &mut dyn Reporter) {
    if reporter.had_error() {
        info!("Skipping execution: front end reported errors");
        return;
    }

    Resolver::new(interpreter, reporter).resolve(&statements);

    if reporter.had_error() {
        info!("Skipping execution: resolver reported errors");
        return;
    }

    interpreter.interpret(&statements, reporter);
}
