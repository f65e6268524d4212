//! Centralised error hierarchy and diagnostic sink for the **Lox interpreter**.
//!
//! All passes (scanner, parser, resolver, runtime) convert their failure
//! modes into one of the [`LoxError`] variants and hand them to a
//! [`Reporter`].  The sink is passed explicitly into every pass; there is no
//! global "had error" flag.
//!
//! The module **does not** decide what to do after an error, callers inspect
//! [`Reporter::had_error`] / [`Reporter::had_runtime_error`] between passes.

use std::io;
use thiserror::Error;

use log::info;

use crate::token::{Token, TokenType};

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoxError {
    /// Lexical (scanner) error with source line information.
    #[error("[line {line}] Error: {message}")]
    Lex {
        /// Human‑readable description.
        message: String,

        /// 1‑based line where the error occurred.
        line: usize,
    },

    /// Syntactic (parser) error.  `location` is either ` at end` or
    /// ` at 'lexeme'`.
    #[error("[line {line}] Error{location}: {message}")]
    Parse {
        message: String,
        location: String,
        line: usize,
    },

    /// Static‑analysis failure detected by the resolver.
    #[error("[line {line}] Error{location}: {message}")]
    Resolve {
        message: String,
        location: String,
        line: usize,
    },

    /// Runtime evaluation error.
    #[error("{message}\n[line {line}]")]
    Runtime { message: String, line: usize },

    /// Wrapper around `std::io::Error` (transparent).  Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// UTF‑8 decoding failure when ingesting external text.
    #[error(transparent)]
    Utf8(#[from] std::str::Utf8Error),
}

impl LoxError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: line={}, msg={}", line, message);

        LoxError::Lex { message, line }
    }

    /// Helper constructor for the **parser**.
    pub fn parse<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Parse error: line={}, msg={}", token.line, message);

        LoxError::Parse {
            message,
            location: location(token),
            line: token.line,
        }
    }

    /// Helper constructor for the **resolver**.
    pub fn resolve<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Resolve error: line={}, msg={}", token.line, message);

        LoxError::Resolve {
            message,
            location: location(token),
            line: token.line,
        }
    }

    /// Helper constructor for the **interpreter**, anchored at the token that
    /// triggered the fault.
    pub fn runtime<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Runtime error: line={}, msg={}", token.line, message);

        LoxError::Runtime {
            message,
            line: token.line,
        }
    }

    /// Source line the error points at, if it has one.
    pub fn line(&self) -> Option<usize> {
        match self {
            LoxError::Lex { line, .. }
            | LoxError::Parse { line, .. }
            | LoxError::Resolve { line, .. }
            | LoxError::Runtime { line, .. } => Some(*line),
            LoxError::Io(_) | LoxError::Utf8(_) => None,
        }
    }

    /// The bare message without the line decoration.
    pub fn message(&self) -> String {
        match self {
            LoxError::Lex { message, .. }
            | LoxError::Parse { message, .. }
            | LoxError::Resolve { message, .. }
            | LoxError::Runtime { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn is_runtime(&self) -> bool {
        matches!(self, LoxError::Runtime { .. })
    }
}

fn location(token: &Token) -> String {
    if token.token_type == TokenType::EOF {
        " at end".to_string()
    } else {
        format!(" at '{}'", token.lexeme)
    }
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, LoxError>;

/// Destination for every diagnostic produced by the pipeline.
pub trait Reporter {
    /// Records an already constructed error.
    fn report(&mut self, error: LoxError);

    /// Lexical / generic error anchored at a line.
    fn error(&mut self, line: usize, message: &str) {
        self.report(LoxError::lex(line, message));
    }

    /// Syntax error anchored at a token.
    fn error_at(&mut self, token: &Token, message: &str) {
        self.report(LoxError::parse(token, message));
    }

    /// Runtime fault; aborts the remaining top‑level statements.  Whatever
    /// the variant (an I/O failure while printing, say), it counts as a
    /// runtime error.
    fn runtime_error(&mut self, error: LoxError);

    /// Any lexical, syntax or static error since the last [`Reporter::reset`].
    fn had_error(&self) -> bool;

    /// A runtime error occurred.
    fn had_runtime_error(&self) -> bool;

    /// Clears both flags and forgets recorded diagnostics (used between
    /// REPL lines).
    fn reset(&mut self);
}

/// Default [`Reporter`]: keeps every diagnostic in order and optionally
/// echoes each one to stderr as it arrives.
#[derive(Debug, Default)]
pub struct Diagnostics {
    errors: Vec<LoxError>,
    had_error: bool,
    had_runtime_error: bool,
    echo: bool,
}

impl Diagnostics {
    /// A silent sink, used by tests and embedders.
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that also prints every diagnostic to stderr.
    pub fn echoing() -> Self {
        Self {
            echo: true,
            ..Self::default()
        }
    }

    pub fn errors(&self) -> &[LoxError] {
        &self.errors
    }

    /// Rendered messages, in report order.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    fn record(&mut self, error: LoxError, runtime: bool) {
        if self.echo {
            eprintln!("{}", error);
        }

        if runtime {
            self.had_runtime_error = true;
        } else {
            self.had_error = true;
        }

        self.errors.push(error);
    }
}

impl Reporter for Diagnostics {
    fn report(&mut self, error: LoxError) {
        let runtime: bool = error.is_runtime();
        self.record(error, runtime);
    }

    fn runtime_error(&mut self, error: LoxError) {
        self.record(error, true);
    }

    fn had_error(&self) -> bool {
        self.had_error
    }

    fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    fn reset(&mut self) {
        self.had_error = false;
        self.had_runtime_error = false;
        self.errors.clear();
    }
}
