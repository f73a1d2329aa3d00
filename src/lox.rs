//! One interpreter session: source text in, output and diagnostics out.
//!
//! A session keeps its interpreter between runs, so globals and functions
//! defined by one REPL line are visible to the next.

use std::io::{self, Stdout, Write};

use log::{debug, info};

use crate::error::Diagnostics;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner;
use crate::value::Value;

pub struct Lox<W: Write = Stdout> {
    interpreter: Interpreter<W>,
}

impl Lox<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Lox<W> {
    pub fn new(out: W) -> Self {
        Self {
            interpreter: Interpreter::new(out),
        }
    }

    pub fn into_output(self) -> W {
        self.interpreter.into_output()
    }

    /// Scan, parse, resolve and run `source`.
    ///
    /// Any lexical, syntax or resolution error stops the run before anything
    /// executes.  A runtime error stops execution at the failing top-level
    /// statement.
    pub fn run(&mut self, source: &str) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();

        let tokens = scanner::tokenize(source, &mut diagnostics);
        let statements = Parser::new(&tokens, &mut diagnostics).parse();

        if diagnostics.has_static_errors() {
            info!("Not running: {} error(s) before resolution", diagnostics.len());
            return diagnostics;
        }

        let locals = Resolver::new(&mut diagnostics).resolve(&statements);

        if diagnostics.has_static_errors() {
            info!("Not running: {} resolution error(s)", diagnostics.len());
            return diagnostics;
        }

        self.interpreter.resolve(locals);

        if let Err(e) = self.interpreter.interpret(&statements) {
            debug!("Runtime debug: {}", e);
            diagnostics.report(e);
        }

        diagnostics
    }

    /// Evaluate `source` as a single expression.
    pub fn evaluate(&mut self, source: &str) -> Result<Value, Diagnostics> {
        let mut diagnostics = Diagnostics::new();

        let tokens = scanner::tokenize(source, &mut diagnostics);
        let expr = Parser::new(&tokens, &mut diagnostics).parse_expression();

        let expr = match expr {
            Some(expr) if !diagnostics.has_static_errors() => expr,
            _ => return Err(diagnostics),
        };

        let locals = Resolver::new(&mut diagnostics).resolve_expression(&expr);

        if diagnostics.has_static_errors() {
            return Err(diagnostics);
        }

        self.interpreter.resolve(locals);

        self.interpreter.evaluate(&expr).map_err(|e| {
            diagnostics.report(e);
            diagnostics
        })
    }

    /// REPL entry: run `line` as a program; if it is not a valid program but
    /// is a valid expression, print the expression's value instead.
    pub fn run_line(&mut self, line: &str) -> Diagnostics {
        let diagnostics = self.run(line);

        if !diagnostics.has_static_errors() {
            return diagnostics;
        }

        match self.evaluate(line) {
            Ok(value) => {
                let mut written = Diagnostics::new();
                if let Err(e) = writeln!(self.interpreter.output_mut(), "{}", value) {
                    written.report(e.into());
                }
                written
            }
            Err(expr_diagnostics) if expr_diagnostics.has_runtime_errors() => expr_diagnostics,
            Err(_) => diagnostics,
        }
    }
}
