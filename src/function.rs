use std::fmt;
use std::io::Write;
use std::rc::Rc;

use log::debug;

use crate::environment::{EnvRef, Environment};
use crate::error::Result;
use crate::expr::FunctionLiteral;
use crate::interpreter::{Flow, Interpreter};
use crate::value::Value;

/// A user-defined function paired with the frame it was defined in.
pub struct LoxFunction {
    name: Option<String>,
    declaration: Rc<FunctionLiteral>,
    closure: EnvRef,
}

impl LoxFunction {
    pub fn new(name: Option<String>, declaration: Rc<FunctionLiteral>, closure: EnvRef) -> Self {
        Self {
            name,
            declaration,
            closure,
        }
    }

    pub fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Run the body in a fresh frame whose parent is the closure, not the
    /// caller's frame.  Arity has already been checked by the caller.
    pub fn call<W: Write>(
        &self,
        interpreter: &mut Interpreter<W>,
        arguments: Vec<Value>,
    ) -> Result<Value> {
        debug!("Calling {} with {} argument(s)", self, arguments.len());

        let mut frame = Environment::with_enclosing(Rc::clone(&self.closure));

        for (param, argument) in self.declaration.params.iter().zip(arguments) {
            frame.define(&param.lexeme, argument);
        }

        match interpreter.execute_block(&self.declaration.body, frame.into_ref())? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Nil),
        }
    }
}

impl fmt::Display for LoxFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "<fn {}>", name),
            None => write!(f, "<fn>"),
        }
    }
}

// The closure can reach this function again, so Debug must not follow it.
impl fmt::Debug for LoxFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoxFunction")
            .field("name", &self.name)
            .field("arity", &self.arity())
            .finish_non_exhaustive()
    }
}
