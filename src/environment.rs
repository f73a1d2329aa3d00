//! Lexical scope frames.
//!
//! Frames are shared as `Rc<RefCell<Environment>>`: the interpreter holds the
//! active one, every child holds its parent, and every closure holds the frame
//! it was defined in.  A frame lives as long as its longest holder.

use crate::error::{LoxError, Result};
use crate::token::Token;
use crate::value::Value;
use log::debug;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared handle to a frame.
pub type EnvRef = Rc<RefCell<Environment>>;

#[derive(Debug, Default)]
pub struct Environment {
    // `None` marks a variable declared without an initializer.
    values: HashMap<String, Option<Value>>,
    enclosing: Option<EnvRef>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: EnvRef) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Wrap in a shared handle.
    pub fn into_ref(self) -> EnvRef {
        Rc::new(RefCell::new(self))
    }

    pub fn enclosing(&self) -> Option<EnvRef> {
        self.enclosing.clone()
    }

    /// Bind `name` in this frame, replacing any existing binding here.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), Some(value));
    }

    /// Bind `name` in this frame without a value; reading it is an error
    /// until something is assigned.
    pub fn declare(&mut self, name: &str) {
        self.values.insert(name.to_string(), None);
    }

    /// Look `name` up here, then in each enclosing frame.
    pub fn get(&self, name: &Token) -> Result<Value> {
        match self.values.get(&name.lexeme) {
            Some(slot) => read(slot, name),
            None => match &self.enclosing {
                Some(enclosing) => enclosing.borrow().get(name),
                None => Err(undefined(name)),
            },
        }
    }

    /// Overwrite the nearest existing binding of `name`.  Never creates one.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<()> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = Some(value);
            return Ok(());
        }

        match &self.enclosing {
            Some(enclosing) => enclosing.borrow_mut().assign(name, value),
            None => Err(undefined(name)),
        }
    }
}

/// Frame `distance` parent links above `env`.
///
/// Panics if the chain is shorter than `distance`: the resolver computed the
/// distance from the same scope structure the interpreter builds, so a short
/// chain is an interpreter bug, not a user error.
pub fn ancestor(env: &EnvRef, distance: usize) -> EnvRef {
    let mut frame = Rc::clone(env);

    for _ in 0..distance {
        let parent = frame
            .borrow()
            .enclosing()
            .expect("resolved distance exceeds environment depth");
        frame = parent;
    }

    frame
}

/// Read `name` from exactly the frame `distance` links above `env`.
pub fn get_at(env: &EnvRef, distance: usize, name: &Token) -> Result<Value> {
    debug!("get_at({}, '{}')", distance, name.lexeme);

    let frame = ancestor(env, distance);
    let frame = frame.borrow();
    let slot = frame
        .values
        .get(&name.lexeme)
        .unwrap_or_else(|| panic!("resolved variable '{}' missing from its frame", name.lexeme));

    read(slot, name)
}

/// Write `name` in exactly the frame `distance` links above `env`.
pub fn assign_at(env: &EnvRef, distance: usize, name: &Token, value: Value) {
    debug!("assign_at({}, '{}')", distance, name.lexeme);

    ancestor(env, distance)
        .borrow_mut()
        .values
        .insert(name.lexeme.clone(), Some(value));
}

fn read(slot: &Option<Value>, name: &Token) -> Result<Value> {
    slot.clone().ok_or_else(|| {
        LoxError::runtime(name, format!("Uninitialized variable '{}'.", name.lexeme))
    })
}

fn undefined(name: &Token) -> LoxError {
    LoxError::runtime(name, format!("Undefined variable '{}'.", name.lexeme))
}
