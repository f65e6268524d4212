//! Runtime scope frames.
//!
//! Frames are shared (`Rc<RefCell<_>>`): a closure keeps its defining frame
//! and all of its ancestors alive, and two closures over the same frame see
//! each other's writes.

use crate::error::{LoxError, Result};
use crate::token::Token;
use crate::value::Value;
use log::debug;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub type EnvRef = Rc<RefCell<Environment>>;

#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
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

    pub fn into_shared(self) -> EnvRef {
        Rc::new(RefCell::new(self))
    }

    /// Wraps a fresh child of `enclosing` in a shared handle.
    pub fn child_of(enclosing: &EnvRef) -> EnvRef {
        Environment::with_enclosing(Rc::clone(enclosing)).into_shared()
    }

    pub fn enclosing(&self) -> Option<EnvRef> {
        self.enclosing.clone()
    }

    /// Inserts or overwrites `name` in this frame.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Reads `name` from this frame only.
    pub fn get_here(&self, name: &str) -> Option<Value> {
        self.values.get(name).cloned()
    }

    /// Searches this frame, then each enclosing frame.
    pub fn get(&self, name: &Token) -> Result<Value> {
        if let Some(value) = self.values.get(&name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(undefined(name))
        }
    }

    /// Like [`Environment::get`] but only ever overwrites an existing binding.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<()> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(undefined(name))
        }
    }

    /// Reads `name` from the frame exactly `distance` hops up, no searching.
    pub fn get_at(env: &EnvRef, distance: usize, name: &Token) -> Result<Value> {
        let frame: EnvRef = Self::ancestor(env, distance, name)?;
        let value: Option<Value> = frame.borrow().values.get(&name.lexeme).cloned();

        debug!("get_at({}, '{}') -> {:?}", distance, name.lexeme, value);

        value.ok_or_else(|| undefined(name))
    }

    /// Writes `name` in the frame exactly `distance` hops up.
    pub fn assign_at(env: &EnvRef, distance: usize, name: &Token, value: Value) -> Result<()> {
        let frame: EnvRef = Self::ancestor(env, distance, name)?;
        frame.borrow_mut().define(&name.lexeme, value);
        Ok(())
    }

    /// A resolver/runtime scope mismatch surfaces as an undefined variable
    /// instead of a panic.
    fn ancestor(env: &EnvRef, distance: usize, name: &Token) -> Result<EnvRef> {
        let mut frame: EnvRef = Rc::clone(env);

        for _ in 0..distance {
            let parent: Option<EnvRef> = frame.borrow().enclosing();
            frame = parent.ok_or_else(|| undefined(name))?;
        }

        Ok(frame)
    }
}

fn undefined(name: &Token) -> LoxError {
    LoxError::runtime(name, format!("Undefined variable '{}'.", name.lexeme))
}
