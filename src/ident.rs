//! Global variable identity: a process-wide name table where each distinct
//! name resolves to exactly one `Rc<Identifier>` handle, so pointer equality
//! (`Rc::ptr_eq`) doubles as the interning invariant — the same name parsed
//! twice must be the same identifier (Invariant 1).
//!
//! Grounded on the teacher's `scope.rs` (`HashMap<String, _>` lookup table),
//! folded into a single flat table rather than a `Vec` of pushed/popped scopes
//! since Knight has no lexical scoping, with identity semantics borrowed from
//! `intern.rs`'s "same string, same handle" contract.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::KnightError;
use crate::value::Value;

/// A single global variable: its name and current binding, if any.
#[derive(Debug)]
pub struct Identifier {
    pub name: String,
    binding: RefCell<Option<Value>>,
}

impl Identifier {
    fn new(name: String) -> Self {
        Identifier { name, binding: RefCell::new(None) }
    }

    pub fn get(&self) -> Result<Value, KnightError> {
        self.binding
            .borrow()
            .clone()
            .ok_or_else(|| KnightError::Undefined { name: self.name.clone() })
    }

    pub fn set(&self, value: Value) {
        *self.binding.borrow_mut() = Some(value);
    }
}

/// The process-global name table. One `Environment` lives for the lifetime of
/// a single `run` invocation (§5 Concurrency & Resource Model: no sharing
/// across concurrent interpreter instances).
#[derive(Debug, Default)]
pub struct Environment {
    table: HashMap<String, Rc<Identifier>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment { table: HashMap::new() }
    }

    /// Returns the identifier handle for `name`, creating and interning one
    /// on first use. Subsequent calls with the same name return the same
    /// `Rc`, verified by `Rc::ptr_eq`.
    pub fn intern(&mut self, name: &str) -> Rc<Identifier> {
        if let Some(existing) = self.table.get(name) {
            return existing.clone();
        }
        let ident = Rc::new(Identifier::new(name.to_string()));
        self.table.insert(name.to_string(), ident.clone());
        ident
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_name_interns_to_same_handle() {
        let mut env = Environment::new();
        let a = env.intern("x");
        let b = env.intern("x");
        assert!(Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn distinct_names_intern_to_distinct_handles() {
        let mut env = Environment::new();
        let a = env.intern("x");
        let b = env.intern("y");
        assert!(!Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn unbound_identifier_errors_on_get() {
        let mut env = Environment::new();
        let id = env.intern("x");
        assert!(id.get().is_err());
    }

    #[test]
    fn set_then_get_round_trips() {
        let mut env = Environment::new();
        let id = env.intern("x");
        id.set(Value::Integer(42));
        match id.get().unwrap() {
            Value::Integer(42) => {}
            other => panic!("expected Integer(42), got {other:?}"),
        }
    }

    #[test]
    fn environment_length_tracks_unique_names() {
        let mut env = Environment::new();
        env.intern("x");
        env.intern("y");
        env.intern("x");
        assert_eq!(env.len(), 2);
    }
}
