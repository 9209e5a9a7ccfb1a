//! `Environment`: a nested scope chain with a parent back-reference
//! (spec §4.4). Mirrors the teacher's `Scope`, but keyed the way a
//! tree-walking interpreter with first-class closures needs: every
//! environment is independently `Rc<RefCell<_>>`-shared so function values
//! can capture their defining scope.

use std::cell::RefCell;
use std::rc::Rc;

use ahash::RandomState;
use smartstring::alias::String as SmartString;
use std::collections::HashMap;

use crate::value::Value;

/// A single nested scope. `get` walks up the parent chain; `set` always
/// writes into the current scope (shadowing, never mutating an ancestor).
pub struct Environment {
    vars: HashMap<SmartString, Value, RandomState>,
    parent: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    pub fn new(parent: Option<Rc<RefCell<Environment>>>) -> Self {
        Self { vars: HashMap::with_hasher(RandomState::new()), parent }
    }

    /// Look up `name` in this scope only (no parent walk). Used by the
    /// module-search fallback, which treats each module's top environment
    /// as a flat namespace.
    pub fn get_local(&self, name: &str) -> Option<Value> {
        self.vars.get(name).cloned()
    }

    /// Walk up the chain looking for `name`.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(v) = self.vars.get(name) {
            return Some(v.clone());
        }
        self.parent.as_ref().and_then(|p| p.borrow().get(name))
    }

    /// Bind `name` in the *current* scope (spec: `poneleque` always shadows).
    pub fn set(&mut self, name: impl Into<SmartString>, value: Value) {
        self.vars.insert(name.into(), value);
    }

    /// Reassign an existing binding, walking up the chain to find where
    /// it lives. Returns `false` if no such binding is reachable.
    pub fn reassign(env: &Rc<RefCell<Environment>>, name: &str, value: Value) -> bool {
        if env.borrow().vars.contains_key(name) {
            env.borrow_mut().vars.insert(SmartString::from(name), value);
            return true;
        }
        let parent = env.borrow().parent.clone();
        match parent {
            Some(p) => Environment::reassign(&p, name, value),
            None => false,
        }
    }

    pub fn remove(&mut self, name: &str) {
        self.vars.remove(name);
    }

    /// Snapshot of this scope's own bindings (no parent walk). Backs the
    /// `contexto` builtin's "immutable inspection hook" contract (spec §9):
    /// callers get a copy, never a handle into the live table.
    pub fn snapshot(&self) -> Vec<(SmartString, Value)> {
        self.vars.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}
