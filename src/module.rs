//! The library registry (spec §4.6): maps a builtin library name (`gualichos`,
//! `lacompu`) to the host handler that populates a fresh module `Context` for
//! it. `Engine::eval_import` consults this registry before falling back to
//! resolving `importar foo` as a plain `foo.lunf` script import.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use smartstring::alias::String as SmartString;

use crate::ast::Node;
use crate::context::Context;
use crate::error::LunfardoError;

/// `fn(module_context, import_node, caller_context) -> Result<(), _>`: runs
/// once, at import time, to populate `module_context`'s environment with
/// whatever the library exposes.
pub type LibraryHandler = Rc<dyn Fn(&Rc<Context>, &Node, &Rc<Context>) -> Result<(), Box<LunfardoError>>>;

#[derive(Default)]
pub struct Registry {
    handlers: RefCell<HashMap<SmartString, LibraryHandler>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, name: impl Into<SmartString>, handler: LibraryHandler) {
        self.handlers.borrow_mut().insert(name.into(), handler);
    }

    pub fn get(&self, name: &str) -> Option<LibraryHandler> {
        self.handlers.borrow().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.borrow().contains_key(name)
    }
}
