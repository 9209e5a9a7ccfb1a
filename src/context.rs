//! The execution-frame context: display name, parent, entry position, cwd,
//! current file, environment, and module registry (spec §4.4).

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use smartstring::alias::String as SmartString;

use crate::scope::Environment;
use crate::token::Position;
use crate::value::Value;

/// An execution frame. Every `Context` but the root has a non-null parent.
pub struct Context {
    pub display_name: SmartString,
    pub parent: Option<Rc<Context>>,
    pub entry_pos: Option<Position>,
    cwd: Option<String>,
    file: Option<String>,
    pub env: Rc<RefCell<Environment>>,
    modules: RefCell<HashMap<SmartString, Value>>,
}

/// Hand-written: `Environment` (behind `env`) isn't `Debug`, so this can't
/// be derived. Prints the frame chain by display name only, which is all a
/// traceback or a test failure needs.
impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("display_name", &self.display_name)
            .field("parent", &self.parent.as_ref().map(|p| &p.display_name))
            .field("entry_pos", &self.entry_pos)
            .finish()
    }
}

impl Context {
    pub fn root(display_name: impl Into<SmartString>, cwd: Option<String>, file: Option<String>) -> Rc<Self> {
        Rc::new(Self {
            display_name: display_name.into(),
            parent: None,
            entry_pos: None,
            cwd,
            file,
            env: Rc::new(RefCell::new(Environment::new(None))),
            modules: RefCell::new(HashMap::new()),
        })
    }

    /// Create a child context that shares no environment with the parent;
    /// the caller is responsible for wiring `env`'s parent pointer.
    pub fn child(
        display_name: impl Into<SmartString>,
        parent: Rc<Context>,
        entry_pos: Position,
        env: Rc<RefCell<Environment>>,
    ) -> Rc<Self> {
        Rc::new(Self {
            display_name: display_name.into(),
            parent: Some(parent),
            entry_pos: Some(entry_pos),
            cwd: None,
            file: None,
            env,
            modules: RefCell::new(HashMap::new()),
        })
    }

    /// Walk up to the outermost ancestor. Backs `contexto(trucho)` (spec §6)
    /// and the script-import path, which resolves `.lunf` names relative to
    /// the program's global environment rather than the importing module's.
    pub fn root_of(start: &Rc<Context>) -> Rc<Context> {
        let mut cursor = start.clone();
        while let Some(parent) = cursor.parent.clone() {
            cursor = parent;
        }
        cursor
    }

    pub fn get_cwd(&self) -> Option<String> {
        self.cwd.clone().or_else(|| self.parent.as_ref().and_then(|p| p.get_cwd()))
    }

    pub fn get_file(&self) -> Option<String> {
        self.file.clone().or_else(|| self.parent.as_ref().and_then(|p| p.get_file()))
    }

    pub fn add_module(&self, name: impl Into<SmartString>, value: Value) {
        self.modules.borrow_mut().insert(name.into(), value);
    }

    pub fn get_module(&self, name: &str) -> Option<Value> {
        self.modules.borrow().get(name).cloned()
    }

    pub fn has_modules(&self) -> bool {
        !self.modules.borrow().is_empty()
    }

    pub fn modules_snapshot(&self) -> Vec<(SmartString, Value)> {
        self.modules.borrow().iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    /// Traverse upward from `start` until a context owning a non-empty
    /// module registry is found, then scan each registered module's
    /// environment for `name`. Grounded on the original interpreter's
    /// `find_in_parent_module` (spec §4.4).
    pub fn find_in_parent_module(start: &Rc<Context>, name: &str) -> Option<Value> {
        let mut cursor = Some(start.clone());
        while let Some(ctx) = cursor {
            if ctx.has_modules() {
                for (_, module) in ctx.modules_snapshot() {
                    if let Value::Module(module_ctx) = &module {
                        if let Some(v) = module_ctx.env.borrow().get_local(name) {
                            return Some(v);
                        }
                    }
                }
                return None;
            }
            cursor = ctx.parent.clone();
        }
        None
    }
}
