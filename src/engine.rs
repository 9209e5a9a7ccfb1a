//! The AST-walking evaluator (spec §4.5): dispatch on node kind, producing
//! `Result<Value, Box<LunfardoError>>` as the sole signalling channel.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::{Rc, Weak};

use smartstring::alias::String as SmartString;

use crate::ast::{Body, IfCase, Node, NodeKind, Param};
use crate::context::Context;
use crate::dict::Dict;
use crate::error::LunfardoError;
use crate::module::{LibraryHandler, Registry};
use crate::scope::Environment;
use crate::token::Position;
use crate::value::{binary_op, unary_op, ClassValue, FuncParam, FuncValue, InstanceValue, Number, Value};

/// Call-argument buffer, inline-stored up to the arity most calls actually
/// have. Mirrors the teacher's own `StaticVec<T> = SmallVec<[T; 4]>` alias.
type StaticVec<T> = smallvec::SmallVec<[T; 4]>;

/// Evaluator configuration (spec §2.4/§5: "a MaxRecursion error is defined
/// so future implementations may impose a depth counter"). Mirrors the
/// teacher's tiny `Limits` struct rather than a config file — no `.lunf`
/// project-config format exists.
pub struct Limits {
    pub max_call_stack_depth: usize,
    pub max_operations: Option<usize>,
}

impl Default for Limits {
    fn default() -> Self {
        Self { max_call_stack_depth: 1000, max_operations: None }
    }
}

/// The evaluator: owns the root context and the library registry, and
/// drives every node dispatch. Reentrant — `ejecutar`/`importar` may call
/// back into `eval` with no hidden mutable state beyond the shared global
/// environment and the in-progress import set.
pub struct Engine {
    pub root: Rc<Context>,
    pub limits: RefCell<Limits>,
    libraries: Registry,
    depth: Cell<usize>,
    operations: Cell<usize>,
    loading_modules: RefCell<HashSet<SmartString>>,
    /// Lets builtins (`ejecutar`) capture a handle back to the evaluator
    /// without a borrow, since `BuiltinValue::func` closures are `'static`
    /// (spec §9: "the evaluator must be reentrant").
    self_ref: Weak<Engine>,
}

impl Engine {
    /// Built behind `Rc` via `new_cyclic` so builtins registered during
    /// construction can stash a `Weak<Engine>` and call back into `eval`
    /// later (e.g. `ejecutar` running a nested script).
    pub fn new() -> Rc<Self> {
        Rc::new_cyclic(|self_ref| {
            let cwd = std::env::current_dir().ok().map(|p| p.display().to_string());
            let root = Context::root("<programa>", cwd, None);
            let engine = Self {
                root,
                limits: RefCell::new(Limits::default()),
                libraries: Registry::new(),
                depth: Cell::new(0),
                operations: Cell::new(0),
                loading_modules: RefCell::new(HashSet::new()),
                self_ref: self_ref.clone(),
            };
            crate::packages::register_defaults(&engine);
            engine
        })
    }

    /// A handle builtins can clone into their `'static` closures and
    /// `upgrade()` when they need to call back into the evaluator.
    pub fn handle(&self) -> Weak<Engine> {
        self.self_ref.clone()
    }

    pub fn set_limits(&self, limits: Limits) {
        *self.limits.borrow_mut() = limits;
    }

    pub fn global_env(&self) -> Rc<RefCell<Environment>> {
        self.root.env.clone()
    }

    pub fn set_global(&self, name: impl Into<SmartString>, value: Value) {
        self.root.env.borrow_mut().set(name, value);
    }

    pub fn register_library(&self, name: impl Into<SmartString>, handler: LibraryHandler) {
        self.libraries.register(name, handler);
    }

    /// Lex, parse, and evaluate a whole source file in a fresh child context
    /// of the root (used by the CLI collaborator and by `ejecutar`).
    pub fn run(&self, filename: &str, source: &str) -> Result<Value, Box<LunfardoError>> {
        let tokens = crate::token::tokenize(filename, source)?;
        let ast = crate::parse::parse(tokens)?;
        self.eval(&ast, &self.root)
    }

    /// Same as [`Engine::run`] but evaluates in a caller-supplied context,
    /// used by `ejecutar` to run a script as an ad-hoc nested program.
    pub fn run_in(&self, filename: &str, source: &str, context: &Rc<Context>) -> Result<Value, Box<LunfardoError>> {
        let tokens = crate::token::tokenize(filename, source)?;
        let ast = crate::parse::parse(tokens)?;
        self.eval(&ast, context)
    }

    fn root_context(&self, context: &Rc<Context>) -> Rc<Context> {
        Context::root_of(context)
    }

    fn lookup_var(&self, name: &str, node: &Node, context: &Rc<Context>) -> Result<Value, Box<LunfardoError>> {
        if let Some(v) = context.env.borrow().get(name) {
            return Ok(v);
        }
        if let Some(v) = Context::find_in_parent_module(context, name) {
            return Ok(v);
        }
        Err(Box::new(LunfardoError::UndefinedVar(
            format!("'{}' no está definida", name),
            node.pos_start.copy(),
            node.pos_end.copy(),
            context.clone(),
        )))
    }

    /// Central dispatch over every AST node kind.
    pub fn eval(&self, node: &Node, context: &Rc<Context>) -> Result<Value, Box<LunfardoError>> {
        if let Some(max_ops) = self.limits.borrow().max_operations {
            let ops = self.operations.get() + 1;
            self.operations.set(ops);
            if ops > max_ops {
                return Err(Box::new(LunfardoError::MaxRecursion(node.pos_start.copy(), node.pos_end.copy(), context.clone())));
            }
        }
        match &node.kind {
            NodeKind::Number(n) => Ok(Value::Number(*n)),
            NodeKind::Str(s) => Ok(Value::Str(s.clone())),

            NodeKind::List(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.eval(item, context)?);
                }
                Ok(Value::List(Rc::new(RefCell::new(out))))
            }

            NodeKind::Dict(pairs) => {
                let mut dict = Dict::new();
                for pair in pairs {
                    let key = self.eval(&pair.key, context)?;
                    let value = self.eval(&pair.value, context)?;
                    dict.insert(key, value).map_err(|msg| {
                        Box::new(LunfardoError::InvalidKey(msg, pair.key.pos_start.copy(), pair.key.pos_end.copy(), context.clone()))
                    })?;
                }
                Ok(Value::Dict(Rc::new(RefCell::new(dict))))
            }

            NodeKind::VarAccess(name) => self.lookup_var(name, node, context),

            NodeKind::VarAssign(name, value_node) => {
                let value = self.eval(value_node, context)?;
                context.env.borrow_mut().set(name.clone(), value.clone());
                Ok(value)
            }

            NodeKind::Reassign(name, value_node) => {
                let value = self.eval(value_node, context)?;
                if Environment::reassign(&context.env, name, value.clone()) {
                    Ok(value)
                } else {
                    Err(Box::new(LunfardoError::UndefinedVar(
                        format!("'{}' no está definida", name),
                        node.pos_start.copy(),
                        node.pos_end.copy(),
                        context.clone(),
                    )))
                }
            }

            NodeKind::BinOp(l, op, r) => {
                let left = self.eval(l, context)?;
                let right = self.eval(r, context)?;
                binary_op(op, &left, &right, node.pos_start.copy(), node.pos_end.copy(), context)
            }

            NodeKind::UnaryOp(op, operand_node) => {
                let operand = self.eval(operand_node, context)?;
                unary_op(op, &operand, node.pos_start.copy(), node.pos_end.copy(), context)
            }

            NodeKind::If { cases, else_case } => self.eval_if(cases, else_case, context),

            NodeKind::For { var_name, start, end, step, body } => {
                self.eval_for(var_name, start, end, step.as_deref(), body, context)
            }

            NodeKind::While { condition, body } => self.eval_while(condition, body, context),

            NodeKind::FuncDef { name, params, body, auto_return, is_method } => {
                self.eval_func_def(name, params, body, *auto_return, *is_method, context)
            }

            NodeKind::Call { callee, args } => self.eval_call(callee, args, node, context),

            NodeKind::ClassDef { name, methods, parent } => self.eval_class_def(name, methods, parent.as_deref(), node, context),

            NodeKind::InstanceNew { class_name, args } => self.eval_instance_new(class_name, args, node, context),

            NodeKind::MethodCall { receiver, access_chain, method, args } => {
                self.eval_method_call(receiver, access_chain, method, args, node, context)
            }

            NodeKind::InstanceVarAccess { receiver, access_chain } => self.eval_instance_var_access(receiver, access_chain, node, context),

            NodeKind::InstanceVarAssign { receiver, name, value } => self.eval_instance_var_assign(receiver, name, value, node, context),

            NodeKind::InstanceVarAccessAndAssign { receiver, access_chain, value } => {
                self.eval_instance_var_access_and_assign(receiver, access_chain, value, node, context)
            }

            NodeKind::Return(expr) => {
                let value = match expr {
                    Some(e) => self.eval(e, context)?,
                    None => Value::Nil,
                };
                Err(Box::new(LunfardoError::Return(value)))
            }

            NodeKind::Continue => Err(Box::new(LunfardoError::LoopContinue)),
            NodeKind::Break => Err(Box::new(LunfardoError::LoopBreak)),

            NodeKind::Import(name) => self.eval_import(name, node, context),

            NodeKind::Try { try_body, error_tag, except_body } => self.eval_try(try_body, error_tag, except_body, context),

            NodeKind::Raise { error_tag, message } => self.eval_raise(error_tag, message, node, context),

            NodeKind::Statements(stmts) => {
                let mut results = Vec::with_capacity(stmts.len());
                for stmt in stmts {
                    results.push(self.eval(stmt, context)?);
                }
                Ok(Value::List(Rc::new(RefCell::new(results))))
            }
        }
    }

    /// Run a block's statements, discarding their individual values;
    /// `devolver`/`continuar`/`rajar` still propagate as `Err(..)` signals.
    /// Used for `si`/`mientras`/`para`/`laburo` block bodies, which the spec
    /// says evaluate to Nil (distinct from the program root, which collects
    /// a List of results).
    fn exec_block(&self, stmts: &[Node], context: &Rc<Context>) -> Result<Value, Box<LunfardoError>> {
        for stmt in stmts {
            self.eval(stmt, context)?;
        }
        Ok(Value::Nil)
    }

    /// Run a block's statements, keeping the value of the last one. Used by
    /// `proba`/`sibardea` bodies, which act like a single inline expression.
    fn eval_sequence_last(&self, stmts: &[Node], context: &Rc<Context>) -> Result<Value, Box<LunfardoError>> {
        let mut last = Value::Nil;
        for stmt in stmts {
            last = self.eval(stmt, context)?;
        }
        Ok(last)
    }

    fn eval_body(&self, body: &Body, context: &Rc<Context>) -> Result<Value, Box<LunfardoError>> {
        if body.is_block {
            match &body.node.kind {
                NodeKind::Statements(stmts) => self.exec_block(stmts, context),
                _ => self.eval(&body.node, context),
            }
        } else {
            self.eval(&body.node, context)
        }
    }

    fn eval_if(&self, cases: &[IfCase], else_case: &Option<Body>, context: &Rc<Context>) -> Result<Value, Box<LunfardoError>> {
        for case in cases {
            let cond = self.eval(&case.condition, context)?;
            if cond.is_true() {
                return self.eval_body(&case.body, context);
            }
        }
        if let Some(body) = else_case {
            return self.eval_body(body, context);
        }
        Ok(Value::Nil)
    }

    fn as_loop_bound(&self, value: &Value, node: &Node, context: &Rc<Context>) -> Result<i64, Box<LunfardoError>> {
        match value {
            Value::Number(Number::Int(i)) => Ok(*i),
            Value::Number(Number::Float(f)) => Ok(*f as i64),
            other => Err(Box::new(LunfardoError::InvalidType(
                format!("se esperaba un numero, se recibió '{}'", other.type_name()),
                node.pos_start.copy(),
                node.pos_end.copy(),
                context.clone(),
            ))),
        }
    }

    fn eval_for(
        &self,
        var_name: &str,
        start: &Node,
        end: &Node,
        step: Option<&Node>,
        body: &Body,
        context: &Rc<Context>,
    ) -> Result<Value, Box<LunfardoError>> {
        let start_v = self.eval(start, context)?;
        let start_n = self.as_loop_bound(&start_v, start, context)?;
        let end_v = self.eval(end, context)?;
        let end_n = self.as_loop_bound(&end_v, end, context)?;
        let step_n = match step {
            Some(s) => {
                let v = self.eval(s, context)?;
                self.as_loop_bound(&v, s, context)?
            }
            None => 1,
        };
        let step_n = if step_n == 0 { 1 } else { step_n };

        let mut i = start_n;
        let mut results = Vec::new();
        loop {
            if step_n > 0 && i >= end_n {
                break;
            }
            if step_n < 0 && i <= end_n {
                break;
            }
            context.env.borrow_mut().set(SmartString::from(var_name), Value::int(i));
            match self.eval_body(body, context) {
                Ok(v) => {
                    if !body.is_block {
                        results.push(v);
                    }
                }
                Err(e) => match *e {
                    LunfardoError::LoopBreak => break,
                    LunfardoError::LoopContinue => {}
                    other => return Err(Box::new(other)),
                },
            }
            i += step_n;
        }

        Ok(if body.is_block { Value::Nil } else { Value::List(Rc::new(RefCell::new(results))) })
    }

    fn eval_while(&self, condition: &Node, body: &Body, context: &Rc<Context>) -> Result<Value, Box<LunfardoError>> {
        let mut results = Vec::new();
        loop {
            let cond = self.eval(condition, context)?;
            if !cond.is_true() {
                break;
            }
            match self.eval_body(body, context) {
                Ok(v) => {
                    if !body.is_block {
                        results.push(v);
                    }
                }
                Err(e) => match *e {
                    LunfardoError::LoopBreak => break,
                    LunfardoError::LoopContinue => {}
                    other => return Err(Box::new(other)),
                },
            }
        }
        Ok(if body.is_block { Value::Nil } else { Value::List(Rc::new(RefCell::new(results))) })
    }

    fn eval_func_def(
        &self,
        name: &Option<SmartString>,
        params: &[Param],
        body: &Node,
        auto_return: bool,
        is_method: bool,
        context: &Rc<Context>,
    ) -> Result<Value, Box<LunfardoError>> {
        let mut func_params = Vec::with_capacity(params.len());
        for p in params {
            let default = match &p.default {
                Some(expr) => Some(self.eval(expr, context)?),
                None => None,
            };
            func_params.push(FuncParam { name: p.name.clone(), default });
        }
        let func = Rc::new(FuncValue {
            name: name.clone().unwrap_or_else(|| SmartString::from("<anonima>")),
            params: func_params,
            body: Rc::new(body.clone()),
            auto_return,
            is_method,
            defining_context: RefCell::new(Some(context.clone())),
        });
        let value = Value::Function(func);
        if !is_method {
            if let Some(n) = name {
                context.env.borrow_mut().set(n.clone(), value.clone());
            }
        }
        Ok(value)
    }

    fn eval_call(&self, callee: &Node, args: &[Node], node: &Node, context: &Rc<Context>) -> Result<Value, Box<LunfardoError>> {
        let callee_value = self.eval(callee, context)?;
        let arg_values = self.eval_arg_nodes(args, context)?;
        self.invoke(&callee_value, arg_values, (node.pos_start.copy(), node.pos_end.copy()), context)
    }

    /// Evaluate call-argument expressions left to right into a plain `Vec`,
    /// via a small inline buffer for the common few-args case.
    fn eval_arg_nodes(&self, args: &[Node], context: &Rc<Context>) -> Result<Vec<Value>, Box<LunfardoError>> {
        let mut values: StaticVec<Value> = StaticVec::with_capacity(args.len());
        for a in args {
            values.push(self.eval(a, context)?);
        }
        Ok(values.into_vec())
    }

    /// Invoke any callable value: `laburo`, `curro`, class (constructs an
    /// instance), or instance (spec's `args[0]`-as-method-name dispatch).
    pub fn invoke(&self, callee: &Value, args: Vec<Value>, pos: (Position, Position), context: &Rc<Context>) -> Result<Value, Box<LunfardoError>> {
        match callee {
            Value::Function(f) => self.call_function(f, args, pos, context),
            Value::Builtin(b) => (b.func)(&args, context, pos.0, pos.1),
            Value::Class(c) => self.instantiate(c, args, pos, context),
            Value::Instance(inst) => self.dispatch_instance_call(inst, args, pos, context),
            other => Err(Box::new(LunfardoError::InvalidType(
                format!("'{}' no es invocable", other.type_name()),
                pos.0,
                pos.1,
                context.clone(),
            ))),
        }
    }

    fn dispatch_instance_call(
        &self,
        instance: &Rc<InstanceValue>,
        mut args: Vec<Value>,
        pos: (Position, Position),
        context: &Rc<Context>,
    ) -> Result<Value, Box<LunfardoError>> {
        if args.is_empty() {
            return Err(Box::new(LunfardoError::InvalidValue(
                "se esperaba un nombre de método como primer argumento".into(),
                pos.0,
                pos.1,
                context.clone(),
            )));
        }
        let method_name = match args.remove(0) {
            Value::Str(s) => s,
            other => {
                return Err(Box::new(LunfardoError::InvalidType(
                    format!("se esperaba un chamuyo, se recibió '{}'", other.type_name()),
                    pos.0,
                    pos.1,
                    context.clone(),
                )))
            }
        };
        let func = instance.class.find_method(&method_name).ok_or_else(|| {
            Box::new(LunfardoError::AttributeError(
                format!("'{}' no tiene el método '{}'", instance.class.name, method_name),
                pos.0.copy(),
                pos.1.copy(),
                context.clone(),
            ))
        })?;
        self.call_method(&func, instance, args, pos, context)
    }

    /// Recursion-depth-checked call of a user-defined function.
    fn call_function(
        &self,
        func: &Rc<FuncValue>,
        args: Vec<Value>,
        pos: (Position, Position),
        caller_context: &Rc<Context>,
    ) -> Result<Value, Box<LunfardoError>> {
        let depth = self.depth.get();
        if depth >= self.limits.borrow().max_call_stack_depth {
            return Err(Box::new(LunfardoError::MaxRecursion(pos.0, pos.1, caller_context.clone())));
        }
        self.depth.set(depth + 1);
        let result = self.call_function_inner(func, args, pos, caller_context);
        self.depth.set(depth);
        result
    }

    fn call_function_inner(
        &self,
        func: &Rc<FuncValue>,
        args: Vec<Value>,
        pos: (Position, Position),
        caller_context: &Rc<Context>,
    ) -> Result<Value, Box<LunfardoError>> {
        let required = func.params.iter().filter(|p| p.default.is_none()).count();
        if args.len() < required || args.len() > func.params.len() {
            return Err(Box::new(LunfardoError::InvalidValue(
                format!(
                    "'{}' esperaba entre {} y {} argumentos, recibió {}",
                    func.name,
                    required,
                    func.params.len(),
                    args.len()
                ),
                pos.0,
                pos.1,
                caller_context.clone(),
            )));
        }

        let defining_ctx = func.defining_context.borrow().clone().unwrap_or_else(|| caller_context.clone());
        let func_env = Rc::new(RefCell::new(Environment::new(Some(defining_ctx.env.clone()))));
        for (i, param) in func.params.iter().enumerate() {
            let value = if i < args.len() { args[i].clone() } else { param.default.clone().unwrap() };
            func_env.borrow_mut().set(param.name.clone(), value);
        }
        let func_context = Context::child(func.name.clone(), defining_ctx, pos.0, func_env);

        if func.auto_return {
            self.eval(&func.body, &func_context)
        } else {
            match &func.body.kind {
                NodeKind::Statements(stmts) => match self.exec_block(stmts, &func_context) {
                    Ok(_) => Ok(Value::Nil),
                    Err(e) => match *e {
                        LunfardoError::Return(v) => Ok(v),
                        other => Err(Box::new(other)),
                    },
                },
                _ => self.eval(&func.body, &func_context),
            }
        }
    }

    fn call_method(
        &self,
        func: &Rc<FuncValue>,
        instance: &Rc<InstanceValue>,
        args: Vec<Value>,
        pos: (Position, Position),
        caller_context: &Rc<Context>,
    ) -> Result<Value, Box<LunfardoError>> {
        let mut full_args = Vec::with_capacity(args.len() + 1);
        full_args.push(Value::Instance(instance.clone()));
        full_args.extend(args);
        self.call_function(func, full_args, pos, caller_context)
    }

    fn eval_class_def(
        &self,
        name: &str,
        method_nodes: &[Node],
        parent_name: Option<&str>,
        node: &Node,
        context: &Rc<Context>,
    ) -> Result<Value, Box<LunfardoError>> {
        let mut methods = HashMap::new();
        for m in method_nodes {
            if let NodeKind::FuncDef { name: Some(mname), .. } = &m.kind {
                if let Value::Function(f) = self.eval(m, context)? {
                    methods.insert(mname.clone(), f);
                }
            }
        }
        let parent = match parent_name {
            Some(pn) => match self.lookup_var(pn, node, context)? {
                Value::Class(c) => Some(c),
                other => {
                    return Err(Box::new(LunfardoError::InvalidType(
                        format!("'{}' no es un cheto, es '{}'", pn, other.type_name()),
                        node.pos_start.copy(),
                        node.pos_end.copy(),
                        context.clone(),
                    )))
                }
            },
            None => None,
        };
        let class = Rc::new(ClassValue { name: SmartString::from(name), methods, defining_context: context.clone(), parent });
        let value = Value::Class(class);
        context.env.borrow_mut().set(SmartString::from(name), value.clone());
        Ok(value)
    }

    fn eval_instance_new(&self, class_name: &str, arg_nodes: &[Node], node: &Node, context: &Rc<Context>) -> Result<Value, Box<LunfardoError>> {
        let class = match self.lookup_var(class_name, node, context)? {
            Value::Class(c) => c,
            other => {
                return Err(Box::new(LunfardoError::InvalidType(
                    format!("'{}' no es un cheto, es '{}'", class_name, other.type_name()),
                    node.pos_start.copy(),
                    node.pos_end.copy(),
                    context.clone(),
                )))
            }
        };
        let args = self.eval_arg_nodes(arg_nodes, context)?;
        self.instantiate(&class, args, (node.pos_start.copy(), node.pos_end.copy()), context)
    }

    /// `create_instance` (spec §4.3): builds a parent instance first if the
    /// class inherits, shallow-copies its instance vars in, then runs
    /// `arranque` if the class defines one.
    fn instantiate(&self, class: &Rc<ClassValue>, args: Vec<Value>, pos: (Position, Position), context: &Rc<Context>) -> Result<Value, Box<LunfardoError>> {
        let inst_env = Rc::new(RefCell::new(Environment::new(Some(class.defining_context.env.clone()))));
        let inst_context = Context::child(class.name.clone(), context.clone(), pos.0.copy(), inst_env);

        let vars = RefCell::new(HashMap::new());
        if let Some(parent) = &class.parent {
            let parent_value = self.instantiate(parent, args.clone(), (pos.0.copy(), pos.1.copy()), context)?;
            if let Value::Instance(parent_instance) = parent_value {
                vars.borrow_mut().extend(parent_instance.vars.borrow().iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }

        let instance = Rc::new(InstanceValue { class: class.clone(), vars, context: inst_context });
        if let Some(ctor) = class.find_method("arranque") {
            self.call_method(&ctor, &instance, args, pos, context)?;
        }
        Ok(Value::Instance(instance))
    }

    /// Walk a dotted access chain of instance-var reads starting at `start`.
    fn walk_chain(&self, start: Value, chain: &[SmartString], node: &Node, context: &Rc<Context>) -> Result<Value, Box<LunfardoError>> {
        let mut current = start;
        for field in chain {
            match &current {
                Value::Instance(i) => {
                    current = i.get_var(field).ok_or_else(|| {
                        Box::new(LunfardoError::AttributeError(
                            format!("'{}' no tiene el atributo '{}'", i.class.name, field),
                            node.pos_start.copy(),
                            node.pos_end.copy(),
                            context.clone(),
                        ))
                    })?;
                }
                other => {
                    return Err(Box::new(LunfardoError::AttributeError(
                        format!("'{}' no tiene atributos", other.type_name()),
                        node.pos_start.copy(),
                        node.pos_end.copy(),
                        context.clone(),
                    )))
                }
            }
        }
        Ok(current)
    }

    fn eval_method_call(
        &self,
        receiver: &Node,
        access_chain: &[SmartString],
        method: &str,
        arg_nodes: &[Node],
        node: &Node,
        context: &Rc<Context>,
    ) -> Result<Value, Box<LunfardoError>> {
        let receiver_value = self.eval(receiver, context)?;
        let target = self.walk_chain(receiver_value, access_chain, node, context)?;
        let instance = match target {
            Value::Instance(i) => i,
            other => {
                return Err(Box::new(LunfardoError::InvalidType(
                    format!("'{}' no tiene métodos", other.type_name()),
                    node.pos_start.copy(),
                    node.pos_end.copy(),
                    context.clone(),
                )))
            }
        };
        let func = instance.class.find_method(method).ok_or_else(|| {
            Box::new(LunfardoError::AttributeError(
                format!("'{}' no tiene el método '{}'", instance.class.name, method),
                node.pos_start.copy(),
                node.pos_end.copy(),
                context.clone(),
            ))
        })?;
        let args = self.eval_arg_nodes(arg_nodes, context)?;
        self.call_method(&func, &instance, args, (node.pos_start.copy(), node.pos_end.copy()), context)
    }

    fn eval_instance_var_access(&self, receiver: &Node, access_chain: &[SmartString], node: &Node, context: &Rc<Context>) -> Result<Value, Box<LunfardoError>> {
        let receiver_value = self.eval(receiver, context)?;
        self.walk_chain(receiver_value, access_chain, node, context)
    }

    fn eval_instance_var_assign(&self, receiver: &Node, name: &str, value_node: &Node, node: &Node, context: &Rc<Context>) -> Result<Value, Box<LunfardoError>> {
        let receiver_value = self.eval(receiver, context)?;
        let value = self.eval(value_node, context)?;
        match receiver_value {
            Value::Instance(i) => {
                i.set_var(name, value.clone());
                Ok(value)
            }
            other => Err(Box::new(LunfardoError::InvalidType(
                format!("'{}' no tiene atributos", other.type_name()),
                node.pos_start.copy(),
                node.pos_end.copy(),
                context.clone(),
            ))),
        }
    }

    fn eval_instance_var_access_and_assign(
        &self,
        receiver: &Node,
        access_chain: &[SmartString],
        value_node: &Node,
        node: &Node,
        context: &Rc<Context>,
    ) -> Result<Value, Box<LunfardoError>> {
        let receiver_value = self.eval(receiver, context)?;
        let (last, init) = access_chain.split_last().expect("non-empty access chain");
        let target = self.walk_chain(receiver_value, init, node, context)?;
        let value = self.eval(value_node, context)?;
        match target {
            Value::Instance(i) => {
                i.set_var(last.clone(), value.clone());
                Ok(value)
            }
            other => Err(Box::new(LunfardoError::InvalidType(
                format!("'{}' no tiene atributos", other.type_name()),
                node.pos_start.copy(),
                node.pos_end.copy(),
                context.clone(),
            ))),
        }
    }

    fn eval_raise(&self, tag: &str, message_node: &Node, node: &Node, context: &Rc<Context>) -> Result<Value, Box<LunfardoError>> {
        let message = self.eval(message_node, context)?;
        let err = LunfardoError::from_tag(tag, message.to_string(), node.pos_start.copy(), node.pos_end.copy(), context.clone())
            .ok_or_else(|| {
                Box::new(LunfardoError::InvalidValue(
                    format!("'{}' no es un tag de error válido", tag),
                    node.pos_start.copy(),
                    node.pos_end.copy(),
                    context.clone(),
                ))
            })?;
        Err(Box::new(err))
    }

    fn eval_try(&self, try_body: &Node, tag: &str, except_body: &Node, context: &Rc<Context>) -> Result<Value, Box<LunfardoError>> {
        let try_stmts = match &try_body.kind {
            NodeKind::Statements(s) => s,
            _ => unreachable!("try body is always parsed as a Statements node"),
        };
        match self.eval_sequence_last(try_stmts, context) {
            Ok(v) => Ok(v),
            Err(e) => {
                if e.tag() == Some(tag) {
                    let except_stmts = match &except_body.kind {
                        NodeKind::Statements(s) => s,
                        _ => unreachable!("except body is always parsed as a Statements node"),
                    };
                    self.eval_sequence_last(except_stmts, context)
                } else {
                    Err(e)
                }
            }
        }
    }

    /// The import mechanism (spec §4.6): builtin libraries via the registry
    /// plus an optional `.lunf` companion script, or a plain script import
    /// resolved relative to the working directory.
    fn eval_import(&self, name: &str, node: &Node, context: &Rc<Context>) -> Result<Value, Box<LunfardoError>> {
        let handler = self.libraries.get(name);
        if let Some(handler) = handler {
            let module_env = Rc::new(RefCell::new(Environment::new(Some(context.env.clone()))));
            let module_context = Context::child(SmartString::from(name), context.clone(), node.pos_start.copy(), module_env);
            handler(&module_context, node, context)?;

            let companion_path = format!("{}.lunf", name);
            if let Ok(source) = std::fs::read_to_string(&companion_path) {
                self.run_in(&companion_path, &source, &module_context)?;
            }

            let module_value = Value::Module(module_context);
            context.add_module(SmartString::from(name), module_value.clone());
            context.env.borrow_mut().set(SmartString::from(name), module_value.clone());
            return Ok(module_value);
        }

        if !self.loading_modules.borrow_mut().insert(SmartString::from(name)) {
            return Err(Box::new(LunfardoError::InvalidValue(
                format!("importación circular detectada para el módulo '{}'", name),
                node.pos_start.copy(),
                node.pos_end.copy(),
                context.clone(),
            )));
        }
        let result = self.eval_script_import(name, node, context);
        self.loading_modules.borrow_mut().remove(name);
        result
    }

    fn eval_script_import(&self, name: &str, node: &Node, context: &Rc<Context>) -> Result<Value, Box<LunfardoError>> {
        let global = self.root_context(context);
        let script_env = Rc::new(RefCell::new(Environment::new(Some(global.env.clone()))));
        let module_context = Context::child(SmartString::from(name), global, node.pos_start.copy(), script_env);

        let path = format!("{}.lunf", name);
        let source = std::fs::read_to_string(&path).map_err(|_| {
            Box::new(LunfardoError::FileNotFound(
                format!("no se encontró el módulo '{}'", name),
                node.pos_start.copy(),
                node.pos_end.copy(),
                context.clone(),
            ))
        })?;
        self.run_in(&path, &source, &module_context)?;

        let module_value = Value::Module(module_context);
        context.add_module(SmartString::from(name), module_value.clone());
        context.env.borrow_mut().set(SmartString::from(name), module_value.clone());
        Ok(module_value)
    }
}

