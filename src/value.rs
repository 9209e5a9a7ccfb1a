//! The runtime value domain (spec §3/§4.3): tagged variants with
//! arithmetic/comparison/logical/container operations, each returning
//! `(Option<Value>, Option<LunfardoError>)`-shaped results collapsed into
//! `Result<Value, Box<LunfardoError>>` the Rust way.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use smartstring::alias::String as SmartString;

use crate::ast::Node;
use crate::context::Context;
use crate::dict::Dict;
use crate::error::LunfardoError;
use crate::token::Position;

/// A Lunfardo number: integers stay integers unless an operation forces a
/// float (division that isn't exact, or explicit float literals/results).
#[derive(Clone, Copy, Debug)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        use num_traits::ToPrimitive;
        match self {
            Number::Int(i) => i.to_f64().unwrap_or(f64::NAN),
            Number::Float(f) => f,
        }
    }

    pub fn is_zero(self) -> bool {
        use num_traits::Zero;
        match self {
            Number::Int(i) => i.is_zero(),
            Number::Float(f) => f.is_zero(),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(x) => write!(f, "{}", x),
        }
    }
}

/// A user-defined function (`laburo`): closure over its defining context.
pub struct FuncValue {
    pub name: SmartString,
    pub params: Vec<FuncParam>,
    pub body: Rc<Node>,
    pub auto_return: bool,
    pub is_method: bool,
    pub defining_context: RefCell<Option<Rc<Context>>>,
}

/// A bound parameter: name plus its pre-evaluated default (spec: "defaults
/// are evaluated once at function-definition time").
pub struct FuncParam {
    pub name: SmartString,
    pub default: Option<Value>,
}

impl FuncParam {
    pub fn required(name: impl Into<SmartString>) -> Self {
        Self { name: name.into(), default: None }
    }
}

/// A host-implemented built-in (`curro`).
pub struct BuiltinValue {
    pub name: SmartString,
    #[allow(clippy::type_complexity)]
    pub func: Box<dyn Fn(&[Value], &Rc<Context>, Position, Position) -> Result<Value, Box<LunfardoError>>>,
}

/// A class definition (`cheto`).
pub struct ClassValue {
    pub name: SmartString,
    pub methods: HashMap<SmartString, Rc<FuncValue>>,
    pub defining_context: Rc<Context>,
    pub parent: Option<Rc<ClassValue>>,
}

impl ClassValue {
    /// Look up a method on this class, then up the inheritance chain.
    pub fn find_method(&self, name: &str) -> Option<Rc<FuncValue>> {
        self.methods.get(name).cloned().or_else(|| self.parent.as_ref().and_then(|p| p.find_method(name)))
    }
}

/// A class instance (`cheto instance`). Owns its instance-var map
/// exclusively; shares the class's method map by reference.
pub struct InstanceValue {
    pub class: Rc<ClassValue>,
    pub vars: RefCell<HashMap<SmartString, Value>>,
    pub context: Rc<Context>,
}

impl InstanceValue {
    pub fn get_var(&self, name: &str) -> Option<Value> {
        self.vars.borrow().get(name).cloned()
    }

    pub fn set_var(&self, name: impl Into<SmartString>, value: Value) {
        self.vars.borrow_mut().insert(name.into(), value);
    }
}

/// The runtime value domain. Containers and callables are reference-shared
/// (`Rc`); scalars are owned plainly. `pos_start`/`pos_end` track the source
/// span that produced this value (spec invariant), rebound after every
/// construction via [`Value::at`].
#[derive(Clone)]
pub enum Value {
    Number(Number),
    Str(Rc<str>),
    Bool(bool),
    Nil,
    List(Rc<RefCell<Vec<Value>>>),
    Dict(Rc<RefCell<Dict>>),
    Function(Rc<FuncValue>),
    Builtin(Rc<BuiltinValue>),
    Class(Rc<ClassValue>),
    Instance(Rc<InstanceValue>),
    /// An imported module, exposing the module's own top-level environment.
    Module(Rc<Context>),
}

impl Value {
    pub fn int(v: i64) -> Self {
        Value::Number(Number::Int(v))
    }

    pub fn float(v: f64) -> Self {
        Value::Number(Number::Float(v))
    }

    pub fn string(s: impl Into<Rc<str>>) -> Self {
        Value::Str(s.into())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "numero",
            Value::Str(_) => "chamuyo",
            Value::Bool(_) => "boloodean",
            Value::Nil => "nada",
            Value::List(_) => "coso",
            Value::Dict(_) => "mataburros",
            Value::Function(_) => "laburo",
            Value::Builtin(_) => "curro",
            Value::Class(_) => "cheto",
            Value::Instance(_) => "instancia",
            Value::Module(_) => "modulo",
        }
    }

    pub fn is_true(&self) -> bool {
        match self {
            Value::Number(n) => !n.is_zero(),
            Value::Str(s) => !s.is_empty(),
            Value::Bool(b) => *b,
            Value::Nil => false,
            Value::List(l) => !l.borrow().is_empty(),
            Value::Dict(d) => !d.borrow().is_empty(),
            Value::Function(_) | Value::Builtin(_) | Value::Class(_) | Value::Instance(_) | Value::Module(_) => true,
        }
    }

    /// Shallow duplicate for rebinding position without mutating the
    /// original. Containers/callables keep sharing their `Rc` payload.
    pub fn copy(&self) -> Self {
        self.clone()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", if *b { "posta" } else { "trucho" }),
            Value::Nil => write!(f, "nada"),
            Value::List(l) => {
                write!(f, "[")?;
                for (i, v) in l.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            Value::Dict(d) => write!(f, "{}", d.borrow()),
            Value::Function(func) => write!(f, "<laburo {}>", func.name),
            Value::Builtin(b) => write!(f, "<curro {}>", b.name),
            Value::Class(c) => write!(f, "<cheto {}>", c.name),
            Value::Instance(i) => write!(f, "<instancia de {}>", i.class.name),
            Value::Module(c) => write!(f, "<modulo {}>", c.display_name),
        }
    }
}

/// Hand-written: `BuiltinValue::func` is a boxed closure, which isn't
/// `Debug`, so this can't be derived. Every variant prints enough to tell
/// values apart in a test failure without recursing into non-`Debug`
/// runtime state (`Context`, `Environment`).
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Value::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Nil => write!(f, "Nil"),
            Value::List(l) => f.debug_tuple("List").field(&l.borrow().len()).finish(),
            Value::Dict(d) => f.debug_tuple("Dict").field(&d.borrow().len()).finish(),
            Value::Function(func) => f.debug_tuple("Function").field(&func.name).finish(),
            Value::Builtin(b) => f.debug_tuple("Builtin").field(&b.name).finish(),
            Value::Class(c) => f.debug_tuple("Class").field(&c.name).finish(),
            Value::Instance(i) => f.debug_tuple("Instance").field(&i.class.name).finish(),
            Value::Module(c) => f.debug_tuple("Module").field(&c.display_name).finish(),
        }
    }
}

fn illegal_op(op: &str, left: &Value, right: &Value, pos_start: Position, pos_end: Position, context: &Rc<Context>) -> Box<LunfardoError> {
    Box::new(LunfardoError::InvalidType(
        format!("Operación Ilegal: '{}' no soporta {} con '{}'", left.type_name(), op, right.type_name()),
        pos_start,
        pos_end,
        context.clone(),
    ))
}

macro_rules! numeric_binop {
    ($name:ident, $op:tt, $opname:expr) => {
        pub fn $name(left: &Value, right: &Value, ps: Position, pe: Position, ctx: &Rc<Context>) -> Result<Value, Box<LunfardoError>> {
            match (left, right) {
                (Value::Number(Number::Int(a)), Value::Number(Number::Int(b))) => Ok(Value::int(a $op b)),
                (Value::Number(a), Value::Number(b)) => Ok(Value::float(a.as_f64() $op b.as_f64())),
                _ => Err(illegal_op($opname, left, right, ps, pe, ctx)),
            }
        }
    };
}

numeric_binop!(add, +, "suma");
numeric_binop!(sub, -, "resta");
numeric_binop!(mul, *, "multiplicación");

/// Dispatch table for `BinOp`: `+ − * / ^ == != < > <= >= y o` plus the
/// `List`/`Dict` overloads spec'd in §4.3. Kept as one central function so
/// the `/` overload (number division vs. list indexing) stays in one place
/// per the design note in spec §9.
pub fn binary_op(op: &str, left: &Value, right: &Value, ps: Position, pe: Position, ctx: &Rc<Context>) -> Result<Value, Box<LunfardoError>> {
    match op {
        "+" => match (left, right) {
            (Value::Number(_), Value::Number(_)) => add(left, right, ps, pe, ctx),
            (Value::Str(a), Value::Str(b)) => Ok(Value::string(format!("{}{}", a, b))),
            (Value::List(a), Value::List(b)) => {
                let mut out = a.borrow().clone();
                out.extend(b.borrow().iter().cloned());
                Ok(Value::List(Rc::new(RefCell::new(out))))
            }
            _ => Err(illegal_op("suma", left, right, ps, pe, ctx)),
        },
        "-" => match (left, right) {
            (Value::Number(_), Value::Number(_)) => sub(left, right, ps, pe, ctx),
            (Value::List(a), Value::Number(Number::Int(idx))) => {
                let mut out = a.borrow().clone();
                let i = *idx;
                let len = out.len() as i64;
                let real = if i < 0 { i + len } else { i };
                if real < 0 || real >= len {
                    return Err(Box::new(LunfardoError::InvalidIndex(
                        format!("el índice {} está fuera de rango (longitud {})", i, len),
                        ps,
                        pe,
                        ctx.clone(),
                    )));
                }
                out.remove(real as usize);
                Ok(Value::List(Rc::new(RefCell::new(out))))
            }
            (Value::List(a), Value::List(b)) => {
                let mut out = a.borrow().clone();
                for item in b.borrow().iter() {
                    if let Some(pos) = out.iter().position(|v| values_equal(v, item)) {
                        out.remove(pos);
                    }
                }
                Ok(Value::List(Rc::new(RefCell::new(out))))
            }
            _ => Err(illegal_op("resta", left, right, ps, pe, ctx)),
        },
        "*" => match (left, right) {
            (Value::Number(_), Value::Number(_)) => mul(left, right, ps, pe, ctx),
            (Value::Str(s), Value::Number(Number::Int(n))) if *n >= 0 => Ok(Value::string(s.repeat(*n as usize))),
            (Value::List(a), Value::Number(Number::Int(n))) if *n >= 0 => {
                let base = a.borrow();
                let mut out = Vec::with_capacity(base.len() * (*n as usize));
                for _ in 0..*n {
                    out.extend(base.iter().cloned());
                }
                Ok(Value::List(Rc::new(RefCell::new(out))))
            }
            _ => Err(illegal_op("multiplicación", left, right, ps, pe, ctx)),
        },
        "/" => match (left, right) {
            (Value::Number(_), Value::Number(b)) => {
                if b.is_zero() {
                    return Err(Box::new(LunfardoError::ZeroDivision(
                        "división por cero".into(),
                        ps,
                        pe,
                        ctx.clone(),
                    )));
                }
                let Value::Number(a) = left else { unreachable!() };
                match (a, b) {
                    (Number::Int(x), Number::Int(y)) if x % y == 0 => Ok(Value::int(x / y)),
                    _ => Ok(Value::float(a.as_f64() / b.as_f64())),
                }
            }
            (Value::List(a), Value::Number(Number::Int(idx))) => {
                let items = a.borrow();
                let len = items.len() as i64;
                let real = if *idx < 0 { idx + len } else { *idx };
                if real < 0 || real >= len {
                    return Err(Box::new(LunfardoError::InvalidIndex(
                        format!("el índice {} está fuera de rango (longitud {})", idx, len),
                        ps,
                        pe,
                        ctx.clone(),
                    )));
                }
                Ok(items[real as usize].clone())
            }
            _ => Err(illegal_op("división", left, right, ps, pe, ctx)),
        },
        "^" => match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::float(a.as_f64().powf(b.as_f64()))),
            _ => Err(illegal_op("potencia", left, right, ps, pe, ctx)),
        },
        "==" => Ok(Value::Bool(values_equal(left, right))),
        "!=" => Ok(Value::Bool(!values_equal(left, right))),
        "<" | ">" | "<=" | ">=" => compare(op, left, right, ps, pe, ctx),
        "y" => Ok(Value::Bool(left.is_true() && right.is_true())),
        "o" => Ok(Value::Bool(left.is_true() || right.is_true())),
        _ => unreachable!("unknown binary operator {op}"),
    }
}

fn compare(op: &str, left: &Value, right: &Value, ps: Position, pe: Position, ctx: &Rc<Context>) -> Result<Value, Box<LunfardoError>> {
    let (a, b) = match (left, right) {
        (Value::Number(a), Value::Number(b)) => (a.as_f64(), b.as_f64()),
        _ => return Err(illegal_op("comparación", left, right, ps, pe, ctx)),
    };
    Ok(Value::Bool(match op {
        "<" => a < b,
        ">" => a > b,
        "<=" => a <= b,
        ">=" => a >= b,
        _ => unreachable!(),
    }))
}

/// Unary negation and `truchar` (logical not).
pub fn unary_op(op: &str, value: &Value, ps: Position, pe: Position, ctx: &Rc<Context>) -> Result<Value, Box<LunfardoError>> {
    match op {
        "-" => match value {
            Value::Number(Number::Int(i)) => Ok(Value::int(-i)),
            Value::Number(Number::Float(f)) => Ok(Value::float(-f)),
            _ => Err(illegal_op("negación", value, value, ps, pe, ctx)),
        },
        "truchar" => Ok(Value::Bool(!value.is_true())),
        _ => unreachable!("unknown unary operator {op}"),
    }
}

/// Structural equality, used by `==`/`!=` and as the dict key-equality
/// predicate. Singletons compare sound: `nada == nada`, `posta == posta`.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Nil, Value::Nil) => true,
        (Value::Number(_), Value::Str(_)) | (Value::Str(_), Value::Number(_)) => false,
        (Value::List(x), Value::List(y)) => {
            let xs = x.borrow();
            let ys = y.borrow();
            xs.len() == ys.len() && xs.iter().zip(ys.iter()).all(|(a, b)| values_equal(a, b))
        }
        (Value::Instance(x), Value::Instance(y)) => Rc::ptr_eq(x, y),
        (Value::Class(x), Value::Class(y)) => Rc::ptr_eq(x, y),
        (Value::Function(x), Value::Function(y)) => Rc::ptr_eq(x, y),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_preserves_equality_for_scalars() {
        for v in [Value::int(5), Value::float(2.5), Value::string("che"), Value::Bool(true), Value::Nil] {
            assert!(values_equal(&v, &v.copy()));
        }
    }

    #[test]
    fn copy_preserves_equality_for_list() {
        let list = Value::List(Rc::new(RefCell::new(vec![Value::int(1), Value::int(2)])));
        assert!(values_equal(&list, &list.copy()));
    }

    #[test]
    fn boolean_singletons_compare_sound() {
        assert!(values_equal(&Value::Bool(true), &Value::Bool(true)));
        assert!(values_equal(&Value::Bool(false), &Value::Bool(false)));
        assert!(!values_equal(&Value::Bool(true), &Value::Bool(false)));
    }

    #[test]
    fn division_promotes_to_float_only_when_inexact() {
        let ctx = Context::root("<test>", None, None);
        let ps = Position::new(Rc::from("<test>"), Rc::from(""));
        let pe = ps.copy();
        let exact = binary_op("/", &Value::int(6), &Value::int(3), ps.copy(), pe.copy(), &ctx).unwrap();
        assert!(matches!(exact, Value::Number(Number::Int(2))));
        let inexact = binary_op("/", &Value::int(7), &Value::int(2), ps, pe, &ctx).unwrap();
        assert!(matches!(inexact, Value::Number(Number::Float(f)) if f == 3.5));
    }

    #[test]
    fn division_by_zero_errors() {
        let ctx = Context::root("<test>", None, None);
        let ps = Position::new(Rc::from("<test>"), Rc::from(""));
        let pe = ps.copy();
        let err = binary_op("/", &Value::int(1), &Value::int(0), ps, pe, &ctx);
        assert!(matches!(*err.unwrap_err(), LunfardoError::ZeroDivision(..)));
    }
}
