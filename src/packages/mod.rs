//! The global symbol table (spec §6): builtins predefined in every fresh
//! `Engine`, split into files mirroring the teacher's `packages/*` layout.

pub mod coso_basic;
pub mod gualichos;
pub mod io_basic;
pub mod lacompu;
pub mod lang_core;
pub mod mataburros_basic;

use std::rc::Rc;

use smartstring::alias::String as SmartString;

use crate::context::Context;
use crate::engine::Engine;
use crate::error::LunfardoError;
use crate::token::Position;
use crate::value::{BuiltinValue, Value};

/// Wrap a host closure as a `curro`, checking its arity eagerly so every
/// builtin reports the same "expected N, got M" shape on misuse (spec §8:
/// "calling a function with too few/too many args → RTError whose message
/// includes expected vs received counts").
pub(crate) fn make_builtin(
    name: &'static str,
    arity: usize,
    func: impl Fn(&[Value], &Rc<Context>, Position, Position) -> Result<Value, Box<LunfardoError>> + 'static,
) -> Value {
    let wrapped = move |args: &[Value], ctx: &Rc<Context>, ps: Position, pe: Position| -> Result<Value, Box<LunfardoError>> {
        if args.len() != arity {
            return Err(Box::new(LunfardoError::InvalidValue(
                format!("'{}'() esperaba {} argumento(s), recibió {}", name, arity, args.len()),
                ps,
                pe,
                ctx.clone(),
            )));
        }
        func(args, ctx, ps, pe)
    };
    Value::Builtin(Rc::new(BuiltinValue { name: SmartString::from(name), func: Box::new(wrapped) }))
}

pub(crate) fn type_error(expected: &str, value: &Value, ps: &Position, pe: &Position, ctx: &Rc<Context>) -> Box<LunfardoError> {
    Box::new(LunfardoError::InvalidType(
        format!("el argumento debe ser de tipo {}, se recibió '{}'", expected, value.type_name()),
        ps.copy(),
        pe.copy(),
        ctx.clone(),
    ))
}

/// Populate a fresh `Engine`'s root environment with the full global symbol
/// table (spec §6) and register the builtin-library import whitelist
/// (`gualichos`, `lacompu`).
pub fn register_defaults(engine: &Engine) {
    lang_core::register(engine);
    io_basic::register(engine);
    coso_basic::register(engine);
    mataburros_basic::register(engine);
    engine.register_library("gualichos", Rc::new(gualichos::handler));
    engine.register_library("lacompu", Rc::new(lacompu::handler));
}
