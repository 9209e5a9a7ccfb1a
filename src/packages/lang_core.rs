//! `nada`/`posta`/`trucho`, type predicates, conversions, and the
//! odds-and-ends builtins (`limpiavidrios`, `longitud`, `ejecutar`,
//! `renuncio`, `contexto`, `asciiAchamu`) — spec §6's "misc" group.

use std::process;

use crate::dict::Dict;
use crate::engine::Engine;
use crate::error::LunfardoError;
use crate::value::Value;

use super::{make_builtin, type_error};

pub fn register(engine: &Engine) {
    engine.set_global("nada", Value::Nil);
    engine.set_global("posta", Value::Bool(true));
    engine.set_global("trucho", Value::Bool(false));

    engine.set_global(
        "es_num",
        make_builtin("es_num", 1, |args, _ctx, _ps, _pe| Ok(Value::Bool(matches!(args[0], Value::Number(_))))),
    );
    engine.set_global(
        "es_chamu",
        make_builtin("es_chamu", 1, |args, _ctx, _ps, _pe| Ok(Value::Bool(matches!(args[0], Value::Str(_))))),
    );
    engine.set_global(
        "es_coso",
        make_builtin("es_coso", 1, |args, _ctx, _ps, _pe| Ok(Value::Bool(matches!(args[0], Value::List(_))))),
    );
    engine.set_global(
        "es_laburo",
        make_builtin("es_laburo", 1, |args, _ctx, _ps, _pe| {
            Ok(Value::Bool(matches!(args[0], Value::Function(_) | Value::Builtin(_))))
        }),
    );
    engine.set_global(
        "es_mataburros",
        make_builtin("es_mataburros", 1, |args, _ctx, _ps, _pe| Ok(Value::Bool(matches!(args[0], Value::Dict(_))))),
    );

    engine.set_global(
        "chamu",
        make_builtin("chamu", 1, |args, _ctx, _ps, _pe| Ok(Value::string(args[0].to_string()))),
    );

    engine.set_global(
        "num",
        make_builtin("num", 1, |args, ctx, ps, pe| match &args[0] {
            Value::Number(n) => Ok(Value::Number(*n)),
            Value::Str(s) => {
                if let Ok(i) = s.parse::<i64>() {
                    Ok(Value::int(i))
                } else if let Ok(f) = s.parse::<f64>() {
                    Ok(Value::float(f))
                } else {
                    Err(Box::new(LunfardoError::InvalidValue(
                        format!("literal inválido para 'num()' con base 10: '{}'", s),
                        ps,
                        pe,
                        ctx.clone(),
                    )))
                }
            }
            other => Err(type_error("chamuyo o numero", other, &ps, &pe, ctx)),
        }),
    );

    engine.set_global(
        "limpiavidrios",
        make_builtin("limpiavidrios", 0, |_args, _ctx, _ps, _pe| Ok(Value::Nil)),
    );

    engine.set_global(
        "longitud",
        make_builtin("longitud", 1, |args, ctx, ps, pe| match &args[0] {
            Value::Str(s) => Ok(Value::int(s.chars().count() as i64)),
            Value::List(l) => Ok(Value::int(l.borrow().len() as i64)),
            Value::Dict(d) => Ok(Value::int(d.borrow().len() as i64)),
            other => Err(type_error("coso, chamuyo o mataburros", other, &ps, &pe, ctx)),
        }),
    );

    engine.set_global(
        "asciiAchamu",
        make_builtin("asciiAchamu", 1, |args, ctx, ps, pe| match &args[0] {
            Value::Number(n) => {
                let code = n.as_f64() as u32;
                match char::from_u32(code) {
                    Some(c) => Ok(Value::string(c.to_string())),
                    None => Err(Box::new(LunfardoError::InvalidValue(
                        format!("'{}' no es un código ascii válido", code),
                        ps,
                        pe,
                        ctx.clone(),
                    ))),
                }
            }
            other => Err(type_error("numero", other, &ps, &pe, ctx)),
        }),
    );

    engine.set_global(
        "contexto",
        make_builtin("contexto", 1, |args, ctx, ps, pe| {
            let local = match &args[0] {
                Value::Bool(b) => *b,
                other => return Err(type_error("boloodean", other, &ps, &pe, ctx)),
            };
            let target = if local { ctx.clone() } else { crate::context::Context::root_of(ctx) };
            let mut dict = Dict::new();
            for (name, value) in target.env.borrow().snapshot() {
                dict.insert(Value::string(&*name), value).expect("string keys are always hashable");
            }
            Ok(Value::Dict(std::rc::Rc::new(std::cell::RefCell::new(dict))))
        }),
    );

    engine.set_global("renuncio", make_builtin("renuncio", 0, |_args, _ctx, _ps, _pe| process::exit(0)));

    let handle = engine.handle();
    engine.set_global(
        "ejecutar",
        make_builtin("ejecutar", 1, move |args, ctx, ps, pe| {
            let Value::Str(path) = &args[0] else {
                return Err(type_error("chamuyo", &args[0], &ps, &pe, ctx));
            };
            let source = std::fs::read_to_string(path.as_ref()).map_err(|_| {
                Box::new(LunfardoError::FileNotFound(
                    format!("no pudimos abrir el archivo '{}', no existe", path),
                    ps.copy(),
                    pe.copy(),
                    ctx.clone(),
                ))
            })?;
            let engine = handle.upgrade().expect("engine outlives its own builtins");
            engine.run_in(path.as_ref(), &source, ctx)?;
            Ok(Value::Nil)
        }),
    );
}
