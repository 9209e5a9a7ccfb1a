//! `mataburros` (dict) ops — spec §6's dict-ops group: `agarra_de`,
//! `metele_en`, `borra_de`, `existe_clave`.

use crate::engine::Engine;
use crate::error::LunfardoError;
use crate::value::Value;

use super::type_error;

use super::make_builtin;

fn as_dict(value: &Value) -> Option<&std::rc::Rc<std::cell::RefCell<crate::dict::Dict>>> {
    match value {
        Value::Dict(d) => Some(d),
        _ => None,
    }
}

fn hashable_key(value: &Value, ctx: &std::rc::Rc<crate::context::Context>, ps: &crate::token::Position, pe: &crate::token::Position) -> Result<(), Box<LunfardoError>> {
    match value {
        Value::Number(_) | Value::Str(_) | Value::Bool(_) | Value::Nil => Ok(()),
        other => Err(type_error("numero, chamuyo, nada o boloodean", other, ps, pe, ctx)),
    }
}

pub fn register(engine: &Engine) {
    engine.set_global(
        "agarra_de",
        make_builtin("agarra_de", 2, |args, ctx, ps, pe| {
            let Some(dict) = as_dict(&args[0]) else { return Err(type_error("mataburros", &args[0], &ps, &pe, ctx)) };
            hashable_key(&args[1], ctx, &ps, &pe)?;
            let found = dict.borrow().get(&args[1]).expect("key was checked hashable");
            Ok(found.unwrap_or(Value::Nil))
        }),
    );

    engine.set_global(
        "metele_en",
        make_builtin("metele_en", 3, |args, ctx, ps, pe| {
            let Some(dict) = as_dict(&args[0]) else { return Err(type_error("mataburros", &args[0], &ps, &pe, ctx)) };
            hashable_key(&args[1], ctx, &ps, &pe)?;
            dict.borrow_mut().insert(args[1].clone(), args[2].clone()).expect("key was checked hashable");
            Ok(Value::Nil)
        }),
    );

    engine.set_global(
        "borra_de",
        make_builtin("borra_de", 2, |args, ctx, ps, pe| {
            let Some(dict) = as_dict(&args[0]) else { return Err(type_error("mataburros", &args[0], &ps, &pe, ctx)) };
            hashable_key(&args[1], ctx, &ps, &pe)?;
            let removed = dict.borrow_mut().remove(&args[1]).expect("key was checked hashable");
            match removed {
                Some(_) => Ok(Value::Nil),
                None => Err(Box::new(LunfardoError::InvalidKey(
                    format!("el elemento con la clave {} no pudo ser encontrado en el mataburros", args[1]),
                    ps,
                    pe,
                    ctx.clone(),
                ))),
            }
        }),
    );

    engine.set_global(
        "existe_clave",
        make_builtin("existe_clave", 2, |args, ctx, ps, pe| {
            let Some(dict) = as_dict(&args[0]) else { return Err(type_error("mataburros", &args[0], &ps, &pe, ctx)) };
            hashable_key(&args[1], ctx, &ps, &pe)?;
            let exists = dict.borrow().contains_key(&args[1]).expect("key was checked hashable");
            Ok(if exists { Value::Bool(true) } else { Value::Nil })
        }),
    );
}
