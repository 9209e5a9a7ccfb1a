//! `coso` (list) mutators — spec §6's list-ops group: `guardar`, `insertar`,
//! `cambiaso`, `sacar`, `extender`.

use crate::engine::Engine;
use crate::error::LunfardoError;
use crate::value::{Number, Value};

use super::{make_builtin, type_error};

fn as_list(value: &Value) -> Option<&std::rc::Rc<std::cell::RefCell<Vec<Value>>>> {
    match value {
        Value::List(l) => Some(l),
        _ => None,
    }
}

fn as_index(value: &Value) -> Option<i64> {
    match value {
        Value::Number(Number::Int(i)) => Some(*i),
        _ => None,
    }
}

pub fn register(engine: &Engine) {
    engine.set_global(
        "guardar",
        make_builtin("guardar", 2, |args, ctx, ps, pe| {
            let Some(list) = as_list(&args[0]) else { return Err(type_error("coso", &args[0], &ps, &pe, ctx)) };
            list.borrow_mut().push(args[1].clone());
            Ok(Value::Nil)
        }),
    );

    engine.set_global(
        "insertar",
        make_builtin("insertar", 3, |args, ctx, ps, pe| {
            let Some(list) = as_list(&args[0]) else { return Err(type_error("coso", &args[0], &ps, &pe, ctx)) };
            let Some(index) = as_index(&args[1]) else { return Err(type_error("numero", &args[1], &ps, &pe, ctx)) };
            let mut items = list.borrow_mut();
            let len = items.len() as i64;
            let real = if index < 0 { (index + len).max(0) } else { index }.min(len) as usize;
            items.insert(real, args[2].clone());
            Ok(Value::Nil)
        }),
    );

    engine.set_global(
        "cambiaso",
        make_builtin("cambiaso", 3, |args, ctx, ps, pe| {
            let Some(list) = as_list(&args[0]) else { return Err(type_error("coso", &args[0], &ps, &pe, ctx)) };
            let Some(index) = as_index(&args[1]) else { return Err(type_error("numero", &args[1], &ps, &pe, ctx)) };
            let mut items = list.borrow_mut();
            let len = items.len() as i64;
            let real = if index < 0 { index + len } else { index };
            if real < 0 || real >= len {
                return Err(Box::new(LunfardoError::InvalidIndex(
                    format!("elemento con el índice '{}' no pudo ser reemplazado del coso porque el índice está fuera de los límites", index),
                    ps,
                    pe,
                    ctx.clone(),
                )));
            }
            items[real as usize] = args[2].clone();
            Ok(Value::Nil)
        }),
    );

    engine.set_global(
        "sacar",
        make_builtin("sacar", 2, |args, ctx, ps, pe| {
            let Some(list) = as_list(&args[0]) else { return Err(type_error("coso", &args[0], &ps, &pe, ctx)) };
            let Some(index) = as_index(&args[1]) else { return Err(type_error("numero", &args[1], &ps, &pe, ctx)) };
            let mut items = list.borrow_mut();
            let len = items.len() as i64;
            let real = if index < 0 { index + len } else { index };
            if real < 0 || real >= len {
                return Err(Box::new(LunfardoError::InvalidIndex(
                    format!("elemento con el índice '{}' no pudo ser removido del coso porque el índice está fuera de los límites", index),
                    ps,
                    pe,
                    ctx.clone(),
                )));
            }
            Ok(items.remove(real as usize))
        }),
    );

    engine.set_global(
        "extender",
        make_builtin("extender", 2, |args, ctx, ps, pe| {
            let Some(a) = as_list(&args[0]) else { return Err(type_error("coso", &args[0], &ps, &pe, ctx)) };
            let Some(b) = as_list(&args[1]) else { return Err(type_error("coso", &args[1], &ps, &pe, ctx)) };
            let extra: Vec<Value> = b.borrow().clone();
            a.borrow_mut().extend(extra);
            Ok(Value::Nil)
        }),
    );
}
