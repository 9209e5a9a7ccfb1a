//! `lacompu`: the OS façade from the import whitelist (spec §6). The
//! read-only accessors (`getcwd`, `sep`, `pathsep`, `curdir`, `pardir`,
//! `name`, `environ`, `getenv`, `listdir`) are trivial and side-effect-free,
//! so they're backed by the real `std::env`/`std::path`/`std::fs` calls.
//! The mutators (`chdir`, `mkdir`, `makedirs`, `remove`, `rmdir`,
//! `rename`, `system`) stay signature-only stubs returning `nada`,
//! matching the spec's note that this module owns a signature contract,
//! not a sanctioned way for scripts to touch the host filesystem.

use std::rc::Rc;

use crate::ast::Node;
use crate::context::Context;
use crate::dict::Dict;
use crate::error::LunfardoError;
use crate::value::Value;

use super::{make_builtin, type_error};

pub fn handler(module_context: &Rc<Context>, _import_node: &Node, _caller_context: &Rc<Context>) -> Result<(), Box<LunfardoError>> {
    let env = &module_context.env;

    let mut environ = Dict::new();
    for (key, value) in std::env::vars() {
        environ.insert(Value::string(key), Value::string(value)).expect("string keys are always hashable");
    }
    env.borrow_mut().set("environ", Value::Dict(Rc::new(std::cell::RefCell::new(environ))));

    env.borrow_mut().set("name", Value::string(std::env::consts::OS));
    env.borrow_mut().set("sep", Value::string(std::path::MAIN_SEPARATOR.to_string()));
    env.borrow_mut().set("pathsep", Value::string(if cfg!(windows) { ";" } else { ":" }));
    env.borrow_mut().set("curdir", Value::string("."));
    env.borrow_mut().set("pardir", Value::string(".."));

    env.borrow_mut().set(
        "getcwd",
        make_builtin("getcwd", 0, |_args, ctx, ps, pe| {
            let cwd = std::env::current_dir().map_err(|e| {
                Box::new(LunfardoError::InvalidValue(format!("no se pudo obtener el directorio actual: {}", e), ps.copy(), pe.copy(), ctx.clone()))
            })?;
            Ok(Value::string(cwd.to_string_lossy().into_owned()))
        }),
    );

    env.borrow_mut().set(
        "getenv",
        make_builtin("getenv", 1, |args, ctx, ps, pe| {
            let Value::Str(key) = &args[0] else { return Err(type_error("chamuyo", &args[0], &ps, &pe, ctx)) };
            Ok(match std::env::var(key.as_ref()) {
                Ok(value) => Value::string(value),
                Err(_) => Value::Nil,
            })
        }),
    );

    env.borrow_mut().set(
        "listdir",
        make_builtin("listdir", 1, |args, ctx, ps, pe| {
            let Value::Str(path) = &args[0] else { return Err(type_error("chamuyo", &args[0], &ps, &pe, ctx)) };
            let entries = std::fs::read_dir(path.as_ref()).map_err(|e| {
                Box::new(LunfardoError::FileNotFound(format!("no pudimos listar '{}': {}", path, e), ps.copy(), pe.copy(), ctx.clone()))
            })?;
            let mut names = Vec::new();
            for entry in entries {
                let entry = entry.map_err(|e| {
                    Box::new(LunfardoError::InvalidValue(format!("no se pudo leer una entrada del directorio: {}", e), ps.copy(), pe.copy(), ctx.clone()))
                })?;
                names.push(Value::string(entry.file_name().to_string_lossy().into_owned()));
            }
            Ok(Value::List(Rc::new(std::cell::RefCell::new(names))))
        }),
    );

    env.borrow_mut().set("chdir", make_builtin("chdir", 1, |_args, _ctx, _ps, _pe| Ok(Value::Nil)));
    env.borrow_mut().set("mkdir", make_builtin("mkdir", 1, |_args, _ctx, _ps, _pe| Ok(Value::Nil)));
    env.borrow_mut().set("makedirs", make_builtin("makedirs", 2, |_args, _ctx, _ps, _pe| Ok(Value::Nil)));
    env.borrow_mut().set("remove", make_builtin("remove", 1, |_args, _ctx, _ps, _pe| Ok(Value::Nil)));
    env.borrow_mut().set("rmdir", make_builtin("rmdir", 1, |_args, _ctx, _ps, _pe| Ok(Value::Nil)));
    env.borrow_mut().set("rename", make_builtin("rename", 2, |_args, _ctx, _ps, _pe| Ok(Value::Nil)));
    env.borrow_mut().set("system", make_builtin("system", 1, |_args, _ctx, _ps, _pe| Ok(Value::int(0))));

    Ok(())
}
