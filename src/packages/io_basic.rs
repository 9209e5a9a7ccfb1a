//! `matear` (print) and `morfar` (input) — spec §6's I/O group.

use std::io::{self, Write};

use crate::engine::Engine;
use crate::error::LunfardoError;
use crate::value::Value;

use super::make_builtin;

pub fn register(engine: &Engine) {
    engine.set_global(
        "matear",
        make_builtin("matear", 1, |args, _ctx, _ps, _pe| {
            match &args[0] {
                Value::Nil => println!(),
                other => println!("{}", other),
            }
            Ok(Value::Nil)
        }),
    );

    engine.set_global(
        "morfar",
        make_builtin("morfar", 1, |args, ctx, ps, pe| {
            if let Value::Str(prefix) = &args[0] {
                print!("{}", prefix);
                io::stdout().flush().map_err(|e| {
                    Box::new(LunfardoError::InvalidValue(format!("no se pudo escribir en la salida estándar: {}", e), ps.copy(), pe.copy(), ctx.clone()))
                })?;
            }
            let mut line = String::new();
            io::stdin().read_line(&mut line).map_err(|e| {
                Box::new(LunfardoError::InvalidValue(format!("no se pudo leer de la entrada estándar: {}", e), ps, pe, ctx.clone()))
            })?;
            if line.ends_with('\n') {
                line.pop();
                if line.ends_with('\r') {
                    line.pop();
                }
            }
            Ok(Value::string(line))
        }),
    );
}
