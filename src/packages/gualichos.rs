//! `gualichos`: the terminal/curses façade from the import whitelist
//! (spec §6). A real terminal handle isn't something a library-level
//! module can own honestly outside an actual curses binding, so every
//! member here is a signature-only stub: it accepts the same arguments
//! the façade's methods do and returns a plausible, side-effect-free
//! value (`nada` for the screen/window mutators, a trivial default for
//! the readers) rather than touching a real terminal.

use std::rc::Rc;

use crate::context::Context;
use crate::ast::Node;
use crate::error::LunfardoError;
use crate::value::Value;

use super::make_builtin;

pub fn handler(module_context: &Rc<Context>, _import_node: &Node, _caller_context: &Rc<Context>) -> Result<(), Box<LunfardoError>> {
    let env = &module_context.env;

    let nil_builtin = |name: &'static str, arity: usize| make_builtin(name, arity, |_args, _ctx, _ps, _pe| Ok(Value::Nil));

    env.borrow_mut().set("noecho", nil_builtin("noecho", 0));
    env.borrow_mut().set("cbreak", nil_builtin("cbreak", 0));
    env.borrow_mut().set("nocbreak", nil_builtin("nocbreak", 0));
    env.borrow_mut().set("keypad", nil_builtin("keypad", 1));
    env.borrow_mut().set("echo", nil_builtin("echo", 0));
    env.borrow_mut().set("refresh", nil_builtin("refresh", 0));
    env.borrow_mut().set("erase", nil_builtin("erase", 0));
    env.borrow_mut().set("clear", nil_builtin("clear", 0));
    env.borrow_mut().set("border", nil_builtin("border", 0));
    env.borrow_mut().set("deleteln", nil_builtin("deleteln", 0));
    env.borrow_mut().set("insln", nil_builtin("insln", 0));
    env.borrow_mut().set("quit", nil_builtin("quit", 0));
    env.borrow_mut().set("addch", make_builtin("addch", 1, |_args, _ctx, _ps, _pe| Ok(Value::Nil)));
    env.borrow_mut().set("addstr", make_builtin("addstr", 1, |_args, _ctx, _ps, _pe| Ok(Value::Nil)));
    env.borrow_mut().set("insstr", make_builtin("insstr", 1, |_args, _ctx, _ps, _pe| Ok(Value::Nil)));

    env.borrow_mut().set(
        "getmaxyx",
        make_builtin("getmaxyx", 0, |_args, _ctx, _ps, _pe| {
            Ok(Value::List(Rc::new(std::cell::RefCell::new(vec![Value::int(24), Value::int(80)]))))
        }),
    );
    env.borrow_mut().set("getch", make_builtin("getch", 0, |_args, _ctx, _ps, _pe| Ok(Value::int(-1))));
    env.borrow_mut().set("getkey", make_builtin("getkey", 0, |_args, _ctx, _ps, _pe| Ok(Value::string(""))));
    env.borrow_mut().set("getstr", make_builtin("getstr", 0, |_args, _ctx, _ps, _pe| Ok(Value::string(""))));

    Ok(())
}
