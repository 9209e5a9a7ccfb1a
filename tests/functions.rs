use lunfardo::{Engine, LunfardoError, Value};
use pretty_assertions::assert_eq;

fn last(result: Value) -> Value {
    match result {
        Value::List(items) => items.borrow().last().cloned().unwrap_or(Value::Nil),
        other => other,
    }
}

#[test]
fn recursion_and_return() -> Result<(), Box<LunfardoError>> {
    let engine = Engine::new();
    let source = r#"
laburo fact(n)
  si n <= 1 entonces
    devolver 1
  chau
  devolver n * fact(n - 1)
chau
fact(5)
"#;
    let result = last(engine.run("<test>", source)?);
    assert_eq!(result.to_string(), "120");
    Ok(())
}

#[test]
fn auto_return_form_returns_the_inline_expression() -> Result<(), Box<LunfardoError>> {
    let engine = Engine::new();
    let source = "laburo doble(x) : x * 2\ndoble(21)";
    let result = last(engine.run("<test>", source)?);
    assert_eq!(result.to_string(), "42");
    Ok(())
}

#[test]
fn missing_required_param_fills_default() -> Result<(), Box<LunfardoError>> {
    let engine = Engine::new();
    let source = "laburo saluda(nombre = \"che\") : nombre\nsaluda()";
    let result = last(engine.run("<test>", source)?);
    assert_eq!(result.to_string(), "che");
    Ok(())
}

#[test]
fn calling_with_too_many_args_is_an_error() {
    let engine = Engine::new();
    let source = "laburo uno(x) : x\nuno(1, 2)";
    let err = engine.run("<test>", source).unwrap_err();
    assert_eq!(err.tag(), Some("bardo_de_valor"));
    assert!(err.to_string().contains("esperaba"));
}

#[test]
fn calling_with_too_few_args_is_an_error() {
    let engine = Engine::new();
    let source = "laburo dos(x, y) : x + y\ndos(1)";
    let err = engine.run("<test>", source).unwrap_err();
    assert_eq!(err.tag(), Some("bardo_de_valor"));
}

#[test]
fn closures_capture_defining_context() -> Result<(), Box<LunfardoError>> {
    let engine = Engine::new();
    let source = r#"
laburo adder(n)
  devolver laburo(x) : x + n
chau
poneleque suma5 = adder(5)
suma5(10)
"#;
    let result = last(engine.run("<test>", source)?);
    assert_eq!(result.to_string(), "15");
    Ok(())
}

#[test]
fn stray_return_outside_function_is_rejected_at_parse_time() {
    let engine = Engine::new();
    let err = engine.run("<test>", "devolver 1").unwrap_err();
    assert_eq!(err.tag(), Some("sintaxis_invalida"));
}
