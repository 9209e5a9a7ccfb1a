use lunfardo::{Engine, LunfardoError, Value};
use pretty_assertions::assert_eq;

fn last(result: Value) -> Value {
    match result {
        Value::List(items) => items.borrow().last().cloned().unwrap_or(Value::Nil),
        other => other,
    }
}

#[test]
fn try_raise_round_trip() -> Result<(), Box<LunfardoError>> {
    let engine = Engine::new();
    let source = r#"
proba
  bardea bardo_de_valor "oops"
sibardea bardo_de_valor
  42
chau
"#;
    let result = last(engine.run("<test>", source)?);
    assert_eq!(result.to_string(), "42");
    Ok(())
}

#[test]
fn mismatched_tag_repropagates() {
    let engine = Engine::new();
    let source = r#"
proba
  bardea bardo_de_valor "oops"
sibardea bardo_de_clave
  42
chau
"#;
    let err = engine.run("<test>", source).unwrap_err();
    assert_eq!(err.tag(), Some("bardo_de_valor"));
}

#[test]
fn undefined_variable_is_an_error() {
    let engine = Engine::new();
    let err = engine.run("<test>", "nunca_existi").unwrap_err();
    assert_eq!(err.tag(), Some("variable_indefinida"));
}

#[test]
fn reassigning_an_undefined_name_is_an_error() {
    let engine = Engine::new();
    let err = engine.run("<test>", "x = 1").unwrap_err();
    assert_eq!(err.tag(), Some("variable_indefinida"));
}

#[test]
fn traceback_mentions_every_frame() {
    let engine = Engine::new();
    let source = r#"
laburo interno()
  devolver 1 / 0
chau
laburo externo()
  devolver interno()
chau
externo()
"#;
    let err = engine.run("<prueba.lunf>", source).unwrap_err();
    let rendered = err.to_string();
    assert!(rendered.contains("interno"));
    assert!(rendered.contains("externo"));
}
