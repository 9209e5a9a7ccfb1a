use lunfardo::{Engine, LunfardoError, Value};
use pretty_assertions::assert_eq;

fn last(result: Value) -> Value {
    match result {
        Value::List(items) => items.borrow().last().cloned().unwrap_or(Value::Nil),
        other => other,
    }
}

#[test]
fn class_with_inheritance_and_constructor() -> Result<(), Box<LunfardoError>> {
    let engine = Engine::new();
    let source = r#"
cheto A
  laburo arranque(mi) ; mi.x = 1 chau
  laburo v(mi) ; devolver mi.x chau
chau
cheto B hereda A
  laburo arranque(mi) ; mi.x = 2 chau
chau
poneleque b = nuevo B()
b.v()
"#;
    let result = last(engine.run("<test>", source)?);
    assert_eq!(result.to_string(), "2");
    Ok(())
}

#[test]
fn child_without_own_constructor_runs_parent_arranque() -> Result<(), Box<LunfardoError>> {
    let engine = Engine::new();
    let source = r#"
cheto A
  laburo arranque(mi) ; mi.x = 9 chau
  laburo v(mi) ; devolver mi.x chau
chau
cheto B hereda A
chau
poneleque b = nuevo B()
b.v()
"#;
    let result = last(engine.run("<test>", source)?);
    assert_eq!(result.to_string(), "9");
    Ok(())
}

#[test]
fn instance_var_roundtrips_through_access_and_assign() -> Result<(), Box<LunfardoError>> {
    let engine = Engine::new();
    let source = r#"
cheto Caja
  laburo arranque(mi) ; mi.valor = 0 chau
chau
poneleque c = nuevo Caja()
c.valor = 7
c.valor
"#;
    let result = last(engine.run("<test>", source)?);
    assert_eq!(result.to_string(), "7");
    Ok(())
}
