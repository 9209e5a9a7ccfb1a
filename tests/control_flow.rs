use lunfardo::{Engine, LunfardoError, Value};
use pretty_assertions::assert_eq;

fn last(result: Value) -> Value {
    match result {
        Value::List(items) => items.borrow().last().cloned().unwrap_or(Value::Nil),
        other => other,
    }
}

#[test]
fn list_builder_via_for() -> Result<(), Box<LunfardoError>> {
    let engine = Engine::new();
    let source = r#"
poneleque xs = []
para i = 0 hasta 3 entonces
  guardar(xs, i)
chau
xs
"#;
    let result = last(engine.run("<test>", source)?);
    assert_eq!(result.to_string(), "[0, 1, 2]");
    Ok(())
}

#[test]
fn for_inline_form_collects_each_iteration() -> Result<(), Box<LunfardoError>> {
    let engine = Engine::new();
    let result = last(engine.run("<test>", "para i = 0 hasta 3 entonces i * i")?);
    assert_eq!(result.to_string(), "[0, 1, 4]");
    Ok(())
}

#[test]
fn while_loop_breaks_and_continues() -> Result<(), Box<LunfardoError>> {
    let engine = Engine::new();
    let source = r#"
poneleque x = 0
poneleque i = 0
mientras i < 10 entonces
  i = i + 1
  si x > 20 entonces
    continuar
  chau
  x = x + i
chau
x
"#;
    let result = last(engine.run("<test>", source)?);
    assert_eq!(result.to_string(), "21");
    Ok(())
}

#[test]
fn step_descends_when_negative() -> Result<(), Box<LunfardoError>> {
    let engine = Engine::new();
    let result = last(engine.run("<test>", "para i = 3 hasta 0 entre -1 entonces i")?);
    assert_eq!(result.to_string(), "[3, 2, 1]");
    Ok(())
}

#[test]
fn if_else_chain_picks_first_truthy_branch() -> Result<(), Box<LunfardoError>> {
    let engine = Engine::new();
    let source = r#"
poneleque n = 2
si n == 1 entonces
  "uno"
osi n == 2 entonces
  "dos"
sino
  "otro"
chau
"#;
    let result = last(engine.run("<test>", source)?);
    assert_eq!(result.to_string(), "dos");
    Ok(())
}

#[test]
fn list_out_of_bounds_indexing_is_an_error() {
    let engine = Engine::new();
    let err = engine.run("<test>", "[1, 2, 3] / 10").unwrap_err();
    assert_eq!(err.tag(), Some("bardo_de_indice"));
}

#[test]
fn empty_program_succeeds_with_zero_elements() -> Result<(), Box<LunfardoError>> {
    let engine = Engine::new();
    match engine.run("<test>", "")? {
        Value::List(items) => assert_eq!(items.borrow().len(), 0),
        other => panic!("expected coso, got {}", other),
    }
    Ok(())
}

#[test]
fn empty_string_literal_lexes_fine() -> Result<(), Box<LunfardoError>> {
    let engine = Engine::new();
    let result = last(engine.run("<test>", r#" "" "#)?);
    assert_eq!(result.to_string(), "");
    Ok(())
}
