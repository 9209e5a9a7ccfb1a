use lunfardo::{Engine, LunfardoError, Number, Value};
use pretty_assertions::assert_eq;

fn last(result: Value) -> Value {
    match result {
        Value::List(items) => items.borrow().last().cloned().unwrap_or(Value::Nil),
        other => other,
    }
}

#[test]
fn arithmetic_precedence() -> Result<(), Box<LunfardoError>> {
    let engine = Engine::new();
    let result = last(engine.run("<test>", "2 + 3 * 4")?);
    assert!(matches!(result, Value::Number(Number::Int(14))));
    Ok(())
}

#[test]
fn power_is_right_of_term() -> Result<(), Box<LunfardoError>> {
    let engine = Engine::new();
    let result = last(engine.run("<test>", "2 ^ 3 + 1")?);
    assert_eq!(result.to_string(), "9");
    Ok(())
}

#[test]
fn integer_division_stays_integer_when_exact() -> Result<(), Box<LunfardoError>> {
    let engine = Engine::new();
    let result = last(engine.run("<test>", "6 / 3")?);
    assert!(matches!(result, Value::Number(Number::Int(2))));
    Ok(())
}

#[test]
fn division_by_zero_is_an_error() {
    let engine = Engine::new();
    let err = engine.run("<test>", "1 / 0").unwrap_err();
    assert_eq!(err.tag(), Some("division_por_cero"));
}

#[test]
fn list_times_n_has_expected_length() -> Result<(), Box<LunfardoError>> {
    let engine = Engine::new();
    let result = last(engine.run("<test>", "[1, 2] * 3")?);
    match result {
        Value::List(items) => assert_eq!(items.borrow().len(), 6),
        other => panic!("expected coso, got {}", other),
    }
    Ok(())
}

#[test]
fn list_plus_list_concatenates_lengths() -> Result<(), Box<LunfardoError>> {
    let engine = Engine::new();
    let result = last(engine.run("<test>", "[1, 2] + [3, 4, 5]")?);
    match result {
        Value::List(items) => assert_eq!(items.borrow().len(), 5),
        other => panic!("expected coso, got {}", other),
    }
    Ok(())
}
