use lunfardo::{Engine, LunfardoError, Value};
use pretty_assertions::assert_eq;

fn last(result: Value) -> Value {
    match result {
        Value::List(items) => items.borrow().last().cloned().unwrap_or(Value::Nil),
        other => other,
    }
}

#[test]
fn dict_overwrite_and_delete() -> Result<(), Box<LunfardoError>> {
    let engine = Engine::new();
    let source = r#"
poneleque d = {"a": 1, "a": 2}
borra_de(d, "a")
existe_clave(d, "a")
"#;
    let result = last(engine.run("<test>", source)?);
    assert_eq!(result.to_string(), "nada");
    Ok(())
}

#[test]
fn dict_round_trip_get_after_set() -> Result<(), Box<LunfardoError>> {
    let engine = Engine::new();
    let source = r#"
poneleque d = {}
metele_en(d, "k", 99)
agarra_de(d, "k")
"#;
    let result = last(engine.run("<test>", source)?);
    assert_eq!(result.to_string(), "99");
    Ok(())
}

#[test]
fn borra_de_errors_when_key_absent() {
    let engine = Engine::new();
    let err = engine.run("<test>", r#"poneleque d = {}
borra_de(d, "ausente")"#).unwrap_err();
    assert_eq!(err.tag(), Some("bardo_de_clave"));
}

#[test]
fn list_mutators_cover_guardar_insertar_cambiaso_sacar_extender() -> Result<(), Box<LunfardoError>> {
    let engine = Engine::new();
    let source = r#"
poneleque xs = [1, 2, 3]
guardar(xs, 4)
insertar(xs, 0, 0)
cambiaso(xs, 1, 99)
sacar(xs, 0)
extender(xs, [5, 6])
xs
"#;
    let result = last(engine.run("<test>", source)?);
    assert_eq!(result.to_string(), "[99, 2, 3, 4, 5, 6]");
    Ok(())
}

#[test]
fn cambiaso_out_of_bounds_errors() {
    let engine = Engine::new();
    let err = engine.run("<test>", "poneleque xs = [1]\ncambiaso(xs, 5, 0)").unwrap_err();
    assert_eq!(err.tag(), Some("bardo_de_indice"));
}

#[test]
fn longitud_covers_chamuyo_coso_and_mataburros() -> Result<(), Box<LunfardoError>> {
    let engine = Engine::new();
    assert_eq!(last(engine.run("<test>", "longitud(\"hola\")")?).to_string(), "4");
    assert_eq!(last(engine.run("<test>", "longitud([1, 2, 3])")?).to_string(), "3");
    assert_eq!(last(engine.run("<test>", "longitud({\"a\": 1, \"b\": 2})")?).to_string(), "2");
    Ok(())
}

#[test]
fn type_predicates_and_conversions() -> Result<(), Box<LunfardoError>> {
    let engine = Engine::new();
    assert_eq!(last(engine.run("<test>", "es_num(5)")?).to_string(), "posta");
    assert_eq!(last(engine.run("<test>", "es_chamu(5)")?).to_string(), "trucho");
    assert_eq!(last(engine.run("<test>", "chamu(5)")?).to_string(), "5");
    assert_eq!(last(engine.run("<test>", "num(\"42\")")?).to_string(), "42");
    Ok(())
}
