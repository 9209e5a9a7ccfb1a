use lunfardo::{Engine, LunfardoError, Value};
use pretty_assertions::assert_eq;

fn last(result: Value) -> Value {
    match result {
        Value::List(items) => items.borrow().last().cloned().unwrap_or(Value::Nil),
        other => other,
    }
}

#[test]
fn builtin_library_stub_is_importable_and_callable() -> Result<(), Box<LunfardoError>> {
    let engine = Engine::new();
    let source = r#"
importar lacompu
getcwd()
"#;
    let result = last(engine.run("<test>", source)?);
    assert!(matches!(result, Value::Str(_)));
    Ok(())
}

#[test]
fn imported_module_binds_to_its_own_name() -> Result<(), Box<LunfardoError>> {
    let engine = Engine::new();
    let source = r#"
importar lacompu
es_num(lacompu)
"#;
    let result = last(engine.run("<test>", source)?);
    assert_eq!(result.to_string(), "trucho");
    Ok(())
}

#[test]
fn unknown_import_name_is_a_file_not_found_error() {
    let engine = Engine::new();
    let err = engine.run("<test>", "importar nunca_jamas_existe").unwrap_err();
    assert_eq!(err.tag(), Some("archivo_no_encontrado"));
}

#[test]
fn gualichos_stub_accepts_its_own_signatures() -> Result<(), Box<LunfardoError>> {
    let engine = Engine::new();
    let source = r#"
importar gualichos
getmaxyx()
"#;
    let result = last(engine.run("<test>", source)?);
    match result {
        Value::List(items) => assert_eq!(items.borrow().len(), 2),
        other => panic!("expected coso, got {}", other),
    }
    Ok(())
}
