use super::*;

fn runtime() -> Runtime {
    Runtime::new(1e-6)
}

#[test]
fn assignments_are_queued_in_order() {
    let mut rt = runtime();
    rt.declare("a", VarType::Int, false, None);
    rt.declare("b", VarType::Int, false, None);
    assert!(rt.pop_changed().is_none());

    assert!(rt.set("b", 1.0).unwrap());
    assert!(rt.set("a", 2.0).unwrap());
    assert!(!rt.set("a", 2.0).unwrap());
    assert_eq!(rt.pop_changed().map(|c| c.name).as_deref(), Some("b"));
    assert_eq!(rt.pop_changed().map(|c| c.name).as_deref(), Some("a"));
    assert!(rt.pop_changed().is_none());
}

#[test]
fn each_queued_change_keeps_its_own_value() {
    let mut rt = runtime();
    rt.declare("x", VarType::Int, false, None);
    rt.declare("label", VarType::String, false, None);
    rt.set("x", 1.0).unwrap();
    rt.set("x", 2.0).unwrap();
    rt.set_string("label", " 7 ").unwrap();

    let values: Vec<(String, f64)> =
        std::iter::from_fn(|| rt.pop_changed().map(|c| (c.name, c.value))).collect();
    assert_eq!(
        values,
        vec![("x".to_owned(), 1.0), ("x".to_owned(), 2.0), ("label".to_owned(), 7.0)]
    );
}

#[test]
fn reset_keeps_only_globals() {
    let mut rt = runtime();
    rt.declare("g", VarType::Int, true, Some(InitValue::Number(5.0)));
    rt.declare("l", VarType::Int, false, Some(InitValue::Number(1.0)));
    rt.register_element("box", ElementId(3));
    rt.register_text_binding("box", "l");
    rt.reset();
    assert_eq!(rt.lookup("g").unwrap().number, 5.0);
    assert!(rt.lookup("l").is_none());
    assert!(rt.element("box").is_none());
    assert!(rt.binding_of("box").is_none());
    assert!(rt.pop_changed().is_none());
}

#[test]
fn auto_next_fires_once_per_registration() {
    let mut rt = runtime();
    rt.declare("step", VarType::Int, false, Some(InitValue::Number(0.0)));
    rt.register_auto_next("step", Expected::Number(2.0));
    assert!(!rt.take_advance_request());

    rt.set("step", 2.0).unwrap();
    rt.check_auto_next("step");
    assert!(rt.take_advance_request());

    rt.set("step", 3.0).unwrap();
    rt.set("step", 2.0).unwrap();
    rt.check_auto_next("step");
    assert!(!rt.take_advance_request());
}

#[test]
fn auto_next_checks_immediately_and_compares_strings() {
    let mut rt = runtime();
    rt.declare("answer", VarType::String, false, Some(InitValue::Text("yes".into())));
    rt.register_auto_next("answer", Expected::Text("yes".into()));
    assert!(rt.take_advance_request());
}

#[test]
fn script_ids_map_both_ways() {
    let mut rt = runtime();
    rt.register_element("title", ElementId(7));
    assert_eq!(rt.element("title"), Some(ElementId(7)));
    assert_eq!(rt.script_id_of(ElementId(7)), Some("title"));
    assert_eq!(rt.script_id_of(ElementId(8)), None);
}

#[test]
fn text_bound_elements_filter_by_kind() {
    let mut rt = runtime();
    rt.register_element("a", ElementId(1));
    rt.register_element("b", ElementId(2));
    rt.register_text_binding("a", "v");
    rt.register_position_binding("b", "v");
    assert_eq!(rt.text_bound_elements("v"), vec![ElementId(1)]);
    assert_eq!(rt.binding_of("b"), Some((BindingKind::Position, "v")));
}

#[test]
fn evaluate_tolerates_bad_input() {
    let mut rt = runtime();
    rt.declare("x", VarType::Real, false, Some(InitValue::Number(1.5)));
    assert_eq!(rt.evaluate("{x * 2}"), 3.0);
    assert_eq!(rt.evaluate("x +"), 0.0);
}
