use super::*;
use crate::document::memory::MemoryDocument;
use crate::foundation::diagnostics::DiagnosticKind;

fn session() -> Session<MemoryDocument, ManualClock> {
    Session::new(MemoryDocument::new(), ManualClock::new())
}

fn quarter_second_session() -> Session<MemoryDocument, ManualClock> {
    let config = SessionConfig {
        tick_interval_ms: 250,
        ..SessionConfig::default()
    };
    Session::with_config(MemoryDocument::new(), ManualClock::new(), config).unwrap()
}

fn number(s: &Session<MemoryDocument, ManualClock>, name: &str) -> f64 {
    s.runtime().lookup(name).map(|v| v.number).unwrap()
}

#[test]
fn rejected_script_mutates_nothing_and_notifies_once() {
    let mut s = session();
    let err = s.execute("note_create a \"A\" (0,0) (1,1)\nset ghost 1", None).unwrap_err();
    assert!(matches!(err, ScriptError::TypeCheck(_)));
    assert!(s.doc().elements().is_empty());
    assert_eq!(s.doc().notices().len(), 1);
}

#[test]
fn invalid_config_is_rejected() {
    let config = SessionConfig {
        tick_interval_ms: 0,
        ..SessionConfig::default()
    };
    assert!(Session::with_config(MemoryDocument::new(), ManualClock::new(), config).is_err());
}

#[test]
fn globals_survive_a_new_execution_and_locals_do_not() {
    let mut s = session();
    s.execute("global int total 5\nint local 3", None).unwrap();
    assert_eq!(number(&s, "local"), 3.0);

    s.execute("global int total 9\nnote_create t \"{total}\" (0,0) (1,1)", None)
        .unwrap();
    assert!(s.runtime().lookup("local").is_none());
    assert_eq!(number(&s, "total"), 5.0);
    assert!(s.doc().find_by_text("5").is_some());
}

#[test]
fn click_runs_the_handler_and_unknown_clicks_are_ignored() {
    let mut s = session();
    s.execute(
        "int n 0\nnote_create b \"Go\" (0,0) (10,10)\non click b\nset n n + 1\nend",
        None,
    )
    .unwrap();

    let element = s.runtime().element("b").unwrap();
    assert!(s.click(element).is_some());
    assert!(s.click_id("b").is_some());
    assert_eq!(number(&s, "n"), 2.0);
    assert!(s.click_id("nope").is_none());
}

#[test]
fn variable_handlers_honor_their_condition_and_bindings_follow() {
    let mut s = session();
    s.execute(
        "int n 0
note_create s \"?\" (0,0) (1,1)
text_bind s n
on variable n > 1
note_create big \"big\" (5,5) (1,1)
end
note_create b \"B\" (0,0) (1,1)
on click b
set n n + 1
end",
        None,
    )
    .unwrap();
    assert!(s.doc().find_by_text("0").is_some());

    s.click_id("b");
    assert!(s.doc().find_by_text("big").is_none());
    assert!(s.doc().find_by_text("1").is_some());

    let report = s.click_id("b").unwrap();
    assert_eq!(report.created, 1);
    assert!(s.doc().find_by_text("big").is_some());
    assert!(s.doc().find_by_text("2").is_some());
}

#[test]
fn runaway_variable_handlers_stop_at_the_depth_limit() {
    let mut s = session();
    s.execute(
        "int n 0\non variable n\nset n n + 1\nend\nnote_create b \"B\" (0,0) (1,1)\non click b\nset n 1\nend",
        None,
    )
    .unwrap();

    let report = s.click_id("b").unwrap();
    assert_eq!(number(&s, "n"), 5.0);
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].kind, DiagnosticKind::Line);
}

#[test]
fn animation_runs_on_the_host_timer() {
    let mut s = quarter_second_session();
    let report = s
        .execute(
            "animation_mode single\nnote_create a \"A\" (0,0) (10,10)\nanimate_move a (0,0) (100,100) 0 1 linear",
            None,
        )
        .unwrap();
    assert_eq!(report.tracks, 1);
    assert!(s.engine().is_running());
    assert_eq!(s.scheduler().active_timers(), 1);

    let id = s.runtime().element("a").unwrap();
    let outcomes = s.advance(Duration::from_millis(500));
    assert_eq!(outcomes, vec![TickOutcome::Running, TickOutcome::Running]);
    let pos = s.doc().element(id).unwrap().visual.position.unwrap();
    assert!((pos.x - 50.0).abs() < 1e-9 && (pos.y - 50.0).abs() < 1e-9);

    let outcomes = s.advance(Duration::from_millis(600));
    assert_eq!(outcomes.last(), Some(&TickOutcome::Completed));
    assert_eq!(s.scheduler().active_timers(), 0);
    let pos = s.doc().element(id).unwrap().visual.position.unwrap();
    assert_eq!(pos, Point::new(100.0, 100.0));
}

#[test]
fn stale_timer_handles_are_ignored() {
    let mut s = session();
    assert_eq!(s.on_timer(TimerHandle(42)), TickOutcome::Inactive);
}

#[test]
fn slides_navigate_within_bounds() {
    let mut s = session();
    s.execute(
        "note_create a \"one\" (0,0) (1,1)\nanimation_next_slide\nnote_create b \"two\" (0,0) (1,1)\nanimation_next_slide\nnote_create c \"three\" (0,0) (1,1)",
        None,
    )
    .unwrap();
    assert_eq!(s.presentation().map(Presentation::len), Some(3));
    assert_eq!(s.doc().elements().len(), 1);

    s.prev_slide();
    assert_eq!(s.presentation().unwrap().current(), 0);
    assert_eq!(s.doc().notices().last().map(String::as_str), Some("Already at the first slide"));

    s.next_slide();
    s.next_slide();
    assert_eq!(s.presentation().unwrap().current(), 2);
    assert_eq!(s.doc().elements().len(), 1);
    assert!(s.doc().find_by_text("three").is_some());

    s.next_slide();
    assert_eq!(s.presentation().unwrap().current(), 2);
    assert_eq!(s.doc().notices().last().map(String::as_str), Some("Already at the last slide"));
}

#[test]
fn auto_next_advances_when_the_watched_value_is_reached() {
    let mut s = session();
    s.execute(
        "int step 0
note_create b \"B\" (0,0) (1,1)
on click b
set step 1
end
presentation_auto_next_if step 1
animation_next_slide
note_create z \"Z\" (0,0) (1,1)",
        None,
    )
    .unwrap();
    assert_eq!(s.presentation().unwrap().current(), 0);

    s.click_id("b");
    assert_eq!(s.presentation().unwrap().current(), 1);
    assert!(s.doc().find_by_text("Z").is_some());
}

#[test]
fn plain_script_replaces_the_presentation() {
    let mut s = session();
    s.execute("note_create a \"one\" (0,0) (1,1)\nanimation_next_slide\nnote_create b \"two\" (0,0) (1,1)", None)
        .unwrap();
    assert!(s.presentation().is_some());

    s.execute("note_create x \"x\" (0,0) (1,1)", None).unwrap();
    assert!(s.presentation().is_none());
    assert_eq!(s.doc().elements().len(), 2);

    s.next_slide();
    assert_eq!(s.doc().notices().last().map(String::as_str), Some("No presentation is running"));
}

#[test]
fn host_edits_flow_back_into_bound_variables() {
    let mut s = session();
    s.execute(
        "string where \"\"\nint n 0\nnote_create p \"P\" (0,0) (1,1)\nnote_create t \"0\" (0,0) (1,1)\nposition_bind p where\ntext_bind t n",
        None,
    )
    .unwrap();

    let p = s.runtime().element("p").unwrap();
    s.element_moved(p, Point::new(12.4, 7.6));
    assert_eq!(s.runtime().lookup("where").unwrap().text, "12,8");

    let t = s.runtime().element("t").unwrap();
    s.element_text_edited(t, " 41 + 1 ");
    assert_eq!(number(&s, "n"), 42.0);
}

#[test]
fn variable_guards_see_each_assignment_in_order() {
    let mut s = session();
    s.execute(
        "int x 0
on variable x == 1
note_create hit \"hit\" (0,0) (1,1)
end
note_create b \"B\" (0,0) (1,1)
on click b
set x 1
set x 2
end",
        None,
    )
    .unwrap();

    let report = s.click_id("b").unwrap();
    assert_eq!(report.created, 1);
    assert!(s.doc().find_by_text("hit").is_some());
    assert_eq!(number(&s, "x"), 2.0);
}

#[test]
fn a_slide_may_move_forward_while_it_loads() {
    let mut s = session();
    s.execute(
        "note_create a \"A\" (0,0) (1,1)\npresentation_next\nanimation_next_slide\nnote_create b \"B\" (0,0) (1,1)",
        None,
    )
    .unwrap();
    assert_eq!(s.presentation().unwrap().current(), 1);
    assert!(s.doc().find_by_text("B").is_some());
    assert!(s.doc().find_by_text("A").is_none());
}

#[test]
fn slides_bouncing_between_each_other_stop_with_a_warning() {
    let mut s = session();
    let report = s
        .execute(
            "note_create a \"A\" (0,0) (1,1)\npresentation_next\nanimation_next_slide\nnote_create b \"B\" (0,0) (1,1)\npresentation_prev",
            None,
        )
        .unwrap();
    assert_eq!(s.presentation().unwrap().current(), 1);
    let loops: Vec<_> = report
        .diagnostics
        .iter()
        .filter(|d| d.kind == DiagnosticKind::Line)
        .collect();
    assert_eq!(loops.len(), 1);
    assert!(loops[0].message.contains("loops back"));
    assert!(s.doc().find_by_text("B").is_some());
}
