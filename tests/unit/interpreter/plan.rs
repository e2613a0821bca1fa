use super::*;
use crate::document::element::ShapeKind;
use crate::foundation::diagnostics::DiagnosticKind;
use crate::script::command::parse_script;

fn build(script: &str) -> (Plan, Runtime, Vec<crate::foundation::diagnostics::Diagnostic>) {
    let mut rt = Runtime::new(1e-6);
    let mut sink = DiagnosticSink::default();
    let plan = build_plan(&parse_script(script), &mut rt, &SessionConfig::default(), &mut sink);
    (plan, rt, sink.into_vec())
}

fn created(plan: &Plan, index: usize) -> &ElementSpec {
    plan.intents
        .iter()
        .filter_map(|i| match i {
            Intent::Create { spec, .. } => Some(spec),
            _ => None,
        })
        .nth(index)
        .expect("create intent")
}

#[test]
fn variables_take_effect_in_script_order() {
    let (plan, rt, diags) = build(
        "int n 2\nnote_create a \"n={n}\" ({n * 10},0) (100,50)\nset n n + 1\ntext_create b \"n={n}\" (0,0) (10,10)",
    );
    assert!(diags.is_empty(), "{diags:?}");
    assert_eq!(rt.lookup("n").map(|v| v.number), Some(3.0));
    assert_eq!(created(&plan, 0).text, "n=2");
    assert_eq!(created(&plan, 0).position, Point::new(20.0, 0.0));
    assert_eq!(created(&plan, 1).text, "n=3");
}

#[test]
fn defaults_follow_element_kind() {
    let (plan, _, _) = build(
        "note_create a \"x\" (0,0) (1,1)\npaper_note_create b \"y\" (0,0) (1,1)\nshape_create c circle \"z\" (0,0) (1,1)",
    );
    let cfg = SessionConfig::default();
    assert_eq!(created(&plan, 0).background, cfg.defaults.note.background);
    assert_eq!(created(&plan, 1).font, "Ubuntu Mono 16");
    let shape = created(&plan, 2);
    assert_eq!(shape.kind, ElementKind::Shape(ShapeKind::Circle));
    assert_eq!(shape.stroke_width, 2.0);
    assert_eq!(shape.font, "Ubuntu Bold 14");
}

#[test]
fn modifiers_in_any_order_and_bad_ones_warn() {
    let (plan, _, diags) = build(
        r#"shape_create s rectangle "x" (0,0) (10,10) filled stroke 4 bg=#ff0000 "Sans 9" wobble stroke_style dashed rotation nope"#,
    );
    let spec = created(&plan, 0);
    assert!(spec.filled);
    assert_eq!(spec.stroke_width, 4.0);
    assert_eq!(spec.background, Color::rgba(1.0, 0.0, 0.0, 1.0));
    assert_eq!(spec.font, "Sans 9");
    assert_eq!(spec.stroke_style, StrokeStyle::Dashed);
    assert_eq!(spec.rotation, 0.0);
    assert_eq!(diags.len(), 2);
    assert!(diags.iter().all(|d| d.kind == DiagnosticKind::Line));
}

#[test]
fn note_accepts_bare_color_and_inline_text_color() {
    let (plan, _, diags) =
        build("note_create n \"x\" (0,0) (1,1) (0,0,1,1) text_color:(1,1,1) locked align center");
    assert!(diags.is_empty(), "{diags:?}");
    let spec = created(&plan, 0);
    assert_eq!(spec.background, Color::rgba(0.0, 0.0, 1.0, 1.0));
    assert_eq!(spec.text_color, Color::WHITE);
    assert!(spec.locked);
    assert_eq!(spec.align, Some(TextAlign::Center));
}

#[test]
fn shape_options_do_not_apply_to_notes() {
    let (_, _, diags) = build("note_create n \"x\" (0,0) (1,1) stroke 3");
    assert_eq!(diags.len(), 1);
}

#[test]
fn line_shapes_carry_endpoints() {
    let (plan, _, _) = build(
        "shape_create l bezier \"\" (0,0) (100,100) line_start (0,1) line_end (1,0) control1 (0.2,2)",
    );
    let geom = created(&plan, 0).line.expect("line geometry");
    assert_eq!(geom.start, Point::new(0.0, 1.0));
    assert_eq!(geom.end, Point::new(1.0, 0.0));
    assert_eq!(geom.control1, Some(Point::new(0.2, 1.0)));
}

#[test]
fn media_text_becomes_a_path() {
    let (plan, _, _) = build("image_create pic /tmp/cat.png (0,0) (10,10) rotation 15");
    let spec = created(&plan, 0);
    assert_eq!(spec.media_path, Some(PathBuf::from("/tmp/cat.png")));
    assert!(spec.text.is_empty());
    assert_eq!(spec.rotation, 15.0);
}

#[test]
fn animations_need_the_mode_directive() {
    let (plan, _, diags) = build("note_create a \"x\" (0,0) (1,1)\nanimate_appear a 0 1");
    assert!(plan.playback.is_none());
    assert!(!plan.intents.iter().any(|i| matches!(i, Intent::Animate { .. })));
    assert_eq!(diags.len(), 1);

    let (plan, _, diags) =
        build("animation_mode cycled\nnote_create a \"x\" (0,0) (1,1)\nanimate_move a (5,5) 0.5 2 ease_out");
    assert!(diags.is_empty());
    assert_eq!(plan.playback, Some(PlaybackMode::Cycled));
    assert!(plan.intents.contains(&Intent::Animate {
        line: 3,
        element: "a".to_owned(),
        target: AnimTarget::Position {
            from: None,
            to: Point::new(5.0, 5.0),
        },
        start: 0.5,
        duration: 2.0,
        curve: Curve::EaseOut,
    }));
}

#[test]
fn handlers_register_and_unterminated_blocks_warn() {
    let (_, rt, diags) = build("on click a\nset x 1\nend\non click b\nint y 0");
    assert!(rt.handlers.get(EventKind::Click, "a").is_some());
    assert!(rt.handlers.get(EventKind::Click, "b").is_none());
    assert_eq!(rt.lookup("y").map(|v| v.number), Some(0.0));
    assert_eq!(diags.len(), 1);
}

#[test]
fn unknown_commands_and_lookups_are_reported() {
    let (plan, _, diags) = build("frob\nset ghost 1\nnote_create a \"x\" (0,0) (1,1)");
    assert_eq!(plan.creations(), 1);
    assert_eq!(diags[0].kind, DiagnosticKind::Line);
    assert_eq!(diags[1].kind, DiagnosticKind::Lookup);
}

#[test]
fn connect_defaults_and_navigation() {
    let (plan, _, _) = build("connect a b\npresentation_next");
    assert_eq!(plan.connections(), 1);
    assert!(plan.intents.contains(&Intent::Connect {
        line: 1,
        from: "a".to_owned(),
        to: "b".to_owned(),
        kind: ConnectionKind::Parallel,
        arrowhead: Arrowhead::Single,
        color: Color::WHITE,
    }));
    assert_eq!(plan.navigation, Some(Navigation::Next));
}

#[test]
fn declarations_evaluate_initializers() {
    let (_, rt, _) = build("int a 4\nbool flag yes\nreal r a / 8\nint d {a * 2}\nset a 5\nstring s \"hi {a}\"");
    assert_eq!(rt.lookup("flag").map(|v| v.number), Some(1.0));
    assert_eq!(rt.lookup("r").map(|v| v.number), Some(0.5));
    assert_eq!(rt.lookup("d").map(|v| v.number), Some(10.0));
    assert_eq!(rt.lookup("s").map(|v| v.text.clone()), Some("hi 5".to_owned()));
}
