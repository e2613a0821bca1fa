use super::*;
use crate::document::memory::MemoryDocument;
use crate::foundation::config::SessionConfig;
use crate::foundation::diagnostics::{Diagnostic, DiagnosticKind};
use crate::interpreter::plan::build_plan;
use crate::script::command::parse_script;

fn run(script: &str) -> (MemoryDocument, Runtime, Applied, Vec<Diagnostic>) {
    let mut doc = MemoryDocument::new();
    let mut rt = Runtime::new(1e-6);
    let mut sink = DiagnosticSink::default();
    let plan = build_plan(&parse_script(script), &mut rt, &SessionConfig::default(), &mut sink);
    let applied = apply_plan(&plan, &mut doc, &mut rt, &mut sink);
    (doc, rt, applied, sink.into_vec())
}

#[test]
fn connections_resolve_forward_references() {
    let (doc, rt, applied, diags) = run(
        "connect a b\nnote_create a \"A\" (0,0) (100,100)\nnote_create b \"B\" (300,0) (100,100)",
    );
    assert!(diags.is_empty(), "{diags:?}");
    assert_eq!(applied.created.len(), 2);
    assert_eq!(applied.connections.len(), 1);

    let conn = &doc.connections()[0].spec;
    assert_eq!(Some(conn.from), rt.element("a"));
    assert_eq!(Some(conn.to), rt.element("b"));
    assert_eq!((conn.from_anchor, conn.to_anchor), (Anchor::Right, Anchor::Left));
    assert_eq!(conn.z, 0);
}

#[test]
fn creation_is_one_batch_and_one_undo_entry() {
    let (doc, _, applied, _) = run(
        "note_create a \"A\" (0,0) (1,1)\nnote_create b \"B\" (5,5) (1,1)\nconnect a b\nconnect b a",
    );
    let undo = doc.undo_entries();
    assert_eq!(undo.len(), 3);
    assert_eq!(undo[0].action, UndoAction::Create);
    assert_eq!(undo[0].elements, applied.created);
    assert_eq!(undo[1].action, UndoAction::Connect);
    assert!(applied.created.iter().all(|id| doc.is_materialized(*id)));
    assert_eq!(doc.redraw_count(), 1);
}

#[test]
fn unknown_connection_endpoint_is_a_lookup_warning() {
    let (doc, _, applied, diags) = run("note_create a \"A\" (0,0) (1,1)\nconnect a ghost");
    assert!(applied.connections.is_empty());
    assert!(doc.connections().is_empty());
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].kind, DiagnosticKind::Lookup);
}

#[test]
fn missing_media_is_an_engine_fault_for_that_element_only() {
    let (doc, _, applied, diags) = run(
        "image_create pic /definitely/not/here.png (0,0) (1,1)\nnote_create a \"A\" (0,0) (1,1)",
    );
    assert_eq!(applied.created.len(), 1);
    assert_eq!(doc.elements().len(), 1);
    assert_eq!(diags[0].kind, DiagnosticKind::EngineFault);
    assert_eq!(diags[0].line, 1);
}

#[test]
fn background_keeps_grid_color_unless_given() {
    let before = crate::document::element::SpaceSettings::default();
    let (doc, _, _, _) = run("canvas_background (0,0,0,1) true");
    let settings = doc.space_settings();
    assert!(settings.show_grid);
    assert_eq!(settings.background, crate::foundation::core::Color::BLACK);
    assert_eq!(settings.grid_color, before.grid_color);
}

#[test]
fn bindings_sync_after_creation() {
    let (doc, rt, _, _) = run(
        "int score 7\nstring where \"\"\nnote_create s \"?\" (0,0) (1,1)\nnote_create p \"P\" (40,60) (1,1)\ntext_bind s score\nposition_bind p where",
    );
    let s = rt.element("s").and_then(|id| doc.element(id)).expect("s");
    assert_eq!(s.spec.text, "7");
    assert_eq!(rt.lookup("where").map(|v| v.text.clone()), Some("40,60".to_owned()));
}

#[test]
fn text_update_and_delete_in_order() {
    let (doc, rt, _, diags) = run(
        "note_create a \"old\" (0,0) (1,1)\nnote_create b \"B\" (0,0) (1,1)\ntext_update a \"new\"\nelement_delete b\ntext_update b \"gone\"",
    );
    assert_eq!(doc.elements().len(), 1);
    assert_eq!(doc.elements()[0].spec.text, "new");
    assert!(rt.element("b").is_none());
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].kind, DiagnosticKind::Lookup);
}

#[test]
fn missing_from_chains_through_earlier_tracks() {
    let (_, _, applied, diags) = run(
        "animation_mode\nnote_create a \"A\" (10,10) (1,1)\nanimate_move a (50,50) 1 1\nanimate_move a (20,20) 0 1\nanimate_appear a 0 0.5",
    );
    assert!(diags.is_empty(), "{diags:?}");
    assert_eq!(applied.tracks.len(), 3);
    let moves: Vec<_> = applied
        .tracks
        .iter()
        .filter_map(|t| match t.values {
            TrackValues::Position { from, to } => Some((t.start, from, to)),
            _ => None,
        })
        .collect();
    assert_eq!(moves[0], (0.0, Point::new(10.0, 10.0), Point::new(20.0, 20.0)));
    assert_eq!(moves[1], (1.0, Point::new(20.0, 20.0), Point::new(50.0, 50.0)));
}

#[test]
fn anchors_follow_the_angle_between_centers() {
    let o = Point::new(0.0, 0.0);
    assert_eq!(anchors(o, Point::new(10.0, 0.0)), (Anchor::Right, Anchor::Left));
    assert_eq!(anchors(o, Point::new(0.0, 10.0)), (Anchor::Bottom, Anchor::Top));
    assert_eq!(anchors(o, Point::new(-10.0, 1.0)), (Anchor::Left, Anchor::Right));
    assert_eq!(anchors(o, Point::new(0.0, -10.0)), (Anchor::Top, Anchor::Bottom));
}
