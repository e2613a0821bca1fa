use super::*;
use crate::document::element::{ConnectionSpec, ElementSpec, ShapeKind, Anchor, ConnectionKind, Arrowhead};
use crate::document::memory::MemoryDocument;
use crate::foundation::config::SessionConfig;
use crate::foundation::core::Size;

fn note(text: &str, x: f64) -> ElementSpec {
    let style = SessionConfig::default().defaults.note;
    ElementSpec {
        kind: ElementKind::Note,
        text: text.to_owned(),
        position: Point::new(x, 20.0),
        size: Size::new(100.0, 50.0),
        rotation: 0.0,
        background: style.background,
        text_color: style.text_color,
        font: style.font,
        stroke_width: 0.0,
        stroke_color: None,
        stroke_style: StrokeStyle::Solid,
        filled: false,
        fill_style: FillStyle::Solid,
        locked: false,
        align: None,
        line: None,
        media_path: None,
    }
}

#[test]
fn slugs_are_lowercase_identifiers() {
    assert_eq!(slugify("Hello, World!"), "hello_world");
    assert_eq!(slugify("  --  "), "");
    assert_eq!(slugify("3 apples"), "_3_apples");
    assert!(slugify(&"long words ".repeat(10)).len() < 30);
}

#[test]
fn duplicate_and_empty_texts_get_distinct_ids() {
    let mut doc = MemoryDocument::new();
    doc.create_element(&note("Same", 0.0)).unwrap();
    doc.create_element(&note("Same", 10.0)).unwrap();
    doc.create_element(&note("", 20.0)).unwrap();
    let script = generate_script(&doc);
    assert!(script.contains("note_create same \"Same\" (0,20) (100,50)"));
    assert!(script.contains("note_create same_2 \"Same\" (10,20)"));
    assert!(script.contains("note_create elem_3 \"\" (20,20)"));
}

#[test]
fn default_space_settings_emit_no_background_line() {
    let mut doc = MemoryDocument::new();
    assert!(!generate_script(&doc).contains("canvas_background"));
    let mut settings = doc.space_settings();
    settings.show_grid = true;
    doc.set_space_settings(settings);
    assert!(generate_script(&doc).contains("canvas_background (0.18,0.18,0.20,1.00) true"));
}

#[test]
fn shapes_media_and_connections() {
    let mut doc = MemoryDocument::new();
    let a = doc.create_element(&note("A \"quoted\"", 0.0)).unwrap();
    let mut shape = note("Box", 200.0);
    shape.kind = ElementKind::Shape(ShapeKind::RoundedRectangle);
    shape.stroke_width = 3.0;
    shape.filled = true;
    shape.stroke_style = StrokeStyle::Dotted;
    let b = doc.create_element(&shape).unwrap();
    let mut media = note("", 0.0);
    media.kind = ElementKind::Image;
    media.media_path = None;
    doc.create_element(&media).unwrap();

    for color in [Color::WHITE, Color::rgba(1.0, 0.0, 0.0, 1.0)] {
        doc.connect(&ConnectionSpec {
            from: a,
            to: b,
            from_anchor: Anchor::Right,
            to_anchor: Anchor::Left,
            kind: ConnectionKind::Straight,
            arrowhead: Arrowhead::Double,
            color,
            z: 0,
        })
        .unwrap();
    }

    let script = generate_script(&doc);
    assert!(script.contains(r#"note_create a_quoted "A \"quoted\"""#));
    assert!(script.contains("shape_create box rounded_rectangle \"Box\""));
    assert!(script.contains("stroke 3 filled true stroke_style dotted"));
    assert!(!script.contains("image_create"));
    assert!(script.contains("connect a_quoted box straight double\n"));
    assert!(script.contains("connect a_quoted box straight double color (1.00,0.00,0.00,1.00)\n"));
}
