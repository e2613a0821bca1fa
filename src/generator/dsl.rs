//! Reverse serialization: current document state back into script text.

use std::collections::{HashMap, HashSet};

use crate::document::element::{
    ElementKind, ElementSnapshot, FillStyle, SpaceSettings, StrokeStyle,
};
use crate::document::model::DocumentModel;
use crate::foundation::core::{Color, ElementId, Point};
use crate::script::tokenizer::escape_text;

const MAX_ID_LEN: usize = 29;

fn color(c: Color) -> String {
    format!("({:.2},{:.2},{:.2},{:.2})", c.r, c.g, c.b, c.a)
}

fn pair(x: f64, y: f64) -> String {
    format!("({},{})", x.round() as i64, y.round() as i64)
}

fn unit_pair(p: Point) -> String {
    format!("({:.2},{:.2})", p.x, p.y)
}

/// Script identifier derived from element text.
pub fn slugify(text: &str) -> String {
    let mut out = String::new();
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            out.push(c);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    let mut slug: String = out.trim_matches('_').chars().take(MAX_ID_LEN).collect();
    while slug.ends_with('_') {
        slug.pop();
    }
    if slug.starts_with(|c: char| c.is_ascii_digit()) {
        slug.insert(0, '_');
    }
    slug
}

/// Unique identifiers for every element, in document order.
fn assign_ids(elements: &[ElementSnapshot]) -> HashMap<ElementId, String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut ids = HashMap::new();
    for (n, e) in elements.iter().enumerate() {
        let mut base = slugify(&e.spec.text);
        if base.is_empty() {
            base = format!("elem_{}", n + 1);
        }
        let mut candidate = base.clone();
        let mut suffix = 2;
        while !used.insert(candidate.clone()) {
            candidate = format!("{base}_{suffix}");
            suffix += 1;
        }
        ids.insert(e.id, candidate);
    }
    ids
}

fn element_line(id: &str, e: &ElementSnapshot) -> String {
    let s = &e.spec;
    let mut line = String::from(s.kind.command_name());
    line.push_str(&format!(" {id}"));
    if let ElementKind::Shape(shape) = s.kind {
        line.push_str(&format!(" {}", shape.as_str()));
    }
    line.push_str(&format!(
        " \"{}\" {} {}",
        escape_text(&s.text),
        pair(s.position.x, s.position.y),
        pair(s.size.width, s.size.height)
    ));
    line.push_str(&format!(
        " bg {} text_color {} font \"{}\"",
        color(s.background),
        color(s.text_color),
        escape_text(&s.font)
    ));

    if let ElementKind::Shape(_) = s.kind {
        line.push_str(&format!(" stroke {} filled {}", s.stroke_width, s.filled));
        if s.stroke_style != StrokeStyle::Solid {
            line.push_str(&format!(" stroke_style {}", s.stroke_style.as_str()));
        }
        if s.fill_style != FillStyle::Solid {
            line.push_str(&format!(" fill_style {}", s.fill_style.as_str()));
        }
        if let Some(c) = s.stroke_color {
            line.push_str(&format!(" stroke_color {}", color(c)));
        }
        if let Some(g) = &s.line {
            line.push_str(&format!(
                " line_start {} line_end {}",
                unit_pair(g.start),
                unit_pair(g.end)
            ));
            if let Some(c) = g.control1 {
                line.push_str(&format!(" control1 {}", unit_pair(c)));
            }
            if let Some(c) = g.control2 {
                line.push_str(&format!(" control2 {}", unit_pair(c)));
            }
        }
    }
    if s.rotation != 0.0 {
        line.push_str(&format!(" rotation {}", s.rotation));
    }
    if s.locked {
        line.push_str(" locked true");
    }
    if let Some(align) = s.align {
        line.push_str(&format!(" align {}", align.as_str()));
    }
    line
}

/// Render the current document as a script that recreates it.
///
/// Media elements are skipped since their files cannot be carried in script text.
pub fn generate_script<D: DocumentModel + ?Sized>(doc: &D) -> String {
    let elements: Vec<ElementSnapshot> = doc
        .elements()
        .into_iter()
        .filter(|e| !e.spec.kind.is_media())
        .collect();
    let ids = assign_ids(&elements);

    let mut out = String::from("# Generated from the current canvas\n");
    let settings = doc.space_settings();
    if settings != SpaceSettings::default() {
        out.push_str(&format!(
            "canvas_background {} {} {}\n",
            color(settings.background),
            settings.show_grid,
            color(settings.grid_color)
        ));
    }

    for e in &elements {
        if let Some(id) = ids.get(&e.id) {
            out.push_str(&element_line(id, e));
            out.push('\n');
        }
    }

    for c in doc.connections() {
        let (Some(from), Some(to)) = (ids.get(&c.spec.from), ids.get(&c.spec.to)) else {
            continue;
        };
        out.push_str(&format!(
            "connect {from} {to} {} {}",
            c.spec.kind.as_str(),
            c.spec.arrowhead.as_str()
        ));
        if c.spec.color != Color::WHITE {
            out.push_str(&format!(" color {}", color(c.spec.color)));
        }
        out.push('\n');
    }

    tracing::debug!(elements = elements.len(), "script generated");
    out
}

#[cfg(test)]
#[path = "../../tests/unit/generator/dsl.rs"]
mod tests;
