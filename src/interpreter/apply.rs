//! Apply step: every document side effect of a [`Plan`], in batch order.
//!
//! 1. space settings
//! 2. element creation, one materialization batch and one undo entry
//! 3. binding sync, text updates and deletions in script order
//! 4. connections, now that every endpoint exists
//! 5. animation tracks, resolved against the final geometry

use std::collections::HashMap;

use crate::animation::track::{Property, Track, TrackValues};
use crate::document::element::{Anchor, ConnectionSpec, UndoAction, UndoEntry};
use crate::document::model::DocumentModel;
use crate::foundation::core::{ElementId, Point};
use crate::foundation::diagnostics::DiagnosticSink;
use crate::interpreter::plan::{AnimTarget, Intent, Plan};
use crate::runtime::context::{BindingKind, Runtime};
use crate::runtime::variables::VarType;

/// Document-facing outcome of one applied plan.
#[derive(Debug, Default)]
pub(crate) struct Applied {
    pub(crate) created: Vec<ElementId>,
    pub(crate) connections: Vec<ElementId>,
    pub(crate) tracks: Vec<Track>,
}

pub(crate) fn apply_plan<D: DocumentModel + ?Sized>(
    plan: &Plan,
    doc: &mut D,
    rt: &mut Runtime,
    sink: &mut DiagnosticSink,
) -> Applied {
    let mut out = Applied::default();

    for intent in &plan.intents {
        if let Intent::Background {
            color,
            grid,
            grid_color,
            ..
        } = intent
        {
            let mut settings = doc.space_settings();
            settings.background = *color;
            settings.show_grid = *grid;
            if let Some(gc) = grid_color {
                settings.grid_color = *gc;
            }
            doc.set_space_settings(settings);
        }
    }

    for intent in &plan.intents {
        if let Intent::Create { line, id, spec } = intent {
            match doc.create_element(spec) {
                Ok(element) => {
                    rt.register_element(id, element);
                    out.created.push(element);
                }
                Err(e) => sink.fault(*line, format!("'{id}' not created: {e:#}")),
            }
        }
    }
    if !out.created.is_empty() {
        doc.materialize(&out.created);
        doc.push_undo(UndoEntry {
            action: UndoAction::Create,
            elements: out.created.clone(),
        });
    }

    for intent in &plan.intents {
        match intent {
            Intent::Bind {
                line,
                element,
                var,
                kind,
            } => sync_binding(*line, element, var, *kind, doc, rt, sink),
            Intent::TextUpdate {
                line,
                element,
                text,
            } => {
                let Some(id) = resolve(*line, element, rt, sink) else {
                    continue;
                };
                if doc.set_text(id, text) {
                    doc.push_undo(UndoEntry {
                        action: UndoAction::Text,
                        elements: vec![id],
                    });
                }
            }
            Intent::Delete { line, element } => {
                let Some(id) = resolve(*line, element, rt, sink) else {
                    continue;
                };
                if doc.delete_element(id) {
                    rt.forget_element(element);
                    doc.push_undo(UndoEntry {
                        action: UndoAction::Delete,
                        elements: vec![id],
                    });
                }
            }
            _ => {}
        }
    }

    for intent in &plan.intents {
        if let Intent::Connect {
            line,
            from,
            to,
            kind,
            arrowhead,
            color,
        } = intent
        {
            let (Some(a), Some(b)) = (
                resolve(*line, from, rt, sink),
                resolve(*line, to, rt, sink),
            ) else {
                continue;
            };
            let (Some(ea), Some(eb)) = (doc.element(a), doc.element(b)) else {
                sink.lookup(*line, format!("connect {from} {to}: endpoint no longer exists"));
                continue;
            };
            let (from_anchor, to_anchor) = anchors(ea.spec.center(), eb.spec.center());
            let spec = ConnectionSpec {
                from: a,
                to: b,
                from_anchor,
                to_anchor,
                kind: *kind,
                arrowhead: *arrowhead,
                color: *color,
                z: ea.z.max(eb.z) - 1,
            };
            match doc.connect(&spec) {
                Ok(id) => {
                    out.connections.push(id);
                    doc.push_undo(UndoEntry {
                        action: UndoAction::Connect,
                        elements: vec![id],
                    });
                }
                Err(e) => sink.fault(*line, format!("connect {from} {to}: {e:#}")),
            }
        }
    }

    out.tracks = build_tracks(plan, doc, rt, sink);
    doc.request_redraw();
    out
}

fn resolve(line: usize, id: &str, rt: &Runtime, sink: &mut DiagnosticSink) -> Option<ElementId> {
    let found = rt.element(id);
    if found.is_none() {
        sink.lookup(line, format!("unknown element '{id}'"));
    }
    found
}

fn sync_binding<D: DocumentModel + ?Sized>(
    line: usize,
    element: &str,
    var: &str,
    kind: BindingKind,
    doc: &mut D,
    rt: &mut Runtime,
    sink: &mut DiagnosticSink,
) {
    let Some(id) = resolve(line, element, rt, sink) else {
        return;
    };
    match kind {
        BindingKind::Text => {
            if let Some(v) = rt.lookup(var) {
                let text = v.display_value();
                doc.set_text(id, &text);
            }
        }
        BindingKind::Position => {
            if let Some(e) = doc.element(id) {
                if let Err(err) = write_position(rt, var, e.spec.position) {
                    sink.warn(line, err.to_string());
                }
            }
        }
    }
}

/// Store an element position in a variable: `"x,y"` for strings, `x` for numbers.
pub(crate) fn write_position(
    rt: &mut Runtime,
    var: &str,
    position: Point,
) -> crate::foundation::error::ScriptResult<bool> {
    let is_string = rt.lookup(var).is_some_and(|v| v.ty == VarType::String);
    if is_string {
        let text = format!("{},{}", position.x.round(), position.y.round());
        rt.set_string(var, &text)
    } else {
        rt.set(var, position.x)
    }
}

/// Anchor sides for a connection, chosen by the angle from one center to the other.
pub(crate) fn anchors(from: Point, to: Point) -> (Anchor, Anchor) {
    let angle = (to.y - from.y)
        .atan2(to.x - from.x)
        .to_degrees()
        .rem_euclid(360.0);
    if (45.0..135.0).contains(&angle) {
        (Anchor::Bottom, Anchor::Top)
    } else if (135.0..225.0).contains(&angle) {
        (Anchor::Left, Anchor::Right)
    } else if (225.0..315.0).contains(&angle) {
        (Anchor::Top, Anchor::Bottom)
    } else {
        (Anchor::Right, Anchor::Left)
    }
}

/// Turn animate intents into tracks. A missing `from` continues from the previous track on
/// the same property, or from the element's current value.
fn build_tracks<D: DocumentModel + ?Sized>(
    plan: &Plan,
    doc: &D,
    rt: &Runtime,
    sink: &mut DiagnosticSink,
) -> Vec<Track> {
    let mut animated: Vec<(usize, &Intent)> = plan
        .intents
        .iter()
        .filter(|i| matches!(i, Intent::Animate { .. }))
        .enumerate()
        .collect();
    // Chain by start time; script order breaks ties.
    animated.sort_by(|(ia, a), (ib, b)| {
        let start = |i: &Intent| match i {
            Intent::Animate { start, .. } => *start,
            _ => 0.0,
        };
        start(a).total_cmp(&start(b)).then(ia.cmp(ib))
    });

    let mut last: HashMap<(ElementId, Property), TrackValues> = HashMap::new();
    let mut tracks = Vec::new();
    for (_, intent) in animated {
        let Intent::Animate {
            line,
            element,
            target,
            start,
            duration,
            curve,
        } = intent
        else {
            continue;
        };
        let Some(id) = resolve(*line, element, rt, sink) else {
            continue;
        };
        let Some(snapshot) = doc.element(id) else {
            sink.lookup(*line, format!("element '{element}' no longer exists"));
            continue;
        };
        let spec = &snapshot.spec;
        let previous = |p: Property| last.get(&(id, p)).copied();

        let values = match *target {
            AnimTarget::Position { from, to } => TrackValues::Position {
                from: from
                    .or_else(|| match previous(Property::Position) {
                        Some(TrackValues::Position { to, .. }) => Some(to),
                        _ => None,
                    })
                    .unwrap_or(spec.position),
                to,
            },
            AnimTarget::Size { from, to } => TrackValues::Size {
                from: from
                    .or_else(|| match previous(Property::Size) {
                        Some(TrackValues::Size { to, .. }) => Some(to),
                        _ => None,
                    })
                    .unwrap_or(spec.size),
                to,
            },
            AnimTarget::Rotation { from, to } => TrackValues::Rotation {
                from: from
                    .or_else(|| match previous(Property::Rotation) {
                        Some(TrackValues::Rotation { to, .. }) => Some(to),
                        _ => None,
                    })
                    .unwrap_or(spec.rotation),
                to,
            },
            AnimTarget::Color { from, to } => TrackValues::Color { from, to },
            AnimTarget::Appear => TrackValues::Alpha { from: 0.0, to: 1.0 },
            AnimTarget::Disappear => TrackValues::Alpha { from: 1.0, to: 0.0 },
        };
        last.insert((id, values.property()), values);
        tracks.push(Track::new(id, *start, *duration, *curve, values));
    }
    tracks
}

#[cfg(test)]
#[path = "../../tests/unit/interpreter/apply.rs"]
mod tests;
