//! Plain data exchanged with the document model.
//!
//! Everything here is serializable so that hosts (and the CLI) can dump a document as JSON.

use std::path::PathBuf;

use crate::foundation::core::{Color, ElementId, Point, Size};

macro_rules! named_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => $canonical:literal $(| $alias:literal)*,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            /// Parse a script keyword (case-insensitive, aliases accepted).
            pub fn parse(s: &str) -> Option<Self> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($canonical $(| $alias)* => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// Canonical script keyword.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $canonical,)+
                }
            }
        }
    };
}

named_enum! {
    /// Geometric kind of a generic shape.
    pub enum ShapeKind {
        Circle => "circle",
        Rectangle => "rectangle",
        Triangle => "triangle",
        Diamond => "diamond",
        CylinderVertical => "cylinder_vertical" | "vcylinder",
        CylinderHorizontal => "cylinder_horizontal" | "hcylinder",
        RoundedRectangle => "rounded_rectangle" | "rounded-rectangle" | "roundedrect" | "roundrect",
        Trapezoid => "trapezoid",
        Line => "line",
        Arrow => "arrow",
        Bezier => "bezier" | "curve",
        Cube => "cube",
        Plot => "plot" | "graph",
    }
}

named_enum! {
    pub enum StrokeStyle {
        Solid => "solid",
        Dashed => "dashed",
        Dotted => "dotted",
    }
}

named_enum! {
    pub enum FillStyle {
        Solid => "solid",
        Hachure => "hachure" | "hatch",
        CrossHatch => "cross_hatch" | "cross-hatch" | "crosshatch" | "cross",
    }
}

named_enum! {
    pub enum TextAlign {
        Left => "left",
        Center => "center" | "centre",
        Right => "right",
    }
}

named_enum! {
    /// Routing of a connection line.
    pub enum ConnectionKind {
        Straight => "straight",
        Parallel => "parallel",
    }
}

named_enum! {
    pub enum Arrowhead {
        None => "none",
        Single => "single",
        Double => "double",
    }
}

impl ShapeKind {
    /// Shapes drawn from explicit endpoints rather than their bounding box.
    pub fn is_line_like(self) -> bool {
        matches!(self, Self::Line | Self::Arrow | Self::Bezier)
    }
}

/// What a created element is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Note,
    PaperNote,
    Text,
    Image,
    Video,
    Space,
    Shape(ShapeKind),
}

impl ElementKind {
    pub fn is_media(self) -> bool {
        matches!(self, Self::Image | Self::Video)
    }

    /// Command that creates this kind of element.
    pub fn command_name(self) -> &'static str {
        match self {
            Self::Note => "note_create",
            Self::PaperNote => "paper_note_create",
            Self::Text => "text_create",
            Self::Image => "image_create",
            Self::Video => "video_create",
            Self::Space => "space_create",
            Self::Shape(_) => "shape_create",
        }
    }
}

/// Endpoints (and optional bezier controls) of a line-like shape, normalized to the box.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LineGeometry {
    pub start: Point,
    pub end: Point,
    pub control1: Option<Point>,
    pub control2: Option<Point>,
}

impl Default for LineGeometry {
    fn default() -> Self {
        Self {
            start: Point::new(0.0, 0.0),
            end: Point::new(1.0, 1.0),
            control1: None,
            control2: None,
        }
    }
}

/// Full description of an element to create.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ElementSpec {
    pub kind: ElementKind,
    pub text: String,
    pub position: Point,
    pub size: Size,
    pub rotation: f64,
    pub background: Color,
    pub text_color: Color,
    pub font: String,
    pub stroke_width: f64,
    pub stroke_color: Option<Color>,
    pub stroke_style: StrokeStyle,
    pub filled: bool,
    pub fill_style: FillStyle,
    pub locked: bool,
    pub align: Option<TextAlign>,
    pub line: Option<LineGeometry>,
    pub media_path: Option<PathBuf>,
}

impl ElementSpec {
    pub fn center(&self) -> Point {
        Point::new(
            self.position.x + self.size.width / 2.0,
            self.position.y + self.size.height / 2.0,
        )
    }
}

/// Side of an element a connection attaches to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    Top,
    Right,
    Bottom,
    Left,
}

/// A connection to insert between two existing elements.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ConnectionSpec {
    pub from: ElementId,
    pub to: ElementId,
    pub from_anchor: Anchor,
    pub to_anchor: Anchor,
    pub kind: ConnectionKind,
    pub arrowhead: Arrowhead,
    pub color: Color,
    pub z: i64,
}

/// An element as currently stored, including transient animation state.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ElementSnapshot {
    pub id: ElementId,
    pub z: i64,
    pub spec: ElementSpec,
    pub visual: VisualState,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ConnectionSnapshot {
    pub id: ElementId,
    pub spec: ConnectionSpec,
}

/// Transient, non-persisted overrides written by the animation engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VisualState {
    pub position: Option<Point>,
    pub size: Option<Size>,
    pub rotation: Option<f64>,
    pub color: Option<Color>,
    pub alpha: Option<f64>,
}

impl VisualState {
    /// Overlay every field set in `patch`.
    pub fn merge(&mut self, patch: &VisualState) {
        if patch.position.is_some() {
            self.position = patch.position;
        }
        if patch.size.is_some() {
            self.size = patch.size;
        }
        if patch.rotation.is_some() {
            self.rotation = patch.rotation;
        }
        if patch.color.is_some() {
            self.color = patch.color;
        }
        if patch.alpha.is_some() {
            self.alpha = patch.alpha;
        }
    }
}

/// Space-level settings that survive slide transitions.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SpaceSettings {
    pub background: Color,
    pub show_grid: bool,
    pub grid_color: Color,
}

impl Default for SpaceSettings {
    fn default() -> Self {
        Self {
            background: Color::rgba(0.18, 0.18, 0.20, 1.0),
            show_grid: false,
            grid_color: Color::rgba(0.15, 0.15, 0.15, 0.4),
        }
    }
}

/// Kind of a batch undo entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndoAction {
    Create,
    Connect,
    Text,
    Delete,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UndoEntry {
    pub action: UndoAction,
    pub elements: Vec<ElementId>,
}

#[cfg(test)]
#[path = "../../tests/unit/document/element.rs"]
mod tests;
