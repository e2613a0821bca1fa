//! canvas-script is a scripting engine for infinite-canvas documents.
//!
//! Scripts declare typed variables, create notes, shapes and media, connect them, react to
//! clicks and variable changes, animate element properties and split into presentation
//! slides. The public API is session-oriented:
//!
//! - Implement [`DocumentModel`] for the host canvas (or use [`MemoryDocument`])
//! - Create a [`Session`] with a [`Scheduler`]
//! - [`Session::execute`] scripts and forward host events back into the session
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod document;
pub(crate) mod generator;
pub(crate) mod interpreter;
pub(crate) mod presentation;
pub(crate) mod runtime;
pub(crate) mod script;
/// Session-oriented scripting API.
pub mod session;

pub use crate::foundation::config::{ElementDefaults, ElementStyle, SessionConfig};
pub use crate::foundation::core::{Color, ElementId, Point, Size};
pub use crate::foundation::diagnostics::{Diagnostic, DiagnosticKind};
pub use crate::foundation::error::{ScriptError, ScriptResult, TypeCheckFailure, TypeDiagnostic};

pub use crate::animation::ease::Curve;
pub use crate::animation::engine::{AnimationEngine, EngineState, PlaybackMode, TickOutcome};
pub use crate::animation::scheduler::{ManualClock, Scheduler, SystemScheduler, TimerHandle};
pub use crate::animation::track::{Property, Track, TrackValues};
pub use crate::document::element::{
    Anchor, Arrowhead, ConnectionKind, ConnectionSnapshot, ConnectionSpec, ElementKind,
    ElementSnapshot, ElementSpec, FillStyle, LineGeometry, ShapeKind, SpaceSettings,
    StrokeStyle, TextAlign, UndoAction, UndoEntry, VisualState,
};
pub use crate::document::memory::{DocumentDump, MemoryDocument};
pub use crate::document::model::DocumentModel;
pub use crate::generator::dsl::{generate_script, slugify};
pub use crate::presentation::controller::{Presentation, split_slides};
pub use crate::runtime::context::{BindingKind, Expected, Runtime};
pub use crate::runtime::handlers::{BodyLine, CompareOp, Condition, EventKind};
pub use crate::runtime::variables::{VarType, Variable, format_number};
pub use crate::script::command::{Command, ParseError, ScriptLine, parse_script};
pub use crate::session::script_session::{ExecutionReport, Session};
