//! Build step: turn parsed lines into runtime effects plus a list of document intents.
//!
//! Variable, binding and handler lines take effect on the [`Runtime`] immediately in script
//! order. Everything that touches the document becomes an [`Intent`] applied later as one
//! batch by [`apply_plan`](crate::interpreter::apply::apply_plan).

use std::path::PathBuf;

use crate::animation::ease::Curve;
use crate::animation::engine::PlaybackMode;
use crate::document::element::{
    Arrowhead, ConnectionKind, ElementKind, ElementSpec, FillStyle, LineGeometry, StrokeStyle,
    TextAlign,
};
use crate::foundation::config::{ElementStyle, SessionConfig};
use crate::foundation::core::{Color, Point, Size};
use crate::foundation::diagnostics::DiagnosticSink;
use crate::runtime::context::{BindingKind, Runtime};
use crate::runtime::expression::parser::parse_expr;
use crate::runtime::handlers::{EventKind, Handler};
use crate::runtime::variables::{InitValue, VarType};
use crate::script::command::{
    AnimateCommand, Command, ConnectCommand, CreateCommand, Declaration, Initializer, Motion,
    NumArg, PointArg, ScriptLine,
};
use crate::script::tokenizer::Token;
use crate::script::values::{
    looks_like_color, parse_bool, parse_color, parse_number, parse_point, parse_unit_point,
    split_inline_modifier,
};

/// Slide navigation requested by a script.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Navigation {
    Next,
    Prev,
}

/// Animated change with every expression already resolved.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AnimTarget {
    Position { from: Option<Point>, to: Point },
    Size { from: Option<Size>, to: Size },
    Rotation { from: Option<f64>, to: f64 },
    Color { from: Color, to: Color },
    Appear,
    Disappear,
}

/// A document side effect awaiting batch application.
#[derive(Clone, Debug, PartialEq)]
pub enum Intent {
    Background {
        line: usize,
        color: Color,
        grid: bool,
        grid_color: Option<Color>,
    },
    Create {
        line: usize,
        id: String,
        spec: ElementSpec,
    },
    /// Initial sync of a binding registered during the build.
    Bind {
        line: usize,
        element: String,
        var: String,
        kind: BindingKind,
    },
    TextUpdate {
        line: usize,
        element: String,
        text: String,
    },
    Delete {
        line: usize,
        element: String,
    },
    Connect {
        line: usize,
        from: String,
        to: String,
        kind: ConnectionKind,
        arrowhead: Arrowhead,
        color: Color,
    },
    Animate {
        line: usize,
        element: String,
        target: AnimTarget,
        start: f64,
        duration: f64,
        curve: Curve,
    },
}

/// Result of the build step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Plan {
    pub intents: Vec<Intent>,
    /// Set when the lines opened with `animation_mode`.
    pub playback: Option<PlaybackMode>,
    /// Last navigation command seen, performed after the plan is applied.
    pub navigation: Option<Navigation>,
}

impl Plan {
    pub fn creations(&self) -> usize {
        self.intents
            .iter()
            .filter(|i| matches!(i, Intent::Create { .. }))
            .count()
    }

    pub fn connections(&self) -> usize {
        self.intents
            .iter()
            .filter(|i| matches!(i, Intent::Connect { .. }))
            .count()
    }
}

/// Run the build step over `lines`.
pub(crate) fn build_plan(
    lines: &[ScriptLine],
    rt: &mut Runtime,
    cfg: &SessionConfig,
    sink: &mut DiagnosticSink,
) -> Plan {
    let mut plan = Plan::default();
    let mut builder = Builder {
        rt,
        cfg,
        sink,
        plan: &mut plan,
    };

    if let Some(Ok(Command::AnimationMode { cycled })) = lines.first().map(|l| &l.command) {
        builder.plan.playback = Some(if *cycled {
            PlaybackMode::Cycled
        } else {
            PlaybackMode::Single
        });
    }

    for (i, l) in lines.iter().enumerate() {
        match &l.command {
            Ok(cmd) => builder.command(l.line, cmd, i == 0),
            Err(e) => builder.sink.warn(l.line, format!("skipped: {e}")),
        }
    }
    plan
}

struct Builder<'a> {
    rt: &'a mut Runtime,
    cfg: &'a SessionConfig,
    sink: &'a mut DiagnosticSink,
    plan: &'a mut Plan,
}

impl Builder<'_> {
    fn command(&mut self, line: usize, cmd: &Command, first: bool) {
        match cmd {
            Command::Declare(d) => self.declare(line, d),
            Command::Set { name, expr } => self.set(line, name, expr),
            Command::TextBind { element, var } => self.bind(line, element, var, BindingKind::Text),
            Command::PositionBind { element, var } => {
                self.bind(line, element, var, BindingKind::Position)
            }
            Command::On(block) => {
                if !block.terminated {
                    self.sink.warn(
                        line,
                        format!("missing 'end' for 'on {}' block; handler dropped", block.target),
                    );
                    return;
                }
                let handler = Handler {
                    condition: block.condition,
                    body: block.body.clone(),
                };
                if self.rt.handlers.register(block.kind, &block.target, handler) {
                    tracing::debug!(handler = %block.target, kind = ?block.kind, "handler replaced");
                }
                if block.kind == EventKind::Variable && self.rt.lookup(&block.target).is_none() {
                    tracing::debug!(variable = %block.target, "handler registered before declaration");
                }
            }
            Command::CanvasBackground {
                color,
                grid,
                grid_color,
            } => self.plan.intents.push(Intent::Background {
                line,
                color: *color,
                grid: *grid,
                grid_color: *grid_color,
            }),
            Command::Create(c) => self.create(line, c),
            Command::Connect(c) => self.connect(line, c),
            Command::AnimationMode { .. } => {
                if !first {
                    self.sink
                        .warn(line, "animation_mode must be the first command; ignored");
                }
            }
            Command::Animate(a) => {
                if self.plan.playback.is_none() {
                    self.sink.warn(
                        line,
                        "animation command ignored: script does not open with animation_mode",
                    );
                    return;
                }
                self.animate(line, a);
            }
            Command::TextUpdate { element, text } => self.plan.intents.push(Intent::TextUpdate {
                line,
                element: element.clone(),
                text: self.rt.interpolate_text(text),
            }),
            Command::ElementDelete { element } => self.plan.intents.push(Intent::Delete {
                line,
                element: element.clone(),
            }),
            Command::PresentationNext => self.plan.navigation = Some(Navigation::Next),
            Command::PresentationPrev => self.plan.navigation = Some(Navigation::Prev),
            Command::AutoNextIf { var, expected } => {
                if self.rt.lookup(var).is_none() {
                    self.sink.lookup(
                        line,
                        format!("presentation_auto_next_if references unknown variable '{var}'"),
                    );
                    return;
                }
                self.rt.register_auto_next(var, expected.clone());
            }
            Command::SlideBreak => {
                self.sink
                    .warn(line, "slide break only separates slides of a top-level script");
            }
            Command::Unknown { name } => self.sink.warn(line, format!("unknown command '{name}'")),
        }
    }

    fn declare(&mut self, line: usize, d: &Declaration) {
        let init = match &d.init {
            None => None,
            Some(Initializer::Expr(src)) => match parse_expr(src) {
                Ok(expr) => Some(InitValue::Derived {
                    expr,
                    source: src.clone(),
                }),
                Err(e) => {
                    self.sink.warn(line, format!("'{}': {e}", d.name));
                    None
                }
            },
            Some(Initializer::Value(token)) => Some(self.literal_init(d.ty, token)),
        };
        self.rt.declare(&d.name, d.ty, d.global, init);
    }

    fn literal_init(&self, ty: VarType, token: &Token) -> InitValue {
        let text = token.as_str();
        match ty {
            VarType::String => InitValue::Text(self.rt.interpolate_text(text)),
            VarType::Bool => match parse_bool(text) {
                Some(b) => InitValue::Number(if b { 1.0 } else { 0.0 }),
                None => InitValue::Number(self.rt.evaluate(text)),
            },
            VarType::Int | VarType::Real => match parse_number(text) {
                Some(v) => InitValue::Number(v),
                None => InitValue::Number(self.rt.evaluate(text)),
            },
        }
    }

    fn set(&mut self, line: usize, name: &str, expr: &str) {
        let Some(var) = self.rt.lookup(name) else {
            self.sink
                .lookup(line, format!("set references unknown variable '{name}'"));
            return;
        };
        let result = if var.ty == VarType::String {
            let text = self.rt.interpolate_text(expr.trim_matches('"'));
            self.rt.set_string(name, &text)
        } else {
            let value = self.rt.evaluate(expr);
            self.rt.set(name, value)
        };
        match result {
            Ok(_) => self.rt.recompute(),
            Err(e) => self.sink.warn(line, e.to_string()),
        }
    }

    fn bind(&mut self, line: usize, element: &str, var: &str, kind: BindingKind) {
        if self.rt.lookup(var).is_none() {
            self.sink
                .lookup(line, format!("binding references unknown variable '{var}'"));
            return;
        }
        match kind {
            BindingKind::Text => self.rt.register_text_binding(element, var),
            BindingKind::Position => self.rt.register_position_binding(element, var),
        }
        self.plan.intents.push(Intent::Bind {
            line,
            element: element.to_owned(),
            var: var.to_owned(),
            kind,
        });
    }

    fn point(&mut self, line: usize, arg: &PointArg, what: &str) -> Option<Point> {
        match arg {
            PointArg::Literal(p) => Some(*p),
            PointArg::Deferred(token) => {
                let resolved = self.rt.resolve_numeric_token(token);
                let p = parse_point(&resolved);
                if p.is_none() {
                    self.sink.warn(
                        line,
                        format!("{what} '{token}' resolved to '{resolved}', not an (x,y) pair"),
                    );
                }
                p
            }
        }
    }

    fn number(&self, arg: &NumArg) -> f64 {
        match arg {
            NumArg::Literal(v) => *v,
            NumArg::Deferred(src) => self.rt.evaluate(src),
        }
    }

    fn style_for(&self, kind: ElementKind) -> &ElementStyle {
        let d = &self.cfg.defaults;
        match kind {
            ElementKind::Note => &d.note,
            ElementKind::PaperNote => &d.paper_note,
            ElementKind::Text => &d.text,
            ElementKind::Image | ElementKind::Video => &d.media,
            ElementKind::Space => &d.space,
            ElementKind::Shape(_) => &d.shape,
        }
    }

    fn create(&mut self, line: usize, c: &CreateCommand) {
        let Some(position) = self.point(line, &c.position, "position") else {
            return;
        };
        let Some(size) = self.point(line, &c.size, "size") else {
            return;
        };

        let style = self.style_for(c.kind).clone();
        let (text, media_path) = if c.kind.is_media() {
            (String::new(), Some(PathBuf::from(&c.text)))
        } else {
            (self.rt.interpolate_text(&c.text), None)
        };
        let line_geometry = match c.kind {
            ElementKind::Shape(shape) if shape.is_line_like() => Some(LineGeometry::default()),
            _ => None,
        };

        let mut spec = ElementSpec {
            kind: c.kind,
            text,
            position,
            size: Size::new(size.x, size.y),
            rotation: 0.0,
            background: style.background,
            text_color: style.text_color,
            font: style.font,
            stroke_width: style.stroke_width,
            stroke_color: None,
            stroke_style: StrokeStyle::Solid,
            filled: style.filled,
            fill_style: FillStyle::Solid,
            locked: false,
            align: None,
            line: line_geometry,
            media_path,
        };
        self.modifiers(line, &c.modifiers, &mut spec);

        self.plan.intents.push(Intent::Create {
            line,
            id: c.id.clone(),
            spec,
        });
    }

    /// Apply order-independent trailing options. Bad ones are reported and skipped.
    fn modifiers(&mut self, line: usize, tokens: &[Token], spec: &mut ElementSpec) {
        let shape = matches!(spec.kind, ElementKind::Shape(_));
        let mut i = 0;
        while i < tokens.len() {
            let tok = &tokens[i];
            i += 1;

            if tok.quoted {
                spec.font = tok.text.clone();
                continue;
            }
            let raw = tok.as_str();

            let (key, inline) = match split_inline_modifier(raw) {
                Some((k, v)) => (k, Some(v.to_owned())),
                None if raw != "color" && looks_like_color(raw) => {
                    match parse_color(&self.rt.resolve_numeric_token(raw)) {
                        Some(c) => spec.background = c,
                        None => self.sink.warn(line, format!("invalid color '{raw}'")),
                    }
                    continue;
                }
                None => (raw, None),
            };

            let flag = matches!(key, "locked" | "filled" | "fill");
            let general = matches!(
                key,
                "bg" | "background"
                    | "color"
                    | "text_color"
                    | "text"
                    | "font_color"
                    | "font"
                    | "rotation"
                    | "locked"
                    | "align"
            );
            let shape_only = matches!(
                key,
                "stroke"
                    | "stroke_width"
                    | "stroke_color"
                    | "stroke_style"
                    | "fill_style"
                    | "filled"
                    | "fill"
                    | "line_start"
                    | "line_end"
                    | "control1"
                    | "control2"
            );
            if !general && !shape_only {
                self.sink.warn(line, format!("unknown modifier '{raw}' skipped"));
                continue;
            }

            let value = match inline {
                Some(v) => Some(v),
                None if flag => match tokens.get(i).and_then(|t| parse_bool(t.as_str())) {
                    Some(b) => {
                        i += 1;
                        Some(b.to_string())
                    }
                    None => Some("true".to_owned()),
                },
                None => tokens.get(i).map(|t| {
                    i += 1;
                    t.text.clone()
                }),
            };
            let Some(value) = value else {
                self.sink.warn(line, format!("modifier '{key}' needs a value"));
                continue;
            };
            if shape_only && !shape {
                self.sink
                    .warn(line, format!("modifier '{key}' only applies to shapes"));
                continue;
            }

            if let Err(msg) = self.modifier(key, &value, spec) {
                self.sink.warn(line, format!("modifier '{key}': {msg}"));
            }
        }
    }

    fn modifier(&self, key: &str, value: &str, spec: &mut ElementSpec) -> Result<(), String> {
        let resolved = self.rt.resolve_numeric_token(value);
        let color = || parse_color(&resolved).ok_or_else(|| format!("invalid color '{value}'"));
        let number = || parse_number(&resolved).ok_or_else(|| format!("invalid number '{value}'"));
        let flag = || parse_bool(&resolved).ok_or_else(|| format!("invalid flag '{value}'"));
        let unit_point =
            || parse_unit_point(&resolved).ok_or_else(|| format!("invalid point '{value}'"));

        match key {
            "bg" | "background" | "color" => spec.background = color()?,
            "text_color" | "text" | "font_color" => spec.text_color = color()?,
            "font" => spec.font = value.to_owned(),
            "rotation" => spec.rotation = number()?,
            "locked" => spec.locked = flag()?,
            "align" => {
                spec.align = Some(
                    TextAlign::parse(value).ok_or_else(|| format!("unknown alignment '{value}'"))?,
                )
            }
            "stroke" | "stroke_width" => spec.stroke_width = number()?.max(0.0),
            "stroke_color" => spec.stroke_color = Some(color()?),
            "stroke_style" => {
                spec.stroke_style = StrokeStyle::parse(value)
                    .ok_or_else(|| format!("unknown stroke style '{value}'"))?
            }
            "fill_style" => {
                spec.fill_style = FillStyle::parse(value)
                    .ok_or_else(|| format!("unknown fill style '{value}'"))?
            }
            "filled" | "fill" => spec.filled = flag()?,
            "line_start" | "line_end" | "control1" | "control2" => {
                let p = unit_point()?;
                let geom = spec.line.get_or_insert_with(LineGeometry::default);
                match key {
                    "line_start" => geom.start = p,
                    "line_end" => geom.end = p,
                    "control1" => geom.control1 = Some(p),
                    _ => geom.control2 = Some(p),
                }
            }
            _ => return Err("not applicable".to_owned()),
        }
        Ok(())
    }

    fn connect(&mut self, line: usize, c: &ConnectCommand) {
        for option in &c.unknown {
            self.sink
                .warn(line, format!("unknown connect option '{option}' skipped"));
        }
        self.plan.intents.push(Intent::Connect {
            line,
            from: c.from.clone(),
            to: c.to.clone(),
            kind: c.kind.unwrap_or(ConnectionKind::Parallel),
            arrowhead: c.arrowhead.unwrap_or(Arrowhead::Single),
            color: c.color.unwrap_or(self.cfg.defaults.connection_color),
        });
    }

    fn animate(&mut self, line: usize, a: &AnimateCommand) {
        let size = |p: Point| Size::new(p.x, p.y);
        let target = match &a.motion {
            Motion::Move { from, to } => {
                let from = match from {
                    Some(f) => match self.point(line, f, "from point") {
                        Some(p) => Some(p),
                        None => return,
                    },
                    None => None,
                };
                let Some(to) = self.point(line, to, "to point") else {
                    return;
                };
                AnimTarget::Position { from, to }
            }
            Motion::Resize { from, to } => {
                let from = match from {
                    Some(f) => match self.point(line, f, "from size") {
                        Some(p) => Some(size(p)),
                        None => return,
                    },
                    None => None,
                };
                let Some(to) = self.point(line, to, "to size") else {
                    return;
                };
                AnimTarget::Size { from, to: size(to) }
            }
            Motion::Rotate { from, to } => AnimTarget::Rotation {
                from: from.as_ref().map(|f| self.number(f)),
                to: self.number(to),
            },
            Motion::Color { from, to } => AnimTarget::Color {
                from: *from,
                to: *to,
            },
            Motion::Appear => AnimTarget::Appear,
            Motion::Disappear => AnimTarget::Disappear,
        };

        let start = self.number(&a.start);
        let duration = self.number(&a.duration);
        if start < 0.0 || duration < 0.0 {
            self.sink.warn(
                line,
                format!("negative animation timing ({start}, {duration}) clamped to zero"),
            );
        }
        self.plan.intents.push(Intent::Animate {
            line,
            element: a.element.clone(),
            target,
            start: start.max(0.0),
            duration: duration.max(0.0),
            curve: a.curve,
        });
    }
}

#[cfg(test)]
#[path = "../../tests/unit/interpreter/plan.rs"]
mod tests;
