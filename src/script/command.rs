//! The closed set of script commands and the single parse step that produces them.
//!
//! Both the type checker and the interpreter consume [`ScriptLine`]s, so a line is tokenized
//! and classified exactly once.

use std::fmt;

use crate::animation::ease::Curve;
use crate::document::element::{Arrowhead, ConnectionKind, ElementKind, ShapeKind};
use crate::foundation::core::{Color, Point};
use crate::runtime::context::Expected;
use crate::runtime::handlers::{BodyLine, CompareOp, Condition, EventKind};
use crate::runtime::interpolate::is_identifier;
use crate::runtime::variables::VarType;
use crate::script::tokenizer::{Token, is_skippable, tokenize_line};
use crate::script::values::{looks_like_color, parse_bool, parse_color, parse_number, parse_point, split_inline_modifier};

/// Line that separates slides of a presentation script.
pub const SLIDE_BREAK: &str = "animation_next_slide";

/// Why a line could not be turned into a [`Command`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ParseError {}

/// A number given literally or as a `{expr}` resolved at execution time.
#[derive(Clone, Debug, PartialEq)]
pub enum NumArg {
    Literal(f64),
    Deferred(String),
}

/// An `(x,y)` pair given literally or with `{expr}` parts resolved at execution time.
#[derive(Clone, Debug, PartialEq)]
pub enum PointArg {
    Literal(Point),
    Deferred(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Initializer {
    /// A literal token; non-literal numeric text is evaluated once.
    Value(Token),
    /// `{expr}`: the variable stays derived from this expression.
    Expr(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Declaration {
    pub global: bool,
    pub ty: VarType,
    pub name: String,
    pub init: Option<Initializer>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CreateCommand {
    pub kind: ElementKind,
    pub id: String,
    /// Display text, or the file path for media elements.
    pub text: String,
    pub position: PointArg,
    pub size: PointArg,
    /// Order-independent trailing options, interpreted (and warned about) at execution time.
    pub modifiers: Vec<Token>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConnectCommand {
    pub from: String,
    pub to: String,
    pub kind: Option<ConnectionKind>,
    pub arrowhead: Option<Arrowhead>,
    pub color: Option<Color>,
    pub unknown: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Motion {
    Move {
        from: Option<PointArg>,
        to: PointArg,
    },
    Resize {
        from: Option<PointArg>,
        to: PointArg,
    },
    Rotate {
        from: Option<NumArg>,
        to: NumArg,
    },
    Color {
        from: Color,
        to: Color,
    },
    Appear,
    Disappear,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnimateCommand {
    pub element: String,
    pub motion: Motion,
    pub start: NumArg,
    pub duration: NumArg,
    pub curve: Curve,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EventBlock {
    pub kind: EventKind,
    pub target: String,
    pub condition: Condition,
    pub body: Vec<BodyLine>,
    /// `false` when no matching `end` was found; the block is then dropped.
    pub terminated: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Declare(Declaration),
    Set { name: String, expr: String },
    TextBind { element: String, var: String },
    PositionBind { element: String, var: String },
    On(EventBlock),
    CanvasBackground {
        color: Color,
        grid: bool,
        grid_color: Option<Color>,
    },
    Create(CreateCommand),
    Connect(ConnectCommand),
    AnimationMode { cycled: bool },
    Animate(AnimateCommand),
    TextUpdate { element: String, text: String },
    ElementDelete { element: String },
    PresentationNext,
    PresentationPrev,
    AutoNextIf { var: String, expected: Expected },
    SlideBreak,
    Unknown { name: String },
}

impl Command {
    pub fn is_animation(&self) -> bool {
        matches!(self, Self::Animate(_))
    }
}

/// One non-blank, non-comment line (or `on ... end` block) of a script.
#[derive(Clone, Debug, PartialEq)]
pub struct ScriptLine {
    /// 1-based line of the command's first token.
    pub line: usize,
    pub command: Result<Command, ParseError>,
}

/// Parse a whole script.
pub fn parse_script(text: &str) -> Vec<ScriptLine> {
    let numbered: Vec<BodyLine> = text
        .lines()
        .enumerate()
        .map(|(i, l)| BodyLine {
            line: i + 1,
            text: l.to_owned(),
        })
        .collect();
    parse_lines(&numbered)
}

/// Parse already-numbered lines, such as a handler body.
pub fn parse_lines(lines: &[BodyLine]) -> Vec<ScriptLine> {
    let mut out = Vec::new();
    let mut i = 0usize;
    while i < lines.len() {
        let BodyLine { line, text } = &lines[i];
        i += 1;
        if is_skippable(text) {
            continue;
        }
        let tokens = tokenize_line(text);
        if first_word(&tokens) == Some("on") {
            let (command, consumed) = parse_event_block(&tokens, &lines[i..]);
            i += consumed;
            out.push(ScriptLine {
                line: *line,
                command,
            });
            continue;
        }
        out.push(ScriptLine {
            line: *line,
            command: parse_tokens(&tokens),
        });
    }
    out
}

fn first_word(tokens: &[Token]) -> Option<&str> {
    tokens.first().filter(|t| !t.quoted).map(Token::as_str)
}

/// Collect the body of an `on` block. Returns the command and how many following lines it
/// consumed (zero when unterminated, so the rest of the script still runs).
fn parse_event_block(header: &[Token], rest: &[BodyLine]) -> (Result<Command, ParseError>, usize) {
    let mut depth = 1usize;
    let mut end = None;
    for (j, l) in rest.iter().enumerate() {
        if is_skippable(&l.text) {
            continue;
        }
        match first_word(&tokenize_line(&l.text)) {
            Some("on") => depth += 1,
            Some("end") => {
                depth -= 1;
                if depth == 0 {
                    end = Some(j);
                    break;
                }
            }
            _ => {}
        }
    }

    let (body, consumed, terminated) = match end {
        Some(j) => (rest[..j].to_vec(), j + 1, true),
        None => (Vec::new(), 0, false),
    };

    let block = parse_event_header(header).map(|(kind, target, condition)| {
        Command::On(EventBlock {
            kind,
            target,
            condition,
            body,
            terminated,
        })
    });
    (block, consumed)
}

fn parse_event_header(t: &[Token]) -> Result<(EventKind, String, Condition), ParseError> {
    if t.len() < 3 {
        return Err(ParseError::new("usage: on click|variable <target>"));
    }
    let kind = EventKind::parse(t[1].as_str())
        .ok_or_else(|| ParseError::new(format!("unknown event kind '{}'", t[1].as_str())))?;
    let target = t[2].text.clone();
    let condition = match (kind, &t[3..]) {
        (_, []) => Condition::Always,
        (EventKind::Variable, [op, value]) => {
            let op = CompareOp::parse(op.as_str()).ok_or_else(|| {
                ParseError::new(format!("unknown comparison '{}'", op.as_str()))
            })?;
            let value = parse_number(value.as_str()).ok_or_else(|| {
                ParseError::new(format!("invalid comparison value '{}'", value.as_str()))
            })?;
            Condition::Compare(op, value)
        }
        _ => return Err(ParseError::new("unexpected tokens after event target")),
    };
    Ok((kind, target, condition))
}

fn arity(t: &[Token], min: usize, usage: &str) -> Result<(), ParseError> {
    if t.len() < min {
        Err(ParseError::new(format!("usage: {usage}")))
    } else {
        Ok(())
    }
}

pub(crate) fn is_deferred(token: &str) -> bool {
    token.contains('{')
}

fn point_arg(t: &Token, what: &str) -> Result<PointArg, ParseError> {
    if is_deferred(t.as_str()) {
        return Ok(PointArg::Deferred(t.text.clone()));
    }
    parse_point(t.as_str())
        .map(PointArg::Literal)
        .ok_or_else(|| ParseError::new(format!("invalid {what} '{}', expected (x,y)", t.as_str())))
}

fn num_arg(t: &Token, what: &str) -> Result<NumArg, ParseError> {
    if is_deferred(t.as_str()) {
        return Ok(NumArg::Deferred(t.text.clone()));
    }
    parse_number(t.as_str())
        .map(NumArg::Literal)
        .ok_or_else(|| ParseError::new(format!("invalid {what} '{}'", t.as_str())))
}

fn color_arg(t: &Token, what: &str) -> Result<Color, ParseError> {
    parse_color(t.as_str())
        .ok_or_else(|| ParseError::new(format!("invalid {what} color '{}'", t.as_str())))
}

fn curve_arg(t: Option<&Token>) -> Result<Curve, ParseError> {
    match t {
        None => Ok(Curve::Linear),
        Some(t) => Curve::parse(t.as_str())
            .ok_or_else(|| ParseError::new(format!("unknown interpolation '{}'", t.as_str()))),
    }
}

fn is_point_like(t: &Token) -> bool {
    let s = t.as_str();
    !t.quoted && (s.starts_with('(') || (s.starts_with('{') && s.contains(',')))
}

fn is_number_like(t: &Token) -> bool {
    !t.quoted && (parse_number(t.as_str()).is_some() || t.as_str().starts_with('{'))
}

/// Classify one tokenized line. `on` blocks are handled by [`parse_lines`].
pub fn parse_tokens(t: &[Token]) -> Result<Command, ParseError> {
    let Some(head) = t.first() else {
        return Err(ParseError::new("empty line"));
    };
    let head = head.as_str();

    if head == "global" || VarType::parse(head).is_some() {
        return parse_declaration(t);
    }

    match head {
        "set" => {
            arity(t, 3, "set <var> <expr>")?;
            let expr = t[2..]
                .iter()
                .map(Token::as_str)
                .collect::<Vec<_>>()
                .join(" ");
            Ok(Command::Set {
                name: t[1].text.clone(),
                expr,
            })
        }
        "text_bind" | "position_bind" => {
            arity(t, 3, &format!("{head} <element> <var>"))?;
            let (element, var) = (t[1].text.clone(), t[2].text.clone());
            Ok(if head == "text_bind" {
                Command::TextBind { element, var }
            } else {
                Command::PositionBind { element, var }
            })
        }
        "canvas_background" => {
            arity(t, 3, "canvas_background (r,g,b,a) <true|false> [(r,g,b,a)]")?;
            let color = color_arg(&t[1], "background")?;
            let grid = parse_bool(t[2].as_str()).ok_or_else(|| {
                ParseError::new(format!("invalid grid flag '{}'", t[2].as_str()))
            })?;
            let grid_color = t.get(3).map(|c| color_arg(c, "grid")).transpose()?;
            Ok(Command::CanvasBackground {
                color,
                grid,
                grid_color,
            })
        }
        "note_create" | "paper_note_create" | "text_create" | "image_create" | "video_create"
        | "space_create" => {
            arity(t, 5, &format!("{head} <id> <text> (x,y) (w,h)"))?;
            let kind = match head {
                "note_create" => ElementKind::Note,
                "paper_note_create" => ElementKind::PaperNote,
                "text_create" => ElementKind::Text,
                "image_create" => ElementKind::Image,
                "video_create" => ElementKind::Video,
                _ => ElementKind::Space,
            };
            Ok(Command::Create(CreateCommand {
                kind,
                id: t[1].text.clone(),
                text: t[2].text.clone(),
                position: point_arg(&t[3], "position")?,
                size: point_arg(&t[4], "size")?,
                modifiers: t[5..].to_vec(),
            }))
        }
        "shape_create" => {
            arity(t, 6, "shape_create <id> <shape> <text> (x,y) (w,h)")?;
            let shape = ShapeKind::parse(t[2].as_str()).ok_or_else(|| {
                ParseError::new(format!("unknown shape type '{}'", t[2].as_str()))
            })?;
            Ok(Command::Create(CreateCommand {
                kind: ElementKind::Shape(shape),
                id: t[1].text.clone(),
                text: t[3].text.clone(),
                position: point_arg(&t[4], "position")?,
                size: point_arg(&t[5], "size")?,
                modifiers: t[6..].to_vec(),
            }))
        }
        "connect" => parse_connect(t),
        "animation_mode" => match t.get(1).map(Token::as_str) {
            None | Some("single") | Some("once") => Ok(Command::AnimationMode { cycled: false }),
            Some("cycled") => Ok(Command::AnimationMode { cycled: true }),
            Some(other) => Err(ParseError::new(format!("unknown animation mode '{other}'"))),
        },
        "animate_move" | "animate_resize" | "animate_rotate" | "animate_color"
        | "animate_appear" | "animate_disappear" => parse_animate(t),
        "text_update" => {
            arity(t, 3, "text_update <element> \"<text>\"")?;
            let text = t[2..]
                .iter()
                .map(Token::as_str)
                .collect::<Vec<_>>()
                .join(" ");
            Ok(Command::TextUpdate {
                element: t[1].text.clone(),
                text,
            })
        }
        "element_delete" => {
            arity(t, 2, "element_delete <element>")?;
            Ok(Command::ElementDelete {
                element: t[1].text.clone(),
            })
        }
        "presentation_next" => Ok(Command::PresentationNext),
        "presentation_prev" => Ok(Command::PresentationPrev),
        "presentation_auto_next_if" => {
            arity(t, 3, "presentation_auto_next_if <var> <value>")?;
            let value = &t[2];
            let expected = match parse_number(value.as_str()) {
                Some(n) if !value.quoted => Expected::Number(n),
                _ => Expected::Text(value.text.clone()),
            };
            Ok(Command::AutoNextIf {
                var: t[1].text.clone(),
                expected,
            })
        }
        SLIDE_BREAK => Ok(Command::SlideBreak),
        _ => Ok(Command::Unknown {
            name: head.to_owned(),
        }),
    }
}

fn parse_declaration(t: &[Token]) -> Result<Command, ParseError> {
    let global = t[0].as_str() == "global";
    let rest = if global { &t[1..] } else { t };
    let usage = "[global] int|real|bool|string <name> [value]";
    let ty = rest
        .first()
        .and_then(|k| VarType::parse(k.as_str()))
        .ok_or_else(|| ParseError::new(format!("usage: {usage}")))?;
    let name = rest
        .get(1)
        .ok_or_else(|| ParseError::new(format!("usage: {usage}")))?;
    if !is_identifier(name.as_str()) {
        return Err(ParseError::new(format!(
            "invalid variable name '{}'",
            name.as_str()
        )));
    }

    let init = match &rest[2..] {
        [] => None,
        [one] if !one.quoted && one.as_str().starts_with('{') => Some(Initializer::Expr(
            crate::runtime::expression::parser::strip_braces(one.as_str()).to_owned(),
        )),
        [one] => Some(Initializer::Value(one.clone())),
        many => {
            let joined = many
                .iter()
                .map(Token::as_str)
                .collect::<Vec<_>>()
                .join(" ");
            Some(Initializer::Value(Token {
                text: joined,
                quoted: ty == VarType::String,
            }))
        }
    };

    Ok(Command::Declare(Declaration {
        global,
        ty,
        name: name.text.clone(),
        init,
    }))
}

fn parse_connect(t: &[Token]) -> Result<Command, ParseError> {
    arity(t, 3, "connect <from> <to> [straight|parallel] [none|single|double] [color]")?;
    let mut cmd = ConnectCommand {
        from: t[1].text.clone(),
        to: t[2].text.clone(),
        kind: None,
        arrowhead: None,
        color: None,
        unknown: Vec::new(),
    };

    let mut i = 3;
    while i < t.len() {
        let tok = t[i].as_str();
        i += 1;
        if let Some(kind) = ConnectionKind::parse(tok) {
            cmd.kind = Some(kind);
        } else if let Some(arrow) = Arrowhead::parse(tok) {
            cmd.arrowhead = Some(arrow);
        } else if tok == "color" {
            let value = t
                .get(i)
                .ok_or_else(|| ParseError::new("connect: 'color' needs a value"))?;
            cmd.color = Some(color_arg(value, "connection")?);
            i += 1;
        } else if let Some(("color", value)) = split_inline_modifier(tok) {
            cmd.color = Some(
                parse_color(value)
                    .ok_or_else(|| ParseError::new(format!("invalid connection color '{tok}'")))?,
            );
        } else if looks_like_color(tok) {
            cmd.color = Some(color_arg(&t[i - 1], "connection")?);
        } else {
            cmd.unknown.push(tok.to_owned());
        }
    }
    Ok(Command::Connect(cmd))
}

fn parse_animate(t: &[Token]) -> Result<Command, ParseError> {
    let head = t[0].as_str();
    arity(t, 2, &format!("{head} <element> ..."))?;
    let element = t[1].text.clone();
    let args = &t[2..];

    let (motion, timing) = match head {
        "animate_move" | "animate_resize" => {
            let points = args.iter().take(2).take_while(|a| is_point_like(a)).count();
            if points == 0 {
                return Err(ParseError::new(format!(
                    "usage: {head} <element> [(from)] (to) <start> <duration> [curve]"
                )));
            }
            let from = if points == 2 {
                Some(point_arg(&args[0], "from point")?)
            } else {
                None
            };
            let to = point_arg(&args[points - 1], "to point")?;
            let motion = if head == "animate_move" {
                Motion::Move { from, to }
            } else {
                Motion::Resize { from, to }
            };
            (motion, &args[points..])
        }
        "animate_rotate" => {
            let numbers = args.iter().take_while(|a| is_number_like(a)).count();
            match numbers {
                n if n >= 4 => (
                    Motion::Rotate {
                        from: Some(num_arg(&args[0], "rotation")?),
                        to: num_arg(&args[1], "rotation")?,
                    },
                    &args[2..],
                ),
                3 => (
                    Motion::Rotate {
                        from: None,
                        to: num_arg(&args[0], "rotation")?,
                    },
                    &args[1..],
                ),
                _ => {
                    return Err(ParseError::new(
                        "usage: animate_rotate <element> [from] <to> <start> <duration> [curve]",
                    ));
                }
            }
        }
        "animate_color" => {
            arity(args, 2, "animate_color <element> <from> <to> <start> <duration> [curve]")?;
            (
                Motion::Color {
                    from: color_arg(&args[0], "from")?,
                    to: color_arg(&args[1], "to")?,
                },
                &args[2..],
            )
        }
        "animate_appear" => (Motion::Appear, args),
        _ => (Motion::Disappear, args),
    };

    arity(timing, 2, &format!("{head} ... <start> <duration> [curve]"))?;
    Ok(Command::Animate(AnimateCommand {
        element,
        motion,
        start: num_arg(&timing[0], "start time")?,
        duration: num_arg(&timing[1], "duration")?,
        curve: curve_arg(timing.get(2))?,
    }))
}

#[cfg(test)]
#[path = "../../tests/unit/script/command.rs"]
mod tests;
