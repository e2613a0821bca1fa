//! Event handler registry.
//!
//! A handler is a verbatim block of script lines registered with `on click <id>` or
//! `on variable <name> [<op> <value>]`. Registering again for the same key replaces the
//! earlier block.

use std::collections::HashMap;

/// Event a handler listens for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Click,
    Variable,
}

impl EventKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "click" => Some(Self::Click),
            "variable" => Some(Self::Variable),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "==" => Some(Self::Eq),
            "!=" => Some(Self::Ne),
            "<" => Some(Self::Lt),
            "<=" => Some(Self::Le),
            ">" => Some(Self::Gt),
            ">=" => Some(Self::Ge),
            _ => None,
        }
    }
}

/// Guard on a variable-change handler.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Condition {
    #[default]
    Always,
    Compare(CompareOp, f64),
}

impl Condition {
    pub fn holds(self, value: f64) -> bool {
        const EPS: f64 = 1e-9;
        match self {
            Self::Always => true,
            Self::Compare(op, rhs) => match op {
                CompareOp::Eq => (value - rhs).abs() < EPS,
                CompareOp::Ne => (value - rhs).abs() >= EPS,
                CompareOp::Lt => value < rhs,
                CompareOp::Le => value <= rhs,
                CompareOp::Gt => value > rhs,
                CompareOp::Ge => value >= rhs,
            },
        }
    }
}

/// One line of a handler body together with its line in the original script.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BodyLine {
    pub line: usize,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Handler {
    pub condition: Condition,
    pub body: Vec<BodyLine>,
}

#[derive(Clone, Debug, Default)]
pub struct HandlerRegistry {
    click: HashMap<String, Handler>,
    variable: HashMap<String, Handler>,
}

impl HandlerRegistry {
    /// Register `handler`; returns `true` when it replaced an earlier one.
    pub fn register(&mut self, kind: EventKind, target: &str, handler: Handler) -> bool {
        let map = match kind {
            EventKind::Click => &mut self.click,
            EventKind::Variable => &mut self.variable,
        };
        map.insert(target.to_owned(), handler).is_some()
    }

    /// Snapshot of the handler for `target`, safe to run while the registry changes.
    pub fn get(&self, kind: EventKind, target: &str) -> Option<Handler> {
        match kind {
            EventKind::Click => self.click.get(target),
            EventKind::Variable => self.variable.get(target),
        }
        .cloned()
    }

    pub fn len(&self) -> usize {
        self.click.len() + self.variable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.click.clear();
        self.variable.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/handlers.rs"]
mod tests;
