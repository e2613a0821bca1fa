use std::collections::{HashMap, VecDeque};

use crate::foundation::core::ElementId;
use crate::foundation::error::ScriptResult;
use crate::runtime::handlers::HandlerRegistry;
use crate::runtime::interpolate;
use crate::runtime::variables::{Declared, InitValue, VarType, Variable, VariableStore};

/// Value a `presentation_auto_next_if` watch waits for.
#[derive(Clone, Debug, PartialEq)]
pub enum Expected {
    Number(f64),
    Text(String),
}

#[derive(Clone, Debug)]
struct AutoNextWatch {
    expected: Expected,
    triggered: bool,
}

/// One queued assignment: the variable and the numeric value it was given.
///
/// String variables carry their text parsed as a number, or `0.0`.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Change {
    pub(crate) name: String,
    pub(crate) value: f64,
}

/// Live link from a variable to an element property.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingKind {
    Text,
    Position,
}

/// Interpreter state shared by every line of one execution and by later event handlers.
///
/// A fresh top-level execution and a slide transition both call [`Runtime::reset`]; global
/// variables survive it.
#[derive(Debug)]
pub struct Runtime {
    vars: VariableStore,
    elements: HashMap<String, ElementId>,
    bindings: HashMap<String, (BindingKind, String)>,
    pub(crate) handlers: HandlerRegistry,
    auto_next: HashMap<String, AutoNextWatch>,
    pending: VecDeque<Change>,
    advance_requested: bool,
    tolerance: f64,
}

impl Runtime {
    pub fn new(tolerance: f64) -> Self {
        Self {
            vars: VariableStore::default(),
            elements: HashMap::new(),
            bindings: HashMap::new(),
            handlers: HandlerRegistry::default(),
            auto_next: HashMap::new(),
            pending: VecDeque::new(),
            advance_requested: false,
            tolerance,
        }
    }

    /// Clear everything except global variables.
    pub fn reset(&mut self) {
        self.vars.clear(true);
        self.elements.clear();
        self.bindings.clear();
        self.handlers.clear();
        self.auto_next.clear();
        self.pending.clear();
        self.advance_requested = false;
    }

    pub fn variables(&self) -> &VariableStore {
        &self.vars
    }

    pub fn lookup(&self, name: &str) -> Option<&Variable> {
        self.vars.get(name)
    }

    pub(crate) fn declare(
        &mut self,
        name: &str,
        ty: VarType,
        global: bool,
        init: Option<InitValue>,
    ) -> Declared {
        // Declarations initialize silently; only later assignments notify watchers.
        self.vars.declare(name, ty, global, init)
    }

    /// Assign a number and queue change notifications when it changed.
    pub fn set(&mut self, name: &str, value: f64) -> ScriptResult<bool> {
        let changed = self.vars.set_number(name, value, self.tolerance)?;
        if changed {
            self.changed(name);
        }
        Ok(changed)
    }

    pub fn set_string(&mut self, name: &str, value: &str) -> ScriptResult<bool> {
        let changed = self.vars.set_text(name, value)?;
        if changed {
            self.changed(name);
        }
        Ok(changed)
    }

    /// Re-evaluate derived variables after an assignment.
    pub(crate) fn recompute(&mut self) {
        for name in self.vars.recompute(self.tolerance) {
            self.changed(&name);
        }
    }

    /// Evaluate an expression; text that does not parse evaluates to `0.0`.
    pub fn evaluate(&self, source: &str) -> f64 {
        match crate::runtime::expression::parser::parse_expr(source) {
            Ok(expr) => self.vars.evaluate(&expr),
            Err(e) => {
                tracing::warn!(expression = source, "{e}");
                0.0
            }
        }
    }

    pub fn interpolate_text(&self, template: &str) -> String {
        interpolate::interpolate_text(&self.vars, template)
    }

    pub fn resolve_numeric_token(&self, token: &str) -> String {
        interpolate::resolve_numeric_token(&self.vars, token)
    }

    pub fn register_element(&mut self, id: &str, element: ElementId) {
        self.elements.insert(id.to_owned(), element);
    }

    pub fn element(&self, id: &str) -> Option<ElementId> {
        self.elements.get(id).copied()
    }

    /// Script-local id of a document element, if this execution created it.
    pub fn script_id_of(&self, element: ElementId) -> Option<&str> {
        self.elements
            .iter()
            .find(|(_, e)| **e == element)
            .map(|(id, _)| id.as_str())
    }

    pub(crate) fn forget_element(&mut self, id: &str) {
        self.elements.remove(id);
        self.bindings.remove(id);
    }

    pub fn register_text_binding(&mut self, element_id: &str, var: &str) {
        self.bindings
            .insert(element_id.to_owned(), (BindingKind::Text, var.to_owned()));
    }

    pub fn register_position_binding(&mut self, element_id: &str, var: &str) {
        self.bindings
            .insert(element_id.to_owned(), (BindingKind::Position, var.to_owned()));
    }

    pub fn binding_of(&self, element_id: &str) -> Option<(BindingKind, &str)> {
        self.bindings
            .get(element_id)
            .map(|(kind, var)| (*kind, var.as_str()))
    }

    /// Elements whose text is bound to `var`.
    pub(crate) fn text_bound_elements(&self, var: &str) -> Vec<ElementId> {
        let mut out: Vec<ElementId> = self
            .bindings
            .iter()
            .filter(|(_, (kind, v))| *kind == BindingKind::Text && v == var)
            .filter_map(|(id, _)| self.element(id))
            .collect();
        out.sort();
        out
    }

    /// Watch `var` and request the next slide once it equals `expected`.
    pub fn register_auto_next(&mut self, var: &str, expected: Expected) {
        self.auto_next.insert(
            var.to_owned(),
            AutoNextWatch {
                expected,
                triggered: false,
            },
        );
        self.check_auto_next(var);
    }

    pub(crate) fn check_auto_next(&mut self, var: &str) {
        let Some(value) = self.vars.get(var) else {
            return;
        };
        let Some(watch) = self.auto_next.get_mut(var) else {
            return;
        };
        if watch.triggered {
            return;
        }
        let matched = match &watch.expected {
            Expected::Text(s) => value.display_value() == *s,
            Expected::Number(n) => {
                let current = if value.ty.is_numeric() {
                    value.number
                } else {
                    match value.text.trim().parse::<f64>() {
                        Ok(v) => v,
                        Err(_) => return,
                    }
                };
                (current - n).abs() < self.tolerance.max(f64::EPSILON)
            }
        };
        if matched {
            tracing::debug!(variable = var, "auto-advance condition met");
            watch.triggered = true;
            self.advance_requested = true;
        }
    }

    /// Take a pending auto-advance request.
    pub(crate) fn take_advance_request(&mut self) -> bool {
        std::mem::take(&mut self.advance_requested)
    }

    fn changed(&mut self, name: &str) {
        let value = self.vars.get(name).map_or(0.0, |v| {
            if v.ty.is_numeric() {
                v.number
            } else {
                v.text.trim().parse().unwrap_or(0.0)
            }
        });
        self.pending.push_back(Change {
            name: name.to_owned(),
            value,
        });
    }

    pub(crate) fn pop_changed(&mut self) -> Option<Change> {
        self.pending.pop_front()
    }

    pub(crate) fn drop_pending(&mut self) -> usize {
        let n = self.pending.len();
        self.pending.clear();
        n
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/context.rs"]
mod tests;
