use std::collections::BTreeMap;

use crate::foundation::error::{ScriptError, ScriptResult};
use crate::runtime::expression::ast::Expr;
use crate::runtime::expression::eval::{Binding, Scope, eval};

/// Declared type of a script variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarType {
    Int,
    Real,
    Bool,
    String,
}

impl VarType {
    pub fn parse(keyword: &str) -> Option<Self> {
        match keyword {
            "int" => Some(Self::Int),
            "real" => Some(Self::Real),
            "bool" => Some(Self::Bool),
            "string" => Some(Self::String),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Real => "real",
            Self::Bool => "bool",
            Self::String => "string",
        }
    }

    pub fn is_numeric(self) -> bool {
        !matches!(self, Self::String)
    }

    /// Normalize a raw number into this type's domain.
    fn coerce(self, value: f64) -> f64 {
        match self {
            Self::Int => value.round(),
            Self::Bool => {
                if value != 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Real | Self::String => value,
        }
    }
}

/// Initial value given in a declaration.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum InitValue {
    Number(f64),
    Text(String),
    /// `{expr}`: the variable is derived and re-evaluated after every `set`.
    Derived { expr: Expr, source: String },
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Variable {
    pub name: String,
    pub ty: VarType,
    pub number: f64,
    pub text: String,
    /// Source of a derived variable's expression.
    pub source: Option<String>,
    pub global: bool,
    #[serde(skip)]
    pub(crate) expr: Option<Expr>,
}

impl Variable {
    /// Text shown for this variable in bindings and interpolation.
    pub fn display_value(&self) -> String {
        match self.ty {
            VarType::String => self.text.clone(),
            _ => format_number(self.number),
        }
    }
}

/// Integral values print without decimals, others in shortest round-trip form.
pub fn format_number(v: f64) -> String {
    if (v - v.round()).abs() < 1e-6 {
        // `+ 0.0` folds negative zero.
        format!("{:.0}", v.round() + 0.0)
    } else {
        format!("{v}")
    }
}

/// What a declaration did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Declared {
    Created,
    /// An initialized global of the same type was kept as is.
    KeptGlobal,
    /// An existing variable was re-initialized.
    Replaced,
}

/// Typed variable store.
#[derive(Clone, Debug, Default)]
pub struct VariableStore {
    vars: BTreeMap<String, Variable>,
}

impl VariableStore {
    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.vars.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.vars.values()
    }

    pub(crate) fn declare(
        &mut self,
        name: &str,
        ty: VarType,
        global: bool,
        init: Option<InitValue>,
    ) -> Declared {
        let existed = match self.vars.get(name) {
            Some(v) if v.global && global && v.ty == ty => return Declared::KeptGlobal,
            Some(_) => true,
            None => false,
        };

        let mut var = Variable {
            name: name.to_owned(),
            ty,
            number: 0.0,
            text: String::new(),
            source: None,
            global,
            expr: None,
        };
        match init {
            Some(InitValue::Number(v)) => var.number = ty.coerce(v),
            Some(InitValue::Text(t)) => {
                if ty == VarType::String {
                    var.text = t;
                } else {
                    var.number = ty.coerce(t.trim().parse().unwrap_or(0.0));
                }
            }
            Some(InitValue::Derived { expr, source }) => {
                if ty == VarType::String {
                    var.text = source;
                } else {
                    var.number = ty.coerce(eval(&expr, self));
                    var.expr = Some(expr);
                    var.source = Some(source);
                }
            }
            None => {}
        }
        self.vars.insert(name.to_owned(), var);

        if existed {
            Declared::Replaced
        } else {
            Declared::Created
        }
    }

    /// Assign a number. Returns whether the stored value changed beyond `tolerance`.
    pub(crate) fn set_number(&mut self, name: &str, value: f64, tolerance: f64) -> ScriptResult<bool> {
        let var = self
            .vars
            .get_mut(name)
            .ok_or_else(|| ScriptError::evaluation(format!("unknown variable '{name}'")))?;
        if !var.ty.is_numeric() {
            return Err(ScriptError::evaluation(format!(
                "cannot assign a number to string variable '{name}'"
            )));
        }
        let value = var.ty.coerce(value);
        if (var.number - value).abs() < tolerance {
            return Ok(false);
        }
        var.number = value;
        Ok(true)
    }

    /// Assign a string. Returns whether the stored value changed.
    pub(crate) fn set_text(&mut self, name: &str, value: &str) -> ScriptResult<bool> {
        let var = self
            .vars
            .get_mut(name)
            .ok_or_else(|| ScriptError::evaluation(format!("unknown variable '{name}'")))?;
        if var.ty != VarType::String {
            return Err(ScriptError::evaluation(format!(
                "cannot assign a string to {} variable '{name}'",
                var.ty.as_str()
            )));
        }
        if var.text == value {
            return Ok(false);
        }
        var.text = value.to_owned();
        Ok(true)
    }

    pub(crate) fn evaluate(&self, expr: &Expr) -> f64 {
        eval(expr, self)
    }

    /// Re-evaluate every derived variable. Returns the names whose value changed.
    pub(crate) fn recompute(&mut self, tolerance: f64) -> Vec<String> {
        let updates: Vec<(String, f64)> = self
            .vars
            .values()
            .filter_map(|v| v.expr.as_ref().map(|e| (v.name.clone(), eval(e, self))))
            .collect();

        let mut changed = Vec::new();
        for (name, value) in updates {
            if let Ok(true) = self.set_number(&name, value, tolerance) {
                changed.push(name);
            }
        }
        changed
    }

    /// Drop every variable, or every non-global one.
    pub(crate) fn clear(&mut self, keep_globals: bool) {
        if keep_globals {
            self.vars.retain(|_, v| v.global);
        } else {
            self.vars.clear();
        }
    }
}

impl Scope for VariableStore {
    fn binding(&self, name: &str) -> Binding<'_> {
        match self.vars.get(name) {
            None => Binding::Unknown,
            Some(v) if !v.ty.is_numeric() => Binding::NonNumeric,
            Some(v) => match &v.expr {
                Some(e) => Binding::Derived(e),
                None => Binding::Number(v.number),
            },
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/variables.rs"]
mod tests;
