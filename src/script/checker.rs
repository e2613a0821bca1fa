//! Whole-script static pass that runs before any mutation.
//!
//! The checker rejects a script when any line fails to parse, when a variable referenced by a
//! binding, assignment, watch or text placeholder is declared nowhere, or when a slide
//! declares the same local variable or element id twice. Unknown command names and element
//! references are left to the interpreter, which reports them per line.

use std::collections::HashSet;

use crate::foundation::error::{TypeCheckFailure, TypeDiagnostic};
use crate::runtime::expression::parser::parse_expr;
use crate::runtime::handlers::EventKind;
use crate::runtime::interpolate::{is_identifier, placeholders};
use crate::script::command::{Command, Initializer, ScriptLine, parse_lines};

/// Type-check parsed lines. Names in `known` (globals surviving from earlier executions)
/// count as declared.
pub fn type_check(
    lines: &[ScriptLine],
    known: &[&str],
    source: Option<&str>,
) -> Result<(), TypeCheckFailure> {
    let mut declared: HashSet<String> = known.iter().map(|v| (*v).to_owned()).collect();
    collect_declarations(lines, &mut declared);

    let mut checker = Checker {
        source,
        declared,
        locals: HashSet::new(),
        elements: HashSet::new(),
        diagnostics: Vec::new(),
    };
    checker.walk(lines, true);

    if checker.diagnostics.is_empty() {
        Ok(())
    } else {
        checker.diagnostics.sort_by_key(|d| d.line);
        Err(TypeCheckFailure {
            diagnostics: checker.diagnostics,
        })
    }
}

/// Names declared anywhere, including inside handler bodies.
fn collect_declarations(lines: &[ScriptLine], out: &mut HashSet<String>) {
    for l in lines {
        match &l.command {
            Ok(Command::Declare(d)) => {
                out.insert(d.name.clone());
            }
            Ok(Command::On(block)) => collect_declarations(&parse_lines(&block.body), out),
            _ => {}
        }
    }
}

struct Checker<'a> {
    source: Option<&'a str>,
    declared: HashSet<String>,
    locals: HashSet<String>,
    elements: HashSet<String>,
    diagnostics: Vec<TypeDiagnostic>,
}

impl Checker<'_> {
    fn error(&mut self, line: usize, message: impl Into<String>) {
        self.diagnostics.push(TypeDiagnostic {
            line,
            source: self.source.map(str::to_owned),
            message: message.into(),
        });
    }

    fn require_var(&mut self, line: usize, name: &str, what: &str) {
        if !self.declared.contains(name) {
            self.error(line, format!("{what} references undeclared variable '{name}'"));
        }
    }

    fn require_expr(&mut self, line: usize, src: &str) {
        match parse_expr(src) {
            Ok(expr) => {
                let missing: Vec<String> = expr
                    .variables()
                    .into_iter()
                    .filter(|v| !self.declared.contains(*v))
                    .map(str::to_owned)
                    .collect();
                for name in missing {
                    self.error(line, format!("expression references undeclared variable '{name}'"));
                }
            }
            Err(e) => self.error(line, format!("invalid expression '{src}': {e}")),
        }
    }

    fn check_template(&mut self, line: usize, template: &str) {
        for body in placeholders(template) {
            if is_identifier(body) {
                self.require_var(line, body, "text");
            } else if let Ok(expr) = parse_expr(body) {
                for name in expr.variables() {
                    if !self.declared.contains(name) {
                        self.error(line, format!("text references undeclared variable '{name}'"));
                    }
                }
            }
        }
    }

    /// `top` is false inside handler bodies, which run later and may redeclare freely.
    fn walk(&mut self, lines: &[ScriptLine], top: bool) {
        for l in lines {
            let line = l.line;
            let cmd = match &l.command {
                Ok(cmd) => cmd,
                Err(e) => {
                    self.error(line, e.message.clone());
                    continue;
                }
            };
            match cmd {
                Command::Declare(d) => {
                    if top && !d.global && !self.locals.insert(d.name.clone()) {
                        self.error(line, format!("variable '{}' is declared twice", d.name));
                    }
                    if let Some(Initializer::Expr(src)) = &d.init {
                        self.require_expr(line, src);
                    }
                }
                Command::Set { name, expr } => {
                    self.require_var(line, name, "set");
                    self.require_expr(line, expr);
                }
                Command::TextBind { var, .. } => self.require_var(line, var, "text_bind"),
                Command::PositionBind { var, .. } => self.require_var(line, var, "position_bind"),
                Command::AutoNextIf { var, .. } => {
                    self.require_var(line, var, "presentation_auto_next_if")
                }
                Command::On(block) => {
                    if block.kind == EventKind::Variable {
                        self.require_var(line, &block.target, "on variable");
                    }
                    self.walk(&parse_lines(&block.body), false);
                }
                Command::Create(c) => {
                    if top && !self.elements.insert(c.id.clone()) {
                        self.error(line, format!("element id '{}' is used twice", c.id));
                    }
                    if !c.kind.is_media() {
                        self.check_template(line, &c.text);
                    }
                }
                Command::TextUpdate { text, .. } => self.check_template(line, text),
                Command::SlideBreak => {
                    self.locals.clear();
                    self.elements.clear();
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/script/checker.rs"]
mod tests;
