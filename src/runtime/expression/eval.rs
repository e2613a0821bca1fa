use std::collections::HashSet;

use crate::runtime::expression::ast::{BinaryOp, Expr, UnaryOp};

const DIV_EPSILON: f64 = 1e-12;

/// What an identifier refers to during evaluation.
pub(crate) enum Binding<'a> {
    Number(f64),
    /// A derived variable; its source expression is evaluated in place.
    Derived(&'a Expr),
    /// Declared, but not numeric (a string variable).
    NonNumeric,
    Unknown,
}

/// Name resolution for [`eval`].
pub(crate) trait Scope {
    fn binding(&self, name: &str) -> Binding<'_>;
}

/// Evaluate `expr`. Unknown, non-numeric and cyclic references read as `0.0`, and so does a
/// division by zero.
pub(crate) fn eval(expr: &Expr, scope: &dyn Scope) -> f64 {
    let mut visiting = HashSet::new();
    eval_inner(expr, scope, &mut visiting)
}

fn truthy(v: f64) -> bool {
    v != 0.0
}

fn flag(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

fn eval_inner(expr: &Expr, scope: &dyn Scope, visiting: &mut HashSet<String>) -> f64 {
    match expr {
        Expr::Num(v) => *v,
        Expr::Var(name) => match scope.binding(name) {
            Binding::Number(v) => v,
            Binding::Derived(source) => {
                if !visiting.insert(name.clone()) {
                    tracing::warn!(variable = %name, "cyclic variable reference reads as 0");
                    return 0.0;
                }
                let v = eval_inner(source, scope, visiting);
                visiting.remove(name);
                v
            }
            Binding::NonNumeric | Binding::Unknown => 0.0,
        },
        Expr::Unary { op, expr } => {
            let v = eval_inner(expr, scope, visiting);
            match op {
                UnaryOp::Neg => -v,
                UnaryOp::Not => flag(!truthy(v)),
            }
        }
        Expr::Binary { op, left, right } => {
            let l = eval_inner(left, scope, visiting);
            match op {
                BinaryOp::And if !truthy(l) => return 0.0,
                BinaryOp::Or if truthy(l) => return 1.0,
                _ => {}
            }
            let r = eval_inner(right, scope, visiting);
            match op {
                BinaryOp::Add => l + r,
                BinaryOp::Sub => l - r,
                BinaryOp::Mul => l * r,
                BinaryOp::Div | BinaryOp::Mod => {
                    if r.abs() < DIV_EPSILON {
                        tracing::warn!("division by zero reads as 0");
                        0.0
                    } else if *op == BinaryOp::Div {
                        l / r
                    } else {
                        l % r
                    }
                }
                BinaryOp::Eq => flag(l == r),
                BinaryOp::Ne => flag(l != r),
                BinaryOp::Lt => flag(l < r),
                BinaryOp::Le => flag(l <= r),
                BinaryOp::Gt => flag(l > r),
                BinaryOp::Ge => flag(l >= r),
                BinaryOp::And | BinaryOp::Or => flag(truthy(r)),
            }
        }
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/runtime/expression/eval.rs"]
mod tests;
