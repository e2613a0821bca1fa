use crate::runtime::expression::eval::eval;
use crate::runtime::expression::parser::parse_expr;
use crate::runtime::variables::{VariableStore, format_number};

/// Find the `}` closing a group whose `{` is at `open`. Returns its byte index.
fn matching_brace(s: &str, open: usize) -> Option<usize> {
    let mut depth = 0i32;
    for (i, c) in s[open..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Substitute `${...}` and `{...}` placeholders in display text.
///
/// A bare identifier becomes the variable's display value; an undeclared one is left in the
/// text untouched. Any other body is evaluated as an expression; bodies that do not parse are
/// left untouched as well.
pub fn interpolate_text(vars: &VariableStore, template: &str) -> String {
    if !template.contains('{') {
        return template.to_owned();
    }

    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    loop {
        let Some(open) = rest.find('{') else {
            out.push_str(rest);
            break;
        };
        let Some(close) = matching_brace(rest, open) else {
            out.push_str(rest);
            break;
        };
        let dollar = rest[..open].ends_with('$');
        let lead_end = if dollar { open - 1 } else { open };
        out.push_str(&rest[..lead_end]);

        let placeholder = &rest[lead_end..=close];
        let body = rest[open + 1..close].trim();
        match substitute(vars, body) {
            Some(value) => out.push_str(&value),
            None => out.push_str(placeholder),
        }
        rest = &rest[close + 1..];
    }
    out
}

/// Bodies of every complete `{...}` / `${...}` placeholder in `template`.
pub(crate) fn placeholders(template: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let Some(close) = matching_brace(rest, open) else {
            break;
        };
        out.push(rest[open + 1..close].trim());
        rest = &rest[close + 1..];
    }
    out
}

fn substitute(vars: &VariableStore, body: &str) -> Option<String> {
    if is_identifier(body) {
        return vars.get(body).map(|v| v.display_value());
    }
    let expr = parse_expr(body).ok()?;
    Some(format_number(eval(&expr, vars)))
}

/// Replace `{expr}` groups inside a numeric token by their values.
///
/// `{a,b}` tuples become `(a,b)`. Integral values print without decimals, others with six.
pub fn resolve_numeric_token(vars: &VariableStore, token: &str) -> String {
    if !token.contains('{') {
        return token.to_owned();
    }

    let fmt = |v: f64| {
        if (v - v.round()).abs() < 1e-9 {
            format!("{:.0}", v.round() + 0.0)
        } else {
            format!("{v:.6}")
        }
    };
    let value_of = |src: &str| parse_expr(src).map(|e| eval(&e, vars)).unwrap_or(0.0);

    let mut out = String::with_capacity(token.len());
    let mut rest = token;
    loop {
        let Some(open) = rest.find('{') else {
            out.push_str(rest);
            break;
        };
        let Some(close) = matching_brace(rest, open) else {
            return token.to_owned();
        };
        out.push_str(&rest[..open]);
        let body = &rest[open + 1..close];
        if body.contains(',') {
            let parts: Vec<String> = body.split(',').map(|p| fmt(value_of(p.trim()))).collect();
            out.push('(');
            out.push_str(&parts.join(","));
            out.push(')');
        } else {
            out.push_str(&fmt(value_of(body)));
        }
        rest = &rest[close + 1..];
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/interpolate.rs"]
mod tests;
