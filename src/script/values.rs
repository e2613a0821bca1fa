use crate::foundation::core::{Color, Point};

fn split_pair(inner: &str) -> Option<(&str, &str)> {
    let (a, b) = inner.split_once(',')?;
    if b.contains(',') {
        return None;
    }
    Some((a.trim(), b.trim()))
}

fn strip_parens(s: &str) -> Option<&str> {
    s.trim().strip_prefix('(')?.strip_suffix(')')
}

/// Parse an integer pair `(x,y)`.
pub fn parse_point(s: &str) -> Option<Point> {
    let (a, b) = split_pair(strip_parens(s)?)?;
    let x: i64 = a.parse().ok()?;
    let y: i64 = b.parse().ok()?;
    Some(Point::new(x as f64, y as f64))
}

/// Parse a normalized pair `(x,y)` of reals, clamped into `[0, 1]`.
pub fn parse_unit_point(s: &str) -> Option<Point> {
    let (a, b) = split_pair(strip_parens(s)?)?;
    let x: f64 = a.parse().ok()?;
    let y: f64 = b.parse().ok()?;
    if !x.is_finite() || !y.is_finite() {
        return None;
    }
    Some(Point::new(x.clamp(0.0, 1.0), y.clamp(0.0, 1.0)))
}

/// Parse a color literal.
///
/// Accepted forms: `#RRGGBB`, `#RRGGBBAA`, `(r,g,b[,a])`, `color(...)`, `color=(...)` and
/// `rgba(...)`, with float components in `[0, 1]` (clamped).
pub fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim();
    if s.starts_with('#') {
        return Color::parse_hex(s).ok();
    }

    let body = ["color=", "color", "rgba"]
        .iter()
        .find_map(|prefix| s.strip_prefix(prefix))
        .unwrap_or(s);
    let inner = strip_parens(body)?;

    let parts: Vec<f64> = inner
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .ok()?;
    if parts.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let c = match parts.as_slice() {
        [r, g, b] => Color::rgba(*r, *g, *b, 1.0),
        [r, g, b, a] => Color::rgba(*r, *g, *b, *a),
        _ => return None,
    };
    Some(c.clamped())
}

/// Whether a token is shaped like a color literal, valid or not.
pub fn looks_like_color(s: &str) -> bool {
    let s = s.trim();
    s.starts_with('#')
        || s.starts_with("color")
        || s.starts_with("rgba(")
        || (s.starts_with('(') && s.matches(',').count() >= 2)
}

/// Boolean literal: `true/yes/1` or `false/no/0`, case-insensitive.
pub fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// A finite real number.
pub fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Split a `key=value` or `key:value` modifier written as one token.
pub fn split_inline_modifier(token: &str) -> Option<(&str, &str)> {
    let idx = token.find(['=', ':'])?;
    let (key, rest) = token.split_at(idx);
    if key.is_empty() || key.contains(['(', '{', '#']) {
        return None;
    }
    Some((key, &rest[1..]))
}

#[cfg(test)]
#[path = "../../tests/unit/script/values.rs"]
mod tests;
