/// One whitespace-delimited word of a script line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    /// Token text. Quoted runs have their quotes removed and escapes decoded.
    pub text: String,
    /// Whether the token came from a double-quoted run.
    pub quoted: bool,
}

impl Token {
    pub fn bare(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quoted: false,
        }
    }

    pub fn quoted(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quoted: true,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Blank lines and `#` comments carry no commands.
pub fn is_skippable(line: &str) -> bool {
    let t = line.trim();
    t.is_empty() || t.starts_with('#')
}

/// Split one script line into tokens.
///
/// Words split on whitespace, except that a double-quoted run (with `\"`, `\\`, `\n`, `\r`,
/// `\t` escapes) is one token and a balanced `( ... )` or `{ ... }` group never splits.
/// An unterminated quote swallows the rest of the line.
pub fn tokenize_line(line: &str) -> Vec<Token> {
    let chars: Vec<char> = line.chars().collect();
    let mut out = Vec::new();
    let mut i = 0usize;

    while i < chars.len() {
        if chars[i].is_whitespace() {
            i += 1;
            continue;
        }

        if chars[i] == '"' {
            i += 1;
            let mut raw = String::new();
            while i < chars.len() && chars[i] != '"' {
                if chars[i] == '\\' && i + 1 < chars.len() {
                    raw.push(chars[i]);
                    i += 1;
                }
                raw.push(chars[i]);
                i += 1;
            }
            if i < chars.len() {
                i += 1;
            } else {
                tracing::debug!(line, "unterminated quote, using rest of line");
            }
            out.push(Token::quoted(unescape_text(&raw)));
            continue;
        }

        let mut word = String::new();
        let mut depth = 0i32;
        while i < chars.len() {
            let c = chars[i];
            if depth == 0 && c.is_whitespace() {
                break;
            }
            match c {
                '(' | '{' => depth += 1,
                ')' | '}' => depth = (depth - 1).max(0),
                _ => {}
            }
            word.push(c);
            i += 1;
        }
        out.push(Token::bare(word));
    }

    out
}

/// Decode `\n \r \t \" \\`. Unknown escapes are kept verbatim.
pub fn unescape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Inverse of [`unescape_text`], used when writing quoted strings back out.
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    for c in s.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/script/tokenizer.rs"]
mod tests;
