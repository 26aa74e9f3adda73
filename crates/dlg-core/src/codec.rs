//! Canonical attribute encoding.
//!
//! Every attribute is stored as a string. Booleans are `"true"`/`"false"`,
//! numbers are decimal strings (integral values without a fraction), and
//! lists are comma-separated tokens with `\,` and `\\` escapes so that
//! `decode_list(encode_list(x)) == x` for any list of strings.

pub fn encode_bool(value: bool) -> String {
    if value { "true" } else { "false" }.to_string()
}

/// Only the canonical spellings decode.
pub fn decode_bool(raw: &str) -> Option<bool> {
    match raw.trim() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

pub fn encode_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        // normalizes -0 to 0
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Finite decimal numbers only.
pub fn decode_number(raw: &str) -> Option<f64> {
    let n: f64 = raw.trim().parse().ok()?;
    n.is_finite().then_some(n)
}

pub fn encode_list<S: AsRef<str>>(items: &[S]) -> String {
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        for c in item.as_ref().chars() {
            if c == ',' || c == '\\' {
                out.push('\\');
            }
            out.push(c);
        }
    }
    out
}

pub fn decode_list(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    let mut items = Vec::new();
    let mut current = String::new();
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            ',' => items.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    items.push(current);
    items
}
