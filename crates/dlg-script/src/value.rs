//! Script-facing values and their coercions to canonical attribute strings.

use dlg_core::codec::{decode_bool, decode_number, encode_bool, encode_number};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScriptValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl ScriptValue {
    /// Text form; lists are not text.
    pub fn as_text(&self) -> Option<String> {
        match self {
            ScriptValue::Null => Some(String::new()),
            ScriptValue::Bool(b) => Some(encode_bool(*b)),
            ScriptValue::Number(n) => Some(encode_number(*n)),
            ScriptValue::Text(s) => Some(s.clone()),
            ScriptValue::List(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ScriptValue::Bool(b) => Some(*b),
            ScriptValue::Text(s) => decode_bool(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            ScriptValue::Number(n) if n.is_finite() => Some(*n),
            ScriptValue::Text(s) => decode_number(s),
            _ => None,
        }
    }

    /// A single text becomes a one-item list; `Null` is empty.
    pub fn as_list(&self) -> Vec<String> {
        match self {
            ScriptValue::Null => Vec::new(),
            ScriptValue::List(items) => items.clone(),
            ScriptValue::Text(s) if s.is_empty() => Vec::new(),
            other => other.as_text().into_iter().collect(),
        }
    }
}

impl fmt::Display for ScriptValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptValue::Null => f.write_str("null"),
            ScriptValue::List(items) => write!(f, "[{}]", items.join(", ")),
            other => f.write_str(&other.as_text().unwrap_or_default()),
        }
    }
}

impl From<bool> for ScriptValue {
    fn from(b: bool) -> Self {
        ScriptValue::Bool(b)
    }
}

impl From<f64> for ScriptValue {
    fn from(n: f64) -> Self {
        ScriptValue::Number(n)
    }
}

impl From<i32> for ScriptValue {
    fn from(n: i32) -> Self {
        ScriptValue::Number(f64::from(n))
    }
}

impl From<&str> for ScriptValue {
    fn from(s: &str) -> Self {
        ScriptValue::Text(s.to_string())
    }
}

impl From<String> for ScriptValue {
    fn from(s: String) -> Self {
        ScriptValue::Text(s)
    }
}

impl From<Vec<String>> for ScriptValue {
    fn from(items: Vec<String>) -> Self {
        ScriptValue::List(items)
    }
}

impl From<Vec<&str>> for ScriptValue {
    fn from(items: Vec<&str>) -> Self {
        ScriptValue::List(items.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for ScriptValue {
    fn from(items: [&str; N]) -> Self {
        ScriptValue::List(items.iter().map(|s| s.to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn coercions() {
        assert_eq!(ScriptValue::from(3).as_text().as_deref(), Some("3"));
        assert_eq!(ScriptValue::from("true").as_bool(), Some(true));
        assert_eq!(ScriptValue::from("2.5").as_number(), Some(2.5));
        assert_eq!(ScriptValue::from("x").as_list(), vec!["x"]);
        assert_eq!(ScriptValue::from(["a", "b"]).as_text(), None);
        assert_eq!(ScriptValue::from("").as_list(), Vec::<String>::new());
    }

    #[test]
    fn untagged_json() {
        let v: ScriptValue = serde_json::from_str(r#"["a","b"]"#).unwrap();
        assert_eq!(v, ScriptValue::from(vec!["a", "b"]));
        let n: ScriptValue = serde_json::from_str("4").unwrap();
        assert_eq!(n, ScriptValue::Number(4.0));
        assert_eq!(serde_json::to_string(&ScriptValue::Null).unwrap(), "null");
    }
}
