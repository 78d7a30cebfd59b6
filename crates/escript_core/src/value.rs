//! Literal values embedded in AST nodes.
//!
//! The parser does not interpret literals itself. Number, string,
//! namespace, and regular-expression texts are handed to these
//! constructors and the resulting `Value` is stored opaquely in the
//! literal node for later phases.

use std::fmt;

/// A typed literal value held by a literal AST node.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    /// A namespace value (from `namespace` definitions and string
    /// qualifiers).
    Namespace(String),
    /// An uncompiled regular expression: source pattern plus trailing
    /// flag letters.
    RegExp { pattern: String, flags: String },
    /// Raw E4X literal text, captured verbatim.
    Xml(String),
}

impl Value {
    /// Parse a numeric literal lexeme into a number value.
    ///
    /// Accepts `0x`/`0X` hex forms and decimal forms with an optional
    /// fraction, exponent, and trailing `f` float suffix, matching what
    /// the lexer produces. Returns `None` for text the lexer should
    /// never have emitted.
    pub fn parse_number(text: &str) -> Option<Value> {
        let text = text.trim();
        if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
            if hex.is_empty() {
                // A bare "0x" lexes as zero followed by an identifier.
                return Some(Value::Number(0.0));
            }
            return u64::from_str_radix(hex, 16).ok().map(|n| Value::Number(n as f64));
        }
        let text = text.strip_suffix('f').or_else(|| text.strip_suffix('F')).unwrap_or(text);
        if let Ok(n) = text.parse::<f64>() {
            return Some(Value::Number(n));
        }
        // The lexer scans greedily, so forms like "1e" or "1." arrive
        // here. Take the longest numeric prefix, as strtod would.
        for end in (1..text.len()).rev() {
            if let Ok(n) = text[..end].parse::<f64>() {
                return Some(Value::Number(n));
            }
        }
        None
    }

    pub fn string(text: &str) -> Value {
        Value::String(text.to_string())
    }

    pub fn namespace(uri: &str) -> Value {
        Value::Namespace(uri.to_string())
    }

    /// Build a regular-expression value from the lexeme `/pattern/flags`.
    pub fn regexp(lexeme: &str) -> Value {
        let body = lexeme.strip_prefix('/').unwrap_or(lexeme);
        match body.rfind('/') {
            Some(end) => Value::RegExp {
                pattern: body[..end].to_string(),
                flags: body[end + 1..].to_string(),
            },
            None => Value::RegExp {
                pattern: body.to_string(),
                flags: String::new(),
            },
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Namespace(s) => write!(f, "[namespace {}]", s),
            Value::RegExp { pattern, flags } => write!(f, "/{}/{}", pattern, flags),
            Value::Xml(text) => write!(f, "{}", text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal() {
        assert_eq!(Value::parse_number("42"), Some(Value::Number(42.0)));
        assert_eq!(Value::parse_number("3.25"), Some(Value::Number(3.25)));
        assert_eq!(Value::parse_number("1e3"), Some(Value::Number(1000.0)));
        assert_eq!(Value::parse_number(".5"), Some(Value::Number(0.5)));
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(Value::parse_number("0x1f"), Some(Value::Number(31.0)));
        assert_eq!(Value::parse_number("0XFF"), Some(Value::Number(255.0)));
    }

    #[test]
    fn test_parse_float_suffix() {
        assert_eq!(Value::parse_number("2.5f"), Some(Value::Number(2.5)));
    }

    #[test]
    fn test_regexp_lexeme() {
        let v = Value::regexp("/a+b/gi");
        assert_eq!(
            v,
            Value::RegExp {
                pattern: "a+b".to_string(),
                flags: "gi".to_string()
            }
        );
    }
}
