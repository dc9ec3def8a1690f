//! Attribute values and statement literals.
//!
//! The reasoning engine reports attribute values as [`Value`], which may carry
//! types this crate does not know how to compare. Statements only ever hold a
//! [`Literal`], the closed set of value types a verification query can express.

use std::fmt::{self, Write as _};
use std::hash::{Hash, Hasher};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Value of an attribute instance as reported by the engine.
///
/// # Examples
///
/// ```
/// use resolution_verify::Value;
///
/// let name = Value::String("alice".to_string());
/// assert!(name.is_string());
/// assert!(name.to_literal().is_some());
///
/// let opaque = Value::Structured(serde_json::json!({"k": 1}));
/// assert!(opaque.to_literal().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    String(String),
    Long(i64),
    Double(f64),
    DateTime(NaiveDateTime),
    Boolean(bool),
    /// A value type the verification query language cannot compare.
    Structured(serde_json::Value),
    Null,
}

impl Value {
    pub const fn is_string(&self) -> bool {
        matches!(self, Self::String(_))
    }

    pub const fn is_long(&self) -> bool {
        matches!(self, Self::Long(_))
    }

    pub const fn is_double(&self) -> bool {
        matches!(self, Self::Double(_))
    }

    pub const fn is_datetime(&self) -> bool {
        matches!(self, Self::DateTime(_))
    }

    pub const fn is_boolean(&self) -> bool {
        matches!(self, Self::Boolean(_))
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Converts to a typed literal, or `None` for value types a statement
    /// cannot express.
    #[must_use]
    pub fn to_literal(&self) -> Option<Literal> {
        match self {
            Self::String(v) => Some(Literal::String(v.clone())),
            Self::Long(v) => Some(Literal::Long(*v)),
            Self::Double(v) => Some(Literal::Double(*v)),
            Self::DateTime(v) => Some(Literal::DateTime(*v)),
            Self::Boolean(v) => Some(Literal::Boolean(*v)),
            Self::Structured(_) | Self::Null => None,
        }
    }

    /// Returns a human-readable type name.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Long(_) => "long",
            Self::Double(_) => "double",
            Self::DateTime(_) => "datetime",
            Self::Boolean(_) => "boolean",
            Self::Structured(_) => "structured",
            Self::Null => "null",
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::Null
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Self::DateTime(v)
    }
}

impl From<Literal> for Value {
    fn from(v: Literal) -> Self {
        match v {
            Literal::String(s) => Self::String(s),
            Literal::Long(n) => Self::Long(n),
            Literal::Double(d) => Self::Double(d),
            Literal::DateTime(t) => Self::DateTime(t),
            Literal::Boolean(b) => Self::Boolean(b),
        }
    }
}

/// Typed literal usable in a statement.
///
/// The variant selects the typed comparison a checker performs. Doubles
/// compare and hash by bit pattern so literals can live in hashed sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Literal {
    String(String),
    Long(i64),
    Double(f64),
    DateTime(NaiveDateTime),
    Boolean(bool),
}

impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Long(a), Self::Long(b)) => a == b,
            (Self::Double(a), Self::Double(b)) => a.to_bits() == b.to_bits(),
            (Self::DateTime(a), Self::DateTime(b)) => a == b,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Literal {}

impl Hash for Literal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::String(v) => v.hash(state),
            Self::Long(v) => v.hash(state),
            Self::Double(v) => v.to_bits().hash(state),
            Self::DateTime(v) => v.hash(state),
            Self::Boolean(v) => v.hash(state),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(v) => write_quoted(f, v),
            Self::Long(v) => write!(f, "{v}"),
            Self::Double(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{v:.1}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::DateTime(v) => write!(f, "{}", v.format("%Y-%m-%dT%H:%M:%S%.3f")),
            Self::Boolean(v) => write!(f, "{v}"),
        }
    }
}

/// Writes `s` in double quotes, escaping only `"` and `\`.
fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in s.chars() {
        if matches!(c, '"' | '\\') {
            f.write_char('\\')?;
        }
        f.write_char(c)?;
    }
    f.write_char('"')
}

impl From<&str> for Literal {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Literal {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<i64> for Literal {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}

impl From<f64> for Literal {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<bool> for Literal {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<NaiveDateTime> for Literal {
    fn from(v: NaiveDateTime) -> Self {
        Self::DateTime(v)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::NaiveDate;

    use super::*;

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap()
    }

    #[test]
    fn test_value_to_literal_known_types() {
        assert_eq!(Value::from("a").to_literal(), Some(Literal::from("a")));
        assert_eq!(Value::Long(7).to_literal(), Some(Literal::Long(7)));
        assert_eq!(Value::Double(1.5).to_literal(), Some(Literal::Double(1.5)));
        assert_eq!(Value::Boolean(true).to_literal(), Some(Literal::Boolean(true)));
        assert_eq!(
            Value::DateTime(timestamp()).to_literal(),
            Some(Literal::DateTime(timestamp()))
        );
    }

    #[test]
    fn test_value_to_literal_unknown_types() {
        assert!(Value::Null.to_literal().is_none());
        assert!(Value::Structured(serde_json::json!([1, 2])).to_literal().is_none());
    }

    #[test]
    fn test_value_type_name() {
        assert_eq!(Value::Long(1).type_name(), "long");
        assert_eq!(Value::Structured(serde_json::Value::Null).type_name(), "structured");
    }

    #[test]
    fn test_literal_display() {
        assert_eq!(Literal::from("alice").to_string(), "\"alice\"");
        assert_eq!(Literal::Long(42).to_string(), "42");
        assert_eq!(Literal::Double(2.0).to_string(), "2.0");
        assert_eq!(Literal::Double(2.25).to_string(), "2.25");
        assert_eq!(Literal::Boolean(false).to_string(), "false");
        assert_eq!(Literal::DateTime(timestamp()).to_string(), "2020-01-02T03:04:05.000");
    }

    #[test]
    fn test_literal_display_escapes_quotes() {
        assert_eq!(Literal::from("a\"b").to_string(), "\"a\\\"b\"");
        assert_eq!(Literal::from("a\"b\\c").to_string(), r#""a\"b\\c""#);
    }

    #[test]
    fn test_literal_display_keeps_other_characters_raw() {
        assert_eq!(Literal::from("\u{1b}").to_string(), "\"\u{1b}\"");
        assert_eq!(Literal::from("line\nbreak é").to_string(), "\"line\nbreak é\"");
        assert_eq!(Literal::from("'").to_string(), "\"'\"");
    }

    #[test]
    fn test_literal_double_hashes_by_bits() {
        let mut set = HashSet::new();
        set.insert(Literal::Double(0.5));
        set.insert(Literal::Double(0.5));
        set.insert(Literal::Long(0));
        assert_eq!(set.len(), 2);
        assert_ne!(Literal::Double(1.0), Literal::Long(1));
    }

    #[test]
    fn test_literal_serialization() {
        let lit = Literal::DateTime(timestamp());
        let json = serde_json::to_string(&lit).unwrap();
        let decoded: Literal = serde_json::from_str(&json).unwrap();
        assert_eq!(lit, decoded);
    }
}
