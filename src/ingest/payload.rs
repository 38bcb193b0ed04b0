//! The payload tree: a tagged variant over mappings, sequences, and scalars.
//!
//! Mappings are `BTreeMap`s, so every walk over a payload visits keys in sorted
//! order and two equal payloads always produce the same walk.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{MmiError, Result};

/// An arbitrary payload tree.
///
/// Serializes to plain JSON: timestamps become RFC 3339 strings. Deserializing
/// never produces [`Payload::Timestamp`]; ISO-8601 strings stay strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Seq(Vec<Payload>),
    Map(BTreeMap<String, Payload>),
    Timestamp(DateTime<Utc>),
}

impl Payload {
    /// Parse JSON text into a payload.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let payload: Payload = serde_json::from_str(text)
            .map_err(|e| MmiError::MalformedInput(format!("invalid JSON payload: {e}")))?;
        payload.validate()?;
        Ok(payload)
    }

    /// Convert a `serde_json::Value` into a payload.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let payload: Payload = serde_json::from_value(value)
            .map_err(|e| MmiError::MalformedInput(format!("unsupported JSON value: {e}")))?;
        payload.validate()?;
        Ok(payload)
    }

    /// Convert back into a `serde_json::Value`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Int(i) => serde_json::Value::from(*i),
            Self::Float(f) => serde_json::Value::from(*f),
            Self::Str(s) => serde_json::Value::String(s.clone()),
            Self::Timestamp(ts) => serde_json::Value::String(ts.to_rfc3339()),
            Self::Seq(items) => serde_json::Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }

    /// Reject trees that cannot be represented in the JSON output contract.
    pub fn validate(&self) -> Result<()> {
        self.validate_at("")
    }

    fn validate_at(&self, path: &str) -> Result<()> {
        match self {
            Self::Float(f) if !f.is_finite() => Err(MmiError::MalformedInput(format!(
                "non-finite number at '{path}'"
            ))),
            Self::Seq(items) => items
                .iter()
                .enumerate()
                .try_for_each(|(i, item)| item.validate_at(&format!("{path}[{i}]"))),
            Self::Map(map) => map
                .iter()
                .try_for_each(|(k, v)| v.validate_at(&format!("{path}.{k}"))),
            _ => Ok(()),
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Self::Map(_) | Self::Seq(_))
    }

    /// Whether the payload carries any data at all.
    ///
    /// `null`, `false`, zero, the empty string, and empty collections carry
    /// none.
    pub fn has_data(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::Str(s) => !s.is_empty(),
            Self::Seq(items) => !items.is_empty(),
            Self::Map(map) => !map.is_empty(),
            _ => true,
        }
    }

    /// Structural kind name, used as a component's `type`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::Seq(_) => "sequence",
            Self::Map(_) => "mapping",
            Self::Timestamp(_) => "timestamp",
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Payload>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }
}

/// Compact, deterministic JSON rendering. This is the text a component's
/// value fingerprint is computed from.
impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Str(s) => write_json_str(f, s),
            Self::Timestamp(ts) => write_json_str(f, &ts.to_rfc3339()),
            Self::Seq(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Map(map) => {
                f.write_str("{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write_json_str(f, k)?;
                    write!(f, ":{v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

fn write_json_str(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    let quoted = serde_json::to_string(s).map_err(|_| fmt::Error)?;
    f.write_str(&quoted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_nested_json() {
        let payload = Payload::from_json(json!({"a": [1, 2.5, "x", null, true], "b": {}})).unwrap();
        let map = payload.as_map().unwrap();
        assert_eq!(
            map["a"],
            Payload::Seq(vec![
                Payload::Int(1),
                Payload::Float(2.5),
                Payload::Str("x".into()),
                Payload::Null,
                Payload::Bool(true),
            ])
        );
        assert_eq!(map["b"], Payload::Map(BTreeMap::new()));
    }

    #[test]
    fn iso_strings_stay_strings() {
        let payload = Payload::from_json(json!("2024-01-01T00:00:00Z")).unwrap();
        assert_eq!(payload.kind(), "string");
    }

    #[test]
    fn invalid_json_is_malformed_input() {
        let err = Payload::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, MmiError::MalformedInput(_)));
    }

    #[test]
    fn non_finite_float_is_rejected() {
        let mut map = BTreeMap::new();
        map.insert("x".to_string(), Payload::Float(f64::NAN));
        let err = Payload::Map(map).validate().unwrap_err();
        assert!(err.to_string().contains(".x"));
    }

    #[test]
    fn display_is_compact_json() {
        let payload = Payload::from_json(json!({"b": [1, "q\""], "a": null})).unwrap();
        assert_eq!(payload.to_string(), r#"{"a":null,"b":[1,"q\""]}"#);
        let reparsed: serde_json::Value = serde_json::from_str(&payload.to_string()).unwrap();
        assert_eq!(reparsed, payload.to_json());
    }

    #[test]
    fn has_data_treats_false_and_zero_as_empty() {
        assert!(!Payload::Bool(false).has_data());
        assert!(!Payload::Int(0).has_data());
        assert!(!Payload::Float(0.0).has_data());
        assert!(Payload::Bool(true).has_data());
        assert!(Payload::Int(-1).has_data());
        assert!(Payload::Map(BTreeMap::from([("a".to_string(), Payload::Int(0))])).has_data());
        assert!(!Payload::Null.has_data());
        assert!(!Payload::Str(String::new()).has_data());
        assert!(!Payload::Map(BTreeMap::new()).has_data());
    }
}
