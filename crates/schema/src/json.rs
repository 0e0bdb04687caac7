//! Strict JSON reading.
//!
//! `serde_json` keeps the last value when an object repeats a key. For
//! hand-authored files that hides mistakes, so values read through
//! [`from_str`] reject duplicate keys instead. Object key order is preserved.

use crate::error::{ErrorKind, Result};
use serde::de::{Deserialize, Deserializer, Error as _, MapAccess, SeqAccess, Visitor};
use serde_json::{Map, Number, Value};
use std::fmt::{Formatter, Result as FmtResult};

/// Parses JSON text into a [`Value`], failing on duplicate object keys.
///
/// The error carries serde's message (with line and column) so it can be
/// shown to the user verbatim.
pub fn from_str(s: &str) -> Result<Value> {
    match serde_json::from_str::<Strict>(s) {
        Ok(Strict(value)) => Ok(value),
        Err(e) => exn::bail!(ErrorKind::Json(e.to_string())),
    }
}

struct Strict(Value);
impl<'de> Deserialize<'de> for Strict {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(StrictVisitor).map(Strict)
    }
}

struct StrictVisitor;
impl<'de> Visitor<'de> for StrictVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "any JSON value")
    }

    fn visit_bool<E>(self, v: bool) -> std::result::Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E>(self, v: i64) -> std::result::Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_u64<E>(self, v: u64) -> std::result::Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_f64<E>(self, v: f64) -> std::result::Result<Value, E> {
        Ok(Number::from_f64(v).map_or(Value::Null, Value::Number))
    }

    fn visit_str<E>(self, v: &str) -> std::result::Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_string<E>(self, v: String) -> std::result::Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> std::result::Result<Value, D::Error> {
        Strict::deserialize(deserializer).map(|strict| strict.0)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Value, A::Error> {
        let mut values = Vec::new();
        while let Some(Strict(value)) = seq.next_element()? {
            values.push(value);
        }
        Ok(Value::Array(values))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Value, A::Error> {
        let mut map = Map::new();
        while let Some(key) = access.next_key::<String>()? {
            if map.contains_key(&key) {
                return Err(A::Error::custom(format!("duplicate key '{key}'")));
            }
            let Strict(value) = access.next_value()?;
            map.insert(key, value);
        }
        Ok(Value::Object(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reads_json() {
        let value = from_str(r#"{"b": [1, 2.5, null], "a": {"c": true, "d": "x"}}"#).unwrap();
        assert_eq!(value, json!({"b": [1, 2.5, null], "a": {"c": true, "d": "x"}}));
    }

    #[test]
    fn test_preserves_key_order() {
        let value = from_str(r#"{"z": 1, "a": 2, "m": 3}"#).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn test_rejects_duplicate_keys() {
        let err = from_str(r#"{"a": {"x": 1, "x": 2}}"#).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Json(message) if message.contains("duplicate key 'x'")));
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(from_str("{").is_err());
    }
}
