//! Tolerant field decoders for the upstream feed.
//!
//! Upstream changes leaf types between game updates: `null` where a string
//! used to be, `0`/`1` for booleans, quoted numbers. Leaves are coerced when
//! the intent is clear and otherwise fall back to their default. Only the
//! shape of top-level sections (and timestamps, see `date`) is enforced.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
        }
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => {
            let s = s.trim();
            s.eq_ignore_ascii_case("true") || s == "1"
        }
        _ => false,
    }
}

fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub(crate) fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(coerce_string(&Value::deserialize(d)?).unwrap_or_default())
}

pub(crate) fn boolean<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(coerce_bool(&Value::deserialize(d)?))
}

pub(crate) fn int<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    Ok(coerce_i64(&Value::deserialize(d)?).unwrap_or_default())
}

pub(crate) fn opt_int<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    Ok(coerce_i64(&Value::deserialize(d)?))
}

pub(crate) fn float<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(coerce_f64(&Value::deserialize(d)?).unwrap_or_default())
}

pub(crate) fn strings<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items.iter().filter_map(coerce_string).collect(),
        _ => Vec::new(),
    })
}

pub(crate) fn ints<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<i64>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items.iter().filter_map(coerce_i64).collect(),
        _ => Vec::new(),
    })
}

pub(crate) fn floats<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<f64>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items.iter().filter_map(coerce_f64).collect(),
        _ => Vec::new(),
    })
}

/// A nested object without timestamps. Anything that does not decode is the
/// default value.
pub(crate) fn nested<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(match Value::deserialize(d)? {
        Value::Null => T::default(),
        value => serde_json::from_value(value).unwrap_or_default(),
    })
}

fn elements<T: DeserializeOwned>(items: Vec<Value>) -> Result<Vec<T>, serde_json::Error> {
    items
        .into_iter()
        .filter(|item| !item.is_null())
        .map(serde_json::from_value)
        .collect()
}

/// A nested list of objects. A non-array is empty; `null` entries are
/// skipped. Element errors (bad timestamps) still fail.
pub(crate) fn seq<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(d)? {
        Value::Array(items) => elements(items).map_err(D::Error::custom),
        _ => Ok(Vec::new()),
    }
}

/// Like [`seq`], but keeps "absent" distinct from "empty".
pub(crate) fn opt_seq<'de, D, T>(d: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(d)? {
        Value::Array(items) => elements(items).map(Some).map_err(D::Error::custom),
        _ => Ok(None),
    }
}

/// A top-level section. `null` reads as empty; any other non-array is an
/// error.
pub(crate) fn section<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(d)? {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => elements(items).map_err(D::Error::custom),
        other => Err(D::Error::custom(format!(
            "expected an array section, got {}",
            super::json_kind(&other)
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Leaves {
        #[serde(deserialize_with = "string")]
        name: String,
        #[serde(deserialize_with = "boolean")]
        flag: bool,
        #[serde(deserialize_with = "int")]
        count: i64,
        #[serde(deserialize_with = "opt_int")]
        version: Option<i64>,
        #[serde(deserialize_with = "float")]
        ratio: f64,
        #[serde(deserialize_with = "strings")]
        tags: Vec<String>,
    }

    fn leaves(value: Value) -> Leaves {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn null_leaves_fall_back_to_default() {
        let l = leaves(json!({"name": null, "flag": null, "count": null, "version": null, "tags": null}));
        assert_eq!(l.name, "");
        assert!(!l.flag);
        assert_eq!(l.count, 0);
        assert!(l.version.is_none());
        assert!(l.tags.is_empty());
    }

    #[test]
    fn mismatched_scalars_are_coerced() {
        let l = leaves(json!({
            "name": 12,
            "flag": 1,
            "count": "40",
            "version": "7",
            "ratio": "0.25",
            "tags": ["a", 2, null, {"x": 1}]
        }));
        assert_eq!(l.name, "12");
        assert!(l.flag);
        assert_eq!(l.count, 40);
        assert_eq!(l.version, Some(7));
        assert_eq!(l.ratio, 0.25);
        assert_eq!(l.tags, vec!["a", "2"]);

        let l = leaves(json!({"flag": "false", "count": {"nested": true}, "version": "soon"}));
        assert!(!l.flag);
        assert_eq!(l.count, 0);
        assert!(l.version.is_none());
    }
}
