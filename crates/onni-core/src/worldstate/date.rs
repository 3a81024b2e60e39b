//! Upstream timestamp decoding.
//!
//! The feed encodes instants as Mongo extended JSON,
//! `{"$date": {"$numberLong": "1700000000000"}}`, and occasionally drops the
//! `$numberLong` wrapper or sends a bare millisecond number.

use serde::{Deserialize, Deserializer, de::Error as _};
use time::OffsetDateTime;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberLong {
    Int(i64),
    Text(String),
}

impl NumberLong {
    fn value(&self) -> Result<i64, String> {
        match self {
            Self::Int(v) => Ok(*v),
            Self::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| format!("non-numeric timestamp '{s}'")),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DateInner {
    Long {
        #[serde(rename = "$numberLong")]
        number_long: NumberLong,
    },
    Plain(NumberLong),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MongoDate {
    Wrapped {
        #[serde(rename = "$date")]
        date: DateInner,
    },
    Plain(NumberLong),
}

impl MongoDate {
    fn millis(&self) -> Result<i64, String> {
        match self {
            Self::Wrapped {
                date: DateInner::Long { number_long },
            } => number_long.value(),
            Self::Wrapped {
                date: DateInner::Plain(n),
            } => n.value(),
            Self::Plain(n) => n.value(),
        }
    }
}

pub(crate) fn from_millis(ms: i64) -> Result<OffsetDateTime, String> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000)
        .map_err(|e| format!("timestamp {ms} out of range: {e}"))
}

/// Deserializes an optional Mongo-style millisecond timestamp.
pub(crate) fn option<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<MongoDate>::deserialize(deserializer)? {
        Some(raw) => raw
            .millis()
            .and_then(from_millis)
            .map(Some)
            .map_err(D::Error::custom),
        None => Ok(None),
    }
}

/// Deserializes an optional unix timestamp expressed in whole seconds.
pub(crate) fn option_seconds<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<i64>::deserialize(deserializer)? {
        Some(secs) => OffsetDateTime::from_unix_timestamp(secs)
            .map(Some)
            .map_err(|e| D::Error::custom(format!("timestamp {secs} out of range: {e}"))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "option")]
        at: Option<OffsetDateTime>,
    }

    fn probe(value: serde_json::Value) -> Result<Option<OffsetDateTime>, serde_json::Error> {
        serde_json::from_value::<Probe>(value).map(|p| p.at)
    }

    #[test]
    fn decodes_extended_json_wrapper() {
        let at = probe(json!({"at": {"$date": {"$numberLong": "1700000000000"}}})).unwrap();
        assert_eq!(at.unwrap().unix_timestamp(), 1_700_000_000);
    }

    #[test]
    fn decodes_unwrapped_forms() {
        let at = probe(json!({"at": {"$date": 1700000000123i64}})).unwrap().unwrap();
        assert_eq!(at.unix_timestamp(), 1_700_000_000);
        assert_eq!(at.millisecond(), 123);

        let at = probe(json!({"at": 1700000000000i64})).unwrap();
        assert!(at.is_some());
    }

    #[test]
    fn missing_and_null_are_none() {
        assert!(probe(json!({})).unwrap().is_none());
        assert!(probe(json!({"at": null})).unwrap().is_none());
    }

    #[test]
    fn rejects_non_numeric_text() {
        assert!(probe(json!({"at": {"$date": {"$numberLong": "soon"}}})).is_err());
    }
}
