//! Conversion of decoded plist trees into JSON values.

use crate::plist::{PlistDict, PlistValue};
use chrono::{DateTime, Utc};
use serde_json::{Map, Number, Value};

pub type JsonMap = Map<String, Value>;

/// ISO-8601 rendering used for every timestamp this crate emits.
pub fn iso8601(at: &DateTime<Utc>) -> String {
    at.to_rfc3339()
}

/// Convert a decoded plist value into JSON. Total: every input has an output.
///
/// Dates become ISO-8601 strings and byte blobs are decoded as UTF-8 with
/// replacement characters, which is lossy for genuinely binary payloads.
pub fn coerce(value: &PlistValue) -> Value {
    match value {
        PlistValue::Null => Value::Null,
        PlistValue::Boolean(b) => Value::Bool(*b),
        PlistValue::Integer(n) => coerce_integer(*n),
        PlistValue::Real(r) => Number::from_f64(*r)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(r.to_string())),
        PlistValue::Date(at) => Value::String(iso8601(at)),
        PlistValue::Data(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        PlistValue::String(s) => Value::String(s.clone()),
        PlistValue::Uid(_) => Value::String(value.to_string()),
        PlistValue::Array(items) => Value::Array(items.iter().map(coerce).collect()),
        PlistValue::Dictionary(dict) => Value::Object(coerce_map(dict)),
    }
}

pub fn coerce_map(dict: &PlistDict) -> JsonMap {
    dict.iter()
        .map(|(key, value)| (key.clone(), coerce(value)))
        .collect()
}

fn coerce_integer(n: i128) -> Value {
    if let Ok(signed) = i64::try_from(n) {
        Value::from(signed)
    } else if let Ok(unsigned) = u64::try_from(n) {
        Value::from(unsigned)
    } else {
        Value::String(n.to_string())
    }
}
