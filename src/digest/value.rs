//! Conversions into the JSON value model
//!
//! Identities are digested as `serde_json::Value`. Anything that can't be
//! represented there exactly (non-finite floats, TOML datetimes, non-string
//! map keys) is rejected instead of being coerced.

use crate::error::{KilnError, KilnResult};
use serde::Serialize;
use serde_json::{Map, Number, Value};

/// Convert any serializable value into a JSON value
pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> KilnResult<Value> {
    let json = serde_json::to_value(value).map_err(|e| KilnError::UnsupportedValueType {
        reason: e.to_string(),
    })?;
    Ok(json)
}

/// Convert a TOML value (e.g. compiler options from config) into a JSON value
pub fn from_toml(value: &toml::Value) -> KilnResult<Value> {
    match value {
        toml::Value::String(s) => Ok(Value::String(s.clone())),
        toml::Value::Integer(i) => Ok(Value::Number((*i).into())),
        toml::Value::Float(f) => Number::from_f64(*f)
            .map(Value::Number)
            .ok_or_else(|| KilnError::UnsupportedValueType {
                reason: format!("non-finite float {f}"),
            }),
        toml::Value::Boolean(b) => Ok(Value::Bool(*b)),
        toml::Value::Datetime(dt) => Err(KilnError::UnsupportedValueType {
            reason: format!("datetime {dt} has no JSON representation"),
        }),
        toml::Value::Array(items) => items
            .iter()
            .map(from_toml)
            .collect::<KilnResult<Vec<_>>>()
            .map(Value::Array),
        toml::Value::Table(table) => from_toml_table(table),
    }
}

/// Convert a TOML table into a JSON object
pub fn from_toml_table(table: &toml::Table) -> KilnResult<Value> {
    let mut map = Map::new();
    for (key, value) in table {
        map.insert(key.clone(), from_toml(value)?);
    }
    Ok(Value::Object(map))
}
