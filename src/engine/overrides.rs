//! Option override rules
//!
//! A previously configured option replaces the advertised default only when
//! its value is truthy. `0`, `false`, `""`, `[]`, `{}` and `null` all read as
//! "not configured", so an explicit falsy value can never override a default.

use serde_json::{Map, Value};

use crate::contracts::OptionKey;

/// Truthiness of a JSON value
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i != 0
            } else if let Some(u) = n.as_u64() {
                u != 0
            } else {
                n.as_f64().map(|f| f != 0.0).unwrap_or(false)
            }
        }
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Override value for `key`, if one was configured
pub fn override_for(options: &Map<String, Value>, key: OptionKey) -> Option<&Value> {
    options.get(key.as_str()).filter(|value| is_truthy(value))
}
