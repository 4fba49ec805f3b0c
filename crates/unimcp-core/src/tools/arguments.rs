// ── Tool argument extraction ──
//
// Arguments arrive as a free-form JSON object. Lookups are lenient: a
// missing or wrongly typed optional value falls back to its default, and
// unknown keys are ignored.

use serde_json::{Map, Value};

use crate::error::ToolError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(Map<String, Value>);

impl Arguments {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Anything other than a JSON object yields no arguments.
    pub fn from_value(value: Option<Value>) -> Self {
        match value {
            Some(Value::Object(map)) => Self(map),
            _ => Self::default(),
        }
    }

    /// String value, or `""` when absent or not a string.
    pub fn string(&self, key: &str) -> String {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned()
    }

    /// Integer value. Accepts JSON integers, floats (truncated toward zero),
    /// and numeric strings; anything else yields `default`.
    #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
    pub fn integer(&self, key: &str, default: i64) -> i64 {
        match self.0.get(key) {
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .unwrap_or(default),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    /// Non-empty string, or `"<key> is required"`.
    pub fn required_string(&self, key: &str) -> Result<String, ToolError> {
        let value = self.string(key);
        if value.is_empty() {
            return Err(ToolError::required(key));
        }
        Ok(value)
    }

    /// JSON object, or `"<key> must be an object"`.
    pub fn object(&self, key: &str) -> Result<Map<String, Value>, ToolError> {
        match self.0.get(key) {
            Some(Value::Object(map)) => Ok(map.clone()),
            _ => Err(ToolError::not_object(key)),
        }
    }
}

impl From<Map<String, Value>> for Arguments {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use serde_json::json;

    use super::*;

    fn args(value: Value) -> Arguments {
        Arguments::from_value(Some(value))
    }

    #[test]
    fn strings_default_to_empty() {
        let a = args(json!({ "site_id": "Home", "device_id": 42 }));
        assert_eq!(a.string("site_id"), "Home");
        assert_eq!(a.string("device_id"), "");
        assert_eq!(a.string("missing"), "");
    }

    #[test]
    fn integers_accept_loose_forms() {
        let a = args(json!({ "a": 10, "b": 7.9, "c": "12", "d": "x", "e": true }));
        assert_eq!(a.integer("a", 25), 10);
        assert_eq!(a.integer("b", 25), 7);
        assert_eq!(a.integer("c", 25), 12);
        assert_eq!(a.integer("d", 25), 25);
        assert_eq!(a.integer("e", 25), 25);
        assert_eq!(a.integer("missing", 0), 0);
    }

    #[test]
    fn required_string_rejects_blank() {
        let a = args(json!({ "device_id": "" }));
        assert_eq!(
            a.required_string("device_id").unwrap_err().to_string(),
            "device_id is required"
        );
        assert_eq!(
            a.required_string("mac").unwrap_err().to_string(),
            "mac is required"
        );
    }

    #[test]
    fn object_requires_json_object() {
        let a = args(json!({ "settings": { "enabled": true }, "config": "nope" }));
        assert_eq!(a.object("settings").unwrap()["enabled"], true);
        assert_eq!(
            a.object("config").unwrap_err().to_string(),
            "config must be an object"
        );
        assert_eq!(
            a.object("missing").unwrap_err().to_string(),
            "missing must be an object"
        );
    }

    #[test]
    fn non_object_arguments_are_empty() {
        assert_eq!(Arguments::from_value(None), Arguments::default());
        assert_eq!(Arguments::from_value(Some(json!([1, 2]))), Arguments::default());
    }
}
