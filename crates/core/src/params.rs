//! Lenient typed extraction of configuration overrides from a JSON object.
//!
//! Each helper takes a JSON value, a key name, and a default. A missing key or
//! a value of the wrong type yields the default, so a bad override never stops
//! a sketch from rendering. Only the top-level shape is checked strictly, by
//! [`expect_object`].

use serde_json::Value;

use crate::error::SwarmError;

/// Extracts an `f64` from `params[name]`, returning `default` if missing or wrong type.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// Extracts a `u64` from `params[name]`, returning `default` if missing or wrong type.
pub fn param_u64(params: &Value, name: &str, default: u64) -> u64 {
    params.get(name).and_then(Value::as_u64).unwrap_or(default)
}

/// Extracts a `String` from `params[name]`, returning `default` if missing or wrong type.
pub fn param_string(params: &Value, name: &str, default: &str) -> String {
    params
        .get(name)
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| default.to_owned())
}

/// Name of a JSON value's type, for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Accepts a JSON object or `null` (treated as "no overrides").
///
/// Returns `SwarmError::ParamTypeMismatch` for any other value.
pub fn expect_object(params: &Value, name: &str) -> Result<(), SwarmError> {
    match params {
        Value::Object(_) | Value::Null => Ok(()),
        other => Err(SwarmError::ParamTypeMismatch {
            name: name.to_owned(),
            expected: "object".into(),
            got: json_type_name(other).into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn param_f64_extracts_existing_float() {
        let params = json!({"damping": 0.8});
        assert!((param_f64(&params, "damping", 0.9) - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn param_f64_extracts_integer_as_float() {
        let params = json!({"interaction_radius": 40});
        assert!((param_f64(&params, "interaction_radius", 35.0) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn param_f64_returns_default_when_wrong_type() {
        let params = json!({"damping": "lots"});
        assert!((param_f64(&params, "damping", 0.9) - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn param_f64_returns_default_for_non_object() {
        let params = json!("not an object");
        assert!((param_f64(&params, "damping", 0.9) - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn param_u64_rejects_negative_and_float() {
        assert_eq!(param_u64(&json!({"seed": -1}), "seed", 5), 5);
        assert_eq!(param_u64(&json!({"seed": 2.5}), "seed", 5), 5);
        assert_eq!(param_u64(&json!({"seed": 9}), "seed", 5), 9);
    }

    #[test]
    fn param_string_extracts_and_falls_back() {
        let params = json!({"text": "hello", "font_family": 3});
        assert_eq!(param_string(&params, "text", "x"), "hello");
        assert_eq!(param_string(&params, "font_family", "serif"), "serif");
        assert_eq!(param_string(&params, "missing", "d"), "d");
    }

    #[test]
    fn expect_object_accepts_object_and_null() {
        assert!(expect_object(&json!({}), "config").is_ok());
        assert!(expect_object(&Value::Null, "config").is_ok());
    }

    #[test]
    fn expect_object_rejects_array_with_type_names() {
        let err = expect_object(&json!([1, 2]), "config").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("config") && msg.contains("object") && msg.contains("array"));
    }
}
