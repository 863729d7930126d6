//! Lenient decoding of operator-submitted fields.
//!
//! The admin form posts every value as text, older clients post JSON numbers, and
//! stored blobs written by earlier panel versions carry numbers as strings. Missing
//! or unparseable values decode to `None` so callers can substitute defaults.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Reads a finite number from a JSON number or a numeric string.
pub(crate) fn numeric(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Reads a whole number; fractional input is rejected rather than truncated.
pub(crate) fn integral(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

pub(crate) fn flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => matches!(s.trim(), "true" | "on" | "1"),
        Value::Number(n) => n.as_i64() == Some(1),
        _ => false,
    }
}

pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(numeric))
}

pub(crate) fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(integral))
}

/// Text field where `null` or a non-text value reads as empty.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

pub(crate) fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().is_some_and(flag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_accepts_numbers_and_numeric_strings() {
        assert_eq!(numeric(&json!(2.5)), Some(2.5));
        assert_eq!(numeric(&json!(" 10 ")), Some(10.0));
        assert_eq!(numeric(&json!("")), None);
        assert_eq!(numeric(&json!("abc")), None);
        assert_eq!(numeric(&json!(null)), None);
        assert_eq!(numeric(&json!("NaN")), None);
    }

    #[test]
    fn integral_rejects_fractions() {
        assert_eq!(integral(&json!(3)), Some(3));
        assert_eq!(integral(&json!("22")), Some(22));
        assert_eq!(integral(&json!(3.5)), None);
    }

    #[test]
    fn flag_matches_form_checkbox_values() {
        assert!(flag(&json!(true)));
        assert!(flag(&json!("true")));
        assert!(flag(&json!("on")));
        assert!(!flag(&json!("false")));
        assert!(!flag(&json!("")));
        assert!(!flag(&json!(0)));
    }
}
