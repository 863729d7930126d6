//! Encoding and decoding of the time-windowed dynamic rate policy stored on a node.
//!
//! The policy is configuration only. Applying it to live traffic accounting is the
//! job of the accounting collaborator that reads `dynamic_rate_config`.
//!
//! Two default sets exist. A policy written from a form falls back to
//! [`DynamicRatePolicy::CREATE_DEFAULT`] (both windows at hour 0), while a policy read
//! back for editing falls back to [`DynamicRatePolicy::EDIT_DEFAULT`] (peak at 3,
//! off-peak at 22). Stored policies are always complete, so the edit defaults only
//! show up for missing or damaged blobs.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::form::{integral, numeric};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DynamicRatePolicy {
    pub max_rate: f64,
    pub max_rate_time: u8,
    pub min_rate: f64,
    pub min_rate_time: u8,
}

impl DynamicRatePolicy {
    pub const CREATE_DEFAULT: Self = Self {
        max_rate: 1.0,
        max_rate_time: 0,
        min_rate: 1.0,
        min_rate_time: 0,
    };

    pub const EDIT_DEFAULT: Self = Self {
        max_rate: 1.0,
        max_rate_time: 3,
        min_rate: 1.0,
        min_rate_time: 22,
    };

    fn filled(input: &RatePolicyInput, defaults: Self) -> Self {
        Self {
            max_rate: valid_rate(input.max_rate).unwrap_or(defaults.max_rate),
            max_rate_time: valid_hour(input.max_rate_time).unwrap_or(defaults.max_rate_time),
            min_rate: valid_rate(input.min_rate).unwrap_or(defaults.min_rate),
            min_rate_time: valid_hour(input.min_rate_time).unwrap_or(defaults.min_rate_time),
        }
    }
}

/// Possibly partial policy as submitted by an operator or found in storage.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RatePolicyInput {
    pub max_rate: Option<f64>,
    pub max_rate_time: Option<i64>,
    pub min_rate: Option<f64>,
    pub min_rate_time: Option<i64>,
}

impl RatePolicyInput {
    fn from_fields(fields: &Map<String, Value>) -> Self {
        Self {
            max_rate: fields.get("max_rate").and_then(numeric),
            max_rate_time: fields.get("max_rate_time").and_then(integral),
            min_rate: fields.get("min_rate").and_then(numeric),
            min_rate_time: fields.get("min_rate_time").and_then(integral),
        }
    }
}

fn valid_rate(rate: Option<f64>) -> Option<f64> {
    rate.filter(|r| r.is_finite() && *r > 0.0)
}

fn valid_hour(hour: Option<i64>) -> Option<u8> {
    hour.and_then(|h| u8::try_from(h).ok()).filter(|h| *h <= 23)
}

/// Builds the stored blob for a new or fully replaced policy.
pub fn encode(input: &RatePolicyInput) -> Value {
    let policy = DynamicRatePolicy::filled(input, DynamicRatePolicy::CREATE_DEFAULT);
    json!({
        "max_rate": policy.max_rate,
        "max_rate_time": policy.max_rate_time,
        "min_rate": policy.min_rate,
        "min_rate_time": policy.min_rate_time,
    })
}

/// Reads a stored blob for display or editing. Never fails: an absent, empty or
/// malformed blob reads as "no policy" and yields the edit defaults.
pub fn decode(blob: Option<&Value>) -> DynamicRatePolicy {
    let input = match blob {
        Some(Value::Object(fields)) => RatePolicyInput::from_fields(fields),
        // Older rows hold the JSON document as a string.
        Some(Value::String(text)) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(fields)) => RatePolicyInput::from_fields(&fields),
            _ => RatePolicyInput::default(),
        },
        _ => RatePolicyInput::default(),
    };
    DynamicRatePolicy::filled(&input, DynamicRatePolicy::EDIT_DEFAULT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn only_max_rate() -> RatePolicyInput {
        RatePolicyInput {
            max_rate: Some(2.0),
            ..Default::default()
        }
    }

    #[test]
    fn encode_fills_create_defaults() {
        let blob = encode(&only_max_rate());
        assert_eq!(
            decode(Some(&blob)),
            DynamicRatePolicy {
                max_rate: 2.0,
                max_rate_time: 0,
                min_rate: 1.0,
                min_rate_time: 0,
            }
        );
    }

    #[test]
    fn decode_fills_edit_defaults_for_missing_fields() {
        let blob = json!({ "max_rate": 2 });
        assert_eq!(
            decode(Some(&blob)),
            DynamicRatePolicy {
                max_rate: 2.0,
                max_rate_time: 3,
                min_rate: 1.0,
                min_rate_time: 22,
            }
        );
    }

    #[test]
    fn decode_tolerates_absent_empty_and_malformed_blobs() {
        assert_eq!(decode(None), DynamicRatePolicy::EDIT_DEFAULT);
        assert_eq!(decode(Some(&Value::Null)), DynamicRatePolicy::EDIT_DEFAULT);
        assert_eq!(decode(Some(&json!(""))), DynamicRatePolicy::EDIT_DEFAULT);
        assert_eq!(decode(Some(&json!("{not json"))), DynamicRatePolicy::EDIT_DEFAULT);
        assert_eq!(decode(Some(&json!([1, 2, 3]))), DynamicRatePolicy::EDIT_DEFAULT);
    }

    #[test]
    fn decode_reads_string_encoded_legacy_rows() {
        let blob = json!(r#"{"max_rate":"1.5","max_rate_time":"8","min_rate":"0.5","min_rate_time":"1"}"#);
        assert_eq!(
            decode(Some(&blob)),
            DynamicRatePolicy {
                max_rate: 1.5,
                max_rate_time: 8,
                min_rate: 0.5,
                min_rate_time: 1,
            }
        );
    }

    #[test]
    fn out_of_range_values_fall_back_to_defaults() {
        let input = RatePolicyInput {
            max_rate: Some(-3.0),
            max_rate_time: Some(24),
            min_rate: Some(0.0),
            min_rate_time: Some(-1),
        };
        assert_eq!(decode(Some(&encode(&input))), DynamicRatePolicy::CREATE_DEFAULT);
    }

    #[test]
    fn encode_is_a_full_replace() {
        let first = encode(&RatePolicyInput {
            max_rate: Some(3.0),
            max_rate_time: Some(20),
            min_rate: Some(0.5),
            min_rate_time: Some(4),
        });
        let second = encode(&only_max_rate());
        assert_ne!(first, second);
        assert_eq!(second["max_rate_time"], json!(0));
        assert_eq!(second["min_rate"], json!(1.0));
    }
}
