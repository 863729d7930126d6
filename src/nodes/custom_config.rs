use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// Protocol-specific node settings.
///
/// Keys the panel understands get typed fields. Everything else a protocol backend
/// needs is carried through `extra` untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_port_user: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_port_node: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CustomConfig {
    /// Accepts the submitted value as a JSON object or as JSON text. Absent or
    /// blank input is an empty config. Input that is not a JSON object is dropped
    /// with a warning rather than rejected.
    pub fn from_input(input: Option<&Value>) -> Self {
        let object = match input {
            None | Some(Value::Null) => return Self::default(),
            Some(Value::String(text)) if text.trim().is_empty() => return Self::default(),
            Some(Value::String(text)) => match serde_json::from_str::<Value>(text) {
                Ok(Value::Object(map)) => map,
                _ => {
                    warn!("Ignoring custom_config that is not a JSON object.");
                    return Self::default();
                }
            },
            Some(Value::Object(map)) => map.clone(),
            Some(_) => {
                warn!("Ignoring custom_config that is not a JSON object.");
                return Self::default();
            }
        };

        // A known key with an unexpected type keeps the whole object as opaque data.
        match serde_json::from_value::<Self>(Value::Object(object.clone())) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "custom_config has unexpected field types, storing it untyped.");
                Self {
                    extra: object,
                    ..Self::default()
                }
            }
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Map::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blank_input_is_an_empty_object() {
        assert_eq!(CustomConfig::from_input(None).to_value(), json!({}));
        assert_eq!(CustomConfig::from_input(Some(&json!(""))).to_value(), json!({}));
        assert_eq!(CustomConfig::from_input(Some(&Value::Null)).to_value(), json!({}));
    }

    #[test]
    fn known_keys_are_typed_and_unknown_keys_preserved() {
        let input = json!(r#"{"offset_port_node": 443, "host": "cdn.example.com", "flow": "xtls-rprx-vision"}"#);
        let config = CustomConfig::from_input(Some(&input));
        assert_eq!(config.offset_port_node, Some(443));
        assert_eq!(config.host.as_deref(), Some("cdn.example.com"));
        assert_eq!(config.extra.get("flow"), Some(&json!("xtls-rprx-vision")));
        assert_eq!(
            config.to_value(),
            json!({"offset_port_node": 443, "host": "cdn.example.com", "flow": "xtls-rprx-vision"})
        );
    }

    #[test]
    fn mistyped_known_key_keeps_object_untyped() {
        let input = json!({"offset_port_user": "not-a-port", "mux": true});
        let config = CustomConfig::from_input(Some(&input));
        assert_eq!(config.offset_port_user, None);
        assert_eq!(config.to_value(), input);
    }

    #[test]
    fn non_object_input_is_dropped() {
        assert_eq!(CustomConfig::from_input(Some(&json!("[1,2]"))), CustomConfig::default());
        assert_eq!(CustomConfig::from_input(Some(&json!("{broken"))), CustomConfig::default());
        assert_eq!(CustomConfig::from_input(Some(&json!(42))), CustomConfig::default());
    }
}
