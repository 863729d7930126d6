use async_trait::async_trait;
use reqwest::{header, Client, Method};
use std::collections::HashMap;
use tera::{Context, Tera};

use super::{NotificationSender, SenderError};
use crate::notifications::models::ChannelConfig;

/// Posts notifications to an operator-supplied HTTP endpoint.
#[derive(Clone)]
pub struct WebhookSender {
    client: Client,
}

impl Default for WebhookSender {
    fn default() -> Self {
        Self::new()
    }
}

impl WebhookSender {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

/// Renders the POST body. Without a template the body is a JSON object holding
/// `message` and every context field.
pub(crate) fn render_body(
    body_template: Option<&str>,
    message: &str,
    context: &HashMap<String, String>,
) -> Result<String, SenderError> {
    let Some(template) = body_template else {
        let mut body: serde_json::Map<String, serde_json::Value> = context
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect();
        body.insert("message".to_string(), serde_json::Value::String(message.to_string()));
        return Ok(serde_json::Value::Object(body).to_string());
    };

    let mut tera_context = Context::new();
    for (key, value) in context {
        tera_context.insert(key, value);
    }
    tera_context.insert("message", message);

    Tera::one_off(template, &tera_context, true).map_err(|e| SenderError::TemplatingError(e.to_string()))
}

fn parse_method(method: &str) -> Result<Method, SenderError> {
    match method.to_uppercase().as_str() {
        "POST" => Ok(Method::POST),
        "GET" => Ok(Method::GET),
        _ => Err(SenderError::InvalidConfiguration(format!(
            "Unsupported HTTP method: {method}"
        ))),
    }
}

#[async_trait]
impl NotificationSender for WebhookSender {
    async fn send(
        &self,
        config: &ChannelConfig,
        message: &str,
        context: &HashMap<String, String>,
    ) -> Result<(), SenderError> {
        let ChannelConfig::Webhook {
            url,
            method,
            headers,
            body_template,
        } = config
        else {
            return Err(SenderError::InvalidConfiguration(
                "Expected Webhook config, but found a different type.".to_string(),
            ));
        };

        let http_method = parse_method(method)?;
        let is_post = http_method == Method::POST;
        let mut request_builder = self.client.request(http_method, url);

        if let Some(h) = headers {
            let mut header_map = header::HeaderMap::new();
            for (key, value) in h {
                let header_name = header::HeaderName::from_bytes(key.as_bytes())
                    .map_err(|e| SenderError::InvalidConfiguration(format!("Invalid header name: {e}")))?;
                let header_value = header::HeaderValue::from_str(value)
                    .map_err(|e| SenderError::InvalidConfiguration(format!("Invalid header value: {e}")))?;
                header_map.insert(header_name, header_value);
            }
            request_builder = request_builder.headers(header_map);
        }

        if is_post {
            let body = render_body(body_template.as_deref(), message, context)?;
            request_builder = request_builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(body);
        } else {
            request_builder = request_builder.query(&[("message", message)]);
        }

        let response = request_builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(SenderError::SendFailed(format!(
                "Webhook returned non-success status: {status}. Body: {error_body}"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> HashMap<String, String> {
        HashMap::from([
            ("event".to_string(), "node_added".to_string()),
            ("title".to_string(), "Node added".to_string()),
        ])
    }

    #[test]
    fn default_body_is_json_with_context_fields() {
        let body = render_body(None, "Node hk-01 was added", &context()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed["message"], "Node hk-01 was added");
        assert_eq!(parsed["event"], "node_added");
        assert_eq!(parsed["title"], "Node added");
    }

    #[test]
    fn template_body_is_rendered_with_tera() {
        let body = render_body(Some(r#"{"text": "{{ title }}: {{ message }}"}"#), "hk-01", &context()).unwrap();
        assert_eq!(body, r#"{"text": "Node added: hk-01"}"#);
    }

    #[test]
    fn broken_template_is_a_templating_error() {
        let result = render_body(Some("{{ unclosed"), "m", &context());
        assert!(matches!(result, Err(SenderError::TemplatingError(_))));
    }

    #[test]
    fn only_get_and_post_are_supported() {
        assert_eq!(parse_method("post").unwrap(), Method::POST);
        assert_eq!(parse_method("GET").unwrap(), Method::GET);
        assert!(parse_method("DELETE").is_err());
    }
}
