//! Wire types for the Anthropic messages schema as served by Bedrock.

use crate::config::InferenceSettings;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InferencePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anthropic_version: Option<String>,
    pub messages: Vec<InferenceMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InferenceMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
}

impl InferencePayload {
    /// A single user turn with the configured generation parameters.
    pub fn user_turn(message: impl Into<String>, settings: &InferenceSettings) -> Self {
        Self {
            anthropic_version: settings.anthropic_version.clone(),
            messages: vec![InferenceMessage {
                role: Role::User,
                content: message.into(),
            }],
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
        }
    }
}

/// Only `content` is read; everything else the service returns is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct InferenceResponse {
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentBlock {
    #[serde(default)]
    pub text: Option<String>,
}

impl InferenceResponse {
    /// Text of the first content block, if it has any.
    pub fn into_first_text(self) -> Option<String> {
        self.content.into_iter().next().and_then(|block| block.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_has_exactly_the_generation_fields() {
        let payload = InferencePayload::user_turn("Hello", &InferenceSettings::default());
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["messages"], json!([{"role": "user", "content": "Hello"}]));
        assert_eq!(value["max_tokens"], 1000);
        assert!((value["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert_eq!(value.as_object().unwrap().len(), 3);
    }

    #[test]
    fn payload_includes_anthropic_version_when_configured() {
        let settings = InferenceSettings {
            anthropic_version: Some("bedrock-2023-05-31".to_string()),
            ..InferenceSettings::default()
        };
        let value = serde_json::to_value(InferencePayload::user_turn("Hi", &settings)).unwrap();
        assert_eq!(value["anthropic_version"], "bedrock-2023-05-31");
    }

    #[test]
    fn first_text_is_extracted_and_extra_fields_ignored() {
        let response: InferenceResponse = serde_json::from_value(json!({
            "id": "msg_01",
            "type": "message",
            "content": [
                {"type": "text", "text": "first"},
                {"type": "text", "text": "second"}
            ],
            "usage": {"input_tokens": 3, "output_tokens": 1}
        }))
        .unwrap();

        assert_eq!(response.into_first_text().as_deref(), Some("first"));
    }

    #[test]
    fn empty_content_yields_none() {
        let response: InferenceResponse = serde_json::from_value(json!({"content": []})).unwrap();
        assert!(response.into_first_text().is_none());
    }

    #[test]
    fn first_block_without_text_yields_none() {
        let response: InferenceResponse = serde_json::from_value(json!({
            "content": [{"type": "tool_use", "id": "t1"}, {"type": "text", "text": "late"}]
        }))
        .unwrap();
        assert!(response.into_first_text().is_none());
    }
}
