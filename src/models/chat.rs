//! Chat completions wire models
//!
//! Request and response bodies exchanged with the model endpoint

use super::{GenerationOutcome, TokenUsage};
use crate::utils::error::{helpers::malformed, GatewayResult};
use serde::{Deserialize, Serialize};

/// Chat completions request structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model or deployment name
    pub model: String,
    /// Message list
    pub messages: Vec<ChatMessage>,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Temperature parameter
    pub temperature: f32,
}

/// Chat message structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role (system/user/assistant)
    pub role: String,
    /// Message content
    pub content: Option<String>,
}

impl ChatMessage {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: Some(content.into()),
        }
    }
}

/// Chat completions response structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Response ID
    #[serde(default)]
    pub id: Option<String>,
    /// Model used
    #[serde(default)]
    pub model: Option<String>,
    /// Choice list
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    /// Usage statistics
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

/// Chat choice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatChoice {
    /// Choice index
    #[serde(default)]
    pub index: u32,
    /// Message content
    pub message: ChatMessage,
    /// Finish reason
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatErrorResponse {
    /// Error information
    pub error: ChatError,
}

/// Error details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatError {
    /// Error message
    pub message: String,
    /// Error type
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    /// Error code; Azure sends strings, some gateways send numbers
    #[serde(default)]
    pub code: Option<serde_json::Value>,
}

impl ChatResponse {
    /// Normalize into a generation outcome
    ///
    /// `fallback_model` is used when the endpoint does not echo a model name.
    pub fn into_outcome(self, fallback_model: &str) -> GatewayResult<GenerationOutcome> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| malformed("response contains no choices"))?;

        let text = choice
            .message
            .content
            .filter(|content| !content.is_empty())
            .ok_or_else(|| malformed("first choice has no content"))?;

        let model = self
            .model
            .filter(|model| !model.is_empty())
            .unwrap_or_else(|| fallback_model.to_string());

        Ok(GenerationOutcome {
            text,
            usage: self.usage.unwrap_or_default(),
            model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::GatewayError;

    #[test]
    fn test_request_serialization() {
        let request = ChatRequest {
            model: "deepseek-chat".to_string(),
            messages: vec![ChatMessage::user("Hello")],
            max_tokens: 100,
            temperature: 0.7,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "Hello");
        assert_eq!(json["max_tokens"], 100);
    }

    #[test]
    fn test_into_outcome_uses_reported_model() {
        let response: ChatResponse = serde_json::from_str(
            r#"{
                "id": "chatcmpl-1",
                "model": "deepseek-v3",
                "choices": [{"index": 0, "message": {"role": "assistant", "content": "42"}, "finish_reason": "stop"}],
                "usage": {"prompt_tokens": 3, "completion_tokens": 1, "total_tokens": 4}
            }"#,
        )
        .unwrap();

        let outcome = response.into_outcome("deepseek-chat").unwrap();
        assert_eq!(outcome.text, "42");
        assert_eq!(outcome.model, "deepseek-v3");
        assert_eq!(outcome.usage.total_tokens, 4);
    }

    #[test]
    fn test_into_outcome_defaults() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": "hi"}}]}"#,
        )
        .unwrap();

        let outcome = response.into_outcome("deepseek-chat").unwrap();
        assert_eq!(outcome.model, "deepseek-chat");
        assert_eq!(outcome.usage, TokenUsage::default());
    }

    #[test]
    fn test_into_outcome_without_choices() {
        let response: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        let err = response.into_outcome("deepseek-chat").unwrap_err();
        assert!(matches!(err, GatewayError::MalformedResponse(_)));
    }

    #[test]
    fn test_into_outcome_with_null_content() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#,
        )
        .unwrap();
        let err = response.into_outcome("deepseek-chat").unwrap_err();
        assert!(matches!(err, GatewayError::MalformedResponse(_)));
    }
}
