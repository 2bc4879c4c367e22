//! Persisted prompt/response record

use super::{GenerationOutcome, TokenUsage};
use crate::utils::error::GatewayError;
use serde::{Deserialize, Deserializer, Serialize};

/// Timestamp layout written to the log: local time, microsecond precision, no offset
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// One prompt/response exchange as stored in the JSON log
///
/// `response` and `usage` are always written; entries from older logs that
/// omit them, or hold `null`, read back as empty text and zeroed counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    /// Exact prompt text sent
    pub prompt: String,
    /// Generated text, empty on failure
    #[serde(default, deserialize_with = "null_as_default")]
    pub response: String,
    /// Deployment identifier
    pub model: String,
    /// Creation time
    pub timestamp: String,
    /// Token usage
    #[serde(default, deserialize_with = "null_as_default")]
    pub usage: TokenUsage,
    /// Failure cause
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResponseRecord {
    /// Build a record from a successful generation
    pub fn success(prompt: impl Into<String>, outcome: GenerationOutcome) -> Self {
        Self {
            prompt: prompt.into(),
            response: outcome.text,
            model: outcome.model,
            timestamp: now_timestamp(),
            usage: outcome.usage,
            error: None,
        }
    }

    /// Build a record from a failed generation
    ///
    /// The call never returned a model name, so the configured one is used.
    pub fn failure(prompt: impl Into<String>, error: &GatewayError, configured_model: &str) -> Self {
        Self {
            prompt: prompt.into(),
            response: String::new(),
            model: configured_model.to_string(),
            timestamp: now_timestamp(),
            usage: TokenUsage::default(),
            error: Some(error.to_string()),
        }
    }

    /// Build a record from either generation result
    pub fn from_result(
        prompt: impl Into<String>,
        result: Result<GenerationOutcome, GatewayError>,
        configured_model: &str,
    ) -> Self {
        match result {
            Ok(outcome) => Self::success(prompt, outcome),
            Err(error) => Self::failure(prompt, &error, configured_model),
        }
    }

    /// Whether the exchange produced a response
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Current local time in log timestamp layout
pub fn now_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}
