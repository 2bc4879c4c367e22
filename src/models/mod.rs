//! Data models module
//!
//! Defines generation options and results, the persisted response record,
//! and the chat completions wire format

use crate::utils::error::{helpers::invalid_request, GatewayResult};
use serde::{Deserialize, Serialize};

pub mod chat;
pub mod record;

pub use record::ResponseRecord;

/// Default response length cap
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Options for a single generation call
///
/// Unknown keys are rejected when options are deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct GenerationOptions {
    /// Caps response length
    pub max_tokens: u32,
    /// Sampling randomness, in [0, 2]
    pub temperature: f32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl GenerationOptions {
    /// Set max tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Check option ranges
    pub fn validate(&self) -> GatewayResult<()> {
        if self.max_tokens == 0 {
            return Err(invalid_request("max_tokens must be positive"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(invalid_request(format!(
                "temperature must be within [0, 2], got {}",
                self.temperature
            )));
        }
        Ok(())
    }
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenUsage {
    /// Prompt token count
    pub prompt_tokens: u32,
    /// Completion token count
    pub completion_tokens: u32,
    /// Total token count
    pub total_tokens: u32,
}

/// Successful generation result
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutcome {
    /// Generated text, never empty
    pub text: String,
    /// Token usage, zeroed when the endpoint reports none
    pub usage: TokenUsage,
    /// Model the endpoint reports having used
    pub model: String,
}
