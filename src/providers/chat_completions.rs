//! Chat completions gateway
//!
//! Azure deployment and OpenAI-compatible (DeepSeek) chat completions endpoints

use super::ModelGateway;
use crate::config::{ApiFlavor, GatewayConfig};
use crate::models::chat::{ChatErrorResponse, ChatMessage, ChatRequest, ChatResponse};
use crate::models::{GenerationOptions, GenerationOutcome};
use crate::utils::error::{helpers::invalid_request, GatewayError, GatewayResult};
use crate::utils::logging::truncate_content;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use std::time::Duration;
use tracing::{debug, error, warn};

/// HTTP gateway for chat completions endpoints
#[derive(Debug, Clone)]
pub struct ChatCompletionsGateway {
    client: Client,
    config: GatewayConfig,
}

impl ChatCompletionsGateway {
    /// Create a new gateway instance
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(concat!("promptlog/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    /// Build the request URL, without query parameters
    fn build_url(&self) -> String {
        let base_url = self.config.endpoint.trim_end_matches('/');
        match self.config.flavor {
            ApiFlavor::Azure => format!(
                "{}/openai/deployments/{}/chat/completions",
                base_url, self.config.deployment
            ),
            ApiFlavor::OpenAI => format!("{}/chat/completions", base_url),
        }
    }

    /// Attach flavor-specific credentials and query parameters
    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.config.flavor {
            ApiFlavor::Azure => builder
                .header("api-key", &self.config.api_key)
                .query(&[("api-version", self.config.api_version.as_str())]),
            ApiFlavor::OpenAI => {
                builder.header("Authorization", format!("Bearer {}", self.config.api_key))
            }
        }
    }
}

#[async_trait]
impl ModelGateway for ChatCompletionsGateway {
    fn model(&self) -> &str {
        &self.config.deployment
    }

    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> GatewayResult<GenerationOutcome> {
        if prompt.trim().is_empty() {
            return Err(invalid_request("prompt cannot be empty"));
        }
        options.validate()?;

        debug!(
            "Sending chat completion request: model={}, max_tokens={}, temperature={}, prompt={}",
            self.config.deployment,
            options.max_tokens,
            options.temperature,
            truncate_content(prompt, 100)
        );

        let request = ChatRequest {
            model: self.config.deployment.clone(),
            messages: vec![ChatMessage::user(prompt)],
            max_tokens: options.max_tokens,
            temperature: options.temperature,
        };

        let response = self
            .authorize(self.client.post(self.build_url()))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(GatewayError::from)?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok());

        let body = response.text().await.map_err(GatewayError::from)?;

        if !status.is_success() {
            let err = map_error_status(status, retry_after, &body);
            if err.should_log_details() {
                error!("Chat completion request failed: {} - {}", status, err);
            } else {
                warn!("Chat completion request rejected: {}", err.error_type());
            }
            return Err(err);
        }

        let chat_response: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            GatewayError::MalformedResponse(format!(
                "{}: {}",
                e,
                truncate_content(&body, 200)
            ))
        })?;

        let outcome = chat_response.into_outcome(&self.config.deployment)?;
        debug!(
            "Chat completion succeeded: model={}, total_tokens={}",
            outcome.model, outcome.usage.total_tokens
        );
        Ok(outcome)
    }
}

/// Map a non-success HTTP status onto the gateway error taxonomy
pub fn map_error_status(status: StatusCode, retry_after_secs: Option<u64>, body: &str) -> GatewayError {
    let message = match serde_json::from_str::<ChatErrorResponse>(body) {
        Ok(error_response) => error_response.error.message,
        Err(_) if body.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("no response body")
            .to_string(),
        Err(_) => truncate_content(body.trim(), 200),
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GatewayError::Authentication(message),
        StatusCode::NOT_FOUND => GatewayError::DeploymentNotFound(message),
        StatusCode::TOO_MANY_REQUESTS => GatewayError::RateLimited { retry_after_secs },
        _ => GatewayError::Api {
            status: status.as_u16(),
            message,
        },
    }
}
