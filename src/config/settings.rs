//! Application configuration settings
//!
//! Defines all configuration structures and loading logic

use crate::models::GenerationOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Model endpoint configuration
    pub gateway: GatewayConfig,
    /// Default generation options
    pub generation: GenerationOptions,
    /// Retry configuration
    pub retry: RetryConfig,
    /// Response log configuration
    pub store: StoreConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Wire flavor of the chat-completions endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiFlavor {
    /// Azure deployment URL with `api-key` header
    Azure,
    /// `{base}/chat/completions` with bearer token
    OpenAI,
}

impl std::str::FromStr for ApiFlavor {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "azure" => Ok(ApiFlavor::Azure),
            "openai" => Ok(ApiFlavor::OpenAI),
            other => anyhow::bail!("Invalid API flavor: {}", other),
        }
    }
}

/// Model endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Endpoint base URL
    pub endpoint: String,
    /// API key
    pub api_key: String,
    /// Deployment / model identifier
    pub deployment: String,
    /// Endpoint flavor
    pub flavor: ApiFlavor,
    /// Azure `api-version` query parameter
    pub api_version: String,
    /// Request timeout in seconds
    pub timeout: u64,
}

/// Retry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum retry attempts
    pub max_retries: u32,
    /// Base delay time (milliseconds)
    pub base_delay_ms: u64,
    /// Maximum delay time (milliseconds)
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            base_delay_ms: 1000,
            max_delay_ms: 10000,
        }
    }
}

/// What the log store does when the existing file is not a valid log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorruptionPolicy {
    /// Move the bad file aside and start a fresh log
    #[default]
    BackupAndReset,
    /// Refuse to write and report `CorruptedLog`
    Fail,
}

impl std::str::FromStr for CorruptionPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "backup" | "backup_and_reset" => Ok(CorruptionPolicy::BackupAndReset),
            "fail" => Ok(CorruptionPolicy::Fail),
            other => anyhow::bail!("Invalid corrupt log policy: {}", other),
        }
    }
}

/// Response log configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path of the JSON log file
    pub path: PathBuf,
    /// Corrupted file handling
    pub corruption_policy: CorruptionPolicy,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format (text/json)
    pub format: String,
}

impl Settings {
    /// Create a new configuration instance
    pub fn new() -> Result<Self> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        let settings = Self {
            gateway: GatewayConfig {
                endpoint: std::env::var("MODEL_ENDPOINT")
                    .context("MODEL_ENDPOINT environment variable not set")?,
                api_key: std::env::var("MODEL_API_KEY")
                    .context("MODEL_API_KEY environment variable not set")?,
                deployment: get_env_or_default("MODEL_DEPLOYMENT", "deepseek-chat"),
                flavor: get_env_or_default("MODEL_API_FLAVOR", "azure").parse()?,
                api_version: get_env_or_default("MODEL_API_VERSION", "2024-02-15-preview"),
                timeout: get_env_or_default("REQUEST_TIMEOUT", "60")
                    .parse()
                    .context("Invalid timeout value")?,
            },
            generation: GenerationOptions {
                max_tokens: get_env_or_default("DEFAULT_MAX_TOKENS", "1000")
                    .parse()
                    .context("Invalid default max tokens")?,
                temperature: get_env_or_default("DEFAULT_TEMPERATURE", "0.7")
                    .parse()
                    .context("Invalid default temperature")?,
            },
            retry: RetryConfig {
                max_retries: get_env_or_default("MAX_RETRIES", "0")
                    .parse()
                    .context("Invalid max retries")?,
                base_delay_ms: get_env_or_default("RETRY_BASE_DELAY_MS", "1000")
                    .parse()
                    .context("Invalid retry base delay")?,
                max_delay_ms: get_env_or_default("RETRY_MAX_DELAY_MS", "10000")
                    .parse()
                    .context("Invalid retry max delay")?,
            },
            store: StoreConfig {
                path: PathBuf::from(get_env_or_default("RESPONSE_LOG_PATH", "satQuestions.json")),
                corruption_policy: get_env_or_default("CORRUPT_LOG_POLICY", "backup").parse()?,
            },
            logging: LoggingConfig {
                level: get_env_or_default("RUST_LOG", "info"),
                format: get_env_or_default("LOG_FORMAT", "text"),
            },
        };

        // Validate configuration
        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration validity
    pub fn validate(&self) -> Result<()> {
        if self.gateway.api_key.is_empty() {
            anyhow::bail!("API key cannot be empty");
        }

        if self.gateway.api_key.contains(char::is_whitespace) {
            anyhow::bail!("API key cannot contain whitespace characters");
        }

        if !self.gateway.endpoint.starts_with("http") {
            anyhow::bail!("Invalid endpoint URL format, should start with 'http'");
        }

        if self.gateway.deployment.trim().is_empty() {
            anyhow::bail!("Deployment name cannot be empty");
        }

        if self.gateway.timeout == 0 {
            anyhow::bail!("Timeout values cannot be 0");
        }

        self.generation
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid generation defaults: {}", e))?;

        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            anyhow::bail!("Retry base delay cannot exceed max delay");
        }

        if self.store.path.as_os_str().is_empty() {
            anyhow::bail!("Response log path cannot be empty");
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            anyhow::bail!("Invalid log level: {}", self.logging.level);
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            anyhow::bail!("Invalid log format: {}", self.logging.format);
        }

        Ok(())
    }
}

/// Get environment variable or default value
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
