//! Retry wrapper for model gateways
//!
//! Retries only rate-limit and network failures, and only as often as configured

use crate::config::RetryConfig;
use crate::models::{GenerationOptions, GenerationOutcome};
use crate::providers::ModelGateway;
use crate::utils::error::GatewayResult;
use async_trait::async_trait;
use std::time::Duration;
use tracing::warn;

/// Gateway wrapper with retry functionality
#[derive(Debug, Clone)]
pub struct RetryingGateway<G> {
    inner: G,
    retry_config: RetryConfig,
}

impl<G: ModelGateway> RetryingGateway<G> {
    /// Wrap a gateway with retry functionality
    pub fn new(inner: G, retry_config: RetryConfig) -> Self {
        Self { inner, retry_config }
    }

    /// Backoff before the given retry attempt (0-based)
    pub fn delay_for(&self, attempt: u32, retry_after_secs: Option<u64>) -> Duration {
        if let Some(secs) = retry_after_secs {
            return Duration::from_secs(secs);
        }
        let factor = 2_u64.saturating_pow(attempt);
        let delay = std::cmp::min(
            self.retry_config.base_delay_ms.saturating_mul(factor),
            self.retry_config.max_delay_ms,
        );
        Duration::from_millis(delay)
    }

    /// Get inner gateway reference
    pub fn inner(&self) -> &G {
        &self.inner
    }
}

#[async_trait]
impl<G: ModelGateway> ModelGateway for RetryingGateway<G> {
    fn model(&self) -> &str {
        self.inner.model()
    }

    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> GatewayResult<GenerationOutcome> {
        let mut attempt = 0;
        loop {
            match self.inner.generate(prompt, options).await {
                Ok(outcome) => return Ok(outcome),
                Err(e) if e.is_retryable() && attempt < self.retry_config.max_retries => {
                    let delay = self.delay_for(attempt, e.retry_after_secs());
                    warn!(
                        "Request failed ({}), retrying after {}ms (attempt {}/{})",
                        e,
                        delay.as_millis(),
                        attempt + 1,
                        self.retry_config.max_retries
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
