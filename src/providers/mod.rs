//! Provider module
//!
//! Defines the ModelGateway trait and its HTTP implementation

pub mod chat_completions;

use crate::models::{GenerationOptions, GenerationOutcome};
use crate::utils::error::GatewayResult;
use async_trait::async_trait;

/// Gateway to a hosted model endpoint
///
/// Implementations keep no state between calls and persist nothing.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Configured deployment / model identifier
    fn model(&self) -> &str;

    /// Send one prompt and return the generated text or a typed failure
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> GatewayResult<GenerationOutcome>;
}

#[async_trait]
impl<G: ModelGateway + ?Sized> ModelGateway for std::sync::Arc<G> {
    fn model(&self) -> &str {
        (**self).model()
    }

    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> GatewayResult<GenerationOutcome> {
        (**self).generate(prompt, options).await
    }
}

pub use chat_completions::ChatCompletionsGateway;
