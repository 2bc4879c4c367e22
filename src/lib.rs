//! Prompt Log Library
//!
//! Sends prompts to a hosted model endpoint and records every prompt/response
//! exchange in an append-only JSON log

pub mod config;
pub mod models;
pub mod providers;
pub mod services;
pub mod utils;

// Re-export common types
pub use config::Settings;
pub use models::{GenerationOptions, GenerationOutcome, ResponseRecord, TokenUsage};
pub use providers::{ChatCompletionsGateway, ModelGateway};
pub use services::{AppendReport, BatchReport, BatchRunner, JsonLogStore, RetryingGateway};
pub use utils::error::{GatewayError, GatewayResult, StoreError, StoreResult};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Library description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get version information
pub fn version_info() -> String {
    format!("{} v{} - {}", NAME, VERSION, DESCRIPTION)
}

/// Runner wired from settings: HTTP gateway, retry wrapper and log store
pub type DefaultRunner = BatchRunner<RetryingGateway<ChatCompletionsGateway>>;

/// Build a runner from settings
pub fn create_runner(settings: &Settings) -> anyhow::Result<DefaultRunner> {
    let gateway = ChatCompletionsGateway::new(settings.gateway.clone())?;
    let gateway = RetryingGateway::new(gateway, settings.retry.clone());
    let store = JsonLogStore::from_config(&settings.store);

    tracing::info!(
        "Runner ready: deployment={}, log={}",
        settings.gateway.deployment,
        store.path().display()
    );

    Ok(BatchRunner::new(gateway, store))
}
