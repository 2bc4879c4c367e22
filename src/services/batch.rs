//! Batch runner
//!
//! Sends prompts through a gateway one at a time and persists the whole batch
//! with a single log append.

use super::log_store::{AppendReport, JsonLogStore};
use crate::models::{GenerationOptions, ResponseRecord};
use crate::providers::ModelGateway;
use crate::utils::error::StoreError;
use crate::utils::logging::truncate_content;
use tracing::{error, info, warn};

/// Outcome of a batch run
///
/// Generation failures live inside `records`; `persisted` only reports the log write.
#[derive(Debug)]
pub struct BatchReport {
    /// One record per prompt, in input order
    pub records: Vec<ResponseRecord>,
    /// Result of appending the records to the log
    pub persisted: Result<AppendReport, StoreError>,
}

impl BatchReport {
    /// Number of prompts that produced a response
    pub fn succeeded(&self) -> usize {
        self.records.iter().filter(|r| r.is_success()).count()
    }

    /// Number of prompts whose record carries an error
    pub fn failed(&self) -> usize {
        self.records.len() - self.succeeded()
    }

    /// Whether the records reached the log
    pub fn is_persisted(&self) -> bool {
        self.persisted.is_ok()
    }
}

/// Sequential prompt runner backed by a gateway and a log store
pub struct BatchRunner<G> {
    gateway: G,
    store: JsonLogStore,
}

impl<G: ModelGateway> BatchRunner<G> {
    /// Create a runner
    pub fn new(gateway: G, store: JsonLogStore) -> Self {
        Self { gateway, store }
    }

    /// Log store used by this runner
    pub fn store(&self) -> &JsonLogStore {
        &self.store
    }

    /// Gateway used by this runner
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Generate one record per prompt, then append them all in one write
    pub async fn run<I, S>(&self, prompts: I, options: &GenerationOptions) -> BatchReport
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let prompts: Vec<String> = prompts.into_iter().map(Into::into).collect();
        let total = prompts.len();
        let mut records = Vec::with_capacity(total);

        for (index, prompt) in prompts.into_iter().enumerate() {
            info!(
                "Processing prompt {}/{}: {}",
                index + 1,
                total,
                truncate_content(&prompt, 60)
            );
            records.push(self.generate_record(prompt, options).await);
        }

        let persisted = self.store.append(&records);
        if let Err(e) = &persisted {
            error!("Failed to persist batch of {} records: {}", records.len(), e);
        }

        let report = BatchReport { records, persisted };
        info!(
            "Batch finished: {} succeeded, {} failed",
            report.succeeded(),
            report.failed()
        );
        report
    }

    /// Generate and persist a single prompt
    pub async fn run_one(&self, prompt: impl Into<String>, options: &GenerationOptions) -> BatchReport {
        self.run(std::iter::once(prompt.into()), options).await
    }

    async fn generate_record(&self, prompt: String, options: &GenerationOptions) -> ResponseRecord {
        let result = self.gateway.generate(&prompt, options).await;
        if let Err(e) = &result {
            warn!("Prompt failed with {}: {}", e.error_type(), e);
        }
        ResponseRecord::from_result(prompt, result, self.gateway.model())
    }
}
