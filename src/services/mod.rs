//! Service layer module
//!
//! Contains the JSON log store, the batch runner and the retry wrapper

pub mod batch;
pub mod log_store;
pub mod retry;

pub use batch::{BatchReport, BatchRunner};
pub use log_store::{AppendReport, JsonLogStore};
pub use retry::RetryingGateway;
