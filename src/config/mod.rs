//! Configuration management module
//!
//! Loads endpoint, generation, retry, log store and logging settings from environment variables

pub mod settings;

pub use settings::{
    ApiFlavor, CorruptionPolicy, GatewayConfig, LoggingConfig, RetryConfig, Settings, StoreConfig,
};
