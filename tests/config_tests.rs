//! Configuration module unit tests

use promptlog::config::{ApiFlavor, CorruptionPolicy, Settings};
use std::env;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

// Environment variables are process-wide; tests touching them run one at a time
static ENV_LOCK: Mutex<()> = Mutex::new(());

const VARS: [&str; 15] = [
    "MODEL_ENDPOINT", "MODEL_API_KEY", "MODEL_DEPLOYMENT", "MODEL_API_FLAVOR",
    "MODEL_API_VERSION", "REQUEST_TIMEOUT", "MAX_RETRIES", "RETRY_BASE_DELAY_MS",
    "RETRY_MAX_DELAY_MS", "DEFAULT_MAX_TOKENS", "DEFAULT_TEMPERATURE",
    "RESPONSE_LOG_PATH", "CORRUPT_LOG_POLICY", "RUST_LOG", "LOG_FORMAT",
];

/// Setup test environment variables
fn setup_test_env() -> MutexGuard<'static, ()> {
    let guard = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    cleanup_test_env();
    env::set_var("MODEL_ENDPOINT", "https://my-resource.openai.azure.com");
    env::set_var("MODEL_API_KEY", "test-key-12345678");
    guard
}

/// Clean up test environment variables
fn cleanup_test_env() {
    for var in &VARS {
        env::remove_var(var);
    }
}

#[test]
fn test_settings_defaults() {
    let _guard = setup_test_env();

    let settings = Settings::new().unwrap();
    assert_eq!(settings.gateway.endpoint, "https://my-resource.openai.azure.com");
    assert_eq!(settings.gateway.api_key, "test-key-12345678");
    assert_eq!(settings.gateway.deployment, "deepseek-chat");
    assert_eq!(settings.gateway.flavor, ApiFlavor::Azure);
    assert_eq!(settings.gateway.api_version, "2024-02-15-preview");
    assert_eq!(settings.gateway.timeout, 60);
    assert_eq!(settings.generation.max_tokens, 1000);
    assert_eq!(settings.generation.temperature, 0.7);
    assert_eq!(settings.retry.max_retries, 0);
    assert_eq!(settings.store.path, PathBuf::from("satQuestions.json"));
    assert_eq!(settings.store.corruption_policy, CorruptionPolicy::BackupAndReset);
    assert_eq!(settings.logging.level, "info");
    assert_eq!(settings.logging.format, "text");

    cleanup_test_env();
}

#[test]
fn test_settings_overrides() {
    let _guard = setup_test_env();
    env::set_var("MODEL_API_FLAVOR", "openai");
    env::set_var("MODEL_DEPLOYMENT", "deepseek-reasoner");
    env::set_var("MAX_RETRIES", "3");
    env::set_var("DEFAULT_MAX_TOKENS", "8000");
    env::set_var("DEFAULT_TEMPERATURE", "0.9");
    env::set_var("RESPONSE_LOG_PATH", "/var/lib/sat/log.json");
    env::set_var("CORRUPT_LOG_POLICY", "fail");
    env::set_var("LOG_FORMAT", "json");

    let settings = Settings::new().unwrap();
    assert_eq!(settings.gateway.flavor, ApiFlavor::OpenAI);
    assert_eq!(settings.gateway.deployment, "deepseek-reasoner");
    assert_eq!(settings.retry.max_retries, 3);
    assert_eq!(settings.generation.max_tokens, 8000);
    assert_eq!(settings.generation.temperature, 0.9);
    assert_eq!(settings.store.path, PathBuf::from("/var/lib/sat/log.json"));
    assert_eq!(settings.store.corruption_policy, CorruptionPolicy::Fail);
    assert_eq!(settings.logging.format, "json");

    cleanup_test_env();
}

#[test]
fn test_settings_missing_api_key() {
    let _guard = setup_test_env();
    env::remove_var("MODEL_API_KEY");

    let error = Settings::new().unwrap_err();
    assert!(error.to_string().contains("MODEL_API_KEY"));

    cleanup_test_env();
}

#[test]
fn test_settings_missing_endpoint() {
    let _guard = setup_test_env();
    env::remove_var("MODEL_ENDPOINT");

    let error = Settings::new().unwrap_err();
    assert!(error.to_string().contains("MODEL_ENDPOINT"));

    cleanup_test_env();
}

#[test]
fn test_settings_validation_invalid_endpoint() {
    let _guard = setup_test_env();
    env::set_var("MODEL_ENDPOINT", "my-resource.openai.azure.com");

    let error = Settings::new().unwrap_err();
    assert!(error.to_string().contains("Invalid endpoint URL format"));

    cleanup_test_env();
}

#[test]
fn test_settings_validation_whitespace_key() {
    let _guard = setup_test_env();
    env::set_var("MODEL_API_KEY", "test key");

    let error = Settings::new().unwrap_err();
    assert!(error.to_string().contains("whitespace"));

    cleanup_test_env();
}

#[test]
fn test_settings_validation_zero_timeout() {
    let _guard = setup_test_env();
    env::set_var("REQUEST_TIMEOUT", "0");

    let error = Settings::new().unwrap_err();
    assert!(error.to_string().contains("Timeout values cannot be 0"));

    cleanup_test_env();
}

#[test]
fn test_settings_validation_bad_generation_defaults() {
    let _guard = setup_test_env();
    env::set_var("DEFAULT_MAX_TOKENS", "0");

    let error = Settings::new().unwrap_err();
    assert!(error.to_string().contains("Invalid generation defaults"));

    cleanup_test_env();
}

#[test]
fn test_settings_validation_unknown_flavor() {
    let _guard = setup_test_env();
    env::set_var("MODEL_API_FLAVOR", "vertex");

    let error = Settings::new().unwrap_err();
    assert!(error.to_string().contains("Invalid API flavor"));

    cleanup_test_env();
}

#[test]
fn test_settings_validation_invalid_log_level() {
    let _guard = setup_test_env();
    env::set_var("RUST_LOG", "verbose");

    let error = Settings::new().unwrap_err();
    assert!(error.to_string().contains("Invalid log level"));

    cleanup_test_env();
}
