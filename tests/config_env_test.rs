//! Config environment variable tests
//!
//! These tests verify that Config::from_env() reads and applies environment
//! variable overrides, and rejects provider selections without credentials.
//!
//! Tests use #[serial] to prevent race conditions with shared env vars.

use mcp_truthlens::config::{Config, LogFormat, ProviderConfig, StorageBackend};
use serial_test::serial;
use std::env;

const VARS: &[&str] = &[
    "ANALYSIS_PROVIDER",
    "LANGBASE_API_KEY",
    "LANGBASE_BASE_URL",
    "CHAT_API_KEY",
    "CHAT_BASE_URL",
    "CHAT_MODEL",
    "PIPE_COMBINED",
    "STORAGE_BACKEND",
    "DATABASE_PATH",
    "DATABASE_MAX_CONNECTIONS",
    "LOG_LEVEL",
    "LOG_FORMAT",
    "REQUEST_TIMEOUT_MS",
    "MAX_RETRIES",
    "TIER_TIMEOUT_MS",
    "RECONCILE_PROVIDER_CATEGORY",
    "RECENT_DEFAULT_LIMIT",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_defaults_without_credentials() {
    clear_env();

    let config = Config::from_env().unwrap();
    assert!(matches!(config.provider, ProviderConfig::None));
    assert_eq!(config.database.backend, StorageBackend::Sqlite);
    assert_eq!(config.database.path.to_str().unwrap(), "./data/truthlens.db");
    assert_eq!(config.logging.format, LogFormat::Pretty);
    assert_eq!(config.request.max_retries, 0);
    assert_eq!(config.analysis.tier_timeout_ms, 15000);
    assert!(!config.analysis.reconcile_provider_category);
    assert_eq!(config.analysis.recent_default_limit, 10);
    assert_eq!(config.pipes.combined, "truthlens-combined-v1");
}

#[test]
#[serial]
fn test_langbase_selected_by_key() {
    clear_env();
    env::set_var("LANGBASE_API_KEY", "lb-key");
    env::set_var("LANGBASE_BASE_URL", "https://custom.api.com");

    let config = Config::from_env().unwrap();
    match config.provider {
        ProviderConfig::Langbase(lb) => {
            assert_eq!(lb.api_key, "lb-key");
            assert_eq!(lb.base_url, "https://custom.api.com");
        }
        other => panic!("unexpected provider: {:?}", other),
    }

    clear_env();
}

#[test]
#[serial]
fn test_langbase_without_key_is_error() {
    clear_env();
    env::set_var("ANALYSIS_PROVIDER", "langbase");

    let err = Config::from_env().unwrap_err();
    assert!(err.to_string().contains("LANGBASE_API_KEY"));

    clear_env();
}

#[test]
#[serial]
fn test_chat_provider() {
    clear_env();
    env::set_var("ANALYSIS_PROVIDER", "chat");
    env::set_var("CHAT_API_KEY", "sk-test");
    env::set_var("CHAT_MODEL", "gpt-4o-mini");

    let config = Config::from_env().unwrap();
    match config.provider {
        ProviderConfig::Chat(chat) => {
            assert_eq!(chat.api_key, "sk-test");
            assert_eq!(chat.base_url, "https://api.deepseek.com");
            assert_eq!(chat.model, "gpt-4o-mini");
        }
        other => panic!("unexpected provider: {:?}", other),
    }

    clear_env();
}

#[test]
#[serial]
fn test_chat_without_key_is_error() {
    clear_env();
    env::set_var("ANALYSIS_PROVIDER", "chat");

    assert!(Config::from_env().is_err());

    clear_env();
}

#[test]
#[serial]
fn test_unknown_provider_is_error() {
    clear_env();
    env::set_var("ANALYSIS_PROVIDER", "oracle");

    let err = Config::from_env().unwrap_err();
    assert!(err.to_string().contains("oracle"));

    clear_env();
}

#[test]
#[serial]
fn test_explicit_none_ignores_key() {
    clear_env();
    env::set_var("ANALYSIS_PROVIDER", "none");
    env::set_var("LANGBASE_API_KEY", "lb-key");

    let config = Config::from_env().unwrap();
    assert!(matches!(config.provider, ProviderConfig::None));

    clear_env();
}

#[test]
#[serial]
fn test_storage_and_logging_overrides() {
    clear_env();
    env::set_var("STORAGE_BACKEND", "Memory");
    env::set_var("DATABASE_PATH", "/custom/path.db");
    env::set_var("DATABASE_MAX_CONNECTIONS", "10");
    env::set_var("LOG_FORMAT", "json");
    env::set_var("LOG_LEVEL", "debug");

    let config = Config::from_env().unwrap();
    assert_eq!(config.database.backend, StorageBackend::Memory);
    assert_eq!(config.database.path.to_str().unwrap(), "/custom/path.db");
    assert_eq!(config.database.max_connections, 10);
    assert_eq!(config.logging.format, LogFormat::Json);
    assert_eq!(config.logging.level, "debug");

    clear_env();
}

#[test]
#[serial]
fn test_analysis_overrides() {
    clear_env();
    env::set_var("TIER_TIMEOUT_MS", "2500");
    env::set_var("RECONCILE_PROVIDER_CATEGORY", "TRUE");
    env::set_var("RECENT_DEFAULT_LIMIT", "25");
    env::set_var("MAX_RETRIES", "2");
    env::set_var("PIPE_COMBINED", "my-combined");

    let config = Config::from_env().unwrap();
    assert_eq!(config.analysis.tier_timeout_ms, 2500);
    assert!(config.analysis.reconcile_provider_category);
    assert_eq!(config.analysis.recent_default_limit, 25);
    assert_eq!(config.request.max_retries, 2);
    assert_eq!(config.pipes.combined, "my-combined");

    clear_env();
}

#[test]
#[serial]
fn test_unparseable_numbers_fall_back_to_defaults() {
    clear_env();
    env::set_var("TIER_TIMEOUT_MS", "soon");
    env::set_var("REQUEST_TIMEOUT_MS", "-5");

    let config = Config::from_env().unwrap();
    assert_eq!(config.analysis.tier_timeout_ms, 15000);
    assert_eq!(config.request.timeout_ms, 30000);

    clear_env();
}
