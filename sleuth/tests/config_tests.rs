use axum::{http::StatusCode, response::IntoResponse};
use serial_test::serial;
use std::env;

use sleuth::config::{parse_llm_provider_model, Config, KNOWN_LLM_PROVIDERS};
use sleuth::error::SleuthError;

const SEARCH_VARS: &[&str] = &[
    "TAVILY_API_KEY",
    "SEARCH_BASE_URL",
    "SEARCH_TIMEOUT_SECS",
    "MAX_SEARCH_RESULTS",
    "SEARCH_DEPTH",
    "SEARCH_CACHE_TTL_SECS",
];

fn clear(vars: &[&str]) {
    for var in vars {
        env::remove_var(var);
    }
}

#[test]
fn test_llm_config_openrouter() {
    let (provider, model) = parse_llm_provider_model("openrouter/anthropic/claude-3.5-sonnet");
    assert_eq!(provider, "openrouter");
    assert_eq!(model, "anthropic/claude-3.5-sonnet");
}

#[test]
fn test_llm_config_unknown_prefix_defaults_to_local() {
    let (provider, model) = parse_llm_provider_model("unknown/model-name");
    assert_eq!(provider, "local");
    assert_eq!(model, "unknown/model-name");
}

#[test]
fn test_known_llm_providers_constant() {
    assert!(KNOWN_LLM_PROVIDERS.contains(&"openai"));
    assert!(KNOWN_LLM_PROVIDERS.contains(&"gemini"));
    assert_eq!(KNOWN_LLM_PROVIDERS.len(), 5);
}

#[test]
#[serial]
fn test_llm_config_none_when_no_env() {
    env::remove_var("LLM_MODEL");

    let config = Config::default();

    assert!(
        config.llm.is_none(),
        "LlmConfig should be None when LLM_MODEL is not set"
    );
}

#[test]
#[serial]
fn test_llm_config_with_all_env_vars() {
    env::set_var("LLM_MODEL", "openrouter/anthropic/claude-3.5-sonnet");
    env::set_var("LLM_API_KEY", "sk-test-key");
    env::set_var("LLM_BASE_URL", "https://api.custom.com/v1");
    env::set_var("LLM_TIMEOUT", "90");

    let config = Config::default();

    let llm = config.llm.expect("LlmConfig should exist");
    assert_eq!(llm.model, "openrouter/anthropic/claude-3.5-sonnet");
    assert_eq!(llm.api_key, Some("sk-test-key".to_string()));
    assert_eq!(llm.base_url, Some("https://api.custom.com/v1".to_string()));
    assert_eq!(llm.timeout_secs, 90);

    clear(&["LLM_MODEL", "LLM_API_KEY", "LLM_BASE_URL", "LLM_TIMEOUT"]);
}

#[test]
#[serial]
fn test_search_defaults() {
    clear(SEARCH_VARS);

    let config = Config::default();

    assert!(config.search.api_key.is_none());
    assert_eq!(config.search.base_url, "https://api.tavily.com");
    assert_eq!(config.search.default_max_results, 10);
    assert_eq!(config.search.search_depth, "advanced");
    assert_eq!(config.cache.ttl_secs, 3600);
}

#[test]
#[serial]
fn test_search_env_overrides() {
    env::set_var("TAVILY_API_KEY", "tvly-123");
    env::set_var("SEARCH_BASE_URL", "http://localhost:9999");
    env::set_var("MAX_SEARCH_RESULTS", "7");
    env::set_var("SEARCH_DEPTH", "basic");
    env::set_var("SEARCH_CACHE_TTL_SECS", "60");

    let config = Config::default();

    assert_eq!(config.search.api_key.as_deref(), Some("tvly-123"));
    assert_eq!(config.search.base_url, "http://localhost:9999");
    assert_eq!(config.search.default_max_results, 7);
    assert_eq!(config.search.search_depth, "basic");
    assert_eq!(config.cache.ttl_secs, 60);

    clear(SEARCH_VARS);
}

#[test]
#[serial]
fn test_unparseable_numbers_fall_back_to_defaults() {
    env::set_var("MAX_SEARCH_RESULTS", "many");
    env::set_var("DEFAULT_RESEARCH_DEPTH", "deep");

    let config = Config::default();

    assert_eq!(config.search.default_max_results, 10);
    assert_eq!(config.analysis.default_depth, 3);

    clear(&["MAX_SEARCH_RESULTS", "DEFAULT_RESEARCH_DEPTH"]);
}

#[test]
#[serial]
fn test_api_keys_are_split_and_trimmed() {
    env::set_var("SLEUTH_API_KEYS", " key-one, ,key-two ");

    let config = Config::default();

    assert_eq!(config.server.api_keys, vec!["key-one", "key-two"]);

    env::remove_var("SLEUTH_API_KEYS");
}

#[test]
fn test_upstream_errors_map_to_bad_gateway() {
    let error = SleuthError::Llm("Test error".to_string());
    assert_eq!(error.into_response().status(), StatusCode::BAD_GATEWAY);

    let error = SleuthError::LlmRateLimit {
        retry_after: Some(60),
    };
    assert_eq!(error.into_response().status(), StatusCode::BAD_GATEWAY);

    let error = SleuthError::SearchUnavailable {
        attempts: 3,
        source: Box::new(SleuthError::Search("timeout".to_string())),
    };
    assert_eq!(error.into_response().status(), StatusCode::BAD_GATEWAY);
}

#[test]
fn test_llm_unavailable_maps_to_not_implemented() {
    let error = SleuthError::LlmUnavailable("no model configured".to_string());
    assert_eq!(error.into_response().status(), StatusCode::NOT_IMPLEMENTED);
}

#[test]
fn test_cancelled_maps_to_service_unavailable() {
    let error = SleuthError::Cancelled("search".to_string());
    assert_eq!(
        error.into_response().status(),
        StatusCode::SERVICE_UNAVAILABLE
    );
}

#[test]
fn test_persistence_failure_is_internal() {
    let error = SleuthError::PersistenceFailure {
        source: Box::new(SleuthError::Internal("disk full".to_string())),
    };
    assert_eq!(
        error.into_response().status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}
