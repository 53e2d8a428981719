use serde::Deserialize;
use std::env;
use std::time::Duration;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_env_opt(var: &str) -> Option<String> {
    env::var(var).ok().filter(|value| !value.trim().is_empty())
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub search: SearchConfig,
    pub cache: CacheConfig,
    pub retry: RetryConfig,
    pub llm: Option<LlmConfig>,
    pub analysis: AnalysisConfig,
    pub reports: ReportsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Bearer keys accepted on `/admin/*` routes.
    pub api_keys: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub auth_token: Option<String>,
    pub local_path: Option<String>,
}

/// Web search provider settings (Tavily-compatible API)
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
    pub default_max_results: u32,
    pub search_depth: String,
}

impl SearchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub ttl_secs: u64,
    /// Interval of the background expired-entry sweep. 0 disables the sweep.
    pub sweep_interval_secs: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

/// LLM configuration for the inference service
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    pub max_context_chars: usize,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub default_depth: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportsConfig {
    pub path: String,
    pub font_dir: String,
    pub font_family: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.tavily.com".to_string(),
            timeout_secs: 30,
            default_max_results: 10,
            search_depth: "advanced".to_string(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 3600,
            sweep_interval_secs: 300,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            max_delay_ms: 10_000,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_context_chars: 6000,
            temperature: 0.7,
            max_output_tokens: 2000,
            default_depth: 3,
        }
    }
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            path: "./reports".to_string(),
            font_dir: "/usr/share/fonts/truetype/liberation".to_string(),
            font_family: "LiberationSans".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let search_defaults = SearchConfig::default();
        let cache_defaults = CacheConfig::default();
        let retry_defaults = RetryConfig::default();
        let analysis_defaults = AnalysisConfig::default();
        let reports_defaults = ReportsConfig::default();

        Self {
            server: ServerConfig {
                host: env::var("SLEUTH_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("SLEUTH_PORT", 8000),
                api_keys: env::var("SLEUTH_API_KEYS")
                    .map(|keys| {
                        keys.split(',')
                            .map(|s| s.trim().to_string())
                            .filter(|s| !s.is_empty())
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or_else(|_| "file:sleuth.db".to_string()),
                auth_token: parse_env_opt("DATABASE_AUTH_TOKEN"),
                local_path: parse_env_opt("DATABASE_LOCAL_PATH"),
            },
            search: SearchConfig {
                api_key: parse_env_opt("TAVILY_API_KEY"),
                base_url: env::var("SEARCH_BASE_URL").unwrap_or(search_defaults.base_url),
                timeout_secs: parse_env_or("SEARCH_TIMEOUT_SECS", search_defaults.timeout_secs),
                default_max_results: parse_env_or(
                    "MAX_SEARCH_RESULTS",
                    search_defaults.default_max_results,
                ),
                search_depth: env::var("SEARCH_DEPTH").unwrap_or(search_defaults.search_depth),
            },
            cache: CacheConfig {
                ttl_secs: parse_env_or("SEARCH_CACHE_TTL_SECS", cache_defaults.ttl_secs),
                sweep_interval_secs: parse_env_or(
                    "SEARCH_CACHE_SWEEP_INTERVAL_SECS",
                    cache_defaults.sweep_interval_secs,
                ),
            },
            retry: RetryConfig {
                max_attempts: parse_env_or("RETRY_MAX_ATTEMPTS", retry_defaults.max_attempts),
                base_delay_ms: parse_env_or("RETRY_BASE_DELAY_MS", retry_defaults.base_delay_ms),
                max_delay_ms: parse_env_or("RETRY_MAX_DELAY_MS", retry_defaults.max_delay_ms),
            },
            llm: parse_env_opt("LLM_MODEL").map(|model| LlmConfig {
                model,
                api_key: parse_env_opt("LLM_API_KEY"),
                base_url: parse_env_opt("LLM_BASE_URL"),
                timeout_secs: parse_env_or("LLM_TIMEOUT", 60),
            }),
            analysis: AnalysisConfig {
                max_context_chars: parse_env_or(
                    "ANALYSIS_MAX_CONTEXT_CHARS",
                    analysis_defaults.max_context_chars,
                ),
                temperature: parse_env_or("ANALYSIS_TEMPERATURE", analysis_defaults.temperature),
                max_output_tokens: parse_env_or(
                    "ANALYSIS_MAX_TOKENS",
                    analysis_defaults.max_output_tokens,
                ),
                default_depth: parse_env_or("DEFAULT_RESEARCH_DEPTH", analysis_defaults.default_depth),
            },
            reports: ReportsConfig {
                path: env::var("REPORTS_PATH").unwrap_or(reports_defaults.path),
                font_dir: env::var("REPORT_FONT_DIR").unwrap_or(reports_defaults.font_dir),
                font_family: env::var("REPORT_FONT_FAMILY").unwrap_or(reports_defaults.font_family),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

/// Known LLM providers that use OpenAI-compatible APIs
pub const KNOWN_LLM_PROVIDERS: &[&str] = &["openai", "openrouter", "ollama", "lmstudio", "gemini"];

/// Parse an LLM model name into (provider, model) tuple.
pub fn parse_llm_provider_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        let prefix_lower = prefix.to_lowercase();
        if KNOWN_LLM_PROVIDERS.contains(&prefix_lower.as_str()) {
            return (prefix, rest);
        }
    }
    // Default to treating the whole string as a local model
    ("local", model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_retry_config_defaults() {
        std::env::remove_var("RETRY_MAX_ATTEMPTS");
        std::env::remove_var("RETRY_BASE_DELAY_MS");
        std::env::remove_var("RETRY_MAX_DELAY_MS");

        let config = Config::default();
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.base_delay_ms, 1000);
        assert_eq!(config.retry.max_delay_ms, 10_000);
    }

    #[test]
    #[serial]
    fn test_cache_ttl_defaults_to_one_hour() {
        std::env::remove_var("SEARCH_CACHE_TTL_SECS");
        let config = Config::default();
        assert_eq!(config.cache.ttl(), Duration::from_secs(3600));
    }

    #[test]
    #[serial]
    fn test_cache_ttl_from_env() {
        std::env::set_var("SEARCH_CACHE_TTL_SECS", "120");
        let config = Config::default();
        assert_eq!(config.cache.ttl_secs, 120);
        std::env::remove_var("SEARCH_CACHE_TTL_SECS");
    }

    #[test]
    #[serial]
    fn test_invalid_value_falls_back_to_default() {
        std::env::set_var("SEARCH_TIMEOUT_SECS", "soon");
        let config = Config::default();
        assert_eq!(config.search.timeout_secs, 30);
        std::env::remove_var("SEARCH_TIMEOUT_SECS");
    }

    #[test]
    #[serial]
    fn test_llm_config_absent_without_model() {
        std::env::remove_var("LLM_MODEL");
        let config = Config::default();
        assert!(config.llm.is_none());

        std::env::set_var("LLM_MODEL", "openai/gpt-4o-mini");
        let config = Config::default();
        let llm = config.llm.expect("llm config");
        assert_eq!(llm.model, "openai/gpt-4o-mini");
        assert_eq!(llm.timeout_secs, 60);
        std::env::remove_var("LLM_MODEL");
    }

    #[test]
    #[serial]
    fn test_api_keys_split_and_trimmed() {
        std::env::set_var("SLEUTH_API_KEYS", " alpha, beta ,,");
        let config = Config::default();
        assert_eq!(config.server.api_keys, vec!["alpha", "beta"]);
        std::env::remove_var("SLEUTH_API_KEYS");
    }

    #[test]
    fn test_analysis_defaults_match_reference_limits() {
        let defaults = AnalysisConfig::default();
        assert_eq!(defaults.max_context_chars, 6000);
        assert_eq!(defaults.max_output_tokens, 2000);
        assert_eq!(defaults.default_depth, 3);
    }

    #[test]
    fn test_parse_llm_provider_model() {
        assert_eq!(parse_llm_provider_model("openai/gpt-4o"), ("openai", "gpt-4o"));
        assert_eq!(
            parse_llm_provider_model("openrouter/google/gemini-2.5-flash"),
            ("openrouter", "google/gemini-2.5-flash")
        );
        assert_eq!(parse_llm_provider_model("llama3"), ("local", "llama3"));
    }
}
