use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    error::{ApiError, OpenAIError},
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs, CreateChatCompletionResponse, ResponseFormat,
    },
    Client,
};

use crate::{
    config::{parse_llm_provider_model, LlmConfig},
    error::{Result, SleuthError},
    llm::provider::GenerationOptions,
};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
const OLLAMA_BASE_URL: &str = "http://localhost:11434/v1";
const LMSTUDIO_BASE_URL: &str = "http://localhost:1234/v1";
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

#[derive(Debug, Clone)]
struct ApiConfig {
    base_url: String,
    api_key: Option<String>,
    model: String,
    timeout_secs: u64,
}

/// OpenAI-compatible chat completion client.
///
/// Each call is a single request. async-openai's built-in backoff is disabled
/// so the retry executor is the only place attempts are repeated.
#[derive(Clone)]
pub struct LlmApiClient {
    client: Client<OpenAIConfig>,
    config: ApiConfig,
}

impl LlmApiClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_config = ApiConfig::from_llm_config(config);

        let (provider, _) = parse_llm_provider_model(&config.model);
        let needs_api_key = !matches!(
            provider.to_lowercase().as_str(),
            "ollama" | "local" | "lmstudio"
        );

        if needs_api_key && api_config.api_key.is_none() {
            return Err(SleuthError::LlmUnavailable(
                "API key required for this provider".to_string(),
            ));
        }

        let openai_config = OpenAIConfig::new()
            .with_api_base(api_config.base_url.clone())
            .with_api_key(api_config.api_key.clone().unwrap_or_default());

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(api_config.timeout_secs))
            .build()
            .map_err(|error| {
                SleuthError::Llm(format!("Failed to create LLM HTTP client: {error}"))
            })?;

        let backoff = backoff::ExponentialBackoff {
            max_elapsed_time: Some(Duration::ZERO),
            ..Default::default()
        };

        let client = Client::with_config(openai_config)
            .with_http_client(http_client)
            .with_backoff(backoff);

        Ok(Self {
            client,
            config: api_config,
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
        if prompt.trim().is_empty() {
            return Err(SleuthError::Validation("Prompt cannot be empty".to_string()));
        }

        let request = self.build_request(prompt, options)?;

        match self.client.chat().create(request).await {
            Ok(response) => {
                let content = Self::extract_content(response)?;
                tracing::debug!(
                    model = %self.config.model,
                    response_len = content.len(),
                    "LLM response received"
                );
                Ok(content)
            }
            Err(error) => {
                if let Some(rate_limit_error) = Self::rate_limit_error(&error) {
                    return Err(rate_limit_error);
                }
                if let Some(auth_error) = Self::auth_error(&error) {
                    return Err(auth_error);
                }
                Err(Self::map_openai_error(error))
            }
        }
    }

    fn build_request(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<CreateChatCompletionRequest> {
        let mut messages: Vec<ChatCompletionRequestMessage> = Vec::new();

        if let Some(system_prompt) = options
            .system_prompt
            .as_deref()
            .filter(|value| !value.trim().is_empty())
        {
            messages.push(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system_prompt)
                    .build()
                    .map_err(|error| {
                        SleuthError::Validation(format!("Invalid system prompt: {error}"))
                    })?
                    .into(),
            );
        }

        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|error| SleuthError::Validation(format!("Invalid user prompt: {error}")))?
                .into(),
        );

        let mut request = CreateChatCompletionRequestArgs::default();
        request.model(self.config.model.clone()).messages(messages);

        if let Some(temperature) = options.temperature {
            request.temperature(temperature);
        }
        if let Some(max_tokens) = options.max_output_tokens {
            request.max_tokens(max_tokens);
        }
        if options.json_response {
            request.response_format(ResponseFormat::JsonObject);
        }

        request.build().map_err(|error| {
            SleuthError::Validation(format!("Invalid LLM completion request: {error}"))
        })
    }

    fn extract_content(response: CreateChatCompletionResponse) -> Result<String> {
        let message = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| SleuthError::Llm("LLM response contained no choices".to_string()))?
            .message
            .content
            .unwrap_or_default();

        if message.trim().is_empty() {
            return Err(SleuthError::Llm(
                "LLM response contained empty content".to_string(),
            ));
        }

        Ok(message)
    }

    fn rate_limit_error(error: &OpenAIError) -> Option<SleuthError> {
        match error {
            OpenAIError::Reqwest(reqwest_error)
                if reqwest_error.status() == Some(reqwest::StatusCode::TOO_MANY_REQUESTS) =>
            {
                Some(SleuthError::LlmRateLimit { retry_after: None })
            }
            OpenAIError::ApiError(api_error) if Self::is_rate_limit_api_error(api_error) => {
                Some(SleuthError::LlmRateLimit { retry_after: None })
            }
            _ => None,
        }
    }

    fn auth_error(error: &OpenAIError) -> Option<SleuthError> {
        match error {
            OpenAIError::Reqwest(reqwest_error)
                if reqwest_error.status() == Some(reqwest::StatusCode::UNAUTHORIZED)
                    || reqwest_error.status() == Some(reqwest::StatusCode::FORBIDDEN) =>
            {
                Some(SleuthError::Llm(format!(
                    "LLM authentication failed: {reqwest_error}"
                )))
            }
            OpenAIError::ApiError(api_error) if Self::is_auth_api_error(api_error) => Some(
                SleuthError::Llm(format!("LLM authentication failed: {api_error}")),
            ),
            _ => None,
        }
    }

    fn is_rate_limit_api_error(api_error: &ApiError) -> bool {
        let message = api_error.message.to_lowercase();
        let error_type = api_error.r#type.clone().unwrap_or_default().to_lowercase();
        let code = api_error.code.clone().unwrap_or_default().to_lowercase();

        message.contains("rate limit")
            || message.contains("too many requests")
            || error_type.contains("rate_limit")
            || code.contains("rate_limit")
            || code == "insufficient_quota"
    }

    fn is_auth_api_error(api_error: &ApiError) -> bool {
        let message = api_error.message.to_lowercase();
        let error_type = api_error.r#type.clone().unwrap_or_default().to_lowercase();
        let code = api_error.code.clone().unwrap_or_default().to_lowercase();

        message.contains("unauthorized")
            || message.contains("invalid api key")
            || code.contains("invalid_api_key")
            || error_type.contains("authentication")
    }

    fn map_openai_error(error: OpenAIError) -> SleuthError {
        match error {
            OpenAIError::Reqwest(reqwest_error) => {
                SleuthError::Llm(format!("LLM request failed: {reqwest_error}"))
            }
            OpenAIError::ApiError(api_error) => {
                SleuthError::Llm(format!("LLM API error: {api_error}"))
            }
            OpenAIError::JSONDeserialize(err) => {
                SleuthError::Llm(format!("Failed to parse LLM response: {err}"))
            }
            OpenAIError::InvalidArgument(message) => SleuthError::Validation(message),
            other => SleuthError::Llm(other.to_string()),
        }
    }
}

impl ApiConfig {
    fn from_llm_config(config: &LlmConfig) -> Self {
        let (provider, model) = parse_llm_provider_model(&config.model);

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| default_base_url(provider).to_string());

        let normalized_model = if provider.eq_ignore_ascii_case("local") {
            config.model.clone()
        } else {
            model.to_string()
        };

        Self {
            base_url,
            api_key: config.api_key.clone(),
            model: normalized_model,
            timeout_secs: config.timeout_secs,
        }
    }
}

pub(crate) fn default_base_url(provider: &str) -> &'static str {
    match provider.to_lowercase().as_str() {
        "openrouter" => OPENROUTER_BASE_URL,
        "ollama" => OLLAMA_BASE_URL,
        "lmstudio" => LMSTUDIO_BASE_URL,
        "gemini" => GEMINI_BASE_URL,
        _ => OPENAI_BASE_URL,
    }
}
