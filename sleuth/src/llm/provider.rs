use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{parse_llm_provider_model, LlmConfig};
use crate::error::{Result, SleuthError};
use crate::llm::api::LlmApiClient;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmBackend {
    OpenAI,
    OpenRouter,
    Ollama,
    LmStudio,
    Gemini,
    OpenAICompatible { base_url: String },
    Unavailable { reason: String },
}

#[derive(Debug, Clone, Default)]
pub struct GenerationOptions {
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    /// Ask the model for a single JSON object.
    pub json_response: bool,
    pub system_prompt: Option<String>,
}

/// Text generation seam consumed by the analysis engine.
#[async_trait]
pub trait InferenceService: Send + Sync {
    fn model_id(&self) -> &str;

    /// One generation request. Implementations must not retry.
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String>;
}

#[derive(Clone)]
pub struct LlmProvider {
    backend: LlmBackend,
    model: String,
    client: Option<Arc<LlmApiClient>>,
}

impl LlmProvider {
    pub fn new(config: Option<&LlmConfig>) -> Self {
        let Some(config) = config else {
            return Self::unavailable("No LLM configuration provided");
        };

        let (provider, _model) = parse_llm_provider_model(&config.model);

        let backend = match provider.to_lowercase().as_str() {
            "openai" => LlmBackend::OpenAI,
            "openrouter" => LlmBackend::OpenRouter,
            "ollama" => LlmBackend::Ollama,
            "lmstudio" => LlmBackend::LmStudio,
            "gemini" => LlmBackend::Gemini,
            _ => {
                if let Some(base_url) = &config.base_url {
                    LlmBackend::OpenAICompatible {
                        base_url: base_url.clone(),
                    }
                } else {
                    LlmBackend::Unavailable {
                        reason: format!("Unknown provider in model: {}", config.model),
                    }
                }
            }
        };

        if let LlmBackend::Unavailable { reason } = &backend {
            return Self::unavailable(reason);
        }

        match LlmApiClient::new(config) {
            Ok(client) => Self {
                backend,
                model: client.model().to_string(),
                client: Some(Arc::new(client)),
            },
            Err(error) => {
                tracing::warn!(model = %config.model, error = %error, "LLM client unavailable");
                Self::unavailable(&error.to_string())
            }
        }
    }

    pub fn unavailable(reason: &str) -> Self {
        Self {
            backend: LlmBackend::Unavailable {
                reason: reason.to_string(),
            },
            model: "unavailable".to_string(),
            client: None,
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self.backend, LlmBackend::Unavailable { .. })
    }

    pub fn backend(&self) -> &LlmBackend {
        &self.backend
    }

    pub fn base_url(&self) -> Option<&str> {
        self.client.as_deref().map(LlmApiClient::base_url)
    }

    fn unavailable_reason(&self) -> String {
        match &self.backend {
            LlmBackend::Unavailable { reason } => reason.clone(),
            _ => "LLM client not initialized".to_string(),
        }
    }
}

#[async_trait]
impl InferenceService for LlmProvider {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
        let Some(client) = self.client.as_ref() else {
            return Err(SleuthError::LlmUnavailable(self.unavailable_reason()));
        };

        client.generate(prompt, options).await
    }
}
