use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::analysis::response::parse_analysis_response;
use crate::config::AnalysisConfig;
use crate::error::{Result, SleuthError};
use crate::llm::prompts::{analysis_system_prompt, analysis_user_prompt, depth_profile};
use crate::llm::{GenerationOptions, InferenceService};
use crate::models::{AnalysisMetadata, AnalysisResult};
use crate::retry::{RetryError, RetryExecutor};

pub const TRUNCATION_MARKER: &str = "\n\n[... context truncated ...]";

/// Cut `context` to `max_chars` Unicode scalar values and append the marker.
/// Returns the context to send and whether truncation happened.
pub fn truncate_context(context: &str, max_chars: usize) -> (String, bool) {
    match context.char_indices().nth(max_chars) {
        Some((byte_index, _)) => {
            let mut truncated = String::with_capacity(byte_index + TRUNCATION_MARKER.len());
            truncated.push_str(&context[..byte_index]);
            truncated.push_str(TRUNCATION_MARKER);
            (truncated, true)
        }
        None => (context.to_string(), false),
    }
}

pub struct AnalysisEngine {
    inference: Arc<dyn InferenceService>,
    executor: RetryExecutor,
    config: AnalysisConfig,
}

impl AnalysisEngine {
    pub fn new(
        inference: Arc<dyn InferenceService>,
        executor: RetryExecutor,
        config: AnalysisConfig,
    ) -> Self {
        Self {
            inference,
            executor,
            config,
        }
    }

    pub fn model_id(&self) -> &str {
        self.inference.model_id()
    }

    fn generation_options(&self, system_prompt: String) -> GenerationOptions {
        GenerationOptions {
            temperature: Some(self.config.temperature),
            max_output_tokens: Some(self.config.max_output_tokens),
            json_response: true,
            system_prompt: Some(system_prompt),
        }
    }

    pub async fn analyze(
        &self,
        topic: &str,
        evidence_context: &str,
        depth: u32,
        sources_used: usize,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult> {
        let profile = depth_profile(depth);
        if profile.level as u32 != depth {
            tracing::debug!(requested = depth, applied = profile.level, "Depth out of range");
        }

        let original_context_length = evidence_context.chars().count();
        let (context, context_truncated) =
            truncate_context(evidence_context, self.config.max_context_chars);
        if context_truncated {
            tracing::warn!(
                original_context_length,
                max_context_chars = self.config.max_context_chars,
                "Evidence context truncated"
            );
        }

        let prompt = analysis_user_prompt(topic, &context);
        let options = self.generation_options(analysis_system_prompt(profile));
        let inference = self.inference.as_ref();
        let (prompt, options) = (prompt.as_str(), &options);

        let raw = self
            .executor
            .execute("analysis", cancel, || async move {
                inference.generate(prompt, options).await
            })
            .await
            .map_err(|error| match error {
                RetryError::Exhausted { attempts, last } => SleuthError::AnalysisUnavailable {
                    attempts,
                    source: Box::new(last),
                },
                RetryError::Cancelled { .. } => SleuthError::Cancelled("analysis".to_string()),
            })?;

        let parsed = parse_analysis_response(&raw)?;

        tracing::info!(
            topic,
            depth = profile.level,
            findings = parsed.key_findings.len(),
            confidence = parsed.confidence_score,
            confidence_source = %parsed.confidence_source,
            "Analysis completed"
        );

        Ok(AnalysisResult {
            summary: parsed.summary,
            key_findings: parsed.key_findings,
            detailed_analysis: parsed.detailed_analysis,
            confidence_score: parsed.confidence_score,
            sources_used,
            metadata: AnalysisMetadata {
                model: self.inference.model_id().to_string(),
                generated_at: Utc::now(),
                context_length: context.chars().count(),
                original_context_length,
                context_truncated,
                depth: profile.level,
                confidence_source: parsed.confidence_source,
            },
        })
    }
}
