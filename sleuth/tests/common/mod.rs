// Common test utilities for integration tests
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use sleuth::analysis::AnalysisEngine;
use sleuth::cache::FingerprintCache;
use sleuth::config::AnalysisConfig;
use sleuth::error::{Result, SleuthError};
use sleuth::history::{Database, HistoryStore, LibSqlHistoryStore};
use sleuth::llm::{GenerationOptions, InferenceService};
use sleuth::models::{RawSearchHit, ResearchRecord, ResearchSummary};
use sleuth::pipeline::ResearchPipeline;
use sleuth::retry::{RetryExecutor, RetryPolicy};
use sleuth::search::{EvidenceSearch, SearchProvider};

static INIT: Once = Once::new();

/// Initialize tracing subscriber once for tests
pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

/// Three attempts with millisecond backoff.
pub fn fast_executor() -> RetryExecutor {
    RetryExecutor::new(RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(4),
    })
}

pub fn hit(url: &str, title: &str, snippet: &str) -> RawSearchHit {
    RawSearchHit {
        url: url.to_string(),
        title: title.to_string(),
        snippet: snippet.to_string(),
        score: Some(0.8),
    }
}

/// Search provider returning fixed hits, or failing every call.
pub struct FakeSearch {
    hits: Vec<RawSearchHit>,
    fail: bool,
    pub calls: AtomicUsize,
}

impl FakeSearch {
    pub fn returning(hits: Vec<RawSearchHit>) -> Self {
        Self {
            hits,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            hits: Vec::new(),
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchProvider for FakeSearch {
    fn name(&self) -> &str {
        "fake"
    }

    async fn raw_search(&self, _query: &str, _max_results: u32) -> Result<Vec<RawSearchHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(SleuthError::Search("connection refused".to_string()));
        }
        Ok(self.hits.clone())
    }
}

/// Inference service replaying scripted replies; the last reply repeats.
pub struct FakeInference {
    replies: Mutex<VecDeque<Result<String>>>,
    last: Mutex<Option<String>>,
    pub calls: AtomicUsize,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeInference {
    pub fn replying(reply: &str) -> Self {
        Self::scripted(vec![Ok(reply.to_string())])
    }

    pub fn scripted(replies: Vec<Result<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            last: Mutex::new(None),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InferenceService for FakeInference {
    fn model_id(&self) -> &str {
        "fake-model"
    }

    async fn generate(&self, prompt: &str, _options: &GenerationOptions) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());

        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(Ok(reply)) => {
                *self.last.lock().unwrap() = Some(reply.clone());
                Ok(reply)
            }
            Some(Err(error)) => Err(error),
            None => match self.last.lock().unwrap().clone() {
                Some(reply) => Ok(reply),
                None => Err(SleuthError::Llm("service unavailable".to_string())),
            },
        }
    }
}

/// History store whose writes always fail.
pub struct BrokenHistory;

#[async_trait]
impl HistoryStore for BrokenHistory {
    async fn save(&self, _record: &ResearchRecord) -> Result<()> {
        Err(SleuthError::Internal("disk full".to_string()))
    }

    async fn get(&self, _id: &str) -> Result<Option<ResearchRecord>> {
        Ok(None)
    }

    async fn list(&self, _limit: u32) -> Result<Vec<ResearchSummary>> {
        Ok(Vec::new())
    }

    async fn similarity_search(&self, _query: &str, _limit: u32) -> Result<Vec<ResearchRecord>> {
        Ok(Vec::new())
    }

    async fn health(&self) -> Result<()> {
        Err(SleuthError::Internal("disk full".to_string()))
    }
}

pub fn analysis_json(summary: &str, confidence: f64) -> String {
    json!({
        "summary": summary,
        "key_findings": ["First finding", "Second finding"],
        "detailed_analysis": {
            "Background": "Some history",
            "Current State": "Where things are"
        },
        "confidence_score": confidence
    })
    .to_string()
}

pub async fn memory_history() -> Arc<LibSqlHistoryStore> {
    Arc::new(LibSqlHistoryStore::new(Database::in_memory().await.unwrap()))
}

pub struct Harness {
    pub pipeline: ResearchPipeline,
    pub search: Arc<FakeSearch>,
    pub inference: Arc<FakeInference>,
    pub cache: Arc<FingerprintCache>,
}

pub fn harness(
    search: FakeSearch,
    inference: FakeInference,
    history: Arc<dyn HistoryStore>,
) -> Harness {
    let search = Arc::new(search);
    let inference = Arc::new(inference);
    let cache = Arc::new(FingerprintCache::new(Duration::from_secs(3600)));

    let evidence = Arc::new(EvidenceSearch::new(
        search.clone(),
        cache.clone(),
        fast_executor(),
        Duration::from_secs(5),
    ));
    let analysis = Arc::new(AnalysisEngine::new(
        inference.clone(),
        fast_executor(),
        AnalysisConfig::default(),
    ));

    Harness {
        pipeline: ResearchPipeline::new(evidence, analysis, history),
        search,
        inference,
        cache,
    }
}

// Re-export commonly used crates for convenience
pub use serial_test::serial;
pub use tempfile;
pub use wiremock;
