use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client,
};
use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;
use crate::error::{Result, SleuthError};
use crate::models::RawSearchHit;
use crate::search::SearchProvider;

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    max_results: u32,
    search_depth: &'a str,
    include_answer: bool,
    include_raw_content: bool,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<RawSearchHit>,
}

/// Tavily-compatible web search client.
#[derive(Clone)]
pub struct TavilyProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    search_depth: String,
}

impl TavilyProvider {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        // No client timeout: EvidenceSearch bounds each attempt itself.
        let client = Client::builder()
            .build()
            .map_err(|e| SleuthError::Search(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            search_depth: config.search_depth.clone(),
        })
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(ref api_key) = self.api_key {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {api_key}"))
                    .map_err(|e| SleuthError::Search(format!("Invalid API key header: {e}")))?,
            );
        }

        Ok(headers)
    }
}

#[async_trait]
impl SearchProvider for TavilyProvider {
    fn name(&self) -> &str {
        "tavily"
    }

    async fn raw_search(&self, query: &str, max_results: u32) -> Result<Vec<RawSearchHit>> {
        let request = TavilyRequest {
            query,
            max_results,
            search_depth: &self.search_depth,
            include_answer: false,
            include_raw_content: false,
        };

        let url = format!("{}/search", self.base_url);
        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(&request)
            .send()
            .await
            .map_err(|e| SleuthError::Search(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SleuthError::Search(format!("API error {status}: {body}")));
        }

        let body: TavilyResponse = response
            .json()
            .await
            .map_err(|e| SleuthError::Search(format!("Failed to parse response: {e}")))?;

        tracing::debug!(query, hits = body.results.len(), "Tavily search returned");
        Ok(body.results)
    }
}
