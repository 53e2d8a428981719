use serde::{Deserialize, Serialize};

/// A normalized web search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub url: String,
    pub title: String,
    pub snippet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

/// Hit as returned by a search provider, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSearchHit {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "content")]
    pub snippet: String,
    #[serde(default)]
    pub score: Option<f32>,
}

impl RawSearchHit {
    /// Returns `None` for hits without a usable URL.
    pub fn normalize(self) -> Option<SearchResult> {
        let url = self.url.trim().to_string();
        if url.is_empty() {
            return None;
        }

        Some(SearchResult {
            url,
            title: self.title.trim().to_string(),
            snippet: self.snippet.trim().to_string(),
            score: self.score.filter(|score| score.is_finite()),
        })
    }
}
