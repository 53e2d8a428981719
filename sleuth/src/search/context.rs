use crate::models::SearchResult;

/// Renders search results as numbered source blocks for the analysis prompt.
pub fn build_context(results: &[SearchResult]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(index, result)| {
            format!(
                "[Source {}] {}\nURL: {}\nContent: {}\n",
                index + 1,
                result.title,
                result.url,
                result.snippet
            )
        })
        .collect::<Vec<_>>()
        .join("\n---\n")
}
