use std::collections::HashSet;

/// Lowercased alphanumeric terms longer than one character, first occurrence order.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|term| term.chars().count() > 1)
        .map(str::to_lowercase)
        .filter(|term| seen.insert(term.clone()))
        .collect()
}

/// Lexical relevance of `document` to a tokenized query, in `[0, 1]`.
///
/// Mostly query coverage (share of query terms found in the document), with a
/// small overlap component so tighter documents rank above sprawling ones.
pub fn relevance_score(query_terms: &[String], document: &str) -> f64 {
    let doc_terms = tokenize(document);
    if query_terms.is_empty() || doc_terms.is_empty() {
        return 0.0;
    }

    let matched = query_terms
        .iter()
        .filter(|term| doc_terms.iter().any(|doc| fuzzy_word_match(term, doc)))
        .count();
    if matched == 0 {
        return 0.0;
    }

    let coverage = matched as f64 / query_terms.len() as f64;
    let overlap = matched as f64 / (query_terms.len() + doc_terms.len() - matched) as f64;

    0.8 * coverage + 0.2 * overlap
}

fn fuzzy_word_match(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    let min_len = a.len().min(b.len());
    if min_len < 3 {
        return false;
    }
    a.starts_with(b) || b.starts_with(a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_dedupes_and_lowercases() {
        assert_eq!(
            tokenize("Quantum computing: QUANTUM error-correction, a b"),
            vec!["quantum", "computing", "error", "correction"]
        );
    }

    #[test]
    fn test_relevance_identical_is_one() {
        let terms = tokenize("quantum computing");
        assert!((relevance_score(&terms, "quantum computing") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_relevance_none() {
        let terms = tokenize("quantum computing");
        assert_eq!(relevance_score(&terms, "medieval pottery glazes"), 0.0);
        assert_eq!(relevance_score(&[], "anything"), 0.0);
    }

    #[test]
    fn test_relevance_prefers_full_coverage() {
        let terms = tokenize("quantum computer");
        let full = relevance_score(&terms, "Quantum computers hardware");
        let partial = relevance_score(&terms, "Quantum mechanics history");
        assert!(full > partial, "{full} should exceed {partial}");
    }
}
