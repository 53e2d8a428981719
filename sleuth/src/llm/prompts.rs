//! Prompt templates for research analysis
//!
//! Templates use plain `format!()` interpolation. The depth table is fixed:
//! five levels from a terse bullet overview to an exhaustive deep dive.

/// Depth applied when the requested one is outside `1..=5`.
pub const DEFAULT_DEPTH: u8 = 3;

/// Instruction profile for one analysis depth level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthProfile {
    pub level: u8,
    pub label: &'static str,
    pub instructions: &'static str,
    pub key_findings: &'static str,
    pub summary_length: &'static str,
}

const DEPTH_PROFILES: [DepthProfile; 5] = [
    DepthProfile {
        level: 1,
        label: "overview",
        instructions: "Give a terse bullet-point overview. Keep every point to one line and skip background material.",
        key_findings: "2-3",
        summary_length: "2-3 sentences",
    },
    DepthProfile {
        level: 2,
        label: "brief",
        instructions: "Write a brief summary of the main points with only the context needed to understand them.",
        key_findings: "3",
        summary_length: "one short paragraph",
    },
    DepthProfile {
        level: 3,
        label: "standard",
        instructions: "Provide a balanced analysis covering background, current state and implications.",
        key_findings: "3-5",
        summary_length: "2-3 paragraphs",
    },
    DepthProfile {
        level: 4,
        label: "in-depth",
        instructions: "Provide an in-depth analysis. Compare competing viewpoints, weigh the strength of the evidence and note open problems.",
        key_findings: "5-7",
        summary_length: "3-4 paragraphs",
    },
    DepthProfile {
        level: 5,
        label: "exhaustive",
        instructions: "Produce an exhaustive multi-section deep dive. Cover history, mechanisms, stakeholders, risks, controversies and future directions, citing sources by number.",
        key_findings: "7-10",
        summary_length: "4-5 paragraphs",
    },
];

/// Resolve a requested depth to its profile, falling back to level 3.
///
/// # Example
/// ```
/// use sleuth::llm::prompts::depth_profile;
///
/// assert_eq!(depth_profile(1).label, "overview");
/// assert_eq!(depth_profile(99), depth_profile(3));
/// ```
pub fn depth_profile(depth: u32) -> &'static DepthProfile {
    let index = match depth {
        1..=5 => depth as usize - 1,
        _ => DEFAULT_DEPTH as usize - 1,
    };
    &DEPTH_PROFILES[index]
}

/// Generate the system prompt for a research analysis at the given depth
///
/// The model is asked for a single JSON object with `summary`, `key_findings`,
/// `detailed_analysis` and `confidence_score`.
pub fn analysis_system_prompt(profile: &DepthProfile) -> String {
    format!(
        r#"You are an expert research analyst. Your task is to:
1. Analyze the given topic using the provided web sources
2. Provide a summary ({summary_length})
3. Extract {key_findings} key findings, most important first
4. Structure information in a clear, academic manner

Depth level {level} ({label}): {instructions}

Format your response as a JSON object with these fields:
- "summary": string
- "key_findings": array of strings
- "detailed_analysis": object mapping section titles to section text
- "confidence_score": number from 0.0 to 1.0 reflecting how well the sources support the analysis

Respond with valid JSON only."#,
        summary_length = profile.summary_length,
        key_findings = profile.key_findings,
        level = profile.level,
        label = profile.label,
        instructions = profile.instructions,
    )
}

/// Generate the user prompt carrying the topic and evidence context
///
/// # Example
/// ```
/// use sleuth::llm::prompts::analysis_user_prompt;
///
/// let prompt = analysis_user_prompt("quantum computing", "[Source 1] Qubits");
/// assert!(prompt.contains("Research Topic: quantum computing"));
/// assert!(prompt.contains("[Source 1] Qubits"));
/// ```
pub fn analysis_user_prompt(topic: &str, context: &str) -> String {
    let mut prompt = format!("Research Topic: {topic}\n\n");
    if !context.trim().is_empty() {
        prompt.push_str(&format!("Context from web search:\n{context}\n\n"));
    }
    prompt.push_str("Provide a detailed analysis of this topic.");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_table_levels_in_order() {
        for depth in 1..=5u32 {
            assert_eq!(depth_profile(depth).level as u32, depth);
        }
    }

    #[test]
    fn test_out_of_range_depth_falls_back_to_standard() {
        assert_eq!(depth_profile(0), depth_profile(3));
        assert_eq!(depth_profile(6), depth_profile(3));
        assert_eq!(depth_profile(u32::MAX).label, "standard");
    }

    #[test]
    fn test_system_prompt_reflects_depth() {
        let terse = analysis_system_prompt(depth_profile(1));
        let exhaustive = analysis_system_prompt(depth_profile(5));

        assert!(terse.contains("bullet-point"));
        assert!(exhaustive.contains("multi-section deep dive"));
        assert!(terse.contains("\"key_findings\""));
        assert_ne!(terse, exhaustive);
    }

    #[test]
    fn test_user_prompt_omits_empty_context() {
        let prompt = analysis_user_prompt("rust", "  ");
        assert!(!prompt.contains("Context from web search"));
        assert!(prompt.ends_with("Provide a detailed analysis of this topic."));
    }
}
