//! Prompt templates for rewrites, report summaries, and agent jobs

/// Prompt builder
pub struct PromptBuilder;

impl PromptBuilder {
    /// Editor prompt asking for a corrected copy of `text`
    pub fn rewrite_prompt(text: &str, max_chars: usize) -> String {
        format!(
            "You are an expert editor. Rewrite the given text to correct grammar, improve clarity, \
             and follow standard English writing rules while preserving meaning. Return ONLY the \
             corrected text (no commentary).\n\n{}",
            truncate_chars(text, max_chars)
        )
    }

    /// Prompt for the short report summary
    pub fn summary_prompt(text: &str, max_chars: usize) -> String {
        format!(
            "You are a writing compliance assistant. Provide a short (1-3 sentences) summary of \
             issues and a bullet list of up to 8 high-level suggestions for improving the document. \
             Return as plain text.\n\n{}",
            truncate_chars(text, max_chars)
        )
    }

    /// Planning prompt: goal plus the first `excerpt_chars` characters of the document
    pub fn planner_prompt(goal: &str, text: &str, excerpt_chars: usize) -> String {
        format!(
            "Goal: {}\nDocument excerpt:\n{}\nProvide an ordered plan (steps).",
            goal,
            truncate_chars(text, excerpt_chars)
        )
    }

    /// Correction prompt over the full document
    pub fn correction_prompt(goal: &str, text: &str) -> String {
        format!("Make the document comply with: {}\n\n{}", goal, text)
    }
}

/// First `max_chars` characters of `text`, never splitting a code point
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 2), "he");
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("", 5), "");
    }

    #[test]
    fn test_planner_prompt_bounds_excerpt() {
        let text = "#".repeat(5000);
        let prompt = PromptBuilder::planner_prompt("fix grammar", &text, 2000);
        assert_eq!(
            prompt,
            format!(
                "Goal: fix grammar\nDocument excerpt:\n{}\nProvide an ordered plan (steps).",
                "#".repeat(2000)
            )
        );
    }

    #[test]
    fn test_correction_prompt_keeps_full_text() {
        let text = "#".repeat(5000);
        let prompt = PromptBuilder::correction_prompt("fix grammar", &text);
        assert_eq!(prompt, format!("Make the document comply with: fix grammar\n\n{}", text));
    }

    #[test]
    fn test_rewrite_prompt_caps_input() {
        let text = "#".repeat(20);
        let prompt = PromptBuilder::rewrite_prompt(&text, 15);
        assert!(prompt.starts_with("You are an expert editor."));
        assert_eq!(prompt.matches('#').count(), 15);
    }
}
