//! Synchronous document rewrite

use std::sync::Arc;

use crate::config::ComplianceConfig;
use crate::error::Result;
use crate::providers::{GenerationOptions, TextGenerator};

use super::prompt::PromptBuilder;

/// Rewrites text with the editor prompt
pub struct Rewriter {
    generator: Arc<dyn TextGenerator>,
    config: ComplianceConfig,
}

impl Rewriter {
    pub fn new(generator: Arc<dyn TextGenerator>, config: ComplianceConfig) -> Self {
        Self { generator, config }
    }

    /// Corrected copy of `text`; empty input yields an empty string without a backend call
    pub async fn rewrite_text(&self, text: &str) -> Result<String> {
        let options = GenerationOptions::new(
            self.config.model.clone(),
            self.config.rewrite_max_tokens,
            0.0,
        );
        self.rewrite_with(text, &options).await
    }

    /// Same as [`Rewriter::rewrite_text`] with caller-chosen model settings
    ///
    /// `text` is wrapped in the editor prompt and capped at `max_input_chars`.
    pub async fn rewrite_with(&self, text: &str, options: &GenerationOptions) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let prompt = PromptBuilder::rewrite_prompt(text, self.config.max_input_chars);
        tracing::info!("Rewriting {} chars with {}", text.chars().count(), self.generator.name());
        self.generator.generate_text(&prompt, options).await
    }
}
