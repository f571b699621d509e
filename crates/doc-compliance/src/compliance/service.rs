//! Compliance report assembly: rule issues plus an optional generated summary

use std::sync::Arc;

use crate::config::ComplianceConfig;
use crate::generation::PromptBuilder;
use crate::providers::{GenerationOptions, TextGenerator};
use crate::types::ComplianceReport;

use super::checker::GrammarChecker;

/// Summary used when no text could be extracted
pub const EMPTY_TEXT_SUMMARY: &str = "No extractable text";

/// Summary used when no text generator is configured
pub const RULES_ONLY_SUMMARY: &str = "Rule-based analysis completed.";

/// Builds compliance reports
pub struct ComplianceService {
    checker: GrammarChecker,
    generator: Arc<dyn TextGenerator>,
    config: ComplianceConfig,
}

impl ComplianceService {
    pub fn new(generator: Arc<dyn TextGenerator>, config: ComplianceConfig) -> Self {
        Self {
            checker: GrammarChecker::new(config.language.clone()),
            generator,
            config,
        }
    }

    /// Analyze extracted text
    ///
    /// A failing summary call never fails the report; the failure is reported in the summary.
    pub async fn analyze(
        &self,
        text: &str,
        doc_id: Option<&str>,
        filename: Option<&str>,
    ) -> ComplianceReport {
        let doc_id = doc_id.map(str::to_string);
        let filename = filename.map(str::to_string);

        if text.trim().is_empty() {
            return ComplianceReport {
                doc_id,
                filename,
                summary: EMPTY_TEXT_SUMMARY.to_string(),
                issues: Vec::new(),
            };
        }

        let issues = self.checker.check(text);
        tracing::info!("Rule checks found {} issues", issues.len());

        let summary = if self.generator.is_configured() {
            let prompt = PromptBuilder::summary_prompt(text, self.config.max_input_chars);
            let options = GenerationOptions::new(
                self.config.model.clone(),
                self.config.summary_max_tokens,
                0.0,
            );
            match self.generator.generate_text(&prompt, &options).await {
                Ok(summary) => summary.trim().to_string(),
                Err(e) => {
                    tracing::error!("Summary generation failed: {}", e);
                    format!("Rule-based analysis done. Summary generation failed: {}", e)
                }
            }
        } else {
            RULES_ONLY_SUMMARY.to_string()
        };

        ComplianceReport {
            doc_id,
            filename,
            summary,
            issues,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use async_trait::async_trait;

    struct FixedSummary {
        configured: bool,
        fail: bool,
    }

    #[async_trait]
    impl TextGenerator for FixedSummary {
        async fn generate_text(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
            assert!(prompt.starts_with("You are a writing compliance assistant."));
            assert_eq!(options.max_tokens, 500);
            if self.fail {
                Err(Error::LlmStatus { status: 503, body: "overloaded".into() })
            } else {
                Ok("  One agreement error.\n- Fix 'This are'.  ".to_string())
            }
        }

        fn is_configured(&self) -> bool {
            self.configured
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn service(configured: bool, fail: bool) -> ComplianceService {
        ComplianceService::new(
            Arc::new(FixedSummary { configured, fail }),
            ComplianceConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_empty_text() {
        let report = service(true, false).analyze("  \n ", Some("doc-1"), None).await;
        assert_eq!(report.summary, "No extractable text");
        assert!(report.issues.is_empty());
        assert_eq!(report.doc_id.as_deref(), Some("doc-1"));
    }

    #[tokio::test]
    async fn test_rules_only_summary() {
        let report = service(false, false).analyze("This are wrong.", None, None).await;
        assert_eq!(report.summary, RULES_ONLY_SUMMARY);
        assert_eq!(report.issues.len(), 1);
    }

    #[tokio::test]
    async fn test_generated_summary() {
        let report = service(true, false)
            .analyze("This are wrong.", Some("doc-1"), Some("a.docx"))
            .await;
        assert_eq!(report.summary, "One agreement error.\n- Fix 'This are'.");
        assert_eq!(report.filename.as_deref(), Some("a.docx"));
        assert_eq!(report.issues.len(), 1);
    }

    #[tokio::test]
    async fn test_summary_failure_keeps_issues() {
        let report = service(true, true).analyze("This are wrong.", None, None).await;
        assert!(report.summary.contains("Summary generation failed"));
        assert_eq!(report.issues.len(), 1);
    }
}
