//! Compliance report types

use serde::{Deserialize, Serialize};

/// How serious an issue is
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
}

/// A single grammar or style finding
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComplianceIssue {
    pub category: String,
    pub severity: Severity,
    /// Sentence the issue was found in
    pub sentence: Option<String>,
    pub message: String,
    pub suggestion: Option<String>,
    /// Character offset where the flagged span starts
    pub offset_start: Option<usize>,
    /// Character offset one past the flagged span
    pub offset_end: Option<usize>,
}

/// Result of analyzing a document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComplianceReport {
    pub doc_id: Option<String>,
    pub filename: Option<String>,
    pub summary: String,
    pub issues: Vec<ComplianceIssue>,
}
