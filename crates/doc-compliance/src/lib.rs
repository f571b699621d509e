//! doc-compliance: document compliance service
//!
//! Uploaded PDF and DOCX files are turned into text, checked against grammar
//! and style rules, and rewritten by a Mistral model, either synchronously or
//! through background agent jobs whose records are polled from disk.

pub mod compliance;
pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod processing;
pub mod providers;
pub mod server;
pub mod types;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use processing::{AgentOrchestrator, JobStore};
pub use types::{ComplianceIssue, ComplianceReport, Job, JobStatus, LogEntry, StoredDocument};
