//! Core data types

pub mod document;
pub mod job;
pub mod report;

pub use document::{FileType, StoredDocument};
pub use job::{Job, JobStatus, LogEntry};
pub use report::{ComplianceIssue, ComplianceReport, Severity};
