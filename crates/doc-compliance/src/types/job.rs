//! Agent job records
//!
//! A job moves `queued -> running -> {completed | failed}` and never leaves a
//! terminal state. Its log is append-only with non-decreasing timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Job status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    /// Completed or failed
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether the state machine allows moving from `self` to `next`
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (Self::Queued, Self::Running)
                | (Self::Running, Self::Completed)
                | (Self::Running, Self::Failed)
        )
    }

    /// Lowercase name as stored on disk
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// One entry in a job's log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogEntry {
    pub ts: DateTime<Utc>,
    pub msg: String,
}

/// An agent job
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Job {
    pub id: Uuid,
    pub doc_id: String,
    pub goal: String,
    pub status: JobStatus,
    #[serde(default)]
    pub logs: Vec<LogEntry>,
    /// File name of the derived document once the pipeline saved it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Records written without this field sort first
    #[serde(default = "unknown_creation_time")]
    pub created_at: DateTime<Utc>,
}

fn unknown_creation_time() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

impl Job {
    /// New queued job with an empty log
    pub fn new(doc_id: impl Into<String>, goal: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            doc_id: doc_id.into(),
            goal: goal.into(),
            status: JobStatus::Queued,
            logs: Vec::new(),
            output: None,
            created_at: Utc::now(),
        }
    }

    /// Move to `next`, rejecting anything the state machine does not allow
    pub fn transition(&mut self, next: JobStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(Error::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// Append a log entry and return it
    pub fn push_log(&mut self, msg: impl Into<String>) -> &LogEntry {
        let mut ts = Utc::now();
        if let Some(last) = self.logs.last() {
            // Wall clock may step backwards
            if ts < last.ts {
                ts = last.ts;
            }
        }
        self.logs.push(LogEntry { ts, msg: msg.into() });
        &self.logs[self.logs.len() - 1]
    }

    /// Message of the newest log entry
    pub fn last_message(&self) -> Option<&str> {
        self.logs.last().map(|e| e.msg.as_str())
    }
}
