//! Agent job orchestrator
//!
//! Each job runs extract -> plan -> rewrite -> persist exactly once on its own
//! tokio task. Both model calls go through the [`Rewriter`], so prompts carry
//! the editor instruction and are capped in length. The job record is
//! persisted after every log entry, and the terminal state is flushed once at
//! the end whatever happened before.

use std::sync::Arc;
use uuid::Uuid;

use crate::config::AgentConfig;
use crate::error::{Error, Result};
use crate::generation::prompt::{truncate_chars, PromptBuilder};
use crate::generation::Rewriter;
use crate::providers::{DocumentStore, GenerationOptions, TextExtractor};
use crate::types::{Job, JobStatus};

use super::job_store::JobStore;

/// Runs agent jobs in the background and exposes their records
#[derive(Clone)]
pub struct AgentOrchestrator {
    inner: Arc<OrchestratorInner>,
}

struct OrchestratorInner {
    store: JobStore,
    documents: Arc<dyn DocumentStore>,
    extractor: Arc<dyn TextExtractor>,
    rewriter: Arc<Rewriter>,
    config: AgentConfig,
}

impl AgentOrchestrator {
    pub fn new(
        store: JobStore,
        documents: Arc<dyn DocumentStore>,
        extractor: Arc<dyn TextExtractor>,
        rewriter: Arc<Rewriter>,
        config: AgentConfig,
    ) -> Self {
        Self {
            inner: Arc::new(OrchestratorInner {
                store,
                documents,
                extractor,
                rewriter,
                config,
            }),
        }
    }

    /// Persist a queued job and start its pipeline
    ///
    /// Returns as soon as the queued record is written; the pipeline may not
    /// have started yet. Callers check that `doc_id` exists beforehand.
    pub async fn create_job(&self, doc_id: &str, goal: &str) -> Result<Uuid> {
        let job = Job::new(doc_id, goal);
        let job_id = job.id;
        self.inner.store.put(&job).await?;

        tracing::info!("Created job {} for document {}", job_id, doc_id);

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            inner.run_job(job).await;
        });

        Ok(job_id)
    }

    /// Current record for a job
    pub async fn get_job(&self, job_id: Uuid) -> Result<Option<Job>> {
        self.inner.store.get(job_id).await
    }

    /// All job records
    pub async fn list_jobs(&self) -> Result<Vec<Job>> {
        self.inner.store.list().await
    }
}

impl OrchestratorInner {
    /// Runs on the in-memory record handed over by `create_job`, so a record
    /// that became unreadable on disk is rewritten by the next persist.
    async fn run_job(&self, mut job: Job) {
        let job_id = job.id;

        if let Err(e) = job.transition(JobStatus::Running) {
            tracing::warn!("Not running job {}: {}", job_id, e);
            return;
        }

        let result = match self.append_log(&mut job, "Job started").await {
            Ok(()) => self.execute(&mut job).await,
            Err(e) => Err(e),
        };

        let (next, msg) = match result {
            Ok(output) => {
                job.output = Some(output);
                (JobStatus::Completed, "Job completed successfully".to_string())
            }
            Err(e) => {
                tracing::error!("Job {} failed: {}", job_id, e);
                (JobStatus::Failed, format!("Error: {}", e))
            }
        };

        if let Err(e) = job.transition(next) {
            tracing::error!("Job {}: {}", job_id, e);
        }
        job.push_log(msg);
        tracing::info!(job_id = %job_id, "{}", job.last_message().unwrap_or_default());

        if let Err(e) = self.store.put(&job).await {
            tracing::error!("Failed to persist final state of job {}: {}", job_id, e);
        } else {
            tracing::info!("Job {} finished with status {}", job_id, job.status.as_str());
        }
    }

    /// Pipeline body; returns the derived document's file name
    async fn execute(&self, job: &mut Job) -> Result<String> {
        self.append_log(job, "Extracting text from document").await?;
        let document = self
            .documents
            .resolve_document(&job.doc_id)
            .await?
            .ok_or_else(|| Error::DocumentNotFound(job.doc_id.clone()))?;
        let text = self.extractor.extract_text(&document.path).await?;

        self.append_log(job, "Requesting plan from model").await?;
        let planner_prompt =
            PromptBuilder::planner_prompt(&job.goal, &text, self.config.excerpt_chars);
        let planner_options = GenerationOptions::new(
            self.config.planner_model.clone(),
            self.config.max_tokens,
            self.config.temperature,
        );
        let plan = self
            .rewriter
            .rewrite_with(&planner_prompt, &planner_options)
            .await?;
        let preview = truncate_chars(&plan, self.config.plan_preview_chars);
        self.append_log(job, format!("Planner output: {}", preview)).await?;

        self.append_log(job, "Applying corrections based on goal").await?;
        let correction_prompt = PromptBuilder::correction_prompt(&job.goal, &text);
        let rewrite_options = GenerationOptions::new(
            self.config.rewrite_model.clone(),
            self.config.max_tokens,
            self.config.temperature,
        );
        let corrected = self
            .rewriter
            .rewrite_with(&correction_prompt, &rewrite_options)
            .await?;

        let saved = self
            .documents
            .save_derived_document(&job.doc_id, &corrected)
            .await?;
        self.append_log(job, format!("Fixed document saved: {}", saved.filename))
            .await?;

        Ok(saved.filename)
    }

    async fn append_log(&self, job: &mut Job, msg: impl Into<String>) -> Result<()> {
        job.push_log(msg);
        tracing::info!(job_id = %job.id, "{}", job.last_message().unwrap_or_default());
        self.store.put(job).await
    }
}
