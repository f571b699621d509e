//! Application state for the document compliance server

use std::sync::Arc;

use crate::compliance::ComplianceService;
use crate::config::AppConfig;
use crate::error::Result;
use crate::generation::{MistralClient, Rewriter};
use crate::ingestion::FileTextExtractor;
use crate::processing::{AgentOrchestrator, JobStore};
use crate::providers::{
    DocumentStore, LocalDocumentStore, MistralGenerator, TextExtractor, TextGenerator,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: AppConfig,
    /// Uploaded and derived documents
    documents: Arc<dyn DocumentStore>,
    /// Text extraction
    extractor: Arc<dyn TextExtractor>,
    /// Report builder
    compliance: ComplianceService,
    /// Rewrites for `/fix` and agent jobs
    rewriter: Arc<Rewriter>,
    /// Background agent jobs
    orchestrator: AgentOrchestrator,
}

impl AppState {
    /// Create state with the local document store, file extractor, and Mistral client
    pub fn new(config: AppConfig) -> Result<Self> {
        tracing::info!("Initializing document compliance state...");

        let documents = Arc::new(LocalDocumentStore::new(config.storage.upload_dir.clone())?);
        tracing::info!("Document store at {}", config.storage.upload_dir.display());

        let client = Arc::new(MistralClient::new(&config.llm)?);
        if client.is_configured() {
            tracing::info!("Mistral client initialized ({})", config.llm.base_url);
        } else {
            tracing::warn!(
                "No Mistral API key configured: reports use rule checks only, fixes and agent jobs will fail"
            );
        }

        Self::with_providers(
            config,
            documents,
            Arc::new(FileTextExtractor::default()),
            Arc::new(MistralGenerator::new(client)),
        )
    }

    /// Create state around explicit collaborators
    pub fn with_providers(
        config: AppConfig,
        documents: Arc<dyn DocumentStore>,
        extractor: Arc<dyn TextExtractor>,
        generator: Arc<dyn TextGenerator>,
    ) -> Result<Self> {
        tracing::info!(
            "Providers: documents={}, extractor={}, generator={}",
            documents.name(),
            extractor.name(),
            generator.name()
        );
        let job_store = JobStore::new(config.storage.jobs_dir())?;
        tracing::info!("Job records at {}", job_store.dir().display());

        let compliance = ComplianceService::new(Arc::clone(&generator), config.compliance.clone());
        let rewriter = Arc::new(Rewriter::new(generator, config.compliance.clone()));
        let orchestrator = AgentOrchestrator::new(
            job_store,
            Arc::clone(&documents),
            Arc::clone(&extractor),
            Arc::clone(&rewriter),
            config.agent.clone(),
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                documents,
                extractor,
                compliance,
                rewriter,
                orchestrator,
            }),
        })
    }

    /// Get configuration
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get document store
    pub fn documents(&self) -> &Arc<dyn DocumentStore> {
        &self.inner.documents
    }

    /// Get text extractor
    pub fn extractor(&self) -> &Arc<dyn TextExtractor> {
        &self.inner.extractor
    }

    /// Get compliance service
    pub fn compliance(&self) -> &ComplianceService {
        &self.inner.compliance
    }

    /// Get rewriter
    pub fn rewriter(&self) -> &Rewriter {
        &self.inner.rewriter
    }

    /// Get agent orchestrator
    pub fn orchestrator(&self) -> &AgentOrchestrator {
        &self.inner.orchestrator
    }
}
