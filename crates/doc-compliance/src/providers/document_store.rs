//! Document store provider trait for uploaded and derived document files

use async_trait::async_trait;
use crate::error::Result;
use crate::types::StoredDocument;

/// Trait for document storage
///
/// Implementations:
/// - `LocalDocumentStore`: one folder per document on the local filesystem
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store a freshly uploaded file under a new document ID
    async fn store_upload(&self, filename: &str, data: &[u8]) -> Result<StoredDocument>;

    /// Locate the original uploaded file for a document
    async fn resolve_document(&self, doc_id: &str) -> Result<Option<StoredDocument>>;

    /// Check whether a document ID refers to an uploaded document
    async fn document_exists(&self, doc_id: &str) -> Result<bool>;

    /// Persist corrected text as the document's derived "fixed" file
    ///
    /// Overwrites any earlier derived file for the same document.
    async fn save_derived_document(&self, doc_id: &str, text: &str) -> Result<StoredDocument>;

    /// Locate the derived "fixed" file for a document
    async fn resolve_derived_document(&self, doc_id: &str) -> Result<Option<StoredDocument>>;

    /// Check if the provider is healthy
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
