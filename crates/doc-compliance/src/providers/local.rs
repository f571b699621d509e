//! Local filesystem document store
//!
//! Layout: `<upload_dir>/<doc_id>/<original file>` plus an optional derived
//! `fixed_<doc_id>.docx` next to it.

use async_trait::async_trait;
use docx_rs::{Docx, Paragraph, Run};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::StoredDocument;

use super::document_store::DocumentStore;

/// Prefix of derived document file names
pub const DERIVED_PREFIX: &str = "fixed_";

/// Local document store using one folder per document
pub struct LocalDocumentStore {
    /// Root directory holding document folders
    upload_dir: PathBuf,
}

impl LocalDocumentStore {
    /// Create a new local document store, creating the root directory if needed
    pub fn new(upload_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&upload_dir)?;
        Ok(Self { upload_dir })
    }

    /// Root directory
    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Folder for a document, or `None` for IDs that could escape the root
    fn doc_dir(&self, doc_id: &str) -> Option<PathBuf> {
        is_valid_doc_id(doc_id).then(|| self.upload_dir.join(doc_id))
    }

    /// File name of the derived document
    fn derived_name(doc_id: &str) -> String {
        format!("{}{}.docx", DERIVED_PREFIX, doc_id)
    }

    async fn stored(doc_id: &str, path: PathBuf) -> Result<StoredDocument> {
        let size = tokio::fs::metadata(&path).await?.len();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(StoredDocument {
            doc_id: doc_id.to_string(),
            filename,
            path,
            size,
        })
    }
}

/// Keep alphanumerics and `._-`, then strip trailing dots
pub fn sanitize_filename(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    kept.trim_end_matches('.').to_string()
}

/// Document IDs are single path components made of `[A-Za-z0-9_-]`, not starting with `_`
fn is_valid_doc_id(doc_id: &str) -> bool {
    !doc_id.is_empty()
        && !doc_id.starts_with('_')
        && doc_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Write text as a DOCX file with one paragraph per line
fn write_docx(path: &Path, text: &str) -> Result<()> {
    let mut docx = Docx::new();
    for line in text.lines() {
        docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(line)));
    }

    let file = std::fs::File::create(path)?;
    docx.build()
        .pack(file)
        .map_err(|e| Error::internal(format!("Failed to write {}: {}", path.display(), e)))?;
    Ok(())
}

#[async_trait]
impl DocumentStore for LocalDocumentStore {
    async fn store_upload(&self, filename: &str, data: &[u8]) -> Result<StoredDocument> {
        let safe = sanitize_filename(filename);
        if safe.is_empty() || safe.starts_with(DERIVED_PREFIX) {
            return Err(Error::InvalidRequest(format!("Invalid filename: {:?}", filename)));
        }

        let doc_id = Uuid::new_v4().to_string();
        let dir = self.upload_dir.join(&doc_id);
        tokio::fs::create_dir_all(&dir).await?;

        let path = dir.join(&safe);
        tokio::fs::write(&path, data).await?;

        tracing::info!("Stored upload {} as document {} ({} bytes)", safe, doc_id, data.len());
        Ok(StoredDocument {
            doc_id,
            filename: safe,
            path,
            size: data.len() as u64,
        })
    }

    async fn resolve_document(&self, doc_id: &str) -> Result<Option<StoredDocument>> {
        let Some(dir) = self.doc_dir(doc_id) else {
            return Ok(None);
        };
        if !tokio::fs::try_exists(&dir).await.unwrap_or(false) {
            return Ok(None);
        }

        let mut candidates = Vec::new();
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with(DERIVED_PREFIX) {
                continue;
            }
            candidates.push(entry.path());
        }
        candidates.sort();

        match candidates.into_iter().next() {
            Some(path) => Ok(Some(Self::stored(doc_id, path).await?)),
            None => Ok(None),
        }
    }

    async fn document_exists(&self, doc_id: &str) -> Result<bool> {
        Ok(self.resolve_document(doc_id).await?.is_some())
    }

    async fn save_derived_document(&self, doc_id: &str, text: &str) -> Result<StoredDocument> {
        let dir = self
            .doc_dir(doc_id)
            .ok_or_else(|| Error::DocumentNotFound(doc_id.to_string()))?;
        tokio::fs::create_dir_all(&dir).await?;

        let path = dir.join(Self::derived_name(doc_id));
        let target = path.clone();
        let text = text.to_string();
        tokio::task::spawn_blocking(move || write_docx(&target, &text))
            .await
            .map_err(|e| Error::Internal(format!("Task join error: {}", e)))??;

        tracing::info!("Saved derived document {}", path.display());
        Self::stored(doc_id, path).await
    }

    async fn resolve_derived_document(&self, doc_id: &str) -> Result<Option<StoredDocument>> {
        let Some(dir) = self.doc_dir(doc_id) else {
            return Ok(None);
        };
        let path = dir.join(Self::derived_name(doc_id));
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            Ok(Some(Self::stored(doc_id, path).await?))
        } else {
            Ok(None)
        }
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.upload_dir.exists())
    }

    fn name(&self) -> &str {
        "local-filesystem"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, LocalDocumentStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDocumentStore::new(dir.path().join("uploads")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("my report (final).docx"), "myreportfinal.docx");
        assert_eq!(sanitize_filename("../../etc/passwd"), "....etcpasswd");
        assert_eq!(sanitize_filename("draft.pdf..."), "draft.pdf");
        assert_eq!(sanitize_filename("***"), "");
    }

    #[test]
    fn test_doc_id_validation() {
        assert!(is_valid_doc_id("doc-1"));
        assert!(is_valid_doc_id("5b0c2a4e-8f1b-4d2e-9c3a-1f2e3d4c5b6a"));
        assert!(!is_valid_doc_id(""));
        assert!(!is_valid_doc_id("_jobs"));
        assert!(!is_valid_doc_id(".."));
        assert!(!is_valid_doc_id("a/b"));
    }

    #[tokio::test]
    async fn test_upload_and_resolve() {
        let (_dir, store) = store();
        let stored = store.store_upload("sample report.pdf", b"%PDF-1.4").await.unwrap();

        assert_eq!(stored.filename, "samplereport.pdf");
        assert_eq!(stored.size, 8);

        let resolved = store.resolve_document(&stored.doc_id).await.unwrap().unwrap();
        assert_eq!(resolved.path, stored.path);
        assert!(store.document_exists(&stored.doc_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_rejects_empty_filename() {
        let (_dir, store) = store();
        let result = store.store_upload("???", b"data").await;
        assert!(matches!(result, Err(Error::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_unknown_and_reserved_ids_do_not_resolve() {
        let (_dir, store) = store();
        tokio::fs::create_dir_all(store.upload_dir().join("_jobs")).await.unwrap();
        tokio::fs::write(store.upload_dir().join("_jobs").join("x.json"), "{}").await.unwrap();

        assert!(store.resolve_document("missing-doc").await.unwrap().is_none());
        assert!(store.resolve_document("_jobs").await.unwrap().is_none());
        assert!(store.resolve_document("../uploads").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_derived_document_is_not_the_original() {
        let (_dir, store) = store();
        let stored = store.store_upload("a.docx", b"original").await.unwrap();

        let fixed = store
            .save_derived_document(&stored.doc_id, "This is right.\nSecond line.")
            .await
            .unwrap();
        assert_eq!(fixed.filename, format!("fixed_{}.docx", stored.doc_id));

        let original = store.resolve_document(&stored.doc_id).await.unwrap().unwrap();
        assert_eq!(original.filename, "a.docx");

        let derived = store.resolve_derived_document(&stored.doc_id).await.unwrap().unwrap();
        assert_eq!(derived.path, fixed.path);
        assert!(derived.size > 0);
    }

    #[tokio::test]
    async fn test_derived_document_overwrites() {
        let (_dir, store) = store();
        let stored = store.store_upload("a.docx", b"original").await.unwrap();

        store.save_derived_document(&stored.doc_id, "first").await.unwrap();
        let second = store.save_derived_document(&stored.doc_id, "second").await.unwrap();

        let mut entries = std::fs::read_dir(second.path.parent().unwrap()).unwrap();
        let count = entries.by_ref().count();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_missing_derived_document() {
        let (_dir, store) = store();
        let stored = store.store_upload("a.pdf", b"%PDF").await.unwrap();
        assert!(store.resolve_derived_document(&stored.doc_id).await.unwrap().is_none());
    }
}
