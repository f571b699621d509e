//! Text extraction provider trait

use async_trait::async_trait;
use std::path::Path;

use crate::error::Result;

/// Trait for turning a stored document into plain text
///
/// Implementations:
/// - `FileTextExtractor`: PDF / DOCX parsing with OCR fallback
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Extract plain text; an empty string means nothing was extractable
    async fn extract_text(&self, location: &Path) -> Result<String>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
