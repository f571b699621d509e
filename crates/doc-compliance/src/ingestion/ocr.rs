//! OCR fallback for image-only PDFs using poppler's `pdftoppm` and `tesseract`

use std::path::Path;
use std::process::Command;

use crate::error::{Error, Result};

/// Rasterizes PDF pages and runs tesseract over each page image
#[derive(Debug, Clone)]
pub struct OcrEngine {
    /// Tesseract language code
    pub language: String,
    /// Rasterization resolution
    pub dpi: u32,
}

impl Default for OcrEngine {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            dpi: 150,
        }
    }
}

impl OcrEngine {
    /// Whether both external tools can be launched
    pub fn is_available() -> bool {
        let tesseract = Command::new("tesseract")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false);
        // pdftoppm -v exits non-zero on some poppler builds
        let pdftoppm = Command::new("pdftoppm").arg("-v").output().is_ok();
        tesseract && pdftoppm
    }

    /// OCR every page of a PDF, joining page texts with newlines
    pub fn ocr_pdf(&self, data: &[u8]) -> Result<String> {
        if !Self::is_available() {
            return Err(Error::Internal(
                "OCR requires pdftoppm and tesseract (poppler-utils, tesseract-ocr)".to_string(),
            ));
        }

        let work_dir =
            std::env::temp_dir().join(format!("doc-compliance-ocr-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&work_dir)?;

        let result = self.ocr_in(&work_dir, data);
        std::fs::remove_dir_all(&work_dir).ok();
        result
    }

    fn ocr_in(&self, work_dir: &Path, data: &[u8]) -> Result<String> {
        let pdf_path = work_dir.join("input.pdf");
        std::fs::write(&pdf_path, data)?;

        let output = Command::new("pdftoppm")
            .arg("-png")
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg(&pdf_path)
            .arg(work_dir.join("page"))
            .output()?;
        if !output.status.success() {
            return Err(Error::Internal(format!(
                "pdftoppm error: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        let mut pages: Vec<_> = std::fs::read_dir(work_dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "png"))
            .collect();
        pages.sort();

        let mut chunks = Vec::new();
        for (i, image) in pages.iter().enumerate() {
            let output = Command::new("tesseract")
                .arg(image)
                .arg("stdout")
                .arg("-l")
                .arg(&self.language)
                .output()?;
            if !output.status.success() {
                tracing::warn!("tesseract failed on page {}", i + 1);
                continue;
            }
            let text = String::from_utf8_lossy(&output.stdout);
            if !text.trim().is_empty() {
                chunks.push(text.into_owned());
            }
        }

        tracing::info!("OCR extracted text from {}/{} pages", chunks.len(), pages.len());
        Ok(chunks.join("\n"))
    }
}
