//! PDF and DOCX text extraction

use async_trait::async_trait;
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::providers::TextExtractor;
use crate::types::FileType;

use super::ocr::OcrEngine;

/// Characters PDF fonts commonly emit that read better as ASCII
const PDF_REPLACEMENTS: &[(char, &str)] = &[
    ('\u{2010}', "-"),
    ('\u{2011}', "-"),
    ('\u{2013}', "-"),
    ('\u{2014}', "--"),
    ('\u{2018}', "'"),
    ('\u{2019}', "'"),
    ('\u{201C}', "\""),
    ('\u{201D}', "\""),
    ('\u{2022}', "* "),
    ('\u{2026}', "..."),
    ('\u{00A0}', " "),
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
    ('\0', ""),
];

/// Normalize PDF text: ASCII punctuation, no blank lines, trimmed lines
fn cleanup_pdf_text(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match PDF_REPLACEMENTS.iter().find(|(from, _)| *from == c) {
            Some((_, to)) => result.push_str(to),
            None => result.push(c),
        }
    }

    result
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Text extractor for files on local disk
pub struct FileTextExtractor {
    /// Upper bound for a single pdf-extract run
    pdf_timeout: Duration,
    /// OCR fallback for PDFs without a text layer
    ocr: OcrEngine,
}

impl Default for FileTextExtractor {
    fn default() -> Self {
        Self::new(Duration::from_secs(60), OcrEngine::default())
    }
}

impl FileTextExtractor {
    pub fn new(pdf_timeout: Duration, ocr: OcrEngine) -> Self {
        Self { pdf_timeout, ocr }
    }

    /// Extract text from PDF bytes without OCR
    pub fn extract_pdf(data: &[u8], timeout: Duration) -> Result<String> {
        let data_vec = data.to_vec();
        let (tx, rx) = mpsc::channel();

        // pdf-extract can spin on some fonts; run it on its own thread
        let handle = thread::spawn(move || {
            let result = pdf_extract::extract_text_from_mem(&data_vec);
            let _ = tx.send(result);
        });

        let text = match rx.recv_timeout(timeout) {
            Ok(Ok(text)) => {
                let _ = handle.join();
                text
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                tracing::warn!("pdf-extract failed: {}, trying lopdf", e);
                Self::extract_pdf_lopdf(data)?
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                tracing::error!("pdf-extract timed out after {:?}, trying lopdf", timeout);
                Self::extract_pdf_lopdf(data)?
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                tracing::error!("pdf-extract thread panicked, trying lopdf");
                Self::extract_pdf_lopdf(data)?
            }
        };

        Ok(cleanup_pdf_text(&text))
    }

    /// Fallback extraction straight from the content streams
    fn extract_pdf_lopdf(data: &[u8]) -> Result<String> {
        let doc = lopdf::Document::load_mem(data)
            .map_err(|e| Error::file_parse("document.pdf", format!("Failed to load PDF: {}", e)))?;
        let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
        doc.extract_text(&pages)
            .map_err(|e| Error::file_parse("document.pdf", format!("Failed to extract text: {}", e)))
    }

    /// Extract non-empty paragraph text from DOCX bytes, one paragraph per line
    pub fn extract_docx(data: &[u8]) -> Result<String> {
        let doc = docx_rs::read_docx(data)
            .map_err(|e| Error::file_parse("document.docx", e.to_string()))?;

        let mut paragraphs = Vec::new();
        for child in doc.document.children {
            if let docx_rs::DocumentChild::Paragraph(p) = child {
                let mut text = String::new();
                for child in p.children {
                    if let docx_rs::ParagraphChild::Run(run) = child {
                        for child in run.children {
                            if let docx_rs::RunChild::Text(t) = child {
                                text.push_str(&t.text);
                            }
                        }
                    }
                }
                if !text.is_empty() {
                    paragraphs.push(text);
                }
            }
        }

        Ok(paragraphs.join("\n"))
    }

    fn extract_blocking(
        file_type: FileType,
        data: &[u8],
        timeout: Duration,
        ocr: &OcrEngine,
        filename: &str,
    ) -> Result<String> {
        match file_type {
            FileType::Pdf => {
                let text = Self::extract_pdf(data, timeout)?;
                if !text.trim().is_empty() {
                    return Ok(text);
                }
                tracing::info!("No text layer in {}, attempting OCR", filename);
                match ocr.ocr_pdf(data) {
                    Ok(text) => Ok(text),
                    Err(e) => {
                        tracing::warn!("OCR unavailable for {}: {}", filename, e);
                        Ok(String::new())
                    }
                }
            }
            FileType::Docx | FileType::Doc => Self::extract_docx(data),
            FileType::Unknown => Ok(String::new()),
        }
    }
}

#[async_trait]
impl TextExtractor for FileTextExtractor {
    async fn extract_text(&self, location: &Path) -> Result<String> {
        let file_type = FileType::from_path(location);
        if file_type == FileType::Unknown {
            return Ok(String::new());
        }

        let data = tokio::fs::read(location).await?;
        let filename = location
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        tracing::debug!("Extracting {} ({}, {} bytes)", filename, file_type.display_name(), data.len());

        let timeout = self.pdf_timeout;
        let ocr = self.ocr.clone();
        let text = tokio::task::spawn_blocking(move || {
            Self::extract_blocking(file_type, &data, timeout, &ocr, &filename).map_err(|e| match e {
                Error::FileParse { message, .. } => Error::file_parse(&filename, message),
                other => other,
            })
        })
        .await
        .map_err(|e| Error::Internal(format!("Task join error: {}", e)))??;

        Ok(text)
    }

    fn name(&self) -> &str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{Docx, Paragraph, Run};
    use std::io::Cursor;

    fn docx_bytes(lines: &[&str]) -> Vec<u8> {
        let mut docx = Docx::new();
        for line in lines {
            docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*line)));
        }
        let mut buf = Vec::new();
        docx.build().pack(Cursor::new(&mut buf)).unwrap();
        buf
    }

    #[test]
    fn test_cleanup_pdf_text() {
        let cleaned = cleanup_pdf_text("  \u{201C}Quoted\u{201D} \u{FB01}le  \n\n\0\n next\u{2026} ");
        assert_eq!(cleaned, "\"Quoted\" file\nnext...");
    }

    #[test]
    fn test_extract_docx_paragraphs() {
        let data = docx_bytes(&["This are wrong.", "", "Second paragraph."]);
        let text = FileTextExtractor::extract_docx(&data).unwrap();
        assert_eq!(text, "This are wrong.\nSecond paragraph.");
    }

    #[test]
    fn test_invalid_docx_is_parse_error() {
        let result = FileTextExtractor::extract_docx(b"not a zip archive");
        assert!(matches!(result, Err(Error::FileParse { .. })));
    }

    #[tokio::test]
    async fn test_extract_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("letter.docx");
        std::fs::write(&path, docx_bytes(&["This are wrong."])).unwrap();

        let extractor = FileTextExtractor::default();
        let text = extractor.extract_text(&path).await.unwrap();
        assert_eq!(text, "This are wrong.");
    }

    #[tokio::test]
    async fn test_unknown_extension_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "plain text").unwrap();

        let extractor = FileTextExtractor::default();
        assert_eq!(extractor.extract_text(&path).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_binary_doc_reports_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.doc");
        std::fs::write(&path, [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]).unwrap();

        let extractor = FileTextExtractor::default();
        let err = extractor.extract_text(&path).await.unwrap_err();
        assert!(matches!(err, Error::FileParse { filename, .. } if filename == "legacy.doc"));
    }
}
