//! Stored document references and file type detection

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File types the service knows how to read
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// PDF document
    Pdf,
    /// Microsoft Word document (.docx)
    Docx,
    /// Old Microsoft Word document (.doc)
    Doc,
    /// Anything else
    Unknown,
}

impl FileType {
    /// Detect file type from extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "docx" => Self::Docx,
            "doc" => Self::Doc,
            _ => Self::Unknown,
        }
    }

    /// Detect file type from a path's extension
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Unknown)
    }

    /// Get display name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Pdf => "PDF",
            Self::Docx => "Word Document (.docx)",
            Self::Doc => "Word Document (.doc)",
            Self::Unknown => "Unknown",
        }
    }
}

/// A document file held by the document store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredDocument {
    /// Document ID the file belongs to
    pub doc_id: String,
    /// File name on disk
    pub filename: String,
    /// Full path to the file
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
}

impl StoredDocument {
    /// Detected file type of the stored file
    pub fn file_type(&self) -> FileType {
        FileType::from_path(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(FileType::from_path(Path::new("/tmp/a/Report.PDF")), FileType::Pdf);
        assert_eq!(FileType::from_path(Path::new("notes.docx")), FileType::Docx);
        assert_eq!(FileType::from_path(Path::new("README")), FileType::Unknown);
    }
}
