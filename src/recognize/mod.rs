// Document recognition - turns non-LaTeX inputs (PDFs) into LaTeX-ish text.
// Recognizers are ordinary values: construct once, pass by reference, drop at shutdown.

mod pdf_text;

use std::path::{Path, PathBuf};

pub use pdf_text::{split_pages, PdfTextRecognizer};

/// Error types for recognition backends
#[derive(Debug, thiserror::Error)]
pub enum RecognizeError {
    #[error("Failed to extract text from {path:?}: {message}")]
    Extract { path: PathBuf, message: String },
    #[error("{0:?} has no extractable text; an OCR/recognition backend is required")]
    NoText(PathBuf),
}

/// Recognized pages, in reading order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizedDocument {
    pub pages: Vec<String>,
}

impl RecognizedDocument {
    /// Pages joined by blank lines, ready for the transformer
    pub fn source(&self) -> String {
        self.pages.join("\n\n")
    }
}

/// A backend that produces LaTeX (or plain text) from a document file
pub trait Recognizer: Send + Sync {
    fn name(&self) -> &str;

    fn recognize(&self, path: &Path) -> Result<RecognizedDocument, RecognizeError>;
}
