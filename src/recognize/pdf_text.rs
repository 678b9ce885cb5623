use pdf_extract::extract_text;
use std::path::Path;
use tracing::{info, warn};

use super::{RecognizeError, RecognizedDocument, Recognizer};

/// Reads the embedded text layer of a PDF. Scanned PDFs without a text layer
/// need an image-recognition backend instead.
#[derive(Debug, Clone, Default)]
pub struct PdfTextRecognizer;

impl PdfTextRecognizer {
    pub fn new() -> Self {
        Self
    }
}

/// Split extracted text into pages on form feeds, dropping blank pages
pub fn split_pages(text: &str) -> Vec<String> {
    text.split('\x0C')
        .map(str::trim)
        .filter(|page| !page.is_empty())
        .map(str::to_string)
        .collect()
}

impl Recognizer for PdfTextRecognizer {
    fn name(&self) -> &str {
        "pdf-text-layer"
    }

    fn recognize(&self, path: &Path) -> Result<RecognizedDocument, RecognizeError> {
        info!("Extracting text layer from PDF: {:?}", path);

        let text = extract_text(path).map_err(|e| RecognizeError::Extract {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let pages = split_pages(&text);
        if pages.is_empty() {
            warn!("PDF appears to be scanned or has no extractable text: {:?}", path);
            return Err(RecognizeError::NoText(path.to_path_buf()));
        }

        info!("Extracted {} pages from PDF", pages.len());
        Ok(RecognizedDocument { pages })
    }
}
