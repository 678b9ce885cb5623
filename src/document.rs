use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::config::InputConfig;
use crate::recognize::Recognizer;

/// How a source file is turned into LaTeX text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Latex,
    Pdf,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("pdf") => SourceKind::Pdf,
            _ => SourceKind::Latex,
        }
    }
}

/// Read a document as LaTeX source, enforcing the configured type and size limits
pub fn read_source(path: &Path, input: &InputConfig, recognizer: &dyn Recognizer) -> Result<String> {
    if !input.allows(path) {
        bail!(
            "Invalid file type {:?}; allowed extensions: {}",
            path,
            input.allowed_extensions.join(", ")
        );
    }

    let metadata =
        fs::metadata(path).with_context(|| format!("Failed to stat input file: {:?}", path))?;
    input.check_size(metadata.len() as usize)?;

    let source = match SourceKind::from_path(path) {
        SourceKind::Latex => fs::read_to_string(path)
            .with_context(|| format!("Failed to read LaTeX file: {:?}", path))?,
        SourceKind::Pdf => {
            info!("Recognizing {:?} with {}", path, recognizer.name());
            recognizer.recognize(path)?.source()
        }
    };

    info!("Loaded {:?} ({} characters)", path, source.len());
    Ok(source)
}
