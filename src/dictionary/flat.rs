// Flat-text interchange: one `command -> phrase` line per entry

use std::fs;
use std::path::Path;
use tracing::{debug, info};

use super::store::{CommandDictionary, DictionaryError};

const SEPARATOR: &str = "->";

/// Outcome of a flat-text import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    /// Non-blank lines without a `->` separator
    pub skipped: usize,
}

/// Split a flat line on its first separator; `None` for blank or separator-less lines
pub fn parse_flat_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (command, phrase) = line.split_once(SEPARATOR)?;
    Some((command.trim().to_string(), phrase.trim().to_string()))
}

impl CommandDictionary {
    /// Write every entry, sorted by command, for human inspection
    pub fn export_flat(&self, path: &Path) -> Result<(), DictionaryError> {
        let mut out = String::new();
        for (command, phrase) in self.entries() {
            out.push_str(command);
            out.push(' ');
            out.push_str(SEPARATOR);
            out.push(' ');
            out.push_str(phrase);
            out.push('\n');
        }

        fs::write(path, out).map_err(|source| DictionaryError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        info!("Exported {} dictionary commands to {:?}", self.len(), path);
        Ok(())
    }

    /// Upsert every `command -> phrase` line of `path`; malformed lines are counted and skipped
    pub fn import_flat(&mut self, path: &Path) -> Result<ImportReport, DictionaryError> {
        let content = fs::read_to_string(path).map_err(|source| DictionaryError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut report = ImportReport::default();
        let mut parsed = Vec::new();

        for (idx, line) in content.lines().enumerate() {
            match parse_flat_line(line) {
                Some(entry) => parsed.push(entry),
                None if line.trim().is_empty() => {}
                None => {
                    debug!("Skipping line {} without separator: {:?}", idx + 1, line);
                    report.skipped += 1;
                }
            }
        }

        report.imported = parsed.len();
        if !parsed.is_empty() {
            self.extend(parsed)?;
        }

        info!(
            "Imported {} dictionary commands from {:?} ({} skipped)",
            report.imported, path, report.skipped
        );
        Ok(report)
    }
}
