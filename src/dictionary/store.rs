// Command dictionary store - persists LaTeX command -> spoken phrase mappings
// The whole mapping is rewritten on every mutation; there is no append log.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// On-disk layout: `{"commands": {"\\alpha": "alpha", ...}}`
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    commands: BTreeMap<String, String>,
}

/// Error types for dictionary operations
#[derive(Debug, thiserror::Error)]
pub enum DictionaryError {
    /// Store exists but could not be read or parsed
    #[error("Failed to load dictionary {path:?}: {message}")]
    Load { path: PathBuf, message: String },
    /// Failed to write the store back to disk
    #[error("Failed to persist dictionary {path:?}: {message}")]
    Persist { path: PathBuf, message: String },
    /// Failed to read or write a flat-text interchange file
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Persisted mapping from LaTeX commands to spoken-word phrases
#[derive(Debug, Clone)]
pub struct CommandDictionary {
    /// Phrases indexed by command (including the leading backslash)
    commands: BTreeMap<String, String>,
    /// Path to persistence file
    path: PathBuf,
}

impl CommandDictionary {
    /// Create an empty dictionary bound to `path` without touching the disk
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            commands: BTreeMap::new(),
            path: path.into(),
        }
    }

    /// Create a dictionary bound to `path` and load whatever is stored there
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, DictionaryError> {
        let mut dictionary = Self::new(path);
        dictionary.load()?;
        Ok(dictionary)
    }

    /// Load entries from the store, replacing the in-memory mapping.
    /// A missing store is an empty dictionary, not an error.
    pub fn load(&mut self) -> Result<(), DictionaryError> {
        debug!("Loading command dictionary from {:?}", self.path);

        if !self.path.exists() {
            debug!("No dictionary file found, starting with empty dictionary");
            self.commands.clear();
            return Ok(());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| DictionaryError::Load {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        let store: StoreFile =
            serde_json::from_str(&content).map_err(|e| DictionaryError::Load {
                path: self.path.clone(),
                message: e.to_string(),
            })?;

        self.commands = store.commands;
        info!("Loaded {} dictionary commands", self.commands.len());
        Ok(())
    }

    /// Persist the full mapping using atomic write (temp file + rename)
    pub fn save(&self) -> Result<(), DictionaryError> {
        debug!(
            "Persisting {} dictionary commands to {:?}",
            self.commands.len(),
            self.path
        );

        let persist_err = |message: String| DictionaryError::Persist {
            path: self.path.clone(),
            message,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| persist_err(e.to_string()))?;
            }
        }

        let content = to_pretty_json(&self.commands).map_err(|e| persist_err(e.to_string()))?;

        let temp_path = self.path.with_extension("tmp");
        {
            let mut file = File::create(&temp_path)
                .map_err(|e| persist_err(format!("Failed to create temp file: {}", e)))?;
            file.write_all(&content)
                .map_err(|e| persist_err(format!("Failed to write: {}", e)))?;
            file.sync_all()
                .map_err(|e| persist_err(format!("Failed to sync: {}", e)))?;
        }

        fs::rename(&temp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            persist_err(format!("Failed to rename: {}", e))
        })?;

        Ok(())
    }

    /// Exact-match lookup; most commands are not in the dictionary
    pub fn lookup(&self, command: &str) -> Option<&str> {
        self.commands.get(command).map(String::as_str)
    }

    /// Insert or replace an entry and persist immediately
    pub fn add(
        &mut self,
        command: impl Into<String>,
        phrase: impl Into<String>,
    ) -> Result<(), DictionaryError> {
        self.commands.insert(command.into(), phrase.into());
        self.save()
    }

    /// Remove an entry; persists and returns true only if something was removed
    pub fn remove(&mut self, command: &str) -> Result<bool, DictionaryError> {
        if self.commands.remove(command).is_none() {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    /// Case-insensitive substring search over both commands and phrases
    pub fn search(&self, query: &str) -> BTreeMap<String, String> {
        let query = query.to_lowercase();
        self.commands
            .iter()
            .filter(|(command, phrase)| {
                command.to_lowercase().contains(&query) || phrase.to_lowercase().contains(&query)
            })
            .map(|(command, phrase)| (command.clone(), phrase.clone()))
            .collect()
    }

    /// All entries in command order
    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Upsert many entries with a single persist at the end
    pub(crate) fn extend<I>(&mut self, entries: I) -> Result<(), DictionaryError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.commands.extend(entries);
        self.save()
    }
}

/// Four-space indentation keeps the store readable for hand editing
fn to_pretty_json(commands: &BTreeMap<String, String>) -> serde_json::Result<Vec<u8>> {
    let store = StoreFile {
        commands: commands.clone(),
    };
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    store.serialize(&mut ser)?;
    buf.push(b'\n');
    Ok(buf)
}
