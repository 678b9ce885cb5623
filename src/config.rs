use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DictionaryConfig {
    /// Location of the `{"commands": {...}}` store
    pub path: PathBuf,
    /// Layer dictionary entries over the built-in symbol table
    pub enabled: bool,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("latex_dict.json"),
            enabled: true,
        }
    }
}

impl fmt::Display for DictionaryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub max_bytes: usize,
    pub allowed_extensions: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            max_bytes: 16 * 1024 * 1024,
            allowed_extensions: vec!["tex".to_string(), "pdf".to_string()],
        }
    }
}

impl InputConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.max_bytes > 0, "input.max_bytes must be > 0");
        ensure!(
            !self.allowed_extensions.is_empty(),
            "input.allowed_extensions must not be empty"
        );
        Ok(())
    }

    /// Whether the file extension (case-insensitive) is accepted for conversion
    pub fn allows(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .map(|ext| {
                self.allowed_extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }

    /// Reject documents larger than the configured cap before they reach the pipeline
    pub fn check_size(&self, len: usize) -> Result<()> {
        ensure!(
            len <= self.max_bytes,
            "input is {} bytes, exceeding the {} byte limit",
            len,
            self.max_bytes
        );
        Ok(())
    }
}

impl fmt::Display for InputConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub dictionary: DictionaryConfig,
    pub input: InputConfig,
}

impl SpeechConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: Self = serde_json::from_str(&config_str)
            .with_context(|| "Failed to parse config JSON")?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.input.validate()
    }
}

impl fmt::Display for SpeechConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
