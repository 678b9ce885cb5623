// Library exports for the CLI, the batch converter and other callers

pub mod config;
pub mod dictionary;
pub mod document;
pub mod recognize;
pub mod transform;

// Re-export commonly used types
pub use config::SpeechConfig;
pub use dictionary::{CommandDictionary, DictionaryError, SharedDictionary};
pub use recognize::{PdfTextRecognizer, Recognizer};
pub use transform::{LatexTransformer, StageKind, TransformError};
