use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for modlingo.
#[derive(Debug, Error)]
pub enum ModlingoError {
    /// A localization document could not be recovered into a key/value object.
    #[error("parse error: {0}")]
    Parse(String),

    /// A single translation call failed (timeout, bad response, unreachable backend).
    #[error("translation call failed: {0}")]
    TranslationCall(String),

    /// A translation dropped, altered, or invented a `{{...}}` placeholder token.
    #[error("placeholder mismatch: missing {missing:?}, unexpected {unexpected:?}")]
    PlaceholderMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    /// Persisting a document failed.
    #[error("write to {} failed: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
