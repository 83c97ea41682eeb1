//! Error types for lasso-embed.

use thiserror::Error;

/// Result type alias for embedding operations.
pub type Result<T> = std::result::Result<T, EmbedError>;

/// Errors that can occur while producing embedding artifacts.
#[derive(Error, Debug)]
pub enum EmbedError {
    /// Unknown model identifier. The message lists the valid identifiers.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Input table unreadable, empty, or missing the sequence column.
    #[error("data format error: {0}")]
    DataFormat(String),

    /// Checkpoint could not be resolved to a usable model/tokenizer pair.
    #[error("model load error: {0}")]
    ModelLoad(String),

    /// Tokenization or forward-pass failure for a specific sequence.
    #[error("inference error: {0}")]
    Inference(String),

    /// Output artifact could not be assembled or serialized.
    #[error("artifact error: {0}")]
    Artifact(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
