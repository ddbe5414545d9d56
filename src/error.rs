//! Error types for Xian Universe

use thiserror::Error;

/// Errors that can occur around the dimension engine.
///
/// The engine itself never fails; these cover parsing input documents,
/// loading configuration, resolving users and encoding output.
#[derive(Debug, Error)]
pub enum UniverseError {
    #[error("Failed to parse input: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown user: {0}")]
    UnknownUser(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Narration failed: {0}")]
    NarrationError(String),
}
