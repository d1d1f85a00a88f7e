//! Error types shared by the collaborator traits

use thiserror::Error;

/// Errors surfaced by external collaborators (STT, TTS, order submission).
///
/// None of these are fatal to the process; the orchestrator scopes them to
/// the call that produced them.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Transcription error: {0}")]
    Transcription(String),

    #[error("Synthesis error: {0}")]
    Synthesis(String),

    #[error("Order submission error: {0}")]
    OrderSubmission(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Result alias using the core error
pub type Result<T> = std::result::Result<T, Error>;
