//! Pipeline errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid audio file name: {0}")]
    InvalidAudioName(String),

    #[error("Audio file not found: {0}")]
    AudioNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for PipelineError {
    fn from(err: reqwest::Error) -> Self {
        PipelineError::Network(err.to_string())
    }
}
