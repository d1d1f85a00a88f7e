//! Text processing errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TextProcessingError {
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

impl From<TextProcessingError> for voice_order_core::Error {
    fn from(err: TextProcessingError) -> Self {
        voice_order_core::Error::Configuration(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TextProcessingError>;
