//! Persistence errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        PersistenceError::Serialization(err.to_string())
    }
}

impl From<PersistenceError> for voice_order_core::Error {
    fn from(err: PersistenceError) -> Self {
        voice_order_core::Error::OrderSubmission(err.to_string())
    }
}
