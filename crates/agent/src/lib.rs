//! Conversational ordering agent
//!
//! Features:
//! - Stage-based dialogue engine driven by intent and extracted entities
//! - Per-call session store with capacity limit and idle expiry
//! - Call orchestration across independent webhook deliveries, with
//!   speech synthesis and order submission outside the session lock

pub mod engine;
pub mod orchestrator;
pub mod state;
pub mod store;

pub use engine::{DialogueEngine, TurnResult};
pub use orchestrator::{CallOrchestrator, TurnOutcome, TurnTimings};
pub use state::DialogueState;
pub use store::{CommitOutcome, CreateOutcome, EndOutcome, SessionSnapshot, SessionStore};

use thiserror::Error;

/// Agent errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Session limit reached ({max} active calls)")]
    SessionLimit { max: usize },

    #[error("Unknown session: {0}")]
    UnknownSession(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error(transparent)]
    Core(#[from] voice_order_core::Error),
}

impl From<voice_order_pipeline::PipelineError> for AgentError {
    fn from(err: voice_order_pipeline::PipelineError) -> Self {
        AgentError::Pipeline(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AgentError>;
