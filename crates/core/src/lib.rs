//! Core traits and types for the voice ordering agent
//!
//! This crate provides foundational types used across all other crates:
//! - Intents and dialogue stages
//! - Order basket and submitted order types
//! - Call context for telephony sessions
//! - Audio references for synthesized and recorded speech
//! - Collaborator traits (classifier, extractor, STT, TTS, order submission)
//! - Error types

pub mod audio;
pub mod call;
pub mod conversation;
pub mod error;
pub mod intent;
pub mod order;
pub mod text;
pub mod traits;

pub use audio::{AudioClip, AudioRef};
pub use call::CallContext;
pub use conversation::{DialogueStage, HistoryTurn, OrderItem, OrderItems};
pub use error::{Error, Result};
pub use intent::Intent;
pub use order::{LineItem, Order, OrderReceipt};
pub use text::fold_key;

pub use traits::{
    EntityExtractor, ExtractedEntities, IntentClassifier, ItemMatch, OrderSubmitter, SpeechToText,
    TextToSpeech,
};
