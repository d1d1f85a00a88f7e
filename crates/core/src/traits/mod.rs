//! Collaborator traits for the voice ordering agent
//!
//! The dialogue engine and call orchestrator only see these traits, so
//! classifiers, transcribers, synthesizers and order sinks can be swapped
//! per deployment or replaced with mocks in tests.
//!
//! ```text
//! Language Understanding:
//!   - IntentClassifier: Utterance → Intent
//!   - EntityExtractor: Utterance → menu items, quantity, caller name
//!
//! Speech Processing:
//!   - SpeechToText: Recorded audio → Text
//!   - TextToSpeech: Text → Encoded audio
//!
//! Orders:
//!   - OrderSubmitter: Confirmed basket → Order receipt
//! ```

mod nlu;
mod orders;
mod speech;

pub use nlu::{EntityExtractor, ExtractedEntities, IntentClassifier, ItemMatch};
pub use orders::OrderSubmitter;
pub use speech::{SpeechToText, TextToSpeech};
