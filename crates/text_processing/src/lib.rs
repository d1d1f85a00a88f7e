//! Text processing for the voice ordering agent
//!
//! This crate provides the language-understanding backends:
//! - **Intent Classification**: ordered keyword sets, first match wins
//! - **Entity Extraction**: menu items, quantity and caller name
//!
//! Both are plain substring matchers over folded text. They implement the
//! `IntentClassifier` / `EntityExtractor` traits from `voice-order-core` and
//! can be replaced by any other backend.
//!
//! # Example
//!
//! ```ignore
//! use voice_order_config::{MenuConfig, NluConfig};
//! use voice_order_text_processing::{KeywordIntentClassifier, MenuEntityExtractor};
//!
//! let classifier = KeywordIntentClassifier::new(&NluConfig::default());
//! let extractor = MenuEntityExtractor::new(&MenuConfig::default(), &NluConfig::default())?;
//!
//! assert_eq!(classifier.classify("بدي شاورما دجاج"), Intent::Order);
//! let entities = extractor.extract("بدي 2 شاورما دجاج");
//! assert_eq!(entities.quantity, 2);
//! ```

pub mod entities;
pub mod intent;

mod error;

pub use entities::MenuEntityExtractor;
pub use error::{Result, TextProcessingError};
pub use intent::KeywordIntentClassifier;
