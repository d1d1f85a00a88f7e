//! Order persistence for the voice ordering agent
//!
//! Provides durable storage for placed orders:
//! - `OrderStore`: create / get / list
//! - `JsonOrderStore`: a single pretty-printed JSON file keyed by order id
//!
//! `JsonOrderStore` also implements the core `OrderSubmitter` trait, so the
//! call orchestrator can hand confirmed baskets straight to it.

pub mod error;
pub mod orders;

pub use error::PersistenceError;
pub use orders::{JsonOrderStore, OrderStore};
