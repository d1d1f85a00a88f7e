//! Language understanding traits

use crate::{fold_key, Intent};
use serde::{Deserialize, Serialize};

/// Maps an utterance to exactly one intent.
///
/// Classification is total: anything unrecognised is `Intent::Fallback`.
pub trait IntentClassifier: Send + Sync + 'static {
    fn classify(&self, utterance: &str) -> Intent;
}

/// A menu item mentioned in an utterance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemMatch {
    /// Menu item id
    pub id: String,
    /// Display name used in prompts and orders
    pub name: String,
    pub name_en: String,
    /// The fragment of the utterance that matched
    pub matched_text: String,
}

/// Entities pulled out of one utterance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedEntities {
    pub items: Vec<ItemMatch>,
    /// Always at least 1
    pub quantity: u32,
    /// Empty when no name was found
    pub name: String,
}

impl Default for ExtractedEntities {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            quantity: 1,
            name: String::new(),
        }
    }
}

impl ExtractedEntities {
    pub fn has_items(&self) -> bool {
        !self.items.is_empty()
    }

    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

/// Extracts menu items, a quantity and a caller name from an utterance
pub trait EntityExtractor: Send + Sync + 'static {
    fn extract(&self, utterance: &str) -> ExtractedEntities;

    /// Merge key for an item name in the basket
    fn item_key(&self, name: &str) -> String {
        fold_key(name)
    }
}
