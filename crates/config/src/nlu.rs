//! Keyword tables for intent classification and name extraction

use serde::{Deserialize, Serialize};
use voice_order_core::Intent;

use crate::ConfigError;

/// Keywords that select one intent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentKeywords {
    pub intent: Intent,
    pub keywords: Vec<String>,
}

impl IntentKeywords {
    fn new(intent: Intent, keywords: &[&str]) -> Self {
        Self {
            intent,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// NLU configuration.
///
/// `intents` is checked in list order and the first category with a matching
/// keyword wins, so the order is part of the classifier's behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NluConfig {
    #[serde(default = "default_intent_keywords")]
    pub intents: Vec<IntentKeywords>,

    /// Phrases after which the caller's name follows
    #[serde(default = "default_name_indicators")]
    pub name_indicators: Vec<String>,
}

fn default_intent_keywords() -> Vec<IntentKeywords> {
    vec![
        IntentKeywords::new(
            Intent::Menu,
            &[
                "menu",
                "القائمة",
                "شو في",
                "شو فيه اليوم",
                "available",
                "today's special",
                "special",
                "dish",
                "what do you have",
            ],
        ),
        IntentKeywords::new(
            Intent::Order,
            &[
                "order", "طلب", "بدي", "أريد", "i want", "i'd like", "give me", "get", "shawarma",
                "شاورما", "chicken", "مشاوي", "grilled", "sandwich", "ساندويش", "بيتزا", "pizza",
                "بطاطا", "fries", "pepsi", "cola", "مشروب",
            ],
        ),
        IntentKeywords::new(
            Intent::Greeting,
            &["hello", "hi", "hey", "مرحباً", "سلام", "bonjour"],
        ),
        IntentKeywords::new(
            Intent::Goodbye,
            &[
                "bye",
                "goodbye",
                "ودّع",
                "شكراً",
                "thanks",
                "thank you",
                "that's all",
                "تمام",
                "خلاص",
                "finish",
                "done",
                "exit",
            ],
        ),
        IntentKeywords::new(
            Intent::Complaint,
            &[
                "problem", "issue", "complaint", "wrong", "خطأ", "مشكلة", "غير صحيح", "late",
                "متأخر", "cold", "بارد", "bad", "سيء",
            ],
        ),
        IntentKeywords::new(
            Intent::Confirmation,
            &["yes", "أكيد", "sure", "correct", "right", "نعم", "positive", "confirm", "exact"],
        ),
        IntentKeywords::new(
            Intent::Clarification,
            &[
                "what", "ماذا", "repeat", "كرر", "again", "slow", "بطيء", "clear", "واضح",
                "meaning", "معنى", "explain", "اشرح", "how", "كيف", "كم", "how much",
            ],
        ),
    ]
}

fn default_name_indicators() -> Vec<String> {
    ["my name is", "اسمي", "اسمه", "this is", "it's"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for NluConfig {
    fn default() -> Self {
        Self {
            intents: default_intent_keywords(),
            name_indicators: default_name_indicators(),
        }
    }
}

impl NluConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for intent in Intent::ALL {
            if intent == Intent::Fallback {
                continue;
            }
            if !self.intents.iter().any(|entry| entry.intent == intent) {
                return Err(ConfigError::invalid(
                    "nlu.intents",
                    format!("No keyword set for intent '{}'", intent),
                ));
            }
        }

        if let Some(entry) = self.intents.iter().find(|e| e.intent == Intent::Fallback) {
            return Err(ConfigError::invalid(
                "nlu.intents",
                format!(
                    "'{}' is the unmatched result and cannot have keywords",
                    entry.intent
                ),
            ));
        }

        for entry in &self.intents {
            if entry.keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(ConfigError::invalid(
                    "nlu.intents.keywords",
                    format!("Empty keyword for intent '{}'", entry.intent),
                ));
            }
        }

        if self.name_indicators.iter().any(|k| k.trim().is_empty()) {
            return Err(ConfigError::invalid(
                "nlu.name_indicators",
                "Name indicators cannot be empty",
            ));
        }

        Ok(())
    }
}
