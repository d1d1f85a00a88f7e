//! Keyword intent classification
//!
//! Each category is a set of keywords; the utterance is folded (lowercase,
//! Arabic diacritics and tatweel removed) and the first category with a
//! keyword that occurs anywhere in it wins.
//!
//! Matching is by substring, not by token, so short keywords also fire inside
//! longer words (`"hi"` inside `"this"`). Category order decides those
//! collisions, which is why the configured order matters.

use voice_order_config::NluConfig;
use voice_order_core::{fold_key, Intent, IntentClassifier};

/// Ordered keyword classifier
#[derive(Debug, Clone)]
pub struct KeywordIntentClassifier {
    categories: Vec<(Intent, Vec<String>)>,
}

impl KeywordIntentClassifier {
    /// Build from configured keyword sets, keeping their order
    pub fn new(config: &NluConfig) -> Self {
        let categories = config
            .intents
            .iter()
            .map(|entry| {
                let keywords = entry
                    .keywords
                    .iter()
                    .map(|k| fold_key(k))
                    .filter(|k| !k.is_empty())
                    .collect();
                (entry.intent, keywords)
            })
            .collect();

        Self { categories }
    }

    /// Intent and the keyword that selected it
    pub fn classify_with_keyword(&self, utterance: &str) -> (Intent, Option<&str>) {
        let text = fold_key(utterance);
        if text.is_empty() {
            return (Intent::Fallback, None);
        }

        for (intent, keywords) in &self.categories {
            if let Some(keyword) = keywords.iter().find(|k| text.contains(k.as_str())) {
                return (*intent, Some(keyword.as_str()));
            }
        }

        (Intent::Fallback, None)
    }
}

impl Default for KeywordIntentClassifier {
    fn default() -> Self {
        Self::new(&NluConfig::default())
    }
}

impl IntentClassifier for KeywordIntentClassifier {
    fn classify(&self, utterance: &str) -> Intent {
        let (intent, keyword) = self.classify_with_keyword(utterance);
        tracing::debug!(intent = %intent, keyword = ?keyword, "Classified utterance");
        intent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voice_order_config::IntentKeywords;

    #[test]
    fn test_scenario_utterances() {
        let classifier = KeywordIntentClassifier::default();

        assert_eq!(classifier.classify("شو في اليوم؟"), Intent::Menu);
        assert_eq!(classifier.classify("شاورما دجاج"), Intent::Order);
        assert_eq!(classifier.classify("أكيد"), Intent::Confirmation);
        assert_eq!(classifier.classify("ودّع"), Intent::Goodbye);
        assert_eq!(classifier.classify("مرحباً"), Intent::Greeting);
        assert_eq!(classifier.classify("في مشكلة بالطلب"), Intent::Order);
        assert_eq!(classifier.classify("الأكل بارد"), Intent::Complaint);
        assert_eq!(classifier.classify("كرر لو سمحت"), Intent::Clarification);
    }

    #[test]
    fn test_english_is_case_insensitive() {
        let classifier = KeywordIntentClassifier::default();
        assert_eq!(classifier.classify("Can I see the MENU"), Intent::Menu);
        assert_eq!(classifier.classify("HELLO there"), Intent::Greeting);
        assert_eq!(classifier.classify("Yes please"), Intent::Confirmation);
    }

    #[test]
    fn test_unmatched_is_fallback() {
        let classifier = KeywordIntentClassifier::default();
        assert_eq!(classifier.classify("zzz"), Intent::Fallback);
        assert_eq!(classifier.classify(""), Intent::Fallback);
        assert_eq!(classifier.classify("   "), Intent::Fallback);
    }

    #[test]
    fn test_first_category_wins() {
        let classifier = KeywordIntentClassifier::default();
        // "order" (Order) and "hello" (Greeting): Order is checked first
        assert_eq!(classifier.classify("hello, I want to order"), Intent::Order);
        // "what do you have" (Menu) beats "what" (Clarification)
        assert_eq!(classifier.classify("what do you have"), Intent::Menu);
    }

    #[test]
    fn test_substring_matching_is_not_tokenized() {
        let classifier = KeywordIntentClassifier::default();
        // "hi" occurs inside "this"
        assert_eq!(classifier.classify("this"), Intent::Greeting);
    }

    #[test]
    fn test_diacritics_ignored() {
        let classifier = KeywordIntentClassifier::default();
        assert_eq!(classifier.classify("ودع"), Intent::Goodbye);
        assert_eq!(classifier.classify("مرحبا"), Intent::Greeting);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let classifier = KeywordIntentClassifier::default();
        for text in ["بدي بيبسي", "hello", "؟؟", "شكراً"] {
            assert_eq!(classifier.classify(text), classifier.classify(text));
        }
    }

    #[test]
    fn test_custom_order_respected() {
        let config = NluConfig {
            intents: vec![
                IntentKeywords {
                    intent: Intent::Greeting,
                    keywords: vec!["hello".to_string()],
                },
                IntentKeywords {
                    intent: Intent::Order,
                    keywords: vec!["order".to_string()],
                },
            ],
            name_indicators: vec![],
        };
        let classifier = KeywordIntentClassifier::new(&config);
        assert_eq!(classifier.classify("hello, I want to order"), Intent::Greeting);
    }

    #[test]
    fn test_reports_matching_keyword() {
        let classifier = KeywordIntentClassifier::default();
        let (intent, keyword) = classifier.classify_with_keyword("بدي بيبسي");
        assert_eq!(intent, Intent::Order);
        assert_eq!(keyword, Some("بدي"));
    }
}
