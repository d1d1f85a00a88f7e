//! Menu entity extraction
//!
//! Pulls three things out of an utterance:
//! - Menu items, by canonical Arabic or English name, falling back to the
//!   item's aliases when none of its canonical names occur
//! - A quantity: the first integer literal anywhere in the text, ASCII or
//!   Arabic-Indic digits, defaulting to 1
//! - A caller name following an indicator phrase such as "my name is"
//!
//! The quantity applies to the whole utterance, not to each item, so
//! "two shawarma and three pepsi" yields quantity 2 for both.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use voice_order_config::{MenuConfig, NluConfig};
use voice_order_core::{fold_key, EntityExtractor, ExtractedEntities, ItemMatch};

use crate::{Result, TextProcessingError};

static QUANTITY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9\x{0660}-\x{0669}\x{06F0}-\x{06F9}]+").expect("quantity pattern is valid")
});

/// Trailing punctuation stripped from extracted names
const NAME_TRAILING_PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':', '،', '؟', '؛'];

#[derive(Debug, Clone)]
struct CatalogEntry {
    id: String,
    name: String,
    name_en: String,
    /// (folded form, display form)
    canonical: Vec<(String, String)>,
    aliases: Vec<(String, String)>,
}

/// Menu-driven entity extractor
#[derive(Debug, Clone)]
pub struct MenuEntityExtractor {
    catalog: Vec<CatalogEntry>,
    name_indicators: Vec<Regex>,
}

impl MenuEntityExtractor {
    pub fn new(menu: &MenuConfig, nlu: &NluConfig) -> Result<Self> {
        let catalog = menu
            .items
            .iter()
            .map(|item| {
                let display = if item.name_ar.trim().is_empty() {
                    item.name_en.clone()
                } else {
                    item.name_ar.clone()
                };
                let canonical = [&item.name_ar, &item.name_en]
                    .into_iter()
                    .filter(|n| !n.trim().is_empty())
                    .map(|n| (fold_key(n), n.clone()))
                    .collect();
                let aliases = item
                    .aliases
                    .iter()
                    .filter(|a| !a.trim().is_empty())
                    .map(|a| (fold_key(a), a.clone()))
                    .collect();
                CatalogEntry {
                    id: item.id.clone(),
                    name: display,
                    name_en: item.name_en.clone(),
                    canonical,
                    aliases,
                }
            })
            .collect();

        let name_indicators = nlu
            .name_indicators
            .iter()
            .map(|indicator| {
                RegexBuilder::new(&regex::escape(indicator.trim()))
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| TextProcessingError::InvalidPattern {
                        pattern: indicator.clone(),
                        message: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            catalog,
            name_indicators,
        })
    }

    /// Menu items mentioned in the text, deduplicated by id in catalog order
    pub fn extract_items(&self, text: &str) -> Vec<ItemMatch> {
        let folded = fold_key(text);
        if folded.is_empty() {
            return Vec::new();
        }

        self.catalog
            .iter()
            .filter_map(|entry| {
                Self::match_forms(entry, &entry.canonical, &folded)
                    .or_else(|| Self::match_forms(entry, &entry.aliases, &folded))
            })
            .collect()
    }

    fn match_forms(
        entry: &CatalogEntry,
        forms: &[(String, String)],
        folded: &str,
    ) -> Option<ItemMatch> {
        forms
            .iter()
            .find(|(key, _)| folded.contains(key.as_str()))
            .map(|(_, display)| ItemMatch {
                id: entry.id.clone(),
                name: entry.name.clone(),
                name_en: entry.name_en.clone(),
                matched_text: display.clone(),
            })
    }

    /// First integer literal in the text; 1 when absent or zero
    pub fn extract_quantity(&self, text: &str) -> u32 {
        QUANTITY_PATTERN
            .find(text)
            .map(|m| parse_digits(m.as_str()))
            .filter(|&n| n > 0)
            .unwrap_or(1)
    }

    /// Up to two tokens after the first indicator phrase found; empty if none
    pub fn extract_name(&self, text: &str) -> String {
        for indicator in &self.name_indicators {
            let Some(found) = indicator.find(text) else {
                continue;
            };

            let name = text[found.end()..]
                .split_whitespace()
                .take(2)
                .collect::<Vec<_>>()
                .join(" ");
            let name = name.trim_end_matches(NAME_TRAILING_PUNCTUATION).trim();

            if !name.is_empty() {
                return name.to_string();
            }
        }

        String::new()
    }
}

/// Parse ASCII, Arabic-Indic or Extended Arabic-Indic digits, saturating
fn parse_digits(digits: &str) -> u32 {
    digits
        .chars()
        .filter_map(|c| match c {
            '0'..='9' => Some(c as u32 - '0' as u32),
            '\u{0660}'..='\u{0669}' => Some(c as u32 - 0x0660),
            '\u{06F0}'..='\u{06F9}' => Some(c as u32 - 0x06F0),
            _ => None,
        })
        .fold(0u32, |acc, d| acc.saturating_mul(10).saturating_add(d))
}

impl EntityExtractor for MenuEntityExtractor {
    fn extract(&self, utterance: &str) -> ExtractedEntities {
        let entities = ExtractedEntities {
            items: self.extract_items(utterance),
            quantity: self.extract_quantity(utterance),
            name: self.extract_name(utterance),
        };

        tracing::debug!(
            items = entities.items.len(),
            quantity = entities.quantity,
            has_name = entities.has_name(),
            "Extracted entities"
        );

        entities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> MenuEntityExtractor {
        MenuEntityExtractor::new(&MenuConfig::default(), &NluConfig::default()).unwrap()
    }

    fn ids(items: &[ItemMatch]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_arabic_canonical_name() {
        let items = extractor().extract_items("شاورما دجاج");
        assert_eq!(ids(&items), vec!["shawarma_chicken"]);
        assert_eq!(items[0].name, "شاورما دجاج");
        assert_eq!(items[0].matched_text, "شاورما دجاج");
    }

    #[test]
    fn test_english_any_casing() {
        let ex = extractor();
        for text in ["chicken shawarma", "CHICKEN SHAWARMA please", "I'd like Chicken Shawarma"] {
            assert_eq!(ids(&ex.extract_items(text)), vec!["shawarma_chicken"], "{}", text);
        }
    }

    #[test]
    fn test_repeated_mentions_counted_once() {
        let items = extractor().extract_items("شاورما دجاج و Chicken Shawarma و شاورما دجاج");
        assert_eq!(ids(&items), vec!["shawarma_chicken"]);
    }

    #[test]
    fn test_multiple_items_in_catalog_order() {
        let items = extractor().extract_items("بدي بيبسي و مشاوي مشكلة");
        assert_eq!(ids(&items), vec!["mixed_grill", "pepsi"]);
    }

    #[test]
    fn test_alias_when_item_has_no_canonical_match() {
        let ex = extractor();
        assert_eq!(ids(&ex.extract_items("بدي شاورما")), vec!["shawarma_chicken"]);
        assert_eq!(ex.extract_items("بدي شاورما")[0].matched_text, "شاورما");
        assert_eq!(ids(&ex.extract_items("مشاوي و بيبسي")), vec!["mixed_grill", "pepsi"]);
    }

    #[test]
    fn test_alias_and_canonical_items_together() {
        let items = extractor().extract_items("بدي شاورما و بيبسي");
        assert_eq!(ids(&items), vec!["shawarma_chicken", "pepsi"]);
        assert_eq!(items[0].matched_text, "شاورما");
        assert_eq!(items[1].matched_text, "بيبسي");

        // an item's canonical name wins over its own alias
        let items = extractor().extract_items("burger or chicken burger");
        assert_eq!(ids(&items), vec!["chicken_burger"]);
        assert_eq!(items[0].matched_text, "Chicken Burger");
    }

    #[test]
    fn test_harakat_do_not_block_match() {
        let items = extractor().extract_items("بِيبْسِي");
        assert_eq!(ids(&items), vec!["pepsi"]);
    }

    #[test]
    fn test_no_items() {
        assert!(extractor().extract_items("مرحباً").is_empty());
        assert!(extractor().extract_items("").is_empty());
    }

    #[test]
    fn test_quantity() {
        let ex = extractor();
        assert_eq!(ex.extract_quantity("بدي 3 بيبسي"), 3);
        assert_eq!(ex.extract_quantity("2 shawarma and 5 pepsi"), 2);
        assert_eq!(ex.extract_quantity("بدي بيبسي"), 1);
        assert_eq!(ex.extract_quantity("بدي ٤ بيبسي"), 4);
        assert_eq!(ex.extract_quantity("بدي ۱۲ بيبسي"), 12);
        assert_eq!(ex.extract_quantity("0 pepsi"), 1);
        assert_eq!(ex.extract_quantity("99999999999999"), u32::MAX);
    }

    #[test]
    fn test_name_after_indicator() {
        let ex = extractor();
        assert_eq!(ex.extract_name("My name is John Smith Jr."), "John Smith");
        assert_eq!(ex.extract_name("اسمي أحمد."), "أحمد");
        assert_eq!(ex.extract_name("اسمي محمد علي؟"), "محمد علي");
        assert_eq!(ex.extract_name("بدي بيبسي"), "");
    }

    #[test]
    fn test_indicator_without_name_tries_next() {
        let ex = extractor();
        assert_eq!(ex.extract_name("my name is"), "");
        assert_eq!(ex.extract_name("my name is!"), "");
        assert_eq!(ex.extract_name("hi, it's Sara."), "Sara");
    }

    #[test]
    fn test_extract_combines_all() {
        let entities = extractor().extract("اسمي سامر بدي 2 برجر دجاج");
        assert_eq!(ids(&entities.items), vec!["chicken_burger"]);
        assert_eq!(entities.quantity, 2);
        assert_eq!(entities.name, "سامر بدي");
    }

    #[test]
    fn test_default_item_key_merges_variants() {
        let ex = extractor();
        assert_eq!(ex.item_key("شاورما دجاج"), ex.item_key("شَاوِرما  دجاج"));
    }
}
