//! Menu catalog

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::ConfigError;

/// One canonical menu item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItemConfig {
    /// Stable identifier
    pub id: String,
    /// Arabic display name, used in prompts and orders
    pub name_ar: String,
    pub name_en: String,
    /// Partial names, consulted only when no canonical name matched
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Listed in the menu prompt
    #[serde(default)]
    pub featured: bool,
}

impl MenuItemConfig {
    fn new(id: &str, name_ar: &str, name_en: &str, aliases: &[&str], featured: bool) -> Self {
        Self {
            id: id.to_string(),
            name_ar: name_ar.to_string(),
            name_en: name_en.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            featured,
        }
    }
}

/// Menu catalog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuConfig {
    #[serde(default = "default_menu_items")]
    pub items: Vec<MenuItemConfig>,
}

fn default_menu_items() -> Vec<MenuItemConfig> {
    vec![
        MenuItemConfig::new(
            "shawarma_chicken",
            "شاورما دجاج",
            "Chicken Shawarma",
            &["shawarma", "شاورما"],
            true,
        ),
        MenuItemConfig::new(
            "mixed_grill",
            "مشاوي مشكلة",
            "Mixed Grill",
            &["grill", "مشاوي"],
            true,
        ),
        MenuItemConfig::new(
            "frankie_sandwich",
            "ساندويش فرانكي",
            "Frankie Sandwich",
            &["frankie", "sandwich", "ساندويش"],
            true,
        ),
        MenuItemConfig::new("ayran", "مشروب", "Ayran", &["عيران"], false),
        MenuItemConfig::new("pepsi", "بيبسي", "Pepsi", &["cola"], false),
        MenuItemConfig::new(
            "chicken_burger",
            "برجر دجاج",
            "Chicken Burger",
            &["burger", "برجر"],
            false,
        ),
    ]
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            items: default_menu_items(),
        }
    }
}

impl MenuConfig {
    /// Look up an item by id
    pub fn get(&self, id: &str) -> Option<&MenuItemConfig> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Items listed in the menu prompt, in catalog order
    pub fn featured(&self) -> impl Iterator<Item = &MenuItemConfig> {
        self.items.iter().filter(|item| item.featured)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.items.is_empty() {
            return Err(ConfigError::invalid("menu.items", "Menu must contain at least one item"));
        }

        let mut seen = HashSet::new();
        for item in &self.items {
            if item.id.trim().is_empty() {
                return Err(ConfigError::invalid("menu.items.id", "Item id cannot be empty"));
            }
            if !seen.insert(item.id.as_str()) {
                return Err(ConfigError::invalid(
                    "menu.items.id",
                    format!("Duplicate menu item id '{}'", item.id),
                ));
            }
            if item.name_ar.trim().is_empty() && item.name_en.trim().is_empty() {
                return Err(ConfigError::invalid(
                    "menu.items.name_ar",
                    format!("Item '{}' needs an Arabic or English name", item.id),
                ));
            }
        }

        if self.featured().next().is_none() {
            tracing::warn!("No featured menu items; the menu prompt will be empty");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_menu() {
        let menu = MenuConfig::default();
        assert_eq!(menu.items.len(), 6);
        assert!(menu.validate().is_ok());

        let featured: Vec<_> = menu.featured().map(|i| i.id.as_str()).collect();
        assert_eq!(featured, vec!["shawarma_chicken", "mixed_grill", "frankie_sandwich"]);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut menu = MenuConfig::default();
        let dup = menu.items[0].clone();
        menu.items.push(dup);
        assert!(menu.validate().is_err());
    }

    #[test]
    fn test_empty_menu_rejected() {
        let menu = MenuConfig { items: vec![] };
        assert!(menu.validate().is_err());
    }

    #[test]
    fn test_lookup_by_id() {
        let menu = MenuConfig::default();
        assert_eq!(menu.get("pepsi").map(|i| i.name_ar.as_str()), Some("بيبسي"));
        assert!(menu.get("pizza").is_none());
    }
}
