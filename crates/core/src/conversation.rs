//! Conversation types: dialogue stages, the order basket and turn history

use serde::{Deserialize, Serialize};

/// Dialogue stages for the ordering flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DialogueStage {
    /// Call just connected, nothing asked yet
    #[default]
    Greeting,
    /// Caller was welcomed, waiting for a request
    AwaitingRequest,
    /// Items are being added to the basket
    OrderInProgress,
    /// Basket confirmed, waiting for the caller's name
    AwaitingName,
    /// Summary read back, waiting for final confirmation
    OrderSummary,
    /// Order confirmed and handed off for submission
    OrderPlaced,
}

impl DialogueStage {
    pub const ALL: [DialogueStage; 6] = [
        DialogueStage::Greeting,
        DialogueStage::AwaitingRequest,
        DialogueStage::OrderInProgress,
        DialogueStage::AwaitingName,
        DialogueStage::OrderSummary,
        DialogueStage::OrderPlaced,
    ];

    /// Get stage display name
    pub fn display_name(&self) -> &'static str {
        match self {
            DialogueStage::Greeting => "Greeting",
            DialogueStage::AwaitingRequest => "Awaiting Request",
            DialogueStage::OrderInProgress => "Order In Progress",
            DialogueStage::AwaitingName => "Awaiting Name",
            DialogueStage::OrderSummary => "Order Summary",
            DialogueStage::OrderPlaced => "Order Placed",
        }
    }

    /// Stages reachable from this one, besides staying put.
    ///
    /// Every stage may move to `OrderInProgress` (order intent) and back to
    /// `Greeting` (goodbye).
    pub fn allowed_transitions(&self) -> &'static [DialogueStage] {
        use DialogueStage::*;
        match self {
            Greeting => &[AwaitingRequest, OrderInProgress],
            AwaitingRequest => &[OrderInProgress, Greeting],
            OrderInProgress => &[AwaitingName, Greeting],
            AwaitingName => &[OrderSummary, OrderInProgress, Greeting],
            OrderSummary => &[OrderPlaced, OrderInProgress, Greeting],
            OrderPlaced => &[OrderInProgress, Greeting],
        }
    }

    /// Check if transition to target stage is allowed
    pub fn can_transition_to(&self, target: DialogueStage) -> bool {
        *self == target || self.allowed_transitions().contains(&target)
    }
}

impl std::fmt::Display for DialogueStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One line of the in-progress basket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Folded merge key
    pub key: String,
    /// Display name as first mentioned
    pub name: String,
    /// Always at least 1
    pub quantity: u32,
}

/// Insertion-ordered basket keyed by folded item name.
///
/// Repeated mentions of the same key add to the existing line's quantity
/// instead of creating a second line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItems {
    items: Vec<OrderItem>,
}

impl OrderItems {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `quantity` units of `name` under `key`, returning the line's new
    /// quantity. A zero quantity is bumped to 1.
    pub fn merge(&mut self, key: impl Into<String>, name: &str, quantity: u32) -> u32 {
        let key = key.into();
        let quantity = quantity.max(1);

        if let Some(existing) = self.items.iter_mut().find(|item| item.key == key) {
            existing.quantity = existing.quantity.saturating_add(quantity);
            return existing.quantity;
        }

        self.items.push(OrderItem {
            key,
            name: name.to_string(),
            quantity,
        });
        quantity
    }

    /// Quantity for a folded key, if present
    pub fn quantity_of(&self, key: &str) -> Option<u32> {
        self.items
            .iter()
            .find(|item| item.key == key)
            .map(|item| item.quantity)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OrderItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Total units across all lines
    pub fn total_quantity(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, item| acc.saturating_add(item.quantity))
    }

    /// Lines in the shape handed to order submission
    pub fn to_line_items(&self) -> Vec<crate::LineItem> {
        self.items
            .iter()
            .map(|item| crate::LineItem {
                name: item.name.clone(),
                quantity: item.quantity,
            })
            .collect()
    }
}

/// One utterance-in / prompt-out exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub utterance: String,
    pub prompt: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_increments_existing_line() {
        let mut items = OrderItems::new();
        assert_eq!(items.merge("shawarma", "شاورما دجاج", 1), 1);
        assert_eq!(items.merge("shawarma", "شاورما دجاج", 2), 3);

        assert_eq!(items.len(), 1);
        assert_eq!(items.quantity_of("shawarma"), Some(3));
    }

    #[test]
    fn test_merge_preserves_insertion_order() {
        let mut items = OrderItems::new();
        items.merge("b", "B", 1);
        items.merge("a", "A", 1);
        items.merge("b", "B", 1);

        let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(items.total_quantity(), 3);
    }

    #[test]
    fn test_zero_quantity_counts_as_one() {
        let mut items = OrderItems::new();
        assert_eq!(items.merge("pepsi", "بيبسي", 0), 1);
    }

    #[test]
    fn test_line_items_keep_display_names() {
        let mut items = OrderItems::new();
        items.merge("pepsi", "بيبسي", 2);
        let lines = items.to_line_items();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].name, "بيبسي");
        assert_eq!(lines[0].quantity, 2);
    }

    #[test]
    fn test_goodbye_and_order_reachable_from_every_stage() {
        for stage in DialogueStage::ALL {
            assert!(stage.can_transition_to(DialogueStage::OrderInProgress));
            assert!(stage.can_transition_to(DialogueStage::Greeting));
        }
    }

    #[test]
    fn test_cannot_skip_name_collection() {
        assert!(!DialogueStage::OrderInProgress.can_transition_to(DialogueStage::OrderPlaced));
        assert!(!DialogueStage::Greeting.can_transition_to(DialogueStage::OrderSummary));
    }
}
