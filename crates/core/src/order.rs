//! Submitted order types

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// An ordered item as handed to order submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub quantity: u32,
}

/// A placed order, as persisted by the order store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub customer_name: String,
    pub items: Vec<LineItem>,
    pub timestamp: DateTime<Utc>,
    pub eta: DateTime<Utc>,
}

impl Order {
    /// Build a new order stamped now, with an ETA `eta_minutes` out.
    ///
    /// Ids are never reused: two submissions of the same basket produce two
    /// distinct orders.
    pub fn new(customer_name: &str, items: Vec<LineItem>, eta_minutes: u32) -> Self {
        let now = Utc::now();
        Self {
            order_id: generate_order_id(now),
            customer_name: customer_name.to_string(),
            items,
            timestamp: now,
            eta: now + Duration::minutes(i64::from(eta_minutes)),
        }
    }

    pub fn receipt(&self) -> OrderReceipt {
        OrderReceipt {
            order_id: self.order_id.clone(),
            eta: self.eta,
        }
    }
}

/// What the caller is told after a successful submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub order_id: String,
    pub eta: DateTime<Utc>,
}

impl OrderReceipt {
    /// Whole minutes from `now` until the ETA, never negative
    pub fn minutes_until(&self, now: DateTime<Utc>) -> i64 {
        (self.eta - now).num_minutes().max(0)
    }
}

fn generate_order_id(now: DateTime<Utc>) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", now.format("%Y%m%d%H%M%S%6f"), &suffix[..6])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eta_offset() {
        let order = Order::new("أحمد", vec![], 30);
        assert_eq!((order.eta - order.timestamp).num_minutes(), 30);
    }

    #[test]
    fn test_ids_are_distinct() {
        let items = vec![LineItem {
            name: "بيبسي".into(),
            quantity: 1,
        }];
        let a = Order::new("أحمد", items.clone(), 30);
        let b = Order::new("أحمد", items, 30);
        assert_ne!(a.order_id, b.order_id);
    }

    #[test]
    fn test_id_starts_with_timestamp() {
        let order = Order::new("x", vec![], 30);
        let prefix = order.timestamp.format("%Y%m%d%H%M%S").to_string();
        assert!(order.order_id.starts_with(&prefix));
    }
}
