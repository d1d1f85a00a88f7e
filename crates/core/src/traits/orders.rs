//! Order submission trait

use crate::{LineItem, OrderReceipt, Result};
use async_trait::async_trait;

/// Sink for confirmed orders.
///
/// Each call is a distinct submission; implementations must not deduplicate.
#[async_trait]
pub trait OrderSubmitter: Send + Sync + 'static {
    async fn submit_order(&self, customer_name: &str, items: &[LineItem]) -> Result<OrderReceipt>;
}
