//! Order persistence backed by a JSON file

use crate::PersistenceError;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use voice_order_core::{LineItem, Order, OrderReceipt, OrderSubmitter};

/// Order store trait
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Validate and persist a new order. Never deduplicates.
    async fn create(&self, customer_name: &str, items: &[LineItem])
        -> Result<Order, PersistenceError>;

    async fn get(&self, order_id: &str) -> Result<Option<Order>, PersistenceError>;

    /// All orders, oldest first
    async fn list(&self) -> Result<Vec<Order>, PersistenceError>;
}

/// File-backed order store.
///
/// The whole map `order_id -> order` is rewritten on every create, through a
/// temp file and rename so a crash never leaves a half-written file. Writers
/// are serialized by an in-process lock.
pub struct JsonOrderStore {
    path: PathBuf,
    eta_minutes: u32,
    write_lock: Mutex<()>,
}

impl JsonOrderStore {
    pub fn new(path: impl Into<PathBuf>, eta_minutes: u32) -> Self {
        Self {
            path: path.into(),
            eta_minutes,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the map; a corrupt file reads as empty and is reported as such
    async fn load(&self) -> Result<(BTreeMap<String, Order>, bool), PersistenceError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok((BTreeMap::new(), false))
            }
            Err(e) => return Err(e.into()),
        };

        if raw.trim().is_empty() {
            return Ok((BTreeMap::new(), false));
        }

        match serde_json::from_str(&raw) {
            Ok(orders) => Ok((orders, false)),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Order file is corrupt, treating as empty"
                );
                Ok((BTreeMap::new(), true))
            }
        }
    }

    async fn write(&self, orders: &BTreeMap<String, Order>) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(orders)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn back_up_corrupt_file(&self) -> Result<(), PersistenceError> {
        let backup = self.path.with_extension(format!(
            "json.corrupt-{}",
            chrono::Utc::now().format("%Y%m%d%H%M%S")
        ));
        tokio::fs::rename(&self.path, &backup).await?;
        tracing::warn!(
            path = %self.path.display(),
            backup = %backup.display(),
            "Moved corrupt order file aside before writing"
        );
        Ok(())
    }
}

fn validate(customer_name: &str, items: &[LineItem]) -> Result<(), PersistenceError> {
    if customer_name.trim().is_empty() {
        return Err(PersistenceError::InvalidOrder(
            "customer name is required".to_string(),
        ));
    }
    if items.is_empty() {
        return Err(PersistenceError::InvalidOrder(
            "order must contain at least one item".to_string(),
        ));
    }
    if let Some(item) = items.iter().find(|i| i.name.trim().is_empty()) {
        return Err(PersistenceError::InvalidOrder(format!(
            "item with quantity {} has no name",
            item.quantity
        )));
    }
    if let Some(item) = items.iter().find(|i| i.quantity == 0) {
        return Err(PersistenceError::InvalidOrder(format!(
            "quantity for '{}' must be at least 1",
            item.name
        )));
    }
    Ok(())
}

#[async_trait]
impl OrderStore for JsonOrderStore {
    async fn create(
        &self,
        customer_name: &str,
        items: &[LineItem],
    ) -> Result<Order, PersistenceError> {
        validate(customer_name, items)?;

        let order = Order::new(customer_name.trim(), items.to_vec(), self.eta_minutes);

        let _guard = self.write_lock.lock().await;
        let (mut orders, corrupt) = self.load().await?;
        if corrupt {
            self.back_up_corrupt_file().await?;
        }
        orders.insert(order.order_id.clone(), order.clone());
        self.write(&orders).await?;

        tracing::info!(
            order_id = %order.order_id,
            items = order.items.len(),
            eta = %order.eta,
            "Order saved"
        );
        Ok(order)
    }

    async fn get(&self, order_id: &str) -> Result<Option<Order>, PersistenceError> {
        let (orders, _) = self.load().await?;
        Ok(orders.get(order_id).cloned())
    }

    async fn list(&self) -> Result<Vec<Order>, PersistenceError> {
        let (orders, _) = self.load().await?;
        let mut list: Vec<Order> = orders.into_values().collect();
        list.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(list)
    }
}

#[async_trait]
impl OrderSubmitter for JsonOrderStore {
    async fn submit_order(
        &self,
        customer_name: &str,
        items: &[LineItem],
    ) -> voice_order_core::Result<OrderReceipt> {
        let order = self.create(customer_name, items).await?;
        Ok(order.receipt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn items() -> Vec<LineItem> {
        vec![
            LineItem {
                name: "شاورما دجاج".to_string(),
                quantity: 2,
            },
            LineItem {
                name: "بيبسي".to_string(),
                quantity: 1,
            },
        ]
    }

    #[tokio::test]
    async fn test_create_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonOrderStore::new(dir.path().join("data/orders.json"), 30);

        let order = store.create("أحمد", &items()).await.unwrap();
        assert_eq!((order.eta - order.timestamp).num_minutes(), 30);

        let loaded = store.get(&order.order_id).await.unwrap().unwrap();
        assert_eq!(loaded, order);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_file_is_pretty_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.json");
        let store = JsonOrderStore::new(&path, 30);
        store.create("أحمد", &items()).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("شاورما دجاج"));
        assert!(raw.contains('\n'));
        assert!(!dir.path().join("orders.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_resubmission_creates_distinct_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonOrderStore::new(dir.path().join("orders.json"), 30);

        let a = store.submit_order("أحمد", &items()).await.unwrap();
        let b = store.submit_order("أحمد", &items()).await.unwrap();
        assert_ne!(a.order_id, b.order_id);
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_orders_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonOrderStore::new(dir.path().join("orders.json"), 30);

        assert!(matches!(
            store.create("أحمد", &[]).await,
            Err(PersistenceError::InvalidOrder(_))
        ));

        let zero = vec![LineItem {
            name: "بيبسي".to_string(),
            quantity: 0,
        }];
        assert!(store.create("أحمد", &zero).await.is_err());
        assert!(store.create("  ", &items()).await.is_err());

        let err = store.submit_order("أحمد", &[]).await.unwrap_err();
        assert!(matches!(err, voice_order_core::Error::OrderSubmission(_)));
    }

    #[tokio::test]
    async fn test_corrupt_file_backed_up_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = JsonOrderStore::new(&path, 30);
        assert!(store.list().await.unwrap().is_empty());

        store.create("أحمد", &items()).await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 1);

        let backups = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains("corrupt"))
            .count();
        assert_eq!(backups, 1);
    }

    #[tokio::test]
    async fn test_concurrent_creates_all_persist() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonOrderStore::new(dir.path().join("orders.json"), 30));

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .create(&format!("caller {}", i), &items())
                        .await
                        .unwrap()
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.list().await.unwrap().len(), 10);
    }
}
