//! In-memory store backed by a lock-guarded vector.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::FruitStore;

/// Process-lifetime store. Cloning shares the same underlying list.
#[derive(Clone, Default)]
pub struct InMemoryFruitStore {
    items: Arc<RwLock<Vec<String>>>,
}

impl InMemoryFruitStore {
    /// Create a store holding `seed`, in order.
    pub fn new(seed: Vec<String>) -> Self {
        Self {
            items: Arc::new(RwLock::new(seed)),
        }
    }
}

#[async_trait]
impl FruitStore for InMemoryFruitStore {
    async fn list(&self) -> Vec<String> {
        self.items.read().await.clone()
    }

    async fn append(&self, item: String) -> Vec<String> {
        let mut items = self.items.write().await;
        items.push(item);
        items.clone()
    }

    async fn count(&self) -> usize {
        self.items.read().await.len()
    }
}
