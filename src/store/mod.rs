//! Protected resource store.
//!
//! Holds the ordered fruit list behind `/api/frutas`.

mod memory;

pub use memory::*;

use async_trait::async_trait;

/// Ordered, append-only collection of items.
///
/// Implementations must serialize access: concurrent appends may land in any
/// order but none may be lost, and `list` never observes a partial write.
#[async_trait]
pub trait FruitStore: Send + Sync {
    /// Snapshot of every item, in insertion order.
    async fn list(&self) -> Vec<String>;

    /// Append `item` to the end and return the updated snapshot.
    async fn append(&self, item: String) -> Vec<String>;

    /// Number of items currently held.
    async fn count(&self) -> usize {
        self.list().await.len()
    }
}
