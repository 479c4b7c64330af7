//! Process-lifetime ingestion dedup set
//!
//! Tracks product ids already pushed to the memory store so a polling cycle
//! does not repeat writes for items it has already seen. Not persisted: a
//! restart re-admits every id for one cycle, which the store's idempotent
//! upsert absorbs. The store, not this set, is the correctness boundary.

use std::collections::HashSet;
use tokio::sync::RwLock;

use crate::models::Product;

/// Seen-product ids for the lifetime of this process.
#[derive(Default)]
pub struct SeenProducts {
    ids: RwLock<HashSet<String>>,
}

impl SeenProducts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the subset of `products` not previously marked seen,
    /// preserving input order.
    pub async fn filter_new(&self, products: &[Product]) -> Vec<Product> {
        let ids = self.ids.read().await;
        products
            .iter()
            .filter(|p| !ids.contains(&p.id))
            .cloned()
            .collect()
    }

    /// Record `products` as seen.
    pub async fn mark_seen(&self, products: &[Product]) {
        let mut ids = self.ids.write().await;
        for product in products {
            ids.insert(product.id.clone());
        }
    }

    /// Number of distinct ids seen so far.
    pub async fn len(&self) -> usize {
        self.ids.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.ids.read().await.is_empty()
    }
}
