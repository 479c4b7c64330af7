//! Product listing and match models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A product listing discovered from a feed.
///
/// Immutable once created by the feed reader. `id` is a pure function of the
/// entry's canonical link (or title when no link exists), so re-fetching the
/// same entry always yields the same id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub brand: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub product_url: String,
    /// Publish time from the feed, or discovery time when the feed omits it.
    /// Absent for products reconstructed from the memory store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_feed: Option<String>,
}

impl Product {
    /// Derive the stable product id from the canonical source locator.
    pub fn derive_id(unique: &str) -> String {
        format!("{:x}", Sha256::digest(unique.as_bytes()))
    }
}

/// A product scored against a user's taste query. Computed per request,
/// never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(flatten)]
    pub product: Product,
    /// Similarity score reported by the memory store, 0.0 when absent.
    pub similarity_score: f32,
}

/// Point-in-time snapshot of the polling scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollStatus {
    pub is_running: bool,
    pub last_poll_time: Option<DateTime<Utc>>,
    pub processed_products_count: usize,
    pub polling_interval_seconds: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_id_is_deterministic() {
        let a = Product::derive_id("https://x.com/a");
        let b = Product::derive_id("https://x.com/a");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, Product::derive_id("https://x.com/b"));
    }
}
