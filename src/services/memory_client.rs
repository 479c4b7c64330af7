//! Semantic memory store client
//!
//! Talks to the agent memory server over HTTP. Every call site returns an
//! explicit `Result<_, MemoryError>`; the `*_or_empty` / counting adapters
//! at the bottom are the one place where transport failure degrades to an
//! empty or zero result for callers, matching the service-wide policy that
//! read/write paths never surface hard failures.
//!
//! Wire contract: records carry structured fields as `key:value` sentinel
//! strings in `entities`, brand tags in `topics`, and free text in `text`.
//! `decode_product` inverts that encoding exactly.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::models::Product;
use crate::utils::text;

const SEARCH_PATH: &str = "/v1/long-term-memory/search";
const UPSERT_PATH: &str = "/v1/long-term-memory/";

/// The store rejects larger search limits.
const STORE_MAX_LIMIT: usize = 100;

/// Writes are chunked; items within a chunk are dispatched concurrently.
const UPSERT_CHUNK_SIZE: usize = 10;

/// Prefix distinguishing product memories from user-preference memories.
pub const PRODUCT_ID_PREFIX: &str = "product_";
pub const USER_ID_PREFIX: &str = "user_";

/// Generic query used when matching a user with no accumulated signal.
pub const GENERIC_FASHION_QUERY: &str = "fashion clothing products";

/// Query used for the recent-products listing.
pub const RECENT_PRODUCTS_QUERY: &str = "fashion clothing products new releases";

/// Memory store client errors
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Store error {0}: {1}")]
    Api(u16, String),
}

/// One record as the store accepts it on upsert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryRecord {
    pub id: String,
    pub text: String,
    pub user_id: String,
    pub memory_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<String>>,
    pub entities: Vec<String>,
}

/// One scored record as the store returns it from search.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoredMemory {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub topics: Option<Vec<String>>,
    #[serde(default)]
    pub entities: Vec<String>,
    #[serde(default)]
    pub score: Option<f32>,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    text: &'a str,
    user_id: EqFilter<'a>,
    limit: usize,
}

#[derive(Serialize)]
struct EqFilter<'a> {
    eq: &'a str,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    memories: Vec<ScoredMemory>,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    memories: &'a [MemoryRecord],
    deduplicate: bool,
}

/// Client for the agent memory server.
pub struct MemoryClient {
    http: reqwest::Client,
    base_url: String,
    /// Namespace user id under which product memories are stored.
    user_id: String,
}

impl MemoryClient {
    pub fn new(base_url: &str, user_id: &str) -> Result<Self, MemoryError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            user_id: user_id.to_string(),
        })
    }

    /// Semantic search. The limit is clamped to the store's maximum; the
    /// user filter defaults to the product namespace.
    pub async fn search(
        &self,
        query: &str,
        user_filter: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ScoredMemory>, MemoryError> {
        let request = SearchRequest {
            text: query,
            user_id: EqFilter {
                eq: user_filter.unwrap_or(&self.user_id),
            },
            limit: limit.min(STORE_MAX_LIMIT),
        };

        let url = format!("{}{}", self.base_url, SEARCH_PATH);
        let response = self.http.post(&url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MemoryError::Api(status.as_u16(), body));
        }

        let parsed: SearchResponse = response.json().await?;
        Ok(parsed.memories)
    }

    /// Upsert records with store-side dedup by id.
    pub async fn upsert(&self, records: &[MemoryRecord]) -> Result<(), MemoryError> {
        let request = UpsertRequest {
            memories: records,
            deduplicate: true,
        };

        let url = format!("{}{}", self.base_url, UPSERT_PATH);
        let response = self.http.post(&url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MemoryError::Api(status.as_u16(), body));
        }

        Ok(())
    }

    async fn store_product(&self, product: &Product) -> Result<(), MemoryError> {
        let record = product_record(product, &self.user_id);
        self.upsert(std::slice::from_ref(&record)).await
    }

    // ------------------------------------------------------------------
    // Degrading adapters: transport failure maps to empty/zero here, and
    // only here. Callers treat empty as "no result or failure".
    // ------------------------------------------------------------------

    /// Search, mapping any failure to an empty result.
    pub async fn search_or_empty(
        &self,
        query: &str,
        user_filter: Option<&str>,
        limit: usize,
    ) -> Vec<ScoredMemory> {
        match self.search(query, user_filter, limit).await {
            Ok(memories) => memories,
            Err(e) => {
                tracing::warn!(error = %e, query = %query, "Memory search failed, returning empty");
                Vec::new()
            }
        }
    }

    /// Store a batch of products and return how many were stored.
    ///
    /// Chunked at [`UPSERT_CHUNK_SIZE`]; items within a chunk are written
    /// concurrently and awaited together, chunks run sequentially. A failing
    /// item is counted out, never escalated, so unrelated items still land.
    pub async fn store_products(&self, products: &[Product]) -> usize {
        if products.is_empty() {
            return 0;
        }

        let mut stored = 0;
        for chunk in products.chunks(UPSERT_CHUNK_SIZE) {
            let writes = chunk.iter().map(|product| self.store_product(product));
            let results = futures::future::join_all(writes).await;

            for (product, result) in chunk.iter().zip(results) {
                match result {
                    Ok(()) => stored += 1,
                    Err(e) => {
                        tracing::warn!(product_id = %product.id, error = %e, "Failed to store product");
                    }
                }
            }
        }

        stored
    }

    /// Recent products via a generic fashion query, decoded from product
    /// memories. Failure degrades to empty.
    pub async fn recent_products(&self, limit: usize) -> Vec<Product> {
        self.search_or_empty(RECENT_PRODUCTS_QUERY, None, limit)
            .await
            .iter()
            .filter_map(decode_product)
            .collect()
    }
}

/// Encode a product into the store's record format.
pub fn product_record(product: &Product, user_id: &str) -> MemoryRecord {
    let mut text_parts = Vec::new();
    if !product.name.is_empty() {
        text_parts.push(product.name.as_str());
    }
    if !product.description.is_empty() {
        text_parts.push(product.description.as_str());
    }
    let text = if text_parts.is_empty() {
        "Product".to_string()
    } else {
        text_parts.join(" ")
    };

    MemoryRecord {
        id: format!("{}{}", PRODUCT_ID_PREFIX, product.id),
        text,
        user_id: user_id.to_string(),
        memory_type: "semantic".to_string(),
        topics: if product.brand.is_empty() {
            None
        } else {
            Some(vec![product.brand.clone()])
        },
        entities: vec![
            format!("product_id:{}", product.id),
            format!("image_url:{}", product.image_url),
            format!("product_url:{}", product.product_url),
            format!("brand:{}", product.brand),
        ],
    }
}

/// Decode a product memory back into a product. Returns `None` for records
/// outside the product namespace.
pub fn decode_product(memory: &ScoredMemory) -> Option<Product> {
    let product_id = memory.id.strip_prefix(PRODUCT_ID_PREFIX)?;

    let mut image_url = String::new();
    let mut product_url = String::new();
    let mut brand = "unknown".to_string();

    for entity in &memory.entities {
        if let Some((key, value)) = entity.split_once(':') {
            match key {
                "image_url" => image_url = value.to_string(),
                "product_url" => product_url = value.to_string(),
                "brand" => brand = value.to_string(),
                _ => {}
            }
        }
    }

    let description = text::restore_stored_text(&memory.text);
    let name = text::display_name(&description);

    Some(Product {
        id: product_id.to_string(),
        name,
        description,
        brand,
        image_url,
        product_url,
        published_at: None,
        source_feed: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_product() -> Product {
        Product {
            id: "abc123".to_string(),
            name: "Air Max 2024".to_string(),
            description: "Bold and breathable runners.".to_string(),
            brand: "Nike".to_string(),
            image_url: "https://cdn.x.com/a.jpg".to_string(),
            product_url: "https://x.com/a".to_string(),
            published_at: None,
            source_feed: Some("https://feeds.x.com".to_string()),
        }
    }

    #[test]
    fn encode_decode_round_trip_recovers_structured_fields() {
        let record = product_record(&sample_product(), "fitradar");
        let memory = ScoredMemory {
            id: record.id.clone(),
            text: record.text.clone(),
            topics: record.topics.clone(),
            entities: record.entities.clone(),
            score: Some(0.9),
        };

        let decoded = decode_product(&memory).expect("product memory");
        assert_eq!(decoded.id, "abc123");
        assert_eq!(decoded.brand, "Nike");
        assert_eq!(decoded.image_url, "https://cdn.x.com/a.jpg");
        assert_eq!(decoded.product_url, "https://x.com/a");
    }

    #[test]
    fn entity_values_may_contain_colons() {
        // URLs embed colons; only the first one separates key from value
        let memory = ScoredMemory {
            id: "product_x".to_string(),
            text: String::new(),
            topics: None,
            entities: vec!["product_url:https://x.com/a?b=1".to_string()],
            score: None,
        };
        let decoded = decode_product(&memory).unwrap();
        assert_eq!(decoded.product_url, "https://x.com/a?b=1");
    }

    #[test]
    fn non_product_memories_are_skipped() {
        let memory = ScoredMemory {
            id: "user_someone@example.com".to_string(),
            text: "User preferences".to_string(),
            topics: None,
            entities: Vec::new(),
            score: None,
        };
        assert!(decode_product(&memory).is_none());
    }

    #[test]
    fn decoded_name_comes_from_restored_text() {
        let memory = ScoredMemory {
            id: "product_x".to_string(),
            text: "New SneakersIn Stores. More detail follows.".to_string(),
            topics: None,
            entities: Vec::new(),
            score: None,
        };
        let decoded = decode_product(&memory).unwrap();
        assert_eq!(decoded.name, "New Sneakers In Stores");
        assert_eq!(decoded.description, "New Sneakers In Stores. More detail follows.");
        assert_eq!(decoded.brand, "unknown");
    }

    #[test]
    fn listing_query_targets_new_releases() {
        assert_eq!(RECENT_PRODUCTS_QUERY, "fashion clothing products new releases");
        assert_eq!(GENERIC_FASHION_QUERY, "fashion clothing products");
    }

    #[test]
    fn empty_product_text_falls_back_to_placeholder() {
        let mut product = sample_product();
        product.name.clear();
        product.description.clear();
        let record = product_record(&product, "fitradar");
        assert_eq!(record.text, "Product");
    }
}
