//! Match ranker: personalized product matches from semantic search
//!
//! Ordering is the store's descending-score order; no local re-ranking.

use std::sync::Arc;

use crate::models::{MatchResult, TasteProfile};
use crate::services::memory_client::{
    decode_product, MemoryClient, ScoredMemory, GENERIC_FASHION_QUERY,
};
use crate::services::preferences::PreferenceEngine;

/// Appended to the query when the user has liked products.
const SIMILAR_STYLE_HINT: &str = "similar fashion style";

pub struct MatchRanker {
    memory: Arc<MemoryClient>,
    preferences: Arc<PreferenceEngine>,
}

impl MatchRanker {
    pub fn new(memory: Arc<MemoryClient>, preferences: Arc<PreferenceEngine>) -> Self {
        Self { memory, preferences }
    }

    /// Up to `limit` products matched to the user's taste profile.
    ///
    /// Fetches 2×limit candidates so disliked items can be excluded without
    /// a second round trip; the result may be shorter than `limit` when too
    /// many candidates are excluded or the store returns fewer.
    pub async fn match_for_user(&self, email: &str, limit: usize) -> Vec<MatchResult> {
        let profile = self.preferences.get_profile(email).await;
        let query = build_query(&profile);

        tracing::debug!(email = %email, query = %query, limit, "Matching products to user");

        let candidates = self
            .memory
            .search_or_empty(&query, None, limit.saturating_mul(2))
            .await;
        select_matches(&candidates, &profile, limit)
    }
}

/// Build the semantic query from the profile's signal, falling back to a
/// generic fashion query when there is none.
pub fn build_query(profile: &TasteProfile) -> String {
    let mut terms: Vec<&str> = profile.preferred_brands.iter().map(String::as_str).collect();
    if !profile.liked_product_ids.is_empty() {
        terms.push(SIMILAR_STYLE_HINT);
    }

    if terms.is_empty() {
        GENERIC_FASHION_QUERY.to_string()
    } else {
        terms.join(" ")
    }
}

/// Filter scored candidates down to accepted matches: product memories
/// only, disliked ids excluded, store order preserved, capped at `limit`.
pub fn select_matches(
    candidates: &[ScoredMemory],
    profile: &TasteProfile,
    limit: usize,
) -> Vec<MatchResult> {
    let mut matches = Vec::new();

    for memory in candidates {
        if matches.len() >= limit {
            break;
        }

        let Some(product) = decode_product(memory) else {
            continue;
        };
        if profile.dislikes(&product.id) {
            continue;
        }

        matches.push(MatchResult {
            product,
            similarity_score: memory.score.unwrap_or(0.0),
        });
    }

    matches
}
