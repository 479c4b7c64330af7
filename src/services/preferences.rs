//! Preference engine: the taste-profile state machine
//!
//! Profiles live in the memory store as one document per user, encoded the
//! same way products are (summary text + sentinel entities + brand topics).
//! Reads degrade to a default profile; writes return explicit results.

use std::sync::Arc;

use crate::models::{NotificationFrequency, TasteProfile, Verdict};
use crate::services::memory_client::{
    MemoryClient, MemoryError, MemoryRecord, ScoredMemory, USER_ID_PREFIX,
};

/// Owns reading, mutating, and persisting per-user taste profiles.
pub struct PreferenceEngine {
    memory: Arc<MemoryClient>,
}

impl PreferenceEngine {
    pub fn new(memory: Arc<MemoryClient>) -> Self {
        Self { memory }
    }

    /// Load the user's profile, or a default profile when the user is
    /// unknown or the store is unreachable. Never an error.
    pub async fn get_profile(&self, email: &str) -> TasteProfile {
        let query = format!("user preferences email {}", email);
        let memories = self.memory.search_or_empty(&query, Some(email), 10).await;

        let record_id = format!("{}{}", USER_ID_PREFIX, email);
        memories
            .iter()
            .find(|m| m.id == record_id)
            .map(|m| profile_from_memory(email, m))
            .unwrap_or_else(|| TasteProfile::new(email))
    }

    /// Persist a profile document.
    pub async fn store_profile(&self, profile: &TasteProfile) -> Result<(), MemoryError> {
        let record = profile_record(profile);
        self.memory.upsert(std::slice::from_ref(&record)).await?;
        tracing::debug!(email = %profile.email, "Stored taste profile");
        Ok(())
    }

    /// Fold one feedback event into the user's profile and persist it.
    ///
    /// Read-modify-write at whole-document granularity, last write wins.
    /// Two concurrent submissions for the same user can race; feedback is
    /// advisory, so the race is accepted rather than serialized.
    pub async fn apply_feedback(
        &self,
        email: &str,
        product_id: &str,
        verdict: Verdict,
    ) -> Result<(), MemoryError> {
        let mut profile = self.get_profile(email).await;
        profile.apply_feedback(product_id, verdict);
        self.store_profile(&profile).await?;

        tracing::info!(email = %email, product_id = %product_id, verdict = ?verdict, "Recorded feedback");
        Ok(())
    }
}

/// Encode a profile into its store document.
pub fn profile_record(profile: &TasteProfile) -> MemoryRecord {
    let text = format!(
        "User preferences for {}. Notification frequency: {}. Preferred brands: {}",
        profile.email,
        profile.notification_frequency,
        profile.preferred_brands.join(", "),
    );

    MemoryRecord {
        id: format!("{}{}", USER_ID_PREFIX, profile.email),
        text,
        user_id: profile.email.clone(),
        memory_type: "semantic".to_string(),
        topics: Some(profile.preferred_brands.clone()),
        entities: vec![
            format!("notification_frequency:{}", profile.notification_frequency),
            format!("liked_count:{}", profile.liked_product_ids.len()),
            format!("disliked_count:{}", profile.disliked_product_ids.len()),
            // Product ids are hex hashes, so a comma join is unambiguous
            format!("liked:{}", profile.liked_product_ids.join(",")),
            format!("disliked:{}", profile.disliked_product_ids.join(",")),
        ],
    }
}

/// Decode a profile document back into a profile.
pub fn profile_from_memory(email: &str, memory: &ScoredMemory) -> TasteProfile {
    let mut profile = TasteProfile::new(email);
    profile.preferred_brands = memory.topics.clone().unwrap_or_default();

    for entity in &memory.entities {
        if let Some((key, value)) = entity.split_once(':') {
            match key {
                "notification_frequency" => {
                    if let Ok(frequency) = value.parse::<NotificationFrequency>() {
                        profile.notification_frequency = frequency;
                    }
                }
                "liked" => profile.liked_product_ids = split_ids(value),
                "disliked" => profile.disliked_product_ids = split_ids(value),
                _ => {}
            }
        }
    }

    profile
}

fn split_ids(value: &str) -> Vec<String> {
    value
        .split(',')
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}
