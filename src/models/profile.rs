//! User taste profile and feedback models

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Most-recent liked product ids kept when a profile is persisted.
pub const MAX_LIKED_IDS: usize = 20;

/// How often the user wants match notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationFrequency {
    Daily,
    #[default]
    Weekly,
    Realtime,
}

impl fmt::Display for NotificationFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NotificationFrequency::Daily => "daily",
            NotificationFrequency::Weekly => "weekly",
            NotificationFrequency::Realtime => "realtime",
        };
        f.write_str(s)
    }
}

impl FromStr for NotificationFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(NotificationFrequency::Daily),
            "weekly" => Ok(NotificationFrequency::Weekly),
            "realtime" => Ok(NotificationFrequency::Realtime),
            other => Err(format!("Unknown notification frequency: {}", other)),
        }
    }
}

/// A binary feedback signal on one product for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Good,
    Bad,
}

impl FromStr for Verdict {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "good" => Ok(Verdict::Good),
            "bad" => Ok(Verdict::Bad),
            other => Err(format!("Feedback must be 'good' or 'bad', got '{}'", other)),
        }
    }
}

/// Per-user preference state.
///
/// A product id appears in at most one of `liked_product_ids` /
/// `disliked_product_ids` at any time; [`TasteProfile::apply_feedback`] is
/// the only mutation path and maintains that invariant. `liked_product_ids`
/// is ordered most-recent-last and capped at [`MAX_LIKED_IDS`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TasteProfile {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub notification_frequency: NotificationFrequency,
    #[serde(default)]
    pub preferred_brands: Vec<String>,
    #[serde(default)]
    pub liked_product_ids: Vec<String>,
    #[serde(default)]
    pub disliked_product_ids: Vec<String>,
}

impl TasteProfile {
    /// Default profile for a user with no stored preferences.
    pub fn new(email: &str) -> Self {
        Self {
            email: email.to_string(),
            notification_frequency: NotificationFrequency::Weekly,
            preferred_brands: Vec::new(),
            liked_product_ids: Vec::new(),
            disliked_product_ids: Vec::new(),
        }
    }

    /// Fold one feedback event into the profile.
    ///
    /// Feedback is a move, not an add: a verdict first removes the id from
    /// the opposite set, then inserts it if absent.
    pub fn apply_feedback(&mut self, product_id: &str, verdict: Verdict) {
        match verdict {
            Verdict::Good => {
                self.disliked_product_ids.retain(|id| id != product_id);
                if !self.liked_product_ids.iter().any(|id| id == product_id) {
                    self.liked_product_ids.push(product_id.to_string());
                }
                // Keep only the most recent likes
                if self.liked_product_ids.len() > MAX_LIKED_IDS {
                    let excess = self.liked_product_ids.len() - MAX_LIKED_IDS;
                    self.liked_product_ids.drain(..excess);
                }
            }
            Verdict::Bad => {
                self.liked_product_ids.retain(|id| id != product_id);
                if !self.disliked_product_ids.iter().any(|id| id == product_id) {
                    self.disliked_product_ids.push(product_id.to_string());
                }
            }
        }
    }

    pub fn dislikes(&self, product_id: &str) -> bool {
        self.disliked_product_ids.iter().any(|id| id == product_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_parsing_rejects_unknown_values() {
        assert_eq!("good".parse::<Verdict>().unwrap(), Verdict::Good);
        assert_eq!("bad".parse::<Verdict>().unwrap(), Verdict::Bad);
        assert!("meh".parse::<Verdict>().is_err());
        assert!("Good".parse::<Verdict>().is_err());
    }

    #[test]
    fn feedback_moves_between_liked_and_disliked() {
        let mut profile = TasteProfile::new("user@example.com");

        profile.apply_feedback("p1", Verdict::Good);
        assert_eq!(profile.liked_product_ids, vec!["p1"]);
        assert!(profile.disliked_product_ids.is_empty());

        profile.apply_feedback("p1", Verdict::Bad);
        assert!(profile.liked_product_ids.is_empty());
        assert_eq!(profile.disliked_product_ids, vec!["p1"]);

        profile.apply_feedback("p1", Verdict::Good);
        assert_eq!(profile.liked_product_ids, vec!["p1"]);
        assert!(profile.disliked_product_ids.is_empty());
    }

    #[test]
    fn repeated_feedback_is_idempotent() {
        let mut profile = TasteProfile::new("user@example.com");
        profile.apply_feedback("p1", Verdict::Good);
        profile.apply_feedback("p1", Verdict::Good);
        assert_eq!(profile.liked_product_ids, vec!["p1"]);

        profile.apply_feedback("p2", Verdict::Bad);
        profile.apply_feedback("p2", Verdict::Bad);
        assert_eq!(profile.disliked_product_ids, vec!["p2"]);
    }

    #[test]
    fn liked_list_is_capped_most_recent_last() {
        let mut profile = TasteProfile::new("user@example.com");
        for i in 0..MAX_LIKED_IDS + 5 {
            profile.apply_feedback(&format!("p{}", i), Verdict::Good);
        }
        assert_eq!(profile.liked_product_ids.len(), MAX_LIKED_IDS);
        // Oldest entries were dropped
        assert_eq!(profile.liked_product_ids[0], "p5");
        assert_eq!(
            profile.liked_product_ids.last().unwrap(),
            &format!("p{}", MAX_LIKED_IDS + 4)
        );
    }
}
