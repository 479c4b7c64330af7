//! Domain models shared across services and API handlers

pub mod product;
pub mod profile;

pub use product::{MatchResult, PollStatus, Product};
pub use profile::{NotificationFrequency, TasteProfile, Verdict};
