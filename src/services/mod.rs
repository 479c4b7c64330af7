//! Service components for the ingestion-dedup-matching pipeline

pub mod dedup;
pub mod email_client;
pub mod feed_reader;
pub mod matcher;
pub mod memory_client;
pub mod poller;
pub mod preferences;

pub use dedup::SeenProducts;
pub use email_client::{EmailClient, MailError};
pub use feed_reader::{FeedError, FeedReader};
pub use matcher::MatchRanker;
pub use memory_client::{MemoryClient, MemoryError, MemoryRecord, ScoredMemory};
pub use poller::PollingService;
pub use preferences::PreferenceEngine;
