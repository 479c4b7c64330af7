//! Polling scheduler: the recurring fetch → dedup → store cycle
//!
//! One background loop per process. The loop is bound to a cancellation
//! token: `stop` cancels it, an in-flight cycle finishes its current network
//! call, and the token is checked again before the next cycle starts.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::models::PollStatus;
use crate::services::dedup::SeenProducts;
use crate::services::feed_reader::FeedReader;
use crate::services::memory_client::MemoryClient;

pub struct PollingService {
    feed_reader: Arc<FeedReader>,
    dedup: Arc<SeenProducts>,
    memory: Arc<MemoryClient>,
    feed_urls: Vec<String>,
    interval: Duration,
    /// Some while running; cancelled token means stopped.
    token: RwLock<Option<CancellationToken>>,
    last_poll: RwLock<Option<DateTime<Utc>>>,
}

impl PollingService {
    pub fn new(
        feed_reader: Arc<FeedReader>,
        dedup: Arc<SeenProducts>,
        memory: Arc<MemoryClient>,
        feed_urls: Vec<String>,
        interval: Duration,
    ) -> Self {
        Self {
            feed_reader,
            dedup,
            memory,
            feed_urls,
            interval,
            token: RwLock::new(None),
            last_poll: RwLock::new(None),
        }
    }

    /// Start the polling loop. Idempotent: a second call while running is a
    /// logged no-op. The loop is not awaited by the caller; one cycle runs
    /// immediately, then the fixed interval sleep repeats until `stop`.
    pub async fn start(self: Arc<Self>) {
        let mut guard = self.token.write().await;
        if guard.as_ref().is_some_and(|t| !t.is_cancelled()) {
            warn!("Polling service is already running");
            return;
        }

        let token = CancellationToken::new();
        *guard = Some(token.clone());
        drop(guard);

        info!(interval_seconds = self.interval.as_secs(), "Starting feed polling service");

        let service = Arc::clone(&self);
        tokio::spawn(async move {
            service.poll_loop(token).await;
        });
    }

    /// Signal the loop to stop. The current cycle, if one is in flight,
    /// runs to completion; no further cycle starts.
    pub async fn stop(&self) {
        let mut guard = self.token.write().await;
        match guard.take() {
            Some(token) => {
                token.cancel();
                info!("Stopping polling service");
            }
            None => warn!("Polling service is not running"),
        }
    }

    /// Point-in-time status snapshot.
    pub async fn status(&self) -> PollStatus {
        let is_running = self
            .token
            .read()
            .await
            .as_ref()
            .is_some_and(|t| !t.is_cancelled());

        PollStatus {
            is_running,
            last_poll_time: *self.last_poll.read().await,
            processed_products_count: self.dedup.len().await,
            polling_interval_seconds: self.interval.as_secs(),
        }
    }

    async fn poll_loop(&self, token: CancellationToken) {
        loop {
            self.run_cycle().await;
            *self.last_poll.write().await = Some(Utc::now());

            tokio::select! {
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
        info!("Polling loop stopped");
    }

    /// One fetch → dedup → store → mark-seen cycle. Failures inside the
    /// cycle degrade at their own boundaries; the cycle itself never fails.
    async fn run_cycle(&self) {
        info!("Fetching products from feeds");
        let products = self.feed_reader.fetch_all(&self.feed_urls).await;

        let fresh = self.dedup.filter_new(&products).await;
        if fresh.is_empty() {
            info!(total = products.len(), "No new products found");
            return;
        }

        info!(new = fresh.len(), total = products.len(), "Found new products");
        let stored = self.memory.store_products(&fresh).await;
        info!(stored, "Stored products in memory");

        self.dedup.mark_seen(&fresh).await;
    }
}
