//! fitradar - fashion release radar service
//!
//! Polls fashion brand feeds for new product listings, deduplicates them,
//! stores them in a semantic memory server, and matches them against
//! per-user taste profiles built from like/dislike feedback.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use crate::config::Config;
pub use crate::error::{ApiError, ApiResult};

use anyhow::Context;
use axum::http::HeaderValue;
use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::services::{
    EmailClient, FeedReader, MatchRanker, MemoryClient, PollingService, PreferenceEngine,
    SeenProducts,
};

/// Application state shared across handlers
///
/// Every component is constructed once at process start and handed out by
/// reference; nothing here is ambient global state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub feed_reader: Arc<FeedReader>,
    pub memory: Arc<MemoryClient>,
    pub preferences: Arc<PreferenceEngine>,
    pub matcher: Arc<MatchRanker>,
    pub poller: Arc<PollingService>,
    pub mailer: Arc<EmailClient>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Wire up all components from configuration.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let feed_reader =
            Arc::new(FeedReader::new().context("Failed to build feed reader")?);
        let memory = Arc::new(
            MemoryClient::new(&config.memory_server_url, &config.memory_user_id)
                .context("Failed to build memory client")?,
        );
        let preferences = Arc::new(PreferenceEngine::new(Arc::clone(&memory)));
        let matcher = Arc::new(MatchRanker::new(
            Arc::clone(&memory),
            Arc::clone(&preferences),
        ));
        let mailer = Arc::new(
            EmailClient::new(
                config.resend_api_key.clone(),
                &config.email_from,
                &config.frontend_url,
            )
            .context("Failed to build email client")?,
        );
        let poller = Arc::new(PollingService::new(
            Arc::clone(&feed_reader),
            Arc::new(SeenProducts::new()),
            Arc::clone(&memory),
            config.feeds.clone(),
            Duration::from_secs(config.poll_interval_seconds),
        ));

        Ok(Self {
            config,
            feed_reader,
            memory,
            preferences,
            matcher,
            poller,
            mailer,
            startup_time: Utc::now(),
        })
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let cors = match HeaderValue::from_str(&state.config.frontend_url) {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(_) => CorsLayer::permissive(),
    };

    Router::new()
        .merge(api::health_routes())
        .merge(api::user_routes())
        .merge(api::product_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
