//! Product and match endpoints

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::models::{MatchResult, Product};
use crate::AppState;

fn default_products_limit() -> usize {
    50
}

fn default_matches_limit() -> usize {
    10
}

#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    #[serde(default = "default_products_limit")]
    pub limit: usize,
}

#[derive(Debug, Deserialize)]
pub struct MatchesQuery {
    #[serde(default = "default_matches_limit")]
    pub limit: usize,
}

#[derive(Debug, Serialize)]
pub struct ProductsResponse {
    pub success: bool,
    pub products: Vec<Product>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct MatchesResponse {
    pub success: bool,
    pub matches: Vec<MatchResult>,
    pub count: usize,
}

/// POST /api/fetch-rss
///
/// Manual one-shot fetch across all configured feeds; does not touch the
/// dedup set or the store.
pub async fn fetch_feeds(State(state): State<AppState>) -> Json<ProductsResponse> {
    let products = state.feed_reader.fetch_all(&state.config.feeds).await;
    let count = products.len();
    Json(ProductsResponse {
        success: true,
        products,
        count,
    })
}

/// POST /api/store-products response
#[derive(Debug, Serialize)]
pub struct StoreProductsResponse {
    pub success: bool,
    pub stored: usize,
    pub total: usize,
}

/// POST /api/store-products
pub async fn store_products(
    State(state): State<AppState>,
    Json(products): Json<Vec<Product>>,
) -> Json<StoreProductsResponse> {
    let stored = state.memory.store_products(&products).await;
    Json(StoreProductsResponse {
        success: true,
        stored,
        total: products.len(),
    })
}

/// GET /api/products
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductsQuery>,
) -> Json<ProductsResponse> {
    let products = state.memory.recent_products(query.limit).await;
    let count = products.len();
    Json(ProductsResponse {
        success: true,
        products,
        count,
    })
}

/// GET /api/user/:email/matches and POST /api/match-products/:email
pub async fn user_matches(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Query(query): Query<MatchesQuery>,
) -> Json<MatchesResponse> {
    let matches = state.matcher.match_for_user(&email, query.limit).await;
    let count = matches.len();
    Json(MatchesResponse {
        success: true,
        matches,
        count,
    })
}

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/api/fetch-rss", post(fetch_feeds))
        .route("/api/store-products", post(store_products))
        .route("/api/products", get(list_products))
        .route("/api/user/:email/matches", get(user_matches))
        .route("/api/match-products/:email", post(user_matches))
}
