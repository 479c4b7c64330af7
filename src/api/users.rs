//! Subscription, preference, and feedback endpoints

use axum::{
    extract::{Path, Query, State},
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::models::{NotificationFrequency, TasteProfile, Verdict};
use crate::AppState;

/// POST /api/subscribe request
#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
    #[serde(default)]
    pub notification_frequency: NotificationFrequency,
}

/// POST /api/subscribe response
#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    pub success: bool,
    pub email: String,
    pub message: String,
}

/// POST /api/subscribe
///
/// Stores the notification preference and sends a best-effort welcome
/// email; a failed email never fails the subscription.
pub async fn subscribe(
    State(state): State<AppState>,
    Json(request): Json<SubscribeRequest>,
) -> Json<SubscribeResponse> {
    let mut profile = state.preferences.get_profile(&request.email).await;
    profile.notification_frequency = request.notification_frequency;

    let success = match state.preferences.store_profile(&profile).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(email = %request.email, error = %e, "Failed to store subscription");
            false
        }
    };

    if success && !state.mailer.send_welcome(&request.email, request.notification_frequency).await
    {
        tracing::warn!(email = %request.email, "Welcome email not sent, but subscription succeeded");
    }

    Json(SubscribeResponse {
        success,
        email: request.email,
        message: "Subscribed successfully".to_string(),
    })
}

/// GET /api/user/:email/preferences response
#[derive(Debug, Serialize)]
pub struct PreferencesResponse {
    pub success: bool,
    pub preferences: TasteProfile,
}

/// GET /api/user/:email/preferences
pub async fn get_preferences(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Json<PreferencesResponse> {
    let preferences = state.preferences.get_profile(&email).await;
    Json(PreferencesResponse {
        success: true,
        preferences,
    })
}

#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub success: bool,
    pub message: String,
}

/// PUT /api/user/:email/preferences
///
/// Direct preference replacement; the path segment is authoritative for
/// which user the document belongs to.
pub async fn update_preferences(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(mut profile): Json<TasteProfile>,
) -> Json<UpdateResponse> {
    profile.email = email;

    let success = match state.preferences.store_profile(&profile).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(email = %profile.email, error = %e, "Failed to update preferences");
            false
        }
    };

    Json(UpdateResponse {
        success,
        message: "Preferences updated".to_string(),
    })
}

/// POST /api/user/:email/feedback request
#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub product_id: String,
    pub feedback: String,
}

/// POST /api/user/:email/feedback
pub async fn submit_feedback(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(request): Json<FeedbackRequest>,
) -> ApiResult<Json<UpdateResponse>> {
    let verdict: Verdict = request
        .feedback
        .parse()
        .map_err(ApiError::BadRequest)?;

    let success = match state
        .preferences
        .apply_feedback(&email, &request.product_id, verdict)
        .await
    {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(email = %email, error = %e, "Failed to record feedback");
            false
        }
    };

    Ok(Json(UpdateResponse {
        success,
        message: format!("Feedback recorded: {}", request.feedback),
    }))
}

/// GET /api/user/:email/feedback/click query
#[derive(Debug, Deserialize)]
pub struct FeedbackClickQuery {
    pub product_id: String,
    pub feedback: String,
}

/// GET /api/user/:email/feedback/click
///
/// Feedback link target embedded in notification emails; responds with a
/// small thank-you page instead of JSON.
pub async fn feedback_click(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Query(query): Query<FeedbackClickQuery>,
) -> ApiResult<Html<String>> {
    let verdict: Verdict = query.feedback.parse().map_err(ApiError::BadRequest)?;

    state
        .preferences
        .apply_feedback(&email, &query.product_id, verdict)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to record feedback: {}", e)))?;

    Ok(Html(thank_you_html(verdict)))
}

fn thank_you_html(verdict: Verdict) -> String {
    let emoji = match verdict {
        Verdict::Good => "&#128077;",
        Verdict::Bad => "&#128078;",
    };
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Thank You!</title></head>
<body style="font-family: sans-serif; max-width: 600px; margin: 50px auto; text-align: center;">
  <h1 style="font-size: 48px;">{emoji}</h1>
  <h2>Thank You!</h2>
  <p>Your feedback has been recorded. We'll use it to improve your future
  recommendations.</p>
  <p style="font-size: 14px; color: #666;">You can close this window now.</p>
</body>
</html>"#
    )
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/subscribe", post(subscribe))
        .route(
            "/api/user/:email/preferences",
            get(get_preferences).put(update_preferences),
        )
        .route("/api/user/:email/feedback", post(submit_feedback))
        .route("/api/user/:email/feedback/click", get(feedback_click))
}
