//! Browser push subscriptions
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/push/public-key | GET | none |
//! | /api/push/subscribe | POST | user |
//! | /api/push/unsubscribe | POST | user |

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::Serialize;
use shared::error::{ApiResponse, AppError, AppResult, ErrorCode};
use shared::models::{PushSubscription, PushSubscriptionInput, PushUnsubscribe};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::validation::validate;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/push", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/public-key", get(public_key))
        .route("/subscribe", post(subscribe))
        .route("/unsubscribe", post(unsubscribe))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyResponse {
    /// `None` when push is not configured
    public_key: Option<String>,
}

async fn public_key(State(state): State<ServerState>) -> Json<PublicKeyResponse> {
    Json(PublicKeyResponse {
        public_key: state.config.push.as_ref().map(|p| p.public_key.clone()),
    })
}

async fn subscribe(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<PushSubscriptionInput>,
) -> AppResult<Json<PushSubscription>> {
    validate(&payload)?;
    let subscription = state
        .storage
        .save_push_subscription(&user.id, &payload.endpoint, payload.keys)?;
    tracing::info!(user_id = %user.id, "Push subscription saved");
    Ok(Json(subscription))
}

async fn unsubscribe(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<PushUnsubscribe>,
) -> AppResult<ApiResponse<()>> {
    validate(&payload)?;
    if !state.storage.remove_push_subscription(&user.id, &payload.endpoint)? {
        return Err(AppError::new(ErrorCode::PushSubscriptionNotFound));
    }
    tracing::info!(user_id = %user.id, "Push subscription removed");
    Ok(ApiResponse::ok())
}
