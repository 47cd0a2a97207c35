//! Public gift tracking
//!
//! `GET /api/track?token=<orderId>` needs no sign-in. Orders that are not
//! trackable gifts answer exactly like unknown ones.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::GiftTrackingView;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/track", get(track))
}

#[derive(Debug, Deserialize)]
pub struct TrackQuery {
    pub token: String,
}

async fn track(
    State(state): State<ServerState>,
    Query(query): Query<TrackQuery>,
) -> AppResult<Json<GiftTrackingView>> {
    let view = state
        .storage
        .get_order(&query.token)?
        .as_ref()
        .and_then(GiftTrackingView::from_order);

    match view {
        Some(view) => Ok(Json(view)),
        None => {
            tracing::debug!("Tracking lookup for unknown or untrackable order");
            Err(AppError::new(ErrorCode::OrderNotFound))
        }
    }
}
