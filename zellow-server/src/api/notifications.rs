//! Manual notification re-sends (staff)
//!
//! | Path | Method |
//! |------|--------|
//! | /api/notifications/gift/{order_id} | POST |
//! | /api/notifications/delivery/{order_id} | POST |
//! | /api/notifications/receipt/{order_id} | POST |
//!
//! Failed sends still answer 200 with `success: false`.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use shared::error::{AppError, AppResult};
use shared::models::NotificationResult;
use shared::order::Order;

use crate::auth::StaffUser;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/notifications", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/gift/{order_id}", post(send_gift))
        .route("/delivery/{order_id}", post(send_delivery))
        .route("/receipt/{order_id}", post(send_receipt))
}

fn load_order(state: &ServerState, order_id: &str) -> AppResult<Order> {
    state
        .storage
        .get_order(order_id)?
        .ok_or_else(|| AppError::order_not_found(order_id))
}

async fn send_gift(
    State(state): State<ServerState>,
    StaffUser(user): StaffUser,
    Path(order_id): Path<String>,
) -> AppResult<Json<NotificationResult>> {
    let order = load_order(&state, &order_id)?;
    tracing::info!(order_id = %order_id, actor_id = %user.id, "Manual gift notification");
    Ok(Json(state.notifier.send_gift_notification(&order).await))
}

async fn send_delivery(
    State(state): State<ServerState>,
    StaffUser(user): StaffUser,
    Path(order_id): Path<String>,
) -> AppResult<Json<NotificationResult>> {
    let order = load_order(&state, &order_id)?;
    tracing::info!(order_id = %order_id, actor_id = %user.id, "Manual delivery confirmation");
    Ok(Json(state.notifier.send_delivery_confirmation(&order).await))
}

async fn send_receipt(
    State(state): State<ServerState>,
    StaffUser(user): StaffUser,
    Path(order_id): Path<String>,
) -> AppResult<Json<NotificationResult>> {
    let order = load_order(&state, &order_id)?;
    tracing::info!(order_id = %order_id, actor_id = %user.id, "Manual receipt");
    Ok(Json(state.notifier.send_receipt(&order).await))
}
