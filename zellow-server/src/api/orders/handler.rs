//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::error::AppResult;
use shared::order::{CommandRequest, Order};

use crate::auth::{CurrentUser, StaffUser};
use crate::core::ServerState;
use crate::orders::OrderFilter;
use crate::utils::validation::{MAX_NOTE_LEN, validate_required_text};

/// Staff list with optional status / driver filter
pub async fn list(
    State(state): State<ServerState>,
    StaffUser(_user): StaffUser,
    Query(filter): Query<OrderFilter>,
) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(state.lifecycle.list_orders(&filter)?))
}

pub async fn mine(State(state): State<ServerState>, user: CurrentUser) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(state.lifecycle.list_for_customer(&user.id)?))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.lifecycle.get_order(&user, &id)?))
}

/// Run a lifecycle command; roles are checked per command
pub async fn command(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<CommandRequest>,
) -> AppResult<Json<Order>> {
    if let Some(notes) = payload.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        validate_required_text(notes, "notes", MAX_NOTE_LEN)?;
    }
    Ok(Json(state.lifecycle.execute(&user, &id, payload)?))
}
