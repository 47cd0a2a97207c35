//! Cart API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::AppResult;

use crate::auth::CurrentUser;
use crate::cart::{AddLineRequest, CartMutation, CartView, SetQuantityRequest};
use crate::core::ServerState;
use crate::utils::validation::validate;

pub async fn get(State(state): State<ServerState>, user: CurrentUser) -> AppResult<Json<CartView>> {
    Ok(Json(state.carts.get(&user.id)?))
}

pub async fn add_line(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<AddLineRequest>,
) -> AppResult<Json<CartMutation>> {
    validate(&payload)?;
    Ok(Json(state.carts.add_line(&user.id, payload)?))
}

pub async fn set_quantity(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(key): Path<String>,
    Json(payload): Json<SetQuantityRequest>,
) -> AppResult<Json<CartMutation>> {
    Ok(Json(state.carts.set_quantity(&user.id, &key, payload.quantity)?))
}

pub async fn remove_line(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(key): Path<String>,
) -> AppResult<Json<CartView>> {
    Ok(Json(state.carts.remove_line(&user.id, &key)?))
}

pub async fn clear(State(state): State<ServerState>, user: CurrentUser) -> AppResult<Json<CartView>> {
    Ok(Json(state.carts.clear(&user.id)?))
}
