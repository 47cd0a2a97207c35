//! Checkout API Handlers

use axum::{Json, extract::State};
use shared::error::AppResult;
use shared::models::ShippingAddress;

use crate::auth::CurrentUser;
use crate::checkout::{CheckoutReceipt, CheckoutView, ConfirmRequest, SetPaymentRequest, SetShippingRequest};
use crate::core::ServerState;

pub async fn view(State(state): State<ServerState>, user: CurrentUser) -> AppResult<Json<CheckoutView>> {
    Ok(Json(state.checkout.view(&user.id)?))
}

pub async fn set_address(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<ShippingAddress>,
) -> AppResult<Json<CheckoutView>> {
    Ok(Json(state.checkout.set_address(&user.id, payload)?))
}

pub async fn set_payment(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<SetPaymentRequest>,
) -> AppResult<Json<CheckoutView>> {
    Ok(Json(state.checkout.set_payment(&user.id, payload.payment_method)?))
}

pub async fn set_shipping(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<SetShippingRequest>,
) -> AppResult<Json<CheckoutView>> {
    Ok(Json(state.checkout.set_shipping(&user.id, &payload.shipping_method)?))
}

/// Place the order from the cart and the completed steps
pub async fn confirm(
    State(state): State<ServerState>,
    user: CurrentUser,
    payload: Option<Json<ConfirmRequest>>,
) -> AppResult<Json<CheckoutReceipt>> {
    let request = payload.map(|Json(r)| r).unwrap_or_default();
    Ok(Json(state.checkout.confirm(&user, request).await?))
}
