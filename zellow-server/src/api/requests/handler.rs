//! Request workflow API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::AppResult;
use shared::request::{
    ApprovalRequest, BulkOrderRequest, DecisionNote, FeedbackMessage, FeedbackThread,
    NewApprovalRequest, NewBulkOrderRequest, NewFeedbackMessage, NewFeedbackThread,
    NewStockRequest, StockRequest,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::requests::{FeedbackThreadView, StockAction};

/// Decision bodies are optional
fn note(payload: Option<Json<DecisionNote>>) -> DecisionNote {
    payload.map(|Json(n)| n).unwrap_or_default()
}

// ==================== Approvals ====================

pub async fn list_approvals(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<ApprovalRequest>>> {
    Ok(Json(state.requests.list_approvals(&user)?))
}

pub async fn create_approval(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<NewApprovalRequest>,
) -> AppResult<Json<ApprovalRequest>> {
    Ok(Json(state.requests.create_approval(&user, payload)?))
}

pub async fn get_approval(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApprovalRequest>> {
    Ok(Json(state.requests.get_approval(&user, &id)?))
}

pub async fn approve_approval(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    payload: Option<Json<DecisionNote>>,
) -> AppResult<Json<ApprovalRequest>> {
    Ok(Json(state.requests.decide_approval(&user, &id, true, note(payload))?))
}

pub async fn reject_approval(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    payload: Option<Json<DecisionNote>>,
) -> AppResult<Json<ApprovalRequest>> {
    Ok(Json(state.requests.decide_approval(&user, &id, false, note(payload))?))
}

// ==================== Bulk orders ====================

pub async fn list_bulk_orders(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<BulkOrderRequest>>> {
    Ok(Json(state.requests.list_bulk_orders(&user)?))
}

pub async fn create_bulk_order(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<NewBulkOrderRequest>,
) -> AppResult<Json<BulkOrderRequest>> {
    Ok(Json(state.requests.create_bulk_order(&user, payload)?))
}

pub async fn get_bulk_order(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<BulkOrderRequest>> {
    Ok(Json(state.requests.get_bulk_order(&user, &id)?))
}

pub async fn approve_bulk_order(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    payload: Option<Json<DecisionNote>>,
) -> AppResult<Json<BulkOrderRequest>> {
    Ok(Json(state.requests.decide_bulk_order(&user, &id, true, note(payload))?))
}

pub async fn reject_bulk_order(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    payload: Option<Json<DecisionNote>>,
) -> AppResult<Json<BulkOrderRequest>> {
    Ok(Json(state.requests.decide_bulk_order(&user, &id, false, note(payload))?))
}

// ==================== Stock requests ====================

pub async fn list_stock_requests(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<StockRequest>>> {
    Ok(Json(state.requests.list_stock_requests(&user)?))
}

pub async fn create_stock_request(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<NewStockRequest>,
) -> AppResult<Json<StockRequest>> {
    Ok(Json(state.requests.create_stock_request(&user, payload)?))
}

pub async fn get_stock_request(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<StockRequest>> {
    Ok(Json(state.requests.get_stock_request(&user, &id)?))
}

async fn act_on_stock(
    state: ServerState,
    user: CurrentUser,
    id: String,
    action: StockAction,
    payload: Option<Json<DecisionNote>>,
) -> AppResult<Json<StockRequest>> {
    Ok(Json(state.requests.act_on_stock_request(&user, &id, action, note(payload))?))
}

pub async fn approve_stock_request(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    payload: Option<Json<DecisionNote>>,
) -> AppResult<Json<StockRequest>> {
    act_on_stock(state, user, id, StockAction::Approve, payload).await
}

pub async fn reject_stock_request(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    payload: Option<Json<DecisionNote>>,
) -> AppResult<Json<StockRequest>> {
    act_on_stock(state, user, id, StockAction::Reject, payload).await
}

pub async fn fulfil_stock_request(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    payload: Option<Json<DecisionNote>>,
) -> AppResult<Json<StockRequest>> {
    act_on_stock(state, user, id, StockAction::Fulfil, payload).await
}

// ==================== Feedback ====================

pub async fn list_threads(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<FeedbackThread>>> {
    Ok(Json(state.requests.list_threads(&user)?))
}

pub async fn open_thread(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<NewFeedbackThread>,
) -> AppResult<Json<FeedbackThreadView>> {
    Ok(Json(state.requests.open_thread(&user, payload)?))
}

pub async fn get_thread(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<FeedbackThreadView>> {
    Ok(Json(state.requests.get_thread(&user, &id)?))
}

pub async fn post_message(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<NewFeedbackMessage>,
) -> AppResult<Json<FeedbackMessage>> {
    Ok(Json(state.requests.post_message(&user, &id, payload)?))
}

pub async fn close_thread(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    payload: Option<Json<DecisionNote>>,
) -> AppResult<Json<FeedbackThread>> {
    Ok(Json(state.requests.close_thread(&user, &id, note(payload))?))
}
