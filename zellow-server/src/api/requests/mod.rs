//! Staff request workflow API
//!
//! | Prefix | Create | Decide |
//! |--------|--------|--------|
//! | /api/approvals | staff | admin, finance |
//! | /api/bulk-orders | any user | admin, finance |
//! | /api/stock-requests | staff | finance approves, supplier fulfils |
//! | /api/feedback | customer | staff replies, either side closes |
//!
//! Role checks live in the request service.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .nest("/api/approvals", approvals())
        .nest("/api/bulk-orders", bulk_orders())
        .nest("/api/stock-requests", stock_requests())
        .nest("/api/feedback", feedback())
}

fn approvals() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list_approvals).post(handler::create_approval))
        .route("/{id}", get(handler::get_approval))
        .route("/{id}/approve", post(handler::approve_approval))
        .route("/{id}/reject", post(handler::reject_approval))
}

fn bulk_orders() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list_bulk_orders).post(handler::create_bulk_order))
        .route("/{id}", get(handler::get_bulk_order))
        .route("/{id}/approve", post(handler::approve_bulk_order))
        .route("/{id}/reject", post(handler::reject_bulk_order))
}

fn stock_requests() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list_stock_requests).post(handler::create_stock_request))
        .route("/{id}", get(handler::get_stock_request))
        .route("/{id}/approve", post(handler::approve_stock_request))
        .route("/{id}/reject", post(handler::reject_stock_request))
        .route("/{id}/fulfil", post(handler::fulfil_stock_request))
}

fn feedback() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list_threads).post(handler::open_thread))
        .route("/{id}", get(handler::get_thread))
        .route("/{id}/messages", post(handler::post_message))
        .route("/{id}/close", post(handler::close_thread))
}
