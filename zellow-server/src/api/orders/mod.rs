//! Order API
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/orders | GET | staff |
//! | /api/orders/mine | GET | user |
//! | /api/orders/events | GET (SSE) | staff |
//! | /api/orders/{id} | GET | owner or staff |
//! | /api/orders/{id}/commands | POST | per command |
//!
//! Every state change goes through the lifecycle manager.

mod events;
mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/mine", get(handler::mine))
        .route("/events", get(events::stream))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/commands", post(handler::command))
}
