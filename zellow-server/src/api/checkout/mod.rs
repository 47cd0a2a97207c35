//! Checkout API
//!
//! Steps must be completed in order: address, payment, shipping, then confirm.

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/checkout", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::view))
        .route("/address", put(handler::set_address))
        .route("/payment", put(handler::set_payment))
        .route("/shipping", put(handler::set_shipping))
        .route("/confirm", post(handler::confirm))
}
