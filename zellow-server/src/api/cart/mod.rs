//! Cart API
//!
//! Every route acts on the caller's own cart.

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/cart", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::get).delete(handler::clear))
        .route("/lines", post(handler::add_line))
        .route("/lines/{key}", put(handler::set_quantity).delete(handler::remove_line))
}
