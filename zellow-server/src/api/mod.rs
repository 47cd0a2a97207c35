//! API routes
//!
//! - [`health`] - liveness
//! - [`products`] - catalog
//! - [`cart`] - the caller's cart
//! - [`checkout`] - checkout steps and order placement
//! - [`orders`] - order queries, lifecycle commands, event stream
//! - [`track`] - public gift tracking
//! - [`notifications`] - manual notification re-sends
//! - [`push`] - browser push subscriptions
//! - [`requests`] - staff request workflows

pub mod cart;
pub mod checkout;
pub mod health;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod push;
pub mod requests;
pub mod track;

use axum::{Router, middleware};
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;

use crate::core::ServerState;

/// Access log line. Only the path is logged: query strings can carry
/// capability tokens (`/api/track?token=`).
fn access_line(method: &http::Method, uri: &http::Uri, status: http::StatusCode) -> String {
    format!("{} {} {}", method, uri.path(), status)
}

/// HTTP access log
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    tracing::info!(target: "http_access", "{}", access_line(&method, &uri, response.status()));

    response
}

/// Every route, without state
pub fn routes() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(health::router())
        .merge(products::router())
        .merge(cart::router())
        .merge(checkout::router())
        .merge(orders::router())
        .merge(track::router())
        .merge(notifications::router())
        .merge(push::router())
        .merge(requests::router())
}

/// Full application with state and middleware
pub fn build_app(state: ServerState) -> Router {
    let timeout = Duration::from_millis(state.config.request_timeout_ms);
    routes()
        .with_state(state)
        .layer(TimeoutLayer::new(timeout))
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(log_request))
}
