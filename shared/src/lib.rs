//! Shared types for the Zellow storefront
//!
//! Domain types used by the server and its clients: catalog, cart and
//! checkout models, the order lifecycle machine, staff request workflows,
//! and the unified error and response structures.

pub mod error;
pub mod models;
pub mod order;
pub mod request;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
