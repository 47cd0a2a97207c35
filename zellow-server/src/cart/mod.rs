//! Cart aggregation
//!
//! - [`CartRepository`] - load/save of whole carts
//! - [`CartService`] - catalog-backed cart mutations

mod repository;
mod service;

pub use repository::{CartRepository, RedbCartRepository};
pub use service::{AddLineRequest, CartMutation, CartService, CartView, SetQuantityRequest};
