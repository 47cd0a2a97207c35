//! Checkout assembly
//!
//! Step selections are kept in a per-customer draft; `confirm` turns the cart
//! and draft into an order in a single write transaction.

mod error;
mod service;

pub use error::CheckoutError;
pub use service::{CheckoutReceipt, CheckoutService, CheckoutView, ConfirmRequest, SetPaymentRequest, SetShippingRequest};
