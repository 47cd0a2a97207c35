//! Data models
//!
//! Shared between the server and its clients (via API).
//! Money is `rust_decimal::Decimal`; timestamps are Unix milliseconds.

pub mod cart;
pub mod checkout;
pub mod gift;
pub mod notification;
pub mod product;
pub mod push;
pub mod role;

// Re-exports
pub use cart::*;
pub use checkout::*;
pub use gift::*;
pub use notification::*;
pub use product::*;
pub use push::*;
pub use role::*;
