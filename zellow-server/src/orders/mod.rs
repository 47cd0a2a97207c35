//! Order lifecycle
//!
//! - [`LifecycleManager`] - role-gated commands, persistence and event broadcast
//! - [`LifecycleError`] - command failures, mapped to [`shared::error::AppError`]

mod error;
mod manager;
mod storage;

pub use error::LifecycleError;
pub use manager::{LifecycleManager, OrderFilter};
