//! Utilities
//!
//! - [`AppError`] and friends, re-exported from `shared::error`
//! - logger setup
//! - payload validation

pub mod logger;
pub mod validation;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
