use shared::error::{AppError, ErrorCode};
use shared::models::Role;
use shared::order::{OrderStatus, PaymentStatus};
use thiserror::Error;

use crate::db::StorageError;

/// Lifecycle command failures
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Role {role} may not {command}")]
    PermissionDenied { command: &'static str, role: Role },

    #[error("Order {0} is not assigned to this driver")]
    NotAssigned(String),

    #[error("Cannot move from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Cannot change payment from {from} to {to}")]
    InvalidPaymentTransition { from: PaymentStatus, to: PaymentStatus },

    #[error("Order {0} is closed")]
    OrderTerminal(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::OrderNotFound(id) => AppError::order_not_found(id),
            LifecycleError::PermissionDenied { .. } => AppError::permission_denied(err.to_string()),
            LifecycleError::NotAssigned(ref id) => {
                let id = id.clone();
                AppError::with_message(ErrorCode::OrderNotAssigned, err.to_string())
                    .with_detail("order_id", id)
            }
            LifecycleError::InvalidTransition { from, to } => {
                AppError::invalid_transition(from.as_str(), to.as_str())
            }
            LifecycleError::InvalidPaymentTransition { from, to } => {
                let code = if from == PaymentStatus::Refunded {
                    ErrorCode::PaymentAlreadyRefunded
                } else {
                    ErrorCode::PaymentStatusInvalid
                };
                AppError::with_message(code, err.to_string())
                    .with_detail("from", from.as_str())
                    .with_detail("to", to.as_str())
            }
            LifecycleError::OrderTerminal(ref id) => {
                let id = id.clone();
                AppError::with_message(ErrorCode::OrderTerminal, err.to_string())
                    .with_detail("order_id", id)
            }
            LifecycleError::Storage(e) => e.into(),
        }
    }
}
