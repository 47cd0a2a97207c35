use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::CheckoutStep;
use thiserror::Error;

use crate::db::StorageError;

#[derive(Debug, Error)]
pub enum CheckoutError {
    /// A step is missing, or was set before an earlier one
    #[error("Checkout step '{step}' is incomplete")]
    Incomplete { step: CheckoutStep },

    #[error("Shipping method not found: {0}")]
    UnknownShippingMethod(String),

    #[error("Product {0} is no longer available")]
    ProductUnavailable(String),

    #[error("Product {product_id} does not offer customization '{key}'")]
    CustomizationUnavailable { product_id: String, key: String },

    #[error("Not enough stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: String,
        requested: u32,
        available: u32,
    },

    /// The catalog price moved after the cart was priced
    #[error("Price of {product_id} changed from {reviewed} to {current}")]
    PriceChanged {
        product_id: String,
        reviewed: Decimal,
        current: Decimal,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        let message = err.to_string();
        match err {
            CheckoutError::Incomplete {
                step: CheckoutStep::Cart,
            } => AppError::with_message(ErrorCode::CartEmpty, message).with_detail("step", "cart"),
            CheckoutError::Incomplete { step } => AppError::checkout_incomplete(step.as_str()),
            CheckoutError::UnknownShippingMethod(id) => {
                AppError::with_message(ErrorCode::ShippingMethodNotFound, message)
                    .with_detail("shipping_method", id)
            }
            CheckoutError::ProductUnavailable(product_id) => {
                AppError::with_message(ErrorCode::ProductNotFound, message)
                    .with_detail("product_id", product_id)
            }
            CheckoutError::CustomizationUnavailable { product_id, key } => {
                AppError::with_message(ErrorCode::InvalidCustomization, message)
                    .with_detail("product_id", product_id)
                    .with_detail("key", key)
            }
            CheckoutError::InsufficientStock {
                product_id,
                requested,
                available,
            } => AppError::with_message(ErrorCode::InsufficientStock, message)
                .with_detail("product_id", product_id)
                .with_detail("requested", requested)
                .with_detail("available", available),
            CheckoutError::PriceChanged {
                product_id,
                reviewed,
                current,
            } => AppError::with_message(ErrorCode::PriceChanged, message)
                .with_detail("product_id", product_id)
                .with_detail("reviewed", reviewed.to_string())
                .with_detail("current", current.to_string()),
            CheckoutError::Storage(e) => e.into(),
        }
    }
}
