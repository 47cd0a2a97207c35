//! Unified error codes for the Zellow storefront
//!
//! This module defines all error codes used by the server and its clients.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Cart and checkout errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Product errors
//! - 7xxx: Notification errors
//! - 8xxx: Request workflow errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Specific role required
    RoleRequired = 2002,

    // ==================== 3xxx: Cart / Checkout ====================
    /// Cart is empty
    CartEmpty = 3001,
    /// Cart line not found
    CartLineNotFound = 3002,
    /// Quantity is not valid
    InvalidQuantity = 3003,
    /// A checkout step is incomplete
    CheckoutIncomplete = 3101,
    /// Unknown shipping method
    ShippingMethodNotFound = 3102,
    /// A product price changed after the cart was priced
    PriceChanged = 3103,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Transition not allowed from the current status
    InvalidTransition = 4002,
    /// Order is in a terminal status
    OrderTerminal = 4003,
    /// Order is not assigned to the acting driver
    OrderNotAssigned = 4004,

    // ==================== 5xxx: Payment ====================
    /// Payment status change not allowed
    PaymentStatusInvalid = 5001,
    /// Payment has already been refunded
    PaymentAlreadyRefunded = 5004,

    // ==================== 6xxx: Product ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Product price is invalid
    ProductInvalidPrice = 6002,
    /// Product is out of stock
    ProductOutOfStock = 6003,
    /// Not enough stock to fulfil the request
    InsufficientStock = 6004,
    /// Customization key is not offered by the product
    InvalidCustomization = 6005,

    // ==================== 7xxx: Notification ====================
    /// Push subscription not found
    PushSubscriptionNotFound = 7101,

    // ==================== 8xxx: Request workflows ====================
    /// Request record not found
    RequestNotFound = 8001,
    /// Request status change not allowed
    RequestTransitionInvalid = 8002,
    /// Feedback thread is closed
    ThreadClosed = 8101,

    // ==================== 9xxx: System ====================
    /// Database error
    DatabaseError = 9002,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the default message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RoleRequired => "Specific role is required",

            // Cart / Checkout
            ErrorCode::CartEmpty => "Cart is empty",
            ErrorCode::CartLineNotFound => "Cart line not found",
            ErrorCode::InvalidQuantity => "Quantity is not valid",
            ErrorCode::CheckoutIncomplete => "Checkout step is incomplete",
            ErrorCode::ShippingMethodNotFound => "Shipping method not found",
            ErrorCode::PriceChanged => "Prices changed since the cart was reviewed",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::InvalidTransition => "Status transition is not allowed",
            ErrorCode::OrderTerminal => "Order is already closed",
            ErrorCode::OrderNotAssigned => "Order is not assigned to you",

            // Payment
            ErrorCode::PaymentStatusInvalid => "Payment status change is not allowed",
            ErrorCode::PaymentAlreadyRefunded => "Payment has already been refunded",

            // Product
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::ProductInvalidPrice => "Product price is invalid",
            ErrorCode::ProductOutOfStock => "Product is out of stock",
            ErrorCode::InsufficientStock => "Not enough stock available",
            ErrorCode::InvalidCustomization => "Customization is not offered for this product",

            // Notification
            ErrorCode::PushSubscriptionNotFound => "Push subscription not found",

            // Request workflows
            ErrorCode::RequestNotFound => "Request not found",
            ErrorCode::RequestTransitionInvalid => "Request status change is not allowed",
            ErrorCode::ThreadClosed => "Feedback thread is closed",

            // System
            ErrorCode::DatabaseError => "Database error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an unknown u16 into an [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => ErrorCode::Success,
            2 => ErrorCode::ValidationFailed,
            3 => ErrorCode::NotFound,

            1001 => ErrorCode::NotAuthenticated,
            1003 => ErrorCode::TokenExpired,
            1004 => ErrorCode::TokenInvalid,

            2001 => ErrorCode::PermissionDenied,
            2002 => ErrorCode::RoleRequired,

            3001 => ErrorCode::CartEmpty,
            3002 => ErrorCode::CartLineNotFound,
            3003 => ErrorCode::InvalidQuantity,
            3101 => ErrorCode::CheckoutIncomplete,
            3102 => ErrorCode::ShippingMethodNotFound,
            3103 => ErrorCode::PriceChanged,

            4001 => ErrorCode::OrderNotFound,
            4002 => ErrorCode::InvalidTransition,
            4003 => ErrorCode::OrderTerminal,
            4004 => ErrorCode::OrderNotAssigned,

            5001 => ErrorCode::PaymentStatusInvalid,
            5004 => ErrorCode::PaymentAlreadyRefunded,

            6001 => ErrorCode::ProductNotFound,
            6002 => ErrorCode::ProductInvalidPrice,
            6003 => ErrorCode::ProductOutOfStock,
            6004 => ErrorCode::InsufficientStock,
            6005 => ErrorCode::InvalidCustomization,

            7101 => ErrorCode::PushSubscriptionNotFound,

            8001 => ErrorCode::RequestNotFound,
            8002 => ErrorCode::RequestTransitionInvalid,
            8101 => ErrorCode::ThreadClosed,

            9002 => ErrorCode::DatabaseError,

            _ => return Err(InvalidErrorCode(value)),
        };
        Ok(code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}
