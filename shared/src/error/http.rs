//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::CartLineNotFound
            | Self::ShippingMethodNotFound
            | Self::OrderNotFound
            | Self::ProductNotFound
            | Self::PushSubscriptionNotFound
            | Self::RequestNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::InvalidTransition
            | Self::PriceChanged
            | Self::OrderTerminal
            | Self::PaymentStatusInvalid
            | Self::PaymentAlreadyRefunded
            | Self::InsufficientStock
            | Self::ProductOutOfStock
            | Self::RequestTransitionInvalid
            | Self::ThreadClosed => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated | Self::TokenExpired | Self::TokenInvalid => {
                StatusCode::UNAUTHORIZED
            }

            // 403 Forbidden
            Self::PermissionDenied | Self::RoleRequired | Self::OrderNotAssigned => {
                StatusCode::FORBIDDEN
            }

            // 500 Internal Server Error
            Self::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
