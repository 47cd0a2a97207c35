//! Authentication and role checks
//!
//! - [`JwtService`] - verifies identity tokens
//! - [`CurrentUser`] - explicit session context, extracted per request
//! - [`StaffUser`] - extractor that rejects customers

pub mod extractor;
pub mod jwt;

pub use extractor::StaffUser;
pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
