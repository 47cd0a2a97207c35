//! Persistence
//!
//! - [`Storage`] - redb database with JSON tables
//! - [`ProductRepository`] - catalog reads and writes

pub mod products;
pub mod storage;

pub use products::ProductRepository;
pub use storage::{Storage, StorageError, StorageResult};

use shared::error::AppError;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        tracing::error!(target: "database", error = %err, "Storage operation failed");
        AppError::database(err.to_string())
    }
}
