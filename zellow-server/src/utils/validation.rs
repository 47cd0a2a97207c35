//! Payload validation
//!
//! Request bodies derive `validator::Validate`; handlers call [`validate`]
//! before touching storage.

use shared::error::{AppError, AppResult};
use validator::{Validate, ValidationErrors};

/// Run the derived validation rules and map failures to a 400
pub fn validate<T: Validate>(payload: &T) -> AppResult<()> {
    payload.validate().map_err(validation_error)
}

/// Failing field names go to the message and the details
pub fn validation_error(errors: ValidationErrors) -> AppError {
    let mut fields: Vec<String> = errors.errors().keys().map(|k| k.to_string()).collect();
    fields.sort();

    AppError::validation(format!("Invalid fields: {}", fields.join(", ")))
        .with_detail("fields", fields)
}

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Notes on lifecycle commands and workflow decisions
pub const MAX_NOTE_LEN: usize = 500;
