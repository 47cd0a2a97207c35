//! Generic one-directional status workflow with an audit log

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A status enum with an explicit transition table
pub trait WorkflowStatus: Copy + Eq + fmt::Display + 'static {
    fn allowed_next(&self) -> &'static [Self];

    fn can_transition_to(&self, next: Self) -> bool {
        self.allowed_next().contains(&next)
    }

    fn is_final(&self) -> bool {
        self.allowed_next().is_empty()
    }
}

/// One logged status change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange<S> {
    pub from: S,
    pub to: S,
    pub actor_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("Cannot move from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Thread is closed")]
    ThreadClosed,
}

impl From<WorkflowError> for crate::error::AppError {
    fn from(err: WorkflowError) -> Self {
        use crate::error::{AppError, ErrorCode};
        match err {
            WorkflowError::InvalidTransition { from, to } => AppError::with_message(
                ErrorCode::RequestTransitionInvalid,
                format!("Cannot move from {} to {}", from, to),
            )
            .with_detail("from", from)
            .with_detail("to", to),
            WorkflowError::ThreadClosed => AppError::new(ErrorCode::ThreadClosed),
        }
    }
}

/// A record driven by a [`WorkflowStatus`]
pub trait Workflow {
    type Status: WorkflowStatus;

    fn status(&self) -> Self::Status;
    fn set_status(&mut self, status: Self::Status, timestamp: i64);
    fn status_log_mut(&mut self) -> &mut Vec<StatusChange<Self::Status>>;

    /// Move to `to`, appending the change to the log.
    ///
    /// The record is left untouched on rejection.
    fn transition(
        &mut self,
        to: Self::Status,
        actor_id: &str,
        note: Option<String>,
        timestamp: i64,
    ) -> Result<(), WorkflowError> {
        let from = self.status();
        if !from.can_transition_to(to) {
            return Err(WorkflowError::InvalidTransition {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        self.status_log_mut().push(StatusChange {
            from,
            to,
            actor_id: actor_id.to_string(),
            note,
            timestamp,
        });
        self.set_status(to, timestamp);
        Ok(())
    }
}
