//! Staff request workflows
//!
//! Approval, bulk-order, stock and feedback records all follow the same
//! pattern: a status enum with a one-directional transition table and an
//! append-only status log.

pub mod types;
pub mod workflow;

pub use types::*;
pub use workflow::{StatusChange, Workflow, WorkflowError, WorkflowStatus};
