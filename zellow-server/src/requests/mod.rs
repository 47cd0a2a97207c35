//! Staff request workflows
//!
//! - Approvals: internal sign-off, decided by admin or finance
//! - Bulk orders: enquiries from customers or staff, decided by admin or finance
//! - Stock requests: finance approves, the supplier fulfils (stock goes up)
//! - Feedback: customer threads answered by staff
//!
//! Every status change goes through [`shared::request::Workflow::transition`],
//! so illegal moves are rejected before anything is written.

mod feedback;
mod service;

pub use feedback::FeedbackThreadView;
pub use service::{RequestService, StockAction};
