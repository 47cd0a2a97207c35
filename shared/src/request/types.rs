//! Staff request records

use super::workflow::{StatusChange, Workflow, WorkflowStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

// ==================== Statuses ====================

/// Status of approval and bulk-order requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl WorkflowStatus for DecisionStatus {
    fn allowed_next(&self) -> &'static [Self] {
        match self {
            DecisionStatus::Pending => &[DecisionStatus::Approved, DecisionStatus::Rejected],
            DecisionStatus::Approved | DecisionStatus::Rejected => &[],
        }
    }
}

impl fmt::Display for DecisionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DecisionStatus::Pending => "pending",
            DecisionStatus::Approved => "approved",
            DecisionStatus::Rejected => "rejected",
        })
    }
}

/// Procurement status: finance approves, then the supplier fulfils
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockRequestStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Fulfilled,
}

impl WorkflowStatus for StockRequestStatus {
    fn allowed_next(&self) -> &'static [Self] {
        use StockRequestStatus::*;
        match self {
            Pending => &[Approved, Rejected],
            Approved => &[Fulfilled, Rejected],
            Rejected | Fulfilled => &[],
        }
    }
}

impl fmt::Display for StockRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StockRequestStatus::Pending => "pending",
            StockRequestStatus::Approved => "approved",
            StockRequestStatus::Rejected => "rejected",
            StockRequestStatus::Fulfilled => "fulfilled",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackStatus {
    #[default]
    Open,
    Replied,
    Closed,
}

impl WorkflowStatus for FeedbackStatus {
    fn allowed_next(&self) -> &'static [Self] {
        match self {
            FeedbackStatus::Open => &[FeedbackStatus::Replied, FeedbackStatus::Closed],
            FeedbackStatus::Replied => &[FeedbackStatus::Closed],
            FeedbackStatus::Closed => &[],
        }
    }
}

impl fmt::Display for FeedbackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FeedbackStatus::Open => "open",
            FeedbackStatus::Replied => "replied",
            FeedbackStatus::Closed => "closed",
        })
    }
}

// ==================== Records ====================

/// Internal approval (expense, discount, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRequest {
    pub id: String,
    pub requester_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    pub status: DecisionStatus,
    #[serde(default)]
    pub status_log: Vec<StatusChange<DecisionStatus>>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BulkOrderLine {
    #[validate(length(min = 1))]
    pub product_id: String,
    #[validate(range(min = 1))]
    pub quantity: u32,
}

/// Corporate/bulk order enquiry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkOrderRequest {
    pub id: String,
    pub requester_id: String,
    pub contact_name: String,
    pub contact_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    pub items: Vec<BulkOrderLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub status: DecisionStatus,
    #[serde(default)]
    pub status_log: Vec<StatusChange<DecisionStatus>>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Restock request routed through finance to a supplier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRequest {
    pub id: String,
    pub requester_id: String,
    pub product_id: String,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub status: StockRequestStatus,
    #[serde(default)]
    pub status_log: Vec<StatusChange<StockRequestStatus>>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Customer-to-staff conversation; messages are stored separately
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackThread {
    pub id: String,
    pub customer_id: String,
    pub subject: String,
    pub status: FeedbackStatus,
    #[serde(default)]
    pub status_log: Vec<StatusChange<FeedbackStatus>>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackMessage {
    pub id: String,
    pub thread_id: String,
    pub author_id: String,
    pub from_staff: bool,
    pub body: String,
    pub created_at: i64,
}

macro_rules! impl_workflow {
    ($record:ty, $status:ty) => {
        impl Workflow for $record {
            type Status = $status;

            fn status(&self) -> $status {
                self.status
            }

            fn set_status(&mut self, status: $status, timestamp: i64) {
                self.status = status;
                self.updated_at = timestamp;
            }

            fn status_log_mut(&mut self) -> &mut Vec<StatusChange<$status>> {
                &mut self.status_log
            }
        }
    };
}

impl_workflow!(ApprovalRequest, DecisionStatus);
impl_workflow!(BulkOrderRequest, DecisionStatus);
impl_workflow!(StockRequest, StockRequestStatus);
impl_workflow!(FeedbackThread, FeedbackStatus);

// ==================== Payloads ====================

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewApprovalRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: String,
    pub amount: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewBulkOrderRequest {
    #[validate(length(min = 1, max = 120))]
    pub contact_name: String,
    #[validate(email)]
    pub contact_email: String,
    pub organization: Option<String>,
    #[validate(length(min = 1), nested)]
    pub items: Vec<BulkOrderLine>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewStockRequest {
    #[validate(length(min = 1))]
    pub product_id: String,
    #[validate(range(min = 1))]
    pub quantity: u32,
    pub supplier_id: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewFeedbackThread {
    #[validate(length(min = 1, max = 200))]
    pub subject: String,
    #[validate(length(min = 1, max = 5000))]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewFeedbackMessage {
    #[validate(length(min = 1, max = 5000))]
    pub body: String,
}

/// Body of approve/reject/fulfil/close actions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionNote {
    #[serde(default)]
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::super::workflow::WorkflowError;
    use super::*;

    fn stock_request() -> StockRequest {
        StockRequest {
            id: "s1".into(),
            requester_id: "inv-1".into(),
            product_id: "p1".into(),
            quantity: 20,
            supplier_id: Some("sup-1".into()),
            notes: None,
            status: StockRequestStatus::Pending,
            status_log: Vec::new(),
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_stock_request_full_path_is_logged() {
        let mut r = stock_request();
        r.transition(StockRequestStatus::Approved, "fin-1", None, 10).unwrap();
        r.transition(StockRequestStatus::Fulfilled, "sup-1", Some("shipped".into()), 20)
            .unwrap();

        assert_eq!(r.status, StockRequestStatus::Fulfilled);
        assert_eq!(r.status_log.len(), 2);
        assert_eq!(r.status_log[0].from, StockRequestStatus::Pending);
        assert_eq!(r.status_log[1].actor_id, "sup-1");
        assert_eq!(r.updated_at, 20);
    }

    #[test]
    fn test_backwards_transition_rejected_without_change() {
        let mut r = stock_request();
        r.transition(StockRequestStatus::Approved, "fin-1", None, 10).unwrap();
        let err = r
            .transition(StockRequestStatus::Pending, "fin-1", None, 20)
            .unwrap_err();

        assert_eq!(
            err,
            WorkflowError::InvalidTransition {
                from: "approved".into(),
                to: "pending".into()
            }
        );
        assert_eq!(r.status, StockRequestStatus::Approved);
        assert_eq!(r.status_log.len(), 1);
    }

    #[test]
    fn test_pending_cannot_skip_to_fulfilled() {
        let mut r = stock_request();
        assert!(r.transition(StockRequestStatus::Fulfilled, "sup-1", None, 10).is_err());
    }

    #[test]
    fn test_feedback_table() {
        assert!(FeedbackStatus::Open.can_transition_to(FeedbackStatus::Replied));
        assert!(FeedbackStatus::Open.can_transition_to(FeedbackStatus::Closed));
        assert!(FeedbackStatus::Replied.can_transition_to(FeedbackStatus::Closed));
        assert!(!FeedbackStatus::Replied.can_transition_to(FeedbackStatus::Open));
        assert!(FeedbackStatus::Closed.is_final());
    }

    #[test]
    fn test_decisions_are_final() {
        assert!(DecisionStatus::Approved.is_final());
        assert!(DecisionStatus::Rejected.is_final());
        assert!(!DecisionStatus::Pending.is_final());
    }
}
