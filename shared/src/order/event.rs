//! Order change events broadcast to listeners after commit

use super::status::{OrderStatus, PaymentStatus};
use super::types::Order;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderEventKind {
    Created,
    StatusChanged,
    PaymentChanged,
}

/// Committed order change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderEvent {
    /// Monotonic, assigned by the server when the change commits
    pub sequence: u64,
    pub order_id: String,
    pub kind: OrderEventKind,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    /// Status before the change (status changes only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_status: Option<OrderStatus>,
    pub actor_id: String,
    pub timestamp: i64,
}

impl OrderEvent {
    pub fn new(sequence: u64, kind: OrderEventKind, order: &Order, actor_id: impl Into<String>) -> Self {
        Self {
            sequence,
            order_id: order.id.clone(),
            kind,
            status: order.status,
            payment_status: order.payment_status,
            previous_status: None,
            actor_id: actor_id.into(),
            timestamp: order.updated_at,
        }
    }

    pub fn with_previous(mut self, previous: OrderStatus) -> Self {
        self.previous_status = Some(previous);
        self
    }
}
