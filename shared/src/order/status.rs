//! Order and payment status machines

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order fulfilment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    AwaitingQualityCheck,
    AwaitingAssignment,
    Assigned,
    OutForDelivery,
    DeliveryAttempted,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: &'static [OrderStatus] = &[
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::AwaitingQualityCheck,
        OrderStatus::AwaitingAssignment,
        OrderStatus::Assigned,
        OrderStatus::OutForDelivery,
        OrderStatus::DeliveryAttempted,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// Transition table: statuses reachable in one step from `self`
    pub fn allowed_next(&self) -> &'static [OrderStatus] {
        use OrderStatus::*;
        match self {
            Pending => &[Processing, Cancelled],
            Processing => &[AwaitingQualityCheck, AwaitingAssignment, Cancelled],
            AwaitingQualityCheck => &[AwaitingAssignment, Processing, Cancelled],
            AwaitingAssignment => &[Assigned, Cancelled],
            Assigned => &[OutForDelivery, AwaitingAssignment, Cancelled],
            OutForDelivery => &[Delivered, DeliveryAttempted],
            DeliveryAttempted => &[OutForDelivery, AwaitingAssignment, Cancelled],
            Delivered | Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        self.allowed_next().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        self.allowed_next().is_empty()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::AwaitingQualityCheck => "awaiting_quality_check",
            OrderStatus::AwaitingAssignment => "awaiting_assignment",
            OrderStatus::Assigned => "assigned",
            OrderStatus::OutForDelivery => "out_for_delivery",
            OrderStatus::DeliveryAttempted => "delivery_attempted",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Customer-facing wording used in push and tracking messages
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Order received",
            OrderStatus::Processing => "Being prepared",
            OrderStatus::AwaitingQualityCheck => "In quality check",
            OrderStatus::AwaitingAssignment => "Ready for dispatch",
            OrderStatus::Assigned => "Driver assigned",
            OrderStatus::OutForDelivery => "Out for delivery",
            OrderStatus::DeliveryAttempted => "Delivery attempted",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment status, tracked independently of the fulfilment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Refunded,
    Failed,
}

impl PaymentStatus {
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (PaymentStatus::Pending, PaymentStatus::Paid)
                | (PaymentStatus::Pending, PaymentStatus::Failed)
                | (PaymentStatus::Failed, PaymentStatus::Paid)
                | (PaymentStatus::Paid, PaymentStatus::Refunded)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        for status in OrderStatus::ALL {
            if !matches!(status, OrderStatus::Delivered | OrderStatus::Cancelled) {
                assert!(!status.is_terminal(), "{} should not be terminal", status);
            }
        }
    }

    #[test]
    fn test_happy_path_is_reachable() {
        let path = [
            OrderStatus::Pending,
            OrderStatus::Processing,
            OrderStatus::AwaitingQualityCheck,
            OrderStatus::AwaitingAssignment,
            OrderStatus::Assigned,
            OrderStatus::OutForDelivery,
            OrderStatus::DeliveryAttempted,
            OrderStatus::OutForDelivery,
            OrderStatus::Delivered,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_illegal_transitions() {
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Delivered));
        assert!(!OrderStatus::OutForDelivery.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Processing.can_transition_to(OrderStatus::Processing));
    }

    #[test]
    fn test_payment_transitions() {
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Paid));
        assert!(PaymentStatus::Paid.can_transition_to(PaymentStatus::Refunded));
        assert!(!PaymentStatus::Pending.can_transition_to(PaymentStatus::Refunded));
        assert!(!PaymentStatus::Refunded.can_transition_to(PaymentStatus::Paid));
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::AwaitingQualityCheck).unwrap(),
            "\"awaiting_quality_check\""
        );
        for status in OrderStatus::ALL {
            let json = serde_json::to_string(status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }
}
