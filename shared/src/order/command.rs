//! Named lifecycle commands and their role sets

use super::status::OrderStatus;
use crate::models::role::Role;
use serde::{Deserialize, Serialize};

/// A staff (or customer) action on an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LifecycleCommand {
    StartProcessing,
    /// Goes through quality check when any item is customized
    MarkFulfilled,
    ApproveQualityCheck,
    RejectQualityCheck,
    #[serde(rename_all = "camelCase")]
    AssignDriver {
        driver_id: String,
    },
    Requeue,
    Dispatch,
    MarkDeliveryAttempted,
    MarkDelivered,
    Cancel {
        #[serde(default)]
        refund: bool,
    },
    ConfirmPayment,
    RefundPayment,
}

/// Command envelope as received over HTTP
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRequest {
    #[serde(flatten)]
    pub command: LifecycleCommand,
    #[serde(default)]
    pub notes: Option<String>,
}

impl LifecycleCommand {
    /// Roles allowed to issue this command.
    ///
    /// Customers may additionally cancel their own pending orders; that rule
    /// depends on the order and is applied by the lifecycle manager.
    pub fn allowed_roles(&self) -> &'static [Role] {
        use Role::*;
        match self {
            LifecycleCommand::StartProcessing => &[Admin, Inventory],
            LifecycleCommand::MarkFulfilled => &[Admin, Inventory, Technician],
            LifecycleCommand::ApproveQualityCheck | LifecycleCommand::RejectQualityCheck => {
                &[QualityCheck]
            }
            LifecycleCommand::AssignDriver { .. } | LifecycleCommand::Requeue => &[Admin, Dispatch],
            LifecycleCommand::Dispatch | LifecycleCommand::MarkDeliveryAttempted => {
                &[Admin, Dispatch, Driver]
            }
            LifecycleCommand::MarkDelivered => &[Admin, Dispatch],
            LifecycleCommand::Cancel { .. } => &[Admin, Finance],
            LifecycleCommand::ConfirmPayment => &[Admin, Finance, Driver],
            LifecycleCommand::RefundPayment => &[Admin, Finance],
        }
    }

    pub fn is_allowed_for(&self, role: Role) -> bool {
        self.allowed_roles().contains(&role)
    }

    /// Target fulfilment status, or `None` for payment-only commands
    pub fn target_status(&self, has_customized_items: bool) -> Option<OrderStatus> {
        match self {
            LifecycleCommand::StartProcessing => Some(OrderStatus::Processing),
            LifecycleCommand::MarkFulfilled if has_customized_items => {
                Some(OrderStatus::AwaitingQualityCheck)
            }
            LifecycleCommand::MarkFulfilled => Some(OrderStatus::AwaitingAssignment),
            LifecycleCommand::ApproveQualityCheck => Some(OrderStatus::AwaitingAssignment),
            LifecycleCommand::RejectQualityCheck => Some(OrderStatus::Processing),
            LifecycleCommand::AssignDriver { .. } => Some(OrderStatus::Assigned),
            LifecycleCommand::Requeue => Some(OrderStatus::AwaitingAssignment),
            LifecycleCommand::Dispatch => Some(OrderStatus::OutForDelivery),
            LifecycleCommand::MarkDeliveryAttempted => Some(OrderStatus::DeliveryAttempted),
            LifecycleCommand::MarkDelivered => Some(OrderStatus::Delivered),
            LifecycleCommand::Cancel { .. } => Some(OrderStatus::Cancelled),
            LifecycleCommand::ConfirmPayment | LifecycleCommand::RefundPayment => None,
        }
    }

    /// Statuses the command may be issued from, narrower than the transition
    /// table where two commands share a target
    pub fn valid_from(&self, from: OrderStatus) -> bool {
        use OrderStatus::*;
        match self {
            LifecycleCommand::StartProcessing => from == Pending,
            LifecycleCommand::MarkFulfilled => from == Processing,
            LifecycleCommand::ApproveQualityCheck | LifecycleCommand::RejectQualityCheck => {
                from == AwaitingQualityCheck
            }
            LifecycleCommand::AssignDriver { .. } => from == AwaitingAssignment,
            LifecycleCommand::Requeue | LifecycleCommand::Dispatch => {
                matches!(from, Assigned | DeliveryAttempted)
            }
            LifecycleCommand::MarkDeliveryAttempted | LifecycleCommand::MarkDelivered => {
                from == OutForDelivery
            }
            LifecycleCommand::Cancel { .. } => from.can_transition_to(Cancelled),
            LifecycleCommand::ConfirmPayment | LifecycleCommand::RefundPayment => true,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LifecycleCommand::StartProcessing => "start_processing",
            LifecycleCommand::MarkFulfilled => "mark_fulfilled",
            LifecycleCommand::ApproveQualityCheck => "approve_quality_check",
            LifecycleCommand::RejectQualityCheck => "reject_quality_check",
            LifecycleCommand::AssignDriver { .. } => "assign_driver",
            LifecycleCommand::Requeue => "requeue",
            LifecycleCommand::Dispatch => "dispatch",
            LifecycleCommand::MarkDeliveryAttempted => "mark_delivery_attempted",
            LifecycleCommand::MarkDelivered => "mark_delivered",
            LifecycleCommand::Cancel { .. } => "cancel",
            LifecycleCommand::ConfirmPayment => "confirm_payment",
            LifecycleCommand::RefundPayment => "refund_payment",
        }
    }

    /// History note used when the caller gives none
    pub fn default_note(&self) -> &'static str {
        match self {
            LifecycleCommand::StartProcessing => "Processing started",
            LifecycleCommand::MarkFulfilled => "Items fulfilled",
            LifecycleCommand::ApproveQualityCheck => "Quality check passed",
            LifecycleCommand::RejectQualityCheck => "Quality check failed, returned to processing",
            LifecycleCommand::AssignDriver { .. } => "Driver assigned",
            LifecycleCommand::Requeue => "Returned to dispatch queue",
            LifecycleCommand::Dispatch => "Out for delivery",
            LifecycleCommand::MarkDeliveryAttempted => "Delivery attempted",
            LifecycleCommand::MarkDelivered => "Delivered",
            LifecycleCommand::Cancel { .. } => "Order cancelled",
            LifecycleCommand::ConfirmPayment => "Payment confirmed",
            LifecycleCommand::RefundPayment => "Payment refunded",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_quality_check_clears_gate() {
        for role in Role::ALL {
            assert_eq!(
                LifecycleCommand::ApproveQualityCheck.is_allowed_for(*role),
                *role == Role::QualityCheck
            );
        }
    }

    #[test]
    fn test_only_dispatch_or_admin_mark_delivered() {
        let allowed: Vec<Role> = Role::ALL
            .iter()
            .copied()
            .filter(|r| LifecycleCommand::MarkDelivered.is_allowed_for(*r))
            .collect();
        assert_eq!(allowed, vec![Role::Admin, Role::Dispatch]);
    }

    #[test]
    fn test_customers_hold_no_staff_commands() {
        let commands = [
            LifecycleCommand::StartProcessing,
            LifecycleCommand::MarkFulfilled,
            LifecycleCommand::MarkDelivered,
            LifecycleCommand::Cancel { refund: false },
            LifecycleCommand::ConfirmPayment,
        ];
        for c in commands {
            assert!(!c.is_allowed_for(Role::Customer), "{}", c.name());
        }
    }

    #[test]
    fn test_fulfilment_routes_through_quality_check() {
        assert_eq!(
            LifecycleCommand::MarkFulfilled.target_status(true),
            Some(OrderStatus::AwaitingQualityCheck)
        );
        assert_eq!(
            LifecycleCommand::MarkFulfilled.target_status(false),
            Some(OrderStatus::AwaitingAssignment)
        );
    }

    #[test]
    fn test_targets_are_in_transition_table() {
        let commands = [
            LifecycleCommand::StartProcessing,
            LifecycleCommand::MarkFulfilled,
            LifecycleCommand::ApproveQualityCheck,
            LifecycleCommand::RejectQualityCheck,
            LifecycleCommand::AssignDriver { driver_id: "d".into() },
            LifecycleCommand::Requeue,
            LifecycleCommand::Dispatch,
            LifecycleCommand::MarkDeliveryAttempted,
            LifecycleCommand::MarkDelivered,
            LifecycleCommand::Cancel { refund: true },
        ];
        for c in &commands {
            for from in OrderStatus::ALL {
                if c.valid_from(*from) {
                    for customized in [false, true] {
                        let to = c.target_status(customized).unwrap();
                        assert!(from.can_transition_to(to), "{}: {} -> {}", c.name(), from, to);
                    }
                }
            }
        }
    }

    #[test]
    fn test_command_wire_format() {
        let req: CommandRequest =
            serde_json::from_str(r#"{"type":"assign_driver","driverId":"d1","notes":"van 2"}"#).unwrap();
        assert_eq!(req.command, LifecycleCommand::AssignDriver { driver_id: "d1".into() });
        assert_eq!(req.notes.as_deref(), Some("van 2"));

        let req: CommandRequest = serde_json::from_str(r#"{"type":"cancel"}"#).unwrap();
        assert_eq!(req.command, LifecycleCommand::Cancel { refund: false });
    }
}
