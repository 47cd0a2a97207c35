//! LifecycleManager - role-gated order commands
//!
//! # Command Flow
//!
//! ```text
//! execute(user, order_id, request)
//!     ├─ 1. Begin write transaction, load order
//!     ├─ 2. Role check (customer may cancel own pending order)
//!     ├─ 3. Driver must be the assigned driver
//!     ├─ 4. Validate transition against the status table
//!     ├─ 5. Append one history entry, update order
//!     ├─ 6. Assign event sequence, persist, commit
//!     └─ 7. Broadcast event(s)
//! ```
//!
//! Nothing is written when any check fails. Concurrent commands on the same
//! order are serialized by the redb writer lock; the later one sees the
//! earlier one's result.

use shared::models::Role;
use shared::order::{
    CommandRequest, LifecycleCommand, Order, OrderEvent, OrderEventKind, OrderStatus,
    PaymentStatus,
};
use shared::util::now_millis;
use tokio::sync::broadcast;

use super::LifecycleError;
use crate::auth::CurrentUser;
use crate::db::Storage;
use crate::db::storage::ORDER_EVENT_SEQUENCE;

/// Filter for the staff order list
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub driver_id: Option<String>,
}

pub struct LifecycleManager {
    storage: Storage,
    event_tx: broadcast::Sender<OrderEvent>,
}

impl std::fmt::Debug for LifecycleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleManager")
            .field("storage", &"<Storage>")
            .field("event_tx", &"<broadcast::Sender>")
            .field("receivers", &self.event_tx.receiver_count())
            .finish()
    }
}

impl LifecycleManager {
    pub fn new(storage: Storage, event_buffer: usize) -> Self {
        let (event_tx, _) = broadcast::channel(event_buffer.max(1));
        Self { storage, event_tx }
    }

    /// Subscribe to committed order events
    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.event_tx.subscribe()
    }

    /// Broadcast a committed event. No receivers is not an error.
    pub fn publish(&self, event: OrderEvent) {
        let (order_id, sequence) = (event.order_id.clone(), event.sequence);
        if self.event_tx.send(event).is_err() {
            tracing::debug!(order_id = %order_id, sequence, "Order event not delivered: no active receivers");
        }
    }

    /// Run a lifecycle command on behalf of `user`
    pub fn execute(
        &self,
        user: &CurrentUser,
        order_id: &str,
        request: CommandRequest,
    ) -> Result<Order, LifecycleError> {
        let command = request.command;
        let txn = self.storage.begin_write()?;
        let mut order = self
            .storage
            .order_in(&txn, order_id)?
            .ok_or_else(|| LifecycleError::OrderNotFound(order_id.to_string()))?;

        Self::authorize(user, &command, &order)?;

        let previous_status = order.status;
        let previous_payment = order.payment_status;
        let notes = request
            .notes
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| command.default_note().to_string());
        let now = now_millis();

        match command.target_status(order.has_customized_items()) {
            Some(target) => {
                if !command.valid_from(order.status) || !order.status.can_transition_to(target) {
                    return Err(LifecycleError::InvalidTransition {
                        from: order.status,
                        to: target,
                    });
                }
                match &command {
                    LifecycleCommand::AssignDriver { driver_id } => {
                        order.assigned_driver_id = Some(driver_id.clone());
                    }
                    LifecycleCommand::Requeue => order.assigned_driver_id = None,
                    LifecycleCommand::Cancel { refund: true }
                        if order.payment_status == PaymentStatus::Paid =>
                    {
                        order.payment_status = PaymentStatus::Refunded;
                    }
                    _ => {}
                }
                order.record(target, notes, &user.id, now);
            }
            None => {
                if order.status == OrderStatus::Cancelled {
                    return Err(LifecycleError::OrderTerminal(order.id.clone()));
                }
                let to = match command {
                    LifecycleCommand::RefundPayment => PaymentStatus::Refunded,
                    _ => PaymentStatus::Paid,
                };
                if !order.payment_status.can_transition_to(to) {
                    return Err(LifecycleError::InvalidPaymentTransition {
                        from: order.payment_status,
                        to,
                    });
                }
                order.payment_status = to;
                order.record(order.status, notes, &user.id, now);
            }
        }

        let mut events = Vec::with_capacity(2);
        if order.status != previous_status {
            let sequence = self.storage.next_sequence(&txn, ORDER_EVENT_SEQUENCE)?;
            events.push(
                OrderEvent::new(sequence, OrderEventKind::StatusChanged, &order, &user.id)
                    .with_previous(previous_status),
            );
        }
        if order.payment_status != previous_payment {
            let sequence = self.storage.next_sequence(&txn, ORDER_EVENT_SEQUENCE)?;
            events.push(OrderEvent::new(
                sequence,
                OrderEventKind::PaymentChanged,
                &order,
                &user.id,
            ));
        }

        self.storage.put_order_in(&txn, &order)?;
        txn.commit().map_err(crate::db::StorageError::from)?;

        tracing::info!(
            order_id = %order.id,
            command = command.name(),
            actor_id = %user.id,
            role = %user.role,
            from = %previous_status,
            to = %order.status,
            payment_status = %order.payment_status,
            "Lifecycle command applied"
        );

        for event in events {
            self.publish(event);
        }
        Ok(order)
    }

    /// Role and ownership checks, applied before any write
    fn authorize(
        user: &CurrentUser,
        command: &LifecycleCommand,
        order: &Order,
    ) -> Result<(), LifecycleError> {
        let customer_cancel = matches!(command, LifecycleCommand::Cancel { .. })
            && user.role == Role::Customer
            && order.is_owned_by(&user.id)
            && order.status == OrderStatus::Pending;

        if !command.is_allowed_for(user.role) && !customer_cancel {
            crate::security_log!(
                "WARN",
                "lifecycle_denied",
                user_id = user.id.clone(),
                role = user.role.as_str(),
                command = command.name(),
                order_id = order.id.clone()
            );
            // Customers learn nothing about orders they do not own
            if user.role == Role::Customer && !order.is_owned_by(&user.id) {
                return Err(LifecycleError::OrderNotFound(order.id.clone()));
            }
            return Err(LifecycleError::PermissionDenied {
                command: command.name(),
                role: user.role,
            });
        }

        if user.role == Role::Driver && order.assigned_driver_id.as_deref() != Some(user.id.as_str()) {
            return Err(LifecycleError::NotAssigned(order.id.clone()));
        }
        Ok(())
    }

    /// One order, visible to its owner and to staff
    pub fn get_order(&self, user: &CurrentUser, order_id: &str) -> Result<Order, LifecycleError> {
        match self.storage.get_order(order_id)? {
            Some(order) if user.is_staff() || order.is_owned_by(&user.id) => Ok(order),
            _ => Err(LifecycleError::OrderNotFound(order_id.to_string())),
        }
    }

    /// Staff list, newest first
    pub fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, LifecycleError> {
        let orders = self.storage.list_orders()?;
        Ok(orders
            .into_iter()
            .filter(|o| filter.status.is_none_or(|s| o.status == s))
            .filter(|o| {
                filter
                    .driver_id
                    .as_deref()
                    .is_none_or(|d| o.assigned_driver_id.as_deref() == Some(d))
            })
            .collect())
    }

    /// The caller's own orders, newest first
    pub fn list_for_customer(&self, customer_id: &str) -> Result<Vec<Order>, LifecycleError> {
        let orders = self.storage.list_orders()?;
        Ok(orders
            .into_iter()
            .filter(|o| o.is_owned_by(customer_id))
            .collect())
    }
}
