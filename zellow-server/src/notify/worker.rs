//! Notification worker
//!
//! Subscribes to the order event broadcast and reacts after each commit:
//!
//! ```text
//! LifecycleManager / checkout (broadcast)
//!        │
//!        └── NotificationWorker
//!               ├── created                 ──► receipt / order summary
//!               ├── status_changed          ──► status push
//!               ├── status_changed:delivered ──► delivery confirmation
//!               └── payment_changed:refunded ──► refund notice
//! ```
//!
//! Sends are best-effort; a failure never reaches the order.

use shared::order::{OrderEvent, OrderEventKind, OrderStatus, PaymentStatus};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use super::NotificationDispatcher;
use crate::db::Storage;

pub struct NotificationWorker {
    storage: Storage,
    dispatcher: Arc<NotificationDispatcher>,
}

impl NotificationWorker {
    pub fn new(storage: Storage, dispatcher: Arc<NotificationDispatcher>) -> Self {
        Self {
            storage,
            dispatcher,
        }
    }

    /// Run until the channel closes or shutdown is requested
    pub async fn run(self, mut events: broadcast::Receiver<OrderEvent>, shutdown: CancellationToken) {
        tracing::info!("Notification worker started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Notification worker stopping on shutdown");
                    break;
                }
                received = events.recv() => match received {
                    Ok(event) => self.handle(event).await,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::error!(
                            skipped = n,
                            "Notification worker lagged! Events skipped - notifications lost"
                        );
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::info!("Event channel closed, notification worker stopping");
                        break;
                    }
                }
            }
        }
    }

    async fn handle(&self, event: OrderEvent) {
        let order = match self.storage.get_order(&event.order_id) {
            Ok(Some(order)) => order,
            Ok(None) => {
                tracing::warn!(order_id = %event.order_id, "Event for unknown order ignored");
                return;
            }
            Err(e) => {
                tracing::error!(order_id = %event.order_id, error = %e, "Failed to load order for notification");
                return;
            }
        };

        let results = match event.kind {
            OrderEventKind::Created => vec![("receipt", self.dispatcher.send_receipt(&order).await)],
            OrderEventKind::StatusChanged => {
                let mut results = vec![("push", self.dispatcher.notify_status_change(&order).await)];
                if event.status == OrderStatus::Delivered {
                    results.push((
                        "delivery_confirmation",
                        self.dispatcher.send_delivery_confirmation(&order).await,
                    ));
                }
                results
            }
            OrderEventKind::PaymentChanged if event.payment_status == PaymentStatus::Refunded => {
                vec![("refund_notice", self.dispatcher.send_receipt(&order).await)]
            }
            OrderEventKind::PaymentChanged => vec![],
        };

        for (kind, result) in results {
            tracing::debug!(
                order_id = %order.id,
                sequence = event.sequence,
                notification = kind,
                success = result.success,
                message = %result.message,
                "Notification processed"
            );
        }
    }
}
