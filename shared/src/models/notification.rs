//! Notification outcomes and the public gift-tracking view

use crate::order::{Order, OrderItem, OrderStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Outcome of a best-effort notification send
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationResult {
    pub success: bool,
    pub message: String,
}

impl NotificationResult {
    pub fn sent(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingHistoryEntry {
    pub status: OrderStatus,
    pub timestamp: i64,
}

/// Reduced read-only view of a gift order for its recipient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftTrackingView {
    pub order_id: String,
    pub status: OrderStatus,
    pub status_label: String,
    pub recipient_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_delivery: Option<i64>,
    pub history: Vec<TrackingHistoryEntry>,
    /// Present only when the recipient may see prices
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<OrderItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Decimal>,
}

impl GiftTrackingView {
    /// Build the recipient view, or `None` when the order is not trackable
    pub fn from_order(order: &Order) -> Option<Self> {
        let gift = order.gift()?;
        if !gift.effective_allow_tracking() {
            return None;
        }
        let show_prices = gift.effective_show_prices();

        Some(Self {
            order_id: order.id.clone(),
            status: order.status,
            status_label: order.status.label().to_string(),
            recipient_name: gift.recipient_name.clone(),
            message: gift.message.clone(),
            estimated_delivery: order.estimated_delivery,
            history: order
                .delivery_history
                .iter()
                .map(|e| TrackingHistoryEntry {
                    status: e.status,
                    timestamp: e.timestamp,
                })
                .collect(),
            items: show_prices.then(|| order.items.clone()),
            total_amount: show_prices.then_some(order.total_amount),
        })
    }
}
