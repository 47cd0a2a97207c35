//! Order record types

use super::status::{OrderStatus, PaymentStatus};
use crate::models::checkout::{PaymentMethod, ShippingAddress};
use crate::models::gift::GiftDetails;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Item snapshot taken at order time, decoupled from the live catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub name: String,
    /// Effective unit price (customizations included)
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub customizations: BTreeMap<String, String>,
}

impl OrderItem {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// One entry of the append-only delivery history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryHistoryEntry {
    pub status: OrderStatus,
    pub timestamp: i64,
    pub notes: String,
    pub actor_id: String,
}

/// Customer order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub customer_id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub items: Vec<OrderItem>,
    pub sub_total: Decimal,
    pub shipping_cost: Decimal,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    /// Shipping-method id chosen at checkout
    pub shipping_method: String,
    pub shipping_address: ShippingAddress,
    pub delivery_history: Vec<DeliveryHistoryEntry>,
    #[serde(default)]
    pub is_gift: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gift_details: Option<GiftDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_driver_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_delivery: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    /// Append a history entry and move the current status to match.
    ///
    /// Earlier entries are never touched.
    pub fn record(
        &mut self,
        status: OrderStatus,
        notes: impl Into<String>,
        actor_id: impl Into<String>,
        timestamp: i64,
    ) {
        self.delivery_history.push(DeliveryHistoryEntry {
            status,
            timestamp,
            notes: notes.into(),
            actor_id: actor_id.into(),
        });
        self.status = status;
        self.updated_at = timestamp;
    }

    pub fn has_customized_items(&self) -> bool {
        self.items.iter().any(|i| !i.customizations.is_empty())
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.customer_id == user_id
    }

    /// Gift details, only when the order is flagged as a gift
    pub fn gift(&self) -> Option<&GiftDetails> {
        if self.is_gift {
            self.gift_details.as_ref()
        } else {
            None
        }
    }

    /// Σ item price × quantity
    pub fn items_total(&self) -> Decimal {
        self.items.iter().map(OrderItem::line_total).sum()
    }

    /// Totals add up and the status matches the last history entry
    pub fn is_consistent(&self) -> bool {
        self.total_amount == self.sub_total + self.shipping_cost
            && self.sub_total == self.items_total()
            && self.delivery_history.last().map(|e| e.status) == Some(self.status)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::models::gift::ContactMethod;

    pub fn order() -> Order {
        let items = vec![OrderItem {
            product_id: "p1".into(),
            name: "Photo frame".into(),
            price: Decimal::from(500),
            quantity: 2,
            customizations: BTreeMap::new(),
        }];
        let mut order = Order {
            id: "o1".into(),
            customer_id: "c1".into(),
            customer_name: "Wanjiru".into(),
            customer_email: "wanjiru@example.com".into(),
            items,
            sub_total: Decimal::from(1000),
            shipping_cost: Decimal::from(100),
            total_amount: Decimal::from(1100),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_method: PaymentMethod::PayOnDelivery,
            shipping_method: "standard".into(),
            shipping_address: ShippingAddress {
                full_name: "Wanjiru Kamau".into(),
                phone: "+254700000001".into(),
                email: None,
                address_line: "12 Moi Avenue".into(),
                city: "Nairobi".into(),
                postal_code: None,
                notes: None,
            },
            delivery_history: Vec::new(),
            is_gift: false,
            gift_details: None,
            assigned_driver_id: None,
            estimated_delivery: None,
            created_at: 1_000,
            updated_at: 1_000,
        };
        order.record(OrderStatus::Pending, "Order placed", "c1", 1_000);
        order
    }

    pub fn gift_order(notify: bool) -> Order {
        let mut o = order();
        o.is_gift = true;
        o.gift_details = Some(GiftDetails {
            recipient_name: "Amani".into(),
            contact_method: ContactMethod::Email,
            contact_value: Some("amani@example.com".into()),
            message: Some("Enjoy!".into()),
            notify_recipient: notify,
            show_prices: false,
            allow_tracking: true,
        });
        o
    }
}
