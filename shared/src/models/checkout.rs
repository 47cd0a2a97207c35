//! Checkout selections

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use crate::order::PaymentStatus;

/// Delivery address captured in the first checkout step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    #[validate(length(min = 1, max = 120))]
    pub full_name: String,
    #[validate(length(min = 7, max = 20))]
    pub phone: String,
    #[validate(email)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub address_line: String,
    #[validate(length(min = 1, max = 80))]
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[validate(length(max = 500))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// How the customer pays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Mobile money, settled during checkout
    Mpesa,
    Card,
    PayOnDelivery,
}

impl PaymentMethod {
    /// Synchronous methods are paid when the order is placed
    pub fn initial_payment_status(&self) -> PaymentStatus {
        match self {
            PaymentMethod::Mpesa | PaymentMethod::Card => PaymentStatus::Paid,
            PaymentMethod::PayOnDelivery => PaymentStatus::Pending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Mpesa => "mpesa",
            PaymentMethod::Card => "card",
            PaymentMethod::PayOnDelivery => "pay_on_delivery",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entry of the shipping-method catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingMethod {
    pub id: String,
    pub name: String,
    pub cost: Decimal,
    pub estimated_days: u32,
}

impl ShippingMethod {
    /// Built-in catalog used when none is configured
    pub fn default_catalog() -> Vec<ShippingMethod> {
        vec![
            ShippingMethod {
                id: "standard".into(),
                name: "Standard delivery".into(),
                cost: Decimal::from(100),
                estimated_days: 3,
            },
            ShippingMethod {
                id: "express".into(),
                name: "Express delivery".into(),
                cost: Decimal::from(250),
                estimated_days: 1,
            },
            ShippingMethod {
                id: "pickup".into(),
                name: "Store pickup".into(),
                cost: Decimal::ZERO,
                estimated_days: 0,
            },
        ]
    }
}

/// Checkout steps in the order they must be completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    Cart,
    ShippingAddress,
    PaymentMethod,
    ShippingMethod,
    Review,
}

impl CheckoutStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutStep::Cart => "cart",
            CheckoutStep::ShippingAddress => "shipping_address",
            CheckoutStep::PaymentMethod => "payment_method",
            CheckoutStep::ShippingMethod => "shipping_method",
            CheckoutStep::Review => "review",
        }
    }
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-customer checkout selections, cleared when an order is placed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    /// Id into the shipping-method catalog
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_method: Option<String>,
    #[serde(default)]
    pub updated_at: i64,
}

impl CheckoutDraft {
    /// First step that still needs input, given whether the cart has lines
    pub fn current_step(&self, cart_is_empty: bool) -> CheckoutStep {
        if cart_is_empty {
            CheckoutStep::Cart
        } else if self.shipping_address.is_none() {
            CheckoutStep::ShippingAddress
        } else if self.payment_method.is_none() {
            CheckoutStep::PaymentMethod
        } else if self.shipping_method.is_none() {
            CheckoutStep::ShippingMethod
        } else {
            CheckoutStep::Review
        }
    }

    /// `step` may be set once every earlier step is complete
    pub fn can_set(&self, step: CheckoutStep, cart_is_empty: bool) -> Result<(), CheckoutStep> {
        let current = self.current_step(cart_is_empty);
        if step <= current { Ok(()) } else { Err(current) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address() -> ShippingAddress {
        ShippingAddress {
            full_name: "Wanjiru Kamau".into(),
            phone: "+254700000001".into(),
            email: Some("wanjiru@example.com".into()),
            address_line: "12 Moi Avenue".into(),
            city: "Nairobi".into(),
            postal_code: None,
            notes: None,
        }
    }

    #[test]
    fn test_payment_status_by_method() {
        assert_eq!(PaymentMethod::Mpesa.initial_payment_status(), PaymentStatus::Paid);
        assert_eq!(PaymentMethod::Card.initial_payment_status(), PaymentStatus::Paid);
        assert_eq!(
            PaymentMethod::PayOnDelivery.initial_payment_status(),
            PaymentStatus::Pending
        );
    }

    #[test]
    fn test_current_step_progression() {
        let mut draft = CheckoutDraft::default();
        assert_eq!(draft.current_step(true), CheckoutStep::Cart);
        assert_eq!(draft.current_step(false), CheckoutStep::ShippingAddress);

        draft.shipping_address = Some(address());
        assert_eq!(draft.current_step(false), CheckoutStep::PaymentMethod);

        draft.payment_method = Some(PaymentMethod::Card);
        assert_eq!(draft.current_step(false), CheckoutStep::ShippingMethod);

        draft.shipping_method = Some("standard".into());
        assert_eq!(draft.current_step(false), CheckoutStep::Review);
    }

    #[test]
    fn test_step_gating() {
        let draft = CheckoutDraft::default();
        assert!(draft.can_set(CheckoutStep::ShippingAddress, false).is_ok());
        assert_eq!(
            draft.can_set(CheckoutStep::ShippingMethod, false),
            Err(CheckoutStep::ShippingAddress)
        );
    }

    #[test]
    fn test_address_validation() {
        assert!(address().validate().is_ok());
        let mut bad = address();
        bad.email = Some("not-an-email".into());
        assert!(bad.validate().is_err());
        let mut bad = address();
        bad.full_name.clear();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_payment_method_wire_names() {
        let json = serde_json::to_string(&PaymentMethod::PayOnDelivery).unwrap();
        assert_eq!(json, "\"pay_on_delivery\"");
    }
}
