//! Gift metadata embedded in an order

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateEmail, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactMethod {
    Email,
    Sms,
}

/// Recipient and visibility settings of a gift order.
///
/// `show_prices` and `allow_tracking` only take effect when the recipient is
/// notified; read them through the `effective_*` accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_contact"))]
pub struct GiftDetails {
    #[validate(length(min = 1, max = 120))]
    pub recipient_name: String,
    pub contact_method: ContactMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_value: Option<String>,
    #[validate(length(max = 1000))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub notify_recipient: bool,
    #[serde(default)]
    pub show_prices: bool,
    #[serde(default)]
    pub allow_tracking: bool,
}

/// A present contact value must fit the contact method
fn validate_contact(gift: &GiftDetails) -> Result<(), ValidationError> {
    let Some(contact) = gift.contact() else {
        return Ok(());
    };
    let valid = match gift.contact_method {
        ContactMethod::Email => contact.validate_email(),
        ContactMethod::Sms => {
            (7..=20).contains(&contact.len())
                && contact
                    .chars()
                    .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-'))
        }
    };
    if valid {
        Ok(())
    } else {
        let mut err = ValidationError::new("contact_value");
        err.message = Some("Contact value does not match the contact method".into());
        Err(err)
    }
}

impl GiftDetails {
    pub fn effective_show_prices(&self) -> bool {
        self.notify_recipient && self.show_prices
    }

    pub fn effective_allow_tracking(&self) -> bool {
        self.notify_recipient && self.allow_tracking
    }

    /// Trimmed, non-empty contact value
    pub fn contact(&self) -> Option<&str> {
        self.contact_value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// Recipient email address, when the recipient is reached by email
    pub fn recipient_email(&self) -> Option<&str> {
        match self.contact_method {
            ContactMethod::Email => self.contact(),
            ContactMethod::Sms => None,
        }
    }
}
