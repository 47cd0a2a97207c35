//! Product catalog model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

/// A customization the shop offers on a product (engraving, gift wrap, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomizationOption {
    pub key: String,
    pub label: String,
    /// Added to the unit price when the customization is chosen
    #[serde(default)]
    pub price_adjustment: Decimal,
}

/// Catalog product with live stock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub stock: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub customization_options: Vec<CustomizationOption>,
    pub updated_at: i64,
}

impl Product {
    pub fn customization(&self, key: &str) -> Option<&CustomizationOption> {
        self.customization_options.iter().find(|o| o.key == key)
    }

    /// Unit price with the adjustments of the chosen customizations.
    ///
    /// Returns the first key the product does not offer as the error.
    pub fn effective_price(&self, customizations: &BTreeMap<String, String>) -> Result<Decimal, String> {
        let mut price = self.price;
        for key in customizations.keys() {
            let option = self.customization(key).ok_or_else(|| key.clone())?;
            price += option.price_adjustment;
        }
        Ok(price)
    }
}

/// Create/update payload for a product
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpsert {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub price: Decimal,
    pub stock: u32,
    #[validate(url)]
    pub image_url: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub customization_options: Vec<CustomizationOption>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mug() -> Product {
        Product {
            id: "mug".into(),
            name: "Mug".into(),
            price: Decimal::from(500),
            stock: 5,
            image_url: None,
            category: None,
            customization_options: vec![
                CustomizationOption {
                    key: "engraving".into(),
                    label: "Engraving".into(),
                    price_adjustment: Decimal::from(150),
                },
                CustomizationOption {
                    key: "color".into(),
                    label: "Color".into(),
                    price_adjustment: Decimal::ZERO,
                },
            ],
            updated_at: 0,
        }
    }

    #[test]
    fn test_effective_price_adds_adjustments() {
        let mut c = BTreeMap::new();
        c.insert("engraving".to_string(), "Happy birthday".to_string());
        c.insert("color".to_string(), "red".to_string());
        assert_eq!(mug().effective_price(&c).unwrap(), Decimal::from(650));
        assert_eq!(mug().effective_price(&BTreeMap::new()).unwrap(), Decimal::from(500));
    }

    #[test]
    fn test_effective_price_rejects_unknown_key() {
        let mut c = BTreeMap::new();
        c.insert("glitter".to_string(), "yes".to_string());
        assert_eq!(mug().effective_price(&c).unwrap_err(), "glitter");
    }
}
