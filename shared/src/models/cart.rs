//! Shopping cart aggregate
//!
//! Lines are identified by a content-addressed key derived from the product
//! id and the (sorted) customization pairs, so adding the same product with
//! the same customizations grows one line while a different customization set
//! opens a parallel line for the same product.
//!
//! Parallel lines of one product draw from the same stock: a line's quantity
//! is clamped to the stock snapshot minus what the other lines already hold.

use super::product::Product;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// One line in the cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub line_key: String,
    pub product_id: String,
    pub name: String,
    pub unit_price: Decimal,
    /// Unit price including customization adjustments
    pub effective_price: Decimal,
    pub quantity: u32,
    /// Stock seen the last time this line was mutated
    pub available_stock: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub customizations: BTreeMap<String, String>,
}

impl CartLine {
    pub fn line_total(&self) -> Decimal {
        self.effective_price * Decimal::from(self.quantity)
    }

    pub fn is_customized(&self) -> bool {
        !self.customizations.is_empty()
    }
}

/// Result of a quantity-changing mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineUpdate {
    pub line_key: String,
    pub quantity: u32,
    /// The requested quantity exceeded stock and was reduced
    pub stock_limited: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("Product {0} is out of stock")]
    OutOfStock(String),

    #[error("Quantity must be at least 1, got {0}")]
    InvalidQuantity(i64),

    #[error("Cart line not found: {0}")]
    LineNotFound(String),

    #[error("Product {product_id} does not offer customization '{key}'")]
    UnknownCustomization { product_id: String, key: String },
}

impl From<CartError> for crate::error::AppError {
    fn from(err: CartError) -> Self {
        use crate::error::{AppError, ErrorCode};
        let message = err.to_string();
        match err {
            CartError::OutOfStock(product_id) => {
                AppError::with_message(ErrorCode::ProductOutOfStock, message)
                    .with_detail("product_id", product_id)
            }
            CartError::InvalidQuantity(quantity) => {
                AppError::with_message(ErrorCode::InvalidQuantity, message)
                    .with_detail("quantity", quantity)
            }
            CartError::LineNotFound(line_key) => {
                AppError::with_message(ErrorCode::CartLineNotFound, message)
                    .with_detail("line_key", line_key)
            }
            CartError::UnknownCustomization { product_id, key } => {
                AppError::with_message(ErrorCode::InvalidCustomization, message)
                    .with_detail("product_id", product_id)
                    .with_detail("key", key)
            }
        }
    }
}

/// Compute the stable line key for a product + customization set.
///
/// `BTreeMap` iteration is sorted by key, which makes the hash independent
/// of the order the customer picked the options in.
pub fn line_key(product_id: &str, customizations: &BTreeMap<String, String>) -> String {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(product_id.as_bytes());
    hasher.update([0u8]);
    for (key, value) in customizations {
        hasher.update(key.as_bytes());
        hasher.update([0u8]);
        hasher.update(value.trim().as_bytes());
        hasher.update([0u8]);
    }

    let result = hasher.finalize();
    hex::encode(&result[..16])
}

/// A customer's cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub owner_id: String,
    #[serde(default)]
    pub lines: Vec<CartLine>,
    pub updated_at: i64,
}

impl Cart {
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            lines: Vec::new(),
            updated_at: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, line_key: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.line_key == line_key)
    }

    /// Quantity of `product_id` held by lines other than `line_key`
    fn held_elsewhere(&self, product_id: &str, line_key: &str) -> u32 {
        self.lines
            .iter()
            .filter(|l| l.product_id == product_id && l.line_key != line_key)
            .map(|l| l.quantity)
            .sum()
    }

    /// Add `quantity` of `product` with the given customizations.
    pub fn add_line(
        &mut self,
        product: &Product,
        quantity: u32,
        customizations: BTreeMap<String, String>,
    ) -> Result<LineUpdate, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity(0));
        }
        if product.stock == 0 {
            return Err(CartError::OutOfStock(product.id.clone()));
        }

        let effective_price =
            product
                .effective_price(&customizations)
                .map_err(|key| CartError::UnknownCustomization {
                    product_id: product.id.clone(),
                    key,
                })?;
        let key = line_key(&product.id, &customizations);
        let remaining = product
            .stock
            .saturating_sub(self.held_elsewhere(&product.id, &key));
        if remaining == 0 {
            return Err(CartError::OutOfStock(product.id.clone()));
        }

        let update = match self.lines.iter_mut().find(|l| l.line_key == key) {
            Some(line) => {
                let requested = line.quantity.saturating_add(quantity);
                let granted = requested.min(remaining);
                line.quantity = granted;
                line.available_stock = product.stock;
                line.unit_price = product.price;
                line.effective_price = effective_price;
                LineUpdate {
                    line_key: key,
                    quantity: granted,
                    stock_limited: requested > granted,
                }
            }
            None => {
                let granted = quantity.min(remaining);
                self.lines.push(CartLine {
                    line_key: key.clone(),
                    product_id: product.id.clone(),
                    name: product.name.clone(),
                    unit_price: product.price,
                    effective_price,
                    quantity: granted,
                    available_stock: product.stock,
                    image_url: product.image_url.clone(),
                    customizations,
                });
                LineUpdate {
                    line_key: key,
                    quantity: granted,
                    stock_limited: quantity > granted,
                }
            }
        };

        Ok(update)
    }

    /// Set the quantity of a line. `quantity <= 0` removes it and returns `None`.
    pub fn set_quantity(&mut self, line_key: &str, quantity: i64) -> Result<Option<LineUpdate>, CartError> {
        let index = self
            .lines
            .iter()
            .position(|l| l.line_key == line_key)
            .ok_or_else(|| CartError::LineNotFound(line_key.to_string()))?;

        if quantity <= 0 {
            self.lines.remove(index);
            return Ok(None);
        }

        let (product_id, available) = {
            let line = &self.lines[index];
            (line.product_id.clone(), line.available_stock)
        };
        let remaining = available.saturating_sub(self.held_elsewhere(&product_id, line_key));
        let line = &mut self.lines[index];
        let requested = u32::try_from(quantity).unwrap_or(u32::MAX);
        let granted = requested.min(remaining);
        if granted == 0 {
            return Err(CartError::OutOfStock(line.product_id.clone()));
        }
        line.quantity = granted;

        Ok(Some(LineUpdate {
            line_key: line.line_key.clone(),
            quantity: granted,
            stock_limited: requested > granted,
        }))
    }

    /// Refresh the stock snapshot and prices of every line for `product`.
    /// A line whose customization is no longer offered keeps its old price.
    pub fn refresh_product(&mut self, product: &Product) {
        for line in self.lines.iter_mut().filter(|l| l.product_id == product.id) {
            line.available_stock = product.stock;
            line.name = product.name.clone();
            if let Ok(price) = product.effective_price(&line.customizations) {
                line.unit_price = product.price;
                line.effective_price = price;
            }
        }
    }

    pub fn remove_line(&mut self, line_key: &str) -> Result<CartLine, CartError> {
        let index = self
            .lines
            .iter()
            .position(|l| l.line_key == line_key)
            .ok_or_else(|| CartError::LineNotFound(line_key.to_string()))?;
        Ok(self.lines.remove(index))
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Σ effective price × quantity
    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    pub fn total_item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::product::CustomizationOption;

    fn product(id: &str, price: i64, stock: u32) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            price: Decimal::from(price),
            stock,
            image_url: None,
            category: None,
            customization_options: vec![
                CustomizationOption {
                    key: "engraving".into(),
                    label: "Engraving".into(),
                    price_adjustment: Decimal::from(100),
                },
                CustomizationOption {
                    key: "wrap".into(),
                    label: "Gift wrap".into(),
                    price_adjustment: Decimal::from(50),
                },
            ],
            updated_at: 0,
        }
    }

    fn custom(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_line_key_ignores_customization_order() {
        let a = custom(&[("engraving", "Ann"), ("wrap", "gold")]);
        let mut b = BTreeMap::new();
        b.insert("wrap".to_string(), "gold".to_string());
        b.insert("engraving".to_string(), "Ann".to_string());
        assert_eq!(line_key("p1", &a), line_key("p1", &b));
        assert_ne!(line_key("p1", &a), line_key("p2", &a));
        assert_ne!(line_key("p1", &a), line_key("p1", &BTreeMap::new()));
    }

    #[test]
    fn test_add_same_customization_reuses_line() {
        let p = product("p1", 500, 10);
        let mut cart = Cart::new("u1");
        cart.add_line(&p, 1, custom(&[("engraving", "Ann")])).unwrap();
        let update = cart.add_line(&p, 2, custom(&[("engraving", "Ann")])).unwrap();

        assert_eq!(cart.lines.len(), 1);
        assert_eq!(update.quantity, 3);
        assert!(!update.stock_limited);
    }

    #[test]
    fn test_add_different_customization_creates_parallel_line() {
        let p = product("p1", 500, 10);
        let mut cart = Cart::new("u1");
        cart.add_line(&p, 1, custom(&[("engraving", "Ann")])).unwrap();
        cart.add_line(&p, 1, custom(&[("engraving", "Bob")])).unwrap();
        cart.add_line(&p, 1, BTreeMap::new()).unwrap();

        assert_eq!(cart.lines.len(), 3);
        assert!(cart.lines.iter().all(|l| l.product_id == "p1"));
    }

    #[test]
    fn test_add_clamps_to_stock() {
        let p = product("p1", 500, 5);
        let mut cart = Cart::new("u1");
        let update = cart.add_line(&p, 12, BTreeMap::new()).unwrap();

        assert_eq!(update.quantity, 5);
        assert!(update.stock_limited);
        assert_eq!(cart.lines[0].quantity, 5);
    }

    #[test]
    fn test_add_to_existing_line_clamps_combined_quantity() {
        let p = product("p1", 500, 5);
        let mut cart = Cart::new("u1");
        cart.add_line(&p, 4, BTreeMap::new()).unwrap();
        let update = cart.add_line(&p, 4, BTreeMap::new()).unwrap();

        assert_eq!(update.quantity, 5);
        assert!(update.stock_limited);
    }

    #[test]
    fn test_parallel_lines_share_stock() {
        let p = product("p1", 500, 2);
        let mut cart = Cart::new("u1");
        let plain = cart.add_line(&p, 2, BTreeMap::new()).unwrap();
        assert!(!plain.stock_limited);

        let err = cart
            .add_line(&p, 2, custom(&[("engraving", "Ann")]))
            .unwrap_err();
        assert_eq!(err, CartError::OutOfStock("p1".into()));
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.total_item_count(), 2);
    }

    #[test]
    fn test_parallel_line_clamped_to_remaining_stock() {
        let p = product("p1", 500, 3);
        let mut cart = Cart::new("u1");
        let plain = cart.add_line(&p, 2, BTreeMap::new()).unwrap().line_key;
        let engraved = cart.add_line(&p, 2, custom(&[("engraving", "Ann")])).unwrap();

        assert_eq!(engraved.quantity, 1);
        assert!(engraved.stock_limited);
        assert_eq!(cart.total_item_count(), 3);

        // Growing the plain line cannot take what the engraved line holds
        let update = cart.set_quantity(&plain, 3).unwrap().unwrap();
        assert_eq!(update.quantity, 2);
        assert!(update.stock_limited);
        assert_eq!(cart.total_item_count(), 3);
    }

    #[test]
    fn test_add_out_of_stock_is_terminal() {
        let p = product("p1", 500, 0);
        let mut cart = Cart::new("u1");
        let err = cart.add_line(&p, 1, BTreeMap::new()).unwrap_err();

        assert_eq!(err, CartError::OutOfStock("p1".into()));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_rejects_zero_quantity_and_unknown_customization() {
        let p = product("p1", 500, 5);
        let mut cart = Cart::new("u1");
        assert_eq!(
            cart.add_line(&p, 0, BTreeMap::new()).unwrap_err(),
            CartError::InvalidQuantity(0)
        );
        assert!(matches!(
            cart.add_line(&p, 1, custom(&[("glitter", "yes")])),
            Err(CartError::UnknownCustomization { .. })
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_effective_price_used_in_subtotal() {
        let p = product("p1", 500, 10);
        let q = product("p2", 200, 10);
        let mut cart = Cart::new("u1");
        cart.add_line(&p, 2, custom(&[("engraving", "Ann"), ("wrap", "red")])).unwrap();
        cart.add_line(&q, 3, BTreeMap::new()).unwrap();

        // (500 + 100 + 50) * 2 + 200 * 3
        assert_eq!(cart.subtotal(), Decimal::from(1900));
        assert_eq!(cart.total_item_count(), 5);
        let expected: Decimal = cart
            .lines
            .iter()
            .map(|l| l.effective_price * Decimal::from(l.quantity))
            .sum();
        assert_eq!(cart.subtotal(), expected);
    }

    #[test]
    fn test_set_quantity_clamps_and_removes() {
        let p = product("p1", 500, 5);
        let mut cart = Cart::new("u1");
        let key = cart.add_line(&p, 1, BTreeMap::new()).unwrap().line_key;

        let update = cart.set_quantity(&key, 9).unwrap().unwrap();
        assert_eq!(update.quantity, 5);
        assert!(update.stock_limited);

        assert!(cart.set_quantity(&key, 0).unwrap().is_none());
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), Decimal::ZERO);
        assert_eq!(cart.total_item_count(), 0);
    }

    #[test]
    fn test_set_quantity_negative_removes() {
        let p = product("p1", 500, 5);
        let mut cart = Cart::new("u1");
        let key = cart.add_line(&p, 2, BTreeMap::new()).unwrap().line_key;
        assert!(cart.set_quantity(&key, -3).unwrap().is_none());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_unknown_line() {
        let mut cart = Cart::new("u1");
        assert_eq!(
            cart.set_quantity("missing", 1).unwrap_err(),
            CartError::LineNotFound("missing".into())
        );
    }

    #[test]
    fn test_refresh_product_then_clamp() {
        let mut p = product("p1", 500, 5);
        let mut cart = Cart::new("u1");
        let key = cart.add_line(&p, 4, custom(&[("wrap", "gold")])).unwrap().line_key;

        p.stock = 2;
        p.price = Decimal::from(600);
        cart.refresh_product(&p);
        let update = cart.set_quantity(&key, 4).unwrap().unwrap();
        assert_eq!(update.quantity, 2);
        assert_eq!(cart.lines[0].unit_price, Decimal::from(600));
        assert_eq!(cart.lines[0].effective_price, Decimal::from(650));
    }

    #[test]
    fn test_remove_line() {
        let p = product("p1", 500, 5);
        let mut cart = Cart::new("u1");
        let key = cart.add_line(&p, 2, BTreeMap::new()).unwrap().line_key;
        let removed = cart.remove_line(&key).unwrap();
        assert_eq!(removed.quantity, 2);
        assert!(cart.remove_line(&key).is_err());
    }
}
