use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Cart, CartLine, LineUpdate};
use shared::util::now_millis;
use std::collections::BTreeMap;
use std::sync::Arc;
use validator::Validate;

use super::CartRepository;
use crate::db::ProductRepository;

/// Add-line payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddLineRequest {
    #[validate(length(min = 1))]
    pub product_id: String,
    pub quantity: i64,
    #[serde(default)]
    pub customizations: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: i64,
}

/// Cart as returned to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub owner_id: String,
    pub lines: Vec<CartLine>,
    pub subtotal: Decimal,
    pub total_item_count: u32,
    pub updated_at: i64,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            owner_id: cart.owner_id.clone(),
            lines: cart.lines.clone(),
            subtotal: cart.subtotal(),
            total_item_count: cart.total_item_count(),
            updated_at: cart.updated_at,
        }
    }
}

/// Cart after a quantity-changing mutation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartMutation {
    pub cart: CartView,
    /// `None` when the line was removed
    pub update: Option<LineUpdate>,
}

/// Loads, mutates and saves whole carts
#[derive(Clone)]
pub struct CartService {
    carts: Arc<dyn CartRepository>,
    products: Arc<dyn ProductRepository>,
}

impl std::fmt::Debug for CartService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartService").finish_non_exhaustive()
    }
}

impl CartService {
    pub fn new(carts: Arc<dyn CartRepository>, products: Arc<dyn ProductRepository>) -> Self {
        Self { carts, products }
    }

    pub fn get(&self, owner_id: &str) -> AppResult<CartView> {
        let cart = self.carts.load(owner_id)?;
        Ok(CartView::from(&cart))
    }

    /// Add a product line; quantities above stock are clamped, not rejected
    pub fn add_line(&self, owner_id: &str, request: AddLineRequest) -> AppResult<CartMutation> {
        let quantity = u32::try_from(request.quantity)
            .ok()
            .filter(|q| *q > 0)
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::InvalidQuantity,
                    format!("Quantity must be at least 1, got {}", request.quantity),
                )
            })?;

        let product = self
            .products
            .get_product(&request.product_id)?
            .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;

        let mut cart = self.carts.load(owner_id)?;
        let update = cart.add_line(&product, quantity, request.customizations)?;
        if update.stock_limited {
            tracing::info!(
                owner_id = %owner_id,
                product_id = %product.id,
                requested = quantity,
                granted = update.quantity,
                "Cart quantity limited by stock"
            );
        }
        cart.updated_at = now_millis();
        self.carts.save(&cart)?;

        Ok(CartMutation {
            cart: CartView::from(&cart),
            update: Some(update),
        })
    }

    /// Set a line's quantity. `quantity <= 0` removes the line.
    pub fn set_quantity(&self, owner_id: &str, line_key: &str, quantity: i64) -> AppResult<CartMutation> {
        let mut cart = self.carts.load(owner_id)?;

        if let Some(product_id) = cart.line(line_key).map(|l| l.product_id.clone())
            && let Some(product) = self.products.get_product(&product_id)?
        {
            cart.refresh_product(&product);
        }

        let update = cart.set_quantity(line_key, quantity)?;
        cart.updated_at = now_millis();
        self.carts.save(&cart)?;

        Ok(CartMutation {
            cart: CartView::from(&cart),
            update,
        })
    }

    pub fn remove_line(&self, owner_id: &str, line_key: &str) -> AppResult<CartView> {
        let mut cart = self.carts.load(owner_id)?;
        cart.remove_line(line_key)?;
        cart.updated_at = now_millis();
        self.carts.save(&cart)?;
        Ok(CartView::from(&cart))
    }

    pub fn clear(&self, owner_id: &str) -> AppResult<CartView> {
        let mut cart = self.carts.load(owner_id)?;
        cart.clear();
        cart.updated_at = now_millis();
        self.carts.save(&cart)?;
        Ok(CartView::from(&cart))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::RedbCartRepository;
    use crate::db::Storage;
    use shared::models::{CustomizationOption, Product};

    fn mug(stock: u32) -> Product {
        Product {
            id: "mug".into(),
            name: "Mug".into(),
            price: Decimal::from(500),
            stock,
            image_url: None,
            category: None,
            customization_options: vec![CustomizationOption {
                key: "engraving".into(),
                label: "Engraving".into(),
                price_adjustment: Decimal::from(150),
            }],
            updated_at: 0,
        }
    }

    fn service_with(product: Product) -> (CartService, Storage) {
        let storage = Storage::open_in_memory().unwrap();
        storage.upsert_product(&product).unwrap();
        let service = CartService::new(
            Arc::new(RedbCartRepository::new(storage.clone())),
            Arc::new(storage.clone()),
        );
        (service, storage)
    }

    fn add(product_id: &str, quantity: i64, engraving: Option<&str>) -> AddLineRequest {
        let mut customizations = BTreeMap::new();
        if let Some(text) = engraving {
            customizations.insert("engraving".to_string(), text.to_string());
        }
        AddLineRequest {
            product_id: product_id.into(),
            quantity,
            customizations,
        }
    }

    #[test]
    fn test_add_clamps_to_stock_and_persists() {
        let (service, _) = service_with(mug(5));
        let result = service.add_line("c1", add("mug", 12, None)).unwrap();
        let update = result.update.unwrap();
        assert_eq!(update.quantity, 5);
        assert!(update.stock_limited);

        let cart = service.get("c1").unwrap();
        assert_eq!(cart.total_item_count, 5);
        assert_eq!(cart.subtotal, Decimal::from(2500));
    }

    #[test]
    fn test_customizations_open_parallel_lines() {
        let (service, _) = service_with(mug(10));
        service.add_line("c1", add("mug", 1, None)).unwrap();
        service.add_line("c1", add("mug", 1, Some("Happy birthday"))).unwrap();
        service.add_line("c1", add("mug", 2, None)).unwrap();

        let cart = service.get("c1").unwrap();
        assert_eq!(cart.lines.len(), 2);
        assert_eq!(cart.lines[0].quantity, 3);
        assert_eq!(cart.lines[1].effective_price, Decimal::from(650));
        assert_eq!(cart.subtotal, Decimal::from(3 * 500 + 650));
    }

    #[test]
    fn test_parallel_lines_never_exceed_stock() {
        let (service, _) = service_with(mug(2));
        let plain = service.add_line("c1", add("mug", 2, None)).unwrap();
        assert!(!plain.update.unwrap().stock_limited);

        let err = service
            .add_line("c1", add("mug", 2, Some("For Amani")))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ProductOutOfStock);

        let cart = service.get("c1").unwrap();
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.total_item_count, 2);
    }

    #[test]
    fn test_out_of_stock_leaves_cart_unchanged() {
        let (service, _) = service_with(mug(0));
        let err = service.add_line("c1", add("mug", 1, None)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ProductOutOfStock);
        assert!(service.get("c1").unwrap().lines.is_empty());
    }

    #[test]
    fn test_zero_and_negative_quantities_rejected_on_add() {
        let (service, _) = service_with(mug(3));
        for quantity in [0, -4] {
            let err = service.add_line("c1", add("mug", quantity, None)).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidQuantity);
        }
    }

    #[test]
    fn test_unknown_product_and_customization() {
        let (service, _) = service_with(mug(3));
        let err = service.add_line("c1", add("plate", 1, None)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ProductNotFound);

        let mut request = add("mug", 1, None);
        request.customizations.insert("glitter".into(), "yes".into());
        let err = service.add_line("c1", request).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCustomization);
    }

    #[test]
    fn test_set_quantity_uses_fresh_stock() {
        let (service, storage) = service_with(mug(10));
        let key = service
            .add_line("c1", add("mug", 2, None))
            .unwrap()
            .update
            .unwrap()
            .line_key;

        storage.upsert_product(&mug(4)).unwrap();
        let result = service.set_quantity("c1", &key, 9).unwrap();
        let update = result.update.unwrap();
        assert_eq!(update.quantity, 4);
        assert!(update.stock_limited);
    }

    #[test]
    fn test_set_zero_removes_line() {
        let (service, _) = service_with(mug(10));
        let key = service
            .add_line("c1", add("mug", 2, None))
            .unwrap()
            .update
            .unwrap()
            .line_key;

        let result = service.set_quantity("c1", &key, 0).unwrap();
        assert!(result.update.is_none());
        assert_eq!(result.cart.subtotal, Decimal::ZERO);
        assert_eq!(result.cart.total_item_count, 0);
    }

    #[test]
    fn test_missing_line_is_not_found() {
        let (service, _) = service_with(mug(10));
        let err = service.remove_line("c1", "nope").unwrap_err();
        assert_eq!(err.code, ErrorCode::CartLineNotFound);
        let err = service.set_quantity("c1", "nope", 3).unwrap_err();
        assert_eq!(err.code, ErrorCode::CartLineNotFound);
    }

    #[test]
    fn test_clear() {
        let (service, _) = service_with(mug(10));
        service.add_line("c1", add("mug", 2, None)).unwrap();
        let cart = service.clear("c1").unwrap();
        assert!(cart.lines.is_empty());
        assert!(service.get("c1").unwrap().lines.is_empty());
    }
}
