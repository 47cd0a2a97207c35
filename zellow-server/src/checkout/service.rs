use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::error::AppResult;
use shared::models::{
    CheckoutDraft, CheckoutStep, GiftDetails, NotificationResult, PaymentMethod, ShippingAddress,
    ShippingMethod,
};
use shared::order::{Order, OrderEvent, OrderEventKind, OrderItem, OrderStatus};
use shared::util::{DAY_MILLIS, new_id, now_millis};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use validator::Validate;

use super::CheckoutError;
use crate::auth::CurrentUser;
use crate::cart::{CartRepository, CartView};
use crate::db::{ProductRepository, Storage};
use crate::db::storage::{CHECKOUT_DRAFTS_TABLE, ORDER_EVENT_SEQUENCE};
use crate::notify::NotificationDispatcher;
use crate::orders::LifecycleManager;
use crate::utils::validation::validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPaymentRequest {
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetShippingRequest {
    pub shipping_method: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmRequest {
    /// Present when the order is a gift
    #[validate(nested)]
    #[serde(default)]
    pub gift: Option<GiftDetails>,
}

/// Checkout state as shown to the customer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutView {
    pub draft: CheckoutDraft,
    pub current_step: CheckoutStep,
    pub cart: CartView,
    pub shipping_methods: Vec<ShippingMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_cost: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<Decimal>,
}

/// Result of a confirmed checkout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReceipt {
    pub order_id: String,
    pub order: Order,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gift_notification: Option<NotificationResult>,
}

pub struct CheckoutService {
    storage: Storage,
    carts: Arc<dyn CartRepository>,
    lifecycle: Arc<LifecycleManager>,
    notifier: Arc<NotificationDispatcher>,
    shipping_methods: Vec<ShippingMethod>,
}

impl std::fmt::Debug for CheckoutService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutService")
            .field("shipping_methods", &self.shipping_methods.len())
            .finish_non_exhaustive()
    }
}

impl CheckoutService {
    pub fn new(
        storage: Storage,
        carts: Arc<dyn CartRepository>,
        lifecycle: Arc<LifecycleManager>,
        notifier: Arc<NotificationDispatcher>,
        shipping_methods: Vec<ShippingMethod>,
    ) -> Self {
        Self {
            storage,
            carts,
            lifecycle,
            notifier,
            shipping_methods,
        }
    }

    pub fn shipping_methods(&self) -> &[ShippingMethod] {
        &self.shipping_methods
    }

    fn shipping_method(&self, id: &str) -> Result<&ShippingMethod, CheckoutError> {
        self.shipping_methods
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| CheckoutError::UnknownShippingMethod(id.to_string()))
    }

    fn load_draft(&self, owner_id: &str) -> Result<CheckoutDraft, CheckoutError> {
        Ok(self
            .storage
            .get(CHECKOUT_DRAFTS_TABLE, owner_id)?
            .unwrap_or_default())
    }

    pub fn view(&self, owner_id: &str) -> AppResult<CheckoutView> {
        let cart = self.carts.load(owner_id)?;
        let draft = self.load_draft(owner_id)?;
        let cart = CartView::from(&cart);

        let shipping_cost = draft
            .shipping_method
            .as_deref()
            .and_then(|id| self.shipping_methods.iter().find(|m| m.id == id))
            .map(|m| m.cost);

        Ok(CheckoutView {
            current_step: draft.current_step(cart.lines.is_empty()),
            total: shipping_cost.map(|cost| cart.subtotal + cost),
            shipping_cost,
            cart,
            draft,
            shipping_methods: self.shipping_methods.clone(),
        })
    }

    /// Load the draft, check `step` is reachable, apply `update`, save
    fn update_draft<F>(&self, owner_id: &str, step: CheckoutStep, update: F) -> AppResult<CheckoutView>
    where
        F: FnOnce(&mut CheckoutDraft),
    {
        let cart = self.carts.load(owner_id)?;
        let mut draft = self.load_draft(owner_id)?;
        draft
            .can_set(step, cart.is_empty())
            .map_err(|step| CheckoutError::Incomplete { step })?;

        update(&mut draft);
        draft.updated_at = now_millis();
        self.storage.put(CHECKOUT_DRAFTS_TABLE, owner_id, &draft)?;
        self.view(owner_id)
    }

    pub fn set_address(&self, owner_id: &str, address: ShippingAddress) -> AppResult<CheckoutView> {
        validate(&address)?;
        self.update_draft(owner_id, CheckoutStep::ShippingAddress, |draft| {
            draft.shipping_address = Some(address);
        })
    }

    pub fn set_payment(&self, owner_id: &str, method: PaymentMethod) -> AppResult<CheckoutView> {
        self.update_draft(owner_id, CheckoutStep::PaymentMethod, |draft| {
            draft.payment_method = Some(method);
        })
    }

    pub fn set_shipping(&self, owner_id: &str, method_id: &str) -> AppResult<CheckoutView> {
        let method_id = self.shipping_method(method_id)?.id.clone();
        self.update_draft(owner_id, CheckoutStep::ShippingMethod, |draft| {
            draft.shipping_method = Some(method_id);
        })
    }

    /// Place the order. Gift orders also notify the recipient.
    pub async fn confirm(&self, user: &CurrentUser, request: ConfirmRequest) -> AppResult<CheckoutReceipt> {
        validate(&request)?;
        let (order, sequence) = match self.place_order(user, request.gift) {
            Ok(placed) => placed,
            Err(err @ CheckoutError::PriceChanged { .. }) => {
                tracing::info!(customer_id = %user.id, error = %err, "Checkout stopped on a price change");
                self.reprice_cart(&user.id)?;
                return Err(err.into());
            }
            Err(err) => return Err(err.into()),
        };

        tracing::info!(
            order_id = %order.id,
            customer_id = %order.customer_id,
            total = %order.total_amount,
            payment_method = %order.payment_method,
            is_gift = order.is_gift,
            "Order placed"
        );
        self.lifecycle
            .publish(OrderEvent::new(sequence, OrderEventKind::Created, &order, &user.id));

        let gift_notification = match order.gift() {
            Some(_) => Some(self.notifier.send_gift_notification(&order).await),
            None => None,
        };

        Ok(CheckoutReceipt {
            order_id: order.id.clone(),
            tracking_url: self.notifier.tracking_url(&order),
            gift_notification,
            order,
        })
    }

    /// Bring every cart line to the current catalog price and stock
    fn reprice_cart(&self, owner_id: &str) -> AppResult<()> {
        let mut cart = self.carts.load(owner_id)?;
        let product_ids: BTreeSet<String> = cart.lines.iter().map(|l| l.product_id.clone()).collect();
        for product_id in product_ids {
            if let Some(product) = self.storage.get_product(&product_id)? {
                cart.refresh_product(&product);
            }
        }
        cart.updated_at = now_millis();
        self.carts.save(&cart)?;
        Ok(())
    }

    /// Stock check, stock decrement, order insert, cart and draft removal:
    /// one transaction, all or nothing
    fn place_order(
        &self,
        user: &CurrentUser,
        gift: Option<GiftDetails>,
    ) -> Result<(Order, u64), CheckoutError> {
        let txn = self.storage.begin_write()?;
        let cart = self.storage.cart_in(&txn, &user.id)?;
        let draft: CheckoutDraft = self
            .storage
            .get_in(&txn, CHECKOUT_DRAFTS_TABLE, &user.id)?
            .unwrap_or_default();

        let step = draft.current_step(cart.is_empty());
        let (Some(address), Some(payment_method), Some(shipping_id), CheckoutStep::Review) = (
            draft.shipping_address,
            draft.payment_method,
            draft.shipping_method,
            step,
        ) else {
            return Err(CheckoutError::Incomplete { step });
        };
        let shipping = self.shipping_method(&shipping_id)?.clone();
        let now = now_millis();

        // Lines of the same product draw from the same stock
        let mut requested: BTreeMap<&str, u32> = BTreeMap::new();
        for line in &cart.lines {
            *requested.entry(line.product_id.as_str()).or_default() += line.quantity;
        }

        let mut products = HashMap::with_capacity(requested.len());
        for (product_id, quantity) in requested {
            let mut product = self
                .storage
                .product_in(&txn, product_id)?
                .ok_or_else(|| CheckoutError::ProductUnavailable(product_id.to_string()))?;
            if product.stock < quantity {
                return Err(CheckoutError::InsufficientStock {
                    product_id: product_id.to_string(),
                    requested: quantity,
                    available: product.stock,
                });
            }
            product.stock -= quantity;
            product.updated_at = now;
            self.storage.put_product_in(&txn, &product)?;
            products.insert(product_id, product);
        }

        let mut items = Vec::with_capacity(cart.lines.len());
        for line in &cart.lines {
            let product = products
                .get(line.product_id.as_str())
                .ok_or_else(|| CheckoutError::ProductUnavailable(line.product_id.clone()))?;
            let price = product.effective_price(&line.customizations).map_err(|key| {
                CheckoutError::CustomizationUnavailable {
                    product_id: product.id.clone(),
                    key,
                }
            })?;
            if price != line.effective_price {
                return Err(CheckoutError::PriceChanged {
                    product_id: product.id.clone(),
                    reviewed: line.effective_price,
                    current: price,
                });
            }
            items.push(OrderItem {
                product_id: product.id.clone(),
                name: product.name.clone(),
                price,
                quantity: line.quantity,
                customizations: line.customizations.clone(),
            });
        }

        let sub_total: Decimal = items.iter().map(OrderItem::line_total).sum();
        let customer_email = if user.email.trim().is_empty() {
            address.email.clone().unwrap_or_default()
        } else {
            user.email.clone()
        };

        let mut order = Order {
            id: new_id(),
            customer_id: user.id.clone(),
            customer_name: if user.name.trim().is_empty() {
                address.full_name.clone()
            } else {
                user.name.clone()
            },
            customer_email,
            items,
            sub_total,
            shipping_cost: shipping.cost,
            total_amount: sub_total + shipping.cost,
            status: OrderStatus::Pending,
            payment_status: payment_method.initial_payment_status(),
            payment_method,
            shipping_method: shipping.id.clone(),
            shipping_address: address,
            delivery_history: Vec::with_capacity(8),
            is_gift: gift.is_some(),
            gift_details: gift,
            assigned_driver_id: None,
            estimated_delivery: Some(now + i64::from(shipping.estimated_days) * DAY_MILLIS),
            created_at: now,
            updated_at: now,
        };
        order.record(OrderStatus::Pending, "Order placed", &user.id, now);

        self.storage.put_order_in(&txn, &order)?;
        self.storage.remove_cart_in(&txn, &user.id)?;
        self.storage.remove_in(&txn, CHECKOUT_DRAFTS_TABLE, &user.id)?;
        let sequence = self.storage.next_sequence(&txn, ORDER_EVENT_SEQUENCE)?;
        txn.commit().map_err(crate::db::StorageError::from)?;

        Ok((order, sequence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::{AddLineRequest, CartService, RedbCartRepository};
    use crate::core::Config;
    use crate::notify::{PlainTextReceipt, RecordingTransport};
    use shared::ErrorCode;
    use shared::models::{ContactMethod, CustomizationOption, Product, Role};
    use shared::order::PaymentStatus;

    struct Fixture {
        checkout: CheckoutService,
        cart: CartService,
        storage: Storage,
        lifecycle: Arc<LifecycleManager>,
        mail: Arc<RecordingTransport>,
    }

    fn fixture() -> Fixture {
        let storage = Storage::open_in_memory().unwrap();
        let config = Arc::new(
            Config::with_overrides("/tmp/zellow-test", 3000, "checkout-test-secret-0123456789abcdef").unwrap(),
        );
        let mail = Arc::new(RecordingTransport::new());
        let notifier = Arc::new(NotificationDispatcher::new(
            config.clone(),
            storage.clone(),
            mail.clone(),
            None,
            Arc::new(PlainTextReceipt),
        ));
        let carts: Arc<dyn CartRepository> = Arc::new(RedbCartRepository::new(storage.clone()));
        let lifecycle = Arc::new(LifecycleManager::new(storage.clone(), 16));
        let checkout = CheckoutService::new(
            storage.clone(),
            carts.clone(),
            lifecycle.clone(),
            notifier,
            config.shipping_methods.clone(),
        );
        let cart = CartService::new(carts, Arc::new(storage.clone()));

        for (id, price, stock) in [("mug", 500, 5), ("frame", 1200, 2)] {
            storage
                .upsert_product(&Product {
                    id: id.into(),
                    name: id.to_uppercase(),
                    price: Decimal::from(price),
                    stock,
                    image_url: None,
                    category: None,
                    customization_options: vec![CustomizationOption {
                        key: "engraving".into(),
                        label: "Engraving".into(),
                        price_adjustment: Decimal::from(150),
                    }],
                    updated_at: 0,
                })
                .unwrap();
        }

        Fixture {
            checkout,
            cart,
            storage,
            lifecycle,
            mail,
        }
    }

    fn customer() -> CurrentUser {
        CurrentUser {
            id: "c1".into(),
            name: "Wanjiru".into(),
            email: "wanjiru@example.com".into(),
            role: Role::Customer,
        }
    }

    fn address() -> ShippingAddress {
        ShippingAddress {
            full_name: "Wanjiru Kamau".into(),
            phone: "+254700000001".into(),
            email: None,
            address_line: "12 Moi Avenue".into(),
            city: "Nairobi".into(),
            postal_code: None,
            notes: None,
        }
    }

    fn add(f: &Fixture, product_id: &str, quantity: i64, engraved: bool) {
        let mut customizations = BTreeMap::new();
        if engraved {
            customizations.insert("engraving".to_string(), "For you".to_string());
        }
        f.cart
            .add_line(
                "c1",
                AddLineRequest {
                    product_id: product_id.into(),
                    quantity,
                    customizations,
                },
            )
            .unwrap();
    }

    fn complete_steps(f: &Fixture, method: PaymentMethod, shipping: &str) {
        f.checkout.set_address("c1", address()).unwrap();
        f.checkout.set_payment("c1", method).unwrap();
        f.checkout.set_shipping("c1", shipping).unwrap();
    }

    #[tokio::test]
    async fn test_confirm_places_order_and_clears_state() {
        let f = fixture();
        let mut events = f.lifecycle.subscribe();
        add(&f, "mug", 2, false);
        add(&f, "mug", 1, true);
        complete_steps(&f, PaymentMethod::PayOnDelivery, "standard");

        let receipt = f.checkout.confirm(&customer(), ConfirmRequest::default()).await.unwrap();
        let order = &receipt.order;

        assert_eq!(order.sub_total, Decimal::from(2 * 500 + 650));
        assert_eq!(order.shipping_cost, Decimal::from(100));
        assert_eq!(order.total_amount, Decimal::from(1750));
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert_eq!(order.delivery_history.len(), 1);
        assert_eq!(order.delivery_history[0].notes, "Order placed");
        assert_eq!(
            order.estimated_delivery,
            Some(order.created_at + 3 * DAY_MILLIS)
        );
        assert!(order.is_consistent());
        assert!(receipt.tracking_url.is_none());
        assert!(receipt.gift_notification.is_none());

        assert_eq!(f.storage.get_product("mug").unwrap().unwrap().stock, 2);
        assert!(f.cart.get("c1").unwrap().lines.is_empty());
        let view = f.checkout.view("c1").unwrap();
        assert_eq!(view.draft, CheckoutDraft::default());

        let event = events.try_recv().unwrap();
        assert_eq!(event.kind, OrderEventKind::Created);
        assert_eq!(event.order_id, order.id);
    }

    #[tokio::test]
    async fn test_synchronous_payment_is_paid() {
        let f = fixture();
        add(&f, "frame", 1, false);
        complete_steps(&f, PaymentMethod::Mpesa, "pickup");
        let receipt = f.checkout.confirm(&customer(), ConfirmRequest::default()).await.unwrap();
        assert_eq!(receipt.order.payment_status, PaymentStatus::Paid);
        assert_eq!(receipt.order.total_amount, Decimal::from(1200));
    }

    #[tokio::test]
    async fn test_incomplete_checkout_writes_nothing() {
        let f = fixture();
        add(&f, "mug", 1, false);
        f.checkout.set_address("c1", address()).unwrap();
        f.checkout.set_payment("c1", PaymentMethod::Card).unwrap();

        let err = f
            .checkout
            .confirm(&customer(), ConfirmRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CheckoutIncomplete);
        assert_eq!(err.details.unwrap()["step"], "shipping_method");
        assert_eq!(f.storage.get_product("mug").unwrap().unwrap().stock, 5);
        assert_eq!(f.cart.get("c1").unwrap().lines.len(), 1);
        assert!(f.storage.list_orders().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_address_or_payment_places_no_order() {
        let f = fixture();
        add(&f, "mug", 1, false);

        let err = f
            .checkout
            .confirm(&customer(), ConfirmRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CheckoutIncomplete);
        assert_eq!(err.details.unwrap()["step"], "shipping_address");
        assert!(f.storage.list_orders().unwrap().is_empty());

        f.checkout.set_address("c1", address()).unwrap();
        let err = f
            .checkout
            .confirm(&customer(), ConfirmRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CheckoutIncomplete);
        assert_eq!(err.details.unwrap()["step"], "payment_method");
        assert!(f.storage.list_orders().unwrap().is_empty());
        assert_eq!(f.storage.get_product("mug").unwrap().unwrap().stock, 5);
    }

    #[tokio::test]
    async fn test_price_change_after_review_stops_confirm() {
        let f = fixture();
        add(&f, "mug", 2, false);
        complete_steps(&f, PaymentMethod::Card, "standard");
        let reviewed = f.checkout.view("c1").unwrap();
        assert_eq!(reviewed.cart.subtotal, Decimal::from(1000));
        assert_eq!(reviewed.total, Some(Decimal::from(1100)));

        let mut mug = f.storage.get_product("mug").unwrap().unwrap();
        mug.price = Decimal::from(900);
        f.storage.upsert_product(&mug).unwrap();

        let err = f
            .checkout
            .confirm(&customer(), ConfirmRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PriceChanged);
        assert_eq!(err.details.unwrap()["product_id"], "mug");
        assert!(f.storage.list_orders().unwrap().is_empty());
        assert_eq!(f.storage.get_product("mug").unwrap().unwrap().stock, 5);

        // Still on review, now showing the new price
        let view = f.checkout.view("c1").unwrap();
        assert_eq!(view.current_step, CheckoutStep::Review);
        assert_eq!(view.cart.subtotal, Decimal::from(1800));
        assert_eq!(view.total, Some(Decimal::from(1900)));

        let receipt = f.checkout.confirm(&customer(), ConfirmRequest::default()).await.unwrap();
        assert_eq!(receipt.order.sub_total, Decimal::from(1800));
        assert_eq!(receipt.order.total_amount, Decimal::from(1900));
    }

    #[tokio::test]
    async fn test_empty_cart_rejected() {
        let f = fixture();
        let err = f
            .checkout
            .confirm(&customer(), ConfirmRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CartEmpty);
    }

    #[test]
    fn test_steps_must_follow_order() {
        let f = fixture();
        add(&f, "mug", 1, false);
        let err = f.checkout.set_shipping("c1", "standard").unwrap_err();
        assert_eq!(err.code, ErrorCode::CheckoutIncomplete);
        assert_eq!(err.details.unwrap()["step"], "shipping_address");

        f.checkout.set_address("c1", address()).unwrap();
        let view = f.checkout.view("c1").unwrap();
        assert_eq!(view.current_step, CheckoutStep::PaymentMethod);
    }

    #[test]
    fn test_unknown_shipping_method() {
        let f = fixture();
        add(&f, "mug", 1, false);
        complete_steps(&f, PaymentMethod::Card, "standard");
        let err = f.checkout.set_shipping("c1", "drone").unwrap_err();
        assert_eq!(err.code, ErrorCode::ShippingMethodNotFound);

        let view = f.checkout.view("c1").unwrap();
        assert_eq!(view.shipping_cost, Some(Decimal::from(100)));
        assert_eq!(view.total, Some(Decimal::from(600)));
    }

    #[test]
    fn test_invalid_address_rejected() {
        let f = fixture();
        add(&f, "mug", 1, false);
        let mut bad = address();
        bad.phone = "12".into();
        let err = f.checkout.set_address("c1", bad).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn test_insufficient_stock_rolls_back_everything() {
        let f = fixture();
        add(&f, "mug", 1, false);
        add(&f, "frame", 2, false);
        complete_steps(&f, PaymentMethod::Card, "express");

        // Someone else bought a frame in the meantime
        let mut frame = f.storage.get_product("frame").unwrap().unwrap();
        frame.stock = 1;
        f.storage.upsert_product(&frame).unwrap();

        let err = f
            .checkout
            .confirm(&customer(), ConfirmRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);

        assert_eq!(f.storage.get_product("mug").unwrap().unwrap().stock, 5);
        assert_eq!(f.storage.get_product("frame").unwrap().unwrap().stock, 1);
        assert_eq!(f.cart.get("c1").unwrap().lines.len(), 2);
        assert_eq!(f.checkout.view("c1").unwrap().current_step, CheckoutStep::Review);
        assert!(f.storage.list_orders().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_gift_order_notifies_recipient() {
        let f = fixture();
        add(&f, "mug", 1, false);
        complete_steps(&f, PaymentMethod::Card, "standard");

        let gift = GiftDetails {
            recipient_name: "Amani".into(),
            contact_method: ContactMethod::Email,
            contact_value: Some("amani@example.com".into()),
            message: Some("Happy birthday".into()),
            notify_recipient: true,
            show_prices: false,
            allow_tracking: true,
        };
        let receipt = f
            .checkout
            .confirm(&customer(), ConfirmRequest { gift: Some(gift) })
            .await
            .unwrap();

        assert!(receipt.order.is_gift);
        let notification = receipt.gift_notification.unwrap();
        assert!(notification.success);
        assert!(receipt.tracking_url.unwrap().ends_with(&receipt.order_id));
        assert_eq!(f.mail.sent()[0].to, "amani@example.com");
    }

    #[tokio::test]
    async fn test_gift_contact_must_match_method() {
        let f = fixture();
        add(&f, "mug", 1, false);
        complete_steps(&f, PaymentMethod::Card, "standard");

        let gift = GiftDetails {
            recipient_name: "Amani".into(),
            contact_method: ContactMethod::Email,
            contact_value: Some("not-an-email".into()),
            message: None,
            notify_recipient: true,
            show_prices: false,
            allow_tracking: true,
        };
        let err = f
            .checkout
            .confirm(&customer(), ConfirmRequest { gift: Some(gift) })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert!(f.storage.list_orders().unwrap().is_empty());
        assert!(f.mail.sent().is_empty());
    }
}
