//! Notification dispatch
//!
//! Every send is best-effort: transport failures are logged and returned as a
//! failed [`NotificationResult`], never as an error. Orders are never touched.

use chrono::{TimeZone, Utc};
use shared::models::{ContactMethod, NotificationResult};
use shared::order::Order;
use std::fmt::Write;
use std::sync::Arc;

use super::mailer::{MailMessage, MailTransport};
use super::push::{PushError, PushSender};
use super::receipt::{ReceiptKind, ReceiptRenderer};
use crate::core::Config;
use crate::db::Storage;

pub struct NotificationDispatcher {
    config: Arc<Config>,
    storage: Storage,
    mail: Arc<dyn MailTransport>,
    push: Option<Arc<dyn PushSender>>,
    renderer: Arc<dyn ReceiptRenderer>,
}

impl std::fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationDispatcher")
            .field("push_enabled", &self.push.is_some())
            .finish_non_exhaustive()
    }
}

fn format_day(millis: i64) -> String {
    Utc.timestamp_millis_opt(millis)
        .single()
        .map(|d| d.format("%A, %d %B %Y").to_string())
        .unwrap_or_default()
}

impl NotificationDispatcher {
    pub fn new(
        config: Arc<Config>,
        storage: Storage,
        mail: Arc<dyn MailTransport>,
        push: Option<Arc<dyn PushSender>>,
        renderer: Arc<dyn ReceiptRenderer>,
    ) -> Self {
        Self {
            config,
            storage,
            mail,
            push,
            renderer,
        }
    }

    /// Public tracking link, when the gift settings allow tracking
    pub fn tracking_url(&self, order: &Order) -> Option<String> {
        order
            .gift()
            .filter(|g| g.effective_allow_tracking())
            .map(|_| self.config.tracking_url(&order.id))
    }

    async fn deliver(&self, message: MailMessage, order_id: &str) -> Result<(), String> {
        match self.mail.send(&message).await {
            Ok(()) => {
                tracing::info!(to = %message.to, order_id = %order_id, subject = %message.subject, "Mail sent");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(to = %message.to, order_id = %order_id, error = %e, "Mail delivery failed");
                Err(e.to_string())
            }
        }
    }

    /// Tell the gift recipient a gift is on its way
    pub async fn send_gift_notification(&self, order: &Order) -> NotificationResult {
        let Some(gift) = order.gift() else {
            return NotificationResult::failed("Order is not a gift");
        };
        if !gift.notify_recipient {
            return NotificationResult::failed("Recipient notification is disabled for this gift");
        }
        let Some(contact) = gift.contact() else {
            tracing::info!(order_id = %order.id, "Gift notification skipped: no recipient contact");
            return NotificationResult::failed("Gift notification skipped: no recipient contact");
        };

        match gift.contact_method {
            ContactMethod::Sms => {
                tracing::info!(
                    order_id = %order.id,
                    to = %contact,
                    "SMS gateway not integrated, gift SMS simulated"
                );
                NotificationResult::sent(format!("Gift SMS to {} simulated", contact))
            }
            ContactMethod::Email => {
                let show_prices = gift.effective_show_prices();
                let mut body = String::new();
                let _ = writeln!(body, "Hello {},\n", gift.recipient_name);
                let _ = writeln!(
                    body,
                    "{} has sent you a gift from Zellow Enterprises!",
                    order.customer_name
                );
                if let Some(message) = gift.message.as_deref().filter(|m| !m.trim().is_empty()) {
                    let _ = writeln!(body, "\nTheir message:\n\"{}\"", message.trim());
                }
                let _ = writeln!(body, "\nWhat's coming:");
                for item in &order.items {
                    if show_prices {
                        let _ = writeln!(body, "  - {} x {} ({:.2})", item.quantity, item.name, item.line_total());
                    } else {
                        let _ = writeln!(body, "  - {} x {}", item.quantity, item.name);
                    }
                }
                if show_prices {
                    let _ = writeln!(body, "Total: {:.2}", order.total_amount);
                }
                if let Some(eta) = order.estimated_delivery {
                    let _ = writeln!(body, "\nExpected delivery: {}", format_day(eta));
                }
                if let Some(url) = self.tracking_url(order) {
                    let _ = writeln!(body, "\nFollow your gift here: {}", url);
                }

                let message = MailMessage {
                    to: contact.to_string(),
                    subject: format!("{} sent you a gift", order.customer_name),
                    body,
                    attachments: vec![],
                };
                match self.deliver(message, &order.id).await {
                    Ok(()) => NotificationResult::sent(format!("Gift notification sent to {}", contact)),
                    Err(e) => NotificationResult::failed(format!("Gift notification failed: {}", e)),
                }
            }
        }
    }

    /// Delivery confirmation with receipt, to the customer and (when different)
    /// the notified gift recipient
    pub async fn send_delivery_confirmation(&self, order: &Order) -> NotificationResult {
        if order.customer_email.trim().is_empty() {
            return NotificationResult::failed("Customer has no email address");
        }

        let mut sent = 0;
        let mut failures = Vec::new();

        let customer_mail = MailMessage {
            to: order.customer_email.clone(),
            subject: format!("Your Zellow order {} has been delivered", order.id),
            body: format!(
                "Hello {},\n\nYour order {} was delivered. Your receipt is attached.\n",
                order.customer_name, order.id
            ),
            attachments: vec![self.renderer.render(order, ReceiptKind::DeliveryConfirmation, true)],
        };
        match self.deliver(customer_mail, &order.id).await {
            Ok(()) => sent += 1,
            Err(e) => failures.push(format!("customer: {}", e)),
        }

        let recipient = order
            .gift()
            .filter(|g| g.notify_recipient)
            .and_then(|g| g.recipient_email().map(|email| (g, email)))
            .filter(|(_, email)| !email.eq_ignore_ascii_case(order.customer_email.trim()));

        if let Some((gift, email)) = recipient {
            let recipient_mail = MailMessage {
                to: email.to_string(),
                subject: format!("Your gift from {} has arrived", order.customer_name),
                body: format!(
                    "Hello {},\n\nThe gift {} sent you has been delivered. Enjoy!\n",
                    gift.recipient_name, order.customer_name
                ),
                attachments: vec![self.renderer.render(
                    order,
                    ReceiptKind::DeliveryConfirmation,
                    gift.effective_show_prices(),
                )],
            };
            match self.deliver(recipient_mail, &order.id).await {
                Ok(()) => sent += 1,
                Err(e) => failures.push(format!("recipient: {}", e)),
            }
        }

        if failures.is_empty() {
            NotificationResult::sent(format!("Delivery confirmation sent to {} recipient(s)", sent))
        } else {
            NotificationResult::failed(format!(
                "Delivery confirmation sent to {} recipient(s), failed for {}",
                sent,
                failures.join("; ")
            ))
        }
    }

    /// Receipt, refund notice or order summary, by payment status
    pub async fn send_receipt(&self, order: &Order) -> NotificationResult {
        if order.customer_email.trim().is_empty() {
            return NotificationResult::failed("Customer has no email address");
        }
        let kind = ReceiptKind::for_payment(order.payment_status);
        let (subject, intro) = match kind {
            ReceiptKind::Receipt => (
                format!("Receipt for your Zellow order {}", order.id),
                "Thank you for your payment. Your receipt is attached.",
            ),
            ReceiptKind::RefundNotice => (
                format!("Refund processed for order {}", order.id),
                "Your payment has been refunded. The details are attached.",
            ),
            _ => (
                format!("Summary of your Zellow order {}", order.id),
                "Here is a summary of your order. Payment is still outstanding.",
            ),
        };
        let message = MailMessage {
            to: order.customer_email.clone(),
            subject,
            body: format!("Hello {},\n\n{}\n", order.customer_name, intro),
            attachments: vec![self.renderer.render(order, kind, true)],
        };
        match self.deliver(message, &order.id).await {
            Ok(()) => NotificationResult::sent(format!("{} sent to {}", kind.title(), order.customer_email)),
            Err(e) => NotificationResult::failed(format!("{} failed: {}", kind.title(), e)),
        }
    }

    /// Payload-less push to every endpoint the customer registered.
    /// Endpoints the push service reports gone are removed.
    pub async fn notify_status_change(&self, order: &Order) -> NotificationResult {
        let Some(push) = &self.push else {
            return NotificationResult::failed("Push delivery is not configured");
        };
        let subscriptions = match self.storage.push_subscriptions(&order.customer_id) {
            Ok(subs) => subs,
            Err(e) => {
                tracing::error!(order_id = %order.id, error = %e, "Failed to load push subscriptions");
                return NotificationResult::failed("Could not load push subscriptions");
            }
        };
        if subscriptions.is_empty() {
            return NotificationResult::failed("Customer has no push subscriptions");
        }

        let total = subscriptions.len();
        let mut delivered = 0;
        for subscription in &subscriptions {
            match push.send(subscription).await {
                Ok(()) => delivered += 1,
                Err(PushError::Gone(status)) => {
                    tracing::info!(
                        user_id = %subscription.user_id,
                        status,
                        "Push endpoint gone, removing subscription"
                    );
                    if let Err(e) = self
                        .storage
                        .remove_push_subscription(&subscription.user_id, &subscription.endpoint)
                    {
                        tracing::error!(error = %e, "Failed to remove stale push subscription");
                    }
                }
                Err(e) => {
                    tracing::warn!(order_id = %order.id, error = %e, "Push delivery failed");
                }
            }
        }

        if delivered > 0 {
            NotificationResult::sent(format!("Status push delivered to {} of {} endpoint(s)", delivered, total))
        } else {
            NotificationResult::failed(format!("Status push failed for all {} endpoint(s)", total))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::mailer::RecordingTransport;
    use crate::notify::push::RecordingPushSender;
    use crate::notify::receipt::PlainTextReceipt;
    use rust_decimal::Decimal;
    use shared::models::{GiftDetails, PaymentMethod, PushKeys, ShippingAddress};
    use shared::order::{OrderItem, OrderStatus, PaymentStatus};

    struct Fixture {
        dispatcher: NotificationDispatcher,
        mail: Arc<RecordingTransport>,
        push: Arc<RecordingPushSender>,
        storage: Storage,
    }

    fn fixture() -> Fixture {
        let config = Config::with_overrides("/tmp/zellow-test", 3000, "dispatcher-test-secret-0123456789abcdef").unwrap();
        let storage = Storage::open_in_memory().unwrap();
        let mail = Arc::new(RecordingTransport::new());
        let push = Arc::new(RecordingPushSender::new());
        let dispatcher = NotificationDispatcher::new(
            Arc::new(config),
            storage.clone(),
            mail.clone(),
            Some(push.clone()),
            Arc::new(PlainTextReceipt),
        );
        Fixture {
            dispatcher,
            mail,
            push,
            storage,
        }
    }

    fn gift(method: ContactMethod, contact: Option<&str>, notify: bool, show_prices: bool) -> GiftDetails {
        GiftDetails {
            recipient_name: "Amani".into(),
            contact_method: method,
            contact_value: contact.map(str::to_string),
            message: Some("Happy birthday!".into()),
            notify_recipient: notify,
            show_prices,
            allow_tracking: true,
        }
    }

    fn order(gift: Option<GiftDetails>) -> Order {
        let mut order = Order {
            id: "o1".into(),
            customer_id: "c1".into(),
            customer_name: "Wanjiru".into(),
            customer_email: "wanjiru@example.com".into(),
            items: vec![OrderItem {
                product_id: "mug".into(),
                name: "Mug".into(),
                price: Decimal::from(500),
                quantity: 2,
                customizations: Default::default(),
            }],
            sub_total: Decimal::from(1000),
            shipping_cost: Decimal::from(100),
            total_amount: Decimal::from(1100),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Paid,
            payment_method: PaymentMethod::Card,
            shipping_method: "standard".into(),
            shipping_address: ShippingAddress {
                full_name: "Amani".into(),
                phone: "+254700000002".into(),
                email: None,
                address_line: "4 Kenyatta Road".into(),
                city: "Mombasa".into(),
                postal_code: None,
                notes: None,
            },
            delivery_history: vec![],
            is_gift: gift.is_some(),
            gift_details: gift,
            assigned_driver_id: None,
            estimated_delivery: Some(1_700_000_000_000),
            created_at: 1,
            updated_at: 1,
        };
        order.record(OrderStatus::Pending, "Order placed", "c1", 1);
        order
    }

    #[tokio::test]
    async fn test_gift_notification_not_sent_when_disabled() {
        let f = fixture();
        let result = f
            .dispatcher
            .send_gift_notification(&order(Some(gift(ContactMethod::Email, Some("amani@example.com"), false, true))))
            .await;
        assert!(!result.success);
        assert!(f.mail.sent().is_empty());

        let result = f.dispatcher.send_gift_notification(&order(None)).await;
        assert!(!result.success);
    }

    #[tokio::test]
    async fn test_gift_notification_skipped_without_contact() {
        let f = fixture();
        let result = f
            .dispatcher
            .send_gift_notification(&order(Some(gift(ContactMethod::Email, Some("   "), true, false))))
            .await;
        assert!(!result.success);
        assert!(result.message.contains("skipped"));
        assert!(f.mail.sent().is_empty());
    }

    #[tokio::test]
    async fn test_gift_email_hides_prices_and_links_tracking() {
        let f = fixture();
        let result = f
            .dispatcher
            .send_gift_notification(&order(Some(gift(ContactMethod::Email, Some("amani@example.com"), true, false))))
            .await;
        assert!(result.success);

        let sent = f.mail.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "amani@example.com");
        assert!(sent[0].body.contains("2 x Mug"));
        assert!(!sent[0].body.contains("1100"));
        assert!(sent[0].body.contains("/api/track?token=o1"));
    }

    #[tokio::test]
    async fn test_gift_email_shows_prices_when_allowed() {
        let f = fixture();
        f.dispatcher
            .send_gift_notification(&order(Some(gift(ContactMethod::Email, Some("amani@example.com"), true, true))))
            .await;
        assert!(f.mail.sent()[0].body.contains("Total: 1100.00"));
    }

    #[tokio::test]
    async fn test_gift_sms_is_simulated() {
        let f = fixture();
        let result = f
            .dispatcher
            .send_gift_notification(&order(Some(gift(ContactMethod::Sms, Some("+254700000002"), true, false))))
            .await;
        assert!(result.success);
        assert!(f.mail.sent().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_is_a_result_not_an_error() {
        let f = fixture();
        f.mail.set_failing(true);
        let result = f.dispatcher.send_receipt(&order(None)).await;
        assert!(!result.success);
    }

    #[tokio::test]
    async fn test_delivery_confirmation_reaches_distinct_recipient() {
        let f = fixture();
        let result = f
            .dispatcher
            .send_delivery_confirmation(&order(Some(gift(ContactMethod::Email, Some("amani@example.com"), true, false))))
            .await;
        assert!(result.success);

        let sent = f.mail.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].attachments[0].content.contains("1100.00"));
        assert_eq!(sent[1].to, "amani@example.com");
        assert!(!sent[1].attachments[0].content.contains("1100"));
    }

    #[tokio::test]
    async fn test_delivery_confirmation_not_duplicated_for_same_address() {
        let f = fixture();
        f.dispatcher
            .send_delivery_confirmation(&order(Some(gift(
                ContactMethod::Email,
                Some("Wanjiru@Example.com"),
                true,
                true,
            ))))
            .await;
        assert_eq!(f.mail.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_receipt_subject_follows_payment_status() {
        let f = fixture();
        let mut refunded = order(None);
        refunded.payment_status = PaymentStatus::Refunded;
        f.dispatcher.send_receipt(&refunded).await;

        let mut pending = order(None);
        pending.payment_status = PaymentStatus::Pending;
        f.dispatcher.send_receipt(&pending).await;

        let sent = f.mail.sent();
        assert!(sent[0].subject.starts_with("Refund processed"));
        assert_eq!(sent[0].attachments[0].filename, "refund-o1.txt");
        assert!(sent[1].subject.starts_with("Summary"));
    }

    #[tokio::test]
    async fn test_status_push_prunes_gone_endpoints() {
        let f = fixture();
        let keys = PushKeys {
            p256dh: "BKey".into(),
            auth: "auth".into(),
        };
        f.storage
            .save_push_subscription("c1", "https://push.example/live", keys.clone())
            .unwrap();
        f.storage
            .save_push_subscription("c1", "https://push.example/dead", keys)
            .unwrap();
        f.push.mark_gone("https://push.example/dead");

        let result = f.dispatcher.notify_status_change(&order(None)).await;
        assert!(result.success);
        assert_eq!(f.push.sent(), vec!["https://push.example/live".to_string()]);

        let remaining = f.storage.push_subscriptions("c1").unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].endpoint, "https://push.example/live");
    }
}
