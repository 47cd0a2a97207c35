//! Receipt documents attached to customer mail

use chrono::{TimeZone, Utc};
use shared::order::{Order, PaymentStatus};
use std::fmt::Write;

use super::mailer::Attachment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptKind {
    Receipt,
    RefundNotice,
    OrderSummary,
    DeliveryConfirmation,
}

impl ReceiptKind {
    /// Document matching the order's payment state
    pub fn for_payment(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Paid => ReceiptKind::Receipt,
            PaymentStatus::Refunded => ReceiptKind::RefundNotice,
            PaymentStatus::Pending | PaymentStatus::Failed => ReceiptKind::OrderSummary,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ReceiptKind::Receipt => "Payment Receipt",
            ReceiptKind::RefundNotice => "Refund Notice",
            ReceiptKind::OrderSummary => "Order Summary",
            ReceiptKind::DeliveryConfirmation => "Delivery Confirmation",
        }
    }

    fn slug(&self) -> &'static str {
        match self {
            ReceiptKind::Receipt => "receipt",
            ReceiptKind::RefundNotice => "refund",
            ReceiptKind::OrderSummary => "summary",
            ReceiptKind::DeliveryConfirmation => "delivery",
        }
    }
}

/// Renders an order into an attachable document
pub trait ReceiptRenderer: Send + Sync {
    /// `show_prices == false` leaves every amount out
    fn render(&self, order: &Order, kind: ReceiptKind, show_prices: bool) -> Attachment;
}

/// Fixed-width plain text
#[derive(Debug, Default)]
pub struct PlainTextReceipt;

const WIDTH: usize = 48;

fn format_date(millis: i64) -> String {
    Utc.timestamp_millis_opt(millis)
        .single()
        .map(|d| d.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_default()
}

impl ReceiptRenderer for PlainTextReceipt {
    fn render(&self, order: &Order, kind: ReceiptKind, show_prices: bool) -> Attachment {
        let mut out = String::new();
        let rule = "-".repeat(WIDTH);

        let _ = writeln!(out, "{:^WIDTH$}", "ZELLOW ENTERPRISES");
        let _ = writeln!(out, "{:^WIDTH$}", kind.title());
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "Order:    {}", order.id);
        let _ = writeln!(out, "Placed:   {}", format_date(order.created_at));
        let _ = writeln!(out, "Customer: {}", order.customer_name);
        let _ = writeln!(out, "Status:   {}", order.status.label());
        let _ = writeln!(out, "{rule}");

        for item in &order.items {
            let label = format!("{} x {}", item.quantity, item.name);
            if show_prices {
                let amount = format!("{:.2}", item.line_total());
                let pad = WIDTH.saturating_sub(amount.len() + 1);
                let _ = writeln!(out, "{label:<pad$} {amount}");
            } else {
                let _ = writeln!(out, "{label}");
            }
            for (key, value) in &item.customizations {
                let _ = writeln!(out, "    {key}: {value}");
            }
        }

        if show_prices {
            let _ = writeln!(out, "{rule}");
            for (label, amount) in [
                ("Subtotal", order.sub_total),
                ("Shipping", order.shipping_cost),
                ("Total", order.total_amount),
            ] {
                let amount = format!("{amount:.2}");
                let pad = WIDTH.saturating_sub(amount.len() + 1);
                let _ = writeln!(out, "{label:<pad$} {amount}");
            }
            let _ = writeln!(
                out,
                "Payment:  {} ({})",
                order.payment_method, order.payment_status
            );
        }
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "{:^WIDTH$}", "Thank you for shopping with Zellow");

        Attachment {
            filename: format!("{}-{}.txt", kind.slug(), order.id),
            content_type: "text/plain; charset=utf-8".to_string(),
            content: out,
        }
    }
}
