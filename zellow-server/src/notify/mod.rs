//! Notifications
//!
//! - [`NotificationDispatcher`] - gift, delivery, receipt and push sends
//! - [`NotificationWorker`] - reacts to committed order events
//! - [`MailTransport`] / [`PushSender`] / [`ReceiptRenderer`] - external seams

mod dispatcher;
pub mod mailer;
pub mod push;
pub mod receipt;
mod subscriptions;
mod worker;

pub use dispatcher::NotificationDispatcher;
pub use mailer::{MailError, MailMessage, MailTransport, RecordingTransport, transport_from_config};
pub use push::{PushError, PushSender, RecordingPushSender, WebPushSender};
pub use receipt::{PlainTextReceipt, ReceiptKind, ReceiptRenderer};
pub use worker::NotificationWorker;
