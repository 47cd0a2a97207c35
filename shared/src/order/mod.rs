//! Order lifecycle module
//!
//! - Status: the fulfilment and payment state machines
//! - Commands: named, role-gated actions that move an order
//! - Events: committed changes broadcast to listeners
//! - Types: the order record and its append-only delivery history

pub mod command;
pub mod event;
pub mod status;
pub mod types;

pub use command::{CommandRequest, LifecycleCommand};
pub use event::{OrderEvent, OrderEventKind};
pub use status::{OrderStatus, PaymentStatus};
pub use types::{DeliveryHistoryEntry, Order, OrderItem};
