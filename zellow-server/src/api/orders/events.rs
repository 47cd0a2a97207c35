//! Server-Sent Events stream of committed order changes

use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::Stream;
use serde::Deserialize;
use shared::order::{OrderEvent, OrderEventKind};
use std::time::Duration;
use tokio::sync::broadcast;

use crate::auth::StaffUser;
use crate::core::ServerState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventQuery {
    /// Only events of this order
    pub order_id: Option<String>,
}

fn event_name(kind: OrderEventKind) -> &'static str {
    match kind {
        OrderEventKind::Created => "created",
        OrderEventKind::StatusChanged => "status_changed",
        OrderEventKind::PaymentChanged => "payment_changed",
    }
}

fn to_sse(event: &OrderEvent) -> Result<Event, axum::Error> {
    Event::default()
        .event(event_name(event.kind))
        .id(event.sequence.to_string())
        .json_data(event)
}

/// Subscribes at connect time; earlier events are not replayed
pub async fn stream(
    State(state): State<ServerState>,
    StaffUser(user): StaffUser,
    Query(query): Query<EventQuery>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    tracing::info!(user_id = %user.id, order_id = ?query.order_id, "Order event stream opened");
    let receiver = state.lifecycle.subscribe();
    let filter = query.order_id;

    let events = futures::stream::unfold(receiver, move |mut receiver| {
        let filter = filter.clone();
        async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => {
                        if filter.as_deref().is_some_and(|id| id != event.order_id) {
                            continue;
                        }
                        return Some((to_sse(&event), receiver));
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "Order event stream lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
