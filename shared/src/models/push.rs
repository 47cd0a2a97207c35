//! Browser push subscriptions

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PushKeys {
    #[validate(length(min = 1))]
    pub p256dh: String,
    #[validate(length(min = 1))]
    pub auth: String,
}

/// Subscription object as produced by the browser Push API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PushSubscriptionInput {
    #[validate(url)]
    pub endpoint: String,
    #[validate(nested)]
    pub keys: PushKeys,
}

/// Stored subscription, unique per endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushSubscription {
    pub user_id: String,
    pub endpoint: String,
    pub keys: PushKeys,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PushUnsubscribe {
    #[validate(url)]
    pub endpoint: String,
}
