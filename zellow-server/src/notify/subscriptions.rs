//! Push subscription table access

use shared::models::{PushKeys, PushSubscription};
use shared::util::now_millis;

use crate::db::storage::{PUSH_SUBSCRIPTIONS_TABLE, Storage, StorageResult};

impl Storage {
    pub fn push_subscriptions(&self, user_id: &str) -> StorageResult<Vec<PushSubscription>> {
        Ok(self
            .get::<Vec<PushSubscription>>(PUSH_SUBSCRIPTIONS_TABLE, user_id)?
            .unwrap_or_default())
    }

    /// Store a subscription; an existing entry for the endpoint is replaced
    pub fn save_push_subscription(
        &self,
        user_id: &str,
        endpoint: &str,
        keys: PushKeys,
    ) -> StorageResult<PushSubscription> {
        let txn = self.begin_write()?;
        let mut subscriptions: Vec<PushSubscription> = self
            .get_in(&txn, PUSH_SUBSCRIPTIONS_TABLE, user_id)?
            .unwrap_or_default();
        subscriptions.retain(|s| s.endpoint != endpoint);

        let subscription = PushSubscription {
            user_id: user_id.to_string(),
            endpoint: endpoint.to_string(),
            keys,
            created_at: now_millis(),
        };
        subscriptions.push(subscription.clone());
        self.put_in(&txn, PUSH_SUBSCRIPTIONS_TABLE, user_id, &subscriptions)?;
        txn.commit()?;
        Ok(subscription)
    }

    /// Remove one endpoint; returns whether it existed
    pub fn remove_push_subscription(&self, user_id: &str, endpoint: &str) -> StorageResult<bool> {
        let txn = self.begin_write()?;
        let mut subscriptions: Vec<PushSubscription> = self
            .get_in(&txn, PUSH_SUBSCRIPTIONS_TABLE, user_id)?
            .unwrap_or_default();
        let before = subscriptions.len();
        subscriptions.retain(|s| s.endpoint != endpoint);
        let removed = subscriptions.len() != before;

        if subscriptions.is_empty() {
            self.remove_in(&txn, PUSH_SUBSCRIPTIONS_TABLE, user_id)?;
        } else {
            self.put_in(&txn, PUSH_SUBSCRIPTIONS_TABLE, user_id, &subscriptions)?;
        }
        txn.commit()?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> PushKeys {
        PushKeys {
            p256dh: "BKey".into(),
            auth: "secret".into(),
        }
    }

    #[test]
    fn test_unique_by_endpoint() {
        let storage = Storage::open_in_memory().unwrap();
        storage.save_push_subscription("u1", "https://push.example/a", keys()).unwrap();
        storage.save_push_subscription("u1", "https://push.example/b", keys()).unwrap();
        storage.save_push_subscription("u1", "https://push.example/a", keys()).unwrap();

        let subs = storage.push_subscriptions("u1").unwrap();
        assert_eq!(subs.len(), 2);
        assert!(storage.push_subscriptions("u2").unwrap().is_empty());
    }

    #[test]
    fn test_remove() {
        let storage = Storage::open_in_memory().unwrap();
        storage.save_push_subscription("u1", "https://push.example/a", keys()).unwrap();
        assert!(storage.remove_push_subscription("u1", "https://push.example/a").unwrap());
        assert!(!storage.remove_push_subscription("u1", "https://push.example/a").unwrap());
        assert!(storage.push_subscriptions("u1").unwrap().is_empty());
    }
}
