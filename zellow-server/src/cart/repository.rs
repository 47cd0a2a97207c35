use redb::WriteTransaction;
use shared::models::Cart;

use crate::db::storage::{CARTS_TABLE, Storage, StorageResult};

/// Whole-cart persistence. `save` replaces the stored state.
pub trait CartRepository: Send + Sync {
    /// Stored cart, or an empty one for owners without a cart
    fn load(&self, owner_id: &str) -> StorageResult<Cart>;

    fn save(&self, cart: &Cart) -> StorageResult<()>;

    fn delete(&self, owner_id: &str) -> StorageResult<()>;
}

/// [`CartRepository`] over the redb `carts` table
#[derive(Debug, Clone)]
pub struct RedbCartRepository {
    storage: Storage,
}

impl RedbCartRepository {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }
}

impl CartRepository for RedbCartRepository {
    fn load(&self, owner_id: &str) -> StorageResult<Cart> {
        Ok(self
            .storage
            .get(CARTS_TABLE, owner_id)?
            .unwrap_or_else(|| Cart::new(owner_id)))
    }

    fn save(&self, cart: &Cart) -> StorageResult<()> {
        self.storage.put(CARTS_TABLE, &cart.owner_id, cart)
    }

    fn delete(&self, owner_id: &str) -> StorageResult<()> {
        self.storage.remove(CARTS_TABLE, owner_id)
    }
}

impl Storage {
    /// Cart read inside the order-creation transaction
    pub fn cart_in(&self, txn: &WriteTransaction, owner_id: &str) -> StorageResult<Cart> {
        Ok(self
            .get_in(txn, CARTS_TABLE, owner_id)?
            .unwrap_or_else(|| Cart::new(owner_id)))
    }

    pub fn remove_cart_in(&self, txn: &WriteTransaction, owner_id: &str) -> StorageResult<()> {
        self.remove_in(txn, CARTS_TABLE, owner_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_cart_loads_empty() {
        let repo = RedbCartRepository::new(Storage::open_in_memory().unwrap());
        let cart = repo.load("c1").unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.owner_id, "c1");
    }

    #[test]
    fn test_save_replaces_and_delete_clears() {
        let repo = RedbCartRepository::new(Storage::open_in_memory().unwrap());
        let mut cart = Cart::new("c1");
        cart.updated_at = 5;
        repo.save(&cart).unwrap();
        assert_eq!(repo.load("c1").unwrap().updated_at, 5);

        repo.delete("c1").unwrap();
        assert_eq!(repo.load("c1").unwrap().updated_at, 0);
    }
}
