//! Product catalog
//!
//! Prices and stock are read from here on every cart mutation and again inside
//! the order-creation transaction.

use redb::WriteTransaction;
use shared::models::Product;

use super::storage::{PRODUCTS_TABLE, Storage, StorageResult};

pub trait ProductRepository: Send + Sync {
    fn get_product(&self, id: &str) -> StorageResult<Option<Product>>;

    /// Every product, ordered by id
    fn list_products(&self) -> StorageResult<Vec<Product>>;

    fn upsert_product(&self, product: &Product) -> StorageResult<()>;
}

impl ProductRepository for Storage {
    fn get_product(&self, id: &str) -> StorageResult<Option<Product>> {
        self.get(PRODUCTS_TABLE, id)
    }

    fn list_products(&self) -> StorageResult<Vec<Product>> {
        self.scan(PRODUCTS_TABLE)
    }

    fn upsert_product(&self, product: &Product) -> StorageResult<()> {
        self.put(PRODUCTS_TABLE, &product.id, product)
    }
}

impl Storage {
    /// Product read inside a write transaction
    pub fn product_in(&self, txn: &WriteTransaction, id: &str) -> StorageResult<Option<Product>> {
        self.get_in(txn, PRODUCTS_TABLE, id)
    }

    pub fn put_product_in(&self, txn: &WriteTransaction, product: &Product) -> StorageResult<()> {
        self.put_in(txn, PRODUCTS_TABLE, &product.id, product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn product(id: &str, stock: u32) -> Product {
        Product {
            id: id.into(),
            name: id.to_uppercase(),
            price: Decimal::from(100),
            stock,
            image_url: None,
            category: None,
            customization_options: vec![],
            updated_at: 0,
        }
    }

    #[test]
    fn test_catalog_upsert_and_list() {
        let storage = Storage::open_in_memory().unwrap();
        storage.upsert_product(&product("b", 1)).unwrap();
        storage.upsert_product(&product("a", 2)).unwrap();
        storage.upsert_product(&product("a", 7)).unwrap();

        let all = storage.list_products().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "a");
        assert_eq!(all[0].stock, 7);
        assert!(storage.get_product("missing").unwrap().is_none());
    }
}
