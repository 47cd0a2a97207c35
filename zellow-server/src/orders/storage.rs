//! Order table access

use redb::WriteTransaction;
use shared::order::Order;

use crate::db::storage::{ORDERS_TABLE, Storage, StorageResult};

impl Storage {
    pub fn get_order(&self, order_id: &str) -> StorageResult<Option<Order>> {
        self.get(ORDERS_TABLE, order_id)
    }

    pub fn order_in(&self, txn: &WriteTransaction, order_id: &str) -> StorageResult<Option<Order>> {
        self.get_in(txn, ORDERS_TABLE, order_id)
    }

    pub fn put_order_in(&self, txn: &WriteTransaction, order: &Order) -> StorageResult<()> {
        self.put_in(txn, ORDERS_TABLE, &order.id, order)
    }

    /// All orders, newest first
    pub fn list_orders(&self) -> StorageResult<Vec<Order>> {
        let mut orders: Vec<Order> = self.scan(ORDERS_TABLE)?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(orders)
    }
}
