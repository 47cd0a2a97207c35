//! redb-based storage layer
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `products` | `product_id` | `Product` | Catalog with live stock |
//! | `carts` | `owner_id` | `Cart` | Server-side cart per customer |
//! | `checkout_drafts` | `owner_id` | `CheckoutDraft` | Checkout step selections |
//! | `orders` | `order_id` | `Order` | Orders (never deleted) |
//! | `approval_requests` | `id` | `ApprovalRequest` | Staff approvals |
//! | `bulk_order_requests` | `id` | `BulkOrderRequest` | Bulk order enquiries |
//! | `stock_requests` | `id` | `StockRequest` | Restock requests |
//! | `feedback_threads` | `id` | `FeedbackThread` | Feedback threads |
//! | `feedback_messages` | `(thread_id, sequence)` | `FeedbackMessage` | Thread messages (append-only) |
//! | `push_subscriptions` | `user_id` | `Vec<PushSubscription>` | Browser push endpoints |
//! | `sequence_counter` | name | `u64` | Monotonic counters |
//!
//! Every value is JSON. Changes spanning several records go through a single
//! `WriteTransaction`, so they commit or roll back together.

use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition,
    WriteTransaction,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// JSON value table keyed by string id
pub type JsonTable = TableDefinition<'static, &'static str, &'static [u8]>;

pub const PRODUCTS_TABLE: JsonTable = TableDefinition::new("products");
pub const CARTS_TABLE: JsonTable = TableDefinition::new("carts");
pub const CHECKOUT_DRAFTS_TABLE: JsonTable = TableDefinition::new("checkout_drafts");
pub const ORDERS_TABLE: JsonTable = TableDefinition::new("orders");
pub const APPROVAL_REQUESTS_TABLE: JsonTable = TableDefinition::new("approval_requests");
pub const BULK_ORDER_REQUESTS_TABLE: JsonTable = TableDefinition::new("bulk_order_requests");
pub const STOCK_REQUESTS_TABLE: JsonTable = TableDefinition::new("stock_requests");
pub const FEEDBACK_THREADS_TABLE: JsonTable = TableDefinition::new("feedback_threads");
pub const PUSH_SUBSCRIPTIONS_TABLE: JsonTable = TableDefinition::new("push_subscriptions");

/// Messages: key = (thread_id, sequence), value = JSON-serialized FeedbackMessage
const FEEDBACK_MESSAGES_TABLE: TableDefinition<(&str, u64), &[u8]> =
    TableDefinition::new("feedback_messages");

/// Counters: key = counter name, value = last issued number
const SEQUENCE_TABLE: TableDefinition<&str, u64> = TableDefinition::new("sequence_counter");

pub const ORDER_EVENT_SEQUENCE: &str = "order_event";
const FEEDBACK_MESSAGE_SEQUENCE: &str = "feedback_message";

const JSON_TABLES: &[JsonTable] = &[
    PRODUCTS_TABLE,
    CARTS_TABLE,
    CHECKOUT_DRAFTS_TABLE,
    ORDERS_TABLE,
    APPROVAL_REQUESTS_TABLE,
    BULK_ORDER_REQUESTS_TABLE,
    STOCK_REQUESTS_TABLE,
    FEEDBACK_THREADS_TABLE,
    PUSH_SUBSCRIPTIONS_TABLE,
];

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Storefront storage backed by redb
#[derive(Clone)]
pub struct Storage {
    db: Arc<Database>,
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage").finish_non_exhaustive()
    }
}

impl Storage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            for table in JSON_TABLES {
                let _ = write_txn.open_table(*table)?;
            }
            let _ = write_txn.open_table(FEEDBACK_MESSAGES_TABLE)?;
            let _ = write_txn.open_table(SEQUENCE_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Generic JSON record access ==========

    /// Read one record
    pub fn get<T: DeserializeOwned>(&self, table: JsonTable, key: &str) -> StorageResult<Option<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(table)?;
        match table.get(key)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Read one record inside a write transaction
    pub fn get_in<T: DeserializeOwned>(
        &self,
        txn: &WriteTransaction,
        table: JsonTable,
        key: &str,
    ) -> StorageResult<Option<T>> {
        let table = txn.open_table(table)?;
        let value = table.get(key)?.map(|guard| guard.value().to_vec());
        match value {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Insert or replace one record inside a write transaction
    pub fn put_in<T: Serialize>(
        &self,
        txn: &WriteTransaction,
        table: JsonTable,
        key: &str,
        value: &T,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(table)?;
        let bytes = serde_json::to_vec(value)?;
        table.insert(key, bytes.as_slice())?;
        Ok(())
    }

    /// Remove one record inside a write transaction
    pub fn remove_in(&self, txn: &WriteTransaction, table: JsonTable, key: &str) -> StorageResult<()> {
        let mut table = txn.open_table(table)?;
        table.remove(key)?;
        Ok(())
    }

    /// Insert or replace one record in its own transaction
    pub fn put<T: Serialize>(&self, table: JsonTable, key: &str, value: &T) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        self.put_in(&txn, table, key, value)?;
        txn.commit()?;
        Ok(())
    }

    /// Remove one record in its own transaction
    pub fn remove(&self, table: JsonTable, key: &str) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        self.remove_in(&txn, table, key)?;
        txn.commit()?;
        Ok(())
    }

    /// Read every record of a table, in key order
    pub fn scan<T: DeserializeOwned>(&self, table: JsonTable) -> StorageResult<Vec<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(table)?;

        let mut records = Vec::with_capacity(table.len()? as usize);
        for result in table.iter()? {
            let (_key, value) = result?;
            records.push(serde_json::from_slice(value.value())?);
        }
        Ok(records)
    }

    // ========== Sequence Operations ==========

    /// Increment and return a named counter (within transaction)
    pub fn next_sequence(&self, txn: &WriteTransaction, name: &str) -> StorageResult<u64> {
        let mut table = txn.open_table(SEQUENCE_TABLE)?;
        let current = table.get(name)?.map(|guard| guard.value()).unwrap_or(0);
        let next = current + 1;
        table.insert(name, next)?;
        Ok(next)
    }

    /// Current value of a named counter (read-only)
    pub fn current_sequence(&self, name: &str) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SEQUENCE_TABLE)?;
        Ok(table.get(name)?.map(|guard| guard.value()).unwrap_or(0))
    }

    // ========== Feedback Messages ==========

    /// Append a message to a thread (within transaction)
    pub fn append_feedback_message<T: Serialize>(
        &self,
        txn: &WriteTransaction,
        thread_id: &str,
        message: &T,
    ) -> StorageResult<u64> {
        let sequence = self.next_sequence(txn, FEEDBACK_MESSAGE_SEQUENCE)?;
        let mut table = txn.open_table(FEEDBACK_MESSAGES_TABLE)?;
        let value = serde_json::to_vec(message)?;
        table.insert((thread_id, sequence), value.as_slice())?;
        Ok(sequence)
    }

    /// All messages of a thread, oldest first
    pub fn feedback_messages<T: DeserializeOwned>(&self, thread_id: &str) -> StorageResult<Vec<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(FEEDBACK_MESSAGES_TABLE)?;

        let mut messages = Vec::new();
        for result in table.range((thread_id, 0u64)..=(thread_id, u64::MAX))? {
            let (_key, value) = result?;
            messages.push(serde_json::from_slice(value.value())?);
        }
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: String,
        text: String,
    }

    fn note(id: &str, text: &str) -> Note {
        Note {
            id: id.into(),
            text: text.into(),
        }
    }

    #[test]
    fn test_put_get_remove() {
        let storage = Storage::open_in_memory().unwrap();
        storage.put(ORDERS_TABLE, "a", &note("a", "first")).unwrap();

        let loaded: Option<Note> = storage.get(ORDERS_TABLE, "a").unwrap();
        assert_eq!(loaded, Some(note("a", "first")));

        storage.remove(ORDERS_TABLE, "a").unwrap();
        let loaded: Option<Note> = storage.get(ORDERS_TABLE, "a").unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_uncommitted_transaction_leaves_no_trace() {
        let storage = Storage::open_in_memory().unwrap();
        {
            let txn = storage.begin_write().unwrap();
            storage.put_in(&txn, ORDERS_TABLE, "a", &note("a", "x")).unwrap();
            storage.put_in(&txn, PRODUCTS_TABLE, "p", &note("p", "y")).unwrap();
            txn.abort().unwrap();
        }
        let orders: Vec<Note> = storage.scan(ORDERS_TABLE).unwrap();
        let products: Vec<Note> = storage.scan(PRODUCTS_TABLE).unwrap();
        assert!(orders.is_empty());
        assert!(products.is_empty());
    }

    #[test]
    fn test_sequence_increments() {
        let storage = Storage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        assert_eq!(storage.next_sequence(&txn, ORDER_EVENT_SEQUENCE).unwrap(), 1);
        assert_eq!(storage.next_sequence(&txn, ORDER_EVENT_SEQUENCE).unwrap(), 2);
        txn.commit().unwrap();
        assert_eq!(storage.current_sequence(ORDER_EVENT_SEQUENCE).unwrap(), 2);
    }

    #[test]
    fn test_feedback_messages_scoped_by_thread() {
        let storage = Storage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        storage.append_feedback_message(&txn, "t1", &note("m1", "hello")).unwrap();
        storage.append_feedback_message(&txn, "t2", &note("m2", "other")).unwrap();
        storage.append_feedback_message(&txn, "t1", &note("m3", "again")).unwrap();
        txn.commit().unwrap();

        let messages: Vec<Note> = storage.feedback_messages("t1").unwrap();
        assert_eq!(messages, vec![note("m1", "hello"), note("m3", "again")]);
    }

    #[test]
    fn test_file_backed_storage_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("database").join("zellow.redb");
        {
            let storage = Storage::open(&path).unwrap();
            storage.put(PRODUCTS_TABLE, "p1", &note("p1", "mug")).unwrap();
        }
        let storage = Storage::open(&path).unwrap();
        let loaded: Option<Note> = storage.get(PRODUCTS_TABLE, "p1").unwrap();
        assert_eq!(loaded, Some(note("p1", "mug")));
    }
}
