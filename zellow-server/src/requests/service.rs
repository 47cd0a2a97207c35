use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::Role;
use shared::request::{
    ApprovalRequest, BulkOrderRequest, DecisionNote, DecisionStatus, NewApprovalRequest,
    NewBulkOrderRequest, NewStockRequest, StockRequest, StockRequestStatus, Workflow,
};
use shared::util::{new_id, now_millis};

use crate::auth::CurrentUser;
use crate::db::storage::{
    APPROVAL_REQUESTS_TABLE, BULK_ORDER_REQUESTS_TABLE, JsonTable, STOCK_REQUESTS_TABLE,
};
use crate::db::{ProductRepository, Storage, StorageError};
use crate::utils::validation::{MAX_NOTE_LEN, validate, validate_required_text};

/// Roles that decide approvals and bulk orders, and approve stock requests
const DECIDERS: &[Role] = &[Role::Admin, Role::Finance];
/// Roles that fulfil approved stock requests
const FULFILLERS: &[Role] = &[Role::Admin, Role::Supplier];

/// Step taken on a stock request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockAction {
    Approve,
    Reject,
    Fulfil,
}

#[derive(Debug, Clone)]
pub struct RequestService {
    pub(super) storage: Storage,
}

pub(super) fn request_not_found(kind: &str, id: &str) -> AppError {
    AppError::with_message(ErrorCode::RequestNotFound, format!("{kind} {id} not found"))
        .with_detail("id", id)
}

/// Trimmed note, `None` when blank
pub(super) fn decision_note(note: DecisionNote) -> AppResult<Option<String>> {
    match note.note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) {
        Some(note) => {
            validate_required_text(&note, "note", MAX_NOTE_LEN)?;
            Ok(Some(note))
        }
        None => Ok(None),
    }
}

impl RequestService {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub(super) fn load<T: DeserializeOwned>(&self, table: JsonTable, kind: &str, id: &str) -> AppResult<T> {
        self.storage
            .get(table, id)?
            .ok_or_else(|| request_not_found(kind, id))
    }

    /// Newest first
    fn list<T, F>(&self, table: JsonTable, created_at: F) -> AppResult<Vec<T>>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> i64,
    {
        let mut records: Vec<T> = self.storage.scan(table)?;
        records.sort_by_key(|r| std::cmp::Reverse(created_at(r)));
        Ok(records)
    }

    /// Load, transition and save a record in one write transaction
    fn transition<T>(
        &self,
        table: JsonTable,
        kind: &str,
        id: &str,
        to: T::Status,
        user: &CurrentUser,
        note: Option<String>,
    ) -> AppResult<T>
    where
        T: Workflow + Serialize + DeserializeOwned,
    {
        let txn = self.storage.begin_write()?;
        let mut record: T = self
            .storage
            .get_in(&txn, table, id)?
            .ok_or_else(|| request_not_found(kind, id))?;
        let from = record.status();

        record.transition(to, &user.id, note, now_millis())?;
        self.storage.put_in(&txn, table, id, &record)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            kind = %kind,
            id = %id,
            from = %from,
            to = %to,
            actor_id = %user.id,
            "Request status changed"
        );
        Ok(record)
    }

    // ==================== Approvals ====================

    pub fn create_approval(&self, user: &CurrentUser, input: NewApprovalRequest) -> AppResult<ApprovalRequest> {
        user.require_staff("create approval requests")?;
        validate(&input)?;

        let now = now_millis();
        let request = ApprovalRequest {
            id: new_id(),
            requester_id: user.id.clone(),
            title: input.title.trim().to_string(),
            description: input.description,
            amount: input.amount,
            status: DecisionStatus::Pending,
            status_log: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.storage.put(APPROVAL_REQUESTS_TABLE, &request.id, &request)?;
        tracing::info!(id = %request.id, requester_id = %user.id, "Approval request created");
        Ok(request)
    }

    pub fn list_approvals(&self, user: &CurrentUser) -> AppResult<Vec<ApprovalRequest>> {
        user.require_staff("list approval requests")?;
        self.list(APPROVAL_REQUESTS_TABLE, |r: &ApprovalRequest| r.created_at)
    }

    pub fn get_approval(&self, user: &CurrentUser, id: &str) -> AppResult<ApprovalRequest> {
        user.require_staff("view approval requests")?;
        self.load(APPROVAL_REQUESTS_TABLE, "Approval request", id)
    }

    pub fn decide_approval(
        &self,
        user: &CurrentUser,
        id: &str,
        approve: bool,
        note: DecisionNote,
    ) -> AppResult<ApprovalRequest> {
        user.require_roles(DECIDERS, "decide approval requests")?;
        let to = if approve {
            DecisionStatus::Approved
        } else {
            DecisionStatus::Rejected
        };
        self.transition(APPROVAL_REQUESTS_TABLE, "Approval request", id, to, user, decision_note(note)?)
    }

    // ==================== Bulk orders ====================

    pub fn create_bulk_order(&self, user: &CurrentUser, input: NewBulkOrderRequest) -> AppResult<BulkOrderRequest> {
        validate(&input)?;

        let now = now_millis();
        let request = BulkOrderRequest {
            id: new_id(),
            requester_id: user.id.clone(),
            contact_name: input.contact_name.trim().to_string(),
            contact_email: input.contact_email,
            organization: input.organization,
            items: input.items,
            notes: input.notes,
            status: DecisionStatus::Pending,
            status_log: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.storage.put(BULK_ORDER_REQUESTS_TABLE, &request.id, &request)?;
        tracing::info!(
            id = %request.id,
            requester_id = %user.id,
            lines = request.items.len(),
            "Bulk order request created"
        );
        Ok(request)
    }

    /// Staff see every enquiry, customers only their own
    pub fn list_bulk_orders(&self, user: &CurrentUser) -> AppResult<Vec<BulkOrderRequest>> {
        let mut requests = self.list(BULK_ORDER_REQUESTS_TABLE, |r: &BulkOrderRequest| r.created_at)?;
        if !user.is_staff() {
            requests.retain(|r| r.requester_id == user.id);
        }
        Ok(requests)
    }

    pub fn get_bulk_order(&self, user: &CurrentUser, id: &str) -> AppResult<BulkOrderRequest> {
        let request: BulkOrderRequest = self.load(BULK_ORDER_REQUESTS_TABLE, "Bulk order request", id)?;
        if !user.is_staff() && request.requester_id != user.id {
            return Err(request_not_found("Bulk order request", id));
        }
        Ok(request)
    }

    pub fn decide_bulk_order(
        &self,
        user: &CurrentUser,
        id: &str,
        approve: bool,
        note: DecisionNote,
    ) -> AppResult<BulkOrderRequest> {
        user.require_roles(DECIDERS, "decide bulk order requests")?;
        let to = if approve {
            DecisionStatus::Approved
        } else {
            DecisionStatus::Rejected
        };
        self.transition(BULK_ORDER_REQUESTS_TABLE, "Bulk order request", id, to, user, decision_note(note)?)
    }

    // ==================== Stock requests ====================

    pub fn create_stock_request(&self, user: &CurrentUser, input: NewStockRequest) -> AppResult<StockRequest> {
        user.require_staff("create stock requests")?;
        validate(&input)?;
        if self.storage.get_product(&input.product_id)?.is_none() {
            return Err(AppError::new(ErrorCode::ProductNotFound).with_detail("product_id", input.product_id));
        }

        let now = now_millis();
        let request = StockRequest {
            id: new_id(),
            requester_id: user.id.clone(),
            product_id: input.product_id,
            quantity: input.quantity,
            supplier_id: input.supplier_id,
            notes: input.notes,
            status: StockRequestStatus::Pending,
            status_log: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.storage.put(STOCK_REQUESTS_TABLE, &request.id, &request)?;
        tracing::info!(
            id = %request.id,
            product_id = %request.product_id,
            quantity = request.quantity,
            "Stock request created"
        );
        Ok(request)
    }

    pub fn list_stock_requests(&self, user: &CurrentUser) -> AppResult<Vec<StockRequest>> {
        user.require_staff("list stock requests")?;
        self.list(STOCK_REQUESTS_TABLE, |r: &StockRequest| r.created_at)
    }

    pub fn get_stock_request(&self, user: &CurrentUser, id: &str) -> AppResult<StockRequest> {
        user.require_staff("view stock requests")?;
        self.load(STOCK_REQUESTS_TABLE, "Stock request", id)
    }

    /// Approve, reject or fulfil.
    ///
    /// Finance decides pending requests, the supplier handles approved ones.
    /// Fulfilling adds the quantity to the product's stock in the same
    /// transaction as the status change.
    pub fn act_on_stock_request(
        &self,
        user: &CurrentUser,
        id: &str,
        action: StockAction,
        note: DecisionNote,
    ) -> AppResult<StockRequest> {
        user.require_roles(&[Role::Admin, Role::Finance, Role::Supplier], "act on stock requests")?;
        let note = decision_note(note)?;

        let txn = self.storage.begin_write()?;
        let mut request: StockRequest = self
            .storage
            .get_in(&txn, STOCK_REQUESTS_TABLE, id)?
            .ok_or_else(|| request_not_found("Stock request", id))?;

        let (to, allowed) = match (action, request.status) {
            (StockAction::Approve, _) => (StockRequestStatus::Approved, DECIDERS),
            (StockAction::Reject, StockRequestStatus::Approved) => (StockRequestStatus::Rejected, FULFILLERS),
            (StockAction::Reject, _) => (StockRequestStatus::Rejected, DECIDERS),
            (StockAction::Fulfil, _) => (StockRequestStatus::Fulfilled, FULFILLERS),
        };
        user.require_roles(allowed, "act on this stock request")?;

        let from = request.status;
        let now = now_millis();
        request.transition(to, &user.id, note, now)?;

        if to == StockRequestStatus::Fulfilled {
            let mut product = self
                .storage
                .product_in(&txn, &request.product_id)?
                .ok_or_else(|| {
                    AppError::new(ErrorCode::ProductNotFound).with_detail("product_id", request.product_id.clone())
                })?;
            product.stock = product.stock.saturating_add(request.quantity);
            product.updated_at = now;
            self.storage.put_product_in(&txn, &product)?;
            tracing::info!(
                product_id = %product.id,
                added = request.quantity,
                stock = product.stock,
                "Stock replenished"
            );
        }

        self.storage.put_in(&txn, STOCK_REQUESTS_TABLE, id, &request)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            kind = "Stock request",
            id = %id,
            from = %from,
            to = %to,
            actor_id = %user.id,
            "Request status changed"
        );
        Ok(request)
    }
}
