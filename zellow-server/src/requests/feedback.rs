//! Feedback threads
//!
//! A customer opens a thread with a first message. The first staff reply
//! moves it from open to replied. Either side may close it, after which no
//! more messages are accepted.

use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult};
use shared::request::{
    DecisionNote, FeedbackMessage, FeedbackStatus, FeedbackThread, NewFeedbackMessage,
    NewFeedbackThread, Workflow, WorkflowError,
};
use shared::util::{new_id, now_millis};

use super::service::{RequestService, decision_note, request_not_found};
use crate::auth::CurrentUser;
use crate::db::StorageError;
use crate::db::storage::FEEDBACK_THREADS_TABLE;
use crate::utils::validation::validate;

const KIND: &str = "Feedback thread";

/// Thread with its messages, oldest first
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackThreadView {
    pub thread: FeedbackThread,
    pub messages: Vec<FeedbackMessage>,
}

impl RequestService {
    /// Customers only reach their own threads; others look missing
    fn check_thread_access(&self, user: &CurrentUser, thread: &FeedbackThread) -> AppResult<()> {
        if user.is_staff() || thread.customer_id == user.id {
            Ok(())
        } else {
            Err(request_not_found(KIND, &thread.id))
        }
    }

    pub fn open_thread(&self, user: &CurrentUser, input: NewFeedbackThread) -> AppResult<FeedbackThreadView> {
        if user.is_staff() {
            return Err(AppError::permission_denied("Feedback threads are opened by customers"));
        }
        validate(&input)?;

        let now = now_millis();
        let thread = FeedbackThread {
            id: new_id(),
            customer_id: user.id.clone(),
            subject: input.subject.trim().to_string(),
            status: FeedbackStatus::Open,
            status_log: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        let message = FeedbackMessage {
            id: new_id(),
            thread_id: thread.id.clone(),
            author_id: user.id.clone(),
            from_staff: false,
            body: input.message,
            created_at: now,
        };

        let txn = self.storage.begin_write()?;
        self.storage.put_in(&txn, FEEDBACK_THREADS_TABLE, &thread.id, &thread)?;
        self.storage.append_feedback_message(&txn, &thread.id, &message)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(thread_id = %thread.id, customer_id = %user.id, "Feedback thread opened");
        Ok(FeedbackThreadView {
            thread,
            messages: vec![message],
        })
    }

    /// Staff see every thread, customers their own; newest activity first
    pub fn list_threads(&self, user: &CurrentUser) -> AppResult<Vec<FeedbackThread>> {
        let mut threads: Vec<FeedbackThread> = self.storage.scan(FEEDBACK_THREADS_TABLE)?;
        if !user.is_staff() {
            threads.retain(|t| t.customer_id == user.id);
        }
        threads.sort_by_key(|t| std::cmp::Reverse(t.updated_at));
        Ok(threads)
    }

    pub fn get_thread(&self, user: &CurrentUser, thread_id: &str) -> AppResult<FeedbackThreadView> {
        let thread: FeedbackThread = self.load(FEEDBACK_THREADS_TABLE, KIND, thread_id)?;
        self.check_thread_access(user, &thread)?;
        let messages = self.storage.feedback_messages(thread_id)?;
        Ok(FeedbackThreadView { thread, messages })
    }

    /// Append a message. A staff message on an open thread marks it replied.
    pub fn post_message(
        &self,
        user: &CurrentUser,
        thread_id: &str,
        input: NewFeedbackMessage,
    ) -> AppResult<FeedbackMessage> {
        validate(&input)?;

        let txn = self.storage.begin_write()?;
        let mut thread: FeedbackThread = self
            .storage
            .get_in(&txn, FEEDBACK_THREADS_TABLE, thread_id)?
            .ok_or_else(|| request_not_found(KIND, thread_id))?;
        self.check_thread_access(user, &thread)?;
        if thread.status == FeedbackStatus::Closed {
            return Err(WorkflowError::ThreadClosed.into());
        }

        let now = now_millis();
        let from_staff = user.is_staff();
        if from_staff && thread.status == FeedbackStatus::Open {
            thread.transition(FeedbackStatus::Replied, &user.id, None, now)?;
        } else {
            thread.updated_at = now;
        }

        let message = FeedbackMessage {
            id: new_id(),
            thread_id: thread.id.clone(),
            author_id: user.id.clone(),
            from_staff,
            body: input.body,
            created_at: now,
        };
        self.storage.append_feedback_message(&txn, thread_id, &message)?;
        self.storage.put_in(&txn, FEEDBACK_THREADS_TABLE, thread_id, &thread)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            thread_id = %thread_id,
            author_id = %user.id,
            from_staff,
            status = %thread.status,
            "Feedback message posted"
        );
        Ok(message)
    }

    pub fn close_thread(&self, user: &CurrentUser, thread_id: &str, note: DecisionNote) -> AppResult<FeedbackThread> {
        let note = decision_note(note)?;

        let txn = self.storage.begin_write()?;
        let mut thread: FeedbackThread = self
            .storage
            .get_in(&txn, FEEDBACK_THREADS_TABLE, thread_id)?
            .ok_or_else(|| request_not_found(KIND, thread_id))?;
        self.check_thread_access(user, &thread)?;

        thread.transition(FeedbackStatus::Closed, &user.id, note, now_millis())?;
        self.storage.put_in(&txn, FEEDBACK_THREADS_TABLE, thread_id, &thread)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(thread_id = %thread_id, actor_id = %user.id, "Feedback thread closed");
        Ok(thread)
    }
}
