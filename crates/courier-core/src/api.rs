// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The message API seam between the facade and a concrete transport.

use async_trait::async_trait;

use crate::error::CourierError;
use crate::types::{
    BatchOutcome, CreateMessage, Message, MessageFilter, MessageId, MessageStats, Page, SendBatch,
    SendMessage,
};

/// Typed access to the backend message resource.
///
/// Implemented over HTTP by `courier-client` and in memory by
/// `courier-test-utils`. Mutations promise cache coherence to callers: after
/// a successful write, previously read pages and stats must be treated as
/// stale and refetched.
#[async_trait]
pub trait MessageApi: Send + Sync {
    /// Fetch one page of messages matching `filter`.
    async fn list(
        &self,
        page: &Page,
        filter: &MessageFilter,
    ) -> Result<Vec<Message>, CourierError>;

    /// Fetch a single message. Fails with [`CourierError::NotFound`] when the
    /// backend has no such id.
    async fn get(&self, id: &MessageId) -> Result<Message, CourierError>;

    /// Fetch the aggregate delivery snapshot.
    async fn stats(&self) -> Result<MessageStats, CourierError>;

    /// Persist a message in `pending` state without dispatching it.
    async fn create(&self, data: CreateMessage) -> Result<Message, CourierError>;

    /// Persist and immediately dispatch a single message. The returned
    /// message is `pending` or `sent`, never `delivered` (delivery
    /// acknowledgment is asynchronous).
    async fn send(&self, data: SendMessage) -> Result<Message, CourierError>;

    /// Dispatch independent messages with partial-failure semantics. Per-item
    /// failures never fail the whole call.
    async fn send_batch(&self, data: SendBatch) -> Result<BatchOutcome, CourierError>;

    /// Delete a message. Deleting an already-deleted id reports
    /// [`CourierError::NotFound`], never a generic failure.
    async fn remove(&self, id: &MessageId) -> Result<(), CourierError>;
}
