// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The message management facade.
//!
//! [`MessageManager`] composes a [`MessageApi`] transport, the keyed read
//! cache, and the query state into one read/write surface. Views consume
//! [`ManagerSnapshot`]; writes go through the mutation methods, which
//! invalidate the cache and refetch on success rather than patching local
//! state -- aggregate counts cannot be derived from a partial page.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use courier_core::{
    BatchOutcome, CourierError, CreateMessage, Message, MessageApi, MessageFilter, MessageId,
    MessageStats, Page, SendBatch, SendMessage,
};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::cache::ReadCache;
use crate::filters::{PagePatch, QueryState};

/// Default freshness window for cached reads.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(10);

/// Point-in-time view of the facade for rendering.
///
/// Reads carry independent loading/error flags so a stats failure never
/// blanks the message list and vice versa. On a read failure the previous
/// data stays visible (stale-but-present) with the error recorded alongside.
#[derive(Debug, Clone, Default)]
pub struct ManagerSnapshot {
    pub messages: Vec<Message>,
    pub stats: Option<MessageStats>,
    pub messages_loading: bool,
    pub stats_loading: bool,
    pub messages_error: Option<String>,
    pub stats_error: Option<String>,
    pub creating: bool,
    pub sending: bool,
    pub batch_sending: bool,
    pub deleting: bool,
}

#[derive(Default)]
struct ManagerState {
    query: QueryState,
    messages: Vec<Message>,
    stats: Option<MessageStats>,
    messages_loading: bool,
    stats_loading: bool,
    messages_error: Option<String>,
    stats_error: Option<String>,
    creating: bool,
    sending: bool,
    batch_sending: bool,
    deleting: bool,
}

/// Read/write surface over the message backend.
pub struct MessageManager {
    api: Arc<dyn MessageApi>,
    state: Mutex<ManagerState>,
    cache: Mutex<ReadCache>,
    /// Bumped whenever the query state changes or a write invalidates the
    /// cache. A page fetch records the value at dispatch; a result arriving
    /// under a newer generation is superseded and discarded.
    generation: AtomicU64,
}

impl MessageManager {
    pub fn new(api: Arc<dyn MessageApi>) -> Self {
        Self::with_cache_ttl(api, DEFAULT_CACHE_TTL)
    }

    pub fn with_cache_ttl(api: Arc<dyn MessageApi>, ttl: Duration) -> Self {
        Self {
            api,
            state: Mutex::new(ManagerState::default()),
            cache: Mutex::new(ReadCache::new(ttl)),
            generation: AtomicU64::new(0),
        }
    }

    pub async fn snapshot(&self) -> ManagerSnapshot {
        let st = self.state.lock().await;
        ManagerSnapshot {
            messages: st.messages.clone(),
            stats: st.stats,
            messages_loading: st.messages_loading,
            stats_loading: st.stats_loading,
            messages_error: st.messages_error.clone(),
            stats_error: st.stats_error.clone(),
            creating: st.creating,
            sending: st.sending,
            batch_sending: st.batch_sending,
            deleting: st.deleting,
        }
    }

    /// The query the next `refresh_messages` will issue.
    pub async fn query(&self) -> (Page, MessageFilter) {
        let st = self.state.lock().await;
        (st.query.page().clone(), st.query.filter().clone())
    }

    /// Refetches the current page, serving a fresh cache entry when one
    /// exists. A result superseded by a query change or a write is dropped.
    pub async fn refresh_messages(&self) -> Result<(), CourierError> {
        let (generation, key, page, filter) = {
            let mut st = self.state.lock().await;
            let page = st.query.page().clone();
            let filter = st.query.filter().clone();
            let key = ReadCache::list_key(&page, &filter);
            let cached = self.cache.lock().await.get_list(&key).cloned();
            if let Some(messages) = cached {
                st.messages = messages;
                st.messages_error = None;
                st.messages_loading = false;
                return Ok(());
            }
            st.messages_loading = true;
            (self.generation.load(Ordering::SeqCst), key, page, filter)
        };

        let result = self.api.list(&page, &filter).await;

        let mut st = self.state.lock().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(key = %key, "discarding superseded page result");
            return Ok(());
        }
        st.messages_loading = false;
        match result {
            Ok(messages) => {
                self.cache.lock().await.put_list(key, messages.clone());
                st.messages = messages;
                st.messages_error = None;
                Ok(())
            }
            Err(err) => {
                st.messages_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Refetches the aggregate snapshot. Single slot, last write wins.
    pub async fn refresh_stats(&self) -> Result<(), CourierError> {
        {
            let mut st = self.state.lock().await;
            let cached = self.cache.lock().await.get_stats().copied();
            if let Some(stats) = cached {
                st.stats = Some(stats);
                st.stats_error = None;
                st.stats_loading = false;
                return Ok(());
            }
            st.stats_loading = true;
        }

        let result = self.api.stats().await;

        let mut st = self.state.lock().await;
        st.stats_loading = false;
        match result {
            Ok(stats) => {
                self.cache.lock().await.put_stats(stats);
                st.stats = Some(stats);
                st.stats_error = None;
                Ok(())
            }
            Err(err) => {
                st.stats_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Refreshes the page and the stats concurrently; neither read blocks
    /// the other.
    pub async fn refresh(&self) -> Result<(), CourierError> {
        let (messages, stats) = tokio::join!(self.refresh_messages(), self.refresh_stats());
        messages.and(stats)
    }

    /// Merges `patch` into the filter, resets to the first page, and
    /// refetches.
    pub async fn update_filters(&self, patch: MessageFilter) -> Result<(), CourierError> {
        {
            let mut st = self.state.lock().await;
            st.query.update_filter(patch);
        }
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.refresh_messages().await
    }

    /// Merges `patch` into the pagination window and refetches.
    pub async fn update_page(&self, patch: PagePatch) -> Result<(), CourierError> {
        {
            let mut st = self.state.lock().await;
            st.query.update_page(patch);
        }
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.refresh_messages().await
    }

    /// Resets filter and pagination to defaults and refetches.
    pub async fn clear_filters(&self) -> Result<(), CourierError> {
        {
            let mut st = self.state.lock().await;
            st.query.clear();
        }
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.refresh_messages().await
    }

    /// Persists a draft. On success the page and stats are refetched.
    pub async fn create_message(&self, data: CreateMessage) -> Result<Message, CourierError> {
        self.state.lock().await.creating = true;
        let result = self.api.create(data).await;
        self.state.lock().await.creating = false;
        match result {
            Ok(message) => {
                self.after_successful_write().await;
                Ok(message)
            }
            Err(err) => Err(err),
        }
    }

    /// Dispatches a single message. No optimistic update: the page is only
    /// refetched after the backend confirms.
    pub async fn send_message(&self, data: SendMessage) -> Result<Message, CourierError> {
        self.state.lock().await.sending = true;
        let result = self.api.send(data).await;
        self.state.lock().await.sending = false;
        match result {
            Ok(message) => {
                self.after_successful_write().await;
                Ok(message)
            }
            Err(err) => Err(err),
        }
    }

    /// Dispatches a batch. Partial failure is part of the outcome; the call
    /// counts as a successful write whenever the HTTP call went through.
    pub async fn send_batch(&self, data: SendBatch) -> Result<BatchOutcome, CourierError> {
        self.state.lock().await.batch_sending = true;
        let result = self.api.send_batch(data).await;
        self.state.lock().await.batch_sending = false;
        match result {
            Ok(outcome) => {
                self.after_successful_write().await;
                Ok(outcome)
            }
            Err(err) => Err(err),
        }
    }

    /// Deletes a message. Deleting an id the backend no longer knows is a
    /// no-op, not an error.
    pub async fn delete_message(&self, id: &MessageId) -> Result<(), CourierError> {
        self.state.lock().await.deleting = true;
        let result = match self.api.remove(id).await {
            Err(CourierError::NotFound { id }) => {
                debug!(%id, "delete of missing message treated as no-op");
                Ok(())
            }
            other => other,
        };
        self.state.lock().await.deleting = false;
        match result {
            Ok(()) => {
                self.after_successful_write().await;
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Invalidates every cached read and refetches. Refetch failures land in
    /// the read error flags; the write itself already succeeded.
    async fn after_successful_write(&self) {
        self.cache.lock().await.invalidate_all();
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Err(err) = self.refresh_messages().await {
            warn!(error = %err, "page refetch after write failed");
        }
        if let Err(err) = self.refresh_stats().await {
            warn!(error = %err, "stats refetch after write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::MessageStatus;
    use courier_test_utils::{sample_message, MockMessageApi};

    async fn manager_with(messages: Vec<Message>) -> (Arc<MockMessageApi>, MessageManager) {
        let api = Arc::new(MockMessageApi::with_messages(messages).await);
        let manager = MessageManager::with_cache_ttl(api.clone(), Duration::ZERO);
        (api, manager)
    }

    #[tokio::test]
    async fn snapshot_starts_empty_and_not_loading() {
        let (_, manager) = manager_with(Vec::new()).await;
        let snap = manager.snapshot().await;
        assert!(snap.messages.is_empty());
        assert!(snap.stats.is_none());
        assert!(!snap.messages_loading);
        assert!(snap.messages_error.is_none());
    }

    #[tokio::test]
    async fn refresh_populates_messages_and_stats() {
        let (_, manager) = manager_with(vec![
            sample_message("m1", MessageStatus::Sent),
            sample_message("m2", MessageStatus::Pending),
        ])
        .await;

        manager.refresh().await.unwrap();
        let snap = manager.snapshot().await;
        assert_eq!(snap.messages.len(), 2);
        assert_eq!(snap.stats.unwrap().total, 2);
    }

    #[tokio::test]
    async fn filter_narrows_and_clear_restores() {
        let (_, manager) = manager_with(vec![
            sample_message("m1", MessageStatus::Sent),
            sample_message("m2", MessageStatus::Pending),
            sample_message("m3", MessageStatus::Sent),
        ])
        .await;

        manager
            .update_filters(MessageFilter {
                status: Some(MessageStatus::Sent),
                ..Default::default()
            })
            .await
            .unwrap();
        let snap = manager.snapshot().await;
        assert_eq!(snap.messages.len(), 2);
        assert!(snap.messages.iter().all(|m| m.status == MessageStatus::Sent));

        manager.clear_filters().await.unwrap();
        let snap = manager.snapshot().await;
        assert_eq!(snap.messages.len(), 3);
    }

    #[tokio::test]
    async fn read_failure_keeps_stale_page_visible() {
        let (api, manager) = manager_with(vec![sample_message("m1", MessageStatus::Sent)]).await;

        manager.refresh_messages().await.unwrap();
        api.push_list_error(CourierError::Transport {
            message: "connection reset".into(),
            source: None,
        })
        .await;

        assert!(manager.refresh_messages().await.is_err());
        let snap = manager.snapshot().await;
        assert_eq!(snap.messages.len(), 1, "stale page must remain visible");
        assert!(snap.messages_error.as_deref().unwrap().contains("connection reset"));
        assert!(!snap.messages_loading);
    }

    #[tokio::test]
    async fn stats_failure_does_not_touch_messages() {
        let (api, manager) = manager_with(vec![sample_message("m1", MessageStatus::Sent)]).await;
        manager.refresh().await.unwrap();

        api.push_stats_error(CourierError::Transport {
            message: "boom".into(),
            source: None,
        })
        .await;
        assert!(manager.refresh_stats().await.is_err());

        let snap = manager.snapshot().await;
        assert_eq!(snap.messages.len(), 1);
        assert!(snap.stats.is_some(), "stale stats stay visible");
        assert!(snap.stats_error.is_some());
    }

    #[tokio::test]
    async fn delete_refetches_page_and_stats() {
        let (_, manager) = manager_with(vec![
            sample_message("m1", MessageStatus::Sent),
            sample_message("m2", MessageStatus::Pending),
        ])
        .await;
        manager.refresh().await.unwrap();
        let before = manager.snapshot().await.stats.unwrap();

        manager.delete_message(&MessageId::from("m1")).await.unwrap();

        let snap = manager.snapshot().await;
        assert!(snap.messages.iter().all(|m| m.id != MessageId::from("m1")));
        assert_eq!(snap.stats.unwrap().total, before.total - 1);
    }

    #[tokio::test]
    async fn delete_of_missing_id_is_a_noop() {
        let (_, manager) = manager_with(Vec::new()).await;
        manager.delete_message(&MessageId::from("ghost")).await.unwrap();
    }

    #[tokio::test]
    async fn send_failure_leaves_page_untouched() {
        let (api, manager) = manager_with(Vec::new()).await;
        manager.refresh().await.unwrap();

        api.push_send_error(CourierError::Api {
            status: 422,
            message: "invalid phone number".into(),
        })
        .await;

        let err = manager
            .send_message(SendMessage::text("+5511999999999", "hi"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("invalid phone number"));

        let snap = manager.snapshot().await;
        assert!(snap.messages.is_empty(), "no optimistic insertion");
        assert!(!snap.sending);
    }

    #[tokio::test]
    async fn create_and_send_show_up_after_refetch() {
        let (_, manager) = manager_with(Vec::new()).await;

        let draft = manager
            .create_message(CreateMessage::text("bot1", "hi"))
            .await
            .unwrap();
        assert_eq!(draft.status, MessageStatus::Pending);

        let sent = manager
            .send_message(SendMessage::text("+5511999999999", "hi"))
            .await
            .unwrap();
        assert!(matches!(
            sent.status,
            MessageStatus::Pending | MessageStatus::Sent
        ));

        let snap = manager.snapshot().await;
        assert_eq!(snap.messages.len(), 2);
        assert_eq!(snap.stats.unwrap().total, 2);
    }

    #[tokio::test]
    async fn batch_outcome_reports_partial_failure() {
        let (_, manager) = manager_with(Vec::new()).await;

        let outcome = manager
            .send_batch(SendBatch {
                messages: vec![
                    SendMessage::text("", "malformed"),
                    SendMessage::text("+5511999999999", "hi"),
                ],
            })
            .await
            .unwrap();
        assert_eq!(outcome.total, 1);
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].index, 0);

        let snap = manager.snapshot().await;
        assert_eq!(snap.messages.len(), 1);
    }

    #[tokio::test]
    async fn fresh_cache_entry_serves_repeat_reads() {
        let api = Arc::new(
            MockMessageApi::with_messages(vec![sample_message("m1", MessageStatus::Sent)]).await,
        );
        let manager = MessageManager::with_cache_ttl(api.clone(), Duration::from_secs(60));

        manager.refresh_messages().await.unwrap();
        manager.refresh_messages().await.unwrap();
        let lists = api.calls().await.iter().filter(|c| **c == "list").count();
        assert_eq!(lists, 1, "second read must come from cache");
    }

    #[tokio::test]
    async fn write_invalidates_cached_reads() {
        let api = Arc::new(MockMessageApi::new());
        let manager = MessageManager::with_cache_ttl(api.clone(), Duration::from_secs(60));

        manager.refresh_messages().await.unwrap();
        manager
            .send_message(SendMessage::text("+5511999999999", "hi"))
            .await
            .unwrap();

        let snap = manager.snapshot().await;
        assert_eq!(snap.messages.len(), 1, "refetch after write sees the new message");
        let lists = api.calls().await.iter().filter(|c| **c == "list").count();
        assert_eq!(lists, 2, "write forces a refetch past the cache");
    }

    #[tokio::test]
    async fn superseded_page_result_is_discarded() {
        let (api, manager) = manager_with(vec![
            sample_message("m1", MessageStatus::Pending),
            sample_message("m2", MessageStatus::Sent),
        ])
        .await;
        let manager = Arc::new(manager);

        // The unfiltered read is slow; it resolves after the filtered one.
        api.push_list_delay(Duration::from_millis(100)).await;
        let slow = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.refresh_messages().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        manager
            .update_filters(MessageFilter {
                status: Some(MessageStatus::Sent),
                ..Default::default()
            })
            .await
            .unwrap();

        slow.await.unwrap().unwrap();
        let snap = manager.snapshot().await;
        assert_eq!(snap.messages.len(), 1);
        assert_eq!(
            snap.messages[0].status,
            MessageStatus::Sent,
            "the newer query's result must win even though it resolved first"
        );
    }
}
