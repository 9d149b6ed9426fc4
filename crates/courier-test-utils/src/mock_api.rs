// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock message backend for deterministic testing.
//!
//! `MockMessageApi` implements [`MessageApi`] over an in-memory message
//! store. Failures and read latencies are scripted through FIFO queues so
//! tests can exercise error paths and request races without a server.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use courier_core::{
    BatchOutcome, BatchRejection, CourierError, CreateMessage, Message, MessageApi,
    MessageFilter, MessageId, MessageStats, MessageStatus, Page, SendBatch, SendMessage,
    SortOrder,
};

/// An in-memory backend with scripted failures and latencies.
#[derive(Default)]
pub struct MockMessageApi {
    messages: Mutex<Vec<Message>>,
    list_errors: Mutex<VecDeque<CourierError>>,
    stats_errors: Mutex<VecDeque<CourierError>>,
    send_errors: Mutex<VecDeque<CourierError>>,
    list_delays: Mutex<VecDeque<Duration>>,
    calls: Mutex<Vec<&'static str>>,
}

impl MockMessageApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-loads the store with messages.
    pub async fn with_messages(messages: Vec<Message>) -> Self {
        let api = Self::new();
        *api.messages.lock().await = messages;
        api
    }

    /// Inserts a message directly, bypassing the API surface.
    pub async fn insert(&self, message: Message) {
        self.messages.lock().await.push(message);
    }

    /// The next `list` call fails with `err`.
    pub async fn push_list_error(&self, err: CourierError) {
        self.list_errors.lock().await.push_back(err);
    }

    /// The next `stats` call fails with `err`.
    pub async fn push_stats_error(&self, err: CourierError) {
        self.stats_errors.lock().await.push_back(err);
    }

    /// The next `send` call fails with `err`.
    pub async fn push_send_error(&self, err: CourierError) {
        self.send_errors.lock().await.push_back(err);
    }

    /// The next `list` call sleeps for `delay` before responding, letting
    /// tests stage out-of-order responses.
    pub async fn push_list_delay(&self, delay: Duration) {
        self.list_delays.lock().await.push_back(delay);
    }

    /// Operation names in call order.
    pub async fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().await.clone()
    }

    /// Number of `stats` calls observed so far.
    pub async fn stats_calls(&self) -> usize {
        self.calls.lock().await.iter().filter(|c| **c == "stats").count()
    }

    async fn record(&self, op: &'static str) {
        self.calls.lock().await.push(op);
    }

    fn build_message(data: SendMessage, status: MessageStatus) -> Message {
        let now = Utc::now();
        Message {
            id: MessageId(format!("mock-{}", Uuid::new_v4())),
            bot_id: data.bot_id.unwrap_or_else(|| "default".to_string()),
            to_number: Some(data.to),
            content: data.content,
            payload: data.payload,
            status,
            sent_at: (status == MessageStatus::Sent).then_some(now),
            delivered_at: None,
            error_message: None,
            retry_count: 0,
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A text message fixture with the given id and status, timestamped now.
pub fn sample_message(id: &str, status: MessageStatus) -> Message {
    let now = Utc::now();
    Message {
        id: MessageId::from(id),
        bot_id: "bot1".to_string(),
        to_number: Some("+5511999999999".to_string()),
        content: "hi".to_string(),
        payload: courier_core::MessagePayload::Text,
        status,
        sent_at: matches!(status, MessageStatus::Sent | MessageStatus::Delivered)
            .then_some(now),
        delivered_at: (status == MessageStatus::Delivered).then_some(now),
        error_message: (status == MessageStatus::Failed)
            .then(|| "dispatch rejected".to_string()),
        retry_count: 0,
        created_by: None,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl MessageApi for MockMessageApi {
    async fn list(
        &self,
        page: &Page,
        filter: &MessageFilter,
    ) -> Result<Vec<Message>, CourierError> {
        self.record("list").await;
        let delay = self.list_delays.lock().await.pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = self.list_errors.lock().await.pop_front() {
            return Err(err);
        }

        let mut matching: Vec<Message> = self
            .messages
            .lock()
            .await
            .iter()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect();
        // Only creation-time ordering is modeled here.
        matching.sort_by_key(|m| m.created_at);
        if page.order == SortOrder::Desc {
            matching.reverse();
        }
        Ok(matching
            .into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .collect())
    }

    async fn get(&self, id: &MessageId) -> Result<Message, CourierError> {
        self.record("get").await;
        self.messages
            .lock()
            .await
            .iter()
            .find(|m| &m.id == id)
            .cloned()
            .ok_or_else(|| CourierError::NotFound { id: id.to_string() })
    }

    async fn stats(&self) -> Result<MessageStats, CourierError> {
        self.record("stats").await;
        if let Some(err) = self.stats_errors.lock().await.pop_front() {
            return Err(err);
        }

        let messages = self.messages.lock().await;
        let mut stats = MessageStats {
            total: messages.len() as u64,
            ..Default::default()
        };
        for msg in messages.iter() {
            match msg.status {
                MessageStatus::Pending => stats.pending += 1,
                MessageStatus::Sent => stats.sent += 1,
                MessageStatus::Failed => stats.failed += 1,
                MessageStatus::Delivered => stats.delivered += 1,
            }
            match msg.payload.kind() {
                courier_core::MessageKind::Text => stats.text_messages += 1,
                courier_core::MessageKind::Media => stats.media_messages += 1,
                courier_core::MessageKind::Template => stats.template_messages += 1,
            }
        }
        Ok(stats)
    }

    async fn create(&self, data: CreateMessage) -> Result<Message, CourierError> {
        self.record("create").await;
        data.validate()?;
        let now = Utc::now();
        let message = Message {
            id: MessageId(format!("mock-{}", Uuid::new_v4())),
            bot_id: data.bot_id,
            to_number: data.to_number,
            content: data.content,
            payload: data.payload,
            status: MessageStatus::Pending,
            sent_at: None,
            delivered_at: None,
            error_message: None,
            retry_count: 0,
            created_by: None,
            created_at: now,
            updated_at: now,
        };
        self.messages.lock().await.push(message.clone());
        Ok(message)
    }

    async fn send(&self, data: SendMessage) -> Result<Message, CourierError> {
        self.record("send").await;
        data.validate()?;
        if let Some(err) = self.send_errors.lock().await.pop_front() {
            return Err(err);
        }
        let message = Self::build_message(data, MessageStatus::Sent);
        self.messages.lock().await.push(message.clone());
        Ok(message)
    }

    async fn send_batch(&self, data: SendBatch) -> Result<BatchOutcome, CourierError> {
        self.record("send_batch").await;
        let mut rejected = Vec::new();
        let mut results = Vec::new();
        for (index, msg) in data.messages.into_iter().enumerate() {
            match msg.validate() {
                Ok(()) => {
                    let message = Self::build_message(msg, MessageStatus::Sent);
                    self.messages.lock().await.push(message.clone());
                    results.push(message);
                }
                Err(err) => rejected.push(BatchRejection {
                    index,
                    reason: err.to_string(),
                }),
            }
        }
        Ok(BatchOutcome {
            total: results.len() as u64,
            results,
            rejected,
        })
    }

    async fn remove(&self, id: &MessageId) -> Result<(), CourierError> {
        self.record("remove").await;
        let mut messages = self.messages.lock().await;
        let before = messages.len();
        messages.retain(|m| &m.id != id);
        if messages.len() == before {
            return Err(CourierError::NotFound { id: id.to_string() });
        }
        Ok(())
    }
}
