// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP implementation of [`MessageApi`] against the backend REST surface.

use async_trait::async_trait;
use courier_core::{
    BatchOutcome, BatchRejection, CourierError, CreateMessage, Message, MessageApi,
    MessageFilter, MessageId, MessageStats, Page, SendBatch, SendMessage,
};
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::client::ApiClient;
use crate::query::list_query;

const MESSAGES_PATH: &str = "/api/messages";
const SEND_PATH: &str = "/api/messages/send";
const BATCH_PATH: &str = "/api/messages/batch";
const STATS_PATH: &str = "/api/messages/stats/overview";

/// Wire shape of the batch endpoint response. `total` counts accepted
/// entries only; the backend does not identify which inputs it dropped.
#[derive(Debug, Deserialize)]
struct BatchResponse {
    total: u64,
    results: Vec<Message>,
}

/// Message repository over the backend HTTP API.
#[derive(Debug, Clone)]
pub struct HttpMessageRepository {
    client: ApiClient,
}

impl HttpMessageRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MessageApi for HttpMessageRepository {
    async fn list(
        &self,
        page: &Page,
        filter: &MessageFilter,
    ) -> Result<Vec<Message>, CourierError> {
        self.client
            .get_json(MESSAGES_PATH, &list_query(page, filter))
            .await
    }

    async fn get(&self, id: &MessageId) -> Result<Message, CourierError> {
        match self
            .client
            .get_json::<Message>(&format!("{MESSAGES_PATH}/{id}"), &[])
            .await
        {
            Err(CourierError::Api { status: 404, .. }) => Err(CourierError::NotFound {
                id: id.to_string(),
            }),
            other => other,
        }
    }

    async fn stats(&self) -> Result<MessageStats, CourierError> {
        self.client.get_json(STATS_PATH, &[]).await
    }

    async fn create(&self, data: CreateMessage) -> Result<Message, CourierError> {
        data.validate()?;
        let message: Message = self.client.post_json(MESSAGES_PATH, &data).await?;
        debug!(id = %message.id, status = %message.status, "message created");
        Ok(message)
    }

    async fn send(&self, mut data: SendMessage) -> Result<Message, CourierError> {
        data.validate()?;
        if data.idempotency_key.is_none() {
            data.idempotency_key = Some(Uuid::new_v4().to_string());
        }
        let message: Message = self.client.post_json(SEND_PATH, &data).await?;
        info!(id = %message.id, to = %data.to, status = %message.status, "message dispatched");
        Ok(message)
    }

    async fn send_batch(&self, data: SendBatch) -> Result<BatchOutcome, CourierError> {
        let mut rejected = Vec::new();
        let mut dispatchable = Vec::new();
        for (index, mut msg) in data.messages.into_iter().enumerate() {
            match msg.validate() {
                Ok(()) => {
                    if msg.idempotency_key.is_none() {
                        msg.idempotency_key = Some(Uuid::new_v4().to_string());
                    }
                    dispatchable.push(msg);
                }
                Err(err) => rejected.push(BatchRejection {
                    index,
                    reason: err.to_string(),
                }),
            }
        }

        if dispatchable.is_empty() {
            debug!(rejected = rejected.len(), "batch had no dispatchable messages");
            return Ok(BatchOutcome {
                total: 0,
                results: Vec::new(),
                rejected,
            });
        }

        let response: BatchResponse = self
            .client
            .post_json(
                BATCH_PATH,
                &SendBatch {
                    messages: dispatchable,
                },
            )
            .await?;
        info!(
            total = response.total,
            rejected = rejected.len(),
            "batch dispatched"
        );
        Ok(BatchOutcome {
            total: response.total,
            results: response.results,
            rejected,
        })
    }

    async fn remove(&self, id: &MessageId) -> Result<(), CourierError> {
        match self.client.delete(&format!("{MESSAGES_PATH}/{id}")).await {
            Err(CourierError::Api { status: 404, .. }) => Err(CourierError::NotFound {
                id: id.to_string(),
            }),
            other => other,
        }
    }
}
