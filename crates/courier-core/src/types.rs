// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types for outbound messages, delivery stats, and list queries.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::CourierError;

/// Unique identifier for a message. Opaque, assigned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Delivery lifecycle state of a message.
///
/// Transitions: `pending -> sent -> delivered`, with `failed` reachable from
/// `pending` (dispatch rejected) and `sent` (asynchronous failure). Delivery
/// acknowledgments originate from the backend, never from this client layer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageStatus {
    Pending,
    Sent,
    Failed,
    Delivered,
}

impl MessageStatus {
    /// Returns true if `next` is a legal lifecycle transition from `self`.
    pub fn can_transition_to(self, next: MessageStatus) -> bool {
        use MessageStatus::*;
        matches!(
            (self, next),
            (Pending, Sent) | (Pending, Failed) | (Sent, Delivered) | (Sent, Failed)
        )
    }
}

/// The payload kind tag, fixed at creation time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageKind {
    Text,
    Media,
    Template,
}

/// Attachment descriptor carried by `media` messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachmentRef {
    /// Location of the attachment (URL or provider media id).
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

/// Template-variable bindings carried by `template` messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateBindings {
    /// Name of the backend-registered template.
    pub name: String,
    /// Variable name to substitution value.
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

/// Typed payload of a message, discriminated by the wire `type` tag.
///
/// Serializes adjacently tagged as `"type"` plus `"metadata"`, so a `text`
/// message carries no metadata field at all and `media`/`template` carry a
/// shape matching their tag. Flattened into [`Message`] and the request
/// payloads to preserve the wire layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "metadata", rename_all = "lowercase")]
pub enum MessagePayload {
    Text,
    Media(AttachmentRef),
    Template(TemplateBindings),
}

impl MessagePayload {
    /// The kind tag for this payload.
    pub fn kind(&self) -> MessageKind {
        match self {
            MessagePayload::Text => MessageKind::Text,
            MessagePayload::Media(_) => MessageKind::Media,
            MessagePayload::Template(_) => MessageKind::Template,
        }
    }
}

impl Default for MessagePayload {
    fn default() -> Self {
        MessagePayload::Text
    }
}

/// A unit of outbound communication as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    /// Owning bot/channel.
    pub bot_id: String,
    /// Destination address (phone number or channel-specific address).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_number: Option<String>,
    pub content: String,
    #[serde(flatten)]
    pub payload: MessagePayload,
    pub status: MessageStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Dispatch attempts recorded by the backend. Never decreases.
    #[serde(default)]
    pub retry_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Message {
    /// Checks the delivery bookkeeping invariants on a backend record.
    ///
    /// - `delivered` requires `sent_at` and `delivered_at`, in order.
    /// - `failed` requires an `error_message`.
    pub fn check_invariants(&self) -> Result<(), CourierError> {
        match self.status {
            MessageStatus::Delivered => {
                let (Some(sent), Some(delivered)) = (self.sent_at, self.delivered_at) else {
                    return Err(CourierError::Validation {
                        field: "status",
                        message: format!(
                            "message {} is delivered without sent_at/delivered_at",
                            self.id
                        ),
                    });
                };
                if delivered < sent {
                    return Err(CourierError::Validation {
                        field: "delivered_at",
                        message: format!("message {} delivered before it was sent", self.id),
                    });
                }
            }
            MessageStatus::Failed => {
                if self.error_message.is_none() {
                    return Err(CourierError::Validation {
                        field: "error_message",
                        message: format!("message {} failed without an error message", self.id),
                    });
                }
            }
            MessageStatus::Pending | MessageStatus::Sent => {}
        }
        Ok(())
    }
}

/// Aggregate delivery snapshot. Derived by the backend, recomputed per fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageStats {
    pub total: u64,
    pub sent: u64,
    pub failed: u64,
    pub pending: u64,
    pub delivered: u64,
    pub text_messages: u64,
    pub media_messages: u64,
    pub template_messages: u64,
}

/// Optional conjunction of message list constraints.
///
/// Absent fields impose no constraint and are omitted from query strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<MessageKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MessageStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
}

impl MessageFilter {
    /// True when no constraint is set.
    pub fn is_empty(&self) -> bool {
        self.bot_id.is_none()
            && self.kind.is_none()
            && self.status.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
    }

    /// Evaluates the conjunction against a message.
    pub fn matches(&self, msg: &Message) -> bool {
        if let Some(bot_id) = &self.bot_id
            && &msg.bot_id != bot_id
        {
            return false;
        }
        if let Some(kind) = self.kind
            && msg.payload.kind() != kind
        {
            return false;
        }
        if let Some(status) = self.status
            && msg.status != status
        {
            return false;
        }
        if let Some(start) = self.start_date
            && msg.created_at < start
        {
            return false;
        }
        if let Some(end) = self.end_date
            && msg.created_at > end
        {
            return false;
        }
        true
    }

    /// Query-string pairs for the set fields. Wire names follow the backend
    /// API (`type`, `startDate`, `endDate`); unset fields produce nothing.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(bot_id) = &self.bot_id {
            pairs.push(("bot_id".to_string(), bot_id.clone()));
        }
        if let Some(kind) = self.kind {
            pairs.push(("type".to_string(), kind.to_string()));
        }
        if let Some(status) = self.status {
            pairs.push(("status".to_string(), status.to_string()));
        }
        if let Some(start) = self.start_date {
            pairs.push(("startDate".to_string(), start.to_rfc3339()));
        }
        if let Some(end) = self.end_date {
            pairs.push(("endDate".to_string(), end.to_rfc3339()));
        }
        pairs
    }
}

/// Sort direction for list queries.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Pagination window for list queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
    pub order_by: String,
    pub order: SortOrder,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: 20,
            offset: 0,
            order_by: "created_at".to_string(),
            order: SortOrder::Desc,
        }
    }
}

impl Page {
    /// Query-string pairs for the window (`orderBy` wire name per the API).
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        vec![
            ("limit".to_string(), self.limit.to_string()),
            ("offset".to_string(), self.offset.to_string()),
            ("orderBy".to_string(), self.order_by.clone()),
            ("order".to_string(), self.order.to_string()),
        ]
    }
}

/// Payload for persisting a draft message without dispatching it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateMessage {
    pub bot_id: String,
    pub content: String,
    #[serde(flatten)]
    pub payload: MessagePayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_number: Option<String>,
}

impl CreateMessage {
    /// A plain text draft, the default payload kind.
    pub fn text(bot_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            bot_id: bot_id.into(),
            content: content.into(),
            payload: MessagePayload::Text,
            to_number: None,
        }
    }

    /// Rejects incomplete payloads before any network call is made.
    pub fn validate(&self) -> Result<(), CourierError> {
        if self.bot_id.trim().is_empty() {
            return Err(CourierError::Validation {
                field: "bot_id",
                message: "bot_id must not be empty".to_string(),
            });
        }
        if self.content.trim().is_empty() {
            return Err(CourierError::Validation {
                field: "content",
                message: "content must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Payload for persisting and immediately dispatching a single message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendMessage {
    /// Destination address. Required.
    pub to: String,
    pub content: String,
    #[serde(flatten)]
    pub payload: MessagePayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_id: Option<String>,
    /// Client-generated token letting the backend collapse duplicate
    /// resubmissions of the same dispatch. Filled with a fresh UUID by the
    /// repository when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
}

impl SendMessage {
    /// A plain text dispatch to `to`.
    pub fn text(to: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            content: content.into(),
            payload: MessagePayload::Text,
            bot_id: None,
            idempotency_key: None,
        }
    }

    /// Rejects incomplete payloads before any network call is made.
    pub fn validate(&self) -> Result<(), CourierError> {
        if self.to.trim().is_empty() {
            return Err(CourierError::Validation {
                field: "to",
                message: "destination address must not be empty".to_string(),
            });
        }
        if self.content.trim().is_empty() {
            return Err(CourierError::Validation {
                field: "content",
                message: "content must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// A batch of independent dispatch requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendBatch {
    pub messages: Vec<SendMessage>,
}

/// One input rejected before dispatch, correlated back by input index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchRejection {
    pub index: usize,
    pub reason: String,
}

/// Outcome of a batch dispatch. Partial failure is a result, never an error:
/// `total` counts backend-accepted entries only and `rejected` correlates
/// inputs that never reached the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchOutcome {
    pub total: u64,
    pub results: Vec<Message>,
    pub rejected: Vec<BatchRejection>,
}
