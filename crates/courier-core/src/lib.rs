// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Courier messaging client.
//!
//! Defines the domain types (messages, stats, filters, pagination), the
//! error taxonomy, and the [`MessageApi`] trait that concrete transports
//! implement.

pub mod api;
pub mod error;
pub mod types;

pub use api::MessageApi;
pub use error::CourierError;
pub use types::{
    AttachmentRef, BatchOutcome, BatchRejection, CreateMessage, Message, MessageFilter,
    MessageId, MessageKind, MessagePayload, MessageStats, MessageStatus, Page, SendBatch,
    SendMessage, SortOrder, TemplateBindings,
};
