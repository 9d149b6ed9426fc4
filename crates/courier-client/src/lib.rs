// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP repository for the Courier message backend.
//!
//! [`ApiClient`] is the thin transport (auth headers, error envelope,
//! bounded read retry); [`HttpMessageRepository`] implements
//! [`courier_core::MessageApi`] on top of it.

pub mod client;
pub mod query;
pub mod repository;

pub use client::ApiClient;
pub use repository::HttpMessageRepository;
