// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message management facade for Courier.
//!
//! Composes the repository ([`courier_core::MessageApi`]), a keyed read
//! cache, and filter/pagination state into a single read/write surface for
//! views, plus an interval stats poller with RAII teardown.

pub mod cache;
pub mod filters;
pub mod manager;
pub mod poller;

pub use cache::ReadCache;
pub use filters::{PagePatch, QueryState};
pub use manager::{ManagerSnapshot, MessageManager, DEFAULT_CACHE_TTL};
pub use poller::{PollerHandle, StatsPoller, DEFAULT_POLL_INTERVAL};
