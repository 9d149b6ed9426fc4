// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Courier integration tests.
//!
//! Provides [`MockMessageApi`], an in-memory backend with scripted failures
//! and latencies, for fast, deterministic, CI-runnable tests without a
//! server.

pub mod mock_api;

pub use mock_api::{sample_message, MockMessageApi};
