// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Filter and pagination state for the message list.
//!
//! A pure state holder: no I/O happens here. It only computes the
//! `(Page, MessageFilter)` tuple that the repository's `list` consumes.

use courier_core::{MessageFilter, Page, SortOrder};

/// Partial update to the pagination window. Unset fields keep their value.
#[derive(Debug, Clone, Default)]
pub struct PagePatch {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub order_by: Option<String>,
    pub order: Option<SortOrder>,
}

/// Current filter predicate plus pagination window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryState {
    filter: MessageFilter,
    page: Page,
}

impl QueryState {
    pub fn filter(&self) -> &MessageFilter {
        &self.filter
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Merges set fields into the predicate and resets `offset` to 0: the
    /// current page is meaningless under a new predicate.
    pub fn update_filter(&mut self, patch: MessageFilter) {
        if patch.bot_id.is_some() {
            self.filter.bot_id = patch.bot_id;
        }
        if patch.kind.is_some() {
            self.filter.kind = patch.kind;
        }
        if patch.status.is_some() {
            self.filter.status = patch.status;
        }
        if patch.start_date.is_some() {
            self.filter.start_date = patch.start_date;
        }
        if patch.end_date.is_some() {
            self.filter.end_date = patch.end_date;
        }
        self.page.offset = 0;
    }

    /// Merges set fields into the window without touching the filter.
    pub fn update_page(&mut self, patch: PagePatch) {
        if let Some(limit) = patch.limit {
            self.page.limit = limit;
        }
        if let Some(offset) = patch.offset {
            self.page.offset = offset;
        }
        if let Some(order_by) = patch.order_by {
            self.page.order_by = order_by;
        }
        if let Some(order) = patch.order {
            self.page.order = order;
        }
    }

    /// Restores the default predicate and window.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
