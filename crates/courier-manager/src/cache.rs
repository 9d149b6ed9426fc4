// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyed read cache for list pages and the stats snapshot.
//!
//! Owned by the facade, never shared globally. Entries are keyed by the full
//! `(page, filter)` tuple so reads with different parameters never clobber
//! each other. Successful writes invalidate everything; the next read
//! refetches.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use courier_core::{Message, MessageFilter, MessageStats, Page};

struct CacheEntry<T> {
    data: T,
    fetched_at: Instant,
}

/// TTL-bounded store for read results.
pub struct ReadCache {
    ttl: Duration,
    lists: HashMap<String, CacheEntry<Vec<Message>>>,
    stats: Option<CacheEntry<MessageStats>>,
}

impl ReadCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            lists: HashMap::new(),
            stats: None,
        }
    }

    /// Canonical cache key for a list query: the query-pair encoding of the
    /// pagination window plus the filter, in emission order.
    pub fn list_key(page: &Page, filter: &MessageFilter) -> String {
        page.query_pairs()
            .into_iter()
            .chain(filter.query_pairs())
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }

    pub fn get_list(&self, key: &str) -> Option<&Vec<Message>> {
        self.lists
            .get(key)
            .filter(|entry| entry.fetched_at.elapsed() < self.ttl)
            .map(|entry| &entry.data)
    }

    pub fn put_list(&mut self, key: String, data: Vec<Message>) {
        self.lists.insert(
            key,
            CacheEntry {
                data,
                fetched_at: Instant::now(),
            },
        );
    }

    pub fn get_stats(&self) -> Option<&MessageStats> {
        self.stats
            .as_ref()
            .filter(|entry| entry.fetched_at.elapsed() < self.ttl)
            .map(|entry| &entry.data)
    }

    pub fn put_stats(&mut self, stats: MessageStats) {
        self.stats = Some(CacheEntry {
            data: stats,
            fetched_at: Instant::now(),
        });
    }

    /// Drops every cached read. Called after any successful mutation.
    pub fn invalidate_all(&mut self) {
        self.lists.clear();
        self.stats = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_queries_get_distinct_keys() {
        let page = Page::default();
        let empty = MessageFilter::default();
        let filtered = MessageFilter {
            bot_id: Some("bot1".to_string()),
            ..Default::default()
        };
        assert_ne!(
            ReadCache::list_key(&page, &empty),
            ReadCache::list_key(&page, &filtered)
        );

        let next_page = Page {
            offset: 20,
            ..Default::default()
        };
        assert_ne!(
            ReadCache::list_key(&page, &empty),
            ReadCache::list_key(&next_page, &empty)
        );
    }

    #[test]
    fn entries_expire_after_ttl() {
        let mut cache = ReadCache::new(Duration::ZERO);
        cache.put_list("k".to_string(), Vec::new());
        assert!(cache.get_list("k").is_none());

        let mut cache = ReadCache::new(Duration::from_secs(60));
        cache.put_list("k".to_string(), Vec::new());
        assert!(cache.get_list("k").is_some());
    }

    #[test]
    fn invalidate_all_clears_lists_and_stats() {
        let mut cache = ReadCache::new(Duration::from_secs(60));
        cache.put_list("k".to_string(), Vec::new());
        cache.put_stats(MessageStats::default());

        cache.invalidate_all();
        assert!(cache.get_list("k").is_none());
        assert!(cache.get_stats().is_none());
    }

    #[test]
    fn keys_are_stable_for_equal_queries() {
        let page = Page::default();
        let filter = MessageFilter {
            bot_id: Some("bot1".to_string()),
            ..Default::default()
        };
        assert_eq!(
            ReadCache::list_key(&page, &filter),
            ReadCache::list_key(&page.clone(), &filter.clone())
        );
    }
}
