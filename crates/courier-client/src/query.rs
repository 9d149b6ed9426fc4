// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! List query construction.

use courier_core::{MessageFilter, Page};

/// Builds the query pairs for a `list` call: the pagination window first,
/// then any set filter fields. Unset filter fields are omitted entirely,
/// never sent as empty strings.
pub fn list_query(page: &Page, filter: &MessageFilter) -> Vec<(String, String)> {
    let mut pairs = page.query_pairs();
    pairs.extend(filter.query_pairs());
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::{MessageKind, MessageStatus};

    #[test]
    fn empty_filter_yields_pagination_only() {
        let pairs = list_query(&Page::default(), &MessageFilter::default());
        let keys: Vec<&str> = pairs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["limit", "offset", "orderBy", "order"]);
    }

    #[test]
    fn set_filter_fields_use_wire_names() {
        let filter = MessageFilter {
            bot_id: Some("bot1".to_string()),
            kind: Some(MessageKind::Template),
            status: Some(MessageStatus::Sent),
            ..Default::default()
        };
        let pairs = list_query(&Page::default(), &filter);
        assert!(pairs.contains(&("bot_id".to_string(), "bot1".to_string())));
        assert!(pairs.contains(&("type".to_string(), "template".to_string())));
        assert!(pairs.contains(&("status".to_string(), "sent".to_string())));
        assert!(!pairs.iter().any(|(k, _)| k == "startDate" || k == "endDate"));
    }
}
