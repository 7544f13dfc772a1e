//! Person lookup for edit flows.
//!
//! # Responsibility
//! - Match free-text input against `"{name} ({address})"` keys.
//!
//! # Invariants
//! - Records with a blank name are never offered.
//! - Hits keep record order; there is no ranking.

use crate::model::meal::PersonMealRecord;

const DEFAULT_SEARCH_LIMIT: u32 = 20;

/// Search options for person lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Whitespace-separated terms; every term must appear in the key.
    pub text: String,
    /// Maximum number of hits to return.
    pub limit: u32,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

/// Single search hit returned by [`search_people`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    /// Index of the record in store order.
    pub position: usize,
    pub display_key: String,
}

/// Filters people by case-insensitive term containment.
///
/// A blank query lists every named person up to `limit`.
pub fn search_people(records: &[PersonMealRecord], query: &SearchQuery) -> Vec<SearchHit> {
    let terms = query
        .text
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>();
    let limit = usize::try_from(query.limit).unwrap_or(usize::MAX);

    records
        .iter()
        .enumerate()
        .filter(|(_, record)| !record.name.trim().is_empty())
        .map(|(position, record)| SearchHit {
            position,
            display_key: record.display_key(),
        })
        .filter(|hit| {
            let haystack = hit.display_key.to_lowercase();
            terms.iter().all(|term| haystack.contains(term.as_str()))
        })
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{search_people, SearchQuery};
    use crate::model::meal::PersonMealRecord;

    fn people() -> Vec<PersonMealRecord> {
        vec![
            PersonMealRecord::new("Alice", "12 Lake Road"),
            PersonMealRecord::new("", "Orphan Street"),
            PersonMealRecord::new("Bob", "4 Lake View"),
            PersonMealRecord::new("Alina", "Hill Top"),
        ]
    }

    #[test]
    fn every_term_must_match_in_any_case() {
        let hits = search_people(&people(), &SearchQuery::new("LAKE al"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].display_key, "Alice (12 Lake Road)");
        assert_eq!(hits[0].position, 0);
    }

    #[test]
    fn blank_query_lists_named_people_in_order() {
        let hits = search_people(&people(), &SearchQuery::new("   "));
        let keys = hits.iter().map(|hit| hit.position).collect::<Vec<_>>();
        assert_eq!(keys, vec![0, 2, 3]);
    }

    #[test]
    fn limit_caps_hits() {
        let query = SearchQuery {
            text: "a".to_string(),
            limit: 1,
        };
        assert_eq!(search_people(&people(), &query).len(), 1);

        let none = SearchQuery {
            text: "a".to_string(),
            limit: 0,
        };
        assert!(search_people(&people(), &none).is_empty());
    }
}
