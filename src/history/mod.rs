//! Search history list
//!
//! Ordered most-recent-first, distinct entries, capped.

use crate::HISTORY_CAP;

/// Ordered list of previously searched queries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryList {
    entries: Vec<String>,
}

impl HistoryList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from decoded storage entries, enforcing the cap
    pub fn from_entries(mut entries: Vec<String>) -> Self {
        entries.truncate(HISTORY_CAP);
        Self { entries }
    }

    /// Record a query: an existing entry moves to the front rather than
    /// duplicating, and the oldest entry drops once the cap is reached
    pub fn insert(&mut self, query: &str) {
        self.entries.retain(|entry| entry != query);
        self.entries.insert(0, query.to_string());
        self.entries.truncate(HISTORY_CAP);
    }

    /// Remove all occurrences of a query
    pub fn remove(&mut self, query: &str) {
        self.entries.retain(|entry| entry != query);
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<String> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_moves_duplicate_to_front() {
        let mut history = HistoryList::new();
        history.insert("cats");
        history.insert("dogs");
        history.insert("cats");

        assert_eq!(history.entries(), &["cats", "dogs"]);
    }

    #[test]
    fn test_repeated_insert_keeps_single_occurrence() {
        let mut history = HistoryList::new();
        history.insert("cats");
        history.insert("cats");

        assert_eq!(history.entries(), &["cats"]);
    }

    #[test]
    fn test_cap_drops_oldest() {
        let mut history = HistoryList::new();
        for i in 0..HISTORY_CAP {
            history.insert(&format!("query-{}", i));
        }
        assert_eq!(history.len(), HISTORY_CAP);

        history.insert("one-more");
        assert_eq!(history.len(), HISTORY_CAP);
        assert_eq!(history.entries()[0], "one-more");
        // query-0 was the oldest
        assert!(!history.entries().contains(&"query-0".to_string()));
    }

    #[test]
    fn test_remove() {
        let mut history = HistoryList::new();
        history.insert("cats");
        history.insert("dogs");
        history.remove("cats");

        assert_eq!(history.entries(), &["dogs"]);
        history.remove("not-there");
        assert_eq!(history.entries(), &["dogs"]);
    }

    #[test]
    fn test_from_entries_enforces_cap() {
        let entries: Vec<String> = (0..150).map(|i| format!("q{}", i)).collect();
        let history = HistoryList::from_entries(entries);
        assert_eq!(history.len(), HISTORY_CAP);
        assert_eq!(history.entries()[0], "q0");
    }
}
