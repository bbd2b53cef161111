//! # Activity Log
//!
//! Append-only ring buffer of human-readable events attributed to a
//! username. Oldest entry is overwritten on overflow; there is no
//! deletion API. This is an operator convenience, not an audit trail.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Default number of retained entries.
pub const DEFAULT_LOG_CAPACITY: usize = 32;

/// One logged action.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ActivityEntry {
    pub timestamp: DateTime<Utc>,
    pub username: String,
    pub action: String,
}

/// Fixed-capacity ring of activity entries.
#[derive(Debug)]
pub struct ActivityLog {
    entries: Vec<Option<ActivityEntry>>,
    /// Slot the next append writes to.
    head: usize,
}

impl ActivityLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: vec![None; capacity.max(1)],
            head: 0,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    pub fn record(&mut self, username: &str, action: &str) {
        self.record_at(username, action, Utc::now());
    }

    pub fn record_at(&mut self, username: &str, action: &str, timestamp: DateTime<Utc>) {
        self.entries[self.head] = Some(ActivityEntry {
            timestamp,
            username: username.to_string(),
            action: action.to_string(),
        });
        self.head = (self.head + 1) % self.entries.len();
    }

    /// Entries in logical order, oldest to newest.
    pub fn entries(&self) -> Vec<ActivityEntry> {
        let n = self.entries.len();
        (0..n)
            .map(|i| (self.head + i) % n)
            .filter_map(|i| self.entries[i].clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_oldest_first() {
        let mut log = ActivityLog::new(4);
        log.record("admin", "login");
        log.record("admin", "LED set to RED");
        log.record("admin", "logout");

        let actions: Vec<_> = log.entries().into_iter().map(|e| e.action).collect();
        assert_eq!(actions, vec!["login", "LED set to RED", "logout"]);
    }

    #[test]
    fn test_overflow_overwrites_oldest() {
        let mut log = ActivityLog::new(3);
        for action in ["one", "two", "three", "four", "five"] {
            log.record("u", action);
        }

        let actions: Vec<_> = log.entries().into_iter().map(|e| e.action).collect();
        assert_eq!(actions, vec!["three", "four", "five"]);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_capacity_is_at_least_one() {
        let mut log = ActivityLog::new(0);
        log.record("u", "only");
        assert_eq!(log.len(), 1);
    }
}
