//! Per-entry expiration tracking.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

/// Address of one entry inside a session: section name plus key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryKey {
    /// Section name (already site-qualified).
    pub section: String,
    /// Key within the section.
    pub key: String,
}

impl EntryKey {
    /// Create a new entry key.
    pub fn new(section: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            key: key.into(),
        }
    }
}

/// Tracks absolute deadlines for session entries.
///
/// Entries without a deadline never expire. An entry is expired once the
/// current time reaches its deadline.
#[derive(Debug, Default)]
pub struct ExpiryTracker {
    deadlines: HashMap<EntryKey, DateTime<Utc>>,
}

impl ExpiryTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or replace) the deadline for an entry.
    pub fn set(&mut self, entry: EntryKey, deadline: DateTime<Utc>) {
        self.deadlines.insert(entry, deadline);
    }

    /// Get the deadline for an entry, if any.
    pub fn deadline(&self, entry: &EntryKey) -> Option<DateTime<Utc>> {
        self.deadlines.get(entry).copied()
    }

    /// Check if an entry has expired at `now`.
    pub fn is_expired(&self, entry: &EntryKey, now: DateTime<Utc>) -> bool {
        self.deadlines
            .get(entry)
            .is_some_and(|deadline| now >= *deadline)
    }

    /// Stop tracking an entry (it no longer expires).
    pub fn remove(&mut self, entry: &EntryKey) {
        self.deadlines.remove(entry);
    }

    /// Stop tracking every entry of a section.
    pub fn remove_section(&mut self, section: &str) {
        self.deadlines.retain(|entry, _| entry.section != section);
    }

    /// All entries expired at `now`.
    pub fn expired(&self, now: DateTime<Utc>) -> Vec<EntryKey> {
        self.deadlines
            .iter()
            .filter(|(_, deadline)| now >= **deadline)
            .map(|(entry, _)| entry.clone())
            .collect()
    }

    /// Remove all entries expired at `now` and return them.
    pub fn drain_expired(&mut self, now: DateTime<Utc>) -> Vec<EntryKey> {
        let expired = self.expired(now);
        for entry in &expired {
            self.deadlines.remove(entry);
        }
        expired
    }

    /// Number of entries with a deadline.
    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    /// Check if no entry has a deadline.
    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entry(key: &str) -> EntryKey {
        EntryKey::new("requests", key)
    }

    #[test]
    fn test_untracked_entry_never_expires() {
        let tracker = ExpiryTracker::new();
        assert!(!tracker.is_expired(&entry("a"), Utc::now()));
        assert!(tracker.expired(Utc::now()).is_empty());
    }

    #[test]
    fn test_expires_at_deadline() {
        let now = Utc::now();
        let mut tracker = ExpiryTracker::new();
        tracker.set(entry("a"), now + Duration::seconds(10));

        assert!(!tracker.is_expired(&entry("a"), now));
        assert!(!tracker.is_expired(&entry("a"), now + Duration::seconds(9)));
        assert!(tracker.is_expired(&entry("a"), now + Duration::seconds(10)));
    }

    #[test]
    fn test_set_replaces_deadline() {
        let now = Utc::now();
        let mut tracker = ExpiryTracker::new();
        tracker.set(entry("a"), now + Duration::seconds(1));
        tracker.set(entry("a"), now + Duration::seconds(60));

        assert!(!tracker.is_expired(&entry("a"), now + Duration::seconds(30)));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_drain_expired() {
        let now = Utc::now();
        let mut tracker = ExpiryTracker::new();
        tracker.set(entry("a"), now + Duration::seconds(1));
        tracker.set(entry("b"), now + Duration::seconds(2));
        tracker.set(entry("c"), now + Duration::seconds(60));

        let mut drained = tracker.drain_expired(now + Duration::seconds(5));
        drained.sort_by(|x, y| x.key.cmp(&y.key));

        assert_eq!(drained, vec![entry("a"), entry("b")]);
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_remove_section() {
        let now = Utc::now();
        let mut tracker = ExpiryTracker::new();
        tracker.set(EntryKey::new("requests", "a"), now);
        tracker.set(EntryKey::new("flash", "a"), now);

        tracker.remove_section("requests");

        assert_eq!(tracker.len(), 1);
        assert!(tracker.deadline(&EntryKey::new("flash", "a")).is_some());
    }
}
