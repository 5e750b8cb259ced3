//! Bounded list of recently created paste URLs.

mod store;

pub use store::{load, save};

use crate::constants::DEFAULT_HISTORY_CAPACITY;
use std::collections::VecDeque;

/// Recent paste URLs, most recent first.
///
/// URLs are stored as given; nothing here validates them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteHistory {
    entries: VecDeque<String>,
    capacity: usize,
}

impl Default for PasteHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl PasteHistory {
    /// Empty history holding at most `capacity` URLs (minimum one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// History seeded from `urls` in most-recent-first order; entries past
    /// `capacity` are dropped.
    pub fn from_entries<I, S>(capacity: usize, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut history = Self::new(capacity);
        history
            .entries
            .extend(urls.into_iter().take(history.capacity).map(Into::into));
        history
    }

    /// Insert `url` at the front, evicting the oldest entry when full.
    pub fn record(&mut self, url: impl Into<String>) {
        self.entries.push_front(url.into());
        self.entries.truncate(self.capacity);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Snapshot of every URL, most recent first.
    pub fn all(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn most_recent(&self) -> Option<&str> {
        self.entries.front().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
