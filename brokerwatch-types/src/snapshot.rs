//! Snapshot - the set of readings observed in one poll, and how two compare.

use std::collections::hash_set;
use std::collections::HashSet;
use std::hash::Hash;

/// Everything observed in one poll cycle, after filtering.
///
/// A snapshot is a set: iteration order is unspecified and a reading that
/// appears twice in the broker's response is stored once.
///
/// # Example
///
/// ```rust
/// use brokerwatch_types::{QueueReading, Snapshot};
///
/// let mut snapshot = Snapshot::new();
/// assert!(snapshot.insert(QueueReading::new("jobs", "running", 0, 0)));
/// assert!(!snapshot.insert(QueueReading::new("jobs", "running", 0, 0)));
/// assert_eq!(snapshot.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot<T: Eq + Hash> {
    readings: HashSet<T>,
}

impl<T: Eq + Hash> Snapshot<T> {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self {
            readings: HashSet::new(),
        }
    }

    /// Add a reading. Returns `false` if an identical reading was already present.
    pub fn insert(&mut self, reading: T) -> bool {
        self.readings.insert(reading)
    }

    /// Check if the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Number of distinct readings.
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn contains(&self, reading: &T) -> bool {
        self.readings.contains(reading)
    }
}

impl<T: Eq + Hash + Clone> Snapshot<T> {
    /// Compare this (current) snapshot against the previous one.
    pub fn changes_since(&self, previous: &Snapshot<T>) -> ChangeSet<T> {
        diff(previous, self)
    }
}

impl<T: Eq + Hash> Default for Snapshot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Eq + Hash> FromIterator<T> for Snapshot<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            readings: iter.into_iter().collect(),
        }
    }
}

impl<T: Eq + Hash> Extend<T> for Snapshot<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.readings.extend(iter);
    }
}

impl<T: Eq + Hash> IntoIterator for Snapshot<T> {
    type Item = T;
    type IntoIter = hash_set::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.readings.into_iter()
    }
}

impl<'a, T: Eq + Hash> IntoIterator for &'a Snapshot<T> {
    type Item = &'a T;
    type IntoIter = hash_set::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.readings.iter()
    }
}

/// The difference between two consecutive snapshots.
///
/// `added` holds readings present now but not before (new objects and
/// objects whose projected fields changed). `removed` holds readings that
/// were present before but not now (vanished objects and the old side of a
/// change).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSet<T: Eq + Hash> {
    added: HashSet<T>,
    removed: HashSet<T>,
}

impl<T: Eq + Hash> ChangeSet<T> {
    /// Readings in the current snapshot that the previous one lacked.
    pub fn added(&self) -> &HashSet<T> {
        &self.added
    }

    /// Readings in the previous snapshot that the current one lacks.
    pub fn removed(&self) -> &HashSet<T> {
        &self.removed
    }

    /// True when nothing was added or removed.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// Consume the change set, keeping only the added readings.
    pub fn into_added(self) -> HashSet<T> {
        self.added
    }
}

/// Compute `current - previous` and `previous - current` in one pass over each side.
pub fn diff<T: Eq + Hash + Clone>(previous: &Snapshot<T>, current: &Snapshot<T>) -> ChangeSet<T> {
    let added = current.readings.difference(&previous.readings).cloned().collect();
    let removed = previous.readings.difference(&current.readings).cloned().collect();
    ChangeSet { added, removed }
}
