//! Navigation stack abstraction
//!
//! The host's navigation history is the undo log. In the browser that is
//! `window.history`; natively it is [`MemoryNavigationStack`], an explicit log
//! of entries with a cursor.

use super::snapshot::NavigationEntry;

/// Result of asking the stack to move
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Traversal {
    /// The move happened synchronously; the entry is now active and must be
    /// handed to the document
    Arrived(NavigationEntry),
    /// The host will deliver a navigation event later
    Pending,
    /// Nothing to move to in that direction
    Blocked,
}

pub trait NavigationStack {
    /// The active entry, if the stack holds any
    fn current(&self) -> Option<NavigationEntry>;

    /// Add an entry after the active one, dropping any forward entries
    fn push(&mut self, entry: NavigationEntry);

    /// Overwrite the active entry in place
    fn replace(&mut self, entry: NavigationEntry);

    /// Move `delta` entries (negative = back)
    fn go(&mut self, delta: isize) -> Traversal;

    fn go_back(&mut self) -> Traversal {
        self.go(-1)
    }

    fn go_forward(&mut self) -> Traversal {
        self.go(1)
    }
}

/// In-memory navigation stack for native hosts and tests
///
/// **Invariant**: `cursor < entries.len()` whenever `entries` is non-empty.
#[derive(Debug, Clone, Default)]
pub struct MemoryNavigationStack {
    entries: Vec<NavigationEntry>,
    cursor: usize,
}

impl MemoryNavigationStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a single entry, as if the page was opened on a shared link
    pub fn with_address(payload: impl Into<String>) -> Self {
        Self {
            entries: vec![NavigationEntry::bare(payload)],
            cursor: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn entries(&self) -> &[NavigationEntry] {
        &self.entries
    }

    /// Simulate the user typing a new address: the host pushes a bare entry
    /// and reports it as the active one
    pub fn edit_address(&mut self, payload: impl Into<String>) -> NavigationEntry {
        let entry = NavigationEntry::bare(payload);
        self.push(entry.clone());
        entry
    }
}

impl NavigationStack for MemoryNavigationStack {
    fn current(&self) -> Option<NavigationEntry> {
        self.entries.get(self.cursor).cloned()
    }

    fn push(&mut self, entry: NavigationEntry) {
        if self.entries.is_empty() {
            self.entries.push(entry);
            self.cursor = 0;
            return;
        }
        // Truncate-on-branch: forward entries become unreachable
        self.entries.truncate(self.cursor + 1);
        self.entries.push(entry);
        self.cursor = self.entries.len() - 1;
    }

    fn replace(&mut self, entry: NavigationEntry) {
        match self.entries.get_mut(self.cursor) {
            Some(slot) => *slot = entry,
            None => {
                self.entries.push(entry);
                self.cursor = 0;
            }
        }
    }

    fn go(&mut self, delta: isize) -> Traversal {
        if delta == 0 || self.entries.is_empty() {
            return Traversal::Blocked;
        }
        let target = self.cursor as isize + delta;
        if target < 0 || target >= self.entries.len() as isize {
            return Traversal::Blocked;
        }
        self.cursor = target as usize;
        Traversal::Arrived(self.entries[self.cursor].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::HistorySnapshot;

    fn entry(seq: u64, payload: &str) -> NavigationEntry {
        NavigationEntry::new(
            HistorySnapshot {
                sequence_number: seq,
                previous_sequence_number: seq.checked_sub(1),
                can_undo: seq > 0,
                bar: 0,
                channel: 0,
                prompt: None,
            },
            payload,
        )
    }

    #[test]
    fn test_push_and_traverse() {
        let mut stack = MemoryNavigationStack::new();
        stack.push(entry(0, "a"));
        stack.push(entry(1, "b"));
        stack.push(entry(2, "c"));
        assert_eq!(stack.cursor(), 2);

        assert_eq!(stack.go_back(), Traversal::Arrived(entry(1, "b")));
        assert_eq!(stack.go(-1), Traversal::Arrived(entry(0, "a")));
        assert_eq!(stack.go_back(), Traversal::Blocked);
        assert_eq!(stack.go(2), Traversal::Arrived(entry(2, "c")));
        assert_eq!(stack.go_forward(), Traversal::Blocked);
    }

    #[test]
    fn test_push_after_back_truncates_forward_entries() {
        let mut stack = MemoryNavigationStack::new();
        stack.push(entry(0, "a"));
        stack.push(entry(1, "b"));
        stack.push(entry(2, "c"));
        stack.go(-2);

        stack.push(entry(3, "d"));
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.current(), Some(entry(3, "d")));
        assert_eq!(stack.go_forward(), Traversal::Blocked);
    }

    #[test]
    fn test_replace_overwrites_active_entry() {
        let mut stack = MemoryNavigationStack::new();
        stack.push(entry(0, "a"));
        stack.push(entry(1, "b"));
        stack.replace(entry(1, "b2"));
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.current(), Some(entry(1, "b2")));
    }

    #[test]
    fn test_edit_address_pushes_bare_entry() {
        let mut stack = MemoryNavigationStack::with_address("a");
        let edited = stack.edit_address("z");
        assert_eq!(edited.snapshot, None);
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.current(), Some(edited));
    }

    #[test]
    fn test_empty_stack() {
        let mut stack = MemoryNavigationStack::new();
        assert_eq!(stack.current(), None);
        assert_eq!(stack.go_back(), Traversal::Blocked);
        stack.replace(entry(0, "a"));
        assert_eq!(stack.len(), 1);
    }
}
