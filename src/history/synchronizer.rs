//! History synchronizer
//!
//! Tracks which sequence number the document believes is active and uses it to
//! classify navigation events. Applying the classification (rebuilding the
//! song, broadcasting) is the document's job.

use super::snapshot::HistorySnapshot;

/// How an incoming navigation entry relates to the tracked one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKind {
    /// The user edited the address; no snapshot is attached
    DirectEdit,
    /// The event reports the entry we already consider active
    Echo,
    /// Back to the step that was active when the tracked one was pushed
    Undo,
    /// Forward, or more than one step in either direction
    Jump,
}

#[derive(Debug, Clone, Default)]
pub struct HistorySynchronizer {
    sequence_number: u64,
    /// Highest number ever handed out or seen; new steps always go above it
    highest_sequence_number: u64,
    /// Predecessor of the active step, if its snapshot recorded one
    previous_sequence_number: Option<u64>,
    /// Selection recorded by the active snapshot; restored when that step is undone
    selection_from_current_state: (usize, usize),
}

impl HistorySynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn previous_sequence_number(&self) -> Option<u64> {
        self.previous_sequence_number
    }

    pub fn classify(&self, snapshot: Option<&HistorySnapshot>) -> NavigationKind {
        match snapshot {
            None => NavigationKind::DirectEdit,
            Some(s) if s.sequence_number == self.sequence_number => NavigationKind::Echo,
            Some(s) if self.is_predecessor(s.sequence_number) => NavigationKind::Undo,
            Some(_) => NavigationKind::Jump,
        }
    }

    /// Snapshots without a recorded predecessor fall back to numeric adjacency
    fn is_predecessor(&self, sequence_number: u64) -> bool {
        match self.previous_sequence_number {
            Some(previous) => previous == sequence_number,
            None => sequence_number + 1 == self.sequence_number,
        }
    }

    /// Sequence number for a new step on top of the active one; never reused
    ///
    /// Returns `(previous, allocated)`.
    pub fn allocate(&mut self) -> (u64, u64) {
        let previous = self.sequence_number;
        self.highest_sequence_number = self.highest_sequence_number.max(previous) + 1;
        self.sequence_number = self.highest_sequence_number;
        self.previous_sequence_number = Some(previous);
        (previous, self.sequence_number)
    }

    /// Selection to restore when `snapshot` becomes active through `kind`
    pub fn selection_for(&self, kind: NavigationKind, snapshot: &HistorySnapshot) -> (usize, usize) {
        match kind {
            NavigationKind::Undo => self.selection_from_current_state,
            _ => (snapshot.bar, snapshot.channel),
        }
    }

    /// Make `snapshot` the tracked active entry
    pub fn adopt(&mut self, snapshot: &HistorySnapshot) {
        self.sequence_number = snapshot.sequence_number;
        self.highest_sequence_number = self.highest_sequence_number.max(snapshot.sequence_number);
        self.previous_sequence_number = snapshot.previous_sequence_number;
        self.selection_from_current_state = (snapshot.bar, snapshot.channel);
    }
}
