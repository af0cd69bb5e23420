//! Reversible edits to the song
//!
//! A change is applied when it is constructed and afterwards is inert data:
//! the recorder only ever asks whether it did anything. Widgets that drag a
//! value around can use [`UndoableChange`] to take back their own in-flight
//! edit before replacing it with a new one.

pub mod song_changes;

pub use song_changes::*;

use serde::{Deserialize, Serialize};

use crate::song::Song;

/// A unit of recorded mutation
pub trait Change {
    /// True when applying this change left the song exactly as it was
    fn is_noop(&self) -> bool;
}

/// A change that can take itself back and re-apply itself
pub trait UndoableChange: Change {
    fn undo(&self, song: &mut Song);
    fn redo(&self, song: &mut Song);
}

/// Identifies one in-flight edit so a widget can tell whether the document's
/// most recent change is still the one it started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChangeToken(pub u64);

/// An ordered batch of changes recorded as a single step
#[derive(Default)]
pub struct ChangeGroup {
    changes: Vec<Box<dyn UndoableChange>>,
}

impl ChangeGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, change: impl UndoableChange + 'static) {
        self.changes.push(Box::new(change));
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

impl Change for ChangeGroup {
    fn is_noop(&self) -> bool {
        self.changes.iter().all(|c| c.is_noop())
    }
}

impl UndoableChange for ChangeGroup {
    fn undo(&self, song: &mut Song) {
        // Reverse order
        for change in self.changes.iter().rev() {
            change.undo(song);
        }
    }

    fn redo(&self, song: &mut Song) {
        for change in &self.changes {
            change.redo(song);
        }
    }
}
