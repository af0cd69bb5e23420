//! Slider drags
//!
//! A drag reports many positions but should leave one history step. Each new
//! position first takes back the edit made by the previous one, then applies a
//! fresh edit measured from where the drag started, and records it as an
//! amendment. The edit is a no-op only when the slider is back at its start.

use crate::change::{ChangeToken, UndoableChange};
use crate::history::{FrameScheduler, NavigationStack};
use crate::song::Song;

use super::SongDocument;

/// In-progress drag of one slider, keeping the change its last position made
pub struct SliderDrag<C: UndoableChange> {
    last: Option<(ChangeToken, C)>,
}

impl<C: UndoableChange> Default for SliderDrag<C> {
    fn default() -> Self {
        Self { last: None }
    }
}

impl<C: UndoableChange> SliderDrag<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one slider position
    ///
    /// `apply` makes the edit against the song and returns it. While
    /// `dragging`, and as long as nothing else was recorded in between, the
    /// previous position's edit is taken back and the new one amends its step.
    /// Returns the token of the recorded change, or `None` for a no-op.
    pub fn update<N, F>(
        &mut self,
        doc: &mut SongDocument<N, F>,
        dragging: bool,
        apply: impl FnOnce(&mut Song) -> C,
    ) -> Option<ChangeToken>
    where
        N: NavigationStack,
        F: FrameScheduler,
    {
        let amend = match self.last.take() {
            Some((token, change)) if dragging && doc.last_change_was(Some(token)) => {
                change.undo(doc.song_mut());
                true
            }
            _ => false,
        };

        let change = apply(doc.song_mut());
        let token = doc.record(&change, amend);
        self.last = token.map(|token| (token, change));
        token
    }

    /// Whether the last position's edit is still the document's last change
    pub fn is_active<N, F>(&self, doc: &SongDocument<N, F>) -> bool
    where
        N: NavigationStack,
        F: FrameScheduler,
    {
        self.last
            .as_ref()
            .is_some_and(|(token, _)| doc.last_change_was(Some(*token)))
    }
}
