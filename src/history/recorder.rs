//! Change recorder
//!
//! Decides what a recorded change means for history: dropped, a new step, or
//! an amendment of the current step. Nothing touches the navigation stack
//! here; the commit happens once per frame in the document.

use crate::change::{Change, ChangeToken};

use super::scheduler::FrameScheduler;

/// How the next frame should write to the navigation stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitKind {
    /// New undo step
    Push,
    /// Overwrite the current step
    Amend,
}

/// What happened to a recorded change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The change will be part of the next commit
    Recorded(ChangeToken),
    /// No-op change, nothing to do
    Discarded,
    /// No-op amendment of a step that is already on the stack: the caller must
    /// step back to drop it
    RollBack,
}

pub struct ChangeRecorder<F: FrameScheduler> {
    scheduler: F,
    waiting_for_frame: bool,
    pending: Option<CommitKind>,
    last_change: Option<ChangeToken>,
    next_token: u64,
}

impl<F: FrameScheduler> ChangeRecorder<F> {
    pub fn new(scheduler: F) -> Self {
        Self {
            scheduler,
            waiting_for_frame: false,
            pending: None,
            last_change: None,
            next_token: 0,
        }
    }

    pub fn scheduler(&self) -> &F {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut F {
        &mut self.scheduler
    }

    pub fn record(&mut self, change: &dyn Change, amend: bool) -> RecordOutcome {
        if change.is_noop() {
            self.last_change = None;
            if !amend {
                return RecordOutcome::Discarded;
            }
            return match self.pending.take() {
                // The speculative step never reached the stack
                Some(CommitKind::Push) => RecordOutcome::Discarded,
                Some(CommitKind::Amend) | None => RecordOutcome::RollBack,
            };
        }

        let token = self.new_change_token();
        self.last_change = Some(token);
        self.pending = match (self.pending, amend) {
            (Some(CommitKind::Push), _) | (_, false) => Some(CommitKind::Push),
            (_, true) => Some(CommitKind::Amend),
        };
        self.request_frame();
        RecordOutcome::Recorded(token)
    }

    /// Ask for a frame unless one is already on its way
    pub fn request_frame(&mut self) {
        if !self.waiting_for_frame {
            self.waiting_for_frame = true;
            self.scheduler.request_frame();
        }
    }

    pub fn is_waiting_for_frame(&self) -> bool {
        self.waiting_for_frame
    }

    pub fn pending_commit(&self) -> Option<CommitKind> {
        self.pending
    }

    /// Called when the frame fires; returns the commit to perform, if any
    pub fn frame_fired(&mut self) -> Option<CommitKind> {
        self.waiting_for_frame = false;
        self.pending.take()
    }

    /// Take the pending commit early, e.g. before an undo
    pub fn take_pending(&mut self) -> Option<CommitKind> {
        self.pending.take()
    }

    pub fn new_change_token(&mut self) -> ChangeToken {
        let token = ChangeToken(self.next_token);
        self.next_token += 1;
        token
    }

    pub fn set_prospective_change(&mut self, token: Option<ChangeToken>) {
        self.last_change = token;
    }

    pub fn last_change_was(&self, token: Option<ChangeToken>) -> bool {
        token.is_some() && self.last_change == token
    }

    pub fn forget_last_change(&mut self) {
        self.last_change = None;
    }
}
