//! Frame scheduling
//!
//! Commits are deferred to the next UI frame. The scheduler only asks the host
//! for a frame; the host then calls `SongDocument::on_frame`.

pub trait FrameScheduler {
    /// Ask the host to fire the frame callback once, soon
    fn request_frame(&mut self);
}

/// Scheduler for native hosts and tests: it only counts requests, the owner
/// decides when frames fire
#[derive(Debug, Clone, Default)]
pub struct ManualFrameScheduler {
    requested: usize,
}

impl ManualFrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of frames requested so far
    pub fn requested(&self) -> usize {
        self.requested
    }
}

impl FrameScheduler for ManualFrameScheduler {
    fn request_frame(&mut self) {
        self.requested += 1;
    }
}
