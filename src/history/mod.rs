//! Document history
//!
//! The pieces that turn the live song into a linear, navigable history:
//!
//! - `snapshot`: the record attached to every navigation entry
//! - `navigation`: the navigation stack abstraction and its in-memory backend
//! - `scheduler`: per-frame commit scheduling
//! - `recorder`: push / amend / drop decisions for recorded changes
//! - `synchronizer`: classification of navigation events

pub mod navigation;
pub mod recorder;
pub mod scheduler;
pub mod snapshot;
pub mod synchronizer;

pub use navigation::{MemoryNavigationStack, NavigationStack, Traversal};
pub use recorder::{ChangeRecorder, CommitKind, RecordOutcome};
pub use scheduler::{FrameScheduler, ManualFrameScheduler};
pub use snapshot::{HistorySnapshot, NavigationEntry};
pub use synchronizer::{HistorySynchronizer, NavigationKind};
