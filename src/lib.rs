//! Chiptune Song Editor WASM Module
//!
//! Document history engine for a step-sequenced chiptune editor: records edits
//! into a linear, URL-addressable history kept on the host's navigation stack,
//! and keeps the live song in step with back/forward navigation and link edits.

pub mod song;
pub mod change;
pub mod notifier;
pub mod history;
pub mod config;
pub mod document;
pub mod api;

// Re-export commonly used types
pub use change::{Change, ChangeToken, UndoableChange};
pub use config::{DocumentConfig, EditorPreferences};
pub use document::{DocumentError, Prompt, SliderDrag, SongDocument};
pub use history::{
    FrameScheduler, HistorySnapshot, ManualFrameScheduler, MemoryNavigationStack,
    NavigationEntry, NavigationStack,
};
pub use song::{Song, SongError};

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    // Fails only if a logger is already installed
    #[cfg(feature = "console_log")]
    let _ = console_log::init_with_level(log::Level::Debug);

    log::info!("Chiptune editor WASM module initialized");
}
