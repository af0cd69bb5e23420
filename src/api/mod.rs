//! Chiptune Editor WASM API
//!
//! This module provides the JavaScript-facing API for the song editor.
//!
//! # Module Structure
//!
//! - `helpers`: Console logging macros, serialization and error conversion
//! - `browser`: `window.history` navigation stack and `requestAnimationFrame` scheduler
//! - `editor`: The `SongEditor` class exported to JavaScript

pub mod helpers;
pub mod browser;
pub mod editor;

pub use browser::{AnimationFrameScheduler, BrowserHistory};
pub use editor::SongEditor;
