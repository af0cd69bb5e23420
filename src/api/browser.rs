//! Browser backends for the history engine
//!
//! `window.history` as the navigation stack (snapshot in `history.state`,
//! encoded song in `location.hash`) and `requestAnimationFrame` as the frame
//! scheduler.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use super::helpers::{deserialize, serialize};
use crate::{wasm_error, wasm_warn};
use crate::history::{FrameScheduler, HistorySnapshot, NavigationEntry, NavigationStack, Traversal};

pub struct BrowserHistory {
    window: web_sys::Window,
}

impl BrowserHistory {
    pub fn new() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window available"))?;
        Ok(Self { window })
    }

    fn history(&self) -> Option<web_sys::History> {
        match self.window.history() {
            Ok(history) => Some(history),
            Err(e) => {
                wasm_error!("window.history unavailable: {:?}", e);
                None
            }
        }
    }

    fn write(&self, entry: NavigationEntry, push: bool) {
        let Some(history) = self.history() else {
            return;
        };
        let state = match &entry.snapshot {
            Some(snapshot) => match serialize(snapshot, "History snapshot serialization error") {
                Ok(state) => state,
                Err(_) => return,
            },
            None => JsValue::NULL,
        };
        let url = format!("#{}", entry.payload);

        let result = if push {
            history.push_state_with_url(&state, "", Some(&url))
        } else {
            history.replace_state_with_url(&state, "", Some(&url))
        };
        if let Err(e) = result {
            wasm_error!("Writing history entry failed: {:?}", e);
        }
    }
}

impl NavigationStack for BrowserHistory {
    fn current(&self) -> Option<NavigationEntry> {
        let history = self.history()?;
        let state = history.state().ok()?;
        let snapshot = if state.is_null() || state.is_undefined() {
            None
        } else {
            deserialize::<HistorySnapshot>(state, "History state is not a snapshot").ok()
        };
        let hash = self.window.location().hash().ok()?;
        Some(NavigationEntry {
            snapshot,
            payload: hash.trim_start_matches('#').to_string(),
        })
    }

    fn push(&mut self, entry: NavigationEntry) {
        self.write(entry, true);
    }

    fn replace(&mut self, entry: NavigationEntry) {
        self.write(entry, false);
    }

    /// The browser answers with a `popstate` event later, so this never arrives
    /// synchronously
    fn go(&mut self, delta: isize) -> Traversal {
        let Some(history) = self.history() else {
            return Traversal::Blocked;
        };
        match history.go_with_delta(delta as i32) {
            Ok(()) => Traversal::Pending,
            Err(e) => {
                wasm_error!("history.go({}) failed: {:?}", delta, e);
                Traversal::Blocked
            }
        }
    }
}

/// Requests animation frames for a callback installed after construction
#[derive(Default)]
pub struct AnimationFrameScheduler {
    callback: Option<Closure<dyn FnMut()>>,
}

impl AnimationFrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_callback(&mut self, callback: Closure<dyn FnMut()>) {
        self.callback = Some(callback);
    }
}

impl FrameScheduler for AnimationFrameScheduler {
    fn request_frame(&mut self) {
        let Some(callback) = &self.callback else {
            wasm_warn!("Frame requested before a frame callback was installed");
            return;
        };
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Err(e) = window.request_animation_frame(callback.as_ref().unchecked_ref()) {
            wasm_error!("requestAnimationFrame failed: {:?}", e);
        }
    }
}
