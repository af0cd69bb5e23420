//! JavaScript-facing song editor
//!
//! Wraps a [`SongDocument`] backed by the browser history. JS watchers are
//! kept here rather than in the document's notifier so they run after the
//! document borrow is released and may call straight back into the editor.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use super::browser::{AnimationFrameScheduler, BrowserHistory};
use super::helpers::js_error;
use crate::change::{ChangeBarCount, ChangeBeatsPerBar, ChangeInstrument, ChangePattern, ChangeTempo};
use crate::config::{DocumentConfig, EditorPreferences};
use crate::document::{DocumentError, SliderDrag, SongDocument};
use crate::history::NavigationStack;
use crate::song::Instrument;
use crate::{wasm_error, wasm_info, wasm_log, wasm_warn};

type BrowserDocument = SongDocument<BrowserHistory, AnimationFrameScheduler>;

const NAVIGATION_EVENTS: [&str; 2] = ["popstate", "hashchange"];

/// JS watchers plus the flag the document's notifier raises
#[derive(Default)]
struct JsWatchers {
    callbacks: RefCell<Vec<js_sys::Function>>,
    dirty: Cell<bool>,
}

impl JsWatchers {
    /// Call every watcher if the document broadcast since the last dispatch
    fn dispatch(&self) {
        if !self.dirty.replace(false) {
            return;
        }
        let callbacks = self.callbacks.borrow().clone();
        for callback in callbacks {
            if let Err(e) = callback.call0(&JsValue::NULL) {
                wasm_error!("Watcher threw: {:?}", e);
            }
        }
    }
}

fn frame_callback(doc: Weak<RefCell<BrowserDocument>>, watchers: Rc<JsWatchers>) -> Closure<dyn FnMut()> {
    Closure::wrap(Box::new(move || {
        let Some(doc) = doc.upgrade() else {
            return;
        };
        doc.borrow_mut().on_frame();
        watchers.dispatch();
    }) as Box<dyn FnMut()>)
}

fn navigation_callback(
    doc: Weak<RefCell<BrowserDocument>>,
    watchers: Rc<JsWatchers>,
) -> Closure<dyn FnMut()> {
    Closure::wrap(Box::new(move || {
        let Some(doc) = doc.upgrade() else {
            return;
        };
        let result = {
            let mut doc = doc.borrow_mut();
            let current = doc.navigation().current();
            wasm_log!(
                "Navigation event while at sequence {}: {:?}",
                doc.sequence_number(),
                current.as_ref().and_then(|entry| entry.snapshot.as_ref())
            );
            match current {
                Some(entry) => doc.handle_navigation(entry),
                None => Err(DocumentError::MissingHistoryState),
            }
        };
        if let Err(e) = result {
            wasm_error!("Navigation event not applied: {}", e);
        }
        watchers.dispatch();
    }) as Box<dyn FnMut()>)
}

#[wasm_bindgen]
pub struct SongEditor {
    doc: Rc<RefCell<BrowserDocument>>,
    watchers: Rc<JsWatchers>,
    navigation_listener: Closure<dyn FnMut()>,
    tempo_slider: SliderDrag<ChangeTempo>,
}

#[wasm_bindgen]
impl SongEditor {
    /// Attach to the current page; `preferences_json` is the persisted
    /// preferences record, if any
    #[wasm_bindgen(constructor)]
    pub fn new(preferences_json: Option<String>) -> Result<SongEditor, JsValue> {
        let preferences = match preferences_json {
            Some(json) => EditorPreferences::from_json(&json).map_err(js_error)?,
            None => EditorPreferences::default(),
        };

        let doc = SongDocument::new(
            DocumentConfig::with_preferences(preferences),
            BrowserHistory::new()?,
            AnimationFrameScheduler::new(),
        )
        .map_err(js_error)?;
        let doc = Rc::new(RefCell::new(doc));
        let watchers = Rc::new(JsWatchers::default());

        {
            let watchers = watchers.clone();
            doc.borrow_mut().watch(move || watchers.dirty.set(true));
        }
        let frame = frame_callback(Rc::downgrade(&doc), watchers.clone());
        doc.borrow_mut().scheduler_mut().set_callback(frame);

        let navigation_listener = navigation_callback(Rc::downgrade(&doc), watchers.clone());
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window available"))?;
        for event in NAVIGATION_EVENTS {
            window.add_event_listener_with_callback(event, navigation_listener.as_ref().unchecked_ref())?;
        }

        wasm_info!("Song editor attached at sequence {}", doc.borrow().sequence_number());
        Ok(SongEditor {
            doc,
            watchers,
            navigation_listener,
            tempo_slider: SliderDrag::new(),
        })
    }

    /// Register a callback run once per frame after the document changed
    pub fn watch(&self, callback: js_sys::Function) {
        self.watchers.callbacks.borrow_mut().push(callback);
    }

    pub fn undo(&self) -> Result<bool, JsValue> {
        let result = self.doc.borrow_mut().undo().map_err(js_error);
        self.watchers.dispatch();
        result
    }

    pub fn redo(&self) -> Result<bool, JsValue> {
        let result = self.doc.borrow_mut().redo().map_err(js_error);
        self.watchers.dispatch();
        result
    }

    #[wasm_bindgen(js_name = openPrompt)]
    pub fn open_prompt(&self, name: &str) -> Result<(), JsValue> {
        self.doc.borrow_mut().open_prompt(name).map_err(js_error)
    }

    #[wasm_bindgen(js_name = closePrompt)]
    pub fn close_prompt(&self) -> Result<bool, JsValue> {
        let result = self.doc.borrow_mut().close_prompt().map_err(js_error);
        self.watchers.dispatch();
        result
    }

    /// Slider-style tempo edit; while `dragging`, successive calls amend one step
    /// and only a return to the starting tempo drops it
    #[wasm_bindgen(js_name = setTempo)]
    pub fn set_tempo(&mut self, tempo: u8, dragging: bool) -> bool {
        let mut doc = self.doc.borrow_mut();
        self.tempo_slider
            .update(&mut *doc, dragging, |song| ChangeTempo::new(song, tempo))
            .is_some()
    }

    #[wasm_bindgen(js_name = setBeatsPerBar)]
    pub fn set_beats_per_bar(&self, beats_per_bar: u8) -> bool {
        let mut doc = self.doc.borrow_mut();
        let change = ChangeBeatsPerBar::new(doc.song_mut(), beats_per_bar);
        doc.record(&change, false).is_some()
    }

    #[wasm_bindgen(js_name = setBarCount)]
    pub fn set_bar_count(&self, bar_count: usize) -> bool {
        let mut doc = self.doc.borrow_mut();
        let change = ChangeBarCount::new(doc.song_mut(), bar_count);
        doc.record(&change, false).is_some()
    }

    #[wasm_bindgen(js_name = setInstrument)]
    pub fn set_instrument(&self, channel: usize, instrument: u8) -> Result<bool, JsValue> {
        let instrument = Instrument::from_index(instrument)
            .ok_or_else(|| js_error(format!("Invalid instrument index: {}", instrument)))?;
        let mut doc = self.doc.borrow_mut();
        let change = ChangeInstrument::new(doc.song_mut(), channel, instrument);
        Ok(doc.record(&change, false).is_some())
    }

    #[wasm_bindgen(js_name = setPattern)]
    pub fn set_pattern(&self, channel: usize, bar: usize, pattern: u8) -> bool {
        let mut doc = self.doc.borrow_mut();
        let change = ChangePattern::new(doc.song_mut(), channel, bar, pattern);
        doc.record(&change, false).is_some()
    }

    #[wasm_bindgen(js_name = setSelection)]
    pub fn set_selection(&self, bar: usize, channel: usize) {
        self.doc.borrow_mut().set_selection(bar, channel);
    }

    pub fn bar(&self) -> usize {
        self.doc.borrow().bar()
    }

    pub fn channel(&self) -> usize {
        self.doc.borrow().channel()
    }

    pub fn prompt(&self) -> Option<String> {
        self.doc.borrow().prompt().map(|p| p.as_str().to_string())
    }

    #[wasm_bindgen(js_name = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.doc.borrow().can_undo()
    }

    #[wasm_bindgen(js_name = sequenceNumber)]
    pub fn sequence_number(&self) -> f64 {
        self.doc.borrow().sequence_number() as f64
    }

    #[wasm_bindgen(js_name = songString)]
    pub fn song_string(&self) -> String {
        self.doc.borrow().song().to_encoded()
    }

    #[wasm_bindgen(js_name = preferencesJson)]
    pub fn preferences_json(&self) -> Result<String, JsValue> {
        self.doc.borrow().preferences().to_json().map_err(js_error)
    }
}

impl Drop for SongEditor {
    fn drop(&mut self) {
        let Some(window) = web_sys::window() else {
            return;
        };
        for event in NAVIGATION_EVENTS {
            if let Err(e) = window.remove_event_listener_with_callback(
                event,
                self.navigation_listener.as_ref().unchecked_ref(),
            ) {
                wasm_warn!("Could not remove {} listener: {:?}", event, e);
            }
        }
    }
}
