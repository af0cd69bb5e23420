//! Song document controller
//!
//! Owns the live song, the selection and the open prompt, and wires the
//! recorder, synchronizer and notifier to a navigation stack. Widgets only ever
//! talk to this type.
//!
//! The navigation stack is the source of truth for undo/redo: undo is a step
//! back on the stack, and whichever entry becomes active is decoded from its
//! payload.

pub mod prompt;
pub mod slider;

pub use prompt::Prompt;
pub use slider::SliderDrag;

use thiserror::Error;

use crate::change::{Change, ChangeSong, ChangeToken};
use crate::config::{DocumentConfig, EditorPreferences};
use crate::history::{
    ChangeRecorder, CommitKind, FrameScheduler, HistorySnapshot, HistorySynchronizer,
    NavigationEntry, NavigationKind, NavigationStack, RecordOutcome, Traversal,
};
use crate::notifier::{ChangeNotifier, WatcherId};
use crate::song::{Song, SongError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("Unknown prompt '{0}'")]
    UnknownPrompt(String),

    #[error("Failed to rebuild song: {0}")]
    Song(#[from] SongError),

    #[error("Navigation entry has neither a history snapshot nor an address")]
    MissingHistoryState,
}

pub struct SongDocument<N: NavigationStack, F: FrameScheduler> {
    config: DocumentConfig,
    song: Song,
    bar: usize,
    channel: usize,
    prompt: Option<Prompt>,
    navigation: N,
    recorder: ChangeRecorder<F>,
    synchronizer: HistorySynchronizer,
    notifier: ChangeNotifier,
}

impl<N: NavigationStack, F: FrameScheduler> SongDocument<N, F> {
    /// Start a session on top of whatever entry the navigation stack holds
    ///
    /// An entry that already carries a snapshot (page reload) is adopted as is.
    /// Otherwise the song comes from the entry's address, then from
    /// `config.initial_song`, then the default song, and a synthetic first
    /// snapshot that cannot be undone is written over the active entry.
    pub fn new(config: DocumentConfig, navigation: N, scheduler: F) -> Result<Self, DocumentError> {
        let mut doc = Self {
            config,
            song: Song::default(),
            bar: 0,
            channel: 0,
            prompt: None,
            navigation,
            recorder: ChangeRecorder::new(scheduler),
            synchronizer: HistorySynchronizer::new(),
            notifier: ChangeNotifier::new(),
        };

        let current = doc.navigation.current();
        let snapshot = match current {
            Some(NavigationEntry { snapshot: Some(snapshot), payload }) => {
                doc.song = Song::from_encoded(&payload)?;
                doc.bar = snapshot.bar;
                doc.channel = snapshot.channel;
                doc.prompt = parse_snapshot_prompt(snapshot.prompt.as_deref());
                snapshot
            }
            other => {
                let address = other
                    .map(|entry| entry.payload)
                    .filter(|payload| !is_blank_address(payload));
                if let Some(encoded) = address.or_else(|| doc.config.initial_song.clone()) {
                    doc.song = Song::from_encoded(&encoded)?;
                }
                HistorySnapshot::initial(0, 0)
            }
        };

        doc.validate_selection();
        let snapshot = HistorySnapshot {
            bar: doc.bar,
            channel: doc.channel,
            ..snapshot
        };
        doc.synchronizer.adopt(&snapshot);
        doc.navigation
            .replace(NavigationEntry::new(snapshot, doc.song.to_encoded()));

        log::info!(
            "Song document started at sequence {}",
            doc.synchronizer.sequence_number()
        );
        Ok(doc)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn song(&self) -> &Song {
        &self.song
    }

    /// Mutable song access for constructing changes; pass the change to
    /// [`record`](Self::record) afterwards
    pub fn song_mut(&mut self) -> &mut Song {
        &mut self.song
    }

    pub fn bar(&self) -> usize {
        self.bar
    }

    pub fn channel(&self) -> usize {
        self.channel
    }

    pub fn prompt(&self) -> Option<Prompt> {
        self.prompt
    }

    pub fn sequence_number(&self) -> u64 {
        self.synchronizer.sequence_number()
    }

    /// Whether the active entry allows stepping back
    pub fn can_undo(&self) -> bool {
        self.navigation
            .current()
            .and_then(|entry| entry.snapshot)
            .map(|snapshot| snapshot.can_undo)
            .unwrap_or(false)
    }

    pub fn has_pending_commit(&self) -> bool {
        self.recorder.pending_commit().is_some()
    }

    pub fn preferences(&self) -> &EditorPreferences {
        &self.config.preferences
    }

    pub fn navigation(&self) -> &N {
        &self.navigation
    }

    pub fn navigation_mut(&mut self) -> &mut N {
        &mut self.navigation
    }

    pub fn scheduler(&self) -> &F {
        self.recorder.scheduler()
    }

    pub fn scheduler_mut(&mut self) -> &mut F {
        self.recorder.scheduler_mut()
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    pub fn watch(&mut self, watcher: impl FnMut() + 'static) -> WatcherId {
        self.notifier.watch(watcher)
    }

    pub fn unwatch(&mut self, id: WatcherId) -> bool {
        self.notifier.unwatch(id)
    }

    // ========================================================================
    // Recording
    // ========================================================================

    /// Record a change that has already been applied to the song
    ///
    /// Returns the token identifying the change, or `None` if it was a no-op.
    /// With `amend`, the change is folded into the current history step instead
    /// of starting a new one.
    pub fn record(&mut self, change: &dyn Change, amend: bool) -> Option<ChangeToken> {
        match self.recorder.record(change, amend) {
            RecordOutcome::Recorded(token) => {
                self.notifier.changed();
                Some(token)
            }
            RecordOutcome::Discarded => None,
            RecordOutcome::RollBack if self.can_undo() => {
                log::debug!("No-op amendment, dropping the speculative history step");
                if let Err(e) = self.traverse(-1) {
                    log::error!("Rolling back speculative step failed: {}", e);
                }
                None
            }
            RecordOutcome::RollBack => {
                // The session start cannot be stepped off; rewrite it with the reverted song
                log::debug!("No-op amendment of the first step, rewriting it in place");
                self.commit(CommitKind::Amend);
                self.notifier.changed();
                self.recorder.request_frame();
                None
            }
        }
    }

    pub fn new_change_token(&mut self) -> ChangeToken {
        self.recorder.new_change_token()
    }

    pub fn set_prospective_change(&mut self, token: Option<ChangeToken>) {
        self.recorder.set_prospective_change(token);
    }

    pub fn last_change_was(&self, token: Option<ChangeToken>) -> bool {
        self.recorder.last_change_was(token)
    }

    pub fn forget_last_change(&mut self) {
        self.recorder.forget_last_change();
    }

    /// Frame callback: commit whatever was recorded since the last frame, then
    /// broadcast once
    pub fn on_frame(&mut self) {
        if let Some(kind) = self.recorder.frame_fired() {
            self.commit(kind);
        }
        self.notifier.flush();
    }

    fn flush_pending_commit(&mut self) {
        if let Some(kind) = self.recorder.take_pending() {
            self.commit(kind);
        }
    }

    fn commit(&mut self, kind: CommitKind) {
        self.validate_selection();
        let payload = self.song.to_encoded();

        let snapshot = match kind {
            CommitKind::Push => {
                let (previous, sequence_number) = self.synchronizer.allocate();
                HistorySnapshot {
                    sequence_number,
                    previous_sequence_number: Some(previous),
                    can_undo: true,
                    bar: self.bar,
                    channel: self.channel,
                    prompt: self.prompt_id(),
                }
            }
            CommitKind::Amend => HistorySnapshot {
                sequence_number: self.synchronizer.sequence_number(),
                previous_sequence_number: self.synchronizer.previous_sequence_number(),
                can_undo: self.can_undo(),
                bar: self.bar,
                channel: self.channel,
                prompt: self.prompt_id(),
            },
        };

        log::debug!(
            "Committing {:?} at sequence {} ({} chars)",
            kind,
            snapshot.sequence_number,
            payload.len()
        );

        self.synchronizer.adopt(&snapshot);
        let entry = NavigationEntry::new(snapshot, payload);
        match kind {
            CommitKind::Push => self.navigation.push(entry),
            CommitKind::Amend => self.navigation.replace(entry),
        }
    }

    // ========================================================================
    // Undo / redo / prompts
    // ========================================================================

    /// Step back one entry; returns `Ok(false)` if the active entry cannot be undone
    pub fn undo(&mut self) -> Result<bool, DocumentError> {
        self.flush_pending_commit();
        if !self.can_undo() {
            log::debug!("Undo ignored at sequence {}", self.sequence_number());
            return Ok(false);
        }
        self.traverse(-1)
    }

    /// Step forward one entry; returns `Ok(false)` if there is nothing to redo
    pub fn redo(&mut self) -> Result<bool, DocumentError> {
        self.flush_pending_commit();
        self.traverse(1)
    }

    /// Jump `delta` entries at once
    pub fn go(&mut self, delta: isize) -> Result<bool, DocumentError> {
        self.flush_pending_commit();
        self.traverse(delta)
    }

    fn traverse(&mut self, delta: isize) -> Result<bool, DocumentError> {
        match self.navigation.go(delta) {
            Traversal::Arrived(entry) => {
                self.handle_navigation(entry)?;
                Ok(true)
            }
            Traversal::Pending => Ok(true),
            Traversal::Blocked => Ok(false),
        }
    }

    /// Open a prompt as its own history step
    ///
    /// Closing the prompt is an undo of this step.
    pub fn open_prompt(&mut self, name: &str) -> Result<(), DocumentError> {
        let prompt = name.parse::<Prompt>().map_err(|e| {
            log::error!("{}", e);
            e
        })?;

        self.flush_pending_commit();
        self.prompt = Some(prompt);
        self.commit(CommitKind::Push);
        self.notifier.changed();
        self.recorder.request_frame();
        Ok(())
    }

    /// Close the open prompt by undoing the step that opened it
    pub fn close_prompt(&mut self) -> Result<bool, DocumentError> {
        if self.prompt.is_none() {
            return Ok(false);
        }
        self.undo()
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub fn set_bar(&mut self, bar: usize) {
        let channel = self.channel;
        self.set_selection(bar, channel);
    }

    pub fn set_channel(&mut self, channel: usize) {
        let bar = self.bar;
        self.set_selection(bar, channel);
    }

    /// Move the selection; never creates a history step
    pub fn set_selection(&mut self, bar: usize, channel: usize) {
        self.bar = bar;
        self.channel = channel;
        self.validate_selection();
        self.notifier.changed();
        self.recorder.request_frame();
    }

    /// Clamp the selection to the song's bounds
    fn validate_selection(&mut self) {
        self.bar = self.bar.min(self.song.bar_count.saturating_sub(1));
        self.channel = self.channel.min(self.song.channel_count().saturating_sub(1));
    }

    fn prompt_id(&self) -> Option<String> {
        self.prompt.map(|p| p.as_str().to_string())
    }

    // ========================================================================
    // Navigation events
    // ========================================================================

    /// Navigation callback: `entry` is the entry that just became active
    ///
    /// On error nothing is applied; the document keeps its previous song,
    /// selection and sequence number.
    pub fn handle_navigation(&mut self, entry: NavigationEntry) -> Result<(), DocumentError> {
        match entry.snapshot {
            None => self.apply_direct_edit(&entry.payload)?,
            Some(snapshot) => {
                let kind = self.synchronizer.classify(Some(&snapshot));
                if kind == NavigationKind::Echo {
                    log::debug!("Ignoring echo of sequence {}", snapshot.sequence_number);
                    return Ok(());
                }
                self.apply_snapshot(kind, &snapshot, &entry.payload)?;
            }
        }

        self.recorder.take_pending();
        self.forget_last_change();
        self.notifier.notify_watchers();
        Ok(())
    }

    fn apply_direct_edit(&mut self, payload: &str) -> Result<(), DocumentError> {
        if is_blank_address(payload) {
            log::error!("Navigation entry without history state or address");
            return Err(DocumentError::MissingHistoryState);
        }
        ChangeSong::new(&mut self.song, payload).map_err(|e| {
            log::error!("Could not load song from address: {}", e);
            e
        })?;

        self.prompt = None;
        self.validate_selection();
        let (previous, sequence_number) = self.synchronizer.allocate();
        let snapshot = HistorySnapshot {
            sequence_number,
            previous_sequence_number: Some(previous),
            can_undo: true,
            bar: self.bar,
            channel: self.channel,
            prompt: None,
        };
        log::info!("Address edited directly, now at sequence {}", snapshot.sequence_number);

        self.synchronizer.adopt(&snapshot);
        self.navigation
            .replace(NavigationEntry::new(snapshot, self.song.to_encoded()));
        Ok(())
    }

    fn apply_snapshot(
        &mut self,
        kind: NavigationKind,
        snapshot: &HistorySnapshot,
        payload: &str,
    ) -> Result<(), DocumentError> {
        ChangeSong::new(&mut self.song, payload).map_err(|e| {
            log::error!(
                "Could not restore song for sequence {}: {}",
                snapshot.sequence_number,
                e
            );
            e
        })?;

        log::info!(
            "{:?} from sequence {} to {}",
            kind,
            self.synchronizer.sequence_number(),
            snapshot.sequence_number
        );

        let (bar, channel) = self.synchronizer.selection_for(kind, snapshot);
        self.bar = bar;
        self.channel = channel;
        self.prompt = parse_snapshot_prompt(snapshot.prompt.as_deref());
        self.synchronizer.adopt(snapshot);
        self.validate_selection();
        Ok(())
    }
}

fn is_blank_address(payload: &str) -> bool {
    payload.trim_start_matches('#').trim().is_empty()
}

/// Snapshots written by other builds may name prompts this one lacks
fn parse_snapshot_prompt(prompt: Option<&str>) -> Option<Prompt> {
    let name = prompt?;
    match name.parse::<Prompt>() {
        Ok(prompt) => Some(prompt),
        Err(e) => {
            log::warn!("Ignoring prompt from history: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::{ChangePattern, ChangeTempo, UndoableChange};
    use crate::history::{ManualFrameScheduler, MemoryNavigationStack};
    use std::cell::Cell;
    use std::rc::Rc;

    type TestDocument = SongDocument<MemoryNavigationStack, ManualFrameScheduler>;

    fn new_document() -> TestDocument {
        SongDocument::new(
            DocumentConfig::default(),
            MemoryNavigationStack::new(),
            ManualFrameScheduler::new(),
        )
        .unwrap()
    }

    fn set_tempo(doc: &mut TestDocument, tempo: u8) -> Option<ChangeToken> {
        let change = ChangeTempo::new(doc.song_mut(), tempo);
        doc.record(&change, false)
    }

    #[test]
    fn test_new_document_writes_initial_entry() {
        let doc = new_document();
        assert_eq!(doc.sequence_number(), 0);
        assert!(!doc.can_undo());
        assert_eq!(doc.navigation().len(), 1);

        let entry = doc.navigation().current().unwrap();
        assert_eq!(entry.payload, Song::default().to_encoded());
        assert_eq!(entry.snapshot, Some(HistorySnapshot::initial(0, 0)));
    }

    #[test]
    fn test_new_document_loads_shared_link() {
        let mut shared = Song::default();
        shared.tempo = 30;
        let doc = SongDocument::new(
            DocumentConfig::default(),
            MemoryNavigationStack::with_address(format!("#{}", shared.to_encoded())),
            ManualFrameScheduler::new(),
        )
        .unwrap();

        assert_eq!(doc.song().tempo, 30);
        assert!(!doc.can_undo());
    }

    #[test]
    fn test_new_document_uses_initial_song_from_config() {
        let mut initial = Song::default();
        initial.beats_per_bar = 3;
        let config = DocumentConfig {
            initial_song: Some(initial.to_encoded()),
            ..Default::default()
        };
        let doc = SongDocument::new(config, MemoryNavigationStack::new(), ManualFrameScheduler::new())
            .unwrap();
        assert_eq!(doc.song().beats_per_bar, 3);
    }

    #[test]
    fn test_new_document_rejects_malformed_link() {
        let result = SongDocument::new(
            DocumentConfig::default(),
            MemoryNavigationStack::with_address("#garbage"),
            ManualFrameScheduler::new(),
        );
        assert!(matches!(result, Err(DocumentError::Song(_))));
    }

    #[test]
    fn test_new_document_adopts_existing_snapshot() {
        let mut stack = MemoryNavigationStack::new();
        stack.push(NavigationEntry::new(
            HistorySnapshot {
                sequence_number: 12,
                previous_sequence_number: Some(11),
                can_undo: true,
                bar: 3,
                channel: 1,
                prompt: Some("export".to_string()),
            },
            Song::default().to_encoded(),
        ));

        let doc = SongDocument::new(DocumentConfig::default(), stack, ManualFrameScheduler::new())
            .unwrap();
        assert_eq!(doc.sequence_number(), 12);
        assert_eq!((doc.bar(), doc.channel()), (3, 1));
        assert_eq!(doc.prompt(), Some(Prompt::Export));
        assert!(doc.can_undo());
    }

    #[test]
    fn test_noop_record_changes_nothing() {
        let mut doc = new_document();
        let tempo = doc.song().tempo;
        assert_eq!(set_tempo(&mut doc, tempo), None);

        doc.on_frame();
        assert_eq!(doc.sequence_number(), 0);
        assert_eq!(doc.navigation().len(), 1);
        assert_eq!(doc.scheduler().requested(), 0);
    }

    #[test]
    fn test_records_in_one_frame_make_one_step() {
        let mut doc = new_document();
        for tempo in 10..20 {
            set_tempo(&mut doc, tempo);
        }
        assert_eq!(doc.navigation().len(), 1);

        doc.on_frame();
        assert_eq!(doc.sequence_number(), 1);
        assert_eq!(doc.navigation().len(), 2);
        let payload = doc.navigation().current().unwrap().payload;
        assert_eq!(Song::from_encoded(&payload).unwrap().tempo, 19);
    }

    #[test]
    fn test_one_broadcast_per_frame() {
        let mut doc = new_document();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        doc.watch(move || c.set(c.get() + 1));

        set_tempo(&mut doc, 11);
        set_tempo(&mut doc, 12);
        doc.set_bar(2);
        assert_eq!(count.get(), 0);

        doc.on_frame();
        assert_eq!(count.get(), 1);
        doc.on_frame();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_amend_replaces_current_step() {
        let mut doc = new_document();
        let first = set_tempo(&mut doc, 11);
        doc.on_frame();

        assert!(doc.last_change_was(first));
        let change = ChangeTempo::new(doc.song_mut(), 12);
        let amend = doc.last_change_was(first);
        doc.record(&change, amend);
        doc.on_frame();

        assert_eq!(doc.sequence_number(), 1);
        assert_eq!(doc.navigation().len(), 2);
        assert!(doc.can_undo());
        let payload = doc.navigation().current().unwrap().payload;
        assert_eq!(Song::from_encoded(&payload).unwrap().tempo, 12);
    }

    #[test]
    fn test_amending_initial_step_keeps_it_locked() {
        let mut doc = new_document();
        let change = ChangeTempo::new(doc.song_mut(), 21);
        doc.record(&change, true);
        doc.on_frame();

        assert_eq!(doc.sequence_number(), 0);
        assert!(!doc.can_undo());
        assert_eq!(doc.undo(), Ok(false));
    }

    #[test]
    fn test_noop_amend_after_commit_rolls_back() {
        let mut doc = new_document();
        let original = doc.song().clone();

        let change = ChangeTempo::new(doc.song_mut(), 30);
        doc.record(&change, false);
        doc.on_frame();
        assert_eq!(doc.sequence_number(), 1);

        // The drag returned to where it started
        change.undo(doc.song_mut());
        let tempo = doc.song().tempo;
        let noop = ChangeTempo::new(doc.song_mut(), tempo);
        assert_eq!(doc.record(&noop, true), None);

        assert_eq!(doc.sequence_number(), 0);
        assert_eq!(doc.song(), &original);
    }

    #[test]
    fn test_noop_amend_before_frame_cancels_step() {
        let mut doc = new_document();
        let change = ChangeTempo::new(doc.song_mut(), 30);
        doc.record(&change, false);

        change.undo(doc.song_mut());
        let tempo = doc.song().tempo;
        let noop = ChangeTempo::new(doc.song_mut(), tempo);
        doc.record(&noop, true);
        doc.on_frame();

        assert_eq!(doc.sequence_number(), 0);
        assert_eq!(doc.navigation().len(), 1);
    }

    #[test]
    fn test_noop_amend_of_first_step_stays_on_page() {
        // Something else sits below the editor's first entry
        let mut stack = MemoryNavigationStack::with_address("#");
        stack.push(NavigationEntry::bare("#"));
        let mut doc = SongDocument::new(DocumentConfig::default(), stack, ManualFrameScheduler::new())
            .unwrap();
        let original = doc.song().clone();

        let change = ChangeTempo::new(doc.song_mut(), 21);
        doc.record(&change, true);
        doc.on_frame();
        assert_eq!(doc.undo(), Ok(false));

        change.undo(doc.song_mut());
        let tempo = doc.song().tempo;
        let noop = ChangeTempo::new(doc.song_mut(), tempo);
        assert_eq!(doc.record(&noop, true), None);
        doc.on_frame();

        assert_eq!(doc.navigation().cursor(), 1);
        assert_eq!(doc.sequence_number(), 0);
        assert!(!doc.can_undo());
        let payload = doc.navigation().current().unwrap().payload;
        assert_eq!(Song::from_encoded(&payload).unwrap(), original);
    }

    #[test]
    fn test_undo_after_branch_restores_pre_edit_selection() {
        let mut doc = new_document();
        for (selection, tempo) in [((1, 1), 11), ((2, 2), 12)] {
            doc.set_selection(selection.0, selection.1);
            set_tempo(&mut doc, tempo);
            doc.on_frame();
        }
        doc.undo().unwrap();

        doc.set_selection(3, 3);
        set_tempo(&mut doc, 13);
        doc.on_frame();
        assert_eq!(doc.sequence_number(), 3);

        doc.set_selection(0, 0);
        assert_eq!(doc.undo(), Ok(true));
        assert_eq!(doc.sequence_number(), 1);
        assert_eq!((doc.bar(), doc.channel()), (3, 3));
        assert_eq!(doc.song().tempo, 11);
    }

    #[test]
    fn test_undo_restores_pre_edit_selection() {
        let mut doc = new_document();
        doc.set_selection(4, 2);
        doc.on_frame();

        let change = ChangePattern::new(doc.song_mut(), 2, 4, 9);
        doc.record(&change, false);
        doc.on_frame();

        doc.set_selection(10, 0);
        doc.on_frame();

        assert_eq!(doc.undo(), Ok(true));
        assert_eq!((doc.bar(), doc.channel()), (4, 2));
        assert_eq!(doc.song().pattern_at(2, 4), Some(0));
        assert_eq!(doc.sequence_number(), 0);

        // The first step cannot be undone
        assert_eq!(doc.undo(), Ok(false));
        assert_eq!(doc.sequence_number(), 0);
    }

    #[test]
    fn test_redo_after_undo() {
        let mut doc = new_document();
        doc.set_selection(1, 1);
        let change = ChangePattern::new(doc.song_mut(), 1, 1, 5);
        doc.record(&change, false);
        doc.on_frame();
        let edited = doc.song().clone();

        doc.undo().unwrap();
        assert_ne!(doc.song(), &edited);

        assert_eq!(doc.redo(), Ok(true));
        assert_eq!(doc.song(), &edited);
        assert_eq!((doc.bar(), doc.channel()), (1, 1));
        assert_eq!(doc.sequence_number(), 1);

        assert_eq!(doc.redo(), Ok(false));
    }

    #[test]
    fn test_undo_flushes_pending_edit() {
        let mut doc = new_document();
        set_tempo(&mut doc, 40);

        assert_eq!(doc.undo(), Ok(true));
        assert_eq!(doc.song().tempo, Song::default().tempo);
        assert_eq!(doc.redo(), Ok(true));
        assert_eq!(doc.song().tempo, 40);
    }

    #[test]
    fn test_undo_forgets_last_change() {
        let mut doc = new_document();
        let token = set_tempo(&mut doc, 40);
        doc.on_frame();
        assert!(doc.last_change_was(token));

        doc.undo().unwrap();
        assert!(!doc.last_change_was(token));
    }

    #[test]
    fn test_open_prompt_then_undo_closes_it() {
        let mut doc = new_document();
        let song = doc.song().clone();

        doc.open_prompt("export").unwrap();
        assert_eq!(doc.prompt(), Some(Prompt::Export));
        assert_eq!(doc.sequence_number(), 1);
        let snapshot = doc.navigation().current().unwrap().snapshot.unwrap();
        assert_eq!(snapshot.prompt.as_deref(), Some("export"));

        assert_eq!(doc.undo(), Ok(true));
        assert_eq!(doc.prompt(), None);
        assert_eq!(doc.song(), &song);

        assert_eq!(doc.redo(), Ok(true));
        assert_eq!(doc.prompt(), Some(Prompt::Export));
    }

    #[test]
    fn test_close_prompt() {
        let mut doc = new_document();
        assert_eq!(doc.close_prompt(), Ok(false));

        doc.open_prompt("barCount").unwrap();
        assert_eq!(doc.close_prompt(), Ok(true));
        assert_eq!(doc.prompt(), None);
    }

    #[test]
    fn test_unknown_prompt_is_rejected() {
        let mut doc = new_document();
        assert_eq!(
            doc.open_prompt("nope"),
            Err(DocumentError::UnknownPrompt("nope".to_string()))
        );
        assert_eq!(doc.sequence_number(), 0);
        assert_eq!(doc.navigation().len(), 1);
        assert_eq!(doc.prompt(), None);
    }

    #[test]
    fn test_open_prompt_commits_pending_edit_first() {
        let mut doc = new_document();
        set_tempo(&mut doc, 22);
        doc.open_prompt("export").unwrap();

        assert_eq!(doc.sequence_number(), 2);
        doc.undo().unwrap();
        assert_eq!(doc.prompt(), None);
        assert_eq!(doc.song().tempo, 22);
    }

    #[test]
    fn test_selection_is_clamped() {
        let mut doc = new_document();
        doc.set_selection(500, 500);
        assert_eq!(doc.bar(), doc.song().bar_count - 1);
        assert_eq!(doc.channel(), doc.song().channel_count() - 1);
        doc.on_frame();
        assert_eq!(doc.sequence_number(), 0);
    }

    #[test]
    fn test_echo_is_ignored() {
        let mut doc = new_document();
        set_tempo(&mut doc, 40);
        doc.on_frame();

        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        doc.watch(move || c.set(c.get() + 1));

        let current = doc.navigation().current().unwrap();
        doc.handle_navigation(current).unwrap();
        assert_eq!(count.get(), 0);
        assert_eq!(doc.sequence_number(), 1);
    }

    #[test]
    fn test_direct_edit_replaces_host_entry() {
        let mut doc = new_document();
        let mut edited = Song::default();
        edited.tempo = 50;

        let entry = doc.navigation_mut().edit_address(edited.to_encoded());
        doc.handle_navigation(entry).unwrap();

        assert_eq!(doc.sequence_number(), 1);
        assert_eq!(doc.song().tempo, 50);
        assert_eq!(doc.navigation().len(), 2);
        let snapshot = doc.navigation().current().unwrap().snapshot.unwrap();
        assert_eq!(snapshot.sequence_number, 1);
        assert!(snapshot.can_undo);
    }

    #[test]
    fn test_direct_edit_without_address_is_an_error() {
        let mut doc = new_document();
        let entry = doc.navigation_mut().edit_address("#");
        assert_eq!(
            doc.handle_navigation(entry),
            Err(DocumentError::MissingHistoryState)
        );
        assert_eq!(doc.sequence_number(), 0);
    }

    #[test]
    fn test_malformed_restore_keeps_last_good_state() {
        let mut doc = new_document();
        set_tempo(&mut doc, 40);
        doc.on_frame();

        let entry = NavigationEntry::new(
            HistorySnapshot::initial(0, 0),
            "#broken",
        );
        assert!(matches!(
            doc.handle_navigation(entry),
            Err(DocumentError::Song(_))
        ));
        assert_eq!(doc.song().tempo, 40);
        assert_eq!(doc.sequence_number(), 1);
    }

    #[test]
    fn test_jump_restores_snapshot_selection() {
        let mut doc = new_document();
        for (bar, tempo) in [(1, 11), (2, 12), (3, 13)] {
            doc.set_bar(bar);
            set_tempo(&mut doc, tempo);
            doc.on_frame();
        }
        assert_eq!(doc.sequence_number(), 3);

        assert_eq!(doc.go(-3), Ok(true));
        assert_eq!(doc.sequence_number(), 0);
        assert_eq!(doc.bar(), 0);

        assert_eq!(doc.go(2), Ok(true));
        assert_eq!(doc.sequence_number(), 2);
        assert_eq!(doc.bar(), 2);
        assert_eq!(doc.song().tempo, 12);
    }

    #[test]
    fn test_new_edit_after_undo_drops_redo() {
        let mut doc = new_document();
        set_tempo(&mut doc, 11);
        doc.on_frame();
        set_tempo(&mut doc, 12);
        doc.on_frame();

        doc.undo().unwrap();
        set_tempo(&mut doc, 30);
        doc.on_frame();

        assert_eq!(doc.sequence_number(), 3);
        assert_eq!(doc.redo(), Ok(false));
        doc.undo().unwrap();
        assert_eq!(doc.song().tempo, 11);
    }
}
