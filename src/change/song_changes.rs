//! Concrete song edits
//!
//! Every constructor applies its edit immediately and remembers the value it
//! replaced.

use super::{Change, UndoableChange};
use crate::song::{
    Channel, Instrument, Song, SongError, BEATS_PER_BAR_MAX, BEATS_PER_BAR_MIN, PATTERN_MAX,
    TEMPO_MAX, TEMPO_MIN,
};

/// Set the song tempo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeTempo {
    old: u8,
    new: u8,
}

impl ChangeTempo {
    pub fn new(song: &mut Song, tempo: u8) -> Self {
        let old = song.tempo;
        let new = tempo.clamp(TEMPO_MIN, TEMPO_MAX);
        song.tempo = new;
        Self { old, new }
    }
}

impl Change for ChangeTempo {
    fn is_noop(&self) -> bool {
        self.old == self.new
    }
}

impl UndoableChange for ChangeTempo {
    fn undo(&self, song: &mut Song) {
        song.tempo = self.old;
    }

    fn redo(&self, song: &mut Song) {
        song.tempo = self.new;
    }
}

/// Set the number of beats in each bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeBeatsPerBar {
    old: u8,
    new: u8,
}

impl ChangeBeatsPerBar {
    pub fn new(song: &mut Song, beats_per_bar: u8) -> Self {
        let old = song.beats_per_bar;
        let new = beats_per_bar.clamp(BEATS_PER_BAR_MIN, BEATS_PER_BAR_MAX);
        song.beats_per_bar = new;
        Self { old, new }
    }
}

impl Change for ChangeBeatsPerBar {
    fn is_noop(&self) -> bool {
        self.old == self.new
    }
}

impl UndoableChange for ChangeBeatsPerBar {
    fn undo(&self, song: &mut Song) {
        song.beats_per_bar = self.old;
    }

    fn redo(&self, song: &mut Song) {
        song.beats_per_bar = self.new;
    }
}

/// Resize the song to a new number of bars
///
/// Shrinking drops bars, so the previous channel contents are kept whole for undo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeBarCount {
    old_bar_count: usize,
    old_channels: Vec<Channel>,
    new_bar_count: usize,
}

impl ChangeBarCount {
    pub fn new(song: &mut Song, bar_count: usize) -> Self {
        let old_bar_count = song.bar_count;
        let old_channels = song.channels.clone();
        song.set_bar_count(bar_count);
        Self {
            old_bar_count,
            old_channels,
            new_bar_count: song.bar_count,
        }
    }
}

impl Change for ChangeBarCount {
    fn is_noop(&self) -> bool {
        self.old_bar_count == self.new_bar_count
    }
}

impl UndoableChange for ChangeBarCount {
    fn undo(&self, song: &mut Song) {
        song.bar_count = self.old_bar_count;
        song.channels = self.old_channels.clone();
    }

    fn redo(&self, song: &mut Song) {
        song.set_bar_count(self.new_bar_count);
    }
}

/// Switch the waveform of one channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeInstrument {
    channel: usize,
    old: Instrument,
    new: Instrument,
}

impl ChangeInstrument {
    /// Out-of-range channels produce a no-op change
    pub fn new(song: &mut Song, channel: usize, instrument: Instrument) -> Self {
        match song.channels.get_mut(channel) {
            Some(c) => {
                let old = c.instrument;
                c.instrument = instrument;
                Self { channel, old, new: instrument }
            }
            None => Self { channel, old: instrument, new: instrument },
        }
    }
}

impl Change for ChangeInstrument {
    fn is_noop(&self) -> bool {
        self.old == self.new
    }
}

impl UndoableChange for ChangeInstrument {
    fn undo(&self, song: &mut Song) {
        if let Some(c) = song.channels.get_mut(self.channel) {
            c.instrument = self.old;
        }
    }

    fn redo(&self, song: &mut Song) {
        if let Some(c) = song.channels.get_mut(self.channel) {
            c.instrument = self.new;
        }
    }
}

/// Place a pattern number in one bar of one channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangePattern {
    channel: usize,
    bar: usize,
    old: u8,
    new: u8,
}

impl ChangePattern {
    /// Out-of-range positions produce a no-op change
    pub fn new(song: &mut Song, channel: usize, bar: usize, pattern: u8) -> Self {
        let pattern = pattern.min(PATTERN_MAX);
        let slot = song
            .channels
            .get_mut(channel)
            .and_then(|c| c.patterns.get_mut(bar));
        match slot {
            Some(slot) => {
                let old = *slot;
                *slot = pattern;
                Self { channel, bar, old, new: pattern }
            }
            None => Self { channel, bar, old: pattern, new: pattern },
        }
    }

    fn write(&self, song: &mut Song, value: u8) {
        if let Some(slot) = song
            .channels
            .get_mut(self.channel)
            .and_then(|c| c.patterns.get_mut(self.bar))
        {
            *slot = value;
        }
    }
}

impl Change for ChangePattern {
    fn is_noop(&self) -> bool {
        self.old == self.new
    }
}

impl UndoableChange for ChangePattern {
    fn undo(&self, song: &mut Song) {
        self.write(song, self.old);
    }

    fn redo(&self, song: &mut Song) {
        self.write(song, self.new);
    }
}

/// Replace the whole song with one decoded from an encoded string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSong {
    old: Song,
    new: Song,
}

impl ChangeSong {
    /// Decodes before touching the song: on error the song is left unchanged
    pub fn new(song: &mut Song, encoded: &str) -> Result<Self, SongError> {
        let new = Song::from_encoded(encoded)?;
        let old = std::mem::replace(song, new.clone());
        Ok(Self { old, new })
    }
}

impl Change for ChangeSong {
    fn is_noop(&self) -> bool {
        self.old == self.new
    }
}

impl UndoableChange for ChangeSong {
    fn undo(&self, song: &mut Song) {
        *song = self.old.clone();
    }

    fn redo(&self, song: &mut Song) {
        *song = self.new.clone();
    }
}
