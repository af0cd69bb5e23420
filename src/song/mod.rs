//! Song model for the chiptune editor
//!
//! A song is a grid of channels by bars. Each cell of the grid holds a pattern
//! number (0 = silent). The model is deliberately flat: the history engine only
//! needs to encode it, decode it and mutate it in place.

pub mod codec;

pub use codec::SongError;

use serde::{Deserialize, Serialize};

pub const TEMPO_MIN: u8 = 1;
pub const TEMPO_MAX: u8 = 63;
pub const BEATS_PER_BAR_MIN: u8 = 1;
pub const BEATS_PER_BAR_MAX: u8 = 16;
pub const BAR_COUNT_MIN: usize = 1;
pub const BAR_COUNT_MAX: usize = 64;
pub const CHANNEL_COUNT_MIN: usize = 1;
pub const CHANNEL_COUNT_MAX: usize = 8;
pub const PATTERN_MAX: u8 = 63;

/// Waveform used by a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Instrument {
    Square,
    Triangle,
    Sawtooth,
    Noise,
}

impl Instrument {
    pub fn index(self) -> u8 {
        match self {
            Instrument::Square => 0,
            Instrument::Triangle => 1,
            Instrument::Sawtooth => 2,
            Instrument::Noise => 3,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Instrument::Square),
            1 => Some(Instrument::Triangle),
            2 => Some(Instrument::Sawtooth),
            3 => Some(Instrument::Noise),
            _ => None,
        }
    }
}

/// One voice of the song: an instrument plus a pattern number per bar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub instrument: Instrument,
    /// Pattern number for each bar (0 = silent)
    pub patterns: Vec<u8>,
}

impl Channel {
    pub fn new(instrument: Instrument, bar_count: usize) -> Self {
        Self {
            instrument,
            patterns: vec![0; bar_count],
        }
    }
}

/// The live song model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub tempo: u8,
    pub beats_per_bar: u8,
    pub bar_count: usize,
    pub channels: Vec<Channel>,
}

impl Default for Song {
    fn default() -> Self {
        let bar_count = 16;
        Self {
            tempo: 7,
            beats_per_bar: 8,
            bar_count,
            channels: vec![
                Channel::new(Instrument::Square, bar_count),
                Channel::new(Instrument::Square, bar_count),
                Channel::new(Instrument::Triangle, bar_count),
                Channel::new(Instrument::Noise, bar_count),
            ],
        }
    }
}

impl Song {
    /// Decode a song from its compact string form
    pub fn from_encoded(encoded: &str) -> Result<Self, SongError> {
        codec::decode(encoded)
    }

    /// Encode the song into its compact, URL-safe string form
    pub fn to_encoded(&self) -> String {
        codec::encode(self)
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Pattern number at a grid position, `None` when out of bounds
    pub fn pattern_at(&self, channel: usize, bar: usize) -> Option<u8> {
        self.channels.get(channel)?.patterns.get(bar).copied()
    }

    /// Resize every channel to `bar_count` bars, padding with silence
    pub fn set_bar_count(&mut self, bar_count: usize) {
        let bar_count = bar_count.clamp(BAR_COUNT_MIN, BAR_COUNT_MAX);
        self.bar_count = bar_count;
        for channel in &mut self.channels {
            channel.patterns.resize(bar_count, 0);
        }
    }
}
