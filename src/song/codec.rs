//! Compact string codec for songs
//!
//! The encoded form is what ends up in the address bar, so it only uses the
//! URL-safe alphabet `0-9a-zA-Z-_`. Layout: a version digit followed by tagged
//! sections, each tag being a single lowercase letter:
//!
//! - `t` tempo (1 digit)
//! - `a` beats per bar (1 digit)
//! - `g` bar count minus one (1 digit)
//! - `j` channel count minus one (1 digit)
//! - `i` one instrument digit per channel
//! - `b` one pattern digit per channel per bar, channel-major
//!
//! Sections missing from the input keep their default value.

use thiserror::Error;

use super::{
    Channel, Instrument, Song, BAR_COUNT_MAX, BEATS_PER_BAR_MAX, BEATS_PER_BAR_MIN,
    CHANNEL_COUNT_MAX, PATTERN_MAX, TEMPO_MAX, TEMPO_MIN,
};

const VERSION: char = '1';
const ALPHABET: &[u8; 64] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ-_";

/// Errors produced while decoding a song string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SongError {
    #[error("Encoded song is empty")]
    Empty,

    #[error("Unsupported song version '{0}'")]
    UnsupportedVersion(char),

    #[error("Unknown section tag '{tag}' at position {position}")]
    UnknownTag { tag: char, position: usize },

    #[error("Invalid digit '{digit}' at position {position}")]
    InvalidDigit { digit: char, position: usize },

    #[error("Section '{0}' ends before all of its digits were read")]
    Truncated(char),

    #[error("Value {value} out of range for {field}")]
    OutOfRange { field: &'static str, value: usize },
}

fn digit_to_char(value: u8) -> char {
    ALPHABET[(value & 0x3f) as usize] as char
}

fn char_to_digit(c: char, position: usize) -> Result<u8, SongError> {
    ALPHABET
        .iter()
        .position(|&a| a as char == c)
        .map(|p| p as u8)
        .ok_or(SongError::InvalidDigit { digit: c, position })
}

/// Encode a song into its compact string form
pub fn encode(song: &Song) -> String {
    let mut out = String::with_capacity(12 + song.channels.len() * (song.bar_count + 1));
    out.push(VERSION);

    out.push('t');
    out.push(digit_to_char(song.tempo));
    out.push('a');
    out.push(digit_to_char(song.beats_per_bar));
    out.push('g');
    out.push(digit_to_char((song.bar_count.saturating_sub(1)) as u8));
    out.push('j');
    out.push(digit_to_char((song.channels.len().saturating_sub(1)) as u8));

    out.push('i');
    for channel in &song.channels {
        out.push(digit_to_char(channel.instrument.index()));
    }

    out.push('b');
    for channel in &song.channels {
        for bar in 0..song.bar_count {
            out.push(digit_to_char(channel.patterns.get(bar).copied().unwrap_or(0)));
        }
    }

    out
}

/// Cursor over the encoded characters, tracking position for error reporting
struct Reader<'a> {
    chars: std::iter::Peekable<std::iter::Enumerate<std::str::Chars<'a>>>,
}

impl<'a> Reader<'a> {
    fn new(s: &'a str) -> Self {
        Self {
            chars: s.chars().enumerate().peekable(),
        }
    }

    fn next(&mut self) -> Option<(usize, char)> {
        self.chars.next()
    }

    fn digit(&mut self, tag: char) -> Result<u8, SongError> {
        let (position, c) = self.next().ok_or(SongError::Truncated(tag))?;
        char_to_digit(c, position)
    }
}

fn check_range(field: &'static str, value: usize, min: usize, max: usize) -> Result<(), SongError> {
    if value < min || value > max {
        return Err(SongError::OutOfRange { field, value });
    }
    Ok(())
}

/// Decode a song from its compact string form
///
/// A leading `#` (as found in `location.hash`) is ignored.
pub fn decode(encoded: &str) -> Result<Song, SongError> {
    let encoded = encoded.strip_prefix('#').unwrap_or(encoded).trim();
    let mut reader = Reader::new(encoded);

    let (_, version) = reader.next().ok_or(SongError::Empty)?;
    if version != VERSION {
        return Err(SongError::UnsupportedVersion(version));
    }

    let defaults = Song::default();
    let mut tempo = defaults.tempo;
    let mut beats_per_bar = defaults.beats_per_bar;
    let mut bar_count = defaults.bar_count;
    let mut instruments: Vec<Instrument> =
        defaults.channels.iter().map(|c| c.instrument).collect();
    let mut patterns: Vec<Vec<u8>> = vec![vec![0; bar_count]; instruments.len()];

    while let Some((position, tag)) = reader.next() {
        match tag {
            't' => {
                tempo = reader.digit(tag)?;
                check_range("tempo", tempo as usize, TEMPO_MIN as usize, TEMPO_MAX as usize)?;
            }
            'a' => {
                beats_per_bar = reader.digit(tag)?;
                check_range(
                    "beats per bar",
                    beats_per_bar as usize,
                    BEATS_PER_BAR_MIN as usize,
                    BEATS_PER_BAR_MAX as usize,
                )?;
            }
            'g' => {
                bar_count = reader.digit(tag)? as usize + 1;
                check_range("bar count", bar_count, 1, BAR_COUNT_MAX)?;
                for channel in &mut patterns {
                    channel.resize(bar_count, 0);
                }
            }
            'j' => {
                let channel_count = reader.digit(tag)? as usize + 1;
                check_range("channel count", channel_count, 1, CHANNEL_COUNT_MAX)?;
                instruments.resize(channel_count, Instrument::Square);
                patterns.resize(channel_count, vec![0; bar_count]);
            }
            'i' => {
                for instrument in instruments.iter_mut() {
                    let index = reader.digit(tag)?;
                    *instrument = Instrument::from_index(index).ok_or(SongError::OutOfRange {
                        field: "instrument",
                        value: index as usize,
                    })?;
                }
            }
            'b' => {
                for channel in patterns.iter_mut() {
                    for pattern in channel.iter_mut() {
                        *pattern = reader.digit(tag)?;
                        check_range("pattern", *pattern as usize, 0, PATTERN_MAX as usize)?;
                    }
                }
            }
            _ => return Err(SongError::UnknownTag { tag, position }),
        }
    }

    let channels = instruments
        .into_iter()
        .zip(patterns)
        .map(|(instrument, patterns)| Channel { instrument, patterns })
        .collect();

    Ok(Song {
        tempo,
        beats_per_bar,
        bar_count,
        channels,
    })
}
