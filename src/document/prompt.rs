//! Prompts (modal dialogs) the document knows how to open

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::DocumentError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Prompt {
    Export,
    Import,
    SongRecovery,
    BarCount,
    BeatsPerBar,
    MoveNotesSideways,
    ChannelSettings,
}

impl Prompt {
    pub const ALL: [Prompt; 7] = [
        Prompt::Export,
        Prompt::Import,
        Prompt::SongRecovery,
        Prompt::BarCount,
        Prompt::BeatsPerBar,
        Prompt::MoveNotesSideways,
        Prompt::ChannelSettings,
    ];

    /// Identifier stored in history snapshots
    pub fn as_str(&self) -> &'static str {
        match self {
            Prompt::Export => "export",
            Prompt::Import => "import",
            Prompt::SongRecovery => "songRecovery",
            Prompt::BarCount => "barCount",
            Prompt::BeatsPerBar => "beatsPerBar",
            Prompt::MoveNotesSideways => "moveNotesSideways",
            Prompt::ChannelSettings => "channelSettings",
        }
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Prompt {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Prompt::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| DocumentError::UnknownPrompt(s.to_string()))
    }
}
