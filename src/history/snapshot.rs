//! History snapshot stored with every navigation entry

use serde::{Deserialize, Serialize};

/// State attached out-of-band to one navigation entry
///
/// Serialized with camelCase keys since the browser keeps it in `history.state`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySnapshot {
    /// Total order over every snapshot this session created
    pub sequence_number: u64,
    /// Sequence number that was active when this step was pushed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_sequence_number: Option<u64>,
    /// False only for the synthetic snapshot created at session start
    pub can_undo: bool,
    pub bar: usize,
    pub channel: usize,
    /// Prompt considered open while this entry is active
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

impl HistorySnapshot {
    /// The snapshot a fresh session starts from
    pub fn initial(bar: usize, channel: usize) -> Self {
        Self {
            sequence_number: 0,
            previous_sequence_number: None,
            can_undo: false,
            bar,
            channel,
            prompt: None,
        }
    }
}

/// One entry of the navigation stack: the addressable payload plus its snapshot
///
/// `snapshot` is `None` for entries the host created on its own, e.g. when the
/// user typed a new address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationEntry {
    pub snapshot: Option<HistorySnapshot>,
    pub payload: String,
}

impl NavigationEntry {
    pub fn new(snapshot: HistorySnapshot, payload: impl Into<String>) -> Self {
        Self {
            snapshot: Some(snapshot),
            payload: payload.into(),
        }
    }

    /// An entry the host created without any snapshot attached
    pub fn bare(payload: impl Into<String>) -> Self {
        Self {
            snapshot: None,
            payload: payload.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_json_uses_camel_case() {
        let snapshot = HistorySnapshot {
            sequence_number: 4,
            previous_sequence_number: Some(1),
            can_undo: true,
            bar: 2,
            channel: 1,
            prompt: Some("export".to_string()),
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"sequenceNumber\":4"));
        assert!(json.contains("\"previousSequenceNumber\":1"));
        assert!(json.contains("\"canUndo\":true"));
        assert!(json.contains("\"prompt\":\"export\""));
    }

    #[test]
    fn test_snapshot_without_prompt_omits_field() {
        let json = serde_json::to_string(&HistorySnapshot::initial(0, 0)).unwrap();
        assert!(!json.contains("prompt"));
        assert!(!json.contains("previousSequenceNumber"));

        let parsed: HistorySnapshot =
            serde_json::from_str(r#"{"sequenceNumber":0,"canUndo":false,"bar":0,"channel":0}"#)
                .unwrap();
        assert_eq!(parsed, HistorySnapshot::initial(0, 0));
    }
}
