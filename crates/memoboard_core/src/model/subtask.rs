//! Subtask records and the stored-blob codec.
//!
//! # Responsibility
//! - Define the checklist entry shape shared with existing stored data.
//! - Own encode/decode between `Vec<Subtask>` and the persisted JSON scalar.
//!
//! # Invariants
//! - Wire field names stay exactly `text` / `completed`.
//! - An absent or blank blob decodes to an empty list, never an error.
//! - `decode(encode(x)) == x` for every list, including empty text entries.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One checklist entry of a checklist-mode todo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    /// Display text. New entries are validated non-empty by the engine.
    pub text: String,
    /// Completion flag. Stored data may omit it; decoding defaults to false.
    #[serde(default)]
    pub completed: bool,
}

impl Subtask {
    /// Creates a not-yet-completed entry.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            completed: false,
        }
    }
}

/// Codec failure for the persisted subtask blob.
///
/// A decode failure means the stored record is corrupt (the encoder's own
/// output always decodes), so callers must surface it, not mask it.
#[derive(Debug)]
pub enum SubtaskCodecError {
    Encode(serde_json::Error),
    Decode(serde_json::Error),
}

impl Display for SubtaskCodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode(err) => write!(f, "failed to encode subtask list: {err}"),
            Self::Decode(err) => write!(f, "failed to decode stored subtask list: {err}"),
        }
    }
}

impl Error for SubtaskCodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) | Self::Decode(err) => Some(err),
        }
    }
}

/// Serializes a subtask list into the stored JSON scalar.
pub fn encode_subtasks(subtasks: &[Subtask]) -> Result<String, SubtaskCodecError> {
    serde_json::to_string(subtasks).map_err(SubtaskCodecError::Encode)
}

/// Parses the stored JSON scalar back into a subtask list.
///
/// `None` and blank input both yield an empty list; anything else must be a
/// JSON array in the persisted shape.
pub fn decode_subtasks(raw: Option<&str>) -> Result<Vec<Subtask>, SubtaskCodecError> {
    match raw {
        None => Ok(Vec::new()),
        Some(text) if text.trim().is_empty() => Ok(Vec::new()),
        Some(text) => serde_json::from_str(text).map_err(SubtaskCodecError::Decode),
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_subtasks, encode_subtasks, Subtask, SubtaskCodecError};

    #[test]
    fn round_trip_preserves_entries() {
        let subtasks = vec![
            Subtask {
                text: "buy milk".to_string(),
                completed: false,
            },
            Subtask {
                text: String::new(),
                completed: true,
            },
        ];

        let blob = encode_subtasks(&subtasks).unwrap();
        assert_eq!(decode_subtasks(Some(&blob)).unwrap(), subtasks);
    }

    #[test]
    fn round_trip_of_empty_list() {
        let blob = encode_subtasks(&[]).unwrap();
        assert_eq!(decode_subtasks(Some(&blob)).unwrap(), Vec::new());
    }

    #[test]
    fn absent_and_blank_blobs_decode_to_empty() {
        assert_eq!(decode_subtasks(None).unwrap(), Vec::new());
        assert_eq!(decode_subtasks(Some("")).unwrap(), Vec::new());
        assert_eq!(decode_subtasks(Some("   ")).unwrap(), Vec::new());
    }

    #[test]
    fn wire_fields_match_stored_shape() {
        let decoded = decode_subtasks(Some(
            r#"[{"text":"task 1","completed":false},{"text":"task 2","completed":true}]"#,
        ))
        .unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].text, "task 1");
        assert!(decoded[1].completed);
    }

    #[test]
    fn missing_completed_defaults_to_false() {
        let decoded = decode_subtasks(Some(r#"[{"text":"legacy entry"}]"#)).unwrap();
        assert_eq!(decoded, vec![Subtask::new("legacy entry")]);
    }

    #[test]
    fn malformed_blob_is_a_decode_error() {
        let err = decode_subtasks(Some("{not json")).unwrap_err();
        assert!(matches!(err, SubtaskCodecError::Decode(_)));
    }
}
