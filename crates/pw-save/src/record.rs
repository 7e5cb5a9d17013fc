//! The versioned save document.

use chrono::{DateTime, Utc};
use pw_core::Story;
use pw_fiction::PlayerState;
use serde::{Deserialize, Serialize};

use crate::migrate::CURRENT_VERSION;

/// Bookkeeping stored next to the player state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveMetadata {
    /// The normalized slot name the record was written to.
    #[serde(default)]
    pub slot: String,
    /// When the record was written. Absent in some legacy saves.
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
    /// Title of the story the save belongs to.
    #[serde(default)]
    pub story_title: Option<String>,
    /// [`Story::signature`] of the story the save was written against.
    #[serde(default)]
    pub story_signature: Option<String>,
}

/// A save file: schema version, metadata and the full player state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveRecord {
    /// Schema version, always [`CURRENT_VERSION`] once loaded.
    pub version: u64,
    /// Slot and timestamp.
    pub metadata: SaveMetadata,
    /// The saved session.
    pub state: PlayerState,
}

impl SaveRecord {
    /// Wrap a player state for writing, stamped with the current time.
    pub fn new(slot: impl Into<String>, state: PlayerState) -> Self {
        Self {
            version: CURRENT_VERSION,
            metadata: SaveMetadata {
                slot: slot.into(),
                saved_at: Some(Utc::now()),
                story_title: None,
                story_signature: None,
            },
            state,
        }
    }

    /// Stamp the record with the title and signature of `story`.
    pub fn for_story(mut self, story: &Story) -> Self {
        self.metadata.story_title = (!story.title.is_empty()).then(|| story.title.clone());
        self.metadata.story_signature = story.signature();
        self
    }

    /// Whether the record was written against `story`. Records without a
    /// signature are assumed to match.
    pub fn matches_story(&self, story: &Story) -> bool {
        match (&self.metadata.story_signature, story.signature()) {
            (Some(saved), Some(current)) => *saved == current,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_state_fields_take_defaults() {
        let record: SaveRecord = serde_json::from_str(
            r#"{"version": 2, "metadata": {"slot": "a"}, "state": {"current_node": "dock"}}"#,
        )
        .unwrap();
        assert_eq!(record.state.current_node, "dock");
        assert_eq!(record.state.tick_counter, 0);
        assert_eq!(record.state.hp, 10);
        assert!(record.state.items.is_empty());
        assert!(record.metadata.story_title.is_none());
    }

    #[test]
    fn new_record_is_current_and_stamped() {
        let record = SaveRecord::new("quick", PlayerState::new("dock", 10));
        assert_eq!(record.version, CURRENT_VERSION);
        assert!(record.metadata.saved_at.is_some());
        assert!(record.metadata.story_signature.is_none());
    }

    #[test]
    fn signature_detects_an_edited_story() {
        let story = Story::new("Isles").with_node("dock", pw_core::Node::new("Dock", "Gulls."));
        let record = SaveRecord::new("quick", PlayerState::new("dock", 10)).for_story(&story);
        assert_eq!(record.metadata.story_title.as_deref(), Some("Isles"));
        assert!(record.matches_story(&story));

        let edited = Story::new("Isles").with_node("dock", pw_core::Node::new("Dock", "Crows."));
        assert!(!record.matches_story(&edited));

        let unsigned = SaveRecord::new("quick", PlayerState::new("dock", 10));
        assert!(unsigned.matches_story(&edited));
    }
}
