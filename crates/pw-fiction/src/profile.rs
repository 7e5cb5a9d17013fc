//! The cross-session profile record.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use pw_core::{FlagValue, Start};

/// What persists between playthroughs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    /// Start IDs unlocked by earlier sessions.
    pub unlocked_starts: BTreeSet<String>,
    /// Ending labels reached so far.
    pub seen_endings: BTreeSet<String>,
    /// Profile flags.
    pub flags: BTreeMap<String, FlagValue>,
}

impl Profile {
    /// An empty profile.
    pub fn new() -> Self {
        Self::default()
    }

    /// Unlock a start. Returns `true` if it was not unlocked before.
    pub fn unlock_start(&mut self, start_id: impl Into<String>) -> bool {
        self.unlocked_starts.insert(start_id.into())
    }

    /// Record an ending. Returns `true` the first time.
    pub fn record_ending(&mut self, label: impl Into<String>) -> bool {
        self.seen_endings.insert(label.into())
    }

    /// Whether a start may begin a new session.
    pub fn is_available(&self, start: &Start) -> bool {
        !start.locked || self.unlocked_starts.contains(start.id())
    }

    /// Look up a profile flag.
    pub fn flag(&self, key: &str) -> Option<&FlagValue> {
        self.flags.get(key)
    }

    /// Whether a profile flag is set to a truthy value.
    pub fn flag_is_true(&self, key: &str) -> bool {
        self.flag(key).is_some_and(FlagValue::is_truthy)
    }
}
