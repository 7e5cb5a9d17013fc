//! The closed vocabulary of authored effects.

use serde::{Deserialize, Serialize};

use crate::value::FlagValue;

/// A state change applied when a node is entered or a choice is taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    /// Add items to the player's inventory.
    AddItem {
        /// Item name.
        value: String,
        /// How many to add.
        #[serde(default = "default_count")]
        count: u32,
    },
    /// Remove items from the player's inventory.
    RemoveItem {
        /// Item name.
        value: String,
        /// How many to remove.
        #[serde(default = "default_count")]
        count: u32,
    },
    /// Set (or, with `null`, clear) a player flag.
    SetFlag {
        /// Flag key.
        flag: String,
        /// New value; `None` clears the flag.
        #[serde(default = "default_flag_value")]
        value: Option<FlagValue>,
    },
    /// Grant a tag.
    AddTag {
        /// Tag name.
        value: String,
    },
    /// Grant a trait.
    AddTrait {
        /// Trait name.
        value: String,
    },
    /// Change reputation with a faction.
    RepDelta {
        /// Faction name.
        faction: String,
        /// Signed change.
        value: i64,
    },
    /// Change hit points.
    HpDelta {
        /// Signed change.
        value: i64,
    },
    /// Move the player straight to a node.
    Teleport {
        /// Destination node ID.
        target: String,
    },
    /// End the session.
    EndGame {
        /// Ending ID or label.
        #[serde(default, alias = "value")]
        ending: Option<String>,
    },
    /// Make a start available to future sessions.
    UnlockStart {
        /// Start ID.
        value: String,
    },
}

fn default_count() -> u32 {
    1
}

fn default_flag_value() -> Option<FlagValue> {
    Some(FlagValue::Boolean(true))
}

impl Effect {
    /// The authored `type` name of this effect.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AddItem { .. } => "add_item",
            Self::RemoveItem { .. } => "remove_item",
            Self::SetFlag { .. } => "set_flag",
            Self::AddTag { .. } => "add_tag",
            Self::AddTrait { .. } => "add_trait",
            Self::RepDelta { .. } => "rep_delta",
            Self::HpDelta { .. } => "hp_delta",
            Self::Teleport { .. } => "teleport",
            Self::EndGame { .. } => "end_game",
            Self::UnlockStart { .. } => "unlock_start",
        }
    }
}
