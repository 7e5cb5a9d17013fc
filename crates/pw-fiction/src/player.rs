//! Player state management.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use pw_core::FlagValue;

/// One step of the path the player took.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// Node the choice was taken at.
    pub from: String,
    /// Node or ending the choice led to.
    pub to: String,
    /// Text of the choice taken.
    pub choice: String,
}

/// Everything that describes one playthrough in progress.
///
/// Every field has a default so partial or older save documents still
/// deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerState {
    /// The node the player is at.
    pub current_node: String,
    /// The start this session began from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_id: Option<String>,
    /// Hit points.
    pub hp: i64,
    /// In-story hours elapsed. Never decreases within a session.
    pub tick_counter: u64,
    /// Canonical tags held.
    pub tags: BTreeSet<String>,
    /// Permanent traits held.
    pub traits: BTreeSet<String>,
    /// Item counts. Items at zero are removed.
    pub items: BTreeMap<String, u32>,
    /// Session flags.
    pub flags: BTreeMap<String, FlagValue>,
    /// Reputation per faction; a missing faction is at 0.
    #[serde(alias = "rep")]
    pub reputation: BTreeMap<String, i64>,
    /// Transitions taken, oldest first.
    pub history: Vec<Transition>,
    /// Ending label once the session is over.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ending: Option<String>,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new("", 10)
    }
}

impl PlayerState {
    /// A fresh player at a node.
    pub fn new(current_node: impl Into<String>, hp: i64) -> Self {
        Self {
            current_node: current_node.into(),
            start_id: None,
            hp,
            tick_counter: 0,
            tags: BTreeSet::new(),
            traits: BTreeSet::new(),
            items: BTreeMap::new(),
            flags: BTreeMap::new(),
            reputation: BTreeMap::new(),
            history: Vec::new(),
            ending: None,
        }
    }

    /// How many of an item the player holds.
    pub fn item_count(&self, item: &str) -> u32 {
        self.items.get(item).copied().unwrap_or(0)
    }

    /// Whether the player holds at least one of an item.
    pub fn has_item(&self, item: &str) -> bool {
        self.item_count(item) > 0
    }

    /// Add items. Returns the new count.
    pub fn add_item(&mut self, item: impl Into<String>, count: u32) -> u32 {
        let held = self.items.entry(item.into()).or_insert(0);
        *held = held.saturating_add(count);
        *held
    }

    /// Remove items. Fails without changing anything when the player holds
    /// fewer than `count`; returns the remaining count otherwise.
    pub fn remove_item(&mut self, item: &str, count: u32) -> Result<u32, u32> {
        let held = self.item_count(item);
        if held < count {
            return Err(held);
        }
        let left = held - count;
        if left == 0 {
            self.items.remove(item);
        } else {
            self.items.insert(item.to_string(), left);
        }
        Ok(left)
    }

    /// Reputation with a faction.
    pub fn rep(&self, faction: &str) -> i64 {
        self.reputation.get(faction).copied().unwrap_or(0)
    }

    /// Look up a flag.
    pub fn flag(&self, key: &str) -> Option<&FlagValue> {
        self.flags.get(key)
    }

    /// Set a flag; `None` clears it.
    pub fn set_flag(&mut self, key: impl Into<String>, value: Option<FlagValue>) {
        let key = key.into();
        match value {
            Some(value) => {
                self.flags.insert(key, value);
            }
            None => {
                self.flags.remove(&key);
            }
        }
    }

    /// Whether the session has reached an ending.
    pub fn has_ended(&self) -> bool {
        self.ending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_state_new() {
        let state = PlayerState::new("dock", 10);
        assert_eq!(state.current_node, "dock");
        assert_eq!(state.hp, 10);
        assert_eq!(state.tick_counter, 0);
        assert!(state.items.is_empty());
        assert!(!state.has_ended());
    }

    #[test]
    fn inventory_counts() {
        let mut state = PlayerState::default();
        assert!(!state.has_item("Rope"));
        assert_eq!(state.add_item("Rope", 2), 2);
        assert!(state.has_item("Rope"));
        assert_eq!(state.remove_item("Rope", 1), Ok(1));
        assert_eq!(state.remove_item("Rope", 1), Ok(0));
        assert!(!state.items.contains_key("Rope"));
    }

    #[test]
    fn underflow_leaves_count_unchanged() {
        let mut state = PlayerState::default();
        state.add_item("Coin", 1);
        assert_eq!(state.remove_item("Coin", 3), Err(1));
        assert_eq!(state.item_count("Coin"), 1);
    }

    #[test]
    fn flags_set_and_clear() {
        let mut state = PlayerState::default();
        state.set_flag("door", Some(FlagValue::from("open")));
        assert_eq!(state.flag("door"), Some(&FlagValue::from("open")));
        state.set_flag("door", None);
        assert!(state.flag("door").is_none());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let state: PlayerState =
            serde_json::from_str(r#"{"current_node": "dock", "rep": {"Root Court": 2}}"#).unwrap();
        assert_eq!(state.tick_counter, 0);
        assert_eq!(state.hp, 10);
        assert_eq!(state.rep("Root Court"), 2);
        assert_eq!(state.rep("Wind Choirs"), 0);
    }
}
